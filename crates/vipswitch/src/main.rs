mod alarm;
mod failover;

use alarm::Alarm;
use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;
use vipswitch_config::{
    DEFAULT_ALIAS_IP, DEFAULT_FLOATING_IP_NAME, DEFAULT_NETWORK_NAME, DEFAULT_PRIMARY_SERVER_NAME,
    DEFAULT_SECONDARY_SERVER_NAME,
};

/// dpinger の alert_cmd から呼び出され、仮想IPを正常なゲートウェイへ切り替える
#[derive(Parser, Debug)]
#[command(name = "vipswitch", version)]
#[command(
    about = "Hetzner Cloud のフローティングIPとエイリアスIPをゲートウェイ間で切り替える",
    long_about = None
)]
pub struct Cli {
    /// 監視対象アドレス (dpinger の dest_addr、ログ出力のみに使用)
    pub dest_addr: String,

    /// アラームフラグ (0: プライマリ正常, 1: プライマリ障害)
    #[arg(value_parser = alarm::parse_alarm)]
    pub alarm: Alarm,

    /// dpinger が付加する latency_avg / loss_avg など (無視される)
    #[arg(hide = true)]
    pub extra: Vec<String>,

    /// ターゲットに付与するエイリアスIP
    #[arg(long, default_value = DEFAULT_ALIAS_IP, conflicts_with = "no_alias_ip")]
    pub alias_ip: IpAddr,

    /// エイリアスIPを付与せず、両サーバーから削除する
    #[arg(long)]
    pub no_alias_ip: bool,

    /// APIトークンファイルのパス (デフォルト: ~/.hcloud_token)
    #[arg(long, env = "HCLOUD_TOKEN_PATH")]
    pub token_path: Option<PathBuf>,

    /// フローティングIP名
    #[arg(long, default_value = DEFAULT_FLOATING_IP_NAME)]
    pub floating_ip_name: String,

    /// プライマリサーバー名
    #[arg(long, default_value = DEFAULT_PRIMARY_SERVER_NAME)]
    pub primary_server_name: String,

    /// セカンダリサーバー名
    #[arg(long, default_value = DEFAULT_SECONDARY_SERVER_NAME)]
    pub secondary_server_name: String,

    /// プライベートネットワーク名
    #[arg(long, default_value = DEFAULT_NETWORK_NAME)]
    pub network_name: String,

    /// API エンドポイント
    #[arg(long, env = "HCLOUD_ENDPOINT")]
    pub endpoint: Option<String>,

    /// 全体のタイムアウト秒数 (超過するとキャンセル)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// リソースを解決して計画を表示するだけで、変更は行わない
    #[arg(long)]
    pub dry_run: bool,

    /// 計画をJSONで出力
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// `None` means the alias addresses of the target are cleared
    pub fn alias_ip(&self) -> Option<IpAddr> {
        if self.no_alias_ip {
            None
        } else {
            Some(self.alias_ip)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout は計画出力に使うので、ログは stderr に出す
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!(
        dest_addr = %cli.dest_addr,
        alarm = %cli.alarm,
        extra = ?cli.extra,
        "alert received"
    );

    let result = failover::handle(&cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %format!("{:#}", e), "failover unsuccessful");
    }
    result
}
