use crate::Cli;
use anyhow::Context;
use colored::Colorize;
use std::sync::Arc;
use std::time::Duration;
use vipswitch_cloud::{
    ActionWaiter, CancellationToken, CloudResourceClient, FailoverError, FailoverOrchestrator,
    FailoverPlan, FailoverRequest, ResourceNames, ResourceResolver, WaitConfig,
};
use vipswitch_cloud_hetzner::{HetznerClient, HetznerConfig};

impl From<&Cli> for FailoverRequest {
    fn from(cli: &Cli) -> Self {
        FailoverRequest {
            names: ResourceNames {
                floating_ip: cli.floating_ip_name.clone(),
                network: cli.network_name.clone(),
                primary_server: cli.primary_server_name.clone(),
                secondary_server: cli.secondary_server_name.clone(),
            },
            alias_ip: cli.alias_ip(),
            primary_available: cli.alarm.primary_available(),
        }
    }
}

pub async fn handle(cli: &Cli) -> anyhow::Result<()> {
    let request = FailoverRequest::from(cli);

    let token = vipswitch_config::read_token(cli.token_path.as_deref())
        .context("APIトークンの読み込みに失敗しました")?;

    let mut config = HetznerConfig::new(token);
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint.as_str());
    }
    let client: Arc<dyn CloudResourceClient> = Arc::new(HetznerClient::new(config)?);

    let cancel = CancellationToken::new();
    spawn_cancel_triggers(&cancel, cli.timeout.map(Duration::from_secs));

    let result = run(cli, &request, client, &cancel).await;
    cancel.cancel();
    result
}

async fn run(
    cli: &Cli,
    request: &FailoverRequest,
    client: Arc<dyn CloudResourceClient>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let resources = ResourceResolver::new(Arc::clone(&client))
        .resolve(cancel, &request.names, request.primary_available)
        .await
        .context("リソースの解決に失敗しました")?;

    let plan = FailoverPlan::new(&resources, request.alias_ip);
    print_plan(&plan, cli.json)?;

    if cli.dry_run {
        if !cli.json {
            println!();
            println!("{}", "--dry-run: 変更は行いません".yellow());
        }
        return Ok(());
    }

    let waiter = ActionWaiter::new(Arc::clone(&client), WaitConfig::default());
    let orchestrator = FailoverOrchestrator::new(client, waiter);

    match orchestrator.execute(cancel, &plan).await {
        Ok(()) => {
            println!(
                "{} {}",
                "✓ フェイルオーバー完了:".green().bold(),
                plan.target.name.cyan()
            );
            Ok(())
        }
        Err(e) => {
            print_failures(&e);
            Err(e.into())
        }
    }
}

fn print_plan(plan: &FailoverPlan, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(plan)?);
        return Ok(());
    }

    println!("{}", "フェイルオーバー計画:".blue().bold());
    println!("{}", plan);
    Ok(())
}

fn print_failures(err: &FailoverError) {
    let header = if err.is_partial() {
        "⚠ フェイルオーバーが部分的に失敗しました".yellow().bold()
    } else {
        "✗ フェイルオーバーに失敗しました".red().bold()
    };
    eprintln!("{}", header);

    for failure in err.failures() {
        if failure.was_cancelled() {
            eprintln!("  - {} (キャンセル)", failure.branch.to_string().yellow());
        } else {
            eprintln!("  ✗ {}: {}", failure.branch.to_string().red(), failure.error);
        }
    }
}

/// Ctrl-C or the deadline cancels every in-flight lookup and wait
fn spawn_cancel_triggers(cancel: &CancellationToken, timeout: Option<Duration>) {
    let cancel = cancel.clone();

    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("interrupted, cancelling failover");
                cancel.cancel();
            }
            _ = deadline => {
                tracing::warn!(
                    timeout_secs = timeout.map(|t| t.as_secs()),
                    "timeout exceeded, cancelling failover"
                );
                cancel.cancel();
            }
        }
    });
}
