pub mod error;

pub use error::*;

use std::path::{Path, PathBuf};

/// ホームディレクトリ直下のトークンファイル名
pub const DEFAULT_TOKEN_FILE: &str = ".hcloud_token";
pub const DEFAULT_ALIAS_IP: &str = "10.0.0.3";
pub const DEFAULT_FLOATING_IP_NAME: &str = "pfsense";
pub const DEFAULT_PRIMARY_SERVER_NAME: &str = "pfsense-01";
pub const DEFAULT_SECONDARY_SERVER_NAME: &str = "pfsense-02";
pub const DEFAULT_NETWORK_NAME: &str = "lan";

/// トークンファイルのパスを解決
///
/// 明示的な指定があればそれを使い、なければ `~/.hcloud_token` を返す
pub fn token_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(DEFAULT_TOKEN_FILE))
}

/// APIトークンを読み込む（前後の空白・改行は除去）
pub fn read_token(explicit: Option<&Path>) -> Result<String> {
    let path = token_path(explicit)?;

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::TokenRead {
        path: path.clone(),
        source,
    })?;

    let token = content.trim();
    if token.is_empty() {
        return Err(ConfigError::EmptyToken(path));
    }

    Ok(token.to_string())
}
