use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("ホームディレクトリが見つかりません。--token-path でトークンファイルを指定してください")]
    HomeDirNotFound,

    #[error("トークンファイルが空です: {}", .0.display())]
    EmptyToken(PathBuf),

    #[error("トークンファイルを読み込めません: {}: {source}", .path.display())]
    TokenRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
