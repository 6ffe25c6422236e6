use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("ブラウザ初期化エラー: {0}")]
    BrowserInit(String),

    #[error("ナビゲーションエラー: {0}")]
    Navigation(String),

    #[error("ログインエラー: {0}")]
    Login(String),

    #[error("要素が見つかりません: {0}")]
    ElementNotFound(String),

    #[error("JavaScript実行エラー: {0}")]
    JavaScript(String),

    #[error("抽出エラー: {0}")]
    Extraction(String),

    #[error("ファイル操作エラー: {0}")]
    FileIO(#[from] std::io::Error),

    /// 永続化ファイルは存在するが期待する表形式で読めない
    #[error("ストア読み込みエラー ({}): {message}", .path.display())]
    Storage { path: PathBuf, message: String },

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("ストアは別プロセスが使用中です: {}", .0.display())]
    Locked(PathBuf),
}

impl ScraperError {
    pub(crate) fn storage(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.into(),
            message: message.into(),
        }
    }

    /// ブラウザ操作側（オーケストレーション）の失敗か
    pub fn is_orchestration(&self) -> bool {
        matches!(
            self,
            Self::BrowserInit(_)
                | Self::Navigation(_)
                | Self::Login(_)
                | Self::ElementNotFound(_)
                | Self::JavaScript(_)
        )
    }
}
