use async_trait::async_trait;
use tracing::warn;

use crate::batch::BatchReport;
use crate::error::ScraperError;

/// 手動ログインの待機ポイント
///
/// 呼び出し側が再開シグナルを与える。
#[async_trait]
pub trait LoginGate: Send + Sync {
    async fn wait_for_login(&self, login_url: &str) -> Result<(), ScraperError>;
}

#[async_trait]
pub trait ListingSource: Send + Sync {
    /// ブラウザ初期化
    async fn initialize(&mut self) -> Result<(), ScraperError>;

    /// ログイン確認（未ログインなら gate で待機）
    async fn login(&mut self, gate: &dyn LoginGate) -> Result<(), ScraperError>;

    /// 求人リスト取得
    async fn fetch(&mut self, target_url: &str) -> Result<BatchReport, ScraperError>;

    /// リソース解放
    async fn close(&mut self) -> Result<(), ScraperError>;

    /// 一括実行（initialize → login → fetch → close）
    ///
    /// login / fetch が失敗しても close は必ず呼ぶ。
    async fn execute(
        &mut self,
        target_url: &str,
        gate: &dyn LoginGate,
    ) -> Result<BatchReport, ScraperError> {
        let result = match self.initialize().await {
            Ok(()) => match self.login(gate).await {
                Ok(()) => self.fetch(target_url).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        if let Err(e) = self.close().await {
            warn!("Failed to close listing source: {}", e);
        }

        result
    }
}
