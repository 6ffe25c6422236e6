//! 求人リスト差分スクレイパー
//!
//! - ブラウザで推薦求人ページの各タブを巡回し、求人カードを抽出
//! - 過去に取得した全件CSVと突き合わせ、新着のみを追記
//! - 新着だけのスナップショットCSVを実行ごとに出力
//!
//! # 使用例
//!
//! ```rust,ignore
//! use job_scraper::{ConsoleLoginGate, RunRequest, ScraperConfig, ScraperService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScraperConfig::default().with_store_path("./data/zhipin_jobs_all.csv");
//!     let mut service = ScraperService::new(config, ConsoleLoginGate);
//!
//!     let report = service.call(RunRequest::new()).await.unwrap();
//!     println!("new listings: {}", report.new_records.len());
//! }
//! ```
//!
//! # 突き合わせのみ
//!
//! ```rust
//! use job_scraper::listing::{reconcile, ListingRecord};
//!
//! let a = ListingRecord::new().with_title("A");
//! let b = ListingRecord::new().with_title("B");
//!
//! let result = reconcile(&[a.clone(), b.clone()], &[a.clone()]);
//! assert_eq!(result.new, vec![b.clone()]);
//! assert_eq!(result.merged, vec![a, b]);
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod gate;
pub mod listing;
pub mod service;
pub mod traits;
pub mod zhipin;

// 主要な型をリエクスポート
pub use batch::{BatchReport, TabOutcome, TabSummary};
pub use config::{DedupStrategy, ScraperConfig};
pub use error::ScraperError;
pub use gate::{ChannelLoginGate, ConsoleLoginGate, LoginSignal};
pub use listing::{ListingRecord, ListingStore, Reconciliation};
pub use service::{commit_batch, run, Commit, RunReport, RunRequest, ScraperService};
pub use traits::{ListingSource, LoginGate};
pub use zhipin::ZhipinScraper;
