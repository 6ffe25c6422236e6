use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tower::Service;
use tracing::{error, info, warn};

use crate::batch::{BatchReport, TabSummary};
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::listing::{reconcile_with, ListingRecord, ListingStore};
use crate::traits::{ListingSource, LoginGate};
use crate::zhipin::ZhipinScraper;

/// 実行リクエスト（未指定の項目はサービスの基本設定を使う）
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    pub target_url: Option<String>,
    pub store_path: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub headless: Option<bool>,
}

impl RunRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = Some(headless);
        self
    }

    /// 基本設定にリクエストの指定を上書きする
    pub fn apply(self, base: &ScraperConfig) -> ScraperConfig {
        let mut config = base.clone();
        if let Some(url) = self.target_url {
            config.target_url = url;
        }
        if let Some(path) = self.store_path {
            config.store_path = path;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(headless) = self.headless {
            config.headless = headless;
        }
        config
    }
}

/// 既定設定にリクエストを重ねた設定
impl From<RunRequest> for ScraperConfig {
    fn from(req: RunRequest) -> Self {
        req.apply(&ScraperConfig::default())
    }
}

/// 突き合わせ・保存の結果
#[derive(Debug, Clone, Serialize)]
pub struct Commit {
    pub new_records: Vec<ListingRecord>,
    pub total_records: usize,
    pub snapshot_path: PathBuf,
}

/// 1回の実行結果
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: NaiveDateTime,
    pub target_url: String,
    pub store_path: PathBuf,
    pub tabs: Vec<TabSummary>,
    pub new_records: Vec<ListingRecord>,
    pub total_records: usize,
    pub snapshot_path: PathBuf,
}

/// 取得済みバッチを既存ストアと突き合わせ、スナップショットと全件ファイルを書き出す
///
/// スナップショットは新着0件でも出力する。
pub fn commit_batch(
    store: &ListingStore,
    config: &ScraperConfig,
    existing: Vec<ListingRecord>,
    incoming: &[ListingRecord],
    timestamp: NaiveDateTime,
) -> Result<Commit, ScraperError> {
    let reconciliation = reconcile_with(config.dedup, incoming, &existing);
    info!(
        "Reconciled {} incoming against {} existing: {} new",
        incoming.len(),
        existing.len(),
        reconciliation.new.len()
    );

    let snapshot_path = ListingStore::write_snapshot(
        &config.output_dir,
        &config.snapshot_prefix,
        timestamp,
        &reconciliation.new,
    )?;
    store.save(&reconciliation.merged)?;

    Ok(Commit {
        total_records: reconciliation.merged.len(),
        new_records: reconciliation.new,
        snapshot_path,
    })
}

/// 1回分の実行（ロック → 読み込み → 取得 → 突き合わせ → 保存）
///
/// ストアが読めない場合はブラウザを起動する前に中断し、何も書き込まない。
pub async fn run<S>(
    source: &mut S,
    gate: &dyn LoginGate,
    config: &ScraperConfig,
) -> Result<RunReport, ScraperError>
where
    S: ListingSource,
{
    let started_at = Local::now().naive_local();
    let store = ListingStore::new(&config.store_path);

    let _lock = store.lock()?;
    let existing = store.load()?;

    let batch: BatchReport = match source.execute(&config.target_url, gate).await {
        Ok(batch) => batch,
        Err(e) => {
            if e.is_orchestration() {
                error!("Browser run failed, store left untouched: {}", e);
            }
            return Err(e);
        }
    };
    for failure in batch.failures() {
        if let Err(reason) = &failure.result {
            warn!("Tab {} produced no records: {}", failure.index + 1, reason);
        }
    }

    let commit = commit_batch(&store, config, existing, &batch.records(), started_at)?;

    Ok(RunReport {
        started_at,
        target_url: config.target_url.clone(),
        store_path: config.store_path.clone(),
        tabs: batch.summaries(),
        new_records: commit.new_records,
        total_records: commit.total_records,
        snapshot_path: commit.snapshot_path,
    })
}

/// tower::Serviceを実装したスクレイパーサービス
pub struct ScraperService<G> {
    base: ScraperConfig,
    gate: Arc<G>,
}

impl<G> Clone for ScraperService<G> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<G: LoginGate + 'static> ScraperService<G> {
    pub fn new(base: ScraperConfig, gate: G) -> Self {
        Self {
            base,
            gate: Arc::new(gate),
        }
    }

    pub fn base_config(&self) -> &ScraperConfig {
        &self.base
    }
}

impl<G: LoginGate + 'static> Service<RunRequest> for ScraperService<G> {
    type Response = RunReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RunRequest) -> Self::Future {
        let config = req.apply(&self.base);
        let gate = Arc::clone(&self.gate);
        info!("Run request received: url={}", config.target_url);

        Box::pin(async move {
            let mut scraper = ZhipinScraper::new(config.clone());
            let report = run(&mut scraper, gate.as_ref(), &config).await?;

            info!(
                "Run finished: {} new, {} total, snapshot={:?}",
                report.new_records.len(),
                report.total_records,
                report.snapshot_path
            );
            Ok(report)
        })
    }
}
