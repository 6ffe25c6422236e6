//! 求人リスト差分スクレイパー CLI
//!
//! 実行方法:
//! ```
//! RUST_LOG=debug cargo run -- --store ./data/zhipin_jobs_all.csv --output-dir ./data
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use job_scraper::config::{DEFAULT_SNAPSHOT_PREFIX, DEFAULT_STORE_FILE, DEFAULT_TARGET_URL};
use job_scraper::{ConsoleLoginGate, DedupStrategy, RunRequest, ScraperConfig, ScraperService};
use tower::Service;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// 巡回する推薦求人ページ
    #[arg(long, env = "JOB_SCRAPER_URL", default_value = DEFAULT_TARGET_URL)]
    url: String,

    /// 全件CSV
    #[arg(long, env = "JOB_SCRAPER_STORE", default_value = DEFAULT_STORE_FILE)]
    store: PathBuf,

    /// 新着スナップショットの出力先
    #[arg(long, env = "JOB_SCRAPER_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// スナップショットのファイル名プレフィックス
    #[arg(long, env = "JOB_SCRAPER_PREFIX", default_value = DEFAULT_SNAPSHOT_PREFIX)]
    prefix: String,

    /// ヘッドレスで起動（手動ログインが必要な場合は使えない）
    #[arg(long, env = "JOB_SCRAPER_HEADLESS")]
    headless: bool,

    /// Chrome / Chromium の実行ファイル
    #[arg(long, env = "CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// タブごとのスクロール回数
    #[arg(long, default_value_t = 4)]
    scroll_rounds: u32,

    /// スクロール間隔（秒）
    #[arg(long, default_value_t = 2)]
    scroll_delay: u64,

    /// 重複判定方式 (exact | normalized)
    #[arg(long, env = "JOB_SCRAPER_DEDUP", default_value = "normalized")]
    dedup: DedupStrategy,

    /// 失敗時のスクリーンショットなどデバッグ出力
    #[arg(long)]
    debug: bool,

    /// 結果をJSONで出力
    #[arg(long)]
    json: bool,
}

impl From<&Args> for ScraperConfig {
    fn from(args: &Args) -> Self {
        let mut config = ScraperConfig::new(args.url.clone())
            .with_store_path(args.store.clone())
            .with_output_dir(args.output_dir.clone())
            .with_snapshot_prefix(args.prefix.clone())
            .with_headless(args.headless)
            .with_scroll_rounds(args.scroll_rounds)
            .with_scroll_delay(Duration::from_secs(args.scroll_delay))
            .with_dedup(args.dedup)
            .with_debug(args.debug);
        if let Some(path) = &args.chrome_path {
            config = config.with_chrome_path(path.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = ScraperConfig::from(&args);

    let mut service = ScraperService::new(config, ConsoleLoginGate);
    let report = service.call(RunRequest::new()).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for tab in &report.tabs {
        match &tab.error {
            None => println!("tab {}: {} listings", tab.index + 1, tab.records),
            Some(e) => println!("tab {}: failed ({})", tab.index + 1, e),
        }
    }
    for record in &report.new_records {
        println!(
            "{} | {} | {} | {} | {}",
            record.title().unwrap_or("-"),
            record.salary().unwrap_or("-"),
            record.tags(),
            record.location().unwrap_or("-"),
            record.boss_name().unwrap_or("-"),
        );
    }
    println!(
        "{} new / {} total, snapshot: {}",
        report.new_records.len(),
        report.total_records,
        report.snapshot_path.display()
    );

    Ok(())
}
