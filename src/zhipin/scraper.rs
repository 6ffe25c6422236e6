//! BOSS直聘 推薦求人スクレイパー実装

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::batch::{BatchReport, TabOutcome};
use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::listing::{extract_listings, ListingRecord};
use crate::traits::{ListingSource, LoginGate};

/// ログイン済みの場合のみ表示されるアバター
const AVATAR_SELECTOR: &str = ".user-avatar";
/// 推薦カテゴリのタブ
const TAB_SELECTOR: &str = ".recommend-job-btn";
const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight);";
const PAGE_SETTLE_SECS: u64 = 1;

pub struct ZhipinScraper {
    config: ScraperConfig,
    browser: Option<Browser>,
    page: Option<Arc<Page>>,
    handler: Option<JoinHandle<()>>,
}

impl ZhipinScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
            handler: None,
        }
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    fn get_page(&self) -> Result<&Arc<Page>, ScraperError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("ブラウザが初期化されていません".into()))
    }

    async fn is_logged_in(&self, page: &Page) -> bool {
        match page.find_elements(AVATAR_SELECTOR).await {
            Ok(elements) => !elements.is_empty(),
            Err(e) => {
                debug!("Avatar lookup failed: {}", e);
                false
            }
        }
    }

    /// 遅延読み込みのため一番下までスクロールを繰り返す
    async fn scroll_to_bottom(&self, page: &Page) -> Result<(), ScraperError> {
        for round in 0..self.config.scroll_rounds {
            page.evaluate(SCROLL_SCRIPT)
                .await
                .map_err(|e| ScraperError::JavaScript(e.to_string()))?;
            debug!(
                "Scrolling to load more data... ({}/{})",
                round + 1,
                self.config.scroll_rounds
            );
            sleep(self.config.scroll_delay).await;
        }
        Ok(())
    }

    /// index 番目のタブを開いて求人を抽出
    ///
    /// クリック後に要素が作り直されることがあるため、毎回タブを取り直す。
    /// ラベルは途中で失敗しても読めた分を返す。
    async fn scrape_tab(
        &self,
        page: &Page,
        index: usize,
    ) -> (Option<String>, Result<Vec<ListingRecord>, ScraperError>) {
        let tab = match find_tabs(page).await.and_then(|mut tabs| {
            if index < tabs.len() {
                Ok(tabs.swap_remove(index))
            } else {
                Err(ScraperError::ElementNotFound(format!(
                    "タブ {} が消えました",
                    index + 1
                )))
            }
        }) {
            Ok(tab) => tab,
            Err(e) => return (None, Err(e)),
        };

        let label = tab
            .inner_text()
            .await
            .ok()
            .flatten()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let result = async {
            tab.click()
                .await
                .map_err(|e| ScraperError::Navigation(format!("タブクリック: {}", e)))?;
            sleep(self.config.tab_delay).await;

            self.scroll_to_bottom(page).await?;

            let html = page
                .content()
                .await
                .map_err(|e| ScraperError::Extraction(format!("ページ取得: {}", e)))?;
            Ok::<_, ScraperError>(extract_listings(&html))
        }
        .await;

        (label, result)
    }

    async fn debug_screenshot(&self, page: &Page, context: &str) {
        match page
            .screenshot(ScreenshotParams::builder().full_page(true).build())
            .await
        {
            Ok(screenshot) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(&screenshot);
                debug!("{} screenshot: data:image/png;base64,{}", context, encoded);
            }
            Err(e) => debug!("Failed to capture screenshot: {}", e),
        }
    }
}

async fn find_tabs(page: &Page) -> Result<Vec<Element>, ScraperError> {
    tabs_or_error(page.find_elements(TAB_SELECTOR).await)
}

/// タブ検索の失敗は「タブ0件」と区別してエラーにする
fn tabs_or_error<T>(found: Result<Vec<T>, CdpError>) -> Result<Vec<T>, ScraperError> {
    found.map_err(|e| ScraperError::ElementNotFound(format!("タブ {}: {}", TAB_SELECTOR, e)))
}

fn tab_outcome(
    index: usize,
    label: Option<String>,
    result: Result<Vec<ListingRecord>, ScraperError>,
) -> TabOutcome {
    match result {
        Ok(records) => {
            info!(
                "Number of jobs found in tab {}: {}",
                index + 1,
                records.len()
            );
            TabOutcome::succeeded(index, label, records)
        }
        Err(e) => TabOutcome::failed(index, label, e.to_string()),
    }
}

#[async_trait]
impl ListingSource for ZhipinScraper {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("Initializing browser...");

        let mut builder = BrowserConfig::builder()
            .window_size(1280, 900)
            .request_timeout(self.config.timeout)
            .arg(format!("--user-agent={}", self.config.user_agent))
            .arg("--disable-blink-features=AutomationControlled");

        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        if !self.config.headless {
            builder = builder.with_head();
        }

        if self.config.debug {
            builder = builder.arg("--enable-logging=stderr").arg("--v=1");
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(format!("ブラウザ設定エラー: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(Arc::new(page));
        self.handler = Some(handle);

        info!("Browser initialized");
        Ok(())
    }

    async fn login(&mut self, gate: &dyn LoginGate) -> Result<(), ScraperError> {
        let page = self.get_page()?.clone();

        page.goto(self.config.user_url.as_str())
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        sleep(Duration::from_secs(PAGE_SETTLE_SECS)).await;

        if self.is_logged_in(&page).await {
            info!("Already logged in");
            return Ok(());
        }

        info!("Navigating to login page...");
        page.goto(self.config.login_url.as_str())
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        gate.wait_for_login(&self.config.login_url).await?;

        info!("Login successful");
        Ok(())
    }

    async fn fetch(&mut self, target_url: &str) -> Result<BatchReport, ScraperError> {
        let page = self.get_page()?.clone();
        info!("Crawling {}", target_url);

        page.goto(target_url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;
        sleep(Duration::from_secs(PAGE_SETTLE_SECS)).await;

        let tab_count = find_tabs(&page).await?.len();
        if tab_count == 0 {
            warn!("No recommendation tabs found on {}", target_url);
        }

        let mut report = BatchReport::new();
        for index in 0..tab_count {
            info!("Switching to tab {}...", index + 1);

            let (label, result) = self.scrape_tab(&page, index).await;
            if let Err(e) = &result {
                warn!("Error processing tab {}: {}", index + 1, e);
                if self.config.debug {
                    self.debug_screenshot(&page, &format!("Tab {}", index + 1))
                        .await;
                }
            }
            report.push(tab_outcome(index, label, result));
        }

        info!(
            "Crawl finished: {} tabs ok, {} failed, {} records",
            report.succeeded_count(),
            report.failed_count(),
            report.records().len()
        );
        Ok(report)
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Failed to close browser: {}", e);
            }
        }
        if let Some(handle) = self.handler.take() {
            handle.abort();
        }

        info!("Browser closed");
        Ok(())
    }
}
