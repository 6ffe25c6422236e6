use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TARGET_URL: &str = "https://www.zhipin.com/web/geek/job-recommend";
pub const DEFAULT_USER_URL: &str = "https://www.zhipin.com/web/user";
pub const DEFAULT_LOGIN_URL: &str = "https://www.zhipin.com/web/user/?ka=header-login";
pub const DEFAULT_STORE_FILE: &str = "zhipin_jobs_all.csv";
pub const DEFAULT_SNAPSHOT_PREFIX: &str = "zhipin_jobs_new_";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.121 Safari/537.36";

/// 重複判定の方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupStrategy {
    /// 全フィールドの完全一致
    Exact,
    /// 空白を正規化した内容で比較
    #[default]
    Normalized,
}

impl FromStr for DedupStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" | "normalised" => Ok(Self::Normalized),
            other => Err(format!("unknown dedup strategy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub target_url: String,
    pub user_url: String,
    pub login_url: String,
    /// 全件ストア（CSV）
    pub store_path: PathBuf,
    /// 新着スナップショットの出力先
    pub output_dir: PathBuf,
    pub snapshot_prefix: String,
    pub headless: bool,
    pub chrome_path: Option<PathBuf>,
    pub user_agent: String,
    /// 遅延読み込みのためのスクロール回数
    pub scroll_rounds: u32,
    pub scroll_delay: Duration,
    pub tab_delay: Duration,
    pub timeout: Duration,
    pub dedup: DedupStrategy,
    pub debug: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            user_url: DEFAULT_USER_URL.to_string(),
            login_url: DEFAULT_LOGIN_URL.to_string(),
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            output_dir: PathBuf::from("."),
            snapshot_prefix: DEFAULT_SNAPSHOT_PREFIX.to_string(),
            headless: false,
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            scroll_rounds: 4,
            scroll_delay: Duration::from_secs(2),
            tab_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
            dedup: DedupStrategy::default(),
            debug: false,
        }
    }
}

impl ScraperConfig {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }

    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_snapshot_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.snapshot_prefix = prefix.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_path = Some(path.into());
        self
    }

    pub fn with_scroll_rounds(mut self, rounds: u32) -> Self {
        self.scroll_rounds = rounds;
        self
    }

    pub fn with_scroll_delay(mut self, delay: Duration) -> Self {
        self.scroll_delay = delay;
        self
    }

    pub fn with_tab_delay(mut self, delay: Duration) -> Self {
        self.tab_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupStrategy) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
