use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.londonstockexchange.com";
pub const STOCK_ENDPOINT: &str = "stock";
// 股票代码无效时网站会跳转到这个页面
pub const PRICE_EXPLORER_URL: &str =
    "https://www.londonstockexchange.com/live-markets/market-data-dashboard/price-explorer";

pub const STOCK_SCOPE_ID: &str = "ticker";
pub const PRICE_TAG_CLASS: &str = "price-tag";
pub const TIMESTAMP_ANCESTOR_CLASS: &str = "delay";
pub const TIMESTAMP_TAG_TYPE: &str = "span";

pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 10;
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Where the stock pages live and how to recognise the fallback page.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub base_url: String,
    pub stock_endpoint: String,
    pub explorer_url: String,
}

/// Element id / classes / tag used to locate the quote on a stock page.
#[derive(Debug, Clone)]
pub struct SelectorConfig {
    pub scope_id: String,
    pub price_class: String,
    pub timestamp_ancestor_class: String,
    pub timestamp_tag: String,
}

impl SelectorConfig {
    pub fn scope_selector(&self) -> String {
        format!("#{}", self.scope_id)
    }

    pub fn price_selector(&self) -> String {
        format!(".{}", self.price_class)
    }

    pub fn timestamp_ancestor_selector(&self) -> String {
        format!(".{}", self.timestamp_ancestor_class)
    }

    /// Full path of the timestamp element below the ticker container.
    pub fn timestamp_selector(&self) -> String {
        format!("{} {}", self.timestamp_ancestor_selector(), self.timestamp_tag)
    }
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    /// DevTools endpoint of an already running browser, e.g. `http://localhost:9222`.
    pub remote_url: Option<String>,
    pub extra_args: Vec<String>,
}

impl BrowserOptions {
    /// Startup flags passed to a locally launched browser.
    pub fn launch_args(&self) -> Vec<String> {
        let mut args = vec![
            "--disable-popup-blocking".to_string(),
            "--disable-extensions".to_string(),
        ];

        if cfg!(target_os = "linux") {
            args.push("--disable-dev-shm-usage".to_string());
            args.push("--no-sandbox".to_string());
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }
}

pub struct Config {
    pub site: SiteConfig,
    pub selectors: SelectorConfig,
    pub browser: BrowserOptions,
    pub page_timeout: Duration,
    pub poll_interval: Duration,
}

impl Config {
    pub fn new() -> Self {
        Self {
            site: SiteConfig {
                base_url: BASE_URL.to_string(),
                stock_endpoint: STOCK_ENDPOINT.to_string(),
                explorer_url: PRICE_EXPLORER_URL.to_string(),
            },
            selectors: SelectorConfig {
                scope_id: STOCK_SCOPE_ID.to_string(),
                price_class: PRICE_TAG_CLASS.to_string(),
                timestamp_ancestor_class: TIMESTAMP_ANCESTOR_CLASS.to_string(),
                timestamp_tag: TIMESTAMP_TAG_TYPE.to_string(),
            },
            browser: BrowserOptions {
                headless: true,
                chrome_executable: None,
                remote_url: None,
                extra_args: Vec::new(),
            },
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(250),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.site.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_explorer_url(mut self, explorer_url: &str) -> Self {
        self.site.explorer_url = explorer_url.to_string();
        self
    }

    pub fn with_page_timeout(mut self, timeout: Duration) -> Self {
        self.page_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    pub fn with_chrome_executable(mut self, path: PathBuf) -> Self {
        self.browser.chrome_executable = Some(path);
        self
    }

    pub fn with_remote_url(mut self, url: &str) -> Self {
        self.browser.remote_url = Some(url.to_string());
        self
    }

    pub fn with_browser_arg(mut self, arg: &str) -> Self {
        self.browser.extra_args.push(arg.to_string());
        self
    }
}
