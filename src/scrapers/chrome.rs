//! Chrome/Chromium session driven over the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::handler::HandlerConfig;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::{BrowserOptions, Config};
use crate::errors::{DriverError, Result, ScraperError};
use crate::scrapers::base::{DriverResult, PageDriver};

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/opt/google/chrome/google-chrome",
];

const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

fn find_chrome() -> Result<PathBuf> {
    for path in CHROME_PATHS {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in CHROME_COMMANDS {
        if let Ok(output) = std::process::Command::new("which").arg(cmd).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    info!("Found Chrome in PATH: {}", path);
                    return Ok(PathBuf::from(path));
                }
            }
        }
    }

    Err(ScraperError::BrowserError(
        "Chrome/Chromium not found, install it or pass --chrome <path>".to_string(),
    ))
}

fn spawn_handler(mut handler: chromiumoxide::Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if event.is_err() {
                break;
            }
        }
    })
}

/// A single browser tab used for every request of a run.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    // 远程浏览器不归本进程所有，退出时只关闭标签页
    remote: bool,
    navigation_timeout: Duration,
    poll_interval: Duration,
}

impl ChromeDriver {
    /// Launches a local browser, or attaches to `remote_url` when configured.
    pub async fn start(config: &Config) -> Result<Self> {
        let (browser, handler, remote) = match config.browser.remote_url.as_deref() {
            Some(url) => {
                let (browser, handler) = Self::connect_remote(url, config.page_timeout).await?;
                (browser, handler, true)
            }
            None => {
                let (browser, handler) = Self::launch_local(&config.browser).await?;
                (browser, handler, false)
            }
        };

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                handler.abort();
                return Err(ScraperError::BrowserError(format!("Failed to open tab: {}", e)));
            }
        };

        Ok(Self {
            browser,
            page,
            handler,
            remote,
            navigation_timeout: config.page_timeout,
            poll_interval: config.poll_interval,
        })
    }

    async fn launch_local(options: &BrowserOptions) -> Result<(Browser, JoinHandle<()>)> {
        info!("Launching browser (headless={})", options.headless);

        let chrome_path = match &options.chrome_executable {
            Some(path) => path.clone(),
            None => find_chrome()?,
        };

        let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);
        if !options.headless {
            builder = builder.with_head();
        }
        for arg in options.launch_args() {
            builder = builder.arg(arg);
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserError(format!("Failed to build browser config: {}", e)))?;

        let (browser, handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserError(format!("Failed to launch browser: {}", e)))?;

        Ok((browser, spawn_handler(handler)))
    }

    async fn connect_remote(url: &str, timeout: Duration) -> Result<(Browser, JoinHandle<()>)> {
        info!("Connecting to remote browser at {}", url);

        // 通过 /json/version 获取 WebSocket 地址
        let http_url = url
            .replace("ws://", "http://")
            .replace("wss://", "https://");
        let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await?
            .json()
            .await?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ScraperError::BrowserError(format!("No webSocketDebuggerUrl in {}", version_url))
            })?;
        debug!("Connecting to WebSocket: {}", ws_url);

        let handler_config = HandlerConfig {
            request_timeout: timeout,
            ..Default::default()
        };

        let (browser, handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| ScraperError::BrowserError(format!("Failed to connect to remote browser: {}", e)))?;

        Ok((browser, spawn_handler(handler)))
    }

    async fn element_exists(&self, selector: &str) -> DriverResult<bool> {
        let literal = serde_json::to_string(selector).map_err(|e| DriverError(e.to_string()))?;
        let script = format!("document.querySelector({}) !== null", literal);
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| DriverError(e.to_string()))?;
        result
            .into_value::<bool>()
            .map_err(|e| DriverError(e.to_string()))
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        debug!("Navigating to {}", url);
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| {
                DriverError(format!(
                    "Navigation timed out after {:?} for {}",
                    self.navigation_timeout, url
                ))
            })?
            .map_err(|e| DriverError(format!("Navigation failed for {}: {}", url, e)))?;
        Ok(())
    }

    async fn current_location(&mut self) -> DriverResult<String> {
        self.page
            .url()
            .await
            .map_err(|e| DriverError(e.to_string()))?
            .ok_or_else(|| DriverError::from("page has no URL"))
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> DriverResult<bool> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, self.element_exists(selector)).await {
                Ok(Ok(true)) => return Ok(true),
                Ok(Ok(false)) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => return Ok(false),
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(self.poll_interval.min(remaining)).await;
        }
    }

    async fn page_source(&mut self) -> DriverResult<String> {
        self.page
            .content()
            .await
            .map_err(|e| DriverError(e.to_string()))
    }

    async fn quit(&mut self) -> DriverResult<()> {
        let result = if self.remote {
            self.page
                .clone()
                .close()
                .await
                .map_err(|e| DriverError(format!("Failed to close tab: {}", e)))
        } else {
            match self.browser.close().await {
                Ok(_) => {
                    if let Err(e) = self.browser.wait().await {
                        warn!("Browser process did not exit cleanly: {}", e);
                    }
                    Ok(())
                }
                Err(e) => Err(DriverError(format!("Failed to close browser: {}", e))),
            }
        };
        self.handler.abort();
        info!("Browser session closed");
        result
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
