use log::debug;
use std::fmt;
use std::time::Duration;

use crate::config::Config;
use crate::errors::PageLoadError;
use crate::scrapers::base::PageDriver;

/// Progress of a single page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationState {
    Idle,
    Navigating,
    Loaded,
    Verified,
    Ready,
    Redirected,
    TimedOut,
    Failed,
}

impl NavigationState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NavigationState::Ready
                | NavigationState::Redirected
                | NavigationState::TimedOut
                | NavigationState::Failed
        )
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A stock page that passed redirect and content checks.
#[derive(Debug, Clone)]
pub struct LoadedPage {
    pub url: String,
    pub html: String,
}

/// Drives a [`PageDriver`] from a URL to a page whose ticker container is present.
pub struct PageNavigator {
    explorer_url: String,
    scope_selector: String,
    timeout: Duration,
}

struct Transition<'a> {
    url: &'a str,
    state: NavigationState,
}

impl<'a> Transition<'a> {
    fn new(url: &'a str) -> Self {
        Self {
            url,
            state: NavigationState::Idle,
        }
    }

    fn advance(&mut self, next: NavigationState) {
        debug_assert!(!self.state.is_terminal(), "{} already finished", self.url);
        debug!("{}: {} -> {}", self.url, self.state, next);
        self.state = next;
    }
}

fn same_location(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}

impl PageNavigator {
    pub fn new(config: &Config) -> Self {
        Self {
            explorer_url: config.site.explorer_url.clone(),
            scope_selector: config.selectors.scope_selector(),
            timeout: config.page_timeout,
        }
    }

    /// Loads `url` and returns the page once the ticker container exists.
    ///
    /// Every failure, including browser transport errors, comes back as a
    /// [`PageLoadError`] so callers can skip the stock and keep going.
    pub async fn load<D>(&self, driver: &mut D, url: &str) -> Result<LoadedPage, PageLoadError>
    where
        D: PageDriver + ?Sized,
    {
        let mut transition = Transition::new(url);

        transition.advance(NavigationState::Navigating);
        if let Err(e) = driver.navigate(url).await {
            transition.advance(NavigationState::Failed);
            return Err(transport(url, e));
        }
        transition.advance(NavigationState::Loaded);

        let location = match driver.current_location().await {
            Ok(location) => location,
            Err(e) => {
                transition.advance(NavigationState::Failed);
                return Err(transport(url, e));
            }
        };
        // 无效代码不会返回错误状态码，而是静默跳转到价格浏览页
        if same_location(&location, &self.explorer_url) {
            transition.advance(NavigationState::Redirected);
            return Err(PageLoadError::Redirected {
                url: url.to_string(),
            });
        }
        transition.advance(NavigationState::Verified);

        // 页面数据由脚本异步渲染，需要等待容器元素出现
        match driver.wait_for(&self.scope_selector, self.timeout).await {
            Ok(true) => {}
            Ok(false) => {
                transition.advance(NavigationState::TimedOut);
                return Err(PageLoadError::TimedOut {
                    url: url.to_string(),
                    timeout: self.timeout,
                });
            }
            Err(e) => {
                transition.advance(NavigationState::Failed);
                return Err(transport(url, e));
            }
        }

        let html = match driver.page_source().await {
            Ok(html) => html,
            Err(e) => {
                transition.advance(NavigationState::Failed);
                return Err(transport(url, e));
            }
        };
        transition.advance(NavigationState::Ready);

        Ok(LoadedPage {
            url: url.to_string(),
            html,
        })
    }
}

fn transport(url: &str, e: impl fmt::Display) -> PageLoadError {
    PageLoadError::Transport {
        url: url.to_string(),
        reason: e.to_string(),
    }
}
