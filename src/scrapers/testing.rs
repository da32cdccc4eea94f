//! In-memory browser for exercising the scraper without Chrome.
//!
//! Each `navigate` call consumes the next scripted [`FakePage`].

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::DriverError;
use crate::scrapers::base::{DriverResult, PageDriver};

/// Scripted response to one navigation.
#[derive(Debug, Clone)]
pub struct FakePage {
    /// Location reported after navigating; `None` means "stayed on the requested URL".
    pub location: Option<String>,
    pub html: String,
    pub navigation_error: Option<String>,
}

impl FakePage {
    pub fn stock(html: &str) -> Self {
        Self {
            location: None,
            html: html.to_string(),
            navigation_error: None,
        }
    }

    pub fn redirect(location: &str, html: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            html: html.to_string(),
            navigation_error: None,
        }
    }

    pub fn unreachable(reason: &str) -> Self {
        Self {
            location: None,
            html: String::new(),
            navigation_error: Some(reason.to_string()),
        }
    }
}

pub struct FakeDriver {
    pages: VecDeque<FakePage>,
    location: Option<String>,
    html: String,
    visited: Vec<String>,
    quit_calls: Arc<AtomicUsize>,
    quit_error: Option<String>,
}

impl FakeDriver {
    pub fn new(pages: Vec<FakePage>) -> Self {
        Self {
            pages: pages.into(),
            location: None,
            html: String::new(),
            visited: Vec::new(),
            quit_calls: Arc::new(AtomicUsize::new(0)),
            quit_error: None,
        }
    }

    /// Makes `quit` fail, as when the browser process cannot be shut down.
    pub fn with_quit_error(mut self, reason: &str) -> Self {
        self.quit_error = Some(reason.to_string());
        self
    }

    /// Shared counter of `quit` calls, readable after the driver is moved away.
    pub fn quit_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.quit_calls)
    }

    pub fn visited(&self) -> &[String] {
        &self.visited
    }
}

fn has_element(html: &str, css: &str) -> DriverResult<bool> {
    let selector = Selector::parse(css).map_err(|e| DriverError(e.to_string()))?;
    let document = Html::parse_document(html);
    let found = document.select(&selector).next().is_some();
    Ok(found)
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn navigate(&mut self, url: &str) -> DriverResult<()> {
        self.visited.push(url.to_string());
        let page = self
            .pages
            .pop_front()
            .ok_or_else(|| DriverError(format!("no scripted page for {}", url)))?;

        if let Some(reason) = page.navigation_error {
            return Err(DriverError(reason));
        }

        self.location = Some(page.location.unwrap_or_else(|| url.to_string()));
        self.html = page.html;
        Ok(())
    }

    async fn current_location(&mut self) -> DriverResult<String> {
        self.location
            .clone()
            .ok_or_else(|| DriverError::from("no page loaded"))
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> DriverResult<bool> {
        // 静态页面：元素要么已经存在，要么永远不会出现
        has_element(&self.html, selector)
    }

    async fn page_source(&mut self) -> DriverResult<String> {
        Ok(self.html.clone())
    }

    async fn quit(&mut self) -> DriverResult<()> {
        self.quit_calls.fetch_add(1, Ordering::SeqCst);
        match &self.quit_error {
            Some(reason) => Err(DriverError(reason.clone())),
            None => Ok(()),
        }
    }
}
