use crate::errors::DriverError;
use async_trait::async_trait;
use std::time::Duration;

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Capabilities the scraper needs from a browser session
#[async_trait]
pub trait PageDriver: Send {
    /// Load `url` in the current tab and wait for the navigation to finish
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// URL the browser ended up on, after any redirects
    async fn current_location(&mut self) -> DriverResult<String>;

    /// Poll until an element matching `selector` exists.
    /// Returns `Ok(false)` when `timeout` elapses first.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> DriverResult<bool>;

    /// Serialized DOM of the current page
    async fn page_source(&mut self) -> DriverResult<String>;

    /// Shut the browser down and release the underlying process
    async fn quit(&mut self) -> DriverResult<()>;
}
