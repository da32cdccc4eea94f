use crate::config::Config;
use crate::errors::{Result, ScrapeFailure, ScraperError};
use crate::models::stock::{StockQuote, StockRequest, StockResponse};
use crate::scrapers::base::PageDriver;
use crate::scrapers::extractor::FieldExtractor;
use crate::scrapers::navigator::PageNavigator;
use crate::util;
use log::{error, info, warn};

/// 抓取服务，按顺序处理每个请求并负责关闭浏览器
pub struct ScrapeService<D: PageDriver> {
    config: Config,
    driver: D,
    navigator: PageNavigator,
    extractor: FieldExtractor,
}

impl<D: PageDriver> ScrapeService<D> {
    /// 创建新的抓取服务实例，服务接管浏览器会话
    pub fn new(config: Config, driver: D) -> Result<Self> {
        let navigator = PageNavigator::new(&config);
        let extractor = FieldExtractor::new(&config.selectors)?;
        Ok(Self {
            config,
            driver,
            navigator,
            extractor,
        })
    }

    /// Scrapes every request in order and closes the browser once afterwards.
    ///
    /// Page-load and extraction failures turn into empty responses, so the
    /// result always has one entry per request, in request order. Only a
    /// failure to close the browser is returned as an error.
    pub async fn scrape(mut self, requests: &[StockRequest]) -> Result<Vec<StockResponse>> {
        let mut responses = Vec::with_capacity(requests.len());

        for request in requests {
            let url = util::build_stock_url(&self.config.site, request);

            let response = match self.scrape_one(&url).await {
                Ok(quote) => {
                    info!(
                        "{} ({}): {} as at {}",
                        request.company_name(),
                        request.stock_code(),
                        quote.value,
                        quote.timestamp
                    );
                    StockResponse::success(request.clone(), quote)
                }
                Err(ScrapeFailure::PageLoad(e)) => {
                    error!(
                        "Error loading page for {} at {}: {} - no data retrieved",
                        request.stock_code(),
                        url,
                        e
                    );
                    StockResponse::failed(request.clone())
                }
                Err(ScrapeFailure::Extraction(e)) => {
                    error!(
                        "Error scraping data for {} at {}: {} - page structure may have changed",
                        request.stock_code(),
                        url,
                        e
                    );
                    StockResponse::failed(request.clone())
                }
            };
            responses.push(response);
        }

        let failed = responses.iter().filter(|r| !r.is_success()).count();
        if failed > 0 {
            warn!("{} of {} stocks could not be scraped", failed, responses.len());
        }
        info!(
            "Scraped {} of {} stocks",
            responses.len() - failed,
            responses.len()
        );

        self.driver
            .quit()
            .await
            .map_err(|e| ScraperError::BrowserError(e.to_string()))?;

        Ok(responses)
    }

    async fn scrape_one(&mut self, url: &str) -> std::result::Result<StockQuote, ScrapeFailure> {
        let page = self.navigator.load(&mut self.driver, url).await?;
        let quote = self.extractor.extract(&page.html)?;
        Ok(quote)
    }
}
