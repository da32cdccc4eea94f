use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One stock to scrape, built from a single input row.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StockRequest {
    #[serde(deserialize_with = "non_blank")]
    company_name: String,
    #[serde(deserialize_with = "non_blank")]
    stock_code: String,
}

// 空单元格视为缺失值
fn non_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = String::deserialize(deserializer)?;
    if value.trim().is_empty() {
        return Err(D::Error::custom("value must not be blank"));
    }
    Ok(value)
}

impl StockRequest {
    pub fn new(company_name: &str, stock_code: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            stock_code: stock_code.to_string(),
        }
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn stock_code(&self) -> &str {
        &self.stock_code
    }
}

/// Price and last-update time read from a stock page.
#[derive(Debug, Clone, PartialEq)]
pub struct StockQuote {
    pub value: f64,
    /// Kept exactly as the site displays it, e.g. `14.09.25 13:03:33 BST`.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeOutcome {
    Success(StockQuote),
    Failed,
}

/// Result row for one request: identity plus either a quote or nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct StockResponse {
    request: StockRequest,
    outcome: ScrapeOutcome,
}

impl StockResponse {
    pub fn success(request: StockRequest, quote: StockQuote) -> Self {
        Self {
            request,
            outcome: ScrapeOutcome::Success(quote),
        }
    }

    pub fn failed(request: StockRequest) -> Self {
        Self {
            request,
            outcome: ScrapeOutcome::Failed,
        }
    }

    pub fn company_name(&self) -> &str {
        self.request.company_name()
    }

    pub fn stock_code(&self) -> &str {
        self.request.stock_code()
    }

    pub fn outcome(&self) -> &ScrapeOutcome {
        &self.outcome
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ScrapeOutcome::Success(_))
    }

    pub fn timestamp(&self) -> Option<&str> {
        match &self.outcome {
            ScrapeOutcome::Success(quote) => Some(&quote.timestamp),
            ScrapeOutcome::Failed => None,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match &self.outcome {
            ScrapeOutcome::Success(quote) => Some(quote.value),
            ScrapeOutcome::Failed => None,
        }
    }
}

// 输出时展开为固定的四列：company_name, stock_code, timestamp, value
impl Serialize for StockResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut record = serializer.serialize_struct("StockResponse", 4)?;
        record.serialize_field("company_name", self.company_name())?;
        record.serialize_field("stock_code", self.stock_code())?;
        record.serialize_field("timestamp", &self.timestamp())?;
        record.serialize_field("value", &self.value())?;
        record.end()
    }
}
