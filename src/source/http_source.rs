use crate::common::config::SourceConfig;
use crate::common::error::{BotError, ConfigError};
use crate::common::ts::PriceSource;
use crate::models::PriceQuote;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// 通过 HTTP 轮询 JSON 接口获取当前价格
///
/// 响应示例：`{"price": "1.08345", "pair": "EUR/USD (OTC)"}`，
/// 价格可以是数字或数字字符串。
#[derive(Debug, Clone)]
pub struct HttpPriceSource {
    client: Client,
    url: String,
    pair: Option<String>,
    price_field: String,
    pair_field: String,
}

impl HttpPriceSource {
    pub fn new(config: &SourceConfig) -> Result<Self, BotError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigError::InvalidValue(format!("source http client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            pair: config.pair.clone(),
            price_field: config.price_field.clone(),
            pair_field: config.pair_field.clone(),
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch(&self) -> Result<PriceQuote, BotError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| BotError::SampleUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::SampleUnavailable(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BotError::SampleUnavailable(format!("invalid JSON: {}", e)))?;

        parse_quote(&body, &self.price_field, &self.pair_field, self.pair.as_deref())
    }
}

/// 从 JSON 响应中解析报价
pub fn parse_quote(
    body: &Value,
    price_field: &str,
    pair_field: &str,
    fixed_pair: Option<&str>,
) -> Result<PriceQuote, BotError> {
    let price = match body.get(price_field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .ok_or_else(|| BotError::SampleUnavailable(format!("missing or invalid '{}'", price_field)))?;

    if !price.is_finite() {
        return Err(BotError::SampleUnavailable(format!("non-finite price {}", price)));
    }

    let pair = match fixed_pair {
        Some(pair) => pair.to_string(),
        None => body
            .get(pair_field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| BotError::SampleUnavailable(format!("missing '{}'", pair_field)))?,
    };

    Ok(PriceQuote::new(price, pair))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numeric_and_string_price() {
        let quote = parse_quote(&json!({"price": 1.2345, "pair": "EUR/USD"}), "price", "pair", None).unwrap();
        assert_eq!(quote, PriceQuote::new(1.2345, "EUR/USD"));

        let quote = parse_quote(&json!({"price": " 64000.5 ", "pair": " BTC/USD "}), "price", "pair", None).unwrap();
        assert_eq!(quote, PriceQuote::new(64000.5, "BTC/USD"));
    }

    #[test]
    fn test_fixed_pair_overrides_body() {
        let quote = parse_quote(&json!({"last": 2.5}), "last", "pair", Some("EUR/GBP")).unwrap();
        assert_eq!(quote, PriceQuote::new(2.5, "EUR/GBP"));
    }

    #[test]
    fn test_invalid_samples() {
        for body in [
            json!({"pair": "EUR/USD"}),
            json!({"price": "n/a", "pair": "EUR/USD"}),
            json!({"price": "NaN", "pair": "EUR/USD"}),
            json!({"price": 1.0}),
            json!({"price": 1.0, "pair": "   "}),
        ] {
            assert!(
                matches!(parse_quote(&body, "price", "pair", None), Err(BotError::SampleUnavailable(_))),
                "{}",
                body
            );
        }
    }
}
