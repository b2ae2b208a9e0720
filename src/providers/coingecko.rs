use crate::core::error::pair_label;
use crate::core::{CryptoAsset, CryptoPriceProvider, CurrencyCode, FxError, ResolutionTrace};
use crate::providers::util::{build_client, get_json};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

const PROVIDER: &str = "CoinGecko";

pub struct CoinGeckoProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        CoinGeckoProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout),
        }
    }
}

// {"bitcoin": {"thb": 2134567.0}}
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[async_trait]
impl CryptoPriceProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    #[instrument(name = "CryptoSpotFetch", skip(self, trace), fields(asset = asset.code))]
    async fn spot_price(
        &self,
        asset: &CryptoAsset,
        vs_currency: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<f64, FxError> {
        let pair = pair_label(asset.code, vs_currency.as_str());
        let vs = vs_currency.as_str().to_lowercase();
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, asset.provider_id, vs
        );

        let data: SimplePriceResponse =
            get_json(&self.client, &url, &url, PROVIDER, &pair, trace).await?;

        data.get(asset.provider_id)
            .and_then(|prices| prices.get(&vs))
            .copied()
            .ok_or_else(|| {
                trace.record(format!("{PROVIDER}: no {pair} price in response"));
                FxError::format(PROVIDER, &pair, format!("no {pair} price in response"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BITCOIN;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount(server: &MockServer, vs: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "bitcoin"))
            .and(query_param("vs_currencies", vs))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_successful_spot_price() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "thb", 200, r#"{"bitcoin": {"thb": 2100000.5}}"#).await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let mut trace = ResolutionTrace::new();
        let price = provider
            .spot_price(&BITCOIN, &CurrencyCode::new("THB"), &mut trace)
            .await
            .expect("Failed to fetch price");
        assert_eq!(price, 2100000.5);
        assert!(trace.contains("vs_currencies=thb"));
    }

    #[tokio::test]
    async fn test_missing_pair_is_format_error() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "xyz", 200, r#"{"bitcoin": {}}"#).await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let mut trace = ResolutionTrace::new();
        let err = provider
            .spot_price(&BITCOIN, &CurrencyCode::new("XYZ"), &mut trace)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            FxError::ProviderFormat {
                provider: "CoinGecko".to_string(),
                pair: "BTC->XYZ".to_string(),
                message: "no BTC->XYZ price in response".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_rate_limited_is_unavailable() {
        let mock_server = MockServer::start().await;
        mount(&mock_server, "usd", 429, "").await;

        let provider = CoinGeckoProvider::new(&mock_server.uri(), Duration::from_secs(5));
        let mut trace = ResolutionTrace::new();
        let err = provider
            .spot_price(&BITCOIN, &CurrencyCode::usd(), &mut trace)
            .await
            .unwrap_err();
        assert!(matches!(err, FxError::ProviderUnavailable { .. }));
        assert!(err.to_string().contains("429"));
    }
}
