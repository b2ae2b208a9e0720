use crate::core::error::pair_label;
use crate::core::{
    CurrencyCode, FiatQuote, FiatRateProvider, FxError, QuoteShape, RateTable, ResolutionTrace,
};
use crate::providers::util::{build_client, get_json};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const PROVIDER: &str = "exchangerate.host";

/// Keyless fiat backend: one call returns every rate against `base`.
pub struct ExchangeRateHostProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        ExchangeRateHostProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_client(timeout),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    success: Option<bool>,
    rates: Option<RateTable>,
}

#[async_trait]
impl FiatRateProvider for ExchangeRateHostProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn shape(&self) -> QuoteShape {
        QuoteShape::Table
    }

    #[instrument(name = "FiatTableFetch", skip(self, trace), fields(base = %base))]
    async fn fetch(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<FiatQuote, FxError> {
        let pair = pair_label(base.as_str(), target.as_str());
        let url = format!("{}/latest?base={}", self.base_url, base);

        let data: LatestRatesResponse =
            get_json(&self.client, &url, &url, PROVIDER, &pair, trace).await?;

        match data.rates {
            Some(rates) => {
                debug!("Received {} rates for base {}", rates.len(), base);
                Ok(FiatQuote::Table(rates))
            }
            None if data.success == Some(false) => Err(FxError::format(
                PROVIDER,
                &pair,
                "provider reported success=false without rates",
            )),
            None => Err(FxError::format(
                PROVIDER,
                &pair,
                "no `rates` mapping in response",
            )),
        }
    }
}
