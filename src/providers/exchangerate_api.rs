use crate::core::error::pair_label;
use crate::core::{CurrencyCode, FiatQuote, FiatRateProvider, FxError, QuoteShape, ResolutionTrace};
use crate::providers::util::{build_client, get_json};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

const PROVIDER: &str = "ExchangeRate-API";

/// Keyed fiat backend: the API key is part of the URL path and each call
/// prices exactly one pair.
pub struct ExchangeRateApiProvider {
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    client: reqwest::Client,
}

impl ExchangeRateApiProvider {
    /// `api_key` is whatever was found at startup; a missing key only fails
    /// once a rate is actually requested.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        api_key_env: &str,
        timeout: Duration,
    ) -> Self {
        ExchangeRateApiProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_key_env: api_key_env.to_string(),
            client: build_client(timeout),
        }
    }

    /// Reads the key from `api_key_env` once.
    pub fn from_env(base_url: &str, api_key_env: &str, timeout: Duration) -> Self {
        let api_key = std::env::var(api_key_env).ok();
        Self::new(base_url, api_key, api_key_env, timeout)
    }
}

#[derive(Debug, Deserialize)]
struct PairResponse {
    result: Option<String>,
    conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

#[async_trait]
impl FiatRateProvider for ExchangeRateApiProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn shape(&self) -> QuoteShape {
        QuoteShape::Pair
    }

    #[instrument(name = "FiatPairFetch", skip(self, trace))]
    async fn fetch(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<FiatQuote, FxError> {
        let pair = pair_label(base.as_str(), target.as_str());
        let Some(api_key) = self.api_key.as_deref() else {
            trace.record(format!("No API key in ${}", self.api_key_env));
            return Err(FxError::MissingCredential {
                provider: PROVIDER.to_string(),
                variable: self.api_key_env.clone(),
                pair,
            });
        };

        let path = format!("pair/{base}/{target}");
        let url = format!("{}/{}/{}", self.base_url, api_key, path);
        let shown_url = format!("{}/***/{}", self.base_url, path);

        let data: PairResponse =
            get_json(&self.client, &url, &shown_url, PROVIDER, &pair, trace).await?;

        if data.result.as_deref() != Some("success") {
            let error_type = data.error_type.unwrap_or_else(|| "unknown".to_string());
            trace.record(format!("{PROVIDER} error: {error_type}"));
            return Err(match error_type.as_str() {
                "unsupported-code" => FxError::UnsupportedCurrency(target.to_string()),
                "malformed-request" => FxError::format(PROVIDER, &pair, error_type),
                _ => FxError::unavailable(PROVIDER, &pair, error_type),
            });
        }

        data.conversion_rate
            .map(FiatQuote::Pair)
            .ok_or_else(|| FxError::format(PROVIDER, &pair, "no `conversion_rate` in response"))
    }
}
