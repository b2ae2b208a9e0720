use crate::core::{FxError, ResolutionTrace};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Builds the client every provider shares: bounded wait, identifiable agent.
pub fn build_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("fxq/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {e}");
            reqwest::Client::new()
        })
}

/// Issues a single GET and decodes the JSON body.
///
/// Transport failures and non-2xx statuses become `ProviderUnavailable`;
/// a body that does not decode into `T` becomes `ProviderFormat`. The
/// request is logged to `trace` as `shown_url`, which callers use to keep
/// credentials out of diagnostics. No retries.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    shown_url: &str,
    provider: &str,
    pair: &str,
    trace: &mut ResolutionTrace,
) -> Result<T, FxError> {
    trace.record(format!("GET {shown_url}"));
    debug!("Requesting {} for {}", shown_url, pair);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FxError::unavailable(provider, pair, format!("Request error: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        trace.record(format!("{provider} answered HTTP {status}"));
        return Err(FxError::unavailable(
            provider,
            pair,
            format!("HTTP error: {status}"),
        ));
    }

    let text = response
        .text()
        .await
        .map_err(|e| FxError::unavailable(provider, pair, format!("Failed to read body: {e}")))?;

    serde_json::from_str(&text).map_err(|e| {
        trace.record(format!("{provider} response did not parse"));
        FxError::format(
            provider,
            pair,
            format!("Failed to parse JSON response: {e}"),
        )
    })
}
