//! Single entry point for the surrounding agent: raw text in, a display
//! block (or a failure) and that query's trace out.

use crate::core::config::AppConfig;
use crate::core::{CurrencyCode, FxError, ResolutionTrace};
use crate::engine::{ConversionEngine, ConversionResult};
use crate::format::format_conversion;
use crate::parser::{self, QueryParser};
use crate::providers::{self, RateGateway};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Converted {
        result: ConversionResult,
        display: String,
    },
    /// Nothing in the text looked like a conversion request.
    NoIntent,
}

#[derive(Debug)]
pub struct ToolReply {
    pub outcome: Result<ToolOutcome, FxError>,
    pub trace: ResolutionTrace,
}

impl ToolReply {
    pub fn trace(&self) -> &ResolutionTrace {
        &self.trace
    }

    pub fn display(&self) -> Option<&str> {
        match &self.outcome {
            Ok(ToolOutcome::Converted { display, .. }) => Some(display),
            _ => None,
        }
    }
}

pub struct CurrencyTool {
    parser: QueryParser,
    engine: ConversionEngine,
}

impl CurrencyTool {
    pub fn new(gateway: RateGateway, default_currency: CurrencyCode) -> Self {
        CurrencyTool {
            parser: QueryParser::new(default_currency.clone()),
            engine: ConversionEngine::new(gateway, default_currency),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(providers::gateway(config), config.default_currency.clone())
    }

    pub fn should_attempt(text: &str) -> bool {
        parser::should_attempt_parse(text)
    }

    /// Parses, converts and formats one query. Each reply owns its trace.
    pub async fn handle(&self, text: &str) -> ToolReply {
        let mut trace = ResolutionTrace::new();
        let Some(intent) = self.parser.parse(text, &mut trace) else {
            return ToolReply {
                outcome: Ok(ToolOutcome::NoIntent),
                trace,
            };
        };

        let outcome = match self
            .engine
            .convert(
                intent.amount,
                &intent.source,
                intent.destination.as_ref(),
                &mut trace,
            )
            .await
        {
            Ok(result) => {
                info!(query = %result.normalized_query, "Conversion complete");
                let display = format_conversion(&result);
                Ok(ToolOutcome::Converted { result, display })
            }
            Err(e) => {
                warn!(error = %e, "Conversion failed");
                trace.record(format!("Conversion failed: {e}"));
                Err(e)
            }
        };
        ToolReply { outcome, trace }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::coingecko::CoinGeckoProvider;
    use crate::providers::exchangerate_host::ExchangeRateHostProvider;
    use crate::providers::gateway::DEFAULT_TTL;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tool(server: &MockServer) -> CurrencyTool {
        let timeout = Duration::from_secs(5);
        CurrencyTool::new(
            RateGateway::new(
                Arc::new(ExchangeRateHostProvider::new(&server.uri(), timeout)),
                Arc::new(CoinGeckoProvider::new(&server.uri(), timeout)),
                DEFAULT_TTL,
            ),
            CurrencyCode::new("THB"),
        )
    }

    #[tokio::test]
    async fn test_no_intent_makes_no_requests() {
        let mock_server = MockServer::start().await;
        let reply = tool(&mock_server).handle("hello, how are you?").await;

        assert_eq!(reply.outcome, Ok(ToolOutcome::NoIntent));
        assert!(reply.display().is_none());
        assert!(reply.trace().contains("No currency pattern matched."));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bitcoin_rate_uses_default_currency() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("vs_currencies", "thb"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"bitcoin": {"thb": 2000000}}"#),
            )
            .mount(&mock_server)
            .await;

        let reply = tool(&mock_server)
            .handle("what is the exchange rate for bitcoin")
            .await;
        let display = reply.display().expect("Expected a display block");
        assert!(display.contains("- Rate: 1 BTC = 2000000 THB"));
        assert!(display.contains("- Source: CoinGecko · "));
        assert!(reply.trace().contains("Rule 'rate for' matched"));
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces_with_trace() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let reply = tool(&mock_server).handle("convert 10 usd to eur").await;
        assert!(matches!(
            reply.outcome,
            Err(FxError::ProviderUnavailable { .. })
        ));
        assert!(reply.trace().contains("GET "));
        assert!(reply.trace().contains("Conversion failed"));
    }

    #[test]
    fn test_should_attempt() {
        assert!(CurrencyTool::should_attempt("100 usd to eur"));
        assert!(!CurrencyTool::should_attempt("good morning"));
    }
}
