//! Failure taxonomy shared by the gateway, providers and conversion engine.
//!
//! A query that simply contains no conversion intent is not an error: the
//! parser returns `None` for it. Everything here is a real failure that the
//! caller should surface instead of inventing a rate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// A currency code that no provider could resolve, even after
    /// triangulating through USD.
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Neither leg is a known fiat code or the supported crypto asset.
    #[error("Unsupported currency pair: {from}->{to}")]
    UnsupportedCurrencyPair { from: String, to: String },

    /// Transport failure, timeout or non-2xx status.
    #[error("{provider} unavailable for {pair}: {message}")]
    ProviderUnavailable {
        provider: String,
        pair: String,
        message: String,
    },

    /// The provider answered, but not in the shape we expected.
    #[error("{provider} returned an unexpected response for {pair}: {message}")]
    ProviderFormat {
        provider: String,
        pair: String,
        message: String,
    },

    #[error("{provider} requires an API key in ${variable} (needed for {pair})")]
    MissingCredential {
        provider: String,
        variable: String,
        pair: String,
    },
}

impl FxError {
    pub fn unavailable(provider: &str, pair: &str, message: impl ToString) -> Self {
        FxError::ProviderUnavailable {
            provider: provider.to_string(),
            pair: pair.to_string(),
            message: message.to_string(),
        }
    }

    pub fn format(provider: &str, pair: &str, message: impl ToString) -> Self {
        FxError::ProviderFormat {
            provider: provider.to_string(),
            pair: pair.to_string(),
            message: message.to_string(),
        }
    }
}

/// Renders an attempted pair the way errors and trace lines print it.
pub fn pair_label(from: &str, to: &str) -> String {
    format!("{from}->{to}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_provider_and_pair() {
        let err = FxError::unavailable("CoinGecko", "BTC->THB", "HTTP 500");
        assert_eq!(
            err.to_string(),
            "CoinGecko unavailable for BTC->THB: HTTP 500"
        );

        let err = FxError::MissingCredential {
            provider: "ExchangeRate-API".to_string(),
            variable: "EXCHANGERATE_API_KEY".to_string(),
            pair: pair_label("USD", "EUR"),
        };
        assert!(err.to_string().contains("$EXCHANGERATE_API_KEY"));
        assert!(err.to_string().contains("USD->EUR"));
    }
}
