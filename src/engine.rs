//! Routes a parsed request to the right rate and applies smart rounding.

use crate::core::{CurrencyClass, CurrencyCode, FxError, ResolutionTrace};
use crate::providers::RateGateway;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

/// Provider label for conversions that never leave the process.
pub const IDENTITY_PROVIDER: &str = "identity (same currency)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub amount: f64,
    pub source: CurrencyCode,
    pub destination: CurrencyCode,
    /// `1 source = rate destination`.
    pub rate: f64,
    pub converted_amount: f64,
    pub provider: String,
    pub timestamp: DateTime<Utc>,
    pub normalized_query: String,
}

/// Rounds to between 2 and 6 decimals, more for small magnitudes.
pub fn smart_round(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return if value.is_finite() { 0.0 } else { value };
    }
    let magnitude = (value.abs().log10().floor() as i32).clamp(-6, 6);
    let decimals = (6 - magnitude).clamp(2, 6) as usize;
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

enum Route {
    Identity,
    CryptoToFiat,
    FiatToCrypto,
    FiatToFiat,
}

fn route(source: &CurrencyCode, destination: &CurrencyCode) -> Result<Route, FxError> {
    if source == destination {
        return Ok(Route::Identity);
    }
    match (source.class(), destination.class()) {
        (CurrencyClass::Crypto, CurrencyClass::Fiat) => Ok(Route::CryptoToFiat),
        (CurrencyClass::Fiat, CurrencyClass::Crypto) => Ok(Route::FiatToCrypto),
        (CurrencyClass::Fiat, CurrencyClass::Fiat) => Ok(Route::FiatToFiat),
        // One crypto asset only, so crypto/crypto is always the identity.
        (CurrencyClass::Crypto, CurrencyClass::Crypto) => Ok(Route::Identity),
        _ => Err(FxError::UnsupportedCurrencyPair {
            from: source.to_string(),
            to: destination.to_string(),
        }),
    }
}

pub struct ConversionEngine {
    gateway: RateGateway,
    default_currency: CurrencyCode,
}

impl ConversionEngine {
    pub fn new(gateway: RateGateway, default_currency: CurrencyCode) -> Self {
        ConversionEngine {
            gateway,
            default_currency,
        }
    }

    /// Without a destination, crypto is quoted in USD and fiat in the
    /// configured default.
    #[instrument(name = "Convert", skip(self, trace))]
    pub async fn convert(
        &self,
        amount: f64,
        source: &CurrencyCode,
        destination: Option<&CurrencyCode>,
        trace: &mut ResolutionTrace,
    ) -> Result<ConversionResult, FxError> {
        let destination = match destination {
            Some(code) => code.clone(),
            None => {
                let code = if source.is_crypto() {
                    CurrencyCode::usd()
                } else {
                    self.default_currency.clone()
                };
                trace.record(format!("No destination given; defaulting to {code}"));
                code
            }
        };
        trace.record(format!(
            "Performing conversion amount={amount} src={source} dst={destination}"
        ));

        let (rate, provider) = match route(source, &destination)? {
            Route::Identity => (1.0, IDENTITY_PROVIDER.to_string()),
            Route::CryptoToFiat => (
                self.gateway.crypto_rate(&destination, trace).await?,
                self.gateway.crypto_provider_name().to_string(),
            ),
            Route::FiatToCrypto => {
                let price = self.gateway.crypto_rate(source, trace).await?;
                trace.record(format!("Inverting {destination} price: 1 / {price}"));
                (1.0 / price, self.gateway.crypto_provider_name().to_string())
            }
            Route::FiatToFiat => (
                self.gateway.fiat_rate(source, &destination, trace).await?,
                self.gateway.fiat_provider_name().to_string(),
            ),
        };

        let converted_amount = smart_round(rate * amount);
        debug!(rate, converted_amount, %provider, "Converted");
        trace.record(format!(
            "Result: {amount} {source} = {converted_amount} {destination} via {provider}"
        ));

        Ok(ConversionResult {
            amount,
            normalized_query: format!("{amount} {source} -> {destination}"),
            source: source.clone(),
            destination,
            rate,
            converted_amount,
            provider,
            timestamp: Utc::now(),
        })
    }
}
