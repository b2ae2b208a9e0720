//! Rate provider abstractions

use crate::core::currency::{CryptoAsset, CurrencyCode};
use crate::core::error::FxError;
use crate::core::trace::ResolutionTrace;
use async_trait::async_trait;
use std::collections::HashMap;

/// Rates relative to one base currency: `1 base = table[code] code`.
pub type RateTable = HashMap<String, f64>;

/// What one fiat provider call returns.
#[derive(Debug, Clone, PartialEq)]
pub enum FiatQuote {
    /// Every supported code against the requested base.
    Table(RateTable),
    /// Only the requested pair.
    Pair(f64),
}

/// Whether a fiat backend answers with whole tables or single pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteShape {
    Table,
    Pair,
}

#[async_trait]
pub trait FiatRateProvider: Send + Sync {
    fn name(&self) -> &str;

    fn shape(&self) -> QuoteShape;

    /// Table-shaped backends may ignore `target`.
    async fn fetch(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<FiatQuote, FxError>;
}

#[async_trait]
pub trait CryptoPriceProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Unit price of `asset` in `vs_currency`.
    async fn spot_price(
        &self,
        asset: &CryptoAsset,
        vs_currency: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<f64, FxError>;
}
