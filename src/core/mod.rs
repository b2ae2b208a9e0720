//! Core abstractions shared by the parser, gateway and engine

pub mod cache;
pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod rate;
pub mod trace;

// Re-export main types for cleaner imports
pub use currency::{BITCOIN, CryptoAsset, CurrencyClass, CurrencyCode};
pub use error::FxError;
pub use rate::{CryptoPriceProvider, FiatQuote, FiatRateProvider, QuoteShape, RateTable};
pub use trace::ResolutionTrace;
