pub mod coingecko;
pub mod exchangerate_api;
pub mod exchangerate_host;
pub mod gateway;
pub mod util;

pub use gateway::{RateGateway, RateKey};

use crate::core::config::{AppConfig, FiatBackend};
use crate::core::{CryptoPriceProvider, FiatRateProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Builds the fiat backend selected in config.
pub fn fiat_provider(config: &AppConfig) -> Arc<dyn FiatRateProvider> {
    let fiat = &config.providers.fiat;
    let timeout = Duration::from_secs(config.request_timeout_secs);
    debug!("Using fiat backend {:?} at {}", fiat.backend, fiat.base_url());
    match fiat.backend {
        FiatBackend::ExchangerateHost => Arc::new(
            exchangerate_host::ExchangeRateHostProvider::new(fiat.base_url(), timeout),
        ),
        FiatBackend::ExchangerateApi => Arc::new(exchangerate_api::ExchangeRateApiProvider::from_env(
            fiat.base_url(),
            &fiat.api_key_env,
            timeout,
        )),
    }
}

pub fn crypto_provider(config: &AppConfig) -> Arc<dyn CryptoPriceProvider> {
    Arc::new(coingecko::CoinGeckoProvider::new(
        &config.providers.crypto.base_url,
        Duration::from_secs(config.request_timeout_secs),
    ))
}

pub fn gateway(config: &AppConfig) -> RateGateway {
    RateGateway::new(
        fiat_provider(config),
        crypto_provider(config),
        Duration::from_secs(config.cache_ttl_secs),
    )
}
