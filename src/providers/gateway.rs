//! Picks the provider for a rate, triangulates through USD when a table lacks
//! the target, and keeps every fetched rate for the configured TTL.

use crate::core::cache::TtlCache;
use crate::core::error::pair_label;
use crate::core::{
    BITCOIN, CryptoPriceProvider, CurrencyCode, FiatQuote, FiatRateProvider, FxError, QuoteShape,
    RateTable, ResolutionTrace,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Cache slot identity: what was fetched, against which base, for which target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateKey {
    FiatTable {
        base: CurrencyCode,
    },
    FiatPair {
        base: CurrencyCode,
        target: CurrencyCode,
    },
    CryptoSpot {
        asset: &'static str,
        vs: String,
    },
}

#[derive(Debug, Clone)]
enum CachedRate {
    Table(Arc<RateTable>),
    Scalar(f64),
}

pub struct RateGateway {
    fiat: Arc<dyn FiatRateProvider>,
    crypto: Arc<dyn CryptoPriceProvider>,
    cache: TtlCache<RateKey, CachedRate>,
}

fn checked_rate(rate: f64, provider: &str, pair: &str) -> Result<f64, FxError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(FxError::format(
            provider,
            pair,
            format!("non-positive rate {rate}"),
        ))
    }
}

impl RateGateway {
    pub fn new(
        fiat: Arc<dyn FiatRateProvider>,
        crypto: Arc<dyn CryptoPriceProvider>,
        ttl: Duration,
    ) -> Self {
        RateGateway {
            fiat,
            crypto,
            cache: TtlCache::new(ttl),
        }
    }

    pub fn fiat_provider_name(&self) -> &str {
        self.fiat.name()
    }

    pub fn crypto_provider_name(&self) -> &str {
        self.crypto.name()
    }

    /// `1 base = rate target`, fetched, cached, or triangulated via USD.
    pub async fn fiat_rate(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<f64, FxError> {
        if base == target {
            trace.record(format!("{base}->{target}: same currency, rate 1.0"));
            return Ok(1.0);
        }

        let provider = self.fiat.name();
        let pair = pair_label(base.as_str(), target.as_str());
        let rate = match self.fiat.shape() {
            QuoteShape::Table => self.table_rate(base, target, trace).await?,
            QuoteShape::Pair => self.pair_rate(base, target, trace).await?,
        };
        checked_rate(rate, provider, &pair)
    }

    async fn table_rate(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<f64, FxError> {
        let table = self.fiat_table(base, target, trace).await?;
        if let Some(rate) = table.get(target.as_str()) {
            return Ok(*rate);
        }

        let usd = CurrencyCode::usd();
        let to_usd = match table.get(usd.as_str()) {
            Some(rate) if *base != usd => *rate,
            _ => {
                trace.record(format!(
                    "{target} missing from {base} table and no USD leg to triangulate"
                ));
                return Err(FxError::UnsupportedCurrency(target.to_string()));
            }
        };

        trace.record(format!(
            "{target} missing from {base} table; triangulating via USD (1 {base} = {to_usd} USD)"
        ));
        let usd_table = self.fiat_table(&usd, target, trace).await?;
        match usd_table.get(target.as_str()) {
            Some(from_usd) => {
                let rate = to_usd * from_usd;
                trace.record(format!(
                    "Triangulated {base}->{target} = {to_usd} * {from_usd} = {rate}"
                ));
                Ok(rate)
            }
            None => {
                trace.record(format!("{target} missing from USD table too"));
                Err(FxError::UnsupportedCurrency(target.to_string()))
            }
        }
    }

    async fn fiat_table(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<Arc<RateTable>, FxError> {
        let key = RateKey::FiatTable { base: base.clone() };
        if let Some(CachedRate::Table(table)) = self.cache.get(&key).await {
            trace.record(format!("Cache hit: {base} rate table"));
            return Ok(table);
        }

        trace.record(format!("Fetching {base} rate table from {}", self.fiat.name()));
        match self.fiat.fetch(base, target, trace).await? {
            FiatQuote::Table(rates) => {
                let table = Arc::new(rates);
                self.cache.put(key, CachedRate::Table(Arc::clone(&table))).await;
                Ok(table)
            }
            FiatQuote::Pair(_) => Err(FxError::format(
                self.fiat.name(),
                &pair_label(base.as_str(), target.as_str()),
                "expected a rate table, got a single pair",
            )),
        }
    }

    async fn pair_rate(
        &self,
        base: &CurrencyCode,
        target: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<f64, FxError> {
        let key = RateKey::FiatPair {
            base: base.clone(),
            target: target.clone(),
        };
        if let Some(CachedRate::Scalar(rate)) = self.cache.get(&key).await {
            trace.record(format!("Cache hit: {base}->{target} pair"));
            return Ok(rate);
        }

        trace.record(format!(
            "Fetching {base}->{target} pair from {}",
            self.fiat.name()
        ));
        match self.fiat.fetch(base, target, trace).await? {
            FiatQuote::Pair(rate) => {
                let rate = checked_rate(
                    rate,
                    self.fiat.name(),
                    &pair_label(base.as_str(), target.as_str()),
                )?;
                self.cache.put(key, CachedRate::Scalar(rate)).await;
                Ok(rate)
            }
            FiatQuote::Table(rates) => rates.get(target.as_str()).copied().ok_or_else(|| {
                FxError::format(
                    self.fiat.name(),
                    &pair_label(base.as_str(), target.as_str()),
                    "pair missing from returned table",
                )
            }),
        }
    }

    /// Unit price of the supported crypto asset in `vs_currency`.
    pub async fn crypto_rate(
        &self,
        vs_currency: &CurrencyCode,
        trace: &mut ResolutionTrace,
    ) -> Result<f64, FxError> {
        let vs = vs_currency.as_str().to_lowercase();
        let key = RateKey::CryptoSpot {
            asset: BITCOIN.code,
            vs,
        };
        if let Some(CachedRate::Scalar(price)) = self.cache.get(&key).await {
            trace.record(format!("Cache hit: {} price in {vs_currency}", BITCOIN.code));
            return Ok(price);
        }

        trace.record(format!(
            "Fetching {} price in {vs_currency} from {}",
            BITCOIN.code,
            self.crypto.name()
        ));
        let price = self.crypto.spot_price(&BITCOIN, vs_currency, trace).await?;
        let price = checked_rate(
            price,
            self.crypto.name(),
            &pair_label(BITCOIN.code, vs_currency.as_str()),
        )?;
        debug!("{} = {} {}", BITCOIN.code, price, vs_currency);
        self.cache.put(key, CachedRate::Scalar(price)).await;
        Ok(price)
    }
}
