//! Memoizing time-series fetcher.
//!
//! Wraps a [`DataPort`] with a cache keyed by `(ticker, period)`. Successful
//! results, empty ones included, are cached and shared via `Rc`; failures are
//! never cached so a later call retries the provider.

use crate::domain::error::IndexboardError;
use crate::domain::period::LookbackPeriod;
use crate::domain::series::TickerSeries;
use crate::ports::data_port::DataPort;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Keep everything for the life of the fetcher.
    #[default]
    Unbounded,
    /// Keep at most `capacity` series, evicting the least recently used.
    Lru { capacity: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ticker: String,
    pub period: LookbackPeriod,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
pub struct SeriesCache {
    policy: CachePolicy,
    entries: HashMap<CacheKey, Rc<TickerSeries>>,
    // least recently used at the front
    order: VecDeque<CacheKey>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl SeriesCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<Rc<TickerSeries>> {
        match self.entries.get(key) {
            Some(series) => {
                let series = Rc::clone(series);
                self.hits += 1;
                self.touch(key);
                Some(series)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, series: Rc<TickerSeries>) {
        if let CachePolicy::Lru { capacity } = self.policy {
            if capacity == 0 {
                return;
            }
            while self.entries.len() >= capacity && !self.entries.contains_key(&key) {
                let Some(oldest) = self.order.pop_front() else {
                    break;
                };
                debug!(ticker = %oldest.ticker, period = %oldest.period, "evicting cached series");
                self.entries.remove(&oldest);
                self.evictions += 1;
            }
        }
        if self.entries.insert(key.clone(), series).is_some() {
            self.touch(&key);
        } else {
            self.order.push_back(key);
        }
    }

    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.order.retain(|k| k != key);
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
        }
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

pub struct SeriesFetcher<P> {
    port: P,
    cache: SeriesCache,
}

impl<P: DataPort> SeriesFetcher<P> {
    pub fn new(port: P) -> Self {
        Self::with_policy(port, CachePolicy::Unbounded)
    }

    pub fn with_policy(port: P, policy: CachePolicy) -> Self {
        Self {
            port,
            cache: SeriesCache::new(policy),
        }
    }

    pub fn fetch(
        &mut self,
        ticker: &str,
        period: LookbackPeriod,
    ) -> Result<Rc<TickerSeries>, IndexboardError> {
        let ticker = ticker.trim();
        if ticker.is_empty() {
            return Err(IndexboardError::InvalidTicker);
        }

        let key = CacheKey {
            ticker: ticker.to_string(),
            period,
        };
        if let Some(series) = self.cache.get(&key) {
            debug!(ticker, %period, bars = series.len(), "cache hit");
            return Ok(series);
        }

        debug!(ticker, %period, source = self.port.source_name(), "fetching series");
        let bars = self.port.fetch_ohlcv(ticker, period).inspect_err(|e| {
            warn!(ticker, %period, error = %e, "fetch failed");
        })?;

        let series = Rc::new(TickerSeries::from_bars(ticker, period, bars));
        if series.is_empty() {
            info!(ticker, %period, "provider returned no data");
        } else {
            debug!(ticker, %period, bars = series.len(), "fetched series");
        }
        self.cache.insert(key, Rc::clone(&series));
        Ok(series)
    }

    /// Drop a cached entry so the next fetch goes to the provider.
    pub fn invalidate(&mut self, ticker: &str, period: LookbackPeriod) -> bool {
        self.cache.remove(&CacheKey {
            ticker: ticker.trim().to_string(),
            period,
        })
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    pub fn port(&self) -> &P {
        &self.port
    }
}
