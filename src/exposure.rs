use crate::{
    config::{ExposureConfig, RatePolicy},
    explorer::HistorySource,
    models::{ClassificationCache, ExposureResult, TransactionRecord},
    scanner::{classify, ContractOracle},
    tornado::is_tornado_address,
};
use ethers::types::Address;
use futures::stream::{self, StreamExt};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use log::{info, warn};
use std::collections::HashSet;
use std::time::Duration;

pub type RequestLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// One request start per `min_interval` across all callers, no bursts.
/// A zero interval means unpaced.
pub fn request_limiter(min_interval: Duration) -> Option<RequestLimiter> {
    Quota::with_period(min_interval).map(RateLimiter::direct)
}

/// Subject transactions sent straight to a pool.
pub fn direct_pool_transactions(txs: &[TransactionRecord]) -> Vec<&TransactionRecord> {
    txs.iter()
        .filter(|tx| tx.to.map(|to| is_tornado_address(&to)).unwrap_or(false))
        .collect()
}

/// Distinct senders and receivers other than `subject`, in first-seen order.
pub fn collect_counterparties(txs: &[TransactionRecord], subject: Address) -> Vec<Address> {
    let mut seen: HashSet<Address> = HashSet::new();
    let mut ordered = Vec::new();

    for tx in txs {
        for address in std::iter::once(tx.from).chain(tx.to) {
            if address != subject && seen.insert(address) {
                ordered.push(address);
            }
        }
    }

    ordered
}

/// Transactions in `history` that `address` itself sent to a pool.
pub fn outgoing_pool_transactions(
    address: Address,
    history: &[TransactionRecord],
) -> Vec<&TransactionRecord> {
    history
        .iter()
        .filter(|tx| tx.from == address && tx.to.map(|to| is_tornado_address(&to)).unwrap_or(false))
        .collect()
}

async fn check_counterparty(
    counterparty: Address,
    position: usize,
    total: usize,
    history: &dyn HistorySource,
    history_limit: usize,
    limiter: Option<&RequestLimiter>,
) -> Option<bool> {
    if let Some(limiter) = limiter {
        limiter.until_ready().await;
    }
    info!("[{}/{}] Checking counterparty {:?}", position, total, counterparty);

    match history.fetch_history(counterparty, history_limit).await {
        Ok(txs) => {
            let hits = outgoing_pool_transactions(counterparty, &txs);
            for tx in &hits {
                warn!("Tornado exposure via {:?}: {}", counterparty, tx.hash);
            }
            Some(!hits.is_empty())
        }
        Err(e) => {
            if e.is_rate_limited() {
                warn!("Rate limited while checking {:?}, skipping", counterparty);
            } else {
                warn!("Failed to check counterparty {:?}: {}", counterparty, e);
            }
            None
        }
    }
}

/// Best-effort scan of the subject's counterparties for Tornado pool
/// interaction. Individual fetch failures are logged and skipped.
pub async fn compute_exposure(
    txs: &[TransactionRecord],
    subject: Address,
    oracle: &dyn ContractOracle,
    history: &dyn HistorySource,
    cache: &ClassificationCache,
    config: &ExposureConfig,
) -> ExposureResult {
    let direct = direct_pool_transactions(txs);
    for tx in &direct {
        warn!("Direct Tornado interaction: {} -> {:?}", tx.hash, tx.to);
    }

    let counterparties = collect_counterparties(txs, subject);
    info!("Found {} unique counterparties", counterparties.len());

    let RatePolicy {
        min_interval,
        max_concurrency,
    } = config.rate;
    let concurrency = max_concurrency.max(1);

    let classifications: Vec<(Address, bool)> = stream::iter(counterparties.iter().copied())
        .map(|address| async move { (address, classify(cache, oracle, address).await.is_contract) })
        .buffered(concurrency)
        .collect()
        .await;

    let eoas: Vec<Address> = classifications
        .into_iter()
        .filter(|(_, is_contract)| !is_contract)
        .map(|(address, _)| address)
        .collect();

    let to_check: Vec<Address> = eoas.iter().take(config.cap).copied().collect();
    info!(
        "Checking {} of {} EOA counterparties for Tornado exposure",
        to_check.len(),
        eoas.len()
    );

    let limiter = request_limiter(min_interval);
    let limiter = limiter.as_ref();
    let total = to_check.len();
    let history_limit = config.history_limit;

    let outcomes: Vec<Option<bool>> = stream::iter(to_check.iter().copied().enumerate())
        .map(|(idx, address)| async move {
            check_counterparty(address, idx + 1, total, history, history_limit, limiter).await
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let skipped = outcomes.iter().filter(|o| o.is_none()).count();
    if skipped > 0 {
        warn!("Skipped {} counterparties after fetch failures", skipped);
    }

    ExposureResult {
        direct_tx_count: direct.len(),
        total_counterparties: counterparties.len(),
        eoa_counterparty_count: eoas.len(),
        checked_count: to_check.len(),
        exposed_count: outcomes.into_iter().flatten().filter(|exposed| *exposed).count(),
    }
}
