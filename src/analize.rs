use crate::{
    models::{
        ClassificationCache, Erc20Summary, TokenBalance, TransactionRecord, TxOverview,
        TxTypeBreakdown,
    },
    scanner::{classify, ContractOracle},
    stats::{format_signed_eth, AmountStats, AmountStatsDisplay},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use ethers::types::{Address, U256};
use log::debug;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const SECONDS_PER_DAY: i64 = 86_400;

fn to_datetime(timestamp: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
}

fn iso_timestamp(timestamp: i64) -> String {
    to_datetime(timestamp)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

fn utc_day(timestamp: i64) -> Option<NaiveDate> {
    to_datetime(timestamp).map(|dt| dt.date_naive())
}

pub fn compute_tx_overview(txs: &[TransactionRecord], analysis_size: usize) -> TxOverview {
    let (min_ts, max_ts) = match (
        txs.iter().map(|tx| tx.timestamp).min(),
        txs.iter().map(|tx| tx.timestamp).max(),
    ) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return TxOverview {
                analysis_from: String::new(),
                analysis_to: String::new(),
                tx_count: 0,
                active_days: 0,
                tx_per_day: 0.0,
                max_txs_in_single_day: 0,
                txlist_truncated: false,
            }
        }
    };

    let mut day_histogram: HashMap<NaiveDate, usize> = HashMap::new();
    for tx in txs {
        if let Some(day) = utc_day(tx.timestamp) {
            *day_histogram.entry(day).or_insert(0) += 1;
        }
    }

    let elapsed = max_ts.saturating_sub(min_ts);
    let span_days =
        (elapsed / SECONDS_PER_DAY + i64::from(elapsed % SECONDS_PER_DAY != 0)).max(1);

    TxOverview {
        analysis_from: iso_timestamp(min_ts),
        analysis_to: iso_timestamp(max_ts),
        tx_count: txs.len(),
        active_days: day_histogram.len(),
        tx_per_day: txs.len() as f64 / span_days as f64,
        max_txs_in_single_day: day_histogram.values().copied().max().unwrap_or(0),
        txlist_truncated: txs.len() == analysis_size,
    }
}

/// Counts transaction kinds and classifies every `to` address through the
/// run's classification cache.
pub async fn compute_tx_types(
    txs: &[TransactionRecord],
    oracle: &dyn ContractOracle,
    cache: &ClassificationCache,
) -> TxTypeBreakdown {
    let mut breakdown = TxTypeBreakdown {
        simple_transfer_count: 0,
        contract_call_count: 0,
        contract_creation_count: 0,
        to_contract_count: 0,
        to_eoa_count: 0,
    };

    for tx in txs {
        if tx.is_simple_transfer() {
            breakdown.simple_transfer_count += 1;
        }
        if tx.is_contract_call() {
            breakdown.contract_call_count += 1;
        }
        if tx.is_contract_creation() {
            breakdown.contract_creation_count += 1;
        }

        if let Some(to) = tx.to {
            if classify(cache, oracle, to).await.is_contract {
                breakdown.to_contract_count += 1;
            } else {
                breakdown.to_eoa_count += 1;
            }
        }
    }

    debug!("Transaction types {}", breakdown.ratio());
    breakdown
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EthFlow {
    pub inbound: AmountStats,
    pub outbound: AmountStats,
    pub unique_senders: usize,
    pub unique_receivers: usize,
    pub inbound_dust_count: usize,
    pub outbound_dust_count: usize,
    pub dust_threshold_eth: String,
}

impl EthFlow {
    pub fn net_flow(&self) -> String {
        format_signed_eth(self.inbound.total, self.outbound.total)
    }

    pub fn inbound_display(&self) -> AmountStatsDisplay {
        self.inbound.display()
    }

    pub fn outbound_display(&self) -> AmountStatsDisplay {
        self.outbound.display()
    }
}

/// Partitions nonzero-value transactions into inbound and outbound relative
/// to `subject`. A self-transfer lands on both sides.
pub fn compute_eth_flow(
    txs: &[TransactionRecord],
    subject: Address,
    dust_threshold_wei: U256,
    dust_threshold_eth: &str,
) -> EthFlow {
    let mut incoming: Vec<U256> = Vec::new();
    let mut outgoing: Vec<U256> = Vec::new();
    let mut senders: HashSet<Address> = HashSet::new();
    let mut receivers: HashSet<Address> = HashSet::new();
    let mut inbound_dust_count = 0;
    let mut outbound_dust_count = 0;

    for tx in txs.iter().filter(|tx| !tx.value.is_zero()) {
        let is_dust = tx.value < dust_threshold_wei;

        if tx.to == Some(subject) {
            incoming.push(tx.value);
            senders.insert(tx.from);
            if is_dust {
                inbound_dust_count += 1;
            }
        }

        if tx.from == subject {
            outgoing.push(tx.value);
            if let Some(to) = tx.to {
                receivers.insert(to);
            }
            if is_dust {
                outbound_dust_count += 1;
            }
        }
    }

    EthFlow {
        inbound: AmountStats::from_amounts(&incoming),
        outbound: AmountStats::from_amounts(&outgoing),
        unique_senders: senders.len(),
        unique_receivers: receivers.len(),
        inbound_dust_count,
        outbound_dust_count,
        dust_threshold_eth: dust_threshold_eth.to_string(),
    }
}

fn display_symbol(token: &TokenBalance) -> Option<String> {
    let symbol = [token.symbol.as_deref(), token.name.as_deref()]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or("UNKNOWN")
        .to_uppercase();

    if symbol == "UNKNOWN" {
        None
    } else {
        Some(symbol)
    }
}

/// Ranks nonzero holdings by fiat quote (then balance) and summarises the
/// top `top_n`.
pub fn compute_erc20_summary(balances: &[TokenBalance], top_n: usize) -> Erc20Summary {
    let mut held: Vec<&TokenBalance> = balances.iter().filter(|t| !t.balance.is_zero()).collect();

    if held.is_empty() {
        return Erc20Summary {
            token_count: 0,
            top_symbols: String::new(),
            top_value_usd: "0".to_string(),
        };
    }

    held.sort_by(|a, b| {
        let a_quote = a.quote.unwrap_or(0.0);
        let b_quote = b.quote.unwrap_or(0.0);
        b_quote
            .total_cmp(&a_quote)
            .then_with(|| b.balance.cmp(&a.balance))
    });

    let top: Vec<&TokenBalance> = held.iter().take(top_n).copied().collect();

    let top_symbols = top
        .iter()
        .filter_map(|t| display_symbol(t))
        .collect::<Vec<_>>()
        .join(";");

    let total_value: f64 = top.iter().map(|t| t.quote.unwrap_or(0.0)).sum();
    let top_value_usd = if total_value > 0.0 {
        total_value.to_string()
    } else {
        "0".to_string()
    };

    Erc20Summary {
        token_count: held.len(),
        top_symbols,
        top_value_usd,
    }
}
