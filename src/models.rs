use dashmap::DashMap;
use ethers::types::{Address, Bytes, U256};
use serde::Serialize;
use std::str::FromStr;

/// Parses a `0x`-prefixed hex address in any letter case.
pub fn parse_address(raw: &str) -> Option<Address> {
    let lowered = raw.trim().to_lowercase();
    if lowered.len() != 42 || !lowered.starts_with("0x") {
        return None;
    }
    Address::from_str(&lowered).ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub input: Bytes,
    pub timestamp: i64,
    pub contract_address: Option<Address>,
}

impl TransactionRecord {
    /// Plain value transfer: no calldata and a nonzero amount.
    pub fn is_simple_transfer(&self) -> bool {
        self.input.is_empty() && !self.value.is_zero()
    }

    pub fn is_contract_call(&self) -> bool {
        !self.input.is_empty()
    }

    pub fn is_contract_creation(&self) -> bool {
        self.contract_address.is_some() || self.to.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenBalance {
    pub contract_address: Address,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub balance: U256,
    pub quote: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    /// The oracle answered.
    Definite,
    /// The oracle failed and the address was assumed to be an EOA.
    Assumed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub is_contract: bool,
    pub confidence: Confidence,
}

impl Classification {
    pub fn definite(is_contract: bool) -> Self {
        Classification {
            is_contract,
            confidence: Confidence::Definite,
        }
    }

    pub fn assumed_eoa() -> Self {
        Classification {
            is_contract: false,
            confidence: Confidence::Assumed,
        }
    }
}

/// Contract/EOA answers for one report run.
///
/// Entries are write-once: the first classification stored for an address
/// wins, so concurrent classifiers racing on the same key stay consistent.
pub struct ClassificationCache {
    entries: DashMap<Address, Classification>,
}

impl ClassificationCache {
    pub fn new() -> Self {
        ClassificationCache {
            entries: DashMap::new(),
        }
    }

    pub fn get(&self, address: &Address) -> Option<Classification> {
        self.entries.get(address).map(|entry| *entry.value())
    }

    pub fn insert(&self, address: Address, classification: Classification) -> Classification {
        *self.entries.entry(address).or_insert(classification).value()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ClassificationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TxOverview {
    pub analysis_from: String,
    pub analysis_to: String,
    pub tx_count: usize,
    pub active_days: usize,
    pub tx_per_day: f64,
    pub max_txs_in_single_day: usize,
    pub txlist_truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxTypeBreakdown {
    pub simple_transfer_count: usize,
    pub contract_call_count: usize,
    pub contract_creation_count: usize,
    pub to_contract_count: usize,
    pub to_eoa_count: usize,
}

impl TxTypeBreakdown {
    pub fn ratio(&self) -> String {
        format!(
            "{}:{}:{}",
            self.simple_transfer_count, self.contract_call_count, self.contract_creation_count
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Erc20Summary {
    pub token_count: usize,
    pub top_symbols: String,
    pub top_value_usd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExposureResult {
    pub direct_tx_count: usize,
    pub total_counterparties: usize,
    pub eoa_counterparty_count: usize,
    pub checked_count: usize,
    pub exposed_count: usize,
}

impl ExposureResult {
    pub fn empty() -> Self {
        ExposureResult {
            direct_tx_count: 0,
            total_counterparties: 0,
            eoa_counterparty_count: 0,
            checked_count: 0,
            exposed_count: 0,
        }
    }

    pub fn has_direct_exposure(&self) -> bool {
        self.direct_tx_count > 0
    }

    pub fn has_exposure(&self) -> bool {
        self.exposed_count > 0
    }

    /// Whole-percent share of checked counterparties that touched a pool.
    pub fn exposed_share_percent(&self) -> u64 {
        if self.checked_count == 0 {
            return 0;
        }
        (self.exposed_count as f64 / self.checked_count as f64 * 100.0).round() as u64
    }

    pub fn exposed_share(&self) -> String {
        format!("{}%", self.exposed_share_percent())
    }
}
