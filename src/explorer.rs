use crate::config::{COVALENT_BASE_URL, ETHERSCAN_BASE_URL, ETHEREUM_CHAIN_ID};
use crate::error::ExplorerError;
use crate::models::{parse_address, TokenBalance, TransactionRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethers::types::{Address, Bytes, U256};
use log::{debug, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Source of an address's most recent normal transactions, newest first.
#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_history(
        &self,
        address: Address,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, ExplorerError>;
}

/// A `txlist` entry as Etherscan returns it: every field is a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EtherscanTx {
    pub hash: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    pub value: String,
    #[serde(default)]
    pub input: String,
    pub time_stamp: String,
    #[serde(default)]
    pub contract_address: String,
}

impl TryFrom<EtherscanTx> for TransactionRecord {
    type Error = ExplorerError;

    fn try_from(raw: EtherscanTx) -> Result<Self, Self::Error> {
        let from = parse_address(&raw.from)
            .ok_or_else(|| ExplorerError::InvalidData(format!("from address: {}", raw.from)))?;
        let to = optional_address(&raw.to)?;
        let contract_address = optional_address(&raw.contract_address)?;

        let value = if raw.value.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(&raw.value)
                .map_err(|_| ExplorerError::InvalidData(format!("value: {}", raw.value)))?
        };

        let input = match raw.input.as_str() {
            "" | "0x" => Bytes::new(),
            hex => Bytes::from_str(hex)
                .map_err(|_| ExplorerError::InvalidData(format!("input of {}", raw.hash)))?,
        };

        let timestamp = raw
            .time_stamp
            .parse::<i64>()
            .ok()
            .filter(|ts| DateTime::<Utc>::from_timestamp(*ts, 0).is_some())
            .ok_or_else(|| ExplorerError::InvalidData(format!("timeStamp: {}", raw.time_stamp)))?;

        Ok(TransactionRecord {
            hash: raw.hash,
            from,
            to,
            value,
            input,
            timestamp,
            contract_address,
        })
    }
}

fn optional_address(raw: &str) -> Result<Option<Address>, ExplorerError> {
    if raw.is_empty() || raw == "0x" {
        return Ok(None);
    }
    parse_address(raw)
        .map(Some)
        .ok_or_else(|| ExplorerError::InvalidData(format!("address: {}", raw)))
}

#[derive(Debug, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: serde_json::Value,
}

fn is_rate_limit_message(message: &str) -> bool {
    message.to_lowercase().contains("rate limit")
}

/// Interprets an Etherscan `txlist` body.
pub fn parse_txlist_response(
    body: serde_json::Value,
    limit: usize,
) -> Result<Vec<TransactionRecord>, ExplorerError> {
    let response: EtherscanResponse = serde_json::from_value(body)
        .map_err(|e| ExplorerError::InvalidData(format!("txlist body: {}", e)))?;

    if response.status == "0" {
        let message = response.message.unwrap_or_else(|| "Unknown error".to_string());
        if message == "No transactions found" || response.result.is_null() {
            return Ok(Vec::new());
        }
        let detail = response.result.as_str().unwrap_or_default();
        if is_rate_limit_message(&message) || is_rate_limit_message(detail) {
            return Err(ExplorerError::RateLimited(format!("{} {}", message, detail)));
        }
        return Err(ExplorerError::Api {
            status: response.status,
            message: if detail.is_empty() {
                message
            } else {
                format!("{}: {}", message, detail)
            },
        });
    }

    if response.status != "1" {
        return Err(ExplorerError::Api {
            status: response.status,
            message: "unexpected response status".to_string(),
        });
    }

    let raw: Vec<EtherscanTx> = serde_json::from_value(response.result)
        .map_err(|e| ExplorerError::InvalidData(format!("txlist result: {}", e)))?;

    raw.into_iter()
        .take(limit)
        .map(TransactionRecord::try_from)
        .collect()
}

pub struct EtherscanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl EtherscanClient {
    pub fn new(api_key: String) -> Result<Self, ExplorerError> {
        Self::with_base_url(ETHERSCAN_BASE_URL.to_string(), api_key)
    }

    pub fn with_base_url(base_url: String, api_key: String) -> Result<Self, ExplorerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(EtherscanClient {
            client,
            base_url,
            api_key,
        })
    }
}

#[async_trait]
impl HistorySource for EtherscanClient {
    async fn fetch_history(
        &self,
        address: Address,
        limit: usize,
    ) -> Result<Vec<TransactionRecord>, ExplorerError> {
        let address = format!("{:?}", address);
        let offset = limit.to_string();
        debug!("Fetching up to {} transactions for {}", limit, address);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("module", "account"),
                ("action", "txlist"),
                ("chainid", ETHEREUM_CHAIN_ID),
                ("address", address.as_str()),
                ("startblock", "0"),
                ("endblock", "99999999"),
                ("page", "1"),
                ("offset", offset.as_str()),
                ("sort", "desc"),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ExplorerError::RateLimited("HTTP 429".to_string()));
        }

        let body: serde_json::Value = response.json().await?;
        parse_txlist_response(body, limit)
    }
}

#[derive(Debug, Deserialize)]
struct CovalentResponse {
    data: Option<CovalentData>,
}

#[derive(Debug, Deserialize)]
struct CovalentData {
    #[serde(default)]
    items: Vec<CovalentItem>,
}

#[derive(Debug, Deserialize)]
struct CovalentItem {
    contract_address: Option<String>,
    contract_name: Option<String>,
    contract_ticker_symbol: Option<String>,
    balance: Option<String>,
    quote: Option<f64>,
}

/// Interprets a Covalent `balances_v2` body. Native-token rows (no contract
/// address) and rows that fail to parse are dropped.
pub fn parse_balances_response(body: serde_json::Value) -> Vec<TokenBalance> {
    let response: CovalentResponse = match serde_json::from_value(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("Unexpected token balance payload: {}", e);
            return Vec::new();
        }
    };

    let items = match response.data {
        Some(data) => data.items,
        None => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(|item| {
            let contract_address = parse_address(item.contract_address.as_deref()?)?;
            let balance = match item.balance.as_deref() {
                None | Some("") => U256::zero(),
                Some(raw) => U256::from_dec_str(raw).ok()?,
            };
            Some(TokenBalance {
                contract_address,
                symbol: item.contract_ticker_symbol,
                name: item.contract_name,
                balance,
                quote: item.quote,
            })
        })
        .collect()
}

/// ERC-20 balances from the Covalent indexer.
///
/// Never fails: a missing key or any upstream problem is logged and yields
/// an empty list.
pub struct CovalentClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CovalentClient {
    pub fn new(api_key: Option<String>) -> Self {
        CovalentClient {
            client: reqwest::Client::new(),
            base_url: COVALENT_BASE_URL.to_string(),
            api_key,
        }
    }

    pub async fn fetch_token_balances(&self, address: Address) -> Vec<TokenBalance> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("COVALENT_API_KEY not set, skipping ERC-20 token balance fetch");
                return Vec::new();
            }
        };

        match self.request_balances(address, api_key).await {
            Ok(balances) => balances,
            Err(e) => {
                if e.is_rate_limited() {
                    warn!("Covalent rate limit exceeded, skipping token balances");
                } else {
                    warn!("Failed to fetch token balances: {}", e);
                }
                Vec::new()
            }
        }
    }

    async fn request_balances(
        &self,
        address: Address,
        api_key: &str,
    ) -> Result<Vec<TokenBalance>, ExplorerError> {
        let url = format!(
            "{}/{}/address/{:?}/balances_v2/",
            self.base_url, ETHEREUM_CHAIN_ID, address
        );

        let response = self.client.get(&url).bearer_auth(api_key).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ExplorerError::RateLimited("HTTP 429".to_string()));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            if is_rate_limit_message(&text) {
                return Err(ExplorerError::RateLimited(text));
            }
            return Err(ExplorerError::Api {
                status: status.as_u16().to_string(),
                message: text,
            });
        }

        let body: serde_json::Value = response.json().await?;
        Ok(parse_balances_response(body))
    }
}
