use crate::error::AnalyzerError;
use crate::models::{parse_address, Classification, ClassificationCache};
use async_trait::async_trait;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use log::{debug, info, warn};
use std::sync::Arc;

/// Answers whether an address carries contract code.
///
/// Implementations may fail transiently; callers go through
/// [`classify`], which treats a failure as "not a contract".
#[async_trait]
pub trait ContractOracle: Send + Sync {
    async fn is_contract(&self, address: Address) -> Result<bool, AnalyzerError>;
}

/// Cached contract/EOA lookup. The cache is consulted before the oracle and
/// an oracle failure is stored as an assumed EOA.
pub async fn classify(
    cache: &ClassificationCache,
    oracle: &dyn ContractOracle,
    address: Address,
) -> Classification {
    if let Some(cached) = cache.get(&address) {
        return cached;
    }

    let classification = match oracle.is_contract(address).await {
        Ok(is_contract) => Classification::definite(is_contract),
        Err(e) => {
            warn!("Contract check failed for {:?}, assuming EOA: {}", address, e);
            Classification::assumed_eoa()
        }
    };

    cache.insert(address, classification)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Address,
    Ens,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::Address => "address",
            InputKind::Ens => "ens",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInput {
    pub kind: InputKind,
    pub input: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBasics {
    pub balance: U256,
    pub is_contract: bool,
    pub ens_name: String,
}

pub fn is_ens_name(input: &str) -> bool {
    input.trim().ends_with(".eth")
}

/// Chain RPC accessor over any `ethers` middleware.
pub struct ChainClient<M> {
    provider: Arc<M>,
}

impl<M> ChainClient<M>
where
    M: Middleware + 'static,
{
    pub fn new(provider: Arc<M>) -> Self {
        ChainClient { provider }
    }

    /// Turns a CLI argument into an address, resolving `*.eth` names.
    pub async fn resolve_input(&self, input: &str) -> Result<ResolvedInput, AnalyzerError> {
        let input = input.trim();

        if is_ens_name(input) {
            let address = self
                .provider
                .resolve_name(input)
                .await
                .map_err(|e| AnalyzerError::EnsResolution(format!("{}: {}", input, e)))?;
            info!("Resolved {} to {:?}", input, address);
            return Ok(ResolvedInput {
                kind: InputKind::Ens,
                input: input.to_string(),
                address,
            });
        }

        let address =
            parse_address(input).ok_or_else(|| AnalyzerError::InvalidAddress(input.to_string()))?;

        Ok(ResolvedInput {
            kind: InputKind::Address,
            input: input.to_string(),
            address,
        })
    }

    /// Balance, code and reverse ENS, fetched concurrently. A failed reverse
    /// lookup yields an empty name.
    pub async fn fetch_basics(&self, address: Address) -> Result<AccountBasics, AnalyzerError> {
        let (balance, code, ens_name) = futures::join!(
            self.provider.get_balance(address, None),
            self.provider.get_code(address, None),
            self.provider.lookup_address(address),
        );

        let balance = balance.map_err(|e| AnalyzerError::Rpc(e.to_string()))?;
        let code = code.map_err(|e| AnalyzerError::Rpc(e.to_string()))?;
        let ens_name = match ens_name {
            Ok(name) => name,
            Err(e) => {
                debug!("No reverse ENS record for {:?}: {}", address, e);
                String::new()
            }
        };

        Ok(AccountBasics {
            balance,
            is_contract: !code.is_empty(),
            ens_name,
        })
    }
}

#[async_trait]
impl<M> ContractOracle for ChainClient<M>
where
    M: Middleware + 'static,
{
    async fn is_contract(&self, address: Address) -> Result<bool, AnalyzerError> {
        let code = self
            .provider
            .get_code(address, None)
            .await
            .map_err(|e| AnalyzerError::Rpc(e.to_string()))?;
        Ok(!code.is_empty())
    }
}
