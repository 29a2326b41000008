use crate::error::AnalyzerError;
use std::time::Duration;

pub const ANALYSIS_SIZE: usize = 200;
pub const COUNTERPARTY_CHECK_CAP: usize = 25;
pub const COUNTERPARTY_TX_CHECK_LIMIT: usize = 100;
pub const DUST_THRESHOLD_ETH: &str = "0.001";
pub const ERC20_TOP_N: usize = 5;
pub const REQUEST_INTERVAL_MS: u64 = 200;

pub const ETHERSCAN_BASE_URL: &str = "https://api.etherscan.io/v2/api";
pub const COVALENT_BASE_URL: &str = "https://api.covalenthq.com/v1";
pub const ALCHEMY_BASE_URL: &str = "https://eth-mainnet.g.alchemy.com/v2";
pub const ETHEREUM_CHAIN_ID: &str = "1";

/// Pacing for upstream history requests made by the exposure crawler.
///
/// Request starts are spaced at least `min_interval` apart no matter how
/// many run at once, so raising `max_concurrency` never raises the request
/// rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    pub min_interval: Duration,
    pub max_concurrency: usize,
}

impl Default for RatePolicy {
    fn default() -> Self {
        RatePolicy {
            min_interval: Duration::from_millis(REQUEST_INTERVAL_MS),
            max_concurrency: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureConfig {
    pub cap: usize,
    pub history_limit: usize,
    pub rate: RatePolicy,
}

impl Default for ExposureConfig {
    fn default() -> Self {
        ExposureConfig {
            cap: COUNTERPARTY_CHECK_CAP,
            history_limit: COUNTERPARTY_TX_CHECK_LIMIT,
            rate: RatePolicy::default(),
        }
    }
}

/// Knobs for a single report run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub analysis_size: usize,
    pub dust_threshold_eth: String,
    pub erc20_top_n: usize,
    pub exposure: ExposureConfig,
    /// Fail the run when the subject's history cannot be fetched instead of
    /// reporting zero transactions.
    pub strict: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            analysis_size: ANALYSIS_SIZE,
            dust_threshold_eth: DUST_THRESHOLD_ETH.to_string(),
            erc20_top_n: ERC20_TOP_N,
            exposure: ExposureConfig::default(),
            strict: false,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), AnalyzerError> {
        if self.analysis_size == 0 {
            return Err(AnalyzerError::InvalidArgument(
                "analysis size must be a positive number".to_string(),
            ));
        }
        if self.exposure.history_limit == 0 {
            return Err(AnalyzerError::InvalidArgument(
                "counterparty history limit must be a positive number".to_string(),
            ));
        }
        if self.exposure.rate.max_concurrency == 0 {
            return Err(AnalyzerError::InvalidArgument(
                "concurrency must be a positive number".to_string(),
            ));
        }
        if ethers::utils::parse_ether(self.dust_threshold_eth.as_str()).is_err() {
            return Err(AnalyzerError::InvalidArgument(format!(
                "dust threshold is not a decimal ETH amount: {}",
                self.dust_threshold_eth
            )));
        }
        Ok(())
    }
}

/// Credentials and endpoints, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub rpc_url: String,
    pub etherscan_api_key: String,
    pub covalent_api_key: Option<String>,
}

impl Settings {
    pub fn from_env() -> Result<Self, AnalyzerError> {
        dotenv::dotenv().ok();

        let rpc_url = match std::env::var("RPC_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => {
                let key = std::env::var("ALCHEMY_API_KEY").map_err(|_| {
                    AnalyzerError::Config("RPC_URL or ALCHEMY_API_KEY must be set".to_string())
                })?;
                format!("{}/{}", ALCHEMY_BASE_URL, key)
            }
        };

        let etherscan_api_key = std::env::var("ETHERSCAN_API_KEY")
            .map_err(|_| AnalyzerError::Config("ETHERSCAN_API_KEY must be set".to_string()))?;

        let covalent_api_key = std::env::var("COVALENT_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Settings {
            rpc_url,
            etherscan_api_key,
            covalent_api_key,
        })
    }
}
