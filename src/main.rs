use clap::Parser;
use eth_profiler::{
    config::{
        ExposureConfig, RatePolicy, ReportConfig, Settings, ANALYSIS_SIZE, COUNTERPARTY_CHECK_CAP,
        COUNTERPARTY_TX_CHECK_LIMIT, DUST_THRESHOLD_ETH, ERC20_TOP_N, REQUEST_INTERVAL_MS,
    },
    csv::{default_report_path, export_report_csv},
    explorer::{CovalentClient, EtherscanClient},
    report::build_report,
    scanner::ChainClient,
};
use ethers::providers::{Http, Provider};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Single-address Ethereum forensic report
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address or ENS name to analyze
    input: String,

    /// Output CSV path (default: reports/report_<address>.csv)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Number of most recent transactions to analyze
    #[arg(long, default_value_t = ANALYSIS_SIZE, value_parser = positive)]
    n: usize,

    /// Maximum number of EOA counterparties to check for Tornado exposure
    #[arg(long, default_value_t = COUNTERPARTY_CHECK_CAP)]
    cap: usize,

    /// Dust threshold in ETH
    #[arg(long, default_value = DUST_THRESHOLD_ETH)]
    dust: String,

    /// Transactions fetched per counterparty check
    #[arg(long, default_value_t = COUNTERPARTY_TX_CHECK_LIMIT, value_parser = positive)]
    history_limit: usize,

    /// Minimum spacing between counterparty requests, in milliseconds
    #[arg(long, default_value_t = REQUEST_INTERVAL_MS)]
    interval_ms: u64,

    /// Counterparty checks allowed in flight at once
    #[arg(long, default_value_t = 1, value_parser = positive)]
    concurrency: usize,

    /// Fail instead of reporting zero transactions when the history fetch fails
    #[arg(long)]
    strict: bool,
}

fn positive(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} must be a positive number", raw)),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ReportConfig {
        analysis_size: cli.n,
        dust_threshold_eth: cli.dust,
        erc20_top_n: ERC20_TOP_N,
        exposure: ExposureConfig {
            cap: cli.cap,
            history_limit: cli.history_limit,
            rate: RatePolicy {
                min_interval: Duration::from_millis(cli.interval_ms),
                max_concurrency: cli.concurrency,
            },
        },
        strict: cli.strict,
    };
    config.validate()?;

    let settings = Settings::from_env()?;
    let provider = Arc::new(Provider::<Http>::try_from(settings.rpc_url.as_str())?);
    let chain = ChainClient::new(provider);
    let etherscan = EtherscanClient::new(settings.etherscan_api_key.clone())?;
    let covalent = CovalentClient::new(settings.covalent_api_key.clone());

    info!("Analyzing: {}", cli.input);
    let subject = chain.resolve_input(&cli.input).await?;
    info!("Resolved address: {:?}", subject.address);

    let basics = chain.fetch_basics(subject.address).await?;
    let tokens = covalent.fetch_token_balances(subject.address).await;

    let row = build_report(&subject, &basics, &tokens, &chain, &etherscan, &config).await?;

    let path = cli.out.unwrap_or_else(|| default_report_path(&row.address));
    export_report_csv(&row, &path)?;
    info!("CSV written to: {}", path.display());

    Ok(())
}
