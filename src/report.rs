use crate::{
    analize::{compute_erc20_summary, compute_eth_flow, compute_tx_overview, compute_tx_types},
    config::ReportConfig,
    error::AnalyzerError,
    explorer::HistorySource,
    exposure::compute_exposure,
    models::{ClassificationCache, ExposureResult, TokenBalance, TransactionRecord},
    scanner::{AccountBasics, ContractOracle, ResolvedInput},
    stats::format_eth,
};
use chrono::{SecondsFormat, Utc};
use ethers::utils::{parse_ether, to_checksum};
use log::{info, warn};
use serde::Serialize;

/// One CSV row describing the subject account. Field order is column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub input_type: String,
    pub address: String,
    pub resolved_address: String,
    pub chain: String,
    pub network: String,
    pub ens_name: String,
    pub is_contract: bool,
    pub eth_balance: String,
    pub eth_balance_wei: String,
    pub generated_at: String,

    pub erc20_token_count: usize,
    pub erc20_top_symbols: String,
    pub erc20_top_value_usd: String,

    pub analysis_type: String,
    pub analysis_size: usize,
    pub analysis_from: String,
    pub analysis_to: String,
    pub txlist_truncated: bool,
    pub tx_count: usize,
    pub active_days: usize,
    /// Shortest decimal form, no trailing `.0` on whole rates.
    pub tx_per_day: String,
    pub max_txs_in_single_day: usize,

    pub tx_simple_eth_transfer_count: usize,
    pub tx_contract_call_count: usize,
    pub tx_contract_creation_count: usize,
    pub tx_to_contract_count: usize,
    pub tx_to_eoa_count: usize,
    pub tx_type_ratio: String,

    pub eth_in_tx_count: usize,
    pub eth_out_tx_count: usize,
    pub eth_in_unique_senders: usize,
    pub eth_out_unique_receivers: usize,
    pub eth_in_total: String,
    pub eth_out_total: String,
    pub eth_net_flow: String,
    pub eth_in_avg: String,
    pub eth_in_median: String,
    pub eth_in_p95: String,
    pub eth_in_max: String,
    pub eth_out_avg: String,
    pub eth_out_median: String,
    pub eth_out_p95: String,
    pub eth_out_max: String,
    pub eth_out_min_nonzero: String,
    pub dust_threshold_eth: String,
    pub eth_in_dust_tx_count: usize,
    pub eth_out_dust_tx_count: usize,

    pub tornado_direct_exposure: bool,
    pub tornado_direct_tx_count: usize,
    pub tornado_counterparty_exposure: bool,
    pub counterparties_total: usize,
    pub counterparties_users_total: usize,
    pub counterparties_checked: usize,
    pub counterparties_tornado_exposed_count: usize,
    pub counterparties_tornado_exposed_share: String,
}

/// Fetches the subject's history and runs every analysis over it.
///
/// A failed history fetch fails the run only in strict mode; otherwise the
/// report is built over zero transactions.
pub async fn build_report(
    subject: &ResolvedInput,
    basics: &AccountBasics,
    tokens: &[TokenBalance],
    oracle: &dyn ContractOracle,
    history: &dyn HistorySource,
    config: &ReportConfig,
) -> Result<ReportRow, AnalyzerError> {
    config.validate()?;
    let dust_threshold_wei = parse_ether(config.dust_threshold_eth.as_str())
        .map_err(|e| AnalyzerError::InvalidArgument(format!("dust threshold: {}", e)))?;

    info!("Fetching last {} transactions", config.analysis_size);
    let txs: Vec<TransactionRecord> =
        match history.fetch_history(subject.address, config.analysis_size).await {
            Ok(txs) => {
                info!("Fetched {} transactions", txs.len());
                txs
            }
            Err(e) if config.strict => return Err(e.into()),
            Err(e) => {
                warn!("Failed to fetch transactions: {}", e);
                warn!("Continuing with basic info only");
                Vec::new()
            }
        };

    let cache = ClassificationCache::new();

    let overview = compute_tx_overview(&txs, config.analysis_size);
    let types = compute_tx_types(&txs, oracle, &cache).await;
    let flow = compute_eth_flow(
        &txs,
        subject.address,
        dust_threshold_wei,
        &config.dust_threshold_eth,
    );

    let exposure = if txs.is_empty() {
        ExposureResult::empty()
    } else {
        info!("Checking Tornado counterparty exposure");
        compute_exposure(&txs, subject.address, oracle, history, &cache, &config.exposure).await
    };

    let erc20 = compute_erc20_summary(tokens, config.erc20_top_n);
    let inbound = flow.inbound_display();
    let outbound = flow.outbound_display();
    let checksummed = to_checksum(&subject.address, None);

    Ok(ReportRow {
        input_type: subject.kind.as_str().to_string(),
        address: checksummed.clone(),
        resolved_address: checksummed,
        chain: "ethereum".to_string(),
        network: "mainnet".to_string(),
        ens_name: basics.ens_name.clone(),
        is_contract: basics.is_contract,
        eth_balance: format_eth(basics.balance),
        eth_balance_wei: basics.balance.to_string(),
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),

        erc20_token_count: erc20.token_count,
        erc20_top_symbols: erc20.top_symbols,
        erc20_top_value_usd: erc20.top_value_usd,

        analysis_type: "last_n_txs".to_string(),
        analysis_size: config.analysis_size,
        analysis_from: overview.analysis_from,
        analysis_to: overview.analysis_to,
        txlist_truncated: overview.txlist_truncated,
        tx_count: overview.tx_count,
        active_days: overview.active_days,
        tx_per_day: overview.tx_per_day.to_string(),
        max_txs_in_single_day: overview.max_txs_in_single_day,

        tx_simple_eth_transfer_count: types.simple_transfer_count,
        tx_contract_call_count: types.contract_call_count,
        tx_contract_creation_count: types.contract_creation_count,
        tx_to_contract_count: types.to_contract_count,
        tx_to_eoa_count: types.to_eoa_count,
        tx_type_ratio: types.ratio(),

        eth_in_tx_count: flow.inbound.count,
        eth_out_tx_count: flow.outbound.count,
        eth_in_unique_senders: flow.unique_senders,
        eth_out_unique_receivers: flow.unique_receivers,
        eth_in_total: inbound.total,
        eth_out_total: outbound.total,
        eth_net_flow: flow.net_flow(),
        eth_in_avg: inbound.mean,
        eth_in_median: inbound.median,
        eth_in_p95: inbound.p95,
        eth_in_max: inbound.max,
        eth_out_avg: outbound.mean,
        eth_out_median: outbound.median,
        eth_out_p95: outbound.p95,
        eth_out_max: outbound.max,
        eth_out_min_nonzero: outbound.min_nonzero,
        dust_threshold_eth: flow.dust_threshold_eth,
        eth_in_dust_tx_count: flow.inbound_dust_count,
        eth_out_dust_tx_count: flow.outbound_dust_count,

        tornado_direct_exposure: exposure.has_direct_exposure(),
        tornado_direct_tx_count: exposure.direct_tx_count,
        tornado_counterparty_exposure: exposure.has_exposure(),
        counterparties_total: exposure.total_counterparties,
        counterparties_users_total: exposure.eoa_counterparty_count,
        counterparties_checked: exposure.checked_count,
        counterparties_tornado_exposed_count: exposure.exposed_count,
        counterparties_tornado_exposed_share: exposure.exposed_share(),
    })
}
