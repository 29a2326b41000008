/// # Modules Overview
///
/// This crate builds a single-address forensic report for an Ethereum account:
/// balance, transaction history statistics, ETH flow, transaction types,
/// ERC-20 holdings and exposure to Tornado Cash pools, exported as one CSV row.

/// `analize`
///
/// Pure analytics over a fetched transaction list: overview (time range,
/// active days, busiest day), transaction type breakdown, inbound/outbound
/// ETH flow and the ERC-20 holdings summary.
///
/// Example usage:
/// ```rust,ignore
/// let overview = analize::compute_tx_overview(&txs, 200);
/// let flow = analize::compute_eth_flow(&txs, subject, dust_wei, "0.001");
/// ```
pub mod analize;

pub mod config;

/// `csv`
///
/// Writes a `ReportRow` as a header plus one data row.
///
/// Example usage:
/// ```rust,ignore
/// csv::export_report_csv(&row, &csv::default_report_path(&row.address))?;
/// ```
pub mod csv;

pub mod error;

/// `explorer`
///
/// REST collaborators: the Etherscan `txlist` client behind the
/// `HistorySource` trait and the Covalent ERC-20 balance client.
pub mod explorer;

/// `exposure`
///
/// Counterparty crawler: enumerates counterparties, keeps EOAs, and checks a
/// capped number of them for transactions into Tornado pools under a request
/// pacing policy.
pub mod exposure;

/// `models`
///
/// Core data structures:
/// * `TransactionRecord` – a normal transaction of the subject or a counterparty.
/// * `TokenBalance` – one ERC-20 holding.
/// * `ClassificationCache` – run-scoped contract/EOA answers.
/// * `TxOverview`, `TxTypeBreakdown`, `Erc20Summary`, `ExposureResult` – analysis outputs.
pub mod models;

pub mod report;

/// `scanner`
///
/// Chain RPC access over an `ethers` middleware: ENS/address resolution,
/// balance, code and reverse ENS, plus the `ContractOracle` implementation.
///
/// Example usage:
/// ```rust,ignore
/// let chain = scanner::ChainClient::new(provider);
/// let subject = chain.resolve_input("vitalik.eth").await?;
/// ```
pub mod scanner;

pub mod stats;

pub mod tornado;
