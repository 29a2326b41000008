use ethers::types::U256;
use log::warn;
use once_cell::sync::Lazy;
use serde::Serialize;

static WEI_PER_ETH: Lazy<U256> = Lazy::new(|| U256::exp10(18));

/// Summary of a multiset of wei amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AmountStats {
    pub count: usize,
    pub total: U256,
    pub mean: U256,
    pub median: U256,
    pub p95: U256,
    pub max: U256,
    pub min_nonzero: U256,
}

/// `AmountStats` rendered in ETH.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountStatsDisplay {
    pub total: String,
    pub mean: String,
    pub median: String,
    pub p95: String,
    pub max: String,
    pub min_nonzero: String,
}

impl AmountStats {
    pub fn empty() -> Self {
        AmountStats {
            count: 0,
            total: U256::zero(),
            mean: U256::zero(),
            median: U256::zero(),
            p95: U256::zero(),
            max: U256::zero(),
            min_nonzero: U256::zero(),
        }
    }

    pub fn from_amounts(amounts: &[U256]) -> Self {
        if amounts.is_empty() {
            return Self::empty();
        }

        let mut sorted = amounts.to_vec();
        sorted.sort();

        let count = sorted.len();
        let total = sorted
            .iter()
            .try_fold(U256::zero(), |acc, v| acc.checked_add(*v))
            .unwrap_or_else(|| {
                warn!("Amount total overflows U256 over {} values, clamping", count);
                U256::MAX
            });
        let mean = total / U256::from(count);

        let mid = count / 2;
        let median = if count % 2 == 0 {
            truncating_average(sorted[mid - 1], sorted[mid])
        } else {
            sorted[mid]
        };

        let p95 = sorted[p95_index(count)];
        let max = sorted[count - 1];
        let min_nonzero = sorted
            .iter()
            .find(|v| !v.is_zero())
            .copied()
            .unwrap_or_default();

        AmountStats {
            count,
            total,
            mean,
            median,
            p95,
            max,
            min_nonzero,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn display(&self) -> AmountStatsDisplay {
        let render = |v: U256| {
            if self.is_empty() {
                "0".to_string()
            } else {
                format_eth(v)
            }
        };

        AmountStatsDisplay {
            total: render(self.total),
            mean: render(self.mean),
            median: render(self.median),
            p95: render(self.p95),
            max: render(self.max),
            min_nonzero: render(self.min_nonzero),
        }
    }
}

/// Index of the 95th percentile in a sorted slice of `len` elements:
/// `ceil(0.95 * len) - 1`, floored at zero.
pub fn p95_index(len: usize) -> usize {
    let rank = (len * 95 + 99) / 100;
    rank.saturating_sub(1)
}

// (a + b) / 2 without overflowing U256.
fn truncating_average(a: U256, b: U256) -> U256 {
    let two = U256::from(2u8);
    a / two + b / two + (a % two + b % two) / two
}

/// Renders wei as ETH, trimming trailing zeros but keeping one fractional
/// digit: `2 * 10^18` becomes `"2.0"`, `5 * 10^14` becomes `"0.0005"`.
pub fn format_eth(wei: U256) -> String {
    let (whole, frac) = wei.div_mod(*WEI_PER_ETH);
    let frac = format!("{:0>18}", frac.to_string());
    let trimmed = frac.trim_end_matches('0');

    if trimmed.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, trimmed)
    }
}

/// Renders `inbound - outbound` as signed ETH.
pub fn format_signed_eth(inbound: U256, outbound: U256) -> String {
    if inbound >= outbound {
        format_eth(inbound - outbound)
    } else {
        format!("-{}", format_eth(outbound - inbound))
    }
}
