//! Cost rollup over a list of priced materials.
//!
//! Fees are fixed percentages of the materials subtotal, each rounded up
//! on its own. The total is the sum of three independently rounded
//! integers, which can exceed a "round once at the end" total by up to 2.

use crate::models::material::MaterialItem;
use serde::Serialize;

/// Transportation fee, percent of the materials subtotal
pub const TRANSPORTATION_PERCENT: u64 = 10;
/// Labor fee, percent of the materials subtotal
pub const LABOR_PERCENT: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CostBreakdown {
    pub materials_subtotal: u64,
    pub transportation_fee: u64,
    pub labor_fee: u64,
    pub total: u64,
}

/// Compute the breakdown for `items`. Defined for the empty slice (all zeros).
pub fn compute_breakdown(items: &[MaterialItem]) -> CostBreakdown {
    let materials_subtotal = items
        .iter()
        .fold(0u64, |sum, item| sum.saturating_add(item.price));
    let transportation_fee = percent_ceil(materials_subtotal, TRANSPORTATION_PERCENT);
    let labor_fee = percent_ceil(materials_subtotal, LABOR_PERCENT);

    CostBreakdown {
        materials_subtotal,
        transportation_fee,
        labor_fee,
        total: materials_subtotal
            .saturating_add(transportation_fee)
            .saturating_add(labor_fee),
    }
}

/// ceil(amount * percent / 100) in exact integer arithmetic
fn percent_ceil(amount: u64, percent: u64) -> u64 {
    let scaled = amount as u128 * percent as u128;
    let fee = scaled.div_ceil(100);
    u64::try_from(fee).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(prices: &[u64]) -> Vec<MaterialItem> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| MaterialItem {
                name: format!("item-{}", i),
                price,
            })
            .collect()
    }

    #[test]
    fn test_empty_is_all_zero() {
        assert_eq!(compute_breakdown(&[]), CostBreakdown::default());
    }

    #[test]
    fn test_tablecloths_example() {
        let breakdown = compute_breakdown(&items(&[300]));
        assert_eq!(
            breakdown,
            CostBreakdown {
                materials_subtotal: 300,
                transportation_fee: 30,
                labor_fee: 45,
                total: 375,
            }
        );
    }

    #[test]
    fn test_fees_round_up_independently() {
        // 10% of 1 = 0.1 -> 1, 15% of 1 = 0.15 -> 1
        let breakdown = compute_breakdown(&items(&[1]));
        assert_eq!(breakdown.transportation_fee, 1);
        assert_eq!(breakdown.labor_fee, 1);
        assert_eq!(breakdown.total, 3);

        // Rounding once would give ceil(1.25) = 2; independent rounding gives 3
        let round_once = 1 + (1u64 * 25).div_ceil(100);
        assert_eq!(breakdown.total - round_once, 1);
    }

    #[test]
    fn test_exact_percentages_have_no_float_drift() {
        // 100 * 0.15 in floating point is 15.000000000000002
        let breakdown = compute_breakdown(&items(&[100]));
        assert_eq!(breakdown.labor_fee, 15);
        assert_eq!(breakdown.transportation_fee, 10);
    }

    #[test]
    fn test_subtotal_sums_in_order_with_duplicates() {
        let breakdown = compute_breakdown(&items(&[500, 500, 2500]));
        assert_eq!(breakdown.materials_subtotal, 3500);
        assert_eq!(breakdown.transportation_fee, 350);
        assert_eq!(breakdown.labor_fee, 525);
        assert_eq!(breakdown.total, 4375);
    }

    #[test]
    fn test_total_matches_formula_over_range() {
        for subtotal in 0..2_000u64 {
            let breakdown = compute_breakdown(&items(&[subtotal]));
            let expected = subtotal + (subtotal * 10).div_ceil(100) + (subtotal * 15).div_ceil(100);
            assert_eq!(breakdown.total, expected, "subtotal {}", subtotal);
            assert!(breakdown.total >= breakdown.materials_subtotal);
            assert!(breakdown.total - round_once(subtotal) <= 2);
        }
    }

    #[test]
    fn test_huge_prices_saturate() {
        let breakdown = compute_breakdown(&items(&[u64::MAX, 10]));
        assert_eq!(breakdown.materials_subtotal, u64::MAX);
        assert_eq!(breakdown.total, u64::MAX);
    }

    fn round_once(subtotal: u64) -> u64 {
        subtotal + (subtotal * 25).div_ceil(100)
    }
}
