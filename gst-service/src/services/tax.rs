//! GST split-tax computation.
//!
//! Intra-state supplies split the rate evenly into CGST and SGST;
//! inter-state supplies levy the whole rate as IGST. Every amount is
//! rounded to two decimals half-up, each component independently — a
//! cgst+sgst pair need not equal the igst of an equivalent split, which
//! is the accepted, documented asymmetry of the regime.

use crate::models::TaxCalculationResult;
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to two decimals, half-up.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// A supply is inter-state when the buyer's state differs from the
/// seller's. An empty buyer state code (walk-in or unregistered buyer)
/// counts as intra-state; callers relying on this for walk-in customers
/// must be aware it disables inter-state tax.
pub fn is_inter_state(seller_state_code: &str, buyer_state_code: &str) -> bool {
    seller_state_code != buyer_state_code && !buyer_state_code.is_empty()
}

/// Compute the split tax for one taxable amount.
pub fn compute_tax(
    taxable_amount: Decimal,
    seller_state_code: &str,
    buyer_state_code: &str,
    gst_rate: Decimal,
    cess_rate: Decimal,
) -> TaxCalculationResult {
    let inter_state = is_inter_state(seller_state_code, buyer_state_code);
    let hundred = Decimal::from(100);

    let (cgst_rate, sgst_rate, igst_rate) = if inter_state {
        (Decimal::ZERO, Decimal::ZERO, gst_rate)
    } else {
        let half = gst_rate / Decimal::from(2);
        (half, half, Decimal::ZERO)
    };

    let cgst_amount = round_money(taxable_amount * cgst_rate / hundred);
    let sgst_amount = round_money(taxable_amount * sgst_rate / hundred);
    let igst_amount = round_money(taxable_amount * igst_rate / hundred);
    let cess_amount = round_money(taxable_amount * cess_rate / hundred);

    let total_tax = cgst_amount + sgst_amount + igst_amount + cess_amount;
    let grand_total = taxable_amount + total_tax;

    TaxCalculationResult {
        taxable_amount,
        cgst_rate,
        cgst_amount,
        sgst_rate,
        sgst_amount,
        igst_rate,
        igst_amount,
        cess_rate,
        cess_amount,
        total_tax,
        grand_total,
        is_inter_state: inter_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn intra_state_splits_rate_evenly() {
        let result = compute_tax(dec!(10000), "27", "27", dec!(3), dec!(0));
        assert_eq!(result.cgst_rate, dec!(1.5));
        assert_eq!(result.sgst_rate, dec!(1.5));
        assert_eq!(result.igst_rate, dec!(0));
        assert_eq!(result.cgst_amount, dec!(150.00));
        assert_eq!(result.sgst_amount, dec!(150.00));
        assert_eq!(result.igst_amount, dec!(0));
        assert_eq!(result.grand_total, dec!(10300.00));
        assert!(!result.is_inter_state);
    }

    #[test]
    fn inter_state_levies_igst_only() {
        let result = compute_tax(dec!(10000), "27", "29", dec!(3), dec!(0));
        assert_eq!(result.igst_rate, dec!(3));
        assert_eq!(result.igst_amount, dec!(300.00));
        assert_eq!(result.cgst_amount, dec!(0));
        assert_eq!(result.sgst_amount, dec!(0));
        assert_eq!(result.grand_total, dec!(10300.00));
        assert!(result.is_inter_state);
    }

    #[test]
    fn empty_buyer_state_is_intra_state() {
        let result = compute_tax(dec!(1000), "27", "", dec!(18), dec!(0));
        assert!(!result.is_inter_state);
        assert_eq!(result.cgst_rate, dec!(9));
        assert_eq!(result.sgst_rate, dec!(9));
    }

    #[test]
    fn components_round_independently() {
        // 17 × 1.5% = 0.255: both halves round up, so the split total
        // exceeds the igst of the same rate by a paisa.
        let result = compute_tax(dec!(17), "27", "27", dec!(3), dec!(0));
        assert_eq!(result.cgst_amount, dec!(0.26));
        assert_eq!(result.sgst_amount, dec!(0.26));

        let inter = compute_tax(dec!(17), "27", "29", dec!(3), dec!(0));
        assert_eq!(inter.igst_amount, dec!(0.51));
    }

    #[test]
    fn cess_is_added_on_top() {
        let result = compute_tax(dec!(1000), "27", "29", dec!(28), dec!(12));
        assert_eq!(result.igst_amount, dec!(280.00));
        assert_eq!(result.cess_amount, dec!(120.00));
        assert_eq!(result.total_tax, dec!(400.00));
        assert_eq!(result.grand_total, dec!(1400.00));
    }

    fn arb_amount() -> impl Strategy<Value = Decimal> {
        // up to 1 crore, paise precision
        (0i64..=1_000_000_000).prop_map(|paise| Decimal::new(paise, 2))
    }

    fn arb_rate() -> impl Strategy<Value = Decimal> {
        prop_oneof![
            Just(dec!(0)),
            Just(dec!(0.25)),
            Just(dec!(3)),
            Just(dec!(5)),
            Just(dec!(12)),
            Just(dec!(18)),
            Just(dec!(28)),
        ]
    }

    proptest! {
        #[test]
        fn components_sum_to_grand_total(
            amount in arb_amount(),
            rate in arb_rate(),
            cess in arb_rate(),
            inter in any::<bool>(),
        ) {
            let buyer = if inter { "29" } else { "27" };
            let result = compute_tax(amount, "27", buyer, rate, cess);
            let sum = result.taxable_amount
                + result.cgst_amount
                + result.sgst_amount
                + result.igst_amount
                + result.cess_amount;
            prop_assert!((sum - result.grand_total).abs() <= dec!(0.01));
        }

        #[test]
        fn intra_state_rates_split_evenly(amount in arb_amount(), rate in arb_rate()) {
            let result = compute_tax(amount, "27", "27", rate, dec!(0));
            prop_assert_eq!(result.cgst_rate, result.sgst_rate);
            prop_assert_eq!(result.cgst_rate + result.sgst_rate, rate);
            prop_assert_eq!(result.igst_rate, dec!(0));
        }

        #[test]
        fn inter_state_rates_carry_full_rate(amount in arb_amount(), rate in arb_rate()) {
            let result = compute_tax(amount, "27", "29", rate, dec!(0));
            prop_assert_eq!(result.igst_rate, rate);
            prop_assert_eq!(result.cgst_rate, dec!(0));
            prop_assert_eq!(result.sgst_rate, dec!(0));
        }

        #[test]
        fn amounts_always_have_two_decimals(amount in arb_amount(), rate in arb_rate()) {
            let result = compute_tax(amount, "27", "29", rate, dec!(0));
            prop_assert_eq!(result.igst_amount, round_money(result.igst_amount));
            prop_assert_eq!(result.cess_amount, round_money(result.cess_amount));
        }
    }
}
