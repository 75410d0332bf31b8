//! Price conversions and vesting arithmetic.
//!
//! All amounts are handled as `u128` so the same code serves any runtime
//! balance type. Every conversion returns `None` on overflow instead of
//! saturating.

use alloc::vec::Vec;
use sp_runtime::{
    helpers_128bit::multiply_by_rational_with_rounding, FixedPointNumber, FixedU128, PerThing,
    Perbill, Rounding,
};

/// Selling units bought by `paying` at `price`, rounded down.
pub fn selling_amount(paying: u128, price: FixedU128) -> Option<u128> {
    if price.into_inner() == 0 {
        return None;
    }
    multiply_by_rational_with_rounding(
        paying,
        FixedU128::DIV,
        price.into_inner(),
        Rounding::Down,
    )
}

/// Paying units owed for `selling` at `price`, rounded up.
pub fn paying_amount(selling: u128, price: FixedU128) -> Option<u128> {
    multiply_by_rational_with_rounding(selling, price.into_inner(), FixedU128::DIV, Rounding::Up)
}

/// Splits `total` by `weights`. Every share is rounded down and the last one
/// takes the remainder, so the shares always add up to `total`.
pub fn split_by_weights(total: u128, weights: &[Perbill]) -> Vec<u128> {
    let mut shares = Vec::with_capacity(weights.len());
    let mut assigned: u128 = 0;
    for (index, weight) in weights.iter().enumerate() {
        let share = if index + 1 == weights.len() {
            total.saturating_sub(assigned)
        } else {
            weight.mul_floor(total)
        };
        assigned = assigned.saturating_add(share);
        shares.push(share);
    }
    shares
}

/// Whether the weights are all non-zero and add up to exactly one.
pub fn weights_sum_to_one(weights: impl IntoIterator<Item = Perbill>) -> bool {
    let mut total: u64 = 0;
    for weight in weights {
        if weight.deconstruct() == 0 {
            return false;
        }
        total += u64::from(weight.deconstruct());
    }
    total == u64::from(Perbill::ACCURACY)
}

/// Relative change between two matched bid counts, `|1 - current / last|`,
/// saturating at one. A previous count of zero counts as a full change.
pub fn change_rate(current: u32, last: u32) -> Perbill {
    if last == 0 {
        return Perbill::one();
    }
    Perbill::from_rational(current.abs_diff(last), last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selling_amount_rounds_down() {
        let price = FixedU128::from_rational(3, 2);
        assert_eq!(selling_amount(100, price), Some(66));
        assert_eq!(selling_amount(0, price), Some(0));
        assert_eq!(selling_amount(100, FixedU128::from_inner(0)), None);
    }

    #[test]
    fn paying_amount_rounds_up() {
        let price = FixedU128::from_rational(3, 2);
        assert_eq!(paying_amount(67, price), Some(101));
        assert_eq!(paying_amount(66, price), Some(99));
        assert_eq!(paying_amount(500, FixedU128::from_rational(4, 5)), Some(400));
    }

    #[test]
    fn paying_amount_overflow_is_none() {
        assert_eq!(paying_amount(u128::MAX, FixedU128::from_u32(2)), None);
    }

    #[test]
    fn split_gives_remainder_to_last_share() {
        let thirds = [
            Perbill::from_parts(333_333_333),
            Perbill::from_parts(333_333_333),
            Perbill::from_parts(333_333_334),
        ];
        let shares = split_by_weights(1_000, &thirds);
        assert_eq!(shares, vec![333, 333, 334]);
        assert_eq!(shares.iter().sum::<u128>(), 1_000);
    }

    #[test]
    fn split_of_nothing_is_all_zero() {
        let halves = [Perbill::from_percent(50), Perbill::from_percent(50)];
        assert_eq!(split_by_weights(0, &halves), vec![0, 0]);
    }

    #[test]
    fn weights_must_be_positive_and_complete() {
        assert!(weights_sum_to_one([Perbill::from_percent(40), Perbill::from_percent(60)]));
        assert!(!weights_sum_to_one([Perbill::from_percent(40), Perbill::from_percent(50)]));
        assert!(!weights_sum_to_one([Perbill::from_parts(0), Perbill::one()]));
        assert!(!weights_sum_to_one([Perbill::one(), Perbill::one()]));
        assert!(!weights_sum_to_one([]));
    }

    #[test]
    fn change_rate_is_symmetric_and_saturates() {
        assert_eq!(change_rate(10, 10), Perbill::from_parts(0));
        assert_eq!(change_rate(9, 10), Perbill::from_percent(10));
        assert_eq!(change_rate(11, 10), Perbill::from_percent(10));
        assert_eq!(change_rate(30, 10), Perbill::one());
        assert_eq!(change_rate(3, 0), Perbill::one());
    }
}
