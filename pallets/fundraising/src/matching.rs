//! Uniform price matching for batch auctions.
//!
//! Candidate prices are the distinct bid prices, tried from the highest down.
//! At a candidate price every bid priced at or above it is filled in price
//! order, each bidder limited by their max bid amount. The lowest candidate
//! at which the filled amount still fits in the selling amount wins.

use crate::{math, BidId};
use alloc::{collections::btree_map::BTreeMap, vec::Vec};
use sp_runtime::FixedU128;

/// Demand of a single batch bid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Demand {
    /// Paying amount to spend.
    Worth(u128),
    /// Selling amount to buy.
    Many(u128),
}

/// The part of a bid the matcher looks at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchBid<AccountId> {
    pub id: BidId,
    pub bidder: AccountId,
    pub price: FixedU128,
    pub demand: Demand,
}

/// Per bidder outcome of a match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BidderMatch {
    /// Selling amount allocated to the bidder.
    pub matched: u128,
    /// Paying amount owed for it, rounded up.
    pub paid: u128,
}

/// Outcome of matching at one price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult<AccountId: Ord> {
    pub matched_price: FixedU128,
    pub matched_amount: u128,
    pub matched_bids: Vec<BidId>,
    pub by_bidder: BTreeMap<AccountId, BidderMatch>,
}

/// Sorts bids by price descending, then by id ascending.
pub fn sort_bids<AccountId>(bids: &mut [BatchBid<AccountId>]) {
    bids.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id)));
}

/// Finds the clearing price for `bids`.
///
/// `max_bid_amounts` caps the selling amount each bidder can receive; bidders
/// missing from it receive nothing. Returns `None` when not even the highest
/// price can be filled within `selling_amount`.
pub fn match_bids<AccountId: Ord + Clone>(
    mut bids: Vec<BatchBid<AccountId>>,
    max_bid_amounts: &BTreeMap<AccountId, u128>,
    selling_amount: u128,
) -> Option<MatchResult<AccountId>> {
    sort_bids(&mut bids);

    let mut prices: Vec<FixedU128> = bids.iter().map(|bid| bid.price).collect();
    prices.dedup();

    let mut best = None;
    for price in prices {
        match match_at(price, &bids, max_bid_amounts, selling_amount) {
            Some(result) => best = Some(result),
            None => break,
        }
    }
    best
}

/// Fills every bid priced at or above `price`. `bids` must already be sorted.
fn match_at<AccountId: Ord + Clone>(
    price: FixedU128,
    bids: &[BatchBid<AccountId>],
    max_bid_amounts: &BTreeMap<AccountId, u128>,
    selling_amount: u128,
) -> Option<MatchResult<AccountId>> {
    let mut budgets = max_bid_amounts.clone();
    let mut matched_amount: u128 = 0;
    let mut matched_bids = Vec::new();
    let mut matched_by_bidder: BTreeMap<AccountId, u128> = BTreeMap::new();

    for bid in bids.iter().take_while(|bid| bid.price >= price) {
        let wanted = match bid.demand {
            Demand::Worth(paying) => math::selling_amount(paying, price)?,
            Demand::Many(selling) => selling,
        };
        let budget = budgets.get_mut(&bid.bidder);
        let available = budget.as_ref().map_or(0, |b| **b);
        let fill = wanted.min(available);
        if fill == 0 {
            continue;
        }

        matched_amount = matched_amount.checked_add(fill)?;
        if matched_amount > selling_amount {
            return None;
        }
        if let Some(budget) = budget {
            *budget -= fill;
        }
        *matched_by_bidder.entry(bid.bidder.clone()).or_default() += fill;
        matched_bids.push(bid.id);
    }

    let mut by_bidder = BTreeMap::new();
    for (bidder, matched) in matched_by_bidder {
        let paid = math::paying_amount(matched, price)?;
        by_bidder.insert(bidder, BidderMatch { matched, paid });
    }

    Some(MatchResult { matched_price: price, matched_amount, matched_bids, by_bidder })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(id: BidId, bidder: u8, price: FixedU128, demand: Demand) -> BatchBid<u8> {
        BatchBid { id, bidder, price, demand }
    }

    fn caps(entries: &[(u8, u128)]) -> BTreeMap<u8, u128> {
        entries.iter().copied().collect()
    }

    fn price(n: u128, d: u128) -> FixedU128 {
        FixedU128::from_rational(n, d)
    }

    #[test]
    fn lowest_price_that_fits_wins() {
        let bids = vec![
            bid(0, 1, price(1, 1), Demand::Many(500)),
            bid(1, 2, price(4, 5), Demand::Worth(400)),
            bid(2, 3, price(1, 2), Demand::Many(600)),
        ];
        let result =
            match_bids(bids, &caps(&[(1, 1_000), (2, 1_000), (3, 1_000)]), 1_000).unwrap();

        assert_eq!(result.matched_price, price(4, 5));
        assert_eq!(result.matched_amount, 1_000);
        assert_eq!(result.matched_bids, vec![0, 1]);
        assert_eq!(result.by_bidder[&1], BidderMatch { matched: 500, paid: 400 });
        assert_eq!(result.by_bidder[&2], BidderMatch { matched: 500, paid: 400 });
        assert!(!result.by_bidder.contains_key(&3));
    }

    #[test]
    fn undersubscribed_auction_clears_at_lowest_bid() {
        let bids = vec![
            bid(0, 1, price(2, 1), Demand::Many(100)),
            bid(1, 2, price(1, 1), Demand::Many(100)),
        ];
        let result = match_bids(bids, &caps(&[(1, 1_000), (2, 1_000)]), 1_000).unwrap();

        assert_eq!(result.matched_price, price(1, 1));
        assert_eq!(result.matched_amount, 200);
        assert_eq!(result.by_bidder[&1].paid, 100);
    }

    #[test]
    fn max_bid_amount_caps_the_fill() {
        let bids = vec![
            bid(0, 1, price(1, 1), Demand::Many(300)),
            bid(1, 1, price(1, 1), Demand::Many(300)),
        ];
        let result = match_bids(bids, &caps(&[(1, 400)]), 1_000).unwrap();

        assert_eq!(result.matched_amount, 400);
        assert_eq!(result.by_bidder[&1], BidderMatch { matched: 400, paid: 400 });
        assert_eq!(result.matched_bids, vec![0, 1]);
    }

    #[test]
    fn bidders_without_allowance_are_skipped() {
        let bids = vec![bid(0, 1, price(1, 1), Demand::Many(300))];
        assert_eq!(
            match_bids(bids, &caps(&[]), 1_000).map(|r| r.matched_amount),
            Some(0)
        );
    }

    #[test]
    fn oversubscribed_top_price_matches_nothing() {
        let bids = vec![
            bid(0, 1, price(1, 1), Demand::Many(800)),
            bid(1, 2, price(1, 1), Demand::Many(800)),
        ];
        assert!(match_bids(bids, &caps(&[(1, 1_000), (2, 1_000)]), 1_000).is_none());
    }

    #[test]
    fn no_bids_means_no_match() {
        assert!(match_bids::<u8>(vec![], &caps(&[]), 1_000).is_none());
    }

    #[test]
    fn equal_prices_fill_in_bid_order() {
        let mut bids = vec![
            bid(3, 1, price(1, 1), Demand::Many(1)),
            bid(1, 2, price(2, 1), Demand::Many(1)),
            bid(2, 3, price(1, 1), Demand::Many(1)),
        ];
        sort_bids(&mut bids);
        let ids: Vec<BidId> = bids.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
