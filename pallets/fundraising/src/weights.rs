//! Weights for `pallet_fundraising`.
//!
//! Hand-estimated from the storage accesses of each call until the pallet
//! gets benchmarks of its own.

#![allow(unused_parens)]
#![allow(unused_imports)]

use core::marker::PhantomData;
use frame_support::{
    traits::Get,
    weights::{constants::RocksDbWeight, Weight},
};

/// Weight functions needed for `pallet_fundraising`.
pub trait WeightInfo {
    fn create_fixed_price_auction() -> Weight;
    fn create_batch_auction() -> Weight;
    fn cancel_auction() -> Weight;
    fn add_allowed_bidders(n: u32) -> Weight;
    fn update_allowed_bidder() -> Weight;
    fn place_bid(b: u32) -> Weight;
    fn modify_bid() -> Weight;
    fn update_params() -> Weight;
    fn claim() -> Weight;
    fn process_auctions(a: u32) -> Weight;
    fn settle_auction(b: u32) -> Weight;
}

/// Weights for `pallet_fundraising` using the Substrate node and recommended hardware.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: frame_system::Config> WeightInfo for SubstrateWeight<T> {
    /// Storage: `Fundraising::Params`, `Fundraising::NextAuctionId`, `Fundraising::Auctions`,
    /// `Fundraising::LiveAuctions`, `Assets::Account` (r:2 w:2), `System::Account` (r:2 w:2)
    fn create_fixed_price_auction() -> Weight {
        Weight::from_parts(60_000_000, 6_000)
            .saturating_add(T::DbWeight::get().reads(8_u64))
            .saturating_add(T::DbWeight::get().writes(8_u64))
    }
    fn create_batch_auction() -> Weight {
        Weight::from_parts(62_000_000, 6_000)
            .saturating_add(T::DbWeight::get().reads(8_u64))
            .saturating_add(T::DbWeight::get().writes(8_u64))
    }
    /// Storage: `Fundraising::Auctions`, `Fundraising::LiveAuctions`, `Assets::Account` (r:2 w:2)
    fn cancel_auction() -> Weight {
        Weight::from_parts(40_000_000, 4_000)
            .saturating_add(T::DbWeight::get().reads(4_u64))
            .saturating_add(T::DbWeight::get().writes(4_u64))
    }
    /// Storage: `Fundraising::Auctions`, `Fundraising::AllowedBidders` (w:n)
    fn add_allowed_bidders(n: u32) -> Weight {
        Weight::from_parts(15_000_000, 3_500)
            .saturating_add(Weight::from_parts(3_000_000, 0).saturating_mul(n.into()))
            .saturating_add(T::DbWeight::get().reads(1_u64))
            .saturating_add(T::DbWeight::get().writes((1_u64).saturating_mul(n.into())))
    }
    fn update_allowed_bidder() -> Weight {
        Weight::from_parts(15_000_000, 3_500)
            .saturating_add(T::DbWeight::get().reads(2_u64))
            .saturating_add(T::DbWeight::get().writes(1_u64))
    }
    /// Storage: `Fundraising::Bids` (r:b), `Fundraising::AllowedBidders`, `Fundraising::NextBidId`,
    /// `Assets::Account` (r:2 w:2), `System::Account` (r:2 w:2)
    fn place_bid(b: u32) -> Weight {
        Weight::from_parts(55_000_000, 6_000)
            .saturating_add(Weight::from_parts(2_000_000, 0).saturating_mul(b.into()))
            .saturating_add(T::DbWeight::get().reads(8_u64))
            .saturating_add(T::DbWeight::get().reads((1_u64).saturating_mul(b.into())))
            .saturating_add(T::DbWeight::get().writes(7_u64))
    }
    fn modify_bid() -> Weight {
        Weight::from_parts(45_000_000, 6_000)
            .saturating_add(T::DbWeight::get().reads(6_u64))
            .saturating_add(T::DbWeight::get().writes(4_u64))
    }
    fn update_params() -> Weight {
        Weight::from_parts(8_000_000, 1_500).saturating_add(T::DbWeight::get().writes(1_u64))
    }
    /// Storage: `Fundraising::Auctions`, `Fundraising::Claims`, `Assets::Account` (r:2 w:2)
    fn claim() -> Weight {
        Weight::from_parts(50_000_000, 6_000)
            .saturating_add(T::DbWeight::get().reads(5_u64))
            .saturating_add(T::DbWeight::get().writes(4_u64))
    }
    /// Storage: `Fundraising::LiveAuctions` (r:a), `Fundraising::Auctions` (r:a),
    /// `Fundraising::NextBidId` (r:a)
    fn process_auctions(a: u32) -> Weight {
        Weight::from_parts(5_000_000, 1_500)
            .saturating_add(Weight::from_parts(10_000_000, 0).saturating_mul(a.into()))
            .saturating_add(T::DbWeight::get().reads((3_u64).saturating_mul(a.into())))
    }
    /// Storage: `Fundraising::Bids` (r:b w:b), `Fundraising::AllowedBidders` (r:b),
    /// `Assets::Account` (r:2b w:2b). Batch matching is quadratic in `b`.
    fn settle_auction(b: u32) -> Weight {
        let b = u64::from(b);
        Weight::from_parts(60_000_000, 8_000)
            .saturating_add(Weight::from_parts(20_000_000, 0).saturating_mul(b))
            .saturating_add(Weight::from_parts(200_000, 0).saturating_mul(b.saturating_mul(b)))
            .saturating_add(T::DbWeight::get().reads((4_u64).saturating_mul(b).saturating_add(6)))
            .saturating_add(T::DbWeight::get().writes((3_u64).saturating_mul(b).saturating_add(6)))
    }
}

// For backwards compatibility and tests.
impl WeightInfo for () {
    fn create_fixed_price_auction() -> Weight {
        Weight::from_parts(60_000_000, 6_000)
            .saturating_add(RocksDbWeight::get().reads(8_u64))
            .saturating_add(RocksDbWeight::get().writes(8_u64))
    }
    fn create_batch_auction() -> Weight {
        Weight::from_parts(62_000_000, 6_000)
            .saturating_add(RocksDbWeight::get().reads(8_u64))
            .saturating_add(RocksDbWeight::get().writes(8_u64))
    }
    fn cancel_auction() -> Weight {
        Weight::from_parts(40_000_000, 4_000)
            .saturating_add(RocksDbWeight::get().reads(4_u64))
            .saturating_add(RocksDbWeight::get().writes(4_u64))
    }
    fn add_allowed_bidders(n: u32) -> Weight {
        Weight::from_parts(15_000_000, 3_500)
            .saturating_add(Weight::from_parts(3_000_000, 0).saturating_mul(n.into()))
            .saturating_add(RocksDbWeight::get().reads(1_u64))
            .saturating_add(RocksDbWeight::get().writes((1_u64).saturating_mul(n.into())))
    }
    fn update_allowed_bidder() -> Weight {
        Weight::from_parts(15_000_000, 3_500)
            .saturating_add(RocksDbWeight::get().reads(2_u64))
            .saturating_add(RocksDbWeight::get().writes(1_u64))
    }
    fn place_bid(b: u32) -> Weight {
        Weight::from_parts(55_000_000, 6_000)
            .saturating_add(Weight::from_parts(2_000_000, 0).saturating_mul(b.into()))
            .saturating_add(RocksDbWeight::get().reads(8_u64))
            .saturating_add(RocksDbWeight::get().reads((1_u64).saturating_mul(b.into())))
            .saturating_add(RocksDbWeight::get().writes(7_u64))
    }
    fn modify_bid() -> Weight {
        Weight::from_parts(45_000_000, 6_000)
            .saturating_add(RocksDbWeight::get().reads(6_u64))
            .saturating_add(RocksDbWeight::get().writes(4_u64))
    }
    fn update_params() -> Weight {
        Weight::from_parts(8_000_000, 1_500).saturating_add(RocksDbWeight::get().writes(1_u64))
    }
    fn claim() -> Weight {
        Weight::from_parts(50_000_000, 6_000)
            .saturating_add(RocksDbWeight::get().reads(5_u64))
            .saturating_add(RocksDbWeight::get().writes(4_u64))
    }
    fn process_auctions(a: u32) -> Weight {
        Weight::from_parts(5_000_000, 1_500)
            .saturating_add(Weight::from_parts(10_000_000, 0).saturating_mul(a.into()))
            .saturating_add(RocksDbWeight::get().reads((3_u64).saturating_mul(a.into())))
    }
    fn settle_auction(b: u32) -> Weight {
        let b = u64::from(b);
        Weight::from_parts(60_000_000, 8_000)
            .saturating_add(Weight::from_parts(20_000_000, 0).saturating_mul(b))
            .saturating_add(Weight::from_parts(200_000, 0).saturating_mul(b.saturating_mul(b)))
            .saturating_add(RocksDbWeight::get().reads((4_u64).saturating_mul(b).saturating_add(6)))
            .saturating_add(RocksDbWeight::get().writes((3_u64).saturating_mul(b).saturating_add(6)))
    }
}
