//! Runtime API definition for the fundraising pallet.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use codec::Codec;

/// Auction ids and bid ids as used by the pallet.
pub type AuctionId = u64;
pub type BidId = u64;

sp_api::decl_runtime_apis! {
    /// Read access to auctions, bids and vesting queues.
    pub trait FundraisingApi<AccountId, Balance, Params, Auction, Bid, VestingQueue>
    where
        AccountId: Codec,
        Balance: Codec,
        Params: Codec,
        Auction: Codec,
        Bid: Codec,
        VestingQueue: Codec,
    {
        fn params() -> Params;
        fn auction(auction_id: AuctionId) -> Option<Auction>;
        fn auctions() -> Vec<Auction>;
        fn bid(auction_id: AuctionId, bid_id: BidId) -> Option<Bid>;
        fn bids(auction_id: AuctionId) -> Vec<Bid>;
        fn allowed_bidders(auction_id: AuctionId) -> Vec<(AccountId, Balance)>;
        fn vesting_queues(auction_id: AuctionId) -> Vec<VestingQueue>;
    }
}
