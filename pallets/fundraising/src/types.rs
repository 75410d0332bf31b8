//! Storage and call types of the fundraising pallet.

use crate::Config;
use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use frame_support::BoundedVec;
use frame_system::pallet_prelude::BlockNumberFor;
use scale_info::TypeInfo;
use sp_runtime::{FixedU128, Perbill, RuntimeDebug};

/// Identifier of an auction.
pub type AuctionId = u64;

/// Identifier of a bid, unique within its auction.
pub type BidId = u64;

/// Unix time in milliseconds, as reported by the block timestamp.
pub type Moment = u64;

/// One day in milliseconds; the default length of an extended round.
pub const DEFAULT_EXTENDED_PERIOD: Moment = 24 * 60 * 60 * 1000;

/// Lifecycle of an auction.
#[derive(Clone, Copy, Encode, Decode, DecodeWithMemTracking, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum AuctionStatus {
    /// Created, waiting for its start time.
    Standby,
    /// Accepting bids.
    Started,
    /// Settled; raised funds are released to the auctioneer over time.
    Vesting,
    /// Fully settled.
    Finished,
    /// Cancelled by the auctioneer before it started.
    Cancelled,
}

/// The two auction flavours, as reported in events.
#[derive(Clone, Copy, Encode, Decode, DecodeWithMemTracking, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum AuctionType {
    /// Sells at a fixed price, first come first served.
    FixedPrice,
    /// Sells at a single clearing price computed when bidding closes.
    Batch,
}

/// How a bid expresses its demand.
#[derive(Clone, Copy, Encode, Decode, DecodeWithMemTracking, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum BidType {
    /// Buys at the auction's start price. The amount may be given in either asset.
    FixedPrice,
    /// Spends up to `amount` of the paying asset at no more than `price`.
    BatchWorth,
    /// Buys `amount` of the selling asset at no more than `price`.
    BatchMany,
}

/// A slice of the raised funds and the time it becomes releasable.
#[derive(Clone, Copy, Encode, Decode, DecodeWithMemTracking, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct VestingSchedule {
    /// Unix time in milliseconds.
    pub release_time: Moment,
    /// Share of the raised funds released at `release_time`.
    pub weight: Perbill,
}

/// Runtime-updatable parameters.
#[derive(Clone, Encode, Decode, DecodeWithMemTracking, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub struct FundraisingParams<Balance> {
    /// Native fee paid by the auctioneer on auction creation.
    pub auction_creation_fee: Balance,
    /// Native fee paid by a bidder for every new bid.
    pub place_bid_fee: Balance,
    /// Milliseconds appended to the end time on every extended round.
    pub extended_period: Moment,
}

impl<Balance: Default> Default for FundraisingParams<Balance> {
    fn default() -> Self {
        Self {
            auction_creation_fee: Balance::default(),
            place_bid_fee: Balance::default(),
            extended_period: DEFAULT_EXTENDED_PERIOD,
        }
    }
}

/// Type specific state of an auction.
#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
pub enum AuctionKind<Balance> {
    FixedPrice {
        /// Selling amount not yet claimed by bids.
        remaining_selling_amount: Balance,
    },
    Batch {
        /// Lowest price a bid may carry.
        min_bid_price: FixedU128,
        /// Clearing price, set once the auction is matched.
        matched_price: Option<FixedU128>,
        /// Number of rounds the auction may be extended by.
        max_extended_round: u32,
        /// Change in matched bids below which no further round is added.
        extended_round_rate: Perbill,
    },
}

/// An auction and everything needed to settle it.
#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
#[scale_info(skip_type_params(T))]
pub struct Auction<T: Config> {
    pub id: AuctionId,
    pub kind: AuctionKind<T::Balance>,
    pub auctioneer: T::AccountId,
    /// Fixed price, or the indicative price of a batch auction.
    pub start_price: FixedU128,
    pub selling_asset: T::AssetId,
    pub selling_amount: T::Balance,
    pub paying_asset: T::AssetId,
    pub vesting_schedules: BoundedVec<VestingSchedule, T::MaxVestingSchedules>,
    pub start_time: Moment,
    /// Original end time followed by one entry per extended round.
    pub end_times: BoundedVec<Moment, T::MaxEndTimes>,
    pub status: AuctionStatus,
}

impl<T: Config> Auction<T> {
    pub fn auction_type(&self) -> AuctionType {
        match self.kind {
            AuctionKind::FixedPrice { .. } => AuctionType::FixedPrice,
            AuctionKind::Batch { .. } => AuctionType::Batch,
        }
    }

    /// The end time currently in force.
    pub fn end_time(&self) -> Moment {
        self.end_times.last().copied().unwrap_or_default()
    }

    /// Whether bidding has closed at `now` and the auction is due to be
    /// matched, extended or settled.
    pub fn settles_at(&self, now: Moment) -> bool {
        self.status == AuctionStatus::Started && now >= self.end_time()
    }
}

/// A bid placed by an allowed bidder.
#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
#[scale_info(skip_type_params(T))]
pub struct Bid<T: Config> {
    pub auction_id: AuctionId,
    pub id: BidId,
    pub bidder: T::AccountId,
    pub bid_type: BidType,
    pub price: FixedU128,
    pub asset: T::AssetId,
    pub amount: T::Balance,
    /// Block the bid was placed or last modified in.
    pub height: BlockNumberFor<T>,
    pub is_matched: bool,
}

/// A pending or completed release of raised funds to the auctioneer.
#[derive(Clone, Encode, Decode, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
#[scale_info(skip_type_params(T))]
pub struct VestingQueue<T: Config> {
    pub auctioneer: T::AccountId,
    pub paying_asset: T::AssetId,
    pub amount: T::Balance,
    pub release_time: Moment,
    pub released: bool,
}
