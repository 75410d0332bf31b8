//! # Fundraising Pallet
//!
//! Token offerings run as on-chain auctions.
//!
//! ## Overview
//!
//! - An auctioneer locks a selling asset in a per-auction reserve account and
//!   sells it for a paying asset, either at a fixed price or in a batch auction
//!   that clears at a single uniform price.
//! - Only allowed bidders may bid, each up to a max bid amount expressed in
//!   the selling asset.
//! - Bids lock their paying amount in the auction's paying reserve.
//! - Once the end time passes the auction is settled: bidders receive their
//!   selling units and refunds, unsold units go back to the auctioneer, and
//!   the raised funds are released to the auctioneer by vesting schedule.
//! - A payout the recipient cannot take at settlement stays in the reserve as
//!   a claim and is collected later with `claim`.
//! - A batch auction may be extended by additional rounds while the number of
//!   matched bids keeps changing by at least `extended_round_rate`.
//!
//! State transitions are driven from `on_finalize`, using the block timestamp.

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[cfg(test)]
mod mock;

pub mod matching;
pub mod math;
pub mod types;
pub mod weights;

pub use types::*;
pub use weights::WeightInfo;

extern crate alloc;

const LOG_TARGET: &str = "fundraising";

#[frame_support::pallet]
pub mod pallet {
    use super::*;
    use alloc::{collections::btree_map::BTreeMap, collections::btree_set::BTreeSet, vec::Vec};
    use frame_support::{
        pallet_prelude::*,
        storage::with_storage_layer,
        traits::{
            fungible, fungibles,
            tokens::{DepositConsequence, Preservation, Provenance},
            UnixTime,
        },
        PalletId,
    };
    use frame_system::pallet_prelude::*;
    use sp_runtime::{
        traits::{AccountIdConversion, AtLeast32BitUnsigned, MaybeSerializeDeserialize, Zero},
        FixedPointNumber, FixedU128, Perbill, SaturatedConversion, Saturating,
    };

    /// The in-code storage version.
    const STORAGE_VERSION: StorageVersion = StorageVersion::new(1);

    /// Parameters as stored for this runtime.
    pub type ParamsOf<T> = FundraisingParams<<T as Config>::Balance>;

    /// Allowed bidders and their max bid amounts, as passed to `add_allowed_bidders`.
    pub type AllowedBiddersOf<T> = BoundedVec<
        (<T as frame_system::Config>::AccountId, <T as Config>::Balance),
        <T as Config>::MaxAllowedBiddersPerCall,
    >;

    #[pallet::pallet]
    #[pallet::storage_version(STORAGE_VERSION)]
    pub struct Pallet<T>(_);

    #[pallet::config]
    pub trait Config: frame_system::Config {
        /// The overarching event type.
        type RuntimeEvent: From<Event<Self>> + IsType<<Self as frame_system::Config>::RuntimeEvent>;

        /// Identifier of the assets being sold and paid with.
        type AssetId: Parameter + Member + Copy + Ord + MaxEncodedLen;

        /// Balance type shared by the assets and the native currency.
        type Balance: Parameter
            + Member
            + AtLeast32BitUnsigned
            + Copy
            + Default
            + MaxEncodedLen
            + MaybeSerializeDeserialize;

        /// The assets auctions sell and are paid with.
        type Assets: fungibles::Mutate<Self::AccountId, AssetId = Self::AssetId, Balance = Self::Balance>;

        /// The native currency the fees are charged in.
        type Currency: fungible::Mutate<Self::AccountId, Balance = Self::Balance>;

        /// Source of the current time.
        type UnixTime: UnixTime;

        /// Derives the reserve accounts of every auction.
        #[pallet::constant]
        type PalletId: Get<PalletId>;

        /// Receives auction creation and bid fees.
        #[pallet::constant]
        type FeeCollector: Get<Self::AccountId>;

        /// Maximum number of vesting schedules per auction.
        #[pallet::constant]
        type MaxVestingSchedules: Get<u32>;

        /// Maximum number of end times per auction, i.e. extended rounds plus one.
        #[pallet::constant]
        type MaxEndTimes: Get<u32>;

        /// Maximum number of bidders added in a single call.
        #[pallet::constant]
        type MaxAllowedBiddersPerCall: Get<u32>;

        /// Maximum number of bids per auction.
        #[pallet::constant]
        type MaxBidsPerAuction: Get<u32>;

        /// Maximum number of auctions waiting for block processing.
        #[pallet::constant]
        type MaxLiveAuctions: Get<u32>;

        /// Maximum number of auctions settled in one block. Auctions over the
        /// limit settle in a following block.
        #[pallet::constant]
        type MaxSettlementsPerBlock: Get<u32>;

        /// Weight information for extrinsics in this pallet.
        type WeightInfo: WeightInfo;
    }

    #[pallet::storage]
    pub type Params<T: Config> = StorageValue<_, ParamsOf<T>, ValueQuery>;

    #[pallet::storage]
    pub type NextAuctionId<T> = StorageValue<_, AuctionId, ValueQuery>;

    #[pallet::storage]
    pub type Auctions<T: Config> = StorageMap<_, Blake2_128Concat, AuctionId, Auction<T>>;

    /// Auctions that still need block processing.
    #[pallet::storage]
    pub type LiveAuctions<T: Config> = CountedStorageMap<_, Blake2_128Concat, AuctionId, ()>;

    /// Max bid amount, in selling units, of every allowed bidder.
    #[pallet::storage]
    pub type AllowedBidders<T: Config> = StorageDoubleMap<
        _,
        Blake2_128Concat,
        AuctionId,
        Blake2_128Concat,
        T::AccountId,
        T::Balance,
    >;

    #[pallet::storage]
    pub type NextBidId<T: Config> = StorageMap<_, Blake2_128Concat, AuctionId, BidId, ValueQuery>;

    #[pallet::storage]
    pub type Bids<T: Config> =
        StorageDoubleMap<_, Blake2_128Concat, AuctionId, Blake2_128Concat, BidId, Bid<T>>;

    #[pallet::storage]
    pub type VestingQueues<T: Config> = StorageMap<
        _,
        Blake2_128Concat,
        AuctionId,
        BoundedVec<VestingQueue<T>, T::MaxVestingSchedules>,
        ValueQuery,
    >;

    /// Matched bid count of the previous round of a batch auction.
    #[pallet::storage]
    pub type LastMatchedBidsLen<T: Config> = StorageMap<_, Blake2_128Concat, AuctionId, u32>;

    /// Settlement payouts still held in an auction's reserves, by recipient and asset.
    #[pallet::storage]
    pub type Claims<T: Config> = StorageNMap<
        _,
        (
            NMapKey<Blake2_128Concat, AuctionId>,
            NMapKey<Blake2_128Concat, T::AccountId>,
            NMapKey<Blake2_128Concat, T::AssetId>,
        ),
        T::Balance,
        ValueQuery,
    >;

    #[pallet::genesis_config]
    pub struct GenesisConfig<T: Config> {
        pub auction_creation_fee: T::Balance,
        pub place_bid_fee: T::Balance,
        pub extended_period: Moment,
    }

    impl<T: Config> Default for GenesisConfig<T> {
        fn default() -> Self {
            let params = ParamsOf::<T>::default();
            Self {
                auction_creation_fee: params.auction_creation_fee,
                place_bid_fee: params.place_bid_fee,
                extended_period: params.extended_period,
            }
        }
    }

    #[pallet::genesis_build]
    impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
        fn build(&self) {
            Params::<T>::put(FundraisingParams {
                auction_creation_fee: self.auction_creation_fee,
                place_bid_fee: self.place_bid_fee,
                extended_period: self.extended_period,
            });
        }
    }

    #[pallet::event]
    #[pallet::generate_deposit(pub(super) fn deposit_event)]
    pub enum Event<T: Config> {
        AuctionCreated {
            auction_id: AuctionId,
            auction_type: AuctionType,
            auctioneer: T::AccountId,
            selling_asset: T::AssetId,
            selling_amount: T::Balance,
            paying_asset: T::AssetId,
            start_price: FixedU128,
            status: AuctionStatus,
        },
        AuctionCancelled { auction_id: AuctionId },
        AllowedBidderAdded { auction_id: AuctionId, bidder: T::AccountId, max_bid_amount: T::Balance },
        AllowedBidderUpdated { auction_id: AuctionId, bidder: T::AccountId, max_bid_amount: T::Balance },
        BidPlaced {
            auction_id: AuctionId,
            bid_id: BidId,
            bidder: T::AccountId,
            bid_type: BidType,
            price: FixedU128,
            asset: T::AssetId,
            amount: T::Balance,
        },
        BidModified {
            auction_id: AuctionId,
            bid_id: BidId,
            bidder: T::AccountId,
            price: FixedU128,
            amount: T::Balance,
        },
        AuctionStarted { auction_id: AuctionId },
        /// A batch auction got another round ending at `end_time`.
        RoundExtended { auction_id: AuctionId, end_time: Moment },
        /// A batch auction cleared.
        AuctionMatched {
            auction_id: AuctionId,
            matched_price: FixedU128,
            matched_amount: T::Balance,
            matched_bids: u32,
        },
        AuctionVesting { auction_id: AuctionId },
        VestingReleased {
            auction_id: AuctionId,
            auctioneer: T::AccountId,
            asset: T::AssetId,
            amount: T::Balance,
            release_time: Moment,
        },
        AuctionFinished { auction_id: AuctionId },
        ParamsUpdated { params: ParamsOf<T> },
        /// A settlement payout failed and was kept as a claim.
        PayoutDeferred { auction_id: AuctionId, who: T::AccountId, asset: T::AssetId, amount: T::Balance },
        Claimed { auction_id: AuctionId, who: T::AccountId, asset: T::AssetId, amount: T::Balance },
    }

    #[pallet::error]
    pub enum Error<T> {
        /// No auction with the given id.
        AuctionNotFound,
        /// The auction is not in a status that allows the operation.
        InvalidAuctionStatus,
        /// Only the auctioneer may do this.
        NotAuctioneer,
        /// Start price and min bid price must be positive.
        InvalidStartPrice,
        /// The selling amount must be positive.
        ZeroSellingAmount,
        /// Selling and paying asset must differ.
        SameAsset,
        /// End time must be after the start time and after now.
        InvalidEndTime,
        /// Release times must be at or after the end time and strictly increasing,
        /// weights must be positive and add up to one.
        InvalidVestingSchedules,
        /// Too many vesting schedules.
        TooManyVestingSchedules,
        /// Extended rounds need a positive rate and must fit the end time bound.
        InvalidExtendedRound,
        /// Max bid amounts must be positive.
        InvalidMaxBidAmount,
        /// The same bidder appears twice in one call.
        DuplicateBidder,
        /// The account is not an allowed bidder of the auction.
        NotAllowedBidder,
        /// The bid type does not fit the auction type.
        BidTypeMismatch,
        /// A fixed price bid must carry the start price.
        InvalidBidPrice,
        /// A batch bid is priced below the min bid price.
        BidPriceTooLow,
        /// The bid is denominated in the wrong asset.
        InvalidBidAsset,
        /// The bid amount must be positive.
        ZeroBidAmount,
        /// The bid buys no selling unit at its price.
        BidAmountTooSmall,
        /// The fixed price auction has fewer selling units left.
        InsufficientRemainingAmount,
        /// The bid exceeds the bidder's max bid amount.
        OverMaxBidAmountLimit,
        /// The auction accepts no more bids.
        TooManyBids,
        /// No bid with the given id.
        BidNotFound,
        /// Only the bidder may modify the bid.
        NotBidder,
        /// Only batch auction bids may be modified.
        NotBatchAuction,
        /// Neither price nor amount may decrease.
        BidDecreased,
        /// A modification must increase the price or the amount.
        BidUnchanged,
        /// The bidder could not hold the selling amount the bid buys.
        AllocationNotReceivable,
        /// Too many auctions are waiting for block processing.
        TooManyLiveAuctions,
        /// Nothing is held for the caller in this asset.
        NothingToClaim,
        /// Arithmetic overflow.
        Overflow,
    }

    #[pallet::hooks]
    impl<T: Config> Hooks<BlockNumberFor<T>> for Pallet<T> {
        fn on_initialize(_n: BlockNumberFor<T>) -> Weight {
            // Only the heaviest `MaxSettlementsPerBlock` auctions can settle this block.
            let mut settlements: Vec<Weight> = LiveAuctions::<T>::iter_keys()
                .map(|auction_id| {
                    T::WeightInfo::settle_auction(NextBidId::<T>::get(auction_id).saturated_into())
                })
                .collect();
            settlements.sort_by(|a, b| b.ref_time().cmp(&a.ref_time()));
            settlements
                .into_iter()
                .take(T::MaxSettlementsPerBlock::get() as usize)
                .fold(T::WeightInfo::process_auctions(LiveAuctions::<T>::count()), |total, weight| {
                    total.saturating_add(weight)
                })
        }

        fn on_finalize(_n: BlockNumberFor<T>) {
            Self::process_auctions(Self::now());
        }
    }

    #[pallet::call]
    impl<T: Config> Pallet<T> {
        /// Create an auction selling `selling_amount` of `selling_asset` at `start_price`.
        #[pallet::call_index(0)]
        #[pallet::weight(T::WeightInfo::create_fixed_price_auction())]
        pub fn create_fixed_price_auction(
            origin: OriginFor<T>,
            start_price: FixedU128,
            selling_asset: T::AssetId,
            selling_amount: T::Balance,
            paying_asset: T::AssetId,
            vesting_schedules: Vec<VestingSchedule>,
            start_time: Moment,
            end_time: Moment,
        ) -> DispatchResult {
            let auctioneer = ensure_signed(origin)?;
            let kind = AuctionKind::FixedPrice { remaining_selling_amount: selling_amount };
            Self::do_create_auction(
                auctioneer,
                kind,
                start_price,
                selling_asset,
                selling_amount,
                paying_asset,
                vesting_schedules,
                start_time,
                end_time,
            )
        }

        /// Create an auction that clears at a single price once bidding ends.
        #[pallet::call_index(1)]
        #[pallet::weight(T::WeightInfo::create_batch_auction())]
        pub fn create_batch_auction(
            origin: OriginFor<T>,
            start_price: FixedU128,
            min_bid_price: FixedU128,
            selling_asset: T::AssetId,
            selling_amount: T::Balance,
            paying_asset: T::AssetId,
            vesting_schedules: Vec<VestingSchedule>,
            max_extended_round: u32,
            extended_round_rate: Perbill,
            start_time: Moment,
            end_time: Moment,
        ) -> DispatchResult {
            let auctioneer = ensure_signed(origin)?;
            ensure!(min_bid_price.into_inner() > 0, Error::<T>::InvalidStartPrice);
            ensure!(
                max_extended_round < T::MaxEndTimes::get(),
                Error::<T>::InvalidExtendedRound
            );
            ensure!(
                max_extended_round == 0 || extended_round_rate > Perbill::from_parts(0),
                Error::<T>::InvalidExtendedRound
            );
            let kind = AuctionKind::Batch {
                min_bid_price,
                matched_price: None,
                max_extended_round,
                extended_round_rate,
            };
            Self::do_create_auction(
                auctioneer,
                kind,
                start_price,
                selling_asset,
                selling_amount,
                paying_asset,
                vesting_schedules,
                start_time,
                end_time,
            )
        }

        /// Cancel an auction that has not started yet and take back its selling asset.
        #[pallet::call_index(2)]
        #[pallet::weight(T::WeightInfo::cancel_auction())]
        pub fn cancel_auction(origin: OriginFor<T>, auction_id: AuctionId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let mut auction = Auctions::<T>::get(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
            ensure!(auction.auctioneer == who, Error::<T>::NotAuctioneer);
            ensure!(auction.status == AuctionStatus::Standby, Error::<T>::InvalidAuctionStatus);

            let reserve = Self::selling_reserve_account(auction_id);
            let locked = <T::Assets as fungibles::Inspect<_>>::balance(auction.selling_asset, &reserve);
            Self::transfer_asset(auction.selling_asset, &reserve, &auction.auctioneer, locked)?;

            if let AuctionKind::FixedPrice { remaining_selling_amount } = &mut auction.kind {
                *remaining_selling_amount = Zero::zero();
            }
            auction.status = AuctionStatus::Cancelled;
            Auctions::<T>::insert(auction_id, auction);
            LiveAuctions::<T>::remove(auction_id);

            Self::deposit_event(Event::AuctionCancelled { auction_id });
            Ok(())
        }

        /// Allow accounts to bid, each up to a max bid amount in selling units.
        ///
        /// Bidders already allowed get their max bid amount replaced.
        #[pallet::call_index(3)]
        #[pallet::weight(T::WeightInfo::add_allowed_bidders(bidders.len() as u32))]
        pub fn add_allowed_bidders(
            origin: OriginFor<T>,
            auction_id: AuctionId,
            bidders: AllowedBiddersOf<T>,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let auction = Self::biddable_auction_of(auction_id, &who)?;

            let mut seen = BTreeSet::new();
            for (bidder, max_bid_amount) in bidders.iter() {
                ensure!(!max_bid_amount.is_zero(), Error::<T>::InvalidMaxBidAmount);
                ensure!(seen.insert(bidder), Error::<T>::DuplicateBidder);
            }

            for (bidder, max_bid_amount) in bidders {
                AllowedBidders::<T>::insert(auction.id, &bidder, max_bid_amount);
                Self::deposit_event(Event::AllowedBidderAdded {
                    auction_id,
                    bidder,
                    max_bid_amount,
                });
            }
            Ok(())
        }

        /// Change the max bid amount of an allowed bidder.
        #[pallet::call_index(4)]
        #[pallet::weight(T::WeightInfo::update_allowed_bidder())]
        pub fn update_allowed_bidder(
            origin: OriginFor<T>,
            auction_id: AuctionId,
            bidder: T::AccountId,
            max_bid_amount: T::Balance,
        ) -> DispatchResult {
            let who = ensure_signed(origin)?;
            Self::biddable_auction_of(auction_id, &who)?;
            ensure!(!max_bid_amount.is_zero(), Error::<T>::InvalidMaxBidAmount);
            ensure!(
                AllowedBidders::<T>::contains_key(auction_id, &bidder),
                Error::<T>::NotAllowedBidder
            );

            AllowedBidders::<T>::insert(auction_id, &bidder, max_bid_amount);
            Self::deposit_event(Event::AllowedBidderUpdated { auction_id, bidder, max_bid_amount });
            Ok(())
        }

        /// Place a bid and lock its paying amount.
        #[pallet::call_index(5)]
        #[pallet::weight(T::WeightInfo::place_bid(T::MaxBidsPerAuction::get()))]
        pub fn place_bid(
            origin: OriginFor<T>,
            auction_id: AuctionId,
            bid_type: BidType,
            price: FixedU128,
            asset: T::AssetId,
            amount: T::Balance,
        ) -> DispatchResult {
            let bidder = ensure_signed(origin)?;
            let mut auction = Auctions::<T>::get(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
            ensure!(auction.status == AuctionStatus::Started, Error::<T>::InvalidAuctionStatus);
            let max_bid_amount = AllowedBidders::<T>::get(auction_id, &bidder)
                .ok_or(Error::<T>::NotAllowedBidder)?;
            ensure!(!amount.is_zero(), Error::<T>::ZeroBidAmount);

            let bid_id = NextBidId::<T>::get(auction_id);
            ensure!(
                bid_id < u64::from(T::MaxBidsPerAuction::get()),
                Error::<T>::TooManyBids
            );

            let (selling, paying) = Self::bid_amounts(&auction, bid_type, price, asset, amount)?;
            let max_bid_amount = Self::to_u128(max_bid_amount);
            let is_matched = match &mut auction.kind {
                AuctionKind::FixedPrice { remaining_selling_amount } => {
                    let remaining = Self::to_u128(*remaining_selling_amount);
                    ensure!(selling <= remaining, Error::<T>::InsufficientRemainingAmount);
                    let already = Self::fixed_price_total_of(&auction.paying_asset, auction_id, &bidder)?;
                    let total = already.checked_add(selling).ok_or(Error::<T>::Overflow)?;
                    ensure!(total <= max_bid_amount, Error::<T>::OverMaxBidAmountLimit);
                    Self::ensure_receivable(auction.selling_asset, &bidder, total)?;
                    *remaining_selling_amount = Self::to_balance(remaining - selling)?;
                    true
                }
                AuctionKind::Batch { .. } => {
                    ensure!(selling <= max_bid_amount, Error::<T>::OverMaxBidAmountLimit);
                    Self::ensure_receivable(auction.selling_asset, &bidder, selling)?;
                    false
                }
            };

            Self::charge_fee(&bidder, Params::<T>::get().place_bid_fee)?;
            Self::transfer_asset(
                auction.paying_asset,
                &bidder,
                &Self::paying_reserve_account(auction_id),
                Self::to_balance(paying)?,
            )?;

            let bid = Bid {
                auction_id,
                id: bid_id,
                bidder: bidder.clone(),
                bid_type,
                price,
                asset,
                amount,
                height: frame_system::Pallet::<T>::block_number(),
                is_matched,
            };
            Bids::<T>::insert(auction_id, bid_id, bid);
            NextBidId::<T>::insert(auction_id, bid_id + 1);
            if is_matched {
                Auctions::<T>::insert(auction_id, auction);
            }

            Self::deposit_event(Event::BidPlaced {
                auction_id,
                bid_id,
                bidder,
                bid_type,
                price,
                asset,
                amount,
            });
            Ok(())
        }

        /// Raise the price or the amount of a batch auction bid.
        #[pallet::call_index(6)]
        #[pallet::weight(T::WeightInfo::modify_bid())]
        pub fn modify_bid(
            origin: OriginFor<T>,
            auction_id: AuctionId,
            bid_id: BidId,
            price: FixedU128,
            amount: T::Balance,
        ) -> DispatchResult {
            let bidder = ensure_signed(origin)?;
            let auction = Auctions::<T>::get(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
            ensure!(auction.status == AuctionStatus::Started, Error::<T>::InvalidAuctionStatus);
            ensure!(
                matches!(auction.kind, AuctionKind::Batch { .. }),
                Error::<T>::NotBatchAuction
            );
            let mut bid = Bids::<T>::get(auction_id, bid_id).ok_or(Error::<T>::BidNotFound)?;
            ensure!(bid.bidder == bidder, Error::<T>::NotBidder);
            ensure!(price >= bid.price && amount >= bid.amount, Error::<T>::BidDecreased);
            ensure!(price > bid.price || amount > bid.amount, Error::<T>::BidUnchanged);
            let max_bid_amount = AllowedBidders::<T>::get(auction_id, &bidder)
                .ok_or(Error::<T>::NotAllowedBidder)?;

            let (_, locked) = Self::bid_amounts(&auction, bid.bid_type, bid.price, bid.asset, bid.amount)?;
            let (selling, paying) = Self::bid_amounts(&auction, bid.bid_type, price, bid.asset, amount)?;
            ensure!(selling <= Self::to_u128(max_bid_amount), Error::<T>::OverMaxBidAmountLimit);
            Self::ensure_receivable(auction.selling_asset, &bidder, selling)?;

            Self::transfer_asset(
                auction.paying_asset,
                &bidder,
                &Self::paying_reserve_account(auction_id),
                Self::to_balance(paying.saturating_sub(locked))?,
            )?;

            bid.price = price;
            bid.amount = amount;
            bid.height = frame_system::Pallet::<T>::block_number();
            Bids::<T>::insert(auction_id, bid_id, bid);

            Self::deposit_event(Event::BidModified { auction_id, bid_id, bidder, price, amount });
            Ok(())
        }

        /// Replace the module parameters.
        #[pallet::call_index(7)]
        #[pallet::weight(T::WeightInfo::update_params())]
        pub fn update_params(origin: OriginFor<T>, params: ParamsOf<T>) -> DispatchResult {
            ensure_root(origin)?;
            Params::<T>::put(params.clone());
            Self::deposit_event(Event::ParamsUpdated { params });
            Ok(())
        }

        /// Collect a settlement payout that could not be made at settlement.
        #[pallet::call_index(8)]
        #[pallet::weight(T::WeightInfo::claim())]
        pub fn claim(origin: OriginFor<T>, auction_id: AuctionId, asset: T::AssetId) -> DispatchResult {
            let who = ensure_signed(origin)?;
            let auction = Auctions::<T>::get(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
            let amount = Claims::<T>::get((auction_id, &who, asset));
            ensure!(!amount.is_zero(), Error::<T>::NothingToClaim);

            let reserve = if asset == auction.selling_asset {
                Self::selling_reserve_account(auction_id)
            } else {
                Self::paying_reserve_account(auction_id)
            };
            Self::withdraw_from_reserve(asset, &reserve, &who, amount)?;
            Claims::<T>::remove((auction_id, &who, asset));

            Self::deposit_event(Event::Claimed { auction_id, who, asset, amount });
            Ok(())
        }
    }

    impl<T: Config> Pallet<T> {
        /// Current block time in milliseconds.
        pub fn now() -> Moment {
            T::UnixTime::now().as_millis().saturated_into()
        }

        /// Account holding the selling asset of an auction until settlement.
        pub fn selling_reserve_account(auction_id: AuctionId) -> T::AccountId {
            T::PalletId::get().into_sub_account_truncating((b"selling", auction_id))
        }

        /// Account holding the paying amounts locked by bids, and the raised
        /// funds until their vesting release.
        pub fn paying_reserve_account(auction_id: AuctionId) -> T::AccountId {
            T::PalletId::get().into_sub_account_truncating((b"paying", auction_id))
        }

        /// All bids of an auction, in id order.
        pub fn bids_of(auction_id: AuctionId) -> Vec<Bid<T>> {
            let mut bids: Vec<Bid<T>> = Bids::<T>::iter_prefix_values(auction_id).collect();
            bids.sort_by_key(|bid| bid.id);
            bids
        }

        /// All allowed bidders of an auction with their max bid amounts.
        pub fn allowed_bidders_of(auction_id: AuctionId) -> Vec<(T::AccountId, T::Balance)> {
            AllowedBidders::<T>::iter_prefix(auction_id).collect()
        }

        /// Selling and paying amounts of a bid, checked against the auction.
        pub fn bid_amounts(
            auction: &Auction<T>,
            bid_type: BidType,
            price: FixedU128,
            asset: T::AssetId,
            amount: T::Balance,
        ) -> Result<(u128, u128), DispatchError> {
            let amount = Self::to_u128(amount);
            let paying_in = asset == auction.paying_asset;
            let selling_in = asset == auction.selling_asset;

            match (&auction.kind, bid_type) {
                (AuctionKind::FixedPrice { .. }, BidType::FixedPrice) => {
                    ensure!(price == auction.start_price, Error::<T>::InvalidBidPrice);
                    ensure!(paying_in || selling_in, Error::<T>::InvalidBidAsset);
                }
                (AuctionKind::Batch { min_bid_price, .. }, BidType::BatchWorth) => {
                    ensure!(price >= *min_bid_price, Error::<T>::BidPriceTooLow);
                    ensure!(paying_in, Error::<T>::InvalidBidAsset);
                }
                (AuctionKind::Batch { min_bid_price, .. }, BidType::BatchMany) => {
                    ensure!(price >= *min_bid_price, Error::<T>::BidPriceTooLow);
                    ensure!(selling_in, Error::<T>::InvalidBidAsset);
                }
                _ => return Err(Error::<T>::BidTypeMismatch.into()),
            }

            let (selling, paying) = if paying_in {
                (math::selling_amount(amount, price).ok_or(Error::<T>::Overflow)?, amount)
            } else {
                (amount, math::paying_amount(amount, price).ok_or(Error::<T>::Overflow)?)
            };
            ensure!(selling > 0, Error::<T>::BidAmountTooSmall);
            Ok((selling, paying))
        }

        fn do_create_auction(
            auctioneer: T::AccountId,
            kind: AuctionKind<T::Balance>,
            start_price: FixedU128,
            selling_asset: T::AssetId,
            selling_amount: T::Balance,
            paying_asset: T::AssetId,
            vesting_schedules: Vec<VestingSchedule>,
            start_time: Moment,
            end_time: Moment,
        ) -> DispatchResult {
            ensure!(start_price.into_inner() > 0, Error::<T>::InvalidStartPrice);
            ensure!(!selling_amount.is_zero(), Error::<T>::ZeroSellingAmount);
            ensure!(selling_asset != paying_asset, Error::<T>::SameAsset);
            ensure!(end_time > start_time, Error::<T>::InvalidEndTime);
            let now = Self::now();
            ensure!(end_time > now, Error::<T>::InvalidEndTime);
            Self::validate_vesting_schedules(&vesting_schedules, end_time)?;
            let vesting_schedules: BoundedVec<_, T::MaxVestingSchedules> = vesting_schedules
                .try_into()
                .map_err(|_| Error::<T>::TooManyVestingSchedules)?;
            let end_times = BoundedVec::try_from(alloc::vec![end_time])
                .map_err(|_| Error::<T>::InvalidExtendedRound)?;

            ensure!(
                LiveAuctions::<T>::count() < T::MaxLiveAuctions::get(),
                Error::<T>::TooManyLiveAuctions
            );
            let auction_id = NextAuctionId::<T>::get();
            let next_id = auction_id.checked_add(1).ok_or(Error::<T>::Overflow)?;

            Self::charge_fee(&auctioneer, Params::<T>::get().auction_creation_fee)?;
            for reserve in
                [Self::selling_reserve_account(auction_id), Self::paying_reserve_account(auction_id)]
            {
                if !frame_system::Pallet::<T>::account_exists(&reserve) {
                    frame_system::Pallet::<T>::inc_providers(&reserve);
                }
            }
            Self::transfer_asset(
                selling_asset,
                &auctioneer,
                &Self::selling_reserve_account(auction_id),
                selling_amount,
            )?;

            let status = if start_time <= now { AuctionStatus::Started } else { AuctionStatus::Standby };
            let auction = Auction::<T> {
                id: auction_id,
                kind,
                auctioneer: auctioneer.clone(),
                start_price,
                selling_asset,
                selling_amount,
                paying_asset,
                vesting_schedules,
                start_time,
                end_times,
                status,
            };
            let auction_type = auction.auction_type();
            Auctions::<T>::insert(auction_id, auction);
            LiveAuctions::<T>::insert(auction_id, ());
            NextAuctionId::<T>::put(next_id);

            log::debug!(target: LOG_TARGET, "auction {} created by {:?}", auction_id, auctioneer);
            Self::deposit_event(Event::AuctionCreated {
                auction_id,
                auction_type,
                auctioneer,
                selling_asset,
                selling_amount,
                paying_asset,
                start_price,
                status,
            });
            Ok(())
        }

        fn validate_vesting_schedules(
            schedules: &[VestingSchedule],
            end_time: Moment,
        ) -> DispatchResult {
            if schedules.is_empty() {
                return Ok(());
            }
            let mut previous: Option<Moment> = None;
            for schedule in schedules {
                ensure!(schedule.release_time > end_time, Error::<T>::InvalidVestingSchedules);
                if let Some(previous) = previous {
                    ensure!(schedule.release_time > previous, Error::<T>::InvalidVestingSchedules);
                }
                previous = Some(schedule.release_time);
            }
            ensure!(
                math::weights_sum_to_one(schedules.iter().map(|s| s.weight)),
                Error::<T>::InvalidVestingSchedules
            );
            Ok(())
        }

        /// The auction, if `who` runs it and it still takes bidders.
        fn biddable_auction_of(
            auction_id: AuctionId,
            who: &T::AccountId,
        ) -> Result<Auction<T>, DispatchError> {
            let auction = Auctions::<T>::get(auction_id).ok_or(Error::<T>::AuctionNotFound)?;
            ensure!(&auction.auctioneer == who, Error::<T>::NotAuctioneer);
            ensure!(
                matches!(auction.status, AuctionStatus::Standby | AuctionStatus::Started),
                Error::<T>::InvalidAuctionStatus
            );
            Ok(auction)
        }

        /// Selling units already claimed by `bidder` in a fixed price auction.
        fn fixed_price_total_of(
            paying_asset: &T::AssetId,
            auction_id: AuctionId,
            bidder: &T::AccountId,
        ) -> Result<u128, DispatchError> {
            let mut total: u128 = 0;
            for bid in Bids::<T>::iter_prefix_values(auction_id).filter(|bid| &bid.bidder == bidder) {
                let selling = Self::fixed_price_selling_of(paying_asset, &bid)?;
                total = total.checked_add(selling).ok_or(Error::<T>::Overflow)?;
            }
            Ok(total)
        }

        fn fixed_price_selling_of(paying_asset: &T::AssetId, bid: &Bid<T>) -> Result<u128, DispatchError> {
            let amount = Self::to_u128(bid.amount);
            if &bid.asset == paying_asset {
                Ok(math::selling_amount(amount, bid.price).ok_or(Error::<T>::Overflow)?)
            } else {
                Ok(amount)
            }
        }

        fn fixed_price_paying_of(paying_asset: &T::AssetId, bid: &Bid<T>) -> Result<u128, DispatchError> {
            let amount = Self::to_u128(bid.amount);
            if &bid.asset == paying_asset {
                Ok(amount)
            } else {
                Ok(math::paying_amount(amount, bid.price).ok_or(Error::<T>::Overflow)?)
            }
        }

        fn charge_fee(who: &T::AccountId, fee: T::Balance) -> DispatchResult {
            if fee.is_zero() {
                return Ok(());
            }
            <T::Currency as fungible::Mutate<_>>::transfer(
                who,
                &T::FeeCollector::get(),
                fee,
                Preservation::Preserve,
            )?;
            Ok(())
        }

        /// Fails unless `who` could be credited `amount` of `asset`.
        fn ensure_receivable(asset: T::AssetId, who: &T::AccountId, amount: u128) -> DispatchResult {
            let amount = Self::to_balance(amount)?;
            let outcome =
                <T::Assets as fungibles::Inspect<_>>::can_deposit(asset, who, amount, Provenance::Extant);
            ensure!(outcome == DepositConsequence::Success, Error::<T>::AllocationNotReceivable);
            Ok(())
        }

        /// Moves `amount` out of a reserve. A reserve is emptied completely or
        /// left with at least the asset's minimum balance, never swept as dust.
        fn withdraw_from_reserve(
            asset: T::AssetId,
            reserve: &T::AccountId,
            to: &T::AccountId,
            amount: T::Balance,
        ) -> DispatchResult {
            let held = <T::Assets as fungibles::Inspect<_>>::balance(asset, reserve);
            let preservation =
                if amount >= held { Preservation::Expendable } else { Preservation::Preserve };
            <T::Assets as fungibles::Mutate<_>>::transfer(asset, reserve, to, amount, preservation)?;
            Ok(())
        }

        /// Settlement payout out of a reserve. When the transfer fails the
        /// amount stays in the reserve as a claim of `to`.
        fn pay_out(
            auction_id: AuctionId,
            asset: T::AssetId,
            reserve: &T::AccountId,
            to: &T::AccountId,
            amount: T::Balance,
        ) {
            if amount.is_zero() {
                return;
            }
            let outcome =
                with_storage_layer(|| Self::withdraw_from_reserve(asset, reserve, to, amount));
            if let Err(e) = outcome {
                log::warn!(
                    target: LOG_TARGET,
                    "auction {} payout to {:?} deferred: {:?}",
                    auction_id,
                    to,
                    e
                );
                Claims::<T>::mutate((auction_id, to, asset), |owed| {
                    *owed = owed.saturating_add(amount)
                });
                Self::deposit_event(Event::PayoutDeferred {
                    auction_id,
                    who: to.clone(),
                    asset,
                    amount,
                });
            }
        }

        fn transfer_asset(
            asset: T::AssetId,
            from: &T::AccountId,
            to: &T::AccountId,
            amount: T::Balance,
        ) -> DispatchResult {
            if amount.is_zero() {
                return Ok(());
            }
            <T::Assets as fungibles::Mutate<_>>::transfer(asset, from, to, amount, Preservation::Expendable)?;
            Ok(())
        }

        fn to_u128(amount: T::Balance) -> u128 {
            amount.saturated_into()
        }

        fn to_balance(amount: u128) -> Result<T::Balance, DispatchError> {
            amount.try_into().map_err(|_| Error::<T>::Overflow.into())
        }

        /// Moves every live auction along according to `now`. At most
        /// `MaxSettlementsPerBlock` auctions are settled, the rest wait for a
        /// later block.
        pub(crate) fn process_auctions(now: Moment) {
            let live: Vec<AuctionId> = LiveAuctions::<T>::iter_keys().collect();
            let mut settlements: u32 = 0;
            for auction_id in live {
                let Some(auction) = Auctions::<T>::get(auction_id) else {
                    LiveAuctions::<T>::remove(auction_id);
                    continue;
                };
                if auction.settles_at(now) {
                    if settlements >= T::MaxSettlementsPerBlock::get() {
                        log::debug!(target: LOG_TARGET, "auction {} settlement postponed", auction_id);
                        continue;
                    }
                    settlements += 1;
                }

                let outcome = with_storage_layer(|| -> DispatchResult {
                    match auction.status {
                        AuctionStatus::Standby => Self::execute_standby(auction, now),
                        AuctionStatus::Started => Self::execute_started(auction, now),
                        AuctionStatus::Vesting => Self::execute_vesting(auction, now),
                        AuctionStatus::Finished | AuctionStatus::Cancelled => {
                            LiveAuctions::<T>::remove(auction_id);
                            Ok(())
                        }
                    }
                });
                if let Err(e) = outcome {
                    log::error!(
                        target: LOG_TARGET,
                        "failed to process auction {}: {:?}",
                        auction_id,
                        e
                    );
                }
            }
        }

        fn execute_standby(mut auction: Auction<T>, now: Moment) -> DispatchResult {
            if auction.start_time > now {
                return Ok(());
            }
            auction.status = AuctionStatus::Started;
            let auction_id = auction.id;
            Auctions::<T>::insert(auction_id, auction);
            log::info!(target: LOG_TARGET, "auction {} started", auction_id);
            Self::deposit_event(Event::AuctionStarted { auction_id });
            Ok(())
        }

        fn execute_started(auction: Auction<T>, now: Moment) -> DispatchResult {
            if now < auction.end_time() {
                return Ok(());
            }
            match auction.auction_type() {
                AuctionType::FixedPrice => Self::finish_fixed_price_auction(auction),
                AuctionType::Batch => {
                    let matching = Self::calculate_batch_allocation(&auction)?;
                    let matched_len =
                        matching.as_ref().map_or(0, |result| result.matched_bids.len() as u32);
                    if Self::should_extend_round(&auction, matched_len) {
                        Self::extend_round(auction, matched_len)
                    } else {
                        Self::finish_batch_auction(auction, matching)
                    }
                }
            }
        }

        /// Runs the matcher over the current bids of a batch auction.
        pub fn calculate_batch_allocation(
            auction: &Auction<T>,
        ) -> Result<Option<matching::MatchResult<T::AccountId>>, DispatchError> {
            let mut bids = Vec::new();
            for bid in Self::bids_of(auction.id) {
                let amount = Self::to_u128(bid.amount);
                let demand = match bid.bid_type {
                    BidType::BatchWorth => matching::Demand::Worth(amount),
                    BidType::BatchMany => matching::Demand::Many(amount),
                    BidType::FixedPrice => return Err(Error::<T>::BidTypeMismatch.into()),
                };
                bids.push(matching::BatchBid { id: bid.id, bidder: bid.bidder, price: bid.price, demand });
            }
            let max_bid_amounts: BTreeMap<T::AccountId, u128> = AllowedBidders::<T>::iter_prefix(auction.id)
                .map(|(bidder, max)| (bidder, Self::to_u128(max)))
                .collect();
            Ok(matching::match_bids(bids, &max_bid_amounts, Self::to_u128(auction.selling_amount)))
        }

        fn should_extend_round(auction: &Auction<T>, matched_len: u32) -> bool {
            let AuctionKind::Batch { max_extended_round, extended_round_rate, .. } = auction.kind else {
                return false;
            };
            let rounds_used = auction.end_times.len().saturating_sub(1) as u32;
            if max_extended_round == 0 || rounds_used >= max_extended_round {
                return false;
            }
            match LastMatchedBidsLen::<T>::get(auction.id) {
                None => true,
                Some(last) => math::change_rate(matched_len, last) >= extended_round_rate,
            }
        }

        fn extend_round(mut auction: Auction<T>, matched_len: u32) -> DispatchResult {
            let end_time = auction.end_time().saturating_add(Params::<T>::get().extended_period);
            auction
                .end_times
                .try_push(end_time)
                .map_err(|_| Error::<T>::InvalidExtendedRound)?;
            let auction_id = auction.id;
            Auctions::<T>::insert(auction_id, auction);
            LastMatchedBidsLen::<T>::insert(auction_id, matched_len);

            log::info!(target: LOG_TARGET, "auction {} extended until {}", auction_id, end_time);
            Self::deposit_event(Event::RoundExtended { auction_id, end_time });
            Ok(())
        }

        fn finish_fixed_price_auction(mut auction: Auction<T>) -> DispatchResult {
            let auction_id = auction.id;
            let selling_reserve = Self::selling_reserve_account(auction_id);

            let mut allocations: BTreeMap<T::AccountId, u128> = BTreeMap::new();
            let mut allocated: u128 = 0;
            let mut raised: u128 = 0;
            for bid in Self::bids_of(auction_id) {
                let selling = Self::fixed_price_selling_of(&auction.paying_asset, &bid)?;
                let paying = Self::fixed_price_paying_of(&auction.paying_asset, &bid)?;
                let allocation = allocations.entry(bid.bidder).or_default();
                *allocation = allocation.checked_add(selling).ok_or(Error::<T>::Overflow)?;
                allocated = allocated.checked_add(selling).ok_or(Error::<T>::Overflow)?;
                raised = raised.checked_add(paying).ok_or(Error::<T>::Overflow)?;
            }
            for (bidder, selling) in allocations {
                Self::pay_out(
                    auction_id,
                    auction.selling_asset,
                    &selling_reserve,
                    &bidder,
                    Self::to_balance(selling)?,
                );
            }

            let unsold = Self::to_u128(auction.selling_amount).saturating_sub(allocated);
            Self::pay_out(
                auction_id,
                auction.selling_asset,
                &selling_reserve,
                &auction.auctioneer,
                Self::to_balance(unsold)?,
            );
            if let AuctionKind::FixedPrice { remaining_selling_amount } = &mut auction.kind {
                *remaining_selling_amount = Zero::zero();
            }

            Self::start_vesting(auction, raised)
        }

        fn finish_batch_auction(
            mut auction: Auction<T>,
            matching: Option<matching::MatchResult<T::AccountId>>,
        ) -> DispatchResult {
            let auction_id = auction.id;
            let selling_reserve = Self::selling_reserve_account(auction_id);
            let paying_reserve = Self::paying_reserve_account(auction_id);

            let mut locked_by_bidder: BTreeMap<T::AccountId, u128> = BTreeMap::new();
            for bid in Self::bids_of(auction_id) {
                let (_, paying) = Self::bid_amounts(&auction, bid.bid_type, bid.price, bid.asset, bid.amount)?;
                let locked = locked_by_bidder.entry(bid.bidder).or_default();
                *locked = locked.checked_add(paying).ok_or(Error::<T>::Overflow)?;
            }

            let mut allocated: u128 = 0;
            let mut raised: u128 = 0;
            let mut paid_by_bidder: BTreeMap<T::AccountId, u128> = BTreeMap::new();
            if let Some(result) = &matching {
                for (bidder, outcome) in result.by_bidder.iter() {
                    Self::pay_out(
                        auction_id,
                        auction.selling_asset,
                        &selling_reserve,
                        bidder,
                        Self::to_balance(outcome.matched)?,
                    );
                    allocated = allocated.checked_add(outcome.matched).ok_or(Error::<T>::Overflow)?;
                    raised = raised.checked_add(outcome.paid).ok_or(Error::<T>::Overflow)?;
                    paid_by_bidder.insert(bidder.clone(), outcome.paid);
                }
                for bid_id in result.matched_bids.iter() {
                    Bids::<T>::mutate(auction_id, bid_id, |bid| {
                        if let Some(bid) = bid {
                            bid.is_matched = true;
                        }
                    });
                }
                if let AuctionKind::Batch { matched_price, .. } = &mut auction.kind {
                    *matched_price = Some(result.matched_price);
                }
                log::info!(
                    target: LOG_TARGET,
                    "auction {} matched {} units at {:?}",
                    auction_id,
                    result.matched_amount,
                    result.matched_price
                );
                Self::deposit_event(Event::AuctionMatched {
                    auction_id,
                    matched_price: result.matched_price,
                    matched_amount: Self::to_balance(result.matched_amount)?,
                    matched_bids: result.matched_bids.len() as u32,
                });
            }

            for (bidder, locked) in locked_by_bidder {
                let paid = paid_by_bidder.get(&bidder).copied().unwrap_or_default();
                Self::pay_out(
                    auction_id,
                    auction.paying_asset,
                    &paying_reserve,
                    &bidder,
                    Self::to_balance(locked.saturating_sub(paid))?,
                );
            }

            let unsold = Self::to_u128(auction.selling_amount).saturating_sub(allocated);
            Self::pay_out(
                auction_id,
                auction.selling_asset,
                &selling_reserve,
                &auction.auctioneer,
                Self::to_balance(unsold)?,
            );

            LastMatchedBidsLen::<T>::remove(auction_id);
            Self::start_vesting(auction, raised)
        }

        /// Queues the raised funds for release, or pays them out at once when
        /// the auction has no vesting schedules. Until then they stay in the
        /// paying reserve.
        fn start_vesting(mut auction: Auction<T>, raised: u128) -> DispatchResult {
            let auction_id = auction.id;
            if auction.vesting_schedules.is_empty() {
                Self::pay_out(
                    auction_id,
                    auction.paying_asset,
                    &Self::paying_reserve_account(auction_id),
                    &auction.auctioneer,
                    Self::to_balance(raised)?,
                );
                return Self::finish(auction);
            }

            let weights: Vec<Perbill> = auction.vesting_schedules.iter().map(|s| s.weight).collect();
            let shares = math::split_by_weights(raised, &weights);
            let mut queues = Vec::with_capacity(shares.len());
            for (schedule, share) in auction.vesting_schedules.iter().zip(shares) {
                queues.push(VestingQueue::<T> {
                    auctioneer: auction.auctioneer.clone(),
                    paying_asset: auction.paying_asset,
                    amount: Self::to_balance(share)?,
                    release_time: schedule.release_time,
                    released: false,
                });
            }
            let queues: BoundedVec<_, T::MaxVestingSchedules> =
                queues.try_into().map_err(|_| Error::<T>::TooManyVestingSchedules)?;
            VestingQueues::<T>::insert(auction_id, queues);

            auction.status = AuctionStatus::Vesting;
            Auctions::<T>::insert(auction_id, auction);
            log::info!(target: LOG_TARGET, "auction {} vesting", auction_id);
            Self::deposit_event(Event::AuctionVesting { auction_id });
            Ok(())
        }

        fn execute_vesting(auction: Auction<T>, now: Moment) -> DispatchResult {
            let auction_id = auction.id;
            let paying_reserve = Self::paying_reserve_account(auction_id);
            let mut queues = VestingQueues::<T>::get(auction_id);

            // A deferred release still counts as released; the auctioneer claims it.
            for queue in queues.iter_mut().filter(|q| !q.released && q.release_time <= now) {
                Self::pay_out(auction_id, queue.paying_asset, &paying_reserve, &queue.auctioneer, queue.amount);
                queue.released = true;
                Self::deposit_event(Event::VestingReleased {
                    auction_id,
                    auctioneer: queue.auctioneer.clone(),
                    asset: queue.paying_asset,
                    amount: queue.amount,
                    release_time: queue.release_time,
                });
            }

            let all_released = queues.iter().all(|q| q.released);
            VestingQueues::<T>::insert(auction_id, queues);
            if all_released {
                return Self::finish(auction);
            }
            Ok(())
        }

        fn finish(mut auction: Auction<T>) -> DispatchResult {
            let auction_id = auction.id;
            auction.status = AuctionStatus::Finished;
            Auctions::<T>::insert(auction_id, auction);
            LiveAuctions::<T>::remove(auction_id);
            log::info!(target: LOG_TARGET, "auction {} finished", auction_id);
            Self::deposit_event(Event::AuctionFinished { auction_id });
            Ok(())
        }
    }
}
