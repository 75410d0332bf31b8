use crate as pallet_fundraising;
use frame_support::{
    derive_impl, parameter_types,
    traits::{AsEnsureOriginWithArg, ConstU32, ConstU64, Hooks},
    PalletId,
};
use frame_system::{EnsureRoot, EnsureSigned};
use sp_runtime::{traits::IdentityLookup, AccountId32, BuildStorage};

type Block = frame_system::mocking::MockBlock<Test>;

pub const ALICE: AccountId32 = AccountId32::new([1u8; 32]);
pub const BOB: AccountId32 = AccountId32::new([2u8; 32]);
pub const CHARLIE: AccountId32 = AccountId32::new([3u8; 32]);
pub const DAVE: AccountId32 = AccountId32::new([4u8; 32]);
pub const FEE_COLLECTOR: AccountId32 = AccountId32::new([9u8; 32]);

/// Asset sold by the auctioneer.
pub const SELL: u32 = 1;
/// Asset bidders pay with.
pub const PAY: u32 = 2;
/// Selling and paying assets with a minimum balance of 100.
pub const THIN_SELL: u32 = 7;
pub const THIN_PAY: u32 = 8;
pub const THIN_MIN_BALANCE: u64 = 100;

pub const GENESIS_TIME: u64 = 1_000;
pub const CREATION_FEE: u64 = 100;
pub const BID_FEE: u64 = 10;
pub const EXTENDED_PERIOD: u64 = 1_000;

frame_support::construct_runtime!(
    pub enum Test {
        System: frame_system,
        Timestamp: pallet_timestamp,
        Balances: pallet_balances,
        Assets: pallet_assets,
        Fundraising: pallet_fundraising,
    }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
    type Block = Block;
    type AccountId = AccountId32;
    type Lookup = IdentityLookup<AccountId32>;
    type AccountData = pallet_balances::AccountData<u64>;
}

impl pallet_timestamp::Config for Test {
    type Moment = u64;
    type OnTimestampSet = ();
    type MinimumPeriod = ConstU64<1>;
    type WeightInfo = ();
}

#[derive_impl(pallet_balances::config_preludes::TestDefaultConfig)]
impl pallet_balances::Config for Test {
    type AccountStore = System;
}

#[derive_impl(pallet_assets::config_preludes::TestDefaultConfig)]
impl pallet_assets::Config for Test {
    type Currency = Balances;
    type CreateOrigin = AsEnsureOriginWithArg<EnsureSigned<AccountId32>>;
    type ForceOrigin = EnsureRoot<AccountId32>;
    type Freezer = ();
}

parameter_types! {
    pub const FundraisingPalletId: PalletId = PalletId(*b"py/fundr");
    pub const FeeCollector: AccountId32 = FEE_COLLECTOR;
}

impl pallet_fundraising::Config for Test {
    type RuntimeEvent = RuntimeEvent;
    type AssetId = u32;
    type Balance = u64;
    type Assets = Assets;
    type Currency = Balances;
    type UnixTime = Timestamp;
    type PalletId = FundraisingPalletId;
    type FeeCollector = FeeCollector;
    type MaxVestingSchedules = ConstU32<4>;
    type MaxEndTimes = ConstU32<4>;
    type MaxAllowedBiddersPerCall = ConstU32<10>;
    type MaxBidsPerAuction = ConstU32<20>;
    type MaxLiveAuctions = ConstU32<4>;
    type MaxSettlementsPerBlock = ConstU32<2>;
    type WeightInfo = ();
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
    let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

    pallet_balances::GenesisConfig::<Test> {
        balances: vec![
            (ALICE, 1_000_000),
            (BOB, 1_000_000),
            (CHARLIE, 1_000_000),
            (DAVE, 1_000_000),
            (FEE_COLLECTOR, 1),
        ],
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_assets::GenesisConfig::<Test> {
        assets: vec![
            (SELL, ALICE, true, 1),
            (PAY, ALICE, true, 1),
            (THIN_SELL, ALICE, true, THIN_MIN_BALANCE),
            (THIN_PAY, ALICE, true, THIN_MIN_BALANCE),
        ],
        accounts: vec![
            (SELL, ALICE, 10_000),
            (PAY, BOB, 10_000),
            (PAY, CHARLIE, 10_000),
            (PAY, DAVE, 10_000),
            (THIN_SELL, ALICE, 10_000),
            (THIN_PAY, BOB, 1_000),
        ],
        ..Default::default()
    }
    .assimilate_storage(&mut t)
    .unwrap();

    pallet_fundraising::GenesisConfig::<Test> {
        auction_creation_fee: CREATION_FEE,
        place_bid_fee: BID_FEE,
        extended_period: EXTENDED_PERIOD,
    }
    .assimilate_storage(&mut t)
    .unwrap();

    let mut ext = sp_io::TestExternalities::new(t);
    ext.execute_with(|| {
        System::set_block_number(1);
        Timestamp::set_timestamp(GENESIS_TIME);
    });
    ext
}

/// Moves to the next block at `now` and runs the end-of-block processing.
pub fn advance_to(now: u64) {
    let block = System::block_number() + 1;
    System::set_block_number(block);
    Timestamp::set_timestamp(now);
    Fundraising::on_finalize(block);
}
