//! Interfaces the core calls out to, never implements: the fork-choice store's head, the eth1
//! follower's view of the deposit contract, and the deposit log itself. Every state mutation this
//! crate performs is a pure function of values already in hand, so these traits only describe
//! what a caller must supply *before* calling into `transition`/`genesis` — there is no callback
//! from inside a transition back out to any of them.
use types::{BeaconState, ChainSpec, Deposit, Eth1Data, EthSpec, Hash256, SignedBeaconBlock};

/// Supplies the current canonical head a new block extends. Backed by the fork-choice store,
/// entirely outside this crate.
pub trait HeadFetcher<E: EthSpec> {
    /// The state and block root fork choice currently considers canonical.
    fn head(&self) -> (BeaconState<E>, Hash256);

    /// The signed block already applied to produce `head().0`, if the caller needs to re-derive
    /// anything about it (e.g. its slot, to decide how far `process_slots` must advance).
    fn head_block(&self) -> Option<SignedBeaconBlock<E>>;
}

/// Supplies the eth1 follower's view of the deposit contract's chain, which the genesis builder
/// and `process_eth1_data`'s vote bookkeeping both read from but never themselves fetch.
pub trait Eth1InfoFetcher {
    /// The eth1 block number the deposit contract was deployed at, genesis's search lower bound.
    fn genesis_eth1_block_number(&self, spec: &ChainSpec) -> u64;

    /// Looks up an eth1 block's `(hash, timestamp)` by its block number, `None` if the follower
    /// hasn't indexed that far yet.
    fn block_by_number(&self, block_number: u64) -> Option<(Hash256, u64)>;

    /// The deposit-contract log view as of a given eth1 block, used to build an `Eth1Data` vote.
    fn eth1_data_at(&self, block_number: u64) -> Option<Eth1Data>;
}

/// Supplies the ordered deposit log itself, independent of `Eth1InfoFetcher`'s block metadata.
pub trait DepositFetcher {
    /// Every deposit made up to and including `eth1_block_number`, in on-chain order. Genesis and
    /// `process_deposits` both assume this ordering matches the deposit contract's tree.
    fn deposits_up_to(&self, eth1_block_number: u64) -> Vec<Deposit>;

    /// How many deposits `deposits_up_to` would currently return for the latest indexed height,
    /// without materializing the full list.
    fn deposit_count(&self) -> u64;
}
