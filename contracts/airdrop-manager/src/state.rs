use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Order, StdResult, Storage, Uint128};
use cw_storage_plus::{Bound, Index, IndexList, IndexedMap, Item, Map, MultiIndex};

#[cw_serde]
pub struct Config {
    /// Account allowed to change airdrop settings and to close any airdrop
    pub owner: Addr,
    /// Lowercase `0x` hex of the address whose signatures authorize claims
    pub validator_address: String,
    /// Maximum allowed `finish_time - start_time`, in seconds
    pub max_airdrop_duration: u64,
    /// Seconds after `finish_time` during which claims are still accepted
    pub claim_duration: u64,
}

#[cw_serde]
pub struct Airdrop {
    pub id: u64,
    pub creator: Addr,
    pub start_time: u64,
    pub finish_time: u64,
    /// cw20 contract distributed by this airdrop
    pub token_address: Addr,
    /// Escrowed tokens that are not claimed yet
    pub token_amount: Uint128,
    pub max_tokens_per_user: Uint128,
    /// True while the airdrop is open
    pub flag: bool,
    pub claimed_amount: Uint128,
    /// Escrow returned to the creator when the airdrop was closed
    pub refunded_amount: Uint128,
}

impl Airdrop {
    /// Inclusive interval intersection.
    pub fn overlaps(&self, start_time: u64, finish_time: u64) -> bool {
        self.start_time <= finish_time && start_time <= self.finish_time
    }

    /// Last second at which a claim is accepted.
    pub fn claim_until(&self, claim_duration: u64) -> u64 {
        self.finish_time.saturating_add(claim_duration)
    }
}

pub const CONFIG: Item<Config> = Item::new("config");

pub struct AirdropIndexes<'a> {
    // 1 while open, 0 once closed
    pub flag: MultiIndex<'a, u8, Airdrop, u64>,
}

impl<'a> IndexList<Airdrop> for AirdropIndexes<'a> {
    fn get_indexes(&'_ self) -> Box<dyn Iterator<Item = &'_ dyn Index<Airdrop>> + '_> {
        let v: Vec<&dyn Index<Airdrop>> = vec![&self.flag];
        Box::new(v.into_iter())
    }
}

pub fn airdrops<'a>() -> IndexedMap<'a, u64, Airdrop, AirdropIndexes<'a>> {
    let indexes = AirdropIndexes {
        flag: MultiIndex::new(|_, a| a.flag.into(), "airdrops", "airdrops__flag"),
    };
    IndexedMap::new("airdrops", indexes)
}

// (airdrop id, claimant) -> claimed amount
pub const CLAIMS: Map<(u64, &Addr), Uint128> = Map::new("claims");

const MAX_LIMIT: u32 = 30;
const DEFAULT_LIMIT: u32 = 10;

/// Returns true if an open airdrop other than `exclude` intersects `[start_time, finish_time]`.
pub fn has_active_overlap(
    storage: &dyn Storage,
    start_time: u64,
    finish_time: u64,
    exclude: Option<u64>,
) -> StdResult<bool> {
    let open = airdrops()
        .idx
        .flag
        .prefix(1u8)
        .range(storage, None, None, Order::Ascending);
    for item in open {
        let (id, airdrop) = item?;
        if Some(id) == exclude {
            continue;
        }
        if airdrop.overlaps(start_time, finish_time) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Reads airdrops in ascending id order.
/// ## Params
/// * **start_after** id after which to start reading.
///
/// * **limit** amount of airdrops to read.
pub fn read_airdrops(
    storage: &dyn Storage,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Vec<Airdrop>> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);

    airdrops()
        .range(storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| item.map(|(_, airdrop)| airdrop))
        .collect()
}
