use crate::state::Airdrop;
use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Binary, Uint128};

#[cw_serde]
pub struct InstantiateMsg {
    /// Hex encoded address whose signatures authorize claims
    pub validator_address: String,
    /// Maximum airdrop duration in seconds
    pub max_airdrop_duration: u64,
    /// Seconds after an airdrop finishes during which claims are still accepted
    pub claim_duration: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Owner only. Replaces the global airdrop settings.
    SetAirdropSettings {
        max_airdrop_duration: u64,
        claim_duration: u64,
    },
    /// Opens a new airdrop and pulls `token_amount` of `token_address` from the sender.
    /// The sender must have approved the contract on the cw20 token beforehand.
    /// An id that was used before, even by a closed airdrop, fails with `SchedulingConflict`.
    CreateAirdrop {
        id: u64,
        start_time: u64,
        finish_time: u64,
        token_address: String,
        token_amount: Uint128,
        max_tokens_per_user: Uint128,
    },
    /// Creator only. Pulls `amount` more tokens into the airdrop pool.
    AddAirdropToken { id: u64, amount: Uint128 },
    /// Creator only.
    UpdateAirdropRewardSettings {
        id: u64,
        max_tokens_per_user: Uint128,
    },
    /// Creator only.
    UpdateAirdropTime {
        id: u64,
        start_time: u64,
        finish_time: u64,
    },
    /// Owner or creator, once the airdrop finished. Unclaimed tokens go back to the creator.
    CloseAirdrop { id: u64 },
    /// Withdraws `amount` to the sender. `signature` is the validator's signature of
    /// the message hash for `(airdrop_id, sender, amount)`.
    ClaimToken {
        airdrop_id: u64,
        amount: Uint128,
        signature: Binary,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(ConfigResponse)]
    Config {},
    #[returns(AirdropResponse)]
    Airdrop { id: u64 },
    /// Airdrops in ascending id order
    #[returns(AirdropsResponse)]
    Airdrops {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(IsClaimedResponse)]
    IsClaimed { id: u64, address: String },
    /// Hash the validator has to sign to authorize a claim
    #[returns(MessageHashResponse)]
    MessageHash {
        id: u64,
        address: String,
        amount: Uint128,
    },
}

#[cw_serde]
pub struct ConfigResponse {
    pub owner: String,
    pub validator_address: String,
    pub max_airdrop_duration: u64,
    pub claim_duration: u64,
}

#[cw_serde]
pub struct AirdropResponse {
    pub id: u64,
    pub creator: String,
    pub start_time: u64,
    pub finish_time: u64,
    pub token_address: String,
    pub token_amount: Uint128,
    pub max_tokens_per_user: Uint128,
    pub flag: bool,
    pub claimed_amount: Uint128,
    pub refunded_amount: Uint128,
}

impl From<Airdrop> for AirdropResponse {
    fn from(airdrop: Airdrop) -> Self {
        AirdropResponse {
            id: airdrop.id,
            creator: airdrop.creator.to_string(),
            start_time: airdrop.start_time,
            finish_time: airdrop.finish_time,
            token_address: airdrop.token_address.to_string(),
            token_amount: airdrop.token_amount,
            max_tokens_per_user: airdrop.max_tokens_per_user,
            flag: airdrop.flag,
            claimed_amount: airdrop.claimed_amount,
            refunded_amount: airdrop.refunded_amount,
        }
    }
}

#[cw_serde]
pub struct AirdropsResponse {
    pub airdrops: Vec<AirdropResponse>,
}

#[cw_serde]
pub struct IsClaimedResponse {
    pub is_claimed: bool,
}

#[cw_serde]
pub struct MessageHashResponse {
    pub hash: Binary,
}
