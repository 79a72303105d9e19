use cosmwasm_std::{OverflowError, StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{reason}")]
    Unauthorized { reason: String },

    #[error("exceeded maximum airdrop duration")]
    DurationExceeded {},

    #[error("another airdrop already assigned on this period")]
    SchedulingConflict {},

    #[error("Cant close while during airdrop")]
    WindowNotElapsed {},

    #[error("Airdrop {id} not found")]
    NotFound { id: u64 },

    #[error("Airdrop {id} is closed")]
    AirdropClosed { id: u64 },

    #[error("Airdrop claim window is [{start_time}, {claim_until}], current time {now}")]
    ClaimWindowClosed {
        start_time: u64,
        claim_until: u64,
        now: u64,
    },

    #[error("Sender already claim tokens for this airdrop")]
    AlreadyClaimed {},

    #[error("Amount exceeds maximum tokens per user: {max}")]
    RewardCapExceeded { max: Uint128 },

    #[error("Signature unverified")]
    SignatureUnverified {},

    #[error("Invalid signature")]
    InvalidSignature {},

    #[error("Not enough tokens left in airdrop pool: {available}")]
    InsufficientPool { available: Uint128 },

    #[error("Airdrop finish time must be greater than start time")]
    InvalidAirdropTime {},

    #[error("Invalid zero amount")]
    ZeroAmount {},

    #[error("Invalid validator address: {address}")]
    InvalidValidatorAddress { address: String },
}

impl ContractError {
    pub fn unauthorized(reason: &str) -> Self {
        ContractError::Unauthorized {
            reason: reason.to_string(),
        }
    }
}

impl From<OverflowError> for ContractError {
    fn from(o: OverflowError) -> Self {
        StdError::from(o).into()
    }
}
