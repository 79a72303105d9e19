#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    attr, to_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdError,
    StdResult, Uint128,
};
use cw2::set_contract_version;
use cw20::{Cw20Contract, Cw20ExecuteMsg};

use crate::crypto::{get_message_hash, normalize_eth_address, recover_signer};
use crate::error::ContractError;
use crate::msg::{
    AirdropResponse, AirdropsResponse, ConfigResponse, ExecuteMsg, InstantiateMsg,
    IsClaimedResponse, MessageHashResponse, QueryMsg,
};
use crate::state::{
    airdrops, has_active_overlap, read_airdrops, Airdrop, Config, CLAIMS, CONFIG,
};

// Version info stored with cw2
const CONTRACT_NAME: &str = "crates.io:airdrop-manager";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let validator_address = normalize_eth_address(&msg.validator_address)?;

    CONFIG.save(
        deps.storage,
        &Config {
            owner: info.sender.clone(),
            validator_address: validator_address.clone(),
            max_airdrop_duration: msg.max_airdrop_duration,
            claim_duration: msg.claim_duration,
        },
    )?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "instantiate"),
        attr("owner", info.sender),
        attr("validator_address", validator_address),
    ]))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SetAirdropSettings {
            max_airdrop_duration,
            claim_duration,
        } => execute_set_airdrop_settings(deps, info, max_airdrop_duration, claim_duration),
        ExecuteMsg::CreateAirdrop {
            id,
            start_time,
            finish_time,
            token_address,
            token_amount,
            max_tokens_per_user,
        } => execute_create_airdrop(
            deps,
            env,
            info,
            id,
            start_time,
            finish_time,
            token_address,
            token_amount,
            max_tokens_per_user,
        ),
        ExecuteMsg::AddAirdropToken { id, amount } => {
            execute_add_airdrop_token(deps, env, info, id, amount)
        }
        ExecuteMsg::UpdateAirdropRewardSettings {
            id,
            max_tokens_per_user,
        } => execute_update_airdrop_reward_settings(deps, info, id, max_tokens_per_user),
        ExecuteMsg::UpdateAirdropTime {
            id,
            start_time,
            finish_time,
        } => execute_update_airdrop_time(deps, info, id, start_time, finish_time),
        ExecuteMsg::CloseAirdrop { id } => execute_close_airdrop(deps, env, info, id),
        ExecuteMsg::ClaimToken {
            airdrop_id,
            amount,
            signature,
        } => execute_claim_token(deps, env, info, airdrop_id, amount, signature),
    }
}

fn load_airdrop(deps: Deps, id: u64) -> Result<Airdrop, ContractError> {
    airdrops()
        .may_load(deps.storage, id)?
        .ok_or(ContractError::NotFound { id })
}

fn assert_creator(sender: &Addr, airdrop: &Airdrop, reason: &str) -> Result<(), ContractError> {
    if *sender != airdrop.creator {
        return Err(ContractError::unauthorized(reason));
    }
    Ok(())
}

fn assert_open(airdrop: &Airdrop) -> Result<(), ContractError> {
    if !airdrop.flag {
        return Err(ContractError::AirdropClosed { id: airdrop.id });
    }
    Ok(())
}

/// Checks the window against the duration limit and every other open airdrop.
fn assert_schedule(
    deps: Deps,
    config: &Config,
    start_time: u64,
    finish_time: u64,
    exclude: Option<u64>,
) -> Result<(), ContractError> {
    if finish_time <= start_time {
        return Err(ContractError::InvalidAirdropTime {});
    }
    if finish_time - start_time > config.max_airdrop_duration {
        return Err(ContractError::DurationExceeded {});
    }
    if has_active_overlap(deps.storage, start_time, finish_time, exclude)? {
        return Err(ContractError::SchedulingConflict {});
    }
    Ok(())
}

pub fn execute_set_airdrop_settings(
    deps: DepsMut,
    info: MessageInfo,
    max_airdrop_duration: u64,
    claim_duration: u64,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.owner {
        return Err(ContractError::unauthorized("Only owner can call this method"));
    }

    config.max_airdrop_duration = max_airdrop_duration;
    config.claim_duration = claim_duration;
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "set_airdrop_settings"),
        attr("max_airdrop_duration", max_airdrop_duration.to_string()),
        attr("claim_duration", claim_duration.to_string()),
    ]))
}

#[allow(clippy::too_many_arguments)]
pub fn execute_create_airdrop(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    id: u64,
    start_time: u64,
    finish_time: u64,
    token_address: String,
    token_amount: Uint128,
    max_tokens_per_user: Uint128,
) -> Result<Response, ContractError> {
    // ids are never reused, even after an airdrop was closed
    if airdrops().has(deps.storage, id) {
        return Err(ContractError::SchedulingConflict {});
    }
    if token_amount.is_zero() {
        return Err(ContractError::ZeroAmount {});
    }

    let config = CONFIG.load(deps.storage)?;
    assert_schedule(deps.as_ref(), &config, start_time, finish_time, None)?;

    let token_address = deps.api.addr_validate(&token_address)?;

    let airdrop = Airdrop {
        id,
        creator: info.sender.clone(),
        start_time,
        finish_time,
        token_address: token_address.clone(),
        token_amount,
        max_tokens_per_user,
        flag: true,
        claimed_amount: Uint128::zero(),
        refunded_amount: Uint128::zero(),
    };
    airdrops().save(deps.storage, id, &airdrop)?;

    let transfer_from = Cw20Contract(token_address.clone()).call(Cw20ExecuteMsg::TransferFrom {
        owner: info.sender.to_string(),
        recipient: env.contract.address.to_string(),
        amount: token_amount,
    })?;

    Ok(Response::new()
        .add_message(transfer_from)
        .add_attributes(vec![
            attr("action", "create_airdrop"),
            attr("id", id.to_string()),
            attr("start_time", start_time.to_string()),
            attr("finish_time", finish_time.to_string()),
            attr("token_address", token_address),
            attr("token_amount", token_amount),
            attr("max_tokens_per_user", max_tokens_per_user),
            attr("creator", info.sender),
        ]))
}

pub fn execute_add_airdrop_token(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    id: u64,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let mut airdrop = load_airdrop(deps.as_ref(), id)?;
    assert_creator(
        &info.sender,
        &airdrop,
        "Only creator can add tokens to airdrop",
    )?;
    assert_open(&airdrop)?;
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount {});
    }

    airdrop.token_amount = airdrop.token_amount.checked_add(amount)?;
    airdrops().save(deps.storage, id, &airdrop)?;

    let transfer_from =
        Cw20Contract(airdrop.token_address.clone()).call(Cw20ExecuteMsg::TransferFrom {
            owner: info.sender.to_string(),
            recipient: env.contract.address.to_string(),
            amount,
        })?;

    Ok(Response::new()
        .add_message(transfer_from)
        .add_attributes(vec![
            attr("action", "add_airdrop_token"),
            attr("id", id.to_string()),
            attr("amount", amount),
            attr("token_amount", airdrop.token_amount),
        ]))
}

pub fn execute_update_airdrop_reward_settings(
    deps: DepsMut,
    info: MessageInfo,
    id: u64,
    max_tokens_per_user: Uint128,
) -> Result<Response, ContractError> {
    let mut airdrop = load_airdrop(deps.as_ref(), id)?;
    assert_creator(
        &info.sender,
        &airdrop,
        "Only creator can change airdrop rewards",
    )?;
    assert_open(&airdrop)?;

    airdrop.max_tokens_per_user = max_tokens_per_user;
    airdrops().save(deps.storage, id, &airdrop)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "update_airdrop_reward_settings"),
        attr("id", id.to_string()),
        attr("max_tokens_per_user", max_tokens_per_user),
    ]))
}

pub fn execute_update_airdrop_time(
    deps: DepsMut,
    info: MessageInfo,
    id: u64,
    start_time: u64,
    finish_time: u64,
) -> Result<Response, ContractError> {
    let mut airdrop = load_airdrop(deps.as_ref(), id)?;
    assert_creator(&info.sender, &airdrop, "Only creator can change airdrop time")?;
    assert_open(&airdrop)?;

    let config = CONFIG.load(deps.storage)?;
    assert_schedule(deps.as_ref(), &config, start_time, finish_time, Some(id))?;

    airdrop.start_time = start_time;
    airdrop.finish_time = finish_time;
    airdrops().save(deps.storage, id, &airdrop)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "update_airdrop_time"),
        attr("id", id.to_string()),
        attr("start_time", start_time.to_string()),
        attr("finish_time", finish_time.to_string()),
    ]))
}

pub fn execute_close_airdrop(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    id: u64,
) -> Result<Response, ContractError> {
    let mut airdrop = load_airdrop(deps.as_ref(), id)?;
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.owner && info.sender != airdrop.creator {
        return Err(ContractError::unauthorized(
            "Only owner or creator can close airdrop",
        ));
    }
    assert_open(&airdrop)?;
    // the escrow backs claims until claim_until
    if env.block.time.seconds() < airdrop.claim_until(config.claim_duration) {
        return Err(ContractError::WindowNotElapsed {});
    }

    let refund = airdrop.token_amount;
    airdrop.flag = false;
    airdrop.refunded_amount = airdrop.refunded_amount.checked_add(refund)?;
    airdrop.token_amount = Uint128::zero();
    airdrops().save(deps.storage, id, &airdrop)?;

    let mut response = Response::new();
    if !refund.is_zero() {
        response = response.add_message(Cw20Contract(airdrop.token_address.clone()).call(
            Cw20ExecuteMsg::Transfer {
                recipient: airdrop.creator.to_string(),
                amount: refund,
            },
        )?);
    }

    Ok(response.add_attributes(vec![
        attr("action", "close_airdrop"),
        attr("id", id.to_string()),
        attr("refunded_amount", refund),
    ]))
}

pub fn execute_claim_token(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    airdrop_id: u64,
    amount: Uint128,
    signature: Binary,
) -> Result<Response, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::ZeroAmount {});
    }

    let mut airdrop = load_airdrop(deps.as_ref(), airdrop_id)?;
    assert_open(&airdrop)?;

    let config = CONFIG.load(deps.storage)?;
    let now = env.block.time.seconds();
    let claim_until = airdrop.claim_until(config.claim_duration);
    if now < airdrop.start_time || now > claim_until {
        return Err(ContractError::ClaimWindowClosed {
            start_time: airdrop.start_time,
            claim_until,
            now,
        });
    }

    if CLAIMS.has(deps.storage, (airdrop_id, &info.sender)) {
        return Err(ContractError::AlreadyClaimed {});
    }

    if amount > airdrop.max_tokens_per_user {
        return Err(ContractError::RewardCapExceeded {
            max: airdrop.max_tokens_per_user,
        });
    }

    let digest = get_message_hash(airdrop_id, info.sender.as_str(), amount);
    let signer = recover_signer(deps.api, &digest, signature.as_slice())?;
    if signer != config.validator_address {
        return Err(ContractError::SignatureUnverified {});
    }

    if amount > airdrop.token_amount {
        return Err(ContractError::InsufficientPool {
            available: airdrop.token_amount,
        });
    }

    // state is updated before the transfer message is dispatched
    airdrop.token_amount -= amount;
    airdrop.claimed_amount = airdrop.claimed_amount.checked_add(amount)?;
    airdrops().save(deps.storage, airdrop_id, &airdrop)?;
    CLAIMS.save(deps.storage, (airdrop_id, &info.sender), &amount)?;

    let transfer = Cw20Contract(airdrop.token_address).call(Cw20ExecuteMsg::Transfer {
        recipient: info.sender.to_string(),
        amount,
    })?;

    Ok(Response::new().add_message(transfer).add_attributes(vec![
        attr("action", "claim_token"),
        attr("airdrop_id", airdrop_id.to_string()),
        attr("address", info.sender),
        attr("amount", amount),
    ]))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_binary(&query_config(deps)?),
        QueryMsg::Airdrop { id } => to_binary(&query_airdrop(deps, id)?),
        QueryMsg::Airdrops { start_after, limit } => {
            to_binary(&query_airdrops(deps, start_after, limit)?)
        }
        QueryMsg::IsClaimed { id, address } => to_binary(&query_is_claimed(deps, id, address)?),
        QueryMsg::MessageHash {
            id,
            address,
            amount,
        } => to_binary(&query_message_hash(id, address, amount)),
    }
}

pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let cfg = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        owner: cfg.owner.to_string(),
        validator_address: cfg.validator_address,
        max_airdrop_duration: cfg.max_airdrop_duration,
        claim_duration: cfg.claim_duration,
    })
}

pub fn query_airdrop(deps: Deps, id: u64) -> StdResult<AirdropResponse> {
    let airdrop = airdrops()
        .may_load(deps.storage, id)?
        .ok_or_else(|| StdError::not_found(format!("airdrop {}", id)))?;
    Ok(airdrop.into())
}

pub fn query_airdrops(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<AirdropsResponse> {
    let airdrops = read_airdrops(deps.storage, start_after, limit)?
        .into_iter()
        .map(AirdropResponse::from)
        .collect();
    Ok(AirdropsResponse { airdrops })
}

pub fn query_is_claimed(deps: Deps, id: u64, address: String) -> StdResult<IsClaimedResponse> {
    let address = deps.api.addr_validate(&address)?;
    let is_claimed = CLAIMS.has(deps.storage, (id, &address));
    Ok(IsClaimedResponse { is_claimed })
}

pub fn query_message_hash(id: u64, address: String, amount: Uint128) -> MessageHashResponse {
    MessageHashResponse {
        hash: Binary::from(get_message_hash(id, &address, amount).to_vec()),
    }
}
