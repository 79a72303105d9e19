use airdrop_manager::crypto::{get_message_hash, to_eth_signed_message_hash};
use airdrop_manager::msg::{
    AirdropResponse, ExecuteMsg, InstantiateMsg, IsClaimedResponse, QueryMsg,
};
use airdrop_manager::ContractError;
use cosmwasm_schema::cw_serde;
use cosmwasm_std::{
    Addr, Binary, DepsMut, Empty, Env, MessageInfo, Response, StdError, StdResult, Uint128,
};
use cw20::{BalanceResponse, Cw20Coin, Cw20ExecuteMsg, Cw20QueryMsg};
use cw_multi_test::{App, AppResponse, Contract, ContractWrapper, Executor};
use cw_storage_plus::Item;
use k256::ecdsa::SigningKey;

// hardhat account #0
const VALIDATOR_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const VALIDATOR_ADDRESS: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

const HOUR: u64 = 60 * 60;

struct Suite {
    app: App,
    owner: Addr,
    creator: Addr,
    claimer: Addr,
    token: Addr,
    manager: Addr,
}

fn mock_app() -> App {
    App::default()
}

fn contract_airdrop_manager() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(
        airdrop_manager::contract::execute,
        airdrop_manager::contract::instantiate,
        airdrop_manager::contract::query,
    ))
}

fn contract_cw20() -> Box<dyn Contract<Empty>> {
    Box::new(ContractWrapper::new(
        cw20_base::contract::execute,
        cw20_base::contract::instantiate,
        cw20_base::contract::query,
    ))
}

const TRANSFERS_FROZEN: Item<bool> = Item::new("transfers_frozen");

#[cw_serde]
struct SetFrozen {
    frozen: bool,
}

// cw20-base that rejects `Transfer` while frozen through sudo
fn freezable_cw20_execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: Cw20ExecuteMsg,
) -> Result<Response, cw20_base::ContractError> {
    if let Cw20ExecuteMsg::Transfer { .. } = msg {
        if TRANSFERS_FROZEN.may_load(deps.storage)?.unwrap_or_default() {
            return Err(StdError::generic_err("transfers are frozen").into());
        }
    }
    cw20_base::contract::execute(deps, env, info, msg)
}

fn freezable_cw20_sudo(deps: DepsMut, _env: Env, msg: SetFrozen) -> StdResult<Response> {
    TRANSFERS_FROZEN.save(deps.storage, &msg.frozen)?;
    Ok(Response::default())
}

fn contract_freezable_cw20() -> Box<dyn Contract<Empty>> {
    Box::new(
        ContractWrapper::new(
            freezable_cw20_execute,
            cw20_base::contract::instantiate,
            cw20_base::contract::query,
        )
        .with_sudo(freezable_cw20_sudo),
    )
}

fn sign_claim(airdrop_id: u64, address: &Addr, amount: u128) -> Binary {
    let key = SigningKey::from_slice(&hex::decode(VALIDATOR_KEY).unwrap()).unwrap();
    let digest = to_eth_signed_message_hash(&get_message_hash(
        airdrop_id,
        address.as_str(),
        Uint128::new(amount),
    ));
    let (signature, recovery_id) = key.sign_prehash_recoverable(&digest).unwrap();

    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(27 + recovery_id.to_byte());
    Binary::from(bytes)
}

fn init_contracts() -> Suite {
    init_contracts_with_token(contract_cw20())
}

fn init_contracts_with_token(token_contract: Box<dyn Contract<Empty>>) -> Suite {
    let mut app = mock_app();
    let owner = Addr::unchecked("owner");
    let creator = Addr::unchecked("creator");
    let claimer = Addr::unchecked("claimer");

    let cw20_code_id = app.store_code(token_contract);
    let token = app
        .instantiate_contract(
            cw20_code_id,
            owner.clone(),
            &cw20_base::msg::InstantiateMsg {
                name: "Airdrop token".to_string(),
                symbol: "AIRDROP".to_string(),
                decimals: 6,
                initial_balances: vec![Cw20Coin {
                    address: creator.to_string(),
                    amount: Uint128::new(1_000_000),
                }],
                mint: None,
                marketing: None,
            },
            &[],
            "token",
            None,
        )
        .unwrap();

    let manager_code_id = app.store_code(contract_airdrop_manager());
    let manager = app
        .instantiate_contract(
            manager_code_id,
            owner.clone(),
            &InstantiateMsg {
                validator_address: VALIDATOR_ADDRESS.to_string(),
                max_airdrop_duration: 60 * 60 * 24,
                claim_duration: 600,
            },
            &[],
            "airdrop-manager",
            None,
        )
        .unwrap();

    Suite {
        app,
        owner,
        creator,
        claimer,
        token,
        manager,
    }
}

impl Suite {
    fn now(&self) -> u64 {
        self.app.block_info().time.seconds()
    }

    fn approve(&mut self, amount: u128) {
        self.app
            .execute_contract(
                self.creator.clone(),
                self.token.clone(),
                &Cw20ExecuteMsg::IncreaseAllowance {
                    spender: self.manager.to_string(),
                    amount: Uint128::new(amount),
                    expires: None,
                },
                &[],
            )
            .unwrap();
    }

    fn create_airdrop(
        &mut self,
        id: u64,
        start_time: u64,
        finish_time: u64,
        amount: u128,
    ) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            self.creator.clone(),
            self.manager.clone(),
            &ExecuteMsg::CreateAirdrop {
                id,
                start_time,
                finish_time,
                token_address: self.token.to_string(),
                token_amount: Uint128::new(amount),
                max_tokens_per_user: Uint128::new(2),
            },
            &[],
        )
    }

    fn claim(&mut self, sender: &Addr, amount: u128, signature: Binary) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            sender.clone(),
            self.manager.clone(),
            &ExecuteMsg::ClaimToken {
                airdrop_id: 1,
                amount: Uint128::new(amount),
                signature,
            },
            &[],
        )
    }

    fn balance(&self, address: &Addr) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.token,
                &Cw20QueryMsg::Balance {
                    address: address.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    fn is_claimed(&self, address: &Addr) -> bool {
        let res: IsClaimedResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.manager,
                &QueryMsg::IsClaimed {
                    id: 1,
                    address: address.to_string(),
                },
            )
            .unwrap();
        res.is_claimed
    }

    fn airdrop(&self, id: u64) -> Option<AirdropResponse> {
        self.app
            .wrap()
            .query_wasm_smart(&self.manager, &QueryMsg::Airdrop { id })
            .ok()
    }
}

#[test]
fn create_and_claim() {
    let mut suite = init_contracts();
    let now = suite.now();

    suite.approve(10);
    suite.create_airdrop(1, now, now + HOUR, 10).unwrap();
    assert_eq!(suite.balance(&suite.manager), Uint128::new(10));
    assert_eq!(suite.balance(&suite.creator), Uint128::new(999_990));

    let claimer = suite.claimer.clone();
    let signature = sign_claim(1, &claimer, 1);
    suite.claim(&claimer, 1, signature.clone()).unwrap();
    assert_eq!(suite.balance(&claimer), Uint128::new(1));
    assert_eq!(suite.balance(&suite.manager), Uint128::new(9));

    let err = suite.claim(&claimer, 1, signature).unwrap_err();
    assert_eq!(
        err.root_cause().to_string(),
        "Sender already claim tokens for this airdrop"
    );
    assert_eq!(suite.balance(&claimer), Uint128::new(1));

    let airdrop = suite.airdrop(1).unwrap();
    assert_eq!(airdrop.token_amount, Uint128::new(9));
    assert_eq!(airdrop.claimed_amount, Uint128::new(1));
}

#[test]
fn unverified_signature_keeps_balances() {
    let mut suite = init_contracts();
    let now = suite.now();

    suite.approve(10);
    suite.create_airdrop(1, now, now + HOUR, 10).unwrap();

    let claimer = suite.claimer.clone();
    let err = suite
        .claim(&claimer, 1, sign_claim(1, &claimer, 2))
        .unwrap_err()
        .downcast::<ContractError>()
        .unwrap();
    assert_eq!(err, ContractError::SignatureUnverified {});
    assert_eq!(suite.balance(&claimer), Uint128::zero());
    assert_eq!(suite.balance(&suite.manager), Uint128::new(10));
}

#[test]
fn failed_transfer_from_rolls_back_creation() {
    let mut suite = init_contracts();
    let now = suite.now();

    // no allowance given
    suite.create_airdrop(1, now, now + HOUR, 10).unwrap_err();
    assert!(suite.airdrop(1).is_none());
    assert_eq!(suite.balance(&suite.manager), Uint128::zero());

    // the period is still free
    suite.approve(10);
    suite.create_airdrop(2, now, now + HOUR, 10).unwrap();
    assert!(suite.airdrop(2).unwrap().flag);
}

#[test]
fn failed_transfer_rolls_back_claim() {
    let mut suite = init_contracts_with_token(contract_freezable_cw20());
    let now = suite.now();

    suite.approve(10);
    suite.create_airdrop(1, now, now + HOUR, 10).unwrap();

    let token = suite.token.clone();
    suite
        .app
        .wasm_sudo(token.clone(), &SetFrozen { frozen: true })
        .unwrap();

    let claimer = suite.claimer.clone();
    let signature = sign_claim(1, &claimer, 2);
    let err = suite.claim(&claimer, 2, signature.clone()).unwrap_err();
    assert_eq!(err.root_cause().to_string(), "Generic error: transfers are frozen");

    assert!(!suite.is_claimed(&claimer));
    let airdrop = suite.airdrop(1).unwrap();
    assert_eq!(airdrop.token_amount, Uint128::new(10));
    assert_eq!(airdrop.claimed_amount, Uint128::zero());
    assert_eq!(suite.balance(&claimer), Uint128::zero());
    assert_eq!(suite.balance(&suite.manager), Uint128::new(10));

    // the same signature works once the token accepts transfers again
    suite
        .app
        .wasm_sudo(token, &SetFrozen { frozen: false })
        .unwrap();
    suite.claim(&claimer, 2, signature).unwrap();

    assert!(suite.is_claimed(&claimer));
    assert_eq!(suite.balance(&claimer), Uint128::new(2));
    assert_eq!(suite.airdrop(1).unwrap().token_amount, Uint128::new(8));
}

#[test]
fn add_tokens_requires_allowance() {
    let mut suite = init_contracts();
    let now = suite.now();

    suite.approve(10);
    suite.create_airdrop(1, now, now + HOUR, 10).unwrap();

    let add = ExecuteMsg::AddAirdropToken {
        id: 1,
        amount: Uint128::new(100),
    };
    suite
        .app
        .execute_contract(suite.creator.clone(), suite.manager.clone(), &add, &[])
        .unwrap_err();
    assert_eq!(suite.airdrop(1).unwrap().token_amount, Uint128::new(10));

    suite.approve(100);
    suite
        .app
        .execute_contract(suite.creator.clone(), suite.manager.clone(), &add, &[])
        .unwrap();
    assert_eq!(suite.airdrop(1).unwrap().token_amount, Uint128::new(110));
    assert_eq!(suite.balance(&suite.manager), Uint128::new(110));
}

#[test]
fn close_returns_unclaimed_tokens() {
    let mut suite = init_contracts();
    let now = suite.now();

    suite.approve(10);
    suite.create_airdrop(1, now, now + HOUR, 10).unwrap();

    let claimer = suite.claimer.clone();
    suite
        .claim(&claimer, 2, sign_claim(1, &claimer, 2))
        .unwrap();

    let close = ExecuteMsg::CloseAirdrop { id: 1 };
    let err = suite
        .app
        .execute_contract(suite.owner.clone(), suite.manager.clone(), &close, &[])
        .unwrap_err();
    assert_eq!(err.root_cause().to_string(), "Cant close while during airdrop");

    suite
        .app
        .update_block(|block| block.time = block.time.plus_seconds(HOUR + 600));
    suite
        .app
        .execute_contract(suite.owner.clone(), suite.manager.clone(), &close, &[])
        .unwrap();

    assert_eq!(suite.balance(&suite.manager), Uint128::zero());
    assert_eq!(suite.balance(&suite.creator), Uint128::new(999_998));
    assert_eq!(suite.balance(&claimer), Uint128::new(2));

    let airdrop = suite.airdrop(1).unwrap();
    assert!(!airdrop.flag);
    assert_eq!(airdrop.refunded_amount, Uint128::new(8));
    assert_eq!(airdrop.claimed_amount, Uint128::new(2));
}
