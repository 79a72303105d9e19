use cosmwasm_std::{Api, Uint128};
use sha3::{Digest, Keccak256};

use crate::error::ContractError;

/// Prefix applied by wallets on `personal_sign` of a 32-byte message.
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";
/// `r || s || v`
pub const SIGNATURE_LENGTH: usize = 65;
const ETH_ADDRESS_LENGTH: usize = 20;

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(Keccak256::digest(data).as_slice());
    out
}

/// Left-pads an integer to a 32-byte big endian word.
fn to_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Builds the digest the validator signs to authorize a claim.
/// ## Params
/// * **airdrop_id** id of the airdrop the claim belongs to.
///
/// * **user_address** address of the claimant, as it is seen by the contract.
///
/// * **token_amount** amount of tokens the claimant is allowed to withdraw.
///
/// The encoding is `word(airdrop_id) || user_address bytes || word(token_amount)`.
pub fn get_message_hash(airdrop_id: u64, user_address: &str, token_amount: Uint128) -> [u8; 32] {
    keccak256(
        &[
            to_word(airdrop_id.into()).as_slice(),
            user_address.as_bytes(),
            to_word(token_amount.u128()).as_slice(),
        ]
        .concat(),
    )
}

pub fn to_eth_signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak256(&[ETH_SIGNED_MESSAGE_PREFIX, digest.as_slice()].concat())
}

/// Recovers the address that signed the prefixed version of `digest`.
/// Returns the address as lowercase `0x` hex.
pub fn recover_signer(
    api: &dyn Api,
    digest: &[u8; 32],
    signature: &[u8],
) -> Result<String, ContractError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(ContractError::InvalidSignature {});
    }

    let recovery_param = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        _ => return Err(ContractError::InvalidSignature {}),
    };

    let message_hash = to_eth_signed_message_hash(digest);
    let pubkey = api
        .secp256k1_recover_pubkey(&message_hash, &signature[..64], recovery_param)
        .map_err(|_| ContractError::InvalidSignature {})?;

    // uncompressed SEC1 key: 0x04 || x || y
    if pubkey.len() != 65 {
        return Err(ContractError::InvalidSignature {});
    }
    let hash = keccak256(&pubkey[1..]);

    Ok(format!("0x{}", hex::encode(&hash[32 - ETH_ADDRESS_LENGTH..])))
}

/// Validates a hex encoded 20-byte address, with or without `0x`, and lowercases it.
pub fn normalize_eth_address(address: &str) -> Result<String, ContractError> {
    let invalid = || ContractError::InvalidValidatorAddress {
        address: address.to_string(),
    };

    let stripped = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let bytes = hex::decode(stripped).map_err(|_| invalid())?;
    if bytes.len() != ETH_ADDRESS_LENGTH {
        return Err(invalid());
    }

    Ok(format!("0x{}", hex::encode(bytes)))
}
