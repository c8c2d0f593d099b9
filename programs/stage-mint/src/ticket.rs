//! Allowlist tickets.
//!
//! A ticket is an Ethereum `personal_sign` signature over
//! `keccak256(holder_pubkey || message)`, produced off-chain by the allowlist
//! signer. The signer is identified by its 20-byte Ethereum address.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;
use anchor_lang::solana_program::secp256k1_recover::secp256k1_recover;

use crate::constants::*;
use crate::errors::SaleError;

pub type EthAddress = [u8; 20];

/// Recovers the identity that produced `signature` over `hash`.
pub trait SignerRecovery {
    fn recover_signer(&self, hash: &[u8; 32], signature: &[u8]) -> Result<EthAddress>;
}

/// Recovery through the runtime's secp256k1 syscall.
#[derive(Clone, Copy, Debug, Default)]
pub struct Secp256k1Recovery;

impl SignerRecovery for Secp256k1Recovery {
    fn recover_signer(&self, hash: &[u8; 32], signature: &[u8]) -> Result<EthAddress> {
        require!(signature.len() == SIGNATURE_LEN, SaleError::InvalidSignature);
        let recovery_id = match signature[SIGNATURE_LEN - 1] {
            v @ 0..=1 => v,
            v @ 27..=28 => v - 27,
            _ => return err!(SaleError::InvalidSignature),
        };

        let pubkey = secp256k1_recover(hash, recovery_id, &signature[..SIGNATURE_LEN - 1])
            .map_err(|_| error!(SaleError::InvalidSignature))?;
        Ok(eth_address(&pubkey.to_bytes()))
    }
}

/// Packed digest of the ticket holder and message.
pub fn ticket_digest(holder: &Pubkey, message: &str) -> [u8; 32] {
    keccak::hashv(&[holder.as_ref(), message.as_bytes()]).to_bytes()
}

pub fn eth_signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    keccak::hashv(&[ETH_SIGNED_MESSAGE_PREFIX, digest.as_ref()]).to_bytes()
}

/// Address of an uncompressed secp256k1 public key (without the 0x04 tag).
pub fn eth_address(pubkey: &[u8; 64]) -> EthAddress {
    let hash = keccak::hash(pubkey).to_bytes();
    let mut address = [0u8; ETH_ADDRESS_LEN];
    address.copy_from_slice(&hash[32 - ETH_ADDRESS_LEN..]);
    address
}

pub struct Ticket<'a> {
    pub holder: Pubkey,
    pub message: &'a str,
    pub signature: &'a [u8],
}

impl<'a> Ticket<'a> {
    pub fn new(holder: Pubkey, message: &'a str, signature: &'a [u8]) -> Self {
        Self {
            holder,
            message,
            signature,
        }
    }

    pub fn signed_hash(&self) -> [u8; 32] {
        eth_signed_message_hash(&ticket_digest(&self.holder, self.message))
    }

    pub fn signer<R: SignerRecovery>(&self, recovery: &R) -> Result<EthAddress> {
        recovery.recover_signer(&self.signed_hash(), self.signature)
    }

    pub fn is_signed_by<R: SignerRecovery>(&self, recovery: &R, signer: &EthAddress) -> Result<bool> {
        Ok(self.signer(recovery)? == *signer)
    }
}
