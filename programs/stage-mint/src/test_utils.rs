use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::ticket::{eth_address, eth_signed_message_hash, ticket_digest, EthAddress};

/// Off-chain allowlist signer, issuing tickets the way a wallet's
/// `signMessage` does.
pub struct TestSigner {
    secret: libsecp256k1::SecretKey,
}

impl TestSigner {
    pub fn new(seed: u8) -> Self {
        let secret = libsecp256k1::SecretKey::parse(&[seed; 32]).expect("valid secret key");
        Self { secret }
    }

    pub fn address(&self) -> EthAddress {
        let public = libsecp256k1::PublicKey::from_secret_key(&self.secret).serialize();
        let mut uncompressed = [0u8; 64];
        uncompressed.copy_from_slice(&public[1..]);
        eth_address(&uncompressed)
    }

    pub fn sign_ticket(&self, holder: &Pubkey, message: &str) -> Vec<u8> {
        let hash = eth_signed_message_hash(&ticket_digest(holder, message));
        let (signature, recovery_id) =
            libsecp256k1::sign(&libsecp256k1::Message::parse(&hash), &self.secret);

        let mut bytes = signature.serialize().to_vec();
        bytes.push(recovery_id.serialize() + 27);
        bytes
    }
}

pub fn assert_sale_error<T: std::fmt::Debug>(result: Result<T>, expected: SaleError) {
    assert_eq!(result.unwrap_err(), anchor_lang::error::Error::from(expected));
}
