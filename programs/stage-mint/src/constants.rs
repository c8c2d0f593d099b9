use anchor_lang::prelude::*;

#[constant]
pub const SALE_STATE_SEED: &[u8] = b"sale_state";
#[constant]
pub const LEDGER_SEED: &[u8] = b"ledger";

/// Upper bound on registered sale stages, sizes the `SaleState` account.
pub const MAX_STAGES: usize = 8;

pub const MAX_URI_LEN: usize = 200;

/// Prefix applied by `personal_sign` wallets before hashing a 32-byte digest.
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

pub const SIGNATURE_LEN: usize = 65;
pub const ETH_ADDRESS_LEN: usize = 20;

pub const TOKEN_URI_SUFFIX: &str = ".json";
