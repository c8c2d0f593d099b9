use anchor_lang::prelude::*;

#[event]
pub struct SaleConfigSet {
    #[index]
    pub index: u32,
    pub start_time: i64,
    pub end_time: i64,
    pub price: u64,
    pub kind: u8,
}

#[event]
pub struct SaleStageAdvanced {
    #[index]
    pub from_index: u32,
    #[index]
    pub to_index: u32,
    pub time: i64,
}

#[event]
pub struct CurrentSaleIndexSet {
    #[index]
    pub index: u32,
    pub time: i64,
}

#[event]
pub struct UnitsMinted {
    #[index]
    pub owner: Pubkey,
    pub first_id: u64,
    pub quantity: u64,
    pub paid: u64,
    pub airdrop: bool,
}

#[event]
pub struct TicketSignerUpdated {
    pub signer: [u8; 20],
    pub time: i64,
}

#[event]
pub struct CollectionRevealed {
    pub base_uri: String,
    pub time: i64,
}
