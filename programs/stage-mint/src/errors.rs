use anchor_lang::prelude::*;

#[error_code]
pub enum SaleError {
    #[msg("Caller is not the sale authority")]
    Unauthorized,
    #[msg("No sale stage has been configured")]
    NotConfigured,
    #[msg("Sale stage is not active")]
    SaleNotActive,
    #[msg("Attached payment does not match price times quantity")]
    WrongPayment,
    #[msg("Ticket was not signed by the allowlist signer")]
    TicketInvalid,
    #[msg("Mint would exceed the maximum supply")]
    SupplyExceeded,
    #[msg("Malformed signature")]
    InvalidSignature,
    #[msg("Stage start time must be non-negative and before its end time")]
    InvalidStageWindow,
    #[msg("Stage already sold units and can no longer be changed")]
    StageLocked,
    #[msg("Too many sale stages")]
    TooManyStages,
    #[msg("Current sale index cannot move backwards")]
    StageRegression,
    #[msg("Mint quantity must be greater than zero")]
    ZeroQuantity,
    #[msg("Math overflow")]
    MathOverflow,
    #[msg("Unit does not exist")]
    UnitNotFound,
    #[msg("URI is too long")]
    UriTooLong,
}
