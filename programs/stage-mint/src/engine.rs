use anchor_lang::prelude::*;

use crate::errors::SaleError;
use crate::ledger::{OwnershipBatch, OwnershipLedger};
use crate::state::{SaleStage, SaleStageConfig, SaleState, StageAdvance};
use crate::ticket::{SignerRecovery, Ticket};

/// Inputs the runtime supplies to every call: the clock, the signer and the
/// lamports the caller offers to pay.
#[derive(Clone, Copy, Debug)]
pub struct CallContext {
    pub now: i64,
    pub caller: Pubkey,
    pub payment: u64,
}

impl CallContext {
    pub fn new(now: i64, caller: Pubkey, payment: u64) -> Self {
        Self {
            now,
            caller,
            payment,
        }
    }

    /// Reads the cluster clock once for the whole call.
    pub fn current(caller: Pubkey, payment: u64) -> Result<Self> {
        let clock = Clock::get()?;
        Ok(Self::new(clock.unix_timestamp, caller, payment))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketCheck {
    Valid,
    StageInactive,
    WrongSigner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaleReceipt {
    pub stage_index: u32,
    pub advanced: Option<StageAdvance>,
    pub minted: OwnershipBatch,
    pub paid: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AirdropReceipt {
    pub advanced: Option<StageAdvance>,
    pub minted: Vec<OwnershipBatch>,
}

/// Classifies a ticket against the stage active at `call.now`. Having no
/// stage configured counts as an inactive stage.
pub fn check_ticket<R: SignerRecovery>(
    state: &SaleState,
    recovery: &R,
    call: &CallContext,
    message: &str,
    signature: &[u8],
) -> Result<TicketCheck> {
    let whitelist_open = state
        .current_stage_at(call.now)
        .map_or(false, |stage| stage.accepts(SaleStage::Whitelist, call.now));
    if !whitelist_open {
        return Ok(TicketCheck::StageInactive);
    }

    let ticket = Ticket::new(call.caller, message, signature);
    if !ticket.is_signed_by(recovery, &state.ticket_signer)? {
        return Ok(TicketCheck::WrongSigner);
    }
    Ok(TicketCheck::Valid)
}

pub fn is_ticket_available<R: SignerRecovery>(
    state: &SaleState,
    recovery: &R,
    call: &CallContext,
    message: &str,
    signature: &[u8],
) -> Result<bool> {
    let check = check_ticket(state, recovery, call, message, signature)?;
    Ok(check == TicketCheck::Valid)
}

pub fn token_uri(state: &SaleState, ledger: &OwnershipLedger, id: u64) -> Result<String> {
    ledger.owner_of(id)?;
    Ok(state.token_uri(id))
}

/// Mint paths over one sale state and ledger.
///
/// Every entry point validates fully before touching state, so a failed call
/// leaves both accounts exactly as they were.
pub struct MintEngine<'a, R> {
    state: &'a mut SaleState,
    ledger: &'a mut OwnershipLedger,
    recovery: R,
}

impl<'a, R: SignerRecovery> MintEngine<'a, R> {
    pub fn new(state: &'a mut SaleState, ledger: &'a mut OwnershipLedger, recovery: R) -> Self {
        Self {
            state,
            ledger,
            recovery,
        }
    }

    /// Administrator mint that ignores stages, windows and prices. The stage
    /// pointer still advances like on every other mint path.
    pub fn mint_for_airdrop(
        &mut self,
        call: &CallContext,
        recipients: &[Pubkey],
        amount_each: u64,
    ) -> Result<AirdropReceipt> {
        self.state.ensure_authority(&call.caller)?;
        require!(
            !recipients.is_empty() && amount_each > 0,
            SaleError::ZeroQuantity
        );
        let total = amount_each
            .checked_mul(recipients.len() as u64)
            .ok_or(SaleError::SupplyExceeded)?;
        self.ledger.ensure_capacity(total)?;

        let advanced = if self.state.is_configured() {
            self.state.proceed_sale_stage_if_needed(call.now)?
        } else {
            None
        };
        let minted = recipients
            .iter()
            .map(|recipient| self.ledger.mint(*recipient, amount_each))
            .collect::<Result<Vec<_>>>()?;

        Ok(AirdropReceipt { advanced, minted })
    }

    /// Public-sale mint paid at the current stage's price.
    pub fn mint(&mut self, call: &CallContext, quantity: u64) -> Result<SaleReceipt> {
        require!(quantity > 0, SaleError::ZeroQuantity);
        let stage = self.state.current_config(call.now)?;
        require!(
            stage.accepts(SaleStage::Public, call.now),
            SaleError::SaleNotActive
        );
        self.sell(call, &stage, quantity)
    }

    /// Allowlist mint authorized by a ticket signed for the caller.
    pub fn whitelist_mint(
        &mut self,
        call: &CallContext,
        quantity: u64,
        message: &str,
        signature: &[u8],
    ) -> Result<SaleReceipt> {
        require!(quantity > 0, SaleError::ZeroQuantity);
        let stage = self.state.current_config(call.now)?;
        match check_ticket(&*self.state, &self.recovery, call, message, signature)? {
            TicketCheck::Valid => {}
            TicketCheck::StageInactive => return err!(SaleError::SaleNotActive),
            TicketCheck::WrongSigner => return err!(SaleError::TicketInvalid),
        }
        self.sell(call, &stage, quantity)
    }

    fn sell(
        &mut self,
        call: &CallContext,
        stage: &SaleStageConfig,
        quantity: u64,
    ) -> Result<SaleReceipt> {
        let cost = stage.cost(quantity)?;
        require!(call.payment == cost, SaleError::WrongPayment);
        self.ledger.ensure_capacity(quantity)?;

        let advanced = self.state.proceed_sale_stage_if_needed(call.now)?;
        self.state.record_sale(stage.index, quantity)?;
        let minted = self.ledger.mint(call.caller, quantity)?;

        Ok(SaleReceipt {
            stage_index: stage.index,
            advanced,
            minted,
            paid: cost,
        })
    }
}
