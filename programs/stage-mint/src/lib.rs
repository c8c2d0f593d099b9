use anchor_lang::prelude::*;
use anchor_lang::system_program;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod state;
pub mod ticket;

#[cfg(test)]
mod test_utils;

use constants::*;
use engine::{CallContext, MintEngine, SaleReceipt};
use errors::SaleError;
use events::*;
use ledger::*;
use state::*;
use ticket::Secp256k1Recovery;

declare_id!("DX6fiZhRGpW8MEUKfbW5LbB11vExcSCAsydsDon7Womq");

#[program]
pub mod stage_mint {
    use super::*;

    pub fn initialize(
        ctx: Context<Initialize>,
        ticket_signer: [u8; 20],
        max_supply: u64,
    ) -> Result<()> {
        require!(max_supply > 0, SaleError::ZeroQuantity);

        let state = &mut ctx.accounts.sale_state;
        state.authority = ctx.accounts.authority.key();
        state.treasury = ctx.accounts.treasury.key();
        state.ticket_signer = ticket_signer;
        state.current_index = 0;
        state.stages = Vec::new();
        state.not_revealed_uri = String::new();
        state.base_uri = String::new();
        state.revealed = false;
        state.bump = ctx.bumps.sale_state;

        let ledger = &mut ctx.accounts.ledger;
        ledger.max_supply = max_supply;
        ledger.total_minted = 0;
        ledger.batches = Vec::new();
        ledger.bump = ctx.bumps.ledger;

        msg!("Sale initialized with max supply {}", max_supply);
        Ok(())
    }

    pub fn set_sale_config(
        ctx: Context<AdminUpdate>,
        index: u32,
        start_time: i64,
        end_time: i64,
        price: u64,
        kind: SaleStage,
    ) -> Result<()> {
        let authority = ctx.accounts.authority.key();
        let config = SaleStageConfig::new(index, start_time, end_time, price, kind);
        ctx.accounts
            .sale_state
            .set_sale_config(&authority, config)?;

        msg!(
            "Sale stage {} set: [{}, {}) at {} lamports",
            index,
            start_time,
            end_time,
            price
        );
        emit!(SaleConfigSet {
            index,
            start_time,
            end_time,
            price,
            kind: kind as u8,
        });
        Ok(())
    }

    pub fn set_current_sale_index(ctx: Context<AdminUpdate>, index: u32) -> Result<()> {
        let authority = ctx.accounts.authority.key();
        ctx.accounts
            .sale_state
            .set_current_index(&authority, index)?;

        emit!(CurrentSaleIndexSet {
            index,
            time: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }

    pub fn set_ticket_signer(ctx: Context<AdminUpdate>, ticket_signer: [u8; 20]) -> Result<()> {
        let authority = ctx.accounts.authority.key();
        ctx.accounts
            .sale_state
            .set_ticket_signer(&authority, ticket_signer)?;

        emit!(TicketSignerUpdated {
            signer: ticket_signer,
            time: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }

    pub fn set_not_revealed_uri(ctx: Context<AdminUpdate>, uri: String) -> Result<()> {
        let authority = ctx.accounts.authority.key();
        ctx.accounts
            .sale_state
            .set_not_revealed_uri(&authority, uri)?;
        Ok(())
    }

    pub fn reveal(ctx: Context<AdminUpdate>, base_uri: String) -> Result<()> {
        let authority = ctx.accounts.authority.key();
        ctx.accounts
            .sale_state
            .reveal(&authority, base_uri.clone())?;

        emit!(CollectionRevealed {
            base_uri,
            time: Clock::get()?.unix_timestamp,
        });
        Ok(())
    }

    pub fn mint_for_airdrop(
        ctx: Context<Airdrop>,
        recipients: Vec<Pubkey>,
        amount_each: u64,
    ) -> Result<()> {
        let call = CallContext::current(ctx.accounts.authority.key(), 0)?;
        let receipt = MintEngine::new(
            &mut ctx.accounts.sale_state,
            &mut ctx.accounts.ledger,
            Secp256k1Recovery,
        )
        .mint_for_airdrop(&call, &recipients, amount_each)?;

        announce_advance(&call, receipt.advanced);
        msg!(
            "Airdropped {} units to each of {} recipients",
            amount_each,
            recipients.len()
        );
        for batch in receipt.minted {
            emit!(UnitsMinted {
                owner: batch.owner,
                first_id: batch.first_id,
                quantity: batch.quantity,
                paid: 0,
                airdrop: true,
            });
        }
        Ok(())
    }

    pub fn mint(ctx: Context<SaleMint>, quantity: u64, payment: u64) -> Result<()> {
        let call = CallContext::current(ctx.accounts.buyer.key(), payment)?;
        let receipt = MintEngine::new(
            &mut ctx.accounts.sale_state,
            &mut ctx.accounts.ledger,
            Secp256k1Recovery,
        )
        .mint(&call, quantity)?;

        ctx.accounts.collect_payment(receipt.paid)?;
        announce_sale(&call, &receipt);
        Ok(())
    }

    pub fn whitelist_mint(
        ctx: Context<SaleMint>,
        quantity: u64,
        message: String,
        signature: Vec<u8>,
        payment: u64,
    ) -> Result<()> {
        let call = CallContext::current(ctx.accounts.buyer.key(), payment)?;
        let receipt = MintEngine::new(
            &mut ctx.accounts.sale_state,
            &mut ctx.accounts.ledger,
            Secp256k1Recovery,
        )
        .whitelist_mint(&call, quantity, &message, &signature)?;

        ctx.accounts.collect_payment(receipt.paid)?;
        announce_sale(&call, &receipt);
        Ok(())
    }

    /// View: stage in effect right now, without persisting the advance.
    pub fn current_sale_config(ctx: Context<SaleView>) -> Result<SaleStageConfig> {
        let clock = Clock::get()?;
        ctx.accounts.sale_state.current_config(clock.unix_timestamp)
    }

    /// View: whether the signing caller could `whitelist_mint` with this ticket now.
    pub fn is_ticket_available(
        ctx: Context<TicketView>,
        message: String,
        signature: Vec<u8>,
    ) -> Result<bool> {
        let call = CallContext::current(ctx.accounts.caller.key(), 0)?;
        crate::engine::is_ticket_available(
            &ctx.accounts.sale_state,
            &Secp256k1Recovery,
            &call,
            &message,
            &signature,
        )
    }

    pub fn current_sale_index(ctx: Context<SaleView>) -> Result<u32> {
        Ok(ctx.accounts.sale_state.current_index)
    }

    pub fn balance_of(ctx: Context<SaleView>, owner: Pubkey) -> Result<u64> {
        Ok(ctx.accounts.ledger.balance_of(&owner))
    }

    pub fn owner_of(ctx: Context<SaleView>, id: u64) -> Result<Pubkey> {
        ctx.accounts.ledger.owner_of(id)
    }

    pub fn token_uri(ctx: Context<SaleView>, id: u64) -> Result<String> {
        crate::engine::token_uri(&ctx.accounts.sale_state, &ctx.accounts.ledger, id)
    }

    pub fn owner(ctx: Context<SaleView>) -> Result<Pubkey> {
        Ok(ctx.accounts.sale_state.authority)
    }
}

fn announce_advance(call: &CallContext, advanced: Option<StageAdvance>) {
    if let Some(advance) = advanced {
        msg!(
            "Advanced sale stage {} -> {}",
            advance.from_index,
            advance.to_index
        );
        emit!(SaleStageAdvanced {
            from_index: advance.from_index,
            to_index: advance.to_index,
            time: call.now,
        });
    }
}

fn announce_sale(call: &CallContext, receipt: &SaleReceipt) {
    announce_advance(call, receipt.advanced);

    emit!(UnitsMinted {
        owner: call.caller,
        first_id: receipt.minted.first_id,
        quantity: receipt.minted.quantity,
        paid: receipt.paid,
        airdrop: false,
    });
}

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        init,
        payer = authority,
        space = SaleState::SPACE,
        seeds = [SALE_STATE_SEED],
        bump
    )]
    pub sale_state: Account<'info, SaleState>,

    #[account(
        init,
        payer = authority,
        space = OwnershipLedger::space_for(0),
        seeds = [LEDGER_SEED],
        bump
    )]
    pub ledger: Account<'info, OwnershipLedger>,

    pub treasury: SystemAccount<'info>,
    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct AdminUpdate<'info> {
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_STATE_SEED],
        bump = sale_state.bump,
        has_one = authority @ SaleError::Unauthorized,
    )]
    pub sale_state: Account<'info, SaleState>,
}

#[derive(Accounts)]
#[instruction(recipients: Vec<Pubkey>)]
pub struct Airdrop<'info> {
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_STATE_SEED],
        bump = sale_state.bump,
        has_one = authority @ SaleError::Unauthorized,
    )]
    pub sale_state: Account<'info, SaleState>,

    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        realloc = OwnershipLedger::space_for(ledger.batches.len() + recipients.len()),
        realloc::payer = authority,
        realloc::zero = false,
    )]
    pub ledger: Account<'info, OwnershipLedger>,

    pub system_program: Program<'info, System>,
}

#[derive(Accounts)]
pub struct SaleMint<'info> {
    #[account(mut)]
    pub buyer: Signer<'info>,

    #[account(
        mut,
        seeds = [SALE_STATE_SEED],
        bump = sale_state.bump,
        has_one = treasury,
    )]
    pub sale_state: Account<'info, SaleState>,

    #[account(
        mut,
        seeds = [LEDGER_SEED],
        bump = ledger.bump,
        realloc = OwnershipLedger::space_for(ledger.batches.len() + 1),
        realloc::payer = buyer,
        realloc::zero = false,
    )]
    pub ledger: Account<'info, OwnershipLedger>,

    #[account(mut)]
    pub treasury: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> SaleMint<'info> {
    fn collect_payment(&self, lamports: u64) -> Result<()> {
        if lamports == 0 {
            return Ok(());
        }
        system_program::transfer(
            CpiContext::new(
                self.system_program.to_account_info(),
                system_program::Transfer {
                    from: self.buyer.to_account_info(),
                    to: self.treasury.to_account_info(),
                },
            ),
            lamports,
        )
    }
}

#[derive(Accounts)]
pub struct SaleView<'info> {
    #[account(seeds = [SALE_STATE_SEED], bump = sale_state.bump)]
    pub sale_state: Account<'info, SaleState>,

    #[account(seeds = [LEDGER_SEED], bump = ledger.bump)]
    pub ledger: Account<'info, OwnershipLedger>,
}

#[derive(Accounts)]
pub struct TicketView<'info> {
    pub caller: Signer<'info>,

    #[account(seeds = [SALE_STATE_SEED], bump = sale_state.bump)]
    pub sale_state: Account<'info, SaleState>,
}
