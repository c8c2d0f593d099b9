use anchor_lang::prelude::*;

use crate::errors::SaleError;

/// A contiguous run of unit ids held by one owner.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct OwnershipBatch {
    pub first_id: u64,
    pub quantity: u64,
    pub owner: Pubkey,
}

impl OwnershipBatch {
    pub const LEN: usize = 8 + 8 + 32;

    pub fn last_id(&self) -> u64 {
        self.first_id + self.quantity - 1
    }
}

/// Ownership and supply of the collection. Unit ids start at 1 and are handed
/// out sequentially; each mint appends one batch, or extends the last batch if
/// it belongs to the same owner.
#[account]
pub struct OwnershipLedger {
    pub max_supply: u64,
    pub total_minted: u64,
    pub batches: Vec<OwnershipBatch>,
    pub bump: u8,
}

impl OwnershipLedger {
    pub const BASE_SPACE: usize = 8 // discriminator
        + 8 // max_supply
        + 8 // total_minted
        + 4 // batches length prefix
        + 1; // bump

    pub fn space_for(batches: usize) -> usize {
        Self::BASE_SPACE + batches * OwnershipBatch::LEN
    }

    pub fn remaining_supply(&self) -> u64 {
        self.max_supply.saturating_sub(self.total_minted)
    }

    pub fn ensure_capacity(&self, quantity: u64) -> Result<()> {
        require!(
            quantity <= self.remaining_supply(),
            SaleError::SupplyExceeded
        );
        Ok(())
    }

    /// Mints `quantity` new units to `to` and returns the assigned id range.
    pub fn mint(&mut self, to: Pubkey, quantity: u64) -> Result<OwnershipBatch> {
        require!(quantity > 0, SaleError::ZeroQuantity);
        self.ensure_capacity(quantity)?;

        let minted = OwnershipBatch {
            first_id: self.total_minted + 1,
            quantity,
            owner: to,
        };
        match self.batches.last_mut() {
            Some(last) if last.owner == to => last.quantity += quantity,
            _ => self.batches.push(minted),
        }
        self.total_minted += quantity;
        Ok(minted)
    }

    pub fn balance_of(&self, owner: &Pubkey) -> u64 {
        self.batches
            .iter()
            .filter(|batch| batch.owner == *owner)
            .map(|batch| batch.quantity)
            .sum()
    }

    pub fn owner_of(&self, id: u64) -> Result<Pubkey> {
        require!(id >= 1 && id <= self.total_minted, SaleError::UnitNotFound);
        let position = self.batches.partition_point(|batch| batch.first_id <= id);
        let batch = position
            .checked_sub(1)
            .and_then(|position| self.batches.get(position))
            .ok_or(SaleError::UnitNotFound)?;
        Ok(batch.owner)
    }
}
