use anchor_lang::prelude::*;

use crate::constants::*;
use crate::errors::SaleError;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum SaleStage {
    Whitelist,
    Public,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct SaleStageConfig {
    pub index: u32,
    pub start_time: i64,
    pub end_time: i64,
    pub price: u64, // lamports per unit
    pub kind: SaleStage,
    pub minted: u64,
}

impl SaleStageConfig {
    pub const LEN: usize = 4 + 8 + 8 + 8 + 1 + 8;

    pub fn new(index: u32, start_time: i64, end_time: i64, price: u64, kind: SaleStage) -> Self {
        Self {
            index,
            start_time,
            end_time,
            price,
            kind,
            minted: 0,
        }
    }

    /// The window is half-open: `[start_time, end_time)`.
    pub fn is_open_at(&self, now: i64) -> bool {
        self.start_time <= now && now < self.end_time
    }

    pub fn has_ended_at(&self, now: i64) -> bool {
        now >= self.end_time
    }

    pub fn accepts(&self, kind: SaleStage, now: i64) -> bool {
        self.kind == kind && self.is_open_at(now)
    }

    pub fn cost(&self, quantity: u64) -> Result<u64> {
        let cost = self
            .price
            .checked_mul(quantity)
            .ok_or(SaleError::MathOverflow)?;
        Ok(cost)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct StageAdvance {
    pub from_index: u32,
    pub to_index: u32,
}

#[account]
pub struct SaleState {
    pub authority: Pubkey,
    pub treasury: Pubkey,
    pub ticket_signer: [u8; 20],
    pub current_index: u32,
    pub stages: Vec<SaleStageConfig>, // sorted by index
    pub not_revealed_uri: String,
    pub base_uri: String,
    pub revealed: bool,
    pub bump: u8,
}

impl SaleState {
    pub const SPACE: usize = 8 // discriminator
        + 32 // authority
        + 32 // treasury
        + ETH_ADDRESS_LEN // ticket_signer
        + 4 // current_index
        + 4 + MAX_STAGES * SaleStageConfig::LEN // stages
        + 4 + MAX_URI_LEN // not_revealed_uri
        + 4 + MAX_URI_LEN // base_uri
        + 1 // revealed
        + 1; // bump

    pub fn ensure_authority(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(*caller, self.authority, SaleError::Unauthorized);
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        !self.stages.is_empty()
    }

    pub fn stage(&self, index: u32) -> Option<&SaleStageConfig> {
        self.stages
            .binary_search_by_key(&index, |stage| stage.index)
            .ok()
            .map(|position| &self.stages[position])
    }

    /// Inserts or overwrites the stage keyed by `config.index`.
    ///
    /// Windows of different stages are not compared against each other, so
    /// stages may overlap or be registered out of order. The first stage ever
    /// registered becomes the current one.
    pub fn set_stage(&mut self, config: SaleStageConfig) -> Result<()> {
        require!(
            config.start_time >= 0 && config.start_time < config.end_time,
            SaleError::InvalidStageWindow
        );

        match self
            .stages
            .binary_search_by_key(&config.index, |stage| stage.index)
        {
            Ok(position) => {
                require!(self.stages[position].minted == 0, SaleError::StageLocked);
                self.stages[position] = SaleStageConfig {
                    minted: 0,
                    ..config
                };
            }
            Err(position) => {
                require!(self.stages.len() < MAX_STAGES, SaleError::TooManyStages);
                if self.stages.is_empty() {
                    self.current_index = config.index;
                }
                self.stages.insert(
                    position,
                    SaleStageConfig {
                        minted: 0,
                        ..config
                    },
                );
            }
        }
        Ok(())
    }

    pub fn set_sale_config(&mut self, caller: &Pubkey, config: SaleStageConfig) -> Result<()> {
        self.ensure_authority(caller)?;
        self.set_stage(config)
    }

    /// Index the sale pointer resolves to at `now`, skipping every elapsed
    /// stage that has a successor. The last stage of a run of consecutive
    /// indices stays current even after its own window closed.
    pub fn effective_index(&self, now: i64) -> Option<u32> {
        let mut stage = self.stage(self.current_index)?;
        while stage.has_ended_at(now) {
            let Some(next) = stage.index.checked_add(1).and_then(|next| self.stage(next)) else {
                break;
            };
            stage = next;
        }
        Some(stage.index)
    }

    pub fn current_stage_at(&self, now: i64) -> Option<&SaleStageConfig> {
        self.effective_index(now).and_then(|index| self.stage(index))
    }

    pub fn current_config(&self, now: i64) -> Result<SaleStageConfig> {
        let stage = self
            .current_stage_at(now)
            .ok_or(SaleError::NotConfigured)?;
        Ok(*stage)
    }

    /// Moves `current_index` forward to the stage active at `now`.
    pub fn proceed_sale_stage_if_needed(&mut self, now: i64) -> Result<Option<StageAdvance>> {
        let to_index = self.effective_index(now).ok_or(SaleError::NotConfigured)?;
        if to_index == self.current_index {
            return Ok(None);
        }

        let advance = StageAdvance {
            from_index: self.current_index,
            to_index,
        };
        self.current_index = to_index;
        Ok(Some(advance))
    }

    pub fn set_current_index(&mut self, caller: &Pubkey, index: u32) -> Result<()> {
        self.ensure_authority(caller)?;
        require!(self.stage(index).is_some(), SaleError::NotConfigured);
        require!(index >= self.current_index, SaleError::StageRegression);
        self.current_index = index;
        Ok(())
    }

    pub fn record_sale(&mut self, index: u32, quantity: u64) -> Result<()> {
        let position = self
            .stages
            .binary_search_by_key(&index, |stage| stage.index)
            .map_err(|_| error!(SaleError::NotConfigured))?;
        let stage = &mut self.stages[position];
        stage.minted = stage
            .minted
            .checked_add(quantity)
            .ok_or(SaleError::MathOverflow)?;
        Ok(())
    }

    pub fn set_ticket_signer(&mut self, caller: &Pubkey, ticket_signer: [u8; 20]) -> Result<()> {
        self.ensure_authority(caller)?;
        self.ticket_signer = ticket_signer;
        Ok(())
    }

    pub fn set_not_revealed_uri(&mut self, caller: &Pubkey, uri: String) -> Result<()> {
        self.ensure_authority(caller)?;
        require!(uri.len() <= MAX_URI_LEN, SaleError::UriTooLong);
        self.not_revealed_uri = uri;
        Ok(())
    }

    pub fn reveal(&mut self, caller: &Pubkey, base_uri: String) -> Result<()> {
        self.ensure_authority(caller)?;
        require!(base_uri.len() <= MAX_URI_LEN, SaleError::UriTooLong);
        self.base_uri = base_uri;
        self.revealed = true;
        Ok(())
    }

    /// Metadata URI of unit `id`; existence of the unit is the ledger's concern.
    pub fn token_uri(&self, id: u64) -> String {
        if self.revealed {
            format!("{}{}{}", self.base_uri, id, TOKEN_URI_SUFFIX)
        } else {
            self.not_revealed_uri.clone()
        }
    }
}
