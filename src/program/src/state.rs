//! Program state
#![deny(missing_docs)]

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    program_error::ProgramError,
    program_pack::{Pack, Sealed},
    pubkey::Pubkey,
};

use crate::{
    error::TokenLockError,
    pack_utils::{discriminator, split_discriminated, unpack_bool, DISCRIMINATOR_LEN},
};

/// Length of a serialized pubkey
pub const PUBKEY_LEN: usize = 32;
/// Length of a serialized token amount
pub const AMOUNT_LEN: usize = 8;
/// Length of a serialized unix timestamp
pub const TIMESTAMP_LEN: usize = 8;
/// Length of a serialized bump seed
pub const BUMP_LEN: usize = 1;
/// Length of a serialized bool
pub const FLAG_LEN: usize = 1;

/// Size of a Vault account, discriminator included
pub const VAULT_ACCOUNT_SIZE: usize =
    DISCRIMINATOR_LEN + PUBKEY_LEN + PUBKEY_LEN + BUMP_LEN + AMOUNT_LEN;

/// Size of a LockRecord account, discriminator included
pub const LOCK_RECORD_ACCOUNT_SIZE: usize = DISCRIMINATOR_LEN
    + PUBKEY_LEN
    + AMOUNT_LEN
    + TIMESTAMP_LEN
    + TIMESTAMP_LEN
    + PUBKEY_LEN
    + FLAG_LEN;

/// Offset of `LockRecord::vault` within the account data
pub const LOCK_RECORD_VAULT_OFFSET: usize =
    DISCRIMINATOR_LEN + PUBKEY_LEN + AMOUNT_LEN + TIMESTAMP_LEN + TIMESTAMP_LEN;

/// The escrow of a single token mint
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Vault {
    // 32
    /// Creator of the vault
    pub authority: Pubkey,
    // 32
    /// Mint accepted by the vault
    pub token_mint: Pubkey,
    // 1
    /// Bump of the vault address
    pub bump: u8,
    // 8
    /// Amount currently locked across all records
    pub total_locked: u64,
}

impl Vault {
    /// Account discriminator
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        discriminator("account", "Vault")
    }

    /// Decodes account data as fetched over RPC, ignoring trailing bytes
    pub fn from_account_data(data: &[u8]) -> Result<Self, ProgramError> {
        Self::unpack_from_slice(data)
    }
}

impl Sealed for Vault {}
impl Pack for Vault {
    const LEN: usize = VAULT_ACCOUNT_SIZE;

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, VAULT_ACCOUNT_SIZE];

        let (disc_dst, authority_dst, token_mint_dst, bump_dst, total_locked_dst) = mut_array_refs![
            dst,
            DISCRIMINATOR_LEN,
            PUBKEY_LEN,
            PUBKEY_LEN,
            BUMP_LEN,
            AMOUNT_LEN
        ];

        *disc_dst = Self::discriminator();
        authority_dst.copy_from_slice(self.authority.as_ref());
        token_mint_dst.copy_from_slice(self.token_mint.as_ref());
        bump_dst[0] = self.bump;
        *total_locked_dst = self.total_locked.to_le_bytes();
    }

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let body = split_discriminated(src, &Self::discriminator())?;
        if body.len() < VAULT_ACCOUNT_SIZE - DISCRIMINATOR_LEN {
            return Err(TokenLockError::AccountDidNotDeserialize.into());
        }
        let src = array_ref![src, 0, VAULT_ACCOUNT_SIZE];

        let (_, authority_src, token_mint_src, bump_src, total_locked_src) = array_refs![
            src,
            DISCRIMINATOR_LEN,
            PUBKEY_LEN,
            PUBKEY_LEN,
            BUMP_LEN,
            AMOUNT_LEN
        ];

        Ok(Vault {
            authority: Pubkey::new_from_array(*authority_src),
            token_mint: Pubkey::new_from_array(*token_mint_src),
            bump: bump_src[0],
            total_locked: u64::from_le_bytes(*total_locked_src),
        })
    }
}

/// A single time-locked deposit of one owner into one vault
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct LockRecord {
    // 32
    /// Depositor
    pub owner: Pubkey,
    // 8
    /// Locked amount in the mint's smallest unit
    pub amount: u64,
    // 8
    /// Time after which the tokens may be withdrawn
    pub unlock_timestamp: UnixTimestamp,
    // 8
    /// Time the lock was created
    pub locked_at: UnixTimestamp,
    // 32
    /// Vault holding the tokens
    pub vault: Pubkey,
    // 1
    /// Set once the tokens were withdrawn
    pub is_unlocked: bool,
}

impl LockRecord {
    /// Account discriminator
    pub fn discriminator() -> [u8; DISCRIMINATOR_LEN] {
        discriminator("account", "LockRecord")
    }

    /// Decodes account data as fetched over RPC, ignoring trailing bytes
    pub fn from_account_data(data: &[u8]) -> Result<Self, ProgramError> {
        Self::unpack_from_slice(data)
    }

    /// Seconds left until `unlock_timestamp`, zero once it has passed
    pub fn time_remaining(&self, now: UnixTimestamp) -> u64 {
        self.unlock_timestamp.saturating_sub(now).max(0) as u64
    }

    /// Whether an unlock submitted at `now` would be accepted
    pub fn can_unlock(&self, now: UnixTimestamp) -> bool {
        !self.is_unlocked && now >= self.unlock_timestamp
    }
}

impl Sealed for LockRecord {}
impl Pack for LockRecord {
    const LEN: usize = LOCK_RECORD_ACCOUNT_SIZE;

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, LOCK_RECORD_ACCOUNT_SIZE];

        let (
            disc_dst,
            owner_dst,
            amount_dst,
            unlock_timestamp_dst,
            locked_at_dst,
            vault_dst,
            is_unlocked_dst,
        ) = mut_array_refs![
            dst,
            DISCRIMINATOR_LEN,
            PUBKEY_LEN,
            AMOUNT_LEN,
            TIMESTAMP_LEN,
            TIMESTAMP_LEN,
            PUBKEY_LEN,
            FLAG_LEN
        ];

        *disc_dst = Self::discriminator();
        owner_dst.copy_from_slice(self.owner.as_ref());
        *amount_dst = self.amount.to_le_bytes();
        *unlock_timestamp_dst = self.unlock_timestamp.to_le_bytes();
        *locked_at_dst = self.locked_at.to_le_bytes();
        vault_dst.copy_from_slice(self.vault.as_ref());
        is_unlocked_dst[0] = self.is_unlocked as u8;
    }

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let body = split_discriminated(src, &Self::discriminator())?;
        if body.len() < LOCK_RECORD_ACCOUNT_SIZE - DISCRIMINATOR_LEN {
            return Err(TokenLockError::AccountDidNotDeserialize.into());
        }
        let src = array_ref![src, 0, LOCK_RECORD_ACCOUNT_SIZE];

        let (
            _,
            owner_src,
            amount_src,
            unlock_timestamp_src,
            locked_at_src,
            vault_src,
            is_unlocked_src,
        ) = array_refs![
            src,
            DISCRIMINATOR_LEN,
            PUBKEY_LEN,
            AMOUNT_LEN,
            TIMESTAMP_LEN,
            TIMESTAMP_LEN,
            PUBKEY_LEN,
            FLAG_LEN
        ];

        Ok(LockRecord {
            owner: Pubkey::new_from_array(*owner_src),
            amount: u64::from_le_bytes(*amount_src),
            unlock_timestamp: i64::from_le_bytes(*unlock_timestamp_src),
            locked_at: i64::from_le_bytes(*locked_at_src),
            vault: Pubkey::new_from_array(*vault_src),
            is_unlocked: unpack_bool(is_unlocked_src[0])?,
        })
    }
}

/// Return value of the `GetLockInfo` view instruction
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct LockInfo {
    /// Depositor
    pub owner: Pubkey,
    /// Locked amount
    pub amount: u64,
    /// Time after which the tokens may be withdrawn
    pub unlock_timestamp: UnixTimestamp,
    /// Time the lock was created
    pub locked_at: UnixTimestamp,
    /// Set once the tokens were withdrawn
    pub is_unlocked: bool,
    /// Seconds left, by the program's clock
    pub time_remaining: u64,
    /// Whether the program would accept an unlock now
    pub can_unlock: bool,
}

impl LockInfo {
    /// The view the program computes for `record` at `now`
    pub fn from_record(record: &LockRecord, now: UnixTimestamp) -> Self {
        LockInfo {
            owner: record.owner,
            amount: record.amount,
            unlock_timestamp: record.unlock_timestamp,
            locked_at: record.locked_at,
            is_unlocked: record.is_unlocked,
            time_remaining: record.time_remaining(now),
            can_unlock: record.can_unlock(now),
        }
    }
}
