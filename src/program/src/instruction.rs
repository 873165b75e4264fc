//! The definitions for Token Lock instructions

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};

use crate::{
    error::TokenLockError,
    pack_utils::{discriminator, DISCRIMINATOR_LEN},
};

/// InitializeVault instruction data
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct InitializeVault {
    /// Bump of the vault address
    pub vault_bump: u8,
}

/// LockTokens instruction data
#[derive(Clone, Debug, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct LockTokens {
    /// The number of tokens to lock, in the mint's smallest unit
    pub amount: u64,
    /// The time the tokens should be locked until
    pub unlock_timestamp: UnixTimestamp,
}

/// A Token Lock instruction
#[derive(Clone, Debug, PartialEq)]
pub enum TokenLockInstruction {
    /// Create the vault of a token mint
    /// Requires that the vault does not exist.
    ///
    /// # Account references
    ///   0. `[WRITE]` Vault account, derived from `["vault", mint]`
    ///   1. `[]` Token mint
    ///   2. `[SIGNER, WRITE]` Authority, pays for the vault
    ///   3. `[]` System program account
    InitializeVault(InitializeVault),

    /// Lock tokens of the user into the vault
    /// Requires that the unlock timestamp is in the future and the amount is non-zero.
    /// Creates the lock record of the user; fails if one already exists.
    ///
    /// # Account references
    ///   0. `[WRITE]` Vault account
    ///   1. `[WRITE]` Lock record account, derived from `["lock", vault, user]`
    ///   2. `[WRITE]` User token account
    ///   3. `[WRITE]` Vault token account
    ///   4. `[SIGNER, WRITE]` User
    ///   5. `[]` Token program
    ///   6. `[]` System program account
    LockTokens(LockTokens),

    /// Withdraw the locked tokens back to the user
    /// Requires that the record is not unlocked and the unlock timestamp has passed.
    ///
    /// Transitions:
    /// is_unlocked: false -> true
    ///
    /// # Account references
    ///   0. `[WRITE]` Vault account
    ///   1. `[WRITE]` Lock record account
    ///   2. `[WRITE]` User token account
    ///   3. `[WRITE]` Vault token account
    ///   4. `[SIGNER, WRITE]` User
    ///   5. `[]` Token program
    UnlockTokens,

    /// Return a `LockInfo` for a lock record through the program return data
    ///
    /// # Account references
    ///   0. `[]` Lock record account
    GetLockInfo,
}

impl TokenLockInstruction {
    /// Method name the discriminator is computed from
    pub fn name(&self) -> &'static str {
        match self {
            TokenLockInstruction::InitializeVault(_) => "initialize_vault",
            TokenLockInstruction::LockTokens(_) => "lock_tokens",
            TokenLockInstruction::UnlockTokens => "unlock_tokens",
            TokenLockInstruction::GetLockInfo => "get_lock_info",
        }
    }

    /// `sha256("global:<name>")[..8]`
    pub fn discriminator(&self) -> [u8; DISCRIMINATOR_LEN] {
        discriminator("global", self.name())
    }

    /// Serializes into instruction data
    pub fn pack(&self) -> Vec<u8> {
        let mut data = self.discriminator().to_vec();
        match self {
            TokenLockInstruction::InitializeVault(InitializeVault { vault_bump }) => {
                data.push(*vault_bump);
            }
            TokenLockInstruction::LockTokens(LockTokens {
                amount,
                unlock_timestamp,
            }) => {
                data.extend_from_slice(&amount.to_le_bytes());
                data.extend_from_slice(&unlock_timestamp.to_le_bytes());
            }
            TokenLockInstruction::UnlockTokens | TokenLockInstruction::GetLockInfo => {}
        }
        data
    }

    /// Parses instruction data
    pub fn unpack(data: &[u8]) -> Result<Self, ProgramError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(TokenLockError::InstructionFallbackNotFound.into());
        }
        let (disc, mut args) = data.split_at(DISCRIMINATOR_LEN);

        let instruction = if disc == discriminator("global", "initialize_vault") {
            TokenLockInstruction::InitializeVault(deserialize_args(&mut args)?)
        } else if disc == discriminator("global", "lock_tokens") {
            TokenLockInstruction::LockTokens(deserialize_args(&mut args)?)
        } else if disc == discriminator("global", "unlock_tokens") {
            TokenLockInstruction::UnlockTokens
        } else if disc == discriminator("global", "get_lock_info") {
            TokenLockInstruction::GetLockInfo
        } else {
            return Err(TokenLockError::InstructionFallbackNotFound.into());
        };

        Ok(instruction)
    }
}

fn deserialize_args<T: BorshDeserialize>(args: &mut &[u8]) -> Result<T, ProgramError> {
    T::deserialize(args).map_err(|_| TokenLockError::InstructionDidNotDeserialize.into())
}

/// Builds an `InitializeVault` instruction
pub fn initialize_vault(
    program_id: &Pubkey,
    vault: &Pubkey,
    token_mint: &Pubkey,
    authority: &Pubkey,
    vault_bump: u8,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TokenLockInstruction::InitializeVault(InitializeVault { vault_bump }).pack(),
        vec![
            AccountMeta::new(*vault, false),
            AccountMeta::new_readonly(*token_mint, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

/// Builds a `LockTokens` instruction
#[allow(clippy::too_many_arguments)]
pub fn lock_tokens(
    program_id: &Pubkey,
    vault: &Pubkey,
    lock_record: &Pubkey,
    user_token_account: &Pubkey,
    vault_token_account: &Pubkey,
    user: &Pubkey,
    token_program_id: &Pubkey,
    amount: u64,
    unlock_timestamp: UnixTimestamp,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TokenLockInstruction::LockTokens(LockTokens {
            amount,
            unlock_timestamp,
        })
        .pack(),
        vec![
            AccountMeta::new(*vault, false),
            AccountMeta::new(*lock_record, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(*vault_token_account, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(*token_program_id, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

/// Builds an `UnlockTokens` instruction
pub fn unlock_tokens(
    program_id: &Pubkey,
    vault: &Pubkey,
    lock_record: &Pubkey,
    user_token_account: &Pubkey,
    vault_token_account: &Pubkey,
    user: &Pubkey,
    token_program_id: &Pubkey,
) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TokenLockInstruction::UnlockTokens.pack(),
        vec![
            AccountMeta::new(*vault, false),
            AccountMeta::new(*lock_record, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(*vault_token_account, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(*token_program_id, false),
        ],
    )
}

/// Builds a `GetLockInfo` instruction
pub fn get_lock_info(program_id: &Pubkey, lock_record: &Pubkey) -> Instruction {
    Instruction::new_with_bytes(
        *program_id,
        &TokenLockInstruction::GetLockInfo.pack(),
        vec![AccountMeta::new_readonly(*lock_record, false)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_tokens_data_layout() {
        let data = TokenLockInstruction::LockTokens(LockTokens {
            amount: 5,
            unlock_timestamp: -1,
        })
        .pack();

        assert_eq!(data.len(), DISCRIMINATOR_LEN + 8 + 8);
        assert_eq!(&data[..8], &discriminator("global", "lock_tokens"));
        assert_eq!(&data[8..16], &5u64.to_le_bytes());
        assert_eq!(&data[16..], &(-1i64).to_le_bytes());

        let args = LockTokens {
            amount: 5,
            unlock_timestamp: -1,
        };
        assert_eq!(&data[8..], &borsh::to_vec(&args).unwrap()[..]);
    }

    #[test]
    fn unpack_recovers_each_variant() {
        let variants = [
            TokenLockInstruction::InitializeVault(InitializeVault { vault_bump: 253 }),
            TokenLockInstruction::LockTokens(LockTokens {
                amount: u64::MAX,
                unlock_timestamp: 1_700_000_000,
            }),
            TokenLockInstruction::UnlockTokens,
            TokenLockInstruction::GetLockInfo,
        ];
        for ix in variants {
            assert_eq!(TokenLockInstruction::unpack(&ix.pack()), Ok(ix));
        }
    }

    #[test]
    fn unpack_rejects_unknown_and_truncated() {
        let fallback: ProgramError = TokenLockError::InstructionFallbackNotFound.into();
        assert_eq!(TokenLockInstruction::unpack(&[0; 4]), Err(fallback.clone()));
        assert_eq!(TokenLockInstruction::unpack(&[0; 12]), Err(fallback));

        let mut data = discriminator("global", "lock_tokens").to_vec();
        data.extend_from_slice(&[1, 2, 3]);
        let malformed: ProgramError = TokenLockError::InstructionDidNotDeserialize.into();
        assert_eq!(TokenLockInstruction::unpack(&data), Err(malformed));
    }

    #[test]
    fn lock_tokens_account_order() {
        let keys: Vec<Pubkey> = (0..6).map(|_| Pubkey::new_unique()).collect();
        let program_id = crate::id();
        let ix = lock_tokens(
            &program_id, &keys[0], &keys[1], &keys[2], &keys[3], &keys[4], &keys[5], 10, 20,
        );

        assert_eq!(ix.program_id, program_id);
        assert_eq!(ix.accounts.len(), 7);
        for (meta, key) in ix.accounts.iter().zip(&keys) {
            assert_eq!(&meta.pubkey, key);
        }
        assert_eq!(ix.accounts[6].pubkey, system_program::id());

        let signers: Vec<bool> = ix.accounts.iter().map(|meta| meta.is_signer).collect();
        assert_eq!(signers, [false, false, false, false, true, false, false]);
        assert!(!ix.accounts[5].is_writable);
    }

    #[test]
    fn unlock_and_view_accounts() {
        let keys: Vec<Pubkey> = (0..6).map(|_| Pubkey::new_unique()).collect();
        let program_id = crate::id();

        let ix = unlock_tokens(
            &program_id, &keys[0], &keys[1], &keys[2], &keys[3], &keys[4], &keys[5],
        );
        assert_eq!(ix.accounts.len(), 6);
        assert!(ix.accounts[4].is_signer && ix.accounts[4].is_writable);
        assert_eq!(ix.data, TokenLockInstruction::UnlockTokens.pack());

        let view = get_lock_info(&program_id, &keys[1]);
        assert_eq!(view.accounts, vec![AccountMeta::new_readonly(keys[1], false)]);
        assert_eq!(view.data.len(), DISCRIMINATOR_LEN);
    }

    #[test]
    fn initialize_vault_authority_signs() {
        let vault = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let authority = Pubkey::new_unique();
        let ix = initialize_vault(&crate::id(), &vault, &mint, &authority, 7);

        assert_eq!(ix.accounts[2], AccountMeta::new(authority, true));
        assert_eq!(ix.accounts[1], AccountMeta::new_readonly(mint, false));
        assert_eq!(ix.data[8], 7);
    }
}
