//! Error codes returned by the Token Lock program

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use solana_program::program_error::ProgramError;
use thiserror::Error;

/// Custom error codes, as carried in `ProgramError::Custom`
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum TokenLockError {
    /// No instruction matches the data's discriminator
    #[error("Fallback functions are not supported")]
    InstructionFallbackNotFound = 101,
    /// Instruction arguments are malformed
    #[error("The program could not deserialize the given instruction")]
    InstructionDidNotDeserialize = 102,
    /// Account data is shorter than a discriminator
    #[error("No 8 byte discriminator was found on the account")]
    AccountDiscriminatorNotFound = 3001,
    /// Account data belongs to another account type
    #[error("8 byte discriminator did not match what was expected")]
    AccountDiscriminatorMismatch = 3002,
    /// Account body is malformed
    #[error("Failed to deserialize the account")]
    AccountDidNotDeserialize = 3003,
    /// The unlock timestamp is not in the future
    #[error("Invalid unlock time - must be in the future")]
    InvalidUnlockTime = 6000,
    /// A zero amount was locked
    #[error("Invalid amount - must be greater than 0")]
    InvalidAmount = 6001,
    /// Unlock attempted before the unlock timestamp
    #[error("Lock period has not expired yet")]
    LockPeriodNotExpired = 6002,
    /// The record was already unlocked
    #[error("Tokens have already been unlocked")]
    AlreadyUnlocked = 6003,
    /// Vault total overflowed
    #[error("Arithmetic overflow")]
    Overflow = 6004,
    /// Vault total underflowed
    #[error("Arithmetic underflow")]
    Underflow = 6005,
}

impl TokenLockError {
    /// Maps a `Custom` error code back to its variant
    pub fn from_code(code: u32) -> Option<Self> {
        FromPrimitive::from_u32(code)
    }
}

impl From<TokenLockError> for ProgramError {
    fn from(e: TokenLockError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_program_error() {
        let err: ProgramError = TokenLockError::LockPeriodNotExpired.into();
        assert_eq!(err, ProgramError::Custom(6002));

        match err {
            ProgramError::Custom(code) => assert_eq!(
                TokenLockError::from_code(code),
                Some(TokenLockError::LockPeriodNotExpired)
            ),
            _ => unreachable!(),
        }
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(TokenLockError::from_code(0), None);
        assert_eq!(TokenLockError::from_code(6006), None);
        assert_eq!(
            TokenLockError::from_code(3002),
            Some(TokenLockError::AccountDiscriminatorMismatch)
        );
    }

    #[test]
    fn messages_match_program() {
        assert_eq!(
            TokenLockError::AlreadyUnlocked.to_string(),
            "Tokens have already been unlocked"
        );
    }
}
