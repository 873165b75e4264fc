use solana_program::{hash::hash, program_error::ProgramError};

use crate::error::TokenLockError;

/// Length of the prefix that tags accounts, instructions and events
pub const DISCRIMINATOR_LEN: usize = 8;

/// `sha256("<namespace>:<name>")[..8]`
pub fn discriminator(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let preimage = format!("{}:{}", namespace, name);
    let mut disc = [0u8; DISCRIMINATOR_LEN];
    disc.copy_from_slice(&hash(preimage.as_bytes()).to_bytes()[..DISCRIMINATOR_LEN]);
    disc
}

/// Splits account data into its discriminator and body, checking the
/// discriminator against `expected`
pub fn split_discriminated<'a>(
    data: &'a [u8],
    expected: &[u8; DISCRIMINATOR_LEN],
) -> Result<&'a [u8], ProgramError> {
    if data.len() < DISCRIMINATOR_LEN {
        return Err(TokenLockError::AccountDiscriminatorNotFound.into());
    }
    let (disc, body) = data.split_at(DISCRIMINATOR_LEN);
    if disc != expected {
        return Err(TokenLockError::AccountDiscriminatorMismatch.into());
    }
    Ok(body)
}

pub fn unpack_bool(src: u8) -> Result<bool, ProgramError> {
    match src {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(TokenLockError::AccountDidNotDeserialize.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminator_depends_on_namespace() {
        assert_ne!(
            discriminator("account", "Vault"),
            discriminator("global", "Vault")
        );
        assert_eq!(
            discriminator("account", "LockRecord"),
            discriminator("account", "LockRecord")
        );
    }

    #[test]
    fn split_rejects_short_and_foreign_data() {
        let disc = discriminator("account", "Vault");

        let short: ProgramError = TokenLockError::AccountDiscriminatorNotFound.into();
        assert_eq!(split_discriminated(&[1, 2, 3], &disc), Err(short));

        let foreign = [0u8; 16];
        let mismatch: ProgramError = TokenLockError::AccountDiscriminatorMismatch.into();
        assert_eq!(split_discriminated(&foreign, &disc), Err(mismatch));

        let mut data = disc.to_vec();
        data.extend_from_slice(&[7, 7]);
        assert_eq!(split_discriminated(&data, &disc), Ok(&[7u8, 7][..]));
    }

    #[test]
    fn bool_bytes() {
        assert_eq!(unpack_bool(0), Ok(false));
        assert_eq!(unpack_bool(1), Ok(true));
        assert!(unpack_bool(2).is_err());
    }
}
