//! Deterministic addresses of the Token Lock accounts

use solana_program::pubkey::Pubkey;

/// Seed prefix of vault accounts
pub const VAULT_SEED: &[u8] = b"vault";
/// Seed prefix of lock record accounts
pub const LOCK_SEED: &[u8] = b"lock";

/// Vault address and bump for a token mint
pub fn find_vault_address(program_id: &Pubkey, token_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, token_mint.as_ref()], program_id)
}

/// Lock record address and bump for an owner in a vault
pub fn find_lock_record_address(
    program_id: &Pubkey,
    vault: &Pubkey,
    owner: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[LOCK_SEED, vault.as_ref(), owner.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let program_id = crate::id();
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let first = find_vault_address(&program_id, &mint);
        assert_eq!(first, find_vault_address(&program_id, &mint));

        let record = find_lock_record_address(&program_id, &first.0, &owner);
        assert_eq!(record, find_lock_record_address(&program_id, &first.0, &owner));
    }

    #[test]
    fn seeds_separate_domains() {
        let program_id = crate::id();
        let mint = Pubkey::new_unique();
        let (vault, bump) = find_vault_address(&program_id, &mint);

        let expected =
            Pubkey::create_program_address(&[b"vault", mint.as_ref(), &[bump]], &program_id)
                .unwrap();
        assert_eq!(vault, expected);

        let owner = Pubkey::new_unique();
        let (record, _) = find_lock_record_address(&program_id, &vault, &owner);
        let (other, _) = find_lock_record_address(&program_id, &vault, &Pubkey::new_unique());
        assert_ne!(record, vault);
        assert_ne!(record, other);
    }

    #[test]
    fn vault_depends_on_program() {
        let mint = Pubkey::new_unique();
        let a = find_vault_address(&crate::id(), &mint).0;
        let b = find_vault_address(&Pubkey::new_unique(), &mint).0;
        assert_ne!(a, b);
    }
}
