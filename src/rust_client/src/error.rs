use solana_client::client_error::ClientError as RpcClientError;
use solana_program::program_error::ProgramError;
use thiserror::Error;
use token_lock::error::TokenLockError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Rpc(#[from] RpcClientError),
    #[error("{}", program_error_message(.0))]
    Program(#[from] ProgramError),
    #[error("No lock record found for this user")]
    LockRecordNotFound,
    #[error("Vault does not exist for this token")]
    VaultNotFound,
    #[error("Simulation failed: {0}")]
    Simulation(String),
    #[error("Program returned no data")]
    MissingReturnData,
    #[error("Invalid return data: {0}")]
    ReturnData(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Invalid keypair: {0}")]
    Keypair(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Token Lock codes read as their message, anything else as the program error
fn program_error_message(err: &ProgramError) -> String {
    match err {
        ProgramError::Custom(code) => match TokenLockError::from_code(*code) {
            Some(token_lock_error) => token_lock_error.to_string(),
            None => err.to_string(),
        },
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_codes_display_their_message() {
        let mismatch = ClientError::from(ProgramError::from(
            TokenLockError::AccountDiscriminatorMismatch,
        ));
        assert_eq!(
            mismatch.to_string(),
            "8 byte discriminator did not match what was expected"
        );

        let short = ClientError::from(ProgramError::from(
            TokenLockError::AccountDiscriminatorNotFound,
        ));
        assert_eq!(
            short.to_string(),
            "No 8 byte discriminator was found on the account"
        );
    }

    #[test]
    fn foreign_program_errors_keep_their_text() {
        let unknown = ClientError::from(ProgramError::Custom(42));
        assert_eq!(unknown.to_string(), ProgramError::Custom(42).to_string());

        let builtin = ClientError::from(ProgramError::InvalidAccountData);
        assert_eq!(
            builtin.to_string(),
            ProgramError::InvalidAccountData.to_string()
        );
    }
}
