//! Events emitted by the Token Lock program
//!
//! Each event is logged as `Program data: <base64>` where the payload is an
//! 8 byte discriminator followed by the borsh encoded fields.

use base64::{engine::general_purpose::STANDARD, Engine};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};

use crate::pack_utils::{discriminator, DISCRIMINATOR_LEN};

const PROGRAM_DATA_PREFIX: &str = "Program data: ";

/// Emitted when tokens are locked
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct TokensLocked {
    /// Depositor
    pub user: Pubkey,
    /// Locked amount
    pub amount: u64,
    /// Time the tokens are locked until
    pub unlock_timestamp: UnixTimestamp,
    /// Vault receiving the tokens
    pub vault: Pubkey,
}

/// Emitted when tokens are withdrawn
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct TokensUnlocked {
    /// Depositor
    pub user: Pubkey,
    /// Withdrawn amount
    pub amount: u64,
    /// Vault releasing the tokens
    pub vault: Pubkey,
}

/// Any Token Lock event
#[derive(Clone, Debug, PartialEq)]
pub enum TokenLockEvent {
    /// See [`TokensLocked`]
    TokensLocked(TokensLocked),
    /// See [`TokensUnlocked`]
    TokensUnlocked(TokensUnlocked),
}

impl TokenLockEvent {
    /// Decodes a raw event payload; `None` if it is not a Token Lock event
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < DISCRIMINATOR_LEN {
            return None;
        }
        let (disc, mut body) = data.split_at(DISCRIMINATOR_LEN);

        if disc == discriminator("event", "TokensLocked") {
            TokensLocked::deserialize(&mut body)
                .ok()
                .map(TokenLockEvent::TokensLocked)
        } else if disc == discriminator("event", "TokensUnlocked") {
            TokensUnlocked::deserialize(&mut body)
                .ok()
                .map(TokenLockEvent::TokensUnlocked)
        } else {
            None
        }
    }

    /// Encodes the event the way the program emits it
    pub fn encode(&self) -> Vec<u8> {
        let (name, body) = match self {
            TokenLockEvent::TokensLocked(event) => ("TokensLocked", borsh::to_vec(event)),
            TokenLockEvent::TokensUnlocked(event) => ("TokensUnlocked", borsh::to_vec(event)),
        };
        let mut data = discriminator("event", name).to_vec();
        data.extend(body.unwrap_or_default());
        data
    }
}

/// Collects the Token Lock events found in transaction logs
pub fn parse_logs(logs: &[String]) -> Vec<TokenLockEvent> {
    logs.iter()
        .filter_map(|line| line.strip_prefix(PROGRAM_DATA_PREFIX))
        .filter_map(|payload| STANDARD.decode(payload.trim()).ok())
        .filter_map(|data| TokenLockEvent::decode(&data))
        .collect()
}
