//! Interface of the Token Lock program: a program that locks SPL tokens in a
//! per-mint vault until a unix timestamp
#![deny(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod instruction;
mod pack_utils;
pub mod pda;
pub mod state;

pub use pack_utils::DISCRIMINATOR_LEN;

solana_program::declare_id!("TokenLock1111111111111111111111111111111111");
