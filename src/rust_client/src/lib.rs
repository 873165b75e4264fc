//! Async client for the Token Lock program
//!
//! Every operation returns an [`Outcome`]: the payload on success, or the
//! message of whatever failed (transport, program rejection, missing account).

pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod outcome;
mod transaction;

pub use client::TokenLockClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use format::{
    format_time_remaining, format_token_amount, parse_token_amount, DEFAULT_TOKEN_DECIMALS,
};
pub use outcome::Outcome;
