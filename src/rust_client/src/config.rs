//! Client configuration

use std::{env, fs, path::PathBuf, str::FromStr};

use serde::Deserialize;
use solana_program::pubkey::Pubkey;
use solana_sdk::{commitment_config::CommitmentConfig, signature::Keypair};

use crate::error::{ClientError, Result};

pub const URL_TESTNET: &str = "https://api.testnet.solana.com";
pub const URL_DEVNET: &str = "https://api.devnet.solana.com";
pub const URL_LOCAL: &str = "http://127.0.0.1:8899";

pub const ENV_RPC_URL: &str = "TOKEN_LOCK_RPC_URL";
pub const ENV_COMMITMENT: &str = "TOKEN_LOCK_COMMITMENT";
pub const ENV_PROGRAM_ID: &str = "TOKEN_LOCK_PROGRAM_ID";
pub const ENV_KEYPAIR: &str = "TOKEN_LOCK_KEYPAIR";

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub rpc_url: String,
    pub commitment: String,
    pub program_id: String,
    pub keypair_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            rpc_url: URL_LOCAL.to_string(),
            commitment: "confirmed".to_string(),
            program_id: token_lock::id().to_string(),
            keypair_path: default_keypair_path(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with the `TOKEN_LOCK_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = ClientConfig::default();
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses the JSON form of the config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ClientConfig =
            serde_json::from_str(json).map_err(|err| ClientError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rpc_url) = lookup(ENV_RPC_URL) {
            self.rpc_url = rpc_url;
        }
        if let Some(commitment) = lookup(ENV_COMMITMENT) {
            self.commitment = commitment;
        }
        if let Some(program_id) = lookup(ENV_PROGRAM_ID) {
            self.program_id = program_id;
        }
        if let Some(keypair_path) = lookup(ENV_KEYPAIR) {
            self.keypair_path = PathBuf::from(keypair_path);
        }
    }

    fn validate(&self) -> Result<()> {
        self.program_id()?;
        self.commitment()?;
        Ok(())
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .map_err(|err| ClientError::Config(format!("program id {}: {}", self.program_id, err)))
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.commitment)
            .map_err(|err| ClientError::Config(format!("commitment {}: {}", self.commitment, err)))
    }
}

fn default_keypair_path() -> PathBuf {
    let mut path = env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    path.extend([".config", "solana", "id.json"]);
    path
}

/// Reads a keypair in the solana CLI format, a JSON array of 64 bytes
pub fn load_keypair(path: &std::path::Path) -> Result<Keypair> {
    let json = fs::read_to_string(path)?;
    parse_keypair(&json)
}

pub fn parse_keypair(json: &str) -> Result<Keypair> {
    let keypair_secret: Vec<u8> =
        serde_json::from_str(json).map_err(|err| ClientError::Keypair(err.to_string()))?;

    Keypair::try_from(&keypair_secret[..]).map_err(|err| ClientError::Keypair(err.to_string()))
}
