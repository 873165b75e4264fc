//! The Token Lock client

use base64::{engine::general_purpose::STANDARD, Engine};
use borsh::BorshDeserialize;
use chrono::Utc;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSimulateTransactionConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_program::{clock::UnixTimestamp, instruction::Instruction, pubkey::Pubkey};
use solana_sdk::{
    account::Account,
    signature::Keypair,
    signer::Signer,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account,
};
use token_lock::{
    instruction,
    pda::{find_lock_record_address, find_vault_address},
    state::{LockInfo, LockRecord, Vault, LOCK_RECORD_VAULT_OFFSET},
};

use crate::{
    config::{load_keypair, ClientConfig},
    error::{ClientError, Result},
    model::{
        to_datetime, Addresses, LockInfoView, LockRecordEntry, LockRecords, TokensLockedReceipt,
        TokensUnlockedReceipt, VaultInfo, VaultInitialized,
    },
    outcome::Outcome,
    transaction::send_instructions,
};

/// Talks to the Token Lock program on behalf of a single signer.
///
/// The client keeps no state besides its connection: every address is
/// derived again on each call and every countdown is evaluated against the
/// wall clock at the time of the call.
pub struct TokenLockClient<S> {
    rpc_client: RpcClient,
    payer: S,
    program_id: Pubkey,
}

impl TokenLockClient<Keypair> {
    /// Connects with the RPC endpoint, commitment, program and keypair of `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let payer = load_keypair(&config.keypair_path)?;
        let rpc_client = RpcClient::new_with_commitment(config.rpc_url.clone(), config.commitment()?);
        Ok(Self::with_program_id(rpc_client, payer, config.program_id()?))
    }
}

impl<S: Signer> TokenLockClient<S> {
    pub fn new(rpc_client: RpcClient, payer: S) -> Self {
        Self::with_program_id(rpc_client, payer, token_lock::id())
    }

    pub fn with_program_id(rpc_client: RpcClient, payer: S, program_id: Pubkey) -> Self {
        TokenLockClient {
            rpc_client,
            payer,
            program_id,
        }
    }

    pub fn rpc_client(&self) -> &RpcClient {
        &self.rpc_client
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn payer(&self) -> Pubkey {
        self.payer.pubkey()
    }

    pub fn vault_address(&self, token_mint: &Pubkey) -> (Pubkey, u8) {
        find_vault_address(&self.program_id, token_mint)
    }

    pub fn lock_record_address(&self, vault: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
        find_lock_record_address(&self.program_id, vault, owner)
    }

    /// Both addresses of `owner`'s lock for `token_mint`; owner defaults to the payer
    pub fn addresses(&self, token_mint: &Pubkey, owner: Option<&Pubkey>) -> Addresses {
        let owner = owner.copied().unwrap_or_else(|| self.payer());
        let (vault, vault_bump) = self.vault_address(token_mint);
        let (lock_record, lock_record_bump) = self.lock_record_address(&vault, &owner);
        Addresses {
            vault,
            vault_bump,
            lock_record,
            lock_record_bump,
        }
    }

    /// Creates the vault of `token_mint` with the payer as authority
    pub async fn initialize_vault(&self, token_mint: &Pubkey) -> Outcome<VaultInitialized> {
        settle("initializing vault", self.try_initialize_vault(token_mint).await)
    }

    /// Locks `amount` tokens for `lock_duration_seconds` from now.
    ///
    /// The vault token account is created in the same transaction when it
    /// does not exist yet. Bounds on the amount and duration are left to the
    /// program.
    pub async fn lock_tokens(
        &self,
        token_mint: &Pubkey,
        amount: u64,
        lock_duration_seconds: u64,
    ) -> Outcome<TokensLockedReceipt> {
        settle(
            "locking tokens",
            self.try_lock_tokens(token_mint, amount, lock_duration_seconds)
                .await,
        )
    }

    /// Withdraws the payer's locked tokens; the program decides whether the
    /// lock has expired
    pub async fn unlock_tokens(&self, token_mint: &Pubkey) -> Outcome<TokensUnlockedReceipt> {
        settle("unlocking tokens", self.try_unlock_tokens(token_mint).await)
    }

    /// Fetches the lock record of `owner` (the payer by default)
    pub async fn get_lock_info(
        &self,
        token_mint: &Pubkey,
        owner: Option<&Pubkey>,
    ) -> Outcome<LockInfoView> {
        settle("getting lock info", self.try_get_lock_info(token_mint, owner).await)
    }

    /// Asks the program itself for the lock info by simulating `GetLockInfo`
    pub async fn view_lock_info(
        &self,
        token_mint: &Pubkey,
        owner: Option<&Pubkey>,
    ) -> Outcome<LockInfoView> {
        settle("viewing lock info", self.try_view_lock_info(token_mint, owner).await)
    }

    /// Every lock record of the vault of `token_mint`
    pub async fn get_all_lock_records(&self, token_mint: &Pubkey) -> Outcome<LockRecords> {
        settle(
            "getting all lock records",
            self.try_get_all_lock_records(token_mint).await,
        )
    }

    pub async fn get_vault_info(&self, token_mint: &Pubkey) -> Outcome<VaultInfo> {
        settle("getting vault info", self.try_get_vault_info(token_mint).await)
    }

    /// `false` both when the vault is missing and when the lookup fails
    pub async fn vault_exists(&self, token_mint: &Pubkey) -> bool {
        let (vault, _) = self.vault_address(token_mint);
        match self.fetch_account(&vault).await {
            Ok(account) => account.is_some(),
            Err(err) => {
                log::error!("Error checking vault existence: {}", err);
                false
            }
        }
    }

    async fn try_initialize_vault(&self, token_mint: &Pubkey) -> Result<VaultInitialized> {
        let (vault, vault_bump) = self.vault_address(token_mint);
        log::debug!("Initializing vault {} for mint {}", vault, token_mint);

        let ix = instruction::initialize_vault(
            &self.program_id,
            &vault,
            token_mint,
            &self.payer(),
            vault_bump,
        );
        let signature = send_instructions(&self.rpc_client, &[ix], &self.payer).await?;

        Ok(VaultInitialized { signature, vault })
    }

    async fn try_lock_tokens(
        &self,
        token_mint: &Pubkey,
        amount: u64,
        lock_duration_seconds: u64,
    ) -> Result<TokensLockedReceipt> {
        let user = self.payer();
        let (vault, _) = self.vault_address(token_mint);
        let (lock_record, _) = self.lock_record_address(&vault, &user);

        let unlock_timestamp = unlock_timestamp_after(Utc::now().timestamp(), lock_duration_seconds);

        let vault_token_account = get_associated_token_address(&vault, token_mint);
        let vault_token_account_exists =
            self.fetch_account(&vault_token_account).await?.is_some();
        if !vault_token_account_exists {
            log::debug!("Creating vault token account {}", vault_token_account);
        }
        let instructions = lock_instructions(
            &self.program_id,
            token_mint,
            &user,
            amount,
            unlock_timestamp,
            vault_token_account_exists,
        );

        log::debug!(
            "Locking {} tokens of mint {} until {} in record {}",
            amount,
            token_mint,
            unlock_timestamp,
            lock_record
        );
        let signature = send_instructions(&self.rpc_client, &instructions, &self.payer).await?;

        Ok(TokensLockedReceipt {
            signature,
            lock_record,
            unlock_timestamp: to_datetime(unlock_timestamp),
        })
    }

    async fn try_unlock_tokens(&self, token_mint: &Pubkey) -> Result<TokensUnlockedReceipt> {
        let user = self.payer();
        let (vault, _) = self.vault_address(token_mint);
        let (lock_record, _) = self.lock_record_address(&vault, &user);

        let ix = instruction::unlock_tokens(
            &self.program_id,
            &vault,
            &lock_record,
            &get_associated_token_address(&user, token_mint),
            &get_associated_token_address(&vault, token_mint),
            &user,
            &spl_token::id(),
        );
        let signature = send_instructions(&self.rpc_client, &[ix], &self.payer).await?;

        Ok(TokensUnlockedReceipt { signature })
    }

    async fn try_get_lock_info(
        &self,
        token_mint: &Pubkey,
        owner: Option<&Pubkey>,
    ) -> Result<LockInfoView> {
        let Addresses { lock_record, .. } = self.addresses(token_mint, owner);

        let account = self
            .fetch_account(&lock_record)
            .await?
            .ok_or(ClientError::LockRecordNotFound)?;
        let record = LockRecord::from_account_data(&account.data)?;

        Ok(LockInfoView::from_record(&record, Utc::now().timestamp()))
    }

    async fn try_view_lock_info(
        &self,
        token_mint: &Pubkey,
        owner: Option<&Pubkey>,
    ) -> Result<LockInfoView> {
        let Addresses { lock_record, .. } = self.addresses(token_mint, owner);

        let ix = instruction::get_lock_info(&self.program_id, &lock_record);
        let transaction = Transaction::new_with_payer(&[ix], Some(&self.payer()));
        let config = RpcSimulateTransactionConfig {
            sig_verify: false,
            replace_recent_blockhash: true,
            commitment: Some(self.rpc_client.commitment()),
            ..RpcSimulateTransactionConfig::default()
        };

        let simulation = self
            .rpc_client
            .simulate_transaction_with_config(&transaction, config)
            .await?
            .value;
        if let Some(err) = simulation.err {
            return Err(ClientError::Simulation(format!("{:?}", err)));
        }

        let return_data = simulation
            .return_data
            .ok_or(ClientError::MissingReturnData)?;
        if return_data.program_id != self.program_id.to_string() {
            return Err(ClientError::ReturnData(format!(
                "returned by {}",
                return_data.program_id
            )));
        }
        let info = decode_lock_info(&return_data.data.0)?;

        Ok(LockInfoView::from_program(&info))
    }

    async fn try_get_all_lock_records(&self, token_mint: &Pubkey) -> Result<LockRecords> {
        let (vault, _) = self.vault_address(token_mint);

        let config = RpcProgramAccountsConfig {
            filters: Some(lock_record_filters(&vault)),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.rpc_client.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        let accounts = self
            .rpc_client
            .get_program_accounts_with_config(&self.program_id, config)
            .await?;
        log::debug!("Found {} lock record(s) in vault {}", accounts.len(), vault);

        let now = Utc::now().timestamp();
        let records = accounts
            .into_iter()
            .map(|(public_key, account)| {
                let record = LockRecord::from_account_data(&account.data)?;
                Ok(LockRecordEntry {
                    public_key,
                    info: LockInfoView::from_record(&record, now),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LockRecords { records })
    }

    async fn try_get_vault_info(&self, token_mint: &Pubkey) -> Result<VaultInfo> {
        let (vault_address, _) = self.vault_address(token_mint);

        let account = self
            .fetch_account(&vault_address)
            .await?
            .ok_or(ClientError::VaultNotFound)?;
        let vault = Vault::from_account_data(&account.data)?;

        Ok(VaultInfo::new(vault_address, &vault))
    }

    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc_client
            .get_account_with_commitment(address, self.rpc_client.commitment())
            .await?;
        Ok(response.value)
    }
}

/// Filters selecting the lock records whose vault back-reference is `vault`
pub fn lock_record_filters(vault: &Pubkey) -> Vec<RpcFilterType> {
    vec![
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            0,
            &LockRecord::discriminator(),
        )),
        RpcFilterType::Memcmp(Memcmp::new_base58_encoded(
            LOCK_RECORD_VAULT_OFFSET,
            vault.as_ref(),
        )),
    ]
}

/// The instructions of a lock transaction: the vault token account is
/// created first when it does not exist, and `LockTokens` always comes last
pub fn lock_instructions(
    program_id: &Pubkey,
    token_mint: &Pubkey,
    user: &Pubkey,
    amount: u64,
    unlock_timestamp: UnixTimestamp,
    vault_token_account_exists: bool,
) -> Vec<Instruction> {
    let (vault, _) = find_vault_address(program_id, token_mint);
    let (lock_record, _) = find_lock_record_address(program_id, &vault, user);
    let user_token_account = get_associated_token_address(user, token_mint);
    let vault_token_account = get_associated_token_address(&vault, token_mint);

    let mut instructions = Vec::with_capacity(2);
    if !vault_token_account_exists {
        instructions.push(create_associated_token_account(
            user,
            &vault,
            token_mint,
            &spl_token::id(),
        ));
    }
    instructions.push(instruction::lock_tokens(
        program_id,
        &vault,
        &lock_record,
        &user_token_account,
        &vault_token_account,
        user,
        &spl_token::id(),
        amount,
        unlock_timestamp,
    ));
    instructions
}

/// Decodes the base64 return data of `GetLockInfo`
pub fn decode_lock_info(return_data: &str) -> Result<LockInfo> {
    let bytes = STANDARD
        .decode(return_data)
        .map_err(|err| ClientError::ReturnData(err.to_string()))?;
    LockInfo::try_from_slice(&bytes).map_err(|err| ClientError::ReturnData(err.to_string()))
}

fn unlock_timestamp_after(now: UnixTimestamp, lock_duration_seconds: u64) -> UnixTimestamp {
    now.saturating_add(i64::try_from(lock_duration_seconds).unwrap_or(i64::MAX))
}

fn settle<T>(operation: &str, result: Result<T>) -> Outcome<T> {
    match &result {
        Err(err @ (ClientError::LockRecordNotFound | ClientError::VaultNotFound)) => {
            log::debug!("{}: {}", operation, err)
        }
        Err(err) => log::error!("Error {}: {}", operation, err),
        Ok(_) => {}
    }
    result.into()
}
