//! Payloads returned by the client

use chrono::{DateTime, Utc};
use serde::Serialize;
use solana_program::{clock::UnixTimestamp, pubkey::Pubkey};
use solana_sdk::signature::Signature;
use token_lock::state::{LockRecord, Vault};

use crate::{
    format::format_time_remaining,
    outcome::{as_display, Outcome},
};

pub(crate) fn to_datetime(timestamp: UnixTimestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultInitialized {
    #[serde(serialize_with = "as_display")]
    pub signature: Signature,
    #[serde(serialize_with = "as_display")]
    pub vault: Pubkey,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensLockedReceipt {
    #[serde(serialize_with = "as_display")]
    pub signature: Signature,
    #[serde(serialize_with = "as_display")]
    pub lock_record: Pubkey,
    pub unlock_timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokensUnlockedReceipt {
    #[serde(serialize_with = "as_display")]
    pub signature: Signature,
}

/// A lock record with the countdown fields evaluated at a point in time
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockInfoView {
    #[serde(serialize_with = "as_display")]
    pub owner: Pubkey,
    pub amount: u64,
    pub unlock_timestamp: DateTime<Utc>,
    pub locked_at: DateTime<Utc>,
    pub is_unlocked: bool,
    pub time_remaining: u64,
    pub time_remaining_formatted: String,
    pub can_unlock: bool,
}

impl LockInfoView {
    pub fn from_record(record: &LockRecord, now: UnixTimestamp) -> Self {
        let time_remaining = record.time_remaining(now);
        LockInfoView {
            owner: record.owner,
            amount: record.amount,
            unlock_timestamp: to_datetime(record.unlock_timestamp),
            locked_at: to_datetime(record.locked_at),
            is_unlocked: record.is_unlocked,
            time_remaining,
            time_remaining_formatted: format_time_remaining(time_remaining as i64),
            can_unlock: record.can_unlock(now),
        }
    }

    /// The view as computed by the program's own clock
    pub fn from_program(info: &token_lock::state::LockInfo) -> Self {
        LockInfoView {
            owner: info.owner,
            amount: info.amount,
            unlock_timestamp: to_datetime(info.unlock_timestamp),
            locked_at: to_datetime(info.locked_at),
            is_unlocked: info.is_unlocked,
            time_remaining: info.time_remaining,
            time_remaining_formatted: format_time_remaining(
                i64::try_from(info.time_remaining).unwrap_or(i64::MAX),
            ),
            can_unlock: info.can_unlock,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecordEntry {
    #[serde(serialize_with = "as_display")]
    pub public_key: Pubkey,
    #[serde(flatten)]
    pub info: LockInfoView,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LockRecords {
    pub records: Vec<LockRecordEntry>,
}

impl Outcome<LockRecords> {
    /// The scanned records, empty when the scan failed
    pub fn records(&self) -> &[LockRecordEntry] {
        match self.payload() {
            Some(payload) => &payload.records,
            None => &[],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultInfo {
    #[serde(serialize_with = "as_display")]
    pub authority: Pubkey,
    #[serde(serialize_with = "as_display")]
    pub token_mint: Pubkey,
    pub total_locked: u64,
    #[serde(serialize_with = "as_display")]
    pub vault_address: Pubkey,
}

impl VaultInfo {
    pub fn new(vault_address: Pubkey, vault: &Vault) -> Self {
        VaultInfo {
            authority: vault.authority,
            token_mint: vault.token_mint,
            total_locked: vault.total_locked,
            vault_address,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Addresses {
    #[serde(serialize_with = "as_display")]
    pub vault: Pubkey,
    pub vault_bump: u8,
    #[serde(serialize_with = "as_display")]
    pub lock_record: Pubkey,
    pub lock_record_bump: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(unlock_timestamp: UnixTimestamp, is_unlocked: bool) -> LockRecord {
        LockRecord {
            owner: Pubkey::new_unique(),
            amount: 250,
            unlock_timestamp,
            locked_at: 1_700_000_000,
            vault: Pubkey::new_unique(),
            is_unlocked,
        }
    }

    #[test]
    fn view_evaluates_countdown_at_now() {
        let view = LockInfoView::from_record(&record(1_700_090_000, false), 1_700_000_000);
        assert_eq!(view.time_remaining, 90_000);
        assert_eq!(view.time_remaining_formatted, "1d 1h");
        assert!(!view.can_unlock);

        let later = LockInfoView::from_record(&record(1_700_090_000, false), 1_700_090_000);
        assert_eq!(later.time_remaining, 0);
        assert_eq!(later.time_remaining_formatted, "Unlockable");
        assert!(later.can_unlock);
    }

    #[test]
    fn unlocked_record_cannot_unlock_again() {
        let view = LockInfoView::from_record(&record(1_600_000_000, true), 1_700_000_000);
        assert!(!view.can_unlock);
        assert_eq!(view.time_remaining, 0);
    }

    #[test]
    fn program_view_keeps_program_fields() {
        let info =
            token_lock::state::LockInfo::from_record(&record(1_700_000_045, false), 1_700_000_000);
        let view = LockInfoView::from_program(&info);
        assert_eq!(view.time_remaining, 45);
        assert_eq!(view.time_remaining_formatted, "45s");
        assert_eq!(view.owner, info.owner);
    }

    #[test]
    fn program_countdown_beyond_i64_is_not_unlockable() {
        let mut info =
            token_lock::state::LockInfo::from_record(&record(1_700_000_045, false), 1_700_000_000);
        info.time_remaining = u64::MAX;
        let view = LockInfoView::from_program(&info);
        assert_eq!(view.time_remaining, u64::MAX);
        assert_ne!(view.time_remaining_formatted, "Unlockable");
        assert!(view.time_remaining_formatted.starts_with(&format!(
            "{}d",
            i64::MAX / 86_400
        )));
    }

    #[test]
    fn entry_serializes_flat_with_camel_case() {
        let rec = record(1_700_000_060, false);
        let address = Pubkey::new_unique();
        let entry = LockRecordEntry {
            public_key: address,
            info: LockInfoView::from_record(&rec, 1_700_000_000),
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["publicKey"], json!(address.to_string()));
        assert_eq!(value["owner"], json!(rec.owner.to_string()));
        assert_eq!(value["timeRemaining"], json!(60));
        assert_eq!(value["timeRemainingFormatted"], json!("1m"));
        assert_eq!(value["canUnlock"], json!(false));
        assert_eq!(value["unlockTimestamp"], json!("2023-11-14T22:14:20Z"));
    }

    #[test]
    fn failed_scan_reads_as_empty() {
        let failed: Outcome<LockRecords> = Outcome::failure("connection refused");
        assert!(failed.records().is_empty());

        let rec = record(1_700_000_060, false);
        let found = Outcome::Success(LockRecords {
            records: vec![LockRecordEntry {
                public_key: Pubkey::new_unique(),
                info: LockInfoView::from_record(&rec, 1_700_000_000),
            }],
        });
        assert_eq!(found.records().len(), 1);
    }
}
