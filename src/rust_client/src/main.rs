use std::{env, process::ExitCode, str::FromStr};

use anyhow::{anyhow, bail, Context};
use serde::Serialize;
use serde_json::json;
use solana_program::pubkey::Pubkey;
use solana_sdk::{signature::Keypair, signer::Signer};
use token_lock::pda::{find_lock_record_address, find_vault_address};
use token_lock_client::{
    config::load_keypair, format_token_amount, model::Addresses, parse_token_amount,
    ClientConfig, Outcome, TokenLockClient, DEFAULT_TOKEN_DECIMALS,
};

const USAGE: &str = "usage: token-lock <command> [args]

commands:
  init-vault <MINT>
  lock <MINT> <AMOUNT> <SECONDS>     AMOUNT in the mint's smallest unit
  unlock <MINT>
  info <MINT> [OWNER]
  view <MINT> [OWNER]                lock info as computed by the program
  records <MINT>
  vault <MINT>
  exists <MINT>
  addresses <MINT> [OWNER]
  format-amount <AMOUNT> [DECIMALS]
  parse-amount <TEXT> [DECIMALS]

environment:
  TOKEN_LOCK_RPC_URL, TOKEN_LOCK_COMMITMENT, TOKEN_LOCK_PROGRAM_ID, TOKEN_LOCK_KEYPAIR";

#[derive(Debug, PartialEq)]
enum Command {
    InitVault { mint: Pubkey },
    Lock { mint: Pubkey, amount: u64, seconds: u64 },
    Unlock { mint: Pubkey },
    Info { mint: Pubkey, owner: Option<Pubkey> },
    View { mint: Pubkey, owner: Option<Pubkey> },
    Records { mint: Pubkey },
    Vault { mint: Pubkey },
    Exists { mint: Pubkey },
    Addresses { mint: Pubkey, owner: Option<Pubkey> },
    FormatAmount { amount: u64, decimals: u8 },
    ParseAmount { text: String, decimals: u8 },
}

fn arg<'a>(rest: &'a [String], index: usize, what: &str) -> anyhow::Result<&'a str> {
    rest.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing <{}>", what))
}

fn pubkey_arg(rest: &[String], index: usize, what: &str) -> anyhow::Result<Pubkey> {
    let text = arg(rest, index, what)?;
    Pubkey::from_str(text).with_context(|| format!("invalid {} {}", what, text))
}

fn owner_arg(rest: &[String], index: usize) -> anyhow::Result<Option<Pubkey>> {
    match rest.get(index) {
        Some(_) => pubkey_arg(rest, index, "OWNER").map(Some),
        None => Ok(None),
    }
}

fn number_arg<T: FromStr>(rest: &[String], index: usize, what: &str) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let text = arg(rest, index, what)?;
    text.parse()
        .with_context(|| format!("invalid {} {}", what, text))
}

fn decimals_arg(rest: &[String], index: usize) -> anyhow::Result<u8> {
    match rest.get(index) {
        Some(_) => number_arg(rest, index, "DECIMALS"),
        None => Ok(DEFAULT_TOKEN_DECIMALS),
    }
}

impl Command {
    fn parse(args: &[String]) -> anyhow::Result<Self> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| anyhow!("missing command"))?;

        let command = match name.as_str() {
            "init-vault" => Command::InitVault {
                mint: pubkey_arg(rest, 0, "MINT")?,
            },
            "lock" => Command::Lock {
                mint: pubkey_arg(rest, 0, "MINT")?,
                amount: number_arg(rest, 1, "AMOUNT")?,
                seconds: number_arg(rest, 2, "SECONDS")?,
            },
            "unlock" => Command::Unlock {
                mint: pubkey_arg(rest, 0, "MINT")?,
            },
            "info" => Command::Info {
                mint: pubkey_arg(rest, 0, "MINT")?,
                owner: owner_arg(rest, 1)?,
            },
            "view" => Command::View {
                mint: pubkey_arg(rest, 0, "MINT")?,
                owner: owner_arg(rest, 1)?,
            },
            "records" => Command::Records {
                mint: pubkey_arg(rest, 0, "MINT")?,
            },
            "vault" => Command::Vault {
                mint: pubkey_arg(rest, 0, "MINT")?,
            },
            "exists" => Command::Exists {
                mint: pubkey_arg(rest, 0, "MINT")?,
            },
            "addresses" => Command::Addresses {
                mint: pubkey_arg(rest, 0, "MINT")?,
                owner: owner_arg(rest, 1)?,
            },
            "format-amount" => Command::FormatAmount {
                amount: number_arg(rest, 0, "AMOUNT")?,
                decimals: decimals_arg(rest, 1)?,
            },
            "parse-amount" => Command::ParseAmount {
                text: arg(rest, 0, "TEXT")?.to_string(),
                decimals: decimals_arg(rest, 1)?,
            },
            other => bail!("unknown command {}", other),
        };

        Ok(command)
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome<T: Serialize>(outcome: &Outcome<T>) -> anyhow::Result<ExitCode> {
    print_json(outcome)?;
    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn connect(config: &ClientConfig) -> anyhow::Result<TokenLockClient<Keypair>> {
    let client = TokenLockClient::from_config(config).with_context(|| {
        format!(
            "failed to set up client with keypair {}",
            config.keypair_path.display()
        )
    })?;
    log::debug!(
        "Using {} as {} against program {}",
        config.rpc_url,
        client.payer(),
        client.program_id()
    );
    Ok(client)
}

async fn run(command: Command, config: &ClientConfig) -> anyhow::Result<ExitCode> {
    match command {
        Command::InitVault { mint } => {
            print_outcome(&connect(config)?.initialize_vault(&mint).await)
        }
        Command::Lock {
            mint,
            amount,
            seconds,
        } => print_outcome(&connect(config)?.lock_tokens(&mint, amount, seconds).await),
        Command::Unlock { mint } => print_outcome(&connect(config)?.unlock_tokens(&mint).await),
        Command::Info { mint, owner } => {
            print_outcome(&connect(config)?.get_lock_info(&mint, owner.as_ref()).await)
        }
        Command::View { mint, owner } => {
            print_outcome(&connect(config)?.view_lock_info(&mint, owner.as_ref()).await)
        }
        Command::Records { mint } => {
            print_outcome(&connect(config)?.get_all_lock_records(&mint).await)
        }
        Command::Vault { mint } => print_outcome(&connect(config)?.get_vault_info(&mint).await),
        Command::Exists { mint } => {
            let exists = connect(config)?.vault_exists(&mint).await;
            print_json(&json!({ "exists": exists }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Addresses { mint, owner } => {
            let owner = match owner {
                Some(owner) => owner,
                None => load_keypair(&config.keypair_path)?.pubkey(),
            };
            let program_id = config.program_id()?;
            let (vault, vault_bump) = find_vault_address(&program_id, &mint);
            let (lock_record, lock_record_bump) =
                find_lock_record_address(&program_id, &vault, &owner);
            print_json(&Addresses {
                vault,
                vault_bump,
                lock_record,
                lock_record_bump,
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::FormatAmount { amount, decimals } => {
            print_json(&json!({ "amount": format_token_amount(amount, decimals) }))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::ParseAmount { text, decimals } => {
            let amount = parse_token_amount(&text, decimals)
                .with_context(|| format!("invalid amount {}", text))?;
            print_json(&json!({ "amount": amount }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("error: {:#}\n\n{}", err, USAGE);
            return Ok(ExitCode::from(2));
        }
    };

    let config = ClientConfig::from_env()?;
    run(command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_lock_command() {
        let mint = Pubkey::new_unique();
        let command = Command::parse(&args(&format!("lock {} 1000 0", mint))).unwrap();
        assert_eq!(
            command,
            Command::Lock {
                mint,
                amount: 1000,
                seconds: 0
            }
        );
    }

    #[test]
    fn owner_is_optional() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();

        let command = Command::parse(&args(&format!("info {}", mint))).unwrap();
        assert_eq!(command, Command::Info { mint, owner: None });

        let command = Command::parse(&args(&format!("info {} {}", mint, owner))).unwrap();
        assert_eq!(
            command,
            Command::Info {
                mint,
                owner: Some(owner)
            }
        );
    }

    #[test]
    fn amount_commands_default_decimals() {
        let command = Command::parse(&args("parse-amount 1.5")).unwrap();
        assert_eq!(
            command,
            Command::ParseAmount {
                text: "1.5".to_string(),
                decimals: DEFAULT_TOKEN_DECIMALS
            }
        );
        let command = Command::parse(&args("format-amount 150 2")).unwrap();
        assert_eq!(
            command,
            Command::FormatAmount {
                amount: 150,
                decimals: 2
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Command::parse(&[]).is_err());
        assert!(Command::parse(&args("frobnicate")).is_err());
        assert!(Command::parse(&args("unlock")).is_err());
        assert!(Command::parse(&args("unlock not-a-key")).is_err());
        let mint = Pubkey::new_unique();
        assert!(Command::parse(&args(&format!("lock {} -5 10", mint))).is_err());
    }
}
