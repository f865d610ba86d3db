//! Command-line access to the fixture-user registries.
//!
//! Lets a developer see which users a test run would pick from, inspect one
//! record, or drop a user that the live service no longer knows about.

use anyhow::{Context, Result, bail};
use bamtest_model::{MASK, SecretMode, User};
use bamtest_registry::{
    CorruptStorePolicy, DEFAULT_DATA_DIR, Environment, RegistryConfig, RegistryStore, UserFilter,
    decode_registry,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bamtest")]
#[command(about = "Inspect and maintain bank-account-manager test user registries")]
pub struct Args {
    /// Environment whose registry is used (LOCAL, DEV, TEST, STAGING, PROD)
    #[arg(short, long, default_value = "TEST")]
    pub env: Environment,

    /// Directory holding the registry files
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Give up waiting for the registry lock after this many milliseconds
    #[arg(long)]
    pub lock_timeout_ms: Option<u64>,

    /// Mask passwords in output
    #[arg(long)]
    pub hide_secrets: bool,

    /// Refuse to rewrite a registry file that cannot be decoded
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List every registered user
    List,
    /// Pick a random registered user, as a test fixture would
    Pick {
        /// Only consider users that own a bank account
        #[arg(long)]
        with_bank_account: bool,
    },
    /// Print one user's registry record
    Show {
        /// Server-assigned user id
        id: u64,
    },
    /// Delete one user's registry record
    Remove {
        /// Server-assigned user id
        id: u64,
        /// Required to remove from the PROD registry
        #[arg(long)]
        force: bool,
    },
}

impl Args {
    /// Registry configuration described by the flags.
    #[must_use]
    pub fn registry_config(&self) -> RegistryConfig {
        let policy = if self.strict {
            CorruptStorePolicy::Abort
        } else {
            CorruptStorePolicy::TreatAsEmpty
        };
        RegistryConfig::new(&self.data_dir)
            .with_lock_timeout(self.lock_timeout_ms.map(Duration::from_millis))
            .with_corrupt_policy(policy)
    }

    /// Secret masking described by the flags.
    #[must_use]
    pub fn secret_mode(&self) -> SecretMode {
        SecretMode::from_hide_flag(self.hide_secrets)
    }
}

/// Runs the selected command, writing its report to `out`.
pub fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let store = RegistryStore::open(args.registry_config(), args.env);
    let mode = args.secret_mode();

    match &args.command {
        Command::List => list(&store, mode, out),
        Command::Pick { with_bank_account } => {
            let user = store
                .select_random_user(UserFilter::from_requirement(*with_bank_account))
                .context("Failed to pick a registered user")?;
            write_user(&user, mode, out)
        }
        Command::Show { id } => {
            let user = store
                .load_user(&id.to_string())
                .with_context(|| format!("Failed to read user {id} from {}", store.path().display()))?;
            let Some(user) = user else {
                bail!("No user {id} in the {} registry", args.env);
            };
            let mut record = user.to_record()?;
            if mode.hides() {
                record["password"] = MASK.into();
            }
            writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
            Ok(())
        }
        Command::Remove { id, force } => {
            if args.env.is_production() && !force {
                bail!("Refusing to remove user {id} from the {} registry without --force", args.env);
            }
            let removed = store
                .remove(&id.to_string())
                .with_context(|| format!("Failed to update {}", store.path().display()))?;
            if removed {
                info!("Removed user {} from {}", id, args.env);
                writeln!(out, "removed {id}")?;
            } else {
                writeln!(out, "no user {id}")?;
            }
            Ok(())
        }
    }
}

fn list(store: &RegistryStore, mode: SecretMode, out: &mut impl Write) -> Result<()> {
    let raw = store
        .load()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;
    let decoded = decode_registry(&raw);

    for user in decoded.users.values() {
        writeln!(out, "{}", user.display(mode))?;
    }
    for rejection in &decoded.rejected {
        writeln!(out, "{}: undecodable ({})", rejection.key, rejection.error)?;
    }
    writeln!(
        out,
        "{} users, {} with bank accounts, {} undecodable",
        decoded.users.len(),
        decoded.matching(UserFilter::WithBankAccount).count(),
        decoded.rejected.len()
    )?;
    Ok(())
}

fn write_user(user: &User, mode: SecretMode, out: &mut impl Write) -> Result<()> {
    writeln!(out, "{}", user.display(mode))?;
    for account in user.bank_accounts().values() {
        let iban = match account.iban.as_deref() {
            Some(iban) => iban,
            None if account.iban_issuance_status.is_terminal() => "none",
            None => "pending",
        };
        writeln!(
            out,
            "  account {}: {} ({}, iban {})",
            account.id, account.full_name, account.iban_issuance_status, iban
        )?;
    }
    Ok(())
}
