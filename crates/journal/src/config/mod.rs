use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use ledger::{CategoryKind, EntryKind, JournalType, MoneyCents, Period};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/journal.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub user_id: String,
    pub timezone: String,
    pub journal: String,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            user_id: String::new(),
            timezone: "Europe/Rome".to_string(),
            journal: "personal".to_string(),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// `None` when no user is configured; loading then fails with an auth error.
    pub fn user_id(&self) -> Option<&str> {
        Some(self.user_id.trim()).filter(|id| !id.is_empty())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Setting(format!("timezone {:?}: {err}", self.timezone)))
    }

    pub fn journal(&self) -> Result<JournalType> {
        Ok(self.journal.parse::<JournalType>()?)
    }
}

#[derive(Debug, Parser)]
#[command(name = "journal", about = "Income/expense journal client")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL of the persistence service.
    #[arg(long)]
    base_url: Option<String>,
    /// Override the user the ledger belongs to.
    #[arg(long)]
    user: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long)]
    timezone: Option<String>,
    /// Journal to work on: personal or business.
    #[arg(long)]
    journal: Option<String>,
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

/// Date range options shared by the read-only commands.
#[derive(Debug, Clone, clap::Args)]
pub struct Range {
    /// First day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Canonical period used when no dates are given: day, week, month, year, all.
    #[arg(long)]
    pub period: Option<Period>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Totals for today, this week, month, year and all time.
    Summary,
    /// List entries of a window.
    Entries(Range),
    /// Expenses of a window grouped by category.
    Breakdown(Range),
    /// Record a new entry.
    Add {
        kind: EntryKind,
        amount: MoneyCents,
        #[arg(long)]
        category: String,
        #[arg(long)]
        note: Option<String>,
        /// Day of the event (YYYY-MM-DD); defaults to now.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Change an existing entry.
    Update {
        id: Uuid,
        #[arg(long = "type")]
        kind: Option<EntryKind>,
        #[arg(long)]
        amount: Option<MoneyCents>,
        #[arg(long)]
        category: Option<String>,
        /// An empty note clears it.
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Delete an entry for good.
    Remove { id: Uuid },
    /// List built-in and custom categories.
    Categories,
    /// Create a custom category.
    CategoryAdd {
        name: String,
        #[arg(long = "type")]
        kind: CategoryKind,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Change a custom category.
    CategoryUpdate {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        #[arg(long = "type")]
        kind: Option<CategoryKind>,
    },
    /// Delete a custom category that no entry uses.
    CategoryRemove { id: String },
    /// Write the entries of a window as CSV.
    Export {
        #[command(flatten)]
        range: Range,
        /// Output file; stdout when absent.
        #[arg(long)]
        out: Option<String>,
    },
}

pub fn load() -> Result<(AppConfig, Command)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("JOURNAL"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(user) = args.user {
        settings.user_id = user;
    }
    if let Some(timezone) = args.timezone {
        settings.timezone = timezone;
    }
    if let Some(journal) = args.journal {
        settings.journal = journal;
    }
    if let Some(level) = args.level {
        settings.level = level;
    }

    Ok((settings, args.command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_parse_add_command() {
        let args = Args::try_parse_from([
            "journal",
            "--user",
            "alice",
            "add",
            "expense",
            "12,50",
            "--category",
            "food",
        ])
        .unwrap();
        assert_eq!(args.user.as_deref(), Some("alice"));
        match args.command {
            Command::Add {
                kind,
                amount,
                category,
                ..
            } => {
                assert_eq!(kind, EntryKind::Expense);
                assert_eq!(amount, MoneyCents::new(1_250));
                assert_eq!(category, "food");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn args_parse_range() {
        let args = Args::try_parse_from([
            "journal",
            "breakdown",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-31",
        ])
        .unwrap();
        let Command::Breakdown(range) = args.command else {
            panic!("expected breakdown");
        };
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(range.period, None);
    }

    #[test]
    fn blank_user_means_no_context() {
        let config = AppConfig::default();
        assert_eq!(config.user_id(), None);
        assert!(config.timezone().is_ok());
        assert_eq!(config.journal().unwrap(), JournalType::Personal);

        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(config.timezone().is_err());
    }
}
