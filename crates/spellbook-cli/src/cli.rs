use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use spellbook::{VariantOrder, VariantStatus};

#[derive(Parser)]
#[command(name = "spellbook")]
#[command(author, version, about = "Combo variant generator", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Generation config file (.toml, .yaml or .yml)
    #[arg(short, long, global = true, env = "SPELLBOOK_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one generation pass against a database
    Generate {
        /// SQLite database holding the catalog and variants
        #[arg(short, long, env = "SPELLBOOK_DATABASE")]
        database: PathBuf,

        /// Override the maximum number of cards per variant
        #[arg(long)]
        max_cards: Option<usize>,

        /// Override the worker thread count (0 for one per core)
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Print one stored variant
    Show {
        #[arg(short, long, env = "SPELLBOOK_DATABASE")]
        database: PathBuf,

        /// Unique id of the variant
        unique_id: String,
    },

    /// List stored variants, published ones by default
    List {
        #[arg(short, long, env = "SPELLBOOK_DATABASE")]
        database: PathBuf,

        /// Only variants in this status
        #[arg(long, value_enum, default_value_t = StatusArg::Ok, conflicts_with = "all")]
        status: StatusArg,

        /// Variants in every status
        #[arg(long)]
        all: bool,

        /// Only variants including this card
        #[arg(long)]
        card: Option<i64>,

        /// Only variants producing this feature
        #[arg(long)]
        feature: Option<i64>,

        /// Only variants realizing this combo
        #[arg(long)]
        combo: Option<i64>,

        /// Sort key
        #[arg(long, value_enum, default_value_t = OrderArg::UniqueId)]
        order: OrderArg,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Change the review status of a stored variant
    SetStatus {
        #[arg(short, long, env = "SPELLBOOK_DATABASE")]
        database: PathBuf,

        unique_id: String,

        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Print the effective generation config as TOML
    ShowConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StatusArg {
    New,
    Ok,
    NotWorking,
    Restore,
}

impl From<StatusArg> for VariantStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::New => VariantStatus::New,
            StatusArg::Ok => VariantStatus::Ok,
            StatusArg::NotWorking => VariantStatus::NotWorking,
            StatusArg::Restore => VariantStatus::Restore,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OrderArg {
    UniqueId,
    Created,
    Updated,
}

impl From<OrderArg> for VariantOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::UniqueId => VariantOrder::UniqueId,
            OrderArg::Created => VariantOrder::Created,
            OrderArg::Updated => VariantOrder::Updated,
        }
    }
}
