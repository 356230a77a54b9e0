//! CLI command implementations.

pub mod config;
pub mod coupons;
pub mod quote;
pub mod validate_card;

use clap::{Args, Subcommand};

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Scenario file (TOML).
    pub scenario: String,

    /// Override the scenario's coupon code.
    #[arg(long)]
    pub coupon: Option<String>,

    /// Override the scenario's shipping method (standard, express, overnight).
    #[arg(short, long)]
    pub shipping: Option<String>,
}

/// Arguments for the validate-card command.
#[derive(Args)]
pub struct ValidateCardArgs {
    /// Card number, with or without spaces.
    #[arg(long)]
    pub number: String,

    /// Name on the card.
    #[arg(long)]
    pub name: String,

    /// Expiry as MM/YY or MMYY.
    #[arg(long)]
    pub expiry: String,

    /// Security code.
    #[arg(long)]
    pub cvv: String,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,

    /// Write a default shopfront.toml to the working directory.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}
