//! Operator CLI for the filedrop service.
//!
//! Key issuance is deliberately CLI-only: the upload interface can test key
//! membership but never mint keys.

use clap::{Parser, Subcommand};
use filedrop_core::{DropService, ServiceConfig, UsageReport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "filedrop")]
#[command(about = "filedrop short-identifier service CLI")]
struct Cli {
    /// Data directory holding the key file, ledger and uploads
    #[arg(long, default_value = "filedrop_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, key file and ledger
    Init,
    /// Issue a new API key and print it
    Newkey,
    /// Check whether an API key is accepted
    Checkkey {
        /// The key to test
        key: String,
    },
    /// Print namespace utilisation statistics
    Diagnostics,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    run(Cli::parse())
}

/// Dispatches one subcommand.
///
/// Storage and validation failures propagate to `main`, which exits
/// non-zero; an unknown key is an answer, not an error, so `checkkey`
/// reports it on stdout and still exits zero.
fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServiceConfig::new(&cli.data_dir)?;
    let service = DropService::new(config)?;

    match cli.command {
        Some(Commands::Init) => {
            service.init_storage()?;
            println!("Initialised data directory: {}", cli.data_dir);
        }
        Some(Commands::Newkey) => {
            let key = service.issue_key()?;
            println!("Your secret API key is: {}", key);
        }
        Some(Commands::Checkkey { key }) => {
            println!("Checking that your key is valid...");
            if service.validate_key(&key)? {
                println!("Your key is valid.");
            } else {
                println!("That key is not valid.");
            }
        }
        Some(Commands::Diagnostics) => {
            print_report(&service.diagnostics_report()?);
        }
        None => {
            println!("Use 'filedrop --help' for commands");
        }
    }

    Ok(())
}

fn print_report(report: &UsageReport) {
    println!(
        "{:<10} {:>14} {:>16} {:>16} {:>8}",
        "extension", "used", "left", "total", "percent"
    );
    for row in &report.rows {
        println!(
            "{:<10} {:>14} {:>16} {:>16} {:>7.1}%",
            row.label,
            group_thousands(u128::from(row.used)),
            group_thousands(row.left),
            group_thousands(row.total),
            row.percent
        );
    }
    println!("\nUpload directory size: {}", report.upload_dir_size());
}

/// Formats an integer with comma separators, e.g. `15018508` → `15,018,508`.
fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
