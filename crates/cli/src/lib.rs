pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "agrobill",
    about = "Agrobill point-of-sale CLI",
    long_about = "Compose pesticide retail bills from a product catalog, persist them, and browse saved bills.",
    after_help = "Examples:\n  agrobill catalog --search mala\n  agrobill new-bill --customer \"Asha Traders\" --item \"Malathion 50EC=2\"\n  agrobill bills --customer asha\n  agrobill doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(name = "new-bill", about = "Compose a bill from catalog items and save it")]
    NewBill {
        #[arg(long, help = "Customer the bill is issued to")]
        customer: String,
        #[arg(long, help = "Bill date as YYYY-MM-DD (defaults to today)")]
        date: Option<NaiveDate>,
        #[arg(
            long = "item",
            required = true,
            help = "Catalog item as NAME or NAME=QTY; repeatable"
        )]
        items: Vec<String>,
    },
    #[command(about = "List saved bills, optionally filtered by customer name")]
    Bills {
        #[arg(long, help = "Case-insensitive substring of the customer name")]
        customer: Option<String>,
    },
    #[command(about = "List catalog items from the configured source")]
    Catalog {
        #[arg(long, help = "Case-insensitive substring of the item name")]
        search: Option<String>,
    },
    #[command(about = "Inspect effective configuration values with secret redaction")]
    Config,
    #[command(about = "Validate config, bill store access, and catalog source readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::NewBill { customer, date, items } => {
            commands::new_bill::run(&customer, date, &items)
        }
        Command::Bills { customer } => commands::bills::run(customer.as_deref()),
        Command::Catalog { search } => commands::catalog::run(search.as_deref()),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
