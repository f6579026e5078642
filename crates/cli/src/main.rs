use clap::{Parser, Subcommand};

mod client;
mod commands;
mod config;
mod error;
mod store;

use crate::error::{AppError, Result};

#[derive(Debug, Parser)]
#[command(name = "splitten_cli", disable_version_flag = true)]
struct Cli {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    base_url: Option<String>,
    /// Override email (password is never read from the CLI).
    #[arg(long)]
    email: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all expenses, newest first.
    List,
    /// Show one expense with its shares.
    Show { id: i32 },
    /// Record a split expense.
    Add {
        name: String,
        /// Total in major units; supports `+ - * /` expressions like "120+15".
        total: String,
        #[arg(long)]
        paid_by: i32,
        /// Percentage per user as `id=pct` (repeatable); defaults to an even
        /// split over the whole group.
        #[arg(long = "split", value_parser = parse_portion)]
        splits: Vec<(i32, f64)>,
        #[arg(long, default_value = "SEK")]
        currency: String,
        #[arg(long)]
        category: Option<i32>,
    },
    /// Replace an existing expense (same fields as `add`).
    Edit {
        id: i32,
        name: String,
        /// Total in major units; supports `+ - * /` expressions like "120+15".
        total: String,
        #[arg(long)]
        paid_by: i32,
        /// Percentage per user as `id=pct` (repeatable); defaults to an even
        /// split over the whole group.
        #[arg(long = "split", value_parser = parse_portion)]
        splits: Vec<(i32, f64)>,
        #[arg(long, default_value = "SEK")]
        currency: String,
        #[arg(long)]
        category: Option<i32>,
    },
    /// List expense categories.
    Categories,
    /// Show net balances and who owes whom.
    Balance,
    /// Register a payment that settles a balance (prints a Swish link when
    /// possible).
    Settle {
        /// Counterparty user id.
        user: i32,
        #[arg(long, default_value = "SEK")]
        currency: String,
        /// Amount in major units; defaults to the whole outstanding balance.
        #[arg(long)]
        amount: Option<String>,
    },
    /// Show my profile.
    Me,
    /// Register (or clear) my phone number.
    SetPhone { phone_number: Option<String> },
    /// Delete an expense.
    Delete { id: i32 },
}

fn parse_portion(value: &str) -> std::result::Result<(i32, f64), String> {
    let (user, percentage) = value
        .split_once('=')
        .ok_or_else(|| format!("expected id=pct, got \"{value}\""))?;
    let user: i32 = user
        .trim()
        .parse()
        .map_err(|_| format!("invalid user id in \"{value}\""))?;
    let percentage: f64 = percentage
        .trim()
        .parse()
        .map_err(|_| format!("invalid percentage in \"{value}\""))?;
    Ok((user, percentage))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref(), cli.base_url, cli.email)?;
    if config.email.is_empty() || config.password.is_empty() {
        return Err(AppError::Usage(
            "email and password must be configured (config file or SPLITTEN_CLI_* env)"
                .to_string(),
        ));
    }
    let client = client::ApiClient::new(&config.base_url, &config.email, &config.password)?;

    match cli.command {
        Command::List => commands::list(&client).await,
        Command::Show { id } => commands::show(&client, id).await,
        Command::Add {
            name,
            total,
            paid_by,
            splits,
            currency,
            category,
        } => commands::add(&client, name, total, paid_by, splits, currency, category).await,
        Command::Edit {
            id,
            name,
            total,
            paid_by,
            splits,
            currency,
            category,
        } => commands::edit(&client, id, name, total, paid_by, splits, currency, category).await,
        Command::Categories => commands::categories(&client).await,
        Command::Balance => commands::balance(&client).await,
        Command::Settle {
            user,
            currency,
            amount,
        } => commands::settle(&client, user, currency, amount).await,
        Command::Me => commands::me(&client).await,
        Command::SetPhone { phone_number } => commands::set_phone(&client, phone_number).await,
        Command::Delete { id } => commands::delete(&client, id).await,
    }
}
