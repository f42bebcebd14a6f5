use anyhow::Result;
use bundlequote::core::log::init_logging;
use bundlequote::core::payment::CustomerData;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Path to a plan file that replaces the plan in the configuration
    #[arg(short, long, global = true)]
    plan: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for bundlequote::AppCommand {
    fn from(cmd: Commands) -> bundlequote::AppCommand {
        match cmd {
            Commands::Catalog => bundlequote::AppCommand::Catalog,
            Commands::Quote { json } => bundlequote::AppCommand::Quote { json },
            Commands::Proposal {
                output,
                customer_name,
                customer_doc,
                json,
            } => bundlequote::AppCommand::Proposal {
                output,
                customer: customer_name.map(|name| {
                    CustomerData::new(&name, customer_doc.as_deref().unwrap_or_default(), "")
                }),
                json,
            },
            Commands::Checkout {
                name,
                cpf_cnpj,
                email,
            } => bundlequote::AppCommand::Checkout {
                customer: CustomerData::new(&name, &cpf_cnpj, &email),
            },
            Commands::Insight => bundlequote::AppCommand::Insight,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List services with their price under every frequency plan
    Catalog,
    /// Price the selected plan
    Quote {
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,
    },
    /// Export a proposal document for the selected plan
    Proposal {
        /// Output file (defaults to Proposta_<company>_<timestamp>.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Customer name printed on the proposal
        #[arg(long)]
        customer_name: Option<String>,
        /// Customer CPF/CNPJ printed on the proposal
        #[arg(long)]
        customer_doc: Option<String>,
        /// Write the raw quote as JSON instead
        #[arg(long)]
        json: bool,
    },
    /// Create a PIX charge for the selected plan
    Checkout {
        /// Owner's full name
        #[arg(long)]
        name: String,
        /// CPF or CNPJ
        #[arg(long)]
        cpf_cnpj: String,
        /// E-mail for the invoice
        #[arg(long)]
        email: String,
    },
    /// Generate consultant copy for the selected plan
    Insight,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => bundlequote::cli::setup::setup(),
        Some(cmd) => {
            bundlequote::run_command(cmd.into(), cli.config_path.as_deref(), cli.plan.as_deref())
                .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
