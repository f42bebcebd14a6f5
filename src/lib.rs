pub mod cli;
pub mod core;
pub mod providers;

use crate::core::catalog::Catalog;
use crate::core::config::AppConfig;
use crate::core::payment::CustomerData;
use crate::core::pricing::{Quote, quote};
use crate::core::proposal::Proposal;
use crate::core::selection::Plan;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Catalog,
    Quote {
        json: bool,
    },
    Proposal {
        output: Option<PathBuf>,
        customer: Option<CustomerData>,
        json: bool,
    },
    Checkout {
        customer: CustomerData,
    },
    Insight,
}

/// Loads the config, plus an optional standalone plan that replaces the
/// config's own.
pub fn load_config(config_path: Option<&str>, plan_path: Option<&str>) -> Result<AppConfig> {
    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    if let Some(path) = plan_path {
        config.plan = Plan::load_from_path(path)?;
    }
    debug!(
        services = config.services.len(),
        frequencies = config.frequencies.len(),
        plan_items = config.plan.services.len(),
        "Loaded config"
    );
    Ok(config)
}

/// Prices the configured plan.
pub fn price_plan(config: &AppConfig) -> Result<(Catalog, Quote)> {
    let catalog = config.catalog()?;
    let selection = config.plan.to_selection(&catalog)?;
    let co_host = config.plan.co_host.clone().clamped();
    let quote = quote(&catalog, &selection, &co_host)?;
    Ok((catalog, quote))
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    plan_path: Option<&str>,
) -> Result<()> {
    info!("Bundle quote starting...");

    let config = load_config(config_path, plan_path)?;
    let (catalog, quote) = price_plan(&config)?;
    let currency = config.currency.as_str();

    match command {
        AppCommand::Catalog => cli::catalog::run(&catalog, currency),
        AppCommand::Quote { json } => cli::quote::run(&quote, currency, json),
        AppCommand::Proposal {
            output,
            customer,
            json,
        } => {
            let proposal = Proposal::new(
                &config.company,
                currency,
                chrono::Local::now().date_naive(),
                customer,
                quote,
            );
            cli::proposal::run(&proposal, output.as_deref(), json).map(|_| ())
        }
        AppCommand::Checkout { customer } => {
            let asaas = config.providers.asaas();
            let gateway = providers::asaas::AsaasProvider::new(
                &asaas.base_url,
                &asaas.resolve_token()?,
                &config.company.name,
            );
            cli::checkout::run(&gateway, &customer, &quote, currency).await
        }
        AppCommand::Insight => {
            let gemini = config.providers.gemini();
            let provider = providers::gemini::GeminiProvider::new(
                &gemini.base_url,
                &gemini.model,
                &gemini.resolve_key()?,
            );
            cli::insight::run(
                &provider,
                &quote,
                &config.company.name,
                catalog.co_host().commission_rate,
            )
            .await;
            Ok(())
        }
    }
}
