mod cli;
mod error;
mod input;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;

use btc_whatif_core::models::investment::SellMode;
use btc_whatif_core::models::preset::PRESET_DATES;
use btc_whatif_core::models::settings::{parse_anchor_time, Settings};
use btc_whatif_core::WhatIfCalculator;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal; only real variables matter.
    let _ = dotenvy::dotenv();

    if let Err(error) = logging::init_logging() {
        eprintln!("warning: {error}");
    }

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(exit_code = error.exit_code(), "command failed");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    if let Command::Presets = cli.command {
        print!("{}", output::render_presets(&PRESET_DATES, cli.format)?);
        return Ok(());
    }

    let settings = build_settings(&cli)?;
    let calculator = WhatIfCalculator::from_settings(&settings)?;
    tracing::debug!(?calculator, "calculator ready");

    match &cli.command {
        Command::Calc(args) => {
            let buy_date = input::parse_date(&args.buy_date)?;
            let amount = input::parse_amount(&args.amount)?;
            let mode = match &args.sell_date {
                Some(raw) => SellMode::Future(input::parse_date(raw)?),
                None => SellMode::Today,
            };
            let result = calculator
                .compute_outcome(buy_date, amount, args.currency.into(), mode)
                .await?;
            print!("{}", output::render_outcome(&result, cli.format)?);
        }
        Command::Project(args) => {
            let date = input::parse_date(&args.date)?;
            let projection = calculator
                .project_price(date, args.currency.into())
                .await?;
            print!("{}", output::render_projection(&projection, cli.format)?);
        }
        Command::Presets => {}
    }

    Ok(())
}

/// Environment first, then command-line overrides.
fn build_settings(cli: &Cli) -> Result<Settings, CliError> {
    apply_overrides(Settings::from_env()?, cli)
}

fn apply_overrides(mut settings: Settings, cli: &Cli) -> Result<Settings, CliError> {
    if let Some(key) = &cli.api_key {
        settings.api_key = Some(key.clone());
    }
    if let Some(secs) = cli.timeout_secs {
        settings.timeout_secs = secs;
    }
    if let Some(price) = cli.anchor_price {
        settings.anchor.price_usd = price;
    }
    if let Some(raw) = &cli.anchor_date {
        settings.anchor.anchor_time = parse_anchor_time(raw)?;
    }
    settings.validate()?;
    Ok(settings)
}
