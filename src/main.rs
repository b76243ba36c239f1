use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use harvestsim::{config::BalanceConfig, scenario::ScenarioLoader};

#[derive(Debug, Parser)]
#[command(author, version, about = "Day-by-day farm season runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/spring_plot.yaml")]
    scenario: PathBuf,

    /// Override day count (uses scenario default when omitted)
    #[arg(long)]
    days: Option<u64>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Balance YAML replacing the scenario's balance block
    #[arg(long)]
    balance: Option<PathBuf>,

    /// Print the final farm snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let loader = ScenarioLoader::new(".");
    let scenario = loader.load(&cli.scenario)?;
    let balance = match &cli.balance {
        Some(path) => BalanceConfig::from_yaml(path)
            .with_context(|| format!("Failed to load balance file {}", path.display()))?,
        None => scenario.balance_config(),
    };
    let mut world = scenario.build_world_with(balance);
    let days = scenario.days(cli.days);
    let mut engine = scenario.build_engine(cli.seed);

    let summaries = engine.run(&mut world, days)?;
    let outbreaks = summaries.iter().filter(|s| s.outbreak.is_some()).count();

    if cli.json {
        println!("{}", world.snapshot().to_json()?);
        return Ok(());
    }

    let ledger = &world.ledger;
    let farm = &world.farm;
    println!(
        "Scenario '{}' completed for {} days, ending {}.",
        scenario.name,
        days,
        world.date()
    );
    println!(
        "Money: {:.2} (earned {:.2}, spent {:.2}, profit {:.2})",
        ledger.money,
        ledger.total_earned,
        ledger.total_spent,
        ledger.profit()
    );
    println!(
        "Crops planted: {}, harvested: {}, still growing: {}",
        farm.total_planted,
        farm.total_harvested,
        farm.crop_count()
    );
    println!(
        "Water used: {:.2}, fertilizer used: {:.2}, outbreaks: {}",
        farm.water_used, farm.fertilizer_used, outbreaks
    );
    Ok(())
}
