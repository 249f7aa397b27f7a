mod simulation;

use blackjack_drivers::parse_config_from_file;
use clap::Parser;
use std::{error::Error, path::PathBuf};

const DEFAULT_CONFIG_PATH: &str = "~/.blackjack.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,

    /// Overrides the number of rounds every thread plays
    #[arg(short, long)]
    rounds: Option<u64>,

    /// Overrides the seed of the first thread
    #[arg(short, long)]
    seed: Option<u64>,
}

fn resolve_config_path(config: &str) -> Result<PathBuf, Box<dyn Error>> {
    if config != DEFAULT_CONFIG_PATH {
        return Ok(PathBuf::from(config));
    }
    let home_dir = home::home_dir().ok_or("cannot find home directory")?;
    let config_file_path = home_dir.join(".blackjack.yml");
    if config_file_path.is_dir() {
        return Err(format!("{} is a directory", config_file_path.display()).into());
    }
    Ok(config_file_path)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    let config_path = resolve_config_path(&args.config)?;
    log::info!("reading config from {}", config_path.display());

    let mut config = parse_config_from_file(&config_path)?;
    if let Some(rounds) = args.rounds {
        config.blackjack_simulator.rounds = rounds;
    }
    if args.seed.is_some() {
        config.blackjack_simulator.seed = args.seed;
    }
    log::debug!("{:#?}", config);

    let summary = simulation::simulate(&config)?;
    simulation::print_summary(&summary);
    Ok(())
}
