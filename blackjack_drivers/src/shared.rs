pub mod strategies;

use blackjack_engine::{ConfigError, GameConfig, Rule};
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub shoe: ConfigShoe,
    #[serde(default)]
    pub rule: Rule,
    pub blackjack_simulator: ConfigBlackjackSimulator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigShoe {
    pub number_of_decks: u8,
    pub penetration: f64,
    pub shrink_deck: bool,
}

impl Default for ConfigShoe {
    fn default() -> Self {
        let game_config = GameConfig::default();
        ConfigShoe {
            number_of_decks: game_config.number_of_decks,
            penetration: game_config.penetration,
            shrink_deck: game_config.shrink_deck,
        }
    }
}

impl TryFrom<&Config> for GameConfig {
    type Error = ConfigError;

    fn try_from(config: &Config) -> Result<GameConfig, Self::Error> {
        let game_config = GameConfig {
            number_of_decks: config.shoe.number_of_decks,
            penetration: config.shoe.penetration,
            shrink_deck: config.shoe.shrink_deck,
            rule: config.rule,
        };
        game_config.validate()?;
        Ok(game_config)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    MimicDealer,
    RandomMoves,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigBlackjackSimulator {
    /// 0 means one thread per available core.
    pub number_of_threads: usize,
    /// Rounds played by every thread.
    pub rounds: u64,
    pub wager: f64,
    pub number_of_players: usize,
    pub strategy: StrategyKind,
    /// Thread `i` is seeded with `seed + i`. Without a seed every run differs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ConfigBlackjackSimulator {
    pub fn resolved_number_of_threads(&self) -> usize {
        if self.number_of_threads == 0 {
            let parallelism = std::thread::available_parallelism();
            match parallelism {
                Ok(n) => n.get(),
                Err(_) => 1,
            }
        } else {
            self.number_of_threads
        }
    }
}

/// Parses a YAML config and checks that it describes a playable game.
pub fn parse_config_from_str(content: &str) -> Result<Config, ConfigFileError> {
    let config: Config = serde_yaml::from_str(content)?;
    GameConfig::try_from(&config)?;
    Ok(config)
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file<P: AsRef<Path>>(filename: P) -> Result<Config, ConfigFileError> {
    let file_content = fs::read_to_string(filename)?;
    parse_config_from_str(&file_content)
}
