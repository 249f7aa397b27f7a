mod card_count;
pub mod error;
pub mod simulation;
pub mod strategy;

use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

pub use card_count::CardCount;
pub use error::{ConfigError, GameError};

/// House rules. Every field is a toggle that changes either move legality or
/// settlement. Deserialising rejects unknown keys and non-boolean values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Rule {
    pub dealer_hit_soft17: bool,
    pub push_dealer22: bool,
    pub double_after_split: bool,
    pub hit_after_split_aces: bool,
    pub reduced_blackjack_payout: bool,
    pub allow_surrender: bool,
    /// Allows splitting any two ten-valued cards, e.g. K and Q.
    pub split_any_ten: bool,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            dealer_hit_soft17: false,
            push_dealer22: false,
            double_after_split: true,
            hit_after_split_aces: false,
            reduced_blackjack_payout: false,
            allow_surrender: true,
            split_any_ten: false,
        }
    }
}

impl Rule {
    /// Multiplier applied to the wager of a natural blackjack.
    pub fn payout_blackjack(&self) -> f64 {
        if self.reduced_blackjack_payout {
            1.2
        } else {
            1.5
        }
    }
}

/// Construction parameters of a `Simulator`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub number_of_decks: u8,
    /// Fraction of the shoe dealt before a reshuffle is scheduled.
    pub penetration: f64,
    /// If false, cards are drawn with replacement and the shoe never runs out.
    pub shrink_deck: bool,
    pub rule: Rule,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            number_of_decks: 6,
            penetration: 4.0 / 6.0,
            shrink_deck: true,
            rule: Rule::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_decks == 0 {
            return Err(ConfigError::InvalidNumberOfDecks(self.number_of_decks));
        }
        if !(self.penetration > 0.0 && self.penetration < 1.0) {
            return Err(ConfigError::InvalidPenetration(self.penetration));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_enum_str, Deserialize_enum_str)]
#[serde(rename_all = "lowercase")]
pub enum Move {
    Stay,
    Hit,
    Split,
    Double,
    Surrender,
}

impl Move {
    /// Number of cards the shoe must supply for this move.
    pub fn cards_to_draw(&self) -> usize {
        match self {
            Move::Hit | Move::Double => 1,
            Move::Split => 2,
            Move::Stay | Move::Surrender => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_enum_str, Deserialize_enum_str)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Push,
    Bust,
    Blackjack,
    Surrender,
}

/// Result of one player hand against the dealer. `payout` is the profit,
/// negative when the wager is lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub outcome: Outcome,
    pub payout: f64,
}
