use thiserror::Error;

use crate::simulation::{Rank, RoundPhase};
use crate::Move;

/// Errors raised by the round controller and the player state machine.
/// These are caller mistakes or an exhausted shoe; none of them are retried.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("{operation} is only allowed in {allowed} phase, current phase is {actual:?}")]
    WrongPhase {
        operation: &'static str,
        allowed: &'static str,
        actual: RoundPhase,
    },

    #[error("no cards remain in the shoe")]
    EmptyShoe,

    #[error("the shoe cannot supply a stacked {0}")]
    StackedCardUnavailable(Rank),

    #[error("player {0} does not exist")]
    NoSuchPlayer(usize),

    #[error("player has no active hand")]
    NoActiveHand,

    #[error("{0} is not a valid move for the active hand")]
    InvalidMove(Move),

    #[error("{mv} needs {expected} cards but {given} were given")]
    WrongCardCount {
        mv: Move,
        expected: usize,
        given: usize,
    },

    #[error("players still have hands to play")]
    PlayersStillActing,

    #[error("dealer has not finished playing")]
    DealerNotDone,

    #[error("a round needs at least one wager")]
    NoPlayers,

    #[error("invalid wager {0}")]
    InvalidWager(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("number_of_decks must be at least 1, got {0}")]
    InvalidNumberOfDecks(u8),

    #[error("penetration must be in (0, 1), got {0}")]
    InvalidPenetration(f64),
}
