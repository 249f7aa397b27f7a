use crate::{simulation::Card, Move};

/// What a player sees when it has to decide on its active hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub player_index: usize,
    pub hand_index: usize,
    pub total: u8,
    pub useable_ace: bool,
    pub house_show: Card,
    pub valid_moves: Vec<Move>,
    pub count: i32,
    pub true_count: f64,
}

/// Picks moves for `Simulator::play_round`. The move returned must be one of
/// `observation.valid_moves`, otherwise the round fails with `InvalidMove`.
pub trait Strategy {
    fn choose_move(&mut self, observation: &Observation) -> Move;
}
