use blackjack_engine::{
    strategy::{Observation, Strategy},
    Move,
};
use rand::{seq::SliceRandom, Rng};

/// Plays like the house: hit below 17, otherwise stay.
#[derive(Debug, Default, Clone, Copy)]
pub struct MimicDealer;

impl Strategy for MimicDealer {
    fn choose_move(&mut self, observation: &Observation) -> Move {
        let preferred = if observation.total < 17 {
            Move::Hit
        } else {
            Move::Stay
        };
        if observation.valid_moves.contains(&preferred) {
            return preferred;
        }
        // Split aces that may not be hit leave only another split.
        observation
            .valid_moves
            .first()
            .copied()
            .unwrap_or(Move::Stay)
    }
}

/// Picks uniformly among the valid moves.
#[derive(Debug, Clone)]
pub struct RandomMoves<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomMoves<R> {
    pub fn new(rng: R) -> Self {
        RandomMoves { rng }
    }
}

impl<R: Rng> Strategy for RandomMoves<R> {
    fn choose_move(&mut self, observation: &Observation) -> Move {
        observation
            .valid_moves
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Move::Stay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_engine::simulation::Card;
    use rand::{rngs::StdRng, SeedableRng};

    fn observation(total: u8, valid_moves: Vec<Move>) -> Observation {
        Observation {
            player_index: 0,
            hand_index: 0,
            total,
            useable_ace: false,
            house_show: "TS".parse::<Card>().unwrap(),
            valid_moves,
            count: 0,
            true_count: 0.0,
        }
    }

    #[test]
    fn mimic_dealer_hits_below_seventeen() {
        let all = vec![Move::Stay, Move::Hit, Move::Double];
        assert_eq!(MimicDealer.choose_move(&observation(16, all.clone())), Move::Hit);
        assert_eq!(MimicDealer.choose_move(&observation(17, all)), Move::Stay);
        assert_eq!(
            MimicDealer.choose_move(&observation(12, vec![Move::Split])),
            Move::Split
        );
    }

    #[test]
    fn random_moves_stay_valid() {
        let mut strategy = RandomMoves::new(StdRng::seed_from_u64(0));
        let valid = vec![Move::Stay, Move::Surrender];
        for _ in 0..100 {
            let mv = strategy.choose_move(&observation(15, valid.clone()));
            assert!(valid.contains(&mv));
        }
    }
}
