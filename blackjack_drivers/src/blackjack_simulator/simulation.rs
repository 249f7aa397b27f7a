use self::private::Statistics;
use blackjack_drivers::{
    strategies::{MimicDealer, RandomMoves},
    Config, StrategyKind,
};
use blackjack_engine::{
    simulation::{hand::Hand, player::Player, Simulator, SimulatorEventHandler},
    strategy::Strategy,
    ConfigError, GameConfig, GameError, Outcome, Settlement,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

pub use self::private::Statistics as Summary;

mod private {
    use blackjack_engine::Outcome;

    const OUTCOMES: [Outcome; 6] = [
        Outcome::Win,
        Outcome::Blackjack,
        Outcome::Push,
        Outcome::Loss,
        Outcome::Bust,
        Outcome::Surrender,
    ];

    #[derive(Debug, Clone, Copy, Default)]
    pub struct Statistics {
        rounds: u64,
        hands: u64,
        outcomes: [u64; 6],

        total_bet: f64,
        current_money: f64,
        min_money: f64,
    }

    impl Statistics {
        pub fn record_round(&mut self) {
            self.rounds += 1;
        }

        pub fn record_hand(&mut self, outcome: Outcome, payout: f64) {
            self.hands += 1;
            if let Some(index) = OUTCOMES.iter().position(|o| *o == outcome) {
                self.outcomes[index] += 1;
            }
            self.current_money += payout;
            if self.min_money > self.current_money {
                self.min_money = self.current_money;
            }
        }

        pub fn bet_money(&mut self, money: f64) {
            self.total_bet += money;
        }

        /// Adds the counters of another run. The running minimum of the merged
        /// runs is not known, so the lower of the two minimums is kept.
        pub fn merge(&mut self, other: &Statistics) {
            self.rounds += other.rounds;
            self.hands += other.hands;
            for (mine, theirs) in self.outcomes.iter_mut().zip(other.outcomes) {
                *mine += theirs;
            }
            self.total_bet += other.total_bet;
            self.current_money += other.current_money;
            self.min_money = self.min_money.min(other.min_money);
        }

        pub fn get_rounds(&self) -> u64 {
            self.rounds
        }

        pub fn get_hands(&self) -> u64 {
            self.hands
        }

        pub fn get_outcome_count(&self, outcome: Outcome) -> u64 {
            OUTCOMES
                .iter()
                .position(|o| *o == outcome)
                .map_or(0, |index| self.outcomes[index])
        }

        pub fn get_current_money(&self) -> f64 {
            self.current_money
        }

        pub fn get_total_bet(&self) -> f64 {
            self.total_bet
        }

        pub fn get_min_money(&self) -> f64 {
            self.min_money
        }

        pub fn get_rate(&self) -> f64 {
            if self.total_bet == 0.0 {
                0.0
            } else {
                self.current_money / self.total_bet
            }
        }

        pub fn outcomes(&self) -> impl Iterator<Item = (Outcome, u64)> + '_ {
            OUTCOMES.iter().copied().zip(self.outcomes.iter().copied())
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("table {thread_index}: {source}")]
    Game {
        thread_index: usize,
        source: GameError,
    },
    #[error("table {0} panicked")]
    Panicked(usize),
}

#[derive(Debug, Default)]
struct Handler {
    thread_index: usize,
    stat: Statistics,
}

impl SimulatorEventHandler for Handler {
    fn on_dealer_blackjack(&mut self) {
        log::trace!("thread {}: dealer blackjack", self.thread_index);
    }

    fn on_summary_round(
        &mut self,
        players: &[Player],
        dealer_hand: &Hand,
        results: &[Vec<Settlement>],
    ) {
        self.stat.record_round();
        for (player, settlements) in players.iter().zip(results) {
            if player.is_surrendered() {
                self.stat.bet_money(player.base_wager());
            } else {
                self.stat.bet_money(player.wagers().iter().sum());
            }
            for settlement in settlements {
                self.stat.record_hand(settlement.outcome, settlement.payout);
            }
        }

        if log::log_enabled!(log::Level::Trace) {
            let dealer_cards: Vec<String> =
                dealer_hand.cards().iter().map(|c| c.to_string()).collect();
            log::trace!(
                "thread {} round {}: dealer {} ({})",
                self.thread_index,
                self.stat.get_rounds(),
                dealer_cards.join(" "),
                dealer_hand.total()
            );
        }
    }
}

/// Plays `rounds` rounds on `number_of_threads` independent tables, one shoe
/// each, and merges their statistics.
pub fn simulate(config: &Config) -> Result<Summary, SimulationError> {
    let game_config = GameConfig::try_from(config)?;
    let simulator_config = &config.blackjack_simulator;
    let number_of_threads = simulator_config.resolved_number_of_threads();
    log::info!(
        "{} threads x {} rounds, {} players, strategy {}",
        number_of_threads,
        simulator_config.rounds,
        simulator_config.number_of_players,
        simulator_config.strategy
    );

    let outcomes: Vec<Result<Statistics, SimulationError>> = std::thread::scope(|scope| {
        let threads: Vec<_> = (0..number_of_threads)
            .map(|thread_index| {
                let game_config = &game_config;
                scope.spawn(move || play_table(game_config, config, thread_index))
            })
            .collect();
        threads
            .into_iter()
            .enumerate()
            .map(|(thread_index, thread)| {
                thread
                    .join()
                    .unwrap_or(Err(SimulationError::Panicked(thread_index)))
            })
            .collect()
    });

    let mut summary = Statistics::default();
    for outcome in outcomes {
        summary.merge(&outcome?);
    }
    Ok(summary)
}

fn play_table(
    game_config: &GameConfig,
    config: &Config,
    thread_index: usize,
) -> Result<Statistics, SimulationError> {
    let simulator_config = &config.blackjack_simulator;
    let mut rng = match simulator_config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(thread_index as u64)),
        None => StdRng::from_entropy(),
    };
    let strategy_rng = StdRng::seed_from_u64(rng.gen());
    let mut simulator = Simulator::with_rng(game_config, rng)?;
    let wagers = vec![simulator_config.wager; simulator_config.number_of_players];
    let mut handler = Handler {
        thread_index,
        ..Default::default()
    };

    let played = match simulator_config.strategy {
        StrategyKind::MimicDealer => play_rounds(
            &mut simulator,
            &wagers,
            simulator_config.rounds,
            &mut MimicDealer,
            &mut handler,
        ),
        StrategyKind::RandomMoves => play_rounds(
            &mut simulator,
            &wagers,
            simulator_config.rounds,
            &mut RandomMoves::new(strategy_rng),
            &mut handler,
        ),
    };
    played.map_err(|source| SimulationError::Game {
        thread_index,
        source,
    })?;

    log::debug!(
        "thread {} done, rate {:.4}",
        thread_index,
        handler.stat.get_rate()
    );
    Ok(handler.stat)
}

fn play_rounds<T: Strategy>(
    simulator: &mut Simulator,
    wagers: &[f64],
    rounds: u64,
    strategy: &mut T,
    handler: &mut Handler,
) -> Result<(), GameError> {
    for _ in 0..rounds {
        simulator.play_round(wagers, strategy, handler)?;
    }
    Ok(())
}

pub fn print_summary(summary: &Summary) {
    println!("Rounds: {}. Hands: {}.", summary.get_rounds(), summary.get_hands());
    for (outcome, count) in summary.outcomes() {
        let share = if summary.get_hands() == 0 {
            0.0
        } else {
            count as f64 / summary.get_hands() as f64
        };
        println!("{:<10} {:>12} {:>8.2}%", outcome, count, share * 100.0);
    }
    println!(
        "Hands won: {}.",
        summary.get_outcome_count(Outcome::Win) + summary.get_outcome_count(Outcome::Blackjack)
    );
    println!(
        "Money: {:.2}. Total bet: {:.2}. Rate: {:.2}%. Min money: {:.2}.",
        summary.get_current_money(),
        summary.get_total_bet(),
        summary.get_rate() * 100.0,
        summary.get_min_money(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use blackjack_drivers::parse_config_from_str;

    fn config(strategy: &str, seed: u64) -> Config {
        parse_config_from_str(&format!(
            r#"
blackjack_simulator:
  number_of_threads: 2
  rounds: 200
  wager: 10.0
  number_of_players: 2
  strategy: {}
  seed: {}
"#,
            strategy, seed
        ))
        .unwrap()
    }

    #[test]
    fn every_hand_is_counted() {
        let summary = simulate(&config("mimic_dealer", 1)).unwrap();
        assert_eq!(summary.get_rounds(), 400);
        assert!(summary.get_hands() >= 800);
        let counted: u64 = summary.outcomes().map(|(_, count)| count).sum();
        assert_eq!(counted, summary.get_hands());
        assert_eq!(summary.get_outcome_count(Outcome::Surrender), 0);
        assert!(summary.get_total_bet() >= 8000.0);
    }

    #[test]
    fn seeded_runs_repeat() {
        let first = simulate(&config("random_moves", 5)).unwrap();
        let second = simulate(&config("random_moves", 5)).unwrap();
        assert_eq!(first.get_hands(), second.get_hands());
        assert_eq!(first.get_current_money(), second.get_current_money());
    }
}
