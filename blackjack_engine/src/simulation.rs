pub mod dealer;
pub mod hand;
pub mod player;
pub mod shoe;

use std::str::FromStr;

use crate::{
    strategy::{Observation, Strategy},
    ConfigError, GameConfig, GameError, Move, Settlement,
};
use blackjack_macros::allowed_phase;
use rand::{rngs::StdRng, Rng, SeedableRng};
use strum_macros::EnumIter;

use self::{hand::Hand, player::Player, shoe::Shoe};

static RANK_TO_BLACKJACK_VALUE: [u8; 13] = [2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10, 1];
static RANK_SYMBOLS: [char; 13] = [
    '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

impl Suit {
    fn symbol(&self) -> char {
        match self {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter)]
pub enum Rank {
    Two = 0,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    /// Blackjack value of the rank. Ace is 1 here; the hand decides when it counts as 11.
    pub fn value(&self) -> u8 {
        RANK_TO_BLACKJACK_VALUE[*self as usize]
    }

    /// Value as shown to a player looking at the dealer's up-card, with Ace as 11.
    pub fn show_value(&self) -> u8 {
        match self {
            Rank::Ace => 11,
            _ => self.value(),
        }
    }

    /// Hi-Lo weight of the rank when it is seen.
    pub fn hi_lo(&self) -> i8 {
        match self.value() {
            2..=6 => 1,
            7..=9 => 0,
            _ => -1,
        }
    }

    pub fn is_ace(&self) -> bool {
        *self == Rank::Ace
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", RANK_SYMBOLS[*self as usize])
    }
}

impl TryFrom<char> for Rank {
    type Error = String;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        use strum::IntoEnumIterator;
        Rank::iter()
            .find(|rank| RANK_SYMBOLS[*rank as usize] == symbol.to_ascii_uppercase())
            .ok_or_else(|| format!("unknown rank {}", symbol))
    }
}

/// Represents a card in the real world with a rank and a suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn blackjack_value(&self) -> u8 {
        self.rank.value()
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.symbol())
    }
}

impl FromStr for Card {
    type Err = String;

    /// Parses cards written as rank then suit, e.g. `7H`, `TS` or `AD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(rank), Some(suit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(format!("invalid card {}", s));
        };
        let suit = match suit.to_ascii_uppercase() {
            'D' => Suit::Diamond,
            'C' => Suit::Club,
            'H' => Suit::Heart,
            'S' => Suit::Spade,
            _ => return Err(format!("unknown suit {}", suit)),
        };
        Ok(Card {
            rank: Rank::try_from(rank)?,
            suit,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Uninitialized,
    RoundInit,
    Dealt,
    PlayersActing,
    DealerActing,
    Settled,
}

/// Simulates a Blackjack table for one or more players against the house.
///
/// A round goes `init_round` -> `deal_init` -> `step_player` until every player
/// hand is complete -> `step_house(true)` once to reveal the hole card ->
/// `step_house(false)` until `house_done` -> `get_results`. The simulator never
/// picks a move; the caller does.
pub struct Simulator<R: Rng = StdRng> {
    config: GameConfig,
    rng: R,

    // Round state
    phase: RoundPhase,
    players: Vec<Player>,
    dealer_hand: Hand,
    hole_revealed: bool,
    dealer_blackjack: bool,

    // Shoe state
    shoe: Shoe,
    reset_deck_after_round: bool,
    number_of_rounds_played: u64,
    count: i32,
    true_count: f64,
}

impl Simulator<StdRng> {
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates a simulator whose every card draw is reproducible from `seed`.
    pub fn with_seed(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulator<R> {
    pub fn with_rng(config: &GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config: *config,
            rng,
            phase: RoundPhase::Uninitialized,
            players: Vec::new(),
            dealer_hand: Hand::new(),
            hole_revealed: false,
            dealer_blackjack: false,
            shoe: Shoe::new(
                config.number_of_decks,
                config.penetration,
                config.shrink_deck,
            ),
            reset_deck_after_round: false,
            number_of_rounds_played: 0,
            count: 0,
            true_count: 0.0,
        })
    }

    /// Starts a new round with one player per wager, discarding the previous
    /// round's hands. A reshuffle scheduled by the cut card happens here.
    /// Can be called in any phase; an unfinished round is abandoned.
    pub fn init_round(&mut self, wagers: &[f64]) -> Result<(), GameError> {
        if wagers.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if let Some(wager) = wagers.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return Err(GameError::InvalidWager(*wager));
        }

        if self.reset_deck_after_round {
            log::info!(
                "reshuffling shoe after round {}",
                self.number_of_rounds_played
            );
            self.shoe.reset();
            self.reset_deck_after_round = false;
        }

        let rule = self.config.rule;
        self.players = wagers.iter().map(|w| Player::new(*w, rule)).collect();
        self.dealer_hand.clear();
        self.hole_revealed = false;
        self.dealer_blackjack = false;
        self.number_of_rounds_played += 1;
        self.phase = RoundPhase::RoundInit;
        self.update_count();
        Ok(())
    }

    /// Deals two cards to every player and the dealer, one at a time, players
    /// first. The dealer's second card is the hole card. If the dealer has a
    /// natural, every player hand is completed immediately.
    #[allowed_phase(RoundInit)]
    pub fn deal_init(&mut self) -> Result<(), GameError> {
        for _ in 0..2 {
            for player_index in 0..self.players.len() {
                let card = self.draw_card()?;
                self.players[player_index].deal_card(card)?;
            }
            let card = self.draw_card()?;
            self.dealer_hand.add_card(card);
        }

        if self.dealer_hand.is_natural() {
            log::debug!("dealer natural, round {} ends early", self.number_of_rounds_played);
            self.dealer_blackjack = true;
            for player in &mut self.players {
                player.force_completion();
            }
        }

        self.phase = RoundPhase::Dealt;
        self.update_count();
        Ok(())
    }

    /// The dealer's up-card.
    #[allowed_phase(Dealt, PlayersActing, DealerActing, Settled)]
    pub fn get_house_show(&self) -> Result<Card, GameError> {
        Ok(self.dealer_hand.cards()[0])
    }

    /// The dealer's up-card value, with Ace as 11.
    pub fn house_show_value(&self) -> Result<u8, GameError> {
        Ok(self.get_house_show()?.rank.show_value())
    }

    /// Total and useable ace of the player's active hand, or None once all its
    /// hands are complete.
    pub fn get_value(&self, player_index: usize) -> Result<Option<(u8, bool)>, GameError> {
        Ok(self.player(player_index)?.get_value())
    }

    pub fn get_valid_moves(&self, player_index: usize) -> Result<Vec<Move>, GameError> {
        Ok(self.player(player_index)?.valid_moves())
    }

    pub fn is_move_valid(&self, player_index: usize, mv: Move) -> Result<bool, GameError> {
        Ok(self.player(player_index)?.is_move_valid(mv))
    }

    /// Applies a move to the player's active hand, drawing the cards it needs.
    /// An invalid move is rejected before anything is drawn.
    #[allowed_phase(Dealt, PlayersActing)]
    pub fn step_player(&mut self, player_index: usize, mv: Move) -> Result<(), GameError> {
        let player = self.player(player_index)?;
        if player.is_done() {
            return Err(GameError::NoActiveHand);
        }
        if !player.is_move_valid(mv) {
            return Err(GameError::InvalidMove(mv));
        }

        let mut cards = Vec::with_capacity(mv.cards_to_draw());
        for _ in 0..mv.cards_to_draw() {
            cards.push(self.draw_card()?);
        }
        self.players[player_index].step(mv, &cards)?;

        self.phase = RoundPhase::PlayersActing;
        self.update_count();
        Ok(())
    }

    /// Plays the house. With `only_reveal_card` the hole card is only turned
    /// over, which feeds it into the count. Otherwise one card is drawn if the
    /// dealer policy says to hit, so callers loop until `house_done`. Safe to
    /// call once the dealer is done.
    #[allowed_phase(Dealt, PlayersActing, DealerActing)]
    pub fn step_house(&mut self, only_reveal_card: bool) -> Result<(), GameError> {
        if !self.players_done() {
            return Err(GameError::PlayersStillActing);
        }

        self.phase = RoundPhase::DealerActing;
        self.hole_revealed = true;
        if !only_reveal_card && !self.house_done() {
            let card = self.draw_card()?;
            self.dealer_hand.add_card(card);
        }

        self.update_count();
        Ok(())
    }

    pub fn house_done(&self) -> bool {
        dealer::is_done(&self.dealer_hand, &self.config.rule)
    }

    pub fn players_done(&self) -> bool {
        self.players.iter().all(|player| player.is_done())
    }

    /// Settles every hand of every player against the dealer's final hand.
    #[allowed_phase(DealerActing, Settled)]
    pub fn get_results(&mut self) -> Result<Vec<Vec<Settlement>>, GameError> {
        if !self.hole_revealed || !self.house_done() {
            return Err(GameError::DealerNotDone);
        }

        let results: Vec<Vec<Settlement>> = self
            .players
            .iter()
            .map(|player| player.get_result(&self.dealer_hand))
            .collect();
        log::debug!(
            "round {} settled, dealer {} with {} cards",
            self.number_of_rounds_played,
            self.dealer_hand.total(),
            self.dealer_hand.len()
        );

        self.phase = RoundPhase::Settled;
        Ok(results)
    }

    /// Rebuilds the shoe so that the given ranks are drawn first, in order.
    /// Useful to reach rare situations on purpose. Not allowed mid-round.
    #[allowed_phase(Uninitialized, RoundInit, Settled)]
    pub fn shuffle_with_firsts(&mut self, firsts: &[Rank]) -> Result<(), GameError> {
        self.shoe.shuffle_with_firsts(firsts)?;
        self.reset_deck_after_round = false;
        self.update_count();
        Ok(())
    }

    /// Resets the entire game: fresh shoe, no players, round counter at zero.
    pub fn reset_game(&mut self) {
        self.shoe.reset();
        self.players.clear();
        self.dealer_hand.clear();
        self.hole_revealed = false;
        self.dealer_blackjack = false;
        self.reset_deck_after_round = false;
        self.number_of_rounds_played = 0;
        self.phase = RoundPhase::Uninitialized;
        self.update_count();
    }

    /// Snapshot of what a player sees when deciding on its active hand.
    pub fn observe(&self, player_index: usize) -> Result<Observation, GameError> {
        let player = self.player(player_index)?;
        let hand_index = player.current_hand_index().ok_or(GameError::NoActiveHand)?;
        let (total, useable_ace) = player.get_value().ok_or(GameError::NoActiveHand)?;
        Ok(Observation {
            player_index,
            hand_index,
            total,
            useable_ace,
            house_show: self.get_house_show()?,
            valid_moves: player.valid_moves(),
            count: self.count,
            true_count: self.true_count,
        })
    }

    /// Plays a whole round, asking `strategy` for every player decision.
    pub fn play_round<T: Strategy, U: SimulatorEventHandler>(
        &mut self,
        wagers: &[f64],
        strategy: &mut T,
        handler: &mut U,
    ) -> Result<Vec<Vec<Settlement>>, GameError> {
        self.init_round(wagers)?;
        handler.on_round_begin(self.number_of_rounds_played, &self.shoe);

        self.deal_init()?;
        handler.on_deal_cards(&self.players, self.get_house_show()?);
        if self.dealer_blackjack {
            handler.on_dealer_blackjack();
        }

        for player_index in 0..self.players.len() {
            while !self.players[player_index].is_done() {
                let observation = self.observe(player_index)?;
                let mv = strategy.choose_move(&observation);
                handler.on_make_decision(player_index, observation.hand_index, mv);
                self.step_player(player_index, mv)?;
            }
        }

        self.step_house(true)?;
        while !self.house_done() {
            self.step_house(false)?;
        }

        let results = self.get_results()?;
        handler.on_summary_round(&self.players, &self.dealer_hand, &results);
        Ok(results)
    }

    pub fn player(&self, player_index: usize) -> Result<&Player, GameError> {
        self.players
            .get(player_index)
            .ok_or(GameError::NoSuchPlayer(player_index))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn dealer_hand(&self) -> &Hand {
        &self.dealer_hand
    }

    pub fn dealer_blackjack(&self) -> bool {
        self.dealer_blackjack
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Running Hi-Lo count of every card seen so far in this shoe.
    pub fn count(&self) -> i32 {
        self.count
    }

    /// Running count per 52 cards left in the shoe.
    pub fn true_count(&self) -> f64 {
        self.true_count
    }

    pub fn number_of_rounds_played(&self) -> u64 {
        self.number_of_rounds_played
    }

    /// True once the cut card was reached; the shoe is rebuilt at the next `init_round`.
    pub fn reset_deck_after_round(&self) -> bool {
        self.reset_deck_after_round
    }

    fn draw_card(&mut self) -> Result<Card, GameError> {
        let card = self.shoe.select_card(&mut self.rng)?;
        if self.shoe.reached_cut_card() && !self.reset_deck_after_round {
            log::info!(
                "cut card reached with {} cards left, reshuffling after this round",
                self.shoe.remaining()
            );
            self.reset_deck_after_round = true;
        }
        Ok(card)
    }

    /// The count is read off the cards left in the shoe: whatever is missing
    /// from a balanced shoe has been seen. The hole card is treated as still in
    /// the shoe until it is revealed.
    fn update_count(&mut self) {
        let mut unseen = self.shoe.get_card_count().hi_lo();
        if self.shoe.is_depleting() && !self.hole_revealed {
            if let Some(hole) = self.dealer_hand.cards().get(1) {
                unseen += hole.rank.hi_lo() as i32;
            }
        }
        self.count = -unseen;

        let remaining = self.shoe.remaining();
        self.true_count = if remaining == 0 {
            0.0
        } else {
            self.count as f64 * 52.0 / remaining as f64
        };
    }
}

/// Callbacks fired by `Simulator::play_round`. Every method defaults to doing nothing.
pub trait SimulatorEventHandler {
    fn on_round_begin(&mut self, _round: u64, _shoe: &Shoe) {}
    fn on_deal_cards(&mut self, _players: &[Player], _house_show: Card) {}
    fn on_dealer_blackjack(&mut self) {}
    fn on_make_decision(&mut self, _player_index: usize, _hand_index: usize, _mv: Move) {}
    fn on_summary_round(
        &mut self,
        _players: &[Player],
        _dealer_hand: &Hand,
        _results: &[Vec<Settlement>],
    ) {
    }
}
