use std::collections::VecDeque;

use crate::{CardCount, GameError};

use super::{Card, Rank, Suit};

use rand::Rng;
use strum::IntoEnumIterator;

/// Represents a shoe in the real world.
///
/// Cards are drawn uniformly at random from what is left. A depleting shoe
/// removes every card it deals; a non-depleting one behaves like an infinite
/// shoe where every draw is independent and nothing ever runs out.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    cut_card: usize,
    deplete: bool,
    cards: Vec<Card>,
    /// Cards arranged to be dealt before any random draw.
    firsts: VecDeque<Card>,
    /// Every card still to be dealt, stacked ones included.
    card_count: CardCount,
}

impl Shoe {
    /// Creates a new full shoe. The cut card sits so that once
    /// `floor(total * (1 - penetration))` cards or fewer remain, the shoe asks to
    /// be reshuffled.
    pub fn new(number_of_decks: u8, penetration: f64, deplete: bool) -> Shoe {
        let total = number_of_decks as usize * 52;
        Shoe {
            number_of_decks,
            cut_card: (total as f64 * (1.0 - penetration)).floor() as usize,
            deplete,
            cards: ordered_cards(number_of_decks),
            firsts: VecDeque::new(),
            card_count: CardCount::with_number_of_decks(number_of_decks),
        }
    }

    /// Returns every dealt card back into the shoe.
    pub fn reset(&mut self) {
        self.cards = ordered_cards(self.number_of_decks);
        self.firsts.clear();
        self.card_count = CardCount::with_number_of_decks(self.number_of_decks);
    }

    /// Returns the dealt cards back into the shoe, making sure cards of the given
    /// ranks are dealt first, in order. On error the shoe is left full and unstacked.
    pub fn shuffle_with_firsts(&mut self, firsts: &[Rank]) -> Result<(), GameError> {
        self.reset();
        for rank in firsts {
            let Some(position) = self.cards.iter().position(|card| card.rank == *rank) else {
                self.reset();
                return Err(GameError::StackedCardUnavailable(*rank));
            };
            let card = if self.deplete {
                self.cards.swap_remove(position)
            } else {
                self.cards[position]
            };
            self.firsts.push_back(card);
        }
        Ok(())
    }

    /// Deals a card. Fails if nothing is left to draw from.
    pub fn select_card<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Card, GameError> {
        if let Some(card) = self.firsts.pop_front() {
            if self.deplete {
                self.card_count.remove_card(card.rank);
            }
            return Ok(card);
        }
        if self.cards.is_empty() {
            return Err(GameError::EmptyShoe);
        }

        let index = rng.gen_range(0..self.cards.len());
        if !self.deplete {
            return Ok(self.cards[index]);
        }
        let card = self.cards.swap_remove(index);
        self.card_count.remove_card(card.rank);
        Ok(card)
    }

    /// Checks if the cut card has been reached. Never true for a non-depleting shoe.
    pub fn reached_cut_card(&self) -> bool {
        self.deplete && self.remaining() <= self.cut_card
    }

    pub fn remaining(&self) -> usize {
        self.card_count.get_total() as usize
    }

    pub fn is_depleting(&self) -> bool {
        self.deplete
    }

    pub fn get_cut_card(&self) -> usize {
        self.cut_card
    }

    pub fn get_card_count(&self) -> &CardCount {
        &self.card_count
    }
}

fn ordered_cards(number_of_decks: u8) -> Vec<Card> {
    let mut cards = Vec::with_capacity(number_of_decks as usize * 52);
    for _ in 0..number_of_decks {
        for suit in Suit::iter() {
            for rank in Rank::iter() {
                cards.push(Card { rank, suit });
            }
        }
    }
    cards
}
