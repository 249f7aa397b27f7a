use std::ops::Index;

use strum::IntoEnumIterator;

use crate::simulation::Rank;

/// Number of cards of each rank in a group of cards, e.g. what is left in a shoe.
///
/// Alongside the per-rank counts it keeps the Hi-Lo tally of the cards it holds
/// (2-6 count +1, 7-9 count 0, tens and Aces count -1), updated on every add and
/// remove so it never has to be recomputed from scratch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardCount {
    counts: [u16; 13],
    total: u16,
    hi_lo: i32,
}

impl CardCount {
    pub fn new(counts: &[u16; 13]) -> CardCount {
        let mut card_count = CardCount {
            counts: *counts,
            total: 0,
            hi_lo: 0,
        };

        card_count.propagate_counts();

        card_count
    }

    pub fn with_number_of_decks(number_of_decks: u8) -> CardCount {
        Self::new(&[number_of_decks as u16 * 4; 13])
    }

    pub fn add_card(&mut self, rank: Rank) {
        self.counts[rank as usize] += 1;
        self.total += 1;
        self.hi_lo += rank.hi_lo() as i32;
    }

    /// Removes a card of the given rank. Returns false, leaving the counts
    /// untouched, if no card of that rank is left.
    pub fn remove_card(&mut self, rank: Rank) -> bool {
        let index = rank as usize;
        if self.counts[index] == 0 {
            return false;
        }
        self.counts[index] -= 1;
        self.total -= 1;
        self.hi_lo -= rank.hi_lo() as i32;
        true
    }

    pub fn get_total(&self) -> u16 {
        self.total
    }

    /// Hi-Lo tally of the cards held here.
    pub fn hi_lo(&self) -> i32 {
        self.hi_lo
    }

    fn propagate_counts(&mut self) {
        self.total = 0;
        self.hi_lo = 0;
        for rank in Rank::iter() {
            let count = self.counts[rank as usize];
            self.total += count;
            self.hi_lo += count as i32 * rank.hi_lo() as i32;
        }
    }
}

impl Index<Rank> for CardCount {
    type Output = u16;
    fn index(&self, rank: Rank) -> &Self::Output {
        &self.counts[rank as usize]
    }
}
