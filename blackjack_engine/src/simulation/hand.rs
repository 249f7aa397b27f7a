use super::Card;

/// An ordered group of cards with its blackjack total.
///
/// `total` and `useable_ace` are recomputed on every change to the cards and
/// cannot be set from outside, so they always agree with the cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hand {
    cards: Vec<Card>,
    total: u8,
    useable_ace: bool,
}

impl Hand {
    pub fn new() -> Hand {
        Hand {
            cards: Vec::with_capacity(3),
            total: 0,
            useable_ace: false,
        }
    }

    pub fn from_cards(cards: &[Card]) -> Hand {
        let mut hand = Hand::new();
        for card in cards {
            hand.add_card(*card);
        }
        hand
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
        self.update_value();
    }

    /// Takes the last card back out. Only used when splitting a pair.
    pub fn remove_last(&mut self) -> Option<Card> {
        let card = self.cards.pop();
        self.update_value();
        card
    }

    pub fn clear(&mut self) {
        self.cards.clear();
        self.update_value();
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    /// True if an Ace is counted as 11 and the total is still below 21.
    pub fn useable_ace(&self) -> bool {
        self.useable_ace
    }

    pub fn bust(&self) -> bool {
        self.total > 21
    }

    /// Two cards totalling 21. Whether this pays as blackjack also depends on
    /// the hand not coming from a split, which only the player knows.
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && self.total == 21
    }

    fn update_value(&mut self) {
        let sum: u8 = self.cards.iter().map(|card| card.blackjack_value()).sum();
        let has_ace = self.cards.iter().any(|card| card.rank.is_ace());
        if has_ace && sum <= 11 {
            self.total = sum + 10;
            self.useable_ace = self.total < 21;
        } else {
            self.total = sum;
            self.useable_ace = false;
        }
    }
}
