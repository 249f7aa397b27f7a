use crate::{GameError, Move, Outcome, Rule, Settlement};

use super::{hand::Hand, Card};

/// One hand a player is playing together with what is riding on it.
#[derive(Debug, Clone)]
struct HandWager {
    hand: Hand,
    wager: f64,
    complete: bool,
}

impl HandWager {
    fn new(hand: Hand, wager: f64) -> Self {
        HandWager {
            hand,
            wager,
            complete: false,
        }
    }
}

/// All hands of one seat. Starts with one empty hand; splits add more right
/// after the hand being split. The active hand is always the first one not yet
/// complete.
#[derive(Debug, Clone)]
pub struct Player {
    rule: Rule,
    base_wager: f64,
    hand_wagers: Vec<HandWager>,
    surrendered: bool,
    aces_split: bool,
}

impl Player {
    pub fn new(wager: f64, rule: Rule) -> Player {
        Player {
            rule,
            base_wager: wager,
            hand_wagers: vec![HandWager::new(Hand::new(), wager)],
            surrendered: false,
            aces_split: false,
        }
    }

    pub fn current_hand_index(&self) -> Option<usize> {
        self.hand_wagers.iter().position(|hw| !hw.complete)
    }

    pub fn is_done(&self) -> bool {
        self.current_hand_index().is_none()
    }

    /// Deals a card to the active hand, which completes once it reaches 21 or more.
    pub fn deal_card(&mut self, card: Card) -> Result<(), GameError> {
        let index = self.current_hand_index().ok_or(GameError::NoActiveHand)?;
        let hand_wager = &mut self.hand_wagers[index];
        hand_wager.hand.add_card(card);
        hand_wager.complete = hand_wager.hand.total() >= 21;
        Ok(())
    }

    /// Completes every hand, e.g. when the dealer turns out to have a natural.
    pub fn force_completion(&mut self) {
        for hand_wager in &mut self.hand_wagers {
            hand_wager.complete = true;
        }
    }

    /// Total and useable ace of the active hand.
    pub fn get_value(&self) -> Option<(u8, bool)> {
        let hand = &self.hand_wagers[self.current_hand_index()?].hand;
        Some((hand.total(), hand.useable_ace()))
    }

    pub fn valid_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(5);
        let Some(index) = self.current_hand_index() else {
            return moves;
        };

        let hand = &self.hand_wagers[index].hand;
        let two_cards = hand.len() == 2;
        let single_hand = self.hand_wagers.len() == 1;

        let can_hit = !self.aces_split || self.rule.hit_after_split_aces;
        let can_stay = can_hit;
        let can_split = two_cards && self.is_pair(hand);
        let can_surrender = two_cards && single_hand && self.rule.allow_surrender;
        let can_double =
            two_cards && (single_hand || self.rule.double_after_split) && can_hit;

        if hand.total() < 21 {
            if can_stay {
                moves.push(Move::Stay);
            }
            if can_hit {
                moves.push(Move::Hit);
            }
            if can_split {
                moves.push(Move::Split);
            }
            if can_surrender {
                moves.push(Move::Surrender);
            }
            if can_double {
                moves.push(Move::Double);
            }
        } else if hand.total() == 21 {
            moves.push(Move::Stay);
        }

        moves
    }

    pub fn is_move_valid(&self, mv: Move) -> bool {
        self.valid_moves().contains(&mv)
    }

    /// Applies `mv` to the active hand. `cards` must hold exactly the cards the
    /// move draws: one for hit and double, two for split, none otherwise.
    pub fn step(&mut self, mv: Move, cards: &[Card]) -> Result<(), GameError> {
        let index = self.current_hand_index().ok_or(GameError::NoActiveHand)?;
        if cards.len() != mv.cards_to_draw() {
            return Err(GameError::WrongCardCount {
                mv,
                expected: mv.cards_to_draw(),
                given: cards.len(),
            });
        }
        if !self.is_move_valid(mv) {
            return Err(GameError::InvalidMove(mv));
        }

        match mv {
            Move::Hit => self.deal_card(cards[0])?,
            Move::Stay => self.hand_wagers[index].complete = true,
            Move::Double => {
                let hand_wager = &mut self.hand_wagers[index];
                hand_wager.wager *= 2.0;
                hand_wager.hand.add_card(cards[0]);
                hand_wager.complete = true;
            }
            Move::Split => self.split(index, cards[0], cards[1]),
            Move::Surrender => {
                self.surrendered = true;
                self.hand_wagers[index].complete = true;
            }
        }
        Ok(())
    }

    /// Settles every hand against the dealer's final hand.
    pub fn get_result(&self, dealer_hand: &Hand) -> Vec<Settlement> {
        if self.surrendered {
            return vec![Settlement {
                outcome: Outcome::Surrender,
                payout: -self.base_wager / 2.0,
            }];
        }

        let dealer_total = dealer_hand.total();
        let dealer_natural = dealer_hand.is_natural();
        let push_on_22 = self.rule.push_dealer22 && dealer_total == 22;
        let single_hand = self.hand_wagers.len() == 1;

        self.hand_wagers
            .iter()
            .map(|hw| {
                let total = hw.hand.total();
                // 21 after a split is just 21, even on the first two cards.
                let natural = hw.hand.is_natural() && single_hand;
                let outcome = if total > 21 {
                    Outcome::Bust
                } else if natural {
                    if dealer_natural {
                        Outcome::Push
                    } else {
                        Outcome::Blackjack
                    }
                } else if dealer_natural {
                    Outcome::Loss
                } else if dealer_total > 21 {
                    if push_on_22 {
                        Outcome::Push
                    } else {
                        Outcome::Win
                    }
                } else if total > dealer_total {
                    Outcome::Win
                } else if total < dealer_total {
                    Outcome::Loss
                } else {
                    Outcome::Push
                };

                let payout = match outcome {
                    Outcome::Win => hw.wager,
                    Outcome::Blackjack => hw.wager * self.rule.payout_blackjack(),
                    Outcome::Loss | Outcome::Bust => -hw.wager,
                    Outcome::Push => 0.0,
                    Outcome::Surrender => -hw.wager / 2.0,
                };
                Settlement { outcome, payout }
            })
            .collect()
    }

    pub fn number_of_hands(&self) -> usize {
        self.hand_wagers.len()
    }

    pub fn hand(&self, index: usize) -> Option<&Hand> {
        self.hand_wagers.get(index).map(|hw| &hw.hand)
    }

    pub fn hands(&self) -> impl Iterator<Item = &Hand> {
        self.hand_wagers.iter().map(|hw| &hw.hand)
    }

    pub fn wagers(&self) -> Vec<f64> {
        self.hand_wagers.iter().map(|hw| hw.wager).collect()
    }

    pub fn is_complete(&self, index: usize) -> Option<bool> {
        self.hand_wagers.get(index).map(|hw| hw.complete)
    }

    pub fn base_wager(&self) -> f64 {
        self.base_wager
    }

    pub fn is_surrendered(&self) -> bool {
        self.surrendered
    }

    pub fn aces_split(&self) -> bool {
        self.aces_split
    }

    fn is_pair(&self, hand: &Hand) -> bool {
        match hand.cards() {
            [first, second] => {
                first.rank == second.rank
                    || (self.rule.split_any_ten
                        && first.blackjack_value() == 10
                        && second.blackjack_value() == 10)
            }
            _ => false,
        }
    }

    /// Moves the second card of the hand at `index` into a new hand right after
    /// it, then deals one card to each.
    fn split(&mut self, index: usize, first: Card, second: Card) {
        let split_aces = self.hand_wagers[index]
            .hand
            .cards()
            .iter()
            .all(|card| card.rank.is_ace());
        if split_aces {
            self.aces_split = true;
        }

        let wager = self.hand_wagers[index].wager;
        let mut new_hand = Hand::new();
        if let Some(card) = self.hand_wagers[index].hand.remove_last() {
            new_hand.add_card(card);
        }
        self.hand_wagers
            .insert(index + 1, HandWager::new(new_hand, wager));

        for (offset, card) in [first, second].into_iter().enumerate() {
            let hand_wager = &mut self.hand_wagers[index + offset];
            hand_wager.hand.add_card(card);
            hand_wager.complete = hand_wager.hand.total() >= 21
                || (split_aces && !self.rule.hit_after_split_aces && !card.rank.is_ace());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(card: &str) -> Card {
        card.parse().unwrap()
    }

    fn player_with(cards: &[&str], rule: Rule) -> Player {
        let mut player = Player::new(10.0, rule);
        for c in cards {
            player.deal_card(card(c)).unwrap();
        }
        player
    }

    fn dealer(cards: &[&str]) -> Hand {
        let cards: Vec<Card> = cards.iter().map(|c| card(c)).collect();
        Hand::from_cards(&cards)
    }

    fn single(player: &Player, dealer_cards: &[&str]) -> Settlement {
        let results = player.get_result(&dealer(dealer_cards));
        assert_eq!(results.len(), 1);
        results[0]
    }

    #[test]
    fn pair_allows_every_move() {
        let player = player_with(&["7H", "7D"], Rule::default());
        assert_eq!(
            player.valid_moves(),
            vec![Move::Stay, Move::Hit, Move::Split, Move::Surrender, Move::Double]
        );

        let player = player_with(&["7H", "8D"], Rule::default());
        assert_eq!(
            player.valid_moves(),
            vec![Move::Stay, Move::Hit, Move::Surrender, Move::Double]
        );

        let rule = Rule {
            allow_surrender: false,
            ..Default::default()
        };
        let player = player_with(&["7H", "7D"], rule);
        assert!(!player.is_move_valid(Move::Surrender));
    }

    #[test]
    fn ten_valued_pairs_split_only_with_rule() {
        let player = player_with(&["KH", "QD"], Rule::default());
        assert!(!player.is_move_valid(Move::Split));
        let rule = Rule {
            split_any_ten: true,
            ..Default::default()
        };
        let player = player_with(&["KH", "QD"], rule);
        assert!(player.is_move_valid(Move::Split));
        let player = player_with(&["KH", "9D"], rule);
        assert!(!player.is_move_valid(Move::Split));
    }

    #[test]
    fn twenty_one_only_stays() {
        let mut player = player_with(&["5H", "6D"], Rule::default());
        player.step(Move::Hit, &[card("KS")]).unwrap();
        assert!(player.is_done());
        assert!(player.valid_moves().is_empty());
        assert_eq!(player.get_value(), None);
    }

    #[test]
    fn soft_seventeen_then_bust() {
        let mut player = player_with(&["AH", "6D"], Rule::default());
        assert_eq!(player.get_value(), Some((17, true)));
        assert!(player.is_move_valid(Move::Stay));

        player.step(Move::Hit, &[card("KS")]).unwrap();
        assert_eq!(player.get_value(), Some((17, false)));
        assert!(!player.is_move_valid(Move::Double));
        assert!(!player.is_move_valid(Move::Surrender));

        player.step(Move::Hit, &[card("5C")]).unwrap();
        assert!(player.is_done());
        let hand = player.hand(0).unwrap();
        assert_eq!(hand.total(), 22);
        assert!(!hand.useable_ace());
        assert_eq!(single(&player, &["TS", "7D"]).outcome, Outcome::Bust);
    }

    #[test]
    fn step_checks_card_count_and_activity() {
        let mut player = player_with(&["7H", "7D"], Rule::default());
        assert_eq!(
            player.step(Move::Hit, &[]),
            Err(GameError::WrongCardCount {
                mv: Move::Hit,
                expected: 1,
                given: 0
            })
        );
        assert_eq!(
            player.step(Move::Split, &[card("2C")]),
            Err(GameError::WrongCardCount {
                mv: Move::Split,
                expected: 2,
                given: 1
            })
        );
        player.step(Move::Stay, &[]).unwrap();
        assert_eq!(player.step(Move::Stay, &[]), Err(GameError::NoActiveHand));
        assert_eq!(player.deal_card(card("2C")), Err(GameError::NoActiveHand));
    }

    #[test]
    fn double_completes_regardless_of_total() {
        let mut player = player_with(&["2H", "3D"], Rule::default());
        player.step(Move::Double, &[card("4S")]).unwrap();
        assert!(player.is_done());
        assert_eq!(player.wagers(), vec![20.0]);
        assert_eq!(player.hand(0).unwrap().total(), 9);
        assert_eq!(
            single(&player, &["TS", "7D"]),
            Settlement {
                outcome: Outcome::Loss,
                payout: -20.0
            }
        );
    }

    #[test]
    fn split_keeps_hands_and_wagers_in_lockstep() {
        let mut player = player_with(&["8H", "8D"], Rule::default());
        player.step(Move::Split, &[card("3S"), card("8C")]).unwrap();
        assert_eq!(player.number_of_hands(), 2);
        assert_eq!(player.wagers().len(), 2);
        assert_eq!(player.is_complete(1), Some(false));
        assert!(player.hands().all(|hand| hand.len() == 2));
        assert_eq!(player.hand(0).unwrap().cards(), &[card("8H"), card("3S")]);
        assert_eq!(player.hand(1).unwrap().cards(), &[card("8D"), card("8C")]);
        assert!(!player.is_move_valid(Move::Surrender));
        assert!(player.is_move_valid(Move::Double));

        player.step(Move::Stay, &[]).unwrap();
        assert_eq!(player.current_hand_index(), Some(1));
        player.step(Move::Split, &[card("2S"), card("KC")]).unwrap();
        assert_eq!(player.number_of_hands(), 3);
        assert_eq!(player.wagers(), vec![10.0, 10.0, 10.0]);
        assert_eq!(player.hand(1).unwrap().cards(), &[card("8D"), card("2S")]);
        assert_eq!(player.hand(2).unwrap().cards(), &[card("8C"), card("KC")]);
        assert!(!player.aces_split());
    }

    #[test]
    fn no_double_after_split_when_disallowed() {
        let rule = Rule {
            double_after_split: false,
            ..Default::default()
        };
        let mut player = player_with(&["9H", "9D"], rule);
        player.step(Move::Split, &[card("2S"), card("3C")]).unwrap();
        assert!(!player.is_move_valid(Move::Double));
        assert!(player.is_move_valid(Move::Hit));
    }

    #[test]
    fn split_aces_get_one_card_each() {
        let mut player = player_with(&["AH", "AD"], Rule::default());
        player.step(Move::Split, &[card("5S"), card("AC")]).unwrap();
        assert!(player.aces_split());
        assert_eq!(player.is_complete(0), Some(true));
        assert_eq!(player.is_complete(1), Some(false));
        assert_eq!(player.current_hand_index(), Some(1));
        assert_eq!(player.valid_moves(), vec![Move::Split]);

        player.step(Move::Split, &[card("9S"), card("KC")]).unwrap();
        assert!(player.is_done());
        assert_eq!(player.number_of_hands(), 3);
        assert_eq!(player.hand(2).unwrap().total(), 21);
    }

    #[test]
    fn split_aces_can_be_hit_with_rule() {
        let rule = Rule {
            hit_after_split_aces: true,
            ..Default::default()
        };
        let mut player = player_with(&["AH", "AD"], rule);
        player.step(Move::Split, &[card("5S"), card("2C")]).unwrap();
        assert_eq!(player.is_complete(0), Some(false));
        assert_eq!(player.is_complete(1), Some(false));
        let moves = player.valid_moves();
        assert!(moves.contains(&Move::Hit));
        assert!(moves.contains(&Move::Stay));
        assert!(moves.contains(&Move::Double));
    }

    #[test]
    fn twenty_one_after_split_is_not_blackjack() {
        let mut player = player_with(&["KH", "KD"], Rule::default());
        player.step(Move::Split, &[card("AS"), card("7C")]).unwrap();
        assert_eq!(player.is_complete(0), Some(true));
        player.step(Move::Stay, &[]).unwrap();
        let results = player.get_result(&dealer(&["TS", "QD"]));
        assert_eq!(
            results,
            vec![
                Settlement {
                    outcome: Outcome::Win,
                    payout: 10.0
                },
                Settlement {
                    outcome: Outcome::Loss,
                    payout: -10.0
                },
            ]
        );
    }

    #[test]
    fn naturals() {
        let player = player_with(&["AH", "KD"], Rule::default());
        assert!(player.is_done());
        assert_eq!(
            single(&player, &["TS", "7D"]),
            Settlement {
                outcome: Outcome::Blackjack,
                payout: 15.0
            }
        );
        assert_eq!(
            single(&player, &["AS", "QD"]),
            Settlement {
                outcome: Outcome::Push,
                payout: 0.0
            }
        );

        let rule = Rule {
            reduced_blackjack_payout: true,
            ..Default::default()
        };
        let player = player_with(&["AH", "KD"], rule);
        assert_eq!(single(&player, &["9S", "7D", "2C"]).payout, 12.0);
    }

    #[test]
    fn dealer_natural_beats_every_other_hand() {
        let mut player = player_with(&["5H", "6D"], Rule::default());
        player.step(Move::Hit, &[card("TS")]).unwrap();
        assert_eq!(single(&player, &["AS", "QD"]).outcome, Outcome::Loss);

        let mut player = player_with(&["TH", "8D"], Rule::default());
        player.force_completion();
        assert_eq!(
            single(&player, &["AS", "QD"]),
            Settlement {
                outcome: Outcome::Loss,
                payout: -10.0
            }
        );
    }

    #[test]
    fn three_card_twenty_one() {
        let mut player = player_with(&["5H", "6D"], Rule::default());
        player.step(Move::Hit, &[card("TS")]).unwrap();
        assert_eq!(single(&player, &["9S", "5D", "7C"]).outcome, Outcome::Push);
        assert_eq!(single(&player, &["TS", "7D"]).outcome, Outcome::Win);
        assert_eq!(single(&player, &["TS", "5D", "7C"]).outcome, Outcome::Win);

        let rule = Rule {
            push_dealer22: true,
            ..Default::default()
        };
        let mut player = player_with(&["5H", "6D"], rule);
        player.step(Move::Hit, &[card("TS")]).unwrap();
        assert_eq!(single(&player, &["TS", "5D", "7C"]).outcome, Outcome::Push);
    }

    #[test]
    fn dealer_bust_against_twenty() {
        let player = player_with(&["TH", "QD"], Rule::default());
        for dealer_cards in [&["TS", "5D", "7C"][..], &["TS", "6D", "8C"][..]] {
            assert_eq!(
                single(&player, dealer_cards),
                Settlement {
                    outcome: Outcome::Win,
                    payout: 10.0
                }
            );
        }

        let rule = Rule {
            push_dealer22: true,
            ..Default::default()
        };
        let player = player_with(&["TH", "QD"], rule);
        assert_eq!(
            single(&player, &["TS", "5D", "7C"]),
            Settlement {
                outcome: Outcome::Push,
                payout: 0.0
            }
        );
        assert_eq!(single(&player, &["TS", "6D", "8C"]).outcome, Outcome::Win);
    }

    #[test]
    fn three_way_comparison() {
        let player = player_with(&["TH", "8D"], Rule::default());
        assert_eq!(single(&player, &["TS", "7D"]).outcome, Outcome::Win);
        assert_eq!(single(&player, &["TS", "8C"]).outcome, Outcome::Push);
        assert_eq!(single(&player, &["TS", "9D"]).outcome, Outcome::Loss);
    }

    #[test]
    fn bust_loses_even_if_dealer_busts() {
        let mut player = player_with(&["TH", "6D"], Rule::default());
        player.step(Move::Hit, &[card("9S")]).unwrap();
        assert_eq!(
            single(&player, &["TS", "6D", "9C"]),
            Settlement {
                outcome: Outcome::Bust,
                payout: -10.0
            }
        );
    }

    #[test]
    fn surrender_returns_half_the_base_wager() {
        let mut player = player_with(&["TH", "6D"], Rule::default());
        player.step(Move::Surrender, &[]).unwrap();
        assert!(player.is_surrendered());
        assert!(player.is_done());
        for dealer_cards in [&["TS", "7D"][..], &["TS", "6D", "9C"][..], &["AS", "KD"][..]] {
            assert_eq!(
                player.get_result(&dealer(dealer_cards)),
                vec![Settlement {
                    outcome: Outcome::Surrender,
                    payout: -5.0
                }]
            );
        }
    }
}
