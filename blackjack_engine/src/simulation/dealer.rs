use crate::Rule;

use super::hand::Hand;

/// The house draws below 17, and on soft 17 when the table says so. Hard 17 and
/// above always stand.
pub fn should_hit(hand: &Hand, rule: &Rule) -> bool {
    let total = hand.total();
    if total > 17 {
        false
    } else if total < 17 {
        true
    } else {
        hand.useable_ace() && rule.dealer_hit_soft17
    }
}

pub fn is_done(hand: &Hand, rule: &Rule) -> bool {
    !should_hit(hand, rule)
}
