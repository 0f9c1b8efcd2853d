//! Property-based tests for the key codecs and scoring rules.

use proptest::prelude::*;

use yahtzeevalue::codec::{DiceHistogram, GameState};
use yahtzeevalue::constants::*;
use yahtzeevalue::dice_mechanics::count_faces;
use yahtzeevalue::game_mechanics::{calculate_category_score, update_upper_score};
use yahtzeevalue::runtime;

/// Strategy: a valid dice array (each die 1-6).
fn dice_strategy() -> impl Strategy<Value = [u8; 5]> {
    prop::array::uniform5(1..=6u8)
}

fn category_strategy() -> impl Strategy<Value = usize> {
    0..CATEGORY_COUNT
}

/// Strategy: a reachable state, built by scoring one roll in each of a random
/// subset of categories.
fn state_strategy() -> impl Strategy<Value = GameState> {
    (0..=ALL_CATEGORIES, prop::array::uniform15(dice_strategy())).prop_map(|(scored, rolls)| {
        (0..CATEGORY_COUNT)
            .filter(|&c| scored & (1 << c) != 0)
            .fold(GameState::START, |s, c| {
                s.with_category(c, calculate_category_score(&rolls[c], c))
                    .unwrap()
            })
    })
}

proptest! {
    // 1. State keys round-trip and stay inside the table.
    #[test]
    fn state_round_trip(state in state_strategy()) {
        let key = state.encode();
        prop_assert!((key as usize) < NUM_STATES);
        prop_assert_eq!(GameState::decode(key), Some(state));
    }

    // 2. Every decodable key re-encodes to itself.
    #[test]
    fn state_decode_then_encode(key in 0..NUM_STATES as u32) {
        match GameState::decode(key) {
            Some(state) => prop_assert_eq!(state.encode(), key),
            None => {
                let upper = key as usize % STATE_STRIDE;
                let scored = (key as usize / STATE_STRIDE) as u16;
                prop_assert!(
                    upper > UPPER_SCORE_CAP as usize
                        || !runtime::tables().is_reachable(upper as u8, scored)
                );
            }
        }
    }

    // 3. Keys past the end never decode.
    #[test]
    fn state_out_of_range(key in NUM_STATES as u32..) {
        prop_assert_eq!(GameState::decode(key), None);
    }

    // 4. Histogram keys round-trip and ignore dice order.
    #[test]
    fn histogram_round_trip(dice in dice_strategy()) {
        let h = DiceHistogram::from_dice(&dice).unwrap();
        let key = h.encode();
        prop_assert!((key as usize) < NUM_DICE_SETS);
        prop_assert_eq!(DiceHistogram::decode(key), Some(h));

        let mut sorted = dice;
        sorted.sort_unstable();
        prop_assert_eq!(h.sorted_dice(), sorted);
        prop_assert_eq!(DiceHistogram::from_dice(&sorted).unwrap().encode(), key);
    }

    #[test]
    fn histogram_out_of_range(key in NUM_DICE_SETS as u32..) {
        prop_assert_eq!(DiceHistogram::decode(key), None);
    }

    // 5. A keep mask retains exactly its popcount of dice.
    #[test]
    fn kept_respects_mask(dice in dice_strategy(), mask in 0u8..32) {
        let h = DiceHistogram::from_dice(&dice).unwrap();
        let kept = h.kept(mask);
        let total: u8 = kept.iter().sum();
        prop_assert_eq!(total as u32, mask.count_ones());
        for (k, c) in kept.iter().zip(h.counts()) {
            prop_assert!(*k <= c);
        }
    }

    // 6. Scoring ignores dice order.
    #[test]
    fn score_order_independent(dice in dice_strategy(), cat in category_strategy()) {
        let mut sorted = dice;
        sorted.sort_unstable();
        prop_assert_eq!(
            calculate_category_score(&dice, cat),
            calculate_category_score(&sorted, cat)
        );
    }

    // 7. No category pays more than the dice sum, except straights and Yatzy.
    #[test]
    fn score_bounded_by_sum(dice in dice_strategy(), cat in category_strategy()) {
        let sum: u8 = dice.iter().sum();
        let score = calculate_category_score(&dice, cat);
        if cat != CATEGORY_SMALL_STRAIGHT && cat != CATEGORY_LARGE_STRAIGHT && cat != CATEGORY_YATZY {
            prop_assert!(score <= sum, "score={score} sum={sum} cat={cat}");
        }
        if cat == CATEGORY_CHANCE {
            prop_assert_eq!(score, sum);
        }
    }

    // 8. update_upper_score never exceeds 63 and never decreases.
    #[test]
    fn upper_score_capped(up in 0..=63u8, cat in category_strategy(), score in 0..=50u8) {
        let result = update_upper_score(up, cat, score);
        prop_assert!(result <= UPPER_SCORE_CAP);
        prop_assert!(result >= up);
    }

    #[test]
    fn yatzy_five_of_a_kind(face in 1..=6u8) {
        prop_assert_eq!(calculate_category_score(&[face; 5], CATEGORY_YATZY), 50);
    }

    #[test]
    fn count_faces_sums_to_5(dice in dice_strategy()) {
        let counts = count_faces(&dice);
        let total: u8 = counts.iter().sum();
        prop_assert_eq!(total, 5);
    }

    // 9. The successor of a non-terminal state has one more category scored.
    #[test]
    fn successor_scores_one_category(state in state_strategy(), dice in dice_strategy()) {
        if let Some(cat) = state.open_categories().next() {
            let score = calculate_category_score(&dice, cat);
            let next = state.with_category(cat, score).unwrap();
            prop_assert_eq!(
                next.scored_categories().count_ones(),
                state.scored_categories().count_ones() + 1
            );
            prop_assert!(GameState::decode(next.encode()).is_some());
        } else {
            prop_assert!(state.is_terminal());
        }
    }
}
