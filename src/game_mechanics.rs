//! Yatzy scoring rules and the upper-score successor.
//!
//! Scores every one of the 15 Scandinavian Yatzy categories for a five-dice
//! roll, and advances the capped upper total when an upper category is used.

use crate::constants::*;
use crate::dice_mechanics::count_faces;

/// Score a five-dice roll in `category`.
///
/// Categories 0–5 are the upper section: face value × count. Categories 6–14
/// follow Scandinavian rules (pairs count the highest faces, straights are
/// fixed 15/20, full house and chance are the dice sum, Yatzy is 50).
pub fn calculate_category_score(dice: &[u8; DICE_COUNT], category: usize) -> u8 {
    let face_count = count_faces(dice);
    let sum_all: u8 = dice.iter().sum();

    match category {
        CATEGORY_ONES | CATEGORY_TWOS | CATEGORY_THREES | CATEGORY_FOURS | CATEGORY_FIVES
        | CATEGORY_SIXES => {
            let face = category + 1;
            face_count[face] * face as u8
        }
        CATEGORY_ONE_PAIR => n_of_a_kind_score(&face_count, 2),
        CATEGORY_TWO_PAIRS => {
            let mut pairs = (1..=FACES).rev().filter(|&f| face_count[f] >= 2);
            match (pairs.next(), pairs.next()) {
                (Some(high), Some(low)) => 2 * (high + low) as u8,
                _ => 0,
            }
        }
        CATEGORY_THREE_OF_A_KIND => n_of_a_kind_score(&face_count, 3),
        CATEGORY_FOUR_OF_A_KIND => n_of_a_kind_score(&face_count, 4),
        CATEGORY_SMALL_STRAIGHT => {
            if (1..=5).all(|f| face_count[f] == 1) {
                15
            } else {
                0
            }
        }
        CATEGORY_LARGE_STRAIGHT => {
            if (2..=6).all(|f| face_count[f] == 1) {
                20
            } else {
                0
            }
        }
        CATEGORY_FULL_HOUSE => {
            let has_three = face_count.iter().any(|&n| n == 3);
            let has_pair = face_count.iter().any(|&n| n == 2);
            if has_three && has_pair {
                sum_all
            } else {
                0
            }
        }
        CATEGORY_CHANCE => sum_all,
        CATEGORY_YATZY => {
            if face_count.iter().any(|&n| n as usize == DICE_COUNT) {
                50
            } else {
                0
            }
        }
        _ => 0,
    }
}

/// Highest face appearing at least `n` times, times `n`; 0 if none does.
fn n_of_a_kind_score(face_count: &[u8; FACES + 1], n: u8) -> u8 {
    (1..=FACES)
        .rev()
        .find(|&face| face_count[face] >= n)
        .map_or(0, |face| face as u8 * n)
}

/// Successor upper score: min(m + score, 63) for upper categories, m otherwise.
pub fn update_upper_score(upper_score: u8, category: usize, score: u8) -> u8 {
    if is_upper_category(category) {
        upper_score.saturating_add(score).min(UPPER_SCORE_CAP)
    } else {
        upper_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_section() {
        assert_eq!(calculate_category_score(&[1, 1, 1, 1, 1], CATEGORY_ONES), 5);
        assert_eq!(
            calculate_category_score(&[6, 6, 6, 6, 6], CATEGORY_SIXES),
            30
        );
        assert_eq!(calculate_category_score(&[1, 2, 3, 4, 5], CATEGORY_ONES), 1);
        assert_eq!(
            calculate_category_score(&[3, 3, 4, 5, 6], CATEGORY_THREES),
            6
        );
        assert_eq!(
            calculate_category_score(&[1, 5, 5, 5, 2], CATEGORY_FIVES),
            15
        );
    }

    #[test]
    fn test_pairs() {
        assert_eq!(
            calculate_category_score(&[3, 3, 4, 5, 6], CATEGORY_ONE_PAIR),
            6
        );
        assert_eq!(
            calculate_category_score(&[1, 5, 5, 6, 6], CATEGORY_ONE_PAIR),
            12
        );
        assert_eq!(
            calculate_category_score(&[1, 2, 3, 4, 6], CATEGORY_ONE_PAIR),
            0
        );
        assert_eq!(
            calculate_category_score(&[3, 3, 5, 5, 6], CATEGORY_TWO_PAIRS),
            16
        );
        assert_eq!(
            calculate_category_score(&[1, 1, 2, 3, 4], CATEGORY_TWO_PAIRS),
            0
        );
        // Four of a kind is not two pairs.
        assert_eq!(
            calculate_category_score(&[2, 2, 2, 2, 5], CATEGORY_TWO_PAIRS),
            0
        );
    }

    #[test]
    fn test_n_of_a_kind() {
        assert_eq!(
            calculate_category_score(&[2, 2, 2, 4, 5], CATEGORY_THREE_OF_A_KIND),
            6
        );
        assert_eq!(
            calculate_category_score(&[2, 4, 4, 4, 4], CATEGORY_FOUR_OF_A_KIND),
            16
        );
        assert_eq!(
            calculate_category_score(&[3, 3, 3, 4, 5], CATEGORY_FOUR_OF_A_KIND),
            0
        );
    }

    #[test]
    fn test_straights() {
        assert_eq!(
            calculate_category_score(&[1, 2, 3, 4, 5], CATEGORY_SMALL_STRAIGHT),
            15
        );
        assert_eq!(
            calculate_category_score(&[2, 3, 4, 5, 6], CATEGORY_LARGE_STRAIGHT),
            20
        );
        assert_eq!(
            calculate_category_score(&[2, 3, 4, 5, 6], CATEGORY_SMALL_STRAIGHT),
            0
        );
        assert_eq!(
            calculate_category_score(&[1, 2, 3, 4, 5], CATEGORY_LARGE_STRAIGHT),
            0
        );
    }

    #[test]
    fn test_full_house_chance_yatzy() {
        assert_eq!(
            calculate_category_score(&[2, 2, 3, 3, 3], CATEGORY_FULL_HOUSE),
            13
        );
        assert_eq!(
            calculate_category_score(&[5, 5, 5, 5, 5], CATEGORY_FULL_HOUSE),
            0
        );
        assert_eq!(calculate_category_score(&[1, 3, 4, 5, 6], CATEGORY_CHANCE), 19);
        assert_eq!(
            calculate_category_score(&[6, 6, 6, 6, 6], CATEGORY_YATZY),
            50
        );
        assert_eq!(
            calculate_category_score(&[5, 6, 6, 6, 6], CATEGORY_YATZY),
            0
        );
    }

    #[test]
    fn test_update_upper_score() {
        assert_eq!(update_upper_score(0, CATEGORY_ONES, 5), 5);
        assert_eq!(update_upper_score(10, CATEGORY_SIXES, 30), 40);
        assert_eq!(update_upper_score(60, CATEGORY_FIVES, 30), 63);
        assert_eq!(update_upper_score(10, CATEGORY_ONE_PAIR, 12), 10);
        assert_eq!(update_upper_score(63, CATEGORY_ONES, 5), 63);
    }
}
