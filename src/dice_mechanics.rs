use crate::constants::{DICE_COUNT, FACES};

/// 0!..5!, enough for every multinomial over at most five dice.
pub const FACTORIALS: [u32; DICE_COUNT + 1] = [1, 1, 2, 6, 24, 120];

/// Count occurrences of each face (1-6) in a 5-dice set.
/// face_count[0] is unused; face_count[f] = count of face f.
pub fn count_faces(dice: &[u8; DICE_COUNT]) -> [u8; FACES + 1] {
    let mut face_count = [0u8; FACES + 1];
    for &d in dice {
        face_count[d as usize] += 1;
    }
    face_count
}

/// Probability of rolling this exact sorted dice set from five fresh dice:
/// 5! / (n1! * n2! * ... * n6!) / 6^5.
pub fn compute_probability_of_dice_set(dice: &[u8; DICE_COUNT]) -> f64 {
    let face_count = count_faces(dice);
    let denominator: u32 = face_count[1..]
        .iter()
        .map(|&n| FACTORIALS[n as usize])
        .product();
    let permutations = FACTORIALS[DICE_COUNT] as f64 / denominator as f64;
    permutations / 6.0f64.powi(DICE_COUNT as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_faces() {
        let fc = count_faces(&[1, 1, 2, 3, 3]);
        assert_eq!(fc[1..], [2, 1, 2, 0, 0, 0]);

        let fc2 = count_faces(&[6, 6, 6, 6, 6]);
        assert_eq!(fc2[6], 5);
        assert_eq!(fc2[1], 0);
    }

    #[test]
    fn test_probability() {
        let p1 = compute_probability_of_dice_set(&[1, 1, 1, 1, 1]);
        assert!((p1 - 1.0 / 7776.0).abs() < 1e-12);

        let p2 = compute_probability_of_dice_set(&[1, 1, 1, 1, 2]);
        assert!((p2 - 5.0 / 7776.0).abs() < 1e-12);

        let p3 = compute_probability_of_dice_set(&[1, 2, 3, 4, 5]);
        assert!((p3 - 120.0 / 7776.0).abs() < 1e-12);
    }
}
