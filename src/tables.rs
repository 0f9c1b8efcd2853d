//! Static game tables shared by every loaded value table.
//!
//! [`precompute_lookup_tables`] builds, in dependency order:
//!
//! 1. **Dice combinations**: the 252 sorted five-dice sets plus a reverse lookup
//! 2. **Category scores**: the score of every (dice set, category) pair
//! 3. **Keep-multiset table**: sparse CSR transition matrix P(keep → roll) with
//!    per-dice-set dedup of equivalent reroll masks
//! 4. **Dice set probabilities**: P(roll) for five fresh dice
//! 5. **Upper reachability**: which capped upper totals a set of scored upper
//!    categories can produce
//!
//! The tables depend only on the game rules, so they are built once per process
//! (see [`crate::runtime::tables`]) and then shared immutably.

use std::time::Instant;

use tracing::debug;

use crate::constants::*;
use crate::dice_mechanics::{compute_probability_of_dice_set, FACTORIALS};
use crate::game_mechanics::calculate_category_score;

/// Keep-multiset transition table in sparse CSR form.
///
/// A keep-multiset is the multiset of dice retained before rerolling. Several
/// 5-bit reroll masks can retain the same multiset (for `[1,1,2,3,4]` the masks
/// `0b00001` and `0b00010` both keep `{1,2,3,4}`); the table collapses those.
///
/// - `vals[row_start[ki]..row_start[ki+1]]`: probabilities for keep `ki`
/// - `cols[row_start[ki]..row_start[ki+1]]`: target dice-set indices
/// - `unique_keep_ids[ds][0..unique_count[ds]]`: deduplicated keeps per dice set
/// - `mask_to_keep[ds*32 + mask]`: reroll mask → keep index
/// - `keep_to_mask[ds*32 + j]`: unique keep `j` → first reroll mask producing it
///
/// Masks here are *reroll* masks over the sorted dice (bit set = reroll);
/// `0` keeps every die.
pub struct KeepTable {
    pub vals: Vec<f64>,
    pub cols: Vec<u16>,
    pub row_start: [u32; NUM_KEEP_MULTISETS + 1],
    pub unique_count: [u8; NUM_DICE_SETS],
    pub unique_keep_ids: [[u16; NUM_MASKS - 1]; NUM_DICE_SETS],
    pub mask_to_keep: Vec<u16>,
    pub keep_to_mask: Vec<u8>,
}

impl KeepTable {
    fn new() -> Self {
        Self {
            vals: Vec::new(),
            cols: Vec::new(),
            row_start: [0; NUM_KEEP_MULTISETS + 1],
            unique_count: [0; NUM_DICE_SETS],
            unique_keep_ids: [[0; NUM_MASKS - 1]; NUM_DICE_SETS],
            mask_to_keep: vec![0; NUM_DICE_SETS * NUM_MASKS],
            keep_to_mask: vec![0; NUM_DICE_SETS * NUM_MASKS],
        }
    }

    /// Transition row for keep `kid` as (target dice set, probability) pairs.
    #[inline]
    pub fn row(&self, kid: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.row_start[kid] as usize;
        let end = self.row_start[kid + 1] as usize;
        self.cols[start..end]
            .iter()
            .zip(&self.vals[start..end])
            .map(|(&c, &p)| (c as usize, p))
    }
}

/// Rule-derived lookup tables. Immutable once built.
pub struct GameTables {
    /// The 252 sorted five-dice sets, in lexicographic order.
    pub all_dice_sets: [[u8; DICE_COUNT]; NUM_DICE_SETS],
    /// `index_lookup[d1-1][d2-1][d3-1][d4-1][d5-1]` = index of a sorted set.
    pub index_lookup: [[[[[u8; FACES]; FACES]; FACES]; FACES]; FACES],
    pub precomputed_scores: [[u8; CATEGORY_COUNT]; NUM_DICE_SETS],
    pub keep_table: KeepTable,
    pub dice_set_probabilities: [f64; NUM_DICE_SETS],
    /// `reachable[upper_mask][upper_score]`: some assignment of scores to the
    /// upper categories in `upper_mask` totals `upper_score` (63 = "63 or more").
    pub reachable: [[bool; UPPER_SCORE_CAP as usize + 1]; UPPER_MASKS],
}

impl GameTables {
    /// Build every table from scratch.
    pub fn build() -> Box<GameTables> {
        let mut tables = Box::new(GameTables {
            all_dice_sets: [[0; DICE_COUNT]; NUM_DICE_SETS],
            index_lookup: [[[[[0; FACES]; FACES]; FACES]; FACES]; FACES],
            precomputed_scores: [[0; CATEGORY_COUNT]; NUM_DICE_SETS],
            keep_table: KeepTable::new(),
            dice_set_probabilities: [0.0; NUM_DICE_SETS],
            reachable: [[false; UPPER_SCORE_CAP as usize + 1]; UPPER_MASKS],
        });
        precompute_lookup_tables(&mut tables);
        tables
    }

    /// Index of a sorted dice set among the 252.
    #[inline(always)]
    pub fn find_dice_set_index(&self, dice: &[u8; DICE_COUNT]) -> usize {
        self.index_lookup[(dice[0] - 1) as usize][(dice[1] - 1) as usize]
            [(dice[2] - 1) as usize][(dice[3] - 1) as usize][(dice[4] - 1) as usize]
            as usize
    }

    /// Whether a game can arrive at `upper_score` with `scored_categories` scored.
    #[inline]
    pub fn is_reachable(&self, upper_score: u8, scored_categories: u16) -> bool {
        let upper_mask = scored_categories as usize & (UPPER_MASKS - 1);
        self.reachable[upper_mask][upper_score as usize]
    }
}

/// Enumerate the C(10,5) = 252 sorted five-dice sets and the reverse lookup.
pub fn build_all_dice_combinations(tables: &mut GameTables) {
    let mut idx = 0usize;
    for a in 1..=6u8 {
        for b in a..=6 {
            for c in b..=6 {
                for d in c..=6 {
                    for e in d..=6 {
                        tables.all_dice_sets[idx] = [a, b, c, d, e];
                        tables.index_lookup[(a - 1) as usize][(b - 1) as usize]
                            [(c - 1) as usize][(d - 1) as usize][(e - 1) as usize] = idx as u8;
                        idx += 1;
                    }
                }
            }
        }
    }
    debug_assert_eq!(idx, NUM_DICE_SETS);
}

pub fn precompute_category_scores(tables: &mut GameTables) {
    for i in 0..NUM_DICE_SETS {
        let dice = tables.all_dice_sets[i];
        for cat in 0..CATEGORY_COUNT {
            tables.precomputed_scores[i][cat] = calculate_category_score(&dice, cat);
        }
    }
}

#[inline]
fn freq_key(freq: &[u8; FACES]) -> usize {
    freq.iter().fold(0usize, |acc, &f| acc * FACES + f as usize)
}

/// Build the keep-multiset transition table.
///
/// **a.** Enumerate the 462 keep-multisets (0–5 dice) as frequency vectors.
///
/// **b.** For each keep K and target T ⊇ K:
///   P(K→T) = n! / (d1!·…·d6!) / 6^n, with n = 5 − |K| rerolled dice and
///   di = T[i] − K[i].
///
/// **c.** For each dice set and reroll mask 1..31, record the keep it produces
/// and deduplicate masks that produce the same keep.
pub fn precompute_keep_table(tables: &mut GameTables) {
    let all_dice_sets = tables.all_dice_sets;
    let index_of = |dice: &[u8; DICE_COUNT]| {
        tables.index_lookup[(dice[0] - 1) as usize][(dice[1] - 1) as usize]
            [(dice[2] - 1) as usize][(dice[3] - 1) as usize][(dice[4] - 1) as usize]
    };

    // a
    let mut keep_freq = [[0u8; FACES]; NUM_KEEP_MULTISETS];
    let mut keep_lookup = vec![u16::MAX; FACES.pow(FACES as u32)];
    let mut num_keeps = 0usize;
    for f1 in 0..=5u8 {
        for f2 in 0..=(5 - f1) {
            for f3 in 0..=(5 - f1 - f2) {
                for f4 in 0..=(5 - f1 - f2 - f3) {
                    for f5 in 0..=(5 - f1 - f2 - f3 - f4) {
                        for f6 in 0..=(5 - f1 - f2 - f3 - f4 - f5) {
                            let freq = [f1, f2, f3, f4, f5, f6];
                            keep_freq[num_keeps] = freq;
                            keep_lookup[freq_key(&freq)] = num_keeps as u16;
                            num_keeps += 1;
                        }
                    }
                }
            }
        }
    }

    // b
    let mut target_freq = [[0u8; FACES]; NUM_DICE_SETS];
    for (ti, dice) in all_dice_sets.iter().enumerate() {
        for &d in dice {
            target_freq[ti][(d - 1) as usize] += 1;
        }
    }

    let mut kt = KeepTable::new();
    for ki in 0..num_keeps {
        kt.row_start[ki] = kt.vals.len() as u32;
        let kept: u8 = keep_freq[ki].iter().sum();
        let n = DICE_COUNT - kept as usize;

        if n == 0 {
            let mut dice = [0u8; DICE_COUNT];
            let mut d = 0;
            for face in 0..FACES {
                for _ in 0..keep_freq[ki][face] {
                    dice[d] = face as u8 + 1;
                    d += 1;
                }
            }
            kt.vals.push(1.0);
            kt.cols.push(index_of(&dice) as u16);
            continue;
        }

        let inv_pow6n = 1.0 / (FACES as f64).powi(n as i32);
        let fact_n = FACTORIALS[n] as f64;

        for ti in 0..NUM_DICE_SETS {
            let tf = &target_freq[ti];
            if (0..FACES).any(|f| keep_freq[ki][f] > tf[f]) {
                continue;
            }
            let denom: u32 = (0..FACES)
                .map(|f| FACTORIALS[(tf[f] - keep_freq[ki][f]) as usize])
                .product();
            kt.vals.push(fact_n / denom as f64 * inv_pow6n);
            kt.cols.push(ti as u16);
        }
    }
    kt.row_start[num_keeps] = kt.vals.len() as u32;

    // c
    let mut total_unique = 0usize;
    for ds in 0..NUM_DICE_SETS {
        let dice = &all_dice_sets[ds];
        let mut n_unique = 0usize;

        for mask in 0..NUM_MASKS {
            let mut kf = [0u8; FACES];
            for (i, &d) in dice.iter().enumerate() {
                if mask & (1 << i) == 0 {
                    kf[(d - 1) as usize] += 1;
                }
            }
            let kid = keep_lookup[freq_key(&kf)];
            kt.mask_to_keep[ds * NUM_MASKS + mask] = kid;

            // mask 0 is keep-all, evaluated separately by callers
            if mask == 0 {
                continue;
            }
            if !kt.unique_keep_ids[ds][..n_unique].contains(&kid) {
                kt.unique_keep_ids[ds][n_unique] = kid;
                kt.keep_to_mask[ds * NUM_MASKS + n_unique] = mask as u8;
                n_unique += 1;
            }
        }

        kt.unique_count[ds] = n_unique as u8;
        total_unique += n_unique;
    }

    debug!(
        keeps = num_keeps,
        nnz = kt.vals.len(),
        avg_unique_per_set = total_unique as f64 / NUM_DICE_SETS as f64,
        "keep-multiset table built"
    );
    tables.keep_table = kt;
}

pub fn precompute_dice_set_probabilities(tables: &mut GameTables) {
    for ds_i in 0..NUM_DICE_SETS {
        tables.dice_set_probabilities[ds_i] =
            compute_probability_of_dice_set(&tables.all_dice_sets[ds_i]);
    }
}

/// Reachable (upper mask, capped upper total) pairs.
///
/// Each upper category contributes `k * face` for k in 0..=5. The exact totals
/// (0..=105) are built one face at a time, then every total of 63 or more is
/// folded into the capped value 63.
pub fn precompute_reachability(tables: &mut GameTables) {
    const MAX_UPPER_TOTAL: usize = 5 * (1 + 2 + 3 + 4 + 5 + 6);

    let mut exact = vec![[false; UPPER_MASKS]; MAX_UPPER_TOTAL + 1];
    exact[0][0] = true;
    for face in 1..=FACES {
        let bit = 1 << (face - 1);
        for mask in (0..UPPER_MASKS).filter(|m| m & bit != 0) {
            let prev = mask ^ bit;
            for n in 0..=MAX_UPPER_TOTAL {
                exact[n][mask] = (0..=DICE_COUNT)
                    .map(|k| k * face)
                    .take_while(|&contrib| contrib <= n)
                    .any(|contrib| exact[n - contrib][prev]);
            }
        }
    }

    let cap = UPPER_SCORE_CAP as usize;
    let mut pairs = 0usize;
    for mask in 0..UPPER_MASKS {
        for n in 0..cap {
            tables.reachable[mask][n] = exact[n][mask];
        }
        tables.reachable[mask][cap] = exact[cap..].iter().any(|row| row[mask]);
        pairs += tables.reachable[mask].iter().filter(|&&r| r).count();
    }
    debug!(
        reachable = pairs,
        total = UPPER_MASKS * (cap + 1),
        "upper reachability built"
    );
}

/// Build all static lookup tables in dependency order.
pub fn precompute_lookup_tables(tables: &mut GameTables) {
    let start = Instant::now();

    macro_rules! timed {
        ($label:expr, $body:expr) => {{
            let t0 = Instant::now();
            $body;
            debug!(
                step = $label,
                ms = t0.elapsed().as_secs_f64() * 1000.0,
                "game table step"
            );
        }};
    }

    timed!("dice combinations", build_all_dice_combinations(tables));
    timed!("category scores", precompute_category_scores(tables));
    timed!("keep-multiset table", precompute_keep_table(tables));
    timed!(
        "dice set probabilities",
        precompute_dice_set_probabilities(tables)
    );
    timed!("upper reachability", precompute_reachability(tables));

    debug!(
        ms = start.elapsed().as_secs_f64() * 1000.0,
        "game tables ready"
    );
}
