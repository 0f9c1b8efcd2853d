//! Integer keys for game states and dice histograms.
//!
//! - state key = `scored_categories * 128 + upper_score`, the artifact's slot
//!   order. Slots whose low seven bits exceed 63 are padding and do not decode,
//!   and neither do upper totals the scored upper categories cannot produce.
//! - histogram key = rank of the sorted dice among the 252 sorted five-dice sets
//!   in lexicographic order (`[1,1,1,1,1]` = 0 … `[6,6,6,6,6]` = 251).

use crate::constants::*;
use crate::runtime;

/// Turn-start game context: capped upper total and the scored-categories mask.
///
/// Only reachable states can be built, so every `GameState` encodes to a slot
/// the solver writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    upper_score: u8,
    scored_categories: u16,
}

impl GameState {
    pub const START: GameState = GameState {
        upper_score: 0,
        scored_categories: 0,
    };

    /// Checked constructor; `None` when either field is out of range or the
    /// upper total cannot come from the scored upper categories.
    pub fn new(upper_score: u8, scored_categories: u16) -> Option<Self> {
        let in_range = upper_score <= UPPER_SCORE_CAP && scored_categories <= ALL_CATEGORIES;
        (in_range && runtime::tables().is_reachable(upper_score, scored_categories)).then_some(
            GameState {
                upper_score,
                scored_categories,
            },
        )
    }

    /// Upper-section total, capped at 63.
    pub fn upper_score(&self) -> u8 {
        self.upper_score
    }

    pub fn scored_categories(&self) -> u16 {
        self.scored_categories
    }

    #[inline]
    pub fn encode(&self) -> u32 {
        state_index(self.upper_score as usize, self.scored_categories as usize) as u32
    }

    pub fn decode(key: u32) -> Option<Self> {
        let key = key as usize;
        if key >= NUM_STATES {
            return None;
        }
        let upper_score = (key % STATE_STRIDE) as u8;
        let scored_categories = (key / STATE_STRIDE) as u16;
        GameState::new(upper_score, scored_categories)
    }

    /// All 15 categories scored; only the upper bonus remains.
    pub fn is_terminal(&self) -> bool {
        self.scored_categories == ALL_CATEGORIES
    }

    pub fn is_scored(&self, category: usize) -> bool {
        is_category_scored(self.scored_categories, category)
    }

    /// Categories still open, lowest index first.
    pub fn open_categories(&self) -> impl Iterator<Item = usize> {
        let scored = self.scored_categories;
        (0..CATEGORY_COUNT).filter(move |&c| !is_category_scored(scored, c))
    }

    /// State after scoring `score` points in `category`. `None` if the
    /// category is already scored or the points are impossible for it.
    pub fn with_category(&self, category: usize, score: u8) -> Option<GameState> {
        if category >= CATEGORY_COUNT || self.is_scored(category) {
            return None;
        }
        GameState::new(
            crate::game_mechanics::update_upper_score(self.upper_score, category, score),
            self.scored_categories | (1 << category),
        )
    }
}

/// Multiset of five six-sided dice as counts per face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DiceHistogram {
    counts: [u8; FACES],
}

/// Number of multisets of size `k` drawn from `n` values: C(n + k - 1, k).
fn multiset_count(n: usize, k: usize) -> u32 {
    if k == 0 {
        return 1;
    }
    if n == 0 {
        return 0;
    }
    let mut acc: u32 = 1;
    for i in 1..=k {
        acc = acc * (n + i - 1) as u32 / i as u32;
    }
    acc
}

impl DiceHistogram {
    /// Checked constructor from counts for faces 1..=6.
    pub fn from_counts(counts: [u8; FACES]) -> Option<Self> {
        let total: u32 = counts.iter().map(|&c| c as u32).sum();
        (total as usize == DICE_COUNT).then_some(DiceHistogram { counts })
    }

    /// Histogram of a roll; `None` if any die is not in 1..=6.
    pub fn from_dice(dice: &[u8; DICE_COUNT]) -> Option<Self> {
        let mut counts = [0u8; FACES];
        for &d in dice {
            if !(1..=FACES as u8).contains(&d) {
                return None;
            }
            counts[(d - 1) as usize] += 1;
        }
        Some(DiceHistogram { counts })
    }

    pub fn counts(&self) -> [u8; FACES] {
        self.counts
    }

    /// The dice in ascending order.
    pub fn sorted_dice(&self) -> [u8; DICE_COUNT] {
        let mut dice = [0u8; DICE_COUNT];
        let mut i = 0;
        for (face, &n) in self.counts.iter().enumerate() {
            for _ in 0..n {
                dice[i] = face as u8 + 1;
                i += 1;
            }
        }
        dice
    }

    /// Sub-multiset retained by a keep mask over the sorted dice
    /// (bit `i` set keeps the i-th smallest die), as counts per face.
    pub fn kept(&self, keep_mask: u8) -> [u8; FACES] {
        let mut kept = [0u8; FACES];
        for (i, &d) in self.sorted_dice().iter().enumerate() {
            if keep_mask & (1 << i) != 0 {
                kept[(d - 1) as usize] += 1;
            }
        }
        kept
    }

    pub fn encode(&self) -> u32 {
        let dice = self.sorted_dice();
        let mut rank = 0;
        let mut low = 1u8;
        for (i, &d) in dice.iter().enumerate() {
            let remaining = DICE_COUNT - i - 1;
            for v in low..d {
                rank += multiset_count(FACES + 1 - v as usize, remaining);
            }
            low = d;
        }
        rank
    }

    pub fn decode(key: u32) -> Option<Self> {
        if key as usize >= NUM_DICE_SETS {
            return None;
        }
        let mut rest = key;
        let mut dice = [0u8; DICE_COUNT];
        let mut low = 1u8;
        for i in 0..DICE_COUNT {
            let remaining = DICE_COUNT - i - 1;
            let mut v = low;
            loop {
                let block = multiset_count(FACES + 1 - v as usize, remaining);
                if rest < block {
                    break;
                }
                rest -= block;
                v += 1;
            }
            dice[i] = v;
            low = v;
        }
        DiceHistogram::from_dice(&dice)
    }
}
