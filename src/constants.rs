//! Game constants, key domains and state-indexing functions.
//!
//! - |𝒞| = [`CATEGORY_COUNT`] = 15 (Scandinavian Yatzy)
//! - |R_{5,6}| = [`NUM_DICE_SETS`] = 252
//! - |R_k| = [`NUM_KEEP_MULTISETS`] = 462
//! - state key = [`state_index`]`(m, C)` = C * STATE_STRIDE + m
//!
//! The index layout groups all upper-score variants of the same scored-categories
//! mask into a contiguous region (STATE_STRIDE × f32 = 512 bytes). Slots 64..127
//! of each region are padding in the artifact and are not valid state keys.

/// Number of scoring categories in Scandinavian Yatzy (Ones through Yatzy).
pub const CATEGORY_COUNT: usize = 15;

/// Bitmask with every category scored.
pub const ALL_CATEGORIES: u16 = (1 << CATEGORY_COUNT) - 1;

/// Number of dice rolled each turn.
pub const DICE_COUNT: usize = 5;

/// Number of die faces.
pub const FACES: usize = 6;

/// Number of subsets of the six upper categories.
pub const UPPER_MASKS: usize = 64;

/// Stride per scored-categories mask in the state array.
pub const STATE_STRIDE: usize = 128;

/// Total number of slots in the state array: STATE_STRIDE * 2^15 = 4,194,304.
pub const NUM_STATES: usize = STATE_STRIDE * (1 << CATEGORY_COUNT);

/// Number of distinct sorted 5-dice multisets from {1..6}: C(10,5) = 252.
pub const NUM_DICE_SETS: usize = 252;

/// Number of unique keep-multisets for 0-5 dice from {1..6}: 1+6+21+56+126+252 = 462.
pub const NUM_KEEP_MULTISETS: usize = 462;

/// Number of reroll masks over five dice.
pub const NUM_MASKS: usize = 1 << DICE_COUNT;

/// Keep mask that retains every die.
pub const KEEP_ALL: i32 = (NUM_MASKS - 1) as i32;

/// Artifact magic number: "STZY" in little-endian bytes.
pub const STATE_FILE_MAGIC: u32 = 0x59545A53;

/// Artifact version: scored*128+up layout with padding.
pub const STATE_FILE_VERSION: u32 = 6;

/// Artifact version with θ (risk parameter) stored in the header.
pub const STATE_FILE_VERSION_THETA: u32 = 7;

/// Size of the artifact header in bytes.
pub const STATE_FILE_HEADER_SIZE: usize = 16;

/// File name looked up when the load root is a directory.
pub const STATE_FILE_NAME: &str = "all_states.bin";

/// Scandinavian Yatzy upper bonus: 50 points if upper score >= 63.
pub const UPPER_BONUS: f64 = 50.0;

/// Upper score cap.
pub const UPPER_SCORE_CAP: u8 = 63;

/// Interface revision reported by `yahtzeevalue_abi_version`.
pub const ABI_VERSION: i32 = 2;

/// Category indices, also the bit positions in the scored-categories mask
/// and the action ids returned by `best_action`.
pub const CATEGORY_ONES: usize = 0;
pub const CATEGORY_TWOS: usize = 1;
pub const CATEGORY_THREES: usize = 2;
pub const CATEGORY_FOURS: usize = 3;
pub const CATEGORY_FIVES: usize = 4;
pub const CATEGORY_SIXES: usize = 5;
pub const CATEGORY_ONE_PAIR: usize = 6;
pub const CATEGORY_TWO_PAIRS: usize = 7;
pub const CATEGORY_THREE_OF_A_KIND: usize = 8;
pub const CATEGORY_FOUR_OF_A_KIND: usize = 9;
pub const CATEGORY_SMALL_STRAIGHT: usize = 10;
pub const CATEGORY_LARGE_STRAIGHT: usize = 11;
pub const CATEGORY_FULL_HOUSE: usize = 12;
pub const CATEGORY_CHANCE: usize = 13;
pub const CATEGORY_YATZY: usize = 14;

/// Human-readable category names.
pub const CATEGORY_NAMES: [&str; CATEGORY_COUNT] = [
    "Ones",
    "Twos",
    "Threes",
    "Fours",
    "Fives",
    "Sixes",
    "One Pair",
    "Two Pairs",
    "Three of a Kind",
    "Four of a Kind",
    "Small Straight",
    "Large Straight",
    "Full House",
    "Chance",
    "Yatzy",
];

/// Map state S = (upper_score, scored_categories) to its flat index.
#[inline(always)]
pub fn state_index(upper_score: usize, scored_categories: usize) -> usize {
    scored_categories * STATE_STRIDE + upper_score
}

/// Test whether category `cat` has been scored (bit `cat` is set).
#[inline(always)]
pub fn is_category_scored(scored: u16, cat: usize) -> bool {
    (scored & (1 << cat)) != 0
}

/// Whether `cat` belongs to the upper section (Ones..Sixes).
#[inline(always)]
pub fn is_upper_category(cat: usize) -> bool {
    cat <= CATEGORY_SIXES
}
