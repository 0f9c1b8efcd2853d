//! Shared artifact fixture.
//!
//! Values are zero everywhere except the terminal row (bonus at 63) and the
//! fifteen last-turn states at upper score 0, which hold their exact one-turn
//! expectations so the deep verification passes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tempfile::TempDir;

use yahtzeevalue::codec::GameState;
use yahtzeevalue::constants::*;
use yahtzeevalue::runtime;
use yahtzeevalue::storage::save_state_values;
use yahtzeevalue::widget::compute_expected_state_value;

pub const ALL: u16 = ALL_CATEGORIES;

pub fn only_open(cat: usize) -> GameState {
    GameState::new(0, ALL ^ (1 << cat)).unwrap()
}

pub fn last_turn_values() -> Vec<f32> {
    let mut values = vec![0.0f32; NUM_STATES];
    values[state_index(63, ALL as usize)] = UPPER_BONUS as f32;
    let tables = runtime::tables();
    for cat in 0..CATEGORY_COUNT {
        let state = only_open(cat);
        let ev = compute_expected_state_value(tables, &values, &state);
        values[state.encode() as usize] = ev as f32;
    }
    values
}

struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

static FIXTURE: OnceLock<Fixture> = OnceLock::new();

/// Directory holding `all_states.bin`, written once per test binary.
pub fn artifact_root() -> &'static Path {
    &FIXTURE
        .get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_path_buf();
            save_state_values(&root.join(STATE_FILE_NAME), &last_turn_values()).unwrap();
            Fixture { _dir: dir, root }
        })
        .root
}

/// Copy of the fixture artifact at a fresh path, patched by `edit`.
pub fn patched_artifact(dir: &Path, edit: impl FnOnce(&mut Vec<u8>)) -> PathBuf {
    let mut bytes = std::fs::read(artifact_root().join(STATE_FILE_NAME)).unwrap();
    edit(&mut bytes);
    let path = dir.join("patched.bin");
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Byte offset of a state's value in the artifact.
pub fn value_offset(state: usize) -> usize {
    STATE_FILE_HEADER_SIZE + 4 * state
}

pub fn hist(dice: [u8; 5]) -> i64 {
    yahtzeevalue::DiceHistogram::from_dice(&dice)
        .unwrap()
        .encode() as i64
}
