//! Loaded value tables and the four queries served from them.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec::{DiceHistogram, GameState};
use crate::config::LoadOptions;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::runtime;
use crate::storage::{self, StateValues};
use crate::tables::GameTables;
use crate::widget::{
    choose_best_category, choose_best_reroll_mask, compute_final_roll_values,
    compute_max_ev_for_n_rerolls, reroll_to_keep_mask,
};

/// Where a table's values came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInfo {
    /// Artifact path, `None` for tables built in memory.
    pub path: Option<PathBuf>,
    pub mapped: bool,
    pub version: u32,
}

/// All three decisions of a turn for one (state, roll) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnDecision {
    pub best_action: i32,
    pub keep_first: i32,
    pub keep_second: i32,
}

/// Immutable expected values for every turn-start state.
///
/// Policy queries are answered by evaluating the one turn that starts at the
/// queried state against the stored values of its successors.
pub struct ValueTable {
    values: StateValues,
    path: Option<PathBuf>,
    version: u32,
}

impl ValueTable {
    /// Resolve `root`, map or read the artifact, and validate it.
    pub fn load(root: &Path, options: LoadOptions) -> Result<ValueTable> {
        let tables = runtime::tables();
        let path = storage::resolve_artifact_path(root)?;
        let (header, values) = storage::load_state_values(&path, options.preload)?;
        if options.verify {
            storage::verify_state_values(tables, values.as_slice(), &path)?;
        }
        Ok(ValueTable {
            values,
            path: Some(path),
            version: header.version,
        })
    }

    /// In-memory table over `values` in state-key order. The terminal row is
    /// checked the same way as for loaded artifacts.
    pub fn from_values(values: Vec<f32>) -> Result<ValueTable> {
        if values.len() != NUM_STATES {
            return Err(Error::InvalidArgument(
                "value vector must hold exactly NUM_STATES entries",
            ));
        }
        storage::check_terminal_row(&values, Path::new("<memory>"))?;
        Ok(ValueTable {
            values: StateValues::Owned(values),
            path: None,
            version: STATE_FILE_VERSION,
        })
    }

    pub fn values(&self) -> &[f32] {
        self.values.as_slice()
    }

    pub fn info(&self) -> TableInfo {
        TableInfo {
            path: self.path.clone(),
            mapped: self.values.is_mapped(),
            version: self.version,
        }
    }

    /// Expected final score from the start of a turn in `state`, bonus included.
    pub fn lookup(&self, state: i64) -> Result<f64> {
        let state = decode_state(state)?;
        Ok(self.values()[state.encode() as usize] as f64)
    }

    /// Category (0..=14) to score after the last roll of the turn.
    pub fn best_action(&self, state: i64, histogram: i64) -> Result<i32> {
        let (state, ds) = self.decision_point(state, histogram)?;
        let tables = runtime::tables();
        choose_best_category(tables, self.values(), &state, ds)
            .map(|(c, _)| c as i32)
            .ok_or(Error::IncompatibleState(state.encode()))
    }

    /// Keep mask over the sorted dice with two rerolls left.
    pub fn keep_first(&self, state: i64, histogram: i64) -> Result<i32> {
        let (state, ds) = self.decision_point(state, histogram)?;
        let tables = runtime::tables();
        let mut e0 = [0.0; NUM_DICE_SETS];
        let mut e1 = [0.0; NUM_DICE_SETS];
        compute_final_roll_values(tables, self.values(), &state, &mut e0);
        compute_max_ev_for_n_rerolls(tables, &e0, &mut e1);
        let (reroll, _) = choose_best_reroll_mask(tables, &e1, ds);
        Ok(reroll_to_keep_mask(reroll))
    }

    /// Keep mask over the sorted dice with one reroll left.
    pub fn keep_second(&self, state: i64, histogram: i64) -> Result<i32> {
        let (state, ds) = self.decision_point(state, histogram)?;
        let tables = runtime::tables();
        let mut e0 = [0.0; NUM_DICE_SETS];
        compute_final_roll_values(tables, self.values(), &state, &mut e0);
        let (reroll, _) = choose_best_reroll_mask(tables, &e0, ds);
        Ok(reroll_to_keep_mask(reroll))
    }

    /// `best_action`, `keep_first` and `keep_second` in one pass over the turn.
    pub fn decide(&self, state: i64, histogram: i64) -> Result<TurnDecision> {
        let (state, ds) = self.decision_point(state, histogram)?;
        let tables = runtime::tables();
        let (category, _) = choose_best_category(tables, self.values(), &state, ds)
            .ok_or(Error::IncompatibleState(state.encode()))?;

        let mut e0 = [0.0; NUM_DICE_SETS];
        let mut e1 = [0.0; NUM_DICE_SETS];
        compute_final_roll_values(tables, self.values(), &state, &mut e0);
        compute_max_ev_for_n_rerolls(tables, &e0, &mut e1);
        Ok(TurnDecision {
            best_action: category as i32,
            keep_first: reroll_to_keep_mask(choose_best_reroll_mask(tables, &e1, ds).0),
            keep_second: reroll_to_keep_mask(choose_best_reroll_mask(tables, &e0, ds).0),
        })
    }

    fn decision_point(&self, state: i64, histogram: i64) -> Result<(GameState, usize)> {
        let state = decode_state(state)?;
        let histogram = decode_histogram(histogram)?;
        if state.is_terminal() {
            debug!(state = state.encode(), "decision requested at terminal state");
            return Err(Error::IncompatibleState(state.encode()));
        }
        Ok((state, dice_set_index(runtime::tables(), &histogram)))
    }
}

fn decode_state(key: i64) -> Result<GameState> {
    u32::try_from(key)
        .ok()
        .and_then(GameState::decode)
        .ok_or(Error::InvalidStateKey(key))
}

fn decode_histogram(key: i64) -> Result<DiceHistogram> {
    u32::try_from(key)
        .ok()
        .and_then(DiceHistogram::decode)
        .ok_or(Error::InvalidHistogramKey(key))
}

#[inline]
fn dice_set_index(tables: &GameTables, histogram: &DiceHistogram) -> usize {
    tables.find_dice_set_index(&histogram.sorted_dice())
}
