//! Single-turn evaluation over a table of turn-start values.
//!
//! A turn starting at state S is evaluated bottom-up over the 252 dice sets:
//!
//!   1. Final roll: E[r] = max over open c of score(r, c) + V(successor)
//!   2. One reroll left: E1[r] = max over keeps of Σ P(keep → r') · E[r']
//!   3. Two rerolls left: E2[r] = the same step applied to E1
//!   4. Turn start: V(S) = Σ P(r) · E2[r]
//!
//! The argmax variants answer the policy queries. Ties keep the first candidate:
//! lowest category index, and keep-all before any reroll.

use crate::codec::GameState;
use crate::constants::*;
use crate::game_mechanics::update_upper_score;
use crate::tables::GameTables;

/// Per-dice-set expectations for one decision level.
pub type DiceSetValues = [f64; NUM_DICE_SETS];

#[inline(always)]
fn state_value(values: &[f32], upper_score: u8, scored: u16) -> f64 {
    values[state_index(upper_score as usize, scored as usize)] as f64
}

/// Value of scoring dice set `ds_index` in `category`: points plus the
/// successor's stored value.
#[inline]
pub fn category_value(
    tables: &GameTables,
    values: &[f32],
    state: &GameState,
    ds_index: usize,
    category: usize,
) -> f64 {
    let scr = tables.precomputed_scores[ds_index][category];
    let new_up = update_upper_score(state.upper_score(), category, scr);
    let new_scored = state.scored_categories() | (1 << category);
    scr as f64 + state_value(values, new_up, new_scored)
}

/// Best open category for a final roll and its value. `None` on a terminal state.
pub fn choose_best_category(
    tables: &GameTables,
    values: &[f32],
    state: &GameState,
    ds_index: usize,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for c in state.open_categories() {
        let val = category_value(tables, values, state, ds_index, c);
        match best {
            Some((_, best_val)) if val <= best_val => {}
            _ => best = Some((c, val)),
        }
    }
    best
}

/// Final-roll expectations E[r] for every dice set.
pub fn compute_final_roll_values(
    tables: &GameTables,
    values: &[f32],
    state: &GameState,
    out: &mut DiceSetValues,
) {
    for (ds_i, e) in out.iter_mut().enumerate() {
        *e = choose_best_category(tables, values, state, ds_i)
            .map_or(f64::NEG_INFINITY, |(_, v)| v);
    }
}

/// Best reroll mask for dice set `ds_index` against the next level's
/// expectations, with its value. Mask 0 (keep all) wins ties.
pub fn choose_best_reroll_mask(
    tables: &GameTables,
    e_ds: &DiceSetValues,
    ds_index: usize,
) -> (u8, f64) {
    let kt = &tables.keep_table;
    let mut best_val = e_ds[ds_index];
    let mut best_mask = 0u8;

    for j in 0..kt.unique_count[ds_index] as usize {
        let kid = kt.unique_keep_ids[ds_index][j] as usize;
        let ev: f64 = kt.row(kid).map(|(t, p)| p * e_ds[t]).sum();
        if ev > best_val {
            best_val = ev;
            best_mask = kt.keep_to_mask[ds_index * NUM_MASKS + j];
        }
    }

    (best_mask, best_val)
}

/// One reroll level: E_current[r] = max over masks of the expectation under E_prev.
pub fn compute_max_ev_for_n_rerolls(
    tables: &GameTables,
    e_ds_prev: &DiceSetValues,
    e_ds_current: &mut DiceSetValues,
) {
    for (ds_i, e) in e_ds_current.iter_mut().enumerate() {
        *e = choose_best_reroll_mask(tables, e_ds_prev, ds_i).1;
    }
}

/// Expected value at turn start for a non-terminal state, recomputed from the
/// stored values of its successors.
pub fn compute_expected_state_value(
    tables: &GameTables,
    values: &[f32],
    state: &GameState,
) -> f64 {
    let mut e = [[0.0f64; NUM_DICE_SETS]; 2];

    compute_final_roll_values(tables, values, state, &mut e[0]);

    let (e0, e1) = e.split_at_mut(1);
    compute_max_ev_for_n_rerolls(tables, &e0[0], &mut e1[0]);
    compute_max_ev_for_n_rerolls(tables, &e1[0], &mut e0[0]);

    tables
        .dice_set_probabilities
        .iter()
        .zip(e[0].iter())
        .map(|(p, v)| p * v)
        .sum()
}

/// Convert a reroll mask (bit set = reroll) to a keep mask (bit set = keep).
#[inline(always)]
pub fn reroll_to_keep_mask(reroll: u8) -> i32 {
    (!reroll & KEEP_ALL as u8) as i32
}
