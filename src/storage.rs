//! Binary I/O for value-table artifacts.
//!
//! Format: 16-byte header + f32[4,194,304] in state-key order
//! (`scored * 128 + upper`, slots 64..127 of each stride are padding).
//! Total file size: 16,777,232 bytes.
//!
//! Loading maps the file with `memmap2` by default; the owned variant reads it
//! into memory instead.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use memmap2::Mmap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::codec::GameState;
use crate::constants::*;
use crate::error::{Error, Result};
use crate::tables::GameTables;
use crate::widget::compute_expected_state_value;

/// Binary file header: magic + version + state count + θ bits.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateFileHeader {
    pub magic: u32,
    pub version: u32,
    pub total_states: u32,
    /// Version 6: 0. Version 7: `f32::to_bits(theta)`.
    pub theta_bits: u32,
}

impl StateFileHeader {
    pub fn new() -> Self {
        StateFileHeader {
            magic: STATE_FILE_MAGIC,
            version: STATE_FILE_VERSION,
            total_states: NUM_STATES as u32,
            theta_bits: 0,
        }
    }

    fn parse(bytes: &[u8]) -> StateFileHeader {
        let word = |i: usize| {
            let mut w = [0u8; 4];
            w.copy_from_slice(&bytes[i * 4..i * 4 + 4]);
            u32::from_le_bytes(w)
        };
        StateFileHeader {
            magic: word(0),
            version: word(1),
            total_states: word(2),
            theta_bits: word(3),
        }
    }

    fn to_bytes(self) -> [u8; STATE_FILE_HEADER_SIZE] {
        let mut out = [0u8; STATE_FILE_HEADER_SIZE];
        for (i, w) in [self.magic, self.version, self.total_states, self.theta_bits]
            .iter()
            .enumerate()
        {
            out[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
        }
        out
    }

    pub fn theta(&self) -> f32 {
        f32::from_bits(self.theta_bits)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.magic != STATE_FILE_MAGIC {
            return Err(Error::corrupt(
                path,
                format!("bad magic 0x{:08x}", self.magic),
            ));
        }
        if self.version != STATE_FILE_VERSION && self.version != STATE_FILE_VERSION_THETA {
            return Err(Error::corrupt(
                path,
                format!("unsupported version {}", self.version),
            ));
        }
        if self.total_states as usize != NUM_STATES {
            return Err(Error::corrupt(
                path,
                format!(
                    "header declares {} states, expected {}",
                    self.total_states, NUM_STATES
                ),
            ));
        }
        if self.theta_bits != 0 {
            return Err(Error::corrupt(
                path,
                format!(
                    "risk-sensitive table (theta = {}) stores utilities, not expected values",
                    self.theta()
                ),
            ));
        }
        Ok(())
    }
}

impl Default for StateFileHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Value storage: owned in memory, or memory-mapped from the artifact.
///
/// The mapping includes the 16-byte header, so `as_slice()` skips it.
pub enum StateValues {
    Owned(Vec<f32>),
    Mmap { mmap: Mmap },
}

impl StateValues {
    pub fn as_slice(&self) -> &[f32] {
        match self {
            StateValues::Owned(v) => v.as_slice(),
            StateValues::Mmap { mmap } => {
                // Length was checked at load; page alignment + 16 keeps f32 alignment.
                let data_ptr = unsafe { mmap.as_ptr().add(STATE_FILE_HEADER_SIZE) as *const f32 };
                unsafe { std::slice::from_raw_parts(data_ptr, NUM_STATES) }
            }
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, StateValues::Mmap { .. })
    }
}

/// Resolve a load root to an artifact file: a directory contributes
/// `all_states.bin`, anything else is taken as the file itself.
pub fn resolve_artifact_path(root: &Path) -> Result<PathBuf> {
    let meta = fs::metadata(root).map_err(|e| Error::from_io(root, e))?;
    let path = if meta.is_dir() {
        root.join(STATE_FILE_NAME)
    } else {
        root.to_path_buf()
    };
    let meta = fs::metadata(&path).map_err(|e| Error::from_io(&path, e))?;
    if !meta.is_file() {
        return Err(Error::NotFound(path));
    }
    Ok(path)
}

const EXPECTED_FILE_SIZE: u64 =
    (STATE_FILE_HEADER_SIZE + NUM_STATES * std::mem::size_of::<f32>()) as u64;

/// Open, size-check and header-check an artifact.
///
/// `preload` reads the values into an owned buffer instead of mapping the file.
pub fn load_state_values(path: &Path, preload: bool) -> Result<(StateFileHeader, StateValues)> {
    let start_time = Instant::now();
    debug!(path = %path.display(), preload, "loading state values");

    let file = File::open(path).map_err(|e| Error::from_io(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| Error::from_io(path, e))?
        .len();
    if len != EXPECTED_FILE_SIZE {
        return Err(Error::corrupt(
            path,
            format!("file size {} bytes, expected {}", len, EXPECTED_FILE_SIZE),
        ));
    }

    let (header, values) = if preload {
        let bytes = fs::read(path).map_err(|e| Error::from_io(path, e))?;
        if bytes.len() as u64 != EXPECTED_FILE_SIZE {
            return Err(Error::corrupt(path, "file changed size while reading"));
        }
        let header = StateFileHeader::parse(&bytes[..STATE_FILE_HEADER_SIZE]);
        header.validate(path)?;
        let values = bytes[STATE_FILE_HEADER_SIZE..]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        (header, StateValues::Owned(values))
    } else {
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::from_io(path, e))?;
        if mmap.len() as u64 != EXPECTED_FILE_SIZE {
            return Err(Error::corrupt(path, "file changed size while mapping"));
        }
        let header = StateFileHeader::parse(&mmap[..STATE_FILE_HEADER_SIZE]);
        header.validate(path)?;
        (header, StateValues::Mmap { mmap })
    };

    check_terminal_row(values.as_slice(), path)?;

    info!(
        path = %path.display(),
        states = header.total_states,
        version = header.version,
        mapped = values.is_mapped(),
        ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "loaded state values"
    );
    Ok((header, values))
}

/// Terminal states carry only the upper bonus: E(63, all) = 50, E(m < 63, all) = 0.
pub fn check_terminal_row(values: &[f32], path: &Path) -> Result<()> {
    let all = ALL_CATEGORIES as usize;
    for up in 0..=UPPER_SCORE_CAP as usize {
        let expected = if up == UPPER_SCORE_CAP as usize {
            UPPER_BONUS as f32
        } else {
            0.0
        };
        let got = values[state_index(up, all)];
        if got != expected {
            return Err(Error::corrupt(
                path,
                format!(
                    "terminal state (upper {}) holds {}, expected {}",
                    up, got, expected
                ),
            ));
        }
    }
    Ok(())
}

/// Tolerance for the last-turn recomputation in [`verify_state_values`].
pub const VERIFY_TOLERANCE: f64 = 1e-3;

/// Deep verification: every valid slot finite and non-negative, and every
/// last-turn state at upper score 0 consistent with the terminal row.
pub fn verify_state_values(tables: &GameTables, values: &[f32], path: &Path) -> Result<()> {
    let start_time = Instant::now();

    let bad = values
        .par_chunks(STATE_STRIDE)
        .enumerate()
        .find_map_any(|(scored, stride)| {
            stride[..=UPPER_SCORE_CAP as usize]
                .iter()
                .position(|v| !v.is_finite() || *v < 0.0)
                .map(|up| (scored, up, stride[up]))
        });
    if let Some((scored, up, v)) = bad {
        return Err(Error::corrupt(
            path,
            format!(
                "state key {} (upper {}, scored {:#06x}) holds {}",
                state_index(up, scored),
                up,
                scored,
                v
            ),
        ));
    }

    let mismatch = (0..CATEGORY_COUNT).into_par_iter().find_map_any(|cat| {
        let state = GameState::new(0, ALL_CATEGORIES ^ (1 << cat))?;
        let expected = compute_expected_state_value(tables, values, &state);
        let stored = values[state.encode() as usize] as f64;
        ((stored - expected).abs() > VERIFY_TOLERANCE).then_some((cat, stored, expected))
    });
    if let Some((cat, stored, expected)) = mismatch {
        return Err(Error::corrupt(
            path,
            format!(
                "last-turn state with only {} open holds {:.4}, recomputed {:.4}",
                CATEGORY_NAMES[cat], stored, expected
            ),
        ));
    }

    info!(
        path = %path.display(),
        ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "verified state values"
    );
    Ok(())
}

/// Write `values` as a version-6 artifact at `path`, creating parent directories.
pub fn save_state_values(path: &Path, values: &[f32]) -> Result<()> {
    let start_time = Instant::now();
    if values.len() != NUM_STATES {
        return Err(Error::InvalidArgument("value slice must hold exactly NUM_STATES entries"));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::from_io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| Error::from_io(path, e))?;
    let mut w = BufWriter::new(file);
    let write = |w: &mut BufWriter<File>| -> std::io::Result<()> {
        w.write_all(&StateFileHeader::new().to_bytes())?;
        for v in values {
            w.write_all(&v.to_le_bytes())?;
        }
        w.flush()
    };
    write(&mut w).map_err(|e| Error::from_io(path, e))?;

    info!(
        path = %path.display(),
        states = NUM_STATES,
        ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "saved state values"
    );
    Ok(())
}
