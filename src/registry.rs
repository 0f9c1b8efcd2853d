//! Live tables addressed by opaque handles.
//!
//! A handle is a non-zero id issued from a monotonically increasing counter
//! and never reused, so any id below the counter that is no longer live was
//! unloaded. Queries take a clone of the table's `Arc` and drop the lock before
//! computing, so an unload racing a query only drops the registry's reference.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use tracing::info;

use crate::error::{Error, Result};
use crate::table::ValueTable;

pub type Handle = usize;

static LIVE: OnceLock<RwLock<HashMap<Handle, Arc<ValueTable>>>> = OnceLock::new();
static NEXT_HANDLE: AtomicUsize = AtomicUsize::new(1);

fn live() -> &'static RwLock<HashMap<Handle, Arc<ValueTable>>> {
    LIVE.get_or_init(|| RwLock::new(HashMap::new()))
}

fn was_issued(handle: Handle) -> bool {
    handle != 0 && handle < NEXT_HANDLE.load(Ordering::Acquire)
}

/// Take ownership of `table` and return its handle.
pub fn insert(table: ValueTable) -> Handle {
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::AcqRel);
    let mut map = live().write().unwrap_or_else(|err| err.into_inner());
    map.insert(handle, Arc::new(table));
    info!(handle, live = map.len(), "table registered");
    handle
}

pub fn get(handle: Handle) -> Result<Arc<ValueTable>> {
    let map = live().read().unwrap_or_else(|err| err.into_inner());
    match map.get(&handle) {
        Some(table) => Ok(Arc::clone(table)),
        None if was_issued(handle) => Err(Error::UseAfterUnload(handle)),
        None => Err(Error::InvalidHandle(handle)),
    }
}

/// Release `handle`. Releasing an already-released handle succeeds.
pub fn remove(handle: Handle) -> Result<()> {
    let removed = {
        let mut map = live().write().unwrap_or_else(|err| err.into_inner());
        map.remove(&handle)
    };
    match removed {
        Some(table) => {
            info!(
                handle,
                path = ?table.info().path,
                in_flight = Arc::strong_count(&table) - 1,
                "table unloaded"
            );
            Ok(())
        }
        None if was_issued(handle) => Ok(()),
        None => Err(Error::InvalidHandle(handle)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::error::ErrorCode;

    fn table() -> ValueTable {
        let mut values = vec![0.0f32; NUM_STATES];
        values[state_index(63, ALL_CATEGORIES as usize)] = 50.0;
        ValueTable::from_values(values).unwrap()
    }

    #[test]
    fn test_lifecycle() {
        let h = insert(table());
        assert!(h != 0);
        assert!(get(h).is_ok());
        remove(h).unwrap();
        assert_eq!(get(h).err().unwrap().code(), ErrorCode::UseAfterUnload);
        remove(h).unwrap();
    }

    #[test]
    fn test_handles_are_not_reused() {
        let a = insert(table());
        remove(a).unwrap();
        let b = insert(table());
        assert!(b > a);
        remove(b).unwrap();
    }

    #[test]
    fn test_unknown_handles() {
        assert_eq!(get(0).err().unwrap().code(), ErrorCode::InvalidHandle);
        assert_eq!(
            get(usize::MAX).err().unwrap().code(),
            ErrorCode::InvalidHandle
        );
        assert_eq!(
            remove(usize::MAX).err().unwrap().code(),
            ErrorCode::InvalidHandle
        );
    }

    #[test]
    fn test_query_outlives_unload() {
        let h = insert(table());
        let held = get(h).unwrap();
        remove(h).unwrap();
        assert_eq!(held.lookup(0).unwrap(), 0.0);
    }
}
