//! Generation-checked handles for instances owned by the boundary.
//!
//! A handle names a slot plus the generation the slot had when the handle
//! was issued. Deleting an instance bumps the slot's generation, so every
//! handle issued before the delete is detected as stale instead of reaching
//! whatever reuses the slot.
//!
//! On the wire a handle is one `u64`: `generation << 32 | slot`.
//! Generations start at 1, so the raw value `0` never names anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference to a boundary-owned instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    pub fn from_raw(raw: u64) -> Self {
        Self {
            slot: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }

    pub fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.slot)
    }

    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.to_raw()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_raw())
    }
}

/// Lookup failures for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HandleError {
    /// The handle was never issued by this table.
    #[error("unknown handle: {0}")]
    Unknown(Handle),

    /// The handle was issued, but its instance has since been deleted.
    #[error("stale handle: {0} (instance already deleted)")]
    Stale(Handle),
}

#[derive(Debug)]
enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
}

impl<T> Slot<T> {
    fn generation(&self) -> u32 {
        match self {
            Self::Occupied { generation, .. } | Self::Vacant { generation } => *generation,
        }
    }
}

/// Slot table that owns its instances and hands out [`Handle`]s.
#[derive(Debug)]
pub struct HandleTable<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live instances.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Take ownership of `value` and issue a handle for it.
    pub fn insert(&mut self, value: T) -> Handle {
        self.live += 1;
        if let Some(slot) = self.free.pop() {
            let generation = self.slots[slot as usize].generation();
            self.slots[slot as usize] = Slot::Occupied { generation, value };
            return Handle { slot, generation };
        }
        let slot = self.slots.len() as u32;
        self.slots.push(Slot::Occupied {
            generation: 1,
            value,
        });
        Handle {
            slot,
            generation: 1,
        }
    }

    pub fn get(&self, handle: Handle) -> Result<&T, HandleError> {
        match self.slots.get(handle.slot as usize) {
            Some(Slot::Occupied { generation, value }) if *generation == handle.generation => {
                Ok(value)
            }
            Some(slot) => Err(Self::miss(slot.generation(), handle)),
            None => Err(HandleError::Unknown(handle)),
        }
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut T, HandleError> {
        self.get(handle)?;
        match self.slots.get_mut(handle.slot as usize) {
            Some(Slot::Occupied { value, .. }) => Ok(value),
            _ => Err(HandleError::Unknown(handle)),
        }
    }

    /// Live instances in slot order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        })
    }

    /// Release the instance behind `handle` and hand it back to the caller.
    ///
    /// The slot's generation advances, invalidating `handle` and all copies
    /// of it.
    pub fn remove(&mut self, handle: Handle) -> Result<T, HandleError> {
        self.get(handle)?;
        let next = next_generation(handle.generation);
        let slot = std::mem::replace(
            &mut self.slots[handle.slot as usize],
            Slot::Vacant { generation: next },
        );
        self.free.push(handle.slot);
        self.live -= 1;
        match slot {
            Slot::Occupied { value, .. } => Ok(value),
            Slot::Vacant { .. } => Err(HandleError::Stale(handle)),
        }
    }

    fn miss(current: u32, handle: Handle) -> HandleError {
        if handle.generation != 0 && handle.generation < current {
            HandleError::Stale(handle)
        } else {
            HandleError::Unknown(handle)
        }
    }
}

fn next_generation(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        0 => 1,
        next => next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_encoding_roundtrips() {
        let handle = Handle {
            slot: 7,
            generation: 3,
        };
        assert_eq!(handle.to_raw(), (3u64 << 32) | 7);
        assert_eq!(Handle::from_raw(handle.to_raw()), handle);
    }

    #[test]
    fn zero_is_never_a_live_handle() {
        let mut table = HandleTable::new();
        table.insert("a");
        assert_eq!(
            table.get(Handle::from_raw(0)),
            Err(HandleError::Unknown(Handle::from_raw(0)))
        );
    }

    #[test]
    fn deleted_handle_is_stale_even_after_slot_reuse() {
        let mut table = HandleTable::new();
        let first = table.insert("a");
        assert_eq!(table.remove(first), Ok("a"));
        let second = table.insert("b");

        assert_eq!(second.slot(), first.slot());
        assert_ne!(second, first);
        assert_eq!(table.get(first), Err(HandleError::Stale(first)));
        assert_eq!(table.get(second), Ok(&"b"));
    }

    #[test]
    fn double_remove_is_rejected() {
        let mut table = HandleTable::new();
        let handle = table.insert(1);
        assert_eq!(table.remove(handle), Ok(1));
        assert_eq!(table.remove(handle), Err(HandleError::Stale(handle)));
        assert!(table.is_empty());
    }

    #[test]
    fn unissued_slot_is_unknown() {
        let table: HandleTable<u8> = HandleTable::new();
        let handle = Handle::from_raw((1u64 << 32) | 5);
        assert_eq!(table.get(handle), Err(HandleError::Unknown(handle)));
    }

    #[test]
    fn future_generation_is_unknown() {
        let mut table = HandleTable::new();
        let handle = table.insert(1);
        let forged = Handle {
            slot: handle.slot(),
            generation: handle.generation() + 5,
        };
        assert_eq!(table.get(forged), Err(HandleError::Unknown(forged)));
    }

    #[test]
    fn get_mut_checks_generation_before_handing_out_the_value() {
        let mut table = HandleTable::new();
        let handle = table.insert(1);
        *table.get_mut(handle).expect("live") += 41;
        assert_eq!(table.get(handle), Ok(&42));

        table.remove(handle).expect("live");
        assert_eq!(table.get_mut(handle), Err(HandleError::Stale(handle)));
    }

    #[test]
    fn values_skip_vacant_slots() {
        let mut table = HandleTable::new();
        let a = table.insert('a');
        table.insert('b');
        table.insert('c');
        table.remove(a).expect("a is live");
        assert_eq!(table.values().copied().collect::<String>(), "bc");
    }

    #[test]
    fn live_count_tracks_inserts_and_removes() {
        let mut table = HandleTable::new();
        let a = table.insert('a');
        table.insert('b');
        assert_eq!(table.len(), 2);
        table.remove(a).expect("a is live");
        assert_eq!(table.len(), 1);
    }
}
