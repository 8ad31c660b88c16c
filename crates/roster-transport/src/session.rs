//! Boundary-side owner of every counter and registry a caller creates.
//!
//! The caller only ever holds [`Handle`]s. Dropping the session drops every
//! instance still alive.

use std::fmt;

use roster_core::{
    Counter, DisplayId, IdentityKind, Registry, SyntheticIdentity, ValueIdentity,
};
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::handle::{Handle, HandleError, HandleTable};

/// Returned by `key_at` when the index is out of range.
pub const KEY_NOT_FOUND: i64 = -1;

/// A key as it crosses the boundary: an integer for synthetic registries,
/// text for value registries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistryKey {
    Id(i64),
    Text(String),
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Text(text) => write!(f, "{text:?}"),
        }
    }
}

/// One registry entry as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryRow {
    pub position: usize,
    pub key: RegistryKey,
    pub value: String,
}

/// A registry of either identity scheme, chosen at creation.
#[derive(Debug, Clone)]
pub enum RegistryInstance {
    Value(Registry<ValueIdentity>),
    Synthetic(Registry<SyntheticIdentity>),
}

fn display_id(id: i64) -> Option<DisplayId> {
    u64::try_from(id).ok().map(DisplayId)
}

fn wire_id(id: DisplayId) -> i64 {
    i64::try_from(id.get()).unwrap_or(KEY_NOT_FOUND)
}

impl RegistryInstance {
    pub fn new(identity: IdentityKind) -> Self {
        match identity {
            IdentityKind::Value => Self::Value(Registry::new()),
            IdentityKind::Synthetic => Self::Synthetic(Registry::new()),
        }
    }

    pub fn identity(&self) -> IdentityKind {
        match self {
            Self::Value(_) => IdentityKind::Value,
            Self::Synthetic(_) => IdentityKind::Synthetic,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Value(registry) => registry.len(),
            Self::Synthetic(registry) => registry.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, text: &str) {
        match self {
            Self::Value(registry) => {
                registry.add(text);
            }
            Self::Synthetic(registry) => {
                registry.add(text);
            }
        }
    }

    pub fn remove_last(&mut self) {
        match self {
            Self::Value(registry) => {
                registry.remove_last();
            }
            Self::Synthetic(registry) => {
                registry.remove_last();
            }
        }
    }

    /// Remove the first entry addressed by `key`. `Ok(false)` on a miss.
    pub fn remove(&mut self, key: &RegistryKey) -> Result<bool, TransportError> {
        match (self, key) {
            (Self::Value(registry), RegistryKey::Text(text)) => Ok(registry.remove(text).is_some()),
            (Self::Synthetic(registry), RegistryKey::Id(id)) => {
                Ok(display_id(*id).is_some_and(|id| registry.remove(&id).is_some()))
            }
            (this, key) => Err(TransportError::KeyKindMismatch {
                identity: this.identity(),
                key: key.to_string(),
            }),
        }
    }

    /// Duplicate the first entry addressed by `key`. `Ok(false)` on a miss.
    pub fn duplicate(&mut self, key: &RegistryKey) -> Result<bool, TransportError> {
        match (self, key) {
            (Self::Value(registry), RegistryKey::Text(text)) => {
                Ok(registry.duplicate(text).is_some())
            }
            (Self::Synthetic(registry), RegistryKey::Id(id)) => {
                Ok(display_id(*id).is_some_and(|id| registry.duplicate(&id).is_some()))
            }
            (this, key) => Err(TransportError::KeyKindMismatch {
                identity: this.identity(),
                key: key.to_string(),
            }),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Self::Value(registry) => registry.render(),
            Self::Synthetic(registry) => registry.render(),
        }
    }

    /// Displayed key at `index`, or [`KEY_NOT_FOUND`].
    pub fn key_at(&self, index: i64) -> Result<i64, TransportError> {
        match self {
            Self::Value(_) => Err(TransportError::IdentityUnsupported {
                action: "registry.key_at",
                identity: IdentityKind::Value,
            }),
            Self::Synthetic(registry) => Ok(usize::try_from(index)
                .ok()
                .and_then(|index| registry.key_at(index))
                .map_or(KEY_NOT_FOUND, wire_id)),
        }
    }

    pub fn rows(&self) -> Vec<EntryRow> {
        match self {
            Self::Value(registry) => registry
                .entries()
                .map(|view| EntryRow {
                    position: view.position,
                    key: RegistryKey::Text(view.value.to_string()),
                    value: view.value.to_string(),
                })
                .collect(),
            Self::Synthetic(registry) => registry
                .entries()
                .map(|view| EntryRow {
                    position: view.position,
                    key: RegistryKey::Id(wire_id(view.key)),
                    value: view.value.to_string(),
                })
                .collect(),
        }
    }
}

/// Anything a handle can name.
#[derive(Debug, Clone)]
enum Instance {
    Counter(Counter),
    Registry(RegistryInstance),
}

/// Owner of all boundary instances.
///
/// Counters and registries share one handle space, so a handle issued for
/// one kind never resolves as the other.
#[derive(Debug, Default)]
pub struct Session {
    instances: HandleTable<Instance>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_counters(&self) -> usize {
        self.instances
            .values()
            .filter(|instance| matches!(instance, Instance::Counter(_)))
            .count()
    }

    pub fn live_registries(&self) -> usize {
        self.instances
            .values()
            .filter(|instance| matches!(instance, Instance::Registry(_)))
            .count()
    }

    fn counter(&self, handle: Handle) -> Result<&Counter, TransportError> {
        match self.instances.get(handle)? {
            Instance::Counter(counter) => Ok(counter),
            Instance::Registry(_) => Err(HandleError::Unknown(handle).into()),
        }
    }

    fn counter_mut(&mut self, handle: Handle) -> Result<&mut Counter, TransportError> {
        match self.instances.get_mut(handle)? {
            Instance::Counter(counter) => Ok(counter),
            Instance::Registry(_) => Err(HandleError::Unknown(handle).into()),
        }
    }

    fn registry_mut(&mut self, handle: Handle) -> Result<&mut RegistryInstance, TransportError> {
        match self.instances.get_mut(handle)? {
            Instance::Registry(registry) => Ok(registry),
            Instance::Counter(_) => Err(HandleError::Unknown(handle).into()),
        }
    }

    // ── Counter ──

    pub fn create_counter(&mut self, initial: i32) -> Handle {
        let handle = self.instances.insert(Instance::Counter(Counter::new(initial)));
        tracing::debug!(%handle, initial, "counter created");
        handle
    }

    pub fn increment_counter(&mut self, handle: Handle) -> Result<i32, TransportError> {
        Ok(self.counter_mut(handle)?.increment())
    }

    pub fn counter_value(&self, handle: Handle) -> Result<i32, TransportError> {
        Ok(self.counter(handle)?.get())
    }

    pub fn reset_counter(&mut self, handle: Handle) -> Result<i32, TransportError> {
        let counter = self.counter_mut(handle)?;
        counter.reset();
        Ok(counter.get())
    }

    pub fn delete_counter(&mut self, handle: Handle) -> Result<(), TransportError> {
        self.counter(handle)?;
        self.instances.remove(handle)?;
        tracing::debug!(%handle, "counter deleted");
        Ok(())
    }

    // ── Registry ──

    pub fn create_registry(&mut self, identity: IdentityKind) -> Handle {
        let handle = self
            .instances
            .insert(Instance::Registry(RegistryInstance::new(identity)));
        tracing::debug!(%handle, %identity, "registry created");
        handle
    }

    pub fn registry(&self, handle: Handle) -> Result<&RegistryInstance, TransportError> {
        match self.instances.get(handle)? {
            Instance::Registry(registry) => Ok(registry),
            Instance::Counter(_) => Err(HandleError::Unknown(handle).into()),
        }
    }

    pub fn add_string(&mut self, handle: Handle, text: &str) -> Result<usize, TransportError> {
        let registry = self.registry_mut(handle)?;
        registry.add(text);
        Ok(registry.len())
    }

    pub fn remove_last_string(&mut self, handle: Handle) -> Result<usize, TransportError> {
        let registry = self.registry_mut(handle)?;
        registry.remove_last();
        Ok(registry.len())
    }

    pub fn remove_specific_string(
        &mut self,
        handle: Handle,
        key: &RegistryKey,
    ) -> Result<bool, TransportError> {
        self.registry_mut(handle)?.remove(key)
    }

    pub fn duplicate_string(
        &mut self,
        handle: Handle,
        key: &RegistryKey,
    ) -> Result<bool, TransportError> {
        self.registry_mut(handle)?.duplicate(key)
    }

    pub fn formatted_string(&self, handle: Handle) -> Result<String, TransportError> {
        Ok(self.registry(handle)?.render())
    }

    pub fn key_at_position(&self, handle: Handle, index: i64) -> Result<i64, TransportError> {
        self.registry(handle)?.key_at(index)
    }

    pub fn entries(&self, handle: Handle) -> Result<Vec<EntryRow>, TransportError> {
        Ok(self.registry(handle)?.rows())
    }

    pub fn delete_registry(&mut self, handle: Handle) -> Result<(), TransportError> {
        self.registry(handle)?;
        self.instances.remove(handle)?;
        tracing::debug!(%handle, "registry deleted");
        Ok(())
    }
}
