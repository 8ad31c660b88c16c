//! # Roster Core
//!
//! An ordered registry of lowercase strings plus a plain counter, the state
//! behind the roster demo screen.
//!
//! The registry is generic over its identity scheme:
//!
//! ```text
//! Registry<ValueIdentity>      ← key = the (lowercased) value itself
//! Registry<SyntheticIdentity>  ← key = displayed integer ID
//!     │
//! Entry { value, origin }      ← origin: ID allocated at creation, never rewritten
//!     │
//! EntryView { position, key }  ← displayed key, computed on demand
//! ```
//!
//! Lookups that miss are silent no-ops. Nothing here can fail except parsing
//! an [`IdentityKind`] from text.

pub mod counter;
pub mod error;
pub mod identity;
pub mod registry;
pub mod render;

pub use counter::Counter;
pub use error::UnknownIdentityKind;
pub use identity::{
    DisplayId, EntryId, IdentityKind, IdentityScheme, SyntheticIdentity, ValueIdentity,
};
pub use registry::{Entry, EntryView, Registry};
pub use render::{normalize, render_sentence, split_sentence};
