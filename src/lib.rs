//! equal-to-containers: a map that matches keys through an explicit
//! `EqualTo` relation, and named zero-copy views over flat numeric buffers.
//!
//! Internal Design:
//!
//! Summary
//! - EqualToMap<K, V, S>: `hashbrown::HashTable` index of slot keys over
//!   `slotmap` storage. `Hash` places a key; `EqualTo` decides whether a
//!   stored key matches a query. Native `PartialEq`/`Eq` on `K` is never
//!   required or called.
//! - ViewType / NamedView<'t, B>: a frozen field-name table plus a view
//!   that reads and writes `buffer[index]` for each name. The buffer is
//!   borrowed (`&mut [T]`, `&mut Vec<T>`, ...) or, for `ViewType::zero`,
//!   freshly allocated.
//! - Solver: the calling contract of an external optimization backend,
//!   whose solution vector can be read through a named view.
//!
//! EqualToMap matching
//! - Each entry stores its precomputed `u64` hash. A query matches an entry
//!   iff the hashes are equal and `stored.equal_to(query)` holds.
//! - `EqualTo` runs only on full-hash matches and is never skipped on
//!   identity; callers may observe every call.
//! - A query of another type that happens to hash like a stored key (the
//!   bare scalar inside a key object) is absent unless `EqualTo` accepts it.
//! - Inserting an equivalent key replaces the value and keeps the stored
//!   key object.
//! - `raw()`/`into_raw()` hand the original key objects to a conventional
//!   `HashMap`; from there on `K: Eq` governs lookups.
//!
//! Named views
//! - Field names are checked for duplicates before and after
//!   sanitization; definition fails rather than deduplicating.
//! - A view never copies its buffer. While a `NamedView` over `&mut [T]`
//!   is alive the borrow checker keeps other writers out; once it is
//!   dropped, the caller sees every write made through it.
//! - Only whole-buffer slicing (`view[..]`) is a view operation; sub-ranges
//!   go through `as_slice()`.
//!
//! Constraints
//! - Single-threaded, synchronous, no I/O.
//! - All validation happens before a value is returned; no partially
//!   built map or view is observable.

mod equal_to;
mod equal_to_map;
mod equal_to_map_proptest;
mod error;
mod field_names;
mod named_view;
mod solver;

// Public surface
pub use equal_to::EqualTo;
pub use equal_to_map::{EqualToMap, Handle, Iter, IterMut};
pub use error::{KeyNotFound, NameStage, SolverError, ViewError};
pub use field_names::sanitize_field_name;
pub use named_view::{Buffer, BufferMut, NamedView, ViewOptions, ViewType};
pub use solver::{SolveResult, Solver, SolverId};
