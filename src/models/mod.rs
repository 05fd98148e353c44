//! Domain models for randpick.
//!
//! - [`Item`]: one named entry of the collection, with an immutable id and a
//!   cosmetic color taken from [`PALETTE`] by creation ordinal.
//! - [`default_items`]: the ten entries seeded into an empty store.
//! - [`validate_name`]: the shared name rule for single add and edit.

mod defaults;
mod item;

pub use defaults::*;
pub use item::*;
