//! Merge semantics for graph state.
//!
//! A [`StateUpdater`] is applied by the compiled graph after every node; the
//! [`reducers`] helpers are the per-field building blocks (append, overwrite).

pub mod reducers;
mod updater;

pub use updater::{boxed_updater, BoxedStateUpdater, FieldBasedUpdater, ReplaceUpdater, StateUpdater};
