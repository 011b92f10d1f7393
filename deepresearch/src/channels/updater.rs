//! State updater: how a node's partial update is merged into the current state.
//!
//! Every graph is built with an explicit updater. Per-field strategies (append a
//! list, overwrite a scalar) are expressed in Rust as a `StateUpdater` impl:
//!
//! ```rust,ignore
//! impl StateUpdater<MyState> for MyReducer {
//!     fn apply_update(&self, current: &mut MyState, update: MyUpdate) {
//!         reducers::append(&mut current.messages, update.messages);
//!         reducers::overwrite(&mut current.count, update.count);
//!     }
//! }
//! ```

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::graph::GraphState;

/// Merges a node's update into the current state.
pub trait StateUpdater<S>: Send + Sync + Debug
where
    S: GraphState,
{
    /// Called by the driver after each node execution.
    fn apply_update(&self, current: &mut S, update: S::Update);
}

/// Replaces the entire state. Only for states whose update type is the state itself.
#[derive(Debug, Clone, Default)]
pub struct ReplaceUpdater;

impl<S> StateUpdater<S> for ReplaceUpdater
where
    S: GraphState<Update = S>,
{
    fn apply_update(&self, current: &mut S, update: S) {
        *current = update;
    }
}

/// Updater backed by a closure.
pub struct FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) + Send + Sync + 'static,
{
    updater_fn: F,
    _marker: PhantomData<fn() -> S>,
}

impl<S, F> Debug for FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBasedUpdater")
            .field("updater_fn", &"<function>")
            .finish()
    }
}

impl<S, F> FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) + Send + Sync + 'static,
{
    pub fn new(updater_fn: F) -> Self {
        Self {
            updater_fn,
            _marker: PhantomData,
        }
    }
}

impl<S, F> StateUpdater<S> for FieldBasedUpdater<S, F>
where
    S: GraphState,
    F: Fn(&mut S, S::Update) + Send + Sync + 'static,
{
    fn apply_update(&self, current: &mut S, update: S::Update) {
        (self.updater_fn)(current, update);
    }
}

/// Boxed state updater for type erasure.
pub type BoxedStateUpdater<S> = Arc<dyn StateUpdater<S>>;

pub fn boxed_updater<S, U>(updater: U) -> BoxedStateUpdater<S>
where
    S: GraphState,
    U: StateUpdater<S> + 'static,
{
    Arc::new(updater)
}
