//! Session state shared between calculator views.

pub mod share;
pub mod store;

pub use store::{Snapshot, StateIntent, StateStore, Subscription, ViewId, ViewSync, reduce};
