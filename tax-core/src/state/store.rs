//! Canonical cross-view state as an intent → reducer → snapshot channel.
//!
//! Views never mutate the shared state directly. They send a
//! [`StateIntent`] to [`StateStore::dispatch`]; the pure [`reduce`] function
//! produces the next state, which is published as an immutable [`Snapshot`]
//! to every subscriber. Each view keeps a [`ViewSync`] that remembers the
//! last state it produced, so the echo of its own write is recognised and
//! not recomputed. Intents that leave the state unchanged publish nothing,
//! which is what ends update cycles between views.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::models::{Allowances, InsuranceOptions, LawVersion, RegionType, SharedTaxState};

/// A requested change to the shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateIntent {
    SetLaw(LawVersion),
    SetGross(Decimal),
    SetDependents(u32),
    SetHasInsurance(bool),
    SetRegion(RegionType),
    SetDeclaredSalary(Option<Decimal>),
    SetAllowances(Allowances),
    SetInsuranceOptions(InsuranceOptions),
    /// Wholesale replacement, e.g. when a share link is opened.
    Replace(SharedTaxState),
}

/// Applies `intent` to `state`. Amounts below zero are stored as zero.
pub fn reduce(
    state: &SharedTaxState,
    intent: StateIntent,
) -> SharedTaxState {
    let mut next = state.clone();
    match intent {
        StateIntent::SetLaw(law) => next.law = law,
        StateIntent::SetGross(gross) => next.gross_income = gross.max(Decimal::ZERO),
        StateIntent::SetDependents(dependents) => next.dependents = dependents,
        StateIntent::SetHasInsurance(has_insurance) => next.has_insurance = has_insurance,
        StateIntent::SetRegion(region) => next.region = region,
        StateIntent::SetDeclaredSalary(declared) => {
            next.declared_salary = declared.filter(|d| *d > Decimal::ZERO)
        }
        StateIntent::SetAllowances(allowances) => next.allowances = allowances,
        StateIntent::SetInsuranceOptions(options) => next.insurance_options = options,
        StateIntent::Replace(state) => next = state,
    }
    next
}

/// Identifies a view attached to a [`StateStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(u32);

/// One published version of the shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub version: u64,
    /// View whose intent produced this snapshot; `None` for the initial one.
    pub origin: Option<ViewId>,
    pub state: Arc<SharedTaxState>,
}

/// A view's handle on the store: its id and its snapshot feed.
#[derive(Debug)]
pub struct Subscription {
    pub view: ViewId,
    pub snapshots: Receiver<Snapshot>,
}

/// Owner of the single canonical [`SharedTaxState`].
#[derive(Debug)]
pub struct StateStore {
    current: Snapshot,
    subscribers: Vec<Sender<Snapshot>>,
    next_view: u32,
}

impl StateStore {
    pub fn new(initial: SharedTaxState) -> Self {
        Self {
            current: Snapshot {
                version: 0,
                origin: None,
                state: Arc::new(initial),
            },
            subscribers: Vec::new(),
            next_view: 0,
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn state(&self) -> &SharedTaxState {
        &self.current.state
    }

    /// Registers a view. The current snapshot is delivered immediately so
    /// the view can render without waiting for the next change.
    pub fn subscribe(&mut self) -> Subscription {
        let view = ViewId(self.next_view);
        self.next_view += 1;

        let (sender, snapshots) = mpsc::channel();
        // The receiver is alive here, so the send cannot fail.
        let _ = sender.send(self.current.clone());
        self.subscribers.push(sender);

        Subscription { view, snapshots }
    }

    /// Applies `intent` and publishes the result. Returns `None`, and
    /// publishes nothing, when the intent does not change the state.
    pub fn dispatch(
        &mut self,
        origin: ViewId,
        intent: StateIntent,
    ) -> Option<Snapshot> {
        let next = reduce(&self.current.state, intent);
        if next == *self.current.state {
            trace!(?origin, "intent left state unchanged");
            return None;
        }

        self.current = Snapshot {
            version: self.current.version + 1,
            origin: Some(origin),
            state: Arc::new(next),
        };
        debug!(version = self.current.version, ?origin, "published snapshot");

        let snapshot = self.current.clone();
        self.subscribers
            .retain(|subscriber| subscriber.send(snapshot.clone()).is_ok());
        Some(snapshot)
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(SharedTaxState::default())
    }
}

/// Per-view bookkeeping that filters out the view's own echoes and stale
/// snapshots.
#[derive(Debug, Clone)]
pub struct ViewSync {
    view: ViewId,
    last_seen: Option<u64>,
    last_produced: Option<Arc<SharedTaxState>>,
}

impl ViewSync {
    pub fn new(view: ViewId) -> Self {
        Self {
            view,
            last_seen: None,
            last_produced: None,
        }
    }

    pub fn view(&self) -> ViewId {
        self.view
    }

    /// Dispatches on behalf of this view and remembers what it produced.
    pub fn produce(
        &mut self,
        store: &mut StateStore,
        intent: StateIntent,
    ) -> Option<Snapshot> {
        let snapshot = store.dispatch(self.view, intent)?;
        self.last_produced = Some(Arc::clone(&snapshot.state));
        Some(snapshot)
    }

    /// Whether `snapshot` carries state this view has not already rendered
    /// or produced itself.
    pub fn should_recompute(
        &mut self,
        snapshot: &Snapshot,
    ) -> bool {
        if self.last_seen.is_some_and(|seen| snapshot.version <= seen) {
            return false;
        }
        self.last_seen = Some(snapshot.version);

        let own_echo = self
            .last_produced
            .as_ref()
            .is_some_and(|produced| **produced == *snapshot.state);
        !own_echo
    }
}
