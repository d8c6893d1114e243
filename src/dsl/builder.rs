use std::collections::{BTreeMap, HashSet};

use tracing::{debug, trace};

use crate::compiler::emit::{EmitOptions, to_json};
use crate::dsl::resource::{Resource, ResourceType};
use crate::dsl::{DEFAULT_TASK_TIMEOUT, State, StateKind, Target};
use crate::error::{GraphError, Result};

#[derive(Debug, Clone, PartialEq)]
struct Slot {
    state: State,
    /// Inserted via `next`, i.e. eligible to be wired to the next chained state.
    autoconnect: bool,
}

/// 状态机构建器
///
/// A graph is either a top-level state machine ([`Graph::new`]) or a branch
/// nested inside a Parallel state ([`Graph::branch`]). States keep their
/// insertion order; `StartAt`, the `End` marker and the name index are derived
/// from that order by [`Graph::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: String,
    region: String,
    account: String,
    pub comment: Option<String>,
    pub version: Option<String>,
    timeout_seconds: Option<u64>,
    slots: Vec<Slot>,
    names: HashSet<String>,
    start_at: Option<String>,
    states: Option<BTreeMap<String, usize>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("")
    }
}

impl Graph {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: String::new(),
            account: String::new(),
            comment: None,
            version: None,
            timeout_seconds: Some(DEFAULT_TASK_TIMEOUT),
            slots: Vec::new(),
            names: HashSet::new(),
            start_at: None,
            states: None,
        }
    }

    pub fn branch(name: impl Into<String>) -> Self {
        Self::new(name).into_branch()
    }

    pub(crate) fn into_branch(mut self) -> Self {
        self.timeout_seconds = None;
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Only top-level machines have a timeout; on a branch this is a no-op.
    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        if self.timeout_seconds.is_some() {
            self.timeout_seconds = Some(seconds);
        }
        self
    }

    /// Appends a state and makes it the successor of the nearest earlier state
    /// that was itself chained, can continue, and has no successor yet.
    pub fn next(mut self, state: State) -> Result<Self> {
        self.insert(state, true)?;
        Ok(self)
    }

    /// Appends a state without touching any successor links. Such states are
    /// reached through explicit `Next`, Catch or Choice wiring.
    pub fn add_state(mut self, state: State) -> Result<Self> {
        self.insert(state, false)?;
        Ok(self)
    }

    fn insert(&mut self, state: State, autoconnect: bool) -> Result<()> {
        if self.names.contains(state.name()) {
            return Err(self.duplicate(state.name()));
        }

        if autoconnect {
            let predecessor = self.slots.iter_mut().rev().find(|slot| {
                slot.autoconnect
                    && !slot.state.is_inherently_terminal()
                    && slot.state.next_state().is_none()
            });
            if let Some(slot) = predecessor {
                trace!(graph = %self.name, from = %slot.state.name(), to = %state.name(), "auto-chained");
                slot.state.set_next(Target::from(&state));
            }
        }

        if self.is_built() {
            self.invalidate();
        }

        debug!(graph = %self.name, state = %state.name(), kind = %state.state_type(), autoconnect, "state added");
        self.names.insert(state.name().to_string());
        self.slots.push(Slot { state, autoconnect });
        Ok(())
    }

    /// Drops everything the last `build` derived; the graph reads as unbuilt
    /// until it is built again.
    fn invalidate(&mut self) {
        trace!(graph = %self.name, "graph changed after build");
        self.start_at = None;
        self.states = None;
        for slot in &mut self.slots {
            slot.state.mark_end(false);
        }
    }

    fn duplicate(&self, name: &str) -> GraphError {
        GraphError::DuplicateName {
            name: name.to_string(),
            graph: self.name.clone(),
        }
    }

    /// Derives the structural fields from the insertion order.
    ///
    /// `StartAt` becomes the first state, the last state gets `End` unless it is
    /// a Succeed or Fail or already has an explicit `Next`, every Parallel state
    /// builds its branches and attaches its catchers, and the name index is
    /// rebuilt. Inserting after a build makes the graph unbuilt again; building
    /// again recomputes all of this from scratch.
    pub fn build(mut self) -> Result<Self> {
        self.start_at = self.slots.first().map(|slot| slot.state.name().to_string());

        let last = self.slots.len().checked_sub(1);
        let mut states = BTreeMap::new();
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            let end = Some(idx) == last
                && !slot.state.is_inherently_terminal()
                && slot.state.next_state().is_none();
            slot.state.mark_end(end);

            if let StateKind::Parallel(parallel) = slot.state.kind_mut() {
                parallel.finalize()?;
            }

            if states.insert(slot.state.name().to_string(), idx).is_some() {
                return Err(GraphError::DuplicateName {
                    name: slot.state.name().to_string(),
                    graph: self.name.clone(),
                });
            }
        }
        self.states = Some(states);

        debug!(graph = %self.name, states = self.slots.len(), start_at = ?self.start_at, "graph built");
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A resource in this graph's region and account.
    pub fn resource(&self, name: impl Into<String>, resource_type: ResourceType) -> Result<Resource> {
        Ok(Resource::new(name, resource_type)?
            .region(self.region.clone())
            .account(self.account.clone()))
    }

    pub fn start_at(&self) -> Option<&str> {
        self.start_at.as_deref()
    }

    pub fn timeout(&self) -> Option<u64> {
        self.timeout_seconds
    }

    pub fn is_branch(&self) -> bool {
        self.timeout_seconds.is_none()
    }

    pub fn is_built(&self) -> bool {
        self.states.is_some()
    }

    /// States in insertion order.
    pub fn states(&self) -> impl ExactSizeIterator<Item = &State> {
        self.slots.iter().map(|slot| &slot.state)
    }

    pub fn count_states(&self) -> usize {
        self.slots.len()
    }

    pub fn state_at(&self, index: usize) -> Option<&State> {
        self.slots.get(index).map(|slot| &slot.state)
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.slots
            .iter()
            .map(|slot| &slot.state)
            .find(|state| state.name() == name)
    }

    /// For explicit wiring after insertion, e.g. `set_next` on a disconnected state.
    pub fn state_mut(&mut self, name: &str) -> Option<&mut State> {
        self.slots
            .iter_mut()
            .map(|slot| &mut slot.state)
            .find(|state| state.name() == name)
    }

    /// The `States` mapping of the last build, name to state, sorted by name.
    pub fn built_states(&self) -> Option<impl Iterator<Item = (&str, &State)>> {
        self.states.as_ref().map(|index| {
            index
                .iter()
                .map(|(name, idx)| (name.as_str(), &self.slots[*idx].state))
        })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        to_json(self, &EmitOptions::default())
    }
}
