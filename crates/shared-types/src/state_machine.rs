//! # Versioned State Machine
//!
//! A declarative state machine shared by the subsystems that track entity
//! lifecycles: consensus node roles, bridge transfer statuses, and token
//! version states all have the same shape — a transition table, a per-state
//! timeout, and optional entry/exit hooks.
//!
//! Transitions outside the table fail with [`InvalidTransition`], which is
//! a distinguishable error kind (`FailedPrecondition` at the boundary),
//! never a generic failure.

use crate::errors::RpcError;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;
use thiserror::Error;

/// A transition that the table does not allow.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid transition: {from} -> {to}")]
pub struct InvalidTransition {
    /// State the entity was in.
    pub from: String,
    /// State the caller asked for.
    pub to: String,
}

impl From<InvalidTransition> for RpcError {
    fn from(err: InvalidTransition) -> Self {
        RpcError::failed_precondition(err.to_string())
    }
}

/// Hook invoked when a state is entered or exited.
type StateHook<S> = Box<dyn Fn(S) + Send + Sync>;

/// Declarative state machine: legal transitions, per-state timeouts,
/// optional entry/exit hooks.
pub struct StateMachine<S> {
    transitions: HashMap<S, HashSet<S>>,
    timeouts: HashMap<S, Duration>,
    on_entry: Option<StateHook<S>>,
    on_exit: Option<StateHook<S>>,
}

impl<S> StateMachine<S>
where
    S: Copy + Eq + Hash + Debug,
{
    /// Start building a machine.
    #[must_use]
    pub fn builder() -> StateMachineBuilder<S> {
        StateMachineBuilder::new()
    }

    /// Whether the table allows `from -> to`.
    #[must_use]
    pub fn can_transition(&self, from: S, to: S) -> bool {
        self.transitions
            .get(&from)
            .map(|nexts| nexts.contains(&to))
            .unwrap_or(false)
    }

    /// Perform `from -> to`, firing exit and entry hooks.
    pub fn transition(&self, from: S, to: S) -> Result<S, InvalidTransition> {
        if !self.can_transition(from, to) {
            return Err(InvalidTransition {
                from: format!("{from:?}"),
                to: format!("{to:?}"),
            });
        }
        if let Some(hook) = &self.on_exit {
            hook(from);
        }
        if let Some(hook) = &self.on_entry {
            hook(to);
        }
        Ok(to)
    }

    /// The configured timeout for a state, if any.
    #[must_use]
    pub fn timeout_for(&self, state: S) -> Option<Duration> {
        self.timeouts.get(&state).copied()
    }

    /// Whether an entity that entered `state` `elapsed` ago has exceeded
    /// the per-state timeout. States without a timeout never time out.
    #[must_use]
    pub fn is_timed_out(&self, state: S, elapsed: Duration) -> bool {
        self.timeout_for(state)
            .map(|limit| elapsed > limit)
            .unwrap_or(false)
    }
}

/// Builder for [`StateMachine`].
pub struct StateMachineBuilder<S> {
    transitions: HashMap<S, HashSet<S>>,
    timeouts: HashMap<S, Duration>,
    on_entry: Option<StateHook<S>>,
    on_exit: Option<StateHook<S>>,
}

impl<S> StateMachineBuilder<S>
where
    S: Copy + Eq + Hash + Debug,
{
    fn new() -> Self {
        Self {
            transitions: HashMap::new(),
            timeouts: HashMap::new(),
            on_entry: None,
            on_exit: None,
        }
    }

    /// Allow transitions from `from` to each state in `to`.
    #[must_use]
    pub fn allow(mut self, from: S, to: impl IntoIterator<Item = S>) -> Self {
        self.transitions.entry(from).or_default().extend(to);
        self
    }

    /// Set the timeout for a state.
    #[must_use]
    pub fn timeout(mut self, state: S, limit: Duration) -> Self {
        self.timeouts.insert(state, limit);
        self
    }

    /// Invoke `hook` whenever a state is entered.
    #[must_use]
    pub fn on_entry(mut self, hook: impl Fn(S) + Send + Sync + 'static) -> Self {
        self.on_entry = Some(Box::new(hook));
        self
    }

    /// Invoke `hook` whenever a state is exited.
    #[must_use]
    pub fn on_exit(mut self, hook: impl Fn(S) + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> StateMachine<S> {
        StateMachine {
            transitions: self.transitions,
            timeouts: self.timeouts,
            on_entry: self.on_entry,
            on_exit: self.on_exit,
        }
    }
}

/// A current state paired with the unix-seconds instant it was entered.
///
/// All mutations go through the owning [`StateMachine`]'s table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedState<S> {
    /// The current state.
    pub current: S,
    /// When the current state was entered (unix seconds).
    pub entered_at: u64,
}

impl<S> TrackedState<S>
where
    S: Copy + Eq + Hash + Debug,
{
    /// Start tracking in `initial` at time `now`.
    #[must_use]
    pub fn new(initial: S, now: u64) -> Self {
        Self {
            current: initial,
            entered_at: now,
        }
    }

    /// Transition to `to` at time `now` through the machine's table.
    pub fn transition_to(
        &mut self,
        machine: &StateMachine<S>,
        to: S,
        now: u64,
    ) -> Result<(), InvalidTransition> {
        machine.transition(self.current, to)?;
        self.current = to;
        self.entered_at = now;
        Ok(())
    }

    /// Whether the tracked state has exceeded its per-state timeout at `now`.
    #[must_use]
    pub fn is_timed_out(&self, machine: &StateMachine<S>, now: u64) -> bool {
        let elapsed = Duration::from_secs(now.saturating_sub(self.entered_at));
        machine.is_timed_out(self.current, elapsed)
    }
}
