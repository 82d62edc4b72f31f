// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work states and the legal-transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed dictionary of states a work instance can be in.
///
/// The wire identity of each state is its upper-case name; these strings are
/// persisted in the `state` table and must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkState {
    Pending,
    Staged,
    Started,
    Succeeded,
    Archived,
    Annotated,
    Unstaged,
    Completed,
    Failed,
    Cancelled,
}

/// All states, in dictionary-seeding order.
pub const ALL_STATES: [WorkState; 10] = [
    WorkState::Pending,
    WorkState::Staged,
    WorkState::Started,
    WorkState::Succeeded,
    WorkState::Archived,
    WorkState::Annotated,
    WorkState::Unstaged,
    WorkState::Completed,
    WorkState::Failed,
    WorkState::Cancelled,
];

impl WorkState {
    /// The stable wire name of this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkState::Pending => "PENDING",
            WorkState::Staged => "STAGED",
            WorkState::Started => "STARTED",
            WorkState::Succeeded => "SUCCEEDED",
            WorkState::Archived => "ARCHIVED",
            WorkState::Annotated => "ANNOTATED",
            WorkState::Unstaged => "UNSTAGED",
            WorkState::Completed => "COMPLETED",
            WorkState::Failed => "FAILED",
            WorkState::Cancelled => "CANCELLED",
        }
    }

    /// The human description seeded into the state dictionary.
    pub fn description(&self) -> &'static str {
        match self {
            WorkState::Pending => "Pending any action",
            WorkState::Staged => "Work data have been staged",
            WorkState::Started => "Work has started",
            WorkState::Succeeded => "Work was done successfully",
            WorkState::Archived => "Work data have been archived",
            WorkState::Annotated => "Work data have been annotated",
            WorkState::Unstaged => "Work data have been unstaged",
            WorkState::Completed => "All actions are complete",
            WorkState::Failed => "Work has failed",
            WorkState::Cancelled => "Work has been cancelled",
        }
    }

    /// True for states from which no further transition is legal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkState::Completed | WorkState::Cancelled)
    }

    /// True for states the pipeline can still advance toward completion.
    ///
    /// FAILED is excluded: a failed job goes nowhere until an operator
    /// cancels it, so it does not hold the dataset against new work.
    pub fn is_in_flight(&self) -> bool {
        !matches!(
            self,
            WorkState::Completed | WorkState::Cancelled | WorkState::Failed
        )
    }

    /// Whether moving from `self` to `to` is a legal transition.
    ///
    /// CANCELLED is reachable from every state except the terminal pair;
    /// FAILED is reachable only from STARTED. The STAGED -> UNSTAGED edge
    /// exists so that cancellation cleanup can be recorded separately.
    pub fn can_transition(&self, to: WorkState) -> bool {
        use WorkState::*;
        matches!(
            (*self, to),
            (Pending, Staged)
                | (Pending, Cancelled)
                | (Staged, Started)
                | (Staged, Unstaged)
                | (Staged, Cancelled)
                | (Started, Succeeded)
                | (Started, Failed)
                | (Started, Cancelled)
                | (Succeeded, Archived)
                | (Succeeded, Cancelled)
                | (Archived, Annotated)
                | (Archived, Cancelled)
                | (Annotated, Unstaged)
                | (Annotated, Cancelled)
                | (Unstaged, Completed)
                | (Unstaged, Cancelled)
                | (Failed, Cancelled)
        )
    }

    /// Validate a transition, returning the offending pair on failure.
    pub fn validate_transition(&self, to: WorkState) -> Result<(), TransitionError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(TransitionError { from: *self, to })
        }
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATES
            .iter()
            .find(|state| state.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

/// An illegal state move was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid transition from {from} to {to}")]
pub struct TransitionError {
    pub from: WorkState,
    pub to: WorkState,
}

/// A state name not present in the dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown work state: {0}")]
pub struct UnknownState(pub String);

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
