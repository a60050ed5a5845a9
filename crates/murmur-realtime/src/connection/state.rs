//! Per-connection lifecycle state.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;

/// `Connecting → Authenticating → Open → Closed`. `Closed` is terminal and
/// reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// Transport accepted, nothing checked yet.
    Connecting,
    /// Credential is being verified.
    Authenticating,
    /// Registered and receiving events.
    Open,
    /// Terminal.
    Closed,
}

impl ConnectionState {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Connecting, Authenticating)
                | (Authenticating, Open)
                | (Connecting | Authenticating | Open, Closed)
        )
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Connecting => 0,
            Self::Authenticating => 1,
            Self::Open => 2,
            Self::Closed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Authenticating,
            2 => Self::Open,
            _ => Self::Closed,
        }
    }
}

/// Lock-free holder for a [`ConnectionState`].
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    /// Start in `initial`.
    pub fn new(initial: ConnectionState) -> Self {
        Self(AtomicU8::new(initial.as_u8()))
    }

    /// Current state.
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next` if legal. Returns `false` when the transition was
    /// rejected, including a repeated close.
    pub fn transition(&self, next: ConnectionState) -> bool {
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                ConnectionState::from_u8(current)
                    .can_transition_to(next)
                    .then_some(next.as_u8())
            })
            .is_ok()
    }
}

/// A connection attempt that has not been registered yet.
#[derive(Debug)]
pub struct ConnectionAttempt {
    state: StateCell,
}

impl ConnectionAttempt {
    /// Transport accepted; starts in `Connecting`.
    pub fn new() -> Self {
        Self {
            state: StateCell::new(ConnectionState::Connecting),
        }
    }

    /// Current state.
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Credential extracted and about to be verified.
    pub fn authenticating(&self) -> bool {
        self.state.transition(ConnectionState::Authenticating)
    }

    /// Credential missing or invalid. The attempt ends in `Closed`.
    pub fn reject(&self) -> bool {
        self.state.transition(ConnectionState::Closed)
    }

    /// Credential verified for `user_id`.
    pub fn accept(self, user_id: i64) -> Authenticated {
        Authenticated {
            user_id,
            state: self.state,
        }
    }
}

impl Default for ConnectionAttempt {
    fn default() -> Self {
        Self::new()
    }
}

/// A verified attempt waiting to be opened.
///
/// Its state moves to `Open` when a
/// [`ConnectionHandle`](super::handle::ConnectionHandle) takes it over; an
/// attempt that skipped `Authenticating` cannot get there.
#[derive(Debug)]
pub struct Authenticated {
    /// Verified owner.
    pub user_id: i64,
    pub(crate) state: StateCell,
}
