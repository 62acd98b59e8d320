//! Core runtime types
//!
//! Identifiers, coordinates and the per-tick context handed back to hosts.

use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Identifier of a gate within its owning circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GateId(pub u64);

impl fmt::Display for GateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gate#{}", self.0)
    }
}

/// Identifier of a link within its owning link table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// Opaque 2-D placement of a gate.
///
/// Carried through serialization for editors; the simulation never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Context returned after a tick completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickContext {
    /// Number of the tick that just ran, starting at 0
    pub tick: u64,
}
