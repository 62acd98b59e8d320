//! Gatework Runtime
//!
//! Builds gates from templates, wires them into circuits and advances
//! them one tick at a time.
//!
//! # Model
//!
//! - [`Gate`]: a function gate wrapping a transform, or a [`CircuitGate`]
//!   owning child gates
//! - [`Port`]: typed, directional endpoint with lazily created sub-ports
//! - [`Link`]: one-tick-delayed edge between two port leaves
//! - [`Simulation`]: a root gate plus the host links around it
//!
//! Links deliver the value written during tick `t` to their sink at tick
//! `t + 1`, so gate order inside a circuit never changes the result.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod circuit;
pub mod description;
pub mod error;
pub mod gate;
pub mod link;
pub mod port;
pub mod simulation;
pub mod template;
pub mod types;

pub use circuit::{CircuitGate, Element, Insertion, LinkEnd};
pub use description::{CircuitDescription, GateDescription, LinkSpec};
pub use error::{Error, ErrorCategory, Result};
pub use gate::{FunctionGate, Gate, GateKind};
pub use link::{Endpoint, Link, LinkTable, Node};
pub use port::{Direction, MAX_SUB_PORTS, PathSpec, PathStep, Port, PortPath};
pub use simulation::Simulation;
pub use template::{GateTemplate, Io, TemplateRegistry};
pub use types::*;
