// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Gatework type system
//!
//! Structural descriptors for everything that flows through a circuit:
//!
//! - [`Interface`] describes the shape a port accepts or produces
//!   (`bit`, fixed collections, unbounded rests, the `any` placeholder
//!   and `none`).
//! - [`Value`] is a concrete bit tree that conforms to some interface.
//!
//! Both share a compact text grammar used by template documents and by
//! literal values embedded in serialized links:
//!
//! ```
//! # use gatework_types::{Interface, Value};
//! let iface: Interface = "[en: bit, data: <bit, 4>]".parse().unwrap();
//! assert_eq!(iface.to_string(), "[en: bit, data: <bit, 4>]");
//!
//! let value: Value = "[1, <0, 4>]".parse().unwrap();
//! assert!(iface.accepts(&value));
//! ```

pub mod error;
mod grammar;
pub mod interface;
pub mod value;

pub use error::{ParseError, ParseErrorKind, TypeError};
pub use grammar::{MAX_EXPANDED_NODES, MAX_REPEAT_COUNT};
pub use interface::{Interface, InterfaceKind, value_matches};
pub use value::{Value, ValueKind, parse_literal};
