// Allow unwrap in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! Transform Registry.
//!
//! Provides the named plugin contract behind function gates. A gate
//! template names its behavior (`"transform": "nand"`); the runtime asks
//! this registry for a fresh [`Transform`] instance when the gate is built.
//!
//! # Architecture
//!
//! Transforms come from two places:
//!
//! 1. The built-in library in [`builtins`] (logic primitives, constants,
//!    switch and clock sources)
//! 2. Plugins registered with [`linkme::distributed_slice`] into
//!    [`TRANSFORMS`], from this crate or any downstream crate
//!
//! Built-ins are consulted first, so a plugin cannot shadow `not` by
//! accident.
//!
//! # Transform Types
//!
//! - **Pure** ([`TransformImpl::Pure`]) - a plain function of the input value
//! - **Stateful** ([`TransformImpl::Stateful`]) - a factory producing one
//!   owned instance per gate, e.g. a switch remembering its position
//!
//! # Example Registration
//!
//! ```ignore
//! use gatework_transforms::{TRANSFORMS, TransformDescriptor, TransformImpl};
//! use gatework_transforms::linkme::distributed_slice;
//!
//! #[distributed_slice(TRANSFORMS)]
//! static MAJORITY: TransformDescriptor = TransformDescriptor {
//!     name: "majority",
//!     doc: "High when most input bits are high",
//!     category: "logic",
//!     implementation: TransformImpl::Pure(majority),
//! };
//! ```
//!
//! # Example Lookup
//!
//! ```
//! use gatework_transforms::{instantiate, is_known};
//! use gatework_types::Value;
//!
//! assert!(is_known("not"));
//! let mut not = instantiate("not").unwrap();
//! assert_eq!(not.apply(Some(&Value::low())).unwrap(), Some(Value::high()));
//! ```

pub mod builtins;

pub use gatework_types::Value;
pub use linkme;

use linkme::distributed_slice;
use thiserror::Error;

/// Transform result type
pub type Result<T> = std::result::Result<T, TransformError>;

/// Faults raised while evaluating a transform
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("input is unavailable")]
    MissingInput,

    #[error("expected {expected}, got `{found}`")]
    UnexpectedInput { expected: &'static str, found: String },

    #[error("{0}")]
    Failed(String),
}

/// Native behavior of a function gate.
///
/// `input` is `None` when the gate's input carries no data (a `none`
/// interface, or an unconnected `any`). Returning `None` means the
/// transform produced nothing for this tick.
pub trait Transform: Send {
    fn apply(&mut self, input: Option<&Value>) -> Result<Option<Value>>;

    /// Host click hook. Returns whether the click was handled.
    fn on_click(&mut self) -> bool {
        false
    }
}

impl<F> Transform for F
where
    F: FnMut(Option<&Value>) -> Result<Option<Value>> + Send,
{
    fn apply(&mut self, input: Option<&Value>) -> Result<Option<Value>> {
        self(input)
    }
}

/// Signature for stateless transforms
pub type PureFn = fn(Option<&Value>) -> Result<Option<Value>>;

/// Signature for stateful transform factories
pub type FactoryFn = fn() -> Box<dyn Transform>;

/// The implementation, tagged by whether each gate needs its own state
#[derive(Clone, Copy)]
pub enum TransformImpl {
    /// Pure function of the input
    Pure(PureFn),
    /// Factory for a per-gate stateful instance
    Stateful(FactoryFn),
}

impl TransformImpl {
    /// Create an instance for one gate
    pub fn instantiate(&self) -> Box<dyn Transform> {
        match *self {
            TransformImpl::Pure(f) => Box::new(f),
            TransformImpl::Stateful(factory) => factory(),
        }
    }

    pub fn is_stateful(&self) -> bool {
        matches!(self, TransformImpl::Stateful(_))
    }
}

/// Descriptor for a registered transform
pub struct TransformDescriptor {
    /// Template name (e.g. "not", "switch")
    pub name: &'static str,
    /// Documentation string
    pub doc: &'static str,
    /// Category tag (e.g. "logic", "source", "wiring")
    pub category: &'static str,
    /// The implementation
    pub implementation: TransformImpl,
}

impl TransformDescriptor {
    pub fn instantiate(&self) -> Box<dyn Transform> {
        self.implementation.instantiate()
    }
}

/// Distributed slice collecting plugin transform registrations.
#[distributed_slice]
pub static TRANSFORMS: [TransformDescriptor];

fn descriptors() -> impl Iterator<Item = &'static TransformDescriptor> {
    builtins::BUILTINS.iter().chain(TRANSFORMS.iter())
}

/// Get all registered transform names
pub fn all_names() -> impl Iterator<Item = &'static str> {
    descriptors().map(|t| t.name)
}

/// Look up a transform by name
pub fn get(name: &str) -> Option<&'static TransformDescriptor> {
    descriptors().find(|t| t.name == name)
}

/// Check if a name is a known transform
pub fn is_known(name: &str) -> bool {
    get(name).is_some()
}

/// Create a fresh instance of a transform by name
pub fn instantiate(name: &str) -> Option<Box<dyn Transform>> {
    get(name).map(TransformDescriptor::instantiate)
}
