//! Port interfaces
//!
//! An [`Interface`] is the structural type of a port. Interfaces are
//! compared with [`Interface::matches`] when a link is bound and refined
//! with [`Interface::merge_precise`] when a polymorphic `any` port learns
//! its concrete shape from the links wired into it.
//!
//! # Examples
//!
//! ```
//! # use gatework_types::Interface;
//! let rest: Interface = "<bit>".parse().unwrap();
//! let pair: Interface = "<bit, 2>".parse().unwrap();
//! assert!(rest.matches(&pair));
//!
//! let merged = Interface::any().merge_precise(&pair).unwrap();
//! assert_eq!(merged, pair);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseErrorKind, TypeError};
use crate::grammar::{self, Body, Node};
use crate::value::{Value, ValueKind};

/// Shape of an interface.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InterfaceKind {
    /// A single bit
    Bit,
    /// Fixed-arity, ordered, possibly heterogeneous collection
    Collection(Vec<Interface>),
    /// Unbounded homogeneous collection of the element type
    Rest(Box<Interface>),
    /// Unresolved placeholder; becomes concrete once connected
    Any,
    /// Carries no data
    None,
}

/// Structural type descriptor for a port, with an optional label.
///
/// Serialized as its canonical text form so template documents can
/// write `"input": "<bit, 2>"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interface {
    pub name: Option<String>,
    pub kind: InterfaceKind,
}

impl Interface {
    pub fn new(kind: InterfaceKind) -> Self {
        Self { name: None, kind }
    }

    pub fn bit() -> Self {
        Self::new(InterfaceKind::Bit)
    }

    pub fn any() -> Self {
        Self::new(InterfaceKind::Any)
    }

    pub fn none() -> Self {
        Self::new(InterfaceKind::None)
    }

    pub fn collection(children: Vec<Interface>) -> Self {
        Self::new(InterfaceKind::Collection(children))
    }

    pub fn rest(element: Interface) -> Self {
        Self::new(InterfaceKind::Rest(Box::new(element)))
    }

    /// Collection of `count` copies of `element` (`<element, count>`).
    pub fn repeat(element: Interface, count: usize) -> Self {
        Self::collection(vec![element; count])
    }

    /// Attach a label.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_bit(&self) -> bool {
        matches!(self.kind, InterfaceKind::Bit)
    }

    pub fn is_any(&self) -> bool {
        matches!(self.kind, InterfaceKind::Any)
    }

    pub fn is_none(&self) -> bool {
        matches!(self.kind, InterfaceKind::None)
    }

    /// Whether ports of this interface grow sub-ports on demand (`any` and rests).
    pub fn is_expandable(&self) -> bool {
        matches!(self.kind, InterfaceKind::Any | InterfaceKind::Rest(_))
    }

    /// Interface of the sub-port at `index`, if this shape has one there.
    ///
    /// `any` ports grow `any` sub-ports and rests grow their element;
    /// collections only have sub-ports within their arity.
    pub fn child(&self, index: usize) -> Option<Interface> {
        match &self.kind {
            InterfaceKind::Any => Some(Interface::any()),
            InterfaceKind::Rest(element) => Some((**element).clone()),
            InterfaceKind::Collection(children) => children.get(index).cloned(),
            InterfaceKind::Bit | InterfaceKind::None => None,
        }
    }

    /// Structural equality ignoring labels.
    pub fn same_shape(&self, other: &Interface) -> bool {
        use InterfaceKind::*;
        match (&self.kind, &other.kind) {
            (Bit, Bit) | (Any, Any) | (None, None) => true,
            (Rest(a), Rest(b)) => a.same_shape(b),
            (Collection(a), Collection(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.same_shape(b))
            }
            _ => false,
        }
    }

    /// Whether a link carrying `other` may bind to a port of this interface.
    ///
    /// `any` matches everything on either side. A `none` left operand
    /// matches unconditionally. Rests match collections whose children
    /// all share one shape.
    pub fn matches(&self, other: &Interface) -> bool {
        use InterfaceKind::*;
        match (&self.kind, &other.kind) {
            (Any, _) | (_, Any) => true,
            (None, _) => true,
            (Bit, Bit) => true,
            (Collection(children), Rest(element)) => match uniform_child(children) {
                Uniformity::Empty => true,
                Uniformity::Uniform(child) => child.matches(element),
                Uniformity::Mixed => false,
            },
            (Rest(element), Collection(children)) => match uniform_child(children) {
                Uniformity::Empty => true,
                Uniformity::Uniform(child) => element.matches(child),
                Uniformity::Mixed => false,
            },
            (Collection(a), Collection(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.matches(b))
            }
            (Rest(a), Rest(b)) => a.matches(b),
            _ => false,
        }
    }

    /// Whether `self` matches `other` or any interface nested inside it.
    pub fn matches_nested(&self, other: &Interface) -> bool {
        if self.matches(other) {
            return true;
        }
        match &other.kind {
            InterfaceKind::Collection(children) => {
                children.iter().any(|child| self.matches_nested(child))
            }
            InterfaceKind::Rest(element) => self.matches_nested(element),
            InterfaceKind::Bit | InterfaceKind::None | InterfaceKind::Any => false,
        }
    }

    /// The more specific of two interfaces.
    ///
    /// `any` yields to the other side, `none` keeps the left operand,
    /// collections and rests merge pointwise. Shapes that cannot be
    /// reconciled are an error.
    pub fn merge_precise(&self, other: &Interface) -> Result<Interface, TypeError> {
        use InterfaceKind::*;
        let merged_kind = match (&self.kind, &other.kind) {
            (Any, _) => return Ok(other.clone()),
            (_, Any) | (None, _) | (_, None) | (Bit, Bit) => return Ok(self.clone()),
            (Collection(a), Collection(b)) if a.len() == b.len() => Collection(
                a.iter()
                    .zip(b)
                    .map(|(a, b)| a.merge_precise(b))
                    .collect::<Result<_, _>>()?,
            ),
            (Rest(element), Collection(children)) => Collection(
                children
                    .iter()
                    .map(|child| element.merge_precise(child))
                    .collect::<Result<_, _>>()?,
            ),
            (Collection(children), Rest(element)) => Collection(
                children
                    .iter()
                    .map(|child| child.merge_precise(element))
                    .collect::<Result<_, _>>()?,
            ),
            (Rest(a), Rest(b)) => Rest(Box::new(a.merge_precise(b)?)),
            _ => {
                return Err(TypeError::Irreconcilable {
                    left: self.clone(),
                    right: other.clone(),
                });
            }
        };
        Ok(Interface {
            name: self.name.clone().or_else(|| other.name.clone()),
            kind: merged_kind,
        })
    }

    /// Whether `value` structurally conforms to this interface.
    pub fn accepts(&self, value: &Value) -> bool {
        match (&self.kind, &value.kind) {
            (InterfaceKind::Any, _) => true,
            (InterfaceKind::Bit, ValueKind::Bit(_)) => true,
            (InterfaceKind::Collection(children), ValueKind::Collection(values)) => {
                children.len() == values.len()
                    && children.iter().zip(values).all(|(i, v)| i.accepts(v))
            }
            (InterfaceKind::Rest(element), ValueKind::Collection(values)) => {
                values.iter().all(|v| element.accepts(v))
            }
            _ => false,
        }
    }

    /// Like [`Interface::accepts`], but as a typed error.
    pub fn check(&self, value: &Value) -> Result<(), TypeError> {
        if self.accepts(value) {
            Ok(())
        } else {
            Err(TypeError::ValueMismatch {
                value: value.clone(),
                interface: self.clone(),
            })
        }
    }

    fn node_count(&self) -> usize {
        match &self.kind {
            InterfaceKind::Collection(children) => {
                1 + children.iter().map(Interface::node_count).sum::<usize>()
            }
            InterfaceKind::Rest(element) => 1 + element.node_count(),
            InterfaceKind::Bit | InterfaceKind::Any | InterfaceKind::None => 1,
        }
    }

    fn from_node(node: &Node<'_>) -> Result<Self, ParseError> {
        let kind = match &node.body {
            Body::Atom("bit") => InterfaceKind::Bit,
            Body::Atom("any" | "*") => InterfaceKind::Any,
            Body::Atom("none") => InterfaceKind::None,
            Body::Atom(other) => {
                return Err(ParseError::new(
                    ParseErrorKind::Unknown,
                    other,
                    "unrecognized type",
                ));
            }
            Body::List(items) => InterfaceKind::Collection(
                items
                    .iter()
                    .map(Interface::from_node)
                    .collect::<Result<_, _>>()?,
            ),
            Body::Repeat { item, count } => {
                let element = Interface::from_node(item)?;
                match count {
                    Some(count) => {
                        grammar::check_expansion(element.node_count(), *count, node.text)?;
                        InterfaceKind::Collection(vec![element; *count])
                    }
                    None => InterfaceKind::Rest(Box::new(element)),
                }
            }
        };
        Ok(Interface {
            name: node.name(),
            kind,
        })
    }
}

/// Free-function form of [`Interface::accepts`].
pub fn value_matches(value: &Value, interface: &Interface) -> bool {
    interface.accepts(value)
}

enum Uniformity<'a> {
    Empty,
    Uniform(&'a Interface),
    Mixed,
}

fn uniform_child(children: &[Interface]) -> Uniformity<'_> {
    match children.split_first() {
        None => Uniformity::Empty,
        Some((first, rest)) if rest.iter().all(|c| c.same_shape(first)) => {
            Uniformity::Uniform(first)
        }
        Some(_) => Uniformity::Mixed,
    }
}

impl Default for Interface {
    fn default() -> Self {
        Interface::any()
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        match &self.kind {
            InterfaceKind::Bit => f.write_str("bit"),
            InterfaceKind::Any => f.write_str("any"),
            InterfaceKind::None => f.write_str("none"),
            InterfaceKind::Rest(element) => write!(f, "<{element}>"),
            InterfaceKind::Collection(children) => {
                let items: Vec<String> = children.iter().map(ToString::to_string).collect();
                grammar::write_items(f, &items)
            }
        }
    }
}

impl FromStr for Interface {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interface::from_node(&grammar::parse(s)?)
    }
}

impl TryFrom<String> for Interface {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interface> for String {
    fn from(value: Interface) -> Self {
        value.to_string()
    }
}
