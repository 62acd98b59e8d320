//! Runtime values
//!
//! A [`Value`] is a tree of bits. Values travel along links and are
//! checked against the receiving port's [`crate::Interface`] before they
//! are read or written.

use std::fmt;
use std::str::FromStr;

use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{self, Body, Node};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bit(bool),
    Collection(Vec<Value>),
}

/// A bit or an ordered collection of values, with an optional label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Value {
    pub name: Option<String>,
    pub kind: ValueKind,
}

impl Value {
    pub fn bit(bit: bool) -> Self {
        Self {
            name: None,
            kind: ValueKind::Bit(bit),
        }
    }

    pub fn high() -> Self {
        Self::bit(true)
    }

    pub fn low() -> Self {
        Self::bit(false)
    }

    pub fn collection(children: Vec<Value>) -> Self {
        Self {
            name: None,
            kind: ValueKind::Collection(children),
        }
    }

    /// Build a collection of bits, least significant first.
    pub fn bits(bits: impl IntoIterator<Item = bool>) -> Self {
        Self::collection(bits.into_iter().map(Value::bit).collect())
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn as_bit(&self) -> Option<bool> {
        match self.kind {
            ValueKind::Bit(bit) => Some(bit),
            ValueKind::Collection(_) => None,
        }
    }

    pub fn children(&self) -> Option<&[Value]> {
        match &self.kind {
            ValueKind::Collection(children) => Some(children),
            ValueKind::Bit(_) => None,
        }
    }

    /// Every bit in the tree, depth first.
    pub fn leaves(&self) -> Vec<bool> {
        match &self.kind {
            ValueKind::Bit(bit) => vec![*bit],
            ValueKind::Collection(children) => children.iter().flat_map(Value::leaves).collect(),
        }
    }

    fn node_count(&self) -> usize {
        match &self.kind {
            ValueKind::Bit(_) => 1,
            ValueKind::Collection(children) => {
                1 + children.iter().map(Value::node_count).sum::<usize>()
            }
        }
    }

    fn from_node(node: &Node<'_>) -> Result<Self, ParseError> {
        let kind = match &node.body {
            Body::Atom("0") => ValueKind::Bit(false),
            Body::Atom("1") => ValueKind::Bit(true),
            Body::Atom(atom @ ("any" | "*" | "none")) => {
                return Err(ParseError::new(
                    ParseErrorKind::NotAValue,
                    atom,
                    "placeholder is not a concrete value",
                ));
            }
            Body::Atom(other) => {
                return Err(ParseError::new(
                    ParseErrorKind::Unknown,
                    other,
                    "unrecognized value",
                ));
            }
            Body::List(items) => ValueKind::Collection(
                items
                    .iter()
                    .map(Value::from_node)
                    .collect::<Result<_, _>>()?,
            ),
            Body::Repeat {
                item,
                count: Some(count),
            } => {
                let item = Value::from_node(item)?;
                grammar::check_expansion(item.node_count(), *count, node.text)?;
                ValueKind::Collection(vec![item; *count])
            }
            Body::Repeat { count: None, .. } => {
                return Err(ParseError::new(
                    ParseErrorKind::NotAValue,
                    node.text,
                    "an unbounded repetition is a type, not a value",
                ));
            }
        };
        Ok(Value {
            name: node.name(),
            kind,
        })
    }
}

/// Parse a link literal. `any`, `*` and `none` stand for "no value".
pub fn parse_literal(text: &str) -> Result<Option<Value>, ParseError> {
    match text.trim() {
        "any" | "*" | "none" => Ok(None),
        other => other.parse().map(Some),
    }
}

impl From<bool> for Value {
    fn from(bit: bool) -> Self {
        Value::bit(bit)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}: ")?;
        }
        match &self.kind {
            ValueKind::Bit(bit) => write!(f, "{}", u8::from(*bit)),
            ValueKind::Collection(children) => {
                let items: Vec<String> = children.iter().map(ToString::to_string).collect();
                grammar::write_items(f, &items)
            }
        }
    }
}

impl FromStr for Value {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Value::from_node(&grammar::parse(s)?)
    }
}
