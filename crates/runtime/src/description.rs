//! Serialized circuit descriptions
//!
//! A description is the persisted form of a circuit's interior:
//!
//! ```json
//! {
//!   "gates": [{ "id": "0", "type": "not", "position": { "x": 0, "y": 0 } }],
//!   "links": ["outside=>0", "0=>outside/1:1"]
//! }
//! ```
//!
//! Link strings read `<from>[/<path>]=><to>[/<path>][:<literal>]`, where
//! `outside` names the enclosing circuit's boundary and the optional
//! literal seeds the link's value. `connections` is accepted as an alias
//! for `links`.

use std::fmt;
use std::str::FromStr;

use gatework_types::{Value, parse_literal};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::port::PathSpec;
use crate::types::Position;

/// Gate id sentinel for the enclosing circuit's boundary
pub const OUTSIDE: &str = "outside";

/// Interior of a circuit: gates first, then the links between them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitDescription {
    #[serde(default)]
    pub gates: Vec<GateDescription>,
    #[serde(default, alias = "connections")]
    pub links: Vec<String>,
}

impl CircuitDescription {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse every link string, failing on the first malformed one.
    pub fn link_specs(&self) -> Result<Vec<LinkSpec>> {
        self.links.iter().map(|link| link.parse()).collect()
    }
}

/// One gate of a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateDescription {
    /// Local id, only meaningful within the description
    pub id: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Gate side of a link endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRef {
    /// The enclosing circuit's boundary
    Outside,
    /// A gate by its description id
    Id(String),
}

impl fmt::Display for GateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateRef::Outside => f.write_str(OUTSIDE),
            GateRef::Id(id) => f.write_str(id),
        }
    }
}

/// `<gate>[/<path>]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    pub gate: GateRef,
    pub path: PathSpec,
}

impl EndpointSpec {
    fn parse(text: &str, link: &str) -> Result<Self> {
        let (gate, path) = text.split_once('/').unwrap_or((text, ""));
        let gate = match gate.trim() {
            "" => {
                return Err(Error::MalformedLink {
                    link: link.to_string(),
                    message: "endpoint is missing a gate id".to_string(),
                });
            }
            OUTSIDE => GateRef::Outside,
            id => GateRef::Id(id.to_string()),
        };
        Ok(Self {
            gate,
            path: path.parse()?,
        })
    }
}

impl fmt::Display for EndpointSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "{}", self.gate)
        } else {
            write!(f, "{}/{}", self.gate, self.path)
        }
    }
}

/// Parsed link string
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    pub from: EndpointSpec,
    pub to: EndpointSpec,
    /// Value seeded into the link; `None` for no literal or a placeholder
    pub literal: Option<Value>,
}

impl FromStr for LinkSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (from, rest) = s.split_once("=>").ok_or_else(|| Error::MalformedLink {
            link: s.to_string(),
            message: "expected `<from>=><to>`".to_string(),
        })?;
        let (to, literal) = match rest.split_once(':') {
            Some((to, literal)) => (to, parse_literal(literal)?),
            None => (rest, None),
        };
        Ok(LinkSpec {
            from: EndpointSpec::parse(from, s)?,
            to: EndpointSpec::parse(to, s)?,
            literal,
        })
    }
}

impl fmt::Display for LinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=>{}", self.from, self.to)?;
        if let Some(literal) = &self.literal {
            write!(f, ":{literal}")?;
        }
        Ok(())
    }
}
