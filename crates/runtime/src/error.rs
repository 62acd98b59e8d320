//! Runtime errors

use gatework_transforms::TransformError;
use gatework_types::{Interface, ParseError, TypeError};
use thiserror::Error;

use crate::port::PortPath;
use crate::types::{GateId, LinkId};

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad templates, documents or link strings
    Configuration,
    /// Shapes or values that do not fit
    TypeMismatch,
    /// Wiring that cannot be made or undone
    Connectivity,
    /// Faults raised while a gate evaluates
    Evaluation,
}

/// Runtime errors
#[derive(Debug, Error)]
pub enum Error {
    #[error("no gate template named `{0}`")]
    UnknownGateType(String),

    #[error("invalid template `{name}`: {message}")]
    InvalidTemplate { name: String, message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("template chain {} instantiates itself", .chain.join(" -> "))]
    RecursiveTemplate { chain: Vec<String> },

    #[error("malformed link `{link}`: {message}")]
    MalformedLink { link: String, message: String },

    #[error("description references unknown gate id `{0}`")]
    UnknownGateId(String),

    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("port of type `{port}` cannot carry `{data}`")]
    InterfaceMismatch { port: Interface, data: Interface },

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("input `{path}` already has a link")]
    InputOccupied { path: PortPath },

    #[error("invalid port path `{path}`: {message}")]
    InvalidPath { path: String, message: String },

    #[error("gate not found: {0}")]
    GateNotFound(GateId),

    #[error("link not found: {0}")]
    LinkNotFound(LinkId),

    #[error("host endpoints cannot be wired inside a circuit")]
    NotAttached,

    #[error("the value of an input port cannot be set")]
    WriteToInput,

    #[error("a port of type `{0}` cannot grow sub-ports")]
    NotExpandable(Interface),

    #[error("retyping to `{interface}` would drop linked sub-port {index}")]
    RetypeOrphansLinks { interface: Interface, index: usize },

    #[error("gate `{0}` is not a circuit")]
    NotACircuit(String),

    #[error("transform `{0}` is not loaded")]
    NotLoaded(String),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("transform produced no value for a `{0}` output")]
    MissingOutput(Interface),
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnknownGateType(_)
            | Error::InvalidTemplate { .. }
            | Error::Parse(_)
            | Error::RecursiveTemplate { .. }
            | Error::MalformedLink { .. }
            | Error::UnknownGateId(_)
            | Error::Json(_) => ErrorCategory::Configuration,
            Error::InterfaceMismatch { .. } | Error::Type(_) => ErrorCategory::TypeMismatch,
            Error::InputOccupied { .. }
            | Error::InvalidPath { .. }
            | Error::GateNotFound(_)
            | Error::LinkNotFound(_)
            | Error::NotAttached
            | Error::WriteToInput
            | Error::NotExpandable(_)
            | Error::RetypeOrphansLinks { .. }
            | Error::NotACircuit(_) => ErrorCategory::Connectivity,
            Error::NotLoaded(_) | Error::Transform(_) | Error::MissingOutput(_) => {
                ErrorCategory::Evaluation
            }
        }
    }
}
