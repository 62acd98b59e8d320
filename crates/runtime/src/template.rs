//! Gate templates
//!
//! A [`TemplateRegistry`] maps type names to [`GateTemplate`]s. Templates
//! are either function gates naming a transform, or circuits carrying a
//! nested [`CircuitDescription`]. The registry document is plain JSON:
//!
//! ```json
//! {
//!   "not": { "io": { "input": "bit", "output": "bit" }, "transform": "not" },
//!   "nand": {
//!     "io": { "input": "<bit, 2>", "output": "bit" },
//!     "circuit": { "gates": [...], "links": [...] }
//!   }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use gatework_transforms::Transform;
use gatework_types::Interface;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::description::CircuitDescription;
use crate::error::{Error, Result};

/// Declared outer interfaces of a template; missing sides default to `any`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Io {
    #[serde(default)]
    pub input: Interface,
    #[serde(default)]
    pub output: Interface,
}

impl Io {
    pub fn new(input: Interface, output: Interface) -> Self {
        Self { input, output }
    }
}

/// Definition of one gate type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateTemplate {
    pub io: Io,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit: Option<CircuitDescription>,
}

/// Body of a template, after checking exactly one was given
pub enum TemplateBody<'a> {
    Transform(&'a str),
    Circuit(&'a CircuitDescription),
}

impl GateTemplate {
    pub fn function(io: Io, transform: impl Into<String>) -> Self {
        Self {
            io,
            transform: Some(transform.into()),
            circuit: None,
        }
    }

    pub fn circuit(io: Io, circuit: CircuitDescription) -> Self {
        Self {
            io,
            transform: None,
            circuit: Some(circuit),
        }
    }

    /// The template's body; `name` is only used for the error.
    pub fn body(&self, name: &str) -> Result<TemplateBody<'_>> {
        match (&self.transform, &self.circuit) {
            (Some(transform), None) => Ok(TemplateBody::Transform(transform)),
            (None, Some(circuit)) => Ok(TemplateBody::Circuit(circuit)),
            _ => Err(Error::InvalidTemplate {
                name: name.to_string(),
                message: "exactly one of `transform` or `circuit` must be set".to_string(),
            }),
        }
    }
}

/// Factory for a transform registered at runtime
pub type NativeFactory = Arc<dyn Fn() -> Box<dyn Transform> + Send + Sync>;

/// Ordered `name -> template` map plus runtime-registered transforms
#[derive(Clone, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, GateTemplate>,
    natives: IndexMap<String, NativeFactory>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry document, validating every template.
    pub fn from_json(text: &str) -> Result<Self> {
        let templates: IndexMap<String, GateTemplate> = serde_json::from_str(text)?;
        for (name, template) in &templates {
            template.body(name)?;
        }
        debug!(templates = templates.len(), "template registry loaded");
        Ok(Self {
            templates,
            natives: IndexMap::new(),
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.templates)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, template: GateTemplate) {
        self.templates.insert(name.into(), template);
    }

    pub fn get(&self, name: &str) -> Option<&GateTemplate> {
        self.templates.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Merge `other` in; its entries replace same-named ones.
    pub fn extend(&mut self, other: TemplateRegistry) {
        self.templates.extend(other.templates);
        self.natives.extend(other.natives);
    }

    /// Register a transform that shadows any link-time one of the same name.
    pub fn register_native<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Transform> + Send + Sync + 'static,
    {
        self.natives.insert(name.into(), Arc::new(factory));
    }

    /// Fresh transform instance for `name`, runtime registrations first.
    pub fn transform(&self, name: &str) -> Option<Box<dyn Transform>> {
        match self.natives.get(name) {
            Some(factory) => Some(factory()),
            None => gatework_transforms::instantiate(name),
        }
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field("natives", &self.natives.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatework_types::Value;

    const DOCUMENT: &str = r#"{
        "not": { "io": { "input": "bit", "output": "bit" }, "transform": "not" },
        "double not": {
            "io": { "output": "bit" },
            "circuit": {
                "gates": [{ "id": "a", "type": "not" }, { "id": "b", "type": "not" }],
                "links": ["outside=>a", "a=>b", "b=>outside"]
            }
        }
    }"#;

    #[test]
    fn test_load_document() {
        let registry = TemplateRegistry::from_json(DOCUMENT).unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["not", "double not"]);

        let double = registry.get("double not").unwrap();
        assert_eq!(double.io.input, Interface::any());
        assert_eq!(double.io.output, Interface::bit());
        assert!(matches!(double.body("double not"), Ok(TemplateBody::Circuit(_))));
    }

    #[test]
    fn test_rejects_ambiguous_template() {
        let err = TemplateRegistry::from_json(
            r#"{ "odd": { "io": {}, "transform": "not", "circuit": {} } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate { .. }));

        let err = TemplateRegistry::from_json(r#"{ "empty": { "io": {} } }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidTemplate { .. }));
    }

    #[test]
    fn test_rejects_bad_interface() {
        let err = TemplateRegistry::from_json(
            r#"{ "bad": { "io": { "input": "<bit" }, "transform": "not" } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_native_shadows_link_time_transform() {
        let mut registry = TemplateRegistry::new();
        registry.register_native("not", || {
            Box::new(|_: Option<&Value>| -> gatework_transforms::Result<Option<Value>> {
                Ok(Some(Value::high()))
            })
        });
        let mut not = registry.transform("not").unwrap();
        assert_eq!(not.apply(Some(&Value::high())).unwrap(), Some(Value::high()));

        assert!(registry.transform("and").is_some());
        assert!(registry.transform("missing").is_none());
    }

    #[test]
    fn test_extend_replaces() {
        let mut registry = TemplateRegistry::from_json(DOCUMENT).unwrap();
        let mut other = TemplateRegistry::new();
        other.insert(
            "not",
            GateTemplate::function(Io::new(Interface::bit(), Interface::bit()), "buffer"),
        );
        registry.extend(other);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("not").unwrap().transform.as_deref(), Some("buffer"));
    }

    #[test]
    fn test_to_json_round_trip() {
        let registry = TemplateRegistry::from_json(DOCUMENT).unwrap();
        let again = TemplateRegistry::from_json(&registry.to_json().unwrap()).unwrap();
        assert_eq!(again.get("double not"), registry.get("double not"));
    }
}
