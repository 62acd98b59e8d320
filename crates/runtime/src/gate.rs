//! Gates
//!
//! A [`Gate`] has exactly one input port and one output port and is
//! either a [`FunctionGate`] wrapping a native transform or a
//! [`CircuitGate`] wrapping a nested graph. Updating a gate never fails:
//! faults are stored on the gate as its diagnostic and cleared by the
//! next successful update.

use std::fmt;
use std::sync::Arc;

use gatework_transforms::Transform;
use gatework_types::{Interface, Value};
use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::circuit::{CircuitGate, Insertion};
use crate::description::CircuitDescription;
use crate::error::{Error, Result};
use crate::link::LinkTable;
use crate::port::Port;
use crate::template::{Io, TemplateBody, TemplateRegistry};
use crate::types::{GateId, Position};

/// Function gate: a transform applied to the input each tick
pub struct FunctionGate {
    transform_name: String,
    transform: Option<Box<dyn Transform>>,
}

impl FunctionGate {
    /// `transform` is `None` when the name could not be resolved; the gate
    /// then reports "not loaded" on every update.
    pub fn new(transform_name: impl Into<String>, transform: Option<Box<dyn Transform>>) -> Self {
        Self {
            transform_name: transform_name.into(),
            transform,
        }
    }

    pub fn transform_name(&self) -> &str {
        &self.transform_name
    }

    pub fn is_loaded(&self) -> bool {
        self.transform.is_some()
    }

    fn apply(&mut self, input: Option<&Value>) -> Result<Option<Value>> {
        let transform = self
            .transform
            .as_mut()
            .ok_or_else(|| Error::NotLoaded(self.transform_name.clone()))?;
        Ok(transform.apply(input)?)
    }

    fn click(&mut self) -> bool {
        self.transform
            .as_mut()
            .is_some_and(|transform| transform.on_click())
    }
}

impl fmt::Debug for FunctionGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionGate")
            .field("transform_name", &self.transform_name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[derive(Debug)]
pub enum GateKind {
    Function(FunctionGate),
    Circuit(Box<CircuitGate>),
}

/// An evaluatable unit with one input port and one output port
#[derive(Debug)]
pub struct Gate {
    /// Display name, initially the type name
    pub name: String,
    pub position: Position,
    type_name: String,
    pub(crate) input: Port,
    pub(crate) output: Port,
    error: Option<Error>,
    kind: GateKind,
}

impl Gate {
    pub fn function(
        type_name: impl Into<String>,
        io: Io,
        transform_name: impl Into<String>,
        transform: Option<Box<dyn Transform>>,
    ) -> Self {
        Self::with_kind(
            type_name.into(),
            io,
            GateKind::Function(FunctionGate::new(transform_name, transform)),
        )
    }

    /// Wrap a circuit. Its outer ports start as `any` until
    /// [`Gate::resolve_boundary_types`] runs.
    pub fn circuit(type_name: impl Into<String>, circuit: CircuitGate) -> Self {
        Self::with_kind(
            type_name.into(),
            Io::default(),
            GateKind::Circuit(Box::new(circuit)),
        )
    }

    fn with_kind(type_name: String, io: Io, kind: GateKind) -> Self {
        Self {
            name: type_name.clone(),
            position: Position::default(),
            type_name,
            input: Port::input(io.input),
            output: Port::output(io.output),
            error: None,
            kind,
        }
    }

    /// Instantiate the template registered as `type_name`, recursively.
    pub fn from_template(type_name: &str, templates: &Arc<TemplateRegistry>) -> Result<Gate> {
        Self::instantiate(type_name, templates, &mut Vec::new())
    }

    /// `expanding` holds the circuit templates currently being expanded.
    pub(crate) fn instantiate(
        type_name: &str,
        templates: &Arc<TemplateRegistry>,
        expanding: &mut Vec<String>,
    ) -> Result<Gate> {
        let template = templates
            .get(type_name)
            .ok_or_else(|| Error::UnknownGateType(type_name.to_string()))?;

        match template.body(type_name)? {
            TemplateBody::Transform(transform_name) => {
                let transform = templates.transform(transform_name);
                if transform.is_none() {
                    debug!(gate = type_name, transform = transform_name, "transform not found");
                }
                Ok(Gate::function(
                    type_name,
                    template.io.clone(),
                    transform_name,
                    transform,
                ))
            }
            TemplateBody::Circuit(description) => {
                if expanding.iter().any(|name| name == type_name) {
                    let mut chain = expanding.clone();
                    chain.push(type_name.to_string());
                    return Err(Error::RecursiveTemplate { chain });
                }

                expanding.push(type_name.to_string());
                let mut circuit = CircuitGate::with_templates(Arc::clone(templates));
                let inserted = circuit.insert_with(description, Position::default(), expanding);
                expanding.pop();
                inserted?;

                let mut gate = Gate::circuit(type_name, circuit);
                gate.resolve_boundary_types()?;
                let input = template.io.input.merge_precise(gate.input.interface())?;
                let output = template.io.output.merge_precise(gate.output.interface())?;
                gate.set_boundary_types(input, output)?;
                Ok(gate)
            }
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn input(&self) -> &Port {
        &self.input
    }

    pub fn output(&self) -> &Port {
        &self.output
    }

    /// Diagnostic left by the last update, if it failed
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn kind(&self) -> &GateKind {
        &self.kind
    }

    pub fn is_circuit(&self) -> bool {
        matches!(self.kind, GateKind::Circuit(_))
    }

    pub fn as_function(&self) -> Option<&FunctionGate> {
        match &self.kind {
            GateKind::Function(function) => Some(function),
            GateKind::Circuit(_) => None,
        }
    }

    pub fn as_circuit(&self) -> Option<&CircuitGate> {
        match &self.kind {
            GateKind::Circuit(circuit) => Some(circuit),
            GateKind::Function(_) => None,
        }
    }

    pub fn as_circuit_mut(&mut self) -> Option<&mut CircuitGate> {
        match &mut self.kind {
            GateKind::Circuit(circuit) => Some(circuit),
            GateKind::Function(_) => None,
        }
    }

    fn circuit_mut(&mut self) -> Result<&mut CircuitGate> {
        match &mut self.kind {
            GateKind::Circuit(circuit) => Ok(circuit),
            GateKind::Function(_) => Err(Error::NotACircuit(self.name.clone())),
        }
    }

    /// Evaluate once against the links of the enclosing circuit.
    pub fn update(&mut self, links: &mut LinkTable) {
        match self.evaluate(links) {
            Ok(()) => self.error = None,
            Err(err) => {
                debug!(gate = %self.name, error = %err, "gate fault");
                self.error = Some(err);
            }
        }
    }

    fn evaluate(&mut self, links: &mut LinkTable) -> Result<()> {
        match &mut self.kind {
            GateKind::Function(function) => {
                let input = if self.input.interface().is_none() {
                    None
                } else {
                    self.input.value(links)?
                };
                let output = function.apply(input.as_ref())?;
                if !self.output.interface().is_none() {
                    let value = output
                        .ok_or_else(|| Error::MissingOutput(self.output.interface().clone()))?;
                    self.output.set_value(&value, links)?;
                }
                Ok(())
            }
            GateKind::Circuit(circuit) => circuit.evaluate(&self.input, &self.output, links),
        }
    }

    /// Forward a host click to the transform. Returns whether it was handled.
    pub fn click(&mut self) -> bool {
        match &mut self.kind {
            GateKind::Function(function) => function.click(),
            GateKind::Circuit(_) => false,
        }
    }

    /// Infer both boundary ports from the interior wiring and apply the
    /// result to the boundary and outer ports alike.
    pub fn resolve_boundary_types(&mut self) -> Result<()> {
        let (input, output) = self.circuit_mut()?.infer_boundary_types()?;
        self.set_boundary_types(input, output)
    }

    /// Retype outer and boundary ports together. Nothing changes unless
    /// all four ports accept the new shapes.
    fn set_boundary_types(&mut self, input: Interface, output: Interface) -> Result<()> {
        let GateKind::Circuit(circuit) = &mut self.kind else {
            return Err(Error::NotACircuit(self.name.clone()));
        };
        self.input.check_retype(&input)?;
        circuit.inner_input.check_retype(&input)?;
        self.output.check_retype(&output)?;
        circuit.inner_output.check_retype(&output)?;

        debug!(gate = %self.name, %input, %output, "boundary resolved");
        self.input.apply_interface(input.clone());
        circuit.inner_input.apply_interface(input);
        self.output.apply_interface(output.clone());
        circuit.inner_output.apply_interface(output);
        Ok(())
    }

    /// Create the gates and links of `description` inside this circuit,
    /// shifted by `offset`, then re-resolve the boundary.
    ///
    /// On failure every gate and link created by the call is removed again.
    #[instrument(skip_all, fields(gate = %self.name, gates = description.gates.len(), links = description.links.len()))]
    pub fn insert_description(
        &mut self,
        description: &CircuitDescription,
        offset: Position,
    ) -> Result<IndexMap<String, GateId>> {
        let insertion = self
            .circuit_mut()?
            .insert_with(description, offset, &mut Vec::new())?;
        if let Err(err) = self.resolve_boundary_types() {
            self.circuit_mut()?.rollback(&insertion);
            return Err(err);
        }
        let Insertion { gates, .. } = insertion;
        Ok(gates)
    }

    /// Paste a JSON description produced by [`CircuitGate::to_json`].
    pub fn insert_json(&mut self, text: &str, offset: Position) -> Result<IndexMap<String, GateId>> {
        let description = CircuitDescription::from_json(text)?;
        self.insert_description(&description, offset)
    }
}
