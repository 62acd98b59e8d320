//! Circuit gates
//!
//! A [`CircuitGate`] owns child gates, the links between them and two
//! boundary ports. The inner input behaves as an output inside the circuit
//! (it feeds the children) and the inner output as an input (it collects
//! their results); [`crate::Gate::resolve_boundary_types`] keeps them in
//! step with the outer ports.
//!
//! # Tick order
//!
//! Each evaluation runs four steps:
//!
//! 1. Push the outer input value into the inner input
//! 2. Update every child gate once
//! 3. Update every link once
//! 4. Pull the inner output value out to the outer output
//!
//! Every gate reads values written during the previous tick, so cycles
//! settle one step per tick instead of recursing.

use std::sync::Arc;

use gatework_types::{Interface, Value};
use indexmap::IndexMap;
use tracing::{debug, info, trace};

use crate::description::{
    CircuitDescription, EndpointSpec, GateDescription, GateRef, LinkSpec,
};
use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::link::{Endpoint, Link, LinkTable, Node};
use crate::port::{PathSpec, Port};
use crate::template::TemplateRegistry;
use crate::types::{GateId, LinkId, Position};

/// Requested link endpoint: a node plus a path that may still contain `*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEnd {
    pub node: Node,
    pub path: PathSpec,
}

impl LinkEnd {
    pub fn new(node: Node, path: PathSpec) -> Self {
        Self { node, path }
    }

    pub fn gate(id: GateId) -> Self {
        Self::new(Node::Gate(id), PathSpec::root())
    }

    pub fn boundary() -> Self {
        Self::new(Node::Boundary, PathSpec::root())
    }

    pub fn at(mut self, path: PathSpec) -> Self {
        self.path = path;
        self
    }
}

/// Something a circuit can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Gate(GateId),
    Link(LinkId),
}

/// Everything created by one description insertion
#[derive(Debug, Clone, Default)]
pub struct Insertion {
    /// Description id to the id the gate received
    pub gates: IndexMap<String, GateId>,
    pub links: Vec<LinkId>,
    /// Boundary ports as they were before the insertion touched them
    boundary: Option<(Port, Port)>,
}

/// Composite gate with its own interior graph
#[derive(Debug)]
pub struct CircuitGate {
    gates: IndexMap<GateId, Gate>,
    links: LinkTable,
    /// Output-typed inside: feeds the children
    pub(crate) inner_input: Port,
    /// Input-typed inside: collects the children's results
    pub(crate) inner_output: Port,
    templates: Arc<TemplateRegistry>,
    next_gate: u64,
}

impl Default for CircuitGate {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitGate {
    pub fn new() -> Self {
        Self::with_templates(Arc::default())
    }

    pub fn with_templates(templates: Arc<TemplateRegistry>) -> Self {
        Self {
            gates: IndexMap::new(),
            links: LinkTable::default(),
            inner_input: Port::output(Interface::any()),
            inner_output: Port::input(Interface::any()),
            templates,
            next_gate: 0,
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Merge more templates into the ones this circuit creates gates from.
    pub fn load_templates(&mut self, templates: TemplateRegistry) {
        info!(templates = templates.len(), "loading gate templates");
        Arc::make_mut(&mut self.templates).extend(templates);
    }

    pub fn gates(&self) -> impl Iterator<Item = (GateId, &Gate)> {
        self.gates.iter().map(|(id, gate)| (*id, gate))
    }

    pub fn gate(&self, id: GateId) -> Option<&Gate> {
        self.gates.get(&id)
    }

    pub fn gate_mut(&mut self, id: GateId) -> Option<&mut Gate> {
        self.gates.get_mut(&id)
    }

    pub fn gate_count(&self) -> usize {
        self.gates.len()
    }

    pub fn links(&self) -> &LinkTable {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id)
    }

    pub fn inner_input(&self) -> &Port {
        &self.inner_input
    }

    pub fn inner_output(&self) -> &Port {
        &self.inner_output
    }

    pub fn add_gate(&mut self, gate: Gate) -> GateId {
        let id = GateId(self.next_gate);
        self.next_gate += 1;
        debug!(gate = %id, name = %gate.name, kind = gate.type_name(), "gate added");
        self.gates.insert(id, gate);
        id
    }

    /// Instantiate a registered template, named after its type, and add it.
    pub fn create_gate(&mut self, type_name: &str) -> Result<GateId> {
        self.create_gate_with(type_name, &mut Vec::new())
    }

    fn create_gate_with(&mut self, type_name: &str, expanding: &mut Vec<String>) -> Result<GateId> {
        let gate = Gate::instantiate(type_name, &self.templates, expanding)?;
        Ok(self.add_gate(gate))
    }

    fn source_port(&self, node: Node) -> Result<&Port> {
        match node {
            Node::Gate(id) => self
                .gates
                .get(&id)
                .map(Gate::output)
                .ok_or(Error::GateNotFound(id)),
            Node::Boundary => Ok(&self.inner_input),
            Node::Host => Err(Error::NotAttached),
        }
    }

    fn source_port_mut(&mut self, node: Node) -> Result<&mut Port> {
        match node {
            Node::Gate(id) => self
                .gates
                .get_mut(&id)
                .map(|gate| &mut gate.output)
                .ok_or(Error::GateNotFound(id)),
            Node::Boundary => Ok(&mut self.inner_input),
            Node::Host => Err(Error::NotAttached),
        }
    }

    fn sink_port(&self, node: Node) -> Result<&Port> {
        match node {
            Node::Gate(id) => self
                .gates
                .get(&id)
                .map(Gate::input)
                .ok_or(Error::GateNotFound(id)),
            Node::Boundary => Ok(&self.inner_output),
            Node::Host => Err(Error::NotAttached),
        }
    }

    fn sink_port_mut(&mut self, node: Node) -> Result<&mut Port> {
        match node {
            Node::Gate(id) => self
                .gates
                .get_mut(&id)
                .map(|gate| &mut gate.input)
                .ok_or(Error::GateNotFound(id)),
            Node::Boundary => Ok(&mut self.inner_output),
            Node::Host => Err(Error::NotAttached),
        }
    }

    /// Bind a link from `from` to `to`.
    pub fn connect(&mut self, from: LinkEnd, to: LinkEnd) -> Result<LinkId> {
        self.connect_with_value(from, to, None)
    }

    /// Bind a link, seeding it with `literal` as if it had carried that
    /// value last tick.
    ///
    /// Both ends are validated before either port changes, so a failed
    /// connect leaves the circuit as it was.
    pub fn connect_with_value(
        &mut self,
        from: LinkEnd,
        to: LinkEnd,
        literal: Option<Value>,
    ) -> Result<LinkId> {
        let source = self.source_port(from.node)?.resolve(&from.path)?;
        let data = source.interface;
        if let Some(value) = &literal {
            data.check(value)?;
        }

        let id = self.links.next_id();
        let to_path = self.sink_port_mut(to.node)?.connect_to(id, &to.path, &data)?;
        let attached = self
            .source_port_mut(from.node)
            .and_then(|port| port.attach(&source.path, id));
        if let Err(err) = attached {
            self.sink_port_mut(to.node)?.detach(&to_path, id);
            return Err(err);
        }

        debug!(link = %id, from = ?from.node, to = ?to.node, %data, "link bound");
        let link = Link::new(
            Endpoint::new(from.node, source.path),
            Endpoint::new(to.node, to_path),
            data,
        )
        .with_value(literal);
        self.links.insert(id, link);
        Ok(id)
    }

    /// Delete a link. Returns whether a live link was removed, so deleting
    /// twice is harmless.
    pub fn delete_link(&mut self, id: LinkId) -> bool {
        let Some(link) = self.links.remove(id) else {
            return false;
        };
        if let Ok(port) = self.source_port_mut(link.from.node) {
            port.detach(&link.from.path, id);
        }
        if let Ok(port) = self.sink_port_mut(link.to.node) {
            port.detach(&link.to.path, id);
        }
        debug!(link = %id, "link deleted");
        true
    }

    /// Remove a gate after severing every link attached to it.
    pub fn remove_gate(&mut self, id: GateId) -> Result<Gate> {
        let gate = self.gates.get(&id).ok_or(Error::GateNotFound(id))?;
        let mut attached = gate.input().all_links();
        attached.extend(gate.output().all_links());
        for link in attached {
            self.delete_link(link);
        }
        debug!(gate = %id, "gate removed");
        self.gates.shift_remove(&id).ok_or(Error::GateNotFound(id))
    }

    /// Remove a gate or link; removing something absent is an error.
    pub fn remove(&mut self, element: Element) -> Result<()> {
        match element {
            Element::Gate(id) => self.remove_gate(id).map(drop),
            Element::Link(id) => {
                if self.delete_link(id) {
                    Ok(())
                } else {
                    Err(Error::LinkNotFound(id))
                }
            }
        }
    }

    /// Forward a host click to a child gate.
    pub fn click(&mut self, id: GateId) -> Result<bool> {
        self.gates
            .get_mut(&id)
            .map(Gate::click)
            .ok_or(Error::GateNotFound(id))
    }

    /// Type carried by a link: the more precise of its two leaf interfaces.
    pub fn link_type(&self, id: LinkId) -> Result<Interface> {
        let link = self.links.get(id).ok_or(Error::LinkNotFound(id))?;
        let from = leaf(self.source_port(link.from.node)?, &link.from)?;
        let to = leaf(self.sink_port(link.to.node)?, &link.to)?;
        Ok(from.interface().merge_precise(to.interface())?)
    }

    /// Interfaces of the inner input and inner output implied by the wiring.
    pub fn infer_boundary_types(&self) -> Result<(Interface, Interface)> {
        let link_type = |id| self.link_type(id);
        Ok((
            self.inner_input.infer_current_type(&link_type)?,
            self.inner_output.infer_current_type(&link_type)?,
        ))
    }

    /// One tick of the interior. `input` and `output` are the outer ports,
    /// bound to links in `outer`.
    pub(crate) fn evaluate(&mut self, input: &Port, output: &Port, outer: &mut LinkTable) -> Result<()> {
        if !self.inner_input.interface().is_none()
            && let Some(value) = input.value(outer)?
        {
            trace!(%value, "push input");
            self.inner_input.set_value(&value, &mut self.links)?;
        }

        for gate in self.gates.values_mut() {
            gate.update(&mut self.links);
        }
        self.links.update_all();

        if !output.interface().is_none()
            && let Some(value) = self.inner_output.value(&self.links)?
        {
            trace!(%value, "pull output");
            output.set_value(&value, outer)?;
        }
        Ok(())
    }

    /// Describe the whole interior, boundary links included.
    pub fn serialize(&self) -> CircuitDescription {
        let all: Vec<GateId> = self.gates.keys().copied().collect();
        self.describe(&all, true)
    }

    /// Describe only `selection` and the links running between its gates.
    pub fn serialize_selection(&self, selection: &[GateId]) -> CircuitDescription {
        self.describe(selection, false)
    }

    pub fn to_json(&self) -> Result<String> {
        self.serialize().to_json()
    }

    fn describe(&self, selection: &[GateId], with_boundary: bool) -> CircuitDescription {
        let mut local: IndexMap<GateId, String> = IndexMap::new();
        let mut gates = Vec::new();
        for id in selection {
            let Some(gate) = self.gates.get(id) else {
                continue;
            };
            if local.contains_key(id) {
                continue;
            }
            let local_id = local.len().to_string();
            local.insert(*id, local_id.clone());
            gates.push(GateDescription {
                id: local_id,
                type_name: gate.type_name().to_string(),
                position: Some(gate.position),
            });
        }

        let endpoint = |endpoint: &Endpoint| -> Option<EndpointSpec> {
            let gate = match endpoint.node {
                Node::Gate(id) => GateRef::Id(local.get(&id)?.clone()),
                Node::Boundary if with_boundary => GateRef::Outside,
                Node::Boundary | Node::Host => return None,
            };
            Some(EndpointSpec {
                gate,
                path: PathSpec::from(&endpoint.path),
            })
        };
        let links = self
            .links
            .iter()
            .filter_map(|(_, link)| {
                let spec = LinkSpec {
                    from: endpoint(&link.from)?,
                    to: endpoint(&link.to)?,
                    literal: link.last_value.clone(),
                };
                Some(spec.to_string())
            })
            .collect();

        CircuitDescription { gates, links }
    }

    /// Create the gates, then the links, of `description`. Undoes
    /// everything it created if any step fails.
    pub(crate) fn insert_with(
        &mut self,
        description: &CircuitDescription,
        offset: Position,
        expanding: &mut Vec<String>,
    ) -> Result<Insertion> {
        let mut insertion = Insertion {
            boundary: Some((self.inner_input.clone(), self.inner_output.clone())),
            ..Insertion::default()
        };
        match self.insert_parts(description, offset, expanding, &mut insertion) {
            Ok(()) => Ok(insertion),
            Err(err) => {
                self.rollback(&insertion);
                Err(err)
            }
        }
    }

    fn insert_parts(
        &mut self,
        description: &CircuitDescription,
        offset: Position,
        expanding: &mut Vec<String>,
        insertion: &mut Insertion,
    ) -> Result<()> {
        for spec in &description.gates {
            let id = self.create_gate_with(&spec.type_name, expanding)?;
            if let Some(gate) = self.gates.get_mut(&id) {
                gate.position = spec.position.unwrap_or_default() + offset;
            }
            insertion.gates.insert(spec.id.clone(), id);
        }

        for spec in description.link_specs()? {
            let from = link_end(spec.from, &insertion.gates)?;
            let to = link_end(spec.to, &insertion.gates)?;
            let id = self.connect_with_value(from, to, spec.literal)?;
            insertion.links.push(id);
        }
        Ok(())
    }

    pub(crate) fn rollback(&mut self, insertion: &Insertion) {
        debug!(
            gates = insertion.gates.len(),
            links = insertion.links.len(),
            "rolling back insertion"
        );
        for id in &insertion.links {
            self.delete_link(*id);
        }
        for id in insertion.gates.values() {
            if self.gates.contains_key(id) {
                let _removed = self.remove_gate(*id);
            }
        }
        // Links made by the insertion may have materialized boundary sub-ports
        if let Some((inner_input, inner_output)) = &insertion.boundary {
            self.inner_input = inner_input.clone();
            self.inner_output = inner_output.clone();
        }
    }
}

fn leaf<'a>(port: &'a Port, endpoint: &Endpoint) -> Result<&'a Port> {
    port.sub_port(&endpoint.path).ok_or_else(|| Error::InvalidPath {
        path: endpoint.path.to_string(),
        message: "sub-port no longer exists".to_string(),
    })
}

fn link_end(spec: EndpointSpec, gates: &IndexMap<String, GateId>) -> Result<LinkEnd> {
    let node = match spec.gate {
        GateRef::Outside => Node::Boundary,
        GateRef::Id(id) => gates
            .get(&id)
            .copied()
            .map(Node::Gate)
            .ok_or(Error::UnknownGateId(id))?,
    };
    Ok(LinkEnd::new(node, spec.path))
}
