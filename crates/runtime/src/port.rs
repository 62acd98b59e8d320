//! Ports
//!
//! A [`Port`] is a typed, directional endpoint. Its sub-ports mirror its
//! current [`Interface`]: collections have one sub-port per child from the
//! start, while rests and `any` ports grow sub-ports on demand as links
//! are wired into them.
//!
//! Sub-ports are owned by their parent and addressed by a [`PortPath`] of
//! indices. Ports only hold [`LinkId`]s; the link values themselves live
//! in the owning circuit's [`LinkTable`].

use std::fmt;
use std::str::FromStr;

use gatework_types::{Interface, InterfaceKind, Value};

use crate::error::{Error, Result};
use crate::link::LinkTable;
use crate::types::LinkId;

/// Which way data flows through a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Receives data; each leaf accepts at most one link
    Input,
    /// Produces data; fans out to any number of links
    Output,
}

/// Concrete path of sub-port indices, root first
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PortPath(pub Vec<usize>);

impl PortPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for PortPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("/"))
    }
}

/// One step of a requested path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStep {
    /// Sub-port at this index, materialized if missing
    Index(usize),
    /// A fresh sub-port appended to a rest or `any` port (`*`)
    Next,
}

/// Requested sub-port path such as `0/2` or `*`.
///
/// Empty segments are ignored, so `""`, `"/"` and `"0/"` are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSpec(Vec<PathStep>);

impl PathSpec {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for PathSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.split('/')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment {
                "*" => Ok(PathStep::Next),
                index => index.parse().map(PathStep::Index).map_err(|_| Error::InvalidPath {
                    path: s.to_string(),
                    message: format!("`{index}` is neither an index nor `*`"),
                }),
            })
            .collect::<Result<_>>()
            .map(PathSpec)
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|step| match step {
                PathStep::Index(index) => index.to_string(),
                PathStep::Next => "*".to_string(),
            })
            .collect();
        f.write_str(&parts.join("/"))
    }
}

impl From<&PortPath> for PathSpec {
    fn from(path: &PortPath) -> Self {
        PathSpec(path.0.iter().copied().map(PathStep::Index).collect())
    }
}

/// Largest sub-port index a path may address on a rest or `any` port
pub const MAX_SUB_PORTS: usize = 1024;

/// A path resolved against a port without changing it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPath {
    /// Concrete indices, with every `*` replaced by the index it would take
    pub path: PortPath,
    /// Interface the leaf has, or would have once materialized
    pub interface: Interface,
    /// Whether the leaf or anything below it already carries a link
    pub occupied: bool,
}

/// Typed, directional endpoint of a gate
#[derive(Debug, Clone)]
pub struct Port {
    direction: Direction,
    interface: Interface,
    links: Vec<LinkId>,
    sub_ports: Vec<Port>,
}

impl Port {
    pub fn new(interface: Interface, direction: Direction) -> Self {
        let sub_ports = match &interface.kind {
            InterfaceKind::Collection(children) => children
                .iter()
                .map(|child| Port::new(child.clone(), direction))
                .collect(),
            _ => Vec::new(),
        };
        Self {
            direction,
            interface,
            links: Vec::new(),
            sub_ports,
        }
    }

    pub fn input(interface: Interface) -> Self {
        Self::new(interface, Direction::Input)
    }

    pub fn output(interface: Interface) -> Self {
        Self::new(interface, Direction::Output)
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn interface(&self) -> &Interface {
        &self.interface
    }

    /// Links attached directly to this port, not to its sub-ports
    pub fn links(&self) -> &[LinkId] {
        &self.links
    }

    pub fn sub_ports(&self) -> &[Port] {
        &self.sub_ports
    }

    pub fn sub_port(&self, path: &PortPath) -> Option<&Port> {
        path.0
            .iter()
            .try_fold(self, |port, index| port.sub_ports.get(*index))
    }

    fn sub_port_mut(&mut self, path: &[usize]) -> Option<&mut Port> {
        match path.split_first() {
            None => Some(self),
            Some((index, rest)) => self.sub_ports.get_mut(*index)?.sub_port_mut(rest),
        }
    }

    /// Whether this port or any sub-port carries a link
    pub fn has_connection(&self) -> bool {
        !self.links.is_empty() || self.sub_ports.iter().any(Port::has_connection)
    }

    /// Every link attached to this port or below it
    pub fn all_links(&self) -> Vec<LinkId> {
        let mut links = self.links.clone();
        for port in &self.sub_ports {
            links.extend(port.all_links());
        }
        links
    }

    /// Walk `spec` to a leaf without materializing anything.
    pub fn resolve(&self, spec: &PathSpec) -> Result<ResolvedPath> {
        let mut indices = Vec::with_capacity(spec.steps().len());
        let mut port = Some(self);
        let mut interface = self.interface.clone();

        for step in spec.steps() {
            let existing = port.map_or(0, |p| p.sub_ports.len());
            let index = match *step {
                PathStep::Index(index) => index,
                PathStep::Next if interface.is_expandable() => existing,
                PathStep::Next => return Err(Error::NotExpandable(interface)),
            };
            if interface.is_expandable() && index >= MAX_SUB_PORTS {
                return Err(Error::InvalidPath {
                    path: spec.to_string(),
                    message: format!("sub-port {index} is past the limit of {MAX_SUB_PORTS}"),
                });
            }
            let child = interface.child(index).ok_or_else(|| Error::InvalidPath {
                path: spec.to_string(),
                message: format!("`{interface}` has no sub-port {index}"),
            })?;
            port = port.and_then(|p| p.sub_ports.get(index));
            interface = port.map_or(child, |p| p.interface.clone());
            indices.push(index);
        }

        Ok(ResolvedPath {
            path: PortPath(indices),
            interface,
            occupied: port.is_some_and(Port::has_connection),
        })
    }

    /// Create every sub-port along `path` that does not exist yet.
    fn materialize(&mut self, path: &[usize]) -> Result<&mut Port> {
        let Some((&index, rest)) = path.split_first() else {
            return Ok(self);
        };
        while self.sub_ports.len() <= index {
            let next = self.sub_ports.len();
            let child = self
                .interface
                .child(next)
                .ok_or_else(|| Error::InvalidPath {
                    path: PortPath(path.to_vec()).to_string(),
                    message: format!("`{}` has no sub-port {next}", self.interface),
                })?;
            self.sub_ports.push(Port::new(child, self.direction));
        }
        self.sub_ports[index].materialize(rest)
    }

    /// Bind a link at an already resolved path.
    pub fn attach(&mut self, path: &PortPath, link: LinkId) -> Result<()> {
        self.materialize(&path.0)?.links.push(link);
        Ok(())
    }

    /// Resolve `spec`, check that the leaf can carry `data`, then bind `link`.
    ///
    /// Nothing is materialized unless every check passes.
    pub fn connect_to(&mut self, link: LinkId, spec: &PathSpec, data: &Interface) -> Result<PortPath> {
        let target = self.resolve(spec)?;
        if !target.interface.matches(data) {
            return Err(Error::InterfaceMismatch {
                port: target.interface,
                data: data.clone(),
            });
        }
        if self.direction == Direction::Input && target.occupied {
            return Err(Error::InputOccupied { path: target.path });
        }
        self.attach(&target.path, link)?;
        Ok(target.path)
    }

    /// Unbind `link` from the sub-port at `path`. Returns whether it was bound there.
    pub fn detach(&mut self, path: &PortPath, link: LinkId) -> bool {
        let Some(port) = self.sub_port_mut(&path.0) else {
            return false;
        };
        let before = port.links.len();
        port.links.retain(|id| *id != link);
        port.links.len() != before
    }

    /// Value seen by this port this tick.
    ///
    /// The first link's `last_value` wins when present. Otherwise a default
    /// is synthesized from the interface: `0` for bits, the sub-port values
    /// for collections. `None` means no value is available.
    pub fn value(&self, links: &LinkTable) -> Result<Option<Value>> {
        let linked = self
            .links
            .first()
            .and_then(|id| links.get(*id))
            .and_then(|link| link.last_value.as_ref());
        if let Some(value) = linked {
            self.interface.check(value)?;
            return Ok(Some(value.clone()));
        }

        match &self.interface.kind {
            InterfaceKind::Bit => Ok(Some(Value::low())),
            InterfaceKind::Collection(_) | InterfaceKind::Rest(_) => self.sub_port_values(links),
            InterfaceKind::Any if !self.sub_ports.is_empty() => self.sub_port_values(links),
            InterfaceKind::Any | InterfaceKind::None => Ok(None),
        }
    }

    fn sub_port_values(&self, links: &LinkTable) -> Result<Option<Value>> {
        let mut children = Vec::with_capacity(self.sub_ports.len());
        for port in &self.sub_ports {
            match port.value(links)? {
                Some(value) => children.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(Value::collection(children)))
    }

    /// Write `value` to every outgoing link, fanning collection children
    /// out to the matching sub-ports.
    pub fn set_value(&self, value: &Value, links: &mut LinkTable) -> Result<()> {
        if self.direction == Direction::Input {
            return Err(Error::WriteToInput);
        }
        self.interface.check(value)?;
        for id in &self.links {
            if let Some(link) = links.get_mut(*id) {
                link.current_value = Some(value.clone());
            }
        }
        if let Some(children) = value.children() {
            for (port, child) in self.sub_ports.iter().zip(children) {
                port.set_value(child, links)?;
            }
        }
        Ok(())
    }

    /// Retype this port, resizing and retyping sub-ports to match.
    ///
    /// Fails without changing anything if a sub-port that would be dropped
    /// still carries a link.
    pub fn update_interface(&mut self, interface: Interface) -> Result<()> {
        self.check_retype(&interface)?;
        self.apply_interface(interface);
        Ok(())
    }

    pub(crate) fn check_retype(&self, target: &Interface) -> Result<()> {
        for (index, port) in self.sub_ports.iter().enumerate() {
            match target.child(index) {
                Some(child) => port.check_retype(&child)?,
                None if port.has_connection() => {
                    return Err(Error::RetypeOrphansLinks {
                        interface: target.clone(),
                        index,
                    });
                }
                None => {}
            }
        }
        Ok(())
    }

    pub(crate) fn apply_interface(&mut self, target: Interface) {
        match &target.kind {
            InterfaceKind::Collection(children) => {
                self.sub_ports.truncate(children.len());
                for (port, child) in self.sub_ports.iter_mut().zip(children) {
                    port.apply_interface(child.clone());
                }
                let existing = self.sub_ports.len();
                for child in &children[existing..] {
                    self.sub_ports.push(Port::new(child.clone(), self.direction));
                }
            }
            InterfaceKind::Rest(_) | InterfaceKind::Any => {
                for (index, port) in self.sub_ports.iter_mut().enumerate() {
                    if let Some(child) = target.child(index) {
                        port.apply_interface(child);
                    }
                }
            }
            InterfaceKind::Bit | InterfaceKind::None => self.sub_ports.clear(),
        }
        self.interface = target;
    }

    /// Concrete type implied by what is wired into this port.
    ///
    /// Bits and `none` keep their interface. Otherwise the first link's
    /// type wins, then the inferred types of the sub-ports, and a port with
    /// neither resolves to `none`.
    pub fn infer_current_type<F>(&self, link_type: &F) -> Result<Interface>
    where
        F: Fn(LinkId) -> Result<Interface>,
    {
        match &self.interface.kind {
            InterfaceKind::Bit | InterfaceKind::None => Ok(self.interface.clone()),
            _ => {
                if let Some(first) = self.links.first() {
                    link_type(*first)
                } else if !self.sub_ports.is_empty() {
                    let children = self
                        .sub_ports
                        .iter()
                        .map(|port| port.infer_current_type(link_type))
                        .collect::<Result<_>>()?;
                    Ok(Interface::collection(children))
                } else {
                    Ok(Interface::none())
                }
            }
        }
    }

    /// Append one more sub-port to a rest or `any` port. Returns its index.
    pub fn add_speculative_sub_port(&mut self) -> Result<usize> {
        let index = self.sub_ports.len();
        match self.interface.child(index) {
            Some(_) if self.interface.is_expandable() && index >= MAX_SUB_PORTS => Err(Error::InvalidPath {
                path: index.to_string(),
                message: format!("sub-port {index} is past the limit of {MAX_SUB_PORTS}"),
            }),
            Some(child) if self.interface.is_expandable() => {
                self.sub_ports.push(Port::new(child, self.direction));
                Ok(index)
            }
            _ => Err(Error::NotExpandable(self.interface.clone())),
        }
    }

    /// Drop trailing sub-ports that carry no links. Returns how many went.
    pub fn retract_unlinked_sub_ports(&mut self) -> Result<usize> {
        if !self.interface.is_expandable() {
            return Err(Error::NotExpandable(self.interface.clone()));
        }
        let before = self.sub_ports.len();
        while self.sub_ports.last().is_some_and(|port| !port.has_connection()) {
            self.sub_ports.pop();
        }
        Ok(before - self.sub_ports.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{Endpoint, Link, Node};
    use crate::types::GateId;

    fn iface(text: &str) -> Interface {
        text.parse().unwrap()
    }

    fn path(text: &str) -> PathSpec {
        text.parse().unwrap()
    }

    fn bound_link(links: &mut LinkTable) -> LinkId {
        let id = links.next_id();
        links.insert(
            id,
            Link::new(
                Endpoint::new(Node::Gate(GateId(0)), PortPath::root()),
                Endpoint::new(Node::Gate(GateId(1)), PortPath::root()),
                Interface::bit(),
            ),
        );
        id
    }

    #[test]
    fn test_path_spec_parsing() {
        assert_eq!(path(""), PathSpec::root());
        assert_eq!(path("0/"), PathSpec::new(vec![PathStep::Index(0)]));
        assert_eq!(
            path("1//*"),
            PathSpec::new(vec![PathStep::Index(1), PathStep::Next])
        );
        assert_eq!(path("2/*").to_string(), "2/*");
        assert!(matches!(
            "0/x".parse::<PathSpec>(),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_collection_ports_are_eager() {
        let port = Port::input(iface("[bit, <bit, 2>]"));
        assert_eq!(port.sub_ports().len(), 2);
        assert_eq!(port.sub_ports()[1].sub_ports().len(), 2);
        assert!(Port::input(iface("<bit>")).sub_ports().is_empty());
    }

    #[test]
    fn test_connect_to_rest_materializes_intermediates() {
        let mut port = Port::input(iface("<bit>"));
        let resolved = port.connect_to(LinkId(0), &path("2"), &Interface::bit()).unwrap();
        assert_eq!(resolved, PortPath(vec![2]));
        assert_eq!(port.sub_ports().len(), 3);
        assert!(port.sub_ports()[2].has_connection());
        assert!(!port.sub_ports()[0].has_connection());

        let next = port.connect_to(LinkId(1), &path("*"), &Interface::bit()).unwrap();
        assert_eq!(next, PortPath(vec![3]));
    }

    #[test]
    fn test_far_indices_are_rejected() {
        let mut port = Port::input(iface("<bit>"));
        let err = port
            .connect_to(LinkId(0), &path("4000000000"), &Interface::bit())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert!(port.sub_ports().is_empty());

        let mut any = Port::output(Interface::any());
        let err = any
            .connect_to(LinkId(0), &path(&format!("0/{MAX_SUB_PORTS}")), &Interface::bit())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert!(any.sub_ports().is_empty());

        let last = MAX_SUB_PORTS - 1;
        assert!(port.connect_to(LinkId(1), &path(&last.to_string()), &Interface::bit()).is_ok());
        assert_eq!(port.sub_ports().len(), MAX_SUB_PORTS);
        assert!(matches!(
            port.add_speculative_sub_port(),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn test_connect_rejects_bad_paths_without_mutation() {
        let mut port = Port::input(iface("[bit, bit]"));
        let err = port.connect_to(LinkId(0), &path("2"), &Interface::bit()).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));

        let err = port.connect_to(LinkId(0), &path("0/0"), &Interface::bit()).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));

        let err = port.connect_to(LinkId(0), &path("*"), &Interface::bit()).unwrap_err();
        assert!(matches!(err, Error::NotExpandable(_)));

        let mut any = Port::input(Interface::any());
        assert!(any.connect_to(LinkId(0), &path("3/0"), &Interface::bit()).is_ok());
        assert_eq!(any.sub_ports().len(), 4);

        let mut none = Port::input(Interface::none());
        assert!(none.connect_to(LinkId(1), &path("0"), &Interface::bit()).is_err());
        assert!(!none.has_connection());
    }

    #[test]
    fn test_mismatched_connect_leaves_port_unchanged() {
        let mut port = Port::input(iface("<[bit, bit]>"));
        let err = port
            .connect_to(LinkId(0), &path("4"), &Interface::bit())
            .unwrap_err();
        assert!(matches!(err, Error::InterfaceMismatch { .. }));
        assert!(port.sub_ports().is_empty());
        assert!(!port.has_connection());
    }

    #[test]
    fn test_input_leaf_accepts_one_link() {
        let mut port = Port::input(iface("[bit, bit]"));
        port.connect_to(LinkId(0), &path("1"), &Interface::bit()).unwrap();
        let err = port.connect_to(LinkId(1), &path("1"), &Interface::bit()).unwrap_err();
        assert!(matches!(err, Error::InputOccupied { .. }));

        // The parent counts as occupied once anything below it is linked
        let err = port
            .connect_to(LinkId(2), &PathSpec::root(), &iface("<bit, 2>"))
            .unwrap_err();
        assert!(matches!(err, Error::InputOccupied { .. }));

        let mut output = Port::output(Interface::bit());
        output.connect_to(LinkId(0), &PathSpec::root(), &Interface::bit()).unwrap();
        output.connect_to(LinkId(1), &PathSpec::root(), &Interface::bit()).unwrap();
        assert_eq!(output.links().len(), 2);
    }

    #[test]
    fn test_detach() {
        let mut port = Port::input(iface("<bit>"));
        let at = port.connect_to(LinkId(7), &path("1"), &Interface::bit()).unwrap();
        assert!(port.detach(&at, LinkId(7)));
        assert!(!port.detach(&at, LinkId(7)));
        assert!(!port.detach(&PortPath(vec![9]), LinkId(7)));
        assert!(!port.has_connection());
    }

    #[test]
    fn test_default_values() {
        let links = LinkTable::default();
        assert_eq!(
            Port::input(Interface::bit()).value(&links).unwrap(),
            Some(Value::low())
        );
        assert_eq!(
            Port::input(iface("[bit, <bit, 2>]")).value(&links).unwrap(),
            Some("[0, [0, 0]]".parse().unwrap())
        );
        assert_eq!(
            Port::input(iface("<bit>")).value(&links).unwrap(),
            Some(Value::collection(vec![]))
        );
        assert_eq!(Port::input(Interface::any()).value(&links).unwrap(), None);
        assert_eq!(Port::input(Interface::none()).value(&links).unwrap(), None);
        // An unavailable child makes the whole collection unavailable
        assert_eq!(
            Port::input(iface("[bit, any]")).value(&links).unwrap(),
            None
        );
    }

    #[test]
    fn test_value_prefers_linked_last_value() {
        let mut links = LinkTable::default();
        let id = bound_link(&mut links);
        let mut port = Port::input(Interface::bit());
        port.attach(&PortPath::root(), id).unwrap();

        links.get_mut(id).unwrap().current_value = Some(Value::high());
        assert_eq!(port.value(&links).unwrap(), Some(Value::low()));

        links.update_all();
        assert_eq!(port.value(&links).unwrap(), Some(Value::high()));

        links.get_mut(id).unwrap().last_value = Some("[1, 1]".parse().unwrap());
        assert!(matches!(port.value(&links), Err(Error::Type(_))));
    }

    #[test]
    fn test_set_value_fans_out() {
        let mut links = LinkTable::default();
        let whole = bound_link(&mut links);
        let second = bound_link(&mut links);
        let mut port = Port::output(iface("[bit, bit]"));
        port.attach(&PortPath::root(), whole).unwrap();
        port.attach(&PortPath(vec![1]), second).unwrap();

        let value: Value = "[0, 1]".parse().unwrap();
        port.set_value(&value, &mut links).unwrap();
        assert_eq!(links.get(whole).unwrap().current_value, Some(value));
        assert_eq!(links.get(second).unwrap().current_value, Some(Value::high()));

        let err = port.set_value(&Value::high(), &mut links).unwrap_err();
        assert!(matches!(err, Error::Type(_)));
        let err = Port::input(Interface::bit())
            .set_value(&Value::high(), &mut links)
            .unwrap_err();
        assert!(matches!(err, Error::WriteToInput));
    }

    #[test]
    fn test_update_interface_resizes() {
        let mut port = Port::input(iface("[bit, bit, bit]"));
        port.update_interface(iface("[bit, [bit, bit]]")).unwrap();
        assert_eq!(port.sub_ports().len(), 2);
        assert_eq!(port.sub_ports()[1].sub_ports().len(), 2);

        port.update_interface(Interface::bit()).unwrap();
        assert!(port.sub_ports().is_empty());
        assert_eq!(port.interface(), &Interface::bit());
    }

    #[test]
    fn test_update_interface_retypes_rest_children() {
        let mut port = Port::input(Interface::any());
        port.add_speculative_sub_port().unwrap();
        port.add_speculative_sub_port().unwrap();
        port.update_interface(iface("<bit>")).unwrap();
        assert_eq!(port.sub_ports().len(), 2);
        assert!(port.sub_ports().iter().all(|p| p.interface().is_bit()));
    }

    #[test]
    fn test_update_interface_rejects_orphaning() {
        let mut port = Port::input(iface("[bit, bit]"));
        port.connect_to(LinkId(0), &path("1"), &Interface::bit()).unwrap();
        let err = port.update_interface(iface("[bit]")).unwrap_err();
        assert!(matches!(err, Error::RetypeOrphansLinks { index: 1, .. }));
        assert_eq!(port.interface(), &iface("[bit, bit]"));
        assert_eq!(port.sub_ports().len(), 2);
    }

    #[test]
    fn test_infer_current_type() {
        let link_type = |_: LinkId| Ok(Interface::bit());
        let mut port = Port::input(Interface::any());
        assert_eq!(port.infer_current_type(&link_type).unwrap(), Interface::none());

        port.connect_to(LinkId(0), &path("1"), &Interface::bit()).unwrap();
        assert_eq!(
            port.infer_current_type(&link_type).unwrap(),
            iface("[none, bit]")
        );

        let mut direct = Port::input(Interface::any());
        direct.connect_to(LinkId(1), &PathSpec::root(), &Interface::bit()).unwrap();
        assert_eq!(direct.infer_current_type(&link_type).unwrap(), Interface::bit());

        assert_eq!(
            Port::input(Interface::none()).infer_current_type(&link_type).unwrap(),
            Interface::none()
        );
    }

    #[test]
    fn test_speculative_sub_ports() {
        let mut port = Port::input(iface("<bit>"));
        assert_eq!(port.add_speculative_sub_port().unwrap(), 0);
        assert_eq!(port.add_speculative_sub_port().unwrap(), 1);
        assert_eq!(port.add_speculative_sub_port().unwrap(), 2);
        port.attach(&PortPath(vec![1]), LinkId(0)).unwrap();

        assert_eq!(port.retract_unlinked_sub_ports().unwrap(), 1);
        assert_eq!(port.sub_ports().len(), 2);

        let mut fixed = Port::input(iface("[bit]"));
        assert!(matches!(
            fixed.add_speculative_sub_port(),
            Err(Error::NotExpandable(_))
        ));
        assert!(fixed.retract_unlinked_sub_ports().is_err());
    }

    #[test]
    fn test_all_links() {
        let mut port = Port::output(Interface::any());
        port.attach(&PortPath::root(), LinkId(0)).unwrap();
        port.attach(&PortPath(vec![0, 1]), LinkId(1)).unwrap();
        assert_eq!(port.all_links(), vec![LinkId(0), LinkId(1)]);
    }
}
