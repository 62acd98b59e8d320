//! Links and link storage
//!
//! A [`Link`] carries a value from one port leaf to another with a
//! one-tick delay: the source writes `current_value` while gates update,
//! and the sink reads `last_value`, which only catches up when the link
//! itself updates at the end of the tick. That delay is what lets cyclic
//! circuits settle without recursion.

use gatework_types::{Interface, Value};
use indexmap::IndexMap;

use crate::port::PortPath;
use crate::types::{GateId, LinkId};

/// What a link endpoint is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    /// A child gate of the circuit; its output on the source side, its
    /// input on the sink side
    Gate(GateId),
    /// The circuit's own boundary; the inner input on the source side,
    /// the inner output on the sink side
    Boundary,
    /// The host driving a simulation
    Host,
}

/// One end of a link: a node plus the concrete sub-port path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: Node,
    pub path: PortPath,
}

impl Endpoint {
    pub fn new(node: Node, path: PortPath) -> Self {
        Self { node, path }
    }
}

/// Directed, one-tick-delayed data edge between two port leaves
#[derive(Debug, Clone)]
pub struct Link {
    pub from: Endpoint,
    pub to: Endpoint,
    /// Interface of the source leaf when the link was bound
    pub data_interface: Interface,
    /// Written by the source during the current tick
    pub current_value: Option<Value>,
    /// Visible to the sink during the current tick
    pub last_value: Option<Value>,
}

impl Link {
    pub fn new(from: Endpoint, to: Endpoint, data_interface: Interface) -> Self {
        Self {
            from,
            to,
            data_interface,
            current_value: None,
            last_value: None,
        }
    }

    /// Seed both values, as if the link had carried `value` last tick.
    pub fn with_value(mut self, value: Option<Value>) -> Self {
        self.current_value.clone_from(&value);
        self.last_value = value;
        self
    }

    /// Make the value written this tick visible to the sink.
    pub fn update(&mut self) {
        self.last_value.clone_from(&self.current_value);
    }
}

/// Insertion-ordered link arena owned by a circuit or simulation
#[derive(Debug, Default)]
pub struct LinkTable {
    links: IndexMap<LinkId, Link>,
    next_id: u64,
}

impl LinkTable {
    /// Reserve an id for a link about to be bound
    pub fn next_id(&mut self) -> LinkId {
        let id = LinkId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, id: LinkId, link: Link) {
        self.links.insert(id, link);
    }

    pub fn get(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    pub fn get_mut(&mut self, id: LinkId) -> Option<&mut Link> {
        self.links.get_mut(&id)
    }

    pub fn remove(&mut self, id: LinkId) -> Option<Link> {
        self.links.shift_remove(&id)
    }

    pub fn contains(&self, id: LinkId) -> bool {
        self.links.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkId, &Link)> {
        self.links.iter().map(|(id, link)| (*id, link))
    }

    pub fn ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.links.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Advance every link by one tick
    pub fn update_all(&mut self) {
        for link in self.links.values_mut() {
            link.update();
        }
    }
}
