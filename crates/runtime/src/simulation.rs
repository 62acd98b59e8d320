//! Tick driver
//!
//! A [`Simulation`] owns a root gate and the two host links bound to its
//! outer ports. Hosts seed the input, tick, and read the output link.

use gatework_types::Value;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result};
use crate::gate::Gate;
use crate::link::{Endpoint, Link, LinkTable, Node};
use crate::port::{PathSpec, PortPath};
use crate::types::{GateId, LinkId, TickContext};

/// Node id the root gate takes in host links
pub const ROOT: GateId = GateId(0);

/// Root gate plus the host links feeding and draining it
#[derive(Debug)]
pub struct Simulation {
    root: Gate,
    links: LinkTable,
    input_link: LinkId,
    output_link: LinkId,
    tick: u64,
}

impl Simulation {
    pub fn new(mut root: Gate) -> Result<Self> {
        let mut links = LinkTable::default();
        let root_node = Endpoint::new(Node::Gate(ROOT), PortPath::root());
        let host = Endpoint::new(Node::Host, PortPath::root());

        let input_iface = root.input().interface().clone();
        let input_link = links.next_id();
        let path = root
            .input
            .connect_to(input_link, &PathSpec::root(), &input_iface)?;
        links.insert(
            input_link,
            Link::new(host.clone(), Endpoint::new(Node::Gate(ROOT), path), input_iface),
        );

        let output_iface = root.output().interface().clone();
        let output_link = links.next_id();
        root.output.attach(&PortPath::root(), output_link)?;
        links.insert(output_link, Link::new(root_node, host, output_iface));

        info!(
            root = root.type_name(),
            input = %root.input().interface(),
            output = %root.output().interface(),
            "simulation created"
        );
        Ok(Self {
            root,
            links,
            input_link,
            output_link,
            tick: 0,
        })
    }

    /// Drive the root input with `value` from now on.
    pub fn set_input(&mut self, value: Value) -> Result<()> {
        self.root.input().interface().check(&value)?;
        let link = self
            .links
            .get_mut(self.input_link)
            .ok_or(Error::LinkNotFound(self.input_link))?;
        debug!(%value, "input set");
        link.current_value = Some(value.clone());
        link.last_value = Some(value);
        Ok(())
    }

    /// Advance one tick: update the root once, then every host link.
    #[instrument(skip(self), fields(tick = self.tick))]
    pub fn tick(&mut self) -> TickContext {
        self.root.update(&mut self.links);
        self.links.update_all();
        if let Some(err) = self.root.error() {
            debug!(error = %err, "root fault");
        }
        let context = TickContext { tick: self.tick };
        self.tick += 1;
        context
    }

    /// Run `ticks` ticks, collecting the output after each.
    pub fn run(&mut self, ticks: u64) -> Vec<Option<Value>> {
        (0..ticks)
            .map(|_| {
                self.tick();
                self.output().cloned()
            })
            .collect()
    }

    /// Value the root produced on the last tick.
    pub fn output(&self) -> Option<&Value> {
        self.links
            .get(self.output_link)
            .and_then(|link| link.last_value.as_ref())
    }

    pub fn root(&self) -> &Gate {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Gate {
        &mut self.root
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn error(&self) -> Option<&Error> {
        self.root.error()
    }
}
