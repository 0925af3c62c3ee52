use std::collections::{HashMap, HashSet};

use rtlbridge_elab::{Database, Direction, NetId, NetlistId, NetlistKind};

/// Rewrites hierarchical references, where an instance connection uses a net of another
/// netlist, into ordinary connections by adding output ports along the path from the owner
/// of the net upwards.
///
/// Ports can only be added to netlists instantiated exactly once, so references into a
/// netlist with several instances are left alone.
#[derive(Debug, Default)]
pub struct ExternalNetResolver {
    verbose: bool,
    counter: usize,
    level_up: HashMap<NetId, NetId>,
    visited: HashSet<NetlistId>,
}

impl ExternalNetResolver {
    pub fn new(verbose: bool) -> Self {
        ExternalNetResolver { verbose, ..Default::default() }
    }

    /// Exports `net` from its owner through a new port, and returns the net it is connected to
    /// in the instantiating netlist.  Returns `net` itself if the owner is not uniquely
    /// instantiated.
    fn level_up(&mut self, db: &mut Database, net: NetId) -> NetId {
        let owner = db.net(net).owner;
        let &[up_instance] = db.netlist(owner).references.as_slice() else { return net };
        if let Some(&up_net) = self.level_up.get(&net) {
            return up_net;
        }
        let up_netlist = db.instance(up_instance).owner;
        let name = format!("___extnets_{}", self.counter);
        self.counter += 1;
        let port = db.add_port(owner, name.as_str(), Direction::Output);
        db.connect_port_net(port, net);
        let up_net = db.add_net(up_netlist, name);
        db.connect(up_instance, port, up_net);
        if self.verbose {
            log::info!(
                "exporting net {} of {} to {} through port {}",
                db.net(net).name,
                db.netlist(owner).name,
                db.netlist(up_netlist).name,
                db.net(up_net).name
            );
        }
        self.level_up.insert(net, up_net);
        up_net
    }

    /// Resolves references in `netlist` and every netlist below it.  Returns the number of
    /// connections rewritten.
    pub fn run(&mut self, db: &mut Database, netlist: NetlistId) -> usize {
        if !self.visited.insert(netlist) {
            return 0;
        }
        let mut count = 0;
        let instances = db.netlist(netlist).instances.clone();
        for &instance in &instances {
            let view = db.instance(instance).view;
            if db.netlist(view).kind == NetlistKind::Module {
                count += self.run(db, view);
            }
        }

        let mut external = vec![];
        for &instance in &instances {
            for (&port, &net) in &db.instance(instance).connections {
                if db.is_external_to(net, netlist) {
                    external.push((instance, port, net));
                }
            }
        }
        for (instance, port, net) in external {
            let mut new_net = net;
            while db.is_external_to(new_net, netlist) {
                let next = self.level_up(db, new_net);
                if next == new_net {
                    break;
                }
                new_net = next;
            }
            if new_net == net {
                continue;
            }
            if self.verbose {
                log::info!(
                    "connecting {}.{} to {} instead of {}",
                    db.instance(instance).name,
                    db.port(port).name,
                    db.net(new_net).name,
                    db.net(net).name
                );
            }
            db.connect(instance, port, new_net);
            count += 1;
        }
        count
    }
}
