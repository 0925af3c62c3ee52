use rtlbridge_elab::{Database, InstanceId, NetId, PrimitiveKind, Role};
use rtlbridge_netlist::ControlBit;

use crate::{import::NetlistImporter, Error};

/// The clock net and active edge named by a clocking node of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockEdge {
    pub clock: NetId,
    pub posedge: bool,
}

fn driver_of_kind(db: &Database, net: NetId, kind: PrimitiveKind) -> Option<InstanceId> {
    db.driver(net).filter(|&driver| db.kind(driver) == Some(kind))
}

fn follow_inv(db: &Database, net: NetId) -> Option<NetId> {
    driver_of_kind(db, net, PrimitiveKind::Inv).and_then(|inv| db.pin(inv, Role::Input))
}

fn follow_pslprev(db: &Database, net: NetId) -> Option<NetId> {
    driver_of_kind(db, net, PrimitiveKind::PslPrev)
        .filter(|&prev| db.pin_width(prev, Role::Input1) == 1)
        .and_then(|prev| db.pin(prev, Role::Input1))
}

fn follow_inv_pslprev(db: &Database, net: NetId) -> Option<NetId> {
    follow_inv(db, net).and_then(|net| follow_pslprev(db, net))
}

impl ClockEdge {
    /// Resolves an SVA `posedge` node, or the `clk & !prev(clk)` conjunction that PSL edge
    /// functions elaborate into.
    ///
    /// Panics if the node does not have one of these shapes.
    pub fn resolve(db: &Database, node: InstanceId) -> ClockEdge {
        let name = &db.instance(node).name;
        match db.kind(node) {
            Some(PrimitiveKind::SvaPosedge) => {
                let clock = db.pin(node, Role::Input).unwrap_or_else(|| panic!("clock edge {name:?} has no input"));
                // the inverted clock may have other loads besides this edge
                if !db.is_multiple_driven(clock) {
                    if let Some(inverted) = follow_inv(db, clock) {
                        return ClockEdge { clock: inverted, posedge: false };
                    }
                }
                ClockEdge { clock, posedge: true }
            }
            Some(PrimitiveKind::And) => {
                let (Some(w1), Some(w2)) = (db.pin(node, Role::Input1), db.pin(node, Role::Input2)) else {
                    panic!("clock edge {name:?} is missing an input")
                };
                if follow_inv_pslprev(db, w1) == Some(w2) {
                    return ClockEdge { clock: w2, posedge: true };
                }
                if follow_inv_pslprev(db, w2) == Some(w1) {
                    return ClockEdge { clock: w1, posedge: true };
                }
                if let Some(clock) = follow_pslprev(db, w1).filter(|&clock| follow_inv(db, w2) == Some(clock)) {
                    return ClockEdge { clock, posedge: false };
                }
                if let Some(clock) = follow_pslprev(db, w2).filter(|&clock| follow_inv(db, w1) == Some(clock)) {
                    return ClockEdge { clock, posedge: false };
                }
                panic!("clock edge {name:?} is not a conjunction of a clock and its past value")
            }
            kind => panic!("clock edge {name:?} has unexpected kind {kind:?}"),
        }
    }
}

impl NetlistImporter<'_> {
    pub(crate) fn resolve_clock(&self, node: InstanceId) -> Result<ControlBit, Error> {
        let edge = ClockEdge::resolve(self.db, node);
        if self.config.verbose {
            log::info!(
                "clocked on {} of {}",
                if edge.posedge { "posedge" } else { "negedge" },
                self.db.net(edge.clock).name
            );
        }
        Ok(ControlBit::new(self.nets.at(self.db, edge.clock)?, edge.posedge))
    }
}
