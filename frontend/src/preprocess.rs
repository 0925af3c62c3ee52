use rtlbridge_elab::{Database, NetId, NetlistId, PrimitiveKind, Role};

use crate::sva::ast_driver;

fn rewrite(db: &mut Database, netlist: NetlistId, net: NetId, count: &mut usize) -> NetId {
    let Some(node) = ast_driver(db, net) else { return net };
    match db.kind(node) {
        Some(PrimitiveKind::SvaAt) => {
            let (Some(clock), Some(body)) = (db.pin(node, Role::Input1), db.pin(node, Role::Input2)) else {
                return net;
            };
            let new_body = rewrite(db, netlist, body, count);
            if new_body == body {
                return net;
            }
            // the clocking node may be shared with an assert or assume
            let (_, output) = db.add_temporal_binary(netlist, PrimitiveKind::SvaAt, clock, new_body);
            output
        }
        Some(PrimitiveKind::SvaNonOverlappedImplication) => {
            let (Some(antecedent), Some(consequent)) = (db.pin(node, Role::Input1), db.pin(node, Role::Input2)) else {
                return net;
            };
            let antecedent = rewrite(db, netlist, antecedent, count);
            let consequent = rewrite(db, netlist, consequent, count);
            *count += 1;
            let (_, output) = db.add_temporal_binary(netlist, PrimitiveKind::SvaSeqConcat, antecedent, consequent);
            output
        }
        _ => net,
    }
}

/// Rewrites non-overlapping implications `a |=> b` under cover statements into the sequence
/// `a ##1 b`.  A cover of an implication is hit vacuously whenever the antecedent does not
/// match; the sequence is only hit when both sides match.
///
/// Returns the number of implications rewritten.
pub fn rewrite_cover_implications(db: &mut Database, netlist: NetlistId) -> usize {
    let roots: Vec<_> = db
        .netlist(netlist)
        .instances
        .iter()
        .copied()
        .filter(|&instance| db.kind(instance) == Some(PrimitiveKind::SvaCover))
        .collect();
    let mut count = 0;
    for root in roots {
        let Some(property) = db.pin(root, Role::Input) else { continue };
        let new_property = rewrite(db, netlist, property, &mut count);
        if new_property != property {
            db.connect_pin(root, Role::Input, new_property);
        }
    }
    count
}
