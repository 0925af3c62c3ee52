//! Compilation of clocked properties into monitor circuits.
//!
//! A property is compiled into a chain of registers tracking how far a match has progressed.
//! `active` is high in the cycle where the sequence parsed so far has matched, and `enabled` is
//! high when the antecedent of an implication has matched and the check applies.

use rtlbridge_elab::{Database, InstanceId, NetId, PrimitiveKind, Role};
use rtlbridge_netlist::{CellRepr, Check, CheckKind, Const, ControlBit, SigBit};

use crate::{import::NetlistImporter, Error};

/// The node driving `net` if it is part of a temporal expression tree.  Past-value samplers are
/// leaves, since they are imported as registers.
pub fn ast_driver(db: &Database, net: NetId) -> Option<InstanceId> {
    if db.is_multiple_driven(net) {
        return None;
    }
    let driver = db.driver(net)?;
    let kind = db.kind(driver)?;
    ((kind.is_sva() || kind.is_psl()) && kind != PrimitiveKind::SvaPast).then_some(driver)
}

#[derive(Debug)]
struct Clocking {
    clock: ControlBit,
    disable: Option<SigBit>,
}

#[derive(Debug)]
struct Sequence {
    length: usize,
    active: SigBit,
    enabled: SigBit,
}

impl NetlistImporter<'_> {
    fn operand(&self, node: InstanceId, role: Role) -> NetId {
        self.db.pin(node, role).unwrap_or_else(|| {
            panic!("temporal operator {:?} is missing its {} operand", self.db.instance(node).name, role.name())
        })
    }

    /// Number of cycles of a `##[low:high]` delay or `[*low:high]` repetition, which must be fixed.
    fn fixed_range(&self, node: InstanceId) -> Result<usize, Error> {
        let attributes = &self.db.instance(node).attributes;
        let (Some(low), Some(high)) = (attributes.get("sva:low"), attributes.get("sva:high")) else {
            return Err(self.unsupported(node, "range is not specified"));
        };
        let range_error = || Error::UnsupportedRange {
            netlist: self.db.netlist(self.netlist).name.clone(),
            instance: self.db.instance(node).name.clone(),
            low: low.clone(),
            high: high.clone(),
        };
        if low != high {
            return Err(range_error());
        }
        low.parse().map_err(|_| range_error())
    }

    fn sequence_ff(&mut self, clocking: &Clocking, sequence: &mut Sequence) {
        if let Some(disable) = clocking.disable {
            sequence.enabled = self.module.mux_gate(sequence.enabled, SigBit::ZERO, disable);
        }
        sequence.active = self.module.dff(sequence.active, clocking.clock, Some(Const::zero(1))).unwrap_bit();
        sequence.enabled = self.module.dff(sequence.enabled, clocking.clock, Some(Const::zero(1))).unwrap_bit();
        sequence.length += 1;
    }

    fn compile_sequence(&mut self, clocking: &Clocking, sequence: &mut Sequence, net: NetId) -> Result<(), Error> {
        let db = self.db;
        let Some(node) = ast_driver(db, net) else {
            let condition = self.nets.at(db, net)?;
            sequence.active = self.module.and_gate(sequence.active, condition);
            return Ok(());
        };
        let kind = db.kind(node).expect("temporal operator is a primitive");
        match kind {
            PrimitiveKind::SvaOverlappedImplication | PrimitiveKind::PslImpl => {
                self.compile_sequence(clocking, sequence, self.operand(node, Role::Input1))?;
                sequence.enabled = self.module.and_gate(sequence.enabled, sequence.active);
                self.compile_sequence(clocking, sequence, self.operand(node, Role::Input2))
            }
            PrimitiveKind::SvaNonOverlappedImplication | PrimitiveKind::PslSuffixImpl => {
                self.compile_sequence(clocking, sequence, self.operand(node, Role::Input1))?;
                sequence.enabled = self.module.and_gate(sequence.enabled, sequence.active);
                self.sequence_ff(clocking, sequence);
                self.compile_sequence(clocking, sequence, self.operand(node, Role::Input2))
            }
            PrimitiveKind::SvaSeqConcat => {
                let delay = self.fixed_range(node)?;
                self.compile_sequence(clocking, sequence, self.operand(node, Role::Input1))?;
                for _ in 0..delay {
                    self.sequence_ff(clocking, sequence);
                }
                self.compile_sequence(clocking, sequence, self.operand(node, Role::Input2))
            }
            PrimitiveKind::SvaConsecutiveRepeat => {
                let count = self.fixed_range(node)?;
                let body = self.operand(node, Role::Input);
                self.compile_sequence(clocking, sequence, body)?;
                for _ in 1..count {
                    self.sequence_ff(clocking, sequence);
                    self.compile_sequence(clocking, sequence, body)?;
                }
                Ok(())
            }
            PrimitiveKind::PslAlways => self.compile_sequence(clocking, sequence, self.operand(node, Role::Input)),
            _ => {
                let reason = format!("temporal operator of kind {} is not supported", kind.name());
                if !self.config.keep_going {
                    return Err(self.unsupported(node, reason));
                }
                self.warn(format!("{} in {}, dropping it", reason, db.instance(node).name));
                Ok(())
            }
        }
    }

    /// Compiles the property checked by an assertion, assumption, or cover root into a check cell.
    pub(crate) fn import_property(&mut self, root: InstanceId, kind: CheckKind) -> Result<(), Error> {
        let db = self.db;
        let root_name = &db.instance(root).name;
        let at_node = ast_driver(db, self.operand(root, Role::Input))
            .filter(|&node| matches!(db.kind(node), Some(PrimitiveKind::SvaAt | PrimitiveKind::PslAt)))
            .unwrap_or_else(|| panic!("property {root_name:?} has no clocking node"));
        let (clock_node, mut sequence_net) = match db.kind(at_node) {
            Some(PrimitiveKind::SvaAt) => {
                (ast_driver(db, self.operand(at_node, Role::Input1)), self.operand(at_node, Role::Input2))
            }
            _ => (db.pin_driver(at_node, Role::Input2), self.operand(at_node, Role::Input1)),
        };
        let clock_node = clock_node.unwrap_or_else(|| panic!("property {root_name:?} has no clock edge"));
        let clock = self.resolve_clock(clock_node)?;

        let mut disable = None;
        if let Some(node) = ast_driver(db, sequence_net) {
            match db.kind(node) {
                Some(PrimitiveKind::SvaDisableIff) => {
                    disable = Some(self.input(node, Role::Input1)?);
                    sequence_net = self.operand(node, Role::Input2);
                }
                Some(PrimitiveKind::PslAbort) => {
                    disable = Some(self.input(node, Role::Input2)?);
                    sequence_net = self.operand(node, Role::Input1);
                }
                _ => (),
            }
        }

        let clocking = Clocking { clock, disable };
        let mut sequence = Sequence { length: 0, active: SigBit::ONE, enabled: SigBit::ONE };
        self.compile_sequence(&clocking, &mut sequence, sequence_net)?;
        self.sequence_ff(&clocking, &mut sequence);

        let name = self.name_for(root_name, db.instance(root).user_declared);
        if self.config.verbose {
            log::info!("compiled property {} into {} ({} cycles)", root_name, name, sequence.length);
        }
        self.module.add_cell(
            name,
            CellRepr::Check(Check { kind, condition: sequence.active, enable: sequence.enabled }),
        );
        Ok(())
    }
}
