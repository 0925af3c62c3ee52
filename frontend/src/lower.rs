use rtlbridge_elab::{InstanceId, PrimitiveKind, Role};
use rtlbridge_netlist::{
    BinaryOp, CellRepr, Const, ControlBit, FlipFlop, Gate, Latch, MuxCell, SetResetFlipFlop, SigBit, SigSpec, State,
    UnaryOp,
};

use crate::{import::NetlistImporter, Error};

impl NetlistImporter<'_> {
    /// Lowers single-bit primitives into gates, flip-flops, and latches.  Returns `false` for
    /// kinds that have no gate-level equivalent.
    pub(crate) fn lower_gate(&mut self, instance: InstanceId, kind: PrimitiveKind, name: &str) -> Result<bool, Error> {
        use PrimitiveKind::*;
        let name = name.to_owned();
        match kind {
            And | Or | Xor | Xnor => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let y = self.output(instance, Role::Output)?;
                let gate = match kind {
                    And => Gate::And { a, b, y },
                    Or => Gate::Or { a, b, y },
                    Xor => Gate::Xor { a, b, y },
                    _ => Gate::Xnor { a, b, y },
                };
                self.add_gate(name, gate);
            }
            Nand | Nor => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let y = self.output(instance, Role::Output)?;
                let tmp = match kind {
                    Nand => self.module.and_gate(a, b),
                    _ => self.module.or_gate(a, b),
                };
                self.add_gate(name, Gate::Not { a: tmp, y });
            }
            Inv => {
                let a = self.input(instance, Role::Input)?;
                let y = self.output(instance, Role::Output)?;
                self.add_gate(name, Gate::Not { a, y });
            }
            Mux => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let s = self.input(instance, Role::Control)?;
                let y = self.output(instance, Role::Output)?;
                self.add_gate(name, Gate::Mux { a, b, s, y });
            }
            Tri => {
                let b = self.input(instance, Role::Input)?;
                let s = self.input(instance, Role::Control)?;
                let y = self.output(instance, Role::Output)?;
                self.add_gate(name, Gate::Mux { a: SigBit::HIZ, b, s, y });
            }
            Fadd => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let c = self.input(instance, Role::Cin)?;
                let y = self.output(instance, Role::Output)?;
                let x = self.output(instance, Role::Cout)?;
                let a_xor_b = self.module.xor_gate(a, b);
                self.add_gate(name, Gate::Xor { a: a_xor_b, b: c, y });
                let carry_in = self.module.and_gate(a_xor_b, c);
                let carry_ab = self.module.and_gate(a, b);
                let gate_name = self.module.new_id();
                self.add_gate(gate_name, Gate::Or { a: carry_in, b: carry_ab, y: x });
            }
            Dffrs => self.lower_dffrs(instance, name)?,
            Dlatchrs => self.lower_dlatchrs(instance, name)?,

            Pwr | Gnd | X | Z | Buf | Adder | Multiplier | Divider | Modulo | Remainder | ShiftLeft | ShiftRight
            | EnabledDecoder | Decoder | ReduceAnd | ReduceOr | ReduceXor | ReduceXnor | LessThan | WideAnd
            | WideOr | WideXor | WideXnor | WideBuf | WideInv | Minus | UMinus | Equal | NotEqual | WideMux
            | WideTri | WideDffrs | ReadPort | WritePort | ClockedWritePort | PslPrev | Selector
            | SvaImmediateAssert | SvaImmediateAssume | SvaImmediateCover | SvaAssert | SvaAssume | SvaCover
            | SvaPosedge | SvaAt | SvaDisableIff | SvaOverlappedImplication | SvaNonOverlappedImplication
            | SvaSeqConcat | SvaConsecutiveRepeat | SvaPast | SvaNot | SvaAnd | SvaOr | SvaThroughout | SvaWithin
            | SvaIntersect | SvaFirstMatch | SvaEventually | SvaUntil | SvaNonConsecutiveRepeat | SvaGotoRepeat
            | SvaRose | SvaFell | SvaStable | PslAssert | PslAssume | PslCover | PslAt | PslAbort | PslAlways
            | PslImpl | PslSuffixImpl | PslNever | PslNext | PslEventually | PslUntil | HdlAssertion | Pullup
            | Pulldown | Nmos | Pmos => return Ok(false),
        }
        Ok(true)
    }

    fn lower_dffrs(&mut self, instance: InstanceId, name: String) -> Result<(), Error> {
        let set_is_gnd = self.is_gnd(instance, Role::Set);
        let reset_is_gnd = self.is_gnd(instance, Role::Reset);
        let clock = ControlBit::Pos(self.input(instance, Role::Clock)?);
        let data = self.input(instance, Role::Input)?;
        let output = self.output(instance, Role::Output)?;
        let set = self.input(instance, Role::Set)?;
        let reset = self.input(instance, Role::Reset)?;
        let repr = match (set_is_gnd, reset_is_gnd) {
            (true, true) => CellRepr::Dff(FlipFlop::new(data, output, clock)),
            (true, false) => {
                CellRepr::Dff(FlipFlop::new(data, output, clock).with_clear_value(ControlBit::Pos(reset), false))
            }
            (false, true) => {
                CellRepr::Dff(FlipFlop::new(data, output, clock).with_clear_value(ControlBit::Pos(set), true))
            }
            (false, false) => CellRepr::Dffsr(SetResetFlipFlop {
                data: data.into(),
                output: output.into(),
                clock,
                set: set.into(),
                reset: reset.into(),
            }),
        };
        self.module.add_cell(name, repr);
        Ok(())
    }

    fn lower_dlatchrs(&mut self, instance: InstanceId, name: String) -> Result<(), Error> {
        let plain = self.is_gnd(instance, Role::Set) && self.is_gnd(instance, Role::Reset);
        let enable = ControlBit::Pos(self.input(instance, Role::Control)?);
        let data = self.input(instance, Role::Input)?;
        let output = self.output(instance, Role::Output)?;
        let mut latch = Latch::new(data, output, enable);
        if !plain {
            latch = latch.with_set_reset(self.input(instance, Role::Set)?, self.input(instance, Role::Reset)?);
        }
        self.module.add_cell(name, CellRepr::Latch(latch));
        Ok(())
    }

    /// Lowers primitives and word-level operators into word-level cells.  Returns `false` for
    /// kinds that have no cell equivalent.
    pub(crate) fn lower_cell(&mut self, instance: InstanceId, kind: PrimitiveKind, name: &str) -> Result<bool, Error> {
        use PrimitiveKind::*;
        let name = name.to_owned();
        let signed = self.db.is_signed(instance);
        match kind {
            And | Or | Xor | Xnor => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let y = self.output(instance, Role::Output)?;
                let op = match kind {
                    And => BinaryOp::And,
                    Or => BinaryOp::Or,
                    Xor => BinaryOp::Xor,
                    _ => BinaryOp::Xnor,
                };
                self.add_binary(name, op, false, a.into(), b.into(), y.into());
            }
            Nand | Nor => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let y = self.output(instance, Role::Output)?;
                let tmp = self.module.add_auto_wire(1);
                let op = if kind == Nand { BinaryOp::And } else { BinaryOp::Or };
                let tmp_name = self.module.new_id();
                self.add_binary(tmp_name, op, false, a.into(), b.into(), tmp.clone());
                self.add_unary(name, UnaryOp::Not, false, tmp, y.into());
            }
            Inv => {
                let a = self.input(instance, Role::Input)?;
                let y = self.output(instance, Role::Output)?;
                self.add_unary(name, UnaryOp::Not, false, a.into(), y.into());
            }
            Mux => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let s = self.input(instance, Role::Control)?;
                let y = self.output(instance, Role::Output)?;
                self.module.add_cell(name, CellRepr::Mux(MuxCell { a: a.into(), b: b.into(), s, y: y.into() }));
            }
            Tri => {
                let b = self.input(instance, Role::Input)?;
                let s = self.input(instance, Role::Control)?;
                let y = self.output(instance, Role::Output)?;
                self.module.add_cell(name, CellRepr::Mux(MuxCell { a: SigBit::HIZ.into(), b: b.into(), s, y: y.into() }));
            }
            Fadd => {
                let a = self.input(instance, Role::Input1)?;
                let b = self.input(instance, Role::Input2)?;
                let c = self.input(instance, Role::Cin)?;
                let mut y = SigSpec::from(self.output(instance, Role::Output)?);
                if let Some(net) = self.db.pin(instance, Role::Cout) {
                    y.push(self.nets.at(self.db, net)?);
                }
                let a_plus_b = self.module.add_auto_wire(2);
                let tmp_name = self.module.new_id();
                self.add_binary(tmp_name, BinaryOp::Add, false, a.into(), b.into(), a_plus_b.clone());
                self.add_binary(name, BinaryOp::Add, false, a_plus_b, c.into(), y);
            }
            Dffrs => self.lower_dffrs(instance, name)?,
            Dlatchrs => self.lower_dlatchrs(instance, name)?,

            Adder => {
                let a = self.input_bits(instance, Role::Input1)?;
                let b = self.input_bits(instance, Role::Input2)?;
                let mut y = self.output_bits(instance, Role::Output)?;
                if let Some(net) = self.db.pin(instance, Role::Cout) {
                    y.push(self.nets.at(self.db, net)?);
                }
                if self.is_gnd(instance, Role::Cin) {
                    self.add_binary(name, BinaryOp::Add, signed, a, b, y);
                } else {
                    let tmp = self.module.add_auto_wire(y.len());
                    let tmp_name = self.module.new_id();
                    self.add_binary(tmp_name, BinaryOp::Add, signed, a, b, tmp.clone());
                    let cin = self.input(instance, Role::Cin)?;
                    self.add_binary(name, BinaryOp::Add, false, tmp, cin.into(), y);
                }
            }
            Multiplier | Divider | Modulo | Remainder | Minus | Equal | NotEqual | WideAnd | WideOr | WideXor
            | WideXnor => {
                let op = match kind {
                    Multiplier => BinaryOp::Mul,
                    Divider => BinaryOp::Div,
                    Modulo | Remainder => BinaryOp::Mod,
                    Minus => BinaryOp::Sub,
                    Equal => BinaryOp::Eq,
                    NotEqual => BinaryOp::Ne,
                    WideAnd => BinaryOp::And,
                    WideOr => BinaryOp::Or,
                    WideXor => BinaryOp::Xor,
                    _ => BinaryOp::Xnor,
                };
                let a = self.input_bits(instance, Role::Input1)?;
                let b = self.input_bits(instance, Role::Input2)?;
                let y = self.output_bits(instance, Role::Output)?;
                self.add_binary(name, op, signed, a, b, y);
            }
            ShiftLeft => {
                let a = self.input_bits(instance, Role::Input1)?;
                let b = self.input_bits(instance, Role::Input2)?;
                let y = self.output_bits(instance, Role::Output)?;
                self.add_binary(name, BinaryOp::Shl, false, a, b, y);
            }
            ShiftRight => {
                let a = self.input_bits(instance, Role::Input1)?;
                let b = self.input_bits(instance, Role::Input2)?;
                let y = self.output_bits(instance, Role::Output)?;
                let cin = self.db.pin(instance, Role::Cin);
                if self.is_gnd(instance, Role::Cin) {
                    self.add_binary(name, BinaryOp::Shr, false, a, b, y);
                } else if cin.is_some() && cin == self.db.pin_bits(instance, Role::Input1).last().copied().flatten() {
                    self.add_binary(name, BinaryOp::Sshr, true, a, b, y);
                } else {
                    return Err(self.unsupported(instance, "right shift with a carry input other than the sign bit"));
                }
            }
            EnabledDecoder | Decoder => {
                let y = self.output_bits(instance, Role::Output)?;
                let first = match kind {
                    EnabledDecoder => self.input(instance, Role::Control)?,
                    _ => SigBit::ONE,
                };
                let mut a = SigSpec::from(first);
                a.append(&SigSpec::from_state(State::Zero, y.len().saturating_sub(1)));
                let b = self.input_bits(instance, Role::Input)?;
                self.add_binary(name, BinaryOp::Shl, false, a, b, y);
            }
            ReduceAnd | ReduceOr | ReduceXor | ReduceXnor => {
                let op = match kind {
                    ReduceAnd => UnaryOp::ReduceAnd,
                    ReduceOr => UnaryOp::ReduceOr,
                    ReduceXor => UnaryOp::ReduceXor,
                    _ => UnaryOp::ReduceXnor,
                };
                let a = self.input_bits(instance, Role::Input)?;
                let y = self.output(instance, Role::Output)?;
                self.add_unary(name, op, false, a, y.into());
            }
            LessThan => {
                let a = self.input_bits(instance, Role::Input1)?;
                let b = self.input_bits(instance, Role::Input2)?;
                let y = self.output(instance, Role::Output)?;
                let op = if self.is_gnd(instance, Role::Cin) {
                    BinaryOp::Lt
                } else if self.db.pin(instance, Role::Cin).is_some_and(|net| self.db.is_pwr(net)) {
                    BinaryOp::Le
                } else {
                    return Err(self.unsupported(instance, "comparison with a non-constant carry input"));
                };
                self.add_binary(name, op, signed, a, b, y.into());
            }
            WideBuf | WideInv | UMinus => {
                let op = match kind {
                    WideBuf => UnaryOp::Pos,
                    WideInv => UnaryOp::Not,
                    _ => UnaryOp::Neg,
                };
                let a = self.input_bits(instance, Role::Input)?;
                let y = self.output_bits(instance, Role::Output)?;
                self.add_unary(name, op, signed, a, y);
            }
            WideMux => {
                let a = self.input_bits(instance, Role::Input1)?;
                let b = self.input_bits(instance, Role::Input2)?;
                let s = self.input(instance, Role::Control)?;
                let y = self.output_bits(instance, Role::Output)?;
                self.module.add_cell(name, CellRepr::Mux(MuxCell { a, b, s, y }));
            }
            WideTri => {
                let b = self.input_bits(instance, Role::Input)?;
                let s = self.input(instance, Role::Control)?;
                let y = self.output_bits(instance, Role::Output)?;
                let a = SigSpec::from_state(State::HiZ, b.len());
                self.module.add_cell(name, CellRepr::Mux(MuxCell { a, b, s, y }));
            }
            WideDffrs => {
                let set = self.inport_bits(instance, Role::Set)?;
                let reset = self.inport_bits(instance, Role::Reset)?;
                let clock = ControlBit::Pos(self.input(instance, Role::Clock)?);
                let data = self.input_bits(instance, Role::Input)?;
                let output = self.output_bits(instance, Role::Output)?;
                let inactive = |sig: &SigSpec| sig.as_const().is_some_and(|value: Const| !value.as_bool());
                let repr = if inactive(&set) && inactive(&reset) {
                    CellRepr::Dff(FlipFlop::new(data, output, clock))
                } else {
                    CellRepr::Dffsr(SetResetFlipFlop { data, output, clock, set, reset })
                };
                self.module.add_cell(name, repr);
            }

            Pwr | Gnd | X | Z | Buf | ReadPort | WritePort | ClockedWritePort | PslPrev | Selector
            | SvaImmediateAssert | SvaImmediateAssume | SvaImmediateCover | SvaAssert | SvaAssume | SvaCover
            | SvaPosedge | SvaAt | SvaDisableIff | SvaOverlappedImplication | SvaNonOverlappedImplication
            | SvaSeqConcat | SvaConsecutiveRepeat | SvaPast | SvaNot | SvaAnd | SvaOr | SvaThroughout | SvaWithin
            | SvaIntersect | SvaFirstMatch | SvaEventually | SvaUntil | SvaNonConsecutiveRepeat | SvaGotoRepeat
            | SvaRose | SvaFell | SvaStable | PslAssert | PslAssume | PslCover | PslAt | PslAbort | PslAlways
            | PslImpl | PslSuffixImpl | PslNever | PslNext | PslEventually | PslUntil | HdlAssertion | Pullup
            | Pulldown | Nmos | Pmos => return Ok(false),
        }
        Ok(true)
    }
}
