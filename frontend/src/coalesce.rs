use std::collections::BTreeMap;

use rtlbridge_netlist::{CellRepr, ControlBit, FlipFlop, Module, SigBit, SigMap, SigSpec};

fn data_bit(module: &Module, sigmap: &SigMap, name: &str) -> SigBit {
    match module.cell(name).map(|cell| &cell.repr) {
        Some(CellRepr::Dff(flip_flop)) => sigmap.find(flip_flop.data[0]),
        _ => unreachable!("register {name:?} disappeared"),
    }
}

fn output_bit(module: &Module, name: &str) -> SigBit {
    match module.cell(name).map(|cell| &cell.repr) {
        Some(CellRepr::Dff(flip_flop)) => flip_flop.output[0],
        _ => unreachable!("register {name:?} disappeared"),
    }
}

/// Merges single-bit registers sharing a clock whose inputs are adjacent bits of one wire into
/// a single wider register, and collapses registers sampling the same bit into one.  Repeats
/// until nothing changes, so that chains of past values collapse into a few wide registers.
///
/// Only registers named in `candidates` that have no clear and no initial value are considered.
/// Returns the number of registers removed.
pub fn merge_past_registers(module: &mut Module, candidates: &[String], verbose: bool) -> usize {
    let mut groups: BTreeMap<ControlBit, Vec<String>> = BTreeMap::new();
    for name in candidates {
        let Some(CellRepr::Dff(flip_flop)) = module.cell(name).map(|cell| &cell.repr) else { continue };
        if flip_flop.output_len() != 1 || flip_flop.has_clear() || flip_flop.has_init_value() {
            continue;
        }
        groups.entry(flip_flop.clock).or_default().push(name.clone());
    }

    let mut removed = 0;
    for (clock, mut registers) in groups {
        let mut sigmap = SigMap::new();
        'merge: loop {
            let mut data_bits: SigSpec = registers.iter().map(|name| data_bit(module, &sigmap, name)).collect();
            data_bits.sort_and_unify();
            for chunk in data_bits.chunks() {
                let matching: Vec<Vec<String>> = chunk
                    .iter()
                    .map(|bit| {
                        registers.iter().filter(|name| data_bit(module, &sigmap, name) == bit).cloned().collect()
                    })
                    .collect();
                if chunk.len() > 1 && chunk[0].wire().is_some() {
                    let output = module.add_auto_wire(chunk.len());
                    let name = module.new_id();
                    if verbose {
                        log::info!("merging {} past-value registers into {}", chunk.len(), name);
                    }
                    module.add_cell(name.clone(), CellRepr::Dff(FlipFlop::new(chunk.clone(), output.clone(), clock)));
                    for (index, names) in matching.into_iter().enumerate() {
                        for old in names {
                            let old_output = output_bit(module, &old);
                            if cfg!(feature = "trace") {
                                eprintln!(">merge {old} into {name}[{index}]");
                            }
                            sigmap.add(old_output, output[index]);
                            module.connect(old_output, output[index]);
                            module.remove_cell(&old);
                            registers.retain(|name| *name != old);
                            removed += 1;
                        }
                    }
                    continue 'merge;
                }
                for names in &matching {
                    let [first, rest @ ..] = names.as_slice() else { continue };
                    if rest.is_empty() {
                        continue;
                    }
                    let kept_output = output_bit(module, first);
                    for old in rest {
                        let old_output = output_bit(module, old);
                        sigmap.add(old_output, kept_output);
                        module.connect(old_output, kept_output);
                        module.remove_cell(old);
                        registers.retain(|name| name != old);
                        removed += 1;
                    }
                    continue 'merge;
                }
            }
            break;
        }
    }
    removed
}

#[cfg(test)]
mod test {
    use rtlbridge_netlist::{CellRepr, ControlBit, FlipFlop, Module, SigBit};

    use super::merge_past_registers;

    fn past(module: &mut Module, data: SigBit, clock: ControlBit) -> (String, SigBit) {
        let output = module.add_auto_wire(1).unwrap_bit();
        let name = module.new_id();
        module.add_cell(name.clone(), CellRepr::Dff(FlipFlop::new(data, output, clock)));
        (name, output)
    }

    fn dff_count(module: &Module) -> usize {
        module.cells().filter(|(_, cell)| matches!(cell.repr, CellRepr::Dff(_))).count()
    }

    #[test]
    fn test_merge_adjacent() {
        let _ = env_logger::try_init();
        let mut module = Module::new("top");
        let clk = module.add_wire("clk", 1);
        let a = module.add_wire("a", 2);
        let clock = ControlBit::Pos(SigBit::Wire(clk, 0));
        let (r0, q0) = past(&mut module, SigBit::Wire(a, 0), clock);
        let (r1, q1) = past(&mut module, SigBit::Wire(a, 1), clock);
        let removed = merge_past_registers(&mut module, &[r0, r1], false);
        assert_eq!(removed, 2);
        assert_eq!(dff_count(&module), 1);
        let (_, merged) = module.cells().find(|(_, cell)| matches!(cell.repr, CellRepr::Dff(_))).unwrap();
        let CellRepr::Dff(flip_flop) = &merged.repr else { unreachable!() };
        assert_eq!(flip_flop.output_len(), 2);
        assert!(module.connections().iter().any(|(lhs, rhs)| lhs[0] == q0 && rhs[0] == flip_flop.output[0]));
        assert!(module.connections().iter().any(|(lhs, rhs)| lhs[0] == q1 && rhs[0] == flip_flop.output[1]));
    }

    #[test]
    fn test_merge_chain_reaches_fixed_point() {
        let _ = env_logger::try_init();
        let mut module = Module::new("top");
        let clk = module.add_wire("clk", 1);
        let a = module.add_wire("a", 2);
        let clock = ControlBit::Pos(SigBit::Wire(clk, 0));
        let mut registers = vec![];
        let mut last = [SigBit::Wire(a, 0), SigBit::Wire(a, 1)];
        for _ in 0..3 {
            let (r0, q0) = past(&mut module, last[0], clock);
            let (r1, q1) = past(&mut module, last[1], clock);
            registers.extend([r0, r1]);
            last = [q0, q1];
        }
        merge_past_registers(&mut module, &registers, true);
        assert_eq!(dff_count(&module), 3);
        let removed = merge_past_registers(&mut module, &registers, true);
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_merge_duplicates() {
        let mut module = Module::new("top");
        let clk = module.add_wire("clk", 1);
        let a = module.add_wire("a", 1);
        let clock = ControlBit::Pos(SigBit::Wire(clk, 0));
        let (r0, _) = past(&mut module, SigBit::Wire(a, 0), clock);
        let (r1, _) = past(&mut module, SigBit::Wire(a, 0), clock);
        assert_eq!(merge_past_registers(&mut module, &[r0.clone(), r1], false), 1);
        assert!(module.cell(&r0).is_some());
        assert_eq!(dff_count(&module), 1);
    }

    #[test]
    fn test_different_clocks_are_kept_apart() {
        let mut module = Module::new("top");
        let clk = module.add_wire("clk", 1);
        let a = module.add_wire("a", 2);
        let (r0, _) = past(&mut module, SigBit::Wire(a, 0), ControlBit::Pos(SigBit::Wire(clk, 0)));
        let (r1, _) = past(&mut module, SigBit::Wire(a, 1), ControlBit::Neg(SigBit::Wire(clk, 0)));
        assert_eq!(merge_past_registers(&mut module, &[r0, r1], false), 0);
        assert_eq!(dff_count(&module), 2);
    }
}
