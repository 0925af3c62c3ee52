use rtlbridge_elab::{load_json, Database, Direction, PrimitiveKind, Role};
use rtlbridge_frontend::{import, Error, ImportConfig, ImportReport, Lowering};
use rtlbridge_netlist::{CellRepr, Const, Design, Module, ParamValue, SigBit, Simulator, State};

fn import_json(text: &str, config: &ImportConfig) -> Result<(Design, ImportReport), Error> {
    let _ = env_logger::try_init();
    let (mut db, tops) = load_json(text).unwrap();
    let mut design = Design::new();
    let report = import(&mut db, &tops, config, &mut design)?;
    Ok((design, report))
}

fn lowering(lowering: Lowering) -> ImportConfig {
    ImportConfig { lowering, names: true, ..Default::default() }
}

fn count_cells(module: &Module, pred: impl Fn(&CellRepr) -> bool) -> usize {
    module.cells().filter(|(_, cell)| pred(&cell.repr)).count()
}

const FULL_ADDER: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "a", "direction": "input"},
                {"name": "b", "direction": "input"},
                {"name": "c", "direction": "input"},
                {"name": "s", "direction": "output"},
                {"name": "co", "direction": "output"}
            ],
            "nets": [{"name": "a"}, {"name": "b"}, {"name": "c"}, {"name": "s"}, {"name": "co"}],
            "instances": [
                {"name": "fa", "kind": "fadd", "pins": {"i1": "a", "i2": "b", "cin": "c", "o": "s", "cout": "co"}}
            ]
        }
    }
}"#;

#[test]
fn test_full_adder_lowerings_agree() {
    for mode in [Lowering::Gates, Lowering::Cells] {
        let (design, _) = import_json(FULL_ADDER, &lowering(mode)).unwrap();
        let top = design.module("top").unwrap();
        if mode == Lowering::Gates {
            assert!(top.cells().all(|(_, cell)| matches!(cell.repr, CellRepr::Gate(_))));
        }
        let mut sim = Simulator::new(top);
        for value in 0..8u32 {
            let (a, b, c) = (value & 1, (value >> 1) & 1, (value >> 2) & 1);
            sim.set("a", a == 1);
            sim.set("b", b == 1);
            sim.set("c", c == 1);
            sim.settle();
            let sum = a + b + c;
            assert_eq!(sim.get_wire("s"), Const::from(sum & 1 == 1), "{mode:?} {value}");
            assert_eq!(sim.get_wire("co"), Const::from(sum >> 1 == 1), "{mode:?} {value}");
        }
    }
}

#[test]
fn test_nand_lowerings_agree() {
    let text = FULL_ADDER.replace(
        r#"{"name": "fa", "kind": "fadd", "pins": {"i1": "a", "i2": "b", "cin": "c", "o": "s", "cout": "co"}}"#,
        r#"{"name": "g", "kind": "nand", "pins": {"i1": "a", "i2": "b", "o": "s"}},
           {"name": "h", "kind": "nor", "pins": {"i1": "a", "i2": "c", "o": "co"}}"#,
    );
    for mode in [Lowering::Gates, Lowering::Cells] {
        let (design, _) = import_json(&text, &lowering(mode)).unwrap();
        let top = design.module("top").unwrap();
        let mut sim = Simulator::new(top);
        for value in 0..8u32 {
            let (a, b, c) = (value & 1 == 1, (value >> 1) & 1 == 1, (value >> 2) & 1 == 1);
            sim.set("a", a);
            sim.set("b", b);
            sim.set("c", c);
            sim.settle();
            assert_eq!(sim.get_wire("s"), Const::from(!(a && b)), "{mode:?} {value}");
            assert_eq!(sim.get_wire("co"), Const::from(!(a || c)), "{mode:?} {value}");
        }
    }
}

const DFFRS: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "r", "direction": "input"},
                {"name": "d", "direction": "input"},
                {"name": "q", "direction": "output"}
            ],
            "nets": [{"name": "clk"}, {"name": "r"}, {"name": "d"}, {"name": "q"}, {"name": "zero"}],
            "instances": [
                {"name": "tie", "kind": "gnd", "pins": {"o": "zero"}},
                {"name": "ff", "kind": "dffrs", "pins": {"set": "zero", "reset": "r", "clk": "clk", "i": "d", "o": "q"}}
            ]
        }
    }
}"#;

#[test]
fn test_dffrs_with_grounded_set() {
    for mode in [Lowering::Gates, Lowering::Cells] {
        let (design, _) = import_json(DFFRS, &lowering(mode)).unwrap();
        let top = design.module("top").unwrap();
        let Some(CellRepr::Dff(flip_flop)) = top.cell("ff").map(|cell| &cell.repr) else {
            panic!("expected a flip-flop with clear")
        };
        assert!(flip_flop.has_clear());
        assert_eq!(flip_flop.clear_value, Const::from(false));

        let mut sim = Simulator::new(top);
        sim.set("clk", false);
        sim.set("r", false);
        sim.set("d", true);
        sim.settle();
        sim.set("clk", true);
        sim.settle();
        assert_eq!(sim.get_wire("q"), Const::from(true));
        sim.set("r", true);
        sim.settle();
        assert_eq!(sim.get_wire("q"), Const::from(false));
    }
}

#[test]
fn test_dffrs_both_grounded() {
    let text = DFFRS.replace(r#""reset": "r""#, r#""reset": "zero""#);
    let (design, _) = import_json(&text, &lowering(Lowering::Cells)).unwrap();
    let top = design.module("top").unwrap();
    let Some(CellRepr::Dff(flip_flop)) = top.cell("ff").map(|cell| &cell.repr) else { panic!() };
    assert!(!flip_flop.has_clear());
}

#[test]
fn test_dffrs_both_driven() {
    let text = DFFRS.replace(r#""set": "zero""#, r#""set": "d""#);
    let (design, _) = import_json(&text, &lowering(Lowering::Gates)).unwrap();
    let top = design.module("top").unwrap();
    assert!(matches!(top.cell("ff").unwrap().repr, CellRepr::Dffsr(_)));
}

const ADDER: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "a", "direction": "input", "left": 3, "right": 0},
                {"name": "b", "direction": "input", "left": 3, "right": 0},
                {"name": "y", "direction": "output", "left": 3, "right": 0},
                {"name": "co", "direction": "output"}
            ],
            "nets": [
                {"name": "a", "left": 3, "right": 0},
                {"name": "b", "left": 3, "right": 0},
                {"name": "y", "left": 3, "right": 0},
                {"name": "co"},
                {"name": "zero", "user_declared": false}
            ],
            "instances": [
                {"name": "tie", "kind": "gnd", "pins": {"o": "zero"}},
                {"name": "add", "kind": "adder", "pins": {
                    "i1": ["a[0]", "a[1]", "a[2]", "a[3]"],
                    "i2": ["b[0]", "b[1]", "b[2]", "b[3]"],
                    "cin": ["zero"],
                    "o": ["y[0]", "y[1]", "y[2]", "y[3]"],
                    "cout": ["co"]
                }}
            ]
        }
    }
}"#;

#[test]
fn test_adder_cell() {
    let (design, report) = import_json(ADDER, &lowering(Lowering::Cells)).unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(report.modules, vec!["top"]);
    let top = design.module("top").unwrap();
    assert_eq!(count_cells(top, |repr| matches!(repr, CellRepr::Binary(_))), 1);
    let mut sim = Simulator::new(top);
    for (a, b) in [(5, 6), (12, 7), (15, 15)] {
        sim.set("a", Const::from_uint(a, 4));
        sim.set("b", Const::from_uint(b, 4));
        sim.settle();
        assert_eq!(sim.get_wire("y").as_uint(), Some((a + b) & 15));
        assert_eq!(sim.get_wire("co"), Const::from((a + b) > 15));
    }
}

#[test]
fn test_operator_in_gates_mode_is_black_box() {
    let text = ADDER.replace(
        r#"{"name": "tie", "kind": "gnd", "pins": {"o": "zero"}},"#,
        r#"{"name": "tie", "kind": "gnd", "pins": {"o": "zero"}},
           {"name": "add2", "kind": "adder", "pins": {
               "i1": ["b[0]", "b[1]", "b[2]", "b[3]"],
               "i2": ["a[0]", "a[1]", "a[2]", "a[3]"],
               "cin": ["zero"],
               "o": [null, null, null, null],
               "cout": [null]
           }},"#,
    );
    let (design, _) = import_json(&text, &lowering(Lowering::Gates)).unwrap();
    let operator = "$operator$adder_i14_i24_o4_cin1_cout1";
    assert_eq!(design.len(), 2);
    let definition = design.module(operator).unwrap();
    assert!(definition.get_bool_attribute("blackbox"));
    let top = design.module("top").unwrap();
    let instances: Vec<_> = top
        .cells()
        .filter_map(|(_, cell)| match &cell.repr {
            CellRepr::Instance(instance) => Some(instance),
            _ => None,
        })
        .collect();
    assert_eq!(instances.len(), 2);
    assert!(instances.iter().all(|instance| instance.module == operator));
    assert_eq!(instances[0].connection("i1").map(|sig| sig.len()), Some(4));
}

#[test]
fn test_decoder() {
    let text = r#"{
        "netlists": {
            "top": {
                "ports": [
                    {"name": "s", "direction": "input", "left": 1, "right": 0},
                    {"name": "y", "direction": "output", "left": 3, "right": 0}
                ],
                "nets": [{"name": "s", "left": 1, "right": 0}, {"name": "y", "left": 3, "right": 0}],
                "instances": [
                    {"name": "dec", "kind": "decoder", "pins": {
                        "i": ["s[0]", "s[1]"],
                        "o": ["y[0]", "y[1]", "y[2]", "y[3]"]
                    }}
                ]
            }
        }
    }"#;
    let (design, _) = import_json(text, &lowering(Lowering::Cells)).unwrap();
    let top = design.module("top").unwrap();
    let mut sim = Simulator::new(top);
    for select in 0..4 {
        sim.set("s", Const::from_uint(select, 2));
        sim.settle();
        assert_eq!(sim.get_wire("y").as_uint(), Some(1 << select));
    }
}

const HIERARCHY: &str = r#"{
    "top": ["top"],
    "netlists": {
        "leaf": {
            "ports": [{"name": "a", "direction": "input"}, {"name": "y", "direction": "output"}],
            "nets": [{"name": "a"}, {"name": "y"}],
            "instances": [{"name": "inv", "kind": "inv", "pins": {"i": "a", "o": "y"}}]
        },
        "top": {
            "ports": [{"name": "x", "direction": "input", "left": 2, "right": 0}],
            "nets": [{"name": "x", "left": 2, "right": 0}, {"name": "z", "left": 2, "right": 0}],
            "instances": [
                {"name": "u0", "module": "leaf", "connections": {"a": "x[0]", "y": "z[0]"}},
                {"name": "u1", "module": "leaf", "connections": {"a": "x[1]", "y": "z[1]"}},
                {"name": "u2", "module": "leaf", "connections": {"a": "x[2]"}}
            ]
        }
    }
}"#;

#[test]
fn test_hierarchy_is_imported_once() {
    let (design, report) = import_json(HIERARCHY, &ImportConfig::default()).unwrap();
    assert_eq!(report.modules, vec!["top", "leaf"]);
    let top = design.module("top").unwrap();
    let leaf = design.module("leaf").unwrap();
    assert_eq!(leaf.ports().len(), 2);
    assert_eq!(count_cells(top, |repr| matches!(repr, CellRepr::Instance(instance) if instance.module == "leaf")), 3);
    let CellRepr::Instance(u2) = &top.cell("u2").unwrap().repr else { panic!() };
    assert!(u2.connection("y").is_none());
    assert_eq!(u2.connection("a").map(|sig| sig.len()), Some(1));
    let z = top.find_wire("z").unwrap();
    assert_eq!(top.wire(z).width, 3);
}

#[test]
fn test_duplicate_module() {
    let _ = env_logger::try_init();
    let (mut db, tops) = load_json(HIERARCHY).unwrap();
    let mut design = Design::new();
    design.add_module(Module::new("leaf"));
    assert_eq!(
        import(&mut db, &tops, &ImportConfig::default(), &mut design).unwrap_err(),
        Error::DuplicateModule("leaf".into())
    );
}

#[test]
fn test_net_metadata() {
    let text = r#"{
        "netlists": {
            "top": {
                "nets": [
                    {"name": "r", "left": 1, "right": 0, "init": "10", "src": "top.v:3"},
                    {"name": "s", "init": "1"},
                    {"name": "k", "left": 0, "right": 1, "anyconst": true},
                    {"name": "n", "anyseq": true},
                    {"name": "t", "user_declared": false, "attributes": {"keep": "1", " internal": "1"}}
                ]
            }
        }
    }"#;
    let (design, _) = import_json(text, &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    let r = top.wire(top.find_wire("r").unwrap());
    assert_eq!(r.attributes["init"].as_const().and_then(Const::as_uint), Some(2));
    assert_eq!(r.attributes["src"].as_str(), Some("top.v:3"));
    let s = top.wire(top.find_wire("s").unwrap());
    assert_eq!(s.attributes["init"].as_const(), Some(&Const::from(State::One)));
    assert!(top.find_wire("t").is_none());
    let (_, t) = top.wires().find(|(_, wire)| wire.attributes.contains_key("keep")).unwrap();
    assert_eq!(t.attributes[" internal"].as_str(), Some("1"));
    let any_values: Vec<usize> = top
        .cells()
        .filter_map(|(_, cell)| match &cell.repr {
            CellRepr::AnyValue(any) => Some(any.output.len()),
            _ => None,
        })
        .collect();
    assert_eq!(any_values.len(), 2);
    assert!(any_values.contains(&2) && any_values.contains(&1));
}

const MEMORY: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "en", "direction": "input"},
                {"name": "addr", "direction": "input", "left": 1, "right": 0},
                {"name": "wdata", "direction": "input", "left": 3, "right": 0},
                {"name": "rdata", "direction": "output", "left": 3, "right": 0}
            ],
            "nets": [
                {"name": "clk"},
                {"name": "en"},
                {"name": "addr", "left": 1, "right": 0},
                {"name": "wdata", "left": 3, "right": 0},
                {"name": "rdata", "left": 3, "right": 0},
                {"name": "mem", "ram": {"size": 16, "init": "16'b0000000100100011", "ascending": false}}
            ],
            "instances": [
                {"name": "rd", "kind": "read_port", "pins": {
                    "i": ["mem"],
                    "i1": ["addr[0]", "addr[1]"],
                    "o": ["rdata[0]", "rdata[1]", "rdata[2]", "rdata[3]"]
                }},
                {"name": "wr", "kind": "clocked_write_port", "pins": {
                    "o": ["mem"],
                    "i1": ["addr[0]", "addr[1]"],
                    "i2": ["wdata[0]", "wdata[1]", "wdata[2]", "wdata[3]"],
                    "c": ["en"],
                    "clk": ["clk"]
                }}
            ]
        }
    }
}"#;

#[test]
fn test_memory() {
    let (design, _) = import_json(MEMORY, &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    let memory = top.memory("mem").unwrap();
    assert_eq!((memory.width, memory.size), (4, 4));
    assert_eq!(count_cells(top, |repr| matches!(repr, CellRepr::MemInit(_))), 4);

    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("en", false);
    sim.set("wdata", Const::from_uint(9, 4));
    for (address, value) in [(0, 3), (1, 2), (2, 1)] {
        sim.set("addr", Const::from_uint(address, 2));
        sim.settle();
        assert_eq!(sim.get_wire("rdata").as_uint(), Some(value));
    }
    sim.set("en", true);
    sim.settle();
    sim.set("clk", true);
    sim.settle();
    assert_eq!(sim.get_wire("rdata").as_uint(), Some(9));
}

#[test]
fn test_asymmetric_memory() {
    let text = MEMORY
        .replace(r#""i2": ["wdata[0]", "wdata[1]", "wdata[2]", "wdata[3]"]"#, r#""i2": ["wdata[0]", "wdata[1]"]"#);
    let error = import_json(&text, &ImportConfig::default()).unwrap_err();
    assert_eq!(
        error,
        Error::AsymmetricMemory { netlist: "top".into(), memory: "mem".into(), instance: "rd".into() }
    );
}

#[test]
fn test_unsupported_memory_connection() {
    let text = MEMORY.replace(
        r#"{"name": "rd", "kind": "read_port""#,
        r#"{"name": "b", "kind": "buf", "pins": {"i": "mem", "o": "en"}},
           {"name": "rd", "kind": "read_port""#,
    );
    let error = import_json(&text, &ImportConfig::default()).unwrap_err();
    assert!(matches!(error, Error::UnsupportedRamConnection { instance, .. } if instance == "b"));
}

#[test]
fn test_unsupported_primitive() {
    let text = r#"{
        "netlists": {
            "top": {
                "nets": [{"name": "p"}],
                "instances": [{"name": "pu", "kind": "pullup", "user_declared": true, "pins": {"o": "p"}}]
            }
        }
    }"#;
    let error = import_json(text, &ImportConfig::default()).unwrap_err();
    assert!(matches!(error, Error::Unsupported { instance, .. } if instance == "pu"));

    let config = ImportConfig { keep_going: true, ..Default::default() };
    let (design, report) = import_json(text, &config).unwrap();
    assert_eq!(report.warnings.len(), 1);
    let top = design.module("top").unwrap();
    let cell = top.cell("pu").unwrap();
    assert!(matches!(&cell.repr, CellRepr::Instance(instance) if instance.module == "pullup"));
    assert_eq!(cell.attributes.get("keep"), Some(&ParamValue::from(true)));
    assert!(design.module("pullup").unwrap().get_bool_attribute("blackbox"));
}

fn hierarchical_reference(instances: usize) -> (Database, rtlbridge_elab::NetlistId) {
    let mut db = Database::new();
    let leaf = db.add_module("leaf");
    let a = db.add_port(leaf, "a", Direction::Input);
    let a_net = db.add_net(leaf, "a");
    db.connect_port_net(a, a_net);
    let secret = db.add_net(leaf, "secret");
    let inv = db.add_primitive(leaf, "inv", PrimitiveKind::Inv);
    db.connect_pin(inv, Role::Input, a_net);
    db.connect_pin(inv, Role::Output, secret);

    let top = db.add_module("top");
    let x = db.add_port(top, "x", Direction::Input);
    let x_net = db.add_net(top, "x");
    db.connect_port_net(x, x_net);
    let y = db.add_port(top, "y", Direction::Output);
    let y_net = db.add_net(top, "y");
    db.connect_port_net(y, y_net);
    for index in 0..instances {
        let u = db.add_instance(top, format!("u{index}"), leaf);
        db.connect(u, a, x_net);
    }
    let buf = db.add_primitive(top, "peek", PrimitiveKind::Buf);
    db.connect_pin(buf, Role::Input, secret);
    db.connect_pin(buf, Role::Output, y_net);
    (db, top)
}

#[test]
fn test_external_reference() {
    let _ = env_logger::try_init();
    let (mut db, top) = hierarchical_reference(1);
    let error = import(&mut db, &[top], &ImportConfig::default(), &mut Design::new()).unwrap_err();
    assert_eq!(
        error,
        Error::ExternalReference { netlist: "top".into(), net: "secret".into(), owner: "top.u0".into() }
    );

    let (mut db, top) = hierarchical_reference(1);
    let config = ImportConfig { resolve_external_nets: true, ..Default::default() };
    let mut design = Design::new();
    import(&mut db, &[top], &config, &mut design).unwrap();
    let leaf = design.module("leaf").unwrap();
    assert_eq!(leaf.ports().len(), 2);
    let top = design.module("top").unwrap();
    let CellRepr::Instance(u0) = &top.cell("u0").unwrap().repr else { panic!() };
    assert!(u0.connection("___extnets_0").is_some());

    let mut sim = Simulator::new(top);
    sim.set("x", true);
    sim.settle();
    assert_eq!(sim.get_wire("y"), Const::undef(1));
}

#[test]
fn test_external_reference_into_shared_netlist() {
    let _ = env_logger::try_init();
    let (mut db, top) = hierarchical_reference(2);
    let config = ImportConfig { resolve_external_nets: true, ..Default::default() };
    let error = import(&mut db, &[top], &config, &mut Design::new()).unwrap_err();
    assert!(matches!(error, Error::ExternalReference { net, owner, .. } if net == "secret" && owner == "leaf"));
}

#[test]
fn test_immediate_checks_and_constants() {
    let text = r#"{
        "netlists": {
            "top": {
                "ports": [
                    {"name": "a", "direction": "input"},
                    {"name": "one", "direction": "output"},
                    {"name": "zero", "direction": "output"},
                    {"name": "undef", "direction": "output"},
                    {"name": "float", "direction": "output"}
                ],
                "nets": [{"name": "a"}, {"name": "one"}, {"name": "zero"}, {"name": "undef"}, {"name": "float"}],
                "instances": [
                    {"name": "p", "kind": "pwr", "pins": {"o": "one"}},
                    {"name": "g", "kind": "gnd", "pins": {"o": "zero"}},
                    {"name": "x", "kind": "x", "pins": {"o": "undef"}},
                    {"name": "z", "kind": "z", "pins": {"o": "float"}},
                    {"name": "ia", "kind": "sva_immediate_assert", "user_declared": true, "pins": {"i": "a"}},
                    {"name": "im", "kind": "sva_immediate_assume", "user_declared": true, "pins": {"i": "a"}},
                    {"name": "ic", "kind": "sva_immediate_cover", "user_declared": true, "pins": {"i": "a"}}
                ]
            }
        }
    }"#;
    let (design, report) = import_json(text, &ImportConfig::default()).unwrap();
    assert!(report.warnings.is_empty());
    let top = design.module("top").unwrap();
    assert_eq!(top.cells().count(), 3);
    for name in ["ia", "im", "ic"] {
        let CellRepr::Check(check) = &top.cell(name).unwrap().repr else { panic!("{name} is not a check") };
        assert_eq!(check.enable, SigBit::ONE);
    }

    let mut sim = Simulator::new(top);
    sim.set("a", false);
    sim.settle();
    assert_eq!(sim.get_wire("one"), Const::from(true));
    assert_eq!(sim.get_wire("zero"), Const::from(false));
    assert_eq!(sim.get_wire("undef"), Const::undef(1));
    assert_eq!(sim.get_wire("float"), Const::hiz(1));
    assert_eq!(sim.failed_checks(), vec!["ia", "im"]);
    assert!(sim.hit_covers().is_empty());

    sim.set("a", true);
    sim.settle();
    assert!(sim.failed_checks().is_empty());
    assert_eq!(sim.hit_covers(), vec!["ic"]);
}
