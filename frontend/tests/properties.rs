use rtlbridge_elab::load_json;
use rtlbridge_frontend::{import, Error, ImportConfig, ImportReport};
use rtlbridge_netlist::{CellRepr, Const, Design, Module, Simulator};

fn import_json(text: &str, config: &ImportConfig) -> Result<(Design, ImportReport), Error> {
    let _ = env_logger::try_init();
    let (mut db, tops) = load_json(text).unwrap();
    let mut design = Design::new();
    let report = import(&mut db, &tops, config, &mut design)?;
    Ok((design, report))
}

fn dff_widths(module: &Module) -> Vec<usize> {
    let mut widths: Vec<usize> = module
        .cells()
        .filter_map(|(_, cell)| match &cell.repr {
            CellRepr::Dff(flip_flop) => Some(flip_flop.output_len()),
            _ => None,
        })
        .collect();
    widths.sort();
    widths
}

/// `assert property (@(posedge clk) a |=> b)`, with the body replaceable.
const IMPLICATION: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "a", "direction": "input"},
                {"name": "b", "direction": "input"},
                {"name": "rst", "direction": "input"}
            ],
            "nets": [
                {"name": "clk"}, {"name": "a"}, {"name": "b"}, {"name": "rst"},
                {"name": "edge"}, {"name": "body"}, {"name": "prop"}
            ],
            "instances": [
                {"name": "edge", "kind": "sva_posedge", "pins": {"i": "clk", "o": "edge"}},
                BODY,
                {"name": "at", "kind": "sva_at", "pins": {"i1": "edge", "i2": "body", "o": "prop"}},
                {"name": "check", "kind": "sva_assert", "user_declared": true, "pins": {"i": "prop"}}
            ]
        }
    }
}"#;

fn property(body: &str) -> String {
    IMPLICATION.replace("BODY", body)
}

const NON_OVERLAPPED: &str =
    r#"{"name": "imp", "kind": "sva_non_overlapped_implication", "pins": {"i1": "a", "i2": "b", "o": "body"}}"#;

fn clock(sim: &mut Simulator, a: bool, b: bool) {
    sim.set("a", a);
    sim.set("b", b);
    sim.set("clk", false);
    sim.settle();
    sim.set("clk", true);
    sim.settle();
}

#[test]
fn test_non_overlapped_implication() {
    let (design, report) = import_json(&property(NON_OVERLAPPED), &ImportConfig::default()).unwrap();
    assert!(report.warnings.is_empty());
    let top = design.module("top").unwrap();
    assert!(matches!(top.cell("check").unwrap().repr, CellRepr::Check(_)));
    assert_eq!(dff_widths(top), vec![1, 1, 1, 1]);

    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("rst", false);
    clock(&mut sim, true, false);
    clock(&mut sim, false, true);
    assert!(sim.failed_checks().is_empty());
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());

    clock(&mut sim, true, false);
    clock(&mut sim, false, false);
    assert_eq!(sim.failed_checks(), vec!["check"]);
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());
}

#[test]
fn test_disable_iff() {
    let body = r#"{"name": "imp", "kind": "sva_non_overlapped_implication", "pins": {"i1": "a", "i2": "b", "o": "inner"}},
        {"name": "dis", "kind": "sva_disable_iff", "pins": {"i1": "rst", "i2": "inner", "o": "body"}}"#;
    let text = property(body).replace(r#"{"name": "prop"}"#, r#"{"name": "prop"}, {"name": "inner"}"#);
    let (design, _) = import_json(&text, &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("rst", false);
    clock(&mut sim, true, false);
    sim.set("rst", true);
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());
    sim.set("rst", false);
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());
}

#[test]
fn test_fixed_delay() {
    let body = r#"{"name": "seq", "kind": "sva_seq_concat", "attributes": {"sva:low": "2", "sva:high": "2"},
        "pins": {"i1": "a", "i2": "b", "o": "body"}}"#;
    let (design, _) = import_json(&property(body), &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    assert_eq!(dff_widths(top).len(), 6);
}

#[test]
fn test_consecutive_repeat() {
    let body = r#"{"name": "rep", "kind": "sva_consecutive_repeat", "attributes": {"sva:low": "3", "sva:high": "3"},
        "pins": {"i": "a", "o": "body"}}"#;
    let (design, _) = import_json(&property(body), &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    assert_eq!(dff_widths(top).len(), 6);
}

#[test]
fn test_delay_range() {
    let body = r#"{"name": "seq", "kind": "sva_seq_concat", "attributes": {"sva:low": "1", "sva:high": "3"},
        "pins": {"i1": "a", "i2": "b", "o": "body"}}"#;
    let error = import_json(&property(body), &ImportConfig::default()).unwrap_err();
    assert_eq!(
        error,
        Error::UnsupportedRange { netlist: "top".into(), instance: "seq".into(), low: "1".into(), high: "3".into() }
    );
    let body = body.replace(r#""sva:high": "3""#, r#""sva:high": "$""#);
    assert!(matches!(
        import_json(&property(&body), &ImportConfig::default()),
        Err(Error::UnsupportedRange { .. })
    ));
}

#[test]
fn test_unsupported_temporal_operator() {
    let body = r#"{"name": "ev", "kind": "sva_eventually", "pins": {"i": "a", "o": "body"}}"#;
    let error = import_json(&property(body), &ImportConfig::default()).unwrap_err();
    assert!(matches!(error, Error::Unsupported { instance, .. } if instance == "ev"));

    let config = ImportConfig { keep_going: true, ..Default::default() };
    let (design, report) = import_json(&property(body), &config).unwrap();
    assert!(report.warnings.iter().any(|warning| warning.message.contains("sva_eventually")));
    let top = design.module("top").unwrap();
    assert_eq!(top.cells().filter(|(_, cell)| matches!(cell.repr, CellRepr::Check(_))).count(), 1);
    assert!(matches!(&top.cell("check").unwrap().repr, CellRepr::Instance(instance) if instance.module == "sva_assert"));
}

#[test]
fn test_no_sva() {
    for config in [
        ImportConfig { no_sva: true, ..Default::default() },
        ImportConfig { no_preprocess: true, ..Default::default() },
    ] {
        let (design, _) = import_json(&property(NON_OVERLAPPED), &config).unwrap();
        let top = design.module("top").unwrap();
        assert!(top.cell("check").is_none());
        assert_eq!(top.cells().count(), 0);
    }
}

#[test]
fn test_inverted_clock() {
    let text = property(NON_OVERLAPPED)
        .replace(
            r#"{"name": "edge", "kind": "sva_posedge", "pins": {"i": "clk", "o": "edge"}}"#,
            r#"{"name": "inv", "kind": "inv", "pins": {"i": "clk", "o": "clk_n"}},
               {"name": "edge", "kind": "sva_posedge", "pins": {"i": "clk_n", "o": "edge"}}"#,
        )
        .replace(r#"{"name": "edge"}"#, r#"{"name": "edge"}, {"name": "clk_n"}"#);
    let (design, _) = import_json(&text, &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    for (_, cell) in top.cells() {
        if let CellRepr::Dff(flip_flop) = &cell.repr {
            assert!(!flip_flop.clock.is_positive());
        }
    }
}

#[test]
fn test_cover_rewrite() {
    let text = property(NON_OVERLAPPED).replace("sva_assert", "sva_cover");
    let config = ImportConfig { rewrite_cover_implications: true, ..Default::default() };
    let (design, _) = import_json(&text, &config).unwrap();
    let top = design.module("top").unwrap();
    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("rst", false);
    clock(&mut sim, false, false);
    clock(&mut sim, false, false);
    clock(&mut sim, false, false);
    assert!(sim.hit_covers().is_empty());
    clock(&mut sim, true, false);
    clock(&mut sim, false, true);
    assert_eq!(sim.hit_covers(), vec!["check"]);
    clock(&mut sim, false, false);
    assert!(sim.hit_covers().is_empty());
}

const PAST: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "a", "direction": "input", "left": 1, "right": 0}
            ],
            "nets": [
                {"name": "clk"}, {"name": "a", "left": 1, "right": 0}, {"name": "edge"},
                {"name": "p", "left": 1, "right": 0}, {"name": "pp", "left": 1, "right": 0}
            ],
            "instances": [
                {"name": "edge", "kind": "sva_posedge", "pins": {"i": "clk", "o": "edge"}},
                {"name": "past0", "kind": "sva_past", "pins": {"i1": "a[0]", "i2": "edge", "o": "p[0]"}},
                {"name": "past1", "kind": "sva_past", "pins": {"i1": "a[1]", "i2": "edge", "o": "p[1]"}},
                {"name": "past2", "kind": "sva_past", "pins": {"i1": "p[0]", "i2": "edge", "o": "pp[0]"}},
                {"name": "past3", "kind": "sva_past", "pins": {"i1": "p[1]", "i2": "edge", "o": "pp[1]"}}
            ]
        }
    }
}"#;

#[test]
fn test_past_registers_are_merged() {
    let (design, _) = import_json(PAST, &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    assert_eq!(dff_widths(top), vec![2, 2]);

    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("a", Const::from_uint(2, 2));
    sim.settle();
    for _ in 0..2 {
        sim.set("clk", true);
        sim.settle();
        sim.set("clk", false);
        sim.settle();
    }
    assert_eq!(sim.get_wire("pp").as_uint(), Some(2));
}

const NESTED: &str = r#"{
    "top": ["top"],
    "netlists": {
        "leaf": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "sig", "direction": "input"},
                {"name": "sig2", "direction": "input"}
            ],
            "nets": [{"name": "clk"}, {"name": "sig"}, {"name": "sig2"}, {"name": "edge"}, {"name": "body"}, {"name": "prop"}],
            "instances": [
                {"name": "edge", "kind": "sva_posedge", "pins": {"i": "clk", "o": "edge"}},
                {"name": "imp", "kind": "sva_non_overlapped_implication", "pins": {"i1": "sig", "i2": "sig2", "o": "body"}},
                {"name": "at", "kind": "sva_at", "pins": {"i1": "edge", "i2": "body", "o": "prop"}},
                {"name": "check", "kind": "sva_assert", "user_declared": true, "pins": {"i": "prop"}}
            ]
        },
        "mid": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "sig", "direction": "input"},
                {"name": "sig2", "direction": "input"}
            ],
            "nets": [{"name": "clk"}, {"name": "sig"}, {"name": "sig2"}],
            "instances": [
                {"name": "u", "module": "leaf", "connections": {"clk": "clk", "sig": "sig", "sig2": "sig2"}}
            ]
        },
        "top": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "sig", "direction": "input"},
                {"name": "sig2", "direction": "input"}
            ],
            "nets": [{"name": "clk"}, {"name": "sig"}, {"name": "sig2"}],
            "instances": [
                {"name": "m", "module": "mid", "connections": {"clk": "clk", "sig": "sig", "sig2": "sig2"}}
            ]
        }
    }
}"#;

#[test]
fn test_nested_property() {
    let (design, report) = import_json(NESTED, &ImportConfig::default()).unwrap();
    let mut modules = report.modules.clone();
    modules.sort();
    assert_eq!(modules, vec!["leaf", "mid", "top"]);
    let leaf = design.module("leaf").unwrap();
    assert_eq!(dff_widths(leaf), vec![1, 1, 1, 1]);
    assert_eq!(leaf.cells().filter(|(_, cell)| matches!(cell.repr, CellRepr::Check(_))).count(), 1);

    let mut sim = Simulator::new(leaf);
    let step = |sim: &mut Simulator, sig: bool, sig2: bool| {
        sim.set("sig", sig);
        sim.set("sig2", sig2);
        sim.set("clk", false);
        sim.settle();
        sim.set("clk", true);
        sim.settle();
    };
    step(&mut sim, true, false);
    step(&mut sim, false, true);
    assert!(sim.failed_checks().is_empty());
    step(&mut sim, true, false);
    step(&mut sim, false, false);
    assert_eq!(sim.failed_checks(), vec!["check"]);
}

#[test]
fn test_cover_rewrite_keeps_shared_assert() {
    let text = property(NON_OVERLAPPED).replace(
        r#"{"name": "check", "kind": "sva_assert", "user_declared": true, "pins": {"i": "prop"}}"#,
        r#"{"name": "check", "kind": "sva_assert", "user_declared": true, "pins": {"i": "prop"}},
           {"name": "cover", "kind": "sva_cover", "user_declared": true, "pins": {"i": "prop"}}"#,
    );
    for rewrite_cover_implications in [false, true] {
        let config = ImportConfig { rewrite_cover_implications, ..Default::default() };
        let (design, _) = import_json(&text, &config).unwrap();
        let top = design.module("top").unwrap();
        let mut sim = Simulator::new(top);
        sim.set("clk", false);
        sim.set("rst", false);
        for _ in 0..4 {
            clock(&mut sim, false, false);
            assert!(sim.failed_checks().is_empty());
        }
        clock(&mut sim, true, false);
        clock(&mut sim, false, false);
        assert_eq!(sim.failed_checks(), vec!["check"]);
    }
}

/// `assert always (a -> next b) abort rst @ rose(clk)`, plus `pa = prev(a)` on the same clock.
const PSL: &str = r#"{
    "netlists": {
        "top": {
            "ports": [
                {"name": "clk", "direction": "input"},
                {"name": "a", "direction": "input"},
                {"name": "b", "direction": "input"},
                {"name": "rst", "direction": "input"},
                {"name": "pa", "direction": "output"}
            ],
            "nets": [
                {"name": "clk"}, {"name": "a"}, {"name": "b"}, {"name": "rst"}, {"name": "pa"},
                {"name": "zero"}, {"name": "past"}, {"name": "past_n"}, {"name": "edge"},
                {"name": "imp"}, {"name": "always"}, {"name": "abort"}, {"name": "prop"}
            ],
            "instances": [
                {"name": "tie", "kind": "gnd", "pins": {"o": "zero"}},
                {"name": "prev", "kind": "pslprev", "pins": {"i1": ["clk"], "clk": ["zero"], "o": ["past"]}},
                {"name": "inv", "kind": "inv", "pins": {"i": "past", "o": "past_n"}},
                {"name": "rose", "kind": "and", "pins": {"i1": "clk", "i2": "past_n", "o": "edge"}},
                {"name": "imp", "kind": "psl_suffix_impl", "pins": {"i1": "a", "i2": "b", "o": "imp"}},
                {"name": "always", "kind": "psl_always", "pins": {"i": "imp", "o": "always"}},
                {"name": "abort", "kind": "psl_abort", "pins": {"i1": "always", "i2": "rst", "o": "abort"}},
                {"name": "at", "kind": "psl_at", "pins": {"i1": "abort", "i2": "edge", "o": "prop"}},
                {"name": "check", "kind": "psl_assert", "user_declared": true, "pins": {"i": "prop"}},
                {"name": "prev_a", "kind": "pslprev", "pins": {"i1": ["a"], "clk": ["edge"], "o": ["pa"]}}
            ]
        }
    }
}"#;

#[test]
fn test_psl_suffix_implication() {
    let (design, report) = import_json(PSL, &ImportConfig::default()).unwrap();
    assert!(report.warnings.is_empty());
    let top = design.module("top").unwrap();
    assert!(matches!(top.cell("check").unwrap().repr, CellRepr::Check(_)));
    // four for the property, one for `prev(a)`; the constant-clocked `prev(clk)` is dropped
    assert_eq!(dff_widths(top), vec![1, 1, 1, 1, 1]);
    for (_, cell) in top.cells() {
        if let CellRepr::Dff(flip_flop) = &cell.repr {
            assert!(flip_flop.clock.is_positive());
        }
    }

    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("rst", false);
    clock(&mut sim, true, false);
    assert_eq!(sim.get_wire("pa"), Const::from(true));
    clock(&mut sim, false, true);
    assert_eq!(sim.get_wire("pa"), Const::from(false));
    assert!(sim.failed_checks().is_empty());
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());

    clock(&mut sim, true, false);
    clock(&mut sim, false, false);
    assert_eq!(sim.failed_checks(), vec!["check"]);

    clock(&mut sim, true, false);
    sim.set("rst", true);
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());
}

#[test]
fn test_psl_overlapped_implication() {
    let text = PSL.replace("psl_suffix_impl", "psl_impl");
    let (design, _) = import_json(&text, &ImportConfig::default()).unwrap();
    let top = design.module("top").unwrap();
    assert_eq!(dff_widths(top), vec![1, 1, 1]);

    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("rst", false);
    clock(&mut sim, true, true);
    assert!(sim.failed_checks().is_empty());
    clock(&mut sim, true, false);
    assert_eq!(sim.failed_checks(), vec!["check"]);
    clock(&mut sim, false, false);
    assert!(sim.failed_checks().is_empty());
}

#[test]
fn test_psl_prev_with_constant_clock_is_dropped() {
    let text = PSL.replace(r#""clk": ["edge"], "o": ["pa"]"#, r#""clk": ["zero"], "o": ["pa"]"#);
    let (design, report) = import_json(&text, &ImportConfig::default()).unwrap();
    assert!(report.warnings.is_empty());
    let top = design.module("top").unwrap();
    assert_eq!(dff_widths(top), vec![1, 1, 1, 1]);

    let mut sim = Simulator::new(top);
    sim.set("clk", false);
    sim.set("rst", false);
    clock(&mut sim, true, false);
    assert_eq!(sim.get_wire("pa"), Const::undef(1));
}
