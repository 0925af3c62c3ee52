use std::{error::Error, fs::File, io::Write};

use rtlbridge_elab::{load_json, Database, NetlistId};
use rtlbridge_frontend::{ImportConfig, Lowering};
use rtlbridge_netlist::Design;

fn read_input(name: &str) -> Result<(Database, Vec<NetlistId>), Box<dyn Error>> {
    if name.is_empty() {
        return Err("no input provided".into());
    }
    Ok(load_json(&std::fs::read_to_string(name)?)?)
}

fn select_tops(db: &Database, declared: Vec<NetlistId>, names: &[String]) -> Result<Vec<NetlistId>, Box<dyn Error>> {
    if names.is_empty() {
        return Ok(declared);
    }
    let mut tops = vec![];
    for name in names {
        match db.find_module(name) {
            Some(netlist) => tops.push(netlist),
            None => return Err(format!("top module {name:?} not found").into()),
        }
    }
    Ok(tops)
}

fn write_output(design: &Design, name: &str) -> Result<(), Box<dyn Error>> {
    if name.is_empty() {
        print!("{design}");
        for module in design.modules() {
            println!("# cell counts in {}:", module.name());
            for (class, amount) in module.statistics() {
                println!("# {:>7} {}", amount, class);
            }
        }
    } else {
        write!(&mut File::create(name)?, "{design}")?;
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut version = false;
    let mut config = ImportConfig::default();
    let mut gates = false;
    let mut tops = Vec::<String>::new();
    let mut input = String::new();
    let mut output = String::new();
    {
        let mut parser = argparse::ArgumentParser::new();
        parser.set_description("Import an elaborated design and compile its assertions into circuits");
        parser.refer(&mut version).add_option(&["--version"], argparse::StoreTrue, "Display version");
        parser.refer(&mut gates).add_option(&["--gates"], argparse::StoreTrue, "Lower primitives to single-bit gates");
        parser.refer(&mut config.keep_going).add_option(
            &["-k", "--keep-going"],
            argparse::StoreTrue,
            "Keep unsupported primitives as black boxes instead of failing",
        );
        parser.refer(&mut config.no_sva).add_option(&["--no-sva"], argparse::StoreTrue, "Ignore assertions");
        parser.refer(&mut config.no_preprocess).add_option(
            &["--no-preprocess"],
            argparse::StoreTrue,
            "Skip property preprocessing (implies --no-sva)",
        );
        parser.refer(&mut config.names).add_option(&["-n", "--names"], argparse::StoreTrue, "Keep all names");
        parser.refer(&mut config.verbose).add_option(&["-v", "--verbose"], argparse::StoreTrue, "Trace the import");
        parser.refer(&mut config.resolve_external_nets).add_option(
            &["--extnets"],
            argparse::StoreTrue,
            "Resolve hierarchical net references through new ports",
        );
        parser.refer(&mut config.rewrite_cover_implications).add_option(
            &["--rewrite-covers"],
            argparse::StoreTrue,
            "Rewrite `a |=> b` into `a ##1 b` in cover properties",
        );
        parser.refer(&mut tops).add_option(&["-t", "--top"], argparse::Collect, "Top module (repeatable)");
        parser.refer(&mut input).add_argument("INPUT", argparse::Store, "Input file");
        parser.refer(&mut output).add_argument("OUTPUT", argparse::Store, "Output file");
        parser.parse_args_or_exit();
    }

    if version {
        println!("rtlbridge git-{}", env!("GIT_HASH"));
        return Ok(());
    }
    if gates {
        config.lowering = Lowering::Gates;
    }

    let (mut db, declared) = read_input(&input)?;
    let tops = select_tops(&db, declared, &tops)?;
    let mut design = Design::new();
    let report = rtlbridge_frontend::import(&mut db, &tops, &config, &mut design)?;
    if !report.warnings.is_empty() {
        log::warn!("imported {} modules with {} warnings", report.modules.len(), report.warnings.len());
    } else {
        log::info!("imported {} modules", report.modules.len());
    }
    write_output(&design, &output)?;
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(error) = run() {
        eprintln!("error: {}", error);
        std::process::exit(1)
    }
}
