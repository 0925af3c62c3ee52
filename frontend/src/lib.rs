//! Import of an elaborated design into a [`Design`] of word-level cells, including the
//! compilation of clocked SVA and PSL properties into monitor circuits.

use std::collections::BTreeSet;

use rtlbridge_elab::{Database, NetlistId, NetlistKind};
use rtlbridge_netlist::Design;

mod bridge;
mod clock;
mod coalesce;
mod config;
mod error;
mod extnets;
mod import;
mod lower;
mod preprocess;
mod sva;

pub use bridge::NetMap;
pub use clock::ClockEdge;
pub use coalesce::merge_past_registers;
pub use config::{ImportConfig, Lowering};
pub use error::{Error, Warning};
pub use extnets::ExternalNetResolver;
pub use import::module_name;
pub use preprocess::rewrite_cover_implications;
pub use sva::ast_driver;

use import::NetlistImporter;

/// Outcome of a successful import.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Names of the modules added to the design, in import order.
    pub modules: Vec<String>,
    pub warnings: Vec<Warning>,
}

/// Imports `tops` and every netlist instantiated below them into `design`.
///
/// Each netlist is imported once, however many times it is instantiated.  The database is
/// modified only when resolving external nets or rewriting cover properties.
pub fn import(
    db: &mut Database,
    tops: &[NetlistId],
    config: &ImportConfig,
    design: &mut Design,
) -> Result<ImportReport, Error> {
    if config.resolve_external_nets {
        let mut resolver = ExternalNetResolver::new(config.verbose);
        for &top in tops {
            let count = resolver.run(db, top);
            if count > 0 {
                log::info!("resolved {count} external net references below {}", db.netlist(top).name);
            }
        }
    }

    let mut report = ImportReport::default();
    let mut todo: BTreeSet<NetlistId> = tops.iter().copied().collect();
    let mut done = BTreeSet::new();
    while let Some(netlist) = todo.pop_first() {
        if !done.insert(netlist) {
            continue;
        }
        let name = module_name(db, netlist);
        if design.contains(&name) {
            if matches!(db.netlist(netlist).kind, NetlistKind::Primitive(kind) if kind.is_operator()) {
                continue;
            }
            return Err(Error::DuplicateModule(name));
        }
        if config.sva_enabled() && config.rewrite_cover_implications {
            let count = rewrite_cover_implications(db, netlist);
            if count > 0 && config.verbose {
                log::info!("rewrote {count} cover implications in {name}");
            }
        }
        let imported = NetlistImporter::new(db, netlist, config).run()?;
        report.warnings.extend(imported.warnings);
        report.modules.push(name);
        design.add_module(imported.module);
        todo.extend(imported.children.into_iter().filter(|child| !done.contains(child)));
    }
    Ok(report)
}
