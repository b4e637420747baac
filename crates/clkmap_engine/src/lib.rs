//! Clock buffer insertion over a hierarchical netlist.
//!
//! Every clock sink of the design ends up driven through a configured buffer
//! cell, and clock nets that enter the top module can additionally get an
//! input pad. Modules are processed bottom-up so that the clock role of a
//! submodule's ports is known before any module instantiating it is visited:
//!
//! 1. blackboxes only publish the port roles declared by their attributes;
//! 2. other modules collect sink and buffered bits from their cells,
//!    push them through inverters, insert cells bit by bit, rebuild
//!    buffered input ports, reconnect the original drivers, and publish
//!    their own port roles.
//!
//! The run-wide [`TagTables`] carry those roles from module to module.

#![warn(missing_docs)]

pub mod codes;
pub mod collect;
pub mod context;
pub mod error;
pub mod insert;
pub mod invert;
pub mod metadata;
pub mod order;
pub mod publish;
pub mod reconnect;
pub mod report;
pub mod rewire;
pub mod tags;

pub use error::ClkbufError;
pub use report::{Insertion, InsertionKind, InsertionReport, ModuleSummary};
pub use tags::{PortBit, TagTables};

use clkmap_common::Interner;
use clkmap_config::{CellSpec, ClkmapConfig, LibraryTags, SecondaryCell, SecondaryConfig};
use clkmap_diagnostics::DiagnosticSink;
use clkmap_netlist::{Design, Module, ModuleId, Selection, SelectionError, SigMap};
use context::PassContext;
use insert::{plan_wires, Inserter};
use reconnect::{reconnect_drivers, SecondaryIndex};

/// What to insert and where.
#[derive(Debug, Clone)]
pub struct ClkbufOptions {
    /// The clock buffer cell.
    pub buffer: Option<CellSpec>,
    /// The input pad cell for top-level clock inputs.
    pub pad: Option<CellSpec>,
    /// Which wires may be buffered.
    pub selection: Selection,
    /// Secondary buffer types whose input follows the source side of an
    /// inserted buffer.
    pub secondary: Vec<SecondaryCell>,
    /// Tags for library cells with no definition in the design.
    pub library: LibraryTags,
}

impl Default for ClkbufOptions {
    fn default() -> Self {
        Self {
            buffer: None,
            pad: None,
            selection: Selection::all(),
            secondary: SecondaryConfig::default().cells,
            library: LibraryTags::default(),
        }
    }
}

impl ClkbufOptions {
    /// Builds options from a loaded configuration.
    pub fn from_config(config: &ClkmapConfig) -> Result<Self, SelectionError> {
        Ok(Self {
            buffer: config.buffer_spec(),
            pad: config.pad_spec(),
            selection: Selection::parse(&config.selection.patterns)?,
            secondary: config.secondary.cells.clone(),
            library: config.library.clone(),
        })
    }

    /// Sets the buffer cell.
    pub fn with_buffer(mut self, buffer: CellSpec) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Sets the pad cell.
    pub fn with_pad(mut self, pad: CellSpec) -> Self {
        self.pad = Some(pad);
        self
    }

    /// Sets the wire selection.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the library cell tags.
    pub fn with_library(mut self, library: LibraryTags) -> Self {
        self.library = library;
        self
    }
}

/// Inserts clock buffers into `design` with fresh tag tables.
pub fn run(
    design: &mut Design,
    interner: &Interner,
    options: &ClkbufOptions,
    sink: &DiagnosticSink,
) -> Result<InsertionReport, ClkbufError> {
    let mut tags = TagTables::new();
    run_with_tags(design, interner, options, &mut tags, sink)
}

/// Inserts clock buffers into `design`, reading and extending `tags`.
///
/// Configuration and hierarchy errors are returned before any module is
/// modified. The roots are the modules with at least one selected wire.
pub fn run_with_tags(
    design: &mut Design,
    interner: &Interner,
    options: &ClkbufOptions,
    tags: &mut TagTables,
    sink: &DiagnosticSink,
) -> Result<InsertionReport, ClkbufError> {
    if options.buffer.is_none() && options.pad.is_none() {
        return Err(ClkbufError::NoBufferConfigured);
    }
    let roots: Vec<ModuleId> = design
        .modules_iter()
        .filter(|(_, module)| options.selection.selects_module(module, interner))
        .map(|(id, _)| id)
        .collect();
    let order = order::module_order(design, interner, &roots)?;

    let ctx = PassContext::new(design, interner, options, sink);
    tags.seed_library(&options.library, interner);
    ctx.seed_inserted_cells(tags);

    let mut report = InsertionReport::default();
    for id in order {
        let summary = process_module(design.module_mut(id), &ctx, tags, &mut report);
        report.modules.push(summary);
    }
    Ok(report)
}

fn process_module(
    module: &mut Module,
    ctx: &PassContext<'_>,
    tags: &mut TagTables,
    report: &mut InsertionReport,
) -> ModuleSummary {
    let name = ctx.name(module.name).to_string();
    if module.is_blackbox(ctx.interner) {
        collect::extract_blackbox(module, ctx.interner, tags);
        return ModuleSummary {
            module: name,
            blackbox: true,
            inserted: 0,
            deferred: 0,
            reconnected: 0,
        };
    }

    let sigmap = SigMap::from_module(module);
    let mut local = collect::collect(module, &sigmap, tags);
    let pairs = invert::inverter_pairs(module, &sigmap, tags);
    invert::propagate(&pairs, &mut local.sinks, &mut local.buffered);

    let plan = plan_wires(module, &sigmap, ctx);
    let secondary = SecondaryIndex::build(module, &sigmap, &plan.eligible, &ctx.secondary);
    let mut outcome = Inserter::new(ctx, &sigmap, &local).run(module, &plan);
    let reconnected = reconnect_drivers(module, &sigmap, &outcome.substitutions, &secondary);
    rewire::swap_identities(module, &outcome.split_ports);
    publish::publish(
        module,
        ctx.interner,
        ctx.selection,
        &sigmap,
        &plan.bypassed_outputs,
        &outcome,
        tags,
    );

    let summary = ModuleSummary {
        module: name,
        blackbox: false,
        inserted: outcome.insertions.len(),
        deferred: outcome.deferred.len(),
        reconnected,
    };
    report.insertions.append(&mut outcome.insertions);
    summary
}
