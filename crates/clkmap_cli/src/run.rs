//! The `clkmap` pipeline.
//!
//! 1. Load `clkmap.toml` (if given) and overlay the command-line flags
//! 2. Import the JSON netlist
//! 3. Mark the requested top module
//! 4. Run the insertion pass
//! 5. Write the modified netlist
//! 6. Render diagnostics and the report

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use clkmap_common::Interner;
use clkmap_config::{CellSection, ClkmapConfig, ConfigOverrides};
use clkmap_diagnostics::{Diagnostic, DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer};
use clkmap_engine::{ClkbufOptions, InsertionKind, InsertionReport};
use clkmap_netlist::Design;

use crate::{ClkmapArgs, GlobalArgs, ReportFormat};

/// Runs one insertion from `args.input` to `args.output`.
///
/// Returns exit code 0 on success and 1 when the pass rejects the design.
pub fn run(args: &ClkmapArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let config = match &global.config {
        Some(path) => clkmap_config::load_config(Path::new(path))?,
        None => ClkmapConfig::default(),
    };
    let config = config.merge(overrides(args))?;
    let options = ClkbufOptions::from_config(&config)?;

    let interner = Interner::new();
    let input = File::open(&args.input)
        .map_err(|e| format!("cannot open {}: {e}", args.input.display()))?;
    let mut design = clkmap_json::import(BufReader::new(input), &interner)?;
    if let Some(top) = &config.top {
        mark_top(&mut design, &interner, top)?;
    }

    let sink = DiagnosticSink::new();
    let report = match clkmap_engine::run(&mut design, &interner, &options, &sink) {
        Ok(report) => report,
        Err(e) => {
            sink.emit(e.diagnostic());
            render(&sink.take_all(), None, args.format, global);
            return Ok(1);
        }
    };

    let output = File::create(&args.output)
        .map_err(|e| format!("cannot create {}: {e}", args.output.display()))?;
    let mut writer = BufWriter::new(output);
    clkmap_json::export(&mut writer, &design, &interner)?;
    writer.flush()?;

    render(&sink.take_all(), Some(&report), args.format, global);
    Ok(0)
}

fn overrides(args: &ClkmapArgs) -> ConfigOverrides {
    let section = |pair: &Option<Vec<String>>| match pair.as_deref() {
        Some([cell, ports]) => Some(CellSection {
            cell: cell.clone(),
            ports: ports.clone(),
        }),
        _ => None,
    };
    ConfigOverrides {
        buffer: section(&args.buf),
        pad: section(&args.inpad),
        selection: args.select.clone(),
        top: args.top.clone(),
    }
}

/// Sets the `top` attribute on the named module.
fn mark_top(design: &mut Design, interner: &Interner, name: &str) -> Result<(), String> {
    let id = interner
        .get(name)
        .and_then(|ident| design.module_by_name(ident))
        .ok_or_else(|| format!("top module '{name}' not found in the design"))?;
    design.module_mut(id).set_top(interner);
    Ok(())
}

fn render(
    diagnostics: &[Diagnostic],
    report: Option<&InsertionReport>,
    format: ReportFormat,
    global: &GlobalArgs,
) {
    let shown: Vec<&Diagnostic> = diagnostics
        .iter()
        .filter(|d| !global.quiet || d.severity != Severity::Note)
        .collect();

    match format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color);
            for diag in &shown {
                eprint!("{}", renderer.render(diag));
            }
            let Some(report) = report else {
                return;
            };
            if global.verbose {
                for module in &report.modules {
                    let kind = if module.blackbox { " (blackbox)" } else { "" };
                    eprintln!(
                        "   {}{}: {} inserted, {} deferred, {} reconnected",
                        module.module, kind, module.inserted, module.deferred, module.reconnected
                    );
                }
            }
            if !global.quiet {
                eprintln!(
                    "   Result: {} buffer(s), {} pad(s) inserted",
                    report.count(InsertionKind::Buffer),
                    report.count(InsertionKind::Pad)
                );
            }
        }
        ReportFormat::Json => {
            let value = serde_json::json!({
                "diagnostics": shown,
                "report": report,
            });
            let json = serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
            println!("{json}");
        }
    }
}
