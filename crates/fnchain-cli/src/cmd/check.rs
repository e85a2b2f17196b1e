//! `fnchain check`: read-only cycle report for the backend config.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use fnchain_core::graph::{
    ChainEndpoints, CyclePath, FunctionGraph, find_all_cycles, find_cycle, find_endpoints,
};
use fnchain_core::synth::ChainError;
use serde::Serialize;

use super::{fail, load_backend, load_project};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `fnchain check`.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Backend config file, relative to the project root.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    config: String,
    functions: usize,
    dependent: usize,
    /// Dependency targets that are not keys of the function map.
    undeclared: Vec<String>,
    first_cycle: Option<CyclePath>,
    cycles: Vec<Vec<String>>,
    endpoints: Option<ChainEndpoints>,
}

/// Execute `fnchain check`. Fails when the graph has a cycle.
pub fn run_check(
    args: &CheckArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = load_project(output, project_root)?;
    let config_file = args
        .config
        .clone()
        .unwrap_or(project.serialize.config_file);
    let config = load_backend(output, &project_root.join(&config_file))?;
    let functions = config.functions();

    let graph = FunctionGraph::build(functions);
    let first_cycle = find_cycle(&graph);
    let cycles = if first_cycle.is_some() {
        find_all_cycles(&graph)
    } else {
        Vec::new()
    };
    let endpoints = if first_cycle.is_none() {
        find_endpoints(functions)
    } else {
        None
    };

    let report = CheckReport {
        config: config_file.display().to_string(),
        functions: functions.len(),
        dependent: functions.dependent_count(),
        undeclared: graph.undeclared().map(str::to_string).collect(),
        first_cycle,
        cycles,
        endpoints,
    };

    if !quiet || output.is_json() {
        render_mode(output, &report, render_text, render_pretty)?;
    }

    match report.first_cycle {
        Some(path) => Err(fail(output, ChainError::CycleDetected { path })),
        None => Ok(()),
    }
}

fn render_text(report: &CheckReport, w: &mut dyn Write) -> io::Result<()> {
    writeln!(
        w,
        "functions {} dependent {}",
        report.functions, report.dependent
    )?;
    for name in &report.undeclared {
        writeln!(w, "undeclared {name}")?;
    }
    match report.first_cycle {
        Some(ref path) => writeln!(w, "cycle {path}")?,
        None => writeln!(w, "acyclic")?,
    }
    for group in &report.cycles {
        writeln!(w, "group {}", group.join(" "))?;
    }
    if let Some(ref endpoints) = report.endpoints {
        writeln!(w, "first {}", endpoints.first)?;
        writeln!(w, "last {}", endpoints.last)?;
    }
    Ok(())
}

fn render_pretty(report: &CheckReport, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Dependency check")?;
    pretty_kv(w, "config", &report.config)?;
    pretty_kv(w, "functions", report.functions.to_string())?;
    pretty_kv(w, "dependent", report.dependent.to_string())?;
    if !report.undeclared.is_empty() {
        pretty_kv(w, "undeclared", report.undeclared.join(", "))?;
    }
    if let Some(ref endpoints) = report.endpoints {
        pretty_kv(w, "first", &endpoints.first)?;
        pretty_kv(w, "last", &endpoints.last)?;
    }

    writeln!(w)?;
    if report.cycles.is_empty() {
        writeln!(w, "No dependency cycles found.")?;
        return Ok(());
    }

    pretty_section(w, &format!("Dependency cycles ({})", report.cycles.len()))?;
    if let Some(ref path) = report.first_cycle {
        writeln!(w, "First found: {path}")?;
    }
    for (idx, group) in report.cycles.iter().enumerate() {
        writeln!(w, "\nCycle {}:", idx + 1)?;
        for name in group {
            writeln!(w, "  - {name}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(cycle: bool) -> CheckReport {
        CheckReport {
            config: "backend-config.json".into(),
            functions: 3,
            dependent: 2,
            undeclared: vec!["ghost".into()],
            first_cycle: cycle.then(|| CyclePath::new(vec!["x".into(), "y".into(), "x".into()])),
            cycles: if cycle {
                vec![vec!["x".into(), "y".into()]]
            } else {
                Vec::new()
            },
            endpoints: None,
        }
    }

    #[test]
    fn check_args_parse_config() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CheckArgs,
        }

        let parsed = Wrapper::parse_from(["test", "--config", "other.json"]);
        assert_eq!(parsed.args.config, Some(PathBuf::from("other.json")));
    }

    #[test]
    fn pretty_without_cycles() {
        let mut out = Vec::new();
        render_pretty(&report(false), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("No dependency cycles found."));
        assert!(text.contains("ghost"));
    }

    #[test]
    fn pretty_lists_groups() {
        let mut out = Vec::new();
        render_pretty(&report(true), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("First found: x -> y -> x"));
        assert!(text.contains("Cycle 1:"));
        assert!(text.contains("  - y"));
    }

    #[test]
    fn text_is_line_per_fact() {
        let mut out = Vec::new();
        render_text(&report(true), &mut out).expect("render");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(
            text,
            "functions 3 dependent 2\nundeclared ghost\ncycle x -> y -> x\ngroup x y\n"
        );
    }
}
