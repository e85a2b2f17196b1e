//! `fnchain serialize`: chain dependency-free functions, write the config
//! back, and add the matching template parameters.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use fnchain_core::config::SerializeConfig;
use fnchain_core::graph::ChainEndpoints;
use fnchain_core::metrics::SerializationMetrics;
use fnchain_core::percent::Percentage;
use fnchain_core::synth::{SyntheticEdge, synthesize};
use fnchain_core::templates::{TemplateLayout, TemplateReport, update_templates};
use serde::Serialize;
use tracing::info;

use super::{fail, load_backend, load_project};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `fnchain serialize`.
#[derive(Args, Debug, Default)]
pub struct SerializeArgs {
    /// Share of functions (0-100) that must end up in a dependency chain.
    #[arg(short, long, value_name = "PERCENT")]
    pub serialization: Option<Percentage>,

    /// Attribute recorded on each synthetic dependency.
    #[arg(long, value_name = "NAME")]
    pub attribute: Option<String>,

    /// Backend config file, relative to the project root.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Mark every edge source as used, not just the first.
    #[arg(long, conflicts_with = "first_edge_only")]
    pub every_source: bool,

    /// Mark only the first edge's source as used, even if the project file
    /// sets `every_source`.
    #[arg(long)]
    pub first_edge_only: bool,

    /// Compute and report edges without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Write the config but leave function templates alone.
    #[arg(long)]
    pub skip_templates: bool,
}

impl SerializeArgs {
    /// Layer flags over the project file's `[serialize]` section.
    fn resolve(&self, mut base: SerializeConfig) -> SerializeConfig {
        if let Some(percentage) = self.serialization {
            base.percentage = percentage;
        }
        if let Some(ref attribute) = self.attribute {
            base.attribute.clone_from(attribute);
        }
        if let Some(ref config) = self.config {
            base.config_file.clone_from(config);
        }
        if self.every_source {
            base.every_source = true;
        } else if self.first_edge_only {
            base.every_source = false;
        }
        base
    }
}

#[derive(Debug, Serialize)]
struct SerializeReport {
    config: String,
    dry_run: bool,
    metrics: SerializationMetrics,
    edges: Vec<SyntheticEdge>,
    endpoints: Option<ChainEndpoints>,
    /// `None` when templates were skipped.
    templates: Option<TemplateReport>,
}

/// Execute `fnchain serialize`.
pub fn run_serialize(
    args: &SerializeArgs,
    output: OutputMode,
    quiet: bool,
    project_root: &Path,
) -> anyhow::Result<()> {
    let project = load_project(output, project_root)?;
    let settings = args.resolve(project.serialize);
    let config_path = project_root.join(&settings.config_file);

    let mut config = load_backend(output, &config_path)?;
    let synthesis =
        synthesize(config.functions(), &settings.synthesis_options()).map_err(|e| fail(output, e))?;

    let templates = if args.dry_run {
        None
    } else {
        config.replace_functions(synthesis.functions.clone());
        config.save(&config_path).map_err(|e| fail(output, e))?;
        info!(path = %config_path.display(), edges = synthesis.edges.len(), "backend config written");

        if args.skip_templates {
            None
        } else {
            let layout = TemplateLayout::new(project_root, &project.templates);
            Some(update_templates(&layout, &synthesis.functions).map_err(|e| fail(output, e))?)
        }
    };

    let report = SerializeReport {
        config: settings.config_file.display().to_string(),
        dry_run: args.dry_run,
        metrics: synthesis.metrics,
        edges: synthesis.edges,
        endpoints: synthesis.endpoints,
        templates,
    };

    if quiet && !output.is_json() {
        return render_missing_only(&report);
    }
    render_mode(output, &report, render_text, render_pretty)
}

/// Quiet mode still surfaces templates that block the parameter phase.
fn render_missing_only(report: &SerializeReport) -> anyhow::Result<()> {
    if let Some(TemplateReport::Missing { ref functions }) = report.templates {
        let stderr = io::stderr();
        let mut out = stderr.lock();
        writeln!(out, "missing templates: {}", functions.join(", "))?;
    }
    Ok(())
}

fn render_text(report: &SerializeReport, w: &mut dyn Write) -> io::Result<()> {
    let m = &report.metrics;
    writeln!(
        w,
        "functions {} free {} current {:.2}% target {}% to_serialize {}",
        m.total_functions,
        m.dependency_free,
        m.current_percentage,
        m.target_percentage,
        m.to_serialize
    )?;
    for edge in &report.edges {
        writeln!(w, "edge {} -> {}", edge.source, edge.target)?;
    }
    writeln!(w, "final {} {:.2}%", m.final_dependent, m.final_percentage)?;
    if let Some(ref endpoints) = report.endpoints {
        writeln!(w, "first {}", endpoints.first)?;
        writeln!(w, "last {}", endpoints.last)?;
    }
    match report.templates {
        Some(TemplateReport::Updated {
            templates,
            parameters_added,
        }) => writeln!(w, "templates updated {templates} parameters {parameters_added}")?,
        Some(TemplateReport::Missing { ref functions }) => {
            writeln!(w, "templates missing {}", functions.join(" "))?;
        }
        None => writeln!(w, "templates skipped")?,
    }
    if report.dry_run {
        writeln!(w, "dry-run nothing written")?;
    }
    Ok(())
}

fn render_pretty(report: &SerializeReport, w: &mut dyn Write) -> io::Result<()> {
    let m = &report.metrics;
    pretty_section(w, "Serialization")?;
    pretty_kv(w, "config", &report.config)?;
    pretty_kv(w, "functions", m.total_functions.to_string())?;
    pretty_kv(w, "free", m.dependency_free.to_string())?;
    pretty_kv(w, "current", format!("{:.2}%", m.current_percentage))?;
    pretty_kv(w, "target", format!("{}%", m.target_percentage))?;
    pretty_kv(w, "to serialize", m.to_serialize.to_string())?;
    pretty_kv(
        w,
        "result",
        format!("{} dependent ({:.2}%)", m.final_dependent, m.final_percentage),
    )?;
    if let Some(ref endpoints) = report.endpoints {
        pretty_kv(w, "first", &endpoints.first)?;
        pretty_kv(w, "last", &endpoints.last)?;
    }

    writeln!(w)?;
    pretty_section(w, &format!("Synthetic edges ({})", report.edges.len()))?;
    if report.edges.is_empty() {
        writeln!(w, "  (none)")?;
    }
    for edge in &report.edges {
        writeln!(w, "  {} -> {}", edge.source, edge.target)?;
    }

    writeln!(w)?;
    pretty_section(w, "Templates")?;
    match report.templates {
        Some(TemplateReport::Updated {
            templates,
            parameters_added,
        }) => writeln!(
            w,
            "  {parameters_added} parameter(s) added across {templates} template(s)"
        )?,
        Some(TemplateReport::Missing { ref functions }) => {
            writeln!(w, "  Missing templates, no parameters were added:")?;
            for name in functions {
                writeln!(w, "    - {name}")?;
            }
        }
        None if report.dry_run => writeln!(w, "  skipped (dry run, nothing written)")?,
        None => writeln!(w, "  skipped")?,
    }
    Ok(())
}
