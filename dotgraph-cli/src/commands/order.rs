use std::path::{Path, PathBuf};

use anyhow::Context;
use dotgraph::project::{
    ProjectLoader, Settings, Variables, VAR_IN_PATH, VAR_OUT_PATH,
    VAR_UPDATE_OTHER_MODULE_REFERENCES,
};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{add_variable, file_display_name, ModuleEntry, SkippedEntry},
    output::{print_heading, print_output, Align, TabWriter},
};

pub struct OrderOptions<'a> {
    pub input: &'a Path,
    pub output: Option<&'a Path>,
    pub modules: &'a [PathBuf],
    pub copied: &'a [PathBuf],
    pub update_references: bool,
    pub variables: &'a [String],
}

#[derive(Debug, Serialize)]
struct OrderEntry {
    position: usize,
    name: String,
    file: String,
    references: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CycleBreakEntry {
    module: String,
    waiting_on: Vec<String>,
    cycle: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OrderOutput {
    order: Vec<OrderEntry>,
    copied: Vec<String>,
    cycle_breaks: Vec<CycleBreakEntry>,
    referencing: Vec<String>,
    unsupported: Vec<ModuleEntry>,
    skipped: Vec<SkippedEntry>,
}

fn settings(options: &OrderOptions<'_>) -> anyhow::Result<Settings> {
    let mut variables = Variables::new();
    for definition in options.variables {
        add_variable(&mut variables, definition)?;
    }

    variables.add(VAR_IN_PATH, options.input.to_string_lossy());
    if let Some(output) = options.output {
        variables.add(VAR_OUT_PATH, output.to_string_lossy());
    }
    if options.update_references {
        variables.add(VAR_UPDATE_OTHER_MODULE_REFERENCES, "true");
    }

    Ok(Settings::from_variables(&variables)?)
}

pub fn run(options: &OrderOptions<'_>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let mut loader = ProjectLoader::new(settings(options)?);
    for module in options.modules {
        loader = loader.module(module);
    }
    for module in options.copied {
        loader = loader.copied(module);
    }

    let result = loader
        .build()
        .with_context(|| format!("failed to load project from {}", options.input.display()))?;

    let scan = result.scan.unwrap_or_default();
    let output = OrderOutput {
        order: result
            .project
            .modules()
            .iter()
            .enumerate()
            .map(|(position, module)| OrderEntry {
                position: position + 1,
                name: module.name().to_string(),
                file: file_display_name(module.path()),
                references: module.references().to_vec(),
            })
            .collect(),
        copied: result
            .project
            .copied_modules()
            .iter()
            .map(|module| module.name().to_string())
            .collect(),
        cycle_breaks: result
            .order
            .cycle_breaks
            .iter()
            .map(|broken| CycleBreakEntry {
                module: broken.module.clone(),
                waiting_on: broken.waiting_on.clone(),
                cycle: broken.cycle.clone(),
            })
            .collect(),
        referencing: scan
            .referencing
            .iter()
            .map(|module| module.name().to_string())
            .collect(),
        unsupported: scan.unsupported.iter().map(ModuleEntry::from).collect(),
        skipped: scan.skipped.iter().map(SkippedEntry::from).collect(),
    };

    print_output(&output, opts, |out| {
        println!("Processing order ({} modules):", out.order.len());
        let mut tw = TabWriter::new(&[
            ("#", Align::Right),
            ("Name", Align::Left),
            ("File", Align::Left),
            ("References", Align::Left),
        ])
        .indented();
        for entry in &out.order {
            tw.row(vec![
                entry.position.to_string(),
                entry.name.clone(),
                entry.file.clone(),
                entry.references.join(", "),
            ]);
        }
        tw.print();

        if print_heading("Copied", out.copied.len()) {
            println!("  {}", out.copied.join(", "));
        }

        if print_heading("Cycles broken", out.cycle_breaks.len()) {
            for broken in &out.cycle_breaks {
                println!(
                    "  {} processed before {} (cycle: {})",
                    broken.module,
                    broken.waiting_on.join(", "),
                    broken.cycle.join(" <-> ")
                );
            }
        }

        if print_heading("Referencing modules added", out.referencing.len()) {
            println!("  {}", out.referencing.join(", "));
        }

        if print_heading("Mixed mode modules left unchanged", out.unsupported.len()) {
            for module in &out.unsupported {
                println!("  {} ({})", module.name, module.file);
            }
        }

        if print_heading("Skipped files", out.skipped.len()) {
            for skipped in &out.skipped {
                println!("  {} [{}] {}", skipped.file, skipped.reason, skipped.message);
            }
        }
    })
}
