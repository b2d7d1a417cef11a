use std::path::Path;

use anyhow::bail;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{scan_directory, yes_no, ModuleEntry},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ReferencingOutput {
    selected: Vec<String>,
    referencing: Vec<ModuleEntry>,
}

pub fn run(input: &Path, select: &[String], opts: &GlobalOptions) -> anyhow::Result<()> {
    let inventory = scan_directory(input)?;

    let unknown: Vec<&str> = select
        .iter()
        .filter(|name| inventory.get(name).is_none())
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        bail!(
            "no module named {} in {}",
            unknown.join(", "),
            input.display()
        );
    }

    let referencing = inventory.find_referencing(|name| select.iter().any(|s| s == name))?;
    let output = ReferencingOutput {
        selected: select.to_vec(),
        referencing: referencing.into_iter().map(ModuleEntry::from).collect(),
    };

    print_output(&output, opts, |out| {
        if out.referencing.is_empty() {
            println!("No module references {}", out.selected.join(", "));
            return;
        }

        println!(
            "Modules referencing {} ({}):",
            out.selected.join(", "),
            out.referencing.len()
        );
        let mut tw = TabWriter::new(&[
            ("Name", Align::Left),
            ("File", Align::Left),
            ("Mixed", Align::Left),
        ])
        .indented();
        for module in &out.referencing {
            tw.row(vec![
                module.name.clone(),
                module.file.clone(),
                yes_no(module.mixed_mode),
            ]);
        }
        tw.print();
    })
}
