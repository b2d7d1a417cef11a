use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{scan_directory, yes_no, ModuleEntry, SkippedEntry},
    output::{print_heading, print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ScanOutput {
    directory: String,
    modules: Vec<ModuleEntry>,
    skipped: Vec<SkippedEntry>,
}

pub fn run(dir: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let inventory = scan_directory(dir)?;

    let output = ScanOutput {
        directory: dir.display().to_string(),
        modules: inventory.modules().iter().map(ModuleEntry::from).collect(),
        skipped: inventory.skipped().iter().map(SkippedEntry::from).collect(),
    };

    print_output(&output, opts, |out| {
        println!("{}: {} modules", out.directory, out.modules.len());

        if print_heading("Modules", out.modules.len()) {
            let mut tw = TabWriter::new(&[
                ("Name", Align::Left),
                ("File", Align::Left),
                ("Mixed", Align::Left),
                ("References", Align::Left),
            ])
            .indented();
            for module in &out.modules {
                tw.row(vec![
                    module.name.clone(),
                    module.file.clone(),
                    yes_no(module.mixed_mode),
                    module.references.join(", "),
                ]);
            }
            tw.print();
        }

        if print_heading("Skipped", out.skipped.len()) {
            let mut tw = TabWriter::new(&[
                ("File", Align::Left),
                ("Reason", Align::Left),
                ("Details", Align::Left),
            ])
            .indented();
            for skipped in &out.skipped {
                tw.row(vec![
                    skipped.file.clone(),
                    skipped.reason.to_string(),
                    skipped.message.clone(),
                ]);
            }
            tw.print();
        }
    })
}
