//! `blockplay check`

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use blockplay_tasks::TaskKind;

pub fn execute(script: &Path, task: TaskKind, listing: bool) -> Result<ExitCode> {
    let source = std::fs::read_to_string(script)
        .with_context(|| format!("failed to read script '{}'", script.display()))?;
    let name = script.display().to_string();

    match blockplay_compiler::compile(&source, &name, task.signatures()) {
        Ok(program) => {
            let blocks = program.highlight_ids().count();
            println!(
                "{name}: ok ({} instructions, {} variables, {blocks} blocks)",
                program.len(),
                program.slots.len()
            );
            if listing {
                print!("{}", program.listing());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            eprint!("{errors}");
            eprintln!("{name}: {} error(s)", errors.total_errors);
            Ok(ExitCode::FAILURE)
        }
    }
}
