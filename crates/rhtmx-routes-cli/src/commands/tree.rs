use anyhow::{Context, Result};
use colored::Colorize;

use crate::input::compile_input;
use crate::InputArgs;

pub fn execute(input: &InputArgs) -> Result<()> {
    let compiled = compile_input(input)?;

    let json = serde_json::to_string_pretty(&compiled.tree())
        .context("Failed to serialize route tree")?;
    println!("{}", json);

    if let Some(tree) = compiled.tree() {
        eprintln!(
            "  {} {} nodes",
            "✓".green(),
            tree.iter().count().to_string().bold()
        );
    }

    Ok(())
}
