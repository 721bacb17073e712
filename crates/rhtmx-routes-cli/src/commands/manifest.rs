use anyhow::{Context, Result};
use colored::Colorize;
use rhtmx_route_compiler::{compile_manifest, ServerManifest};

use crate::input::compile_input;
use crate::InputArgs;

pub fn execute(input: &InputArgs) -> Result<()> {
    let manifest = compile_input(input)?
        .tree()
        .map(compile_manifest)
        .unwrap_or_default();

    // Fail early on a regex the server would reject at startup
    manifest.matcher().context("Manifest contains an invalid route regex")?;

    let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    println!("{}", json);

    print_summary(&manifest);
    Ok(())
}

fn print_summary(manifest: &ServerManifest) {
    let partitions = [
        ("html", manifest.html_routes.len()),
        ("api", manifest.api_routes.len()),
        ("not-found", manifest.not_found_routes.len()),
        ("redirect", manifest.redirects.len()),
        ("rewrite", manifest.rewrites.len()),
    ];

    let summary = partitions
        .iter()
        .filter(|(_, count)| *count > 0)
        .map(|(name, count)| format!("{} {}", count, name))
        .collect::<Vec<_>>()
        .join(", ");

    eprintln!("  {} {} rows ({})", "✓".green(), manifest.len().to_string().bold(), summary);
}
