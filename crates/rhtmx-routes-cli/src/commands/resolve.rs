use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rhtmx_route_compiler::{compile_manifest, SourceId};
use serde::Serialize;

use crate::input::compile_input;
use crate::InputArgs;

/// What the CLI reports for a resolved URL
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolution<'a> {
    source_id: &'a SourceId,
    canonical_path: &'a str,
    params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    destination: Option<String>,
}

pub fn execute(input: &InputArgs, url: &str) -> Result<()> {
    let Some(tree) = compile_input(input)?.into_tree() else {
        bail!("No routes to match {} against", url);
    };

    let manifest = compile_manifest(&tree);
    let matcher = manifest.matcher().context("Failed to build route matcher")?;

    let Some(found) = matcher.resolve(url) else {
        bail!("No route matches {}", url);
    };

    eprintln!(
        "  {} {} → {}",
        "✓".green(),
        url.cyan(),
        found.row.canonical_path.bold()
    );

    let resolution = Resolution {
        source_id: &found.row.source_id,
        canonical_path: &found.row.canonical_path,
        destination: found.destination(),
        params: found.params,
    };

    let json = serde_json::to_string_pretty(&resolution).context("Failed to serialize match")?;
    println!("{}", json);
    Ok(())
}
