// File: src/input.rs
// Purpose: Loading virtual paths and compile options from disk

use anyhow::{bail, Context, Result};
use colored::Colorize;
use rhtmx_route_compiler::{compile, CompileOptions, Compiled, ConflictPolicy, VirtualPath};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::InputArgs;

/// Loads options and paths, then compiles them
pub fn compile_input(args: &InputArgs) -> Result<Compiled> {
    let options = load_options(&args.config, args.lenient)?;
    let paths = load_paths(args, &options)?;

    eprintln!(
        "  {} Compiling {} route files",
        "→".cyan(),
        paths.len().to_string().bold()
    );

    let compiled = compile(paths, &options).context("Failed to compile routes")?;
    if compiled.is_empty() {
        eprintln!("  {} No routes found", "⚠".yellow());
    }
    Ok(compiled)
}

/// Reads the `[routes]` table of a TOML file
///
/// A missing or empty file yields the defaults.
pub fn load_options(path: &Path, lenient: bool) -> Result<CompileOptions> {
    let mut options = if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        CompileOptions::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?
    } else {
        CompileOptions::default()
    };

    if lenient {
        options.conflict_policy = ConflictPolicy::Lenient;
    }
    Ok(options)
}

fn load_paths(args: &InputArgs, options: &CompileOptions) -> Result<Vec<VirtualPath>> {
    match &args.paths {
        Some(list) => {
            let content = fs::read_to_string(list)
                .with_context(|| format!("Failed to read path list: {:?}", list))?;
            Ok(parse_path_list(&content))
        }
        None => scan_directory(&args.dir, &options.extensions),
    }
}

/// Parses a path list: one path per line, blank lines and `#` comments skipped
pub fn parse_path_list(content: &str) -> Vec<VirtualPath> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(VirtualPath::from)
        .collect()
}

/// Collects route files below `dir` as root-relative virtual paths
///
/// Each source id is the on-disk path so the output points back at the file.
fn scan_directory(dir: &Path, extensions: &[String]) -> Result<Vec<VirtualPath>> {
    if !dir.is_dir() {
        bail!(
            "Pages directory {:?} not found; pass --dir or --paths",
            dir
        );
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to scan {:?}", dir))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let has_route_extension = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|known| known == ext));
        if !has_route_extension {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("{:?} is outside {:?}", entry.path(), dir))?;
        let virtual_path = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        paths.push(VirtualPath::new(virtual_path).with_source(entry.path().display().to_string()));
    }

    Ok(paths)
}
