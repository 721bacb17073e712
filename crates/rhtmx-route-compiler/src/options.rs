// File: src/options.rs
// Purpose: Compile options, loadable from the [routes] table of a TOML file

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How two sources claiming the same route and specificity are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Fail the compile with `SpecificityConflict`
    #[default]
    Strict,
    /// Keep the first-registered source and log a warning
    Lenient,
}

/// Options for a single compile call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Regex patterns; matching virtual paths are skipped
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Keep `+api` routes in the tree (default: true)
    #[serde(default = "default_true")]
    pub preserve_api_routes: bool,

    /// Synthesize a `_sitemap` route when none is supplied (default: true)
    #[serde(default = "default_true")]
    pub generate_sitemap: bool,

    /// Synthesize a root `+not-found` route when none is supplied (default: true)
    #[serde(default = "default_true")]
    pub generate_not_found: bool,

    #[serde(default)]
    pub conflict_policy: ConflictPolicy,

    /// File extensions stripped from route filenames
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub variants: VariantConfig,

    #[serde(default)]
    pub redirects: Vec<RedirectRule>,

    #[serde(default)]
    pub rewrites: Vec<RewriteRule>,
}

/// Filename variants (`index.ios`, `index.web`) and how specific each one is
///
/// A filename whose last dot-suffix is listed in `known` is a variant. Its
/// specificity comes from `ranks`; a known variant without a rank is not
/// active for this compile and the file is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantConfig {
    #[serde(default)]
    pub known: Vec<String>,

    #[serde(default)]
    pub ranks: BTreeMap<String, u32>,
}

impl VariantConfig {
    pub fn is_known(&self, suffix: &str) -> bool {
        self.known.iter().any(|known| known == suffix)
    }

    pub fn rank(&self, suffix: &str) -> Option<u32> {
        self.ranks.get(suffix).copied()
    }
}

/// Sends requests for `source` to another URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectRule {
    pub source: String,
    pub destination: String,

    #[serde(default)]
    pub permanent: bool,

    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

/// Serves `destination` for requests to `source` without changing the URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub source: String,
    pub destination: String,

    #[serde(default)]
    pub methods: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

fn default_extensions() -> Vec<String> {
    ["rsx", "rs", "tsx", "ts", "jsx", "js"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            preserve_api_routes: true,
            generate_sitemap: true,
            generate_not_found: true,
            conflict_policy: ConflictPolicy::default(),
            extensions: default_extensions(),
            variants: VariantConfig::default(),
            redirects: Vec::new(),
            rewrites: Vec::new(),
        }
    }
}

#[derive(Deserialize)]
struct OptionsFile {
    #[serde(default)]
    routes: CompileOptions,
}

impl CompileOptions {
    /// Parses options from the `[routes]` table of a TOML document
    ///
    /// An empty document yields the defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_route_compiler::{CompileOptions, ConflictPolicy};
    ///
    /// let options = CompileOptions::from_toml_str(r#"
    ///     [routes]
    ///     conflict_policy = "lenient"
    ///     generate_sitemap = false
    /// "#).unwrap();
    ///
    /// assert_eq!(options.conflict_policy, ConflictPolicy::Lenient);
    /// assert!(!options.generate_sitemap);
    /// assert!(options.generate_not_found);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: OptionsFile = toml::from_str(content)?;
        Ok(file.routes)
    }

    pub fn with_conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }

    pub fn with_ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    pub fn with_variant(mut self, suffix: impl Into<String>, rank: Option<u32>) -> Self {
        let suffix = suffix.into();
        if let Some(rank) = rank {
            self.variants.ranks.insert(suffix.clone(), rank);
        }
        if !self.variants.is_known(&suffix) {
            self.variants.known.push(suffix);
        }
        self
    }

    pub fn without_sitemap(mut self) -> Self {
        self.generate_sitemap = false;
        self
    }

    pub fn without_not_found(mut self) -> Self {
        self.generate_not_found = false;
        self
    }

    pub fn without_api_routes(mut self) -> Self {
        self.preserve_api_routes = false;
        self
    }

    pub fn with_redirect(mut self, rule: RedirectRule) -> Self {
        self.redirects.push(rule);
        self
    }

    pub fn with_rewrite(mut self, rule: RewriteRule) -> Self {
        self.rewrites.push(rule);
        self
    }
}
