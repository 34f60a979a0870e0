//! Managed kubeconfig directory
//!
//! `up` drops one kubeconfig per provider into a managed directory; this
//! module discovers every file there whose name matches the config pattern,
//! merges them into a single flattened kubeconfig and atomically replaces
//! the canonical file. Merge semantics follow `kubectl config view
//! --flatten`: entries are unioned by name with the first occurrence
//! winning, and `current-context` comes from the first file that sets one.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File name pattern for config files in the managed directory
pub const CONFIG_FILE_PATTERN: &str = "^config";

/// Errors that can occur during kubeconfig management
#[derive(Error, Debug)]
pub enum KubeconfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse kubeconfig {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("failed to serialize merged kubeconfig: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("no kubeconfig files found in {}", .0.display())]
    NoConfigs(PathBuf),
}

/// A named entry in a kubeconfig list (cluster, context or user).
/// The payload is carried opaquely; merging only needs the name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedEntry {
    pub name: String,
    #[serde(flatten)]
    pub rest: serde_yaml::Mapping,
}

/// The subset of the kubeconfig format the merge operates on.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion", skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub clusters: Vec<NamedEntry>,
    #[serde(default)]
    pub contexts: Vec<NamedEntry>,
    #[serde(default)]
    pub users: Vec<NamedEntry>,
    #[serde(
        rename = "current-context",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_context: Option<String>,
}

impl Kubeconfig {
    /// Parse a kubeconfig from YAML.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Names of all contexts, for logging and tests.
    pub fn context_names(&self) -> Vec<&str> {
        self.contexts.iter().map(|c| c.name.as_str()).collect()
    }
}

// ============================================================================
// Pure merge logic
// ============================================================================

/// Merge kubeconfigs in order: union by entry name, first occurrence wins.
///
/// Idempotent: feeding the merge result back in with its inputs yields the
/// same entry set.
pub fn merge(configs: &[Kubeconfig]) -> Kubeconfig {
    let mut merged = Kubeconfig {
        api_version: Some("v1".to_string()),
        kind: Some("Config".to_string()),
        ..Default::default()
    };

    for config in configs {
        merge_entries(&mut merged.clusters, &config.clusters);
        merge_entries(&mut merged.contexts, &config.contexts);
        merge_entries(&mut merged.users, &config.users);
        if merged.current_context.is_none() {
            merged.current_context = config.current_context.clone();
        }
    }

    merged
}

fn merge_entries(target: &mut Vec<NamedEntry>, source: &[NamedEntry]) {
    for entry in source {
        if !target.iter().any(|e| e.name == entry.name) {
            target.push(entry.clone());
        }
    }
}

// ============================================================================
// I/O boundary functions
// ============================================================================

/// Discover config files in the managed directory, sorted by file name.
///
/// Only plain files whose name matches the pattern are considered.
pub fn discover_config_files(dir: &Path) -> Result<Vec<PathBuf>, KubeconfigError> {
    // Pattern is a compile-time constant
    let pattern = Regex::new(CONFIG_FILE_PATTERN).expect("invalid config file pattern");

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if pattern.is_match(&name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load, merge and atomically write the canonical kubeconfig file.
///
/// Returns the merged document. The canonical file itself matches the
/// pattern and participates in the merge, which is harmless because the
/// merge is idempotent.
pub fn merge_directory(dir: &Path, canonical_name: &str) -> Result<Kubeconfig, KubeconfigError> {
    let files = discover_config_files(dir)?;
    if files.is_empty() {
        return Err(KubeconfigError::NoConfigs(dir.to_path_buf()));
    }

    let mut configs = Vec::with_capacity(files.len());
    for path in &files {
        let content = std::fs::read_to_string(path)?;
        let config = Kubeconfig::parse(&content).map_err(|e| KubeconfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!(
            "merging {} ({} contexts)",
            path.display(),
            config.contexts.len()
        );
        configs.push(config);
    }

    let merged = merge(&configs);
    write_atomic(&dir.join(canonical_name), &merged.to_yaml()?)?;
    Ok(merged)
}

/// Write content to a temp file in the same directory, then rename over the
/// destination so readers never observe a partial file.
fn write_atomic(dest: &Path, content: &str) -> Result<(), KubeconfigError> {
    let tmp = dest.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, dest)?;
    Ok(())
}
