//! Cluster providers
//!
//! A provider knows how to create and destroy one kind of local cluster and
//! how to hand over its kubeconfig. The shell version resolved providers by
//! sourcing a library file named after `CLUSTER_PROVIDER`; here that becomes
//! a registry keyed by provider name, populated at startup, with an explicit
//! unknown-provider error that lists what is registered.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Settings;
use crate::exec::ExecError;

pub mod kind;
pub mod microshift;

pub use kind::KindProvider;
pub use microshift::MicroshiftProvider;

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("unknown provider '{name}', known providers: {}", .known.join(", "))]
    Unknown { name: String, known: Vec<String> },

    #[error("command failed: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid provider state: {0}")]
    State(String),
}

/// Capability contract every provider implements.
///
/// Exactly one provider is active per invocation, selected by
/// `CLUSTER_PROVIDER` and injected into the lifecycle orchestrator.
#[async_trait]
pub trait Provider: Send + Sync + std::fmt::Debug {
    /// Registry key for this provider
    fn name(&self) -> &'static str;

    /// Bring the cluster up. Not guaranteed idempotent; behavior when the
    /// cluster already exists is provider-specific.
    async fn up(&self, settings: &Settings) -> Result<(), ProviderError>;

    /// Tear the cluster down.
    async fn down(&self, settings: &Settings) -> Result<(), ProviderError>;

    /// Produce the provider's kubeconfig artifact and return its path.
    async fn kubeconfig(&self, settings: &Settings) -> Result<PathBuf, ProviderError>;

    /// Human-readable configuration summary printed before acting.
    fn describe(&self, settings: &Settings) -> String;
}

/// Registry of available providers, keyed by name.
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    /// Build the registry with all built-in providers.
    pub fn new() -> Self {
        let mut providers: HashMap<&'static str, Arc<dyn Provider>> = HashMap::new();
        let kind: Arc<dyn Provider> = Arc::new(KindProvider);
        let microshift: Arc<dyn Provider> = Arc::new(MicroshiftProvider);
        providers.insert(kind.name(), kind);
        providers.insert(microshift.name(), microshift);
        Self { providers }
    }

    /// Look up a provider by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, ProviderError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::Unknown {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// Sorted list of registered provider names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
