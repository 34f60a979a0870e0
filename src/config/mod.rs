//! Run configuration for kubedev
//!
//! Everything is driven by environment variables so the tool can be wired
//! into Makefiles and CI the same way the shell version was. Precedence:
//! explicit environment variable > `.env` file (loaded before this module
//! runs; dotenvy never overrides variables that are already set) > built-in
//! default.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Default provider when `CLUSTER_PROVIDER` is unset
pub const DEFAULT_PROVIDER: &str = "kind";

/// Default cluster name
pub const DEFAULT_CLUSTER_NAME: &str = "kubedev";

/// Default container engine command
pub const DEFAULT_CONTAINER_ENGINE: &str = "docker";

/// Default merged kubeconfig file name
pub const DEFAULT_KUBECONFIG_NAME: &str = "config";

/// Default local registry port mapped into the cluster
pub const DEFAULT_REGISTRY_PORT: u16 = 5001;

/// Default libbpf tag for the source build
pub const DEFAULT_LIBBPF_TAG: &str = "v1.4.3";

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Immutable configuration for one run, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Provider registry key (`CLUSTER_PROVIDER`)
    pub provider: String,
    /// Cluster / container name (`CLUSTER_NAME`)
    pub cluster_name: String,
    /// Container engine command, docker or podman (`CONTAINER_ENGINE`)
    pub container_engine: String,
    /// Managed kubeconfig directory (`KUBECONFIG_DIR`, tilde expanded)
    pub kubeconfig_dir: PathBuf,
    /// Canonical merged kubeconfig file name (`KUBECONFIG_NAME`)
    pub kubeconfig_name: String,
    /// Local registry port (`REGISTRY_PORT`)
    pub registry_port: u16,
    /// Deploy the Prometheus operator on `up` (`INSTALL_PROMETHEUS`)
    pub prometheus: bool,
    /// Deploy Grafana on `up`; implies the operator (`INSTALL_GRAFANA`)
    pub grafana: bool,
    /// Deploy Tekton pipelines on `up` (`INSTALL_TEKTON`)
    pub tekton: bool,
    /// Git tag for the libbpf source build (`LIBBPF_VERSION`)
    pub libbpf_tag: String,
    /// Restart the engine service after installing it (`RESTART_CONTAINER_RUNTIME`)
    pub restart_engine: bool,
}

impl Settings {
    /// Resolve settings from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        let kubeconfig_dir = match env::var("KUBECONFIG_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(shellexpand::tilde(&dir).into_owned()),
            _ => default_kubeconfig_dir(),
        };

        Ok(Self {
            provider: env_or("CLUSTER_PROVIDER", DEFAULT_PROVIDER),
            cluster_name: env_or("CLUSTER_NAME", DEFAULT_CLUSTER_NAME),
            container_engine: env_or("CONTAINER_ENGINE", DEFAULT_CONTAINER_ENGINE),
            kubeconfig_dir,
            kubeconfig_name: env_or("KUBECONFIG_NAME", DEFAULT_KUBECONFIG_NAME),
            registry_port: env_port("REGISTRY_PORT", DEFAULT_REGISTRY_PORT)?,
            prometheus: env_flag("INSTALL_PROMETHEUS"),
            grafana: env_flag("INSTALL_GRAFANA"),
            tekton: env_flag("INSTALL_TEKTON"),
            libbpf_tag: env_or("LIBBPF_VERSION", DEFAULT_LIBBPF_TAG),
            restart_engine: env_flag("RESTART_CONTAINER_RUNTIME"),
        })
    }

    /// Path of the canonical merged kubeconfig file
    pub fn canonical_kubeconfig(&self) -> PathBuf {
        self.kubeconfig_dir.join(&self.kubeconfig_name)
    }

    /// Path of the managed per-provider kubeconfig copy
    pub fn provider_kubeconfig(&self) -> PathBuf {
        self.kubeconfig_dir
            .join(format!("config-{}", self.provider))
    }
}

/// Default managed kubeconfig root: ~/.kube
pub fn default_kubeconfig_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".kube")
}

fn env_or(var: &str, default: &str) -> String {
    match env::var(var) {
        Ok(v) if !v.is_empty() => v,
        _ => default.to_string(),
    }
}

/// Parse a boolean toggle: `1`, `true`, `yes`, `on` (case-insensitive).
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_flag(var: &str) -> bool {
    env::var(var).map(|v| parse_flag(&v)).unwrap_or(false)
}

fn env_port(var: &'static str, default: u16) -> Result<u16, SettingsError> {
    match env::var(var) {
        Ok(v) if !v.is_empty() => v.parse().map_err(|_| SettingsError::Invalid {
            var,
            value: v,
            reason: "expected a port number".to_string(),
        }),
        _ => Ok(default),
    }
}
