//! Command implementations for the CLI
//!
//! The lifecycle orchestrator: providers are injected as `&dyn Provider`,
//! selected from the registry by the caller.

use std::env;
use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::addons::{monitoring, tekton, AddonError};
use crate::config::{Settings, SettingsError};
use crate::exec::{self, ExecError};
use crate::host::packages::{self, PackageManager};
use crate::host::{libbpf, HostError};
use crate::kubeconfig::{self, KubeconfigError};
use crate::provider::{Provider, ProviderError};

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("kubeconfig error: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("add-on error: {0}")]
    Addon(#[from] AddonError),

    #[error("host provisioning error: {0}")]
    Host(#[from] HostError),

    #[error("command failed: {0}")]
    Exec(#[from] ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for commands
pub type CommandResult<T> = Result<T, CommandError>;

// ============================================================================
// Cluster lifecycle
// ============================================================================

/// Bring the cluster up, install its kubeconfig and deploy add-ons.
pub async fn up(provider: &dyn Provider, settings: &Settings) -> CommandResult<()> {
    let wants_addons = settings.prometheus || settings.grafana || settings.tekton;
    if wants_addons && !exec::is_available("kubectl").await {
        warn!("kubectl not found on PATH, add-on deployment will fail");
    }

    provider.up(settings).await?;
    install_kubeconfig(provider, settings).await?;

    if settings.prometheus || settings.grafana {
        monitoring::deploy(settings).await?;
    }
    if settings.tekton {
        tekton::deploy().await?;
    }

    info!("cluster '{}' is up", settings.cluster_name);
    Ok(())
}

/// Tear the cluster down and remove its managed kubeconfig copy.
///
/// Tear-down failure propagates; the kubeconfig copy is only removed after
/// the provider succeeds.
pub async fn down(provider: &dyn Provider, settings: &Settings) -> CommandResult<()> {
    provider.down(settings).await?;

    let managed = settings.provider_kubeconfig();
    if managed.exists() {
        std::fs::remove_file(&managed)?;
        info!("removed {}", managed.display());
    }
    Ok(())
}

/// Tear down tolerating failure, then bring up.
pub async fn restart(provider: &dyn Provider, settings: &Settings) -> CommandResult<()> {
    if let Err(e) = down(provider, settings).await {
        warn!("tear-down failed, continuing with bring-up: {e}");
    }
    up(provider, settings).await
}

/// Fetch the provider kubeconfig, move it into the managed directory and
/// merge everything there into the canonical file.
async fn install_kubeconfig(provider: &dyn Provider, settings: &Settings) -> CommandResult<()> {
    let artifact = provider.kubeconfig(settings).await?;

    std::fs::create_dir_all(&settings.kubeconfig_dir)?;
    let managed = settings.provider_kubeconfig();
    move_file(&artifact, &managed)?;
    info!("installed kubeconfig at {}", managed.display());

    let merged = kubeconfig::merge_directory(&settings.kubeconfig_dir, &settings.kubeconfig_name)?;
    info!(
        "merged kubeconfig has {} context(s): {}",
        merged.contexts.len(),
        merged.context_names().join(", ")
    );

    let canonical = settings.canonical_kubeconfig();
    env::set_var("KUBECONFIG", &canonical);
    println!("export KUBECONFIG={}", canonical.display());
    Ok(())
}

/// Rename, falling back to copy+remove when the temp dir is on another
/// filesystem.
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    if std::fs::rename(from, to).is_err() {
        std::fs::copy(from, to)?;
        std::fs::remove_file(from)?;
    }
    Ok(())
}

// ============================================================================
// Host provisioning
// ============================================================================

/// Install kernel headers and build the libbpf toolchain.
pub async fn prerequisites(settings: &Settings) -> CommandResult<()> {
    let pm = PackageManager::detect();
    info!("package manager: {}", pm.command());

    packages::install_kernel_headers(pm).await?;
    libbpf::install(pm, &settings.libbpf_tag).await?;
    Ok(())
}

/// Install the configured container engine, optionally restarting its
/// service afterwards.
pub async fn container_runtime(settings: &Settings) -> CommandResult<()> {
    let pm = PackageManager::detect();
    let engine = &settings.container_engine;

    let pkgs = packages::engine_packages(pm, engine)?;
    packages::install(pm, &pkgs).await?;

    // podman is daemonless; only docker has a service to manage
    if settings.restart_engine && engine == "docker" {
        if exec::is_available("systemctl").await {
            info!("restarting docker service");
            exec::run("systemctl", &systemctl_args("enable", "docker")).await?;
            exec::run("systemctl", &systemctl_args("restart", "docker")).await?;
        } else {
            warn!("systemctl not available, skipping docker service restart");
        }
    }
    Ok(())
}

/// Arguments for a systemctl verb on a unit
pub fn systemctl_args(verb: &str, unit: &str) -> Vec<String> {
    vec![verb.to_string(), unit.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Provider double: records call order, tear-down failure injectable.
    #[derive(Debug)]
    struct FakeProvider {
        fail_down: bool,
        ups: AtomicU32,
        downs: AtomicU32,
        kubeconfig_body: String,
    }

    impl FakeProvider {
        fn new(fail_down: bool) -> Self {
            Self {
                fail_down,
                ups: AtomicU32::new(0),
                downs: AtomicU32::new(0),
                kubeconfig_body: concat!(
                    "apiVersion: v1\n",
                    "kind: Config\n",
                    "clusters:\n",
                    "- name: fake\n",
                    "contexts:\n",
                    "- name: fake\n",
                    "users:\n",
                    "- name: fake\n",
                    "current-context: fake\n"
                )
                .to_string(),
            }
        }
    }

    #[async_trait]
    impl Provider for FakeProvider {
        fn name(&self) -> &'static str {
            "fake"
        }

        async fn up(&self, _settings: &Settings) -> Result<(), ProviderError> {
            self.ups.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn down(&self, _settings: &Settings) -> Result<(), ProviderError> {
            self.downs.fetch_add(1, Ordering::SeqCst);
            if self.fail_down {
                return Err(ProviderError::State("tear-down refused".to_string()));
            }
            Ok(())
        }

        async fn kubeconfig(&self, settings: &Settings) -> Result<PathBuf, ProviderError> {
            let path = settings.kubeconfig_dir.join("artifact");
            std::fs::create_dir_all(&settings.kubeconfig_dir)?;
            std::fs::write(&path, &self.kubeconfig_body)?;
            Ok(path)
        }

        fn describe(&self, _settings: &Settings) -> String {
            "provider: fake".to_string()
        }
    }

    fn test_settings(dir: &TempDir) -> Settings {
        Settings {
            provider: "fake".to_string(),
            cluster_name: "test".to_string(),
            container_engine: "docker".to_string(),
            kubeconfig_dir: dir.path().to_path_buf(),
            kubeconfig_name: "config".to_string(),
            registry_port: 5001,
            prometheus: false,
            grafana: false,
            tekton: false,
            libbpf_tag: "v1.4.3".to_string(),
            restart_engine: false,
        }
    }

    #[tokio::test]
    async fn test_up_installs_merged_kubeconfig() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let provider = FakeProvider::new(false);

        up(&provider, &settings).await.unwrap();

        assert_eq!(provider.ups.load(Ordering::SeqCst), 1);
        assert!(settings.provider_kubeconfig().exists());
        let canonical = std::fs::read_to_string(settings.canonical_kubeconfig()).unwrap();
        assert!(canonical.contains("current-context: fake"));
    }

    #[tokio::test]
    async fn test_down_removes_managed_copy() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let provider = FakeProvider::new(false);

        up(&provider, &settings).await.unwrap();
        assert!(settings.provider_kubeconfig().exists());

        down(&provider, &settings).await.unwrap();
        assert!(!settings.provider_kubeconfig().exists());
    }

    #[tokio::test]
    async fn test_down_failure_keeps_managed_copy() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);

        up(&FakeProvider::new(false), &settings).await.unwrap();

        let failing = FakeProvider::new(true);
        let result = down(&failing, &settings).await;
        assert!(result.is_err());
        assert!(settings.provider_kubeconfig().exists());
    }

    #[tokio::test]
    async fn test_restart_brings_up_even_when_down_fails() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let provider = FakeProvider::new(true);

        restart(&provider, &settings).await.unwrap();

        assert_eq!(provider.downs.load(Ordering::SeqCst), 1);
        assert_eq!(provider.ups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restart_order_down_then_up() {
        let dir = TempDir::new().unwrap();
        let settings = test_settings(&dir);
        let provider = FakeProvider::new(false);

        restart(&provider, &settings).await.unwrap();
        assert_eq!(provider.downs.load(Ordering::SeqCst), 1);
        assert_eq!(provider.ups.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_systemctl_args() {
        assert_eq!(systemctl_args("restart", "docker"), vec!["restart", "docker"]);
    }
}
