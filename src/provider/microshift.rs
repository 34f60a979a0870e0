//! MicroShift provider
//!
//! Runs the MicroShift all-in-one image as a single privileged container
//! under the configured engine (docker or podman). The kubeconfig lives
//! inside the container and is read out with `exec cat`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::exec;

use super::{Provider, ProviderError};

/// All-in-one image for local development
const MICROSHIFT_IMAGE: &str = "quay.io/microshift/microshift-aio:latest";

/// Kubeconfig location inside the container
const KUBECONFIG_IN_CONTAINER: &str = "/var/lib/microshift/resources/kubeadmin/kubeconfig";

#[derive(Debug)]
pub struct MicroshiftProvider;

#[async_trait]
impl Provider for MicroshiftProvider {
    fn name(&self) -> &'static str {
        "microshift"
    }

    async fn up(&self, settings: &Settings) -> Result<(), ProviderError> {
        let engine = &settings.container_engine;
        if container_exists(engine, &settings.cluster_name).await? {
            warn!(
                "container '{}' already exists, leaving it as is",
                settings.cluster_name
            );
            return Ok(());
        }

        info!(
            "starting microshift container '{}' via {}",
            settings.cluster_name, engine
        );
        let args = run_args(&settings.cluster_name, settings.registry_port);
        exec::run(engine, &args).await?;
        Ok(())
    }

    async fn down(&self, settings: &Settings) -> Result<(), ProviderError> {
        let engine = &settings.container_engine;
        info!("removing microshift container '{}'", settings.cluster_name);
        exec::run(engine, &remove_args(&settings.cluster_name)).await?;
        exec::run(engine, &volume_remove_args(&settings.cluster_name)).await?;
        Ok(())
    }

    async fn kubeconfig(&self, settings: &Settings) -> Result<PathBuf, ProviderError> {
        let engine = &settings.container_engine;
        let content = exec::run_capture(engine, &kubeconfig_cat_args(&settings.cluster_name)).await?;
        if content.trim().is_empty() {
            return Err(ProviderError::State(format!(
                "kubeconfig not yet written inside container '{}'",
                settings.cluster_name
            )));
        }
        let path =
            std::env::temp_dir().join(format!("microshift-{}-kubeconfig", settings.cluster_name));
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn describe(&self, settings: &Settings) -> String {
        format!(
            "provider: microshift\ncontainer name: {}\ncontainer engine: {}\nimage: {}\nregistry port: {}",
            settings.cluster_name, settings.container_engine, MICROSHIFT_IMAGE, settings.registry_port
        )
    }
}

/// Subset of `inspect` output we care about
#[derive(Debug, Deserialize)]
struct InspectEntry {
    #[serde(rename = "Id")]
    id: String,
}

/// Check whether the container exists, using `inspect` with JSON output.
/// A non-zero exit means "no such container" for both docker and podman.
async fn container_exists(engine: &str, name: &str) -> Result<bool, ProviderError> {
    match exec::run_capture(engine, &inspect_args(name)).await {
        Ok(out) => {
            let entries: Vec<InspectEntry> =
                serde_json::from_str(&out).unwrap_or_default();
            Ok(entries.iter().any(|e| !e.id.is_empty()))
        }
        Err(_) => Ok(false),
    }
}

/// Arguments for `docker|podman run` of the all-in-one container
pub fn run_args(name: &str, registry_port: u16) -> Vec<String> {
    vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        name.to_string(),
        "--privileged".to_string(),
        "-v".to_string(),
        format!("{name}-data:/var/lib"),
        "-p".to_string(),
        "6443:6443".to_string(),
        "-p".to_string(),
        format!("{registry_port}:{registry_port}"),
        MICROSHIFT_IMAGE.to_string(),
    ]
}

/// Arguments for force-removing the container
pub fn remove_args(name: &str) -> Vec<String> {
    vec!["rm".to_string(), "-f".to_string(), name.to_string()]
}

/// Arguments for removing the data volume
pub fn volume_remove_args(name: &str) -> Vec<String> {
    vec![
        "volume".to_string(),
        "rm".to_string(),
        "-f".to_string(),
        format!("{name}-data"),
    ]
}

/// Arguments for reading the kubeconfig out of the container
pub fn kubeconfig_cat_args(name: &str) -> Vec<String> {
    vec![
        "exec".to_string(),
        name.to_string(),
        "cat".to_string(),
        KUBECONFIG_IN_CONTAINER.to_string(),
    ]
}

/// Arguments for `inspect`; both docker and podman emit a JSON array
pub fn inspect_args(name: &str) -> Vec<String> {
    vec!["inspect".to_string(), name.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args() {
        let args = run_args("dev", 5001);
        assert!(args.contains(&"run".to_string()));
        assert!(args.contains(&"-d".to_string()));
        assert!(args.contains(&"--privileged".to_string()));
        assert!(args.contains(&"dev-data:/var/lib".to_string()));
        assert!(args.contains(&"6443:6443".to_string()));
        assert!(args.contains(&"5001:5001".to_string()));
        // Image must come last
        assert_eq!(args.last().unwrap(), MICROSHIFT_IMAGE);
    }

    #[test]
    fn test_remove_args() {
        assert_eq!(remove_args("dev"), vec!["rm", "-f", "dev"]);
    }

    #[test]
    fn test_volume_remove_args() {
        assert_eq!(
            volume_remove_args("dev"),
            vec!["volume", "rm", "-f", "dev-data"]
        );
    }

    #[test]
    fn test_kubeconfig_cat_args() {
        let args = kubeconfig_cat_args("dev");
        assert_eq!(args[0], "exec");
        assert_eq!(args[1], "dev");
        assert_eq!(args[2], "cat");
        assert_eq!(args[3], KUBECONFIG_IN_CONTAINER);
    }

    #[test]
    fn test_inspect_args() {
        assert_eq!(inspect_args("dev"), vec!["inspect", "dev"]);
    }
}
