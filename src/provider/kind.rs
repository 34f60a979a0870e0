//! kind provider
//!
//! Drives the `kind` CLI. The cluster config is rendered with an extra port
//! mapping so a local image registry on the host is reachable from inside
//! the cluster nodes.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::config::Settings;
use crate::exec;

use super::{Provider, ProviderError};

/// Timeout passed to `kind create cluster --wait`
const CREATE_WAIT: &str = "120s";

#[derive(Debug)]
pub struct KindProvider;

#[async_trait]
impl Provider for KindProvider {
    fn name(&self) -> &'static str {
        "kind"
    }

    async fn up(&self, settings: &Settings) -> Result<(), ProviderError> {
        let config = render_cluster_config(&settings.cluster_name, settings.registry_port);
        let config_path = std::env::temp_dir().join(format!("kind-{}.yaml", settings.cluster_name));
        std::fs::write(&config_path, config)?;

        info!("creating kind cluster '{}'", settings.cluster_name);
        let args = create_cluster_args(&settings.cluster_name, &config_path.to_string_lossy());
        exec::run("kind", &args).await?;

        let _ = std::fs::remove_file(&config_path);
        Ok(())
    }

    async fn down(&self, settings: &Settings) -> Result<(), ProviderError> {
        info!("deleting kind cluster '{}'", settings.cluster_name);
        exec::run("kind", &delete_cluster_args(&settings.cluster_name)).await?;
        Ok(())
    }

    async fn kubeconfig(&self, settings: &Settings) -> Result<PathBuf, ProviderError> {
        let content = exec::run_capture("kind", &kubeconfig_args(&settings.cluster_name)).await?;
        if content.trim().is_empty() {
            return Err(ProviderError::State(format!(
                "kind returned an empty kubeconfig for cluster '{}'",
                settings.cluster_name
            )));
        }
        let path = std::env::temp_dir().join(format!("kind-{}-kubeconfig", settings.cluster_name));
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn describe(&self, settings: &Settings) -> String {
        format!(
            "provider: kind\ncluster name: {}\nregistry port: {}",
            settings.cluster_name, settings.registry_port
        )
    }
}

/// Render a kind cluster config with the registry port mapped to the host.
pub fn render_cluster_config(cluster_name: &str, registry_port: u16) -> String {
    format!(
        "kind: Cluster\n\
         apiVersion: kind.x-k8s.io/v1alpha4\n\
         name: {cluster_name}\n\
         nodes:\n\
         - role: control-plane\n\
         \x20 extraPortMappings:\n\
         \x20 - containerPort: {registry_port}\n\
         \x20   hostPort: {registry_port}\n\
         \x20   protocol: TCP\n"
    )
}

/// Arguments for `kind create cluster`
pub fn create_cluster_args(cluster_name: &str, config_path: &str) -> Vec<String> {
    vec![
        "create".to_string(),
        "cluster".to_string(),
        "--name".to_string(),
        cluster_name.to_string(),
        "--config".to_string(),
        config_path.to_string(),
        "--wait".to_string(),
        CREATE_WAIT.to_string(),
    ]
}

/// Arguments for `kind delete cluster`
pub fn delete_cluster_args(cluster_name: &str) -> Vec<String> {
    vec![
        "delete".to_string(),
        "cluster".to_string(),
        "--name".to_string(),
        cluster_name.to_string(),
    ]
}

/// Arguments for `kind get kubeconfig`
pub fn kubeconfig_args(cluster_name: &str) -> Vec<String> {
    vec![
        "get".to_string(),
        "kubeconfig".to_string(),
        "--name".to_string(),
        cluster_name.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_cluster_config() {
        let config = render_cluster_config("dev", 5001);
        assert!(config.contains("apiVersion: kind.x-k8s.io/v1alpha4"));
        assert!(config.contains("name: dev"));
        assert!(config.contains("containerPort: 5001"));
        assert!(config.contains("hostPort: 5001"));

        // Must be well-formed YAML with the expected shape
        let parsed: serde_yaml::Value = serde_yaml::from_str(&config).unwrap();
        assert_eq!(parsed["kind"], "Cluster");
        assert_eq!(parsed["nodes"][0]["role"], "control-plane");
        assert_eq!(
            parsed["nodes"][0]["extraPortMappings"][0]["containerPort"],
            serde_yaml::Value::from(5001)
        );
    }

    #[test]
    fn test_create_cluster_args() {
        let args = create_cluster_args("dev", "/tmp/kind-dev.yaml");
        assert_eq!(
            args,
            vec![
                "create",
                "cluster",
                "--name",
                "dev",
                "--config",
                "/tmp/kind-dev.yaml",
                "--wait",
                "120s"
            ]
        );
    }

    #[test]
    fn test_delete_cluster_args() {
        assert_eq!(
            delete_cluster_args("dev"),
            vec!["delete", "cluster", "--name", "dev"]
        );
    }

    #[test]
    fn test_kubeconfig_args() {
        assert_eq!(
            kubeconfig_args("dev"),
            vec!["get", "kubeconfig", "--name", "dev"]
        );
    }
}
