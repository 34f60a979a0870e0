//! Tekton CI add-on
//!
//! Applies the released pipeline manifest and blocks until the workloads in
//! both Tekton namespaces report available.

use tracing::info;

use crate::exec;

use super::{apply_args, wait_ready_args, AddonError};

/// Tekton pipelines release manifest
pub const TEKTON_RELEASE_URL: &str =
    "https://storage.googleapis.com/tekton-releases/pipeline/latest/release.yaml";

/// Namespaces whose workloads must become ready after install
pub const TEKTON_NAMESPACES: [&str; 2] = ["tekton-pipelines", "tekton-pipelines-resolvers"];

/// Rollout wait timeout per namespace
const READY_TIMEOUT: &str = "120s";

/// Deploy Tekton and wait for its namespaces to settle.
pub async fn deploy() -> Result<(), AddonError> {
    info!("deploying tekton pipelines");
    exec::run("kubectl", &apply_args(TEKTON_RELEASE_URL, false)).await?;

    for namespace in TEKTON_NAMESPACES {
        info!("waiting for workloads in {namespace}");
        exec::run("kubectl", &wait_ready_args(namespace, READY_TIMEOUT)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tekton_namespaces() {
        assert_eq!(
            TEKTON_NAMESPACES,
            ["tekton-pipelines", "tekton-pipelines-resolvers"]
        );
    }
}
