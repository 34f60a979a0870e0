//! Optional cluster add-ons deployed after bring-up
//!
//! All deployment goes through `kubectl` against the merged kubeconfig.

use thiserror::Error;

use crate::exec::ExecError;

pub mod monitoring;
pub mod tekton;

/// Errors that can occur while deploying add-ons
#[derive(Error, Debug)]
pub enum AddonError {
    #[error("command failed: {0}")]
    Exec(#[from] ExecError),
}

/// Arguments for `kubectl apply -f <manifest>`
pub fn apply_args(manifest_url: &str, server_side: bool) -> Vec<String> {
    let mut args = vec!["apply".to_string()];
    if server_side {
        args.push("--server-side".to_string());
    }
    args.push("-f".to_string());
    args.push(manifest_url.to_string());
    args
}

/// Arguments for waiting until every deployment in a namespace is available
pub fn wait_ready_args(namespace: &str, timeout: &str) -> Vec<String> {
    vec![
        "wait".to_string(),
        "--namespace".to_string(),
        namespace.to_string(),
        "--for=condition=Available".to_string(),
        "deployment".to_string(),
        "--all".to_string(),
        format!("--timeout={timeout}"),
    ]
}
