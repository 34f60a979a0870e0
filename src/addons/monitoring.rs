//! Monitoring add-on: Prometheus operator, optionally Grafana
//!
//! Grafana is useless without something scraping metrics, so enabling it
//! pulls the operator in even when `INSTALL_PROMETHEUS` is off.

use tracing::info;

use crate::config::Settings;
use crate::exec;

use super::{apply_args, AddonError};

/// Prometheus operator bundle manifest
pub const PROMETHEUS_OPERATOR_URL: &str =
    "https://github.com/prometheus-operator/prometheus-operator/releases/latest/download/bundle.yaml";

/// Grafana all-in-one manifest
pub const GRAFANA_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/grafana/grafana/main/devenv/kubernetes/grafana.yaml";

/// Monitoring components to deploy, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringComponent {
    PrometheusOperator,
    Grafana,
}

/// Resolve which components the two flags select. Grafana implies the
/// operator; both flags unset means nothing is deployed.
pub fn monitoring_components(prometheus: bool, grafana: bool) -> Vec<MonitoringComponent> {
    let mut components = Vec::new();
    if prometheus || grafana {
        components.push(MonitoringComponent::PrometheusOperator);
    }
    if grafana {
        components.push(MonitoringComponent::Grafana);
    }
    components
}

/// Deploy the selected monitoring components.
pub async fn deploy(settings: &Settings) -> Result<(), AddonError> {
    for component in monitoring_components(settings.prometheus, settings.grafana) {
        match component {
            MonitoringComponent::PrometheusOperator => {
                info!("deploying prometheus operator");
                // Server-side apply: the bundle's CRDs exceed the annotation
                // size limit of client-side apply
                exec::run("kubectl", &apply_args(PROMETHEUS_OPERATOR_URL, true)).await?;
            }
            MonitoringComponent::Grafana => {
                info!("deploying grafana");
                exec::run("kubectl", &apply_args(GRAFANA_MANIFEST_URL, false)).await?;
            }
        }
    }
    Ok(())
}
