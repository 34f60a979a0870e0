//! Configuration summary printed before cluster operations.
//! Pure functions returning formatted strings; printing is the caller's job.

use crate::config::Settings;

/// Format the run configuration together with the provider's own summary.
pub fn format_summary(settings: &Settings, provider_summary: &str) -> String {
    let mut output = String::new();

    output.push_str("kubedev configuration:\n");
    output.push_str(&format!("  provider:          {}\n", settings.provider));
    output.push_str(&format!("  cluster name:      {}\n", settings.cluster_name));
    output.push_str(&format!(
        "  container engine:  {}\n",
        settings.container_engine
    ));
    output.push_str(&format!(
        "  kubeconfig dir:    {}\n",
        settings.kubeconfig_dir.display()
    ));
    output.push_str(&format!(
        "  kubeconfig file:   {}\n",
        settings.kubeconfig_name
    ));
    output.push_str(&format!("  registry port:     {}\n", settings.registry_port));
    output.push_str(&format!(
        "  add-ons:           {}\n",
        format_addons(settings)
    ));

    output.push('\n');
    for line in provider_summary.lines() {
        output.push_str(&format!("  {line}\n"));
    }

    output
}

fn format_addons(settings: &Settings) -> String {
    let mut addons = Vec::new();
    if settings.prometheus {
        addons.push("prometheus");
    }
    if settings.grafana {
        addons.push("grafana");
    }
    if settings.tekton {
        addons.push("tekton");
    }
    if addons.is_empty() {
        "none".to_string()
    } else {
        addons.join(", ")
    }
}
