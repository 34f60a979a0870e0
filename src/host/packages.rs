//! OS package installation
//!
//! The package family is detected by file existence, matching the shell
//! version: a Debian marker file means apt, anything else is assumed yum.

use std::path::Path;

use tracing::info;

use crate::exec;

use super::HostError;

const DEBIAN_MARKER: &str = "/etc/debian_version";

/// Package manager family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Yum,
}

impl PackageManager {
    /// Detect the family for this host.
    pub fn detect() -> Self {
        Self::detect_from(Path::new(DEBIAN_MARKER))
    }

    /// Detection seam for tests.
    pub fn detect_from(debian_marker: &Path) -> Self {
        if debian_marker.exists() {
            PackageManager::Apt
        } else {
            PackageManager::Yum
        }
    }

    /// The command to invoke
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Apt => "apt-get",
            PackageManager::Yum => "yum",
        }
    }

    /// Arguments for a non-interactive install of the given packages
    pub fn install_args(&self, packages: &[String]) -> Vec<String> {
        let mut args = vec!["install".to_string(), "-y".to_string()];
        args.extend(packages.iter().cloned());
        args
    }
}

/// Kernel header package for the running kernel
pub fn kernel_header_packages(pm: PackageManager, kernel_release: &str) -> Vec<String> {
    match pm {
        PackageManager::Apt => vec![format!("linux-headers-{kernel_release}")],
        PackageManager::Yum => vec![format!("kernel-devel-{kernel_release}")],
    }
}

/// Build dependencies for the libbpf source build
pub fn libbpf_build_packages(pm: PackageManager) -> Vec<String> {
    let packages: &[&str] = match pm {
        PackageManager::Apt => &["clang", "llvm", "libelf-dev", "make", "gcc", "pkg-config"],
        PackageManager::Yum => &["clang", "llvm", "elfutils-libelf-devel", "make", "gcc", "pkgconf"],
    };
    packages.iter().map(|p| p.to_string()).collect()
}

/// Package set for a container engine
pub fn engine_packages(pm: PackageManager, engine: &str) -> Result<Vec<String>, HostError> {
    let packages: &[&str] = match (pm, engine) {
        (PackageManager::Apt, "docker") => &["docker.io"],
        (PackageManager::Yum, "docker") => &["docker"],
        (_, "podman") => &["podman"],
        (_, other) => return Err(HostError::UnsupportedEngine(other.to_string())),
    };
    Ok(packages.iter().map(|p| p.to_string()).collect())
}

/// Install the given packages with the detected package manager.
pub async fn install(pm: PackageManager, packages: &[String]) -> Result<(), HostError> {
    info!("installing packages: {}", packages.join(" "));
    exec::run(pm.command(), &pm.install_args(packages)).await?;
    Ok(())
}

/// Install kernel headers for the running kernel (`uname -r`).
pub async fn install_kernel_headers(pm: PackageManager) -> Result<(), HostError> {
    let release = exec::run_capture("uname", &["-r".to_string()]).await?;
    let packages = kernel_header_packages(pm, release.trim());
    install(pm, &packages).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_from_marker() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("debian_version");
        assert_eq!(PackageManager::detect_from(&marker), PackageManager::Yum);

        std::fs::write(&marker, "12.5").unwrap();
        assert_eq!(PackageManager::detect_from(&marker), PackageManager::Apt);
    }

    #[test]
    fn test_install_args() {
        let args = PackageManager::Apt.install_args(&["clang".to_string(), "llvm".to_string()]);
        assert_eq!(args, vec!["install", "-y", "clang", "llvm"]);
    }

    #[test]
    fn test_kernel_header_packages() {
        assert_eq!(
            kernel_header_packages(PackageManager::Apt, "6.8.0-41-generic"),
            vec!["linux-headers-6.8.0-41-generic"]
        );
        assert_eq!(
            kernel_header_packages(PackageManager::Yum, "5.14.0-427.el9.x86_64"),
            vec!["kernel-devel-5.14.0-427.el9.x86_64"]
        );
    }

    #[test]
    fn test_libbpf_build_packages_differ_by_family() {
        let apt = libbpf_build_packages(PackageManager::Apt);
        let yum = libbpf_build_packages(PackageManager::Yum);
        assert!(apt.contains(&"libelf-dev".to_string()));
        assert!(yum.contains(&"elfutils-libelf-devel".to_string()));
        assert!(apt.contains(&"clang".to_string()));
        assert!(yum.contains(&"clang".to_string()));
    }

    #[test]
    fn test_engine_packages() {
        assert_eq!(
            engine_packages(PackageManager::Apt, "docker").unwrap(),
            vec!["docker.io"]
        );
        assert_eq!(
            engine_packages(PackageManager::Yum, "docker").unwrap(),
            vec!["docker"]
        );
        assert_eq!(
            engine_packages(PackageManager::Apt, "podman").unwrap(),
            vec!["podman"]
        );
    }

    #[test]
    fn test_engine_packages_unsupported() {
        let err = engine_packages(PackageManager::Apt, "containerd").unwrap_err();
        assert!(matches!(err, HostError::UnsupportedEngine(_)));
    }
}
