//! libbpf source build
//!
//! Clones a fixed tag shallowly, builds and installs from `src/`, and
//! removes the checkout afterwards. On failure the checkout is kept so the
//! build log can be inspected.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::exec;

use super::packages::{self, PackageManager};
use super::HostError;

/// Upstream repository
pub const LIBBPF_REPO: &str = "https://github.com/libbpf/libbpf.git";

/// Arguments for a shallow clone of one tag
pub fn clone_args(tag: &str, dest: &Path) -> Vec<String> {
    vec![
        "clone".to_string(),
        "--depth".to_string(),
        "1".to_string(),
        "--branch".to_string(),
        tag.to_string(),
        LIBBPF_REPO.to_string(),
        dest.to_string_lossy().into_owned(),
    ]
}

/// Arguments for `make -C <checkout>/src [install]`
pub fn make_args(checkout: &Path, install: bool) -> Vec<String> {
    let mut args = vec![
        "-C".to_string(),
        checkout.join("src").to_string_lossy().into_owned(),
    ];
    if install {
        args.push("install".to_string());
    }
    args
}

/// Temp checkout directory for a given tag
pub fn checkout_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("libbpf-{tag}"))
}

/// Install build dependencies, then clone, build and install libbpf.
pub async fn install(pm: PackageManager, tag: &str) -> Result<(), HostError> {
    packages::install(pm, &packages::libbpf_build_packages(pm)).await?;

    let checkout = checkout_dir(tag);
    if checkout.exists() {
        std::fs::remove_dir_all(&checkout)?;
    }

    info!("building libbpf {tag}");
    exec::run("git", &clone_args(tag, &checkout)).await?;
    exec::run("make", &make_args(&checkout, false)).await?;
    exec::run("make", &make_args(&checkout, true)).await?;

    std::fs::remove_dir_all(&checkout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_args() {
        let args = clone_args("v1.4.3", Path::new("/tmp/libbpf-v1.4.3"));
        assert_eq!(
            args,
            vec![
                "clone",
                "--depth",
                "1",
                "--branch",
                "v1.4.3",
                LIBBPF_REPO,
                "/tmp/libbpf-v1.4.3"
            ]
        );
    }

    #[test]
    fn test_make_args() {
        assert_eq!(
            make_args(Path::new("/tmp/libbpf-v1.4.3"), false),
            vec!["-C", "/tmp/libbpf-v1.4.3/src"]
        );
        assert_eq!(
            make_args(Path::new("/tmp/libbpf-v1.4.3"), true),
            vec!["-C", "/tmp/libbpf-v1.4.3/src", "install"]
        );
    }

    #[test]
    fn test_checkout_dir_includes_tag() {
        let dir = checkout_dir("v1.4.3");
        assert!(dir.to_string_lossy().contains("libbpf-v1.4.3"));
    }
}
