pub mod addons;
pub mod cli;
pub mod config;
pub mod exec;
pub mod host;
pub mod kubeconfig;
pub mod provider;
