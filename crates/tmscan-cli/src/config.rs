//! Configuration for the `detect` command: TOML file contents, `--set`
//! overrides and CLI flags merged into one [`models::AppConfig`].

pub mod builder;
pub mod file;
pub mod models;

pub use builder::build_config;
