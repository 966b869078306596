// src/config/mod.rs
//! Service configuration: feed sources, text suggestion knobs and poster defaults.

pub mod app;

pub use app::{
    AppConfig, FetchConfig, PosterConfig, SourceConfig, TextConfig, DEFAULT_CONFIG_PATH,
    ENV_CONFIG_PATH,
};
