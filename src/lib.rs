pub mod api;
pub mod config;
pub mod domain;
pub mod harness;
pub mod repo;
pub mod service;
pub mod telemetry;
