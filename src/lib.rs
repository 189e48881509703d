//! Core library for the triage-etl command line application.
//!
//! The library turns the disaster response message exports into a single
//! SQLite table. IO adapters live under [`triage::etl::io`], the tabular
//! representation inside [`triage::etl::model`], the id join in
//! [`triage::etl::merge`], the category expansion and deduplication in
//! [`triage::etl::clean`], and the load → clean → save orchestration under
//! [`triage::etl::pipeline`].

pub mod triage;

pub use triage::etl::{Result, ToolError, clean, error, io, merge, model, pipeline, telemetry};
