pub mod clean;
pub mod error;
pub mod io;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod telemetry;

pub use error::{Result, ToolError};
