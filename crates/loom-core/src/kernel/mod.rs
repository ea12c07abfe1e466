//! # Loom Core Kernel
//!
//! Startup orchestration: the plugin pipeline followed by convention loads
//! over the resulting load units.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`Bootstrap`](bootstrap::Bootstrap) runs aggregation,
//!   path lookup, metadata merge, environment filtering and sequencing, then
//!   exposes the ordered [`LoadUnit`](bootstrap::LoadUnit)s.
//! - **Options**: [`BootOptions`](bootstrap::BootOptions), built in code or
//!   from the `LOOM_*` environment variables.
//! - **Core Constants**: directory names, file stems and variable names in
//!   the `constants` submodule.
//! - **Error Handling**: [`Error`](error::Error) wraps every subsystem error,
//!   with a `Result` type alias.
pub mod bootstrap;
pub mod constants;
pub mod error;

pub use bootstrap::{BootOptions, Bootstrap, LoadUnit, UnitKind};
pub use error::{Error, Result};
