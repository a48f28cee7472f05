//! Object Dictionary Generator
//!
//! Lowers a declarative object dictionary specification into a frozen
//! in-memory model and emits the firmware-side C runtime, a typed host
//! client, a machine-readable database and a reference document from it.

pub mod cmds;
pub mod codegen;
pub mod loader;
pub mod od;
pub mod schema;

pub use loader::{LoadedSpec, SpecDocument};
pub use od::context::ModelContext;
pub use od::error::{OdError, OdResult};
