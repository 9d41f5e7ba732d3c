// Licensed under the Apache-2.0 license

//! SVD peripheral description to Rust constants compiler.
//!
//! This crate reads a CMSIS-SVD style device description, resolves it into a
//! checked [`Model`] (register groups shared between peripherals, expanded
//! register arrays, a contiguous interrupt table) and emits flat Rust
//! constants for register addresses, field bit offsets and interrupt numbers.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use mcu_registers_svd::{compile_file, generate_from_file, FilterConfig, OutputConfig};
//!
//! // Build the model and query it
//! let model = compile_file(Path::new("stm32f411.svd")).unwrap();
//! let moder = model.register_address("GPIOA", "MODER");
//!
//! // Or generate code for a subset of peripherals
//! let config = OutputConfig::new()
//!     .filter(FilterConfig::new().exclude_peripheral("DBGMCU"));
//! let code = generate_from_file(Path::new("stm32f411.svd"), &config).unwrap();
//! ```
//!
//! ## Module Organization
//!
//! - [`error`]: [`SvdError`] and the location path attached to it
//! - [`util`]: Name validation, description cleanup and name conversion
//! - [`config`]: Emission options ([`OutputConfig`], [`FilterConfig`])
//! - [`types`]: The resolved model
//! - [`model`]: Building the model from a parsed document
//! - [`output`]: Code generation from the model

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod types;
pub mod util;

use std::path::Path;

pub use config::{FilterConfig, OutputConfig};
pub use error::{Location, Result, SvdError};
pub use model::ModelBuilder;
pub use types::{
    Access, Address, AddressWidth, Field, Interrupt, Model, Peripheral, Register, RegisterGroup,
};

/// Compile the description held in `text`.
pub fn compile_str(text: &str) -> Result<Model> {
    let doc = roxmltree::Document::parse(text)?;
    ModelBuilder::build(&doc)
}

/// Compile the description stored at `path`.
pub fn compile_file(path: &Path) -> Result<Model> {
    let text = std::fs::read_to_string(path).map_err(|source| SvdError::Io {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("compiling {}", path.display());
    compile_str(&text)
}

/// Compile the description stored at `path` and generate Rust code for it.
pub fn generate_from_file(path: &Path, config: &OutputConfig) -> Result<String> {
    Ok(compile_file(path)?.generate_code(config))
}
