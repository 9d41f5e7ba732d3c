// Licensed under the Apache-2.0 license

//! Configuration for code emission.
//!
//! [`FilterConfig`] selects which peripherals are emitted and
//! [`OutputConfig`] controls the optional parts of the generated file. The
//! model itself is always built and checked in full; these settings only
//! affect what is written out.

/// Configuration for which peripherals are emitted.
///
/// # Example
///
/// ```
/// use mcu_registers_svd::config::FilterConfig;
///
/// // Only emit the GPIO ports
/// let config = FilterConfig::new()
///     .include_peripheral("GPIOA")
///     .include_peripheral("GPIOB");
/// assert!(config.should_include("gpioa"));
/// assert!(!config.should_include("RCC"));
///
/// // Emit everything except the debug block
/// let config = FilterConfig::new().exclude_peripheral("DBGMCU");
/// assert!(!config.should_include("DBGMCU"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FilterConfig {
    /// Only emit peripherals with these names (case-insensitive).
    /// If empty, all peripherals are emitted (subject to exclusions).
    pub include_peripherals: Vec<String>,

    /// Never emit peripherals with these names (case-insensitive).
    pub exclude_peripherals: Vec<String>,
}

impl FilterConfig {
    /// Create a new FilterConfig with no filtering (everything included).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_peripheral(mut self, name: &str) -> Self {
        self.include_peripherals.push(name.to_lowercase());
        self
    }

    pub fn exclude_peripheral(mut self, name: &str) -> Self {
        self.exclude_peripherals.push(name.to_lowercase());
        self
    }

    /// Returns true if this filter has no constraints (everything passes).
    pub fn is_empty(&self) -> bool {
        self.include_peripherals.is_empty() && self.exclude_peripherals.is_empty()
    }

    /// Check whether the peripheral named `name` should be emitted.
    pub fn should_include(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        if self.exclude_peripherals.iter().any(|n| *n == name_lower) {
            return false;
        }
        self.include_peripherals.is_empty()
            || self.include_peripherals.iter().any(|n| *n == name_lower)
    }
}

/// Options for the generated source file.
#[derive(Clone, Debug)]
pub struct OutputConfig {
    /// Emit the `groups` module with group-relative register offsets.
    pub emit_groups: bool,
    /// Emit descriptions as doc comments.
    pub emit_descriptions: bool,
    pub filter: FilterConfig,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            emit_groups: true,
            emit_descriptions: true,
            filter: FilterConfig::new(),
        }
    }
}

impl OutputConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_groups(mut self, emit: bool) -> Self {
        self.emit_groups = emit;
        self
    }

    pub fn emit_descriptions(mut self, emit: bool) -> Self {
        self.emit_descriptions = emit;
        self
    }

    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }
}
