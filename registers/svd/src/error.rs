// Licensed under the Apache-2.0 license

//! Errors produced while compiling a peripheral description.
//!
//! Every error is fatal: compilation stops at the first one and no partial
//! model is returned. Positional errors carry a [`Location`] naming the
//! offending node and its index inside its parent.

use std::fmt;
use thiserror::Error;

/// Path from a peripheral down to the node an error refers to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    segments: Vec<Segment>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Segment {
    kind: &'static str,
    index: usize,
    name: Option<String>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of this location extended by one node.
    pub fn child(&self, kind: &'static str, index: usize, name: Option<&str>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment {
            kind,
            index,
            name: name.map(str::to_string),
        });
        Self { segments }
    }

    /// Sets the name of the innermost node once it is known.
    pub fn named(mut self, name: &str) -> Self {
        if let Some(last) = self.segments.last_mut() {
            last.name = Some(name.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "device");
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if i != 0 {
                write!(f, " > ")?;
            }
            write!(f, "{} #{}", seg.kind, seg.index)?;
            if let Some(name) = &seg.name {
                write!(f, " ({name})")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SvdError {
    #[error("{location}: invalid name `{name}`, only [A-Za-z0-9_] is allowed")]
    InvalidName { location: Location, name: String },

    #[error("{location}: missing required `{attribute}`")]
    MissingRequiredAttribute {
        location: Location,
        attribute: &'static str,
    },

    #[error("{location}: malformed dimension `{value}`: {reason}")]
    MalformedDimension {
        location: Location,
        value: String,
        reason: &'static str,
    },

    #[error("{location}: dimension declares {declared} elements but `{index}` lists {found}")]
    DimensionMismatch {
        location: Location,
        declared: u64,
        index: String,
        found: usize,
    },

    #[error("{location}: register {register} in group {group} declared at {existing} and at {conflicting}")]
    ConflictingRegisterAddress {
        location: Location,
        group: String,
        register: String,
        existing: String,
        conflicting: String,
    },

    #[error("{location}: field {field} redeclared at bits {conflicting} (first declared at bits {existing})")]
    ConflictingField {
        location: Location,
        field: String,
        existing: String,
        conflicting: String,
    },

    #[error("{location}: interrupt {name} declared with number {existing} and {conflicting}")]
    ConflictingInterruptNumber {
        location: Location,
        name: String,
        existing: u32,
        conflicting: u32,
    },

    #[error("{location}: interrupt is missing `{attribute}`")]
    MissingInterruptField {
        location: Location,
        attribute: &'static str,
    },

    #[error("{location}: interrupt number `{value}` is not a non-negative integer")]
    InvalidInterruptNumber { location: Location, value: String },

    #[error("{location}: `{attribute}` value `{value}` is not a number")]
    InvalidNumber {
        location: Location,
        attribute: &'static str,
        value: String,
    },

    #[error("peripheral {peripheral} is derived from unknown peripheral {derived_from}")]
    UnresolvedDerivedPeripheral {
        peripheral: String,
        derived_from: String,
    },

    #[error("peripheral {peripheral} has a circular derivedFrom chain: {chain}")]
    CircularDerivation { peripheral: String, chain: String },

    #[error("device does not declare an address width")]
    MissingAddressWidth,

    #[error("address width `{0}` is not one of 8, 16, 32 or 64")]
    InvalidAddressWidth(String),

    #[error("malformed document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SvdError>;
