// Licensed under the Apache-2.0 license

//! The resolved register/interrupt model handed to code emission.
//!
//! ## Architecture Overview
//!
//! ```text
//! Model
//! ├── peripherals: Vec<Peripheral>          # in document order, groups resolved
//! ├── groups: Vec<RegisterGroup>            # one per distinct group name
//! │   └── registers: Vec<Register>          # unique names, first-seen order
//! │       └── fields: Vec<Field>            # unique names, document order
//! ├── interrupts: Vec<Interrupt>            # contiguous 0..=max, placeholders invalid
//! └── address_width: AddressWidth
//! ```
//!
//! Everything here is built once by [`crate::model::ModelBuilder`] and is
//! immutable afterwards.

use crate::error::{Location, Result, SvdError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// An address or address offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub u64);

impl Address {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Width of every address-sized integer in the generated output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressWidth {
    W8,
    W16,
    W32,
    W64,
}

impl AddressWidth {
    pub fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            8 => Some(AddressWidth::W8),
            16 => Some(AddressWidth::W16),
            32 => Some(AddressWidth::W32),
            64 => Some(AddressWidth::W64),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            AddressWidth::W8 => 8,
            AddressWidth::W16 => 16,
            AddressWidth::W32 => 32,
            AddressWidth::W64 => 64,
        }
    }

    pub fn rust_type(self) -> &'static str {
        match self {
            AddressWidth::W8 => "u8",
            AddressWidth::W16 => "u16",
            AddressWidth::W32 => "u32",
            AddressWidth::W64 => "u64",
        }
    }

    /// Largest value representable at this width.
    pub fn max_value(self) -> u64 {
        match self {
            AddressWidth::W64 => u64::MAX,
            w => (1u64 << w.bits()) - 1,
        }
    }
}

/// Software access mode of a register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl Access {
    /// Maps an `<access>` value. Unknown values return `None`.
    pub fn from_svd(text: &str) -> Option<Self> {
        match text.trim() {
            "read-only" => Some(Access::ReadOnly),
            "write-only" | "writeOnce" => Some(Access::WriteOnly),
            "read-write" | "read-writeOnce" => Some(Access::ReadWrite),
            _ => None,
        }
    }
}

/// A bit-field within a register.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub bit_offset: u64,
    pub bit_width: u64,
    pub description: Option<String>,
}

/// A register within a group. The address offset is relative to the base
/// address of every peripheral using the group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub name: String,
    pub address_offset: Address,
    pub access: Option<Access>,
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

/// Result of [`RegisterGroup::insert_or_verify`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Merge {
    /// The name was new and the entry was added.
    Inserted,
    /// The name was already present at the same position; the new entry was dropped.
    Repeated,
}

/// The register layout shared by one or more peripherals.
#[derive(Clone, Debug, Default)]
pub struct RegisterGroup {
    pub name: String,
    registers: Vec<Register>,
    index: HashMap<String, usize>,
}

impl RegisterGroup {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds `register` unless a register with the same name exists.
    ///
    /// A repeat at the same address offset is accepted and discarded (first
    /// seen wins). A repeat at a different offset is a
    /// [`SvdError::ConflictingRegisterAddress`] reported at `location`.
    pub fn insert_or_verify(&mut self, register: Register, location: &Location) -> Result<Merge> {
        match self.index.entry(register.name.clone()) {
            Entry::Occupied(entry) => {
                let existing = &self.registers[*entry.get()];
                if existing.address_offset == register.address_offset {
                    Ok(Merge::Repeated)
                } else {
                    Err(SvdError::ConflictingRegisterAddress {
                        location: location.clone(),
                        group: self.name.clone(),
                        register: register.name,
                        existing: existing.address_offset.to_string(),
                        conflicting: register.address_offset.to_string(),
                    })
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(self.registers.len());
                self.registers.push(register);
                Ok(Merge::Inserted)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Register> {
        self.index.get(name).map(|&i| &self.registers[i])
    }

    /// Registers in first-declared order.
    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}

/// A peripheral instance with its register group resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peripheral {
    pub name: String,
    pub group: String,
    /// Set when the group was borrowed through `derivedFrom`.
    pub derived_from: Option<String>,
    pub base_address: Address,
    pub description: Option<String>,
}

/// An interrupt vector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interrupt {
    pub name: String,
    pub number: u32,
    pub description: Option<String>,
    /// False for placeholders filling an unused vector slot.
    pub valid: bool,
}

pub const UNKNOWN_INTERRUPT_NAME: &str = "UNKNOWN";
pub const UNKNOWN_INTERRUPT_DESCRIPTION: &str = "Unknown interrupt";

impl Interrupt {
    pub fn placeholder(number: u32) -> Self {
        Self {
            name: UNKNOWN_INTERRUPT_NAME.to_string(),
            number,
            description: Some(UNKNOWN_INTERRUPT_DESCRIPTION.to_string()),
            valid: false,
        }
    }
}

/// The fully resolved model of a device.
#[derive(Clone, Debug)]
pub struct Model {
    pub device_name: Option<String>,
    pub peripherals: Vec<Peripheral>,
    pub groups: Vec<RegisterGroup>,
    pub interrupts: Vec<Interrupt>,
    pub address_width: AddressWidth,
}

impl Model {
    pub fn group(&self, name: &str) -> Option<&RegisterGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn peripheral(&self, name: &str) -> Option<&Peripheral> {
        self.peripherals.iter().find(|p| p.name == name)
    }

    /// Absolute address of `register` in `peripheral`: base address plus the
    /// group-relative offset.
    pub fn register_address(&self, peripheral: &str, register: &str) -> Option<u64> {
        let periph = self.peripheral(peripheral)?;
        let reg = self.group(&periph.group)?.get(register)?;
        periph
            .base_address
            .value()
            .checked_add(reg.address_offset.value())
    }
}
