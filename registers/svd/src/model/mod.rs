// Licensed under the Apache-2.0 license

//! Construction of the resolved [`Model`] from a peripheral description.
//!
//! The document is walked once, top to bottom:
//!
//! ```text
//! <device>                       width -> AddressWidth
//! └── <peripheral> (each)        PeripheralDecl (owned group or derivedFrom)
//!     ├── <interrupt> (each)     InterruptTable::collect
//!     └── <register> (each)      dim expansion + fields, merged into the group
//! then: link_aliases -> InterruptTable::reconcile -> Model
//! ```
//!
//! The implementation is split across submodules:
//! - `xml`: accessors over `roxmltree` nodes
//! - `dim`: expansion of dimensioned registers and fields
//! - `register`: register and field building, group merging
//! - `interrupt`: interrupt collection and vector table reconciliation
//! - `peripheral`: peripheral declarations and alias linking

mod dim;
mod interrupt;
mod peripheral;
mod register;
mod xml;

pub use interrupt::InterruptTable;
pub use peripheral::{PeripheralDecl, PeripheralKind};

use crate::error::{Location, Result, SvdError};
use crate::types::{AddressWidth, Model, RegisterGroup};
use crate::util::parse_scalar;
use log::{debug, info, warn};
use std::collections::HashMap;
use xml::XmlNode;

/// Compilation context threaded through the single pass over a document
/// and consumed once the pass completes.
#[derive(Debug)]
pub struct ModelBuilder {
    device_name: Option<String>,
    address_width: AddressWidth,
    peripherals: Vec<PeripheralDecl>,
    groups: Vec<RegisterGroup>,
    group_index: HashMap<String, usize>,
    interrupts: InterruptTable,
}

impl ModelBuilder {
    /// Builds the model of a parsed document, failing on the first error.
    pub fn build(doc: &roxmltree::Document) -> Result<Model> {
        let device = XmlNode(doc.root_element());
        let mut builder = Self::new(&device)?;
        for (i, node) in device.nested("peripherals", "peripheral").iter().enumerate() {
            builder.add_peripheral(node, &Location::new().child("peripheral", i, None))?;
        }
        builder.finish()
    }

    fn new(device: &XmlNode) -> Result<Self> {
        let width = device
            .maybe_text("width")
            .ok_or(SvdError::MissingAddressWidth)?;
        let address_width = parse_scalar(width)
            .and_then(AddressWidth::from_bits)
            .ok_or_else(|| SvdError::InvalidAddressWidth(width.to_string()))?;
        Ok(Self {
            device_name: device.maybe_text("name").map(str::to_string),
            address_width,
            peripherals: Vec::new(),
            groups: Vec::new(),
            group_index: HashMap::new(),
            interrupts: InterruptTable::new(),
        })
    }

    fn add_peripheral(&mut self, node: &XmlNode, location: &Location) -> Result<()> {
        let decl = PeripheralDecl::from_node(node, location)?;
        let location = location.clone().named(&decl.name);
        debug!("{location}: base address {}", decl.base_address);

        self.interrupts.collect(node, &location)?;

        let registers = node.nested("registers", "register");
        match decl.group() {
            Some(group) => {
                let group = self.group_mut(group);
                for (i, reg_node) in registers.iter().enumerate() {
                    let reg_location = location.child("register", i, None);
                    register::merge_registers(group, reg_node, &reg_location)?;
                }
            }
            None if !registers.is_empty() => {
                debug!("{location}: derived peripheral, own registers ignored");
            }
            None => {}
        }
        for cluster in node.nested("registers", "cluster") {
            warn!(
                "{location}: cluster {} not supported, skipped",
                cluster.maybe_text("name").unwrap_or("<unnamed>")
            );
        }

        self.peripherals.push(decl);
        Ok(())
    }

    /// The group named `name`, created empty on first use.
    fn group_mut(&mut self, name: &str) -> &mut RegisterGroup {
        let idx = match self.group_index.get(name) {
            Some(&idx) => idx,
            None => {
                self.groups.push(RegisterGroup::new(name));
                self.group_index.insert(name.to_string(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        &mut self.groups[idx]
    }

    /// Links aliases and reconciles the interrupt table.
    fn finish(self) -> Result<Model> {
        let peripherals = peripheral::link_aliases(self.peripherals)?;
        let interrupts = self.interrupts.reconcile();
        info!(
            "compiled {} peripherals, {} register groups, {} interrupt vectors",
            peripherals.len(),
            self.groups.len(),
            interrupts.len()
        );
        Ok(Model {
            device_name: self.device_name,
            peripherals,
            groups: self.groups,
            interrupts,
            address_width: self.address_width,
        })
    }
}
