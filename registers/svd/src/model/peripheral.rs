// Licensed under the Apache-2.0 license

//! Peripheral declarations and `derivedFrom` resolution.

use super::xml::XmlNode;
use crate::error::{Location, Result, SvdError};
use crate::types::{Address, Peripheral};
use crate::util::{normalize_description, validate_name};
use log::debug;
use std::collections::HashMap;

/// How a peripheral obtains its register group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeripheralKind {
    /// Declares (or contributes to) the named group.
    Owned { group: String },
    /// Reuses the group of another peripheral.
    Derived { from: String },
}

/// A peripheral as declared, before aliases are linked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeripheralDecl {
    pub name: String,
    pub kind: PeripheralKind,
    pub base_address: Address,
    pub description: Option<String>,
}

impl PeripheralDecl {
    /// Reads name, base address, description and group status of `node`.
    ///
    /// `derivedFrom` wins over `<groupName>`; a peripheral with neither
    /// forms a group named after itself.
    pub(crate) fn from_node(node: &XmlNode, location: &Location) -> Result<Self> {
        let name = node.text("name", location)?;
        let location = location.clone().named(name);
        validate_name(name, &location)?;
        let base_address = Address(node.address("baseAddress", &location)?);

        let kind = match (node.attribute("derivedFrom"), node.maybe_text("groupName")) {
            (Some(from), _) => PeripheralKind::Derived {
                from: from.to_string(),
            },
            (None, Some(group)) => {
                validate_name(group, &location)?;
                PeripheralKind::Owned {
                    group: group.to_string(),
                }
            }
            (None, None) => PeripheralKind::Owned {
                group: name.to_string(),
            },
        };

        Ok(Self {
            name: name.to_string(),
            kind,
            base_address,
            description: normalize_description(node.maybe_text("description")),
        })
    }

    pub fn group(&self) -> Option<&str> {
        match &self.kind {
            PeripheralKind::Owned { group } => Some(group),
            PeripheralKind::Derived { .. } => None,
        }
    }
}

/// Resolves the group of every peripheral, following `derivedFrom` chains.
///
/// Must run after all peripherals are collected: a peripheral may derive
/// from one declared later in the document.
pub(crate) fn link_aliases(decls: Vec<PeripheralDecl>) -> Result<Vec<Peripheral>> {
    let by_name: HashMap<&str, &PeripheralDecl> =
        decls.iter().map(|d| (d.name.as_str(), d)).collect();

    let mut peripherals = Vec::with_capacity(decls.len());
    for decl in &decls {
        let (group, derived_from) = match &decl.kind {
            PeripheralKind::Owned { group } => (group.clone(), None),
            PeripheralKind::Derived { from } => {
                let group = resolve_group(decl, &by_name)?;
                debug!("{} derives group {} from {}", decl.name, group, from);
                (group, Some(from.clone()))
            }
        };
        peripherals.push(Peripheral {
            name: decl.name.clone(),
            group,
            derived_from,
            base_address: decl.base_address,
            description: decl.description.clone(),
        });
    }
    Ok(peripherals)
}

fn resolve_group<'a>(
    decl: &'a PeripheralDecl,
    by_name: &HashMap<&str, &'a PeripheralDecl>,
) -> Result<String> {
    let mut chain = vec![decl.name.as_str()];
    let mut current = decl;
    loop {
        match &current.kind {
            PeripheralKind::Owned { group } => return Ok(group.clone()),
            PeripheralKind::Derived { from } => {
                let next: &'a PeripheralDecl = *by_name.get(from.as_str()).ok_or_else(|| {
                    SvdError::UnresolvedDerivedPeripheral {
                        peripheral: current.name.clone(),
                        derived_from: from.clone(),
                    }
                })?;
                if chain.contains(&next.name.as_str()) {
                    chain.push(&next.name);
                    return Err(SvdError::CircularDerivation {
                        peripheral: decl.name.clone(),
                        chain: chain.join(" -> "),
                    });
                }
                chain.push(&next.name);
                current = next;
            }
        }
    }
}
