// Licensed under the Apache-2.0 license

//! Building registers and their fields, and merging them into a group.

use super::dim::{self, Expansion};
use super::xml::XmlNode;
use crate::error::{Location, Result, SvdError};
use crate::types::{Access, Address, Field, Merge, Register, RegisterGroup};
use crate::util::{normalize_description, validate_name};
use log::{debug, warn};

/// Builds the fields of one `<field>` node, expanding it if dimensioned.
pub(crate) fn build_field(node: &XmlNode, location: &Location) -> Result<Vec<Field>> {
    let name = node.text("name", location)?;
    let location = location.clone().named(name);
    let (bit_offset, bit_width) = bit_position(node, &location)?;
    let description = normalize_description(node.maybe_text("description"));

    let instances = match dim::expand(node, name, bit_offset, &location)? {
        Expansion::Single => vec![(name.to_string(), bit_offset)],
        Expansion::Repeated(instances) => instances,
    };
    instances
        .into_iter()
        .map(|(name, bit_offset)| {
            validate_name(&name, &location)?;
            Ok(Field {
                name,
                bit_offset,
                bit_width,
                description: description.clone(),
            })
        })
        .collect()
}

/// Reads `(offset, width)` from `bitOffset`/`bitWidth`, `lsb`/`msb` or
/// `bitRange`, in that order of preference.
fn bit_position(node: &XmlNode, location: &Location) -> Result<(u64, u64)> {
    if let Some(offset) = node.maybe_scalar("bitOffset", location)? {
        let width = node.scalar("bitWidth", location)?;
        return Ok((offset, width));
    }
    if let Some(lsb) = node.maybe_scalar("lsb", location)? {
        let msb = node.scalar("msb", location)?;
        return span(lsb, msb, "msb", &msb.to_string(), location);
    }
    if let Some(range) = node.maybe_text("bitRange") {
        let invalid = || SvdError::InvalidNumber {
            location: location.clone(),
            attribute: "bitRange",
            value: range.to_string(),
        };
        let inner = range
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .ok_or_else(invalid)?;
        let (msb, lsb) = inner.split_once(':').ok_or_else(invalid)?;
        let msb = msb.trim().parse::<u64>().map_err(|_| invalid())?;
        let lsb = lsb.trim().parse::<u64>().map_err(|_| invalid())?;
        return span(lsb, msb, "bitRange", range, location);
    }
    Err(SvdError::MissingRequiredAttribute {
        location: location.clone(),
        attribute: "bitOffset",
    })
}

fn span(
    lsb: u64,
    msb: u64,
    attribute: &'static str,
    text: &str,
    location: &Location,
) -> Result<(u64, u64)> {
    if msb < lsb {
        return Err(SvdError::InvalidNumber {
            location: location.clone(),
            attribute,
            value: text.to_string(),
        });
    }
    Ok((lsb, msb - lsb + 1))
}

/// Builds the field list of a register. Fields repeated with the same
/// position are dropped; a repeat at a different position is fatal.
pub(crate) fn build_fields(node: &XmlNode, location: &Location) -> Result<Vec<Field>> {
    let mut fields: Vec<Field> = Vec::new();
    for (i, field_node) in node.nested("fields", "field").iter().enumerate() {
        let field_location = location.child("field", i, None);
        for field in build_field(field_node, &field_location)? {
            match fields.iter().find(|f| f.name == field.name) {
                Some(existing)
                    if existing.bit_offset == field.bit_offset
                        && existing.bit_width == field.bit_width =>
                {
                    debug!("{field_location}: repeated field {} ignored", field.name);
                }
                Some(existing) => {
                    return Err(SvdError::ConflictingField {
                        location: field_location.named(&field.name),
                        field: field.name.clone(),
                        existing: bit_span(existing),
                        conflicting: bit_span(&field),
                    });
                }
                None => fields.push(field),
            }
        }
    }
    Ok(fields)
}

fn bit_span(field: &Field) -> String {
    let msb = field.bit_offset + field.bit_width.saturating_sub(1);
    format!("[{}:{}]", msb, field.bit_offset)
}

/// Builds every concrete register declared by one `<register>` node.
pub(crate) fn build_registers(node: &XmlNode, location: &Location) -> Result<Vec<Register>> {
    let name = node.text("name", location)?;
    let location = location.clone().named(name);
    let offset = node.address("addressOffset", &location)?;
    let description = normalize_description(node.maybe_text("description"));
    let access = node.maybe_text("access").and_then(|text| {
        let access = Access::from_svd(text);
        if access.is_none() {
            warn!("{location}: unknown access `{text}` ignored");
        }
        access
    });

    let instances = match dim::expand(node, name, offset, &location)? {
        Expansion::Single => vec![(name.to_string(), offset)],
        Expansion::Repeated(instances) => {
            if instances.is_empty() {
                debug!("{location}: dimension of 0, register skipped");
            }
            instances
        }
    };
    for (name, _) in &instances {
        validate_name(name, &location)?;
    }
    let fields = build_fields(node, &location)?;

    Ok(instances
        .into_iter()
        .map(|(name, offset)| Register {
            name,
            address_offset: Address(offset),
            access,
            description: description.clone(),
            fields: fields.clone(),
        })
        .collect())
}

/// Builds the registers of one `<register>` node and merges them into `group`.
pub(crate) fn merge_registers(
    group: &mut RegisterGroup,
    node: &XmlNode,
    location: &Location,
) -> Result<()> {
    for register in build_registers(node, location)? {
        let name = register.name.clone();
        let location = location.clone().named(&name);
        if group.insert_or_verify(register, &location)? == Merge::Repeated {
            debug!("{}: {} already declared, keeping first", group.name, name);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_node<T>(xml: &str, f: impl FnOnce(&XmlNode) -> T) -> T {
        let doc = roxmltree::Document::parse(xml).unwrap();
        f(&XmlNode(doc.root_element()))
    }

    fn location() -> Location {
        Location::new()
            .child("peripheral", 0, Some("GPIOA"))
            .child("register", 0, None)
    }

    #[test]
    fn test_build_register_with_fields() {
        let regs = with_node(
            r#"<register>
                <name>ODR</name>
                <description>port output
                    data register</description>
                <addressOffset>0x14</addressOffset>
                <access>read-write</access>
                <fields>
                    <field><name>ODR0</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
                    <field><name>ODR1</name><lsb>1</lsb><msb>1</msb></field>
                    <field><name>HIGH</name><bitRange>[31:16]</bitRange></field>
                </fields>
            </register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap();
        assert_eq!(regs.len(), 1);
        let reg = &regs[0];
        assert_eq!(reg.name, "ODR");
        assert_eq!(reg.address_offset, Address(0x14));
        assert_eq!(reg.access, Some(Access::ReadWrite));
        assert_eq!(reg.description.as_deref(), Some("Port output data register"));
        let fields: Vec<_> = reg
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.bit_offset, f.bit_width))
            .collect();
        assert_eq!(fields, [("ODR0", 0, 1), ("ODR1", 1, 1), ("HIGH", 16, 16)]);
    }

    #[test]
    fn test_dimensioned_register_and_field() {
        let regs = with_node(
            r#"<register>
                <dim>2</dim><dimIncrement>4</dimIncrement><dimIndex>L,H</dimIndex>
                <name>AFR%s</name>
                <addressOffset>0x20</addressOffset>
                <fields>
                    <field>
                        <dim>8</dim><dimIncrement>4</dimIncrement>
                        <name>AFSEL%s</name><bitOffset>0</bitOffset><bitWidth>4</bitWidth>
                    </field>
                </fields>
            </register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap();
        let names: Vec<_> = regs.iter().map(|r| (r.name.as_str(), r.address_offset.0)).collect();
        assert_eq!(names, [("AFRL", 0x20), ("AFRH", 0x24)]);
        assert_eq!(regs[1].fields.len(), 8);
        assert_eq!(regs[1].fields[7].name, "AFSEL7");
        assert_eq!(regs[1].fields[7].bit_offset, 28);
    }

    #[test]
    fn test_missing_register_attributes() {
        let err = with_node(
            "<register><addressOffset>0</addressOffset></register>",
            |n| build_registers(n, &location()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::MissingRequiredAttribute { attribute: "name", .. }
        ));

        let err = with_node("<register><name>CR</name></register>", |n| {
            build_registers(n, &location())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::MissingRequiredAttribute { attribute: "addressOffset", .. }
        ));
    }

    #[test]
    fn test_missing_field_attributes() {
        let err = with_node(
            r#"<register><name>CR</name><addressOffset>0</addressOffset><fields>
                <field><name>EN</name><bitOffset>0</bitOffset></field>
            </fields></register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::MissingRequiredAttribute { attribute: "bitWidth", .. }
        ));

        let err = with_node(
            r#"<register><name>CR</name><addressOffset>0</addressOffset><fields>
                <field><name>EN</name></field>
            </fields></register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap_err();
        match err {
            SvdError::MissingRequiredAttribute {
                attribute,
                location,
            } => {
                assert_eq!(attribute, "bitOffset");
                assert_eq!(
                    location.to_string(),
                    "peripheral #0 (GPIOA) > register #0 (CR) > field #0 (EN)"
                );
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_invalid_field_name() {
        let err = with_node(
            r#"<register><name>PUPDR</name><addressOffset>0xC</addressOffset><fields>
                <field><name>PUP-DR</name><bitOffset>0</bitOffset><bitWidth>2</bitWidth></field>
            </fields></register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap_err();
        assert!(matches!(err, SvdError::InvalidName { ref name, .. } if name == "PUP-DR"));
    }

    #[test]
    fn test_repeated_and_conflicting_fields() {
        let regs = with_node(
            r#"<register><name>CR</name><addressOffset>0</addressOffset><fields>
                <field><name>EN</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
                <field><name>EN</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
            </fields></register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap();
        assert_eq!(regs[0].fields.len(), 1);

        let err = with_node(
            r#"<register><name>CR</name><addressOffset>0</addressOffset><fields>
                <field><name>EN</name><bitOffset>0</bitOffset><bitWidth>1</bitWidth></field>
                <field><name>EN</name><bitOffset>3</bitOffset><bitWidth>1</bitWidth></field>
            </fields></register>"#,
            |n| build_registers(n, &location()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::ConflictingField { ref existing, ref conflicting, .. }
                if existing == "[0:0]" && conflicting == "[3:3]"
        ));
    }

    #[test]
    fn test_merge_into_group() {
        let mut group = RegisterGroup::new("GPIO");
        let xml = "<register><name>MODER</name><addressOffset>0x0</addressOffset></register>";
        with_node(xml, |n| merge_registers(&mut group, n, &location())).unwrap();
        with_node(xml, |n| merge_registers(&mut group, n, &location())).unwrap();
        assert_eq!(group.len(), 1);

        let err = with_node(
            "<register><name>MODER</name><addressOffset>0x4</addressOffset></register>",
            |n| merge_registers(&mut group, n, &location()),
        )
        .unwrap_err();
        assert!(matches!(err, SvdError::ConflictingRegisterAddress { .. }));
        assert_eq!(
            err.to_string(),
            "peripheral #0 (GPIOA) > register #0 (MODER): register MODER in group GPIO declared at 0x0 and at 0x4"
        );
    }

    #[test]
    fn test_invalid_offset() {
        let err = with_node(
            "<register><name>CR</name><addressOffset>0xG0</addressOffset></register>",
            |n| build_registers(n, &location()),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::InvalidNumber { attribute: "addressOffset", .. }
        ));
    }
}
