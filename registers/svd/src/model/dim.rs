// Licensed under the Apache-2.0 license

//! Expansion of dimensioned (array-like) registers and fields.
//!
//! A node carrying `<dim>` is repeated `dim` times. Element `i` is placed at
//! `offset + i * dimIncrement` and named by substituting `%s` (or `[%s]`) in
//! the declared name with the i-th entry of `<dimIndex>`, or with `i` when
//! no index list is given.

use super::xml::XmlNode;
use crate::error::{Location, Result, SvdError};
use crate::util::parse_scalar;

/// Repetition declared by a `<dim>` group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Dimension {
    pub count: u64,
    pub increment: u64,
    pub index: Option<Vec<String>>,
}

/// Concrete instances of a declared node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expansion {
    /// The node has no `<dim>` and stands for itself.
    Single,
    /// `(name, offset)` of every element, possibly empty.
    Repeated(Vec<(String, u64)>),
}

impl Dimension {
    /// Reads the dimension group of `node`, if any.
    pub(crate) fn from_node(node: &XmlNode, location: &Location) -> Result<Option<Self>> {
        let Some(count_text) = node.maybe_text("dim") else {
            return Ok(None);
        };
        let count = parse_scalar(count_text).ok_or_else(|| SvdError::MalformedDimension {
            location: location.clone(),
            value: count_text.to_string(),
            reason: "count is not a non-negative integer",
        })?;
        let increment = match node.maybe_text("dimIncrement") {
            Some(text) => parse_scalar(text).ok_or_else(|| SvdError::MalformedDimension {
                location: location.clone(),
                value: text.to_string(),
                reason: "increment is not a non-negative integer",
            })?,
            None => 1,
        };
        let index = match node.maybe_text("dimIndex") {
            Some(text) => {
                let index = parse_index(text, location)?;
                if index.len() as u64 != count {
                    return Err(SvdError::DimensionMismatch {
                        location: location.clone(),
                        declared: count,
                        index: text.to_string(),
                        found: index.len(),
                    });
                }
                Some(index)
            }
            None => None,
        };
        Ok(Some(Self {
            count,
            increment,
            index,
        }))
    }

    /// Names and offsets of every element of `template` starting at `base`.
    pub(crate) fn expand(
        &self,
        template: &str,
        base: u64,
        location: &Location,
    ) -> Result<Vec<(String, u64)>> {
        let mut out = Vec::new();
        for i in 0..self.count {
            let index = match &self.index {
                Some(index) => index[i as usize].clone(),
                None => i.to_string(),
            };
            let name = template.replace("[%s]", &index).replace("%s", &index);
            let offset = i
                .checked_mul(self.increment)
                .and_then(|step| step.checked_add(base))
                .ok_or_else(|| SvdError::MalformedDimension {
                    location: location.clone(),
                    value: format!("{template}[{index}]"),
                    reason: "element offset overflows",
                })?;
            out.push((name, offset));
        }
        Ok(out)
    }
}

/// Expands `node` declared as `name` at `base`.
pub(crate) fn expand(
    node: &XmlNode,
    name: &str,
    base: u64,
    location: &Location,
) -> Result<Expansion> {
    match Dimension::from_node(node, location)? {
        Some(dim) => Ok(Expansion::Repeated(dim.expand(name, base, location)?)),
        None => Ok(Expansion::Single),
    }
}

/// Parses a `<dimIndex>` value: `lo-hi` (numbers or single letters,
/// inclusive) or a comma separated list.
fn parse_index(text: &str, location: &Location) -> Result<Vec<String>> {
    let malformed = |reason| SvdError::MalformedDimension {
        location: location.clone(),
        value: text.to_string(),
        reason,
    };

    if !text.contains(',') {
        if let Some((lo, hi)) = text.split_once('-') {
            let (lo, hi) = (lo.trim(), hi.trim());
            if let (Ok(lo), Ok(hi)) = (lo.parse::<u64>(), hi.parse::<u64>()) {
                if hi < lo {
                    return Err(malformed("index range is reversed"));
                }
                return Ok((lo..=hi).map(|i| i.to_string()).collect());
            }
            return match (single_letter(lo), single_letter(hi)) {
                (Some(lo), Some(hi)) if lo <= hi => Ok((lo..=hi).map(String::from).collect()),
                (Some(_), Some(_)) => Err(malformed("index range is reversed")),
                _ => Err(malformed("index range bounds must be numbers or letters")),
            };
        }
    }

    let tokens: Vec<String> = text.split(',').map(|t| t.trim().to_string()).collect();
    if tokens.iter().any(String::is_empty) {
        return Err(malformed("index list has an empty entry"));
    }
    Ok(tokens)
}

fn single_letter(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_node<T>(xml: &str, f: impl FnOnce(&XmlNode) -> T) -> T {
        let doc = roxmltree::Document::parse(xml).unwrap();
        f(&XmlNode(doc.root_element()))
    }

    fn expand_xml(xml: &str, name: &str, base: u64) -> Result<Expansion> {
        with_node(xml, |node| expand(node, name, base, &Location::new()))
    }

    #[test]
    fn test_not_dimensioned() {
        let result = expand_xml("<register><name>CR</name></register>", "CR", 0x10).unwrap();
        assert_eq!(result, Expansion::Single);
    }

    #[test]
    fn test_numeric_positions() {
        let result = expand_xml(
            "<register><dim>4</dim><dimIncrement>0x4</dimIncrement></register>",
            "BKP%sR",
            0x50,
        )
        .unwrap();
        assert_eq!(
            result,
            Expansion::Repeated(vec![
                ("BKP0R".to_string(), 0x50),
                ("BKP1R".to_string(), 0x54),
                ("BKP2R".to_string(), 0x58),
                ("BKP3R".to_string(), 0x5c),
            ])
        );
    }

    #[test]
    fn test_index_range() {
        let result = expand_xml(
            "<register><dim>3</dim><dimIncrement>8</dimIncrement><dimIndex>1-3</dimIndex></register>",
            "CCR[%s]",
            0x100,
        )
        .unwrap();
        assert_eq!(
            result,
            Expansion::Repeated(vec![
                ("CCR1".to_string(), 0x100),
                ("CCR2".to_string(), 0x108),
                ("CCR3".to_string(), 0x110),
            ])
        );
    }

    #[test]
    fn test_index_list_and_default_increment() {
        let result = expand_xml(
            "<field><dim>2</dim><dimIndex>TX, RX</dimIndex></field>",
            "%sEN",
            6,
        )
        .unwrap();
        assert_eq!(
            result,
            Expansion::Repeated(vec![("TXEN".to_string(), 6), ("RXEN".to_string(), 7)])
        );
    }

    #[test]
    fn test_letter_range() {
        let result = expand_xml(
            "<register><dim>3</dim><dimIncrement>0x400</dimIncrement><dimIndex>A-C</dimIndex></register>",
            "PORT%s",
            0,
        )
        .unwrap();
        let Expansion::Repeated(items) = result else {
            panic!("expected expansion");
        };
        let names: Vec<_> = items.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["PORTA", "PORTB", "PORTC"]);
        assert_eq!(items[2].1, 0x800);
    }

    #[test]
    fn test_zero_count() {
        let result = expand_xml("<register><dim>0</dim></register>", "R%s", 0).unwrap();
        assert_eq!(result, Expansion::Repeated(vec![]));
    }

    #[test]
    fn test_malformed_count() {
        let err = expand_xml("<register><dim>four</dim></register>", "R%s", 0).unwrap_err();
        assert!(matches!(err, SvdError::MalformedDimension { ref value, .. } if value == "four"));
        let err = expand_xml("<register><dim>-1</dim></register>", "R%s", 0).unwrap_err();
        assert!(matches!(err, SvdError::MalformedDimension { .. }));
    }

    #[test]
    fn test_malformed_increment() {
        let err = expand_xml(
            "<register><dim>2</dim><dimIncrement>0xZZ</dimIncrement></register>",
            "R%s",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, SvdError::MalformedDimension { .. }));
    }

    #[test]
    fn test_index_count_mismatch() {
        let err = expand_xml(
            "<register><dim>4</dim><dimIndex>0-2</dimIndex></register>",
            "R%s",
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::DimensionMismatch { declared: 4, found: 3, .. }
        ));
        let err = expand_xml(
            "<register><dim>1</dim><dimIndex>A,B</dimIndex></register>",
            "R%s",
            0,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SvdError::DimensionMismatch { declared: 1, found: 2, .. }
        ));
    }

    #[test]
    fn test_reversed_range() {
        let err = expand_xml(
            "<register><dim>3</dim><dimIndex>3-1</dimIndex></register>",
            "R%s",
            0,
        )
        .unwrap_err();
        assert!(matches!(err, SvdError::MalformedDimension { .. }));
    }

    #[test]
    fn test_offsets_follow_increment() {
        for (count, inc, base) in [(1u64, 4u64, 0u64), (5, 0x20, 0x100), (16, 1, 7)] {
            let dim = Dimension {
                count,
                increment: inc,
                index: None,
            };
            let items = dim.expand("R%s", base, &Location::new()).unwrap();
            assert_eq!(items.len() as u64, count);
            for (i, (name, offset)) in items.iter().enumerate() {
                assert_eq!(*name, format!("R{i}"));
                assert_eq!(*offset, base + i as u64 * inc);
            }
        }
    }
}
