// Licensed under the Apache-2.0 license

//! Interrupt vector collection and reconciliation into a contiguous table.

use super::xml::XmlNode;
use crate::error::{Location, Result, SvdError};
use crate::types::{Interrupt, Merge};
use crate::util::{normalize_description, parse_scalar, validate_name};
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Interrupts gathered from every peripheral, deduplicated by name.
#[derive(Clone, Debug, Default)]
pub struct InterruptTable {
    interrupts: Vec<Interrupt>,
    index: HashMap<String, usize>,
}

impl InterruptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `interrupt` unless one with the same name exists.
    ///
    /// A repeat with the same number is ignored; a repeat with a different
    /// number is a [`SvdError::ConflictingInterruptNumber`] reported at
    /// `location`.
    pub fn insert_or_verify(&mut self, interrupt: Interrupt, location: &Location) -> Result<Merge> {
        match self.index.entry(interrupt.name.clone()) {
            Entry::Occupied(entry) => {
                let existing = &self.interrupts[*entry.get()];
                if existing.number == interrupt.number {
                    Ok(Merge::Repeated)
                } else {
                    Err(SvdError::ConflictingInterruptNumber {
                        location: location.clone(),
                        name: interrupt.name,
                        existing: existing.number,
                        conflicting: interrupt.number,
                    })
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(self.interrupts.len());
                self.interrupts.push(interrupt);
                Ok(Merge::Inserted)
            }
        }
    }

    /// Collects the `<interrupt>` declarations of one peripheral.
    pub(crate) fn collect(&mut self, peripheral: &XmlNode, location: &Location) -> Result<()> {
        for (i, node) in peripheral.children("interrupt").iter().enumerate() {
            let location = location.child("interrupt", i, None);
            let name = required(node, "name", &location)?;
            let location = location.named(name);
            validate_name(name, &location)?;
            let value = required(node, "value", &location)?;
            let number = parse_scalar(value)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| SvdError::InvalidInterruptNumber {
                    location: location.clone(),
                    value: value.to_string(),
                })?;
            let interrupt = Interrupt {
                name: name.to_string(),
                number,
                description: normalize_description(node.maybe_text("description")),
                valid: true,
            };
            if self.insert_or_verify(interrupt, &location)? == Merge::Repeated {
                debug!("{location}: interrupt {name} already declared");
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.interrupts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interrupts.is_empty()
    }

    /// Sorts by number and fills every unused slot below the highest
    /// declared number with an invalid placeholder.
    pub fn reconcile(self) -> Vec<Interrupt> {
        let mut interrupts = self.interrupts;
        let Some(max) = interrupts.iter().map(|i| i.number).max() else {
            return interrupts;
        };
        interrupts.sort_by_key(|i| i.number);

        let mut used = vec![false; max as usize + 1];
        for interrupt in &interrupts {
            used[interrupt.number as usize] = true;
        }
        for (number, _) in used.iter().enumerate().filter(|(_, used)| !**used) {
            debug!("interrupt vector {number} unused, adding placeholder");
            interrupts.push(Interrupt::placeholder(number as u32));
        }
        interrupts.sort_by_key(|i| i.number);
        interrupts
    }
}

fn required<'a>(node: &XmlNode<'a, '_>, tag: &'static str, location: &Location) -> Result<&'a str> {
    node.maybe_text(tag)
        .ok_or_else(|| SvdError::MissingInterruptField {
            location: location.clone(),
            attribute: tag,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn irq(name: &str, number: u32) -> Interrupt {
        Interrupt {
            name: name.to_string(),
            number,
            description: None,
            valid: true,
        }
    }

    #[test]
    fn test_reconcile_fills_gaps() {
        let mut table = InterruptTable::new();
        table.insert_or_verify(irq("TIM2", 7), &Location::new()).unwrap();
        table.insert_or_verify(irq("TIM1", 5), &Location::new()).unwrap();
        let interrupts = table.reconcile();

        assert_eq!(interrupts.len(), 8);
        for (i, interrupt) in interrupts.iter().enumerate() {
            assert_eq!(interrupt.number, i as u32);
        }
        for i in [0, 1, 2, 3, 4, 6] {
            assert!(!interrupts[i].valid);
            assert_eq!(interrupts[i].name, "UNKNOWN");
            assert_eq!(interrupts[i].description.as_deref(), Some("Unknown interrupt"));
        }
        assert_eq!(interrupts[5].name, "TIM1");
        assert!(interrupts[5].valid);
        assert_eq!(interrupts[7].name, "TIM2");
        assert!(interrupts[7].valid);
    }

    #[test]
    fn test_reconcile_empty() {
        assert!(InterruptTable::new().reconcile().is_empty());
    }

    #[test]
    fn test_reconcile_single_zero() {
        let mut table = InterruptTable::new();
        table.insert_or_verify(irq("WWDG", 0), &Location::new()).unwrap();
        assert_eq!(table.reconcile(), vec![irq("WWDG", 0)]);
    }

    #[test]
    fn test_shared_vector_numbers_are_kept() {
        let mut table = InterruptTable::new();
        table.insert_or_verify(irq("USART1", 2), &Location::new()).unwrap();
        table.insert_or_verify(irq("USART1_WKUP", 2), &Location::new()).unwrap();
        let interrupts = table.reconcile();
        assert_eq!(interrupts.len(), 4);
        assert_eq!(interrupts.iter().filter(|i| i.valid).count(), 2);
        assert!(interrupts.windows(2).all(|w| w[0].number <= w[1].number));
    }

    #[test]
    fn test_duplicate_names() {
        let mut table = InterruptTable::new();
        assert_eq!(table.insert_or_verify(irq("EXTI0", 6), &Location::new()).unwrap(), Merge::Inserted);
        assert_eq!(table.insert_or_verify(irq("EXTI0", 6), &Location::new()).unwrap(), Merge::Repeated);
        assert_eq!(table.len(), 1);
        let err = table.insert_or_verify(irq("EXTI0", 7), &Location::new()).unwrap_err();
        assert!(matches!(
            err,
            SvdError::ConflictingInterruptNumber { existing: 6, conflicting: 7, .. }
        ));
    }

    #[test]
    fn test_collect_from_peripheral() {
        let doc = roxmltree::Document::parse(
            r#"<peripheral>
                <name>TIM1</name>
                <interrupt><name>TIM1_BRK</name><value>24</value></interrupt>
                <interrupt><name>TIM1_UP</name><description>tim1 update</description><value>25</value></interrupt>
            </peripheral>"#,
        )
        .unwrap();
        let mut table = InterruptTable::new();
        table
            .collect(&XmlNode(doc.root_element()), &Location::new())
            .unwrap();
        assert_eq!(table.len(), 2);
        let interrupts = table.reconcile();
        assert_eq!(interrupts.len(), 26);
        assert_eq!(interrupts[25].description.as_deref(), Some("Tim1 update"));
    }

    #[test]
    fn test_collect_errors() {
        let cases = [
            ("<p><interrupt><value>1</value></interrupt></p>", "missing"),
            ("<p><interrupt><name>X</name></interrupt></p>", "missing"),
            ("<p><interrupt><name>X</name><value>one</value></interrupt></p>", "number"),
            ("<p><interrupt><name>X</name><value>-3</value></interrupt></p>", "number"),
            ("<p><interrupt><name>X-Y</name><value>3</value></interrupt></p>", "name"),
        ];
        for (xml, kind) in cases {
            let doc = roxmltree::Document::parse(xml).unwrap();
            let err = InterruptTable::new()
                .collect(&XmlNode(doc.root_element()), &Location::new())
                .unwrap_err();
            let ok = match kind {
                "missing" => matches!(err, SvdError::MissingInterruptField { .. }),
                "number" => matches!(err, SvdError::InvalidInterruptNumber { .. }),
                _ => matches!(err, SvdError::InvalidName { .. }),
            };
            assert!(ok, "{xml}: unexpected {err}");
        }
    }
}
