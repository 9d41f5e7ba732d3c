// Licensed under the Apache-2.0 license

//! Thin accessors over `roxmltree` nodes.

use crate::error::{Location, Result, SvdError};
use crate::util::{is_hex_form, parse_scalar};
use log::warn;

#[derive(Clone, Copy)]
pub(crate) struct XmlNode<'a, 'input>(pub roxmltree::Node<'a, 'input>);

impl<'a, 'input> XmlNode<'a, 'input> {
    /// Trimmed text of the first child element named `tag`.
    pub(crate) fn maybe_text(&self, tag: &str) -> Option<&'a str> {
        self.0
            .children()
            .find(|n| n.has_tag_name(tag))
            .and_then(|n| n.text())
            .map(str::trim)
    }

    pub(crate) fn text(&self, tag: &'static str, location: &Location) -> Result<&'a str> {
        self.maybe_text(tag)
            .ok_or_else(|| SvdError::MissingRequiredAttribute {
                location: location.clone(),
                attribute: tag,
            })
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<&'a str> {
        self.0.attribute(name).map(str::trim)
    }

    pub(crate) fn child(&self, tag: &str) -> Option<XmlNode<'a, 'input>> {
        self.0.children().find(|n| n.has_tag_name(tag)).map(XmlNode)
    }

    pub(crate) fn children(&self, tag: &str) -> Vec<XmlNode<'a, 'input>> {
        self.0
            .children()
            .filter(|n| n.has_tag_name(tag))
            .map(XmlNode)
            .collect()
    }

    /// Element children of the first `container` child that are named `tag`.
    pub(crate) fn nested(&self, container: &str, tag: &str) -> Vec<XmlNode<'a, 'input>> {
        self.child(container)
            .map(|c| c.children(tag))
            .unwrap_or_default()
    }

    /// Required scalar child parsed with [`parse_scalar`].
    pub(crate) fn scalar(&self, tag: &'static str, location: &Location) -> Result<u64> {
        let text = self.text(tag, location)?;
        parse_number(text, tag, location)
    }

    pub(crate) fn maybe_scalar(&self, tag: &'static str, location: &Location) -> Result<Option<u64>> {
        self.maybe_text(tag)
            .map(|text| parse_number(text, tag, location))
            .transpose()
    }

    /// Required address child. Decimal text is accepted but reported, since
    /// emitted constants are laid out assuming hexadecimal sources.
    pub(crate) fn address(&self, tag: &'static str, location: &Location) -> Result<u64> {
        let text = self.text(tag, location)?;
        let value = parse_number(text, tag, location)?;
        if !is_hex_form(text) {
            warn!("{location}: {tag} `{text}` is not hexadecimal");
        }
        Ok(value)
    }
}

fn parse_number(text: &str, attribute: &'static str, location: &Location) -> Result<u64> {
    parse_scalar(text).ok_or_else(|| SvdError::InvalidNumber {
        location: location.clone(),
        attribute,
        value: text.to_string(),
    })
}
