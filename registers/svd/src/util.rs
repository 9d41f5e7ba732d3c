// Licensed under the Apache-2.0 license

//! Name, description and number helpers shared by the model builder and
//! the code emitter.

use crate::error::{Location, Result, SvdError};

/// Checks that `name` only uses `[A-Za-z0-9_]` so it can become a symbol.
///
/// # Examples
/// ```
/// use mcu_registers_svd::error::Location;
/// use mcu_registers_svd::util::validate_name;
/// assert!(validate_name("GPIOA", &Location::new()).is_ok());
/// assert!(validate_name("PUP-DR", &Location::new()).is_err());
/// ```
pub fn validate_name(name: &str, location: &Location) -> Result<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(SvdError::InvalidName {
            location: location.clone(),
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Collapses a free-text description to one capitalized line.
///
/// Returns `None` for absent or blank text, and for the lone `"A"` some
/// vendor files use as a placeholder.
///
/// # Examples
/// ```
/// use mcu_registers_svd::util::normalize_description;
/// assert_eq!(
///     normalize_description(Some("port mode\n    register")).as_deref(),
///     Some("Port mode register")
/// );
/// assert_eq!(normalize_description(Some("a")), None);
/// ```
pub fn normalize_description(text: Option<&str>) -> Option<String> {
    let collapsed = text?.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let first = chars.next()?;
    let normalized: String = first.to_uppercase().chain(chars).collect();
    if normalized == "A" {
        return None;
    }
    Some(normalized)
}

/// Returns true if `text` is written with a `0x`/`0X` prefix.
pub fn is_hex_form(text: &str) -> bool {
    let text = text.trim();
    text.starts_with("0x") || text.starts_with("0X")
}

/// Parses a non-negative scalar: hexadecimal with a `0x` prefix, decimal otherwise.
pub fn parse_scalar(text: &str) -> Option<u64> {
    let text = text.trim();
    if is_hex_form(text) {
        u64::from_str_radix(&text[2..], 16).ok()
    } else {
        text.parse::<u64>().ok()
    }
}

/// Converts a validated name to a snake_case module name.
///
/// Leading digits get an underscore prefix and Rust keywords an underscore
/// suffix.
///
/// # Examples
/// ```
/// use mcu_registers_svd::util::snake_case;
/// assert_eq!(snake_case("GPIOA"), "gpioa");
/// assert_eq!(snake_case("UsbOtgFs"), "usb_otg_fs");
/// assert_eq!(snake_case("CR1"), "cr1");
/// ```
pub fn snake_case(name: &str) -> String {
    let mut result = String::new();
    if let Some(c) = name.chars().next() {
        if c.is_ascii_digit() {
            result.push('_');
        }
    }
    let mut prev = None;
    for c in name.chars() {
        if c == '_' {
            if prev != Some('_') && !result.is_empty() {
                result.push('_');
            }
            prev = Some('_');
            continue;
        }
        if let Some(prev) = prev {
            if prev.is_ascii_lowercase() && c.is_ascii_uppercase() {
                result.push('_');
            }
        }
        prev = Some(c);
        result.push(c.to_ascii_lowercase());
    }
    tweak_keywords(result.trim_end_matches('_')).to_string()
}

/// Converts a validated name to an upper-case constant name.
///
/// # Examples
/// ```
/// use mcu_registers_svd::util::const_case;
/// assert_eq!(const_case("moder"), "MODER");
/// assert_eq!(const_case("2ND"), "_2ND");
/// ```
pub fn const_case(name: &str) -> String {
    let upper = name.to_ascii_uppercase();
    match upper.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{upper}"),
        _ => upper,
    }
}

/// Appends underscore suffix to Rust keywords to avoid conflicts.
fn tweak_keywords(s: &str) -> &str {
    match s {
        "as" => "as_",
        "break" => "break_",
        "const" => "const_",
        "continue" => "continue_",
        "crate" => "crate_",
        "else" => "else_",
        "enum" => "enum_",
        "extern" => "extern_",
        "false" => "false_",
        "fn" => "fn_",
        "for" => "for_",
        "if" => "if_",
        "impl" => "impl_",
        "in" => "in_",
        "let" => "let_",
        "loop" => "loop_",
        "match" => "match_",
        "mod" => "mod_",
        "move" => "move_",
        "mut" => "mut_",
        "pub" => "pub_",
        "ref" => "ref_",
        "return" => "return_",
        "self" => "self_",
        "static" => "static_",
        "struct" => "struct_",
        "super" => "super_",
        "trait" => "trait_",
        "true" => "true_",
        "type" => "type_",
        "unsafe" => "unsafe_",
        "use" => "use_",
        "where" => "where_",
        "while" => "while_",
        "async" => "async_",
        "await" => "await_",
        "dyn" => "dyn_",
        "abstract" => "abstract_",
        "become" => "become_",
        "box" => "box_",
        "do" => "do_",
        "final" => "final_",
        "macro" => "macro_",
        "override" => "override_",
        "priv" => "priv_",
        "typeof" => "typeof_",
        "unsized" => "unsized_",
        "virtual" => "virtual_",
        "yield" => "yield_",
        "try" => "try_",
        s => s,
    }
}

/// Formats an integer as a hex constant with underscores for readability.
///
/// Values <= 9 are formatted as decimal; larger values use hex with
/// underscore separators every 4 digits.
///
/// # Examples
/// ```
/// use mcu_registers_svd::util::hex_const;
/// assert_eq!(hex_const(5), "5");
/// assert_eq!(hex_const(0x1234), "0x1234");
/// assert_eq!(hex_const(0x40020000), "0x4002_0000");
/// ```
pub fn hex_const(val: u64) -> String {
    if val > 9 {
        let mut x = String::new();
        for (i, c) in format!("{val:x}").chars().rev().enumerate() {
            if i % 4 == 0 && i != 0 {
                x.push('_');
            }
            x.push(c);
        }
        "0x".to_string() + &x.chars().rev().collect::<String>()
    } else {
        format!("{val}")
    }
}
