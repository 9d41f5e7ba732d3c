// Licensed under the Apache-2.0 license

//! Code generation of flat, dependency-free Rust constants from a [`Model`].
//!
//! ## Code Generation Flow
//!
//! ```text
//! Model → Rust code string
//! ├── RegisterGroup[]  → pub mod groups { pub mod <group> { offsets } }
//! ├── Peripheral[]     → pub mod <peripheral> { absolute addresses, pub mod <register> { bit offsets } }
//! └── Interrupt[]      → pub mod interrupts { vector numbers, placeholders commented out }
//! ```
//!
//! ## Generated Code Structure
//!
//! For a 32-bit device with one GPIO port, the generated code looks like:
//!
//! ```text
//! pub mod groups {
//!     pub mod gpio {
//!         pub const MODER: u32 = 0;
//!     }
//! }
//!
//! pub mod gpioa {
//!     pub const BASE_ADDRESS: u32 = 0x4002_0000;
//!     pub const MODER: u32 = 0x4002_0000;
//!     pub mod moder {
//!         pub const MODER0: u32 = 0;
//!     }
//! }
//!
//! pub mod interrupts {
//!     pub const WWDG: u32 = 0;
//!     // pub const UNKNOWN: u32 = 1; // Unknown interrupt
//! }
//! ```

use crate::config::OutputConfig;
use crate::types::{Model, Peripheral, Register};
use crate::util::{const_case, hex_const, snake_case};
use log::warn;
use std::collections::HashSet;
use std::fmt::Write;

const BASE_ADDRESS: &str = "BASE_ADDRESS";

/// Names already declared in one generated module.
#[derive(Default)]
struct Namespace(HashSet<String>);

impl Namespace {
    /// Takes `name`, or warns and returns false if an earlier item has it.
    fn claim(&mut self, name: &str, what: &str) -> bool {
        if self.0.insert(name.to_string()) {
            return true;
        }
        warn!("{what}: `{name}` collides with an earlier item, skipped");
        false
    }
}

impl Model {
    /// Generate the complete Rust source for this model.
    pub fn generate_code(&self, config: &OutputConfig) -> String {
        let mut output = String::new();

        let device = self.device_name.as_deref().unwrap_or("device");
        writeln!(output, "// Register and interrupt constants for {device}.").unwrap();
        writeln!(output, "// Generated file, do not edit.").unwrap();

        let emit_groups = config.emit_groups && !self.groups.is_empty();
        let mut modules = Namespace::default();
        if emit_groups {
            modules.claim("groups", "groups");
        }
        if !self.interrupts.is_empty() {
            modules.claim("interrupts", "interrupts");
        }

        if emit_groups {
            writeln!(output).unwrap();
            self.generate_groups(&mut output, config);
        }

        for periph in &self.peripherals {
            if !config.filter.should_include(&periph.name) {
                continue;
            }
            let module = snake_case(&periph.name);
            if !modules.claim(&module, &periph.name) {
                continue;
            }
            writeln!(output).unwrap();
            self.generate_peripheral(&mut output, periph, &module, config);
        }

        if !self.interrupts.is_empty() {
            writeln!(output).unwrap();
            self.generate_interrupts(&mut output, config);
        }

        output
    }

    /// Generate the `groups` module with group-relative register offsets.
    fn generate_groups(&self, output: &mut String, config: &OutputConfig) {
        let ty = self.address_width.rust_type();
        writeln!(output, "pub mod groups {{").unwrap();
        writeln!(
            output,
            "    //! Register offsets relative to the base address of each peripheral."
        )
        .unwrap();
        let mut modules = Namespace::default();
        for group in &self.groups {
            let module = snake_case(&group.name);
            if !modules.claim(&module, &group.name) {
                continue;
            }
            writeln!(output, "    pub mod {module} {{").unwrap();
            let mut consts = Namespace::default();
            for reg in group.registers() {
                let what = format!("{}.{}", group.name, reg.name);
                let offset = reg.address_offset.value();
                let name = const_case(&reg.name);
                if !self.fits(offset, &what) || !consts.claim(&name, &what) {
                    continue;
                }
                doc_comment(output, 8, reg.description.as_deref(), config);
                writeln!(output, "        pub const {name}: {ty} = {};", hex_const(offset)).unwrap();
            }
            writeln!(output, "    }}").unwrap();
        }
        writeln!(output, "}}").unwrap();
    }

    /// Generate one peripheral module: base address, absolute register
    /// addresses and a bit-offset module per register with fields.
    fn generate_peripheral(
        &self,
        output: &mut String,
        periph: &Peripheral,
        module: &str,
        config: &OutputConfig,
    ) {
        let ty = self.address_width.rust_type();
        let registers = self
            .group(&periph.group)
            .map(|g| g.registers())
            .unwrap_or_default();

        doc_comment(output, 0, periph.description.as_deref(), config);
        writeln!(output, "pub mod {module} {{").unwrap();

        let mut consts = Namespace::default();
        let mut modules = Namespace::default();
        let base = periph.base_address.value();
        if registers.iter().any(|r| const_case(&r.name) == BASE_ADDRESS) {
            warn!(
                "{}: register named {BASE_ADDRESS}, base address constant omitted",
                periph.name
            );
        } else if self.fits(base, &periph.name) {
            consts.claim(BASE_ADDRESS, &periph.name);
            writeln!(output, "    pub const {BASE_ADDRESS}: {ty} = {};", hex_const(base)).unwrap();
        }

        for reg in registers {
            let what = format!("{}.{}", periph.name, reg.name);
            let name = const_case(&reg.name);
            match base.checked_add(reg.address_offset.value()) {
                Some(addr) if self.fits(addr, &what) && consts.claim(&name, &what) => {
                    doc_comment(output, 4, reg.description.as_deref(), config);
                    writeln!(output, "    pub const {name}: {ty} = {};", hex_const(addr)).unwrap();
                }
                Some(_) => {}
                None => warn!("{what}: address overflows, skipped"),
            }
            self.generate_fields(output, reg, &mut modules, config);
        }
        writeln!(output, "}}").unwrap();
    }

    /// Field bit offsets are emitted even when the register address itself
    /// does not fit in the address width.
    fn generate_fields(
        &self,
        output: &mut String,
        reg: &Register,
        modules: &mut Namespace,
        config: &OutputConfig,
    ) {
        if reg.fields.is_empty() {
            return;
        }
        let module = snake_case(&reg.name);
        if !modules.claim(&module, &reg.name) {
            return;
        }
        let ty = self.address_width.rust_type();
        writeln!(output, "    pub mod {module} {{").unwrap();
        let mut consts = Namespace::default();
        for field in &reg.fields {
            let what = format!("{}.{}", reg.name, field.name);
            let name = const_case(&field.name);
            if !self.fits(field.bit_offset, &what) || !consts.claim(&name, &what) {
                continue;
            }
            doc_comment(output, 8, field.description.as_deref(), config);
            writeln!(output, "        pub const {name}: {ty} = {};", field.bit_offset).unwrap();
        }
        writeln!(output, "    }}").unwrap();
    }

    /// Generate the `interrupts` module. Placeholders are written commented
    /// out so the table reads contiguously without declaring them.
    fn generate_interrupts(&self, output: &mut String, config: &OutputConfig) {
        let ty = self.address_width.rust_type();
        writeln!(output, "pub mod interrupts {{").unwrap();
        let mut consts = Namespace::default();
        for irq in &self.interrupts {
            let name = const_case(&irq.name);
            let number = irq.number;
            if !self.fits(u64::from(number), &irq.name) {
                continue;
            }
            if irq.valid {
                if !consts.claim(&name, &irq.name) {
                    continue;
                }
                doc_comment(output, 4, irq.description.as_deref(), config);
                writeln!(output, "    pub const {name}: {ty} = {number};").unwrap();
            } else {
                let desc = irq.description.as_deref().unwrap_or_default();
                writeln!(output, "    // pub const {name}: {ty} = {number}; // {desc}").unwrap();
            }
        }
        writeln!(output, "}}").unwrap();
    }

    /// Reports constants that do not fit in the address width.
    fn fits(&self, value: u64, what: &str) -> bool {
        if value > self.address_width.max_value() {
            warn!(
                "{what}: {value:#x} does not fit in {}, skipped",
                self.address_width.rust_type()
            );
            return false;
        }
        true
    }
}

fn doc_comment(output: &mut String, indent: usize, text: Option<&str>, config: &OutputConfig) {
    if let (true, Some(text)) = (config.emit_descriptions, text) {
        writeln!(output, "{:indent$}/// {text}", "").unwrap();
    }
}
