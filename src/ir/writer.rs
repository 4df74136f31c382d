//======---------------------------------------------------------------======//
//                                                                           //
// Copyright 2022-2023 Evan Cox <evanacox00@gmail.com>. All rights reserved. //
//                                                                           //
// Use of this source code is governed by a BSD-style license that can be    //
// found in the LICENSE.txt file at the root of this project, or at the      //
// following link: https://opensource.org/licenses/BSD-3-Clause              //
//                                                                           //
//======---------------------------------------------------------------======//

use crate::ir::{FunctionFlags, Module, TableEntry};
use std::fmt::{self, Write};

/// Renders a module in a stable textual form.
///
/// Functions and witness tables are printed in their linked order, v-tables
/// in array order. Function bodies are printed as-is, one instruction per line.
///
/// ```
/// # use garnet::ir::*;
/// let mut module = Module::new("demo");
/// module.define_function("main", ["return"]);
///
/// assert_eq!(
///     stringify_module(&module),
///     "module demo\n\nfn @main [definition] {\n  return\n}\n"
/// );
/// ```
pub fn stringify_module(module: &Module) -> String {
    let mut out = String::new();

    // writing into a `String` cannot fail
    let _ = write_module(&mut out, module);

    out
}

fn write_module(out: &mut String, module: &Module) -> fmt::Result {
    writeln!(out, "module {}", module.name())?;

    let mut func = module.first_function();

    while let Some(f) = func {
        let data = module.function(f);

        write!(out, "\nfn @{}", module.function_name(f))?;
        write_flags(out, data.flags())?;

        if data.is_definition() {
            writeln!(out, " {{")?;

            for inst in data.body() {
                writeln!(out, "  {inst}")?;
            }

            writeln!(out, "}}")?;
        } else {
            writeln!(out)?;
        }

        func = module.next_function(f);
    }

    for vtable in module.vtables() {
        write!(out, "\nvtable ${}", vtable.class())?;
        write_entries(out, module, vtable.entries())?;
    }

    let mut wt = module.first_witness_table();

    while let Some(w) = wt {
        let table = module.witness_table(w);

        write!(
            out,
            "\nwitness_table ${}: {}",
            table.conforming_type(),
            table.protocol()
        )?;
        write_entries(out, module, table.entries())?;

        wt = module.next_witness_table(w);
    }

    let mut dwt = module.first_default_witness_table();

    while let Some(d) = dwt {
        let table = module.default_witness_table(d);

        write!(out, "\ndefault_witness_table {}", table.protocol())?;
        write_entries(out, module, table.entries())?;

        dwt = module.next_default_witness_table(d);
    }

    Ok(())
}

fn write_flags(out: &mut String, flags: FunctionFlags) -> fmt::Result {
    let names: Vec<&str> = [
        (FunctionFlags::IS_DEFINITION, "definition"),
        (FunctionFlags::NEEDS_STACK_PROTECTION, "stack_protection"),
        (FunctionFlags::TRANSPARENT, "transparent"),
    ]
    .into_iter()
    .filter(|(flag, _)| flags.contains(*flag))
    .map(|(_, name)| name)
    .collect();

    if names.is_empty() {
        return Ok(());
    }

    write!(out, " [{}]", names.join(", "))
}

fn write_entries(out: &mut String, module: &Module, entries: &[TableEntry]) -> fmt::Result {
    writeln!(out, " {{")?;

    for entry in entries {
        match entry.target() {
            // entries that point outside the module are still printed, the
            // verifier is the one that reports them
            Some(f) if module.contains_function(f) => {
                writeln!(out, "  #{}: @{}", entry.name(), module.function_name(f))?
            }
            Some(f) => writeln!(out, "  #{}: <foreign {f:?}>", entry.name())?,
            None => writeln!(out, "  #{}: <none>", entry.name())?,
        }
    }

    writeln!(out, "}}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::*;

    #[test]
    fn prints_every_entity_kind() {
        let mut module = Module::new("shapes");
        let area = module.define_function("Circle.area", ["%0 = load %self", "return %0"]);
        let _ = module.declare_function("print");
        module.add_vtable(VTable::new("Circle").with_entry("area", Some(area)));
        module.add_witness_table(WitnessTable::new("Circle", "Shape").with_entry("area", Some(area)));
        module.add_default_witness_table(DefaultWitnessTable::new("Shape").with_entry("name", None));

        let expected = "module shapes

fn @Circle.area [definition] {
  %0 = load %self
  return %0
}

fn @print

vtable $Circle {
  #area: @Circle.area
}

witness_table $Circle: Shape {
  #area: @Circle.area
}

default_witness_table Shape {
  #name: <none>
}
";

        assert_eq!(stringify_module(&module), expected);
    }

    #[test]
    fn prints_flags() {
        let mut module = Module::new("m");
        let f = module.define_function("f", ["return"]);

        module
            .function_mut(f)
            .flags_mut()
            .insert(FunctionFlags::NEEDS_STACK_PROTECTION);

        assert!(stringify_module(&module).contains("fn @f [definition, stack_protection] {"));
    }

    #[test]
    fn prints_foreign_targets() {
        let mut other = Module::new("other");
        let foreign = other.declare_function("elsewhere");
        let mut module = Module::new("m");

        module.add_vtable(VTable::new("C").with_entry("m", Some(foreign)));

        assert!(stringify_module(&module).contains("#m: <foreign fn0>"));
    }
}
