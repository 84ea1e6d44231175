//! Categories command: list the category keys requests may use.

use std::io::Write;

use quinze_core::{CategoryDescriptor, CategoryTable};

use crate::CliError;

pub(crate) fn run_categories() -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_categories_with(&CategoryTable::default(), &mut stdout)
}

/// Write one line per category: the key, a tab, then its tag predicates.
pub(crate) fn run_categories_with(
    table: &CategoryTable,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    for descriptor in table.iter() {
        writeln!(writer, "{}\t{}", descriptor.key(), describe(descriptor))
            .map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

fn describe(descriptor: &CategoryDescriptor) -> String {
    descriptor
        .predicates()
        .iter()
        .map(|predicate| format!("{}={}", predicate.key(), predicate.values().join("|")))
        .collect::<Vec<_>>()
        .join(", ")
}
