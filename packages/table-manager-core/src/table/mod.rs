//! Managed tables: schema translation, row validation and the table handle.

mod column;
mod handle;
mod registry;
mod translator;
pub mod validation;

pub use column::{ColumnDescriptor, ColumnSpec, TableSchema};
pub use handle::TableHandle;
pub use registry::TableRegistry;
pub use translator::{SchemaTranslator, PRIMARY_KEY};
pub use validation::{RowValidator, TypeFamily, Validation, ValidationErrors};

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
