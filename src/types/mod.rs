mod catalog;
mod error;
mod input_field;
mod node;
mod report;
mod rule_type;

pub use catalog::{Catalog, CatalogConfig};
pub use error::{ConfigError, EditError};
pub use input_field::{FieldValidation, InputField, InputKind, SelectOption};
pub use node::{Group, Logic, Rule, RuleNode};
pub use report::{Finding, ValidationResult};
pub use rule_type::{BuiltinCheck, Comparator, RuleType};
