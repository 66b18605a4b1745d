//! Build, edit, validate and serialize boolean rule trees.
//!
//! A rule tree is a [`RuleNode`]: either a leaf [`Rule`] (rule type,
//! comparator, value) or a [`Group`] combining its children with AND / OR.
//! Which rule types exist and which comparators each one offers comes from a
//! [`Catalog`], usually taken as a snapshot from a shared [`TypeRegistry`].
//!
//! ```
//! use std::sync::Arc;
//! use ruletree::{Catalog, Logic, Session};
//!
//! let mut session = Session::new(Arc::new(Catalog::builtin()));
//! session.set_value(&[0], "30");
//! session.add_rule(&[], Some(0));
//! session.set_field_type(&[1], "income").unwrap();
//! session.set_value(&[1], "20000");
//! session.set_logic(&[], Logic::Or);
//!
//! let xml = session.generate_xml().unwrap();
//! assert!(xml.contains(r#"<income comparator="less_than">20000</income>"#));
//! ```

pub mod edit;
mod error;
mod registry;
mod session;
mod types;
mod validate;
pub mod xml;

pub use error::RuleTreeError;
pub use registry::{RegistryError, TypeRegistry};
pub use session::Session;
pub use types::{
    BuiltinCheck, Catalog, CatalogConfig, Comparator, ConfigError, EditError, FieldValidation,
    Finding, Group, InputField, InputKind, Logic, Rule, RuleNode, RuleType, SelectOption,
    ValidationResult,
};
pub use validate::{validate, CustomCheck, LegacyChecks, Validator};
pub use xml::{decode, encode, encode_with, EncodeOptions, MalformedXml};
