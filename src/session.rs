//! An editing session: one root tree bound to one catalog snapshot.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::edit;
use crate::error::RuleTreeError;
use crate::types::{Catalog, EditError, Logic, RuleNode, ValidationResult};
use crate::validate::Validator;
use crate::xml::{self, EncodeOptions};

/// Owns the root of a rule tree while it is being built.
///
/// The session keeps the catalog snapshot it was created with, so changes to
/// a shared [`TypeRegistry`](crate::TypeRegistry) made afterwards do not
/// affect it. Every edit replaces the root with a new tree.
#[derive(Debug)]
pub struct Session {
    catalog: Arc<Catalog>,
    root: RuleNode,
    validator: Validator,
    last_error: Option<RuleTreeError>,
}

impl Session {
    /// A session whose root is an AND group holding one default rule.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let root = RuleNode::default_group(&catalog);
        Self {
            catalog,
            root,
            validator: Validator::new(),
            last_error: None,
        }
    }

    /// Use `validator` for [`generate_xml`](Self::generate_xml).
    #[must_use]
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn root(&self) -> &RuleNode {
        &self.root
    }

    /// The error recorded by the most recent failed operation, cleared by the
    /// next successful load or edit.
    pub fn last_error(&self) -> Option<&RuleTreeError> {
        self.last_error.as_ref()
    }

    /// Discard the current tree.
    pub fn replace_root(&mut self, root: RuleNode) {
        self.root = root;
        self.last_error = None;
    }

    /// Replace the root with the tree decoded from `input`. On failure the
    /// current root is kept and the error is also recorded.
    pub fn load_xml(&mut self, input: &str) -> Result<(), RuleTreeError> {
        match xml::decode(input, &self.catalog) {
            Ok(root) => {
                debug!(rules = root.rule_count(), "loaded rule document");
                self.replace_root(root);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "rule document rejected, keeping current tree");
                self.last_error = Some(e.clone().into());
                Err(e.into())
            }
        }
    }

    /// Encode the current tree as is.
    #[must_use]
    pub fn xml(&self) -> String {
        xml::encode(&self.root)
    }

    /// Encode the current tree only if it validates.
    ///
    /// # Errors
    ///
    /// Returns the findings when the tree is invalid.
    pub fn generate_xml(&self) -> Result<String, ValidationResult> {
        self.generate_xml_with(&EncodeOptions::default())
    }

    pub fn generate_xml_with(&self, options: &EncodeOptions) -> Result<String, ValidationResult> {
        let result = self.validator.validate(&self.root);
        if result.is_valid() {
            Ok(xml::encode_with(&self.root, options))
        } else {
            Err(result)
        }
    }

    pub fn validate(&self) -> ValidationResult {
        self.validator.validate(&self.root)
    }

    // -- Edits ------------------------------------------------------------

    pub fn set_field_type(&mut self, path: &[usize], type_value: &str) -> Result<(), EditError> {
        match edit::set_field_type(&self.root, path, type_value, &self.catalog) {
            Ok(root) => {
                self.replace_root(root);
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.clone().into());
                Err(e)
            }
        }
    }

    pub fn set_comparator(&mut self, path: &[usize], comp_value: &str) {
        let root = edit::set_comparator(&self.root, path, comp_value);
        self.replace_root(root);
    }

    pub fn set_value(&mut self, path: &[usize], value: &str) {
        let root = edit::set_value(&self.root, path, value);
        self.replace_root(root);
    }

    pub fn set_logic(&mut self, path: &[usize], logic: Logic) {
        let root = edit::set_logic(&self.root, path, logic);
        self.replace_root(root);
    }

    pub fn add_rule(&mut self, path: &[usize], after: Option<usize>) {
        let root = edit::add_default_rule(&self.root, path, after, &self.catalog);
        self.replace_root(root);
    }

    pub fn add_group(&mut self, path: &[usize], after: Option<usize>) {
        let root = edit::add_default_group(&self.root, path, after, &self.catalog);
        self.replace_root(root);
    }

    pub fn insert_child(&mut self, path: &[usize], after: Option<usize>, child: RuleNode) {
        let root = edit::insert_child(&self.root, path, after, child);
        self.replace_root(root);
    }

    pub fn remove_child(&mut self, path: &[usize], index: usize) {
        let root = edit::remove_child(&self.root, path, index);
        self.replace_root(root);
    }

    pub fn replace_subtree(&mut self, path: &[usize], node: RuleNode) {
        let root = edit::replace_subtree(&self.root, path, node);
        self.replace_root(root);
    }
}
