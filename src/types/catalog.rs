use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::rule_type::{BuiltinCheck, RuleType};

/// Element names the XML codec gives structural meaning to.
const RESERVED_KEYS: &[&str] = &["rules", "group", "rule", "logic"];

/// The external catalog document: `{ "ruleTypes": [...] }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogConfig {
    pub rule_types: Vec<RuleType>,
}

impl CatalogConfig {
    /// Parse a catalog document from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not a catalog document.
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }
}

/// An immutable, validated snapshot of the known rule types.
///
/// Never empty; type keys are unique and every type has at least one
/// comparator. Changing the catalog produces a new snapshot, so trees and
/// sessions holding an `Arc<Catalog>` never observe concurrent edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    types: Vec<Arc<RuleType>>,
}

impl Catalog {
    /// Validate and wrap a list of rule types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] describing the first offending descriptor.
    pub fn new(types: Vec<RuleType>) -> Result<Self, ConfigError> {
        validate_types(&types)?;
        Ok(Self {
            types: types.into_iter().map(Arc::new).collect(),
        })
    }

    /// Build a catalog from a parsed configuration document.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::new`].
    pub fn from_config(config: CatalogConfig) -> Result<Self, ConfigError> {
        Self::new(config.rule_types)
    }

    /// The built-in catalog: age, date of birth, household income and
    /// enrolment status.
    #[must_use]
    pub fn builtin() -> Self {
        let types = vec![
            RuleType::new("Age", "age")
                .comparator("Equals", "equals")
                .comparator("Less Than", "less_than")
                .comparator("Greater Than", "greater_than")
                .comparator("Between", "between")
                .builtin(BuiltinCheck::Age),
            RuleType::new("Date of Birth", "dob")
                .comparator("Before", "before")
                .comparator("After", "after")
                .comparator("On", "on")
                .comparator("Between", "between")
                .builtin(BuiltinCheck::Dob),
            RuleType::new("Household Income", "income")
                .comparator("Less Than", "less_than")
                .comparator("Greater Than", "greater_than")
                .comparator("Equals", "equals")
                .comparator("Between", "between")
                .builtin(BuiltinCheck::Income),
            RuleType::new("Enrolment Status", "enrolment_status")
                .comparator("Equals", "equals")
                .comparator("Not Equals", "not_equals"),
        ];
        Self {
            types: types.into_iter().map(Arc::new).collect(),
        }
    }

    /// The shared descriptors, in catalog order.
    #[must_use]
    pub fn types(&self) -> &[Arc<RuleType>] {
        &self.types
    }

    /// An owned copy of every descriptor, in catalog order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<RuleType> {
        self.types.iter().map(|t| RuleType::clone(t)).collect()
    }

    #[must_use]
    pub fn get(&self, value: &str) -> Option<&Arc<RuleType>> {
        self.types.iter().find(|t| t.value == value)
    }

    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        self.get(value).is_some()
    }

    /// Position of a type key in catalog order.
    #[must_use]
    pub fn position(&self, value: &str) -> Option<usize> {
        self.types.iter().position(|t| t.value == value)
    }

    /// The default rule type, used for new rules and unknown keys.
    #[must_use]
    pub fn first(&self) -> &Arc<RuleType> {
        &self.types[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Always `false` for a constructed catalog; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RuleType>> {
        self.types.iter()
    }

    /// A new snapshot with `extra` appended.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a new descriptor is invalid or its key is
    /// already taken.
    pub fn with_added(&self, extra: Vec<RuleType>) -> Result<Self, ConfigError> {
        let mut all = self.to_vec();
        all.extend(extra);
        Self::new(all)
    }

    /// A new snapshot without the type `value`.
    ///
    /// Returns `None` if the key is absent or is the last remaining type.
    #[must_use]
    pub fn without(&self, value: &str) -> Option<Self> {
        let idx = self.position(value)?;
        if self.types.len() <= 1 {
            return None;
        }
        let mut types = self.types.clone();
        types.remove(idx);
        Some(Self { types })
    }

    /// A new snapshot with the type `value` replaced in place.
    ///
    /// Returns `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the replacement is invalid or renames the
    /// type onto another existing key.
    pub fn with_updated(
        &self,
        value: &str,
        replacement: RuleType,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(idx) = self.position(value) else {
            return Ok(None);
        };
        let mut all = self.to_vec();
        all[idx] = replacement;
        Self::new(all).map(Some)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.types.iter().map(|t| t.value.as_str()).collect();
        write!(f, "Catalog[{}]", keys.join(", "))
    }
}

/// Whether `value` can be written as an XML element name without colliding
/// with the codec's structural elements.
fn is_valid_key(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        return false;
    }
    !RESERVED_KEYS.contains(&value)
}

fn validate_types(types: &[RuleType]) -> Result<(), ConfigError> {
    if types.is_empty() {
        return Err(ConfigError::EmptyCatalog);
    }

    let mut seen = HashSet::new();
    for (index, t) in types.iter().enumerate() {
        if t.label.is_empty() {
            return Err(ConfigError::EmptyTypeField {
                index,
                field: "label",
            });
        }
        if t.value.is_empty() {
            return Err(ConfigError::EmptyTypeField {
                index,
                field: "value",
            });
        }
        if !is_valid_key(&t.value) {
            return Err(ConfigError::InvalidKey {
                value: t.value.clone(),
            });
        }
        if !seen.insert(t.value.as_str()) {
            return Err(ConfigError::DuplicateType {
                value: t.value.clone(),
            });
        }
        validate_comparators(t)?;

        let pattern = t
            .input_field
            .as_ref()
            .and_then(|f| f.validation.as_ref())
            .and_then(|v| v.pattern.as_deref());
        if let Some(pattern) = pattern {
            regex::Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                rule_type: t.value.clone(),
                reason: e.to_string(),
            })?;
        }
    }
    Ok(())
}

fn validate_comparators(t: &RuleType) -> Result<(), ConfigError> {
    if t.comparators.is_empty() {
        return Err(ConfigError::NoComparators {
            rule_type: t.value.clone(),
        });
    }
    let mut seen = HashSet::new();
    for (index, c) in t.comparators.iter().enumerate() {
        let empty = if c.label.is_empty() {
            Some("label")
        } else if c.value.is_empty() {
            Some("value")
        } else {
            None
        };
        if let Some(field) = empty {
            return Err(ConfigError::EmptyComparatorField {
                rule_type: t.value.clone(),
                index,
                field,
            });
        }
        if !seen.insert(c.value.as_str()) {
            return Err(ConfigError::DuplicateComparator {
                rule_type: t.value.clone(),
                comparator: c.value.clone(),
            });
        }
    }
    Ok(())
}
