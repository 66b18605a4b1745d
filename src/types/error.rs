use thiserror::Error;

/// A rule type catalog that cannot be installed.
///
/// Raised before any registry state changes; the previous catalog stays
/// in effect.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("catalog must define at least one rule type")]
    EmptyCatalog,

    #[error("rule type #{index} has an empty {field}")]
    EmptyTypeField { index: usize, field: &'static str },

    #[error("rule type '{rule_type}' defines no comparators")]
    NoComparators { rule_type: String },

    #[error("comparator #{index} of rule type '{rule_type}' has an empty {field}")]
    EmptyComparatorField {
        rule_type: String,
        index: usize,
        field: &'static str,
    },

    #[error("duplicate rule type '{value}'")]
    DuplicateType { value: String },

    #[error("duplicate comparator '{comparator}' in rule type '{rule_type}'")]
    DuplicateComparator {
        rule_type: String,
        comparator: String,
    },

    #[error("rule type key '{value}' is not usable as an element name")]
    InvalidKey { value: String },

    #[error("invalid validation pattern for rule type '{rule_type}': {reason}")]
    InvalidPattern { rule_type: String, reason: String },

    #[error("invalid catalog document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by tree edits that need the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("unknown rule type '{value}'")]
    UnknownRuleType { value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_type_field_message() {
        let err = ConfigError::EmptyTypeField {
            index: 2,
            field: "label",
        };
        assert_eq!(err.to_string(), "rule type #2 has an empty label");
    }

    #[test]
    fn no_comparators_message() {
        let err = ConfigError::NoComparators {
            rule_type: "score".into(),
        };
        assert_eq!(err.to_string(), "rule type 'score' defines no comparators");
    }

    #[test]
    fn empty_comparator_field_message() {
        let err = ConfigError::EmptyComparatorField {
            rule_type: "age".into(),
            index: 0,
            field: "value",
        };
        assert_eq!(
            err.to_string(),
            "comparator #0 of rule type 'age' has an empty value"
        );
    }

    #[test]
    fn duplicate_messages() {
        let err = ConfigError::DuplicateType {
            value: "age".into(),
        };
        assert_eq!(err.to_string(), "duplicate rule type 'age'");

        let err = ConfigError::DuplicateComparator {
            rule_type: "age".into(),
            comparator: "equals".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate comparator 'equals' in rule type 'age'"
        );
    }

    #[test]
    fn invalid_key_message() {
        let err = ConfigError::InvalidKey {
            value: "group".into(),
        };
        assert_eq!(
            err.to_string(),
            "rule type key 'group' is not usable as an element name"
        );
    }

    #[test]
    fn unknown_rule_type_message() {
        let err = EditError::UnknownRuleType {
            value: "height".into(),
        };
        assert_eq!(err.to_string(), "unknown rule type 'height'");
    }
}
