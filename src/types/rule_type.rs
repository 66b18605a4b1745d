use std::fmt;

use serde::{Deserialize, Serialize};

use super::input_field::InputField;

/// A named relational operator allowed for a rule type (e.g. `greater_than`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Comparator {
    pub label: String,
    pub value: String,
}

impl Comparator {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Built-in value checks that predate declarative input fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinCheck {
    /// Non-negative whole number.
    Age,
    /// `YYYY-MM-DD` calendar date.
    Dob,
    /// Non-negative amount with at most two decimals.
    Income,
}

impl BuiltinCheck {
    /// The rule type key this check is tied to when applied by key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            BuiltinCheck::Age => "age",
            BuiltinCheck::Dob => "dob",
            BuiltinCheck::Income => "income",
        }
    }

    /// Resolve a rule type key to its legacy check, if any.
    #[must_use]
    pub fn for_key(key: &str) -> Option<Self> {
        match key {
            "age" => Some(BuiltinCheck::Age),
            "dob" => Some(BuiltinCheck::Dob),
            "income" => Some(BuiltinCheck::Income),
            _ => None,
        }
    }
}

/// A field type a rule can compare against, with its ordered comparators.
///
/// `value` is the unique key of the type within a [`Catalog`](super::Catalog)
/// and doubles as the XML element name of encoded rules. The first comparator
/// is the default one picked when a rule switches to this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleType {
    pub label: String,
    pub value: String,
    pub comparators: Vec<Comparator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_field: Option<InputField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub builtin: Option<BuiltinCheck>,
}

impl RuleType {
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            comparators: Vec::new(),
            input_field: None,
            builtin: None,
        }
    }

    /// Append a comparator.
    #[must_use]
    pub fn comparator(mut self, label: &str, value: &str) -> Self {
        self.comparators.push(Comparator::new(label, value));
        self
    }

    #[must_use]
    pub fn input_field(mut self, input_field: InputField) -> Self {
        self.input_field = Some(input_field);
        self
    }

    #[must_use]
    pub fn builtin(mut self, check: BuiltinCheck) -> Self {
        self.builtin = Some(check);
        self
    }

    /// Look up one of this type's comparators by key.
    #[must_use]
    pub fn find_comparator(&self, value: &str) -> Option<&Comparator> {
        self.comparators.iter().find(|c| c.value == value)
    }

    /// The default comparator. `None` only for a type that never passed
    /// catalog validation.
    #[must_use]
    pub fn first_comparator(&self) -> Option<&Comparator> {
        self.comparators.first()
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn age() -> RuleType {
        RuleType::new("Age", "age")
            .comparator("Equals", "equals")
            .comparator("Less Than", "less_than")
    }

    #[test]
    fn builder_keeps_comparator_order() {
        let t = age();
        let keys: Vec<&str> = t.comparators.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(keys, ["equals", "less_than"]);
        assert_eq!(t.first_comparator().unwrap().value, "equals");
    }

    #[test]
    fn find_comparator_by_key() {
        let t = age();
        assert_eq!(t.find_comparator("less_than").unwrap().label, "Less Than");
        assert!(t.find_comparator("between").is_none());
    }

    #[test]
    fn builtin_keys_round_trip() {
        for check in [BuiltinCheck::Age, BuiltinCheck::Dob, BuiltinCheck::Income] {
            assert_eq!(BuiltinCheck::for_key(check.key()), Some(check));
        }
        assert_eq!(BuiltinCheck::for_key("enrolment_status"), None);
    }

    #[test]
    fn deserializes_camel_case() {
        let json = r#"{
            "label": "Score",
            "value": "score",
            "comparators": [{ "label": "Equals", "value": "equals" }],
            "inputField": { "type": "number", "min": 0, "max": 100 },
            "builtin": "age"
        }"#;
        let t: RuleType = serde_json::from_str(json).unwrap();
        assert_eq!(t.value, "score");
        assert_eq!(t.builtin, Some(BuiltinCheck::Age));
        let field = t.input_field.unwrap();
        assert_eq!(field.max, Some(100.0));
    }

    #[test]
    fn display_shows_label_and_key() {
        assert_eq!(age().to_string(), "Age (age)");
    }
}
