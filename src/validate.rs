use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use chrono::NaiveDate;
use parking_lot::Mutex;
use regex::Regex;
use tracing::warn;

use crate::types::{
    BuiltinCheck, Finding, InputField, InputKind, Rule, RuleNode, RuleType, ValidationResult,
};

/// A named value check referenced from a catalog's
/// [`FieldValidation::custom`](crate::FieldValidation::custom).
///
/// Returns the error message for an invalid value, `None` otherwise.
pub trait CustomCheck: Send + Sync {
    fn check(&self, value: &str) -> Option<String>;
}

impl<F> CustomCheck for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn check(&self, value: &str) -> Option<String> {
        self(value)
    }
}

/// When the built-in age / date of birth / income checks apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegacyChecks {
    /// Apply by rule type key: any type keyed `age`, `dob` or `income` gets
    /// the matching check, whatever else its descriptor says.
    #[default]
    ByKey,
    /// Apply only the check a descriptor declares in its `builtin` field.
    Declared,
}

/// Walks a rule tree and collects semantic findings.
///
/// # Example
///
/// ```
/// use ruletree::{Catalog, RuleNode, Validator, edit};
///
/// let catalog = Catalog::builtin();
/// let tree = RuleNode::default_group(&catalog);
/// let tree = edit::set_value(&tree, &[0], "42");
///
/// let result = Validator::new()
///     .with_check("even", |v: &str| {
///         (v.parse::<u32>().map_or(true, |n| n % 2 == 1)).then(|| "Must be even".to_owned())
///     })
///     .validate(&tree);
/// assert!(result.is_valid());
/// ```
#[derive(Default)]
pub struct Validator {
    legacy: LegacyChecks,
    checks: HashMap<String, Arc<dyn CustomCheck>>,
    /// Compiled field patterns; `None` marks a pattern that failed to compile.
    patterns: Mutex<HashMap<String, Option<Regex>>>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn legacy_checks(mut self, mode: LegacyChecks) -> Self {
        self.legacy = mode;
        self
    }

    /// Register a custom check under the identifier catalogs refer to.
    #[must_use]
    pub fn with_check(mut self, name: &str, check: impl CustomCheck + 'static) -> Self {
        self.checks.insert(name.to_owned(), Arc::new(check));
        self
    }

    /// Validate a tree. Never fails; problems are returned as findings in
    /// depth-first order.
    pub fn validate(&self, tree: &RuleNode) -> ValidationResult {
        let mut findings = Vec::new();
        self.walk(tree, "root", &mut findings);
        ValidationResult::new(findings)
    }

    fn walk(&self, node: &RuleNode, path: &str, out: &mut Vec<Finding>) {
        match node {
            RuleNode::Group(group) => {
                if group.children.is_empty() {
                    out.push(Finding::new(path, "Group must have at least one child"));
                }
                for (i, child) in group.children.iter().enumerate() {
                    self.walk(child, &format!("{path}.children[{i}]"), out);
                }
            }
            RuleNode::Rule(rule) => self.check_rule(rule, path, out),
        }
    }

    fn check_rule(&self, rule: &Rule, path: &str, out: &mut Vec<Finding>) {
        let value = rule.value.as_str();
        if value.trim().is_empty() {
            out.push(Finding::new(path, "Rule value is required"));
        }

        if let Some(check) = self.builtin_for(&rule.rule_type) {
            for message in builtin_messages(check, value) {
                out.push(Finding::new(path, message));
            }
        }

        if let Some(field) = &rule.rule_type.input_field {
            if let Some(message) = self.check_input(field, value) {
                out.push(Finding::new(path, message));
            }
        }
    }

    fn builtin_for(&self, rule_type: &RuleType) -> Option<BuiltinCheck> {
        match self.legacy {
            LegacyChecks::ByKey => BuiltinCheck::for_key(&rule_type.value),
            LegacyChecks::Declared => rule_type.builtin,
        }
    }

    /// Declarative checks of an input field; the first failure wins.
    #[must_use]
    pub fn check_input(&self, field: &InputField, value: &str) -> Option<String> {
        let validation = field.validation.as_ref();

        if let Some(pattern) = validation.and_then(|v| v.pattern.as_deref()) {
            if !value.is_empty() && !self.pattern_matches(pattern, value) {
                return Some("Invalid format".to_owned());
            }
        }

        let len = value.chars().count();
        if let Some(min) = validation.and_then(|v| v.min_length) {
            if len < min {
                return Some(format!("Minimum length is {min} characters"));
            }
        }
        if let Some(max) = validation.and_then(|v| v.max_length) {
            if len > max {
                return Some(format!("Maximum length is {max} characters"));
            }
        }

        if field.kind == InputKind::Select
            && !field.options.is_empty()
            && !value.is_empty()
            && !field.has_option(value)
        {
            let allowed: Vec<&str> = field.options.iter().map(|o| o.value.as_str()).collect();
            return Some(format!("Value must be one of: {}", allowed.join(", ")));
        }

        let name = validation.and_then(|v| v.custom.as_deref())?;
        match self.checks.get(name) {
            Some(check) => check.check(value).filter(|m| !m.is_empty()),
            None => {
                warn!(check = name, "custom check is not registered, skipping");
                None
            }
        }
    }

    /// An unusable pattern is logged once and then treated as matching.
    fn pattern_matches(&self, pattern: &str, value: &str) -> bool {
        let re = {
            let mut cache = self.patterns.lock();
            cache
                .entry(pattern.to_owned())
                .or_insert_with(|| match Regex::new(pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern, error = %e, "unusable validation pattern, skipping");
                        None
                    }
                })
                .clone()
        };
        re.map_or(true, |re| re.is_match(value))
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Validator")
            .field("legacy", &self.legacy)
            .field("checks", &names)
            .finish()
    }
}

/// Validate a tree with the default [`Validator`].
pub fn validate(tree: &RuleNode) -> ValidationResult {
    Validator::new().validate(tree)
}

fn builtin_messages(check: BuiltinCheck, value: &str) -> Vec<&'static str> {
    let mut messages = Vec::new();
    match check {
        BuiltinCheck::Age => {
            if !is_whole_number(value) {
                messages.push("Age must be a whole number");
            }
            if has_negative_prefix(value, false) {
                messages.push("Age must be positive");
            }
        }
        BuiltinCheck::Dob => {
            if !is_iso_date_shape(value) {
                messages.push("Date must be in YYYY-MM-DD format");
            }
            if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                messages.push("Invalid date");
            }
        }
        BuiltinCheck::Income => {
            if !is_amount(value) {
                messages.push("Income must be a valid number");
            }
            if has_negative_prefix(value, true) {
                messages.push("Income must be positive");
            }
        }
    }
    messages
}

static WHOLE_NUMBER: LazyLock<Regex> = LazyLock::new(|| shape(r"^(?-u:\d)+$"));
static AMOUNT: LazyLock<Regex> = LazyLock::new(|| shape(r"^(?-u:\d)+(\.(?-u:\d){1,2})?$"));
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| shape(r"^(?-u:\d){4}-(?-u:\d){2}-(?-u:\d){2}$"));

fn shape(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in shape pattern compiles")
}

fn is_whole_number(value: &str) -> bool {
    WHOLE_NUMBER.is_match(value)
}

fn is_amount(value: &str) -> bool {
    AMOUNT.is_match(value)
}

fn is_iso_date_shape(value: &str) -> bool {
    ISO_DATE.is_match(value)
}

/// Whether the leading number of `value` (after whitespace, the way a
/// lenient numeric prefix parse reads it) is below zero.
fn has_negative_prefix(value: &str, allow_fraction: bool) -> bool {
    let Some(rest) = value.trim_start().strip_prefix('-') else {
        return false;
    };
    let mut seen_dot = false;
    for c in rest.chars() {
        match c {
            '1'..='9' => return true,
            '0' => {}
            '.' if allow_fraction && !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit;
    use crate::types::{Catalog, Comparator, FieldValidation, Logic};

    fn rule(key: &str, value: &str) -> RuleNode {
        let catalog = Catalog::builtin();
        let node = RuleNode::rule_with_type(&catalog, key).unwrap();
        edit::set_value(&node, &[], value)
    }

    fn messages(node: &RuleNode) -> Vec<String> {
        validate(node)
            .findings()
            .iter()
            .map(|f| f.message().to_owned())
            .collect()
    }

    fn custom_type(field: InputField) -> Arc<RuleType> {
        Arc::new(
            RuleType::new("Category", "category")
                .comparator("Equals", "equals")
                .input_field(field),
        )
    }

    fn custom_rule(field: InputField, value: &str) -> RuleNode {
        RuleNode::rule(custom_type(field), Comparator::new("Equals", "equals"), value)
    }

    #[test]
    fn empty_group_is_invalid() {
        let result = validate(&RuleNode::group(Logic::And, vec![]));
        assert!(!result.is_valid());
        assert_eq!(result.errors(), ["root: Group must have at least one child"]);
    }

    #[test]
    fn blank_value_is_required_for_every_type() {
        for key in ["age", "dob", "income", "enrolment_status"] {
            for value in ["", "   "] {
                let msgs = messages(&rule(key, value));
                assert!(
                    msgs.iter().any(|m| m.contains("required")),
                    "{key} {value:?}: {msgs:?}"
                );
            }
        }
    }

    #[test]
    fn age_checks() {
        assert_eq!(
            messages(&rule("age", "-1")),
            ["Age must be a whole number", "Age must be positive"]
        );
        assert_eq!(messages(&rule("age", "12.5")), ["Age must be a whole number"]);
        assert!(messages(&rule("age", "42")).is_empty());
        assert!(messages(&rule("age", "0")).is_empty());
        assert_eq!(messages(&rule("age", "-0")), ["Age must be a whole number"]);
    }

    #[test]
    fn dob_checks() {
        assert!(messages(&rule("dob", "2000-01-01")).is_empty());
        assert_eq!(messages(&rule("dob", "2001-02-29")), ["Invalid date"]);
        assert_eq!(
            messages(&rule("dob", "01/01/2000")),
            ["Date must be in YYYY-MM-DD format", "Invalid date"]
        );
    }

    #[test]
    fn income_checks() {
        assert!(messages(&rule("income", "20000")).is_empty());
        assert!(messages(&rule("income", "20000.5")).is_empty());
        assert!(messages(&rule("income", "20000.55")).is_empty());
        assert_eq!(
            messages(&rule("income", "20000.555")),
            ["Income must be a valid number"]
        );
        assert_eq!(
            messages(&rule("income", "-0.5")),
            ["Income must be a valid number", "Income must be positive"]
        );
    }

    #[test]
    fn status_has_no_builtin_checks() {
        assert!(messages(&rule("enrolment_status", "anything goes")).is_empty());
    }

    #[test]
    fn findings_carry_breadcrumbs() {
        let catalog = Catalog::builtin();
        let tree = RuleNode::default_group(&catalog);
        let tree = edit::add_default_group(&tree, &[], Some(0), &catalog);
        let tree = edit::set_value(&tree, &[0], "30");
        let result = validate(&tree);
        assert_eq!(
            result.errors(),
            [
                "root.children[1].children[0]: Rule value is required",
                "root.children[1].children[0]: Age must be a whole number",
            ]
        );
    }

    #[test]
    fn declared_mode_ignores_repurposed_keys() {
        let repurposed = Arc::new(RuleType::new("Age Group", "age").comparator("Is", "is"));
        let node = RuleNode::rule(repurposed, Comparator::new("Is", "is"), "senior");

        assert!(!validate(&node).is_valid());
        let declared = Validator::new().legacy_checks(LegacyChecks::Declared);
        assert!(declared.validate(&node).is_valid());

        let declared_age = rule("age", "abc");
        assert!(!declared.validate(&declared_age).is_valid());
    }

    #[test]
    fn pattern_check() {
        let field = InputField::new(InputKind::Text).validation(FieldValidation {
            pattern: Some("^[a-z]+$".into()),
            ..FieldValidation::default()
        });
        assert!(messages(&custom_rule(field.clone(), "books")).is_empty());
        assert_eq!(messages(&custom_rule(field, "Books!")), ["Invalid format"]);
    }

    #[test]
    fn length_checks() {
        let field = InputField::new(InputKind::Text).validation(FieldValidation {
            min_length: Some(2),
            max_length: Some(5),
            ..FieldValidation::default()
        });
        assert_eq!(
            messages(&custom_rule(field.clone(), "a")),
            ["Minimum length is 2 characters"]
        );
        assert_eq!(
            messages(&custom_rule(field.clone(), "abcdef")),
            ["Maximum length is 5 characters"]
        );
        assert!(messages(&custom_rule(field, "abc")).is_empty());
    }

    #[test]
    fn first_generic_failure_wins() {
        let field = InputField::new(InputKind::Text).validation(FieldValidation {
            pattern: Some("^[0-9]+$".into()),
            max_length: Some(2),
            ..FieldValidation::default()
        });
        assert_eq!(messages(&custom_rule(field, "abcdef")), ["Invalid format"]);
    }

    #[test]
    fn select_requires_known_option() {
        let field = InputField::new(InputKind::Select)
            .option("Full time", "full_time")
            .option("Part time", "part_time");
        assert!(messages(&custom_rule(field.clone(), "part_time")).is_empty());
        assert_eq!(
            messages(&custom_rule(field, "retired")),
            ["Value must be one of: full_time, part_time"]
        );
    }

    #[test]
    fn custom_check_by_name() {
        let field = InputField::new(InputKind::Text).validation(FieldValidation {
            custom: Some("category".into()),
            ..FieldValidation::default()
        });
        let validator = Validator::new().with_check("category", |v: &str| {
            (!["books", "sports"].contains(&v)).then(|| "Please enter a valid category".to_owned())
        });

        let ok = custom_rule(field.clone(), "books");
        assert!(validator.validate(&ok).is_valid());

        let bad = custom_rule(field, "cars");
        let result = validator.validate(&bad);
        assert_eq!(result.errors(), ["root: Please enter a valid category"]);
    }

    #[test]
    fn unregistered_custom_check_is_skipped() {
        let field = InputField::new(InputKind::Text).validation(FieldValidation {
            custom: Some("missing".into()),
            ..FieldValidation::default()
        });
        assert!(messages(&custom_rule(field, "x")).is_empty());
    }

    #[test]
    fn empty_custom_message_counts_as_pass() {
        let field = InputField::new(InputKind::Text).validation(FieldValidation {
            custom: Some("lenient".into()),
            ..FieldValidation::default()
        });
        let validator = Validator::new().with_check("lenient", |_: &str| Some(String::new()));
        assert!(validator.validate(&custom_rule(field, "x")).is_valid());
    }

    #[test]
    fn builtin_and_generic_findings_accumulate() {
        let field = InputField::new(InputKind::Integer).validation(FieldValidation {
            max_length: Some(2),
            ..FieldValidation::default()
        });
        let rule_type = Arc::new(
            RuleType::new("Age", "age")
                .comparator("Equals", "equals")
                .input_field(field),
        );
        let node = RuleNode::rule(rule_type, Comparator::new("Equals", "equals"), "12.5");
        assert_eq!(
            messages(&node),
            ["Age must be a whole number", "Maximum length is 2 characters"]
        );
    }

    #[test]
    fn shape_helpers() {
        assert!(is_iso_date_shape("1999-12-31"));
        assert!(!is_iso_date_shape("1999-1-31"));
        assert!(!is_iso_date_shape("1999/12/31"));
        assert!(is_amount("0.1"));
        assert!(!is_amount(".5"));
        assert!(!is_amount("5."));
        assert!(has_negative_prefix("  -3abc", false));
        assert!(!has_negative_prefix("-0.0", true));
        assert!(has_negative_prefix("-0.01", true));
        assert!(!has_negative_prefix("-0.5", false));
        assert!(!has_negative_prefix("-abc", true));
    }

    #[test]
    fn shapes_accept_ascii_digits_only() {
        assert!(is_whole_number("0042"));
        assert!(!is_whole_number("\u{664}\u{662}"));
        assert!(!is_whole_number("42\n"));
        assert!(!is_amount("\u{661}.50"));
        assert!(!is_iso_date_shape("\u{662}000-01-01"));
        assert_eq!(
            messages(&rule("age", "\u{664}\u{662}")),
            ["Age must be a whole number"]
        );
    }

    #[test]
    fn patterns_compile_once_per_validator() {
        let pattern = |p: &str| {
            InputField::new(InputKind::Text).validation(FieldValidation {
                pattern: Some(p.into()),
                ..FieldValidation::default()
            })
        };
        let field = pattern("^[a-z]+$");
        let validator = Validator::new();
        for _ in 0..3 {
            assert_eq!(validator.check_input(&field, "books"), None);
            assert_eq!(
                validator.check_input(&field, "Books!").as_deref(),
                Some("Invalid format")
            );
        }
        assert_eq!(validator.patterns.lock().len(), 1);

        // Fields built outside a catalog may carry a broken pattern.
        let broken = pattern("(unclosed");
        assert_eq!(validator.check_input(&broken, "anything"), None);
        assert_eq!(validator.check_input(&broken, "again"), None);
        let cache = validator.patterns.lock();
        assert_eq!(cache.len(), 2);
        assert!(cache.get("(unclosed").is_some_and(Option::is_none));
    }

    #[test]
    fn debug_lists_check_names() {
        let validator = Validator::new()
            .with_check("b", |_: &str| None)
            .with_check("a", |_: &str| None);
        assert_eq!(
            format!("{validator:?}"),
            r#"Validator { legacy: ByKey, checks: ["a", "b"] }"#
        );
    }
}
