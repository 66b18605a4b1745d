use std::fmt;

/// One validation problem, located by a breadcrumb such as
/// `root.children[1].children[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    path: String,
    message: String,
}

impl Finding {
    pub(crate) fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_owned(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Outcome of [`validate()`](crate::validate()): the findings in tree order.
///
/// Validation never fails; a tree is valid when there are no findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[must_use]
pub struct ValidationResult {
    findings: Vec<Finding>,
}

impl ValidationResult {
    pub(crate) fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.findings.is_empty()
    }

    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Findings rendered as `path: message` strings.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.findings.iter().map(ToString::to_string).collect()
    }

    /// Findings located exactly at `path`.
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.findings.iter().filter(move |f| f.path == path)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.findings.is_empty() {
            return write!(f, "valid");
        }
        write!(f, "{} error(s): {}", self.findings.len(), self.errors().join("; "))
    }
}

impl std::error::Error for ValidationResult {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_is_valid() {
        let result = ValidationResult::default();
        assert!(result.is_valid());
        assert!(result.errors().is_empty());
        assert_eq!(result.to_string(), "valid");
    }

    #[test]
    fn findings_render_with_path() {
        let result = ValidationResult::new(vec![
            Finding::new("root", "Group must have at least one child"),
            Finding::new("root.children[0]", "Rule value is required"),
        ]);
        assert!(!result.is_valid());
        assert_eq!(
            result.errors(),
            [
                "root: Group must have at least one child",
                "root.children[0]: Rule value is required",
            ]
        );
        assert_eq!(result.at("root.children[0]").count(), 1);
        assert!(result.to_string().starts_with("2 error(s): "));
    }
}
