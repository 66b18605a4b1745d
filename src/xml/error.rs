use std::fmt;

/// A rule document that is not well-formed XML or has no rule tree in it.
///
/// Decoding never returns a partial tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedXml {
    message: String,
}

impl MalformedXml {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for MalformedXml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed xml: {}", self.message)
    }
}

impl std::error::Error for MalformedXml {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MalformedXml::new("document has no root group");
        assert_eq!(err.to_string(), "malformed xml: document has no root group");
        assert_eq!(err.message(), "document has no root group");
    }
}
