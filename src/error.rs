use thiserror::Error;

use crate::registry::RegistryError;
use crate::types::{ConfigError, EditError};
use crate::xml::MalformedXml;

/// Unified error type covering the catalog, the XML codec and tree edits.
///
/// Returned by [`Session::load_xml()`](crate::Session::load_xml) and recorded
/// by [`Session::last_error()`](crate::Session::last_error).
#[derive(Debug, Error)]
pub enum RuleTreeError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Xml(#[from] MalformedXml),

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl From<ConfigError> for RuleTreeError {
    fn from(err: ConfigError) -> Self {
        Self::Registry(RegistryError::InvalidConfig(err))
    }
}
