//! Shared, replaceable rule type catalog.
//!
//! A [`TypeRegistry`] hands out immutable [`Catalog`] snapshots. Reads are a
//! single atomic load; every mutation validates the new catalog first and then
//! swaps it in whole, so a rejected change never leaves partial state behind
//! and a session keeps working against the snapshot it started with.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::types::{Catalog, CatalogConfig, ConfigError, RuleType};

/// Errors raised while changing a [`TypeRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid rule type configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("catalog source '{locator}' is unavailable: {reason}")]
    SourceUnavailable { locator: String, reason: String },
}

/// Handle to the current rule type catalog.
pub struct TypeRegistry {
    current: ArcSwap<Catalog>,
    writer: Mutex<()>,
}

impl TypeRegistry {
    /// A registry holding the built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            current: ArcSwap::from_pointee(catalog),
            writer: Mutex::new(()),
        }
    }

    /// The current catalog snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.current.load_full()
    }

    /// An owned copy of the current descriptors.
    #[must_use]
    pub fn types(&self) -> Vec<RuleType> {
        self.current.load().to_vec()
    }

    /// Replace the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] and keeps the previous catalog
    /// if any descriptor is invalid.
    pub fn set_types(&self, types: Vec<RuleType>) -> Result<(), RegistryError> {
        self.replace_with("set", |_| Catalog::new(types).map(Some))
    }

    /// Append one rule type.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the descriptor is invalid or
    /// its key already exists.
    pub fn add_type(&self, rule_type: RuleType) -> Result<(), RegistryError> {
        self.add_types(vec![rule_type])
    }

    /// Append several rule types at once; all or nothing.
    ///
    /// # Errors
    ///
    /// Same as [`add_type`](Self::add_type).
    pub fn add_types(&self, types: Vec<RuleType>) -> Result<(), RegistryError> {
        self.replace_with("add", |current| current.with_added(types).map(Some))
    }

    /// Remove a rule type by key. Returns whether the catalog changed.
    ///
    /// Absent keys are ignored, and the last remaining type is never removed.
    pub fn remove_type(&self, value: &str) -> bool {
        let _guard = self.writer.lock();
        let current = self.current.load_full();
        match current.without(value) {
            Some(next) => {
                info!(rule_type = value, remaining = next.len(), "rule type removed");
                self.current.store(Arc::new(next));
                true
            }
            None => {
                if current.contains(value) {
                    warn!(rule_type = value, "refusing to remove the last rule type");
                }
                false
            }
        }
    }

    /// Replace the rule type `value` in place. Returns whether the key existed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the replacement is invalid.
    pub fn update_type(&self, value: &str, replacement: RuleType) -> Result<bool, RegistryError> {
        let mut found = false;
        self.replace_with("update", |current| {
            let next = current.with_updated(value, replacement)?;
            found = next.is_some();
            Ok(next)
        })?;
        Ok(found)
    }

    /// Restore the built-in catalog.
    pub fn reset_to_default(&self) {
        let _guard = self.writer.lock();
        self.current.store(Arc::new(Catalog::builtin()));
        info!("rule type catalog reset to defaults");
    }

    /// Replace the catalog from a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the document is invalid.
    pub fn load_from_config(&self, config: CatalogConfig) -> Result<(), RegistryError> {
        self.replace_with("load", |_| Catalog::from_config(config).map(Some))
    }

    /// Replace the catalog from the JSON text of a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidConfig`] if the text does not parse or
    /// describes an invalid catalog.
    pub fn load_from_json(&self, input: &str) -> Result<(), RegistryError> {
        let config = CatalogConfig::from_json(input).map_err(|e| {
            warn!(error = %e, "rejected catalog document");
            e
        })?;
        self.load_from_config(config)
    }

    /// Fetch a configuration document from a file path or an `http(s)://`
    /// URL and install it.
    ///
    /// The call blocks until the document is read; timeouts and retries are
    /// up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::SourceUnavailable`] if the document cannot be
    /// read and [`RegistryError::InvalidConfig`] if it is not a valid catalog.
    /// The registry is unchanged in both cases.
    #[instrument(skip(self))]
    pub fn load_from_source(&self, locator: &str) -> Result<(), RegistryError> {
        let body = fetch(locator).map_err(|e| {
            warn!(error = %e, "catalog source unavailable");
            e
        })?;
        self.load_from_json(&body)?;
        info!(locator, "catalog loaded from source");
        Ok(())
    }

    fn replace_with<F>(&self, action: &'static str, f: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&Catalog) -> Result<Option<Catalog>, ConfigError>,
    {
        let _guard = self.writer.lock();
        let current = self.current.load_full();
        match f(&current) {
            Ok(Some(next)) => {
                info!(action, rule_types = next.len(), "rule type catalog replaced");
                self.current.store(Arc::new(next));
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                warn!(action, error = %e, "rejected rule type catalog");
                Err(e.into())
            }
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("current", &*self.current.load())
            .finish_non_exhaustive()
    }
}

fn unavailable(locator: &str, reason: impl fmt::Display) -> RegistryError {
    RegistryError::SourceUnavailable {
        locator: locator.to_owned(),
        reason: reason.to_string(),
    }
}

fn fetch(locator: &str) -> Result<String, RegistryError> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        return fetch_url(locator);
    }
    std::fs::read_to_string(locator).map_err(|e| unavailable(locator, e))
}

#[cfg(feature = "http-source")]
fn fetch_url(url: &str) -> Result<String, RegistryError> {
    let mut response = ureq::get(url).call().map_err(|e| unavailable(url, e))?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| unavailable(url, e))
}

#[cfg(not(feature = "http-source"))]
fn fetch_url(url: &str) -> Result<String, RegistryError> {
    Err(unavailable(url, "http sources need the `http-source` feature"))
}
