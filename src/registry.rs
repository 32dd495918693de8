use crate::backends::{generic, labstore};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::storage::ObjectStorage;
use std::collections::HashMap;

/// Builds a configured backend from (endpoint, access key, secret key, token)
pub type Constructor = fn(&str, &str, &str, &str) -> Result<Box<dyn ObjectStorage>>;

/// A backend name bound to its constructor
#[derive(Clone)]
pub struct BackendDescriptor {
    pub name: String,
    pub constructor: Constructor,
}

/// Name to constructor mapping.
///
/// The host program builds one of these at startup, typically with
/// [`Registry::with_builtin`], and passes it to whatever opens storage.
#[derive(Default)]
pub struct Registry {
    backends: HashMap<String, BackendDescriptor>,
}

impl Registry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every backend shipped with this crate
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(labstore::NAME, labstore::construct)?;
        registry.register(generic::NAME, generic::construct)?;
        Ok(registry)
    }

    /// Add a backend. Names are unique; registering one twice is an error.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor) -> Result<()> {
        let name = name.into();
        if self.backends.contains_key(&name) {
            return Err(Error::DuplicateBackend(name));
        }
        tracing::info!(backend = %name, "registered object storage backend");
        self.backends.insert(
            name.clone(),
            BackendDescriptor { name, constructor },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.backends.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate a backend. The constructor's result is returned unchanged.
    pub fn construct(
        &self,
        name: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
        token: &str,
    ) -> Result<Box<dyn ObjectStorage>> {
        let descriptor = self
            .backends
            .get(name)
            .ok_or_else(|| Error::UnknownBackend(name.to_string()))?;
        let storage = (descriptor.constructor)(endpoint, access_key, secret_key, token)?;
        tracing::info!(backend = %descriptor.name, storage = %storage.describe(), "created object storage");
        Ok(storage)
    }

    /// Construct from a [`StorageConfig`] and apply its storage class, if any.
    pub fn open(&self, config: &StorageConfig) -> Result<Box<dyn ObjectStorage>> {
        let storage = self.construct(
            &config.backend,
            &config.endpoint,
            &config.access_key,
            &config.secret_key,
            config.session_token.as_deref().unwrap_or_default(),
        )?;

        if let Some(storage_class) = &config.storage_class {
            storage
                .as_storage_class()
                .ok_or(Error::NotSupported("storage class"))?
                .set_storage_class(storage_class);
        }
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(_: &str, _: &str, _: &str, _: &str) -> Result<Box<dyn ObjectStorage>> {
        Err(Error::Configuration("malformed bucket name".to_string()))
    }

    #[test]
    fn test_builtin_names() {
        let registry = Registry::with_builtin().unwrap();
        assert_eq!(registry.names(), vec!["labstore", "restful"]);
        assert!(registry.contains("labstore"));
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = Registry::new();
        registry.register("x", labstore::construct).unwrap();
        let err = registry.register("x", generic::construct).unwrap_err();
        assert!(matches!(err, Error::DuplicateBackend(ref n) if n == "x"));
    }

    #[test]
    fn test_register_runtime_name() {
        let mut registry = Registry::new();
        let name = format!("lab-{}", 2);
        registry.register(name.clone(), labstore::construct).unwrap();
        assert!(registry.contains("lab-2"));
        assert!(registry.construct(&name, "store.example", "", "", "").is_ok());
        assert!(matches!(
            registry.register(name, generic::construct),
            Err(Error::DuplicateBackend(ref n)) if n == "lab-2"
        ));
    }

    #[test]
    fn test_unknown_backend() {
        let registry = Registry::with_builtin().unwrap();
        let err = registry.construct("nosuch", "host", "", "", "").unwrap_err();
        assert!(matches!(err, Error::UnknownBackend(ref n) if n == "nosuch"));
    }

    #[test]
    fn test_constructor_error_passed_through() {
        let mut registry = Registry::new();
        registry.register("broken", failing).unwrap();
        let err = registry.construct("broken", "host", "", "", "").unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m == "malformed bucket name"));
    }

    #[test]
    fn test_open_applies_storage_class() {
        let registry = Registry::with_builtin().unwrap();
        let config = StorageConfig {
            backend: "labstore".to_string(),
            endpoint: "store.example".to_string(),
            storage_class: Some("archive".to_string()),
            ..Default::default()
        };
        let storage = registry.open(&config).unwrap();
        assert_eq!(storage.as_storage_class().unwrap().storage_class(), "archive");
    }

    #[test]
    fn test_open_storage_class_unsupported() {
        let registry = Registry::with_builtin().unwrap();
        let config = StorageConfig {
            backend: "restful".to_string(),
            endpoint: "https://store.example/data".to_string(),
            storage_class: Some("cold".to_string()),
            ..Default::default()
        };
        assert!(registry.open(&config).unwrap_err().is_not_supported());
    }
}
