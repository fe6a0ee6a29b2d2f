#![forbid(unsafe_code)]

//! Application-level context: identity, persisted settings and the panic
//! notification.
//!
//! Hosts create one [`AppContext`] per application. The binder does not need
//! it; it exists so forms have a shared place to persist user choices and to
//! surface unrecoverable errors raised by event handlers.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use fbind_core::ValueError;
use tracing::{error, info};

use crate::reactive::{Event, EventPublisher};

/// Failure to read, write or persist a setting.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("setting key must not be empty")]
    EmptyKey,
    #[error("failed to access settings file {}: {source}", path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {}: {reason}", path.display())]
    Parse {
        path: std::path::PathBuf,
        reason: String,
    },
    #[error("failed to serialize settings: {reason}")]
    Serialize { reason: String },
}

/// A flat, string-keyed settings store.
pub trait Settings {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: &str) -> Result<(), SettingsError>;

    /// Replace the in-memory state with the persisted one.
    fn load(&self) -> Result<(), SettingsError>;

    /// Persist the in-memory state.
    fn save(&self) -> Result<(), SettingsError>;
}

/// Settings kept only in memory. `load` and `save` do nothing.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemorySettings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }
}

impl Settings for MemorySettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<(), SettingsError> {
        if key.is_empty() {
            return Err(SettingsError::EmptyKey);
        }
        self.values
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn load(&self) -> Result<(), SettingsError> {
        Ok(())
    }

    fn save(&self) -> Result<(), SettingsError> {
        Ok(())
    }
}

#[cfg(feature = "settings-file")]
pub use file::FileSettings;

#[cfg(feature = "settings-file")]
mod file {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};

    use serde::{Deserialize, Serialize};
    use tracing::debug;

    use super::{Settings, SettingsError};

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct SettingsDocument {
        #[serde(default)]
        settings: BTreeMap<String, String>,
    }

    /// Settings persisted as a TOML document under a `[settings]` table.
    ///
    /// A missing file loads as empty. `save` creates parent directories.
    #[derive(Debug)]
    pub struct FileSettings {
        path: PathBuf,
        values: RefCell<BTreeMap<String, String>>,
    }

    impl FileSettings {
        #[must_use]
        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                values: RefCell::new(BTreeMap::new()),
            }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn io_error(&self, source: std::io::Error) -> SettingsError {
            SettingsError::Io {
                path: self.path.clone(),
                source,
            }
        }
    }

    impl Settings for FileSettings {
        fn get(&self, key: &str) -> Option<String> {
            self.values.borrow().get(key).cloned()
        }

        fn put(&self, key: &str, value: &str) -> Result<(), SettingsError> {
            if key.is_empty() {
                return Err(SettingsError::EmptyKey);
            }
            self.values
                .borrow_mut()
                .insert(key.to_owned(), value.to_owned());
            Ok(())
        }

        fn load(&self) -> Result<(), SettingsError> {
            if !self.path.exists() {
                self.values.borrow_mut().clear();
                return Ok(());
            }
            let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
            let document: SettingsDocument =
                toml::from_str(&content).map_err(|e| SettingsError::Parse {
                    path: self.path.clone(),
                    reason: e.to_string(),
                })?;
            debug!(path = %self.path.display(), entries = document.settings.len(), "settings loaded");
            *self.values.borrow_mut() = document.settings;
            Ok(())
        }

        fn save(&self) -> Result<(), SettingsError> {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
            }
            let document = SettingsDocument {
                settings: self.values.borrow().clone(),
            };
            let content = toml::to_string_pretty(&document).map_err(|e| {
                SettingsError::Serialize {
                    reason: e.to_string(),
                }
            })?;
            fs::write(&self.path, content).map_err(|e| self.io_error(e))?;
            debug!(path = %self.path.display(), "settings saved");
            Ok(())
        }
    }

}

/// Application identity, settings, exit request and panic notification.
pub struct AppContext {
    organization_name: String,
    product_name: String,
    settings: Option<Rc<dyn Settings>>,
    exit_code: Cell<Option<i32>>,
    panicking: EventPublisher<ValueError>,
}

impl AppContext {
    #[must_use]
    pub fn new(organization_name: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            organization_name: organization_name.into(),
            product_name: product_name.into(),
            settings: None,
            exit_code: Cell::new(None),
            panicking: EventPublisher::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Rc<dyn Settings>) -> Self {
        self.settings = Some(settings);
        self
    }

    #[must_use]
    pub fn organization_name(&self) -> &str {
        &self.organization_name
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn set_organization_name(&mut self, name: impl Into<String>) {
        self.organization_name = name.into();
    }

    pub fn set_product_name(&mut self, name: impl Into<String>) {
        self.product_name = name.into();
    }

    #[must_use]
    pub fn settings(&self) -> Option<Rc<dyn Settings>> {
        self.settings.clone()
    }

    pub fn set_settings(&mut self, settings: Option<Rc<dyn Settings>>) {
        self.settings = settings;
    }

    /// Record that the application should exit with `code`.
    ///
    /// Nothing is terminated here; the host's event loop polls
    /// [`AppContext::exit_requested`]. A later request overwrites the code.
    pub fn request_exit(&self, code: i32) {
        info!(code, "application exit requested");
        self.exit_code.set(Some(code));
    }

    #[must_use]
    pub fn exit_requested(&self) -> bool {
        self.exit_code.get().is_some()
    }

    /// The requested exit code, `0` until an exit is requested.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code.get().unwrap_or(0)
    }

    /// Raised by [`AppContext::report_panic`].
    #[must_use]
    pub fn panicking(&self) -> Event<ValueError> {
        self.panicking.event()
    }

    /// Log an unrecoverable error and notify `panicking` handlers.
    pub fn report_panic(&self, message: impl Into<String>) -> ValueError {
        let err = ValueError::new(message.into());
        error!(
            organization = %self.organization_name,
            product = %self.product_name,
            message = err.message(),
            "application panic reported"
        );
        self.panicking.publish(&err);
        err
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("organization_name", &self.organization_name)
            .field("product_name", &self.product_name)
            .field("has_settings", &self.settings.is_some())
            .field("exit_code", &self.exit_code.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_settings_round_trip_and_reject_empty_key() {
        let s = MemorySettings::new();
        s.put("b", "2").unwrap();
        s.put("a", "1").unwrap();
        s.put("a", "3").unwrap();
        assert_eq!(s.get("a").as_deref(), Some("3"));
        assert_eq!(s.keys(), ["a", "b"]);
        assert!(matches!(s.put("", "x"), Err(SettingsError::EmptyKey)));
        assert!(s.load().is_ok() && s.save().is_ok());
    }

    #[test]
    fn report_panic_notifies_handlers() {
        let app = AppContext::new("Acme", "Forms");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        app.panicking()
            .attach(move |e: &ValueError| sink.borrow_mut().push(e.clone()));

        let err = app.report_panic("disk full");
        assert_eq!(err.message(), "disk full");
        assert_eq!(seen.borrow().as_slice(), [err]);
    }

    #[test]
    fn exit_request_records_code() {
        let app = AppContext::new("Acme", "Forms");
        assert!(!app.exit_requested());
        assert_eq!(app.exit_code(), 0);

        app.request_exit(3);
        assert!(app.exit_requested());
        assert_eq!(app.exit_code(), 3);
        app.request_exit(0);
        assert!(app.exit_requested());
        assert_eq!(app.exit_code(), 0);
    }

    #[test]
    fn settings_are_shared() {
        let store: Rc<dyn Settings> = Rc::new(MemorySettings::new());
        let mut app = AppContext::new("Acme", "Forms").with_settings(Rc::clone(&store));
        app.settings().unwrap().put("k", "v").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));

        app.set_organization_name("Initech");
        app.set_settings(None);
        assert_eq!(app.organization_name(), "Initech");
        assert_eq!(app.product_name(), "Forms");
        assert!(app.settings().is_none());
    }
}
