// crates/label-verifier-config/src/config.rs
// ============================================================================
// Module: Label Verifier Configuration
// Description: Configuration loading and validation for label verification.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: label-verifier-core, label-verifier-builtins, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Each `[[labels]]` entry names a label and its ordered verifiers; the order
//! in the file is the order the verifiers run. Missing or invalid
//! configuration fails closed.
//! Security posture: config inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use label_verifier_builtins::VerifierConfig;
use label_verifier_builtins::build_chain;
use label_verifier_core::AdmissionAuditSink;
use label_verifier_core::AdmissionConfig;
use label_verifier_core::FileAuditSink;
use label_verifier_core::Label;
use label_verifier_core::LabelRegistry;
use label_verifier_core::NoopAuditSink;
use label_verifier_core::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "label-verifier.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "LABEL_VERIFIER_CONFIG";
/// Maximum size of a config file in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of configured labels.
pub const MAX_LABELS: usize = 1024;
/// Maximum number of verifiers attached to one label.
pub const MAX_VERIFIERS_PER_LABEL: usize = 64;
/// Minimum attempt timeout in milliseconds.
pub const MIN_ATTEMPT_TIMEOUT_MS: u64 = 100;
/// Maximum attempt timeout in milliseconds.
pub const MAX_ATTEMPT_TIMEOUT_MS: u64 = 3_600_000;

// ============================================================================
// SECTION: Root Configuration
// ============================================================================

/// Label verifier configuration loaded from TOML.
///
/// # Invariants
/// - Label names are unique and valid label identifiers.
/// - Every verifier entry passes [`VerifierConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelVerifierConfig {
    /// Admission controller settings.
    #[serde(default)]
    pub admission: AdmissionSettings,
    /// Audit output settings.
    #[serde(default)]
    pub audit: AuditConfig,
    /// Label chains, in file order.
    #[serde(default)]
    pub labels: Vec<LabelConfig>,
}

impl LabelVerifierConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.admission.validate()?;
        self.audit.validate()?;
        if self.labels.len() > MAX_LABELS {
            return Err(ConfigError::Invalid(format!(
                "labels exceeds max entries ({MAX_LABELS})"
            )));
        }
        let mut seen = BTreeSet::new();
        for (index, label) in self.labels.iter().enumerate() {
            label.validate(index)?;
            if !seen.insert(label.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate label: {}", label.name)));
            }
        }
        Ok(())
    }

    /// Builds the label registry from the configured chains.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a label or verifier cannot be built.
    pub fn build_registry(&self) -> Result<LabelRegistry, ConfigError> {
        let mut registry = LabelRegistry::new();
        for label in &self.labels {
            let name = Label::parse(label.name.clone())
                .map_err(|err| ConfigError::Invalid(err.to_string()))?;
            let chain = build_chain(&label.verifiers).map_err(|err| {
                ConfigError::Invalid(format!("label {}: {err}", label.name))
            })?;
            registry.register(name, chain).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        }
        Ok(registry)
    }

    /// Returns the admission controller settings.
    #[must_use]
    pub const fn admission_config(&self) -> AdmissionConfig {
        self.admission.to_admission_config()
    }

    /// Opens the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn build_audit_sink(&self) -> Result<Arc<dyn AdmissionAuditSink>, ConfigError> {
        self.audit.build_sink()
    }
}

// ============================================================================
// SECTION: Admission Settings
// ============================================================================

/// Admission controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdmissionSettings {
    /// Deadline for a whole admission attempt in milliseconds.
    #[serde(default)]
    pub attempt_timeout_ms: Option<u64>,
}

impl AdmissionSettings {
    /// Validates the timeout bounds.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.attempt_timeout_ms
            && !(MIN_ATTEMPT_TIMEOUT_MS..=MAX_ATTEMPT_TIMEOUT_MS).contains(&timeout)
        {
            return Err(ConfigError::Invalid(format!(
                "admission.attempt_timeout_ms must be between {MIN_ATTEMPT_TIMEOUT_MS} and \
                 {MAX_ATTEMPT_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    /// Converts to the runtime configuration.
    #[must_use]
    pub const fn to_admission_config(self) -> AdmissionConfig {
        AdmissionConfig {
            attempt_timeout: match self.attempt_timeout_ms {
                Some(ms) => Some(Duration::from_millis(ms)),
                None => None,
            },
        }
    }
}

// ============================================================================
// SECTION: Audit Settings
// ============================================================================

/// Destination for admission audit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

/// Audit output settings.
///
/// # Invariants
/// - `path` is set exactly when `sink` is [`AuditSinkKind::File`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink kind.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Audit log path for the file sink.
    #[serde(default)]
    pub path: Option<String>,
}

impl AuditConfig {
    /// Validates sink and path consistency.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with the file sink".to_string(),
            )),
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    fn build_sink(&self) -> Result<Arc<dyn AdmissionAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, Some(path)) => FileAuditSink::new(Path::new(path.trim()))
                .map(|sink| Arc::new(sink) as Arc<dyn AdmissionAuditSink>)
                .map_err(|err| ConfigError::Io(format!("failed to open audit log: {err}"))),
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
        }
    }
}

// ============================================================================
// SECTION: Label Settings
// ============================================================================

/// One label and its ordered verifier chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelConfig {
    /// Label name.
    pub name: String,
    /// Verifiers in execution order.
    #[serde(default)]
    pub verifiers: Vec<VerifierConfig>,
}

impl LabelConfig {
    /// Validates the label name and its verifiers.
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        Label::parse(self.name.clone())
            .map_err(|err| ConfigError::Invalid(format!("labels[{index}].name: {err}")))?;
        if self.verifiers.len() > MAX_VERIFIERS_PER_LABEL {
            return Err(ConfigError::Invalid(format!(
                "label {} exceeds max verifiers ({MAX_VERIFIERS_PER_LABEL})",
                self.name
            )));
        }
        for (position, verifier) in self.verifiers.iter().enumerate() {
            verifier.validate().map_err(|err| {
                ConfigError::Invalid(format!("label {} verifiers[{position}]: {err}", self.name))
            })?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
