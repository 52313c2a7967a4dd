use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ConfigError;

/// One tracked company and the reply handles that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyConfig {
    /// Canonical company name used as `source` after normalization.
    pub name: String,
    /// Primary handle, without the leading `@`.
    pub handle: String,
    /// Secondary handles folded into `name`.
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompaniesFile {
    pub companies: Vec<CompanyConfig>,
}

/// Validated set of tracked companies.
#[derive(Debug, Clone)]
pub struct TrackedCompanies {
    companies: Vec<CompanyConfig>,
}

impl TrackedCompanies {
    /// Validate and wrap a list of companies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] on empty names, duplicate names, or
    /// a handle claimed by more than one company.
    pub fn new(companies: Vec<CompanyConfig>) -> Result<Self, ConfigError> {
        validate_companies(&companies)?;
        Ok(Self { companies })
    }

    /// The built-in set used when no companies file is configured.
    #[must_use]
    pub fn builtin() -> Self {
        let company = |name: &str, handle: &str, aliases: &[&str]| CompanyConfig {
            name: name.to_string(),
            handle: handle.to_string(),
            aliases: aliases.iter().map(ToString::to_string).collect(),
        };
        Self {
            companies: vec![
                company("PineLabs", "PineLabs", &[]),
                company("Razorpay", "Razorpay", &[]),
                company("Paytm", "Paytm", &["Paytmcare"]),
            ],
        }
    }

    #[must_use]
    pub fn companies(&self) -> &[CompanyConfig] {
        &self.companies
    }

    /// Canonical company names in configuration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.companies.iter().map(|c| c.name.as_str()).collect()
    }

    /// Every handle that must be queried: primary handles followed by aliases.
    #[must_use]
    pub fn handles(&self) -> Vec<&str> {
        self.companies
            .iter()
            .flat_map(|c| std::iter::once(c.handle.as_str()).chain(c.aliases.iter().map(String::as_str)))
            .collect()
    }

    /// Resolve a handle, alias, or company name to the canonical company name.
    ///
    /// Matching is case-insensitive and ignores a leading `@`.
    #[must_use]
    pub fn canonical_name(&self, source: &str) -> Option<&str> {
        let needle = strip_at(source.trim());
        self.companies
            .iter()
            .find(|c| {
                c.name.eq_ignore_ascii_case(needle)
                    || strip_at(&c.handle).eq_ignore_ascii_case(needle)
                    || c.aliases
                        .iter()
                        .any(|a| strip_at(a).eq_ignore_ascii_case(needle))
            })
            .map(|c| c.name.as_str())
    }

    /// Stable SHA-256 fingerprint of the tracked-handle set.
    ///
    /// Handles are lowercased and sorted so configuration order does not
    /// change the fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut handles: Vec<String> = self
            .handles()
            .into_iter()
            .map(|h| strip_at(h).to_lowercase())
            .collect();
        handles.sort();
        format!("{:x}", Sha256::digest(handles.join(",").as_bytes()))
    }
}

fn strip_at(handle: &str) -> &str {
    handle.strip_prefix('@').unwrap_or(handle)
}

/// Load and validate tracked companies from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_companies(path: &Path) -> Result<TrackedCompanies, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CompaniesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CompaniesFile = serde_yaml::from_str(&content)?;
    TrackedCompanies::new(file.companies)
}

fn validate_companies(companies: &[CompanyConfig]) -> Result<(), ConfigError> {
    if companies.is_empty() {
        return Err(ConfigError::Validation(
            "at least one company must be tracked".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();
    let mut seen_handles = HashSet::new();

    for company in companies {
        if company.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "company name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(company.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate company name: '{}'",
                company.name
            )));
        }

        for handle in std::iter::once(&company.handle).chain(company.aliases.iter()) {
            let normalized = strip_at(handle.trim()).to_lowercase();
            if normalized.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "company '{}' has an empty handle",
                    company.name
                )));
            }
            if !seen_handles.insert(normalized) {
                return Err(ConfigError::Validation(format!(
                    "handle '{}' is claimed by more than one company (last seen on '{}')",
                    handle, company.name
                )));
            }
        }
    }

    Ok(())
}
