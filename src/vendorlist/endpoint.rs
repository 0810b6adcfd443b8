//! Vendor list endpoint resolution
//!
//! Maps `(version, language, override)` to the primary document URL and,
//! when a language is configured, the URL of its localized overlay.

use url::Url;

use crate::error::{Error, Result};
use crate::models::Language;

/// Latest vendor list
pub const DEFAULT_ENDPOINT: &str = "https://vendorlist.consensu.org/vendorlist.json";

/// Latest localized purposes, `{language}` is substituted
pub const DEFAULT_LOCALIZED_ENDPOINT: &str =
    "https://vendorlist.consensu.org/purposes-{language}.json";

/// Specific vendor list version, `{version}` is substituted
pub const VERSIONED_ENDPOINT: &str = "https://vendorlist.consensu.org/v-{version}/vendorlist.json";

/// Localized purposes for a specific version
pub const VERSIONED_LOCALIZED_ENDPOINT: &str =
    "https://vendorlist.consensu.org/purposes-{language}-{version}.json";

/// Resolved resource identifiers for one vendor list configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    primary: String,
    localized: Option<String>,
    override_url: Option<Url>,
}

impl Endpoint {
    /// Resolve the endpoints for a configuration
    ///
    /// `version == None` selects the latest list, in which case `override_url`
    /// (if any) replaces the default primary endpoint. An explicit version
    /// must be at least 1 and always uses the versioned templates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `version` is below 1.
    pub fn resolve(
        version: Option<i64>,
        language: Option<&Language>,
        override_url: Option<&Url>,
    ) -> Result<Self> {
        match version {
            None => Ok(Self {
                primary: override_url
                    .map(|url| url.to_string())
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                localized: language
                    .map(|lang| DEFAULT_LOCALIZED_ENDPOINT.replace("{language}", lang.code())),
                override_url: override_url.cloned(),
            }),
            Some(version) if version < 1 => Err(Error::invalid_argument(format!(
                "vendor list version must be greater than 0, got {version}"
            ))),
            Some(version) => {
                let version = version.to_string();
                Ok(Self {
                    primary: VERSIONED_ENDPOINT.replace("{version}", &version),
                    localized: language.map(|lang| {
                        VERSIONED_LOCALIZED_ENDPOINT
                            .replace("{language}", lang.code())
                            .replace("{version}", &version)
                    }),
                    override_url: None,
                })
            }
        }
    }

    /// URL of the primary document
    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// URL of the localized overlay, present iff a language was configured
    pub fn localized(&self) -> Option<&str> {
        self.localized.as_deref()
    }

    /// Override source in effect for the primary document, if any
    pub fn override_url(&self) -> Option<&Url> {
        self.override_url.as_ref()
    }
}
