//! Connection parameter resolution
//!
//! A [`ConnectionParams`] record holds everything needed to authenticate
//! against one identity endpoint and list its projects. It is built once
//! per source and never changed afterwards.
//!
//! Every field resolves in the same order: an explicit override, then the
//! source's own value, then a default. `auth_url` has no default, so a
//! source without one cannot be processed.

use log::debug;
use serde_yaml::Value;

use crate::defaults;
use crate::document::{scalar_to_string, DocumentStore, PathSegment};
use crate::error::{Error, Result};

/// Fully resolved parameters for one identity endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub auth_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_domain_name: String,
    pub region_name: Option<String>,
    pub interface: String,
    pub identity_api_version: u32,
}

impl ConnectionParams {
    /// True when both username and password are present and non-empty.
    pub fn has_credentials(&self) -> bool {
        matches!(
            (&self.username, &self.password),
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty()
        )
    }
}

/// Raw, possibly incomplete values for each field.
///
/// Used both for explicit overrides and for values read from a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamValues {
    pub auth_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_domain_name: Option<String>,
    pub region_name: Option<String>,
    pub interface: Option<String>,
    /// Kept as text; coerced to an integer during resolution.
    pub identity_api_version: Option<String>,
}

impl ParamValues {
    /// Take each field from `self` when set, else from `fallback`.
    ///
    /// Blank values on either side count as unset, so an empty override
    /// never hides a real value further down.
    pub fn or(self, fallback: ParamValues) -> ParamValues {
        let pick =
            |own: Option<String>, other: Option<String>| non_empty(own).or(non_empty(other));
        ParamValues {
            auth_url: pick(self.auth_url, fallback.auth_url),
            username: pick(self.username, fallback.username),
            password: pick(self.password, fallback.password),
            user_domain_name: pick(self.user_domain_name, fallback.user_domain_name),
            region_name: pick(self.region_name, fallback.region_name),
            interface: pick(self.interface, fallback.interface),
            identity_api_version: pick(self.identity_api_version, fallback.identity_api_version),
        }
    }
}

/// Coerce an identity API version to an integer, defaulting silently.
///
/// Accepts plain integers and the common `"3.0"`-style spelling.
pub fn coerce_identity_api_version(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim) else {
        return defaults::IDENTITY_API_VERSION;
    };
    raw.parse::<u32>()
        .ok()
        .or_else(|| {
            raw.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0 && v.fract() == 0.0)
                .map(|v| v as u32)
        })
        .unwrap_or_else(|| {
            debug!(
                "identity_api_version '{}' is not numeric; using {}",
                raw,
                defaults::IDENTITY_API_VERSION
            );
            defaults::IDENTITY_API_VERSION
        })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve parameters: `overrides` first, then `source`, then defaults.
///
/// `source_name` only labels the error when `auth_url` is missing.
pub fn resolve(
    overrides: ParamValues,
    source: ParamValues,
    source_name: &str,
) -> Result<ConnectionParams> {
    let merged = overrides.or(source);

    let auth_url = non_empty(merged.auth_url).ok_or_else(|| Error::MissingAuthUrl {
        source_name: source_name.to_string(),
        hint: None,
    })?;

    Ok(ConnectionParams {
        auth_url,
        username: non_empty(merged.username),
        password: non_empty(merged.password),
        user_domain_name: non_empty(merged.user_domain_name)
            .unwrap_or_else(|| defaults::USER_DOMAIN_NAME.to_string()),
        region_name: non_empty(merged.region_name),
        interface: non_empty(merged.interface).unwrap_or_else(|| defaults::INTERFACE.to_string()),
        identity_api_version: coerce_identity_api_version(merged.identity_api_version.as_deref()),
    })
}

/// Read the values of one cloud entry (the node holding `auth`,
/// `region_name`, ...) at `entry` inside `document`.
pub fn values_from_entry(document: &impl DocumentStore, entry: &[PathSegment]) -> ParamValues {
    let field = |parts: &[&str]| {
        let mut path = entry.to_vec();
        path.extend(parts.iter().map(|p| PathSegment::key(*p)));
        document.get_string(&path)
    };

    ParamValues {
        auth_url: field(&["auth", "auth_url"]),
        username: field(&["auth", "username"]),
        password: field(&["auth", "password"]),
        user_domain_name: field(&["auth", "user_domain_name"]),
        region_name: field(&["region_name"]),
        interface: field(&["interface"]),
        identity_api_version: field(&["identity_api_version"]),
    }
}

/// Key of the first entry under `clouds`, if any.
pub fn first_cloud_name(document: &impl DocumentStore) -> Option<String> {
    document
        .get(&[PathSegment::key("clouds")])
        .ok()
        .and_then(Value::as_mapping)
        .and_then(|clouds| clouds.keys().next())
        .and_then(scalar_to_string)
}

/// Values found anywhere in a legacy document, first match per key.
///
/// Used when a document's exact shape is unknown: each field is taken from
/// the first node in the tree carrying that key.
pub fn values_by_scan(document: &impl DocumentStore) -> ParamValues {
    let scan = |key: &str| document.find_first(key).and_then(scalar_to_string);

    ParamValues {
        auth_url: scan("auth_url"),
        username: scan("username"),
        password: scan("password"),
        user_domain_name: scan("user_domain_name"),
        region_name: scan("region_name"),
        interface: scan("interface"),
        identity_api_version: scan("identity_api_version"),
    }
}
