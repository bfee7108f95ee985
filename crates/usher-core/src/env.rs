//! Environment parsing for the provisioning pipeline.
//!
//! The environment is handed in as an iterator rather than read from
//! process globals, so tests exercise every path without mutating their own
//! environment.

use usher_common::constants;
use usher_common::error::{Result, UsherError};
use usher_common::types::IdentityRequest;

/// Builds an [`IdentityRequest`] from `LOCAL_USER_ID`-family variables.
///
/// Unset and empty variables fall back to the fixed defaults. Validation is
/// deliberately thin: numeric IDs must fit in a `u32`, names must be
/// passwd-safe. Anything else is a configuration error, reported before any
/// identity mutation is attempted.
///
/// # Errors
///
/// Returns [`UsherError::Config`] for a non-numeric ID or a name that
/// cannot be stored in a passwd line.
pub fn parse_environment<I>(vars: I) -> Result<IdentityRequest>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut uid = None;
    let mut gid = None;
    let mut user_name = None;
    let mut group_name = None;

    for (key, value) in vars {
        match key.as_str() {
            constants::ENV_USER_ID => uid = parse_id(&key, &value)?,
            constants::ENV_GROUP_ID => gid = parse_id(&key, &value)?,
            constants::ENV_USER_NAME => user_name = parse_name(&key, &value)?,
            constants::ENV_GROUP_NAME => group_name = parse_name(&key, &value)?,
            _ => {}
        }
    }

    Ok(IdentityRequest::new(uid, gid, user_name, group_name))
}

/// Parses a numeric ID variable; an empty value counts as unset.
fn parse_id(key: &str, value: &str) -> Result<Option<u32>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<u32>()
        .map(Some)
        .map_err(|_| UsherError::Config {
            message: format!("{key} must be a non-negative integer, got {value:?}"),
        })
}

/// Parses a name variable; an empty value counts as unset.
fn parse_name(key: &str, value: &str) -> Result<Option<String>> {
    if value.is_empty() {
        return Ok(None);
    }
    if value.contains([':', ',', '\n']) {
        return Err(UsherError::Config {
            message: format!("{key} must be a passwd-safe name, got {value:?}"),
        });
    }
    Ok(Some(value.to_string()))
}
