//! Host identity for the device info report

use crate::domain::device::{BrowserIdentity, DeviceInfo, UNKNOWN};

/// Locale variables, most specific first
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Gather the host's identity.
///
/// `media_backend` is the version line reported by the capability query;
/// `user_agent`, when given, is parsed for the browser row.
pub fn gather(media_backend: Option<String>, user_agent: Option<String>) -> DeviceInfo {
    let browser = user_agent
        .as_deref()
        .map(BrowserIdentity::from_user_agent);

    DeviceInfo {
        platform: std::env::consts::OS.to_string(),
        architecture: std::env::consts::ARCH.to_string(),
        language: language_from(|key| std::env::var(key).ok()),
        media_backend,
        user_agent,
        browser,
    }
}

/// BCP 47-style tag from the first usable locale variable, e.g. `en_US.UTF-8` -> `en-US`
fn language_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    LOCALE_VARS
        .iter()
        .filter_map(|key| lookup(key))
        .find_map(|value| normalize_locale(&value))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn normalize_locale(value: &str) -> Option<String> {
    let tag = value
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if tag.is_empty() || tag == "C" || tag == "POSIX" {
        return None;
    }
    Some(tag.replace('_', "-"))
}
