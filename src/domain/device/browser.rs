//! Browser identification from a user-agent string

use serde::Serialize;

/// Name used when neither the browser nor its version can be determined
pub const UNKNOWN: &str = "Unknown";

/// Browser name and version extracted from a user agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowserIdentity {
    pub name: String,
    pub version: String,
}

impl BrowserIdentity {
    /// Detect the browser from a user-agent string.
    ///
    /// Rules are checked in order and the first match wins. Chromium-based
    /// Edge advertises `Chrome` and therefore reports as Chrome.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let (name, version) = if user_agent.contains("Firefox") {
            ("Firefox", version_after(user_agent, "Firefox/"))
        } else if user_agent.contains("Chrome") {
            ("Chrome", version_after(user_agent, "Chrome/"))
        } else if user_agent.contains("Safari") {
            ("Safari", version_after(user_agent, "Version/"))
        } else if user_agent.contains("Edge") {
            ("Edge", version_after(user_agent, "Edge/"))
        } else if user_agent.contains("MSIE") || user_agent.contains("Trident/") {
            (
                "Internet Explorer",
                version_after(user_agent, "MSIE ").or_else(|| version_after(user_agent, "rv:")),
            )
        } else {
            (UNKNOWN, None)
        };

        Self {
            name: name.to_string(),
            version: version.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    /// "Name Version"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

/// Digits and dots immediately following `marker`, if any
fn version_after(user_agent: &str, marker: &str) -> Option<String> {
    let start = user_agent.find(marker)? + marker.len();
    let version: String = user_agent[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}
