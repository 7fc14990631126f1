//! Device and host identity

mod browser;

use serde::Serialize;

pub use browser::{BrowserIdentity, UNKNOWN};

/// Static identity of the machine and media host, shown by the info report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub platform: String,
    pub architecture: String,
    pub language: String,
    /// Version line of the media backend, if it could be queried
    pub media_backend: Option<String>,
    pub user_agent: Option<String>,
    pub browser: Option<BrowserIdentity>,
}

impl DeviceInfo {
    /// Labelled rows in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(ref browser) = self.browser {
            rows.push(("Browser", browser.display_name()));
        }
        rows.push(("Platform", format!("{} ({})", self.platform, self.architecture)));
        rows.push(("Language", self.language.clone()));
        rows.push((
            "Media Backend",
            self.media_backend
                .clone()
                .unwrap_or_else(|| "not available".to_string()),
        ));
        if let Some(ref ua) = self.user_agent {
            rows.push(("User Agent", ua.clone()));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DeviceInfo {
        DeviceInfo {
            platform: "linux".to_string(),
            architecture: "x86_64".to_string(),
            language: "en-US".to_string(),
            media_backend: None,
            user_agent: None,
            browser: None,
        }
    }

    #[test]
    fn rows_without_user_agent() {
        let rows = info().rows();
        let labels: Vec<&str> = rows.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["Platform", "Language", "Media Backend"]);
        assert_eq!(rows[0].1, "linux (x86_64)");
        assert_eq!(rows[2].1, "not available");
    }

    #[test]
    fn rows_with_user_agent_lead_with_browser() {
        let ua = "Mozilla/5.0 Firefox/128.0";
        let info = DeviceInfo {
            user_agent: Some(ua.to_string()),
            browser: Some(BrowserIdentity::from_user_agent(ua)),
            ..info()
        };
        let rows = info.rows();
        assert_eq!(rows.first().map(|(l, _)| *l), Some("Browser"));
        assert_eq!(rows.last().map(|(l, _)| *l), Some("User Agent"));
    }
}
