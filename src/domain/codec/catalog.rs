//! Candidate codec catalog

use super::CodecIdentifier;

/// Codec strings evaluated when no custom list is given
pub const DEFAULT_CODECS: &[&str] = &[
    "video/webm",
    "video/webm;codecs=vp8",
    "video/webm;codecs=vp9",
    "video/webm;codecs=h264",
    "video/mp4",
    "video/mp4;codecs=h264",
    "video/mp4;codecs=avc1",
    "video/ogg",
    "video/ogg;codecs=theora",
];

/// Ordered, duplicate-free list of codec identifiers to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecCatalog {
    entries: Vec<CodecIdentifier>,
}

impl CodecCatalog {
    /// Build a catalog keeping the first occurrence of each identifier
    pub fn new(entries: impl IntoIterator<Item = CodecIdentifier>) -> Self {
        let mut unique: Vec<CodecIdentifier> = Vec::new();
        for entry in entries {
            if !unique.contains(&entry) {
                unique.push(entry);
            }
        }
        Self { entries: unique }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodecIdentifier> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, codec: &CodecIdentifier) -> bool {
        self.entries.contains(codec)
    }
}

impl Default for CodecCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_CODECS.iter().map(|c| CodecIdentifier::new(*c)))
    }
}

impl FromIterator<CodecIdentifier> for CodecCatalog {
    fn from_iter<T: IntoIterator<Item = CodecIdentifier>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a CodecCatalog {
    type Item = &'a CodecIdentifier;
    type IntoIter = std::slice::Iter<'a, CodecIdentifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_order() {
        let catalog = CodecCatalog::default();
        let names: Vec<&str> = catalog.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, DEFAULT_CODECS);
        assert_eq!(catalog.len(), 9);
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let catalog: CodecCatalog = ["video/mp4", "video/webm", "video/mp4"]
            .into_iter()
            .map(CodecIdentifier::new)
            .collect();
        let names: Vec<&str> = catalog.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["video/mp4", "video/webm"]);
    }

    #[test]
    fn contains_uses_exact_match() {
        let catalog = CodecCatalog::default();
        assert!(catalog.contains(&CodecIdentifier::new("video/ogg")));
        assert!(!catalog.contains(&CodecIdentifier::new("video/OGG")));
    }
}
