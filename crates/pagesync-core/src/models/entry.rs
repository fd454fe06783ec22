//! CMS entry model

use serde::{Deserialize, Serialize};

/// Identifier of an entry in the source CMS
pub type EntryId = i64;

/// Read-only view of a CMS entry, as handed over by the save/publish hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// CMS identifier, unique per entry
    pub id: EntryId,
    /// Editor's "post on page" switch
    #[serde(default)]
    pub post_on_page: bool,
    /// Subtitle, used as the post message
    #[serde(default)]
    pub subtitle: String,
    /// Canonical public URL of the entry
    pub url: String,
    /// Site-relative or absolute path of the share image
    #[serde(default)]
    pub image_path: Option<String>,
    /// Display name of the entry author
    #[serde(default)]
    pub author_name: String,
    /// Teaser text, used as the link description
    #[serde(default)]
    pub teaser: String,
}

impl Entry {
    /// Create an entry that is flagged for posting
    #[must_use]
    pub fn new(id: EntryId, subtitle: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            post_on_page: true,
            subtitle: subtitle.into(),
            url: url.into(),
            image_path: None,
            author_name: String::new(),
            teaser: String::new(),
        }
    }
}
