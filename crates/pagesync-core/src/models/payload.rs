//! Post payload derived from an entry

use std::collections::BTreeMap;

use serde_json::{json, Value};

use super::{Entry, EntryId};
use crate::fingerprint::Fingerprint;
use crate::util::{join_url, normalize_text_option};

/// Fields the Graph API accepts when editing an existing post.
///
/// Link, picture, caption and description are fixed once a post exists.
pub const UPDATABLE_FIELDS: [&str; 3] = ["message", "privacy", "tag"];

/// What would be posted for an entry right now.
///
/// Never stored; rebuilt from the entry on every sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostPayload {
    pub should_post: bool,
    pub entry_id: EntryId,
    pub message: String,
    pub link: String,
    pub picture: Option<String>,
    pub caption: String,
    pub description: String,
}

impl PostPayload {
    /// Build the payload for `entry`, resolving the image against `site_base_url`
    #[must_use]
    pub fn from_entry(entry: &Entry, site_base_url: &str) -> Self {
        let picture =
            normalize_text_option(entry.image_path.clone()).map(|path| join_url(site_base_url, &path));

        Self {
            should_post: entry.post_on_page,
            entry_id: entry.id,
            message: entry.subtitle.clone(),
            link: entry.url.clone(),
            picture,
            caption: entry.author_name.clone(),
            description: entry.teaser.clone(),
        }
    }

    /// Fingerprint over every payload field, including the posting flag
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_fields([
            ("should_post", json!(self.should_post)),
            ("entry_id", json!(self.entry_id)),
            ("message", json!(self.message)),
            ("link", json!(self.link)),
            ("picture", self.picture.as_ref().map_or(Value::Null, |p| json!(p))),
            ("caption", json!(self.caption)),
            ("description", json!(self.description)),
        ])
    }

    /// Parameters sent when creating a post
    #[must_use]
    pub fn publish_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("message".to_string(), self.message.clone());
        params.insert("link".to_string(), self.link.clone());
        if let Some(picture) = &self.picture {
            params.insert("picture".to_string(), picture.clone());
        }
        params.insert("caption".to_string(), self.caption.clone());
        params.insert("description".to_string(), self.description.clone());
        params
    }

    /// Parameters sent when editing an existing post
    #[must_use]
    pub fn update_params(&self) -> BTreeMap<String, String> {
        self.publish_params()
            .into_iter()
            .filter(|(name, _)| UPDATABLE_FIELDS.contains(&name.as_str()))
            .collect()
    }
}
