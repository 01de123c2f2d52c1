//! JSON shapes returned by the feed endpoint.

use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MediaFile {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub name: String,
}

/// One publication of the gallery.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FeedItem {
    pub id: String,
    pub date: Option<String>,
    pub comptes: Vec<String>,
    pub format: Option<String>,
    pub files: Vec<MediaFile>,
    pub caption: String,
    pub link: Option<String>,
}

impl FeedItem {
    /// Sort key; undated items compare as the empty string.
    pub fn date_key(&self) -> &str {
        self.date.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FeedEnvelope {
    pub ok: bool,
    pub total: usize,
    pub comptes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formats: Option<Vec<String>>,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PingResponse {
    pub ok: bool,
    pub endpoint: &'static str,
    pub version: String,
    pub time: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}
