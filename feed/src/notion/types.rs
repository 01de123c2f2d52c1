//! Subset of the Notion database query response that the feed reads.
//!
//! Every field is optional on the wire. Properties that fail to decode are kept
//! as [`Property::Unsupported`] so one odd column never fails a whole query.

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Page>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// One database row.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Page {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_properties")]
    pub properties: HashMap<String, Property>,
}

impl Page {
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// The first of `names` present on the page.
    pub fn first_property(&self, names: &[&str]) -> Option<&Property> {
        names.iter().find_map(|name| self.property(name))
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichText>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Files {
        #[serde(default)]
        files: Vec<Option<FileObject>>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: Option<String>,
}

/// Concatenates the plain text of every rich text fragment.
pub fn plain_text(fragments: &[RichText]) -> String {
    fragments
        .iter()
        .filter_map(|fragment| fragment.plain_text.as_deref())
        .collect()
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DateValue {
    #[serde(default)]
    pub start: Option<String>,
}

/// An attachment of a files property. Notion-hosted files carry `file`,
/// linked ones carry `external`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FileObject {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct FileUrl {
    #[serde(default)]
    pub url: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_properties<'de, D>(deserializer: D) -> Result<HashMap<String, Property>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            let property = Property::deserialize(value).unwrap_or(Property::Unsupported);
            (name, property)
        })
        .collect())
}
