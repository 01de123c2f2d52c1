use crate::model::{FeedItem, MediaFile, MediaKind};
use crate::notion::property_names::{CAPTION, COMPTES, FORMAT, LINK, PUBLICATION_DATE, VISUELS};
use crate::notion::types::{FileObject, Page, Property, plain_text};

const VIDEO_MARKERS: &[&str] = &["video", ".mp4", ".mov", ".webm", ".m4v"];
const IMAGE_MARKERS: &[&str] = &["image", ".jpg", ".jpeg", ".png", ".webp", ".gif"];

/// Flattens a database row into a feed item. Missing columns yield empty values.
pub fn normalize_page(page: &Page) -> FeedItem {
    let date = match page.property(PUBLICATION_DATE) {
        Some(Property::Date { date: Some(date) }) => date.start.clone(),
        _ => None,
    };

    let files = match page.property(VISUELS) {
        Some(Property::Files { files }) => files.iter().flatten().filter_map(media_file).collect(),
        _ => Vec::new(),
    };

    let caption = match page.first_property(CAPTION) {
        Some(Property::RichText { rich_text }) => plain_text(rich_text),
        _ => String::new(),
    };

    let link = match page.first_property(LINK) {
        Some(Property::Url { url }) => url.clone(),
        _ => None,
    };

    FeedItem {
        id: page.id.clone(),
        date,
        comptes: tag_values(page.property(COMPTES)),
        format: tag_values(page.property(FORMAT)).into_iter().next(),
        files,
        caption,
        link,
    }
}

/// Reads a tag-like column stored as multi-select, select or rich text.
fn tag_values(property: Option<&Property>) -> Vec<String> {
    match property {
        Some(Property::MultiSelect { multi_select }) => {
            multi_select.iter().map(|option| option.name.clone()).collect()
        }
        Some(Property::Select {
            select: Some(option),
        }) => vec![option.name.clone()],
        Some(Property::RichText { rich_text }) => vec![plain_text(rich_text)],
        _ => Vec::new(),
    }
}

/// Resolves an attachment to a media file. Attachments without any URL are dropped.
pub fn media_file(file: &FileObject) -> Option<MediaFile> {
    let url = [&file.file, &file.external]
        .into_iter()
        .flatten()
        .filter_map(|location| location.url.as_deref())
        .find(|url| !url.is_empty())?;

    let name = file.name.clone().unwrap_or_default();

    Some(MediaFile {
        url: url.to_string(),
        kind: classify_media(file.kind.as_deref(), &name),
        name,
    })
}

/// The declared type wins when it names a media kind. Notion usually declares
/// `file` or `external`, in which case the file name decides. Defaults to image.
pub fn classify_media(declared_type: Option<&str>, name: &str) -> MediaKind {
    declared_type
        .and_then(match_kind)
        .or_else(|| match_kind(name))
        .unwrap_or(MediaKind::Image)
}

fn match_kind(hint: &str) -> Option<MediaKind> {
    let hint = hint.to_lowercase();
    if VIDEO_MARKERS.iter().any(|marker| hint.contains(marker)) {
        Some(MediaKind::Video)
    } else if IMAGE_MARKERS.iter().any(|marker| hint.contains(marker)) {
        Some(MediaKind::Image)
    } else {
        None
    }
}
