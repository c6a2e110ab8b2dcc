//! Feed discovery `<link>` descriptors for the HTML head.

use std::collections::BTreeMap;

use postmill_core::{ResolvedOptions, url::normalize_url};
use serde::Serialize;

/// A tag to inject into every page's `<head>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadTag {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
}

impl HeadTag {
    /// Render as a void HTML element.
    pub fn to_html(&self) -> String {
        let attributes: String = self
            .attributes
            .iter()
            .map(|(name, value)| format!(" {name}=\"{}\"", escape_attribute(value)))
            .collect();
        format!("<{}{attributes}>", self.tag_name)
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One `<link rel="alternate">` per configured feed type.
pub fn head_tags(options: &ResolvedOptions) -> Vec<HeadTag> {
    options
        .feed_types()
        .iter()
        .map(|feed_type| {
            let href = normalize_url(&[
                &options.site.base_url,
                &options.route_base_path,
                feed_type.file_name(),
            ]);
            let title = format!(
                "{} Blog {} Feed",
                options.site.title,
                feed_type.display_name()
            );

            HeadTag {
                tag_name: "link".to_string(),
                attributes: BTreeMap::from([
                    ("rel".to_string(), "alternate".to_string()),
                    ("type".to_string(), feed_type.mime_type().to_string()),
                    ("href".to_string(), href),
                    ("title".to_string(), title),
                ]),
            }
        })
        .collect()
}
