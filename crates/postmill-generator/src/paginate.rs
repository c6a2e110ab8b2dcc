//! Blog list pagination.
//!
//! Example permalinks for a blog mounted at `/blog`: `/blog`, `/blog/page/2`,
//! `/blog/page/3`.

use std::num::NonZeroUsize;

use postmill_core::url::normalize_url;
use serde::Serialize;

/// One page of the post listing.
///
/// Serializes to the page's data blob; the post ids are emitted separately
/// as content references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub permalink: String,

    /// 1-based page number.
    pub page: usize,

    pub posts_per_page: usize,

    pub total_pages: usize,

    pub total_count: usize,

    pub previous_page: Option<String>,

    pub next_page: Option<String>,

    #[serde(skip)]
    pub post_ids: Vec<String>,
}

/// Permalink of the 0-based `page` below `base_url`.
pub fn page_permalink(base_url: &str, page: usize) -> String {
    if page > 0 {
        normalize_url(&[base_url, &format!("page/{}", page + 1)])
    } else {
        base_url.to_string()
    }
}

/// Split `post_ids` into consecutive pages of `posts_per_page`.
///
/// The last page may be shorter. No ids means no pages.
pub fn paginate(
    post_ids: &[String],
    posts_per_page: NonZeroUsize,
    base_url: &str,
) -> Vec<ListPage> {
    let total_count = post_ids.len();
    let total_pages = total_count.div_ceil(posts_per_page.get());

    post_ids
        .chunks(posts_per_page.get())
        .enumerate()
        .map(|(page, chunk)| ListPage {
            permalink: page_permalink(base_url, page),
            page: page + 1,
            posts_per_page: posts_per_page.get(),
            total_pages,
            total_count,
            previous_page: (page > 0).then(|| page_permalink(base_url, page - 1)),
            next_page: (page + 1 < total_pages).then(|| page_permalink(base_url, page + 1)),
            post_ids: chunk.to_vec(),
        })
        .collect()
}
