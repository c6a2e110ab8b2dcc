//! Previous/next linking between posts.

use postmill_core::{NavItem, Post};

/// Link every post to its neighbours in the given order.
///
/// The order is taken as is (the loader sorts by recency). The first post
/// gets no `prev_item`, the last no `next_item`.
pub fn link_adjacent(posts: &mut [Post]) {
    let nav: Vec<NavItem> = posts.iter().map(|p| NavItem::from(&p.metadata)).collect();

    for (index, post) in posts.iter_mut().enumerate() {
        post.metadata.prev_item = index.checked_sub(1).map(|i| nav[i].clone());
        post.metadata.next_item = nav.get(index + 1).cloned();
    }
}
