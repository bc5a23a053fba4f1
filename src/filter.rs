use crate::embed::find_valid_embed;
use crate::types::{FeedFilter, Post};

/// Decide whether a post is visible under the given filter.
///
/// Two rules, both of which must hold:
/// - channel: if `filter.channel` is set, the post needs a non-empty
///   `channel_id` containing it as a case-sensitive substring;
/// - embed: the post must resolve at least one valid embed under the active
///   platform constraint. There is no bypass — a post with zero valid embeds
///   is excluded even when no platform is requested.
///
/// Short-circuits on the channel rule.
pub fn matches(post: &Post, filter: &FeedFilter) -> bool {
    if let Some(channel) = &filter.channel {
        let in_channel = post
            .channel_id
            .as_deref()
            .map(|id| !id.is_empty() && id.contains(channel.as_str()))
            .unwrap_or(false);
        if !in_channel {
            return false;
        }
    }

    find_valid_embed(&post.embeds, filter.platform).is_some()
}

/// Derive the visible subset of a feed. Never mutates the canonical feed.
pub fn apply(feed: &[Post], filter: &FeedFilter) -> Vec<Post> {
    feed.iter()
        .filter(|post| matches(post, filter))
        .cloned()
        .collect()
}
