use crate::types::Post;
use std::collections::HashSet;

/// Merge two ordered post collections, deduplicating by post hash.
///
/// Every element of `existing` is preserved in its original position;
/// elements of `incoming` are appended only if their hash has not been seen
/// yet. The seen-set covers the union built so far, so duplicates inside
/// `incoming` itself also collapse to the first occurrence. Idempotent:
/// merging the same page twice is a no-op.
pub fn merge_unique_by_hash(existing: Vec<Post>, incoming: Vec<Post>) -> Vec<Post> {
    let mut seen: HashSet<String> = existing.iter().map(|post| post.hash.clone()).collect();
    let mut merged = existing;

    for post in incoming {
        if seen.insert(post.hash.clone()) {
            merged.push(post);
        }
    }

    merged
}
