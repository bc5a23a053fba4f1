use crate::types::{Post, PostScores};
use std::collections::HashMap;

/// Replace each post's scores with its entry from the mapping, defaulting
/// absent entries to zero. Total: never fails on missing entries.
pub fn apply_scores(posts: &mut [Post], scores: &HashMap<String, PostScores>) {
    for post in posts.iter_mut() {
        let entry = scores.get(&post.hash).copied().unwrap_or_default();
        post.points = entry.points;
        post.degen = entry.degen;
    }
}

/// Patch a single post's scores in place. Posts other than `hash` are left
/// untouched, as is feed order. Returns true if the post was found.
pub fn refresh_one(posts: &mut [Post], hash: &str, scores: PostScores) -> bool {
    match posts.iter_mut().find(|post| post.hash == hash) {
        Some(post) => {
            post.points = scores.points;
            post.degen = scores.degen;
            true
        }
        None => false,
    }
}
