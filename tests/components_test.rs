use feed_aggregator::{embed, enrich, filter, merge, provider, types::*};
use std::collections::HashMap;

fn post(hash: &str, channel: Option<&str>, embeds: Vec<Embed>) -> Post {
    Post {
        hash: hash.to_string(),
        channel_id: channel.map(|c| c.to_string()),
        embeds,
        points: 0,
        degen: 0,
        display: serde_json::Map::new(),
    }
}

fn embed_of(kind: &str, platform: Option<&str>) -> Embed {
    Embed {
        url: Some("https://example.com/media".to_string()),
        kind: Some(kind.to_string()),
        platform: platform.map(|p| p.to_string()),
    }
}

fn hashes(posts: &[Post]) -> Vec<&str> {
    posts.iter().map(|p| p.hash.as_str()).collect()
}

#[test]
fn merge_preserves_order_and_dedups() {
    let a = vec![post("h1", None, vec![]), post("h2", None, vec![])];
    let b = vec![
        post("h2", None, vec![]),
        post("h3", None, vec![]),
        post("h3", None, vec![]), // duplicate within the incoming page itself
        post("h4", None, vec![]),
    ];

    let merged = merge::merge_unique_by_hash(a, b);
    assert_eq!(hashes(&merged), vec!["h1", "h2", "h3", "h4"]);
}

#[test]
fn merge_is_idempotent() {
    let a = vec![post("h1", None, vec![]), post("h2", None, vec![])];
    let b = vec![post("h2", None, vec![]), post("h3", None, vec![])];

    let once = merge::merge_unique_by_hash(a, b.clone());
    let twice = merge::merge_unique_by_hash(once.clone(), b);
    assert_eq!(hashes(&once), hashes(&twice));

    let f = vec![post("h1", None, vec![]), post("h2", None, vec![])];
    let self_merged = merge::merge_unique_by_hash(f.clone(), f.clone());
    assert_eq!(hashes(&self_merged), hashes(&f));
}

#[test]
fn merge_accepts_empty_inputs() {
    let a = vec![post("h1", None, vec![])];
    assert_eq!(hashes(&merge::merge_unique_by_hash(a.clone(), vec![])), vec!["h1"]);
    assert_eq!(hashes(&merge::merge_unique_by_hash(vec![], a)), vec!["h1"]);
    assert!(merge::merge_unique_by_hash(vec![], vec![]).is_empty());
}

#[test]
fn apply_scores_is_total() {
    let mut posts = vec![post("h1", None, vec![]), post("h2", None, vec![])];
    posts[0].points = 42;
    posts[1].degen = 7;

    let mut scores = HashMap::new();
    scores.insert("h1".to_string(), PostScores { points: 5, degen: 2 });

    enrich::apply_scores(&mut posts, &scores);

    assert_eq!(posts[0].points, 5);
    assert_eq!(posts[0].degen, 2);
    // Absent from the mapping: both scores drop to zero, never an error.
    assert_eq!(posts[1].points, 0);
    assert_eq!(posts[1].degen, 0);
}

#[test]
fn refresh_one_patches_only_the_target() {
    let mut posts = vec![post("h1", None, vec![]), post("h2", None, vec![])];
    posts[1].points = 3;

    let found = enrich::refresh_one(&mut posts, "h1", PostScores { points: 5, degen: 2 });
    assert!(found);
    assert_eq!(posts[0].points, 5);
    assert_eq!(posts[0].degen, 2);
    assert_eq!(posts[1].points, 3);
    assert_eq!(hashes(&posts), vec!["h1", "h2"]);

    assert!(!enrich::refresh_one(&mut posts, "missing", PostScores::default()));
}

#[test]
fn embed_validator_recognizes_closed_kind_set() {
    let embeds = vec![
        embed_of("hologram", None), // unrecognized kind, always rejected
        embed_of("audio", Some("soundcloud")),
        embed_of("video", Some("youtube")),
    ];

    let found = embed::find_valid_embed(&embeds, None).expect("should find the audio embed");
    assert_eq!(found.kind.as_deref(), Some("audio"));

    let only_invalid = [embed_of("hologram", None)];
    let none = embed::find_valid_embed(&only_invalid, None);
    assert!(none.is_none());
}

#[test]
fn embed_validator_applies_platform_constraint() {
    let embeds = vec![
        embed_of("audio", Some("soundcloud")),
        embed_of("video", Some("youtube")),
    ];

    let yt = embed::find_valid_embed(&embeds, Some(EmbedPlatform::Youtube))
        .expect("youtube embed qualifies");
    assert_eq!(yt.platform.as_deref(), Some("youtube"));

    assert!(embed::find_valid_embed(&embeds, Some(EmbedPlatform::Zora)).is_none());

    // A platform constraint rejects embeds with no platform tag at all.
    let untagged = vec![embed_of("image", None)];
    assert!(embed::find_valid_embed(&untagged, Some(EmbedPlatform::Zora)).is_none());
}

#[test]
fn empty_filter_still_requires_a_valid_embed() {
    let with_embed = post("h1", None, vec![embed_of("image", None)]);
    let without_embeds = post("h2", None, vec![]);
    let filter_none = FeedFilter::default();

    assert!(filter::matches(&with_embed, &filter_none));
    assert!(!filter::matches(&without_embeds, &filter_none));
}

#[test]
fn channel_filter_uses_substring_semantics() {
    let filter_abc = FeedFilter {
        channel: Some("abc".to_string()),
        platform: None,
    };

    let p = post("p", Some("abc-main"), vec![embed_of("image", None)]);
    let q = post("q", Some("xyz"), vec![embed_of("image", None)]);
    let no_channel = post("r", None, vec![embed_of("image", None)]);

    assert!(filter::matches(&p, &filter_abc));
    assert!(!filter::matches(&q, &filter_abc));
    assert!(!filter::matches(&no_channel, &filter_abc));

    // Case-sensitive: "ABC" does not contain "abc".
    let upper = post("s", Some("ABC-main"), vec![embed_of("image", None)]);
    assert!(!filter::matches(&upper, &filter_abc));
}

#[test]
fn filter_apply_derives_without_mutating() {
    let feed = vec![
        post("h1", Some("abc"), vec![embed_of("audio", Some("spotify"))]),
        post("h2", Some("abc"), vec![embed_of("audio", Some("soundcloud"))]),
        post("h3", Some("abc"), vec![]),
    ];
    let f = FeedFilter {
        channel: None,
        platform: Some(EmbedPlatform::Spotify),
    };

    let visible = filter::apply(&feed, &f);
    assert_eq!(hashes(&visible), vec!["h1"]);
    assert_eq!(feed.len(), 3);
}

#[test]
fn filter_merge_overlays_some_fields() {
    let mut f = FeedFilter {
        channel: Some("abc".to_string()),
        platform: None,
    };
    f.merge(FeedFilter {
        channel: None,
        platform: Some(EmbedPlatform::Zora),
    });
    assert_eq!(f.channel.as_deref(), Some("abc"));
    assert_eq!(f.platform, Some(EmbedPlatform::Zora));
}

#[test]
fn page_validation_drops_malformed_posts() {
    let raw = vec![
        serde_json::json!({"hash": "h1", "channelId": "abc", "author": "alice"}),
        serde_json::json!({"channelId": "abc"}), // no hash
        serde_json::json!({"hash": "", "text": "empty hash"}),
        serde_json::json!({"hash": "h2", "points": -4}),
    ];

    let posts = provider::validate_page(raw);
    assert_eq!(hashes(&posts), vec!["h1", "h2"]);
    // Negative scores are clamped at validation.
    assert_eq!(posts[1].points, 0);
}

#[test]
fn post_round_trips_opaque_display_fields() {
    let raw = serde_json::json!({
        "hash": "h1",
        "channelId": "abc",
        "embeds": [{"url": "https://x", "kind": "audio", "platform": "soundxyz"}],
        "author": "alice",
        "text": "gm",
    });

    let p: Post = serde_json::from_value(raw).unwrap();
    assert_eq!(p.hash, "h1");
    assert_eq!(p.embeds.len(), 1);
    assert_eq!(p.display.get("author").and_then(|v| v.as_str()), Some("alice"));

    let back = serde_json::to_value(&p).unwrap();
    assert_eq!(back.get("text").and_then(|v| v.as_str()), Some("gm"));
}
