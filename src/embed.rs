use crate::types::{Embed, EmbedPlatform, MediaKind};

/// Return the first embed whose media kind is recognized and, when a platform
/// constraint is given, whose platform tag equals the constraint.
///
/// Unrecognized kinds are rejected rather than defaulted to valid, so a post
/// whose embeds all carry unknown kinds resolves to `None`.
pub fn find_valid_embed<'a>(
    embeds: &'a [Embed],
    platform: Option<EmbedPlatform>,
) -> Option<&'a Embed> {
    embeds.iter().find(|embed| {
        let kind = match embed.kind.as_deref() {
            Some(raw) => raw.parse::<MediaKind>().ok(),
            None => None,
        };
        if kind.is_none() {
            return false;
        }

        match platform {
            Some(wanted) => embed
                .platform
                .as_deref()
                .and_then(|raw| raw.parse::<EmbedPlatform>().ok())
                .map(|tag| tag == wanted)
                .unwrap_or(false),
            None => true,
        }
    })
}
