//! Best-variant selection
//!
//! Picks the single image variant to ingest from the candidate list the
//! directory returns for an emote. The function is pure and total so that
//! ingestion stays idempotent: the same variant list always yields the same
//! choice.

use crate::models::{EmoteMime, ImageVariant};

/// Mime preference order for animated variants
const ANIMATED_MIME_ORDER: [EmoteMime; 3] = [EmoteMime::Webp, EmoteMime::Gif, EmoteMime::Avif];
/// Mime preference order for static variants
const STATIC_MIME_ORDER: [EmoteMime; 3] = [EmoteMime::Webp, EmoteMime::Png, EmoteMime::Avif];

/// Choose the best image variant.
///
/// Priority rules, first non-empty candidate set wins:
/// 1. animated WebP at scale 4 (exact match)
/// 2. animated WebP, max scale
/// 3. animated WebP > GIF > AVIF, max scale within the first non-empty group
/// 4. static WebP > PNG > AVIF, max scale within the first non-empty group
/// 5. first variant in input order
///
/// Returns `None` only for an empty input.
pub fn select_best(variants: &[ImageVariant]) -> Option<&ImageVariant> {
    if let Some(exact) = variants
        .iter()
        .find(|v| v.animated() && v.mime == EmoteMime::Webp && v.scale == 4)
    {
        return Some(exact);
    }

    for mime in ANIMATED_MIME_ORDER {
        if let Some(best) = max_scale(variants, |v| v.animated() && v.mime == mime) {
            return Some(best);
        }
    }

    for mime in STATIC_MIME_ORDER {
        if let Some(best) = max_scale(variants, |v| !v.animated() && v.mime == mime) {
            return Some(best);
        }
    }

    variants.first()
}

fn max_scale<'a>(
    variants: &'a [ImageVariant],
    filter: impl Fn(&ImageVariant) -> bool,
) -> Option<&'a ImageVariant> {
    variants
        .iter()
        .filter(|v| filter(v))
        .max_by_key(|v| v.scale)
}
