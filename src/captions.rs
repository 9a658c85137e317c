use crate::Caption;

/// Caption shown at `position` seconds into a clip.
///
/// Both bounds are inclusive, so at a shared boundary the earlier caption wins.
/// Overlapping captions resolve the same way: first in sequence order.
pub fn find_active(position: f64, captions: &[Caption]) -> Option<&Caption> {
    captions
        .iter()
        .find(|c| position >= c.start_time && position <= c.end_time)
}
