//! Beacon selection policy

use seekbeacon_core::{BeaconHeader, StreamId, SubscriptionRegistry};

/// Newest beacon in `window` (oldest first) that is seeking, matches the
/// optional target, and belongs to a stream with no listeners yet.
pub fn select_beacon<'a>(
    window: &'a [BeaconHeader],
    registry: &SubscriptionRegistry,
    target: Option<&StreamId>,
) -> Option<&'a BeaconHeader> {
    window.iter().rev().find(|b| {
        b.is_seeking()
            && target.map_or(true, |t| *t == b.stream_id)
            && !registry.is_attached(&b.stream_id)
    })
}
