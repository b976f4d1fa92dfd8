//! Event topic identifiers used across transports.

/// Machine-friendly discriminator for SSE consumers.
#[must_use]
pub const fn event_kind(event: &crate::payloads::Event) -> &'static str {
    event.kind()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payloads::{Event, ProcessingStatus};
    use uuid::Uuid;

    #[test]
    fn event_kind_matches_payload() {
        let id = Uuid::nil();
        assert_eq!(
            event_kind(&Event::RecordingMatched {
                recording_id: id,
                template_id: id,
            }),
            "recording_matched"
        );
        assert_eq!(
            event_kind(&Event::StatusChanged {
                recording_id: id,
                status: ProcessingStatus::Skipped,
            }),
            "status_changed"
        );
    }
}
