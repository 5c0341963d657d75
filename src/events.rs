//! Campus events shown on the map

use crate::models::{CampusEvent, EventTag, LatLng};
use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use tracing::warn;

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

struct EventRecord {
    id: &'static str,
    title: &'static str,
    lat: f64,
    lng: f64,
    datetime: &'static str,
    venue: &'static str,
    tag: EventTag,
}

const EVENT_RECORDS: &[EventRecord] = &[
    EventRecord {
        id: "e1",
        title: "Tech Fest: HackSRM",
        lat: 28.7962,
        lng: 77.5394,
        datetime: "2025-09-20T10:00:00",
        venue: "G Block Auditorium",
        tag: EventTag::Fest,
    },
    EventRecord {
        id: "e2",
        title: "AI Workshop: Prompt Engineering",
        lat: 28.7967,
        lng: 77.5383,
        datetime: "2025-10-02T14:00:00",
        venue: "Admin Block Seminar Hall",
        tag: EventTag::Workshop,
    },
];

lazy_static! {
    static ref EVENTS: Vec<CampusEvent> = EVENT_RECORDS
        .iter()
        .filter_map(|record| {
            match NaiveDateTime::parse_from_str(record.datetime, DATETIME_FORMAT) {
                Ok(starts_at) => Some(CampusEvent {
                    id: record.id,
                    title: record.title,
                    coords: LatLng::new(record.lat, record.lng),
                    starts_at,
                    venue: record.venue,
                    tag: record.tag,
                }),
                Err(e) => {
                    warn!(event_id = record.id, error = %e, "Skipping event with bad datetime");
                    None
                }
            }
        })
        .collect();
}

/// All events in declaration order
pub fn all() -> &'static [CampusEvent] {
    &EVENTS
}

/// Events starting at or after `now`, soonest first
pub fn upcoming(now: NaiveDateTime) -> Vec<&'static CampusEvent> {
    let mut events: Vec<_> = EVENTS.iter().filter(|e| e.starts_at >= now).collect();
    events.sort_by_key(|e| e.starts_at);
    events
}
