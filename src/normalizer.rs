//! Pure normalization of raw extraction output into the canonical model.
//!
//! Never fails and performs no I/O: malformed rows are dropped, URL parse
//! problems degrade the derived metadata fields to empty strings.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use url::Url;

use crate::constants::{DATE_PARAM, GROUP_PARAM};
use crate::types::{
    Day, Lesson, Metadata, PageSnapshot, RawDay, RawRow, RawScheduleRecord, ScheduleSnapshot,
    SimplifiedDay, SimplifiedSchedule, SimplifiedSlot, TimeSlot, TimeSlotEntry,
};

/// Normalizes a raw record against the snapshot it was extracted from,
/// stamped with the current instant.
pub fn normalize(record: &RawScheduleRecord, snapshot: &PageSnapshot) -> ScheduleSnapshot {
    normalize_at(record, snapshot, Utc::now())
}

/// Same as [`normalize`] with the timestamp injected, so identical inputs
/// produce identical snapshots.
pub fn normalize_at(
    record: &RawScheduleRecord,
    snapshot: &PageSnapshot,
    instant: DateTime<Utc>,
) -> ScheduleSnapshot {
    let days: Vec<Day> = record
        .days
        .iter()
        .enumerate()
        .map(|(day_index, raw)| normalize_day(day_index, raw))
        .collect();
    let (teachers, rooms, time_slots) = derived_sets(&days);

    ScheduleSnapshot {
        url: snapshot.url.clone(),
        title: snapshot.title.clone(),
        timestamp: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
        week_range: record.week_range.clone(),
        days,
        teachers,
        rooms,
        time_slots,
        metadata: derive_metadata(snapshot),
    }
}

/// Projects the snapshot down to the shape the site build consumes.
pub fn simplify(snapshot: &ScheduleSnapshot) -> SimplifiedSchedule {
    SimplifiedSchedule {
        week_range: snapshot.week_range.clone(),
        days: snapshot
            .days
            .iter()
            .map(|day| SimplifiedDay {
                day_name: day.day_name.clone(),
                date: day.date.clone(),
                lessons: day
                    .lessons
                    .iter()
                    .map(|entry| SimplifiedSlot {
                        time: format!("{}-{}", entry.time_slot.start, entry.time_slot.end),
                        activities: entry.lessons.clone(),
                    })
                    .collect(),
            })
            .collect(),
        metadata: snapshot.metadata.clone(),
    }
}

fn normalize_day(day_index: usize, raw: &RawDay) -> Day {
    let mut lessons = Vec::new();
    for row in &raw.rows {
        let kept: Vec<Lesson> = row
            .lessons
            .iter()
            .filter(|lesson| !lesson.subject.trim().is_empty())
            .cloned()
            .collect();
        // Slots that would carry zero lessons are omitted entirely.
        if kept.is_empty() {
            continue;
        }
        lessons.push(TimeSlotEntry {
            time_slot: TimeSlot {
                start: row.start.clone(),
                end: row.end.clone(),
                display: slot_display(row),
            },
            lessons: kept,
        });
    }

    Day {
        day_index,
        day_name: raw.day_name.clone(),
        date: raw.date.clone(),
        lessons,
    }
}

fn slot_display(row: &RawRow) -> String {
    if !row.start.is_empty() && !row.end.is_empty() {
        format!("{}/{}", row.start, row.end)
    } else {
        collapse(&row.time)
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Global sets scanned across all kept lessons. Teachers and rooms keep
/// first-seen order; slot displays are sorted lexically.
fn derived_sets(days: &[Day]) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut teachers = Vec::new();
    let mut rooms = Vec::new();
    let mut time_slots = Vec::new();

    for day in days {
        for entry in &day.lessons {
            push_unique(&mut time_slots, entry.time_slot.display.trim());
            for lesson in &entry.lessons {
                push_unique(&mut teachers, lesson.teacher.trim());
                push_unique(&mut rooms, lesson.room.trim());
            }
        }
    }
    time_slots.sort();

    (teachers, rooms, time_slots)
}

fn push_unique(set: &mut Vec<String>, value: &str) {
    if value.is_empty() || set.iter().any(|existing| existing == value) {
        return;
    }
    set.push(value.to_string());
}

/// Metadata comes from the snapshot URL and page-level properties only,
/// never from schedule content. An unparseable URL leaves every URL-derived
/// field empty.
fn derive_metadata(snapshot: &PageSnapshot) -> Metadata {
    let mut metadata = Metadata {
        page_title: snapshot.title.clone(),
        last_modified: snapshot.last_modified.clone(),
        content_length: snapshot.content_length,
        ..Metadata::default()
    };

    let Ok(parsed) = Url::parse(&snapshot.url) else {
        return metadata;
    };

    let mut url_params = BTreeMap::new();
    for (key, value) in parsed.query_pairs() {
        url_params.insert(key.into_owned(), value.into_owned());
    }

    metadata.date = url_params.get(DATE_PARAM).cloned().unwrap_or_default();
    metadata.group_id = url_params.get(GROUP_PARAM).cloned().unwrap_or_default();
    metadata.publication_id = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string();
    metadata.url_params = url_params;
    metadata.hash = parsed
        .fragment()
        .map(|fragment| format!("#{fragment}"))
        .unwrap_or_default();

    metadata
}
