use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One lesson entry inside a time slot. `subject` is required for the entry
/// to survive normalization; `teacher` and `room` may be empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub subject: String,
    pub teacher: String,
    pub room: String,
}

/// The (start, end) interval a set of lessons is scheduled for. `display`
/// is `"<start>/<end>"` when both endpoints resolved, otherwise the
/// collapsed raw text of the time cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
    pub display: String,
}

/// A time slot together with the lessons extracted for it. Slots that would
/// carry zero lessons are never emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotEntry {
    pub time_slot: TimeSlot,
    pub lessons: Vec<Lesson>,
}

/// One day column of the timetable, in source-page order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day_index: usize,
    pub day_name: String,
    pub date: String,
    pub lessons: Vec<TimeSlotEntry>,
}

/// Snapshot metadata derived from the page URL and page-level properties,
/// never from schedule content.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub date: String,
    pub group_id: String,
    pub publication_id: String,
    pub page_title: String,
    pub last_modified: String,
    pub content_length: u64,
    pub url_params: BTreeMap<String, String>,
    pub hash: String,
}

/// The canonical weekly schedule model. Immutable once produced; exactly one
/// per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    pub url: String,
    pub title: String,
    pub timestamp: String,
    pub week_range: String,
    pub days: Vec<Day>,
    pub teachers: Vec<String>,
    pub rooms: Vec<String>,
    pub time_slots: Vec<String>,
    pub metadata: Metadata,
}

/// Simplified projection of the snapshot consumed by the site build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedSchedule {
    pub week_range: String,
    pub days: Vec<SimplifiedDay>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplifiedDay {
    pub day_name: String,
    pub date: String,
    pub lessons: Vec<SimplifiedSlot>,
}

/// `time` is `"<start>-<end>"`; `activities` mirrors the slot's lessons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedSlot {
    pub time: String,
    pub activities: Vec<Lesson>,
}

/// What the browser session hands to the extraction pipeline: the settled
/// page, plus the page-level properties metadata is derived from.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: String,
    pub title: String,
    pub html: String,
    pub last_modified: String,
    pub content_length: u64,
}

/// Raw candidate schedule as read off the DOM, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawScheduleRecord {
    pub week_range: String,
    pub days: Vec<RawDay>,
    pub script_state: Vec<ScriptStateHit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawDay {
    pub day_name: String,
    pub date: String,
    pub rows: Vec<RawRow>,
}

/// One table row that passed the sentinel filter. `time` is the trimmed
/// time-cell text; `start`/`end` stay empty when the cell lacks two time
/// sub-divisions.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub time: String,
    pub start: String,
    pub end: String,
    pub lessons: Vec<Lesson>,
}

/// Inline JSON state mined out of a `<script>` body. Diagnostic enrichment
/// only; never serialized into the output artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStateHit {
    pub script_index: usize,
    pub pattern: String,
    pub data: serde_json::Value,
}
