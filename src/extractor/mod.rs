//! Heuristic extraction of the raw schedule out of a rendered page.
//!
//! The provider's markup is undocumented and drifts, so every structural
//! role (day columns, rows, lesson fields) is resolved through a cascade of
//! candidate selectors rather than a fixed schema. A missing field is normal
//! operation; only a page with no recognizable day containers is an error.

pub mod script_state;
pub mod selectors;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::constants::{NO_CLASS_SENTINEL, TIME_PLACEHOLDER};
use crate::error::{Result, ScraperError};
use crate::types::{Lesson, PageSnapshot, RawDay, RawRow, RawScheduleRecord};

/// Extracts the raw schedule record from a settled page snapshot.
pub fn extract(snapshot: &PageSnapshot) -> Result<RawScheduleRecord> {
    let document = Html::parse_document(&snapshot.html);

    let week_range = selectors::WEEK_RANGE
        .select_first_root(&document)
        .map(element_text)
        .unwrap_or_default();
    if week_range.is_empty() {
        debug!("no week range matched; continuing without one");
    }

    let day_elements = selectors::DAY_CONTAINER.select_all_root(&document);
    if day_elements.is_empty() {
        return Err(ScraperError::Extraction(
            "no day containers matched any candidate selector".to_string(),
        ));
    }

    let mut days = Vec::with_capacity(day_elements.len());
    for (day_index, day_element) in day_elements.into_iter().enumerate() {
        let (day_name, date) = day_label(day_element);
        let rows = extract_rows(day_element);
        debug!(day_index, day_name = %day_name, rows = rows.len(), "extracted day column");
        days.push(RawDay {
            day_name,
            date,
            rows,
        });
    }

    let script_state = script_state::mine(&document);
    info!(
        days = days.len(),
        script_hits = script_state.len(),
        "extracted raw schedule"
    );

    Ok(RawScheduleRecord {
        week_range,
        days,
        script_state,
    })
}

/// Splits the weekday label on its first `-` into name and date. A label
/// without the separator is all name.
fn day_label(day: ElementRef<'_>) -> (String, String) {
    let label = selectors::WEEKDAY_LABEL
        .select_first(day)
        .map(element_text)
        .unwrap_or_default();
    match label.split_once('-') {
        Some((name, date)) => (name.trim().to_string(), date.trim().to_string()),
        None => (label, String::new()),
    }
}

fn extract_rows(day: ElementRef<'_>) -> Vec<RawRow> {
    let Some(table) = selectors::LESSON_TABLE.select_first(day) else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for row in selectors::TABLE_ROW.select_all(table) {
        let Some(time_cell) = selectors::TIME_CELL.select_first(row) else {
            continue;
        };
        let time = element_text(time_cell);
        if time.is_empty() || time == TIME_PLACEHOLDER {
            continue;
        }

        let Some(content_cell) = selectors::CONTENT_CELL.select_first(row) else {
            continue;
        };
        let content_text = element_text(content_cell);
        if content_text.contains(NO_CLASS_SENTINEL) {
            continue;
        }

        let (start, end) = time_bounds(time_cell);
        let mut lessons = structured_lessons(content_cell);
        if lessons.is_empty() {
            if let Some(lesson) = tokenized_lesson(&content_text) {
                lessons.push(lesson);
            }
        }

        rows.push(RawRow {
            time,
            start,
            end,
            lessons,
        });
    }
    rows
}

/// The first two `div`s of the time cell carry the slot endpoints; a cell
/// with fewer than two leaves both empty.
fn time_bounds(time_cell: ElementRef<'_>) -> (String, String) {
    let div = Selector::parse("div").unwrap();
    let divs: Vec<ElementRef<'_>> = time_cell.select(&div).collect();
    if divs.len() < 2 {
        return (String::new(), String::new());
    }
    (element_text(divs[0]), element_text(divs[1]))
}

/// Reads lesson sub-blocks field by field. Teacher and room fall back to
/// the block's second and third `div` when no class-based candidate hits.
/// Blocks without a subject are dropped.
fn structured_lessons(content_cell: ElementRef<'_>) -> Vec<Lesson> {
    let div = Selector::parse("div").unwrap();
    let mut lessons = Vec::new();

    for block in selectors::LESSON_BLOCK.select_all(content_cell) {
        let subject = selectors::SUBJECT_FIELD
            .select_first(block)
            .map(element_text)
            .unwrap_or_default();
        if subject.is_empty() {
            continue;
        }

        let divs: Vec<ElementRef<'_>> = block.select(&div).collect();
        let teacher = selectors::TEACHER_FIELD
            .select_first(block)
            .map(element_text)
            .or_else(|| divs.get(1).copied().map(element_text))
            .unwrap_or_default();
        let room = selectors::ROOM_FIELD
            .select_first(block)
            .map(element_text)
            .or_else(|| divs.get(2).copied().map(element_text))
            .unwrap_or_default();

        lessons.push(Lesson {
            subject,
            teacher,
            room,
        });
    }
    lessons
}

/// Last-resort lesson synthesis for cells with no recognizable sub-blocks:
/// three or more whitespace tokens become subject, teacher and room.
fn tokenized_lesson(content_text: &str) -> Option<Lesson> {
    let tokens: Vec<&str> = content_text.split_whitespace().collect();
    if tokens.len() < 3 {
        return None;
    }
    Some(Lesson {
        subject: tokens[0].to_string(),
        teacher: tokens[1].to_string(),
        room: tokens[2].to_string(),
    })
}

/// Concatenated descendant text with runs of whitespace collapsed to single
/// spaces, trimmed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
