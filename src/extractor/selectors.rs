use scraper::{ElementRef, Html, Selector};

/// Ordered list of candidate CSS selectors for one structural role of the
/// provider's markup. Candidates are tried in sequence and the first one
/// matching at least one element wins, so the current markup is listed
/// first and drift fallbacks after. Unparseable candidates are skipped.
#[derive(Debug, Clone, Copy)]
pub struct SelectorCascade {
    role: &'static str,
    candidates: &'static [&'static str],
}

pub const WEEK_RANGE: SelectorCascade = SelectorCascade::new(
    "week-range",
    &[".date-range", r#"[class*="date-range"]"#, ".week-range"],
);

pub const DAY_CONTAINER: SelectorCascade = SelectorCascade::new(
    "day-container",
    &[".lessons-col", r#"[class*="lessons-col"]"#, r#"[class*="day-col"]"#],
);

pub const WEEKDAY_LABEL: SelectorCascade = SelectorCascade::new(
    "weekday-label",
    &[".weekday-name", r#"[class*="weekday"]"#, ".day-name"],
);

pub const LESSON_TABLE: SelectorCascade = SelectorCascade::new(
    "lesson-table",
    &[".table-lessons", r#"table[class*="lessons"]"#, "table"],
);

pub const TABLE_ROW: SelectorCascade = SelectorCascade::new("table-row", &["tbody tr", "tr"]);

pub const TIME_CELL: SelectorCascade = SelectorCascade::new(
    "time-cell",
    &["td.time", r#"td[class*="time"]"#, "td:first-child"],
);

pub const CONTENT_CELL: SelectorCascade = SelectorCascade::new("content-cell", &["td:last-child"]);

pub const LESSON_BLOCK: SelectorCascade =
    SelectorCascade::new("lesson-block", &[".lesson", r#"[class*="lesson"]"#]);

pub const SUBJECT_FIELD: SelectorCascade = SelectorCascade::new(
    "subject-field",
    &[".subject", r#"[class*="subject"]"#, "span"],
);

// Teacher and room fall back positionally (second and third `div` of the
// lesson block) when no class-based candidate matches; that step lives in
// the extractor, not here.
pub const TEACHER_FIELD: SelectorCascade =
    SelectorCascade::new("teacher-field", &[".teacher", r#"[class*="teacher"]"#]);

pub const ROOM_FIELD: SelectorCascade =
    SelectorCascade::new("room-field", &[".room", r#"[class*="room"]"#]);

impl SelectorCascade {
    pub const fn new(role: &'static str, candidates: &'static [&'static str]) -> Self {
        Self { role, candidates }
    }

    pub fn role(&self) -> &'static str {
        self.role
    }

    /// All matches of the first successful candidate, scoped to `scope`'s
    /// descendants. Empty when no candidate matches anything.
    pub fn select_all<'a>(&self, scope: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        for candidate in self.candidates {
            let Ok(selector) = Selector::parse(candidate) else {
                continue;
            };
            let matches: Vec<ElementRef<'a>> = scope.select(&selector).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    pub fn select_first<'a>(&self, scope: ElementRef<'a>) -> Option<ElementRef<'a>> {
        self.select_all(scope).into_iter().next()
    }

    /// Like `select_all`, but scoped to the whole document.
    pub fn select_all_root<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        for candidate in self.candidates {
            let Ok(selector) = Selector::parse(candidate) else {
                continue;
            };
            let matches: Vec<ElementRef<'a>> = document.select(&selector).collect();
            if !matches.is_empty() {
                return matches;
            }
        }
        Vec::new()
    }

    pub fn select_first_root<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        self.select_all_root(document).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_candidate_wins() {
        let html = Html::parse_document(
            r#"<div class="date-range">1 - 7</div><div class="week-range">8 - 14</div>"#,
        );
        let found = WEEK_RANGE.select_first_root(&html).unwrap();
        assert_eq!(found.text().collect::<String>(), "1 - 7");
    }

    #[test]
    fn falls_through_to_later_candidates() {
        let html = Html::parse_document(r#"<div class="week-range">8 - 14</div>"#);
        let found = WEEK_RANGE.select_first_root(&html).unwrap();
        assert_eq!(found.text().collect::<String>(), "8 - 14");
    }

    #[test]
    fn substring_candidate_catches_renamed_classes() {
        let html = Html::parse_document(r#"<div class="lessons-col-v2">x</div>"#);
        assert_eq!(DAY_CONTAINER.select_all_root(&html).len(), 1);
    }

    #[test]
    fn unparseable_candidate_is_skipped() {
        let cascade = SelectorCascade::new("broken-first", &["[[nonsense", ".ok"]);
        let html = Html::parse_document(r#"<p class="ok">fine</p>"#);
        let found = cascade.select_first_root(&html).unwrap();
        assert_eq!(found.text().collect::<String>(), "fine");
    }

    #[test]
    fn no_match_yields_empty() {
        let html = Html::parse_document("<p>nothing here</p>");
        assert!(DAY_CONTAINER.select_all_root(&html).is_empty());
        assert!(WEEK_RANGE.select_first_root(&html).is_none());
    }

    #[test]
    fn scoped_selection_stays_inside_the_scope() {
        let html = Html::parse_document(
            r#"<div class="lessons-col"><div class="weekday-name">A</div></div>
               <div class="weekday-name">B</div>"#,
        );
        let day = DAY_CONTAINER.select_first_root(&html).unwrap();
        let label = WEEKDAY_LABEL.select_first(day).unwrap();
        assert_eq!(label.text().collect::<String>(), "A");
    }
}
