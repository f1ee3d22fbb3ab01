//! Provider-specific marker strings and artifact names.
//!
//! These are tuned to the mstimetables.ru publication viewer; the selector
//! candidate lists that pair with them live in `extractor::selectors`.

/// Literal the provider renders into the content cell of an empty period.
pub const NO_CLASS_SENTINEL: &str = "Нет занятий";

/// Placeholder the provider leaves in the time cell of filler rows.
pub const TIME_PLACEHOLDER: &str = "#";

/// Lowercased keywords of interactive elements worth activating before
/// extraction ("load", "show", "schedule" in the provider's language).
pub const PROBE_KEYWORDS: [&str; 3] = ["загрузить", "показать", "расписание"];

/// Clickable elements considered during loader probing.
pub const PROBE_BUTTON_SELECTOR: &str = r#"button, .btn, [role="button"]"#;

/// Query parameters the provider encodes the date/group selection in.
pub const DATE_PARAM: &str = "date";
pub const GROUP_PARAM: &str = "group";

/// Output artifact file names, full model and simplified projection.
pub const FULL_ARTIFACT_FILE: &str = "schedule-data.json";
pub const SIMPLIFIED_ARTIFACT_FILE: &str = "schedule-simplified.json";
