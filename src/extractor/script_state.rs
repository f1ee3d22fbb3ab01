use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use crate::types::ScriptStateHit;

/// Assignment shapes worth mining out of inline `<script>` bodies. The
/// captured group must be a JSON object literal for the hit to count.
const STATE_PATTERNS: [(&str, &str); 5] = [
    (
        "window.__INITIAL_STATE__",
        r"(?s)window\.__INITIAL_STATE__\s*=\s*(\{.*?\});",
    ),
    ("window.__DATA__", r"(?s)window\.__DATA__\s*=\s*(\{.*?\});"),
    ("var-object", r"(?s)var\s+\w+\s*=\s*(\{.*?\});"),
    ("const-object", r"(?s)const\s+\w+\s*=\s*(\{.*?\});"),
    ("let-object", r"(?s)let\s+\w+\s*=\s*(\{.*?\});"),
];

/// Scans every inline script for serialized application state. Best-effort
/// enrichment: candidates that are not valid JSON are dropped, and at most
/// one hit is kept per script (first pattern that matches and parses).
pub fn mine(document: &Html) -> Vec<ScriptStateHit> {
    let script_selector = Selector::parse("script").unwrap();
    let mut hits = Vec::new();

    for (script_index, script) in document.select(&script_selector).enumerate() {
        let body: String = script.text().collect();
        if body.trim().is_empty() {
            continue;
        }

        for (name, pattern) in STATE_PATTERNS {
            if let Ok(re) = Regex::new(pattern) {
                if let Some(captures) = re.captures(&body) {
                    if let Some(candidate) = captures.get(1) {
                        match serde_json::from_str(candidate.as_str()) {
                            Ok(data) => {
                                debug!(script_index, pattern = name, "mined inline script state");
                                hits.push(ScriptStateHit {
                                    script_index,
                                    pattern: name.to_string(),
                                    data,
                                });
                                break;
                            }
                            Err(e) => {
                                debug!(script_index, pattern = name, error = %e, "script state candidate is not valid JSON");
                            }
                        }
                    }
                }
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_window_data_assignment() {
        let html = Html::parse_document(
            r#"<script>window.__DATA__ = {"week": "1 - 7", "group": 42};</script>"#,
        );
        let hits = mine(&html);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pattern, "window.__DATA__");
        assert_eq!(hits[0].data["group"], 42);
    }

    #[test]
    fn finds_initial_state_before_generic_shapes() {
        let html = Html::parse_document(
            r#"<script>
                window.__INITIAL_STATE__ = {"ready": true};
                const cache = {"x": 1};
            </script>"#,
        );
        let hits = mine(&html);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pattern, "window.__INITIAL_STATE__");
    }

    #[test]
    fn invalid_json_falls_through_to_the_next_pattern() {
        let html = Html::parse_document(
            r#"<script>
                window.__DATA__ = {broken: unquoted};
                let settings = {"theme": "dark"};
            </script>"#,
        );
        let hits = mine(&html);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].pattern, "let-object");
        assert_eq!(hits[0].data["theme"], "dark");
    }

    #[test]
    fn indexes_scripts_in_document_order() {
        let html = Html::parse_document(
            r#"<script>console.log("noise");</script>
               <script>var state = {"a": 1};</script>"#,
        );
        let hits = mine(&html);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].script_index, 1);
    }

    #[test]
    fn page_without_state_yields_nothing() {
        let html = Html::parse_document("<script>document.title = 'x';</script><p>body</p>");
        assert!(mine(&html).is_empty());
    }
}
