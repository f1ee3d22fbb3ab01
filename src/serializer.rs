use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::constants::{FULL_ARTIFACT_FILE, SIMPLIFIED_ARTIFACT_FILE};
use crate::error::{Result, ScraperError};
use crate::types::{ScheduleSnapshot, SimplifiedSchedule};

/// Paths of the artifact pair written by one invocation.
#[derive(Debug, Clone)]
pub struct WrittenArtifacts {
    pub full: PathBuf,
    pub simplified: PathBuf,
}

/// Persists the full model and the simplified projection as pretty-printed
/// JSON under `output_dir`, creating the directory if needed. Both models
/// are serialized before the first byte is written, so a serialization
/// failure persists nothing.
pub fn write_artifacts(
    snapshot: &ScheduleSnapshot,
    simplified: &SimplifiedSchedule,
    output_dir: &Path,
) -> Result<WrittenArtifacts> {
    let full_json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| ScraperError::Serialization(format!("failed to serialize schedule: {e}")))?;
    let simplified_json = serde_json::to_string_pretty(simplified).map_err(|e| {
        ScraperError::Serialization(format!("failed to serialize simplified schedule: {e}"))
    })?;

    fs::create_dir_all(output_dir).map_err(|e| {
        ScraperError::Serialization(format!(
            "failed to create output directory '{}': {e}",
            output_dir.display()
        ))
    })?;

    let full = output_dir.join(FULL_ARTIFACT_FILE);
    fs::write(&full, full_json)
        .map_err(|e| ScraperError::Serialization(format!("failed to write {}: {e}", full.display())))?;

    let simplified_path = output_dir.join(SIMPLIFIED_ARTIFACT_FILE);
    fs::write(&simplified_path, simplified_json).map_err(|e| {
        ScraperError::Serialization(format!("failed to write {}: {e}", simplified_path.display()))
    })?;

    info!(
        full = %full.display(),
        simplified = %simplified_path.display(),
        "wrote schedule artifacts"
    );

    Ok(WrittenArtifacts {
        full,
        simplified: simplified_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer;
    use crate::types::{Day, Lesson, Metadata, TimeSlot, TimeSlotEntry};

    fn sample_snapshot() -> ScheduleSnapshot {
        ScheduleSnapshot {
            url: "https://mstimetables.ru/publications/abc?group=42".to_string(),
            title: "Расписание".to_string(),
            timestamp: "2025-09-15T06:00:00.000Z".to_string(),
            week_range: "15.09 - 21.09".to_string(),
            days: vec![Day {
                day_index: 0,
                day_name: "Понедельник".to_string(),
                date: "15.09".to_string(),
                lessons: vec![TimeSlotEntry {
                    time_slot: TimeSlot {
                        start: "08:30".to_string(),
                        end: "09:15".to_string(),
                        display: "08:30/09:15".to_string(),
                    },
                    lessons: vec![Lesson {
                        subject: "Математика".to_string(),
                        teacher: "Иванов И.И.".to_string(),
                        room: "204".to_string(),
                    }],
                }],
            }],
            teachers: vec!["Иванов И.И.".to_string()],
            rooms: vec!["204".to_string()],
            time_slots: vec!["08:30/09:15".to_string()],
            metadata: Metadata::default(),
        }
    }

    #[test]
    fn writes_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = sample_snapshot();
        let simplified = normalizer::simplify(&snapshot);

        let written = write_artifacts(&snapshot, &simplified, dir.path()).unwrap();
        assert!(written.full.exists());
        assert!(written.simplified.exists());
        assert_eq!(written.full.file_name().unwrap(), FULL_ARTIFACT_FILE);
        assert_eq!(written.simplified.file_name().unwrap(), SIMPLIFIED_ARTIFACT_FILE);
    }

    #[test]
    fn artifacts_are_pretty_printed_camel_case_json() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = sample_snapshot();
        let simplified = normalizer::simplify(&snapshot);
        let written = write_artifacts(&snapshot, &simplified, dir.path()).unwrap();

        let full_text = fs::read_to_string(&written.full).unwrap();
        assert!(full_text.contains('\n'));
        let full: serde_json::Value = serde_json::from_str(&full_text).unwrap();
        assert_eq!(full["weekRange"], "15.09 - 21.09");
        assert_eq!(full["days"][0]["dayIndex"], 0);
        assert_eq!(full["days"][0]["lessons"][0]["timeSlot"]["display"], "08:30/09:15");
        assert!(full["metadata"]["urlParams"].is_object());

        let simplified_text = fs::read_to_string(&written.simplified).unwrap();
        let simplified: serde_json::Value = serde_json::from_str(&simplified_text).unwrap();
        assert_eq!(simplified["days"][0]["lessons"][0]["time"], "08:30-09:15");
        assert_eq!(
            simplified["days"][0]["lessons"][0]["activities"][0]["subject"],
            "Математика"
        );
    }

    #[test]
    fn missing_output_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("current");
        let snapshot = sample_snapshot();
        let simplified = normalizer::simplify(&snapshot);

        write_artifacts(&snapshot, &simplified, &nested).unwrap();
        assert!(nested.join(FULL_ARTIFACT_FILE).exists());
    }

    #[test]
    fn unwritable_destination_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let snapshot = sample_snapshot();
        let simplified = normalizer::simplify(&snapshot);

        let err = write_artifacts(&snapshot, &simplified, &blocker.join("nested")).unwrap_err();
        assert!(matches!(err, ScraperError::Serialization(_)));
    }
}
