//! Session report types with JSON persistence.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SessionMode;
use crate::model::{Difficulty, SelectionPolicy};
use crate::recorder::Response;
use crate::statistics::SessionStats;

/// Everything known about a session when the report was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique session identifier.
    pub id: Uuid,
    /// When the session started.
    pub created_at: DateTime<Utc>,
    pub mode: SessionMode,
    /// Selected bank level.
    pub level: u32,
    pub policy: SelectionPolicy,
    /// Questions the session was planned to serve.
    pub total_questions: usize,
    /// Number of correct answers.
    pub score: usize,
    /// Tier at the time of the report.
    pub final_tier: Difficulty,
    /// Topic → mastery probability, in topic order.
    pub mastery: BTreeMap<String, f64>,
    /// Answers in the order they were given.
    pub responses: Vec<Response>,
    pub statistics: SessionStats,
}

impl SessionReport {
    pub fn answered(&self) -> usize {
        self.responses.len()
    }

    /// `score/total`, as shown in exported results.
    pub fn score_label(&self) -> String {
        format!("{}/{}", self.score, self.total_questions)
    }

    /// Fraction of answered questions that were correct.
    pub fn accuracy(&self) -> f64 {
        self.statistics.overall.accuracy
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistics::compute_session_stats;

    fn make_response(number: usize, correct: bool) -> Response {
        Response {
            number,
            question_id: number - 1,
            question_text: format!("Question {number}, with a comma"),
            topic: Some("Fractions".into()),
            weight: 2,
            difficulty: Difficulty::Easy,
            served_tier: Difficulty::Easy,
            selected_index: 0,
            selected_answer: "1/2".into(),
            correct_index: if correct { 0 } else { 3 },
            correct_answer: if correct { "1/2".into() } else { "3/4".into() },
            is_correct: correct,
            mastery_after: Some(0.61),
            tier_after: Difficulty::Easy,
            answered_at: Utc::now(),
        }
    }

    fn make_report(responses: Vec<Response>) -> SessionReport {
        SessionReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            mode: SessionMode::fixed(),
            level: 2,
            policy: SelectionPolicy::Plain,
            total_questions: 20,
            score: responses.iter().filter(|r| r.is_correct).count(),
            final_tier: Difficulty::Medium,
            mastery: BTreeMap::from([("Fractions".to_string(), 0.61)]),
            statistics: compute_session_stats(&responses),
            responses,
        }
    }

    #[test]
    fn score_label_and_accuracy() {
        let report = make_report(vec![make_response(1, true), make_response(2, false)]);
        assert_eq!(report.score_label(), "1/20");
        assert_eq!(report.answered(), 2);
        assert_eq!(report.accuracy(), 0.5);
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report(vec![make_response(1, true)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = SessionReport::load_json(&path).unwrap();

        assert_eq!(loaded.level, 2);
        assert_eq!(loaded.mode, SessionMode::fixed());
        assert_eq!(loaded.responses.len(), 1);
        assert_eq!(loaded.statistics, report.statistics);
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = SessionReport::load_json(Path::new("/nonexistent/report.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/report.json"));
    }
}
