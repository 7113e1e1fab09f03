//! Question-bank text parser.
//!
//! Banks are line oriented. A record looks like:
//!
//! ```text
//! Level: 1
//! Q: What is 2 + 2? (Easy)
//! Topic: Arithmetic
//! Weight: 1
//! A) 3
//! B) 4
//! C) 5
//! D) 22
//! Answer: 1
//! ```
//!
//! `Answer:` commits the record. Banks without `Level:` lines separate
//! records with blank lines instead. Difficulty comes from the inline tag on
//! the `Q:` line, falling back to the `Level:` number.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::{BankError, ParseError};
use crate::model::{Difficulty, Question, MAX_WEIGHT, MIN_WEIGHT, OPTION_COUNT};

const OPTION_PREFIXES: [&str; OPTION_COUNT] = ["A)", "B)", "C)", "D)"];

/// Result of a lenient parse: the valid questions plus every skipped record.
#[derive(Debug, Clone, Default)]
pub struct ParsedBank {
    pub questions: Vec<Question>,
    pub skipped: Vec<ParseError>,
}

impl ParsedBank {
    /// Number of questions per difficulty tier.
    pub fn tier_counts(&self) -> BTreeMap<Difficulty, usize> {
        let mut counts: BTreeMap<Difficulty, usize> =
            Difficulty::ALL.iter().map(|d| (*d, 0)).collect();
        for q in &self.questions {
            *counts.entry(q.difficulty).or_default() += 1;
        }
        counts
    }

    /// Distinct topics, sorted.
    pub fn topics(&self) -> BTreeSet<String> {
        topics_of(&self.questions)
    }
}

/// Distinct non-empty topics of a question set.
pub fn topics_of(questions: &[Question]) -> BTreeSet<String> {
    questions.iter().filter_map(|q| q.topic.clone()).collect()
}

/// A record under construction.
#[derive(Debug)]
struct RecordBuilder {
    level_difficulty: Option<Difficulty>,
    tag_difficulty: Option<Difficulty>,
    text: Vec<String>,
    has_question: bool,
    topic: Option<String>,
    weight: u8,
    options: [Option<String>; OPTION_COUNT],
}

impl RecordBuilder {
    fn new(level_difficulty: Option<Difficulty>) -> Self {
        Self {
            level_difficulty,
            tag_difficulty: None,
            text: Vec::new(),
            has_question: false,
            topic: None,
            weight: MIN_WEIGHT,
            options: Default::default(),
        }
    }

    fn set_question(&mut self, line: &str) {
        self.has_question = true;
        self.tag_difficulty = Difficulty::ALL
            .iter()
            .copied()
            .find(|d| line.contains(d.tag()));
        self.text.push(line.to_string());
    }

    fn has_options(&self) -> bool {
        self.options.iter().any(Option::is_some)
    }

    /// Validate and build the question. `line` is where the record was committed.
    fn finish(self, id: usize, answer: Option<usize>, line: usize) -> Result<Question, ParseError> {
        if !self.has_question {
            return Err(ParseError::MissingQuestion { line });
        }
        let found = self.options.iter().filter(|o| o.is_some()).count();
        if found < OPTION_COUNT {
            return Err(ParseError::IncompleteOptions { line, found });
        }
        let correct_index = answer.ok_or(ParseError::MissingAnswer { line })?;

        let [a, b, c, d] = self.options;
        let options = [
            a.unwrap_or_default(),
            b.unwrap_or_default(),
            c.unwrap_or_default(),
            d.unwrap_or_default(),
        ];

        Ok(Question {
            id,
            text: self.text.join("\n").trim_end().to_string(),
            options,
            correct_index,
            difficulty: self
                .tag_difficulty
                .or(self.level_difficulty)
                .unwrap_or_default(),
            topic: self.topic,
            weight: self.weight,
        })
    }
}

/// Strip a keyword prefix such as `Topic:` and return the trimmed remainder.
fn keyword<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).map(str::trim)
}

fn parse_answer(value: &str, line: usize) -> Result<usize, ParseError> {
    let index: i64 = value.parse().map_err(|_| ParseError::InvalidAnswer {
        line,
        value: value.to_string(),
    })?;
    if (0..OPTION_COUNT as i64).contains(&index) {
        Ok(index as usize)
    } else {
        Err(ParseError::AnswerOutOfRange { line, index })
    }
}

/// Parse every record, keeping malformed ones as errors in input order.
fn parse_records(text: &str) -> Vec<Result<Question, ParseError>> {
    let mut records = Vec::new();
    let mut current: Option<RecordBuilder> = None;
    let mut next_id = 0usize;
    let mut last_line = 0usize;

    let mut commit = |builder: RecordBuilder,
                      answer: Option<usize>,
                      line: usize,
                      records: &mut Vec<Result<Question, ParseError>>| {
        let result = builder.finish(next_id, answer, line);
        if result.is_ok() {
            next_id += 1;
        }
        records.push(result);
    };

    for (idx, raw) in text.split('\n').enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if current.as_ref().is_some_and(RecordBuilder::has_options) {
                if let Some(rec) = current.take() {
                    commit(rec, None, line_no, &mut records);
                }
            } else if let Some(rec) = current.as_mut().filter(|r| r.has_question) {
                rec.text.push(String::new());
            }
            continue;
        }

        if let Some(rest) = keyword(trimmed, "Level:") {
            if let Some(rec) = current.take() {
                commit(rec, None, line_no, &mut records);
            }
            let level = rest.parse::<i64>().ok().and_then(Difficulty::from_level);
            current = Some(RecordBuilder::new(level));
        } else if let Some(rest) = keyword(trimmed, "Q:") {
            let rec = match current.take() {
                Some(rec) if rec.has_question => {
                    let level = rec.level_difficulty;
                    commit(rec, None, line_no, &mut records);
                    RecordBuilder::new(level)
                }
                Some(rec) => rec,
                None => RecordBuilder::new(None),
            };
            let rec = current.insert(rec);
            rec.set_question(rest);
        } else if let Some(rest) = keyword(trimmed, "Topic:") {
            if let Some(rec) = current.as_mut() {
                rec.topic = (!rest.is_empty()).then(|| rest.to_string());
            }
        } else if let Some(rest) = keyword(trimmed, "Weight:") {
            if let Some(rec) = current.as_mut() {
                rec.weight = rest
                    .parse::<i64>()
                    .map(|w| w.clamp(MIN_WEIGHT as i64, MAX_WEIGHT as i64) as u8)
                    .unwrap_or(MIN_WEIGHT);
            }
        } else if let Some(slot) = OPTION_PREFIXES.iter().position(|p| trimmed.starts_with(p)) {
            let Some(rec) = current.as_mut() else {
                records.push(Err(ParseError::OrphanLine {
                    line: line_no,
                    content: trimmed.to_string(),
                }));
                continue;
            };
            rec.options[slot] = Some(trimmed[OPTION_PREFIXES[slot].len()..].trim().to_string());
        } else if let Some(rest) = keyword(trimmed, "Answer:") {
            let Some(rec) = current.take() else {
                records.push(Err(ParseError::OrphanLine {
                    line: line_no,
                    content: trimmed.to_string(),
                }));
                continue;
            };
            match parse_answer(rest, line_no) {
                Ok(answer) => commit(rec, Some(answer), line_no, &mut records),
                Err(e) => records.push(Err(e)),
            }
        } else if let Some(rec) = current.as_mut() {
            rec.text.push(line.to_string());
        }
    }

    if let Some(rec) = current.take() {
        commit(rec, None, last_line, &mut records);
    }

    records
}

/// Parse a bank strictly: the first malformed record rejects the whole bank.
pub fn parse_bank(text: &str) -> Result<Vec<Question>, ParseError> {
    parse_records(text).into_iter().collect()
}

/// Parse a bank, skipping malformed records with a warning.
///
/// Fails only when no valid question remains.
pub fn parse_bank_lenient(text: &str) -> Result<ParsedBank, BankError> {
    if text.trim().is_empty() {
        return Err(BankError::Missing);
    }

    let mut bank = ParsedBank::default();
    for record in parse_records(text) {
        match record {
            Ok(q) => bank.questions.push(q),
            Err(e) => {
                tracing::warn!("skipping malformed question record: {e}");
                bank.skipped.push(e);
            }
        }
    }

    if bank.questions.is_empty() {
        return Err(BankError::Empty {
            skipped: bank.skipped.len(),
        });
    }
    Ok(bank)
}

/// Read and leniently parse a bank file.
pub fn load_bank(path: &Path) -> Result<ParsedBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_bank_lenient(&content)
        .with_context(|| format!("failed to parse question bank: {}", path.display()))
}

/// A bank loaded from disk.
#[derive(Debug, Clone)]
pub struct LoadedBank {
    pub path: PathBuf,
    pub bank: ParsedBank,
}

impl LoadedBank {
    /// File stem, e.g. `questions1`.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Recursively load all `.txt` banks from a directory, sorted by path.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<LoadedBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<_>>()?;
    paths.sort();

    for path in paths {
        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            match load_bank(&path) {
                Ok(bank) => banks.push(LoadedBank { path, bank }),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A non-fatal issue found in a parsed bank.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<usize>,
    pub message: String,
}

/// Check a bank for issues that do not prevent a session from running.
pub fn validate_bank(questions: &[Question]) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_text = HashSet::new();
    for q in questions {
        if !seen_text.insert(q.text.as_str()) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "duplicate question text".into(),
            });
        }
    }

    for q in questions {
        let distinct: HashSet<&str> = q.options.iter().map(String::as_str).collect();
        if distinct.len() < q.options.len() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id),
                message: "options are not distinct".into(),
            });
        }
    }

    let untagged = questions.iter().filter(|q| q.topic.is_none()).count();
    if untagged > 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: format!("{untagged} question(s) have no topic and will not update mastery"),
        });
    }

    for tier in Difficulty::ALL {
        if !questions.iter().any(|q| q.difficulty == tier) {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("no {tier} questions; that tier will fall back to the full bank"),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL_BANK: &str = "\
Level: 1
Q: What is 2 + 2? (Easy)
Topic: Arithmetic
Weight: 1
A) 3
B) 4
C) 5
D) 22
Answer: 1
Level: 1
Q: Solve for x:
2x + 3 = 11 (Medium)
Topic: Algebra
Weight: 2
A) 3
B) 4
C) 5
D) 8
Answer: 1
Level: 3
Q: Derivative of x^2?
Topic: Calculus
Weight: 7
A) x
B) 2x
C) x^2
D) 2
Answer: 1
";

    const BLANK_LINE_BANK: &str = "Q: Capital of France? (Easy)\r\n\
A) Paris\r\n\
B) Rome\r\n\
C) Madrid\r\n\
D) Berlin\r\n\
Answer: 0\r\n\
\r\n\
Q: Largest planet? (Hard)\r\n\
A) Mars\r\n\
B) Venus\r\n\
C) Jupiter\r\n\
D) Mercury\r\n\
Answer: 2\r\n";

    #[test]
    fn parse_level_delimited_bank() {
        let questions = parse_bank(LEVEL_BANK).unwrap();
        assert_eq!(questions.len(), 3);

        let q = &questions[0];
        assert_eq!(q.id, 0);
        assert_eq!(q.text, "What is 2 + 2? (Easy)");
        assert_eq!(q.options[1], "4");
        assert_eq!(q.correct_index, 1);
        assert_eq!(q.difficulty, Difficulty::Easy);
        assert_eq!(q.topic.as_deref(), Some("Arithmetic"));
    }

    #[test]
    fn continuation_lines_join_question_text() {
        let questions = parse_bank(LEVEL_BANK).unwrap();
        assert_eq!(questions[1].text, "Solve for x:\n2x + 3 = 11 (Medium)");
        // the tag is only read from the Q: line
        assert_eq!(questions[1].difficulty, Difficulty::Easy);
        assert_eq!(questions[1].weight, 2);
    }

    #[test]
    fn level_sets_difficulty_without_tag() {
        let questions = parse_bank(LEVEL_BANK).unwrap();
        assert_eq!(questions[2].difficulty, Difficulty::Hard);
    }

    #[test]
    fn weight_is_clamped() {
        let questions = parse_bank(LEVEL_BANK).unwrap();
        assert_eq!(questions[2].weight, 3);

        let bank = "Q: x (Easy)\nWeight: zero\nA) a\nB) b\nC) c\nD) d\nAnswer: 0\n";
        assert_eq!(parse_bank(bank).unwrap()[0].weight, 1);
        let bank = "Q: x (Easy)\nWeight: -4\nA) a\nB) b\nC) c\nD) d\nAnswer: 0\n";
        assert_eq!(parse_bank(bank).unwrap()[0].weight, 1);
    }

    #[test]
    fn parse_blank_line_delimited_crlf_bank() {
        let questions = parse_bank(BLANK_LINE_BANK).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "Capital of France? (Easy)");
        assert_eq!(questions[0].options[3], "Berlin");
        assert_eq!(questions[1].difficulty, Difficulty::Hard);
        assert_eq!(questions[1].correct_index, 2);
        assert!(questions[1].topic.is_none());
        assert_eq!(questions[1].id, 1);
    }

    #[test]
    fn every_question_is_complete() {
        for bank in [LEVEL_BANK, BLANK_LINE_BANK] {
            for q in parse_bank(bank).unwrap() {
                assert_eq!(q.options.len(), 4);
                assert!(q.correct_index <= 3);
                assert!((1..=3).contains(&q.weight));
            }
        }
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_bank(LEVEL_BANK).unwrap(), parse_bank(LEVEL_BANK).unwrap());
    }

    #[test]
    fn missing_option_is_reported_with_line() {
        let bank = "Level: 1\nQ: x (Easy)\nA) a\nB) b\nC) c\nAnswer: 0\n";
        let err = parse_bank(bank).unwrap_err();
        assert_eq!(err, ParseError::IncompleteOptions { line: 6, found: 3 });
    }

    #[test]
    fn unparsable_and_out_of_range_answers() {
        let bank = "Q: x\nA) a\nB) b\nC) c\nD) d\nAnswer: B\n";
        assert!(matches!(
            parse_bank(bank).unwrap_err(),
            ParseError::InvalidAnswer { line: 6, .. }
        ));

        let bank = "Q: x\nA) a\nB) b\nC) c\nD) d\nAnswer: 4\n";
        assert_eq!(
            parse_bank(bank).unwrap_err(),
            ParseError::AnswerOutOfRange { line: 6, index: 4 }
        );
    }

    #[test]
    fn record_without_answer_is_rejected_at_boundary() {
        let bank = "Q: x\nA) a\nB) b\nC) c\nD) d\n\nQ: y\nA) a\nB) b\nC) c\nD) d\nAnswer: 0\n";
        assert_eq!(
            parse_bank(bank).unwrap_err(),
            ParseError::MissingAnswer { line: 6 }
        );
    }

    #[test]
    fn orphan_option_line() {
        let bank = "A) floating\n";
        assert!(matches!(
            parse_bank(bank).unwrap_err(),
            ParseError::OrphanLine { line: 1, .. }
        ));
    }

    #[test]
    fn lenient_parse_skips_bad_records() {
        let bank = format!("{LEVEL_BANK}Level: 2\nQ: broken (Medium)\nA) a\nAnswer: 0\n");
        let parsed = parse_bank_lenient(&bank).unwrap();
        assert_eq!(parsed.questions.len(), 3);
        assert_eq!(parsed.skipped.len(), 1);
        assert_eq!(parsed.tier_counts()[&Difficulty::Hard], 1);
        assert_eq!(parsed.topics().len(), 3);
    }

    #[test]
    fn lenient_parse_rejects_empty_banks() {
        assert!(matches!(parse_bank_lenient("  \n"), Err(BankError::Missing)));
        assert!(matches!(
            parse_bank_lenient("Q: x\nAnswer: 0\n"),
            Err(BankError::Empty { skipped: 1 })
        ));
    }

    #[test]
    fn validate_reports_missing_tiers_and_duplicates() {
        let mut questions = parse_bank(BLANK_LINE_BANK).unwrap();
        questions.push(Question {
            id: 2,
            ..questions[0].clone()
        });
        let warnings = validate_bank(&questions);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings.iter().any(|w| w.message.contains("no medium")));
        assert!(warnings.iter().any(|w| w.message.contains("no topic")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("questions1.txt"), LEVEL_BANK).unwrap();
        std::fs::write(dir.path().join("questions2.txt"), BLANK_LINE_BANK).unwrap();
        std::fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].name(), "questions1");
        assert_eq!(banks[1].bank.questions.len(), 2);
    }
}
