//! quizforge-report — CSV and HTML renderings of quiz session reports.

pub mod csv;
pub mod html;
