// models.rs
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

impl Question {
    /// A question is visible once its publication date has been reached.
    /// Every lookup that serves a single question goes through this check.
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.pub_date <= now
    }

    /// True when published within the trailing day ending at `now`.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) < self.pub_date && self.pub_date <= now
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.question_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.choice_text)
    }
}

/// Body of the vote form. `choice` is kept as raw text so that a missing,
/// empty or malformed value all end up as "no selection".
#[derive(Debug, Default)]
pub struct VoteForm {
    pub choice: Option<String>,
}

impl VoteForm {
    /// Builds the form from decoded `key=value` pairs. When `choice` is
    /// repeated the last value wins.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let choice = pairs
            .into_iter()
            .filter(|(key, _)| key == "choice")
            .map(|(_, value)| value)
            .last();
        Self { choice }
    }

    pub fn choice_id(&self) -> Option<i64> {
        self.choice.as_deref()?.trim().parse().ok()
    }
}

/// One question of a seed fixture file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionFixture {
    #[serde(default)]
    pub id: Option<i64>,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub choices: Vec<ChoiceFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceFixture {
    #[serde(default)]
    pub id: Option<i64>,
    pub choice_text: String,
    #[serde(default)]
    pub votes: u32,
}
