//! Timed review.
//!
//! A review token (the literal `review-test`, or the ID of a node) selects a
//! contiguous run of quizzes: everything after the matching node up to the
//! next section header. [`ReviewSession`] then walks those quizzes one at a
//! time with attempts, hints, and a per-question time limit, and converts the
//! outcome into progress records keyed by each quiz's original position.

use lesson_core::content::{ContentNode, NodeKind, Topic};
use lesson_core::ids::TopicId;
use lesson_core::progress::{ProgressKey, ProgressRecord};
use lesson_settings::ReviewSettings;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::{REVIEW_TITLE_MARKER, REVIEW_TOKEN};

// ─────────────────────────────────────────────────────────────────────────────
// Extraction
// ─────────────────────────────────────────────────────────────────────────────

/// A quiz selected for review.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQuestion {
    /// Source position of the quiz in its topic.
    pub position: usize,
    /// The quiz node.
    pub node: ContentNode,
}

/// How review tokens are recognized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewPolicy {
    /// Literal token that selects a header by title.
    pub token: String,
    /// Title fragment marking review headers.
    pub title_marker: String,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            token: REVIEW_TOKEN.to_owned(),
            title_marker: REVIEW_TITLE_MARKER.to_owned(),
        }
    }
}

impl From<&ReviewSettings> for ReviewPolicy {
    fn from(settings: &ReviewSettings) -> Self {
        Self {
            token: settings.token.clone(),
            title_marker: settings.title_marker.clone(),
        }
    }
}

impl ReviewPolicy {
    fn starts_range(&self, node: &ContentNode, token: &str) -> bool {
        let by_title = token == self.token
            && node.kind == NodeKind::SectionHeader
            && node.title_contains(&self.title_marker);
        by_title || node.has_id(token)
    }

    /// Quizzes in the range opened by `token`, in source order.
    ///
    /// The opening node is not collected and any later header closes the
    /// range. A second matching node reopens it. An empty result means the
    /// token should fall through to normal navigation.
    pub fn extract(&self, topic: &Topic, token: &str) -> Vec<ReviewQuestion> {
        if token.is_empty() {
            return Vec::new();
        }
        let mut in_range = false;
        let mut questions = Vec::new();
        for node in &topic.nodes {
            if self.starts_range(node, token) {
                in_range = true;
                continue;
            }
            if !in_range {
                continue;
            }
            match node.kind {
                NodeKind::SectionHeader => in_range = false,
                NodeKind::Quiz => questions.push(ReviewQuestion {
                    position: node.position,
                    node: node.clone(),
                }),
                _ => {}
            }
        }
        debug!(topic_id = %topic.id, token, questions = questions.len(), "extracted review");
        questions
    }

    /// Whether `token` should open a review rather than a deep link: the
    /// literal review token, or the ID of a review header.
    pub fn is_review_request(&self, topic: &Topic, token: &str) -> bool {
        token == self.token
            || topic.nodes.iter().any(|n| {
                n.kind == NodeKind::SectionHeader
                    && n.has_id(token)
                    && n.title_contains(&self.title_marker)
            })
    }
}

/// [`ReviewPolicy::extract`] with the default policy.
pub fn extract_review(topic: &Topic, token: &str) -> Vec<ReviewQuestion> {
    ReviewPolicy::default().extract(topic, token)
}

/// [`ReviewPolicy::is_review_request`] with the default policy.
pub fn is_review_request(topic: &Topic, token: &str) -> bool {
    ReviewPolicy::default().is_review_request(topic, token)
}

// ─────────────────────────────────────────────────────────────────────────────
// Grading
// ─────────────────────────────────────────────────────────────────────────────

/// Lowercase and drop all whitespace.
pub fn normalize_answer(answer: &str) -> String {
    answer
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `given` matches the quiz's expected answer after normalization.
///
/// Quizzes without an answer never match.
pub fn is_correct(given: &str, quiz: &ContentNode) -> bool {
    quiz.answer_text()
        .is_some_and(|expected| normalize_answer(given) == normalize_answer(&expected))
}

// ─────────────────────────────────────────────────────────────────────────────
// Session
// ─────────────────────────────────────────────────────────────────────────────

/// Per-question limits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReviewLimits {
    /// Time allowed per question. The host runs the clock and calls
    /// [`ReviewSession::time_up`].
    pub seconds_per_question: u32,
    /// Step hints revealed before the answer is offered.
    pub max_hints: u32,
}

impl Default for ReviewLimits {
    fn default() -> Self {
        Self {
            seconds_per_question: 120,
            max_hints: 3,
        }
    }
}

impl From<&ReviewSettings> for ReviewLimits {
    fn from(settings: &ReviewSettings) -> Self {
        Self {
            seconds_per_question: settings.seconds_per_question,
            max_hints: settings.max_hints,
        }
    }
}

/// Result of [`ReviewSession::submit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerCheck {
    /// Blank input; nothing recorded.
    Empty,
    /// Correct; the outcome is recorded.
    Correct,
    /// Wrong; the attempt counter went up.
    Incorrect,
    /// The question was already answered correctly.
    AlreadyAnswered,
    /// No question is current.
    NoQuestion,
}

/// A revealed hint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Hint {
    /// Solution step `number` (1-based).
    Step {
        /// 1-based step number.
        number: usize,
        /// Step text.
        text: String,
    },
    /// The expected answer, offered once the step hints run out.
    Answer(String),
}

/// Recorded result of one question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewOutcome {
    /// Source position of the quiz.
    pub position: usize,
    /// Answered correctly.
    pub correct: bool,
    /// Submissions made, including the correct one.
    pub attempts: u32,
    /// The time limit ran out before a correct answer.
    pub timed_out: bool,
}

/// Stateful walk through a set of review questions.
#[derive(Clone, Debug)]
pub struct ReviewSession {
    topic_id: TopicId,
    questions: Vec<ReviewQuestion>,
    outcomes: Vec<Option<ReviewOutcome>>,
    limits: ReviewLimits,
    current: usize,
    attempts: u32,
    hints_shown: usize,
    answer_revealed: bool,
}

impl ReviewSession {
    /// Start at the first question.
    pub fn new(
        topic_id: impl Into<TopicId>,
        questions: Vec<ReviewQuestion>,
        limits: ReviewLimits,
    ) -> Self {
        let outcomes = vec![None; questions.len()];
        Self {
            topic_id: topic_id.into(),
            questions,
            outcomes,
            limits,
            current: 0,
            attempts: 0,
            hints_shown: 0,
            answer_revealed: false,
        }
    }

    /// Topic the questions come from.
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether there are no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Index of the current question.
    pub fn index(&self) -> usize {
        self.current
    }

    /// The current question.
    pub fn current(&self) -> Option<&ReviewQuestion> {
        self.questions.get(self.current)
    }

    /// Limits in force.
    pub fn limits(&self) -> ReviewLimits {
        self.limits
    }

    /// Wrong submissions on the current question.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Check `answer` against the current question.
    pub fn submit(&mut self, answer: &str) -> AnswerCheck {
        let Some(question) = self.questions.get(self.current) else {
            return AnswerCheck::NoQuestion;
        };
        if answer.trim().is_empty() {
            return AnswerCheck::Empty;
        }
        let slot = &mut self.outcomes[self.current];
        if slot.is_some_and(|o| o.correct) {
            return AnswerCheck::AlreadyAnswered;
        }
        if !is_correct(answer, &question.node) {
            self.attempts += 1;
            return AnswerCheck::Incorrect;
        }
        // a correct answer after time-up upgrades the entry and keeps the flag
        let timed_out = slot.is_some_and(|o| o.timed_out);
        *slot = Some(ReviewOutcome {
            position: question.position,
            correct: true,
            attempts: self.attempts + 1,
            timed_out,
        });
        AnswerCheck::Correct
    }

    /// Record that the clock ran out on the current question.
    ///
    /// Returns `false` when the question already has an outcome.
    pub fn time_up(&mut self) -> bool {
        let Some(question) = self.questions.get(self.current) else {
            return false;
        };
        let slot = &mut self.outcomes[self.current];
        if slot.is_some() {
            return false;
        }
        *slot = Some(ReviewOutcome {
            position: question.position,
            correct: false,
            attempts: self.attempts,
            timed_out: true,
        });
        true
    }

    /// Reveal the next hint for the current question.
    ///
    /// Solution steps come first, at most `max_hints` of them; after that the
    /// answer is revealed once. Returns `None` when nothing is left.
    pub fn next_hint(&mut self) -> Option<Hint> {
        let question = self.questions.get(self.current)?;
        let step_budget = question.node.steps.len().min(self.limits.max_hints as usize);
        if self.hints_shown < step_budget {
            let text = step_text(&question.node.steps[self.hints_shown]);
            self.hints_shown += 1;
            return Some(Hint::Step {
                number: self.hints_shown,
                text,
            });
        }
        if self.answer_revealed {
            return None;
        }
        self.answer_revealed = true;
        question.node.answer_text().map(Hint::Answer)
    }

    /// Advance to the next question. Returns whether the index moved.
    pub fn go_next(&mut self) -> bool {
        if self.current + 1 >= self.questions.len() {
            return false;
        }
        self.current += 1;
        self.reset_question();
        true
    }

    /// Return to the previous question. Returns whether the index moved.
    pub fn go_back(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.reset_question();
        true
    }

    /// Whether every question has an outcome.
    pub fn is_finished(&self) -> bool {
        self.outcomes.iter().all(Option::is_some)
    }

    /// Recorded outcomes in question order.
    pub fn outcomes(&self) -> impl Iterator<Item = &ReviewOutcome> {
        self.outcomes.iter().flatten()
    }

    /// One graded record per answered question, keyed by original position.
    ///
    /// Correct answers score 1 of 1, everything else 0 of 1. Unanswered
    /// questions produce nothing.
    pub fn into_records(self, pass_ratio: f64) -> Vec<(ProgressKey, ProgressRecord)> {
        let topic_id = self.topic_id;
        self.outcomes
            .into_iter()
            .flatten()
            .map(|outcome| {
                let score = if outcome.correct { 1.0 } else { 0.0 };
                (
                    ProgressKey::quiz(topic_id.clone(), outcome.position),
                    ProgressRecord::graded(score, 1.0, pass_ratio),
                )
            })
            .collect()
    }

    fn reset_question(&mut self) {
        self.attempts = 0;
        self.hints_shown = 0;
        self.answer_revealed = false;
    }
}

fn step_text(step: &Value) -> String {
    match step {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
