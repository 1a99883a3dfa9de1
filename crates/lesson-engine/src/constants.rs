//! Shared constants for the navigation engine.

/// Deep-link token that starts the chapter review.
pub const REVIEW_TOKEN: &str = "review-test";

/// Title fragment that marks a header as the review section.
pub const REVIEW_TITLE_MARKER: &str = "Review Test";

/// Minimum quizzes in a section before the next section can be locked.
pub const MIN_BATCH_SIZE: usize = 5;

/// Passed quizzes needed to unlock the next section.
pub const REQUIRED_PASSES: usize = 8;

/// Title shown on a quiz group step.
pub const QUIZ_GROUP_TITLE: &str = "Practice Questions";

/// Title shown on the "up next" card.
pub const NEXT_TOPIC_TITLE: &str = "Up Next";
