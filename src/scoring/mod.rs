// src/scoring/mod.rs

//! Pure scoring rules. Nothing in here touches the database.

use std::collections::{HashMap, HashSet};

pub mod runner;
pub mod validator;

/// Lesson question rule: exact, case-sensitive match with no normalization.
/// A question without a stored answer can never be answered correctly.
pub fn answer_is_correct(submitted: &str, expected: Option<&str>) -> bool {
    matches!(expected, Some(expected) if submitted == expected)
}

/// Point delta for an all-or-nothing outcome.
pub fn points_for(correct: bool, points: i64) -> i64 {
    if correct { points } else { 0 }
}

/// Answer key of one quiz question.
#[derive(Debug, Clone)]
pub struct QuizQuestionKey {
    pub question_id: i64,
    pub points: i64,
    pub correct_answer_ids: HashSet<i64>,
}

/// One graded quiz answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub answer_id: i64,
    pub is_correct: bool,
}

/// Result of grading a full quiz submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    /// Sum of points of correctly answered questions.
    pub score: i64,
    /// Sum of points of every question in the quiz.
    pub total_points: i64,
    pub passed: bool,
    /// Flat quiz bonus, only on pass.
    pub bonus: i64,
    pub answers: Vec<GradedAnswer>,
}

/// Percentage of `total` reached by `score`. Zero when there is nothing to score.
pub fn percentage(score: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    (score as f64 / total as f64) * 100.0
}

/// `score / total * 100 >= passing_score`, evaluated in integers.
pub fn quiz_passed(score: i64, total: i64, passing_score: i64) -> bool {
    if total <= 0 {
        return passing_score <= 0;
    }
    score * 100 >= passing_score * total
}

/// Grades a quiz submission against the answer keys of every quiz question.
///
/// Submitted answers for questions outside `keys` are ignored; callers reject
/// them before grading.
pub fn score_quiz(
    keys: &[QuizQuestionKey],
    submitted: &HashMap<i64, i64>,
    passing_score: i64,
    quiz_points: i64,
) -> QuizOutcome {
    let total_points: i64 = keys.iter().map(|k| k.points).sum();
    let mut score = 0;
    let mut answers = Vec::with_capacity(submitted.len());

    for key in keys {
        let Some(&answer_id) = submitted.get(&key.question_id) else {
            continue;
        };
        let is_correct = key.correct_answer_ids.contains(&answer_id);
        if is_correct {
            score += key.points;
        }
        answers.push(GradedAnswer {
            question_id: key.question_id,
            answer_id,
            is_correct,
        });
    }
    answers.sort_by_key(|a| a.question_id);

    let passed = quiz_passed(score, total_points, passing_score);

    QuizOutcome {
        score,
        total_points,
        passed,
        bonus: points_for(passed, quiz_points),
        answers,
    }
}
