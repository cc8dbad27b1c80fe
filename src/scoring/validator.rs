// src/scoring/validator.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::models::exercise::Exercise;

/// Decides whether submitted code solves an exercise.
///
/// Implementations may be cheap string checks or remote sandboxes; the
/// submission handlers only see this interface.
#[async_trait]
pub trait ExerciseValidator: Send + Sync {
    async fn validate(&self, code: &str, exercise: &Exercise) -> bool;
}

/// Passes when every required snippet appears somewhere in the code.
#[derive(Debug, Clone)]
pub struct RequiredSnippets {
    snippets: Vec<String>,
}

impl RequiredSnippets {
    pub fn new<I, S>(snippets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            snippets: snippets.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl ExerciseValidator for RequiredSnippets {
    async fn validate(&self, code: &str, _exercise: &Exercise) -> bool {
        self.snippets.iter().all(|s| code.contains(s.as_str()))
    }
}

/// Fallback for exercises nobody registered a validator for.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

#[async_trait]
impl ExerciseValidator for RejectAll {
    async fn validate(&self, _code: &str, _exercise: &Exercise) -> bool {
        false
    }
}

/// Looks up the validator for an exercise.
///
/// Resolution order: exact exercise id, then the first registered title
/// fragment contained in the exercise title, then the fallback.
pub struct ValidatorRegistry {
    by_id: HashMap<i64, Arc<dyn ExerciseValidator>>,
    by_title: Vec<(String, Arc<dyn ExerciseValidator>)>,
    fallback: Arc<dyn ExerciseValidator>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidatorRegistry {
    /// Empty registry that rejects every submission.
    pub fn new() -> Self {
        Self {
            by_id: HashMap::new(),
            by_title: Vec::new(),
            fallback: Arc::new(RejectAll),
        }
    }

    /// Registry carrying the content rules the platform ships with.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_title(
            "Text Formatting Practice",
            Arc::new(RequiredSnippets::new(["<strong>", "<em>", "<mark>"])),
        );
        registry
    }

    pub fn register(&mut self, exercise_id: i64, validator: Arc<dyn ExerciseValidator>) {
        self.by_id.insert(exercise_id, validator);
    }

    pub fn register_title(&mut self, fragment: impl Into<String>, validator: Arc<dyn ExerciseValidator>) {
        self.by_title.push((fragment.into(), validator));
    }

    pub fn resolve(&self, exercise: &Exercise) -> &dyn ExerciseValidator {
        if let Some(v) = self.by_id.get(&exercise.id) {
            return v.as_ref();
        }
        self.by_title
            .iter()
            .find(|(fragment, _)| exercise.title.contains(fragment.as_str()))
            .map(|(_, v)| v.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub async fn validate(&self, code: &str, exercise: &Exercise) -> bool {
        self.resolve(exercise).validate(code, exercise).await
    }
}
