use crate::error::{SessionError, SourceError};
use std::collections::{HashMap, HashSet};

pub const EXPLANATION_FALLBACK: &str = "Failed to fetch explanation. Please try again later.";
pub const EXPLANATION_EMPTY: &str = "No explanation available.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationState<'a> {
    NotRequested,
    Loading,
    Ready(&'a str),
}

/// Explanations fetched on demand for review rows, keyed by question index.
///
/// An index is written at most once. Failures are cached as a fixed fallback
/// text and are never retried.
#[derive(Debug, Default)]
pub struct ExplanationCache {
    ready: HashMap<usize, String>,
    in_flight: HashSet<usize>,
}

impl ExplanationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `index` as in flight. Fails if a request would be redundant.
    pub fn begin(&mut self, index: usize) -> Result<(), SessionError> {
        if self.ready.contains_key(&index) {
            return Err(SessionError::ExplanationCached(index));
        }
        if !self.in_flight.insert(index) {
            return Err(SessionError::ExplanationPending(index));
        }
        Ok(())
    }

    pub fn resolve(&mut self, index: usize, result: Result<String, SourceError>) {
        self.in_flight.remove(&index);

        if self.ready.contains_key(&index) {
            log::warn!("explanation for question {} already cached", index + 1);
            return;
        }

        let text = match result {
            Ok(text) if text.trim().is_empty() => EXPLANATION_EMPTY.to_string(),
            Ok(text) => text,
            Err(e) => {
                log::warn!("explanation for question {} failed: {}", index + 1, e);
                EXPLANATION_FALLBACK.to_string()
            }
        };
        self.ready.insert(index, text);
    }

    pub fn state(&self, index: usize) -> ExplanationState<'_> {
        if let Some(text) = self.ready.get(&index) {
            ExplanationState::Ready(text)
        } else if self.in_flight.contains(&index) {
            ExplanationState::Loading
        } else {
            ExplanationState::NotRequested
        }
    }

    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    pub fn clear(&mut self) {
        self.ready.clear();
        self.in_flight.clear();
    }
}
