//! Guards against applying a response to a subject the user has moved away from.
//!
//! Capture a [`SubjectToken`] when a request for some subject starts, and check
//! it when the response arrives. Opening another subject, or clearing the guard,
//! makes every earlier token stale.
//!
//! ```rust
//! use hubshell::relevance::RelevanceGuard;
//!
//! let mut guard = RelevanceGuard::default();
//! let first = guard.capture("profile:1");
//! let second = guard.capture("profile:2");
//! assert!(!guard.is_still_relevant(&first));
//! assert!(guard.is_still_relevant(&second));
//! ```

use serde::Serialize;

/// Proof of which subject was current when a request started.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SubjectToken {
    subject: String,
    generation: u64,
}

impl SubjectToken {
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Tracks the one subject whose responses are still wanted.
#[derive(Debug, Clone, Default)]
pub struct RelevanceGuard {
    current: Option<SubjectToken>,
    generation: u64,
}

impl RelevanceGuard {
    /// Makes `subject` current and returns its token.
    pub fn capture(&mut self, subject: impl Into<String>) -> SubjectToken {
        self.generation += 1;
        let token = SubjectToken {
            subject: subject.into(),
            generation: self.generation,
        };
        self.current = Some(token.clone());
        token
    }

    /// `true` if `token` is the most recent capture and the guard was not cleared since.
    #[must_use]
    pub fn is_still_relevant(&self, token: &SubjectToken) -> bool {
        self.current.as_ref() == Some(token)
    }

    /// The subject currently being shown, if any.
    #[must_use]
    pub fn current_subject(&self) -> Option<&str> {
        self.current.as_ref().map(SubjectToken::subject)
    }

    /// Forgets the current subject; all outstanding tokens become stale.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
