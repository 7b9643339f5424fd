//! Drop target
//!
//! The surface files arrive through. In a terminal a dragged file shows up
//! as a bracketed paste of its path; typing a path and pressing Enter is the
//! "browse" route. Both end up in [`DropTarget::offer`], which applies the
//! accept filter and the single-file limit before anything reaches the
//! selection manager.

use crate::selection::{guess_mime, AcceptPolicy};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

pub const MAX_FILES: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Active,
}

/// Outcome of one drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropOffer {
    pub accepted: Vec<PathBuf>,
    pub rejected: Vec<(PathBuf, String)>,
}

#[derive(Debug, Clone)]
pub struct DropTarget {
    policy: AcceptPolicy,
    max_files: usize,
    drag_state: DragState,
    accepted: Vec<PathBuf>,
    generation: u64,
}

impl DropTarget {
    pub fn new(policy: AcceptPolicy) -> Self {
        Self {
            policy,
            max_files: MAX_FILES,
            drag_state: DragState::Idle,
            accepted: Vec::new(),
            generation: 0,
        }
    }

    pub fn policy(&self) -> AcceptPolicy {
        self.policy
    }

    pub fn accept_pattern(&self) -> &'static str {
        self.policy.pattern()
    }

    pub fn max_files(&self) -> usize {
        self.max_files
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    pub fn drag_enter(&mut self) {
        self.drag_state = DragState::Active;
    }

    pub fn drag_leave(&mut self) {
        self.drag_state = DragState::Idle;
    }

    pub fn accepted_files(&self) -> &[PathBuf] {
        &self.accepted
    }

    /// Bumped on every reset; consumers re-create their input state when it changes.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Filter a drop. Files that are missing or fail the accept filter are
    /// rejected; of the rest only the first `max_files` are kept.
    pub fn offer(&mut self, paths: Vec<PathBuf>) -> DropOffer {
        self.drag_state = DragState::Idle;
        let mut offer = DropOffer::default();

        for path in paths {
            match self.check(&path) {
                Ok(()) if offer.accepted.len() < self.max_files => offer.accepted.push(path),
                Ok(()) => debug!("Dropping {} beyond the file limit", path.display()),
                Err(reason) => {
                    warn!("Rejected {}: {}", path.display(), reason);
                    offer.rejected.push((path, reason));
                }
            }
        }

        self.accepted = offer.accepted.clone();
        offer
    }

    fn check(&self, path: &Path) -> Result<(), String> {
        if !path.is_file() {
            return Err("not a readable file".to_string());
        }
        let mime = guess_mime(path);
        if !self.policy.accepts(&mime) {
            return Err(format!("{} is not accepted here ({} only)", mime, self.policy.pattern()));
        }
        Ok(())
    }

    /// Return to the empty, interactive state.
    pub fn reset(&mut self) {
        self.accepted.clear();
        self.drag_state = DragState::Idle;
        self.generation += 1;
    }
}

/// Split pasted text into paths.
///
/// Handles the forms terminals use when a file is dragged in: plain paths,
/// single or double quoted paths, backslash-escaped spaces and `file:`
/// URIs, separated by whitespace or newlines. A backslash only escapes
/// whitespace, a quote or another backslash, so `C:\Users\a.png` survives.
/// A `file:` token that is not a valid local file URI is passed through
/// unchanged and rejected later by [`DropTarget::offer`].
pub fn parse_drop_payload(text: &str) -> Vec<PathBuf> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, '\\') => match chars.peek() {
                Some(&next) if next.is_whitespace() || matches!(next, '\'' | '"' | '\\') => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens.into_iter().map(token_to_path).collect()
}

fn token_to_path(token: String) -> PathBuf {
    if !token.starts_with("file:") {
        return PathBuf::from(token);
    }
    match Url::parse(&token).map(|url| url.to_file_path()) {
        Ok(Ok(path)) => path,
        _ => {
            warn!("Not a local file URI: {}", token);
            PathBuf::from(token)
        }
    }
}
