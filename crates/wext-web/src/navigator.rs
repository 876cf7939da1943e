//! Client-side navigation modeled as an explicit state machine.
//!
//! The shipped browser client (`wext-client.js`) implements the same
//! machine; this module is the sans-IO reference used to pin down the
//! protocol. Fetch execution sits behind [`FragmentFetcher`] so tests can
//! drive navigations without a network.
//!
//! Overlapping navigations use cancel-and-supersede: every navigation gets
//! a monotonically increasing id, and only a completion carrying the
//! current id may touch the container, the title or the history stack.

use crate::error::WextError;
use crate::header_updates::HeaderUpdates;
use std::time::{Duration, Instant};

/// Debounce window between pointer-hover and the preload hint.
pub const PRELOAD_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavigationId(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigatorState {
    Idle,
    Navigating { id: NavigationId, target: String },
}

/// What a partial-content fetch produced: the body fragment and the raw
/// `X-Header-Updates` value, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedFragment {
    pub body: String,
    pub header_updates: Option<String>,
}

/// Handed back when a navigation starts; the caller issues the fetch and
/// reports back through [`Navigator::complete`] or [`Navigator::fail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationStart {
    pub id: NavigationId,
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The fragment was swapped in and history/title updated.
    Applied,
    /// A newer navigation started first; the completion was dropped.
    Superseded,
}

/// Fetch seam for the partial-content request.
pub trait FragmentFetcher {
    fn fetch(&mut self, path: &str) -> Result<FetchedFragment, WextError>;
}

impl<F> FragmentFetcher for F
where
    F: FnMut(&str) -> Result<FetchedFragment, WextError>,
{
    fn fetch(&mut self, path: &str) -> Result<FetchedFragment, WextError> {
        self(path)
    }
}

#[derive(Debug, Clone)]
struct PreloadArm {
    path: String,
    armed_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    state: NavigatorState,
    next_id: u64,
    location: String,
    container: String,
    title: String,
    history: Vec<String>,
    preload: Option<PreloadArm>,
}

impl Navigator {
    pub fn new(initial_location: impl Into<String>) -> Self {
        let location = normalize_path(&initial_location.into());
        Self {
            state: NavigatorState::Idle,
            next_id: 0,
            history: vec![location.clone()],
            location,
            container: String::new(),
            title: String::new(),
            preload: None,
        }
    }

    pub fn state(&self) -> &NavigatorState {
        &self.state
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// History entries pushed so far, oldest first. The last entry is the
    /// current location.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// A navigation-capable link was activated.
    pub fn link_activated(&mut self, href: &str) -> NavigationStart {
        let target = normalize_path(href);
        self.begin(target)
    }

    /// The browser moved through its history stack. The location changes
    /// immediately, so the completion will not push a new entry.
    pub fn history_popped(&mut self, path: &str) -> NavigationStart {
        let target = normalize_path(path);
        if self.history.len() > 1 {
            self.history.pop();
        }
        self.location = target.clone();
        self.begin(target)
    }

    fn begin(&mut self, target: String) -> NavigationStart {
        self.next_id += 1;
        let id = NavigationId(self.next_id);
        self.state = NavigatorState::Navigating {
            id,
            target: target.clone(),
        };
        NavigationStart { id, path: target }
    }

    /// Apply a finished fetch. Stale ids are dropped wholesale.
    pub fn complete(&mut self, id: NavigationId, fragment: FetchedFragment) -> CompletionOutcome {
        let target = match &self.state {
            NavigatorState::Navigating {
                id: current,
                target,
            } if *current == id => target.clone(),
            _ => return CompletionOutcome::Superseded,
        };

        self.container = fragment.body;
        if let Some(updates) = fragment
            .header_updates
            .as_deref()
            .and_then(HeaderUpdates::decode)
        {
            self.title = updates.title;
        }
        if self.location != target {
            self.history.push(target.clone());
            self.location = target;
        }
        self.state = NavigatorState::Idle;
        CompletionOutcome::Applied
    }

    /// A fetch failed. Returns to `Idle` only when the failure belongs to
    /// the current navigation; reports whether it did.
    pub fn fail(&mut self, id: NavigationId) -> bool {
        match &self.state {
            NavigatorState::Navigating { id: current, .. } if *current == id => {
                self.state = NavigatorState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Start-to-finish navigation through a fetcher, for the common
    /// non-overlapping case.
    pub fn navigate<F: FragmentFetcher>(
        &mut self,
        fetcher: &mut F,
        href: &str,
    ) -> Result<CompletionOutcome, WextError> {
        let start = self.link_activated(href);
        match fetcher.fetch(&start.path) {
            Ok(fragment) => Ok(self.complete(start.id, fragment)),
            Err(err) => {
                self.fail(start.id);
                Err(err)
            }
        }
    }

    /// Pointer entered a link: arm the preload debounce.
    pub fn hover_started(&mut self, href: &str, now: Instant) {
        self.preload = Some(PreloadArm {
            path: normalize_path(href),
            armed_at: now,
        });
    }

    /// Pointer left before the debounce elapsed: cancel.
    pub fn hover_ended(&mut self) {
        self.preload = None;
    }

    /// Path due for a preload hint, once per arm. `None` while the
    /// debounce window is still open or nothing is armed.
    pub fn due_preload(&mut self, now: Instant) -> Option<String> {
        let due = self
            .preload
            .as_ref()
            .map(|arm| now.duration_since(arm.armed_at) >= PRELOAD_DELAY)
            .unwrap_or(false);
        if due {
            self.preload.take().map(|arm| arm.path)
        } else {
            None
        }
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
