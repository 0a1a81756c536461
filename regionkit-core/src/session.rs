//! Load sessions and the generation guard
//!
//! Every load gets a ticket carrying a monotonically increasing generation.
//! When a load resolves, its session is installed only if no newer load was
//! started in the meantime; otherwise the result is dropped. The installed
//! session is replaced as a whole, never edited field by field, so overlapping
//! loads cannot interleave their results.

use crate::types::LoadSession;
use tracing::{info, warn};

/// Proof that a load was started, and which generation it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a finished load.
#[derive(Debug)]
pub enum LoadOutcome {
    /// The session is now current
    Installed,
    /// A newer load was started; this result was discarded
    Stale { generation: u64, latest: u64 },
    /// Retrieval failed; the previous session is untouched
    Failed { message: String },
}

impl LoadOutcome {
    pub fn is_installed(&self) -> bool {
        matches!(self, LoadOutcome::Installed)
    }
}

/// Holds the current session for the editor.
#[derive(Debug, Default)]
pub struct Workspace {
    latest_generation: u64,
    current: Option<LoadSession>,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_generation += 1;
        LoadTicket {
            generation: self.latest_generation,
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.generation == self.latest_generation
    }

    pub fn latest_generation(&self) -> u64 {
        self.latest_generation
    }

    /// Finish a load started with `ticket`.
    ///
    /// `Err(message)` is a retrieval failure and never disturbs the current
    /// session. A stale ticket's result is dropped whether it succeeded or not.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadSession, String>,
    ) -> LoadOutcome {
        if !self.is_current(&ticket) {
            warn!(
                generation = ticket.generation,
                latest = self.latest_generation,
                "discarding result of superseded load"
            );
            return LoadOutcome::Stale {
                generation: ticket.generation,
                latest: self.latest_generation,
            };
        }

        match result {
            Ok(session) => {
                info!(
                    generation = session.generation,
                    page = %session.page.path,
                    blocks = session.blocks.len(),
                    "installed load session"
                );
                self.current = Some(session);
                LoadOutcome::Installed
            }
            Err(message) => {
                warn!(generation = ticket.generation, %message, "load failed");
                LoadOutcome::Failed { message }
            }
        }
    }

    pub fn current(&self) -> Option<&LoadSession> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ManagedPage, Region, SourceDocument};
    use chrono::Utc;
    use uuid::Uuid;

    fn session(generation: u64, path: &str) -> LoadSession {
        LoadSession {
            id: Uuid::new_v4(),
            generation,
            page: ManagedPage::new(path, path),
            source: SourceDocument::empty(),
            fingerprint: String::new(),
            hero: Region::missing("hero"),
            main: Region::missing("main"),
            blocks: Vec::new(),
            warning: None,
            preview: String::new(),
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn generations_increase() {
        let mut ws = Workspace::new();
        let a = ws.begin_load();
        let b = ws.begin_load();
        assert!(b.generation() > a.generation());
        assert!(!ws.is_current(&a));
        assert!(ws.is_current(&b));
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut ws = Workspace::new();
        let first = ws.begin_load();
        let second = ws.begin_load();

        // The newer load resolves first, then the older one
        let outcome = ws.complete(second, Ok(session(second.generation(), "b.html")));
        assert!(outcome.is_installed());
        let outcome = ws.complete(first, Ok(session(first.generation(), "a.html")));
        assert!(matches!(outcome, LoadOutcome::Stale { generation: 1, latest: 2 }));

        assert_eq!(ws.current().unwrap().page.path, "b.html");
    }

    #[test]
    fn failure_keeps_previous_session() {
        let mut ws = Workspace::new();
        let ok = ws.begin_load();
        ws.complete(ok, Ok(session(ok.generation(), "a.html")));

        let failing = ws.begin_load();
        let outcome = ws.complete(failing, Err("not found".to_string()));
        assert!(matches!(outcome, LoadOutcome::Failed { ref message } if message == "not found"));
        assert_eq!(ws.current().unwrap().page.path, "a.html");
    }

    #[test]
    fn successive_loads_replace_the_whole_session() {
        let mut ws = Workspace::new();
        let first = ws.begin_load();
        ws.complete(first, Ok(session(first.generation(), "a.html")));
        let id_before = ws.current().unwrap().id;

        let second = ws.begin_load();
        ws.complete(second, Ok(session(second.generation(), "a.html")));
        let current = ws.current().unwrap();
        assert_ne!(current.id, id_before);
        assert_eq!(current.generation, 2);
    }
}
