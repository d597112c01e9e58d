use parking_lot::Mutex;

/// What a history pop hands back to the engine.
///
/// `url` is `None` for entries created before the engine took over — those
/// carry no state the engine can rebuild from, and force a hard reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoppedEntry {
    pub url: Option<String>,
}

/// Session history as the engine sees it.
///
/// Real hosts bridge this to the browser History API; every committed
/// navigation pushes an entry carrying its URL as state.
pub trait History: Send + Sync {
    fn push(&self, url: &str);
    /// Go back one entry, returning the entry that becomes current.
    /// `None` when there is nothing to go back to.
    fn pop(&self) -> Option<PoppedEntry>;
    fn len(&self) -> usize;
}

/// In-memory history stack used by tests and the session driver.
///
/// Seeded with one stateless entry standing in for the initial full-page
/// load that happened before the engine existed.
pub struct SimHistory {
    entries: Mutex<Vec<Option<String>>>,
}

impl SimHistory {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(vec![None]),
        }
    }
}

impl Default for SimHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for SimHistory {
    fn push(&self, url: &str) {
        self.entries.lock().push(Some(url.to_string()));
    }

    fn pop(&self) -> Option<PoppedEntry> {
        let mut entries = self.entries.lock();
        if entries.len() <= 1 {
            return None;
        }
        entries.pop();
        Some(PoppedEntry {
            url: entries.last().cloned().flatten(),
        })
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_reveals_previous_entry() {
        let history = SimHistory::new();
        history.push("/collections/sale");
        history.push("/products/widget");

        assert_eq!(
            history.pop(),
            Some(PoppedEntry {
                url: Some("/collections/sale".to_string())
            })
        );
    }

    #[test]
    fn popping_to_the_initial_load_yields_stateless_entry() {
        let history = SimHistory::new();
        history.push("/pages/about");

        // Back to the pre-engine entry: no state attached
        assert_eq!(history.pop(), Some(PoppedEntry { url: None }));
        // Nothing further back
        assert_eq!(history.pop(), None);
    }
}
