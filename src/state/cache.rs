use chrono::Local;

/// A server response held in memory with a last-loaded marker.
///
/// Nothing here expires on its own: a view is fetched once and then only
/// refetched when the caller passes `force`.
#[derive(Debug, Clone)]
pub struct CachedView<T> {
    data: Option<T>,
    last_loaded: Option<String>,
    error: Option<String>,
    pending: bool,
}

impl<T> Default for CachedView<T> {
    fn default() -> Self {
        Self { data: None, last_loaded: None, error: None, pending: false }
    }
}

impl<T> CachedView<T> {
    /// Whether a request should go out. Also marks the view pending so a
    /// second key press does not queue a duplicate.
    pub fn begin_fetch(&mut self, force: bool) -> bool {
        if self.pending || (!force && self.last_loaded.is_some()) {
            return false;
        }
        self.pending = true;
        true
    }

    /// Store a fresh response. `marker` is whatever the server reports as the
    /// data's date; the local clock stands in when it sends none.
    pub fn store(&mut self, data: T, marker: Option<String>) {
        self.data = Some(data);
        self.last_loaded =
            Some(marker.unwrap_or_else(|| Local::now().format("%Y-%m-%d %H:%M").to_string()));
        self.error = None;
        self.pending = false;
    }

    /// Record a failed load. Previously cached data stays visible.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.pending = false;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    pub fn last_loaded(&self) -> Option<&str> {
        self.last_loaded.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Status line for a panel title.
    pub fn status(&self) -> String {
        match (&self.pending, &self.error, &self.last_loaded) {
            (true, _, _) => "loading...".to_string(),
            (_, Some(err), _) => format!("failed to load: {err}"),
            (_, _, Some(at)) => format!("as of {at}"),
            _ => "not loaded".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetches_once_until_forced() {
        let mut view: CachedView<u32> = CachedView::default();
        assert!(view.begin_fetch(false));
        // duplicate while pending
        assert!(!view.begin_fetch(true));
        view.store(7, Some("2025-11-01".into()));
        assert!(!view.begin_fetch(false));
        assert_eq!(view.data(), Some(&7));
        assert_eq!(view.last_loaded(), Some("2025-11-01"));
        assert!(view.begin_fetch(true));
    }

    #[test]
    fn failure_keeps_old_data_and_allows_retry() {
        let mut view: CachedView<&str> = CachedView::default();
        assert!(view.begin_fetch(false));
        view.store("old", None);
        assert!(view.last_loaded().is_some());

        assert!(view.begin_fetch(true));
        view.fail("timeout");
        assert_eq!(view.data(), Some(&"old"));
        assert_eq!(view.error(), Some("timeout"));
        assert!(view.status().starts_with("failed to load"));
        assert!(view.begin_fetch(true));
    }

    #[test]
    fn failure_before_first_load_refetches_without_force() {
        let mut view: CachedView<u8> = CachedView::default();
        assert!(view.begin_fetch(false));
        view.fail("boom");
        assert!(view.begin_fetch(false));
    }

    #[test]
    fn status_reflects_state() {
        let mut view: CachedView<u8> = CachedView::default();
        assert_eq!(view.status(), "not loaded");
        view.begin_fetch(false);
        assert_eq!(view.status(), "loading...");
        view.store(1, Some("2025-12-01".into()));
        assert_eq!(view.status(), "as of 2025-12-01");
    }
}
