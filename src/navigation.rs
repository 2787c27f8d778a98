//! Optional navigation capability used to reveal newly added servers.

use std::sync::{Arc, RwLock};

/// Route of the MCP server listing.
pub const SERVERS_PATH: &str = "/settings/mcp";

/// Prefix of a single server's settings route.
pub const SERVER_DETAIL_PREFIX: &str = "/settings/mcp/settings";

/// Something that can move the active UI context to a route.
pub trait Navigator: Send + Sync {
    /// Navigate to `path`. Must not panic on unknown routes.
    fn navigate(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate(&self, path: &str) {
        self(path)
    }
}

/// Detail route for the server with `id`, with the id percent-encoded.
///
/// # Examples
///
/// ```
/// use mcp_registry_sync::navigation::server_detail_path;
///
/// assert_eq!(server_detail_path("fetch"), "/settings/mcp/settings/fetch");
/// assert_eq!(server_detail_path("a b/c"), "/settings/mcp/settings/a%20b%2Fc");
/// ```
pub fn server_detail_path(id: &str) -> String {
    format!("{SERVER_DETAIL_PREFIX}/{}", urlencoding::encode(id))
}

/// Slot holding the navigator, if one has been installed.
///
/// The router installs itself once it is mounted, which may be after push
/// events have started arriving. Calls made while the slot is empty are
/// skipped.
///
/// `Clone` is cheap; clones share the slot.
#[derive(Clone, Default)]
pub struct NavigationService {
    navigator: Arc<RwLock<Option<Arc<dyn Navigator>>>>,
}

impl std::fmt::Debug for NavigationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationService")
            .field("installed", &self.is_available())
            .finish()
    }
}

impl NavigationService {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install (or replace) the navigator.
    ///
    /// # Panics
    ///
    /// Panics if the slot lock is poisoned.
    pub fn install(&self, navigator: Arc<dyn Navigator>) {
        *self.navigator.write().expect("navigator slot poisoned") = Some(navigator);
    }

    /// Remove the navigator, e.g. when the router unmounts.
    ///
    /// # Panics
    ///
    /// Panics if the slot lock is poisoned.
    pub fn clear(&self) {
        *self.navigator.write().expect("navigator slot poisoned") = None;
    }

    /// Whether a navigator is currently installed.
    ///
    /// # Panics
    ///
    /// Panics if the slot lock is poisoned.
    pub fn is_available(&self) -> bool {
        self.navigator
            .read()
            .expect("navigator slot poisoned")
            .is_some()
    }

    /// Navigate to `path` if a navigator is installed.
    ///
    /// # Returns
    ///
    /// `true` if the call reached a navigator, `false` if it was skipped.
    ///
    /// # Panics
    ///
    /// Panics if the slot lock is poisoned.
    pub fn navigate(&self, path: &str) -> bool {
        let navigator = self.navigator.read().expect("navigator slot poisoned").clone();
        match navigator {
            Some(navigator) => {
                navigator.navigate(path);
                true
            }
            None => {
                tracing::trace!(path, "no navigator installed, skipping");
                false
            }
        }
    }

    /// Land the user on a server's settings page.
    ///
    /// Goes to the listing first, then to the server's detail route, so the
    /// listing is underneath the detail view in history.
    pub fn reveal_server(&self, id: &str) -> bool {
        let listed = self.navigate(SERVERS_PATH);
        let detailed = self.navigate(&server_detail_path(id));
        listed && detailed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn recording_navigator() -> (Arc<dyn Navigator>, Arc<Mutex<Vec<String>>>) {
        let paths = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&paths);
        let navigator: Arc<dyn Navigator> = Arc::new(move |path: &str| {
            sink.lock().expect("poisoned").push(path.to_owned());
        });
        (navigator, paths)
    }

    #[test]
    fn detail_path_encodes_reserved_characters() {
        assert_eq!(
            server_detail_path("@scope/server?x=1"),
            "/settings/mcp/settings/%40scope%2Fserver%3Fx%3D1"
        );
    }

    #[test]
    fn navigate_without_navigator_is_skipped() {
        let nav = NavigationService::new();
        assert!(!nav.is_available());
        assert!(!nav.navigate("/anywhere"));
        assert!(!nav.reveal_server("a"));
    }

    #[test]
    fn reveal_server_navigates_listing_then_detail() {
        let nav = NavigationService::new();
        let (navigator, paths) = recording_navigator();
        nav.install(navigator);

        assert!(nav.reveal_server("my server"));
        assert_eq!(
            *paths.lock().expect("poisoned"),
            vec![
                "/settings/mcp".to_owned(),
                "/settings/mcp/settings/my%20server".to_owned()
            ]
        );
    }

    #[test]
    fn clear_removes_navigator() {
        let nav = NavigationService::new();
        let (navigator, paths) = recording_navigator();
        nav.install(navigator);
        nav.clear();

        assert!(!nav.navigate("/settings/mcp"));
        assert!(paths.lock().expect("poisoned").is_empty());
    }

    #[test]
    fn clones_share_the_slot() {
        let nav = NavigationService::new();
        let other = nav.clone();
        let (navigator, _paths) = recording_navigator();
        other.install(navigator);
        assert!(nav.is_available());
    }
}
