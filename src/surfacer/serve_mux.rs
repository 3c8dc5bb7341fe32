use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::routing::MethodRouter;
use axum::Router;
use tracing::debug;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ServeMuxError {
    #[error("handler already registered for path {0}")]
    Duplicate(String),
    #[error("invalid path {0}: only static paths starting with '/' can be registered")]
    InvalidPath(String),
}

#[derive(Default)]
struct Routes {
    router: Router,
    paths: Vec<String>,
}

/// Shared HTTP surface surfacers register their handlers on, e.g. a scrape endpoint.
///
/// Created once by the process and handed to every [`crate::options::OptionsBuilder`].
#[derive(Default)]
pub struct ServeMux {
    routes: Mutex<Routes>,
}

impl ServeMux {
    #[must_use]
    pub fn new() -> Self {
        ServeMux::default()
    }

    pub fn register(&self, path: &str, handler: MethodRouter) -> Result<(), ServeMuxError> {
        if !is_static_path(path) {
            return Err(ServeMuxError::InvalidPath(path.to_string()));
        }

        let mut routes = self.lock();
        if routes.paths.iter().any(|p| p == path) {
            return Err(ServeMuxError::Duplicate(path.to_string()));
        }

        let router = std::mem::take(&mut routes.router);
        routes.router = router.route(path, handler);
        routes.paths.push(path.to_string());
        debug!("SURFACER | Registered HTTP handler for {path}");
        Ok(())
    }

    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.lock().paths.clone()
    }

    /// Snapshot of every registered route, ready to be served.
    #[must_use]
    pub fn router(&self) -> Router {
        self.lock().router.clone()
    }

    // A panic while registering leaves the routes usable, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Routes> {
        self.routes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ServeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeMux")
            .field("paths", &self.paths())
            .finish()
    }
}

fn is_static_path(path: &str) -> bool {
    path.starts_with('/')
        && !path
            .split('/')
            .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
        && !path.contains(['{', '}'])
}
