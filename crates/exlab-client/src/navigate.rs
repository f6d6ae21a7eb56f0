use std::sync::Mutex;

use tracing::debug;

/// Logical screens of the experiment workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Login/register surface.
    Auth,
    /// Dataset upload.
    Upload,
    /// Target/feature/algorithm configuration.
    Configure,
    /// Results for one run, identified by the run id.
    Results(String),
    /// Full run history.
    History,
}

impl Screen {
    /// Returns true for the login surface, where a forced re-login redirect
    /// must not fire again.
    pub fn is_auth(&self) -> bool {
        matches!(self, Screen::Auth)
    }
}

/// Navigation seam between the workflow and whatever hosts the screens.
///
/// The gateway uses it for exactly one thing: routing to the login surface
/// when the service rejects the credential.
pub trait Navigator: Send + Sync {
    /// Returns the screen currently shown.
    fn current(&self) -> Screen;
    /// Switches to the given screen.
    fn goto(&self, screen: Screen);
}

/// In-memory navigator that tracks the current screen and logs transitions.
///
/// Suitable for headless hosts (the CLI) and for tests that assert on where
/// the workflow ended up.
pub struct MemoryNavigator {
    current: Mutex<Screen>,
}

impl MemoryNavigator {
    /// Creates a navigator positioned at the given screen.
    pub fn starting_at(screen: Screen) -> Self {
        Self {
            current: Mutex::new(screen),
        }
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::starting_at(Screen::Auth)
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Screen {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn goto(&self, screen: Screen) {
        debug!(?screen, "navigating");
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_navigator_tracks_transitions() {
        let nav = MemoryNavigator::default();
        assert_eq!(nav.current(), Screen::Auth);
        nav.goto(Screen::Results("e7".into()));
        assert_eq!(nav.current(), Screen::Results("e7".into()));
    }
}
