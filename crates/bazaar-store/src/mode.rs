use std::sync::atomic::{AtomicBool, Ordering};

/// Which backend a collection store is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Remote,
    LocalFallback,
}

impl std::fmt::Display for StoreMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreMode::Remote => write!(f, "remote"),
            StoreMode::LocalFallback => write!(f, "local-fallback"),
        }
    }
}

/// Per-instance mode flag.
///
/// The only transition is `Remote → LocalFallback`; there is no way back.
#[derive(Debug)]
pub struct ModeState {
    degraded: AtomicBool,
}

impl ModeState {
    /// Starts in [`StoreMode::Remote`] when a remote endpoint exists,
    /// otherwise directly in [`StoreMode::LocalFallback`].
    #[must_use]
    pub fn new(remote_configured: bool) -> Self {
        Self {
            degraded: AtomicBool::new(!remote_configured),
        }
    }

    #[must_use]
    pub fn current(&self) -> StoreMode {
        if self.degraded.load(Ordering::Acquire) {
            StoreMode::LocalFallback
        } else {
            StoreMode::Remote
        }
    }

    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.current() == StoreMode::LocalFallback
    }

    /// Switches to local fallback. Returns `true` if this call performed the
    /// transition, `false` if the state was already degraded.
    pub fn downgrade(&self) -> bool {
        !self.degraded.swap(true, Ordering::AcqRel)
    }
}
