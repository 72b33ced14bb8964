use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Arc,
    Mutex,
    MutexGuard,
};
use tracing::{
    error,
    warn,
};

/// Exit code after SIGINT, SIGTERM or SIGHUP.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Temporary directories that must not outlive an interrupted run.
///
/// Normal exits clean up through `Drop`; this covers the signal path,
/// where the process exits without unwinding.
#[derive(Debug, Clone, Default)]
pub struct CleanupRegistry {
    dirs: Arc<Mutex<Vec<PathBuf>>>,
}

impl CleanupRegistry {
    fn dirs(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        match self.dirs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers `path` until the returned guard is dropped.
    pub fn track(&self, path: &Path) -> Tracked<'_> {
        self.dirs().push(path.to_path_buf());
        Tracked {
            registry: self,
            path: path.to_path_buf(),
        }
    }

    /// Removes every registered directory, returns how many were removed.
    pub fn remove_all(&self) -> usize {
        let mut dirs = self.dirs();
        let mut removed = 0;
        for dir in dirs.drain(..) {
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Unable to remove {}: {}", dir.display(), e),
            }
        }
        removed
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.dirs().len()
    }
}

/// Registration of one directory in a [`CleanupRegistry`].
#[derive(Debug)]
pub struct Tracked<'a> {
    registry: &'a CleanupRegistry,
    path: PathBuf,
}

impl Drop for Tracked<'_> {
    fn drop(&mut self) {
        let mut dirs = self.registry.dirs();
        if let Some(pos) = dirs.iter().position(|d| d == &self.path) {
            dirs.remove(pos);
        }
    }
}

/// Removes the registered directories and exits on SIGINT, SIGTERM and
/// SIGHUP.
pub fn install_interrupt_handler(registry: CleanupRegistry) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        let removed = registry.remove_all();
        error!("User abort, removed {} temporary directories", removed);
        std::process::exit(INTERRUPTED_EXIT_CODE);
    })
}
