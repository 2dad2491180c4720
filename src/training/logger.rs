//! Training progress logging.
//!
//! [`TrainingLogger`] filters messages by a [`Verbosity`] chosen in the
//! training config and forwards the survivors to `tracing`. The library never
//! installs a subscriber; applications and tests decide where events go.

use tracing::{debug, info, warn};

/// How much a training run reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    #[default]
    Silent,
    Warning,
    Info,
    Debug,
}

/// Verbosity-gated logger for one training run.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether messages at `level` are emitted.
    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity >= level
    }

    pub fn warn(&self, message: &str) {
        if self.enabled(Verbosity::Warning) {
            warn!("{message}");
        }
    }

    pub fn info(&self, message: &str) {
        if self.enabled(Verbosity::Info) {
            info!("{message}");
        }
    }

    pub fn debug(&self, message: &str) {
        if self.enabled(Verbosity::Debug) {
            debug!("{message}");
        }
    }

    /// Report one boosting iteration.
    pub fn log_iteration(&self, iteration: usize, n_iterations: usize, loss: f64) {
        if self.enabled(Verbosity::Info) {
            info!(iteration, n_iterations, loss, "boosting iteration");
        }
    }

    /// Report a finished training run.
    pub fn log_summary(&self, n_trees: usize, final_loss: f64) {
        if self.enabled(Verbosity::Info) {
            info!(n_trees, final_loss, "training finished");
        }
    }
}

impl Default for TrainingLogger {
    fn default() -> Self {
        Self::new(Verbosity::default())
    }
}
