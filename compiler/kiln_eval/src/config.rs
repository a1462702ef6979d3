//! Configuration of the partial evaluation pass.

use crate::EvalMode;

/// Upper bound on simulated iterations of a single loop.
pub const DEFAULT_MAX_LOOP_ITERATIONS: u32 = 10_000;

/// Path fragment of the standard library sources, which are never rewritten.
pub const LIBRARY_PATH_FRAGMENT: &str = "/kotlin/libraries/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialEvalConfig {
    /// Language-feature toggle; the pass does nothing unless set.
    pub enabled: bool,
    pub mode: EvalMode,
    /// A file is skipped when its path contains any of these fragments.
    pub excluded_paths: Vec<String>,
    pub max_loop_iterations: u32,
    /// Report the rewritten dump of every changed function as a note.
    pub report_rewrites: bool,
}

impl Default for PartialEvalConfig {
    fn default() -> Self {
        PartialEvalConfig {
            enabled: false,
            mode: EvalMode::default(),
            excluded_paths: vec![LIBRARY_PATH_FRAGMENT.to_owned()],
            max_loop_iterations: DEFAULT_MAX_LOOP_ITERATIONS,
            report_rewrites: true,
        }
    }
}

impl PartialEvalConfig {
    /// Default configuration with the feature switched on.
    pub fn enabled() -> Self {
        Self::default().with_enabled(true)
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: EvalMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_excluded_path(mut self, fragment: impl Into<String>) -> Self {
        self.excluded_paths.push(fragment.into());
        self
    }

    #[must_use]
    pub fn with_max_loop_iterations(mut self, max: u32) -> Self {
        self.max_loop_iterations = max;
        self
    }

    #[must_use]
    pub fn with_report_rewrites(mut self, report: bool) -> Self {
        self.report_rewrites = report;
        self
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_paths
            .iter()
            .any(|fragment| path.contains(fragment.as_str()))
    }
}
