//! Busy spinner for the command-line interface

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use yyc_route::BusyIndicator;

/// Creates the spinner shown while a route request is running
pub fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb
}

/// [`BusyIndicator`] drawing an indicatif spinner on stderr
///
/// A finished bar cannot be restarted, so every `show` starts a fresh one.
pub struct SpinnerIndicator {
    current: Mutex<Option<ProgressBar>>,
}

impl SpinnerIndicator {
    pub fn new() -> Self {
        Self { current: Mutex::new(None) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<ProgressBar>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Message of the running spinner, if one is shown
    #[cfg(test)]
    fn message(&self) -> Option<String> {
        self.slot().as_ref().map(|pb| pb.message())
    }
}

impl Default for SpinnerIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyIndicator for SpinnerIndicator {
    fn show(&self, message: &str) {
        let pb = create_spinner();
        pb.set_message(format!("🧭 {message}"));
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Some(previous) = self.slot().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn clear(&self) {
        if let Some(pb) = self.slot().take() {
            pb.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_template() {
        let pb = create_spinner();
        pb.set_message("working");
        pb.tick();
        pb.finish_and_clear();
    }

    #[test]
    fn test_indicator_show_then_clear() {
        let indicator = SpinnerIndicator::new();
        indicator.show("Finding route...");
        assert_eq!(indicator.message().as_deref(), Some("🧭 Finding route..."));
        indicator.clear();
        assert_eq!(indicator.message(), None);

        // Usable again after clearing
        indicator.show("Finding route...");
        assert!(indicator.message().is_some());
        indicator.clear();
    }
}
