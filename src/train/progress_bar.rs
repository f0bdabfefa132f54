//! Terminal progress bar for one training or validation phase

use std::io::{self, Write};
use std::time::Instant;

/// Where the bar is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawTarget {
    /// Redraw in place on stderr
    Stderr,
    /// Track state without drawing
    Hidden,
}

/// Format duration in seconds to human-readable string.
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{secs:.0}s")
    } else if secs < 3600.0 {
        let mins = (secs / 60.0).floor();
        let s = (secs % 60.0).floor();
        format!("{mins}m {s:02.0}s")
    } else {
        let hours = (secs / 3600.0).floor();
        let mins = ((secs % 3600.0) / 60.0).floor();
        format!("{hours}h {mins:02.0}m")
    }
}

/// Sample-count progress bar with a linear ETA
#[derive(Debug, Clone)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    width: usize,
    started: Option<Instant>,
    finished: bool,
    target: DrawTarget,
}

impl ProgressBar {
    /// Bar drawn on stderr
    pub fn new(width: usize) -> Self {
        Self::with_target(width, DrawTarget::Stderr)
    }

    /// Bar that never draws
    pub fn hidden() -> Self {
        Self::with_target(30, DrawTarget::Hidden)
    }

    /// Bar with an explicit draw target
    pub fn with_target(width: usize, target: DrawTarget) -> Self {
        Self { total: 0, current: 0, width, started: None, finished: false, target }
    }

    /// Reset and start counting towards `total`
    pub fn start(&mut self, total: usize) {
        self.total = total;
        self.current = 0;
        self.started = Some(Instant::now());
        self.finished = false;
        self.draw();
    }

    /// Move to `current` (clamped to the total)
    pub fn update(&mut self, current: usize) {
        self.current = current.min(self.total);
        self.draw();
    }

    /// Fill the bar and end the line
    pub fn finish(&mut self) {
        self.current = self.total;
        self.finished = true;
        self.draw();
    }

    /// Current position
    pub fn position(&self) -> usize {
        self.current
    }

    /// Target count
    pub fn total(&self) -> usize {
        self.total
    }

    /// Whether `finish` was called since the last `start`
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get progress percentage.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current as f32 / self.total as f32) * 100.0
    }

    /// Seconds left at the average rate so far
    pub fn eta_secs(&self) -> Option<f64> {
        let started = self.started?;
        if self.current == 0 {
            return None;
        }
        let per_sample = started.elapsed().as_secs_f64() / self.current as f64;
        Some(per_sample * self.total.saturating_sub(self.current) as f64)
    }

    /// Render progress bar to string.
    pub fn render(&self) -> String {
        let percent = self.percent();
        let filled = ((percent / 100.0) * self.width as f32).round() as usize;
        let empty = self.width.saturating_sub(filled);

        let bar: String = std::iter::repeat_n('█', filled)
            .chain(std::iter::repeat_n('░', empty))
            .collect();

        let eta = self.eta_secs().map_or_else(|| "--".to_string(), format_duration);
        format!("[{bar}] {percent:>5.1}% │ {}/{} │ ETA: {eta}", self.current, self.total)
    }

    fn draw(&self) {
        if self.target == DrawTarget::Hidden {
            return;
        }
        let mut err = io::stderr().lock();
        // Terminal output is best effort.
        let _ = write!(err, "\r{}", self.render());
        if self.finished {
            let _ = writeln!(err);
        }
        let _ = err.flush();
    }
}

impl Default for ProgressBar {
    fn default() -> Self {
        Self::new(30)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(30.0), "30s");
        assert_eq!(format_duration(59.4), "59s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(60.0), "1m 00s");
        assert_eq!(format_duration(90.0), "1m 30s");
    }

    #[test]
    fn test_format_duration_hours() {
        assert_eq!(format_duration(3600.0), "1h 00m");
        assert_eq!(format_duration(5400.0), "1h 30m");
    }

    #[test]
    fn test_progress_bar_lifecycle() {
        let mut bar = ProgressBar::hidden();
        bar.start(10);
        assert_eq!(bar.percent(), 0.0);
        assert!(bar.eta_secs().is_none());

        bar.update(5);
        assert_eq!(bar.percent(), 50.0);
        assert!(bar.eta_secs().is_some());

        bar.update(99);
        assert_eq!(bar.position(), 10);

        bar.finish();
        assert!(bar.is_finished());
        assert_eq!(bar.position(), bar.total());
    }

    #[test]
    fn test_progress_bar_percent_zero_total() {
        let mut bar = ProgressBar::hidden();
        bar.start(0);
        assert_eq!(bar.percent(), 100.0);
    }

    #[test]
    fn test_progress_bar_render() {
        let mut bar = ProgressBar::with_target(10, DrawTarget::Hidden);
        bar.start(4);
        bar.update(2);
        let rendered = bar.render();
        assert!(rendered.starts_with("[█████░░░░░]"));
        assert!(rendered.contains("2/4"));
        assert!(rendered.contains("ETA:"));
    }

    #[test]
    fn test_restart_clears_finish() {
        let mut bar = ProgressBar::hidden();
        bar.start(3);
        bar.finish();
        bar.start(6);
        assert!(!bar.is_finished());
        assert_eq!(bar.total(), 6);
    }
}
