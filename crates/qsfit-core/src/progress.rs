//! Advisory progress stream for long grid sweeps. Reporters observe every
//! cell evaluation; nothing here feeds back into the returned results.

use std::fmt::Write as _;
use std::io::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStage {
    Coarse,
    Fine,
}

impl FitStage {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coarse => "coarse",
            Self::Fine => "fine",
        }
    }
}

/// Explicit iteration accumulator threaded through grid sweeps instead of
/// any module-level counter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounter {
    pub done: usize,
    pub total: usize,
}

impl ProgressCounter {
    pub fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    pub fn advance(&mut self) {
        self.done += 1;
    }

    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

pub trait ProgressReporter {
    fn on_cell(
        &self,
        stage: FitStage,
        counter: ProgressCounter,
        params: &[f64],
        loss: f64,
        matched_points: usize,
    );

    fn on_degenerate(&self, stage: FitStage);
}

/// Suppressed progress stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn on_cell(&self, _: FitStage, _: ProgressCounter, _: &[f64], _: f64, _: usize) {}

    fn on_degenerate(&self, _: FitStage) {}
}

/// In-place stderr progress line: percentage, cell counter, the current
/// parameter vector in scientific notation, loss and matched-point count.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn on_cell(
        &self,
        stage: FitStage,
        counter: ProgressCounter,
        params: &[f64],
        loss: f64,
        matched_points: usize,
    ) {
        let mut line = format!(
            "\r{}: {:.2}%, {}/{}, [",
            stage.as_str(),
            counter.percentage(),
            counter.done,
            counter.total
        );
        for (index, param) in params.iter().enumerate() {
            if index > 0 {
                line.push_str(", ");
            }
            let _ = write!(line, "{param:.2e}");
        }
        let _ = write!(line, "], loss: {loss:.2e}, chosen points: {matched_points}");
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }

    fn on_degenerate(&self, stage: FitStage) {
        eprintln!(
            "\n{} stage degenerate: every grid cell used the penalty loss; \
             the minimizer is not meaningful",
            stage.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{FitStage, ProgressCounter};

    #[test]
    fn counter_percentage_tracks_advancement() {
        let mut counter = ProgressCounter::new(4);
        assert_eq!(counter.percentage(), 0.0);
        counter.advance();
        counter.advance();
        assert_eq!(counter.percentage(), 50.0);
    }

    #[test]
    fn empty_sweeps_report_complete() {
        assert_eq!(ProgressCounter::new(0).percentage(), 100.0);
    }

    #[test]
    fn stage_labels_are_stable() {
        assert_eq!(FitStage::Coarse.as_str(), "coarse");
        assert_eq!(FitStage::Fine.as_str(), "fine");
    }
}
