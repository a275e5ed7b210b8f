use log::error;

pub const DEFAULT_MAX_CONSECUTIVE_LINE_FAILURES: u32 = 10;
pub const DEFAULT_MAX_CONSECUTIVE_FILE_FAILURES: u32 = 3;

/// Counts consecutive failures up to a limit; a limit of 0 never trips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsecutiveCounter {
    count: u32,
    limit: u32,
}

impl ConsecutiveCounter {
    pub fn new(limit: u32) -> Self {
        Self { count: 0, limit }
    }

    /// Returns true when this increment reaches the limit
    pub fn increment(&mut self) -> bool {
        self.count = self.count.saturating_add(1);
        self.limit > 0 && self.count == self.limit
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GovernorConfig {
    pub max_consecutive_line_failures: u32,
    pub max_consecutive_file_failures: u32,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            max_consecutive_line_failures: DEFAULT_MAX_CONSECUTIVE_LINE_FAILURES,
            max_consecutive_file_failures: DEFAULT_MAX_CONSECUTIVE_FILE_FAILURES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernorState {
    Ok,
    Failing,
    Halted,
}

/// Stops a file after too many failed records in a row, and the whole run
/// after too many failed files in a row.
///
/// The line and file counters are independent: the line counter is reset by
/// any successful record and at every file start, the file counter by any file
/// that completes without being halted.
#[derive(Debug, Clone)]
pub struct FailureGovernor {
    lines: ConsecutiveCounter,
    files: ConsecutiveCounter,
    file_halted: bool,
    run_halted: bool,
}

impl FailureGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            lines: ConsecutiveCounter::new(config.max_consecutive_line_failures),
            files: ConsecutiveCounter::new(config.max_consecutive_file_failures),
            file_halted: false,
            run_halted: false,
        }
    }

    pub fn begin_file(&mut self) {
        self.lines.reset();
        self.file_halted = false;
    }

    pub fn record_success(&mut self) {
        self.lines.reset();
    }

    /// Returns true when this failure halts the current file
    pub fn record_failure(&mut self) -> bool {
        if self.file_halted {
            return false;
        }
        if self.lines.increment() {
            error!(
                "{} consecutive record failures, halting current file",
                self.lines.count()
            );
            self.file_halted = true;
            return true;
        }
        false
    }

    /// Closes the current file; `io_failed` marks a file that could not be
    /// read or written. Returns true when the file counts as failed.
    pub fn finish_file(&mut self, io_failed: bool) -> bool {
        let failed = self.file_halted || io_failed;
        if failed {
            if self.files.increment() {
                error!(
                    "{} consecutive file failures, halting run",
                    self.files.count()
                );
                self.run_halted = true;
            }
        } else {
            self.files.reset();
        }
        self.file_halted = false;
        self.lines.reset();
        failed
    }

    pub fn file_halted(&self) -> bool {
        self.file_halted
    }

    pub fn run_halted(&self) -> bool {
        self.run_halted
    }

    pub fn line_failures(&self) -> u32 {
        self.lines.count()
    }

    pub fn file_failures(&self) -> u32 {
        self.files.count()
    }

    pub fn state(&self) -> GovernorState {
        if self.run_halted || self.file_halted {
            GovernorState::Halted
        } else if self.lines.count() > 0 {
            GovernorState::Failing
        } else {
            GovernorState::Ok
        }
    }
}

impl Default for FailureGovernor {
    fn default() -> Self {
        Self::new(GovernorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_failures_halt_file_exactly_once() {
        let mut governor = FailureGovernor::default();
        governor.begin_file();

        let halts: Vec<bool> = (0..12).map(|_| governor.record_failure()).collect();
        assert_eq!(halts.iter().filter(|&&h| h).count(), 1);
        assert!(halts[9]);
        assert_eq!(governor.state(), GovernorState::Halted);

        assert!(governor.finish_file(false));
        assert_eq!(governor.file_failures(), 1);
        assert!(!governor.run_halted());
    }

    #[test]
    fn test_success_resets_line_counter() {
        let mut governor = FailureGovernor::default();
        governor.begin_file();

        for _ in 0..9 {
            assert!(!governor.record_failure());
        }
        assert_eq!(governor.state(), GovernorState::Failing);
        governor.record_success();
        assert_eq!(governor.line_failures(), 0);
        assert_eq!(governor.state(), GovernorState::Ok);

        for _ in 0..9 {
            assert!(!governor.record_failure());
        }
        assert!(!governor.finish_file(false));
    }

    #[test]
    fn test_new_file_resets_line_counter() {
        let mut governor = FailureGovernor::default();
        governor.begin_file();
        for _ in 0..9 {
            governor.record_failure();
        }
        governor.finish_file(false);

        governor.begin_file();
        assert_eq!(governor.line_failures(), 0);
        assert!(!governor.record_failure());
    }

    #[test]
    fn test_three_failed_files_halt_run() {
        let mut governor = FailureGovernor::new(GovernorConfig {
            max_consecutive_line_failures: 2,
            max_consecutive_file_failures: 3,
        });

        for file in 0..3 {
            governor.begin_file();
            governor.record_failure();
            assert!(governor.record_failure());
            assert!(governor.finish_file(false));
            assert_eq!(governor.run_halted(), file == 2);
        }
    }

    #[test]
    fn test_clean_file_resets_file_counter() {
        let mut governor = FailureGovernor::new(GovernorConfig {
            max_consecutive_line_failures: 1,
            max_consecutive_file_failures: 2,
        });

        governor.begin_file();
        governor.record_failure();
        assert!(governor.finish_file(false));
        assert_eq!(governor.file_failures(), 1);

        governor.begin_file();
        governor.record_success();
        assert!(!governor.finish_file(false));
        assert_eq!(governor.file_failures(), 0);

        governor.begin_file();
        assert!(governor.finish_file(true));
        assert!(!governor.run_halted());
    }

    #[test]
    fn test_zero_limits_disable_halting() {
        let mut governor = FailureGovernor::new(GovernorConfig {
            max_consecutive_line_failures: 0,
            max_consecutive_file_failures: 0,
        });
        governor.begin_file();
        for _ in 0..100 {
            assert!(!governor.record_failure());
        }
        for _ in 0..10 {
            governor.finish_file(true);
        }
        assert!(!governor.run_halted());
    }
}
