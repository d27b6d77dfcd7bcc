use std::collections::VecDeque;

/// Maximum number of lines the activity log retains.
pub const ACTIVITY_LOG_CAPACITY: usize = 4;

/// Lines shown before any workflow has run.
pub const BOOT_LINES: [&str; 2] = ["System Ready.", "Awaiting Vector Input..."];

/// Bounded sliding window of human-readable status lines, most recent last.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    lines: VecDeque<String>,
    total: u64,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A log seeded with [`BOOT_LINES`].
    pub fn with_boot_lines() -> Self {
        let mut log = Self::new();
        for line in BOOT_LINES {
            log.append(line);
        }
        log
    }

    /// Append a line, evicting the oldest once capacity is reached.
    pub fn append(&mut self, message: impl Into<String>) {
        if self.lines.len() == ACTIVITY_LOG_CAPACITY {
            self.lines.pop_front();
        }
        self.lines.push_back(message.into());
        self.total += 1;
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines ever appended, including evicted ones.
    pub fn total_appended(&self) -> u64 {
        self.total
    }

    pub fn latest(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }
}
