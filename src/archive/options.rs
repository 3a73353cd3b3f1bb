//! Archive selection policy

/// Filter policy for selecting log files into an archive
///
/// Pure value with no identity; the defaults archive every user-visible log
/// stream (backups included) while leaving the internal system log out.
///
/// # Examples
///
/// ```
/// use diaglog::archive::ArchiveOptions;
///
/// let options = ArchiveOptions::new()
///     .with_system(true)
///     .with_max_age_days(7)
///     .with_archive_name("support-bundle");
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Include the designated system-category log file
    pub include_system: bool,
    /// Include retired `.log.N` backups
    pub include_backups: bool,
    /// Exclude files whose creation time is older than this many days
    pub max_age_days: Option<u32>,
    /// Base name of the produced zip archive
    pub archive_name: String,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            include_system: false,
            include_backups: true,
            max_age_days: None,
            archive_name: "diagnostics-logs".to_string(),
        }
    }
}

impl ArchiveOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_system(mut self, include: bool) -> Self {
        self.include_system = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_backups(mut self, include: bool) -> Self {
        self.include_backups = include;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_max_age_days(mut self, days: u32) -> Self {
        self.max_age_days = Some(days);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn with_archive_name(mut self, name: impl Into<String>) -> Self {
        self.archive_name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ArchiveOptions::default();
        assert!(!options.include_system);
        assert!(options.include_backups);
        assert!(options.max_age_days.is_none());
        assert_eq!(options.archive_name, "diagnostics-logs");
    }

    #[test]
    fn test_builder() {
        let options = ArchiveOptions::new()
            .with_system(true)
            .with_backups(false)
            .with_max_age_days(30)
            .with_archive_name("bundle");

        assert!(options.include_system);
        assert!(!options.include_backups);
        assert_eq!(options.max_age_days, Some(30));
        assert_eq!(options.archive_name, "bundle");
    }
}
