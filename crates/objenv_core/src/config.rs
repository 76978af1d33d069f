//! Adapter configuration.

/// Configuration for an [`ObjectEnv`](crate::ObjectEnv).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Name prefix returned as the scratch directory.
    pub scratch_dir: String,

    /// Whether opening a writer on a non-empty object empties it first.
    pub truncate_existing: bool,

    /// Whether closing a writer waits for its outstanding appends.
    pub sync_on_close: bool,

    /// Separator between virtual directories in object names.
    pub separator: char,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            scratch_dir: "tmp/".to_string(),
            truncate_existing: true,
            sync_on_close: false,
            separator: '/',
        }
    }
}

impl EnvConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scratch directory prefix.
    #[must_use]
    pub fn scratch_dir(mut self, dir: impl Into<String>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Sets whether new writers truncate existing objects.
    #[must_use]
    pub const fn truncate_existing(mut self, value: bool) -> Self {
        self.truncate_existing = value;
        self
    }

    /// Sets whether closing a writer syncs it first.
    #[must_use]
    pub const fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Sets the virtual directory separator.
    #[must_use]
    pub const fn separator(mut self, value: char) -> Self {
        self.separator = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = EnvConfig::default();
        assert_eq!(config.scratch_dir, "tmp/");
        assert!(config.truncate_existing);
        assert!(!config.sync_on_close);
        assert_eq!(config.separator, '/');
    }

    #[test]
    fn builder_pattern() {
        let config = EnvConfig::new()
            .scratch_dir("scratch/")
            .truncate_existing(false)
            .sync_on_close(true);

        assert_eq!(config.scratch_dir, "scratch/");
        assert!(!config.truncate_existing);
        assert!(config.sync_on_close);
    }
}
