//! Configuration for the pm2 log stream.

/// App filter meaning "follow every process".
pub const ALL_APPS: &str = "*";

/// Configuration for spawning the pm2 log stream.
#[derive(Debug, Clone)]
pub struct LogSourceConfig {
    /// pm2 app name to follow, or [`ALL_APPS`].
    pub app: String,

    /// Explicit pm2 binary to run instead of resolving from the PATH.
    /// Disables the npx fallback.
    pub pm2_bin: Option<String>,
}

impl LogSourceConfig {
    /// Follow a single pm2 app.
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            pm2_bin: None,
        }
    }

    /// Follow every pm2 app.
    pub fn all() -> Self {
        Self::new(ALL_APPS)
    }

    /// Use a specific pm2 binary.
    pub fn with_pm2_bin(mut self, pm2_bin: impl Into<String>) -> Self {
        self.pm2_bin = Some(pm2_bin.into());
        self
    }

    /// True when no app filter applies. Both `*` and `all` (any case)
    /// mean everything.
    pub fn forwards_all_apps(&self) -> bool {
        self.app == ALL_APPS || self.app.eq_ignore_ascii_case("all")
    }

    /// Arguments passed to pm2. The app name is omitted when following
    /// everything; pm2 treats a bare `logs` as all apps.
    pub(crate) fn args(&self) -> Vec<String> {
        let mut args = vec!["logs".to_string(), "--raw".to_string()];
        if !self.forwards_all_apps() {
            args.push(self.app.clone());
        }
        args
    }
}

impl Default for LogSourceConfig {
    fn default() -> Self {
        Self::all()
    }
}
