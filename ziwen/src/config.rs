use std::{collections::HashMap, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::{Error, DEFAULT_SUBREDDIT, DEFAULT_USERNAME};

/// Environment variable that points at the config file.
pub const CONFIG_PATH_VAR: &str = "ZIWEN_CONFIG";
/// Config file read when [`CONFIG_PATH_VAR`] isn't set.
pub const DEFAULT_CONFIG_PATH: &str = "ziwen.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// SQLite file holding requests and ledgers.
    pub database_path: PathBuf,
    /// Directory the file-backed platform reads from and writes to.
    pub spool_dir: PathBuf,
    /// The bot's own account. Its comments are never processed.
    pub username: String,
    pub subreddit: String,
    pub moderators: Vec<String>,
    pub poll_interval_secs: u64,
    /// Upper bound on handling one post or comment.
    pub handler_timeout_secs: u64,
    /// Claims older than this revert to untranslated.
    pub claim_expiry_secs: i64,
    pub default_points_multiplier: i64,
    /// Per-language points multipliers, keyed by language name.
    pub points_multipliers: HashMap<String, i64>,
    pub streamer: StreamerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamerConfig {
    pub poll_interval_secs: u64,
    /// Users whose mentions are never acted on.
    pub excluded_users: Vec<String>,
    /// Subreddits whose mentions are never acted on.
    pub excluded_subreddits: Vec<String>,
    /// Users who may not have anything crossposted, as requester or as author.
    pub blacklisted_users: Vec<String>,
    /// Subreddits nothing may be crossposted from.
    pub blacklisted_subreddits: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: PathBuf::from("ziwen.sqlite"),
            spool_dir: PathBuf::from("spool"),
            username: DEFAULT_USERNAME.to_string(),
            subreddit: DEFAULT_SUBREDDIT.to_string(),
            moderators: Vec::new(),
            poll_interval_secs: 30,
            handler_timeout_secs: 60,
            claim_expiry_secs: 8 * 60 * 60,
            default_points_multiplier: 1,
            points_multipliers: HashMap::new(),
            streamer: StreamerConfig::default(),
        }
    }
}

impl Default for StreamerConfig {
    fn default() -> Self {
        StreamerConfig {
            poll_interval_secs: 60,
            excluded_users: ["AutoModerator", "TotesMessenger", "sneakpeekbot", "transcribot"]
                .map(String::from)
                .to_vec(),
            excluded_subreddits: vec!["translatorbot".to_string()],
            blacklisted_users: Vec::new(),
            blacklisted_subreddits: Vec::new(),
        }
    }
}

impl Config {
    /// Read the config from the file named by `ZIWEN_CONFIG`, or from
    /// `ziwen.toml`. A missing default file yields the defaults; a missing
    /// file that was explicitly asked for is an error.
    pub fn load() -> Result<Config, Error> {
        let (path, explicit) = match std::env::var_os(CONFIG_PATH_VAR) {
            Some(path) => (PathBuf::from(path), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::info!("Loading config from {}", path.display());
                Config::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                log::warn!("No {} found, running with defaults.", path.display());
                Ok(Config::default())
            }
            Err(e) => Err(Error::Config(format!("reading {}: {e}", path.display()))),
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Config, Error> {
        let config: Config = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.username.trim().is_empty() {
            return Err(Error::Config("username must not be empty".to_string()));
        }
        if self.poll_interval_secs == 0 || self.streamer.poll_interval_secs == 0 {
            return Err(Error::Config("poll intervals must be positive".to_string()));
        }
        if self.handler_timeout_secs == 0 {
            return Err(Error::Config("handler_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Case-insensitive, since Reddit usernames are.
    #[must_use]
    pub fn is_moderator(&self, username: &str) -> bool {
        contains_ignoring_case(&self.moderators, username)
    }

    #[must_use]
    pub fn is_self(&self, username: &str) -> bool {
        self.username.eq_ignore_ascii_case(username)
    }

    #[must_use]
    pub fn points_multiplier(&self, language_name: &str) -> i64 {
        self.points_multipliers
            .get(language_name)
            .copied()
            .unwrap_or(self.default_points_multiplier)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_secs(self.handler_timeout_secs)
    }
}

impl StreamerConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    #[must_use]
    pub fn is_excluded(&self, username: &str, subreddit: &str) -> bool {
        contains_ignoring_case(&self.excluded_users, username)
            || contains_ignoring_case(&self.excluded_subreddits, subreddit)
    }

    #[must_use]
    pub fn is_blacklisted(&self, username: &str, subreddit: &str) -> bool {
        contains_ignoring_case(&self.blacklisted_users, username)
            || contains_ignoring_case(&self.blacklisted_subreddits, subreddit)
    }
}

fn contains_ignoring_case(list: &[String], item: &str) -> bool {
    list.iter().any(|x| x.eq_ignore_ascii_case(item))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::Config;
    use crate::Error;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.subreddit, "translator");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.points_multiplier("Japanese"), 1);
    }

    #[test]
    fn overrides_and_multipliers() {
        let config = Config::from_toml_str(
            r#"
            username = "ziwen-test"
            moderators = ["Mod_One"]
            default_points_multiplier = 2

            [points_multipliers]
            Japanese = 1
            Tagalog = 8

            [streamer]
            excluded_users = ["somebody"]
            blacklisted_subreddits = ["DuckDuckGo"]
            "#,
        )
        .unwrap();
        assert!(config.is_self("Ziwen-Test"));
        assert!(config.is_moderator("mod_one"));
        assert!(!config.is_moderator("mod_two"));
        assert_eq!(config.points_multiplier("Tagalog"), 8);
        assert_eq!(config.points_multiplier("Finnish"), 2);
        assert_eq!(config.streamer.excluded_users, vec!["somebody"]);
        assert_eq!(config.streamer.poll_interval_secs, 60);
        assert!(config.streamer.is_blacklisted("anyone", "duckduckgo"));
        assert!(config.streamer.is_excluded("Somebody", "languagelearning"));
        assert!(!config.streamer.is_excluded("AutoModerator", "languagelearning"));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("poll_interval_secs = 0"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("no_such_key = 1"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("username = 5"),
            Err(Error::Config(_))
        ));
    }
}
