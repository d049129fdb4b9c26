//! Process configuration, read once from the environment at startup.
//!
//! The resulting [`Config`] is immutable and handed to every component
//! explicitly; nothing in the library reads the environment on its own.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Default site the crawler targets.
pub const DEFAULT_BASE_URL: &str = "https://panda.uni-paderborn.de";

/// Default name of the session cookie the token is sent under.
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "MoodleSessionupblms";

/// Default sync root, relative to the working directory.
pub const DEFAULT_SYNC_DIRECTORY: &str = "./sync";

/// Default number of folders crawled concurrently.
pub const DEFAULT_CRAWL_CONCURRENCY: usize = 4;

const MAX_CRAWL_CONCURRENCY: usize = 16;

/// Errors produced while building a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `SESSION_COOKIE` is unset or blank.
    #[error("SESSION_COOKIE is not set; export the session token of a logged-in browser session")]
    MissingSessionCookie,

    /// `LMS_BASE_URL` is not an absolute http(s) URL.
    #[error("invalid LMS_BASE_URL '{value}': {reason}")]
    InvalidBaseUrl {
        /// Raw value from the environment.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `CRAWL_CONCURRENCY` is not a number in range.
    #[error("invalid CRAWL_CONCURRENCY '{value}': must be between 1 and {MAX_CRAWL_CONCURRENCY}")]
    InvalidConcurrency {
        /// Raw value from the environment.
        value: String,
    },
}

/// Runtime configuration shared (read-only) by all components.
#[derive(Clone)]
pub struct Config {
    /// Opaque session token value.
    pub session_cookie: String,
    /// Cookie name the token is sent under.
    pub session_cookie_name: String,
    /// Root of the local mirror.
    pub sync_directory: PathBuf,
    /// Strip a leading module-code token from course names.
    pub purify_course_names: bool,
    /// Site root all listing URLs are built from.
    pub base_url: Url,
    /// Upper bound on folders crawled at the same time.
    pub crawl_concurrency: usize,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("session_cookie", &"<redacted>")
            .field("session_cookie_name", &self.session_cookie_name)
            .field("sync_directory", &self.sync_directory)
            .field("purify_course_names", &self.purify_course_names)
            .field("base_url", &self.base_url.as_str())
            .field("crawl_concurrency", &self.crawl_concurrency)
            .finish()
    }
}

impl Config {
    /// Creates a configuration with defaults for everything but the token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSessionCookie`] when `session_cookie` is blank.
    pub fn new(session_cookie: impl Into<String>) -> Result<Self, ConfigError> {
        let session_cookie = session_cookie.into().trim().to_string();
        if session_cookie.is_empty() {
            return Err(ConfigError::MissingSessionCookie);
        }
        Ok(Self {
            session_cookie,
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            sync_directory: PathBuf::from(DEFAULT_SYNC_DIRECTORY),
            purify_course_names: false,
            base_url: parse_base_url(DEFAULT_BASE_URL)?,
            crawl_concurrency: DEFAULT_CRAWL_CONCURRENCY,
        })
    }

    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the token is missing or an optional
    /// variable holds an unusable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new(get("SESSION_COOKIE").unwrap_or_default())?;

        if let Some(dir) = get("SYNC_DIRECTORY") {
            config.sync_directory = PathBuf::from(dir);
        }
        if let Some(flag) = get("PURIFY_COURSE_NAMES") {
            config.purify_course_names = is_truthy(&flag);
        }
        if let Some(base) = get("LMS_BASE_URL") {
            config.base_url = parse_base_url(&base)?;
        }
        if let Some(name) = get("SESSION_COOKIE_NAME") {
            config.session_cookie_name = name;
        }
        if let Some(raw) = get("CRAWL_CONCURRENCY") {
            config.crawl_concurrency = raw
                .parse::<usize>()
                .ok()
                .filter(|value| (1..=MAX_CRAWL_CONCURRENCY).contains(value))
                .ok_or(ConfigError::InvalidConcurrency { value: raw })?;
        }

        Ok(config)
    }

    /// Value of the `Cookie` header attached to every request.
    #[must_use]
    pub fn cookie_header(&self) -> String {
        format!("{}={}", self.session_cookie_name, self.session_cookie)
    }

    /// Lightweight page requested by the keepalive ping.
    #[must_use]
    pub fn keepalive_url(&self) -> String {
        self.site_url("/my/")
    }

    /// Dashboard listing the in-progress courses.
    #[must_use]
    pub fn course_index_url(&self) -> String {
        self.site_url("/my/?myoverviewtab=courses")
    }

    /// Course page listing folder activities.
    #[must_use]
    pub fn course_url(&self, course_id: u64) -> String {
        self.site_url(&format!("/course/view.php?id={course_id}"))
    }

    /// Folder page listing files.
    #[must_use]
    pub fn folder_url(&self, folder_id: u64) -> String {
        self.site_url(&format!("/mod/folder/view.php?id={folder_id}"))
    }

    /// Resolves a scraped href against the site root.
    ///
    /// Absolute hrefs come back unchanged; `None` means the href cannot be
    /// turned into a URL at all.
    #[must_use]
    pub fn resolve_href(&self, href: &str) -> Option<Url> {
        self.base_url.join(href).ok()
    }

    fn site_url(&self, path_and_query: &str) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            path_and_query
        )
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::InvalidBaseUrl {
        value: value.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            value: value.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
