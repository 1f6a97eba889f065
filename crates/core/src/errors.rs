use thiserror::Error;

/// Unified error type for the entire btc-whatif-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Caller Input ────────────────────────────────────────────────
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid projection window: {0}")]
    InvalidProjectionWindow(String),

    // ── Price Data ──────────────────────────────────────────────────
    #[error("Price not available for {asset} in {currency} on {date}")]
    PriceUnavailable {
        asset: String,
        currency: String,
        date: String,
    },

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Upstream {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    // ── Settings ────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Coarse classification of a [`CoreError`], so callers can tell a
/// retryable upstream failure apart from a permanent input problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    PriceUnavailable,
    InvalidProjectionWindow,
    UpstreamFailure,
    Configuration,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidInput => write!(f, "InvalidInput"),
            ErrorKind::PriceUnavailable => write!(f, "PriceUnavailable"),
            ErrorKind::InvalidProjectionWindow => write!(f, "InvalidProjectionWindow"),
            ErrorKind::UpstreamFailure => write!(f, "UpstreamFailure"),
            ErrorKind::Configuration => write!(f, "Configuration"),
        }
    }
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            CoreError::InvalidProjectionWindow(_) => ErrorKind::InvalidProjectionWindow,
            CoreError::PriceUnavailable { .. } => ErrorKind::PriceUnavailable,
            CoreError::Upstream { .. } | CoreError::Network(_) => ErrorKind::UpstreamFailure,
            CoreError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Only upstream failures may succeed on resubmission; everything else
    /// needs different input or settings.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::UpstreamFailure
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Upstream {
            provider: "json".into(),
            message: e.to_string(),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full request URL, and the API key with it.
        CoreError::Network(sanitize_message(&e.to_string()))
    }
}

/// Strip query strings from any `http(s)://` URL embedded in an error message.
/// Text outside URLs, including a plain `?`, is left untouched.
pub fn sanitize_message(msg: &str) -> String {
    let mut out = String::with_capacity(msg.len());
    let mut rest = msg;
    while let Some(start) = find_url_start(rest) {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let end = tail
            .find(|c: char| c.is_whitespace() || matches!(c, ')' | '"' | '\'' | '>'))
            .unwrap_or(tail.len());
        let url = &tail[..end];
        match url.find('?') {
            Some(q) => {
                out.push_str(&url[..q]);
                out.push_str("?<query redacted>");
            }
            None => out.push_str(url),
        }
        rest = &tail[end..];
    }
    out.push_str(rest);
    out
}

fn find_url_start(s: &str) -> Option<usize> {
    [s.find("http://"), s.find("https://")].into_iter().flatten().min()
}
