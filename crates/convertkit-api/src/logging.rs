//! Masked debug logging.
//!
//! Every line handed to [`DebugLog`] passes through the masking transform
//! before it reaches the sink; raw credentials and email addresses never
//! appear in a persisted log. A disabled log performs no I/O at all.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock, RwLock};

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

/// Log channel name, kept from the original SDK for compatibility with
/// tooling that greps its debug logs.
const CHANNEL: &str = "ck-debug";

/// Matches email addresses embedded in log messages.
const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Severity of a debug log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Request/response lifecycle events.
    Info,
    /// Unexpected but recoverable conditions.
    Warning,
    /// Failures.
    Error,
}

impl LogLevel {
    fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single log line, constructed only after masking has been applied.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Time the entry was created.
    pub timestamp: DateTime<Utc>,
    /// Entry severity.
    pub level: LogLevel,
    /// Masked message text.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {CHANNEL}.{}: {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            self.level,
            self.message
        )
    }
}

/// Redacts configured secrets and email addresses from log lines.
pub struct Masker {
    /// Longest-first so overlapping secrets mask deterministically.
    secrets: RwLock<Vec<String>>,
}

impl Masker {
    /// Masker over an initial secret set. Empty values are ignored.
    pub fn new(secrets: Vec<String>) -> Self {
        let mut secrets: Vec<String> = secrets.into_iter().filter(|s| !s.is_empty()).collect();
        secrets.sort_by(|a, b| b.len().cmp(&a.len()));
        Self {
            secrets: RwLock::new(secrets),
        }
    }

    /// Register an additional secret (e.g. a rotated token).
    pub fn register_secret(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        let mut secrets = self.secrets.write().expect("secrets lock poisoned");
        if !secrets.iter().any(|s| s == value) {
            secrets.push(value.to_string());
            secrets.sort_by(|a, b| b.len().cmp(&a.len()));
        }
    }

    /// Apply the masking transform to a raw message.
    pub fn mask(&self, message: &str) -> String {
        let mut masked = message.to_string();

        {
            let secrets = self.secrets.read().expect("secrets lock poisoned");
            for secret in secrets.iter() {
                if masked.contains(secret.as_str()) {
                    masked = masked.replace(secret.as_str(), &mask_tail(secret));
                }
            }
        }

        email_regex()
            .replace_all(&masked, |caps: &regex::Captures<'_>| mask_email(&caps[0]))
            .into_owned()
    }
}

/// Replace all but the last four characters of `value` with `*`.
fn mask_tail(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let keep = chars.len().min(4);
    let mut masked = "*".repeat(chars.len() - keep);
    masked.extend(&chars[chars.len() - keep..]);
    masked
}

/// Mask an email address, reproducing the exact shape emitted by the
/// original SDK (`owner@name.com` becomes `o****@n********.c**`): first
/// character of the local part plus one `*` per remaining character, first
/// character of the domain plus one `*` per domain character, then the TLD
/// reduced to its first character plus one `*` per remaining character.
fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return mask_tail(email);
    };
    let Some((_, tld)) = domain.rsplit_once('.') else {
        return mask_tail(email);
    };

    let mut masked = String::with_capacity(email.len() + domain.len());
    masked.extend(local.chars().next());
    masked.push_str(&"*".repeat(local.chars().count().saturating_sub(1)));
    masked.push('@');
    masked.extend(domain.chars().next());
    masked.push_str(&"*".repeat(domain.chars().count()));
    masked.push('.');
    masked.extend(tld.chars().next());
    masked.push_str(&"*".repeat(tld.chars().count().saturating_sub(1)));
    masked
}

/// Debug log facility attached to a client.
pub struct DebugLog {
    inner: Option<LogSink>,
}

struct LogSink {
    writer: Mutex<Box<dyn Write + Send>>,
    masker: Masker,
}

impl DebugLog {
    /// A log that drops every entry without any I/O.
    pub fn disabled() -> Self {
        Self { inner: None }
    }

    /// Log appending to the file at `path`, creating parent directories as
    /// needed. `secrets` seeds the masking transform.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened.
    pub fn to_file(path: impl AsRef<Path>, secrets: Vec<String>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::to_writer(Box::new(file), secrets))
    }

    /// Log writing to an arbitrary sink. This is also the explicit test
    /// seam: tests inject an in-memory writer instead of reflecting into
    /// logger internals.
    pub fn to_writer(writer: Box<dyn Write + Send>, secrets: Vec<String>) -> Self {
        Self {
            inner: Some(LogSink {
                writer: Mutex::new(writer),
                masker: Masker::new(secrets),
            }),
        }
    }

    /// Whether entries will be written.
    pub fn is_enabled(&self) -> bool {
        self.inner.is_some()
    }

    /// Register an additional secret to mask (e.g. rotated OAuth tokens).
    pub(crate) fn register_secret(&self, value: &str) {
        if let Some(sink) = &self.inner {
            sink.masker.register_secret(value);
        }
    }

    /// Mask `message` and append it to the sink.
    ///
    /// Sink write failures are swallowed: diagnostics must never fail an API
    /// call.
    pub fn log(&self, level: LogLevel, message: &str) {
        let Some(sink) = &self.inner else {
            return;
        };

        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message: sink.masker.mask(message),
        };

        let mut writer = sink.writer.lock().expect("log sink poisoned");
        let _ = writeln!(writer, "{entry}");
        let _ = writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// Shared in-memory sink for asserting on written lines.
    #[derive(Clone, Default)]
    struct MemorySink(Arc<Mutex<Vec<u8>>>);

    impl MemorySink {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for MemorySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn secret_masking_preserves_last_four_characters() {
        assert_eq!(mask_tail("abcd1234wxyz"), "********wxyz");
        assert_eq!(mask_tail("wxyz"), "wxyz");
        assert_eq!(mask_tail("secret"), "**cret");
    }

    #[test]
    fn email_masking_matches_expected_shape() {
        assert_eq!(mask_email("owner@name.com"), "o****@n********.c**");
    }

    #[test]
    fn masker_replaces_secrets_and_emails_in_context() {
        let masker = Masker::new(vec!["abcd1234wxyz".into()]);
        let masked = masker.mask("token abcd1234wxyz issued to owner@name.com");
        assert_eq!(masked, "token ********wxyz issued to o****@n********.c**");
    }

    #[test]
    fn longest_secret_wins_when_secrets_overlap() {
        let masker = Masker::new(vec!["token".into(), "token-extended".into()]);
        let masked = masker.mask("value: token-extended");
        // The longer secret masks first, so the shorter one finds no match.
        assert_eq!(masked, "value: **********nded");
    }

    #[test]
    fn registered_secrets_are_masked_in_later_entries() {
        let masker = Masker::new(Vec::new());
        assert_eq!(masker.mask("fresh-token-value"), "fresh-token-value");

        masker.register_secret("fresh-token-value");
        assert_eq!(masker.mask("fresh-token-value"), "*************alue");
    }

    #[test]
    fn enabled_log_writes_masked_entries() {
        let sink = MemorySink::default();
        let log = DebugLog::to_writer(Box::new(sink.clone()), vec!["supersecret123".into()]);

        log.log(LogLevel::Info, "Access Token: supersecret123");

        let contents = sink.contents();
        assert!(contents.contains("ck-debug.INFO: Access Token: **********t123"));
        assert!(!contents.contains("supersecret123"));
    }

    #[test]
    fn disabled_log_is_a_no_op() {
        let log = DebugLog::disabled();
        assert!(!log.is_enabled());
        // Nothing to assert beyond "does not panic"; there is no sink.
        log.log(LogLevel::Info, "dropped");
    }

    #[test]
    fn entry_display_carries_channel_and_level() {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Warning,
            message: "masked".into(),
        };
        let line = entry.to_string();
        assert!(line.contains("ck-debug.WARNING: masked"));
    }
}
