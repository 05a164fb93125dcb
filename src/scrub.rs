/*!
 * Secret scrubbing for bundled file contents
 *
 * A [`Scrubber`] holds an ordered list of rules. Pattern rules run first, in
 * declared order, followed by one key rule per allowlisted key. Every rule
 * sees the output of the previous one.
 */

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

use crate::config::ScrubSettings;

/// Name of the capture group that marks the part of a match to redact
pub const SECRET_GROUP: &str = "secret";

/// Built-in detectors: bearer tokens, JWTs, AWS key ids, Stripe keys and
/// quoted secret assignments.
static BUILTIN_PATTERNS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        r"(?i)\bAuthorization\s*:\s*Bearer\s+(?P<secret>[A-Za-z0-9\-._~+/]+=*)",
        r"\beyJ[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\.[A-Za-z0-9_-]{10,}\b",
        r"\bAKIA[0-9A-Z]{16}\b",
        r"\bsk_(?:live|test)_[A-Za-z0-9]{16,}\b",
        r#"(?i)\b(?:api[_-]?key|secret|token|password|passphrase|private[_-]?key)\b\s*[:=]\s*['"](?P<secret>[^'"]{12,})['"]"#,
    ]
});

/// The default pattern rule list
pub fn builtin_patterns() -> Vec<String> {
    BUILTIN_PATTERNS.iter().map(|p| p.to_string()).collect()
}

/// A single rewrite rule
#[derive(Debug, Clone)]
pub enum ScrubRule {
    /// Replace every whole match with the redaction text
    FullMatch(Regex),
    /// Replace only the `secret` group of every match
    KeyedField(Regex),
    /// Redact the value of `KEY=VALUE` lines and `"KEY": "VALUE"` fields
    Key { env_line: Regex, json_field: Regex },
}

impl ScrubRule {
    /// Compile a pattern rule; a `secret` group makes it a keyed-field rule
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(pattern)?;
        if regex.capture_names().flatten().any(|n| n == SECRET_GROUP) {
            Ok(Self::KeyedField(regex))
        } else {
            Ok(Self::FullMatch(regex))
        }
    }

    /// Compile a key rule
    pub fn key(key: &str) -> Result<Self, regex::Error> {
        let escaped = regex::escape(key);
        let env_line = RegexBuilder::new(&format!(r"^(?P<key>{})[ \t]*=[^\r\n]*", escaped))
            .case_insensitive(true)
            .multi_line(true)
            .build()?;
        let json_field = RegexBuilder::new(&format!(r#"(?P<head>"{}"\s*:\s*")[^"]+""#, escaped))
            .case_insensitive(true)
            .build()?;

        Ok(Self::Key {
            env_line,
            json_field,
        })
    }

    /// Apply the rule, returning the rewritten text and the number of
    /// redactions when anything changed
    fn apply(&self, text: &str, redaction: &str) -> Option<(String, usize)> {
        match self {
            Self::FullMatch(regex) => replace_counted(regex, text, |_| redaction.to_string()),
            Self::KeyedField(regex) => replace_counted(regex, text, |caps| {
                match (caps.get(0), caps.name(SECRET_GROUP)) {
                    (Some(whole), Some(secret)) => {
                        let matched = whole.as_str();
                        let start = secret.start() - whole.start();
                        let end = secret.end() - whole.start();
                        format!("{}{}{}", &matched[..start], redaction, &matched[end..])
                    }
                    _ => caps[0].to_string(),
                }
            }),
            Self::Key {
                env_line,
                json_field,
            } => {
                let env = replace_counted(env_line, text, |caps| {
                    format!("{}={}", &caps["key"], redaction)
                });
                let (text, env_count) = match env {
                    Some((rewritten, count)) => (rewritten, count),
                    None => (text.to_string(), 0),
                };

                let json = replace_counted(json_field, &text, |caps| {
                    format!("{}{}\"", &caps["head"], redaction)
                });
                match json {
                    Some((rewritten, count)) => Some((rewritten, env_count + count)),
                    None if env_count > 0 => Some((text, env_count)),
                    None => None,
                }
            }
        }
    }
}

/// Replace every match, counting only replacements that change the text
fn replace_counted<F>(regex: &Regex, text: &str, mut rewrite: F) -> Option<(String, usize)>
where
    F: FnMut(&Captures) -> String,
{
    let mut count = 0;
    let rewritten = regex.replace_all(text, |caps: &Captures| {
        let replacement = rewrite(caps);
        if replacement != caps[0] {
            count += 1;
        }
        replacement
    });

    if count == 0 {
        None
    } else {
        Some((rewritten.into_owned(), count))
    }
}

/// Result of scrubbing a piece of content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scrubbed {
    /// Rewritten content
    pub content: String,
    /// Number of redactions applied
    pub redactions: usize,
}

/// Ordered set of scrub rules sharing one redaction text
#[derive(Debug, Clone)]
pub struct Scrubber {
    redaction: String,
    rules: Vec<ScrubRule>,
}

impl Scrubber {
    /// Compile pattern and key rules
    ///
    /// Rules that fail to compile are logged and skipped; the remaining
    /// rules still apply.
    pub fn new<S: AsRef<str>>(redaction: &str, patterns: &[S], key_allowlist: &[S]) -> Self {
        let mut rules = Vec::with_capacity(patterns.len() + key_allowlist.len());

        for pattern in patterns {
            match ScrubRule::pattern(pattern.as_ref()) {
                Ok(rule) => rules.push(rule),
                Err(e) => log::warn!("Skipping scrub pattern {:?}: {}", pattern.as_ref(), e),
            }
        }

        for key in key_allowlist.iter().map(AsRef::as_ref) {
            if key.is_empty() {
                continue;
            }
            match ScrubRule::key(key) {
                Ok(rule) => rules.push(rule),
                Err(e) => log::warn!("Skipping scrub key {:?}: {}", key, e),
            }
        }

        Self {
            redaction: redaction.to_string(),
            rules,
        }
    }

    /// Build a scrubber from configuration
    pub fn from_settings(settings: &ScrubSettings) -> Self {
        Self::new(&settings.redaction, &settings.patterns, &settings.key_allowlist)
    }

    /// Compiled rules in application order
    pub fn rules(&self) -> &[ScrubRule] {
        &self.rules
    }

    /// Scrub content and report the number of redactions
    pub fn scrub(&self, content: &str) -> Scrubbed {
        let mut output = content.to_string();
        let mut redactions = 0;

        for rule in &self.rules {
            if let Some((rewritten, count)) = rule.apply(&output, &self.redaction) {
                output = rewritten;
                redactions += count;
            }
        }

        Scrubbed {
            content: output,
            redactions,
        }
    }
}

/// One-shot scrub of `content`
pub fn scrub<S: AsRef<str>>(
    content: &str,
    redaction: &str,
    patterns: &[S],
    key_allowlist: &[S],
) -> String {
    Scrubber::new(redaction, patterns, key_allowlist)
        .scrub(content)
        .content
}
