/// Identifier normalization
///
/// Turns whatever the caller typed (`@name`, `https://t.me/name/`, a bare
/// numeric id) into the plain form the platform session expects.
use std::fmt;
use thiserror::Error;

/// Identifier that was empty once normalized
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Identifier is empty after normalization: {raw:?}")]
pub struct InvalidIdentifier {
    pub raw: String,
}

/// Canonical identifier, never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedIdentifier(String);

impl NormalizedIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw identifier
///
/// The stripping pass is repeated until it no longer changes the input, so
/// `normalize(normalize(s)) == normalize(s)` holds even for inputs such as
/// `/@name` where one pass only uncovers the prefix.
pub fn normalize(raw: &str) -> Result<NormalizedIdentifier, InvalidIdentifier> {
    let mut current = strip_once(raw);
    loop {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        return Err(InvalidIdentifier {
            raw: raw.to_string(),
        });
    }

    Ok(NormalizedIdentifier(current))
}

fn strip_once(input: &str) -> String {
    let without_links = input
        .trim()
        .replace("https://", "")
        .replace("http://", "")
        .replace("t.me/", "")
        .replace("telegram.me/", "");

    let without_at = without_links
        .strip_prefix('@')
        .unwrap_or(&without_links);

    without_at
        .trim_matches(|c| c == '/' || c == ':')
        .to_string()
}
