//! Human-readable names
//!
//! A [`Name`] is the label a user claims and later binds to published
//! content. Valid names are 3–63 characters of lowercase ASCII letters,
//! digits and internal hyphens.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NameError;

/// Minimum name length (in characters)
pub const MIN_NAME_LENGTH: usize = 3;

/// Maximum name length (in characters)
pub const MAX_NAME_LENGTH: usize = 63;

/// A validated name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    /// Validate `input` exactly as given
    ///
    /// Returns the name unchanged on success, or the first rule it breaks.
    pub fn parse(input: &str) -> Result<Self, NameError> {
        let length = input.chars().count();
        if length == 0 {
            return Err(NameError::Empty);
        }
        if length < MIN_NAME_LENGTH {
            return Err(NameError::TooShort {
                length,
                min: MIN_NAME_LENGTH,
            });
        }
        if length > MAX_NAME_LENGTH {
            return Err(NameError::TooLong {
                length,
                max: MAX_NAME_LENGTH,
            });
        }
        if let Some((position, character)) = input
            .chars()
            .enumerate()
            .find(|(_, c)| !is_name_char(*c))
        {
            return Err(NameError::InvalidCharacter {
                character,
                position,
            });
        }
        if input.starts_with('-') {
            return Err(NameError::LeadingHyphen);
        }
        if input.ends_with('-') {
            return Err(NameError::TrailingHyphen);
        }
        Ok(Self(input.to_string()))
    }

    /// Normalize free-form user input, then validate it
    ///
    /// Lowercases, strips whitespace and any character outside
    /// `[a-z0-9-]`, and trims hyphens from both ends before calling
    /// [`Name::parse`]. `"My Name!"` becomes `"myname"`.
    pub fn normalize(input: &str) -> Result<Self, NameError> {
        let candidate = normalize_candidate(input);
        Self::parse(&candidate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Apply the normalization rules without validating the result
///
/// Useful for echoing the cleaned-up text back to an input field while the
/// user is still typing.
pub fn normalize_candidate(input: &str) -> String {
    let cleaned: String = input
        .to_lowercase()
        .chars()
        .filter(|c| is_name_char(*c))
        .collect();
    cleaned.trim_matches('-').to_string()
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
