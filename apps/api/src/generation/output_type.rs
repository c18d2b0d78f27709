//! Output modes and the validated input/output types of a generation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How many posts to generate and how they relate to each other.
///
/// The serialized values are persisted in `generations.output_type` and used as
/// API discriminators, so they must not change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputType {
    #[default]
    #[serde(rename = "single tweet", alias = "single")]
    Single,
    #[serde(rename = "thread")]
    Thread,
    #[serde(rename = "multiple tweet variations", alias = "variations")]
    Variations,
}

impl OutputType {
    pub const ALL: [OutputType; 3] = [OutputType::Single, OutputType::Thread, OutputType::Variations];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Single => "single tweet",
            OutputType::Thread => "thread",
            OutputType::Variations => "multiple tweet variations",
        }
    }

    /// Name of the JSON field the model must fill for this mode.
    pub fn field(&self) -> &'static str {
        match self {
            OutputType::Single => "tweet",
            OutputType::Thread => "thread",
            OutputType::Variations => "variations",
        }
    }

    /// Inclusive bounds on the number of posts this mode produces.
    pub fn post_count(&self) -> (usize, usize) {
        match self {
            OutputType::Single => (1, 1),
            OutputType::Thread => (3, 4),
            OutputType::Variations => (3, 3),
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown output type '{0}'. Expected one of: single, thread, variations")]
pub struct UnknownOutputType(pub String);

impl FromStr for OutputType {
    type Err = UnknownOutputType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single tweet" => Ok(OutputType::Single),
            "thread" => Ok(OutputType::Thread),
            "variations" | "multiple tweet variations" => Ok(OutputType::Variations),
            _ => Err(UnknownOutputType(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("Please enter a topic to generate content.")]
    Blank,
}

/// A user-supplied topic, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn parse(raw: &str) -> Result<Self, TopicError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TopicError::Blank);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generated posts in display order. Never empty once validated.
pub type PostSequence = Vec<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_type_serializes_to_persisted_values() {
        assert_eq!(
            serde_json::to_string(&OutputType::Single).unwrap(),
            r#""single tweet""#
        );
        assert_eq!(
            serde_json::to_string(&OutputType::Thread).unwrap(),
            r#""thread""#
        );
        assert_eq!(
            serde_json::to_string(&OutputType::Variations).unwrap(),
            r#""multiple tweet variations""#
        );
    }

    #[test]
    fn test_output_type_accepts_short_aliases() {
        let single: OutputType = serde_json::from_str(r#""single""#).unwrap();
        let variations: OutputType = serde_json::from_str(r#""variations""#).unwrap();
        assert_eq!(single, OutputType::Single);
        assert_eq!(variations, OutputType::Variations);
    }

    #[test]
    fn test_output_type_from_str_matches_as_str() {
        for mode in OutputType::ALL {
            assert_eq!(mode.as_str().parse::<OutputType>().unwrap(), mode);
        }
        assert!("carousel".parse::<OutputType>().is_err());
    }

    #[test]
    fn test_post_count_contracts() {
        assert_eq!(OutputType::Single.post_count(), (1, 1));
        assert_eq!(OutputType::Thread.post_count(), (3, 4));
        assert_eq!(OutputType::Variations.post_count(), (3, 3));
    }

    #[test]
    fn test_topic_is_trimmed() {
        let topic = Topic::parse("  AI tools \n").unwrap();
        assert_eq!(topic.as_str(), "AI tools");
    }

    #[test]
    fn test_blank_topic_is_rejected() {
        assert_eq!(Topic::parse(""), Err(TopicError::Blank));
        assert_eq!(Topic::parse(" \t\n "), Err(TopicError::Blank));
    }
}
