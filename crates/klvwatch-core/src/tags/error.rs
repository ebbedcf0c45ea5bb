use serde::Serialize;
use thiserror::Error;

/// Per-tag decode problem. Never aborts a packet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TagError {
    #[error("unknown tag {tag}")]
    UnknownTag { tag: u8 },
    #[error("missing descriptor for tag {tag}")]
    MissingDescriptor { tag: u8 },
    #[error("decode failure for tag {tag}: {length} value bytes")]
    DecodeFailure { tag: u8, length: usize },
    #[error("out of bounds for tag {tag}: {value} not in [{min}, {max}]")]
    OutOfBounds {
        tag: u8,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl TagError {
    pub fn tag(&self) -> u8 {
        match self {
            TagError::UnknownTag { tag }
            | TagError::MissingDescriptor { tag }
            | TagError::DecodeFailure { tag, .. }
            | TagError::OutOfBounds { tag, .. } => *tag,
        }
    }
}

/// A `TagError` as recorded in a packet snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagIssue {
    pub tag: u8,
    pub message: String,
}

impl From<&TagError> for TagIssue {
    fn from(err: &TagError) -> Self {
        Self {
            tag: err.tag(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TagError, TagIssue};

    #[test]
    fn issue_keeps_tag_and_message() {
        let err = TagError::OutOfBounds {
            tag: 5,
            value: 361.0,
            min: 0.0,
            max: 360.0,
        };
        let issue = TagIssue::from(&err);
        assert_eq!(issue.tag, 5);
        assert!(issue.message.starts_with("out of bounds"));
        assert!(issue.message.contains("361"));
    }
}
