use core::fmt::{Display, Formatter};

/// Why repository data could not be obtained.
///
/// Rules turn these into an inapplicable outcome whose reason is the display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The repository may not be cloned: it is too large, its size is unknown, or cloning
    /// kept failing.
    CloneProhibited,

    /// The data is temporarily unavailable.
    Transient(String),

    /// The repository evaluation has completed and its data has been released.
    Finished,
}

impl AccessError {
    #[must_use]
    pub fn transient(reason: impl Into<String>) -> Self {
        Self::Transient(reason.into())
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

impl Display for AccessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::CloneProhibited => write!(f, "repository is too large to clone or could not be cloned"),
            Self::Transient(reason) => write!(f, "{reason}"),
            Self::Finished => write!(f, "repository evaluation has already finished"),
        }
    }
}

impl core::error::Error for AccessError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(AccessError::transient("timed out").to_string(), "timed out");
        assert!(AccessError::CloneProhibited.to_string().contains("too large"));
        assert!(AccessError::transient("x").is_transient());
        assert!(!AccessError::CloneProhibited.is_transient());
    }
}
