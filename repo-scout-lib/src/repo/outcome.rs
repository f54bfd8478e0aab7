use crate::access::AccessError;
use core::fmt::{Display, Formatter};
use std::sync::Arc;

/// Result of applying one rule to one repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The rule applied and awarded this many points.
    Points(u32),

    /// The rule could not be applied, for the given reason.
    Inapplicable(Arc<str>),
}

impl Outcome {
    #[must_use]
    pub fn inapplicable(reason: impl AsRef<str>) -> Self {
        Self::Inapplicable(Arc::from(reason.as_ref()))
    }

    /// Points contributed to the total; zero when inapplicable.
    #[must_use]
    pub const fn points(&self) -> u32 {
        match self {
            Self::Points(points) => *points,
            Self::Inapplicable(_) => 0,
        }
    }

    #[must_use]
    pub const fn is_applicable(&self) -> bool {
        matches!(self, Self::Points(_))
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Points(_) => None,
            Self::Inapplicable(reason) => Some(reason),
        }
    }
}

/// Renders the points, or `Rule not applicable. Reason: ...`.
impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Points(points) => write!(f, "{points}"),
            Self::Inapplicable(reason) => write!(f, "Rule not applicable. Reason: {reason}"),
        }
    }
}

impl From<AccessError> for Outcome {
    fn from(error: AccessError) -> Self {
        Self::inapplicable(error.to_string())
    }
}

/// Sum of the points of `outcomes`.
pub fn total_score<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> u64 {
    outcomes.into_iter().map(|o| u64::from(o.points())).sum()
}
