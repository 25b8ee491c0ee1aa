//! Resolution state machine.
//!
//! Each resolution starts from [`ResolveStep::start`] and moves through named
//! steps until it reaches `Resolved` or `Failed`:
//!
//! ```text
//! plain name:    Direct ──► Paginate* ──► BrandFallback ──► Resolved | Failed
//!                  │            │
//!                  └────────────┴──────► Resolved
//! compound name: Compound* ──► Resolved | Failed
//! ```

use crate::parser::SubstanceQuery;

use super::{LabelMatch, ResolveError};

/// One state of a single name's resolution.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ResolveStep {
    /// Substance-name search at the default page size
    Direct { segment: String },
    /// Substance-name scan window at `skip`, bounded by the reported total
    Paginate {
        segment: String,
        skip: u64,
        total: u64,
    },
    /// Brand-name search taking the top result as-is
    BrandFallback { segment: String },
    /// AND-joined substance-name scan window at `skip`
    Compound { segments: Vec<String>, skip: u64 },
    Resolved(LabelMatch),
    Failed(ResolveError),
}

impl ResolveStep {
    /// Entry step for a parsed name.
    pub(crate) fn start(query: &SubstanceQuery) -> Self {
        match query.segments() {
            [] => Self::Failed(ResolveError::EmptyName),
            [segment] => Self::Direct {
                segment: segment.clone(),
            },
            segments => Self::Compound {
                segments: segments.to_vec(),
                skip: 0,
            },
        }
    }

    #[cfg(test)]
    pub(crate) fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Failed(_))
    }

    /// Short name for tracing.
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Direct { .. } => "direct",
            Self::Paginate { .. } => "paginate",
            Self::BrandFallback { .. } => "brand_fallback",
            Self::Compound { .. } => "compound",
            Self::Resolved(_) => "resolved",
            Self::Failed(_) => "failed",
        }
    }
}
