//! Signal fusion: the mapping from reported signals to a verdict.
//!
//! An image is authentic only when no signal is set. Confidence is a step
//! function of how many signals corroborate each other:
//!
//! | signals set | authentic | confidence |
//! |-------------|-----------|------------|
//! | 0           | yes       | 95         |
//! | 1           | no        | 75         |
//! | 2           | no        | 85         |
//! | 3           | no        | 95         |

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::signals::VerificationSignals;

/// Confidence percentage attached to a verdict.
///
/// Only [`fuse`] can produce one, so the value is always one of the table entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    const ABSENCE: Self = Self(95);
    const SINGLE: Self = Self(75);
    const PAIR: Self = Self(85);
    const FULL: Self = Self(95);

    pub fn percent(self) -> u8 {
        self.0
    }

    fn for_count(count: u8) -> Self {
        match count {
            0 => Self::ABSENCE,
            1 => Self::SINGLE,
            2 => Self::PAIR,
            _ => Self::FULL,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Display-ready outcome of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationVerdict {
    is_authentic: bool,
    confidence: Confidence,
    signals: VerificationSignals,
}

impl VerificationVerdict {
    pub fn is_authentic(&self) -> bool {
        self.is_authentic
    }

    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    pub fn watermark_found(&self) -> bool {
        self.signals.watermark_found
    }

    pub fn metadata_valid(&self) -> bool {
        self.signals.metadata_valid
    }

    pub fn on_ledger(&self) -> bool {
        self.signals.on_ledger
    }

    pub fn watermark_content(&self) -> Option<&str> {
        self.signals.watermark_content.as_deref()
    }

    pub fn auxiliary_metadata(&self) -> Option<&Map<String, Value>> {
        self.signals.auxiliary_metadata.as_ref()
    }

    /// The signals this verdict was derived from.
    pub fn signals(&self) -> &VerificationSignals {
        &self.signals
    }

    /// Short label for the verdict.
    pub fn label(&self) -> &'static str {
        if self.is_authentic {
            "AUTHENTIC"
        } else {
            "AI-GENERATED"
        }
    }
}

/// Derive a verdict from the service's signals. Pure and deterministic.
pub fn fuse(signals: &VerificationSignals) -> VerificationVerdict {
    let count = signals.count();
    VerificationVerdict {
        is_authentic: count == 0,
        confidence: Confidence::for_count(count),
        signals: signals.clone(),
    }
}
