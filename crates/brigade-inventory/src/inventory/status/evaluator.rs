use serde::{Deserialize, Serialize};

use crate::inventory::domain::ItemCheck;

/// Derived classification of an inspection, and by extension of a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionStatus {
    #[default]
    Pending,
    Complete,
    Critical,
}

impl InspectionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Critical => "Critical",
        }
    }
}

/// Per-status counts over the results of one inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckTally {
    pub reviewed: usize,
    pub passed: usize,
    pub failed: usize,
    pub unchecked: usize,
}

impl CheckTally {
    pub fn from_checks<I>(checks: I) -> Self
    where
        I: IntoIterator<Item = ItemCheck>,
    {
        checks
            .into_iter()
            .fold(Self::default(), |mut tally, check| {
                tally.reviewed += 1;
                match check {
                    ItemCheck::Pass => tally.passed += 1,
                    ItemCheck::Fail => tally.failed += 1,
                    ItemCheck::Unchecked => tally.unchecked += 1,
                }
                tally
            })
    }

    /// A single missing item makes the whole inspection critical.
    pub fn status(&self) -> InspectionStatus {
        if self.reviewed == 0 {
            InspectionStatus::Pending
        } else if self.failed > 0 {
            InspectionStatus::Critical
        } else if self.passed == self.reviewed {
            InspectionStatus::Complete
        } else {
            InspectionStatus::Pending
        }
    }
}

/// Classify one inspection from the multiset of its item checks.
///
/// Coverage against the vehicle's item catalog is not considered: an
/// inspection that recorded a single passing item is `Complete`.
pub fn classify<I>(checks: I) -> InspectionStatus
where
    I: IntoIterator<Item = ItemCheck>,
{
    CheckTally::from_checks(checks).status()
}
