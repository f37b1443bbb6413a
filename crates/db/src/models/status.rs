//! Analysis status enum mapping to the `analysis_statuses` lookup table.
//!
//! Variant discriminants match the seed data order (1-based) in the
//! migration. Transitions are forward-only: pending → running →
//! {completed | failed}.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

/// Lifecycle status of an analysis job.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStatus {
    Pending = 1,
    Running = 2,
    Completed = 3,
    Failed = 4,
}

impl AnalysisStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum. `None` for unknown ids.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Running),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Caller-facing status string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Fixed progress percentage reported by the status endpoint.
    pub fn progress(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 50,
            Self::Completed => 100,
            Self::Failed => 0,
        }
    }

    /// Whether no further transitions can occur.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl From<AnalysisStatus> for StatusId {
    fn from(value: AnalysisStatus) -> Self {
        value as StatusId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_ids_match_seed_data() {
        assert_eq!(AnalysisStatus::Pending.id(), 1);
        assert_eq!(AnalysisStatus::Running.id(), 2);
        assert_eq!(AnalysisStatus::Completed.id(), 3);
        assert_eq!(AnalysisStatus::Failed.id(), 4);
    }

    #[test]
    fn from_id_round_trips() {
        for status in [
            AnalysisStatus::Pending,
            AnalysisStatus::Running,
            AnalysisStatus::Completed,
            AnalysisStatus::Failed,
        ] {
            assert_eq!(AnalysisStatus::from_id(status.id()), Some(status));
        }
        assert_eq!(AnalysisStatus::from_id(0), None);
        assert_eq!(AnalysisStatus::from_id(5), None);
    }

    #[test]
    fn progress_mapping_is_fixed() {
        assert_eq!(AnalysisStatus::Pending.progress(), 0);
        assert_eq!(AnalysisStatus::Running.progress(), 50);
        assert_eq!(AnalysisStatus::Completed.progress(), 100);
        assert_eq!(AnalysisStatus::Failed.progress(), 0);
    }

    #[test]
    fn only_completed_and_failed_are_terminal() {
        assert!(!AnalysisStatus::Pending.is_terminal());
        assert!(!AnalysisStatus::Running.is_terminal());
        assert!(AnalysisStatus::Completed.is_terminal());
        assert!(AnalysisStatus::Failed.is_terminal());
    }
}
