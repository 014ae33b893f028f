//! Thesis processes (`proceso_tesis`) and their stage workflow.
//!
//! A process starts at [`ProcessStage::Enrollment`] and moves forward one
//! stage at a time until [`ProcessStage::Finalized`]. Reaching the last stage
//! closes the process: its general status becomes `finalizado` and the end
//! date is stamped.

use super::validate;
use crate::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum! {
    /// Overall state of a process.
    ProcessStatus {
        /// Ongoing.
        InProcess => "en_proceso",
        /// Temporarily stopped.
        Paused => "pausado",
        /// Completed.
        Finalized => "finalizado",
        /// Abandoned.
        Cancelled => "cancelado",
    }
}

impl Default for ProcessStatus {
    fn default() -> Self {
        Self::InProcess
    }
}

impl ProcessStatus {
    /// Whether the process can no longer change stage.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Finalized | Self::Cancelled)
    }
}

text_enum! {
    /// Workflow stages, in order.
    ProcessStage {
        /// Thesis plan registration.
        Enrollment => "inscripcion",
        /// Plagiarism check.
        Turnitin => "turnitin",
        /// Student cleared for defense.
        Cleared => "expedito",
        /// Jury appointment.
        JuryAssignment => "designacion_jurados",
        /// Public defense.
        PublicDefense => "acto_publico",
        /// Repository deposit.
        Cybertesis => "cybertesis",
        /// Degree conferral.
        DegreeGranting => "otorgamiento_grado",
        /// National registry diploma.
        SuneduDiploma => "diploma_sunedu",
        /// Done.
        Finalized => "finalizado",
    }
}

impl Default for ProcessStage {
    fn default() -> Self {
        Self::Enrollment
    }
}

impl ProcessStage {
    /// The stage that follows, or `None` at the end of the workflow.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Enrollment => Some(Self::Turnitin),
            Self::Turnitin => Some(Self::Cleared),
            Self::Cleared => Some(Self::JuryAssignment),
            Self::JuryAssignment => Some(Self::PublicDefense),
            Self::PublicDefense => Some(Self::Cybertesis),
            Self::Cybertesis => Some(Self::DegreeGranting),
            Self::DegreeGranting => Some(Self::SuneduDiploma),
            Self::SuneduDiploma => Some(Self::Finalized),
            Self::Finalized => None,
        }
    }

    /// URL segment of the stage's router.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::JuryAssignment => "designacion_de_jurados",
            Self::DegreeGranting => "otorgamiento",
            other => other.as_str(),
        }
    }

    /// Position in the workflow, starting at 0.
    #[must_use]
    pub fn position(self) -> usize {
        Self::ALL.iter().position(|s| *s == self).unwrap_or_default()
    }
}

/// Stored thesis process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThesisProcess {
    /// Primary key.
    pub id: i64,
    /// Student enrollment the thesis belongs to.
    pub enrollment_id: i64,
    /// Advising teacher.
    pub advisor_id: i64,
    /// Working title.
    pub thesis_title: Option<String>,
    /// Overall state.
    pub general_status: ProcessStatus,
    /// Current workflow stage.
    pub current_stage: ProcessStage,
    /// Start time.
    pub start_date: DateTime<Utc>,
    /// Completion time.
    pub end_date: Option<DateTime<Utc>>,
}

impl ThesisProcess {
    /// Move to the next stage.
    ///
    /// # Errors
    ///
    /// Fails if the process is paused, closed or already at the last stage.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<ProcessStage, AppError> {
        if self.general_status == ProcessStatus::Paused {
            return Err(AppError::application(format!(
                "Process {} is paused and cannot advance",
                self.id
            )));
        }
        if self.general_status.is_closed() {
            return Err(AppError::application(format!(
                "Process {} is {} and cannot advance",
                self.id, self.general_status
            )));
        }
        let Some(next) = self.current_stage.next() else {
            return Err(AppError::application(format!(
                "Process {} is already at the last stage",
                self.id
            )));
        };
        self.enter_stage(next, now);
        Ok(next)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the payload is invalid.
    pub fn apply(&mut self, update: &UpdateProcess, now: DateTime<Utc>) -> Result<(), AppError> {
        update.validate()?;
        if let Some(title) = &update.thesis_title {
            self.thesis_title = Some(title.clone());
        }
        if let Some(status) = update.general_status {
            self.general_status = status;
            if status == ProcessStatus::Finalized && self.end_date.is_none() {
                self.end_date = Some(now);
            }
        }
        if let Some(stage) = update.current_stage {
            self.enter_stage(stage, now);
        }
        Ok(())
    }

    fn enter_stage(&mut self, stage: ProcessStage, now: DateTime<Utc>) {
        self.current_stage = stage;
        if stage == ProcessStage::Finalized {
            self.general_status = ProcessStatus::Finalized;
            self.end_date.get_or_insert(now);
        }
    }
}

/// Payload for opening a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProcess {
    /// Student enrollment.
    pub enrollment_id: i64,
    /// Advising teacher.
    pub advisor_id: i64,
    /// Working title.
    pub thesis_title: String,
}

impl NewProcess {
    /// Check ids and title.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::positive("enrollment_id", self.enrollment_id)?;
        validate::positive("advisor_id", self.advisor_id)?;
        validate::length("thesis_title", self.thesis_title.trim(), 1, 1000)
    }
}

/// Partial update of a process. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProcess {
    /// Working title.
    pub thesis_title: Option<String>,
    /// Overall state.
    pub general_status: Option<ProcessStatus>,
    /// Stage to jump to.
    pub current_stage: Option<ProcessStage>,
}

impl UpdateProcess {
    /// Check the title, if present.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the title is blank.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::optional_length("thesis_title", self.thesis_title.as_deref().map(str::trim), 1, 1000)
    }
}
