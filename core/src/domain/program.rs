//! Graduate programs (`programa`).

use super::validate;
use crate::AppError;
use serde::{Deserialize, Serialize};

text_enum! {
    /// Degree a program leads to.
    ProgramDegree {
        /// Master's program.
        Master => "maestria",
        /// Doctoral program.
        Doctorate => "doctorado",
    }
}

text_enum! {
    /// Whether a program is currently offered.
    ProgramStatus {
        /// Open for enrollment.
        Active => "activo",
        /// Closed.
        Inactive => "inactivo",
    }
}

impl Default for ProgramStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Stored program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Primary key.
    pub id: i64,
    /// Program name.
    pub name: String,
    /// Optional specialisation ("mención").
    pub mention: Option<String>,
    /// Degree granted.
    pub degree: ProgramDegree,
    /// Offering status.
    pub status: ProgramStatus,
}

/// Payload for creating a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProgram {
    /// Program name, 2 to 50 characters.
    pub name: String,
    /// Optional specialisation, up to 100 characters.
    #[serde(default)]
    pub mention: Option<String>,
    /// Degree granted.
    pub degree: ProgramDegree,
    /// Offering status, `activo` when omitted.
    #[serde(default)]
    pub status: ProgramStatus,
}

impl NewProgram {
    /// Check field lengths.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::length("name", &self.name, 2, 50)?;
        validate::optional_length("mention", self.mention.as_deref(), 1, 100)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_degree_round_trip_text() {
        for degree in ProgramDegree::ALL {
            assert_eq!(ProgramDegree::parse(degree.as_str()).unwrap(), *degree);
        }
        assert!(ProgramDegree::parse("licenciatura").is_err());
    }

    #[test]
    fn test_new_program_defaults_to_active() {
        let program: NewProgram =
            serde_json::from_str(r#"{"name": "Ingeniería de Sistemas", "degree": "maestria"}"#)
                .unwrap();
        assert_eq!(program.status, ProgramStatus::Active);
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_new_program_rejects_long_name() {
        let program = NewProgram {
            name: "x".repeat(51),
            mention: None,
            degree: ProgramDegree::Doctorate,
            status: ProgramStatus::Active,
        };
        let err = program.validate().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }
}
