//! Students (`estudiante`) and their program enrollments (`programa_estudiante`).

use super::{ProgramDegree, validate};
use crate::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

text_enum! {
    /// Personal record status.
    StudentStatus {
        /// Active.
        Active => "activo",
        /// Inactive.
        Inactive => "inactivo",
    }
}

impl Default for StudentStatus {
    fn default() -> Self {
        Self::Active
    }
}

text_enum! {
    /// Kind of identity document.
    DocumentType {
        /// Peruvian national id.
        Dni => "dni",
        /// Passport.
        Passport => "pasaporte",
        /// Foreign identity card.
        ForeignIdentity => "cedula_identidad",
    }
}

text_enum! {
    /// Status of a student within one program.
    EnrollmentStatus {
        /// Currently studying.
        Active => "activo",
        /// Not studying.
        Inactive => "inactivo",
        /// Finished coursework.
        Graduated => "egresado",
    }
}

impl Default for EnrollmentStatus {
    fn default() -> Self {
        Self::Active
    }
}

/// Stored student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Primary key.
    pub id: i64,
    /// Given names.
    pub name: String,
    /// Paternal surname.
    pub paternal_surname: String,
    /// Maternal surname.
    pub maternal_surname: String,
    /// Mobile phone, 9 digits.
    pub phone: Option<String>,
    /// University e-mail.
    pub academic_email: Option<String>,
    /// Personal e-mail.
    pub personal_email: Option<String>,
    /// Identity document number.
    pub identity_document: String,
    /// Identity document kind.
    pub document_type: DocumentType,
    /// Nationality.
    pub nationality: Option<String>,
    /// Record status.
    pub status: StudentStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Student {
    /// Apply the personal fields of `update` and stamp `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the payload is invalid or the resulting
    /// document does not match its type.
    pub fn apply(&mut self, update: &UpdateStudent, now: DateTime<Utc>) -> Result<(), AppError> {
        update.validate()?;
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(email) = &update.personal_email {
            self.personal_email = Some(email.clone());
        }
        if let Some(email) = &update.academic_email {
            self.academic_email = Some(email.clone());
        }
        if let Some(nationality) = &update.nationality {
            self.nationality = Some(nationality.clone());
        }
        if let Some(kind) = update.document_type {
            self.document_type = kind;
        }
        if let Some(document) = &update.identity_document {
            self.identity_document.clone_from(document);
        }
        if let Some(status) = update.status_personal {
            self.status = status;
        }
        if self.document_type == DocumentType::Dni {
            validate::digits("identity_document", &self.identity_document, 8)?;
        }
        self.updated_at = Some(now);
        Ok(())
    }
}

/// Stored enrollment of a student in a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Primary key.
    pub id: i64,
    /// Program.
    pub program_id: i64,
    /// Student.
    pub student_id: i64,
    /// Student code, 8 digits, unique.
    pub code: String,
    /// Curriculum (study plan) year.
    pub curriculum: Option<i64>,
    /// Enrollment status.
    pub status: EnrollmentStatus,
    /// Year of admission.
    pub admission_year: i64,
    /// Year of graduation.
    pub graduation_year: Option<i64>,
}

impl Enrollment {
    /// Apply the academic fields of `update`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if graduation would precede admission.
    pub fn apply(&mut self, update: &UpdateStudent) -> Result<(), AppError> {
        if let Some(curriculum) = update.curriculum {
            self.curriculum = Some(curriculum);
        }
        if let Some(year) = update.graduation_year {
            if year < self.admission_year {
                return Err(AppError::validation(
                    "graduation_year must not precede admission_year",
                ));
            }
            self.graduation_year = Some(year);
        }
        if let Some(status) = update.status_academic {
            self.status = status;
        }
        Ok(())
    }
}

/// Student together with every program enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Personal data.
    pub personal: Student,
    /// Academic data, one entry per program.
    pub academic: Vec<Enrollment>,
}

/// One row of the student listing (student joined with enrollment and program).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSummary {
    /// Student id.
    pub id: i64,
    /// Enrollment id.
    pub enrollment_id: i64,
    /// Student code.
    pub code: String,
    /// Identity document kind.
    pub document_type: DocumentType,
    /// Identity document number.
    pub identity_document: String,
    /// Given names.
    pub name: String,
    /// Paternal surname.
    pub paternal_surname: String,
    /// Maternal surname.
    pub maternal_surname: String,
    /// Program name.
    pub program_name: String,
    /// Program degree.
    pub degree: ProgramDegree,
    /// Program specialisation.
    pub mention: Option<String>,
    /// Enrollment status.
    pub status: EnrollmentStatus,
}

/// Personal part of a new student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    /// Given names.
    pub name: String,
    /// Paternal surname.
    pub paternal_surname: String,
    /// Maternal surname.
    pub maternal_surname: String,
    /// Mobile phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// University e-mail.
    #[serde(default)]
    pub academic_email: Option<String>,
    /// Personal e-mail.
    #[serde(default)]
    pub personal_email: Option<String>,
    /// Identity document number.
    pub identity_document: String,
    /// Identity document kind.
    pub document_type: DocumentType,
    /// Nationality.
    #[serde(default)]
    pub nationality: Option<String>,
    /// Record status, `activo` when omitted.
    #[serde(default)]
    pub status: StudentStatus,
}

impl NewStudent {
    /// Check names, contact data and document.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::length("name", &self.name, 2, 100)?;
        validate::length("paternal_surname", &self.paternal_surname, 2, 100)?;
        validate::length("maternal_surname", &self.maternal_surname, 2, 100)?;
        validate::optional_digits("phone", self.phone.as_deref(), 9)?;
        validate::optional_email("academic_email", self.academic_email.as_deref())?;
        validate::optional_email("personal_email", self.personal_email.as_deref())?;
        validate::optional_length("nationality", self.nationality.as_deref(), 1, 100)?;
        match self.document_type {
            DocumentType::Dni => validate::digits("identity_document", &self.identity_document, 8),
            DocumentType::Passport | DocumentType::ForeignIdentity => {
                validate::length("identity_document", &self.identity_document, 1, 20)
            }
        }
    }
}

/// Academic part of a new student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEnrollment {
    /// Program to enroll in.
    pub program_id: i64,
    /// Student code, 8 digits.
    pub code: String,
    /// Curriculum year.
    #[serde(default)]
    pub curriculum: Option<i64>,
    /// Enrollment status, `activo` when omitted.
    #[serde(default)]
    pub status: EnrollmentStatus,
    /// Year of admission.
    pub admission_year: i64,
    /// Year of graduation.
    #[serde(default)]
    pub graduation_year: Option<i64>,
}

impl NewEnrollment {
    /// Check ids, code and years.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::positive("program_id", self.program_id)?;
        validate::digits("code", &self.code, 8)?;
        if let Some(graduation) = self.graduation_year {
            if graduation < self.admission_year {
                return Err(AppError::validation(
                    "graduation_year must not precede admission_year",
                ));
            }
        }
        Ok(())
    }
}

/// Creation payload: personal data plus the first enrollment, stored atomically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudentWithEnrollment {
    /// Personal data.
    pub person: NewStudent,
    /// First enrollment.
    pub academic: NewEnrollment,
}

impl NewStudentWithEnrollment {
    /// Validate both parts.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> Result<(), AppError> {
        self.person.validate()?;
        self.academic.validate()
    }
}

/// Partial update of a student and, optionally, one of their enrollments.
///
/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateStudent {
    /// Mobile phone.
    pub phone: Option<String>,
    /// Personal e-mail.
    pub personal_email: Option<String>,
    /// University e-mail.
    pub academic_email: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
    /// Identity document kind.
    pub document_type: Option<DocumentType>,
    /// Identity document number.
    pub identity_document: Option<String>,
    /// Personal record status.
    pub status_personal: Option<StudentStatus>,
    /// Enrollment the academic fields apply to; the most recent one when absent.
    pub enrollment_id: Option<i64>,
    /// Curriculum year.
    pub curriculum: Option<i64>,
    /// Year of graduation.
    pub graduation_year: Option<i64>,
    /// Enrollment status.
    pub status_academic: Option<EnrollmentStatus>,
}

impl UpdateStudent {
    /// Check the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::optional_digits("phone", self.phone.as_deref(), 9)?;
        validate::optional_email("academic_email", self.academic_email.as_deref())?;
        validate::optional_email("personal_email", self.personal_email.as_deref())?;
        validate::optional_length("nationality", self.nationality.as_deref(), 1, 100)?;
        validate::optional_length("identity_document", self.identity_document.as_deref(), 1, 20)?;
        if self.document_type == Some(DocumentType::Dni) {
            validate::optional_digits("identity_document", self.identity_document.as_deref(), 8)?;
        }
        Ok(())
    }

    /// Whether any academic field is set.
    #[must_use]
    pub const fn touches_enrollment(&self) -> bool {
        self.curriculum.is_some() || self.graduation_year.is_some() || self.status_academic.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn payload() -> NewStudentWithEnrollment {
        serde_json::from_value(serde_json::json!({
            "person": {
                "name": "Ana",
                "paternal_surname": "Quispe",
                "maternal_surname": "Huamán",
                "identity_document": "45678912",
                "document_type": "dni",
                "phone": "987654321"
            },
            "academic": {
                "program_id": 1,
                "code": "20231234",
                "admission_year": 2023
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_valid_payload_with_defaults() {
        let p = payload();
        assert!(p.validate().is_ok());
        assert_eq!(p.person.status, StudentStatus::Active);
        assert_eq!(p.academic.status, EnrollmentStatus::Active);
    }

    #[test]
    fn test_code_must_be_eight_digits() {
        let mut p = payload();
        p.academic.code = "2023123".to_string();
        assert_eq!(p.validate().unwrap_err().kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_dni_must_be_eight_digits() {
        let mut p = payload();
        p.person.identity_document = "AB123".to_string();
        assert!(p.validate().is_err());

        p.person.document_type = DocumentType::Passport;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_graduation_before_admission_is_rejected() {
        let mut p = payload();
        p.academic.graduation_year = Some(2020);
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_update_touches_enrollment() {
        let update: UpdateStudent =
            serde_json::from_str(r#"{"status_academic": "egresado"}"#).unwrap();
        assert!(update.touches_enrollment());
        assert!(update.validate().is_ok());
        assert!(!UpdateStudent::default().touches_enrollment());
    }

    #[test]
    fn test_switching_to_dni_revalidates_document() {
        let mut student = Student {
            id: 3,
            name: "Ana".to_string(),
            paternal_surname: "Quispe".to_string(),
            maternal_surname: "Huamán".to_string(),
            phone: None,
            academic_email: None,
            personal_email: None,
            identity_document: "P1234567X".to_string(),
            document_type: DocumentType::Passport,
            nationality: Some("Chilena".to_string()),
            status: StudentStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };

        let to_dni = UpdateStudent {
            document_type: Some(DocumentType::Dni),
            ..UpdateStudent::default()
        };
        assert!(student.clone().apply(&to_dni, Utc::now()).is_err());

        let with_number = UpdateStudent {
            identity_document: Some("45678912".to_string()),
            ..to_dni
        };
        let now = Utc::now();
        student.apply(&with_number, now).unwrap();
        assert_eq!(student.document_type, DocumentType::Dni);
        assert_eq!(student.updated_at, Some(now));
    }

    #[test]
    fn test_unknown_document_type_is_rejected() {
        assert!(DocumentType::parse("licencia").is_err());
        assert_eq!(DocumentType::parse("cedula_identidad").unwrap(), DocumentType::ForeignIdentity);
    }
}
