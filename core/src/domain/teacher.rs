//! Teachers (`docente`), who act as thesis advisors.

use super::validate;
use crate::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

text_enum! {
    /// Employment status.
    TeacherStatus {
        /// Active.
        Active => "activo",
        /// Inactive.
        Inactive => "inactivo",
        /// On leave.
        OnLeave => "con_licencia",
    }
}

impl Default for TeacherStatus {
    fn default() -> Self {
        Self::Active
    }
}

text_enum! {
    /// Highest academic degree held.
    AcademicDegree {
        /// Master.
        Master => "magister",
        /// Doctor.
        Doctorate => "doctorado",
    }
}

/// Stored teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Primary key.
    pub id: i64,
    /// National id, 8 digits, unique.
    pub dni: String,
    /// Given names.
    pub name: String,
    /// Paternal surname.
    pub paternal_surname: String,
    /// Maternal surname.
    pub maternal_surname: String,
    /// University e-mail.
    pub academic_email: Option<String>,
    /// Personal e-mail.
    pub personal_email: Option<String>,
    /// Mobile phone, 9 digits.
    pub phone: Option<String>,
    /// Highest degree.
    pub academic_degree: AcademicDegree,
    /// First day of leave.
    pub license_start_date: Option<NaiveDate>,
    /// Last day of leave.
    pub license_end_date: Option<NaiveDate>,
    /// Employment status.
    pub status: TeacherStatus,
}

impl Teacher {
    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the payload is invalid or the resulting
    /// leave period ends before it starts.
    pub fn apply(&mut self, update: &UpdateTeacher) -> Result<(), AppError> {
        update.validate()?;
        if let Some(email) = &update.academic_email {
            self.academic_email = Some(email.clone());
        }
        if let Some(email) = &update.personal_email {
            self.personal_email = Some(email.clone());
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(start) = update.license_start_date {
            self.license_start_date = Some(start);
        }
        if let Some(end) = update.license_end_date {
            self.license_end_date = Some(end);
        }
        if let Some(degree) = update.academic_degree {
            self.academic_degree = degree;
        }
        if let (Some(start), Some(end)) = (self.license_start_date, self.license_end_date) {
            if end < start {
                return Err(AppError::validation(
                    "license_end_date must not precede license_start_date",
                ));
            }
        }
        Ok(())
    }
}

/// Payload for registering a teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeacher {
    /// National id.
    pub dni: String,
    /// Given names.
    pub name: String,
    /// Paternal surname.
    pub paternal_surname: String,
    /// Maternal surname.
    pub maternal_surname: String,
    /// Highest degree.
    pub academic_degree: AcademicDegree,
    /// Employment status, `activo` when omitted.
    #[serde(default)]
    pub status: TeacherStatus,
    /// University e-mail.
    #[serde(default)]
    pub academic_email: Option<String>,
    /// Personal e-mail.
    #[serde(default)]
    pub personal_email: Option<String>,
    /// Mobile phone.
    #[serde(default)]
    pub phone: Option<String>,
}

impl NewTeacher {
    /// Check dni, names and contact data.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::digits("dni", &self.dni, 8)?;
        validate::length("name", &self.name, 2, 100)?;
        validate::length("paternal_surname", &self.paternal_surname, 2, 100)?;
        validate::length("maternal_surname", &self.maternal_surname, 2, 100)?;
        validate::optional_email("academic_email", self.academic_email.as_deref())?;
        validate::optional_email("personal_email", self.personal_email.as_deref())?;
        validate::optional_digits("phone", self.phone.as_deref(), 9)
    }
}

/// Partial update of a teacher. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateTeacher {
    /// University e-mail.
    pub academic_email: Option<String>,
    /// Personal e-mail.
    pub personal_email: Option<String>,
    /// Mobile phone.
    pub phone: Option<String>,
    /// Employment status.
    pub status: Option<TeacherStatus>,
    /// First day of leave.
    pub license_start_date: Option<NaiveDate>,
    /// Last day of leave.
    pub license_end_date: Option<NaiveDate>,
    /// Highest degree.
    pub academic_degree: Option<AcademicDegree>,
}

impl UpdateTeacher {
    /// Check the fields that are present, and that a leave period is ordered.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        validate::optional_email("academic_email", self.academic_email.as_deref())?;
        validate::optional_email("personal_email", self.personal_email.as_deref())?;
        validate::optional_digits("phone", self.phone.as_deref(), 9)?;
        if let (Some(start), Some(end)) = (self.license_start_date, self.license_end_date) {
            if end < start {
                return Err(AppError::validation(
                    "license_end_date must not precede license_start_date",
                ));
            }
        }
        Ok(())
    }
}
