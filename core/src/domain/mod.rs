//! Domain model of the graduate-school back office.
//!
//! Entities mirror the relational schema (programs, students and their
//! program enrollments, teachers, thesis processes). Each `New*`/`Update*`
//! payload validates itself before any database work happens.

/// Declares a closed string-backed enum stored as text in the database.
///
/// Generates `as_str`, `parse` (failing with a validation error), `ALL`,
/// `Display` and serde support using the stored spelling.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stored representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parse the stored representation.
            ///
            /// # Errors
            ///
            /// Returns a validation error if the text is not a known value.
            pub fn parse(s: &str) -> Result<Self, $crate::AppError> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::AppError::validation(format!(
                        concat!("Invalid ", stringify!($name), " value: {}"),
                        other
                    ))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod process;
pub mod program;
pub mod student;
pub mod teacher;
pub mod validate;

pub use process::{NewProcess, ProcessStage, ProcessStatus, ThesisProcess, UpdateProcess};
pub use program::{NewProgram, Program, ProgramDegree, ProgramStatus};
pub use student::{
    DocumentType, Enrollment, EnrollmentStatus, NewEnrollment, NewStudent, NewStudentWithEnrollment,
    Student, StudentProfile, StudentStatus, StudentSummary, UpdateStudent,
};
pub use teacher::{AcademicDegree, NewTeacher, Teacher, TeacherStatus, UpdateTeacher};

