//! Valid payloads, parameterised by the fields that must be unique.

use posgrado_core::domain::{
    AcademicDegree, DocumentType, EnrollmentStatus, NewEnrollment, NewProcess, NewProgram,
    NewStudent, NewStudentWithEnrollment, NewTeacher, ProgramDegree, ProgramStatus, StudentStatus,
    TeacherStatus,
};

/// A doctor teacher with the given 8-digit dni.
#[must_use]
pub fn teacher(dni: &str) -> NewTeacher {
    NewTeacher {
        dni: dni.to_string(),
        name: "Rosa".to_string(),
        paternal_surname: "Mendoza".to_string(),
        maternal_surname: "Salas".to_string(),
        academic_degree: AcademicDegree::Doctorate,
        status: TeacherStatus::Active,
        academic_email: Some(format!("rmendoza{dni}@unmsm.edu.pe")),
        personal_email: None,
        phone: Some("912345678".to_string()),
    }
}

/// An active master's program.
#[must_use]
pub fn program(name: &str) -> NewProgram {
    NewProgram {
        name: name.to_string(),
        mention: Some("Inteligencia Artificial".to_string()),
        degree: ProgramDegree::Master,
        status: ProgramStatus::Active,
    }
}

/// A student with a dni document, enrolled in `program_id`.
#[must_use]
pub fn student(program_id: i64, dni: &str, code: &str) -> NewStudentWithEnrollment {
    NewStudentWithEnrollment {
        person: NewStudent {
            name: "Carlos".to_string(),
            paternal_surname: "Vargas".to_string(),
            maternal_surname: "Llosa".to_string(),
            phone: Some("987654321".to_string()),
            academic_email: None,
            personal_email: None,
            identity_document: dni.to_string(),
            document_type: DocumentType::Dni,
            nationality: Some("Peruana".to_string()),
            status: StudentStatus::Active,
        },
        academic: NewEnrollment {
            program_id,
            code: code.to_string(),
            curriculum: Some(2018),
            status: EnrollmentStatus::Active,
            admission_year: 2023,
            graduation_year: None,
        },
    }
}

/// A thesis process for `enrollment_id` advised by `advisor_id`.
#[must_use]
pub fn process(enrollment_id: i64, advisor_id: i64) -> NewProcess {
    NewProcess {
        enrollment_id,
        advisor_id,
        thesis_title: "Modelos de lenguaje para el español andino".to_string(),
    }
}
