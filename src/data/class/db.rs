use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassCreateData {
    pub name: String,
}

pub mod problem {
    use crate::data::class::{ClassId, StudentId};
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn confirmation_required(what: impl ToString) -> Problem {
        Problem::new_untyped(Status::Conflict, "Confirmation required.")
            .detail(format!(
                "Deleting {} can't be undone. Repeat the request with 'confirm=true'.",
                what.to_string()
            ))
            .to_owned()
    }

    #[inline]
    pub fn student_not_found(class: &ClassId, student: StudentId) -> Problem {
        Problem::new_untyped(Status::NotFound, "Student doesn't exist.")
            .insert_str("class", class)
            .insert("student", student.0)
            .to_owned()
    }
}
