use crate::data::class::db::problem as class_problem;
use crate::data::class::{ClassId, Student, StudentId, StudentPatch};
use crate::data::clip::ClipTransition;
use crate::error::RosterError;
use crate::resp::problem::Problem;
use crate::route::{require_confirmation, RosterState};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

fn student_problem(class: &ClassId, student: StudentId, e: RosterError) -> Problem {
    match e {
        RosterError::NotFound(_) => class_problem::student_not_found(class, student),
        other => Problem::from(other),
    }
}

/// Load the students of a class
///
/// A class that doesn't exist yet is created with a single placeholder
/// student.
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Students of the class", body = Vec<Student>),
    )
)]
#[get("/classes/<id>/students")]
#[tracing::instrument(skip(session))]
pub async fn students_get(
    id: ClassId,
    session: &State<RosterState>,
) -> Result<Json<Vec<Student>>, Problem> {
    let mut session = session.lock().await;
    let students = session.open_class(&id).await?;
    Ok(Json(students.to_vec()))
}

/// Replace the whole student list of a class
#[utoipa::path(
    params(("id", description = "class ID")),
    request_body = Vec<Student>,
    responses(
        (status = 200, description = "Stored students", body = Vec<Student>),
    )
)]
#[put("/classes/<id>/students", format = "json", data = "<students>")]
#[tracing::instrument(skip(session))]
pub async fn students_replace(
    id: ClassId,
    students: Json<Vec<Student>>,
    session: &State<RosterState>,
) -> Result<Json<Vec<Student>>, Problem> {
    let mut session = session.lock().await;
    let students = session.replace_students(&id, students.into_inner()).await?;
    Ok(Json(students.to_vec()))
}

/// Add a student to a class
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Added student", body = Student),
    )
)]
#[post("/classes/<id>/students")]
#[tracing::instrument(skip(session))]
pub async fn student_add(
    id: ClassId,
    session: &State<RosterState>,
) -> Result<Json<Student>, Problem> {
    let student = session.lock().await.add_student(&id).await?;
    Ok(Json(student))
}

/// Delete every student of a class
#[utoipa::path(
    params(
        ("id", description = "class ID"),
        ("confirm", description = "must be true, deletion can't be undone")
    ),
    responses(
        (status = 204, description = "Students deleted"),
        (status = 409, description = "Deletion wasn't confirmed", body = Problem),
    )
)]
#[delete("/classes/<id>/students?<confirm>")]
#[tracing::instrument(skip(session))]
pub async fn students_delete_all(
    id: ClassId,
    confirm: Option<bool>,
    session: &State<RosterState>,
) -> Result<Status, Problem> {
    require_confirmation(confirm, format!("all students of class {}", id))?;
    session.lock().await.delete_all_students(&id).await?;
    Ok(Status::NoContent)
}

/// Rename a student or change their picture
#[utoipa::path(
    params(
        ("id", description = "class ID"),
        ("student", description = "student ID within the class")
    ),
    request_body = StudentPatch,
    responses(
        (status = 200, description = "Updated student", body = Student),
        (status = 404, description = "Student doesn't exist", body = Problem),
    )
)]
#[patch("/classes/<id>/students/<student>", format = "json", data = "<patch>")]
#[tracing::instrument(skip(session))]
pub async fn student_update(
    id: ClassId,
    student: u32,
    patch: Json<StudentPatch>,
    session: &State<RosterState>,
) -> Result<Json<Student>, Problem> {
    let student = StudentId(student);
    session
        .lock()
        .await
        .update_student(&id, student, &patch)
        .await
        .map(Json)
        .map_err(|e| student_problem(&id, student, e))
}

/// Delete a single student
#[utoipa::path(
    params(
        ("id", description = "class ID"),
        ("student", description = "student ID within the class"),
        ("confirm", description = "must be true, deletion can't be undone")
    ),
    responses(
        (status = 200, description = "Remaining students", body = Vec<Student>),
        (status = 409, description = "Deletion wasn't confirmed", body = Problem),
    )
)]
#[delete("/classes/<id>/students/<student>?<confirm>")]
#[tracing::instrument(skip(session))]
pub async fn student_delete(
    id: ClassId,
    student: u32,
    confirm: Option<bool>,
    session: &State<RosterState>,
) -> Result<Json<Vec<Student>>, Problem> {
    require_confirmation(confirm, format!("student {} of class {}", student, id))?;
    let mut session = session.lock().await;
    let students = session.delete_student(&id, StudentId(student)).await?;
    Ok(Json(students.to_vec()))
}

/// Move a student's clip
#[utoipa::path(
    params(
        ("id", description = "class ID"),
        ("student", description = "student ID within the class"),
        ("transition", description = "one of 'increase', 'decrease' or 'reset'")
    ),
    responses(
        (status = 200, description = "Student with the new clip position", body = Student),
        (status = 404, description = "Student doesn't exist", body = Problem),
    )
)]
#[post("/classes/<id>/students/<student>/clip/<transition>")]
#[tracing::instrument(skip(session))]
pub async fn student_clip(
    id: ClassId,
    student: u32,
    transition: ClipTransition,
    session: &State<RosterState>,
) -> Result<Json<Student>, Problem> {
    let student = StudentId(student);
    session
        .lock()
        .await
        .move_clip(&id, student, transition)
        .await
        .map(Json)
        .map_err(|e| student_problem(&id, student, e))
}
