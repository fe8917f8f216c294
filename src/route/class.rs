use crate::data::class::db::ClassCreateData;
use crate::data::class::{Class, ClassId};
use crate::resp::problem::Problem;
use crate::route::{require_confirmation, RosterState};
use rocket::http::Status;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::State;

/// List all classes
#[utoipa::path(
    responses(
        (status = 200, description = "Every class in the roster", body = Vec<Class>),
        (status = 503, description = "Document store can't be reached", body = Problem),
    )
)]
#[get("/classes")]
#[tracing::instrument(skip(session))]
pub async fn class_list(session: &State<RosterState>) -> Result<Json<Vec<Class>>, Problem> {
    let classes = session.lock().await.list_classes().await?;
    Ok(Json(classes))
}

/// Create a class
#[utoipa::path(
    request_body = ClassCreateData,
    responses(
        (status = 201, description = "Created class", body = Class),
        (status = 400, description = "Blank class name", body = Problem),
        (status = 409, description = "A class with the same name already exists", body = Problem),
    )
)]
#[post("/classes", format = "json", data = "<class>")]
#[tracing::instrument(skip(session))]
pub async fn class_create(
    class: Json<ClassCreateData>,
    session: &State<RosterState>,
) -> Result<Created<Json<Class>>, Problem> {
    let class = session.lock().await.create_class(&class.name).await?;
    Ok(Created::new(format!("/api/v1/classes/{}", class.id)).body(Json(class)))
}

/// Delete a class with all of its students
#[utoipa::path(
    params(
        ("id", description = "class ID"),
        ("confirm", description = "must be true, deletion can't be undone")
    ),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 409, description = "Deletion wasn't confirmed", body = Problem),
    )
)]
#[delete("/classes/<id>?<confirm>")]
#[tracing::instrument(skip(session))]
pub async fn class_delete(
    id: ClassId,
    confirm: Option<bool>,
    session: &State<RosterState>,
) -> Result<Status, Problem> {
    let confirmation = require_confirmation(confirm, format!("class {}", id))?;
    session.lock().await.delete_class(&id, confirmation).await?;
    Ok(Status::NoContent)
}
