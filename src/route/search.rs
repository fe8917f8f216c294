use crate::resp::problem::Problem;
use crate::route::RosterState;
use crate::search::SearchHit;
use rocket::serde::json::Json;
use rocket::State;

/// Search students of every class by name
///
/// Every class document is read again for each search. A missing or blank
/// query returns all students.
#[utoipa::path(
    params(("q", description = "case-insensitive part of a student's name")),
    responses(
        (status = 200, description = "Matching students with their class", body = Vec<SearchHit>),
        (status = 503, description = "Document store can't be reached", body = Problem),
    )
)]
#[get("/search?<q>")]
#[tracing::instrument(skip(session))]
pub async fn student_search(
    q: Option<&str>,
    session: &State<RosterState>,
) -> Result<Json<Vec<SearchHit>>, Problem> {
    let hits = session.lock().await.search(q.unwrap_or_default()).await?;
    Ok(Json(hits))
}
