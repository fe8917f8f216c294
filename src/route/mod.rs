use std::collections::BTreeMap;

use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket, Route};
use tokio::sync::Mutex;

pub mod class;
pub mod search;
pub mod students;

use class::*;
use search::*;
use students::*;

use utoipa::OpenApi;

use crate::{
    data::class::{self as cd, db::problem as class_problem},
    data::clip::{ClipPosition, ClipTransition},
    resp::problem::{problems, Problem},
    roster::Confirmation,
    search::SearchHit,
    session::Session,
    store::AnyStore,
};

/// Roster session shared by every request. Requests take turns on it.
pub type RosterState = Mutex<Session<AnyStore>>;

#[derive(OpenApi)]
#[openapi(
    paths(
        class_list,
        class_create,
        class_delete,
        students_get,
        students_replace,
        student_add,
        students_delete_all,
        student_update,
        student_delete,
        student_clip,
        student_search
    ),
    components(schemas(
        cd::Class,
        cd::ClassId,
        cd::ClassSummary,
        cd::Student,
        cd::StudentId,
        cd::StudentPatch,
        cd::db::ClassCreateData,
        ClipPosition,
        ClipTransition,
        SearchHit,
        Problem
    )),
    modifiers(&V1_PREFIX)
)]
pub struct ApiDocV1;

pub struct PathPrefix(pub &'static str);
static V1_PREFIX: PathPrefix = PathPrefix("/api/v1");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

/// Turns the `confirm` query flag into a deletion confirmation.
pub(crate) fn require_confirmation(
    confirm: Option<bool>,
    what: impl ToString,
) -> Result<Confirmation, Problem> {
    Confirmation::from_flag(confirm.unwrap_or(false))
        .ok_or_else(|| class_problem::confirmation_required(what))
}

#[get("/openapi.json")]
pub fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}

#[catch(400)]
pub fn bad_request() -> Problem {
    problems::parse_problem()
}

#[catch(422)]
pub fn unprocessable() -> Problem {
    problems::parse_problem()
}

#[catch(404)]
pub fn not_found(req: &Request) -> Problem {
    Problem::new_untyped(rocket::http::Status::NotFound, "Resource doesn't exist.")
        .insert_str("path", req.uri())
        .to_owned()
}

pub fn api_v1() -> Vec<Route> {
    routes![
        class_list,
        class_create,
        class_delete,
        students_get,
        students_replace,
        student_add,
        students_delete_all,
        student_update,
        student_delete,
        student_clip,
        student_search,
        openapi
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/api/v1", api_v1())
        .register("/", catchers![bad_request, unprocessable, not_found])
}
