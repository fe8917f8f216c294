use std::io::Cursor;

use rocket::http::ContentType;
use rocket::http::Status;
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

use crate::error::RosterError;

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub type_uri: String,
    pub title: String,

    pub detail: Option<String>,
    pub instance_uri: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            type_uri: "about:blank".to_string(),
            title: "Problem".to_string(),
            detail: None,
            instance_uri: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            type_uri: "about:blank".to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert<V: Serialize>(&mut self, key: impl ToString, value: V) -> &mut Problem {
        // Values that can't be represented in JSON are left out of the body.
        if let Ok(value) = serde_json::to_value(value) {
            self.body.insert(key.to_string(), value);
        }
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn to_json(&self) -> Map<String, Value> {
        let mut body = self.body.clone();

        // Following are required by rfc7807
        body.insert(String::from("type"), Value::from(self.type_uri.clone()));
        body.insert(String::from("title"), Value::from(self.title.clone()));
        body.insert(String::from("status"), Value::from(self.status.code));

        // Optional parameters as specified by rfc7807
        if let Some(detail) = &self.detail {
            body.insert(String::from("detail"), Value::from(detail.clone()));
        }
        if let Some(instance) = &self.instance_uri {
            body.insert(String::from("instance"), Value::from(instance.clone()));
        }

        body
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let body_string = Value::Object(self.to_json()).to_string();

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header("Content-Language", "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn parse_problem() -> Problem {
        Problem::new_untyped(
            Status::BadRequest,
            "There was a problem parsing part of the request.",
        )
    }
}

impl From<RosterError> for Problem {
    fn from(e: RosterError) -> Self {
        let detail = e.to_string();

        match e {
            RosterError::EmptyName => {
                Problem::new_untyped(Status::BadRequest, "Bad class name.")
                    .detail(detail)
                    .to_owned()
            }
            RosterError::DuplicateName(name) => {
                Problem::new_untyped(Status::Conflict, "Class already exists.")
                    .insert_str("name", name)
                    .detail(detail)
                    .to_owned()
            }
            RosterError::DuplicateStudentId(student) => {
                Problem::new_untyped(Status::BadRequest, "Bad student list.")
                    .insert("student", student)
                    .detail(detail)
                    .to_owned()
            }
            RosterError::StudentIdsExhausted(_) => {
                Problem::new_untyped(Status::Conflict, "Class is full.")
                    .detail(detail)
                    .to_owned()
            }
            RosterError::NotFound(_) => {
                Problem::new_untyped(Status::NotFound, "Not found.")
                    .detail(detail)
                    .to_owned()
            }
            RosterError::PermissionDenied(_) => {
                Problem::new_untyped(Status::Forbidden, "Document store denied access.")
                    .detail(detail)
                    .to_owned()
            }
            RosterError::StoreUnavailable(_) => Problem::new_untyped(
                Status::ServiceUnavailable,
                "Server was unable to access the document store.",
            )
            .detail(detail)
            .to_owned(),
            RosterError::InvalidClipPosition(_)
            | RosterError::InvalidDocument(_)
            | RosterError::Encode(_) => Problem::new_untyped(
                Status::InternalServerError,
                "There was a problem with handling stored class data.",
            )
            .detail(detail)
            .to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_errors_map_to_statuses() {
        let cases = vec![
            (RosterError::EmptyName, Status::BadRequest),
            (RosterError::DuplicateName("A".to_string()), Status::Conflict),
            (RosterError::NotFound("x".to_string()), Status::NotFound),
            (RosterError::PermissionDenied("x".to_string()), Status::Forbidden),
            (
                RosterError::StoreUnavailable("x".to_string()),
                Status::ServiceUnavailable,
            ),
            (RosterError::InvalidClipPosition(9), Status::InternalServerError),
            (
                RosterError::DuplicateStudentId(crate::data::class::StudentId(1)),
                Status::BadRequest,
            ),
            (RosterError::StudentIdsExhausted("A".to_string()), Status::Conflict),
        ];

        for (error, status) in cases {
            assert_eq!(Problem::from(error).status, status);
        }
    }

    #[test]
    fn json_carries_rfc7807_members() {
        let problem = Problem::from(RosterError::DuplicateName("Room 4".to_string()));
        let json = problem.to_json();

        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["title"], "Class already exists.");
        assert_eq!(json["status"], 409);
        assert_eq!(json["name"], "Room 4");
        assert!(json.contains_key("detail"));
        assert!(!json.contains_key("instance"));
    }
}
