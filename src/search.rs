use serde::Serialize;
use tracing_futures::Instrument;
use utoipa::ToSchema;

use crate::data::class::{ClassId, Student};
use crate::error::RosterResult;
use crate::roster::Roster;
use crate::store::DocumentStore;
use crate::util;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub student: Student,
    pub class_id: ClassId,
    pub class_name: String,
}

/// Finds students whose name contains `query`, ignoring case.
///
/// Walks the roster's class list in order and reads every class document
/// again, one at a time. Results keep class order, then student order within
/// each class. Classes whose document has disappeared are skipped. A blank
/// query returns every student.
pub async fn search<S: DocumentStore>(
    roster: &Roster<S>,
    query: &str,
) -> RosterResult<Vec<SearchHit>> {
    let mut all = vec![];

    for class in roster.classes() {
        let doc = roster
            .read_document(&class.id)
            .instrument(tracing::debug_span!("search_fetch", class = %class.id))
            .await?;

        let doc = match doc {
            Some(doc) => doc,
            None => continue,
        };

        all.extend(doc.students.into_iter().map(|student| SearchHit {
            student,
            class_id: class.id.clone(),
            class_name: class.name.clone(),
        }));
    }

    let hits: Vec<SearchHit> = all
        .into_iter()
        .filter(|hit| util::contains_ignore_case(&hit.student.name, query))
        .collect();

    tracing::debug!("Search for '{}' matched {} students.", query, hits.len());
    Ok(hits)
}
