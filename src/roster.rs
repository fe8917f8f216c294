//! Class and student persistence.
//!
//! Every student change is a read-modify-write of the whole class document.
//! Two clients editing the same class concurrently both succeed and the later
//! write silently wins. [`Roster::save_students`] is the single place that
//! writes a student list, so a versioned write could replace it later without
//! touching callers.

use std::collections::HashSet;

use bson::{Bson, Document};

use crate::data::class::{
    Class, ClassDocument, ClassId, ClassSummary, Student, StudentId, StudentPatch,
    CLASS_COLLECTION_NAME,
};
use crate::error::{RosterError, RosterResult};
use crate::store::DocumentStore;
use crate::util;

/// Proof that an irreversible deletion was confirmed by the user.
#[derive(Debug, Clone, Copy)]
pub struct Confirmation(());

impl Confirmation {
    pub fn confirmed() -> Confirmation {
        Confirmation(())
    }

    pub fn from_flag(confirm: bool) -> Option<Confirmation> {
        if confirm {
            Some(Confirmation(()))
        } else {
            None
        }
    }
}

pub struct Roster<S> {
    store: S,
    collection: String,
    /// Class list as of the last listing, plus classes created or opened
    /// since. May be stale relative to other clients.
    classes: Vec<ClassSummary>,
}

impl<S: DocumentStore> Roster<S> {
    pub fn new(store: S) -> Roster<S> {
        Roster::with_collection(store, CLASS_COLLECTION_NAME)
    }

    pub fn with_collection(store: S, collection: impl Into<String>) -> Roster<S> {
        Roster {
            store,
            collection: collection.into(),
            classes: vec![],
        }
    }

    pub fn classes(&self) -> &[ClassSummary] {
        &self.classes
    }

    pub fn class_name(&self, id: &ClassId) -> Option<&str> {
        self.classes
            .iter()
            .find(|c| &c.id == id)
            .map(|c| c.name.as_str())
    }

    /// Fetches every class. The mirror is only replaced when the listing
    /// succeeds.
    pub async fn list_classes(&mut self) -> RosterResult<Vec<Class>> {
        let documents = self.store.get_all(&self.collection).await?;

        let mut classes = Vec::with_capacity(documents.len());
        for (key, document) in documents {
            match bson::from_document::<ClassDocument>(document) {
                Ok(doc) => classes.push(Class::from_document(ClassId::new(key), doc)),
                Err(err) => {
                    tracing::warn!("Unable to deserialize class document '{}': {}", key, err)
                }
            }
        }

        self.classes = classes.iter().map(Class::summary).collect();
        tracing::debug!("Listed {} classes.", classes.len());

        Ok(classes)
    }

    /// Creates an empty class. Name checks run against the mirror only and
    /// happen before anything is sent to the store.
    pub async fn create_class(&mut self, name: &str) -> RosterResult<Class> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }

        if self.classes.iter().any(|c| util::same_name(&c.name, name)) {
            return Err(RosterError::DuplicateName(name.to_string()));
        }

        let doc = ClassDocument::new(name);
        let key = self
            .store
            .add(&self.collection, bson::to_document(&doc)?)
            .await?;

        let class = Class::from_document(ClassId::new(key), doc);
        tracing::info!("Created class '{}' ({}).", class.name, class.id);
        self.classes.push(class.summary());

        Ok(class)
    }

    /// Removes the class document together with every student in it.
    pub async fn delete_class(&mut self, id: &ClassId, _: Confirmation) -> RosterResult<()> {
        self.store.delete(&self.collection, id.as_str()).await?;

        let listed = self.classes.len();
        self.classes.retain(|c| &c.id != id);
        if self.classes.len() < listed {
            tracing::info!("Deleted class {}.", id);
        } else {
            tracing::debug!("Class {} wasn't in the class list, nothing deleted.", id);
        }
        Ok(())
    }

    /// Reads the students of a class. A class without a document is created
    /// on the spot with a single placeholder student.
    pub async fn load_students(&mut self, id: &ClassId) -> RosterResult<Vec<Student>> {
        let doc = match self.read_document(id).await? {
            Some(doc) => doc,
            None => {
                let doc = ClassDocument::seeded(id.as_str());
                self.write_document(id, &doc).await?;
                tracing::info!("Seeded missing class {}.", id);
                doc
            }
        };

        if self.class_name(id).is_none() {
            self.classes.push(ClassSummary {
                id: id.clone(),
                name: doc.name.clone(),
            });
        }

        Ok(doc.students)
    }

    /// Replaces the whole student list of a class in one write. Lists with a
    /// repeated student id are rejected before the store is touched.
    pub async fn save_students(&self, id: &ClassId, students: &[Student]) -> RosterResult<()> {
        let mut seen = HashSet::with_capacity(students.len());
        if let Some(repeated) = students.iter().find(|s| !seen.insert(s.id)) {
            return Err(RosterError::DuplicateStudentId(repeated.id));
        }

        let mut doc = self.document_or_new(id).await?;
        doc.students = students.to_vec();
        self.write_document(id, &doc).await
    }

    pub async fn add_student(
        &self,
        id: &ClassId,
        students: &[Student],
    ) -> RosterResult<Vec<Student>> {
        let mut doc = self.document_or_new(id).await?;
        let student_id = doc
            .allocate_student_id()
            .ok_or_else(|| RosterError::StudentIdsExhausted(id.to_string()))?;

        let mut updated = students.to_vec();
        updated.push(Student::new(student_id));
        doc.students = updated.clone();
        self.write_document(id, &doc).await?;

        tracing::debug!("Added student {} to class {}.", student_id, id);
        Ok(updated)
    }

    /// Filters out the student with `student_id`. Remaining ids are kept as
    /// they are. An unknown id leaves the list unchanged.
    pub async fn delete_student(
        &self,
        id: &ClassId,
        students: &[Student],
        student_id: StudentId,
    ) -> RosterResult<Vec<Student>> {
        let updated: Vec<Student> = students
            .iter()
            .filter(|s| s.id != student_id)
            .cloned()
            .collect();

        self.save_students(id, &updated).await?;
        Ok(updated)
    }

    pub async fn delete_all_students(&self, id: &ClassId) -> RosterResult<Vec<Student>> {
        self.store
            .update_field(&self.collection, id.as_str(), "students", Bson::Array(vec![]))
            .await?;
        tracing::info!("Deleted all students of class {}.", id);
        Ok(vec![])
    }

    pub async fn update_student(
        &self,
        id: &ClassId,
        students: &[Student],
        student_id: StudentId,
        patch: &StudentPatch,
    ) -> RosterResult<Vec<Student>> {
        let mut updated = students.to_vec();
        let student = updated
            .iter_mut()
            .find(|s| s.id == student_id)
            .ok_or_else(|| RosterError::NotFound(format!("student {} in class {}", student_id, id)))?;
        patch.apply(student);

        self.save_students(id, &updated).await?;
        Ok(updated)
    }

    pub(crate) async fn read_document(&self, id: &ClassId) -> RosterResult<Option<ClassDocument>> {
        match self.store.get(&self.collection, id.as_str()).await? {
            Some(document) => Ok(Some(bson::from_document(document)?)),
            None => Ok(None),
        }
    }

    async fn document_or_new(&self, id: &ClassId) -> RosterResult<ClassDocument> {
        Ok(self
            .read_document(id)
            .await?
            .unwrap_or_else(|| ClassDocument::new(id.as_str())))
    }

    async fn write_document(&self, id: &ClassId, doc: &ClassDocument) -> RosterResult<()> {
        let document: Document = bson::to_document(doc)?;
        self.store
            .set(&self.collection, id.as_str(), document)
            .await?;
        Ok(())
    }
}
