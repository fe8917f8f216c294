use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::clip::ClipPosition;

pub mod db;

pub const CLASS_COLLECTION_NAME: &str = "classes";

/// Store-generated key of a class document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ClassId(String);

impl ClassId {
    pub fn new(key: impl Into<String>) -> ClassId {
        ClassId(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> rocket::request::FromParam<'a> for ClassId {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        if param.trim().is_empty() {
            Err(param)
        } else {
            Ok(ClassId::new(param))
        }
    }
}

/// Sequence number of a student within its class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct StudentId(pub u32);

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: StudentId,
    #[serde(default)]
    pub name: String,
    /// URI of a locally picked picture. Never uploaded anywhere.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub clip_position: ClipPosition,
}

impl Student {
    pub fn new(id: StudentId) -> Student {
        Student {
            id,
            name: format!("Student {}", id),
            image: None,
            clip_position: ClipPosition::default(),
        }
    }
}

/// Partial change of one student. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    pub name: Option<String>,
    /// `Some(None)` clears the picture.
    #[serde(default, with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    pub clip_position: Option<ClipPosition>,
}

impl StudentPatch {
    pub fn apply(&self, student: &mut Student) {
        if let Some(name) = &self.name {
            student.name = name.clone();
        }
        if let Some(image) = &self.image {
            student.image = image.clone();
        }
        if let Some(position) = self.clip_position {
            student.clip_position = position;
        }
    }
}

mod double_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Option<String>>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Option<String>>, D::Error> {
        Option::<String>::deserialize(d).map(Some)
    }
}

/// Shape of a document in the class collection.
///
/// Older documents carry no `nextStudentId`; for them the counter falls back
/// to one past the highest id present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub next_student_id: u32,
}

impl ClassDocument {
    pub fn new(name: impl Into<String>) -> ClassDocument {
        ClassDocument {
            name: name.into(),
            students: vec![],
            next_student_id: 1,
        }
    }

    /// Document written the first time a class is opened without existing.
    pub fn seeded(name: impl Into<String>) -> ClassDocument {
        ClassDocument {
            name: name.into(),
            students: vec![Student::new(StudentId(1))],
            next_student_id: 2,
        }
    }

    /// `None` once the id space of the class is used up.
    pub fn next_student_id(&self) -> Option<StudentId> {
        let mut past_highest = 1;
        for student in &self.students {
            past_highest = past_highest.max(student.id.0.checked_add(1)?);
        }
        Some(StudentId(self.next_student_id.max(past_highest)))
    }

    /// Hands out the next id and advances the counter. Ids are never reused,
    /// even after the student holding one is deleted.
    pub fn allocate_student_id(&mut self) -> Option<StudentId> {
        let id = self.next_student_id()?;
        self.next_student_id = id.0.checked_add(1)?;
        Some(id)
    }
}

/// A class together with its students, as returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub students: Vec<Student>,
}

impl Class {
    pub fn from_document(id: ClassId, doc: ClassDocument) -> Class {
        Class {
            id,
            name: doc.name,
            students: doc.students,
        }
    }

    pub fn summary(&self) -> ClassSummary {
        ClassSummary {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Entry of the in-memory class list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassSummary {
    pub id: ClassId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_student_defaults() {
        let s = Student::new(StudentId(3));
        assert_eq!(s.name, "Student 3");
        assert_eq!(s.image, None);
        assert_eq!(s.clip_position, ClipPosition::GREEN);
    }

    #[test]
    fn counter_skips_deleted_ids() {
        let mut doc = ClassDocument::new("A");
        let first = doc.allocate_student_id().unwrap();
        let second = doc.allocate_student_id().unwrap();
        doc.students.push(Student::new(first));
        doc.students.push(Student::new(second));
        doc.students.retain(|s| s.id != second);

        assert_eq!(doc.allocate_student_id(), Some(StudentId(3)));
    }

    #[test]
    fn counter_stops_at_the_end_of_the_id_space() {
        let mut doc = ClassDocument::new("A");
        doc.students.push(Student::new(StudentId(u32::MAX)));
        assert_eq!(doc.next_student_id(), None);
        assert_eq!(doc.allocate_student_id(), None);
        assert_eq!(doc.next_student_id, 1);

        let mut doc = ClassDocument::new("B");
        doc.students.push(Student::new(StudentId(u32::MAX - 2)));
        assert_eq!(doc.allocate_student_id(), Some(StudentId(u32::MAX - 1)));
        assert_eq!(doc.allocate_student_id(), None);
    }

    #[test]
    fn legacy_document_counter() {
        let doc = bson::doc! {
            "students": [
                { "id": 1, "name": "Ana", "image": null, "clipPosition": 1 },
                { "id": 5, "name": "Juan", "image": null, "clipPosition": 3 },
            ]
        };
        let mut class: ClassDocument = bson::from_document(doc).unwrap();
        assert_eq!(class.name, "");
        assert_eq!(class.students[1].clip_position, ClipPosition::RED);
        assert_eq!(class.allocate_student_id(), Some(StudentId(6)));
    }

    #[test]
    fn document_field_names() {
        let mut doc = ClassDocument::seeded("Room 4");
        doc.students[0].image = Some("file:///tmp/a.png".to_string());
        let stored = bson::to_document(&doc).unwrap();

        assert_eq!(stored.get_str("name").unwrap(), "Room 4");
        assert!(matches!(
            stored.get("nextStudentId"),
            Some(bson::Bson::Int32(2)) | Some(bson::Bson::Int64(2))
        ));
        let student = stored.get_array("students").unwrap()[0]
            .as_document()
            .unwrap();
        assert_eq!(student.get_i64("clipPosition").unwrap(), 1);
        assert_eq!(student.get_str("image").unwrap(), "file:///tmp/a.png");
    }

    #[test]
    fn patch_clears_image() {
        let mut s = Student::new(StudentId(1));
        s.image = Some("file:///a.png".to_string());

        let patch: StudentPatch = serde_json::from_str(r#"{"image": null}"#).unwrap();
        patch.apply(&mut s);
        assert_eq!(s.image, None);

        let patch: StudentPatch = serde_json::from_str(r#"{"name": "Ana"}"#).unwrap();
        patch.apply(&mut s);
        assert_eq!(s.name, "Ana");
        assert_eq!(s.image, None);
    }
}
