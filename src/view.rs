use crate::data::class::{ClassId, Student, StudentId, StudentPatch};
use crate::data::clip::{ClipPosition, ClipTransition};
use crate::error::{RosterError, RosterResult};
use crate::roster::Roster;
use crate::store::DocumentStore;

/// Local copy of one class's students, as shown to the user.
///
/// Changes are computed on a scratch copy and written through the roster.
/// The visible list is only swapped for the scratch copy once the write went
/// through; a failed write leaves it exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassView {
    class_id: ClassId,
    students: Vec<Student>,
}

impl ClassView {
    pub async fn open<S: DocumentStore>(
        roster: &mut Roster<S>,
        class_id: ClassId,
    ) -> RosterResult<ClassView> {
        let students = roster.load_students(&class_id).await?;
        Ok(ClassView { class_id, students })
    }

    pub fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub async fn reload<S: DocumentStore>(&mut self, roster: &mut Roster<S>) -> RosterResult<()> {
        self.students = roster.load_students(&self.class_id).await?;
        Ok(())
    }

    pub async fn replace_students<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        students: Vec<Student>,
    ) -> RosterResult<()> {
        roster.save_students(&self.class_id, &students).await?;
        self.students = students;
        Ok(())
    }

    /// Returns the newly added student.
    pub async fn add_student<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
    ) -> RosterResult<Student> {
        let scratch = roster.add_student(&self.class_id, &self.students).await?;
        self.students = scratch;
        self.students
            .last()
            .cloned()
            .ok_or_else(|| RosterError::NotFound(format!("new student in class {}", self.class_id)))
    }

    pub async fn delete_student<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
    ) -> RosterResult<()> {
        self.students = roster
            .delete_student(&self.class_id, &self.students, id)
            .await?;
        Ok(())
    }

    pub async fn delete_all_students<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
    ) -> RosterResult<()> {
        self.students = roster.delete_all_students(&self.class_id).await?;
        Ok(())
    }

    pub async fn update_student<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
        patch: &StudentPatch,
    ) -> RosterResult<Student> {
        let scratch = roster
            .update_student(&self.class_id, &self.students, id, patch)
            .await?;
        self.students = scratch;
        self.require(id).cloned()
    }

    pub async fn rename_student<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
        name: impl Into<String>,
    ) -> RosterResult<Student> {
        let patch = StudentPatch {
            name: Some(name.into()),
            ..Default::default()
        };
        self.update_student(roster, id, &patch).await
    }

    pub async fn set_image<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
        image: Option<String>,
    ) -> RosterResult<Student> {
        let patch = StudentPatch {
            image: Some(image),
            ..Default::default()
        };
        self.update_student(roster, id, &patch).await
    }

    /// Moves the student's clip and persists it. Moves that don't change the
    /// position (already at a boundary, or resetting a student that is on
    /// green) skip the write.
    pub async fn move_clip<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
        transition: ClipTransition,
    ) -> RosterResult<Student> {
        let current = self.require(id)?;
        let position: ClipPosition = current.clip_position.apply(transition);
        if position == current.clip_position {
            return Ok(current.clone());
        }

        let patch = StudentPatch {
            clip_position: Some(position),
            ..Default::default()
        };
        let student = self.update_student(roster, id, &patch).await?;
        tracing::debug!(
            "Student {} of class {} moved to {}.",
            id,
            self.class_id,
            position
        );
        Ok(student)
    }

    pub async fn increase_severity<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
    ) -> RosterResult<Student> {
        self.move_clip(roster, id, ClipTransition::IncreaseSeverity)
            .await
    }

    pub async fn decrease_severity<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
    ) -> RosterResult<Student> {
        self.move_clip(roster, id, ClipTransition::DecreaseSeverity)
            .await
    }

    pub async fn reset_clip<S: DocumentStore>(
        &mut self,
        roster: &Roster<S>,
        id: StudentId,
    ) -> RosterResult<Student> {
        self.move_clip(roster, id, ClipTransition::Reset).await
    }

    fn require(&self, id: StudentId) -> RosterResult<&Student> {
        self.student(id)
            .ok_or_else(|| RosterError::NotFound(format!("student {} in class {}", id, self.class_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    async fn open() -> (Roster<MemoryStore>, MemoryStore, ClassView) {
        let store = MemoryStore::new();
        let mut roster = Roster::new(store.clone());
        let view = ClassView::open(&mut roster, ClassId::new("Room 4"))
            .await
            .unwrap();
        (roster, store, view)
    }

    #[tokio::test]
    async fn clip_moves_are_persisted() {
        let (mut roster, _, mut view) = open().await;
        let id = StudentId(1);

        let moved = view.increase_severity(&roster, id).await.unwrap();
        assert_eq!(moved.clip_position, ClipPosition::YELLOW);
        view.increase_severity(&roster, id).await.unwrap();
        view.increase_severity(&roster, id).await.unwrap();
        assert_eq!(view.student(id).unwrap().clip_position, ClipPosition::RED);

        let mut fresh = ClassView::open(&mut roster, view.class_id().clone())
            .await
            .unwrap();
        assert_eq!(fresh, view);

        let reset = fresh.reset_clip(&roster, id).await.unwrap();
        assert_eq!(reset.clip_position, ClipPosition::GREEN);
        let lowered = fresh.decrease_severity(&roster, id).await.unwrap();
        assert_eq!(lowered.clip_position, ClipPosition::PURPLE);
    }

    #[tokio::test]
    async fn saturated_move_skips_write() {
        let (roster, store, mut view) = open().await;
        let id = StudentId(1);
        view.decrease_severity(&roster, id).await.unwrap();
        let writes = store.writes();

        let same = view.decrease_severity(&roster, id).await.unwrap();
        assert_eq!(same.clip_position, ClipPosition::PURPLE);
        assert_eq!(store.writes(), writes);
    }

    #[tokio::test]
    async fn failed_write_keeps_visible_state() {
        let (roster, store, mut view) = open().await;
        let before = view.clone();

        store.set_unavailable(true);
        assert!(view.increase_severity(&roster, StudentId(1)).await.is_err());
        assert!(view.add_student(&roster).await.is_err());
        assert!(view
            .rename_student(&roster, StudentId(1), "Ana")
            .await
            .is_err());
        assert!(view.delete_all_students(&roster).await.is_err());
        assert_eq!(view, before);

        store.set_unavailable(false);
        let added = view.add_student(&roster).await.unwrap();
        assert_eq!(added.id, StudentId(2));
        assert_eq!(view.students().len(), 2);
    }

    #[tokio::test]
    async fn edits_and_deletes() {
        let (mut roster, _, mut view) = open().await;

        view.add_student(&roster).await.unwrap();
        let renamed = view
            .rename_student(&roster, StudentId(2), "Diana")
            .await
            .unwrap();
        assert_eq!(renamed.name, "Diana");
        let pictured = view
            .set_image(&roster, StudentId(2), Some("file:///diana.png".to_string()))
            .await
            .unwrap();
        assert_eq!(pictured.image.as_deref(), Some("file:///diana.png"));

        view.delete_student(&roster, StudentId(1)).await.unwrap();
        assert_eq!(view.students().len(), 1);
        assert_eq!(view.students()[0].name, "Diana");

        view.reload(&mut roster).await.unwrap();
        assert_eq!(view.students()[0].image.as_deref(), Some("file:///diana.png"));

        view.delete_all_students(&roster).await.unwrap();
        assert!(view.students().is_empty());
    }

    #[tokio::test]
    async fn unknown_student_clip_move() {
        let (roster, _, mut view) = open().await;
        assert!(matches!(
            view.increase_severity(&roster, StudentId(5)).await,
            Err(RosterError::NotFound(_))
        ));
    }
}
