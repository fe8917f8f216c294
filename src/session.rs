use std::collections::HashMap;

use crate::data::class::{Class, ClassId, Student, StudentId, StudentPatch};
use crate::data::clip::ClipTransition;
use crate::error::RosterResult;
use crate::roster::{Confirmation, Roster};
use crate::search::{self, SearchHit};
use crate::store::DocumentStore;
use crate::view::ClassView;

/// State of one roster client: the roster with its class list and every
/// class view opened so far.
///
/// The HTTP layer keeps a single session behind an async mutex, so actions
/// run one after another in the order they arrive.
pub struct Session<S> {
    roster: Roster<S>,
    views: HashMap<ClassId, ClassView>,
    /// Whether the class list has been fetched from the store at least once.
    listed: bool,
}

impl<S: DocumentStore> Session<S> {
    pub fn new(roster: Roster<S>) -> Session<S> {
        Session {
            roster,
            views: HashMap::new(),
            listed: false,
        }
    }

    pub fn roster(&self) -> &Roster<S> {
        &self.roster
    }

    pub async fn list_classes(&mut self) -> RosterResult<Vec<Class>> {
        let classes = self.roster.list_classes().await?;
        self.listed = true;
        Ok(classes)
    }

    /// Name checks need the full class list, so a session that hasn't listed
    /// classes yet does that first.
    pub async fn create_class(&mut self, name: &str) -> RosterResult<Class> {
        self.ensure_listed().await?;
        self.roster.create_class(name).await
    }

    pub async fn delete_class(&mut self, id: &ClassId, confirmation: Confirmation) -> RosterResult<()> {
        self.roster.delete_class(id, confirmation).await?;
        self.views.remove(id);
        Ok(())
    }

    /// Loads a fresh snapshot of the class, replacing any open view of it.
    pub async fn open_class(&mut self, id: &ClassId) -> RosterResult<&[Student]> {
        let view = ClassView::open(&mut self.roster, id.clone()).await?;
        self.views.remove(id);
        let view = self.views.entry(id.clone()).or_insert(view);
        Ok(view.students())
    }

    pub async fn replace_students(
        &mut self,
        id: &ClassId,
        students: Vec<Student>,
    ) -> RosterResult<&[Student]> {
        let (roster, view) = self.view(id).await?;
        view.replace_students(roster, students).await?;
        Ok(view.students())
    }

    pub async fn add_student(&mut self, id: &ClassId) -> RosterResult<Student> {
        let (roster, view) = self.view(id).await?;
        view.add_student(roster).await
    }

    pub async fn update_student(
        &mut self,
        id: &ClassId,
        student: StudentId,
        patch: &StudentPatch,
    ) -> RosterResult<Student> {
        let (roster, view) = self.view(id).await?;
        view.update_student(roster, student, patch).await
    }

    pub async fn move_clip(
        &mut self,
        id: &ClassId,
        student: StudentId,
        transition: ClipTransition,
    ) -> RosterResult<Student> {
        let (roster, view) = self.view(id).await?;
        view.move_clip(roster, student, transition).await
    }

    pub async fn delete_student(
        &mut self,
        id: &ClassId,
        student: StudentId,
    ) -> RosterResult<&[Student]> {
        let (roster, view) = self.view(id).await?;
        view.delete_student(roster, student).await?;
        Ok(view.students())
    }

    pub async fn delete_all_students(&mut self, id: &ClassId) -> RosterResult<()> {
        let (roster, view) = self.view(id).await?;
        view.delete_all_students(roster).await
    }

    pub async fn search(&mut self, query: &str) -> RosterResult<Vec<SearchHit>> {
        self.ensure_listed().await?;
        search::search(&self.roster, query).await
    }

    async fn ensure_listed(&mut self) -> RosterResult<()> {
        if !self.listed {
            self.list_classes().await?;
        }
        Ok(())
    }

    /// Open view of a class, loading it first when it hasn't been opened yet.
    async fn view(&mut self, id: &ClassId) -> RosterResult<(&Roster<S>, &mut ClassView)> {
        let view = match self.views.remove(id) {
            Some(view) => view,
            None => ClassView::open(&mut self.roster, id.clone()).await?,
        };

        let Session { roster, views, .. } = self;
        let view = views.entry(id.clone()).or_insert(view);
        Ok((&*roster, view))
    }
}
