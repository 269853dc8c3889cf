use std::marker::PhantomData;

use super::reorder::{move_item, ReorderOutcome};
use super::{join_list_field, parse_list_field, AdminError, AdminResource, ListState};
use crate::models::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// The open create/edit form. The tag or skill list is edited as free text
/// in `list_text` and parsed on submit.
#[derive(Debug, Clone)]
pub struct EditForm<R: Record> {
    pub mode: FormMode,
    pub draft: R::Draft,
    pub list_text: String,
}

/// Confirmation step before a delete. Only [`CollectionController::request_delete`]
/// creates one; dropping it cancels.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingDelete {
    id: String,
}

impl PendingDelete {
    pub(crate) fn new(id: String) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Admin view over one collection. Mutations take `&mut self`, so a second
/// mutation cannot start while one is awaiting the server.
pub struct CollectionController<R: Record, A> {
    api: A,
    state: ListState<R>,
    form: Option<EditForm<R>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, A: AdminResource<R>> CollectionController<R, A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: ListState::Idle,
            form: None,
            _record: PhantomData,
        }
    }

    pub fn state(&self) -> &ListState<R> {
        &self.state
    }

    pub fn items(&self) -> &[R] {
        self.state.items()
    }

    pub async fn refresh(&mut self) {
        self.state = ListState::Fetching;
        self.state = ListState::from_result(self.api.list().await);
    }

    pub fn form(&self) -> Option<&EditForm<R>> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut EditForm<R>> {
        self.form.as_mut()
    }

    pub fn open_create(&mut self) -> &mut EditForm<R> {
        self.form.insert(EditForm {
            mode: FormMode::Create,
            draft: R::Draft::default(),
            list_text: String::new(),
        })
    }

    /// Opens the form pre-filled from a record of the current list.
    pub fn open_edit(&mut self, id: &str) -> Result<&mut EditForm<R>, AdminError> {
        let record = self
            .items()
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| AdminError::UnknownId(id.to_string()))?;
        let draft = record.to_draft();
        let list_text = join_list_field(R::list_field(&draft));

        Ok(self.form.insert(EditForm {
            mode: FormMode::Edit(id.to_string()),
            draft,
            list_text,
        }))
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Creates or updates from the open form. On success the form closes and
    /// the list is refetched. On failure the form stays open as typed and the
    /// list is left alone.
    pub async fn submit_form(&mut self) -> Result<R, AdminError> {
        let form = self.form.as_ref().ok_or(AdminError::NoForm)?;

        let mut draft = form.draft.clone();
        R::set_list_field(&mut draft, parse_list_field(&form.list_text));
        R::check_draft(&draft).map_err(AdminError::Invalid)?;

        let saved = match &form.mode {
            FormMode::Create => self.api.create(&draft).await?,
            FormMode::Edit(id) => self.api.update(id, &draft).await?,
        };
        tracing::info!(collection = %R::COLLECTION, id = %saved.id(), "record saved");

        self.form = None;
        self.refresh().await;
        Ok(saved)
    }

    pub fn request_delete(&self, id: &str) -> Result<PendingDelete, AdminError> {
        if self.items().iter().any(|r| r.id() == id) {
            Ok(PendingDelete::new(id.to_string()))
        } else {
            Err(AdminError::UnknownId(id.to_string()))
        }
    }

    /// Deletes on the server, then refetches. The row disappears only once
    /// the refetch shows it gone.
    pub async fn confirm_delete(&mut self, pending: PendingDelete) -> Result<(), AdminError> {
        self.api.delete(&pending.id).await?;
        tracing::info!(collection = %R::COLLECTION, id = %pending.id, "record deleted");
        self.refresh().await;
        Ok(())
    }

    /// Moves the row at `from` to the drop position `to` and persists the
    /// whole order. On failure the list keeps its last confirmed order.
    pub async fn reorder(&mut self, from: usize, to: isize) -> Result<ReorderOutcome, AdminError> {
        let Some(moved) = move_item(self.items(), from, to) else {
            return Ok(ReorderOutcome::Unchanged);
        };
        let order: Vec<String> = moved.iter().map(|r| r.id().to_string()).collect();

        self.api.reorder(&order).await?;
        self.refresh().await;
        Ok(ReorderOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::models::{TeamDraft, TeamMember, Template, TemplateDraft};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    /// In-process stand-in for the admin API with scriptable failures.
    struct FakeApi<R: Record> {
        records: Mutex<Vec<R>>,
        calls: Mutex<Vec<String>>,
        fail_mutations: bool,
        fail_list: Mutex<bool>,
    }

    impl<R: Record> FakeApi<R> {
        fn with(records: Vec<R>) -> Self {
            Self {
                records: Mutex::new(records),
                calls: Mutex::new(Vec::new()),
                fail_mutations: false,
                fail_list: Mutex::new(false),
            }
        }

        fn log(&self, call: String) -> Result<(), ClientError> {
            self.calls.lock().unwrap().push(call);
            if self.fail_mutations {
                Err(ClientError::Request("server said no".into()))
            } else {
                Ok(())
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<R: Record> AdminResource<R> for FakeApi<R> {
        async fn list(&self) -> Result<Vec<R>, ClientError> {
            if *self.fail_list.lock().unwrap() {
                return Err(ClientError::Request("list failed".into()));
            }
            Ok(self.records.lock().unwrap().clone())
        }

        async fn create(&self, draft: &R::Draft) -> Result<R, ClientError> {
            self.log("create".into())?;
            let mut records = self.records.lock().unwrap();
            let record = R::from_draft(
                format!("id-{}", records.len()),
                records.len() as i32,
                Utc::now(),
                draft.clone(),
            );
            records.push(record.clone());
            Ok(record)
        }

        async fn update(&self, id: &str, draft: &R::Draft) -> Result<R, ClientError> {
            self.log(format!("update {}", id))?;
            let mut records = self.records.lock().unwrap();
            let record = records
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or_else(|| ClientError::NotFound(id.to_string()))?;
            record.apply(draft.clone());
            Ok(record.clone())
        }

        async fn delete(&self, id: &str) -> Result<(), ClientError> {
            self.log(format!("delete {}", id))?;
            self.records.lock().unwrap().retain(|r| r.id() != id);
            Ok(())
        }

        async fn reorder(&self, order: &[String]) -> Result<(), ClientError> {
            self.log(format!("reorder {}", order.join(",")))?;
            let mut records = self.records.lock().unwrap();
            let mut reordered = Vec::new();
            for id in order {
                if let Some(r) = records.iter().find(|r| r.id() == id) {
                    reordered.push(r.clone());
                }
            }
            *records = reordered;
            Ok(())
        }
    }

    fn template(id: &str, order: i32) -> Template {
        Template::from_draft(
            id.to_string(),
            order,
            Utc::now(),
            TemplateDraft {
                title: format!("Template {}", id),
                description: "desc".into(),
                tags: vec!["react".into(), "node".into()],
                ..TemplateDraft::default()
            },
        )
    }

    fn ids<R: Record>(items: &[R]) -> Vec<&str> {
        items.iter().map(|r| r.id()).collect()
    }

    async fn ready_controller(
        records: Vec<Template>,
    ) -> CollectionController<Template, FakeApi<Template>> {
        let mut controller = CollectionController::new(FakeApi::with(records));
        controller.refresh().await;
        controller
    }

    #[tokio::test]
    async fn test_refresh_moves_idle_to_ready() {
        let mut controller = CollectionController::new(FakeApi::with(vec![template("a", 0)]));
        assert_eq!(controller.state(), &ListState::Idle);
        assert!(controller.state().is_loading());

        controller.refresh().await;
        assert_eq!(ids(controller.items()), vec!["a"]);
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn test_failed_refresh_exposes_error_and_no_items() {
        let api = FakeApi::with(vec![template("a", 0)]);
        *api.fail_list.lock().unwrap() = true;
        let mut controller = CollectionController::new(api);

        controller.refresh().await;
        assert_eq!(controller.state().error(), Some("list failed"));
        assert!(controller.items().is_empty());
        assert!(!controller.state().is_loading());
    }

    #[tokio::test]
    async fn test_open_edit_prefills_list_text() {
        let mut controller = ready_controller(vec![template("a", 0)]).await;
        let form = controller.open_edit("a").unwrap();
        assert_eq!(form.mode, FormMode::Edit("a".into()));
        assert_eq!(form.list_text, "react, node");
        assert_eq!(form.draft.title, "Template a");

        assert!(matches!(
            controller.open_edit("zzz"),
            Err(AdminError::UnknownId(_))
        ));
    }

    #[tokio::test]
    async fn test_submit_create_parses_tags_and_refetches() {
        let mut controller = ready_controller(vec![template("a", 0)]).await;
        {
            let form = controller.open_create();
            form.draft.title = "Portfolio site".into();
            form.draft.description = "Personal site".into();
            form.list_text = " html, ,css , html".into();
        }

        let created = controller.submit_form().await.unwrap();
        assert_eq!(created.tags, vec!["html", "css", "html"]);
        assert!(controller.form().is_none());
        assert_eq!(ids(controller.items()), vec!["a", "id-1"]);
    }

    #[tokio::test]
    async fn test_submit_update_uses_form_id() {
        let mut controller = ready_controller(vec![template("a", 0)]).await;
        controller.open_edit("a").unwrap().draft.title = "Renamed".into();

        controller.submit_form().await.unwrap();
        assert_eq!(controller.items()[0].title, "Renamed");
        assert_eq!(controller.api.calls(), vec!["update a"]);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_form_and_list() {
        let mut api = FakeApi::with(vec![template("a", 0)]);
        api.fail_mutations = true;
        let mut controller = CollectionController::new(api);
        controller.refresh().await;
        let before = controller.state().clone();

        controller.open_create().draft.title = "New".into();
        controller.form_mut().unwrap().draft.description = "Desc".into();
        controller.form_mut().unwrap().list_text = "a, b".into();

        let err = controller.submit_form().await.unwrap_err();
        assert!(matches!(err, AdminError::Client(ClientError::Request(_))));
        let form = controller.form().unwrap();
        assert_eq!(form.draft.title, "New");
        assert_eq!(form.list_text, "a, b");
        assert_eq!(controller.state(), &before);
    }

    #[tokio::test]
    async fn test_invalid_draft_never_reaches_api() {
        let mut controller = ready_controller(vec![]).await;
        controller.open_create().draft.title = "Only a title".into();

        let err = controller.submit_form().await.unwrap_err();
        assert!(matches!(err, AdminError::Invalid(_)));
        assert!(controller.api.calls().is_empty());
        assert!(controller.form().is_some());
    }

    #[tokio::test]
    async fn test_submit_without_form() {
        let mut controller = ready_controller(vec![]).await;
        assert!(matches!(
            controller.submit_form().await,
            Err(AdminError::NoForm)
        ));
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let mut controller = ready_controller(vec![template("a", 0), template("b", 1)]).await;

        let pending = controller.request_delete("a").unwrap();
        assert_eq!(pending.id(), "a");
        // Requesting alone changes nothing.
        assert_eq!(ids(controller.items()), vec!["a", "b"]);
        assert!(controller.api.calls().is_empty());

        controller.confirm_delete(pending).await.unwrap();
        assert_eq!(ids(controller.items()), vec!["b"]);
        assert!(controller.request_delete("a").is_err());
    }

    #[tokio::test]
    async fn test_dropped_pending_delete_cancels() {
        let controller = ready_controller(vec![template("a", 0)]).await;
        drop(controller.request_delete("a").unwrap());
        assert!(controller.api.calls().is_empty());
        assert_eq!(ids(controller.items()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_row() {
        let mut api = FakeApi::with(vec![template("a", 0)]);
        api.fail_mutations = true;
        let mut controller = CollectionController::new(api);
        controller.refresh().await;

        let pending = controller.request_delete("a").unwrap();
        assert!(controller.confirm_delete(pending).await.is_err());
        assert_eq!(ids(controller.items()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_reorder_sends_full_permutation() {
        let records = vec![
            template("A", 0),
            template("B", 1),
            template("C", 2),
            template("D", 3),
        ];
        let mut controller = ready_controller(records).await;

        let outcome = controller.reorder(0, 2).await.unwrap();
        assert_eq!(outcome, ReorderOutcome::Applied);
        assert_eq!(controller.api.calls(), vec!["reorder B,C,A,D"]);
        assert_eq!(ids(controller.items()), vec!["B", "C", "A", "D"]);
    }

    #[tokio::test]
    async fn test_noop_reorder_sends_nothing() {
        let mut controller = ready_controller(vec![template("A", 0), template("B", 1)]).await;
        assert_eq!(
            controller.reorder(1, 5).await.unwrap(),
            ReorderOutcome::Unchanged
        );
        assert!(controller.api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reorder_keeps_confirmed_order() {
        let mut api = FakeApi::with(vec![template("A", 0), template("B", 1)]);
        api.fail_mutations = true;
        let mut controller = CollectionController::new(api);
        controller.refresh().await;

        assert!(controller.reorder(0, 1).await.is_err());
        assert_eq!(ids(controller.items()), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn test_team_form_edits_skills() {
        let member = TeamMember::from_draft(
            "m1".into(),
            0,
            Utc::now(),
            TeamDraft {
                name: "Asha".into(),
                role: "Mentor".into(),
                skills: vec!["Rust".into(), "Go".into()],
                ..TeamDraft::default()
            },
        );
        let mut controller = CollectionController::new(FakeApi::with(vec![member]));
        controller.refresh().await;

        let form = controller.open_edit("m1").unwrap();
        assert_eq!(form.list_text, "Rust, Go");
        form.list_text = "Rust, Go, SQL".into();

        let saved = controller.submit_form().await.unwrap();
        assert_eq!(saved.skills, vec!["Rust", "Go", "SQL"]);
    }
}
