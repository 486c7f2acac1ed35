//! Contact form submissions and their admin workflow.

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{LocalCache, keys};
use crate::domain::{ContactFilter, ContactForm, ContactStatus, ContactSubmission};
use crate::error::{DomainError, RepoError};
use crate::fetch::{Attempts, FetchError, FetchOrchestrator, Tier};
use crate::ports::{AppEvent, BaseRepository, ContactRepository, EventBus};

pub struct ContactService {
    orchestrator: FetchOrchestrator,
    store: Option<Arc<dyn ContactRepository>>,
    cache: LocalCache,
    bus: Arc<dyn EventBus>,
}

impl ContactService {
    pub fn new(orchestrator: FetchOrchestrator, cache: LocalCache, bus: Arc<dyn EventBus>) -> Self {
        Self {
            orchestrator,
            store: None,
            cache,
            bus,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ContactRepository>) -> Self {
        self.store = Some(store);
        self
    }

    /// Record a submission. It is always mirrored to the local list.
    pub async fn submit(&self, form: ContactForm) -> Result<ContactSubmission, DomainError> {
        let submission = form.into_submission()?;

        if let Some(store) = &self.store {
            if let Err(e) = store.save(submission.clone()).await {
                tracing::warn!(submission_id = %submission.id, error = %e, "Store unavailable, keeping submission locally");
            }
        }

        let entry = submission.clone();
        self.cache
            .update_list(keys::CONTACT_SUBMISSIONS, move |items: &mut Vec<ContactSubmission>| {
                items.insert(0, entry)
            })
            .await?;

        tracing::info!(submission_id = %submission.id, "Contact form submitted");
        Ok(submission)
    }

    /// Submissions newest first.
    ///
    /// Store rows are merged with submissions only kept locally. An empty
    /// merged result falls back to the local list.
    pub async fn list(&self, filter: &ContactFilter) -> Vec<ContactSubmission> {
        let mut attempts = Attempts::new();
        if let Some(store) = &self.store {
            attempts = attempts.tier(Tier::DataStore, async move {
                let mut rows = store.list_recent().await?;
                let local: Vec<ContactSubmission> =
                    self.cache.list_or_empty(keys::CONTACT_SUBMISSIONS).await;
                for submission in local {
                    if !rows.iter().any(|s| s.id == submission.id) {
                        rows.push(submission);
                    }
                }
                if rows.is_empty() {
                    return Err(FetchError::NotFound);
                }
                Ok::<_, FetchError>(rows)
            });
        }
        attempts = attempts.tier(Tier::LocalCache, async {
            let local: Vec<ContactSubmission> = self.cache.list(keys::CONTACT_SUBMISSIONS).await?;
            Ok::<_, FetchError>(local)
        });

        let mut submissions = match self.orchestrator.execute("list_contacts", attempts).await {
            Ok(fetched) => fetched.value,
            Err(e) => {
                tracing::error!(error = %e, "Unable to list contact submissions");
                Vec::new()
            }
        };

        submissions.retain(|s| filter.matches(s));
        submissions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        submissions
    }

    pub async fn find(&self, id: Uuid) -> Result<ContactSubmission, DomainError> {
        if let Some(store) = &self.store {
            match store.find_by_id(id).await {
                Ok(Some(found)) => return Ok(found),
                Ok(None) => {}
                Err(e) => tracing::warn!(submission_id = %id, error = %e, "Store lookup failed"),
            }
        }

        let local: Vec<ContactSubmission> = self.cache.list(keys::CONTACT_SUBMISSIONS).await?;
        local
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| DomainError::not_found("contact_submission", id))
    }

    /// Open a submission, marking it read when it was new.
    pub async fn view(&self, id: Uuid) -> Result<ContactSubmission, DomainError> {
        let mut submission = self.find(id).await?;
        if submission.status == ContactStatus::New {
            self.update_status(id, ContactStatus::Read).await?;
            submission.status = ContactStatus::Read;
        }
        Ok(submission)
    }

    pub async fn update_status(&self, id: Uuid, status: ContactStatus) -> Result<(), DomainError> {
        let mut found = false;
        if let Some(store) = &self.store {
            match store.update_status(id, status).await {
                Ok(()) => found = true,
                Err(RepoError::NotFound) => {}
                Err(e) => tracing::warn!(submission_id = %id, error = %e, "Store update failed, updating locally"),
            }
        }

        found |= self
            .cache
            .update_list(keys::CONTACT_SUBMISSIONS, |items: &mut Vec<ContactSubmission>| {
                items
                    .iter_mut()
                    .find(|s| s.id == id)
                    .map(|s| s.status = status)
                    .is_some()
            })
            .await?;

        if !found {
            return Err(DomainError::not_found("contact_submission", id));
        }

        tracing::debug!(submission_id = %id, status = %status, "Contact status updated");
        self.bus.publish(AppEvent::ContactStatusChanged { id, status });
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut found = false;
        if let Some(store) = &self.store {
            match store.delete(id).await {
                Ok(()) => found = true,
                Err(RepoError::NotFound) => {}
                Err(e) => tracing::warn!(submission_id = %id, error = %e, "Store delete failed, deleting locally"),
            }
        }

        found |= self
            .cache
            .update_list(keys::CONTACT_SUBMISSIONS, |items: &mut Vec<ContactSubmission>| {
                let before = items.len();
                items.retain(|s| s.id != id);
                items.len() != before
            })
            .await?;

        if !found {
            return Err(DomainError::not_found("contact_submission", id));
        }

        self.bus.publish(AppEvent::ContactDeleted { id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTable, TestBus, local_cache};

    fn form(first_name: &str, message: &str) -> ContactForm {
        ContactForm {
            first_name: first_name.to_string(),
            last_name: "Reader".to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            phone: String::new(),
            message: message.to_string(),
        }
    }

    type Harness = (
        ContactService,
        Arc<FakeTable<ContactSubmission>>,
        Arc<TestBus>,
    );

    fn service(store: FakeTable<ContactSubmission>) -> Harness {
        let (cache, _) = local_cache();
        let store = Arc::new(store);
        let bus = Arc::new(TestBus::default());
        let service = ContactService::new(FetchOrchestrator::default(), cache, bus.clone())
            .with_store(store.clone());
        (service, store, bus)
    }

    #[tokio::test]
    async fn test_submit_saves_to_store_and_mirror() {
        let (service, store, _) = service(FakeTable::default());
        let submission = service.submit(form("Ada", "Hello")).await.unwrap();

        assert_eq!(submission.status, ContactStatus::New);
        assert_eq!(store.rows().len(), 1);
        assert_eq!(service.list(&ContactFilter::default()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_falls_back_when_store_is_down() {
        let (service, _, _) = service(FakeTable::failing());
        service.submit(form("Ada", "First")).await.unwrap();
        service.submit(form("Grace", "Second")).await.unwrap();

        let all = service.list(&ContactFilter::default()).await;
        assert_eq!(all.len(), 2);

        let filtered = service
            .list(&ContactFilter {
                search: Some("grace".to_string()),
                status: None,
            })
            .await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].first_name, "Grace");
    }

    #[tokio::test]
    async fn test_offline_submission_listed_alongside_store_rows() {
        let (service, store, _) = service(FakeTable::default());
        store.fail(true);
        let offline = service.submit(form("Offline", "Sent while down")).await.unwrap();
        store.fail(false);
        let online = service.submit(form("Online", "Sent while up")).await.unwrap();

        let listed = service.list(&ContactFilter::default()).await;
        let ids: Vec<Uuid> = listed.iter().map(|s| s.id).collect();
        assert_eq!(listed.len(), 2);
        assert!(ids.contains(&offline.id));
        assert!(ids.contains(&online.id));
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_view_marks_new_as_read() {
        let (service, store, bus) = service(FakeTable::default());
        let submission = service.submit(form("Ada", "Hello")).await.unwrap();

        let viewed = service.view(submission.id).await.unwrap();

        assert_eq!(viewed.status, ContactStatus::Read);
        assert_eq!(store.rows()[0].status, ContactStatus::Read);
        assert!(bus.published().contains(&AppEvent::ContactStatusChanged {
            id: submission.id,
            status: ContactStatus::Read,
        }));
    }

    #[tokio::test]
    async fn test_update_status_offline_updates_local_copy() {
        let (service, _, _) = service(FakeTable::failing());
        let submission = service.submit(form("Ada", "Hello")).await.unwrap();

        service
            .update_status(submission.id, ContactStatus::Replied)
            .await
            .unwrap();

        let replied = service
            .list(&ContactFilter {
                search: None,
                status: Some(ContactStatus::Replied),
            })
            .await;
        assert_eq!(replied.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let (service, _, _) = service(FakeTable::default());
        let err = service.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_submission() {
        let (service, store, bus) = service(FakeTable::default());
        let submission = service.submit(form("Ada", "Hello")).await.unwrap();

        service.delete(submission.id).await.unwrap();

        assert!(store.rows().is_empty());
        assert!(service.list(&ContactFilter::default()).await.is_empty());
        assert_eq!(
            bus.published().last(),
            Some(&AppEvent::ContactDeleted { id: submission.id })
        );
    }
}
