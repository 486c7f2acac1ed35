//! Newsletter subscriptions.

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{LocalCache, keys};
use crate::domain::{Subscriber, normalize_email};
use crate::error::{DomainError, RepoError};
use crate::fetch::{Attempts, FetchError, FetchOrchestrator, Tier};
use crate::ports::{AppEvent, BaseRepository, EventBus, SubscriberRepository};

pub struct NewsletterService {
    orchestrator: FetchOrchestrator,
    store: Option<Arc<dyn SubscriberRepository>>,
    cache: LocalCache,
    bus: Arc<dyn EventBus>,
}

impl NewsletterService {
    pub fn new(orchestrator: FetchOrchestrator, cache: LocalCache, bus: Arc<dyn EventBus>) -> Self {
        Self {
            orchestrator,
            store: None,
            cache,
            bus,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SubscriberRepository>) -> Self {
        self.store = Some(store);
        self
    }

    /// Subscribe an email. A second subscription of the same address is rejected.
    pub async fn subscribe(&self, email: &str, source: &str) -> Result<Subscriber, DomainError> {
        let subscriber = Subscriber::new(email, source)?;

        let local: Vec<Subscriber> = self.cache.list(keys::NEWSLETTER_SUBSCRIBERS).await?;
        if local.iter().any(|s| s.email == subscriber.email) {
            return Err(already_subscribed());
        }

        if let Some(store) = &self.store {
            match store.find_by_email(&subscriber.email).await {
                Ok(Some(_)) => return Err(already_subscribed()),
                Ok(None) => match store.save(subscriber.clone()).await {
                    Ok(_) => {}
                    Err(RepoError::Constraint(_)) => return Err(already_subscribed()),
                    Err(e) => {
                        tracing::warn!(email = %subscriber.email, error = %e, "Store unavailable, subscribing locally");
                    }
                },
                Err(e) => {
                    tracing::warn!(email = %subscriber.email, error = %e, "Store unavailable, subscribing locally");
                }
            }
        }

        let entry = subscriber.clone();
        self.cache
            .update_list(keys::NEWSLETTER_SUBSCRIBERS, move |items: &mut Vec<Subscriber>| {
                items.push(entry)
            })
            .await?;

        tracing::info!(email = %subscriber.email, source = %subscriber.source, "Subscribed to newsletter");
        self.bus.publish(AppEvent::SubscriberAdded(subscriber.clone()));
        Ok(subscriber)
    }

    pub async fn unsubscribe(&self, email: &str) -> Result<(), DomainError> {
        let email = normalize_email(email)?;

        let mut removed = self
            .cache
            .update_list(keys::NEWSLETTER_SUBSCRIBERS, |items: &mut Vec<Subscriber>| {
                let before = items.len();
                items.retain(|s| s.email != email);
                before - items.len()
            })
            .await? as u64;

        if let Some(store) = &self.store {
            match store.delete_by_email(&email).await {
                Ok(count) => removed += count,
                Err(e) => tracing::warn!(email = %email, error = %e, "Failed to remove subscriber from store"),
            }
        }

        if removed == 0 {
            return Err(DomainError::not_found("subscriber", &email));
        }

        tracing::info!(email = %email, "Unsubscribed from newsletter");
        self.bus.publish(AppEvent::SubscriberRemoved { email });
        Ok(())
    }

    /// Subscribers matching `search` (email or source), newest first.
    ///
    /// Store rows are merged with local-only subscribers, so an address
    /// subscribed while the store was down stays listed.
    pub async fn list(&self, search: Option<&str>) -> Vec<Subscriber> {
        let mut attempts = Attempts::new();
        if let Some(store) = &self.store {
            attempts = attempts.tier(Tier::DataStore, async move {
                let mut rows = store.list_all().await.map_err(FetchError::from)?;
                let local: Vec<Subscriber> =
                    self.cache.list_or_empty(keys::NEWSLETTER_SUBSCRIBERS).await;
                for subscriber in local {
                    if !rows.iter().any(|s| s.email == subscriber.email) {
                        rows.push(subscriber);
                    }
                }
                Ok::<_, FetchError>(rows)
            });
        }
        attempts = attempts.tier(Tier::LocalCache, async {
            let local: Vec<Subscriber> = self.cache.list(keys::NEWSLETTER_SUBSCRIBERS).await?;
            Ok::<_, FetchError>(local)
        });

        let mut subscribers: Vec<Subscriber> =
            match self.orchestrator.execute("list_subscribers", attempts).await {
                Ok(fetched) => fetched.value,
                Err(e) => {
                    tracing::error!(error = %e, "Unable to list subscribers");
                    Vec::new()
                }
            };

        if let Some(query) = search {
            subscribers.retain(|s| s.matches(query));
        }
        subscribers.sort_by(|a, b| b.date.cmp(&a.date));
        subscribers
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let removed = self
            .cache
            .update_list(keys::NEWSLETTER_SUBSCRIBERS, |items: &mut Vec<Subscriber>| {
                let index = items.iter().position(|s| s.id == id)?;
                Some(items.remove(index))
            })
            .await?;

        let mut found = removed.is_some();
        if let Some(store) = &self.store {
            match store.delete(id).await {
                Ok(()) => found = true,
                Err(RepoError::NotFound) => {}
                Err(e) => tracing::warn!(subscriber_id = %id, error = %e, "Failed to delete subscriber from store"),
            }
        }

        if !found {
            return Err(DomainError::not_found("subscriber", id));
        }
        if let Some(subscriber) = removed {
            self.bus.publish(AppEvent::SubscriberRemoved {
                email: subscriber.email,
            });
        }
        Ok(())
    }

    /// CSV export with an `Email,Date,Source` header.
    pub async fn export_csv(&self) -> String {
        let mut csv = String::from("Email,Date,Source\n");
        for subscriber in self.list(None).await {
            csv.push_str(&format!(
                "{},{},{}\n",
                csv_field(&subscriber.email),
                subscriber.date.format("%Y-%m-%d"),
                csv_field(&subscriber.source)
            ));
        }
        csv
    }
}

fn already_subscribed() -> DomainError {
    DomainError::Duplicate("already subscribed".to_string())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeTable, TestBus, local_cache};

    fn service() -> (NewsletterService, Arc<FakeTable<Subscriber>>) {
        let (cache, _) = local_cache();
        let store = Arc::new(FakeTable::default());
        let service = NewsletterService::new(
            FetchOrchestrator::default(),
            cache,
            Arc::new(TestBus::default()),
        )
        .with_store(store.clone());
        (service, store)
    }

    #[tokio::test]
    async fn test_subscribing_twice_is_rejected() {
        let (service, store) = service();
        service.subscribe("reader@example.com", "footer").await.unwrap();

        let err = service
            .subscribe("  Reader@Example.com", "popup")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::Duplicate(ref msg) if msg == "already subscribed"));
        assert_eq!(service.list(None).await.len(), 1);
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_falls_back_to_local_list() {
        let (service, store) = service();
        store.fail(true);

        service.subscribe("offline@example.com", "footer").await.unwrap();

        let listed = service.list(None).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, "offline@example.com");
        assert!(service.subscribe("offline@example.com", "footer").await.is_err());
    }

    #[tokio::test]
    async fn test_offline_subscriber_stays_listed_after_store_recovers() {
        let (service, store) = service();
        store.fail(true);
        service.subscribe("offline@example.com", "footer").await.unwrap();
        store.fail(false);
        service.subscribe("online@example.com", "footer").await.unwrap();

        let mut emails: Vec<String> = service
            .list(None)
            .await
            .into_iter()
            .map(|s| s.email)
            .collect();
        emails.sort();
        assert_eq!(emails, vec!["offline@example.com", "online@example.com"]);
        assert!(matches!(
            service.subscribe("offline@example.com", "popup").await,
            Err(DomainError::Duplicate(_))
        ));
        assert!(service.export_csv().await.contains("offline@example.com"));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_email_is_not_found() {
        let (service, _) = service();
        let err = service.unsubscribe("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_everywhere() {
        let (service, store) = service();
        service.subscribe("reader@example.com", "footer").await.unwrap();

        service.unsubscribe("READER@example.com").await.unwrap();

        assert!(store.rows().is_empty());
        assert!(service.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_by_search() {
        let (service, _) = service();
        service.subscribe("a@example.com", "footer").await.unwrap();
        service.subscribe("b@example.com", "popup").await.unwrap();

        let popup = service.list(Some("POP")).await;
        assert_eq!(popup.len(), 1);
        assert_eq!(popup[0].email, "b@example.com");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let (service, _) = service();
        let subscriber = service.subscribe("a@example.com", "footer, blog").await.unwrap();

        let csv = service.export_csv().await;
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Email,Date,Source");
        assert_eq!(
            lines[1],
            format!(
                "a@example.com,{},\"footer, blog\"",
                subscriber.date.format("%Y-%m-%d")
            )
        );
    }

    #[tokio::test]
    async fn test_delete_by_id() {
        let (service, store) = service();
        let subscriber = service.subscribe("a@example.com", "footer").await.unwrap();

        service.delete(subscriber.id).await.unwrap();
        assert!(store.rows().is_empty());
        assert!(matches!(
            service.delete(subscriber.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}
