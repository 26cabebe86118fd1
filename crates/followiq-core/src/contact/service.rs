use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use super::{ContactSubmission, NewContactSubmission};
use crate::auth::AdminSession;
use crate::backend::{Backend, Order, Query, CONTACT_SUBMISSIONS};
use crate::{Error, Result};

/// Which part of the inbox to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InboxFilter {
    #[default]
    All,
    Unread,
    Read,
}

impl InboxFilter {
    fn apply(self, query: Query) -> Query {
        match self {
            Self::All => query,
            Self::Unread => query.eq("is_read", false),
            Self::Read => query.eq("is_read", true),
        }
    }
}

/// Public contact form plus the admin inbox over `contact_submissions`
pub struct ContactService {
    backend: Arc<dyn Backend>,
}

fn parse_row(row: Value) -> Result<ContactSubmission> {
    Ok(serde_json::from_value(row)?)
}

impl ContactService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Store a contact form submission (no session needed)
    pub async fn submit(&self, form: NewContactSubmission) -> Result<ContactSubmission> {
        let form = form.validated()?;
        let mut row = serde_json::to_value(&form)?;
        if let Value::Object(ref mut map) = row {
            map.insert("is_read".to_string(), Value::Bool(false));
        }

        let stored = parse_row(self.backend.insert(CONTACT_SUBMISSIONS, row, None).await?)?;
        tracing::info!(id = %stored.id, "Contact submission received");
        Ok(stored)
    }

    /// Newest first
    pub async fn list(
        &self,
        admin: &AdminSession,
        filter: InboxFilter,
        limit: Option<usize>,
    ) -> Result<Vec<ContactSubmission>> {
        let mut query = filter.apply(
            Query::table(CONTACT_SUBMISSIONS).order("created_at", Order::Desc),
        );
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        self.backend
            .select(&query, Some(admin.session()))
            .await?
            .into_iter()
            .map(parse_row)
            .collect()
    }

    pub async fn list_unread(
        &self,
        admin: &AdminSession,
        limit: Option<usize>,
    ) -> Result<Vec<ContactSubmission>> {
        self.list(admin, InboxFilter::Unread, limit).await
    }

    pub async fn get(&self, admin: &AdminSession, id: Uuid) -> Result<ContactSubmission> {
        let query = Query::table(CONTACT_SUBMISSIONS).eq("id", id.to_string());
        let row = self
            .backend
            .select(&query, Some(admin.session()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("contact submission {}", id)))?;
        parse_row(row)
    }

    pub async fn unread_count(&self, admin: &AdminSession) -> Result<usize> {
        let query = InboxFilter::Unread.apply(Query::table(CONTACT_SUBMISSIONS));
        Ok(self.backend.select(&query, Some(admin.session())).await?.len())
    }

    pub async fn mark_read(
        &self,
        admin: &AdminSession,
        id: Uuid,
        is_read: bool,
    ) -> Result<ContactSubmission> {
        let query = Query::table(CONTACT_SUBMISSIONS).eq("id", id.to_string());
        let row = self
            .backend
            .update(&query, json!({ "is_read": is_read }), Some(admin.session()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("contact submission {}", id)))?;
        tracing::debug!(%id, is_read, "Contact submission read state changed");
        parse_row(row)
    }

    pub async fn toggle_read(&self, admin: &AdminSession, id: Uuid) -> Result<ContactSubmission> {
        let current = self.get(admin, id).await?;
        self.mark_read(admin, id, !current.is_read).await
    }

    pub async fn delete(&self, admin: &AdminSession, id: Uuid) -> Result<()> {
        let query = Query::table(CONTACT_SUBMISSIONS).eq("id", id.to_string());
        let removed = self.backend.delete(&query, Some(admin.session())).await?;
        if removed == 0 {
            return Err(Error::NotFound(format!("contact submission {}", id)));
        }
        tracing::info!(%id, "Contact submission deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, SignUpOutcome};
    use crate::backend::MemoryBackend;

    async fn setup() -> (ContactService, AdminSession) {
        let backend = Arc::new(MemoryBackend::new());
        let outcome = backend
            .sign_up(&Credentials::new("admin@example.com", "secret1"))
            .await
            .unwrap();
        let SignUpOutcome::SignedIn(session) = outcome else {
            panic!("expected a session");
        };
        (ContactService::new(backend), AdminSession::new(session))
    }

    fn form(name: &str) -> NewContactSubmission {
        NewContactSubmission::new(name, "lead@example.com", Some("Acme".to_string()), "Tell me more")
    }

    #[tokio::test]
    async fn test_submit_then_list_unread() {
        let (contacts, admin) = setup().await;
        let first = contacts.submit(form("First")).await.unwrap();
        assert!(!first.is_read);
        assert_eq!(first.company.as_deref(), Some("Acme"));
        contacts.submit(form("Second")).await.unwrap();

        let all = contacts.list(&admin, InboxFilter::All, None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(contacts.unread_count(&admin).await.unwrap(), 2);

        contacts.mark_read(&admin, first.id, true).await.unwrap();
        let unread = contacts.list(&admin, InboxFilter::Unread, None).await.unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].name, "Second");

        let read = contacts.list(&admin, InboxFilter::Read, Some(10)).await.unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, first.id);
    }

    #[tokio::test]
    async fn test_toggle_read_flips() {
        let (contacts, admin) = setup().await;
        let submission = contacts.submit(form("Ada")).await.unwrap();

        assert!(contacts.toggle_read(&admin, submission.id).await.unwrap().is_read);
        assert!(!contacts.toggle_read(&admin, submission.id).await.unwrap().is_read);
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let (contacts, admin) = setup().await;
        let id = Uuid::new_v4();
        assert!(matches!(contacts.mark_read(&admin, id, true).await, Err(Error::NotFound(_))));
        assert!(matches!(contacts.delete(&admin, id).await, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let (contacts, admin) = setup().await;
        let submission = contacts.submit(form("Ada")).await.unwrap();
        contacts.delete(&admin, submission.id).await.unwrap();
        assert!(contacts.list(&admin, InboxFilter::All, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_backend() {
        let (contacts, admin) = setup().await;
        let bad = NewContactSubmission::new("Ada", "not-an-email", None, "hi");
        assert!(matches!(contacts.submit(bad).await, Err(Error::Validation(_))));
        assert_eq!(contacts.unread_count(&admin).await.unwrap(), 0);
    }
}
