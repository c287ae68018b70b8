use api_types::{
    ErrorResponse, UserQuery,
    category::{self as wire_category, CategoryCreate, CategoryUpdate, CategoryView},
    entry::{self as wire_entry, EntryCreate, EntryUpdate, EntryView},
};
use chrono::Utc;
use chrono_tz::Tz;
use ledger::{
    Category, CategoryKind, CategoryPatch, EntryKind, EntryPatch, JournalEntry, JournalType,
    LedgerRemote, MoneyCents, RemoteError,
};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// [`LedgerRemote`] over the persistence service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: Url,
    http: reqwest::Client,
    /// Offset attached to outgoing entry dates.
    timezone: Tz,
}

impl HttpRemote {
    pub fn new(base_url: &str, timezone: Tz) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Setting(format!("invalid base_url: {err}")))?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("journal/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url,
            http,
            timezone,
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, RemoteError> {
        self.base_url
            .join(path)
            .map_err(|err| RemoteError::Transport(format!("invalid endpoint {path}: {err}")))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
    ) -> std::result::Result<T, RemoteError> {
        let res = req.send().await.map_err(transport)?;
        if res.status().is_success() {
            return res.json::<T>().await.map_err(transport);
        }
        Err(error_from_response(res).await)
    }

    async fn send_unit(&self, req: RequestBuilder) -> std::result::Result<(), RemoteError> {
        let res = req.send().await.map_err(transport)?;
        if res.status().is_success() {
            return Ok(());
        }
        Err(error_from_response(res).await)
    }
}

fn transport(err: reqwest::Error) -> RemoteError {
    RemoteError::Transport(err.to_string())
}

async fn error_from_response(res: reqwest::Response) -> RemoteError {
    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());
    tracing::debug!(%status, "remote call failed: {body}");

    match status.as_u16() {
        401 | 403 => RemoteError::Unauthorized,
        404 => RemoteError::NotFound(body),
        409 => RemoteError::Conflict(body),
        400 | 422 => RemoteError::Rejected(body),
        _ => RemoteError::Server(body),
    }
}

fn user_query(user_id: &str) -> UserQuery {
    UserQuery {
        user_id: user_id.to_string(),
    }
}

impl LedgerRemote for HttpRemote {
    async fn fetch_entries(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<JournalEntry>, RemoteError> {
        let req = self
            .http
            .get(self.endpoint("entries")?)
            .query(&user_query(user_id));
        let views: Vec<EntryView> = self.send_json(req).await?;
        Ok(views.into_iter().map(entry_from_view).collect())
    }

    async fn create_entry(
        &self,
        user_id: &str,
        entry: &JournalEntry,
    ) -> std::result::Result<JournalEntry, RemoteError> {
        let payload = EntryCreate {
            user_id: user_id.to_string(),
            id: entry.id,
            date: entry.date.with_timezone(&self.timezone).fixed_offset(),
            kind: wire_entry_kind(entry.kind),
            amount_minor: entry.amount.cents(),
            category_id: entry.category_id.clone(),
            note: entry.note.clone(),
            journal_type: wire_journal_type(entry.journal_type),
            created_at: entry.created_at,
        };
        let req = self.http.post(self.endpoint("entries")?).json(&payload);
        let view: EntryView = self.send_json(req).await?;
        Ok(entry_from_view(view))
    }

    async fn update_entry(
        &self,
        user_id: &str,
        id: Uuid,
        base_revision: u64,
        patch: &EntryPatch,
    ) -> std::result::Result<JournalEntry, RemoteError> {
        let payload = EntryUpdate {
            user_id: user_id.to_string(),
            base_revision,
            date: patch
                .date
                .map(|date| date.with_timezone(&self.timezone).fixed_offset()),
            kind: patch.kind.map(wire_entry_kind),
            amount_minor: patch.amount.map(MoneyCents::cents),
            category_id: patch.category_id.clone(),
            note: patch.note.clone(),
        };
        let req = self
            .http
            .put(self.endpoint(&format!("entries/{id}"))?)
            .json(&payload);
        let view: EntryView = self.send_json(req).await?;
        Ok(entry_from_view(view))
    }

    async fn delete_entry(&self, user_id: &str, id: Uuid) -> std::result::Result<(), RemoteError> {
        let req = self
            .http
            .delete(self.endpoint(&format!("entries/{id}"))?)
            .query(&user_query(user_id));
        self.send_unit(req).await
    }

    async fn fetch_categories(
        &self,
        user_id: &str,
    ) -> std::result::Result<Vec<Category>, RemoteError> {
        let req = self
            .http
            .get(self.endpoint("categories")?)
            .query(&user_query(user_id));
        let views: Vec<CategoryView> = self.send_json(req).await?;
        Ok(views.into_iter().map(category_from_view).collect())
    }

    async fn create_category(
        &self,
        user_id: &str,
        category: &Category,
    ) -> std::result::Result<Category, RemoteError> {
        let payload = CategoryCreate {
            user_id: user_id.to_string(),
            id: category.id.clone(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            kind: wire_category_kind(category.kind),
        };
        let req = self.http.post(self.endpoint("categories")?).json(&payload);
        let view: CategoryView = self.send_json(req).await?;
        Ok(category_from_view(view))
    }

    async fn update_category(
        &self,
        user_id: &str,
        id: &str,
        patch: &CategoryPatch,
    ) -> std::result::Result<Category, RemoteError> {
        let payload = CategoryUpdate {
            user_id: user_id.to_string(),
            name: patch.name.clone(),
            icon: patch.icon.clone(),
            kind: patch.kind.map(wire_category_kind),
        };
        let req = self
            .http
            .put(self.endpoint(&format!("categories/{id}"))?)
            .json(&payload);
        let view: CategoryView = self.send_json(req).await?;
        Ok(category_from_view(view))
    }

    async fn delete_category(
        &self,
        user_id: &str,
        id: &str,
    ) -> std::result::Result<(), RemoteError> {
        let req = self
            .http
            .delete(self.endpoint(&format!("categories/{id}"))?)
            .query(&user_query(user_id));
        self.send_unit(req).await
    }
}

fn entry_from_view(view: EntryView) -> JournalEntry {
    JournalEntry {
        id: view.id,
        date: view.date.with_timezone(&Utc),
        kind: match view.kind {
            wire_entry::EntryKind::Income => EntryKind::Income,
            wire_entry::EntryKind::Expense => EntryKind::Expense,
        },
        amount: MoneyCents::new(view.amount_minor),
        category_id: view.category_id,
        note: view.note,
        journal_type: match view.journal_type {
            wire_entry::JournalType::Personal => JournalType::Personal,
            wire_entry::JournalType::Business => JournalType::Business,
        },
        created_at: view.created_at,
        revision: view.revision,
    }
}

fn wire_entry_kind(kind: EntryKind) -> wire_entry::EntryKind {
    match kind {
        EntryKind::Income => wire_entry::EntryKind::Income,
        EntryKind::Expense => wire_entry::EntryKind::Expense,
    }
}

fn wire_journal_type(journal_type: JournalType) -> wire_entry::JournalType {
    match journal_type {
        JournalType::Personal => wire_entry::JournalType::Personal,
        JournalType::Business => wire_entry::JournalType::Business,
    }
}

fn category_from_view(view: CategoryView) -> Category {
    Category {
        id: view.id,
        name: view.name,
        icon: view.icon,
        kind: match view.kind {
            wire_category::CategoryKind::Income => CategoryKind::Income,
            wire_category::CategoryKind::Expense => CategoryKind::Expense,
            wire_category::CategoryKind::Both => CategoryKind::Both,
        },
        is_custom: view.is_custom,
    }
}

fn wire_category_kind(kind: CategoryKind) -> wire_category::CategoryKind {
    match kind {
        CategoryKind::Income => wire_category::CategoryKind::Income,
        CategoryKind::Expense => wire_category::CategoryKind::Expense,
        CategoryKind::Both => wire_category::CategoryKind::Both,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        routing::{get, put},
    };
    use chrono::TimeZone;
    use ledger::{EntryStore, LedgerError};

    use super::*;

    #[derive(Clone, Default)]
    struct Stub {
        entries: Arc<Mutex<Vec<EntryView>>>,
    }

    fn no_user() -> (StatusCode, Json<ErrorResponse>) {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "unknown user".to_string(),
            }),
        )
    }

    async fn list_entries(
        State(stub): State<Stub>,
        Query(query): Query<UserQuery>,
    ) -> std::result::Result<Json<Vec<EntryView>>, (StatusCode, Json<ErrorResponse>)> {
        if query.user_id != "alice" {
            return Err(no_user());
        }
        Ok(Json(stub.entries.lock().unwrap().clone()))
    }

    async fn create_entry(
        State(stub): State<Stub>,
        Json(payload): Json<EntryCreate>,
    ) -> (StatusCode, Json<EntryView>) {
        let view = EntryView {
            id: payload.id,
            date: payload.date,
            kind: payload.kind,
            amount_minor: payload.amount_minor,
            category_id: payload.category_id,
            note: payload.note,
            journal_type: payload.journal_type,
            created_at: payload.created_at,
            revision: 1,
        };
        stub.entries.lock().unwrap().push(view.clone());
        (StatusCode::CREATED, Json(view))
    }

    async fn update_entry(
        Path(id): Path<Uuid>,
        Json(payload): Json<EntryUpdate>,
    ) -> (StatusCode, Json<ErrorResponse>) {
        (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("entry {id} is newer than revision {}", payload.base_revision),
            }),
        )
    }

    async fn delete_entry(
        State(stub): State<Stub>,
        Path(id): Path<Uuid>,
        Query(_query): Query<UserQuery>,
    ) -> StatusCode {
        stub.entries.lock().unwrap().retain(|view| view.id != id);
        StatusCode::NO_CONTENT
    }

    async fn list_categories(Query(_query): Query<UserQuery>) -> Json<Vec<CategoryView>> {
        Json(vec![CategoryView {
            id: "c1".to_string(),
            name: "Coworking".to_string(),
            icon: "🏢".to_string(),
            kind: wire_category::CategoryKind::Expense,
            is_custom: true,
        }])
    }

    async fn spawn_stub() -> (String, Stub) {
        let stub = Stub::default();
        let app = Router::new()
            .route("/entries", get(list_entries).post(create_entry))
            .route("/entries/{id}", put(update_entry).delete(delete_entry))
            .route("/categories", get(list_categories))
            .with_state(stub.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), stub)
    }

    fn new_expense() -> ledger::NewEntry {
        ledger::NewEntry {
            date: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
            kind: EntryKind::Expense,
            amount: MoneyCents::new(40_000),
            category_id: "c1".to_string(),
            note: Some("desk".to_string()),
            journal_type: JournalType::Business,
        }
    }

    #[tokio::test]
    async fn store_round_trips_through_http() {
        let (base_url, stub) = spawn_stub().await;
        let remote = HttpRemote::new(&base_url, chrono_tz::Europe::Rome).unwrap();
        let store = EntryStore::new(remote);

        let snapshot = store.load(Some("alice")).await.unwrap();
        assert!(snapshot.entries.is_empty());
        assert_eq!(snapshot.categories.name_of("c1"), Some("Coworking"));

        let created = store.add_entry(new_expense()).await.unwrap();
        assert_eq!(created.revision, 1);
        assert_eq!(created.date, Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
        {
            let stored = stub.entries.lock().unwrap();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].date.offset().local_minus_utc(), 3600);
        }

        let reloaded = store.refetch().await.unwrap();
        assert_eq!(reloaded.entries.get(created.id), Some(&created));

        store.remove_entry(created.id).await.unwrap();
        assert!(stub.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_codes_map_to_remote_errors() {
        let (base_url, _stub) = spawn_stub().await;
        let remote = HttpRemote::new(&base_url, chrono_tz::UTC).unwrap();

        assert_eq!(
            remote.fetch_entries("mallory").await.unwrap_err(),
            RemoteError::Unauthorized
        );

        let id = Uuid::new_v4();
        let err = remote
            .update_entry("alice", id, 2, &EntryPatch::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::Conflict(format!("entry {id} is newer than revision 2"))
        );

        // No route for category deletion on the stub.
        assert!(matches!(
            remote.delete_category("alice", "c1").await,
            Err(RemoteError::NotFound(_) | RemoteError::Server(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_transport_error() {
        let remote = HttpRemote::new("http://127.0.0.1:9", chrono_tz::UTC).unwrap();
        let store = EntryStore::new(remote);
        assert!(matches!(
            store.load(Some("alice")).await,
            Err(LedgerError::Transport(_))
        ));
    }

    #[test]
    fn reqwest_errors_surface_as_http_errors() {
        let err = reqwest::Client::new()
            .get("http://[::1")
            .build()
            .unwrap_err();
        let err = AppError::from(err);
        assert!(matches!(err, AppError::Http(_)));
        assert!(err.to_string().starts_with("http error"));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            HttpRemote::new("not a url", chrono_tz::UTC),
            Err(AppError::Setting(_))
        ));
    }
}
