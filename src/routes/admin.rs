/**
 * Admin Routes
 * Authenticated CRUD and ordering for the content collections, the contact
 * inbox and dashboard counters
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::models::{ContactSubmission, DashboardStats, Record};
use crate::routes::{public, JsonBody};
use crate::state::AppState;
use crate::store::StoredIn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<String>,
}

fn capitalized(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `GET|POST /admin/{c}`, `PUT|DELETE /admin/{c}/{id}`, `POST /admin/{c}/reorder`
pub fn collection_routes<R: StoredIn>() -> Router<AppState> {
    let base = format!("/admin/{}", R::COLLECTION.path());
    Router::new()
        .route(&base, get(public::list::<R>).post(create::<R>))
        .route(&format!("{}/reorder", base), post(reorder::<R>))
        .route(&format!("{}/{{id}}", base), put(update::<R>).delete(remove::<R>))
}

pub async fn create<R: StoredIn>(
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<R::Draft>,
) -> Result<(StatusCode, Json<Envelope<R>>), ApiError> {
    R::check_draft(&draft).map_err(ApiError::Validation)?;

    let record = R::store(&state.stores).create(draft).await?;
    tracing::info!(
        collection = %R::COLLECTION,
        id = %record.id(),
        display_order = record.display_order(),
        "record created"
    );

    Ok((StatusCode::CREATED, Json(Envelope::ok(record))))
}

pub async fn update<R: StoredIn>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(draft): JsonBody<R::Draft>,
) -> Result<Json<Envelope<R>>, ApiError> {
    R::check_draft(&draft).map_err(ApiError::Validation)?;

    let record = R::store(&state.stores).update(&id, draft).await?;
    tracing::info!(collection = %R::COLLECTION, id = %id, "record updated");

    Ok(Json(Envelope::ok(record)))
}

pub async fn remove<R: StoredIn>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    R::store(&state.stores).delete(&id).await?;
    tracing::info!(collection = %R::COLLECTION, id = %id, "record deleted");

    Ok(Json(Envelope::ack(format!(
        "{} deleted",
        capitalized(R::COLLECTION.noun())
    ))))
}

pub async fn reorder<R: StoredIn>(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ReorderRequest>,
) -> Result<Json<Envelope<()>>, ApiError> {
    R::store(&state.stores).reorder(&body.order).await?;
    tracing::info!(collection = %R::COLLECTION, count = body.order.len(), "collection reordered");

    Ok(Json(Envelope::ack("Order updated")))
}

/// GET /admin/contacts - Newest first
pub async fn list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<ContactSubmission>>>, ApiError> {
    let contacts = state.stores.contacts.list().await?;
    Ok(Json(Envelope::ok(contacts)))
}

/// PUT /admin/contacts/{id}/read
pub async fn mark_contact_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<ContactSubmission>>, ApiError> {
    let contact = state.stores.contacts.mark_read(&id).await?;
    Ok(Json(Envelope::ok(contact)))
}

/// DELETE /admin/contacts/{id}
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.stores.contacts.delete(&id).await?;
    tracing::info!(contact_id = %id, "contact deleted");
    Ok(Json(Envelope::ack("Contact deleted")))
}

/// GET /admin/stats
pub async fn stats(
    State(state): State<AppState>,
) -> Result<Json<Envelope<DashboardStats>>, ApiError> {
    let stores = &state.stores;
    let stats = DashboardStats {
        templates: stores.templates.count().await?,
        portfolio: stores.portfolio.count().await?,
        team: stores.team.count().await?,
        contacts: stores.contacts.count().await?,
        unread_contacts: stores.contacts.count_unread().await?,
    };
    Ok(Json(Envelope::ok(stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::{NewContact, PortfolioItem, Template};
    use crate::store::Stores;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = AppConfig::for_tests("admin", "pw", std::env::temp_dir()).unwrap();
        AppState::new(config, Stores::in_memory())
    }

    // Auth is covered in `auth`; these exercise the handlers directly.
    fn admin_router(state: AppState) -> Router {
        Router::new()
            .merge(collection_routes::<Template>())
            .merge(collection_routes::<PortfolioItem>())
            .route("/admin/contacts", get(list_contacts))
            .route("/admin/contacts/{id}", axum::routing::delete(delete_contact))
            .route("/admin/contacts/{id}/read", put(mark_contact_read))
            .route("/admin/stats", get(stats))
            .with_state(state)
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        json: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match json {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create_template(state: &AppState, title: &str) -> String {
        let (status, body) = send(
            admin_router(state.clone()),
            "POST",
            "/admin/templates",
            Some(serde_json::json!({
                "title": title,
                "description": "A starter project",
                "difficulty": "Beginner",
                "tags": ["rust", "web"]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_capitalized() {
        assert_eq!(capitalized("team member"), "Team member");
        assert_eq!(capitalized(""), "");
    }

    #[tokio::test]
    async fn test_create_appends_in_display_order() {
        let state = test_state();
        create_template(&state, "First").await;
        create_template(&state, "Second").await;

        let (status, body) = send(admin_router(state), "GET", "/admin/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["title"], "First");
        assert_eq!(body["data"][1]["display_order"], 1);
    }

    #[tokio::test]
    async fn test_create_without_title_is_rejected() {
        let (status, body) = send(
            admin_router(test_state()),
            "POST",
            "/admin/templates",
            Some(serde_json::json!({ "description": "no title" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "validation_error");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let state = test_state();
        let id = create_template(&state, "Draft").await;

        let (status, body) = send(
            admin_router(state.clone()),
            "PUT",
            &format!("/admin/templates/{}", id),
            Some(serde_json::json!({
                "title": "Final",
                "description": "A starter project",
                "is_featured": true
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["title"], "Final");
        assert_eq!(body["data"]["is_featured"], true);

        let (status, body) = send(
            admin_router(state.clone()),
            "DELETE",
            &format!("/admin/templates/{}", id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Template deleted");
        assert_eq!(state.stores.templates.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_not_found() {
        let (status, _) = send(
            admin_router(test_state()),
            "PUT",
            "/admin/templates/nope",
            Some(serde_json::json!({ "title": "T", "description": "D" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reorder_rewrites_display_order() {
        let state = test_state();
        let a = create_template(&state, "A").await;
        let b = create_template(&state, "B").await;
        let c = create_template(&state, "C").await;

        let (status, _) = send(
            admin_router(state.clone()),
            "POST",
            "/admin/templates/reorder",
            Some(serde_json::json!({ "order": [c, a, b] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let titles: Vec<String> = state
            .stores
            .templates
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_partial_reorder_is_rejected() {
        let state = test_state();
        let a = create_template(&state, "A").await;
        create_template(&state, "B").await;

        let (status, _) = send(
            admin_router(state),
            "POST",
            "/admin/templates/reorder",
            Some(serde_json::json!({ "order": [a] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_contacts_mark_read_and_stats() {
        let state = test_state();
        let contact = state
            .stores
            .contacts
            .create(NewContact {
                name: "Ravi".into(),
                email: "ravi@uni.edu".into(),
                message: "hello".into(),
                ..NewContact::default()
            })
            .await
            .unwrap();
        create_template(&state, "A").await;

        let (_, body) = send(admin_router(state.clone()), "GET", "/admin/stats", None).await;
        assert_eq!(body["data"]["templates"], 1);
        assert_eq!(body["data"]["unread_contacts"], 1);

        let uri = format!("/admin/contacts/{}/read", contact.id);
        let (status, body) = send(admin_router(state.clone()), "PUT", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["is_read"], true);

        let (_, body) = send(admin_router(state.clone()), "GET", "/admin/stats", None).await;
        assert_eq!(body["data"]["contacts"], 1);
        assert_eq!(body["data"]["unread_contacts"], 0);

        let uri = format!("/admin/contacts/{}", contact.id);
        let (status, _) = send(admin_router(state.clone()), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(admin_router(state), "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
