/**
 * Public Routes
 * Read-only collection listings and the contact intake
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::contact::ContactForm;
use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::models::{NewContact, Template};
use crate::routes::JsonBody;
use crate::state::AppState;
use crate::store::StoredIn;

#[derive(Debug, Serialize, Deserialize)]
pub struct Banner {
    pub name: String,
    pub version: String,
}

/// GET / - Service banner
pub async fn banner() -> Json<Banner> {
    Json(Banner {
        name: "DevForge API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/{templates,portfolio,team} - Full collection in display order
pub async fn list<R: StoredIn>(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<R>>>, ApiError> {
    let records = R::store(&state.stores).list().await?;
    Ok(Json(Envelope::ok(records)))
}

/// GET /api/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Template>>, ApiError> {
    let template = state.stores.templates.get(&id).await?;
    Ok(Json(Envelope::ok(template)))
}

/// POST /api/contact - Store a submission and notify the owner
///
/// The body goes through the same checks as the client-side form, so a
/// request that skipped the form is held to the same rules.
pub async fn submit_contact(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<NewContact>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    let contact = ContactForm::from(body)
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let stored = state.stores.contacts.create(contact).await?;
    tracing::info!(contact_id = %stored.id, "contact submission stored");

    state.notifier.contact_received(stored);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ack("Thank you! We will get back to you soon.")),
    ))
}
