use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;

use crate::api::crud::process_add;
use crate::api::envelope::{json_body, CreatedResult, Envelope};
use crate::app::AppState;
use crate::db::models::{NewQuoteRequest, QuoteRequest};
use crate::db::repository::Repository;
use crate::error::AppError;
use crate::mail::mailer::Notifier;

/// Persist a quote request, then notify the admin.
///
/// The notification is attempted exactly once and never fails the request.
pub async fn process_quote(
    repo: &dyn Repository<QuoteRequest>,
    notifier: Option<&Notifier>,
    draft: NewQuoteRequest,
) -> Result<QuoteRequest, AppError> {
    let quote = process_add(repo, draft).await?;

    match notifier {
        Some(notifier) => notifier.quote_received(&quote).await,
        None => tracing::debug!(quote_id = %quote.id, "mail disabled, skipping notification"),
    }

    Ok(quote)
}

/// Axum handler for `POST /api/shop/quotes/add`.
pub async fn add_quote_handler(
    State(state): State<AppState>,
    body: Result<axum::Json<NewQuoteRequest>, JsonRejection>,
) -> CreatedResult<QuoteRequest> {
    let quote = process_quote(
        state.quotes.as_ref(),
        state.notifier.as_ref(),
        json_body(body)?,
    )
    .await?;
    Ok((StatusCode::CREATED, axum::Json(Envelope::data(quote))))
}
