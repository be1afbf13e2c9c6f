//! The lookup page and JSON API.

use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use crate::{
    AppState,
    api::models::lookup::LookupResponse,
    errors::Result,
    lookup::{LookupOutcome, LookupRequest},
    templates::{Banner, LookupPage, Tone},
};

fn base_page(state: &AppState) -> LookupPage {
    LookupPage {
        title: state.config.metadata.title.clone(),
        has_logo: state.config.metadata.logo_path.is_some(),
        modules: state.lookup.catalog().names().map(String::from).collect(),
        ..Default::default()
    }
}

fn banner(tone: Tone, text: impl Into<String>) -> Banner {
    Banner { tone, text: text.into() }
}

fn outcome_banners(outcome: &LookupOutcome) -> Vec<Banner> {
    match outcome {
        LookupOutcome::AwaitingInput => vec![banner(Tone::Info, outcome.message())],
        LookupOutcome::Denied => vec![banner(Tone::Error, outcome.message())],
        LookupOutcome::Empty { .. } | LookupOutcome::Displaying { .. } => {
            let mut banners: Vec<_> = outcome.granted_message().into_iter().map(|m| banner(Tone::Success, m)).collect();
            let tone = if matches!(outcome, LookupOutcome::Empty { .. }) {
                Tone::Warning
            } else {
                Tone::Success
            };
            banners.push(banner(tone, outcome.message()));
            banners
        }
    }
}

/// `GET /`: the empty form
#[instrument(skip_all, err)]
pub async fn lookup_page(State(state): State<AppState>) -> Result<Html<String>> {
    let page = base_page(&state);
    Ok(Html(state.templates.render_lookup(&page)?))
}

/// `POST /`: run the lookup and re-render the page with its outcome
#[instrument(skip_all, err)]
pub async fn submit_lookup(State(state): State<AppState>, Form(request): Form<LookupRequest>) -> Result<Response> {
    let mut page = base_page(&state);
    page.selected_module = Some(request.module.clone());
    page.email = request.email.trim().to_string();

    let status = match state.lookup.run(&request).await {
        Ok(outcome) => {
            page.banners = outcome_banners(&outcome);
            let status = outcome.status_code();
            if let LookupOutcome::Displaying { cards, .. } = outcome {
                page.cards = cards;
            }
            status
        }
        Err(e) => {
            e.log();
            page.banners = vec![banner(Tone::Error, e.user_message())];
            e.status_code()
        }
    };

    let html = state.templates.render_lookup(&page)?;
    Ok((status, Html(html)).into_response())
}

/// `POST /api/v1/lookup`
#[instrument(skip_all, err)]
pub async fn lookup_json(State(state): State<AppState>, Json(request): Json<LookupRequest>) -> Result<(StatusCode, Json<LookupResponse>)> {
    let outcome = state.lookup.run(&request).await?;
    Ok((outcome.status_code(), Json(outcome.into())))
}

/// `GET /api/v1/modules`
pub async fn list_modules(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.lookup.catalog().names().map(String::from).collect())
}
