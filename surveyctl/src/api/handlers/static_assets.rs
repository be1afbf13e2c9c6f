//! HTTP handlers for the stylesheet and the configured logo.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Response, StatusCode, header},
    response::IntoResponse,
};
use tracing::{instrument, warn};

use crate::{AppState, static_assets};

fn not_found() -> Response<Body> {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

/// `GET /static/{*path}`: embedded assets
#[instrument]
pub async fn serve_embedded_asset(Path(path): Path<String>) -> Response<Body> {
    let Some(content) = static_assets::Assets::get(&path) else {
        return not_found();
    };
    let mime = mime_guess::from_path(&path).first_or_octet_stream();

    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        content.data.into_owned(),
    )
        .into_response()
}

/// `GET /branding/logo`: the image at `metadata.logo_path`, if configured and readable
#[instrument(skip_all)]
pub async fn serve_logo(State(state): State<AppState>) -> Response<Body> {
    let Some(path) = state.config.metadata.logo_path.as_ref() else {
        return not_found();
    };

    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            warn!(path = %path.display(), "failed to read logo: {e}");
            not_found()
        }
    }
}
