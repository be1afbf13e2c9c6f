//! The lookup flow: credentials in, a respondent's own answers out.
//!
//! ```text
//! AwaitingInput ─→ Authenticating ─┬─→ Denied
//!                                  └─→ Authenticated ─→ Retrieving ─┬─→ Empty
//!                                                                   └─→ Displaying
//! ```
//!
//! Incomplete input never reaches the credential store. Failures of either data source
//! end the request with an [`Error`](crate::errors::Error); nothing is retried and no
//! partial result is shown.

use axum::http::StatusCode;
use metrics::counter;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::{
    answers::AnswerRetriever,
    auth::Authenticator,
    errors::Result,
    modules::ModuleCatalog,
    presenter::{Presenter, ResponseCard},
    types::{normalize_email, normalize_token},
};

pub const PROMPT_MESSAGE: &str = "Por favor ingresa tu correo y tu token.";
pub const DENIED_MESSAGE: &str = "Credenciales inválidas. Verifica correo o token.";
pub const EMPTY_MESSAGE: &str = "No hay respuestas registradas para tu correo en este módulo.";

/// What the respondent submitted. Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LookupRequest {
    pub module: String,
    pub email: String,
    pub token: String,
}

/// Where a lookup ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Module, email or token missing
    AwaitingInput,
    /// No token table row matches the pair
    Denied,
    /// Authenticated, but no response carries the email
    Empty { email: String, module: String },
    /// Authenticated, with at least one response
    Displaying {
        email: String,
        module: String,
        cards: Vec<ResponseCard>,
    },
}

impl LookupOutcome {
    /// Label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            LookupOutcome::AwaitingInput => "awaiting_input",
            LookupOutcome::Denied => "denied",
            LookupOutcome::Empty { .. } => "empty",
            LookupOutcome::Displaying { .. } => "displaying",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LookupOutcome::AwaitingInput => StatusCode::BAD_REQUEST,
            LookupOutcome::Denied => StatusCode::UNAUTHORIZED,
            LookupOutcome::Empty { .. } | LookupOutcome::Displaying { .. } => StatusCode::OK,
        }
    }

    /// "Acceso concedido como ..." once the pair has been accepted
    pub fn granted_message(&self) -> Option<String> {
        match self {
            LookupOutcome::Empty { email, module } | LookupOutcome::Displaying { email, module, .. } => {
                Some(format!("Acceso concedido como {email} en {module}"))
            }
            LookupOutcome::AwaitingInput | LookupOutcome::Denied => None,
        }
    }

    /// The banner shown for this outcome
    pub fn message(&self) -> String {
        match self {
            LookupOutcome::AwaitingInput => PROMPT_MESSAGE.to_string(),
            LookupOutcome::Denied => DENIED_MESSAGE.to_string(),
            LookupOutcome::Empty { .. } => EMPTY_MESSAGE.to_string(),
            LookupOutcome::Displaying { cards, .. } => format!("Respuestas encontradas: {}", cards.len()),
        }
    }

    pub fn cards(&self) -> &[ResponseCard] {
        match self {
            LookupOutcome::Displaying { cards, .. } => cards,
            _ => &[],
        }
    }
}

/// Runs one lookup from submitted credentials to rendered cards.
#[derive(Debug, Clone)]
pub struct LookupService {
    catalog: ModuleCatalog,
    authenticator: Authenticator,
    retriever: AnswerRetriever,
    presenter: Presenter,
}

impl LookupService {
    pub fn new(catalog: ModuleCatalog, authenticator: Authenticator, retriever: AnswerRetriever, presenter: Presenter) -> Self {
        Self {
            catalog,
            authenticator,
            retriever,
            presenter,
        }
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    #[instrument(skip_all, fields(module = %request.module))]
    pub async fn run(&self, request: &LookupRequest) -> Result<LookupOutcome> {
        let result = self.advance(request).await;
        let outcome = match &result {
            Ok(outcome) => outcome.label(),
            Err(_) => "error",
        };
        counter!("surveyctl_lookups_total", "outcome" => outcome).increment(1);
        result
    }

    async fn advance(&self, request: &LookupRequest) -> Result<LookupOutcome> {
        let email = normalize_email(&request.email);
        let token = normalize_token(&request.token);
        let module_name = request.module.trim();
        if module_name.is_empty() || email.is_empty() || token.is_empty() {
            return Ok(LookupOutcome::AwaitingInput);
        }

        let module = self.catalog.resolve(module_name)?;

        if !self.authenticator.authenticate(module, &email, &token).await? {
            info!("credentials rejected");
            return Ok(LookupOutcome::Denied);
        }

        let answers = self.retriever.retrieve(module, &email).await?;
        if answers.is_empty() {
            return Ok(LookupOutcome::Empty {
                email,
                module: module.name.clone(),
            });
        }

        Ok(LookupOutcome::Displaying {
            email,
            module: module.name.clone(),
            cards: self.presenter.cards(&answers),
        })
    }
}
