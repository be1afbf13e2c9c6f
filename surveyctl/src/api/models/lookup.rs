use serde::Serialize;

use crate::{lookup::LookupOutcome, presenter::ResponseCard};

/// Result of `POST /api/v1/lookup`
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// `awaiting_input`, `denied`, `empty` or `displaying`
    pub state: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted: Option<String>,
    pub count: usize,
    pub cards: Vec<ResponseCard>,
}

impl From<LookupOutcome> for LookupResponse {
    fn from(outcome: LookupOutcome) -> Self {
        let state = outcome.label();
        let message = outcome.message();
        let granted = outcome.granted_message();
        let cards = match outcome {
            LookupOutcome::Displaying { cards, .. } => cards,
            _ => Vec::new(),
        };
        Self {
            state,
            message,
            granted,
            count: cards.len(),
            cards,
        }
    }
}
