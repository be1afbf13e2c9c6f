//! Turning matched rows into what a respondent is shown.

use serde::Serialize;
use std::collections::HashSet;

use crate::{answers::RetrievedAnswers, config::PresentationConfig};

/// One question and its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerField {
    pub question: String,
    pub answer: String,
}

/// One response, rendered as a collapsible block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseCard {
    pub title: String,
    pub answers: Vec<AnswerField>,
}

#[derive(Debug, Clone)]
pub struct Presenter {
    hidden_columns: HashSet<String>,
    response_id_column: String,
}

impl Presenter {
    pub fn new(config: &PresentationConfig) -> Self {
        Self {
            hidden_columns: config.hidden_columns.iter().cloned().collect(),
            response_id_column: config.response_id_column.clone(),
        }
    }

    /// Whether a column is ever shown. The column the rows were matched on never is.
    fn is_visible(&self, header: &str, index: usize, answers: &RetrievedAnswers) -> bool {
        index != answers.email_column() && !self.hidden_columns.contains(header)
    }

    /// One card per matched row, in file order. Absent values are left out.
    pub fn cards(&self, answers: &RetrievedAnswers) -> Vec<ResponseCard> {
        let headers = answers.headers();
        let id_column = headers.iter().position(|h| *h == self.response_id_column);

        answers
            .rows()
            .enumerate()
            .map(|(ordinal, row)| {
                let id = id_column
                    .and_then(|i| row.get(i))
                    .map(str::to_string)
                    .unwrap_or_else(|| (ordinal + 1).to_string());

                let fields = headers
                    .iter()
                    .enumerate()
                    .filter(|(i, h)| self.is_visible(h, *i, answers))
                    .filter_map(|(i, h)| {
                        row.get(i).map(|v| AnswerField {
                            question: h.clone(),
                            answer: v.to_string(),
                        })
                    })
                    .collect();

                ResponseCard {
                    title: format!("Respuesta ID: {id}"),
                    answers: fields,
                }
            })
            .collect()
    }
}
