//! Filtering a module's export down to one respondent's rows.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    datasets::{DatasetStore, ResponseRow, SurveyTable},
    errors::{Error, Result},
    modules::SurveyModule,
    types::normalize_email,
};

/// Header substring that marks the email column (compared case-insensitively)
pub const EMAIL_COLUMN_MARKER: &str = "correo";

/// Index of the first header containing [`EMAIL_COLUMN_MARKER`], ignoring case.
///
/// Only the first match is used; later matching columns are ignored.
pub fn find_email_column(headers: &[String]) -> Option<usize> {
    headers.iter().position(|h| h.to_lowercase().contains(EMAIL_COLUMN_MARKER))
}

/// The rows of one export that belong to one respondent.
#[derive(Debug, Clone)]
pub struct RetrievedAnswers {
    table: Arc<SurveyTable>,
    email_column: usize,
    matches: Vec<usize>,
}

impl RetrievedAnswers {
    pub fn headers(&self) -> &[String] {
        self.table.headers()
    }

    /// Index of the column the rows were matched on
    pub fn email_column(&self) -> usize {
        self.email_column
    }

    pub fn email_column_name(&self) -> &str {
        &self.table.headers()[self.email_column]
    }

    pub fn rows(&self) -> impl Iterator<Item = &ResponseRow> {
        self.matches.iter().map(|&i| &self.table.rows()[i])
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Select the rows of `table` whose email column matches `email` after normalization.
pub fn filter_by_email(table: Arc<SurveyTable>, module: &SurveyModule, email: &str) -> Result<RetrievedAnswers> {
    let email_column = find_email_column(table.headers()).ok_or_else(|| Error::MissingEmailColumn {
        module: module.name.clone(),
    })?;

    let wanted = normalize_email(email);
    let matches = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| row.get(email_column).is_some_and(|v| normalize_email(v) == wanted))
        .map(|(i, _)| i)
        .collect();

    Ok(RetrievedAnswers {
        table,
        email_column,
        matches,
    })
}

#[derive(Debug, Clone)]
pub struct AnswerRetriever {
    datasets: DatasetStore,
}

impl AnswerRetriever {
    pub fn new(datasets: DatasetStore) -> Self {
        Self { datasets }
    }

    #[instrument(skip(self, module, email), fields(module = %module.name), err)]
    pub async fn retrieve(&self, module: &SurveyModule, email: &str) -> Result<RetrievedAnswers> {
        let table = self.datasets.load(module).await?;
        let answers = filter_by_email(table, module, email)?;
        debug!(
            email_column = answers.email_column_name(),
            matches = answers.len(),
            "filtered survey export"
        );
        Ok(answers)
    }
}
