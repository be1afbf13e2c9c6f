//! Survey response exports, one CSV per module.
//!
//! Exports are read once per path and kept for the life of the process. Reading is
//! forgiving: a row with more fields than the header, or with bytes that are not UTF-8,
//! is dropped and the rest of the file still loads. Short rows are padded with absent
//! values. A file that is missing or has an unreadable header fails the request.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use csv::{ByteRecord, ReaderBuilder};
use tracing::{debug, info, instrument, warn};

use crate::{
    cache::MemoCache,
    errors::{Error, Result},
    modules::SurveyModule,
};

/// Cell values the exporter writes for "no answer"; treated the same as an empty cell.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN",
    "None", "n/a", "nan", "null",
];

/// One respondent's answers, aligned with the table headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRow {
    values: Vec<Option<String>>,
}

impl ResponseRow {
    pub fn new(values: Vec<Option<String>>) -> Self {
        Self { values }
    }

    /// Value at column `index`, or `None` if the cell is absent
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }
}

/// A parsed survey export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyTable {
    headers: Vec<String>,
    rows: Vec<ResponseRow>,
}

impl SurveyTable {
    pub fn new(headers: Vec<String>, rows: Vec<ResponseRow>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV text with a header row.
    pub fn from_reader<R: Read>(reader: R) -> std::result::Result<Self, csv::Error> {
        let mut rdr = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| if i == 0 { h.trim_start_matches('\u{feff}') } else { h }.to_string())
            .collect();

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        let mut record = ByteRecord::new();
        loop {
            match rdr.read_byte_record(&mut record) {
                Ok(true) => match parse_row(&record, headers.len()) {
                    Some(row) => rows.push(row),
                    None => {
                        skipped += 1;
                        debug!(line = record.position().map(|p| p.line()), "skipping malformed row");
                    }
                },
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e),
                Err(e) => {
                    skipped += 1;
                    debug!("skipping unparseable row: {e}");
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = rows.len(), "dropped malformed rows from survey export");
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[ResponseRow] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

fn parse_row(record: &ByteRecord, width: usize) -> Option<ResponseRow> {
    if record.len() > width {
        return None;
    }
    let mut values = Vec::with_capacity(width);
    for field in record.iter() {
        let text = std::str::from_utf8(field).ok()?;
        values.push((!MISSING_MARKERS.contains(&text)).then(|| text.to_string()));
    }
    values.resize(width, None);
    Some(ResponseRow::new(values))
}

/// Read and parse a survey export from disk (blocking).
pub fn read_table(path: &Path) -> std::result::Result<SurveyTable, csv::Error> {
    let file = File::open(path)?;
    SurveyTable::from_reader(file)
}

/// Loads module exports from a directory, memoized per resolved path.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    root: PathBuf,
    cache: MemoCache<PathBuf, Arc<SurveyTable>>,
}

impl DatasetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: MemoCache::unbounded("datasets"),
        }
    }

    /// Where the export for `module` lives
    pub fn path_for(&self, module: &SurveyModule) -> PathBuf {
        self.root.join(&module.dataset)
    }

    #[instrument(skip(self, module), fields(module = %module.name), err)]
    pub async fn load(&self, module: &SurveyModule) -> Result<Arc<SurveyTable>> {
        let path = self.path_for(module);
        self.cache
            .get_or_try_insert_with(path.clone(), move || async move {
                let blocking_path = path.clone();
                let table = tokio::task::spawn_blocking(move || read_table(&blocking_path))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn dataset read task: {e}"),
                    })?
                    .map_err(|source| Error::DatasetUnavailable {
                        module: module.name.clone(),
                        path: path.clone(),
                        source,
                    })?;
                info!(path = %path.display(), rows = table.rows().len(), "loaded survey export");
                Ok::<_, Error>(Arc::new(table))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EXPORT: &str = "\
ID de la respuesta,Correo electrónico,Pregunta 1,Pregunta 2
1,test@example.com,Sí,Mucho
2,otra@example.com,No,
3,test@example.com,NA,Poco
";

    #[test]
    fn test_parse_headers_and_rows() {
        let table = SurveyTable::from_reader(EXPORT.as_bytes()).unwrap();
        assert_eq!(table.headers(), ["ID de la respuesta", "Correo electrónico", "Pregunta 1", "Pregunta 2"]);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[0].get(2), Some("Sí"));
        assert_eq!(table.column_index("Pregunta 2"), Some(3));
    }

    #[test]
    fn test_empty_and_na_cells_are_absent() {
        let table = SurveyTable::from_reader(EXPORT.as_bytes()).unwrap();
        assert_eq!(table.rows()[1].get(3), None);
        assert_eq!(table.rows()[2].get(2), None);
        assert_eq!(table.rows()[2].get(3), Some("Poco"));
    }

    #[test]
    fn test_rows_with_too_many_fields_are_skipped() {
        let text = "a,b\n1,2\n3,4,5\n6,7\n";
        let table = SurveyTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1].get(0), Some("6"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let text = "a,b,c\n1\n";
        let table = SurveyTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].values(), [Some("1".to_string()), None, None]);
    }

    #[test]
    fn test_non_utf8_rows_are_skipped() {
        let mut bytes = b"a,b\n1,2\n".to_vec();
        bytes.extend_from_slice(b"\xff\xfe,3\n4,5\n");
        let table = SurveyTable::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[1].get(0), Some("4"));
    }

    #[test]
    fn test_byte_order_mark_is_stripped_from_first_header() {
        let text = "\u{feff}ID,Correo\n1,a@b.c\n";
        let table = SurveyTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.headers()[0], "ID");
    }

    #[test]
    fn test_quoted_fields_keep_commas_and_newlines() {
        let text = "ID,Comentario\n1,\"uno, dos\ntres\"\n";
        let table = SurveyTable::from_reader(text.as_bytes()).unwrap();
        assert_eq!(table.rows()[0].get(1), Some("uno, dos\ntres"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_dataset_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(dir.path());
        let module = SurveyModule::new("Módulo 1", "M1 (367996).csv", 367996);

        let err = store.load(&module).await.unwrap_err();
        assert!(matches!(err, Error::DatasetUnavailable { ref module, .. } if module == "Módulo 1"));
    }

    #[tokio::test]
    async fn test_load_is_memoized_for_process_lifetime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("M1.csv");
        File::create(&path).unwrap().write_all(EXPORT.as_bytes()).unwrap();

        let store = DatasetStore::new(dir.path());
        let module = SurveyModule::new("Módulo 1", "M1.csv", 367996);

        let first = store.load(&module).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        let second = store.load(&module).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.rows().len(), 3);
    }
}
