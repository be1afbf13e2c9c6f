//! The fixed catalog of survey modules.
//!
//! Each module pairs a display name (what the respondent picks in the form) with the CSV
//! export holding its answers and the survey id whose token table authenticates it. The
//! catalog is read from configuration at startup and never changes afterwards.

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

use crate::{
    errors::{Error, Result},
    types::SurveyId,
};

/// One survey instrument.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SurveyModule {
    /// Display name, e.g. "Módulo 1"
    pub name: String,
    /// Response export, relative to `datasets.dir` unless absolute
    pub dataset: PathBuf,
    /// Survey id; names the credential table
    pub survey_id: SurveyId,
}

impl SurveyModule {
    pub fn new(name: impl Into<String>, dataset: impl Into<PathBuf>, survey_id: u32) -> Self {
        Self {
            name: name.into(),
            dataset: dataset.into(),
            survey_id: SurveyId(survey_id),
        }
    }
}

/// The eight LEPPODS modules and their exports.
pub fn default_modules() -> Vec<SurveyModule> {
    vec![
        SurveyModule::new("Módulo 1", "M1 (367996).csv", 367996),
        SurveyModule::new("Módulo 2", "M2 (762638).csv", 762638),
        SurveyModule::new("Módulo 3", "M3 (156244).csv", 156244),
        SurveyModule::new("Módulo 4", "M4 (238547).csv", 238547),
        SurveyModule::new("Módulo 5", "M5 (381421).csv", 381421),
        SurveyModule::new("Módulo 6", "M6 (865393).csv", 865393),
        SurveyModule::new("Módulo 7", "M7 (988223).csv", 988223),
        SurveyModule::new("Módulo 8", "M8 (429228).csv", 429228),
    ]
}

/// Ordered, immutable lookup over the configured modules.
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    modules: Arc<[SurveyModule]>,
}

impl ModuleCatalog {
    pub fn new(modules: Vec<SurveyModule>) -> Self {
        Self { modules: modules.into() }
    }

    /// Find a module by its exact display name
    pub fn get(&self, name: &str) -> Option<&SurveyModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Like [`get`](Self::get), but an unknown name is a client error
    pub fn resolve(&self, name: &str) -> Result<&SurveyModule> {
        self.get(name).ok_or_else(|| Error::BadRequest {
            message: format!("Módulo desconocido: {name}"),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(|m| m.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
