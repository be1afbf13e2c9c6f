//! Server-rendered pages.
//!
//! Templates are embedded at build time and compiled once at startup. Files ending in
//! `.html` are auto-escaped, so survey answers can never inject markup.

use std::sync::Arc;

use minijinja::Environment;
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::{
    errors::{Error, Result},
    presenter::ResponseCard,
};

#[derive(RustEmbed)]
#[folder = "templates/"]
struct TemplateFiles;

pub const LOOKUP_TEMPLATE: &str = "lookup.html";

/// Banner severity, mapped to a CSS class in the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Banner {
    pub tone: Tone,
    pub text: String,
}

/// Everything the lookup page shows.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LookupPage {
    pub title: String,
    pub has_logo: bool,
    pub modules: Vec<String>,
    pub selected_module: Option<String>,
    /// Echoed back into the form. The token never is.
    pub email: String,
    pub banners: Vec<Banner>,
    pub cards: Vec<ResponseCard>,
}

#[derive(Clone)]
pub struct Templates {
    env: Arc<Environment<'static>>,
}

impl Templates {
    /// Compile every embedded template.
    pub fn load() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        for name in TemplateFiles::iter() {
            let Some(file) = TemplateFiles::get(&name) else {
                continue;
            };
            let source = String::from_utf8(file.data.into_owned())?;
            env.add_template_owned(name.into_owned(), source)?;
        }
        Ok(Self { env: Arc::new(env) })
    }

    pub fn render_lookup(&self, page: &LookupPage) -> Result<String> {
        self.env
            .get_template(LOOKUP_TEMPLATE)
            .and_then(|t| t.render(page))
            .map_err(|e| Error::Internal {
                operation: format!("render {LOOKUP_TEMPLATE}: {e}"),
            })
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}
