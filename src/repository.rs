//! Error template repository.
//!
//! Maps an error key to a configured template (title, detail, status, code)
//! and instantiates mutable error objects from it, substituting caller
//! values into the detail text. Lookup never fails: an unconfigured key
//! degrades to a blank error so the validation path stays non-throwing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Values substituted into a template's detail text.
pub type TemplateValues<'a> = &'a [(&'a str, String)];

/// A configured error template.
///
/// Deserializable so template tables can be loaded from JSON config files.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ErrorTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Overrides the lookup key as the produced error's `code`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorTemplate {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            detail: Some(detail.into()),
            status: None,
            code: None,
        }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Substitutes caller-supplied values into detail text.
pub trait Replacer {
    fn replace(&self, detail: &str, values: TemplateValues<'_>) -> String;
}

/// Default replacer: substitutes `{name}` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct BraceReplacer;

impl Replacer for BraceReplacer {
    fn replace(&self, detail: &str, values: TemplateValues<'_>) -> String {
        let mut out = detail.to_string();
        for (name, value) in values {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }
}

/// Configuration-keyed table of error templates.
pub struct ErrorRepository {
    templates: HashMap<String, ErrorTemplate>,
    replacer: Option<Box<dyn Replacer>>,
}

impl ErrorRepository {
    /// An empty repository with the default `{name}` replacer.
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
            replacer: Some(Box::new(BraceReplacer)),
        }
    }

    /// A repository with a custom replacer, or none (details pass through
    /// unsubstituted).
    pub fn with_replacer(replacer: Option<Box<dyn Replacer>>) -> Self {
        Self {
            templates: HashMap::new(),
            replacer,
        }
    }

    /// Merge template configuration; later keys overwrite earlier ones.
    pub fn configure(&mut self, templates: HashMap<String, ErrorTemplate>) -> &mut Self {
        self.templates.extend(templates);
        self
    }

    /// Is a template configured for this key?
    pub fn exists(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Instantiate an error for the given key.
    ///
    /// A missing template produces a blank error carrying only the key as
    /// its code.
    pub fn error(&self, key: &str, values: TemplateValues<'_>) -> ValidationError {
        self.make(key, values)
    }

    /// Instantiate an error and stamp a source pointer on it.
    pub fn error_with_pointer(
        &self,
        key: &str,
        pointer: impl Into<String>,
        values: TemplateValues<'_>,
    ) -> ValidationError {
        let mut error = self.make(key, values);
        error.set_pointer(pointer);
        error
    }

    /// Instantiate an error and stamp a source parameter on it.
    pub fn error_with_parameter(
        &self,
        key: &str,
        parameter: impl Into<String>,
        values: TemplateValues<'_>,
    ) -> ValidationError {
        let mut error = self.make(key, values);
        error.set_parameter(parameter);
        error
    }

    fn make(&self, key: &str, values: TemplateValues<'_>) -> ValidationError {
        let template = self.templates.get(key).cloned().unwrap_or_default();

        let mut error = ValidationError {
            code: template.code.or_else(|| Some(key.to_string())),
            title: template.title,
            detail: template.detail,
            status: template.status.map(|s| s.to_string()),
            source: None,
            meta: None,
        };

        if let (Some(replacer), Some(detail)) = (&self.replacer, &error.detail) {
            if !detail.is_empty() {
                error.detail = Some(replacer.replace(detail, values));
            }
        }

        error
    }
}

impl Default for ErrorRepository {
    fn default() -> Self {
        Self::new()
    }
}
