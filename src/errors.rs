//! Error types: fatal configuration errors and user-facing validation errors.
//!
//! Two taxonomies. `StoreError`/`ValidateError` are fatal: they mean the
//! calling system is misconfigured, and they propagate as `Result::Err`.
//! `ValidationError`/`ErrorCollection` are data: they describe bad client
//! input and are accumulated, never thrown.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::ResourceIdentifier;

/// Errors raised by the resource store.
///
/// These indicate a misconfigured store or a record the caller asserted to
/// exist, not invalid client input.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no adapter registered for resource type: {resource_type}")]
    NoAdapter { resource_type: String },

    #[error("record not found: {identifier}")]
    RecordNotFound { identifier: ResourceIdentifier },
}

/// Errors returned by validator entry points.
///
/// `Invalid` is the expected outcome of bad client input and carries the
/// accumulated error collection; `Store` is the fatal taxonomy surfacing
/// through a validation call and should be treated as a server error.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("validation failed with {} error(s)", .0.len())]
    Invalid(ErrorCollection),
}

impl ValidateError {
    /// The validation errors, if this is an `Invalid` result.
    pub fn errors(&self) -> Option<&ErrorCollection> {
        match self {
            ValidateError::Invalid(errors) => Some(errors),
            ValidateError::Store(_) => None,
        }
    }
}

/// Where in the document or query an error originates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSource {
    /// JSON pointer into the request document.
    #[serde(rename = "pointer")]
    Pointer(String),
    /// Query parameter name.
    #[serde(rename = "parameter")]
    Parameter(String),
}

/// A single protocol error object.
///
/// All members are optional; serialization follows the JSON:API error-object
/// shape so a caller can render the collection directly into an error payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationError {
    /// Application-specific error code, normally the template key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// HTTP status, as a string per the JSON:API error-object shape.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ValidationError {
    /// A blank error carrying only a code.
    pub fn with_code(code: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::default()
        }
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = Some(status.to_string());
    }

    pub fn set_pointer(&mut self, pointer: impl Into<String>) {
        self.source = Some(ErrorSource::Pointer(pointer.into()));
    }

    pub fn set_parameter(&mut self, parameter: impl Into<String>) {
        self.source = Some(ErrorSource::Parameter(parameter.into()));
    }

    /// The source pointer, if one is set.
    pub fn pointer(&self) -> Option<&str> {
        match &self.source {
            Some(ErrorSource::Pointer(p)) => Some(p),
            _ => None,
        }
    }

    /// The source parameter, if one is set.
    pub fn parameter(&self) -> Option<&str> {
        match &self.source {
            Some(ErrorSource::Parameter(p)) => Some(p),
            _ => None,
        }
    }

    /// Merge another error onto this one; the other error's members win.
    ///
    /// Meta maps are combined key-by-key, again with the other error's
    /// entries taking precedence.
    pub fn merge(&mut self, other: &ValidationError) {
        if other.code.is_some() {
            self.code = other.code.clone();
        }
        if other.title.is_some() {
            self.title = other.title.clone();
        }
        if other.detail.is_some() {
            self.detail = other.detail.clone();
        }
        if other.status.is_some() {
            self.status = other.status.clone();
        }
        if other.source.is_some() {
            self.source = other.source.clone();
        }
        if let Some(other_meta) = &other.meta {
            let meta = self.meta.get_or_insert_with(Map::new);
            for (key, value) in other_meta {
                meta.insert(key.clone(), value.clone());
            }
        }
    }

    /// A fresh error derived from this one with `other` merged on top.
    pub fn merged(&self, other: &ValidationError) -> ValidationError {
        let mut derived = self.clone();
        derived.merge(other);
        derived
    }
}

/// An ordered collection of validation errors; valid iff empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCollection(Vec<ValidationError>);

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, errors: ErrorCollection) {
        self.0.extend(errors.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    /// True if any error in the collection carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.0.iter().any(|e| e.code.as_deref() == Some(code))
    }
}

impl From<ValidationError> for ErrorCollection {
    fn from(error: ValidationError) -> Self {
        Self(vec![error])
    }
}

impl IntoIterator for ErrorCollection {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<ValidationError> for ErrorCollection {
    fn from_iter<I: IntoIterator<Item = ValidationError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
