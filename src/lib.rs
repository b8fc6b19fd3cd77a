//! JSON:API document validation and record resolution.
//!
//! This library checks inbound JSON:API documents server-side: it resolves
//! resource identifiers to backing domain records through type-scoped
//! [`Adapter`]s (with per-request memoization), and validates submitted
//! relationship data for structure, known and permitted types, existence of
//! the referenced records, and caller-supplied acceptability rules. Every
//! violation is accumulated into a structured [`ErrorCollection`] with
//! JSON-pointer source locations, ready to render as a protocol error
//! payload.
//!
//! HTTP parsing, response encoding, authorization, and hydration are out of
//! scope; the library starts at a parsed [`serde_json::Value`] document and
//! ends at a validity result.
//!
//! # Example
//!
//! ```
//! use jsonapi_validate::{Adapter, ResourceIdentifier, Store, ValidatorFactory};
//! use serde_json::{json, Value};
//!
//! struct People;
//!
//! impl Adapter for People {
//!     fn recognises(&self, resource_type: &str) -> bool {
//!         resource_type == "people"
//!     }
//!     fn exists(&self, identifier: &ResourceIdentifier) -> bool {
//!         identifier.id() == Some("1")
//!     }
//!     fn find(&self, identifier: &ResourceIdentifier) -> Option<Value> {
//!         self.exists(identifier).then(|| json!({ "name": "Frankie" }))
//!     }
//! }
//!
//! let mut store = Store::new();
//! store.register(Box::new(People));
//!
//! let factory = ValidatorFactory::new(store);
//! let validator = factory.relationship_document(factory.relationship(
//!     Some("people"),
//!     true,
//!     None,
//! ));
//!
//! let document = json!({ "data": { "type": "people", "id": "1" } });
//! assert!(validator.validate(&document, None).is_ok());
//!
//! let document = json!({ "data": { "type": "people", "id": "2" } });
//! let err = validator.validate(&document, None).unwrap_err();
//! let errors = err.errors().expect("validation errors");
//! assert!(errors.has_code("relationship-does-not-exist"));
//! ```
//!
//! # Lifecycle
//!
//! A [`Store`] caches every resolution outcome for its own lifetime and is
//! meant to live for exactly one inbound request or operation; build a fresh
//! store (and factory) per request.

mod document;
mod error_factory;
mod errors;
mod factory;
pub mod pointer;
mod relationship;
mod repository;
mod resource;
mod store;
mod types;

pub use document::{RelationshipDocumentValidator, ResourceDocumentValidator};
pub use error_factory::{
    default_templates, keys, ValidatorErrorFactory, STATUS_CONFLICT, STATUS_RELATED_NOT_FOUND,
};
pub use errors::{ErrorCollection, ErrorSource, StoreError, ValidateError, ValidationError};
pub use factory::ValidatorFactory;
pub use relationship::{
    AcceptRelatedResource, Acceptance, HasManyValidator, HasOneValidator, RelationshipValidator,
    ValidatesRelationship,
};
pub use repository::{BraceReplacer, ErrorRepository, ErrorTemplate, Replacer, TemplateValues};
pub use resource::{AttributesValidator, RelationshipsValidator, ResourceValidator};
pub use store::{Adapter, Store};
pub use types::{Relationship, Resource, ResourceIdentifier};
