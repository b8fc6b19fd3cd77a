//! Document-level validators.
//!
//! Purely structural gates over the document root, delegating the real work
//! to a resource or relationship validator. No existence or acceptability
//! logic lives here.

use std::rc::Rc;

use serde_json::Value;

use crate::error_factory::ValidatorErrorFactory;
use crate::errors::{ErrorCollection, ValidateError};
use crate::pointer;
use crate::relationship::ValidatesRelationship;
use crate::resource::ResourceValidator;
use crate::types::{Relationship, Resource, DATA};

/// Validates a document whose `data` member is a resource object.
pub struct ResourceDocumentValidator {
    error_factory: Rc<ValidatorErrorFactory>,
    resource: ResourceValidator,
}

impl ResourceDocumentValidator {
    pub fn new(error_factory: Rc<ValidatorErrorFactory>, resource: ResourceValidator) -> Self {
        Self {
            error_factory,
            resource,
        }
    }

    /// Validate an inbound resource document.
    ///
    /// The `data` member must be present and must be an object; everything
    /// beyond that is the resource validator's concern.
    ///
    /// # Errors
    ///
    /// `ValidateError::Invalid` for bad input, `ValidateError::Store` for a
    /// store configuration failure.
    pub fn validate(&self, document: &Value, record: Option<&Value>) -> Result<(), ValidateError> {
        let Some(data) = document.get(DATA) else {
            return Err(invalid(
                self.error_factory.member_required(DATA, pointer::root()),
            ));
        };

        if !data.is_object() {
            return Err(invalid(
                self.error_factory
                    .member_object_expected(DATA, pointer::data()),
            ));
        }

        self.resource.validate(&Resource::from_value(data), record)
    }
}

/// Validates a document whose `data` member is relationship data.
///
/// Used for relationship endpoints, where the submitted document is itself
/// the relationship fragment; errors address the document root.
pub struct RelationshipDocumentValidator {
    error_factory: Rc<ValidatorErrorFactory>,
    relationship: Box<dyn ValidatesRelationship>,
}

impl RelationshipDocumentValidator {
    pub fn new(
        error_factory: Rc<ValidatorErrorFactory>,
        relationship: Box<dyn ValidatesRelationship>,
    ) -> Self {
        Self {
            error_factory,
            relationship,
        }
    }

    /// Validate an inbound relationship document.
    ///
    /// # Errors
    ///
    /// `ValidateError::Invalid` for bad input, `ValidateError::Store` for a
    /// store configuration failure.
    pub fn validate(&self, document: &Value, record: Option<&Value>) -> Result<(), ValidateError> {
        if document.get(DATA).is_none() {
            return Err(invalid(
                self.error_factory.member_required(DATA, pointer::root()),
            ));
        }

        self.relationship
            .validate(&Relationship::from_value(document), record, None, None)
    }
}

fn invalid(error: crate::errors::ValidationError) -> ValidateError {
    ValidateError::Invalid(ErrorCollection::from(error))
}
