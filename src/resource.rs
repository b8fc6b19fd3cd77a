//! Resource-level validation: the resource object of a resource document.
//!
//! `ResourceValidator` gates the `type`/`id` members against the endpoint's
//! expectations, runs an optional attributes rule, and hands every
//! relationship to a `RelationshipsValidator`. Unlike a single relationship,
//! which short-circuits internally, errors accumulate across the members of
//! a resource so the client sees every failing relationship at once.

use std::rc::Rc;

use serde_json::Value;

use crate::error_factory::ValidatorErrorFactory;
use crate::errors::{ErrorCollection, ValidateError};
use crate::pointer;
use crate::relationship::ValidatesRelationship;
use crate::types::{Resource, TYPE};

/// Caller-supplied rule for a resource's `attributes` member.
pub trait AttributesValidator {
    /// Validate the attributes fragment.
    ///
    /// # Errors
    ///
    /// An error collection describing why the attributes are invalid.
    fn validate(&self, attributes: &Value, record: Option<&Value>) -> Result<(), ErrorCollection>;
}

impl<F> AttributesValidator for F
where
    F: Fn(&Value, Option<&Value>) -> Result<(), ErrorCollection>,
{
    fn validate(&self, attributes: &Value, record: Option<&Value>) -> Result<(), ErrorCollection> {
        self(attributes, record)
    }
}

/// Validates every relationship on a resource.
///
/// Relationship keys with a registered validator use it; any other key falls
/// back to the default validator, when one is configured. Keys with neither
/// are ignored (they belong to relationships this endpoint does not govern).
pub struct RelationshipsValidator {
    validators: Vec<(String, Box<dyn ValidatesRelationship>)>,
    fallback: Option<Box<dyn ValidatesRelationship>>,
}

impl RelationshipsValidator {
    pub fn new() -> Self {
        Self {
            validators: Vec::new(),
            fallback: None,
        }
    }

    /// Register a validator for a named relationship.
    pub fn add(&mut self, key: impl Into<String>, validator: Box<dyn ValidatesRelationship>) -> &mut Self {
        self.validators.push((key.into(), validator));
        self
    }

    /// Validator used for relationship keys with no registration of their own.
    pub fn fallback(&mut self, validator: Box<dyn ValidatesRelationship>) -> &mut Self {
        self.fallback = Some(validator);
        self
    }

    fn validator_for(&self, key: &str) -> Option<&dyn ValidatesRelationship> {
        self.validators
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_ref())
            .or(self.fallback.as_deref())
    }

    /// Validate all of a resource's relationships, accumulating errors
    /// across keys.
    ///
    /// # Errors
    ///
    /// `ValidateError::Invalid` with every error found, or
    /// `ValidateError::Store` on a store configuration failure.
    pub fn validate(
        &self,
        resource: &Resource,
        record: Option<&Value>,
    ) -> Result<(), ValidateError> {
        let mut errors = ErrorCollection::new();

        for (key, relationship) in resource.relationships() {
            let Some(validator) = self.validator_for(key) else {
                continue;
            };

            match validator.validate(relationship, record, Some(key), Some(resource)) {
                Ok(()) => {}
                Err(ValidateError::Invalid(nested)) => errors.extend(nested),
                Err(fatal) => return Err(fatal),
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::Invalid(errors))
        }
    }
}

impl Default for RelationshipsValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validates a resource object against the endpoint's expectations.
pub struct ResourceValidator {
    error_factory: Rc<ValidatorErrorFactory>,
    expected_type: Option<String>,
    expected_id: Option<String>,
    attributes: Option<Box<dyn AttributesValidator>>,
    relationships: RelationshipsValidator,
}

impl ResourceValidator {
    pub fn new(
        error_factory: Rc<ValidatorErrorFactory>,
        expected_type: Option<String>,
        expected_id: Option<String>,
        attributes: Option<Box<dyn AttributesValidator>>,
        relationships: RelationshipsValidator,
    ) -> Self {
        Self {
            error_factory,
            expected_type,
            expected_id,
            attributes,
            relationships,
        }
    }

    /// Validate the resource.
    ///
    /// The `type` gate and the `id` gate are structural: a failure there
    /// stops validation of the resource, since nothing else can be judged
    /// against the wrong endpoint. Attribute and relationship errors
    /// accumulate together.
    ///
    /// # Errors
    ///
    /// `ValidateError::Invalid` with the accumulated errors, or
    /// `ValidateError::Store` on a store configuration failure.
    pub fn validate(&self, resource: &Resource, record: Option<&Value>) -> Result<(), ValidateError> {
        let mut errors = ErrorCollection::new();

        if !self.check_type(resource, &mut errors) {
            return Err(ValidateError::Invalid(errors));
        }

        if !self.check_id(resource, &mut errors) {
            return Err(ValidateError::Invalid(errors));
        }

        self.check_attributes(resource, record, &mut errors);

        match self.relationships.validate(resource, record) {
            Ok(()) => {}
            Err(ValidateError::Invalid(nested)) => {
                errors.push(self.error_factory.resource_invalid_relationships());
                errors.extend(nested);
            }
            Err(fatal) => return Err(fatal),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::Invalid(errors))
        }
    }

    fn check_type(&self, resource: &Resource, errors: &mut ErrorCollection) -> bool {
        let Some(actual) = resource.type_name().filter(|t| !t.is_empty()) else {
            errors.push(self.error_factory.member_required(TYPE, pointer::data()));
            return false;
        };

        if let Some(expected) = &self.expected_type {
            if actual != expected {
                errors.push(
                    self.error_factory
                        .resource_unsupported_type(expected, actual),
                );
                return false;
            }
        }

        true
    }

    fn check_id(&self, resource: &Resource, errors: &mut ErrorCollection) -> bool {
        let Some(expected) = &self.expected_id else {
            return true;
        };

        let actual = resource.id().unwrap_or("");

        if actual != expected {
            errors.push(self.error_factory.resource_unsupported_id(expected, actual));
            return false;
        }

        true
    }

    fn check_attributes(
        &self,
        resource: &Resource,
        record: Option<&Value>,
        errors: &mut ErrorCollection,
    ) {
        let Some(validator) = &self.attributes else {
            return;
        };

        // An absent attributes member is validated as an empty object.
        let empty = Value::Object(serde_json::Map::new());
        let attributes = resource.attributes().unwrap_or(&empty);

        if let Err(nested) = validator.validate(attributes, record) {
            errors.push(self.error_factory.resource_invalid_attributes());
            errors.extend(nested);
        }
    }
}
