//! Relationship validators.
//!
//! A relationship is validated in strict stages, stopping at the first
//! failing stage: presence/shape of the `data` member, the emptiness policy,
//! then the shape-specific checks (identifier, existence, acceptability).
//! Within the identifier stage the type and id checks are independent and
//! may both contribute errors from a single call.
//!
//! Has-many relationships run two passes over the collection: identifier and
//! existence checks for every member first, acceptability for every member
//! only once the whole collection is known to exist. An existence failure is
//! never masked by an acceptability failure on another member.

use std::rc::Rc;

use serde_json::Value;

use crate::error_factory::ValidatorErrorFactory;
use crate::errors::{ErrorCollection, StoreError, ValidateError};
use crate::pointer;
use crate::store::Store;
use crate::types::{Relationship, Resource, ResourceIdentifier, DATA, ID, TYPE};

/// Outcome of an acceptability rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Acceptance {
    /// The related resource is a legal target for the relationship.
    Accepted,
    /// Rejected with no further detail; the templated base error is emitted.
    Rejected,
    /// Rejected with rule-supplied errors, each merged onto the templated
    /// base error.
    RejectedWith(ErrorCollection),
}

/// Business rule deciding whether a related resource is a legal target.
pub trait AcceptRelatedResource {
    /// Judge the identifier being validated.
    ///
    /// `record` is the domain record being modified, if any; `key` and
    /// `resource` give the owning relationship and resource for context when
    /// validating a resource document.
    fn accept(
        &self,
        identifier: &ResourceIdentifier,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
    ) -> Acceptance;
}

impl<F> AcceptRelatedResource for F
where
    F: Fn(&ResourceIdentifier, Option<&Value>, Option<&str>, Option<&Resource>) -> Acceptance,
{
    fn accept(
        &self,
        identifier: &ResourceIdentifier,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
    ) -> Acceptance {
        self(identifier, record, key, resource)
    }
}

/// Validates a single relationship fragment.
///
/// `key` is the relationship's name when validating a resource document, or
/// `None` when validating a relationship document (errors then address the
/// document root).
pub trait ValidatesRelationship {
    /// Validate the relationship.
    ///
    /// # Errors
    ///
    /// `ValidateError::Invalid` carrying the accumulated errors for bad
    /// input; `ValidateError::Store` if the store is misconfigured.
    fn validate(
        &self,
        relationship: &Relationship,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
    ) -> Result<(), ValidateError>;
}

/// Shared construction parameters and stage checks for the three
/// relationship validator shapes.
struct RelationshipChecks {
    error_factory: Rc<ValidatorErrorFactory>,
    store: Rc<Store>,
    /// `None` means any known type is accepted.
    expected_types: Option<Vec<String>>,
    allow_empty: bool,
    acceptable: Option<Box<dyn AcceptRelatedResource>>,
}

impl RelationshipChecks {
    fn is_supported_type(&self, resource_type: &str) -> bool {
        match &self.expected_types {
            Some(types) => types.iter().any(|t| t == resource_type),
            None => true,
        }
    }

    fn rel_pointer(key: Option<&str>) -> String {
        match key {
            Some(key) => pointer::relationship(key),
            None => pointer::data(),
        }
    }

    /// Stage 1 and 2: the `data` member must be present, must parse as a
    /// relationship shape, and may only be empty if empties are allowed.
    fn check_relationship(
        &self,
        relationship: &Relationship,
        key: Option<&str>,
        errors: &mut ErrorCollection,
    ) -> bool {
        if !relationship.has_data() {
            errors.push(
                self.error_factory
                    .member_required(DATA, Self::rel_pointer(key)),
            );
            return false;
        }

        if !relationship.is_has_one() && !relationship.is_has_many() {
            errors.push(
                self.error_factory
                    .member_relationship_expected(DATA, Self::rel_pointer(key)),
            );
            return false;
        }

        self.check_empty(relationship, key, errors)
    }

    fn check_empty(
        &self,
        relationship: &Relationship,
        key: Option<&str>,
        errors: &mut ErrorCollection,
    ) -> bool {
        let empty = if relationship.is_has_one() {
            !relationship.has_identifier()
        } else {
            relationship.identifiers().is_empty()
        };

        if empty && !self.allow_empty {
            errors.push(self.error_factory.relationship_empty_not_allowed(key));
            return false;
        }

        true
    }

    /// Stage 3, has-one shape: identifier, existence, then acceptability,
    /// stopping at the first failure. An intentionally-empty has-one has
    /// already passed the emptiness policy and needs no further checks.
    fn check_has_one(
        &self,
        relationship: &Relationship,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
        errors: &mut ErrorCollection,
    ) -> Result<(), StoreError> {
        if !relationship.is_has_one() {
            errors.push(self.error_factory.relationship_has_one_expected(key));
            return Ok(());
        }

        let Some(identifier) = relationship.identifier() else {
            return Ok(());
        };

        if !self.check_identifier(&identifier, key, errors) {
            return Ok(());
        }

        if !self.check_exists(&identifier, key, errors)? {
            return Ok(());
        }

        self.check_acceptable(&identifier, record, key, resource, errors);
        Ok(())
    }

    /// Stage 3, has-many shape: two passes over the collection.
    fn check_has_many(
        &self,
        relationship: &Relationship,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
        errors: &mut ErrorCollection,
    ) -> Result<(), StoreError> {
        if !relationship.is_has_many() {
            errors.push(self.error_factory.relationship_has_many_expected(key));
            return Ok(());
        }

        let identifiers = relationship.identifiers();

        // Pass 1: every member must be well-formed and exist.
        for identifier in &identifiers {
            if !self.check_identifier(identifier, key, errors)
                || !self.check_exists(identifier, key, errors)?
            {
                return Ok(());
            }
        }

        // Pass 2: every member must be acceptable.
        for identifier in &identifiers {
            if !self.check_acceptable(identifier, record, key, resource, errors) {
                return Ok(());
            }
        }

        Ok(())
    }

    /// Stage 4: type and id checks are independent; both may contribute
    /// errors from the same call.
    fn check_identifier(
        &self,
        identifier: &ResourceIdentifier,
        key: Option<&str>,
        errors: &mut ErrorCollection,
    ) -> bool {
        let mut valid = true;

        match identifier.type_name().filter(|t| !t.is_empty()) {
            None => {
                errors.push(self.error_factory.member_required(
                    TYPE,
                    match key {
                        Some(key) => pointer::relationship_data(key),
                        None => pointer::data(),
                    },
                ));
                valid = false;
            }
            Some(resource_type) if !self.store.is_type(resource_type) => {
                errors.push(
                    self.error_factory
                        .relationship_unknown_type(resource_type, key),
                );
                valid = false;
            }
            Some(resource_type) if !self.is_supported_type(resource_type) => {
                errors.push(self.error_factory.relationship_unsupported_type(
                    self.expected_types.as_deref().unwrap_or(&[]),
                    resource_type,
                    key,
                ));
                valid = false;
            }
            Some(_) => {}
        }

        if !identifier.has_id() {
            errors.push(self.error_factory.member_required(
                ID,
                match key {
                    Some(key) => pointer::relationship_id(key),
                    None => pointer::data(),
                },
            ));
            valid = false;
        }

        valid
    }

    /// Stage 5: the referenced record must exist.
    fn check_exists(
        &self,
        identifier: &ResourceIdentifier,
        key: Option<&str>,
        errors: &mut ErrorCollection,
    ) -> Result<bool, StoreError> {
        if !self.store.exists(identifier)? {
            errors.push(
                self.error_factory
                    .relationship_does_not_exist(identifier, key),
            );
            return Ok(false);
        }

        Ok(true)
    }

    /// Stage 6: the acceptability rule, when configured, must accept.
    fn check_acceptable(
        &self,
        identifier: &ResourceIdentifier,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
        errors: &mut ErrorCollection,
    ) -> bool {
        let Some(acceptable) = &self.acceptable else {
            return true;
        };

        match acceptable.accept(identifier, record, key, resource) {
            Acceptance::Accepted => true,
            Acceptance::Rejected => {
                errors.extend(
                    self.error_factory
                        .relationship_not_acceptable(identifier, key, None),
                );
                false
            }
            Acceptance::RejectedWith(nested) => {
                errors.extend(self.error_factory.relationship_not_acceptable(
                    identifier,
                    key,
                    Some(&nested),
                ));
                false
            }
        }
    }

    fn finish(errors: ErrorCollection) -> Result<(), ValidateError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidateError::Invalid(errors))
        }
    }
}

fn checks(
    error_factory: Rc<ValidatorErrorFactory>,
    store: Rc<Store>,
    expected_types: Option<Vec<String>>,
    allow_empty: bool,
    acceptable: Option<Box<dyn AcceptRelatedResource>>,
) -> RelationshipChecks {
    RelationshipChecks {
        error_factory,
        store,
        expected_types,
        allow_empty,
        acceptable,
    }
}

/// Validates a relationship that must be has-one shaped.
pub struct HasOneValidator {
    checks: RelationshipChecks,
}

impl HasOneValidator {
    pub fn new(
        error_factory: Rc<ValidatorErrorFactory>,
        store: Rc<Store>,
        expected_types: Option<Vec<String>>,
        allow_empty: bool,
        acceptable: Option<Box<dyn AcceptRelatedResource>>,
    ) -> Self {
        Self {
            checks: checks(error_factory, store, expected_types, allow_empty, acceptable),
        }
    }
}

impl ValidatesRelationship for HasOneValidator {
    fn validate(
        &self,
        relationship: &Relationship,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
    ) -> Result<(), ValidateError> {
        let mut errors = ErrorCollection::new();

        if self.checks.check_relationship(relationship, key, &mut errors) {
            self.checks
                .check_has_one(relationship, record, key, resource, &mut errors)?;
        }

        RelationshipChecks::finish(errors)
    }
}

/// Validates a relationship that must be has-many shaped.
pub struct HasManyValidator {
    checks: RelationshipChecks,
}

impl HasManyValidator {
    pub fn new(
        error_factory: Rc<ValidatorErrorFactory>,
        store: Rc<Store>,
        expected_types: Option<Vec<String>>,
        allow_empty: bool,
        acceptable: Option<Box<dyn AcceptRelatedResource>>,
    ) -> Self {
        Self {
            checks: checks(error_factory, store, expected_types, allow_empty, acceptable),
        }
    }
}

impl ValidatesRelationship for HasManyValidator {
    fn validate(
        &self,
        relationship: &Relationship,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
    ) -> Result<(), ValidateError> {
        let mut errors = ErrorCollection::new();

        if self.checks.check_relationship(relationship, key, &mut errors) {
            self.checks
                .check_has_many(relationship, record, key, resource, &mut errors)?;
        }

        RelationshipChecks::finish(errors)
    }
}

/// Validates a relationship of either shape.
///
/// Used for relationship documents, where the document itself decides
/// whether it relates to one resource or many.
pub struct RelationshipValidator {
    checks: RelationshipChecks,
}

impl RelationshipValidator {
    pub fn new(
        error_factory: Rc<ValidatorErrorFactory>,
        store: Rc<Store>,
        expected_types: Option<Vec<String>>,
        allow_empty: bool,
        acceptable: Option<Box<dyn AcceptRelatedResource>>,
    ) -> Self {
        Self {
            checks: checks(error_factory, store, expected_types, allow_empty, acceptable),
        }
    }
}

impl ValidatesRelationship for RelationshipValidator {
    fn validate(
        &self,
        relationship: &Relationship,
        record: Option<&Value>,
        key: Option<&str>,
        resource: Option<&Resource>,
    ) -> Result<(), ValidateError> {
        let mut errors = ErrorCollection::new();

        if self.checks.check_relationship(relationship, key, &mut errors) {
            if relationship.is_has_one() {
                self.checks
                    .check_has_one(relationship, record, key, resource, &mut errors)?;
            } else {
                self.checks
                    .check_has_many(relationship, record, key, resource, &mut errors)?;
            }
        }

        RelationshipChecks::finish(errors)
    }
}
