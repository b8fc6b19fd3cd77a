//! Composition root: builds validators wired to a shared store and error
//! factory, so callers override only what they need.

use std::rc::Rc;

use crate::document::{RelationshipDocumentValidator, ResourceDocumentValidator};
use crate::error_factory::ValidatorErrorFactory;
use crate::relationship::{
    AcceptRelatedResource, HasManyValidator, HasOneValidator, RelationshipValidator,
    ValidatesRelationship,
};
use crate::resource::{AttributesValidator, RelationshipsValidator, ResourceValidator};
use crate::store::Store;

/// Constructs validators sharing one store and one error factory.
pub struct ValidatorFactory {
    error_factory: Rc<ValidatorErrorFactory>,
    store: Rc<Store>,
}

impl ValidatorFactory {
    /// A factory over the given store, with the stock error templates.
    pub fn new(store: Store) -> Self {
        Self {
            error_factory: Rc::new(ValidatorErrorFactory::new()),
            store: Rc::new(store),
        }
    }

    /// A factory over caller-supplied collaborators.
    pub fn with(error_factory: Rc<ValidatorErrorFactory>, store: Rc<Store>) -> Self {
        Self {
            error_factory,
            store,
        }
    }

    pub fn error_factory(&self) -> Rc<ValidatorErrorFactory> {
        Rc::clone(&self.error_factory)
    }

    pub fn store(&self) -> Rc<Store> {
        Rc::clone(&self.store)
    }

    /// Document validator for a resource document.
    pub fn resource_document(&self, resource: ResourceValidator) -> ResourceDocumentValidator {
        ResourceDocumentValidator::new(self.error_factory(), resource)
    }

    /// Document validator for a relationship document.
    pub fn relationship_document<V>(&self, relationship: V) -> RelationshipDocumentValidator
    where
        V: ValidatesRelationship + 'static,
    {
        RelationshipDocumentValidator::new(self.error_factory(), Box::new(relationship))
    }

    /// Resource validator with no attribute rule and no relationship
    /// validators.
    pub fn resource(
        &self,
        expected_type: Option<&str>,
        expected_id: Option<&str>,
    ) -> ResourceValidator {
        self.resource_with(expected_type, expected_id, None, self.relationships())
    }

    /// Fully configured resource validator.
    pub fn resource_with(
        &self,
        expected_type: Option<&str>,
        expected_id: Option<&str>,
        attributes: Option<Box<dyn AttributesValidator>>,
        relationships: RelationshipsValidator,
    ) -> ResourceValidator {
        ResourceValidator::new(
            self.error_factory(),
            expected_type.map(str::to_string),
            expected_id.map(str::to_string),
            attributes,
            relationships,
        )
    }

    /// Empty relationships validator, ready for per-key registration.
    pub fn relationships(&self) -> RelationshipsValidator {
        RelationshipsValidator::new()
    }

    /// Validator accepting either relationship shape.
    pub fn relationship(
        &self,
        expected_type: Option<&str>,
        allow_empty: bool,
        acceptable: Option<Box<dyn AcceptRelatedResource>>,
    ) -> RelationshipValidator {
        RelationshipValidator::new(
            self.error_factory(),
            self.store(),
            expected_types(expected_type),
            allow_empty,
            acceptable,
        )
    }

    /// Validator for a has-one relationship.
    pub fn has_one(
        &self,
        expected_type: Option<&str>,
        allow_empty: bool,
        acceptable: Option<Box<dyn AcceptRelatedResource>>,
    ) -> HasOneValidator {
        HasOneValidator::new(
            self.error_factory(),
            self.store(),
            expected_types(expected_type),
            allow_empty,
            acceptable,
        )
    }

    /// Validator for a has-many relationship.
    pub fn has_many(
        &self,
        expected_type: Option<&str>,
        allow_empty: bool,
        acceptable: Option<Box<dyn AcceptRelatedResource>>,
    ) -> HasManyValidator {
        HasManyValidator::new(
            self.error_factory(),
            self.store(),
            expected_types(expected_type),
            allow_empty,
            acceptable,
        )
    }
}

fn expected_types(expected_type: Option<&str>) -> Option<Vec<String>> {
    expected_type.map(|t| vec![t.to_string()])
}
