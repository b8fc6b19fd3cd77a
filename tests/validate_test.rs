//! Integration tests for document validation against a fixture store.

use std::cell::Cell;
use std::rc::Rc;

use jsonapi_validate::{
    keys, Acceptance, Adapter, ErrorCollection, Relationship, Resource, ResourceIdentifier, Store,
    StoreError, ValidateError, ValidatesRelationship, ValidationError, ValidatorFactory,
};
use serde_json::{json, Value};

/// Adapter over a static record set, counting adapter calls.
struct RecordsAdapter {
    resource_type: &'static str,
    records: Vec<(&'static str, Value)>,
    exists_calls: Rc<Cell<usize>>,
    find_calls: Rc<Cell<usize>>,
}

impl RecordsAdapter {
    fn new(resource_type: &'static str, ids: &[&'static str]) -> Self {
        Self {
            resource_type,
            records: ids.iter().map(|id| (*id, json!({ "id": id }))).collect(),
            exists_calls: Rc::default(),
            find_calls: Rc::default(),
        }
    }
}

impl Adapter for RecordsAdapter {
    fn recognises(&self, resource_type: &str) -> bool {
        resource_type == self.resource_type
    }

    fn exists(&self, identifier: &ResourceIdentifier) -> bool {
        self.exists_calls.set(self.exists_calls.get() + 1);
        self.records.iter().any(|(id, _)| Some(*id) == identifier.id())
    }

    fn find(&self, identifier: &ResourceIdentifier) -> Option<Value> {
        self.find_calls.set(self.find_calls.get() + 1);
        self.records
            .iter()
            .find(|(id, _)| Some(*id) == identifier.id())
            .map(|(_, record)| record.clone())
    }
}

fn blog_factory() -> ValidatorFactory {
    let mut store = Store::new();
    store.register(Box::new(RecordsAdapter::new("people", &["1", "2"])));
    store.register(Box::new(RecordsAdapter::new("tags", &["10", "11"])));
    ValidatorFactory::new(store)
}

fn errors_of(result: Result<(), ValidateError>) -> ErrorCollection {
    match result {
        Err(ValidateError::Invalid(errors)) => errors,
        other => panic!("expected invalid result, got {other:?}"),
    }
}

mod store_resolution {
    use super::*;

    #[test]
    fn exists_then_find_then_exists_is_one_call_per_operation() {
        let adapter = RecordsAdapter::new("people", &["1"]);
        let exists_calls = Rc::clone(&adapter.exists_calls);
        let find_calls = Rc::clone(&adapter.find_calls);

        let mut store = Store::new();
        store.register(Box::new(adapter));
        let identifier = ResourceIdentifier::new("people", "1");

        assert!(store.exists(&identifier).unwrap());
        assert!(store.find(&identifier).unwrap().is_some());
        assert!(store.exists(&identifier).unwrap());
        assert!(store.find(&identifier).unwrap().is_some());

        assert_eq!(exists_calls.get(), 1);
        assert_eq!(find_calls.get(), 1);
    }

    #[test]
    fn cached_result_survives_adapter_reconfiguration() {
        // The map never forgets a definite answer within one store lifetime,
        // even though a second matching adapter is registered afterwards.
        let mut store = Store::new();
        store.register(Box::new(RecordsAdapter::new("people", &["1"])));
        let identifier = ResourceIdentifier::new("people", "99");

        assert!(!store.exists(&identifier).unwrap());

        store.register(Box::new(RecordsAdapter::new("people", &["99"])));
        assert!(!store.exists(&identifier).unwrap());
    }

    #[test]
    fn find_record_propagates_not_found() {
        let mut store = Store::new();
        store.register(Box::new(RecordsAdapter::new("people", &["1"])));

        let missing = ResourceIdentifier::new("people", "42");
        assert!(matches!(
            store.find_record(&missing),
            Err(StoreError::RecordNotFound { .. })
        ));
    }
}

mod resource_documents {
    use super::*;

    #[test]
    fn create_document_with_valid_relationships() {
        let factory = blog_factory();

        let mut relationships = factory.relationships();
        relationships.add("author", Box::new(factory.has_one(Some("people"), false, None)));
        relationships.add("tags", Box::new(factory.has_many(Some("tags"), true, None)));

        let validator = factory.resource_document(factory.resource_with(
            Some("posts"),
            None,
            None,
            relationships,
        ));

        let document = json!({
            "data": {
                "type": "posts",
                "attributes": { "title": "Hello, world" },
                "relationships": {
                    "author": { "data": { "type": "people", "id": "1" } },
                    "tags": { "data": [{ "type": "tags", "id": "10" }] }
                }
            }
        });
        assert!(validator.validate(&document, None).is_ok());
    }

    #[test]
    fn every_invalid_relationship_is_reported() {
        let factory = blog_factory();

        let mut relationships = factory.relationships();
        relationships.add("author", Box::new(factory.has_one(Some("people"), false, None)));
        relationships.add("tags", Box::new(factory.has_many(Some("tags"), false, None)));

        let validator = factory.resource_document(factory.resource_with(
            Some("posts"),
            None,
            None,
            relationships,
        ));

        let document = json!({
            "data": {
                "type": "posts",
                "relationships": {
                    "author": { "data": { "type": "people", "id": "404" } },
                    "tags": { "data": [] }
                }
            }
        });
        let errors = errors_of(validator.validate(&document, None));

        assert!(errors.has_code(keys::RESOURCE_INVALID_RELATIONSHIPS));
        assert!(errors.has_code(keys::RELATIONSHIP_DOES_NOT_EXIST));
        assert!(errors.has_code(keys::RELATIONSHIP_EMPTY_NOT_ALLOWED));
    }

    #[test]
    fn relationship_errors_carry_relationship_pointers() {
        let factory = blog_factory();

        let mut relationships = factory.relationships();
        relationships.add("author", Box::new(factory.has_one(Some("people"), false, None)));

        let validator = factory.resource_document(factory.resource_with(
            Some("posts"),
            None,
            None,
            relationships,
        ));

        let document = json!({
            "data": {
                "type": "posts",
                "relationships": {
                    "author": { "data": { "type": "people", "id": "404" } }
                }
            }
        });
        let errors = errors_of(validator.validate(&document, None));

        assert!(errors
            .iter()
            .any(|e| e.pointer() == Some("/data/relationships/author")));
    }

    #[test]
    fn missing_data_and_wrong_shape() {
        let factory = blog_factory();
        let validator = factory.resource_document(factory.resource(Some("posts"), None));

        let errors = errors_of(validator.validate(&json!({}), None));
        assert_eq!(errors.first().unwrap().pointer(), Some("/"));

        let errors = errors_of(validator.validate(&json!({ "data": "posts" }), None));
        assert_eq!(
            errors.first().unwrap().code.as_deref(),
            Some(keys::MEMBER_OBJECT_EXPECTED)
        );
    }
}

mod relationship_documents {
    use super::*;

    #[test]
    fn replace_has_one_with_existing_record() {
        let factory = blog_factory();
        let validator =
            factory.relationship_document(factory.relationship(Some("people"), true, None));

        let document = json!({ "data": { "type": "people", "id": "2" } });
        assert!(validator.validate(&document, None).is_ok());
    }

    #[test]
    fn clear_has_one_allowed_only_when_empty_allowed() {
        let factory = blog_factory();

        let allowing =
            factory.relationship_document(factory.relationship(Some("people"), true, None));
        assert!(allowing.validate(&json!({ "data": null }), None).is_ok());

        let strict =
            factory.relationship_document(factory.relationship(Some("people"), false, None));
        let errors = errors_of(strict.validate(&json!({ "data": null }), None));
        assert!(errors.has_code(keys::RELATIONSHIP_EMPTY_NOT_ALLOWED));
        assert_eq!(errors.first().unwrap().pointer(), Some("/data"));
    }

    #[test]
    fn unknown_type_addresses_document_root_type() {
        let factory = blog_factory();
        let validator =
            factory.relationship_document(factory.relationship(Some("people"), true, None));

        let document = json!({ "data": { "type": "planets", "id": "1" } });
        let errors = errors_of(validator.validate(&document, None));

        let error = errors.first().unwrap();
        assert_eq!(error.code.as_deref(), Some(keys::RELATIONSHIP_UNKNOWN_TYPE));
        assert_eq!(error.pointer(), Some("/data/type"));
    }

    #[test]
    fn incomplete_identifier_reports_both_members() {
        let factory = blog_factory();
        let validator =
            factory.relationship_document(factory.relationship(Some("people"), true, None));

        let errors = errors_of(validator.validate(&json!({ "data": {} }), None));
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code.as_deref() == Some(keys::MEMBER_REQUIRED)));
    }
}

mod acceptability {
    use super::*;

    #[test]
    fn acceptability_sees_owning_key_and_resource() {
        let factory = blog_factory();

        let seen: Rc<std::cell::RefCell<Vec<(Option<String>, Option<String>)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        let acceptable = move |_: &ResourceIdentifier,
                               _: Option<&Value>,
                               key: Option<&str>,
                               resource: Option<&Resource>| {
            sink.borrow_mut().push((
                key.map(str::to_string),
                resource.and_then(|r| r.type_name()).map(str::to_string),
            ));
            Acceptance::Accepted
        };

        let mut relationships = factory.relationships();
        relationships.add(
            "author",
            Box::new(factory.has_one(Some("people"), false, Some(Box::new(acceptable)))),
        );

        let validator = factory.resource_document(factory.resource_with(
            Some("posts"),
            None,
            None,
            relationships,
        ));

        let document = json!({
            "data": {
                "type": "posts",
                "relationships": {
                    "author": { "data": { "type": "people", "id": "1" } }
                }
            }
        });
        assert!(validator.validate(&document, None).is_ok());
        assert_eq!(
            *seen.borrow(),
            vec![(Some("author".to_string()), Some("posts".to_string()))]
        );
    }

    #[test]
    fn nested_rejection_detail_survives_onto_protocol_error() {
        let factory = blog_factory();

        let acceptable = |_: &ResourceIdentifier,
                          _: Option<&Value>,
                          _: Option<&str>,
                          _: Option<&Resource>| {
            Acceptance::RejectedWith(ErrorCollection::from(ValidationError {
                detail: Some("cannot assign a suspended author".into()),
                status: Some("422".into()),
                ..Default::default()
            }))
        };

        let validator = factory.relationship_document(factory.relationship(
            Some("people"),
            true,
            Some(Box::new(acceptable)),
        ));

        let document = json!({ "data": { "type": "people", "id": "1" } });
        let errors = errors_of(validator.validate(&document, None));

        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.code.as_deref(), Some(keys::RELATIONSHIP_NOT_ACCEPTABLE));
        assert_eq!(
            error.detail.as_deref(),
            Some("cannot assign a suspended author")
        );
        assert_eq!(error.status.as_deref(), Some("422"));
    }

    #[test]
    fn has_many_existence_failure_blocks_acceptability_pass() {
        let factory = blog_factory();

        let accept_calls = Rc::new(Cell::new(0));
        let calls = Rc::clone(&accept_calls);
        let acceptable = move |_: &ResourceIdentifier,
                               _: Option<&Value>,
                               _: Option<&str>,
                               _: Option<&Resource>| {
            calls.set(calls.get() + 1);
            Acceptance::Rejected
        };

        let validator = factory.relationship_document(factory.relationship(
            Some("tags"),
            false,
            Some(Box::new(acceptable)),
        ));

        // First member missing, second present but unacceptable.
        let document = json!({
            "data": [
                { "type": "tags", "id": "404" },
                { "type": "tags", "id": "10" }
            ]
        });
        let errors = errors_of(validator.validate(&document, None));

        assert_eq!(errors.len(), 1);
        assert!(errors.has_code(keys::RELATIONSHIP_DOES_NOT_EXIST));
        assert_eq!(accept_calls.get(), 0);
    }
}

mod validation_reuse {
    use super::*;

    #[test]
    fn one_exists_call_when_validating_then_hydrating() {
        // A validator existence check followed by the caller resolving the
        // same identifier hits the adapter once per operation kind.
        let adapter = RecordsAdapter::new("people", &["1"]);
        let exists_calls = Rc::clone(&adapter.exists_calls);

        let mut store = Store::new();
        store.register(Box::new(adapter));
        let factory = ValidatorFactory::new(store);

        let validator = factory.relationship(Some("people"), true, None);
        let rel = Relationship::from_value(&json!({ "data": { "type": "people", "id": "1" } }));

        assert!(validator.validate(&rel, None, None, None).is_ok());
        assert!(validator.validate(&rel, None, None, None).is_ok());
        assert_eq!(exists_calls.get(), 1);

        // Hydration through the same store resolves the cached identifier.
        let record = factory
            .store()
            .find_record(&ResourceIdentifier::new("people", "1"))
            .unwrap();
        assert_eq!(record, json!({ "id": "1" }));
        assert_eq!(exists_calls.get(), 1);
    }
}
