//! Translation of validation conditions into protocol error objects.
//!
//! One factory method per condition. Pointer selection follows the
//! relationship key: a known key addresses the relationship fragment, an
//! unknown key (document-root validation) addresses the document root.

use std::collections::HashMap;

use crate::errors::{ErrorCollection, ValidationError};
use crate::pointer;
use crate::repository::{ErrorRepository, ErrorTemplate};
use crate::types::ResourceIdentifier;

/// Error keys understood by the validators.
pub mod keys {
    pub const MEMBER_REQUIRED: &str = "member-required";
    pub const MEMBER_OBJECT_EXPECTED: &str = "member-object-expected";
    pub const MEMBER_RELATIONSHIP_EXPECTED: &str = "member-relationship-expected";
    pub const RESOURCE_UNSUPPORTED_TYPE: &str = "resource-unsupported-type";
    pub const RESOURCE_UNSUPPORTED_ID: &str = "resource-unsupported-id";
    pub const RESOURCE_INVALID_ATTRIBUTES: &str = "resource-invalid-attributes";
    pub const RESOURCE_INVALID_RELATIONSHIPS: &str = "resource-invalid-relationships";
    pub const RELATIONSHIP_UNKNOWN_TYPE: &str = "relationship-unknown-type";
    pub const RELATIONSHIP_UNSUPPORTED_TYPE: &str = "relationship-unsupported-type";
    pub const RELATIONSHIP_HAS_ONE_EXPECTED: &str = "relationship-has-one-expected";
    pub const RELATIONSHIP_HAS_MANY_EXPECTED: &str = "relationship-has-many-expected";
    pub const RELATIONSHIP_EMPTY_NOT_ALLOWED: &str = "relationship-empty-not-allowed";
    pub const RELATIONSHIP_DOES_NOT_EXIST: &str = "relationship-does-not-exist";
    pub const RELATIONSHIP_NOT_ACCEPTABLE: &str = "relationship-not-acceptable";

    /// Every key, for configuration checks.
    pub const ALL: &[&str] = &[
        MEMBER_REQUIRED,
        MEMBER_OBJECT_EXPECTED,
        MEMBER_RELATIONSHIP_EXPECTED,
        RESOURCE_UNSUPPORTED_TYPE,
        RESOURCE_UNSUPPORTED_ID,
        RESOURCE_INVALID_ATTRIBUTES,
        RESOURCE_INVALID_RELATIONSHIPS,
        RELATIONSHIP_UNKNOWN_TYPE,
        RELATIONSHIP_UNSUPPORTED_TYPE,
        RELATIONSHIP_HAS_ONE_EXPECTED,
        RELATIONSHIP_HAS_MANY_EXPECTED,
        RELATIONSHIP_EMPTY_NOT_ALLOWED,
        RELATIONSHIP_DOES_NOT_EXIST,
        RELATIONSHIP_NOT_ACCEPTABLE,
    ];
}

/// Status for a resource whose type or id conflicts with the endpoint.
pub const STATUS_CONFLICT: u16 = 409;
/// Status for a related resource that does not exist.
pub const STATUS_RELATED_NOT_FOUND: u16 = 404;

/// The stock template table for every validation key.
pub fn default_templates() -> HashMap<String, ErrorTemplate> {
    use keys::*;

    HashMap::from([
        (
            MEMBER_REQUIRED.to_string(),
            ErrorTemplate::new("Required Member", "The member '{member}' is required."),
        ),
        (
            MEMBER_OBJECT_EXPECTED.to_string(),
            ErrorTemplate::new("Object Expected", "The member '{member}' must be an object."),
        ),
        (
            MEMBER_RELATIONSHIP_EXPECTED.to_string(),
            ErrorTemplate::new(
                "Relationship Expected",
                "The member '{member}' must be a relationship object.",
            ),
        ),
        (
            RESOURCE_UNSUPPORTED_TYPE.to_string(),
            ErrorTemplate::new(
                "Unsupported Resource Type",
                "Resource type '{actual}' is not supported here; expecting '{expected}'.",
            )
            .status(STATUS_CONFLICT),
        ),
        (
            RESOURCE_UNSUPPORTED_ID.to_string(),
            ErrorTemplate::new(
                "Unsupported Resource Id",
                "Resource id '{actual}' is not supported here; expecting '{expected}'.",
            )
            .status(STATUS_CONFLICT),
        ),
        (
            RESOURCE_INVALID_ATTRIBUTES.to_string(),
            ErrorTemplate::new("Invalid Attributes", "The attributes member is invalid."),
        ),
        (
            RESOURCE_INVALID_RELATIONSHIPS.to_string(),
            ErrorTemplate::new(
                "Invalid Relationships",
                "The relationships member is invalid.",
            ),
        ),
        (
            RELATIONSHIP_UNKNOWN_TYPE.to_string(),
            ErrorTemplate::new(
                "Unknown Resource Type",
                "Resource type '{actual}' is not recognised.",
            ),
        ),
        (
            RELATIONSHIP_UNSUPPORTED_TYPE.to_string(),
            ErrorTemplate::new(
                "Unsupported Relationship Type",
                "Resource type '{actual}' is not valid for this relationship; expecting '{expected}'.",
            ),
        ),
        (
            RELATIONSHIP_HAS_ONE_EXPECTED.to_string(),
            ErrorTemplate::new(
                "Has-One Relationship Expected",
                "The relationship must relate to a single resource.",
            ),
        ),
        (
            RELATIONSHIP_HAS_MANY_EXPECTED.to_string(),
            ErrorTemplate::new(
                "Has-Many Relationship Expected",
                "The relationship must relate to a collection of resources.",
            ),
        ),
        (
            RELATIONSHIP_EMPTY_NOT_ALLOWED.to_string(),
            ErrorTemplate::new(
                "Relationship Cannot Be Empty",
                "The relationship cannot be empty.",
            ),
        ),
        (
            RELATIONSHIP_DOES_NOT_EXIST.to_string(),
            ErrorTemplate::new(
                "Related Resource Does Not Exist",
                "The related resource '{type}:{id}' does not exist.",
            )
            .status(STATUS_RELATED_NOT_FOUND),
        ),
        (
            RELATIONSHIP_NOT_ACCEPTABLE.to_string(),
            ErrorTemplate::new(
                "Related Resource Not Acceptable",
                "The related resource '{type}:{id}' is not acceptable for this relationship.",
            ),
        ),
    ])
}

/// Produces protocol error objects for every validation condition.
pub struct ValidatorErrorFactory {
    repository: ErrorRepository,
}

impl ValidatorErrorFactory {
    /// A factory backed by the stock template table.
    pub fn new() -> Self {
        let mut repository = ErrorRepository::new();
        repository.configure(default_templates());
        Self { repository }
    }

    /// A factory backed by a caller-configured repository.
    pub fn with_repository(repository: ErrorRepository) -> Self {
        Self { repository }
    }

    /// Required member is missing.
    pub fn member_required(&self, member: &str, pointer: String) -> ValidationError {
        self.repository.error_with_pointer(
            keys::MEMBER_REQUIRED,
            pointer,
            &[("member", member.to_string())],
        )
    }

    /// Member must be an object.
    pub fn member_object_expected(&self, member: &str, pointer: String) -> ValidationError {
        self.repository.error_with_pointer(
            keys::MEMBER_OBJECT_EXPECTED,
            pointer,
            &[("member", member.to_string())],
        )
    }

    /// Member must be a relationship object (has-one or has-many shaped).
    pub fn member_relationship_expected(&self, member: &str, pointer: String) -> ValidationError {
        self.repository.error_with_pointer(
            keys::MEMBER_RELATIONSHIP_EXPECTED,
            pointer,
            &[("member", member.to_string())],
        )
    }

    /// Resource type does not match the endpoint's expected type.
    pub fn resource_unsupported_type(&self, expected: &str, actual: &str) -> ValidationError {
        let mut error = self.repository.error_with_pointer(
            keys::RESOURCE_UNSUPPORTED_TYPE,
            pointer::data_type(),
            &[
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
        );
        error.set_status(STATUS_CONFLICT);
        error
    }

    /// Resource id does not match the endpoint's expected id.
    pub fn resource_unsupported_id(&self, expected: &str, actual: &str) -> ValidationError {
        let mut error = self.repository.error_with_pointer(
            keys::RESOURCE_UNSUPPORTED_ID,
            pointer::data_id(),
            &[
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
        );
        error.set_status(STATUS_CONFLICT);
        error
    }

    /// Attributes member failed its validator.
    pub fn resource_invalid_attributes(&self) -> ValidationError {
        self.repository
            .error_with_pointer(keys::RESOURCE_INVALID_ATTRIBUTES, pointer::attributes(), &[])
    }

    /// Relationships member failed validation.
    pub fn resource_invalid_relationships(&self) -> ValidationError {
        self.repository.error_with_pointer(
            keys::RESOURCE_INVALID_RELATIONSHIPS,
            pointer::relationships(),
            &[],
        )
    }

    /// Referenced type is not known to the store.
    pub fn relationship_unknown_type(&self, actual: &str, key: Option<&str>) -> ValidationError {
        self.repository.error_with_pointer(
            keys::RELATIONSHIP_UNKNOWN_TYPE,
            match key {
                Some(key) => pointer::relationship_type(key),
                None => pointer::data_type(),
            },
            &[("actual", actual.to_string())],
        )
    }

    /// Referenced type is known but not permitted for this relationship.
    pub fn relationship_unsupported_type(
        &self,
        expected: &[String],
        actual: &str,
        key: Option<&str>,
    ) -> ValidationError {
        self.repository.error_with_pointer(
            keys::RELATIONSHIP_UNSUPPORTED_TYPE,
            match key {
                Some(key) => pointer::relationship_type(key),
                None => pointer::data_type(),
            },
            &[
                ("expected", expected.join(", ")),
                ("actual", actual.to_string()),
            ],
        )
    }

    /// A has-one relationship was expected.
    pub fn relationship_has_one_expected(&self, key: Option<&str>) -> ValidationError {
        self.repository.error_with_pointer(
            keys::RELATIONSHIP_HAS_ONE_EXPECTED,
            Self::relationship_pointer(key),
            &[],
        )
    }

    /// A has-many relationship was expected.
    pub fn relationship_has_many_expected(&self, key: Option<&str>) -> ValidationError {
        self.repository.error_with_pointer(
            keys::RELATIONSHIP_HAS_MANY_EXPECTED,
            Self::relationship_pointer(key),
            &[],
        )
    }

    /// The relationship is empty but the relationship does not allow empty.
    pub fn relationship_empty_not_allowed(&self, key: Option<&str>) -> ValidationError {
        self.repository.error_with_pointer(
            keys::RELATIONSHIP_EMPTY_NOT_ALLOWED,
            Self::relationship_pointer(key),
            &[],
        )
    }

    /// The referenced record does not exist.
    pub fn relationship_does_not_exist(
        &self,
        identifier: &ResourceIdentifier,
        key: Option<&str>,
    ) -> ValidationError {
        let mut error = self.repository.error_with_pointer(
            keys::RELATIONSHIP_DOES_NOT_EXIST,
            Self::relationship_pointer(key),
            &Self::identifier_values(identifier),
        );
        error.set_status(STATUS_RELATED_NOT_FOUND);
        error
    }

    /// The referenced record was rejected by the acceptability rule.
    ///
    /// Each nested error supplied by the rule is merged onto a clone of the
    /// templated base error, nested members taking precedence; a bare
    /// rejection yields the base error alone.
    pub fn relationship_not_acceptable(
        &self,
        identifier: &ResourceIdentifier,
        key: Option<&str>,
        nested: Option<&ErrorCollection>,
    ) -> ErrorCollection {
        let base = self.repository.error_with_pointer(
            keys::RELATIONSHIP_NOT_ACCEPTABLE,
            Self::relationship_pointer(key),
            &Self::identifier_values(identifier),
        );

        match nested {
            Some(nested) if !nested.is_empty() => {
                nested.iter().map(|err| base.merged(err)).collect()
            }
            _ => ErrorCollection::from(base),
        }
    }

    fn relationship_pointer(key: Option<&str>) -> String {
        match key {
            Some(key) => pointer::relationship(key),
            None => pointer::data(),
        }
    }

    fn identifier_values(identifier: &ResourceIdentifier) -> [(&'static str, String); 2] {
        [
            ("type", identifier.type_name().unwrap_or("").to_string()),
            ("id", identifier.id().unwrap_or("").to_string()),
        ]
    }
}

impl Default for ValidatorErrorFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_required_pointer_and_detail() {
        let factory = ValidatorErrorFactory::new();
        let error = factory.member_required("data", pointer::root());

        assert_eq!(error.code.as_deref(), Some(keys::MEMBER_REQUIRED));
        assert_eq!(error.pointer(), Some("/"));
        assert_eq!(
            error.detail.as_deref(),
            Some("The member 'data' is required.")
        );
    }

    #[test]
    fn does_not_exist_carries_status_and_identifier() {
        let factory = ValidatorErrorFactory::new();
        let identifier = ResourceIdentifier::new("people", "9");

        let error = factory.relationship_does_not_exist(&identifier, Some("author"));
        assert_eq!(error.status.as_deref(), Some("404"));
        assert_eq!(error.pointer(), Some("/data/relationships/author"));
        assert_eq!(
            error.detail.as_deref(),
            Some("The related resource 'people:9' does not exist.")
        );
    }

    #[test]
    fn does_not_exist_without_key_points_at_data() {
        let factory = ValidatorErrorFactory::new();
        let identifier = ResourceIdentifier::new("people", "9");

        let error = factory.relationship_does_not_exist(&identifier, None);
        assert_eq!(error.pointer(), Some("/data"));
    }

    #[test]
    fn unsupported_type_reports_expected_set() {
        let factory = ValidatorErrorFactory::new();
        let error = factory.relationship_unsupported_type(
            &["people".to_string(), "robots".to_string()],
            "posts",
            Some("author"),
        );

        assert_eq!(error.pointer(), Some("/data/relationships/author/data/type"));
        assert_eq!(
            error.detail.as_deref(),
            Some("Resource type 'posts' is not valid for this relationship; expecting 'people, robots'.")
        );
    }

    #[test]
    fn not_acceptable_bare_rejection_is_single_base_error() {
        let factory = ValidatorErrorFactory::new();
        let identifier = ResourceIdentifier::new("people", "1");

        let errors = factory.relationship_not_acceptable(&identifier, Some("author"), None);
        assert_eq!(errors.len(), 1);
        let error = errors.first().unwrap();
        assert_eq!(error.code.as_deref(), Some(keys::RELATIONSHIP_NOT_ACCEPTABLE));
        assert_eq!(error.pointer(), Some("/data/relationships/author"));
    }

    #[test]
    fn not_acceptable_merges_each_nested_error_onto_base() {
        let factory = ValidatorErrorFactory::new();
        let identifier = ResourceIdentifier::new("people", "1");

        let mut nested = ErrorCollection::new();
        nested.push(ValidationError {
            detail: Some("first rule".into()),
            ..ValidationError::default()
        });
        nested.push(ValidationError {
            detail: Some("second rule".into()),
            status: Some("403".into()),
            ..ValidationError::default()
        });

        let errors =
            factory.relationship_not_acceptable(&identifier, Some("author"), Some(&nested));
        assert_eq!(errors.len(), 2);

        let all: Vec<&ValidationError> = errors.iter().collect();
        // Nested detail wins; base pointer and code survive.
        assert_eq!(all[0].detail.as_deref(), Some("first rule"));
        assert_eq!(all[0].pointer(), Some("/data/relationships/author"));
        assert_eq!(all[0].code.as_deref(), Some(keys::RELATIONSHIP_NOT_ACCEPTABLE));
        assert_eq!(all[1].detail.as_deref(), Some("second rule"));
        assert_eq!(all[1].status.as_deref(), Some("403"));
    }

    #[test]
    fn resource_unsupported_type_conflict_status() {
        let factory = ValidatorErrorFactory::new();
        let error = factory.resource_unsupported_type("posts", "people");
        assert_eq!(error.status.as_deref(), Some("409"));
        assert_eq!(error.pointer(), Some("/data/type"));
    }
}
