//! JSON-pointer builders for document locations.
//!
//! Validation errors address the fragment they originate from. Relationship
//! conditions use the relationship-scoped pointers when the relationship key
//! is known and fall back to the document-root pointers when it is not
//! (relationship-document validation).

/// Pointer to the document root.
pub fn root() -> String {
    "/".to_string()
}

/// Pointer to `/data`.
pub fn data() -> String {
    "/data".to_string()
}

/// Pointer to `/data/type`.
pub fn data_type() -> String {
    "/data/type".to_string()
}

/// Pointer to `/data/id`.
pub fn data_id() -> String {
    "/data/id".to_string()
}

/// Pointer to `/data/attributes`.
pub fn attributes() -> String {
    "/data/attributes".to_string()
}

/// Pointer to a named attribute.
pub fn attribute(name: &str) -> String {
    format!("/data/attributes/{name}")
}

/// Pointer to `/data/relationships`.
pub fn relationships() -> String {
    "/data/relationships".to_string()
}

/// Pointer to a named relationship.
pub fn relationship(key: &str) -> String {
    format!("/data/relationships/{key}")
}

/// Pointer to a named relationship's `data` member.
pub fn relationship_data(key: &str) -> String {
    format!("/data/relationships/{key}/data")
}

/// Pointer to a named relationship's `data/type` member.
pub fn relationship_type(key: &str) -> String {
    format!("/data/relationships/{key}/data/type")
}

/// Pointer to a named relationship's `data/id` member.
pub fn relationship_id(key: &str) -> String {
    format!("/data/relationships/{key}/data/id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationship_pointers() {
        assert_eq!(relationship("author"), "/data/relationships/author");
        assert_eq!(
            relationship_data("author"),
            "/data/relationships/author/data"
        );
        assert_eq!(
            relationship_type("author"),
            "/data/relationships/author/data/type"
        );
        assert_eq!(
            relationship_id("author"),
            "/data/relationships/author/data/id"
        );
    }

    #[test]
    fn root_pointers() {
        assert_eq!(root(), "/");
        assert_eq!(data(), "/data");
        assert_eq!(data_type(), "/data/type");
        assert_eq!(attribute("title"), "/data/attributes/title");
    }
}
