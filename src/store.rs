//! Resource store: adapter registry plus identity-mapped resolution cache.
//!
//! One store is built per inbound request and discarded afterwards. The
//! identity map remembers every resolution outcome for the lifetime of the
//! store, so checking a relationship target for existence and then resolving
//! it for an acceptability rule costs a single adapter call.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

use crate::errors::StoreError;
use crate::types::ResourceIdentifier;

/// Type-scoped collaborator resolving identifiers to domain records.
///
/// Adapters are registered in order; the first registered adapter that
/// recognises a type owns it.
pub trait Adapter {
    /// Does this adapter handle the given resource type?
    fn recognises(&self, resource_type: &str) -> bool;

    /// Does a record exist for this identifier?
    fn exists(&self, identifier: &ResourceIdentifier) -> bool;

    /// Resolve the identifier to a record, if one exists.
    fn find(&self, identifier: &ResourceIdentifier) -> Option<Value>;
}

/// Outcome of resolving an identifier, as remembered by the identity map.
///
/// A missing entry means the identifier has not been resolved yet.
#[derive(Debug, Clone, PartialEq)]
enum Resolution {
    /// Confirmed not to exist.
    Absent,
    /// Confirmed to exist; the record itself has not been fetched.
    Exists,
    /// Resolved to a record.
    Found(Value),
}

/// Per-request cache of identifier resolution outcomes.
#[derive(Debug, Default)]
struct IdentityMap {
    entries: HashMap<String, Resolution>,
}

impl IdentityMap {
    /// Definite existence answer, or `None` if the identifier is unknown.
    fn exists(&self, identifier: &ResourceIdentifier) -> Option<bool> {
        self.entries.get(&identifier.key()).map(|resolution| {
            !matches!(resolution, Resolution::Absent)
        })
    }

    /// Cached resolution for `find`.
    ///
    /// `Exists` entries do not answer a `find`: existence was confirmed but
    /// the record was never fetched, so the caller must go to the adapter.
    fn find(&self, identifier: &ResourceIdentifier) -> Option<&Resolution> {
        self.entries.get(&identifier.key())
    }

    fn add(&mut self, identifier: &ResourceIdentifier, resolution: Resolution) {
        self.entries.insert(identifier.key(), resolution);
    }
}

/// Registry of type-scoped adapters with identity-mapped resolution.
///
/// Interior mutability keeps the lookup methods `&self`; the store is
/// single-threaded per-request state and must not be shared across threads.
pub struct Store {
    adapters: Vec<Box<dyn Adapter>>,
    identity_map: RefCell<IdentityMap>,
}

impl Store {
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
            identity_map: RefCell::new(IdentityMap::default()),
        }
    }

    /// Append an adapter to the registry.
    pub fn register(&mut self, adapter: Box<dyn Adapter>) {
        self.adapters.push(adapter);
    }

    /// Append adapters in order.
    pub fn register_many(&mut self, adapters: Vec<Box<dyn Adapter>>) {
        for adapter in adapters {
            self.register(adapter);
        }
    }

    /// Is the resource type recognised by any registered adapter?
    pub fn is_type(&self, resource_type: &str) -> bool {
        self.adapters.iter().any(|a| a.recognises(resource_type))
    }

    /// Does a record exist for this identifier?
    ///
    /// A definite cached answer is returned without touching the adapter.
    ///
    /// # Errors
    ///
    /// `StoreError::NoAdapter` if no adapter recognises the identifier's
    /// type; this is a store configuration error, not invalid input.
    pub fn exists(&self, identifier: &ResourceIdentifier) -> Result<bool, StoreError> {
        if let Some(cached) = self.identity_map.borrow().exists(identifier) {
            return Ok(cached);
        }

        let exists = self.adapter_for(identifier)?.exists(identifier);

        self.identity_map.borrow_mut().add(
            identifier,
            if exists {
                Resolution::Exists
            } else {
                Resolution::Absent
            },
        );

        Ok(exists)
    }

    /// Resolve the identifier to a record, if one exists.
    ///
    /// A cached record is returned directly and a cached confirmed absence
    /// short-circuits to `None`. An existence-only cache entry still needs
    /// one adapter `find`, after which the map holds the record.
    ///
    /// # Errors
    ///
    /// `StoreError::NoAdapter` if no adapter recognises the identifier's type.
    pub fn find(&self, identifier: &ResourceIdentifier) -> Result<Option<Value>, StoreError> {
        match self.identity_map.borrow().find(identifier) {
            Some(Resolution::Found(record)) => return Ok(Some(record.clone())),
            Some(Resolution::Absent) => return Ok(None),
            Some(Resolution::Exists) | None => {}
        }

        let record = self.adapter_for(identifier)?.find(identifier);

        self.identity_map.borrow_mut().add(
            identifier,
            match &record {
                Some(record) => Resolution::Found(record.clone()),
                None => Resolution::Absent,
            },
        );

        Ok(record)
    }

    /// Resolve the identifier to a record that is required to exist.
    ///
    /// # Errors
    ///
    /// `StoreError::RecordNotFound` if the identifier does not resolve;
    /// `StoreError::NoAdapter` if no adapter recognises the type.
    pub fn find_record(&self, identifier: &ResourceIdentifier) -> Result<Value, StoreError> {
        self.find(identifier)?.ok_or_else(|| StoreError::RecordNotFound {
            identifier: identifier.clone(),
        })
    }

    /// First adapter in registration order that recognises the type.
    fn adapter_for(&self, identifier: &ResourceIdentifier) -> Result<&dyn Adapter, StoreError> {
        let resource_type = identifier.type_name().unwrap_or("");

        self.adapters
            .iter()
            .find(|a| a.recognises(resource_type))
            .map(|a| a.as_ref())
            .ok_or_else(|| StoreError::NoAdapter {
                resource_type: resource_type.to_string(),
            })
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
