//! Person and group identifiers
//!
//! Identifiers are opaque strings owned by the identity and group stores.
//! The engine only ever reads them.

use serde::Serialize;

/// Person identifier as issued by the identity store
pub type PersonId = String;

/// Group identifier as issued by the group store
pub type GroupId = String;

/// Display name used when an identifier cannot be resolved
pub const UNKNOWN_PERSON_NAME: &str = "Unknown";

/// A person as it appears in reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
}

impl Person {
    pub fn new(id: impl Into<PersonId>, name: impl Into<String>) -> Self {
        Person {
            id: id.into(),
            name: name.into(),
        }
    }

    /// A person whose display name could not be resolved
    pub fn unknown(id: impl Into<PersonId>) -> Self {
        Person::new(id, UNKNOWN_PERSON_NAME)
    }
}
