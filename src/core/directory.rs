//! Display-name lookup and group membership
//!
//! The `Directory` is the read-only view the engine has of the identity store
//! (person → name) and the group store (group → members). It is used to
//! resolve display names for reports and to scope a query to the groups a
//! requester belongs to.
//!
//! Name resolution never fails: identity names win over roster names, roster
//! names over nothing, and an identifier nobody knows is labeled "Unknown".

use crate::types::{GroupId, Person, PersonId, SettlementError};
use std::collections::{HashMap, HashSet};

/// Which groups a query considers
#[derive(Debug, Clone, Default, PartialEq)]
pub enum GroupScope {
    /// Every group in the ledger
    #[default]
    All,
    /// Only the listed groups
    Only(HashSet<GroupId>),
}

impl GroupScope {
    pub fn contains(&self, group: &str) -> bool {
        match self {
            GroupScope::All => true,
            GroupScope::Only(groups) => groups.contains(group),
        }
    }
}

/// Identity and group roster lookup
#[derive(Debug, Clone, Default)]
pub struct Directory {
    /// Names from the identity store
    identities: HashMap<PersonId, String>,
    /// Member identifiers per group, in roster order
    rosters: HashMap<GroupId, Vec<PersonId>>,
    /// Names from group rosters; the first roster row naming a person wins
    member_names: HashMap<PersonId, String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a person from the identity store
    ///
    /// Blank names are ignored so they fall through to roster names.
    pub fn add_identity(&mut self, id: impl Into<PersonId>, name: impl Into<String>) {
        let name = name.into();
        if name.trim().is_empty() {
            return;
        }
        self.identities.insert(id.into(), name);
    }

    /// Record a member of a group
    ///
    /// Repeated rows for the same member of the same group are ignored.
    pub fn add_member(
        &mut self,
        group: impl Into<GroupId>,
        id: impl Into<PersonId>,
        name: impl Into<String>,
    ) {
        let id = id.into();
        let name = name.into();

        let members = self.rosters.entry(group.into()).or_default();
        if !members.contains(&id) {
            members.push(id.clone());
        }

        if !name.trim().is_empty() {
            self.member_names.entry(id).or_insert(name);
        }
    }

    /// Whether any group roster has been loaded
    pub fn has_roster(&self) -> bool {
        !self.rosters.is_empty()
    }

    /// Resolve an identifier to a person, falling back to "Unknown"
    pub fn resolve(&self, id: &str) -> Person {
        self.identities
            .get(id)
            .or_else(|| self.member_names.get(id))
            .map(|name| Person::new(id, name.as_str()))
            .unwrap_or_else(|| Person::unknown(id))
    }

    /// Number of members on a group's roster
    pub fn member_count(&self, group: &str) -> usize {
        self.rosters.get(group).map_or(0, Vec::len)
    }

    /// Groups whose roster lists `person`
    pub fn groups_of(&self, person: &str) -> HashSet<GroupId> {
        self.rosters
            .iter()
            .filter(|(_, members)| members.iter().any(|member| member == person))
            .map(|(group, _)| group.clone())
            .collect()
    }

    /// Scope for a query made by `requester`
    ///
    /// Without a requester every group is in scope. With one, only the groups
    /// whose roster lists the requester are, which needs a loaded roster.
    pub fn scope_for(&self, requester: Option<&str>) -> Result<GroupScope, SettlementError> {
        match requester {
            None => Ok(GroupScope::All),
            Some(requester) if !self.has_roster() => {
                Err(SettlementError::missing_roster(requester))
            }
            Some(requester) => Ok(GroupScope::Only(self.groups_of(requester))),
        }
    }
}
