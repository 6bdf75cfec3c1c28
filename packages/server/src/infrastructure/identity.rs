//! In-memory identity provider.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{Identity, IdentityProvider, PersistenceError, UserId};

/// Identity provider backed by a fixed privilege table.
///
/// Every valid user id resolves to an identity; ids listed as staff carry the
/// privilege flag.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityProvider {
    staff: HashSet<UserId>,
    known: Option<HashSet<UserId>>,
}

impl InMemoryIdentityProvider {
    /// Accept every user id, with the given ids marked as staff.
    pub fn open(staff: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            staff: staff.into_iter().collect(),
            known: None,
        }
    }

    /// Only the listed ids exist.
    pub fn closed(
        members: impl IntoIterator<Item = UserId>,
        staff: impl IntoIterator<Item = UserId>,
    ) -> Self {
        let staff: HashSet<UserId> = staff.into_iter().collect();
        let mut known: HashSet<UserId> = members.into_iter().collect();
        known.extend(staff.iter().copied());
        Self {
            staff,
            known: Some(known),
        }
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn resolve(&self, id: UserId) -> Result<Option<Identity>, PersistenceError> {
        if let Some(known) = &self.known
            && !known.contains(&id)
        {
            return Ok(None);
        }
        Ok(Some(Identity {
            id,
            is_staff: self.staff.contains(&id),
        }))
    }
}
