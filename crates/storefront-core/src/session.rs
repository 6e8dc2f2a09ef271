//! # Session
//!
//! The authenticated owner every read and write is scoped to. Passed
//! explicitly into the ledger, the dashboard and every repository call;
//! there is no ambient "current user".

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreResult;
use crate::validation::validate_owner_id;

/// Per-owner context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    owner_id: String,
}

impl Session {
    /// Creates a session for `owner_id`.
    ///
    /// ## Errors
    /// `Validation` when the id is empty, too long or contains `/`.
    pub fn new(owner_id: impl Into<String>) -> CoreResult<Self> {
        let owner_id = owner_id.into();
        validate_owner_id(&owner_id)?;
        Ok(Session { owner_id })
    }

    #[inline]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_rejects_bad_owner_ids() {
        assert_eq!(Session::new("owner-1").unwrap().owner_id(), "owner-1");
        assert!(Session::new("").is_err());
        assert!(Session::new("a/b").is_err());
    }
}
