//! Request context and account resolution
//!
//! A [`Context`] is built from request parameters that must carry an
//! `account_id` key, even when its value is null. The account itself is
//! looked up at most once; a missing id or an unknown account resolves to
//! the lookup's null account.

use crate::{Error, Result};
use editkit_value::RecordId;
use serde::Deserialize;
use std::cell::OnceCell;
use std::fmt;
use tracing::debug;

/// An account a context can act for
pub trait Account {
    /// Identifier, `None` for the null account
    fn id(&self) -> Option<RecordId>;
}

/// Null-object account used when nobody is signed in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoAccount;

impl Account for NoAccount {
    fn id(&self) -> Option<RecordId> {
        None
    }
}

/// Finds accounts for a [`Context`]
pub trait AccountLookup {
    type Account: Account + From<NoAccount>;

    /// Load an account by id, `Ok(None)` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    fn find_account_by_id(&self, _id: &RecordId) -> Result<Option<Self::Account>> {
        Err(Error::not_implemented(
            std::any::type_name::<Self>(),
            "find_account_by_id",
        ))
    }

    /// Account used when none is found
    fn no_account(&self) -> Self::Account {
        NoAccount.into()
    }
}

/// Parameters a context is created from
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContextParams {
    /// Required key; `null` means no account
    #[serde(deserialize_with = "Option::deserialize")]
    pub account_id: Option<RecordId>,
}

impl ContextParams {
    #[must_use]
    pub fn new(account_id: Option<RecordId>) -> Self {
        Self { account_id }
    }

    /// Parse parameters from a JSON object
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] when `account_id` is missing or malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| Error::InvalidParams(err.to_string()))
    }
}

/// Per-request context carrying the acting account
pub struct Context<L: AccountLookup> {
    account_id: Option<RecordId>,
    lookup: L,
    account: OnceCell<L::Account>,
}

impl<L: AccountLookup> Context<L> {
    pub fn new(params: ContextParams, lookup: L) -> Self {
        Self {
            account_id: params.account_id,
            lookup,
            account: OnceCell::new(),
        }
    }

    /// Account id as given in the parameters
    #[must_use]
    pub fn given_account_id(&self) -> Option<&RecordId> {
        self.account_id.as_ref()
    }

    /// The acting account, resolved on first use
    ///
    /// # Errors
    ///
    /// Propagates failures of [`AccountLookup::find_account_by_id`]; a failed
    /// lookup is retried on the next call.
    pub fn account(&self) -> Result<&L::Account> {
        if let Some(account) = self.account.get() {
            return Ok(account);
        }
        let found = match &self.account_id {
            Some(id) => self.lookup.find_account_by_id(id)?,
            None => None,
        };
        let account = found.unwrap_or_else(|| {
            debug!(account_id = ?self.account_id, "No account found, using null account");
            self.lookup.no_account()
        });
        Ok(self.account.get_or_init(|| account))
    }

    /// Id of the resolved account
    ///
    /// # Errors
    ///
    /// See [`Context::account`].
    pub fn account_id(&self) -> Result<Option<RecordId>> {
        Ok(self.account()?.id())
    }

    #[must_use]
    pub fn lookup(&self) -> &L {
        &self.lookup
    }
}

impl<L: AccountLookup> fmt::Debug for Context<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("account_id", &self.account_id)
            .field("resolved", &self.account.get().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, PartialEq)]
    enum User {
        Guest,
        Member(i64),
    }

    impl Account for User {
        fn id(&self) -> Option<RecordId> {
            match self {
                User::Guest => None,
                User::Member(id) => Some(RecordId::Int(*id)),
            }
        }
    }

    impl From<NoAccount> for User {
        fn from(_: NoAccount) -> Self {
            User::Guest
        }
    }

    #[derive(Default)]
    struct Users {
        lookups: Cell<usize>,
    }

    impl AccountLookup for Users {
        type Account = User;

        fn find_account_by_id(&self, id: &RecordId) -> Result<Option<User>> {
            self.lookups.set(self.lookups.get() + 1);
            Ok(id.as_int().filter(|id| *id == 1).map(User::Member))
        }
    }

    struct Unimplemented;

    impl AccountLookup for Unimplemented {
        type Account = NoAccount;
    }

    #[test]
    fn test_account_id_key_is_required() {
        assert!(ContextParams::from_json("{}").is_err());
        let params = ContextParams::from_json(r#"{"account_id": null}"#).unwrap();
        assert_eq!(params.account_id, None);
        let params = ContextParams::from_json(r#"{"account_id": 1}"#).unwrap();
        assert_eq!(params.account_id, Some(RecordId::Int(1)));
    }

    #[test]
    fn test_null_id_uses_null_account() {
        let context = Context::new(ContextParams::new(None), Users::default());
        assert_eq!(context.account().unwrap(), &User::Guest);
        assert_eq!(context.account_id().unwrap(), None);
        assert_eq!(context.lookup().lookups.get(), 0);
    }

    #[test]
    fn test_unknown_account_uses_null_account() {
        let context = Context::new(ContextParams::new(Some(RecordId::Int(2))), Users::default());
        assert_eq!(context.account().unwrap(), &User::Guest);
    }

    #[test]
    fn test_account_is_memoized() {
        let context = Context::new(ContextParams::new(Some(RecordId::Int(1))), Users::default());
        assert_eq!(context.account().unwrap(), &User::Member(1));
        assert_eq!(context.account_id().unwrap(), Some(RecordId::Int(1)));
        assert_eq!(context.lookup().lookups.get(), 1);
    }

    #[test]
    fn test_lookup_not_implemented() {
        let context = Context::new(ContextParams::new(Some(RecordId::Int(1))), Unimplemented);
        assert!(matches!(
            context.account(),
            Err(Error::NotImplemented { hook: "find_account_by_id", .. })
        ));
        let context = Context::new(ContextParams::new(None), Unimplemented);
        assert_eq!(context.account().unwrap(), &NoAccount);
    }
}
