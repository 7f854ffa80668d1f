//! Authority Selector
//!
//! Picks the authority used for silent renewal. Explicit client configuration
//! beats account history, and the fallback makes the selection total.

use tracing::trace;
use url::Url;

use crate::types::Account;

/// Select the authority for a silent request.
///
/// 1. First explicitly declared authority, in declared order
/// 2. The account's remembered authority
/// 3. `fallback`
pub fn select_authority(explicit: &[Url], account: Option<&Account>, fallback: &Url) -> Url {
    if let Some(first) = explicit.first() {
        trace!(authority = %first, "Using configured authority");
        return first.clone();
    }

    if let Some(remembered) = account.and_then(|a| a.remembered_authority.as_ref()) {
        trace!(authority = %remembered, "Using account authority");
        return remembered.clone();
    }

    trace!(authority = %fallback, "Using fallback authority");
    fallback.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize;
    use bridge_traits::NativeAccount;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    fn account_with_authority(authority: Option<&str>) -> Account {
        let mut native = NativeAccount::new("acct1", "user");
        native.authority = authority.map(String::from);
        normalize::account(&native)
    }

    #[test]
    fn test_explicit_authority_wins() {
        let explicit = [url("https://login.example.com/first"), url("https://login.example.com/second")];
        let account = account_with_authority(Some("https://login.example.com/remembered"));
        let fallback = url("https://login.microsoftonline.com/common");

        let chosen = select_authority(&explicit, Some(&account), &fallback);
        assert_eq!(chosen, explicit[0]);
    }

    #[test]
    fn test_account_authority_second() {
        let account = account_with_authority(Some("https://login.example.com/remembered"));
        let fallback = url("https://login.microsoftonline.com/common");

        let chosen = select_authority(&[], Some(&account), &fallback);
        assert_eq!(chosen.as_str(), "https://login.example.com/remembered");
    }

    #[test]
    fn test_fallback_is_total() {
        let fallback = url("https://login.microsoftonline.com/common");

        assert_eq!(select_authority(&[], None, &fallback), fallback);

        let blank = account_with_authority(Some("   "));
        assert_eq!(select_authority(&[], Some(&blank), &fallback), fallback);

        let none = account_with_authority(None);
        assert_eq!(select_authority(&[], Some(&none), &fallback), fallback);
    }
}
