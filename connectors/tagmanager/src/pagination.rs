//! Cursor handling for paged listings.

use idsync_core::{Bag, PageState, ResourceId, SyncResult};

/// Decode the caller's cursor and seed it for `scope` when empty.
///
/// Returns the bag and the upstream page token to request next (empty for
/// the first page).
///
/// # Errors
/// Returns `SyncError::InvalidPageToken` if the cursor cannot be decoded.
pub fn parse_page_token(token: &str, scope: &ResourceId) -> SyncResult<(Bag, String)> {
    let mut bag = Bag::unmarshal(token)?;
    if bag.current().is_none() {
        bag.push(PageState {
            token: String::new(),
            resource_type_id: scope.resource_type.clone(),
            resource_id: scope.resource.clone(),
        });
    }
    let page = bag.page_token().to_string();
    Ok((bag, page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use idsync_core::SyncError;

    #[test]
    fn test_empty_token_seeds_scope() {
        let scope = ResourceId::new("user", "123");
        let (bag, page) = parse_page_token("", &scope).unwrap();
        assert_eq!(page, "");
        let state = bag.current().unwrap();
        assert_eq!(state.resource_type_id, "user");
        assert_eq!(state.resource_id, "123");
    }

    #[test]
    fn test_cursor_walks_three_pages_to_exhaustion() {
        let scope = ResourceId::new("account", "123");

        let (mut bag, page) = parse_page_token("", &scope).unwrap();
        assert_eq!(page, "");
        let cursor = bag.next_token("p2").unwrap();

        let (mut bag, page) = parse_page_token(&cursor, &scope).unwrap();
        assert_eq!(page, "p2");
        let cursor = bag.next_token("p3").unwrap();

        let (mut bag, page) = parse_page_token(&cursor, &scope).unwrap();
        assert_eq!(page, "p3");
        assert_eq!(bag.next_token("").unwrap(), "");
    }

    #[test]
    fn test_malformed_cursor_is_fatal() {
        let scope = ResourceId::new("account", "123");
        let err = parse_page_token("not/base64!", &scope).unwrap_err();
        assert!(matches!(err, SyncError::InvalidPageToken { .. }));
        assert!(!err.is_retryable());
    }
}
