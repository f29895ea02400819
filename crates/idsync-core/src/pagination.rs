//! Opaque, resumable pagination cursors.
//!
//! A [`Bag`] is a stack of [`PageState`]s. The top of the stack is the listing
//! currently being paged through; the rest are suspended outer listings. The
//! bag is handed to the sync driver as an opaque string and must be
//! round-tripped verbatim.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Page request received from the sync driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    /// Requested page size hint (0 = upstream default).
    pub size: u32,
    /// Opaque cursor from the previous call (empty on the first call).
    pub token: String,
}

impl Token {
    /// A first-page request.
    #[must_use]
    pub const fn first() -> Self {
        Self {
            size: 0,
            token: String::new(),
        }
    }

    /// A request resuming from an opaque cursor.
    #[must_use]
    pub fn resume(token: impl Into<String>) -> Self {
        Self {
            size: 0,
            token: token.into(),
        }
    }
}

/// Position within one upstream listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// Upstream continuation token (empty = first page).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// Resource type being listed.
    pub resource_type_id: String,
    /// Parent/scope resource of the listing, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_id: String,
}

/// Stack of page states serialized into the opaque cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    states: Vec<PageState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_state: Option<PageState>,
}

impl Bag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an opaque cursor. The empty string decodes to an empty bag.
    ///
    /// # Errors
    /// Returns [`SyncError::InvalidPageToken`] if the cursor is not a bag this
    /// library produced.
    pub fn unmarshal(input: &str) -> SyncResult<Self> {
        if input.is_empty() {
            return Ok(Self::new());
        }

        let raw = URL_SAFE_NO_PAD
            .decode(input)
            .map_err(|e| SyncError::InvalidPageToken {
                message: format!("cursor is not valid base64: {e}"),
            })?;

        serde_json::from_slice(&raw).map_err(|e| SyncError::InvalidPageToken {
            message: format!("cursor payload is malformed: {e}"),
        })
    }

    /// Encode the bag. An exhausted bag encodes to the empty string.
    ///
    /// # Errors
    /// Returns [`SyncError::Internal`] if serialization fails.
    pub fn marshal(&self) -> SyncResult<String> {
        if self.current_state.is_none() {
            return Ok(String::new());
        }

        let raw = serde_json::to_vec(self)?;
        Ok(URL_SAFE_NO_PAD.encode(raw))
    }

    /// Push a new listing on top of the stack.
    pub fn push(&mut self, state: PageState) {
        if let Some(current) = self.current_state.take() {
            self.states.push(current);
        }
        self.current_state = Some(state);
    }

    /// Drop the current listing and resume the one below it.
    pub fn pop(&mut self) -> Option<PageState> {
        let popped = self.current_state.take();
        self.current_state = self.states.pop();
        popped
    }

    /// Current listing, if any.
    #[must_use]
    pub const fn current(&self) -> Option<&PageState> {
        self.current_state.as_ref()
    }

    /// Upstream token of the current listing (empty = first page).
    #[must_use]
    pub fn page_token(&self) -> &str {
        self.current_state
            .as_ref()
            .map_or("", |state| state.token.as_str())
    }

    /// Record the upstream next-page token and encode the resulting cursor.
    ///
    /// An empty `next` finishes the current listing; when no listing remains
    /// the returned cursor is empty.
    ///
    /// # Errors
    /// Returns [`SyncError::Internal`] if serialization fails.
    pub fn next_token(&mut self, next: &str) -> SyncResult<String> {
        if next.is_empty() {
            self.pop();
        } else {
            match self.current_state.as_mut() {
                Some(state) => next.clone_into(&mut state.token),
                None => {
                    self.current_state = Some(PageState {
                        token: next.to_string(),
                        ..PageState::default()
                    });
                }
            }
        }

        self.marshal()
    }
}
