//! Visitor: an authenticated external identity that has not yet been
//! allocated a volunteer record.

use serde::{Deserialize, Serialize};

/// Identity data handed over by the authentication provider.
///
/// Kept separate from the provider's own user type so nothing below the
/// login boundary depends on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Visitor {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: String,
    pub email_verified: bool,
}
