//! Request bodies for the producer notify endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /api/v1/notify/orders/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    /// The order's new status, e.g. `"shipped"`.
    pub status: String,
}

impl StatusChangeRequest {
    /// Returns the trimmed status, or `None` if it is blank.
    #[must_use]
    pub fn normalized_status(&self) -> Option<&str> {
        let status = self.status.trim();
        (!status.is_empty()).then_some(status)
    }
}
