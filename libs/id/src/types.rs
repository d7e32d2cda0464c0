//! Typed ID definitions for compute and identity resources.

use crate::define_id;

// =============================================================================
// Compute
// =============================================================================

define_id!(ServerId, "server");
define_id!(ImageId, "image");
define_id!(FlavorId, "flavor");

// =============================================================================
// Identity
// =============================================================================

define_id!(ProjectId, "project", simple);
define_id!(UserId, "user", simple);

// =============================================================================
// Requests
// =============================================================================

define_id!(RequestId, "request");

impl RequestId {
    /// Renders the ID in the `req-<uuid>` form compute services use for
    /// `x-openstack-request-id`.
    #[must_use]
    pub fn header_value(&self) -> String {
        if self.0.starts_with("req-") {
            self.0.clone()
        } else {
            format!("req-{}", self.0)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
