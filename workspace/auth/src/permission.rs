//! Object-level permissions: checks evaluated against one target resource.

use common::Viewer;

/// HTTP-style request method, reduced to what permission checks care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
    Other,
}

impl RequestMethod {
    /// Reads and creations never touch an existing object.
    pub fn is_read_or_create(&self) -> bool {
        matches!(
            self,
            RequestMethod::Get | RequestMethod::Head | RequestMethod::Options | RequestMethod::Post
        )
    }

    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            RequestMethod::Put | RequestMethod::Patch | RequestMethod::Delete
        )
    }
}

impl From<&str> for RequestMethod {
    fn from(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => RequestMethod::Get,
            "HEAD" => RequestMethod::Head,
            "OPTIONS" => RequestMethod::Options,
            "POST" => RequestMethod::Post,
            "PUT" => RequestMethod::Put,
            "PATCH" => RequestMethod::Patch,
            "DELETE" => RequestMethod::Delete,
            _ => RequestMethod::Other,
        }
    }
}

/// A permission evaluated against a specific resource owned by `owner_id`.
pub trait ObjectPermission {
    fn has_object_permission(&self, method: RequestMethod, viewer: &Viewer, owner_id: i32) -> bool;
}

/// Anyone may read or create; only the owner may update or delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsSelfOrReadCreateOnly;

impl ObjectPermission for IsSelfOrReadCreateOnly {
    fn has_object_permission(&self, method: RequestMethod, viewer: &Viewer, owner_id: i32) -> bool {
        if method.is_read_or_create() {
            true
        } else if method.is_mutation() {
            viewer.is(owner_id)
        } else {
            false
        }
    }
}
