/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// Record collections managed through the admin console.
/// Both expose the same list/show/create/update/delete surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collection {
    Artworks,
    Exhibitions,
}

impl Collection {
    /// Resolve the first path segment of a collection route
    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "artworks" => Some(Collection::Artworks),
            "exhibitions" => Some(Collection::Exhibitions),
            _ => None,
        }
    }

    /// Key used for a list payload, e.g. `{"artworks": [...]}`
    pub fn plural(self) -> &'static str {
        match self {
            Collection::Artworks => "artworks",
            Collection::Exhibitions => "exhibitions",
        }
    }

    /// Key used for a single record payload, e.g. `{"artwork": {...}}`
    pub fn singular(self) -> &'static str {
        match self {
            Collection::Artworks => "artwork",
            Collection::Exhibitions => "exhibition",
        }
    }

    /// Capitalised noun for client-facing messages
    pub fn label(self) -> &'static str {
        match self {
            Collection::Artworks => "Artwork",
            Collection::Exhibitions => "Exhibition",
        }
    }
}
