//! Request, response, and storage models for the API.
//!
//! All models use serde; binary fields travel as standard base64 and
//! timestamps as unix seconds.

use serde::{Deserialize, Serialize};

// ============================================================================
// Post Models
// ============================================================================

/// A blog post as stored and served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    pub isshort: bool,
    pub title: String,
    pub urltitle: String,
    pub visible: bool,
    pub date: u64,
    pub body: String,
    pub markdown: String,
}

/// What the client submits to create a post. `title` and `body` are
/// HTML that the client has already escaped.
#[derive(Debug, Default, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub isshort: bool,
}

// ============================================================================
// Image Models
// ============================================================================

/// Metadata for one uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub filename: String,
    pub title: String,
    pub alttext: String,
    pub url: String,
    pub date: u64,
}

/// Signed payload for deleting an image.
#[derive(Debug, Default, Deserialize)]
pub struct ImageDeleteRequest {
    pub filename: String,
}

// ============================================================================
// RSVP Models
// ============================================================================

/// An event RSVP, keyed by its reservation code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rsvp {
    pub shortcode: String,
    pub name: String,
    pub attending: bool,
    pub numinvited: i32,
    pub monconfirm: i32,
    pub sunconfirm: i32,
}

/// Form body for creating an RSVP.
#[derive(Debug, Deserialize)]
pub struct RsvpCreateForm {
    pub name: String,
    pub numinvited: i32,
    pub rescode: String,
}

/// Form body for updating an RSVP.
#[derive(Debug, Deserialize)]
pub struct RsvpUpdateForm {
    pub attending: bool,
    pub monconfirm: i32,
    pub sunconfirm: i32,
}

// ============================================================================
// Challenge Models
// ============================================================================

/// The live challenge as served to the client. `created` gives the
/// client a heads up if the value is about to expire.
#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    /// Challenge value, standard base64.
    pub value: String,
    /// Unix seconds at generation time.
    pub created: u64,
}
