use std::str::FromStr;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GiftError;

/// Internal identifier for a gift record; never exposed to viewers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GiftId(pub String);

impl GiftId {
    /// Generate a new random gift ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from existing string
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GiftId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GiftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public lookup key for a gift: unguessable, single-use, the only thing a
/// share link carries. Distinct from [`GiftId`] so the internal identifier
/// and the shareable capability have different exposure surfaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GiftToken(pub String);

impl GiftToken {
    /// Generate a new random gift token
    pub fn new() -> Self {
        Self(format!("gft_{}", Uuid::new_v4().simple()))
    }

    /// Create from existing string
    pub fn from_string(token: String) -> Self {
        Self(token)
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for GiftToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GiftToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One of the three independently-revealable parts of a gift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Photos,
    Letter,
    Promise,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Photos, Section::Letter, Section::Promise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Photos => "photos",
            Section::Letter => "letter",
            Section::Promise => "promise",
        }
    }
}

impl FromStr for Section {
    type Err = GiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photos" => Ok(Section::Photos),
            "letter" => Ok(Section::Letter),
            "promise" => Ok(Section::Promise),
            other => Err(GiftError::validation(format!("unknown section: {other}"))),
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The three viewed booleans as one value, serialized in API responses so
/// clients stay a read-through cache of server state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedFlags {
    pub photos: bool,
    pub letter: bool,
    pub promise: bool,
}

impl ViewedFlags {
    pub fn all_viewed(&self) -> bool {
        self.photos && self.letter && self.promise
    }
}

/// A gift record as the store holds it.
///
/// The viewed flags only ever transition false to true; all three true is
/// terminal and the record is purged right after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gift {
    pub id: GiftId,
    pub token: GiftToken,
    pub creator_name: String,
    pub lover_name: String,
    pub letter_text: Option<String>,
    pub promise_text: Option<String>,
    pub photos_viewed: bool,
    pub letter_viewed: bool,
    pub promise_viewed: bool,
    pub created_at: DateTime<Utc>,
}

impl Gift {
    /// Assemble a fresh record with generated id and token, nothing viewed.
    pub fn new(fields: NewGift) -> Self {
        Self {
            id: GiftId::new(),
            token: GiftToken::new(),
            creator_name: fields.creator_name,
            lover_name: fields.lover_name,
            letter_text: fields.letter_text,
            promise_text: fields.promise_text,
            photos_viewed: false,
            letter_viewed: false,
            promise_viewed: false,
            created_at: Utc::now(),
        }
    }

    pub fn is_viewed(&self, section: Section) -> bool {
        match section {
            Section::Photos => self.photos_viewed,
            Section::Letter => self.letter_viewed,
            Section::Promise => self.promise_viewed,
        }
    }

    /// Flip one section's flag to true. True-on-true is a no-op.
    pub fn mark_viewed(&mut self, section: Section) {
        match section {
            Section::Photos => self.photos_viewed = true,
            Section::Letter => self.letter_viewed = true,
            Section::Promise => self.promise_viewed = true,
        }
    }

    pub fn viewed_flags(&self) -> ViewedFlags {
        ViewedFlags {
            photos: self.photos_viewed,
            letter: self.letter_viewed,
            promise: self.promise_viewed,
        }
    }

    pub fn all_viewed(&self) -> bool {
        self.viewed_flags().all_viewed()
    }
}

/// Fields the store persists on insert; id, token and flags are generated.
#[derive(Debug, Clone)]
pub struct NewGift {
    pub creator_name: String,
    pub lover_name: String,
    pub letter_text: Option<String>,
    pub promise_text: Option<String>,
}

/// One photo as submitted by the creator.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Everything the creator submits to make a gift.
#[derive(Debug, Clone, Default)]
pub struct CreateGift {
    pub creator_name: String,
    pub lover_name: String,
    pub letter_text: String,
    pub promise_text: String,
    pub photos: Vec<PhotoUpload>,
}

/// What the creator gets back: the token and the share link built from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCreated {
    pub token: GiftToken,
    pub url: String,
}

/// A viewer-facing snapshot of a gift: display fields, resolved photo URLs,
/// and the current viewed flags. Never carries the internal id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftView {
    pub creator_name: String,
    pub lover_name: String,
    pub letter_text: Option<String>,
    pub promise_text: Option<String>,
    pub photo_urls: Vec<String>,
    pub viewed: ViewedFlags,
}

/// Content of one section, plus the flags after this view landed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionView {
    pub section: Section,
    pub content: SectionContent,
    pub viewed: ViewedFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionContent {
    Photos { urls: Vec<String> },
    Letter { text: String },
    Promise { text: String },
}
