//! Represents a document's metadata sidecar and listing rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key for the folder a document is filed under.
pub const META_FOLDER: &str = "folder";
/// Metadata key for the trash flag, stored as the literal `"true"`/`"false"`.
pub const META_IS_TRASHED: &str = "is_trashed";
/// Metadata key for the access PIN (empty means unprotected).
pub const META_PIN: &str = "pin";
/// Metadata key for the owner's email address.
pub const META_OWNER_EMAIL: &str = "owner_email";
/// Metadata key for the owner's display name.
pub const META_OWNER_NAME: &str = "owner_name";

/// The mutable metadata sidecar attached to every stored document.
///
/// The backing store fixes metadata at object creation, so this map is only
/// ever changed by rewriting the whole object with a replacement map. Every
/// field is a string on the wire; `is_trashed` stays a string here as well
/// because listing filters compare it byte-for-byte, never as a boolean.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DocumentMetadata {
    /// Folder path the document is filed under; empty means root.
    pub folder: String,

    /// `"true"` when the document sits in the trash, `"false"` otherwise.
    pub is_trashed: String,

    /// Access PIN: empty, or 4 or 6 ASCII digits. Validated at the API
    /// boundary, not by the store.
    pub pin: String,

    /// Free-text owner email; not validated as a real identity.
    pub owner_email: String,

    /// Free-text owner name.
    pub owner_name: String,
}

impl DocumentMetadata {
    /// Build a sidecar view from a raw store metadata map, filling any
    /// missing field with its default.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let field = |key: &str| map.get(key).cloned().unwrap_or_default();
        Self {
            folder: field(META_FOLDER),
            is_trashed: map
                .get(META_IS_TRASHED)
                .cloned()
                .unwrap_or_else(|| "false".to_string()),
            pin: field(META_PIN),
            owner_email: field(META_OWNER_EMAIL),
            owner_name: field(META_OWNER_NAME),
        }
    }

    /// Flatten into the raw map handed to the store on writes.
    pub fn into_map(self) -> HashMap<String, String> {
        HashMap::from([
            (META_FOLDER.to_string(), self.folder),
            (META_IS_TRASHED.to_string(), self.is_trashed),
            (META_PIN.to_string(), self.pin),
            (META_OWNER_EMAIL.to_string(), self.owner_email),
            (META_OWNER_NAME.to_string(), self.owner_name),
        ])
    }

    /// Ensure every sidecar field exists in `map`, inserting defaults for
    /// absent ones. Keys outside the sidecar schema are left untouched, so
    /// metadata the service never heard of survives a rewrite.
    pub fn ensure_defaults(mut map: HashMap<String, String>) -> HashMap<String, String> {
        for key in [META_FOLDER, META_PIN, META_OWNER_EMAIL, META_OWNER_NAME] {
            map.entry(key.to_string()).or_default();
        }
        map.entry(META_IS_TRASHED.to_string())
            .or_insert_with(|| "false".to_string());
        map
    }
}

/// A single row in the filtered listing returned by `GET /files`.
///
/// The raw PIN value is never exposed; only its presence is reported.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DocumentEntry {
    /// Display name: the last path segment of the key.
    pub name: String,

    /// Full store key.
    pub key: String,

    /// Size in bytes, as reported by the store enumeration.
    pub size: u64,

    /// Store-assigned last-modified timestamp.
    pub last_modified: DateTime<Utc>,

    /// Always `"file"`; kept for wire compatibility with older clients.
    #[serde(rename = "type")]
    pub kind: String,

    /// Folder the document is filed under.
    pub folder: String,

    /// Trash flag as the literal string the sidecar carries.
    pub is_trashed: String,

    /// Owner email from the sidecar.
    pub owner_email: String,

    /// Owner name from the sidecar.
    pub owner_name: String,

    /// True iff a PIN is set. The PIN itself never leaves the store.
    pub pin: bool,

    /// Content type recorded at upload time.
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_map_fills_defaults() {
        let meta = DocumentMetadata::from_map(&HashMap::new());
        assert_eq!(meta.folder, "");
        assert_eq!(meta.is_trashed, "false");
        assert_eq!(meta.pin, "");
        assert_eq!(meta.owner_email, "");
        assert_eq!(meta.owner_name, "");
    }

    #[test]
    fn ensure_defaults_keeps_unknown_keys() {
        let mut map = HashMap::new();
        map.insert("x-custom".to_string(), "kept".to_string());
        map.insert(META_PIN.to_string(), "1234".to_string());

        let map = DocumentMetadata::ensure_defaults(map);
        assert_eq!(map.get("x-custom").map(String::as_str), Some("kept"));
        assert_eq!(map.get(META_PIN).map(String::as_str), Some("1234"));
        assert_eq!(map.get(META_IS_TRASHED).map(String::as_str), Some("false"));
        assert_eq!(map.get(META_FOLDER).map(String::as_str), Some(""));
    }

    #[test]
    fn map_round_trip() {
        let meta = DocumentMetadata {
            folder: "docs".into(),
            is_trashed: "false".into(),
            pin: "123456".into(),
            owner_email: "a@b.c".into(),
            owner_name: "A".into(),
        };
        let round = DocumentMetadata::from_map(&meta.clone().into_map());
        assert_eq!(round, meta);
    }
}
