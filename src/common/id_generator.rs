// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., A_K7NP3X for artists)
//!
//! Benefits:
//! - No ambiguous characters (excludes I, L, O, U)
//! - Case-insensitive
//! - ~1 billion combinations per entity type (32^6)
//! - Easy to read, type, and communicate verbally

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Artist (A_)
    Artist,
    /// Album (L_) - L for LP
    Album,
    /// Song (S_)
    Song,
    /// Genre (G_)
    Genre,
    /// Playlist (P_)
    Playlist,
    /// Favourite (F_)
    Favourite,
    /// FAQ (Q_) - Q for Question
    Faq,
    /// Activity/Audit (H_) - H for History
    Activity,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Artist => "A",
            EntityPrefix::Album => "L",
            EntityPrefix::Song => "S",
            EntityPrefix::Genre => "G",
            EntityPrefix::Playlist => "P",
            EntityPrefix::Favourite => "F",
            EntityPrefix::Faq => "Q",
            EntityPrefix::Activity => "H",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
///
/// # Returns
/// A string in format "PREFIX_XXXXXX" (e.g., "A_K7NP3X")
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate a raw Crockford Base32 string without prefix
/// Useful for filenames or other non-entity identifiers
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

// ============================================================================
// Convenience functions for each entity type
// ============================================================================

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate an Artist ID (A_XXXXXX)
pub fn generate_artist_id() -> String {
    generate_id(EntityPrefix::Artist)
}

/// Generate an Album ID (L_XXXXXX)
pub fn generate_album_id() -> String {
    generate_id(EntityPrefix::Album)
}

/// Generate a Song ID (S_XXXXXX)
pub fn generate_song_id() -> String {
    generate_id(EntityPrefix::Song)
}

/// Generate a Genre ID (G_XXXXXX)
pub fn generate_genre_id() -> String {
    generate_id(EntityPrefix::Genre)
}

/// Generate a Playlist ID (P_XXXXXX)
pub fn generate_playlist_id() -> String {
    generate_id(EntityPrefix::Playlist)
}

/// Generate a Favourite ID (F_XXXXXX)
pub fn generate_favourite_id() -> String {
    generate_id(EntityPrefix::Favourite)
}

/// Generate a FAQ ID (Q_XXXXXX)
pub fn generate_faq_id() -> String {
    generate_id(EntityPrefix::Faq)
}

/// Generate an Activity ID (H_XXXXXX)
pub fn generate_activity_id() -> String {
    generate_id(EntityPrefix::Activity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_id_format() {
        let artist_id = generate_artist_id();
        assert!(artist_id.starts_with("A_"));
        assert_eq!(artist_id.len(), 8); // "A_" + 6 chars

        let song_id = generate_song_id();
        assert!(song_id.starts_with("S_"));
        assert_eq!(song_id.len(), 8);
    }

    #[test]
    fn test_crockford_alphabet_only() {
        let id = generate_user_id();
        let random_part = &id[2..]; // Skip "U_"

        for c in random_part.chars() {
            assert!(
                CROCKFORD_ALPHABET.contains(&(c as u8)),
                "Character '{}' not in Crockford alphabet",
                c
            );
        }

        // Verify no ambiguous characters
        assert!(!random_part.contains('I'));
        assert!(!random_part.contains('L'));
        assert!(!random_part.contains('O'));
        assert!(!random_part.contains('U'));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_song_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_all_prefixes() {
        assert!(generate_user_id().starts_with("U_"));
        assert!(generate_artist_id().starts_with("A_"));
        assert!(generate_album_id().starts_with("L_"));
        assert!(generate_song_id().starts_with("S_"));
        assert!(generate_genre_id().starts_with("G_"));
        assert!(generate_playlist_id().starts_with("P_"));
        assert!(generate_favourite_id().starts_with("F_"));
        assert!(generate_faq_id().starts_with("Q_"));
        assert!(generate_activity_id().starts_with("H_"));
    }

    #[test]
    fn test_raw_id() {
        let raw = generate_raw_id(8);
        assert_eq!(raw.len(), 8);
        assert!(!raw.contains('_')); // No prefix separator
    }
}
