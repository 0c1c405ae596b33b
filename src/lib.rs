pub mod browse;
pub mod catalog;
pub mod config;
pub mod download;
pub mod generate;
pub mod placements;
pub mod player;

/// Audio file extensions the pack generator accepts
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "aiff"];

/// Application name for XDG paths
pub const APP_NAME: &str = "righter";

/// URL path segment carrying the pack number, e.g. `RIGHTER_PACK39`.
pub const PACK_SEGMENT: &str = "RIGHTER_PACK";
