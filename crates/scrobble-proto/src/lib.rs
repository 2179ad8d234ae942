//! Shared domain types for the scrobbler toolbar: controller modes and their
//! toolbar descriptors, songs, localization, connector registry validation and
//! configuration.

pub mod config;
pub mod connectors;
pub mod i18n;
pub mod mode;
pub mod platform;
pub mod song;
