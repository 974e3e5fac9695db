//! Version resolution layer for bucket artifacts
//!
//! This module turns bucket listings into ordered versions and decides which of
//! them are new relative to the version the scheduler observed last.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Pattern   │────▶│ Extraction  │────▶│  Selectors  │
//! │(prefix,match│     │    Set      │     │(pattern,gen)│
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   ▲
//!        ▼                   │
//! ┌─────────────┐     ┌─────────────┐
//! │   capture   │────▶│    Value    │
//! │   groups    │     │(version cmp)│
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`pattern`]: Listing prefix, anchored matching and version capture
//! - [`value`]: Parsed, totally ordered version values
//! - [`extraction`]: Sortable (path, version, raw text) collections
//! - [`selector`]: Trait for "what's new since X" selection
//! - [`selectors`]: Pattern-mode and generation-mode selectors
//! - [`error`]: Error types for pattern and version parsing
//! - [`types`]: Wire types like `ObservedVersion`

pub mod error;
pub mod extraction;
pub mod pattern;
pub mod selector;
pub mod selectors;
pub mod types;
pub mod value;
