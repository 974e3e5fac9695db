//! New-version selection trait
//!
//! Decides which versions a check reports given the versions currently held by
//! the bucket and the version the scheduler saw last.

use crate::version::error::VersionError;
use crate::version::types::ObservedVersion;

/// Trait for mode-specific "what's new since X" selection
///
/// Each addressing mode has its own rules:
/// - Pattern: versions parsed from object names; an unrecognized previous
///   path falls back to the latest object
/// - Generation: storage generations of one object; a previous generation
///   with nothing newer yields nothing
pub trait VersionSelector {
    /// Select the versions newer than `previous`
    ///
    /// # Arguments
    /// * `previous` - The version the scheduler observed last, if any
    ///
    /// # Returns
    /// * `Ok(Vec<ObservedVersion>)` - New versions, oldest first (possibly empty)
    /// * `Err(VersionError)` - If `previous` captures an invalid version
    fn select_new(
        &self,
        previous: Option<&ObservedVersion>,
    ) -> Result<Vec<ObservedVersion>, VersionError>;
}
