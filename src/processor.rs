//! Document processor trait.

use std::path::Path;

use crate::document::DocumentChunk;
use crate::error::Result;

/// A format-specific document processor.
///
/// Each variant owns one capability pair: probe whether it can handle a
/// file, and extract that file into ordered [`DocumentChunk`]s. Extending
/// the system to a new format means adding a variant and registering it;
/// the registry performs no format-specific logic itself.
pub trait DocumentProcessor: Send + Sync {
    /// Check whether this processor can handle the given file.
    fn can_process(&self, path: &Path) -> bool;

    /// Extract the document into ordered chunks.
    ///
    /// # Errors
    ///
    /// Returns [`KbError::ProcessingFailed`](crate::KbError::ProcessingFailed)
    /// when extraction fails; a failure never produces partial output.
    fn process(&self, path: &Path) -> Result<Vec<DocumentChunk>>;
}
