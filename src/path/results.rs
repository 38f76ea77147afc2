//! Result types for path parsing

/// A virtual path split into its directory walk and file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPath {
    /// Directory names from the root, outermost first
    pub directories: Vec<String>,
    pub file_name: String,
}

impl VirtualPath {
    /// True when the file sits directly under the root
    pub fn is_top_level(&self) -> bool {
        self.directories.is_empty()
    }
}
