/// Raw bytes to optimize, as produced by input resolution.
#[derive(Debug, Clone)]
pub struct InputPayload {
    pub bytes: Vec<u8>,
    /// File name used for staging and for deriving the output name
    pub name: String,
    /// True when the bytes were fetched from a remote URL
    pub is_remote: bool,
}

/// Returns true when the locator names a remote resource rather than a local path.
pub fn is_remote_locator(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}
