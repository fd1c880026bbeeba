//! Dialog collaborator contract.

/// Synchronous prompt/confirm/message provider.
///
/// The workspace supplies all user-visible copy; implementations only render
/// it. Hosts without a UI (tests, the console binary) implement this directly.
pub trait Dialog {
    /// Ask for a line of text.
    ///
    /// Returns the trimmed text when the user confirmed with non-empty input,
    /// `None` otherwise. Implementations should go through
    /// [`normalize_input`].
    fn try_get_input(&self, title: &str, prompt: &str, initial: Option<&str>) -> Option<String>;

    /// Yes/no question; `true` means yes.
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Informational or warning message.
    fn show_message(&self, title: &str, message: &str);
}

/// Trim raw dialog input; blank input counts as cancelled.
pub fn normalize_input(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}
