/// A domain-agnostic change event.
///
/// Events are:
/// - **immutable** (treat them as facts)
/// - **tagged** (the variant says what changed; no stringly-typed names)
/// - delivered **synchronously** to every live observer
pub trait Event: Clone + core::fmt::Debug + 'static {
    /// Stable event name/type identifier (e.g. "order_item.price").
    fn event_type(&self) -> &'static str;
}
