use serde::Deserialize;

/// What the orchestrator does with stock decrements already applied when a
/// later step of the same request fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompensationPolicy {
    /// Leave earlier decrements applied.
    #[default]
    None,
    /// Re-increment earlier decrements, last applied first.
    ///
    /// Only decrements the products service confirmed are restored. A
    /// decrement whose call timed out may still have landed remotely and is
    /// left as is.
    Reverse,
}
