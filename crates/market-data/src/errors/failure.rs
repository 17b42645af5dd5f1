use serde::{Deserialize, Serialize};

/// Classification of a failed marketplace call.
///
/// The sync orchestrator never retries within a run; the class only decides how
/// the failure is counted and reported.
///
/// | Class | Retry in a later run? | Counted as throttling? |
/// |-------|-----------------------|------------------------|
/// | `RateLimited` | Yes, less often | Yes |
/// | `NotFound` | No | No |
/// | `Transient` | Yes | No |
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// HTTP 429 or a provider-specific throttle signal.
    RateLimited,

    /// The item is absent from the catalog. Terminal.
    NotFound,

    /// Network failure, 5xx, bad payload or a rejected credential.
    Transient,
}

impl FailureClass {
    /// Whether a future scheduled run may succeed where this one failed.
    pub fn worth_retrying(self) -> bool {
        !matches!(self, FailureClass::NotFound)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureClass::RateLimited => "rate_limited",
            FailureClass::NotFound => "not_found",
            FailureClass::Transient => "transient",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
