#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnalyzerOptions {
    /// When disabled (`-fno-access-control`) decisions are still computed but the ordinary access
    /// checker is never consulted.
    pub access_control: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        AnalyzerOptions {
            access_control: true,
        }
    }
}

impl AnalyzerOptions {
    pub fn without_access_control() -> Self {
        AnalyzerOptions {
            access_control: false,
        }
    }
}
