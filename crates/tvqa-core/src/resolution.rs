use serde::{Deserialize, Serialize};
use std::fmt;

/// A viewport size validated against every platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionSpec {
    pub width: u32,
    pub height: u32,
    pub label: String,
}

impl ResolutionSpec {
    pub fn new(width: u32, height: u32, label: impl Into<String>) -> Self {
        Self {
            width,
            height,
            label: label.into(),
        }
    }

    /// Resolution labelled `<width>x<height>`.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(width, height, format!("{}x{}", width, height))
    }

    /// Whether an observed viewport is within `tolerance` pixels on both axes.
    pub fn matches(&self, observed: (u32, u32), tolerance: u32) -> bool {
        self.width.abs_diff(observed.0) <= tolerance && self.height.abs_diff(observed.1) <= tolerance
    }
}

impl fmt::Display for ResolutionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}x{})", self.label, self.width, self.height)
    }
}

/// Full HD, 4K UHD and HD, in the order the TV suites always exercised them.
pub fn default_matrix() -> Vec<ResolutionSpec> {
    vec![
        ResolutionSpec::new(1920, 1080, "1080p"),
        ResolutionSpec::new(3840, 2160, "2160p"),
        ResolutionSpec::new(1280, 720, "720p"),
    ]
}
