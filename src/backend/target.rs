use std::fmt;
use std::str::FromStr;

use crate::VaiRtError;

/// Device identifiers an artifact can be initialized against. Parsing is
/// exact-match on the canonical vendor spellings; `as_str` round-trips them
/// for the binary persistence format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    DpuV2,
    DpuCadx8g,
    DpuCzdx8g,
    DpuCahx8h,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::DpuV2 => "DPUv2",
            Target::DpuCadx8g => "DPUCADX8G",
            Target::DpuCzdx8g => "DPUCZDX8G",
            Target::DpuCahx8h => "DPUCAHX8H",
        }
    }

    pub fn all() -> &'static [Target] {
        &[
            Target::DpuV2,
            Target::DpuCadx8g,
            Target::DpuCzdx8g,
            Target::DpuCahx8h,
        ]
    }
}

impl FromStr for Target {
    type Err = VaiRtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DPUv2" => Ok(Target::DpuV2),
            "DPUCADX8G" => Ok(Target::DpuCadx8g),
            "DPUCZDX8G" => Ok(Target::DpuCzdx8g),
            "DPUCAHX8H" => Ok(Target::DpuCahx8h),
            other => Err(VaiRtError::UnsupportedTarget(other.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
