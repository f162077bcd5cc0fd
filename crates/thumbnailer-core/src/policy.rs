use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// How a derivative's dimensions are derived from the source image.
///
/// Exactly one policy is active per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePolicy {
    /// Preserve aspect ratio; the longest side becomes the target size.
    FitLongestSide(u32),
    /// Scale the shortest side to the target size, then crop a centered square.
    CenterCropSquare(u32),
}

impl ResizePolicy {
    /// Build a policy from its configuration name (`fit` or `crop`).
    pub fn from_name(name: &str, target_size: u32) -> Result<Self, anyhow::Error> {
        match name.trim().to_lowercase().as_str() {
            "fit" | "fit_longest_side" => Ok(ResizePolicy::FitLongestSide(target_size)),
            "crop" | "center_crop_square" => Ok(ResizePolicy::CenterCropSquare(target_size)),
            other => Err(anyhow::anyhow!(
                "Invalid resize policy: {} (expected 'fit' or 'crop')",
                other
            )),
        }
    }

    pub fn target_size(&self) -> u32 {
        match self {
            ResizePolicy::FitLongestSide(size) | ResizePolicy::CenterCropSquare(size) => *size,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResizePolicy::FitLongestSide(_) => "fit",
            ResizePolicy::CenterCropSquare(_) => "crop",
        }
    }
}

impl Default for ResizePolicy {
    fn default() -> Self {
        ResizePolicy::FitLongestSide(crate::constants::DEFAULT_TARGET_SIZE)
    }
}

impl Display for ResizePolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}({})", self.name(), self.target_size())
    }
}

impl FromStr for ResizePolicy {
    type Err = anyhow::Error;

    /// Parses `fit`, `crop`, `fit:320` or `crop:128`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((name, size)) => {
                let size = size
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("Invalid target size: {}", size))?;
                Self::from_name(name, size)
            }
            None => Self::from_name(s, crate::constants::DEFAULT_TARGET_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(
            ResizePolicy::from_name("FIT", 400).unwrap(),
            ResizePolicy::FitLongestSide(400)
        );
        assert_eq!(
            ResizePolicy::from_name("crop", 128).unwrap(),
            ResizePolicy::CenterCropSquare(128)
        );
        assert!(ResizePolicy::from_name("stretch", 400).is_err());
    }

    #[test]
    fn test_from_str_with_size() {
        assert_eq!(
            "crop:256".parse::<ResizePolicy>().unwrap(),
            ResizePolicy::CenterCropSquare(256)
        );
        assert_eq!(
            "fit".parse::<ResizePolicy>().unwrap(),
            ResizePolicy::FitLongestSide(400)
        );
        assert!("fit:abc".parse::<ResizePolicy>().is_err());
    }

    #[test]
    fn test_target_size_and_display() {
        let policy = ResizePolicy::CenterCropSquare(64);
        assert_eq!(policy.target_size(), 64);
        assert_eq!(policy.to_string(), "crop(64)");
    }
}
