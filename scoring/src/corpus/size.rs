//! Size buckets.
//!
//! Results are grouped under a `"{height}x{width}"` label. Labels order by
//! their smallest dimension first so that `5x5 < 10x10 < 15x15` and a
//! `5x10` bucket sorts with the small puzzles.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A `{height}x{width}` size bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeLabel {
    pub height: u32,
    pub width: u32,
}

impl SizeLabel {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Number of cells in a grid of this size.
    pub fn cells(&self) -> usize {
        self.height as usize * self.width as usize
    }

    fn smallest_dimension(&self) -> u32 {
        self.height.min(self.width)
    }
}

impl Ord for SizeLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.smallest_dimension()
            .cmp(&other.smallest_dimension())
            .then(self.height.cmp(&other.height))
            .then(self.width.cmp(&other.width))
    }
}

impl PartialOrd for SizeLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// Error returned when a size label is not of the form `HxW`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid size label '{0}', expected HEIGHTxWIDTH")]
pub struct ParseSizeError(pub String);

impl FromStr for SizeLabel {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (h, w) = s
            .trim()
            .split_once('x')
            .ok_or_else(|| ParseSizeError(s.to_string()))?;
        let height = h.parse().map_err(|_| ParseSizeError(s.to_string()))?;
        let width = w.parse().map_err(|_| ParseSizeError(s.to_string()))?;
        if height == 0 || width == 0 {
            return Err(ParseSizeError(s.to_string()));
        }
        Ok(Self { height, width })
    }
}

impl Serialize for SizeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SizeLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_height_by_width() {
        assert_eq!(SizeLabel::new(10, 5).to_string(), "10x5");
    }

    #[test]
    fn parse_roundtrips_display() {
        let label: SizeLabel = "15x15".parse().unwrap();
        assert_eq!(label, SizeLabel::new(15, 15));
        assert!("15".parse::<SizeLabel>().is_err());
        assert!("0x5".parse::<SizeLabel>().is_err());
        assert!("axb".parse::<SizeLabel>().is_err());
    }

    #[test]
    fn orders_by_smallest_dimension() {
        let mut labels = vec![
            SizeLabel::new(15, 15),
            SizeLabel::new(5, 5),
            SizeLabel::new(10, 10),
            SizeLabel::new(10, 5),
        ];
        labels.sort();
        let rendered: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        assert_eq!(rendered, vec!["5x5", "10x5", "10x10", "15x15"]);
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&SizeLabel::new(5, 5)).unwrap();
        assert_eq!(json, "\"5x5\"");
        let back: SizeLabel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SizeLabel::new(5, 5));
    }
}
