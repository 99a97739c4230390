//! Color threshold profiles and mask building.

use serde::{Deserialize, Serialize};

use crate::image::{GrayImage, HsvImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Inclusive `[lo, hi]` range over one 8-bit channel.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub lo: u8,
    pub hi: u8,
}

impl ChannelRange {
    /// Full 8-bit hue axis (H in [0, 180]).
    pub const FULL_HUE: Self = Self::new(0, 180);
    pub const FULL: Self = Self::new(0, 255);

    pub const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn contains(self, v: u8) -> bool {
        self.lo <= v && v <= self.hi
    }
}

fn default_saturation() -> ChannelRange {
    ChannelRange::new(100, 255)
}

fn default_annotate_rgb() -> [u8; 3] {
    [255, 255, 255]
}

/// Named HSV filter for one marker color.
///
/// Colors that wrap the hue axis (red) use `secondary_hue` for the second
/// segment; a pixel passes if either hue range matches and both saturation
/// and value ranges match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorThresholdProfile {
    pub name: String,
    pub hue: ChannelRange,
    #[serde(default)]
    pub secondary_hue: Option<ChannelRange>,
    #[serde(default = "default_saturation")]
    pub saturation: ChannelRange,
    pub value: ChannelRange,
    /// Ring color used when annotating frames.
    #[serde(default = "default_annotate_rgb")]
    pub annotate_rgb: [u8; 3],
}

impl ColorThresholdProfile {
    pub fn red() -> Self {
        Self {
            name: "red".to_string(),
            hue: ChannelRange::new(168, 180),
            secondary_hue: None,
            saturation: ChannelRange::new(100, 255),
            value: ChannelRange::new(52, 149),
            annotate_rgb: [255, 0, 0],
        }
    }

    pub fn green() -> Self {
        Self {
            name: "green".to_string(),
            hue: ChannelRange::new(45, 101),
            secondary_hue: None,
            saturation: ChannelRange::new(74, 255),
            value: ChannelRange::new(60, 168),
            annotate_rgb: [0, 255, 0],
        }
    }

    pub fn blue() -> Self {
        Self {
            name: "blue".to_string(),
            hue: ChannelRange::new(103, 148),
            secondary_hue: None,
            saturation: ChannelRange::new(70, 255),
            value: ChannelRange::new(63, 129),
            annotate_rgb: [0, 0, 255],
        }
    }

    /// Brightness-only filter: full hue and saturation range.
    pub fn value_only(name: impl Into<String>, value: ChannelRange) -> Self {
        Self {
            name: name.into(),
            hue: ChannelRange::FULL_HUE,
            secondary_hue: None,
            saturation: ChannelRange::FULL,
            value,
            annotate_rgb: default_annotate_rgb(),
        }
    }

    #[inline]
    pub fn matches(&self, [h, s, v]: [u8; 3]) -> bool {
        if !self.saturation.contains(s) || !self.value.contains(v) {
            return false;
        }
        self.hue.contains(h) || self.secondary_hue.is_some_and(|r| r.contains(h))
    }

    /// Binary mask (0/255) of the pixels passing this profile.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, hsv), fields(profile = %self.name))
    )]
    pub fn mask(&self, hsv: &HsvImage) -> GrayImage {
        let data = hsv
            .data
            .chunks_exact(3)
            .map(|px| {
                if self.matches([px[0], px[1], px[2]]) {
                    255
                } else {
                    0
                }
            })
            .collect();
        GrayImage {
            width: hsv.width,
            height: hsv.height,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_hue_is_or_combined() {
        let mut p = ColorThresholdProfile::red();
        p.hue = ChannelRange::new(170, 180);
        p.secondary_hue = Some(ChannelRange::new(0, 8));
        assert!(p.matches([175, 200, 100]));
        assert!(p.matches([3, 200, 100]));
        assert!(!p.matches([20, 200, 100]));
        // saturation and value gate both hue segments
        assert!(!p.matches([3, 50, 100]));
        assert!(!p.matches([175, 200, 200]));
    }

    #[test]
    fn value_only_ignores_hue_and_saturation() {
        let p = ColorThresholdProfile::value_only("target", ChannelRange::new(0, 70));
        assert!(p.matches([0, 0, 0]));
        assert!(p.matches([179, 255, 70]));
        assert!(!p.matches([90, 10, 71]));
    }

    #[test]
    fn saturation_defaults_when_omitted() {
        let json = r#"{"name":"x","hue":{"lo":1,"hi":2},"value":{"lo":3,"hi":4}}"#;
        let p: ColorThresholdProfile = serde_json::from_str(json).expect("parse");
        assert_eq!(p.saturation, ChannelRange::new(100, 255));
        assert_eq!(p.secondary_hue, None);
        assert_eq!(p.annotate_rgb, [255, 255, 255]);
    }

    #[test]
    fn mask_marks_matching_pixels() {
        let hsv = HsvImage {
            width: 2,
            height: 1,
            data: vec![60, 255, 100, 0, 0, 0],
        };
        let m = ColorThresholdProfile::green().mask(&hsv);
        assert_eq!(m.data, vec![255, 0]);
    }
}
