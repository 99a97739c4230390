//! Core types and utilities for the rover visual servo.
//!
//! This crate holds everything the localizers share and nothing that depends
//! on a concrete image library: integer pixel geometry, a borrowed RGB frame
//! view, Gaussian smoothing, HSV conversion, color threshold profiles, and
//! connected-region extraction with the moment/area/enclosing-circle
//! measurements the detectors filter on.
//!
//! It also defines the per-cycle [`Observation`] taxonomy that couples the
//! vision crate to the approach state machine.

mod geometry;
mod image;
mod logger;
mod navigation;
mod regions;
mod threshold;

pub use geometry::{
    bearing, centroid, distance, max_pairwise_distance, min_enclosing_circle, normalize_degrees,
    Circle, PixelPos,
};
pub use image::{prepare_frame, BlurParams, GrayImage, HsvImage, RgbImage, RgbImageView};
pub use navigation::{NavigationVector, Observation};
pub use regions::{find_regions, Region};
pub use threshold::{ChannelRange, ColorThresholdProfile};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{default_directive, init_with_level};
