#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const BACKGROUND: [u8; 3] = [200, 200, 200];
pub const RED: [u8; 3] = [130, 20, 60];
pub const GREEN: [u8; 3] = [20, 140, 40];
pub const BLUE: [u8; 3] = [20, 40, 120];
pub const DARK: [u8; 3] = [30, 30, 30];

pub const WIDTH: u32 = 400;
pub const HEIGHT: u32 = 480;

/// Rover centroid for [`Scene::rover`]; heading points straight up.
pub const CENTROID: (i32, i32) = (200, 426);

pub struct Scene {
    pub img: image::RgbImage,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            img: image::RgbImage::from_pixel(WIDTH, HEIGHT, image::Rgb(BACKGROUND)),
        }
    }

    pub fn disc(mut self, cx: i32, cy: i32, r: i32, rgb: [u8; 3]) -> Self {
        for y in (cy - r).max(0)..=(cy + r).min(HEIGHT as i32 - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(WIDTH as i32 - 1) {
                if (x - cx).pow(2) + (y - cy).pow(2) <= r * r {
                    self.img.put_pixel(x as u32, y as u32, image::Rgb(rgb));
                }
            }
        }
        self
    }

    pub fn rover(self) -> Self {
        self.disc(200, 400, 6, RED)
            .disc(170, 440, 6, GREEN)
            .disc(230, 440, 6, BLUE)
    }

    /// Target straight ahead of the rover at `distance` px.
    pub fn target_ahead(self, distance: i32) -> Self {
        self.disc(CENTROID.0, CENTROID.1 - distance, 23, DARK)
    }

    pub fn save(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        self.img.save(&path).expect("save frame");
        path
    }
}
