//! Corner point management for the cropping UI
//!
//! The UI owns exactly one mutable set of corners. Every edit goes through
//! [`CornerEditor`], which clamps the point to the image and re-runs the quad
//! validator so the UI can flag a bad crop straight away. The rectifier only
//! ever sees a [`Quad`] snapshot taken by value.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Quad};
use crate::quad;

/// Corner labels in TL, TR, BR, BL order
pub const CORNER_LABELS: [&str; 4] = ["Top Left", "Top Right", "Bottom Right", "Bottom Left"];

/// A labeled corner for the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CornerPoint {
    pub id: usize,
    pub label: String,
    pub x: f64,
    pub y: f64,
}

impl CornerPoint {
    pub fn new(id: usize, label: &str, x: f64, y: f64) -> Self {
        Self {
            id,
            label: label.to_string(),
            x,
            y,
        }
    }
}

/// Default corners: a slightly inset frame, in normalized coordinates
pub fn default_corners() -> [Point; 4] {
    [
        Point::new(0.1, 0.1), // Top-left
        Point::new(0.9, 0.1), // Top-right
        Point::new(0.9, 0.9), // Bottom-right
        Point::new(0.1, 0.9), // Bottom-left
    ]
}

/// The editable corners of one source image, in source pixels
#[derive(Debug, Clone)]
pub struct CornerEditor {
    quad: Quad,
    width: u32,
    height: u32,
    valid: bool,
}

impl CornerEditor {
    /// Start from the default inset frame
    pub fn new(width: u32, height: u32) -> Self {
        let corners = default_corners().map(|p| p.to_pixels(width, height));
        Self::from_quad(width, height, Quad { corners })
    }

    /// Start from existing corners, clamped to the image
    pub fn from_quad(width: u32, height: u32, quad: Quad) -> Self {
        let mut editor = Self {
            quad,
            width,
            height,
            valid: false,
        };
        for id in 0..4 {
            let p = editor.quad.corners[id];
            editor.quad.corners[id] = editor.clamp(p.x, p.y);
        }
        editor.valid = quad::is_valid(&editor.quad);
        editor
    }

    fn clamp(&self, x: f64, y: f64) -> Point {
        Point::new(
            x.clamp(0.0, self.width as f64),
            y.clamp(0.0, self.height as f64),
        )
    }

    /// Move a corner (ids 0-3). Returns whether the edited quad is valid.
    pub fn update_corner(&mut self, id: usize, x: f64, y: f64) -> bool {
        match id {
            0..=3 if x.is_finite() && y.is_finite() => {
                self.quad.corners[id] = self.clamp(x, y);
                self.valid = quad::is_valid(&self.quad);
            }
            0..=3 => {
                tracing::warn!("Ignoring non-finite position for corner {}: ({}, {})", id, x, y);
            }
            _ => {
                tracing::warn!("Invalid corner ID: {}", id);
            }
        }
        self.valid
    }

    /// Validity of the current corners, as of the last edit
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The current corners, by value
    pub fn snapshot(&self) -> Quad {
        self.quad
    }

    /// All corners as labeled UI points
    pub fn labeled_points(&self) -> Vec<CornerPoint> {
        self.quad
            .corners
            .iter()
            .zip(CORNER_LABELS)
            .enumerate()
            .map(|(id, (p, label))| CornerPoint::new(id, label, p.x, p.y))
            .collect()
    }

    /// Reset corners to the default inset frame
    pub fn reset(&mut self) {
        *self = Self::new(self.width, self.height);
    }

    pub fn image_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_editor() {
        let editor = CornerEditor::new(1000, 500);
        assert!(editor.is_valid());
        assert_eq!(editor.snapshot().top_left(), Point::new(100.0, 50.0));
        assert_eq!(editor.snapshot().bottom_right(), Point::new(900.0, 450.0));
    }

    #[test]
    fn test_ui_points_count() {
        let editor = CornerEditor::new(640, 480);
        let points = editor.labeled_points();
        assert_eq!(points.len(), 4);
        assert_eq!(points[2].label, "Bottom Right");
        assert_eq!(points[2].id, 2);
    }

    #[test]
    fn test_update_corner() {
        let mut editor = CornerEditor::new(640, 480);
        assert!(editor.update_corner(0, 20.0, 30.0));
        assert_eq!(editor.snapshot().top_left(), Point::new(20.0, 30.0));
    }

    #[test]
    fn test_clamping() {
        let mut editor = CornerEditor::new(640, 480);
        editor.update_corner(0, -15.0, -0.5);
        assert_eq!(editor.snapshot().top_left(), Point::new(0.0, 0.0));
        editor.update_corner(2, 9000.0, 481.0);
        assert_eq!(editor.snapshot().bottom_right(), Point::new(640.0, 480.0));
    }

    #[test]
    fn test_edit_into_bowtie_and_back() {
        let mut editor = CornerEditor::new(100, 100);
        let tr = editor.snapshot().top_right();

        // Drag the top-right corner below the bottom-left one
        assert!(!editor.update_corner(1, 5.0, 95.0));
        assert!(!editor.is_valid());

        assert!(editor.update_corner(1, tr.x, tr.y));
        assert!(editor.is_valid());
    }

    #[test]
    fn test_invalid_id_is_ignored() {
        let mut editor = CornerEditor::new(100, 100);
        let before = editor.snapshot();
        assert!(editor.update_corner(7, 1.0, 1.0));
        assert!(editor.update_corner(0, f64::NAN, 1.0));
        assert_eq!(editor.snapshot(), before);
    }

    #[test]
    fn test_reset() {
        let mut editor = CornerEditor::new(200, 100);
        editor.update_corner(3, 0.0, 0.0);
        assert!(!editor.is_valid());

        editor.reset();
        assert!(editor.is_valid());
        assert_eq!(editor.snapshot(), CornerEditor::new(200, 100).snapshot());
    }
}
