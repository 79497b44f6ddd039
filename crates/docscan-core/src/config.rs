// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration. Built once at process start and shared read-only by
// every pipeline run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// A `(low, high)` hysteresis threshold pair for the Canny detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CannyThresholds {
    pub low: f32,
    pub high: f32,
}

impl CannyThresholds {
    pub const fn new(low: f32, high: f32) -> Self {
        Self { low, high }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() || self.low < 0.0 {
            return Err(invalid(format!(
                "{name}: thresholds ({}, {}) must be finite and non-negative",
                self.low, self.high
            )));
        }
        if self.low > self.high {
            return Err(invalid(format!(
                "{name}: low threshold {} exceeds high threshold {}",
                self.low, self.high
            )));
        }
        Ok(())
    }
}

/// Complete set of threshold constants for detection, rectification and
/// enhancement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Detection runs on a copy whose longest side is at most this many pixels.
    /// Zero disables downscaling.
    pub max_detection_dimension: u32,
    /// Inset of the fallback quad, as a fraction of width/height.
    pub fallback_margin: f32,
    /// Crop the pass-through image to the fallback quad when no quad is given.
    pub crop_fallback_margin: bool,
    /// Largest rectified output, as a multiple of the source pixel count.
    pub max_output_scale: f32,
    pub edges: EdgeConfig,
    pub contours: ContourConfig,
    pub candidates: CandidateConfig,
    pub enhance: EnhanceConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_detection_dimension: 1500,
            fallback_margin: 0.02,
            crop_fallback_margin: false,
            max_output_scale: 4.0,
            edges: EdgeConfig::default(),
            contours: ContourConfig::default(),
            candidates: CandidateConfig::default(),
            enhance: EnhanceConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Load a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline stages cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..0.5).contains(&self.fallback_margin) {
            return Err(invalid(format!(
                "fallback_margin {} must be in [0, 0.5)",
                self.fallback_margin
            )));
        }
        if !self.max_output_scale.is_finite() || self.max_output_scale <= 0.0 {
            return Err(invalid(format!(
                "max_output_scale {} must be positive",
                self.max_output_scale
            )));
        }
        self.edges.validate()?;
        self.contours.validate()?;
        self.candidates.validate()?;
        self.enhance.validate()
    }
}

/// Edge-map ensemble settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Side of the bilateral smoothing window; 0 skips smoothing.
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    /// Half-size of the square kernel used for the morphological gradient.
    pub gradient_radius: u8,
    /// Threshold pairs run on the smoothed image, loosest first.
    pub smoothed_thresholds: Vec<CannyThresholds>,
    /// Threshold pair run on the morphological gradient image.
    pub gradient_thresholds: CannyThresholds,
    /// Chebyshev radius of the dilation applied to the combined mask.
    pub dilate_radius: u8,
    /// Chebyshev radius of the closing applied after dilation.
    pub close_radius: u8,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            bilateral_diameter: 9,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            gradient_radius: 2,
            smoothed_thresholds: vec![
                CannyThresholds::new(30.0, 100.0),
                CannyThresholds::new(50.0, 150.0),
                CannyThresholds::new(75.0, 200.0),
            ],
            gradient_thresholds: CannyThresholds::new(30.0, 100.0),
            // Two passes of a 3x3 dilation.
            dilate_radius: 2,
            close_radius: 2,
        }
    }
}

impl EdgeConfig {
    fn validate(&self) -> Result<()> {
        positive("edges.bilateral_sigma_color", self.bilateral_sigma_color)?;
        positive("edges.bilateral_sigma_space", self.bilateral_sigma_space)?;
        for pair in &self.smoothed_thresholds {
            pair.validate("edges.smoothed_thresholds")?;
        }
        self.gradient_thresholds.validate("edges.gradient_thresholds")
    }
}

/// Contour filtering and ranking settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    pub min_area_fraction: f32,
    pub max_area_fraction: f32,
    pub max_contours: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            min_area_fraction: 0.05,
            max_area_fraction: 0.98,
            max_contours: 25,
        }
    }
}

impl ContourConfig {
    fn validate(&self) -> Result<()> {
        let (min, max) = (self.min_area_fraction, self.max_area_fraction);
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(invalid(format!(
                "contours: area fractions ({min}, {max}) must satisfy 0 <= min <= max <= 1"
            )));
        }
        Ok(())
    }
}

/// Polygon approximation and candidate scoring settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateConfig {
    /// Approximation tolerances as fractions of the contour perimeter,
    /// tightest first.
    pub epsilon_sweep: Vec<f32>,
    /// Candidates at or above this aspect ratio are rejected.
    pub max_aspect_ratio: f32,
    /// Multiplier applied to the aspect ratio in the score denominator.
    pub aspect_penalty_scale: f32,
    /// Ordered quads with any edge shorter than this (pixels) are degenerate.
    pub min_edge_length: f32,
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            epsilon_sweep: vec![0.015, 0.02, 0.03, 0.04, 0.05],
            max_aspect_ratio: 10.0,
            aspect_penalty_scale: 0.1,
            min_edge_length: 1.0,
        }
    }
}

impl CandidateConfig {
    fn validate(&self) -> Result<()> {
        if self.epsilon_sweep.is_empty() {
            return Err(invalid("candidates.epsilon_sweep is empty".into()));
        }
        for &fraction in &self.epsilon_sweep {
            positive("candidates.epsilon_sweep", fraction)?;
        }
        if !self.max_aspect_ratio.is_finite() || self.max_aspect_ratio <= 1.0 {
            return Err(invalid(format!(
                "candidates.max_aspect_ratio {} must be greater than 1",
                self.max_aspect_ratio
            )));
        }
        positive("candidates.aspect_penalty_scale", self.aspect_penalty_scale)?;
        if !self.min_edge_length.is_finite() || self.min_edge_length < 0.0 {
            return Err(invalid(format!(
                "candidates.min_edge_length {} must be non-negative",
                self.min_edge_length
            )));
        }
        Ok(())
    }
}

/// Adaptive enhancement settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhanceConfig {
    /// Detector used to measure edge density.
    pub density_thresholds: CannyThresholds,
    /// Edge density above which content is treated as text-heavy.
    pub text_density_threshold: f32,
    /// CLAHE tile grid (tiles per side).
    pub tile_grid: u32,
    pub text_clip_limit: f32,
    pub photo_clip_limit: f32,
    /// Side of the photo-branch bilateral window; 0 skips denoising.
    pub photo_denoise_diameter: u32,
    pub photo_denoise_sigma_color: f32,
    pub photo_denoise_sigma_space: f32,
    /// Unsharp-mask blur sigma; 0 skips sharpening.
    pub unsharp_sigma: f32,
    pub unsharp_amount: f32,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            density_thresholds: CannyThresholds::new(50.0, 150.0),
            text_density_threshold: 0.05,
            tile_grid: 8,
            text_clip_limit: 2.5,
            photo_clip_limit: 1.5,
            photo_denoise_diameter: 5,
            photo_denoise_sigma_color: 20.0,
            photo_denoise_sigma_space: 20.0,
            unsharp_sigma: 1.5,
            unsharp_amount: 0.5,
        }
    }
}

impl EnhanceConfig {
    fn validate(&self) -> Result<()> {
        self.density_thresholds.validate("enhance.density_thresholds")?;
        if !(0.0..=1.0).contains(&self.text_density_threshold) {
            return Err(invalid(format!(
                "enhance.text_density_threshold {} must be in [0, 1]",
                self.text_density_threshold
            )));
        }
        if self.tile_grid == 0 {
            return Err(invalid("enhance.tile_grid must be at least 1".into()));
        }
        for (name, clip) in [
            ("enhance.text_clip_limit", self.text_clip_limit),
            ("enhance.photo_clip_limit", self.photo_clip_limit),
        ] {
            if !clip.is_finite() || clip < 0.0 {
                return Err(invalid(format!("{name} {clip} must be non-negative")));
            }
        }
        positive("enhance.photo_denoise_sigma_color", self.photo_denoise_sigma_color)?;
        positive("enhance.photo_denoise_sigma_space", self.photo_denoise_sigma_space)?;
        if !self.unsharp_sigma.is_finite() || self.unsharp_sigma < 0.0 || !self.unsharp_amount.is_finite() {
            return Err(invalid(format!(
                "enhance: unsharp sigma {} / amount {} out of range",
                self.unsharp_sigma, self.unsharp_amount
            )));
        }
        Ok(())
    }
}

fn invalid(reason: String) -> ScanError {
    ScanError::InvalidConfig(reason)
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(format!("{name} {value} must be positive")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ScanConfig::from_json_str(
            r#"{ "max_detection_dimension": 800, "contours": { "max_contours": 10 } }"#,
        )
        .expect("valid config");

        assert_eq!(config.max_detection_dimension, 800);
        assert_eq!(config.contours.max_contours, 10);
        assert_eq!(config.contours.min_area_fraction, 0.05);
        assert_eq!(config.candidates.epsilon_sweep.len(), 5);
        assert_eq!(config.edges.smoothed_thresholds.len(), 3);
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let err = ScanConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ScanError::Serialization(_)));
    }

    #[test]
    fn default_round_trips_through_json() {
        let config = ScanConfig::default();
        assert!(config.validate().is_ok());
        let json = serde_json::to_string(&config).expect("serialize");
        let back = ScanConfig::from_json_str(&json).expect("deserialize");
        assert_eq!(config, back);
    }

    #[test]
    fn inverted_canny_pair_is_rejected() {
        let err = ScanConfig::from_json_str(
            r#"{ "enhance": { "density_thresholds": { "low": 150.0, "high": 50.0 } } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)), "{err}");

        let err = ScanConfig::from_json_str(
            r#"{ "edges": { "smoothed_thresholds": [ { "low": 90.0, "high": 10.0 } ] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)), "{err}");
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for raw in [
            r#"{ "candidates": { "epsilon_sweep": [] } }"#,
            r#"{ "candidates": { "epsilon_sweep": [0.02, -0.01] } }"#,
            r#"{ "candidates": { "max_aspect_ratio": 0.5 } }"#,
            r#"{ "contours": { "min_area_fraction": -0.1 } }"#,
            r#"{ "contours": { "min_area_fraction": 0.9, "max_area_fraction": 0.2 } }"#,
            r#"{ "fallback_margin": 0.75 }"#,
            r#"{ "max_output_scale": 0.0 }"#,
            r#"{ "enhance": { "tile_grid": 0 } }"#,
            r#"{ "edges": { "bilateral_sigma_color": 0.0 } }"#,
        ] {
            assert!(
                matches!(ScanConfig::from_json_str(raw), Err(ScanError::InvalidConfig(_))),
                "accepted {raw}"
            );
        }
    }

    #[test]
    fn config_file_is_validated() {
        let dir = std::env::temp_dir().join(format!("docscan-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("bad.json");
        std::fs::write(&path, r#"{ "edges": { "gradient_thresholds": { "low": 5.0, "high": 1.0 } } }"#)
            .expect("write");
        let result = ScanConfig::from_json_file(&path);
        let _ = std::fs::remove_dir_all(&dir);
        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
    }
}
