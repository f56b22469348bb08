//! Rendering quality preferences
//!
//! Persisted alongside progress under the `quality` key.

use serde::{Deserialize, Serialize};

/// Quality tier levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityTier {
    pub const ALL: [QualityTier; 3] = [QualityTier::Low, QualityTier::Medium, QualityTier::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityTier::Low => "low",
            QualityTier::Medium => "medium",
            QualityTier::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(QualityTier::Low),
            "medium" | "med" => Some(QualityTier::Medium),
            "high" => Some(QualityTier::High),
            _ => None,
        }
    }

    /// Bubble count for a reaction burst
    pub fn burst_particles(&self) -> usize {
        match self {
            QualityTier::Low => 30,
            QualityTier::Medium => 60,
            QualityTier::High => 120,
        }
    }

    /// Upper bound applied to the device pixel ratio
    pub fn pixel_ratio_cap(&self) -> f64 {
        match self {
            QualityTier::Low | QualityTier::Medium => 1.5,
            QualityTier::High => 2.0,
        }
    }

    /// Whether to antialias (MSAA)
    pub fn antialias(&self) -> bool {
        !matches!(self, QualityTier::Low)
    }

    /// MSAA sample count for the render pipeline
    pub fn sample_count(&self) -> u32 {
        if self.antialias() { 4 } else { 1 }
    }

    /// Tessellation segments for round meshes (spheres, cylinders, discs)
    pub fn mesh_segments(&self) -> u32 {
        match self {
            QualityTier::Low => 10,
            QualityTier::Medium => 16,
            QualityTier::High => 28,
        }
    }

    /// Effective pixel ratio for a device
    pub fn pixel_ratio(&self, device_pixel_ratio: f64) -> f64 {
        device_pixel_ratio.min(self.pixel_ratio_cap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_form_is_lowercase() {
        assert_eq!(serde_json::to_string(&QualityTier::High).unwrap(), "\"high\"");
        let tier: QualityTier = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(tier, QualityTier::Low);
    }

    #[test]
    fn test_from_str() {
        assert_eq!(QualityTier::from_str("Medium"), Some(QualityTier::Medium));
        assert_eq!(QualityTier::from_str(" HIGH "), Some(QualityTier::High));
        assert_eq!(QualityTier::from_str("ultra"), None);
    }

    #[test]
    fn test_burst_scaling() {
        let counts: Vec<usize> = QualityTier::ALL.iter().map(|t| t.burst_particles()).collect();
        assert_eq!(counts, vec![30, 60, 120]);
    }

    #[test]
    fn test_pixel_ratio_cap() {
        assert_eq!(QualityTier::Medium.pixel_ratio(3.0), 1.5);
        assert_eq!(QualityTier::High.pixel_ratio(3.0), 2.0);
        assert_eq!(QualityTier::High.pixel_ratio(1.0), 1.0);
        assert!(!QualityTier::Low.antialias());
        assert_eq!(QualityTier::Low.sample_count(), 1);
    }
}
