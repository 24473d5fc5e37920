//! Per-label colors.
//!
//! Every label gets a deterministic color derived from its text, so the
//! same class always renders the same way within a session. The mapping is
//! built once per detection list instead of re-hashed on every draw.

use std::collections::HashMap;

use crate::detection::Detection;

/// Convert HSV (hue in degrees, saturation and value in 0..=1) to RGB bytes.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> [u8; 3] {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match (h / 60.0) as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    ]
}

/// Hash a label into a hue in `[0, 360)`.
fn label_hue(label: &str) -> f32 {
    // djb2 over the label bytes; cheap and stable across runs.
    let mut hash: u32 = 5381;
    for byte in label.bytes() {
        hash = hash.wrapping_mul(33) ^ u32::from(byte);
    }
    (hash % 360) as f32
}

const LABEL_SATURATION: f32 = 0.75;
const LABEL_VALUE: f32 = 0.9;

/// Label-to-color table for one detection list.
#[derive(Debug, Clone, Default)]
pub struct LabelPalette {
    colors: HashMap<String, [u8; 3]>,
}

impl LabelPalette {
    /// Build the table for every label appearing in `detections`.
    pub fn for_detections(detections: &[Detection]) -> Self {
        let mut colors = HashMap::new();
        for det in detections {
            colors
                .entry(det.label.clone())
                .or_insert_with(|| Self::derive(&det.label));
        }
        Self { colors }
    }

    fn derive(label: &str) -> [u8; 3] {
        hsv_to_rgb(label_hue(label), LABEL_SATURATION, LABEL_VALUE)
    }

    /// Color for a label. Labels not seen at build time still get their
    /// deterministic color, they just are not cached.
    pub fn color(&self, label: &str) -> [u8; 3] {
        self.colors
            .get(label)
            .copied()
            .unwrap_or_else(|| Self::derive(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn det(label: &str) -> Detection {
        Detection {
            label: label.to_string(),
            score: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
        }
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(0.0, 1.0, 1.0), [255, 0, 0]);
        assert_eq!(hsv_to_rgb(120.0, 1.0, 1.0), [0, 255, 0]);
        assert_eq!(hsv_to_rgb(240.0, 1.0, 1.0), [0, 0, 255]);
    }

    #[test]
    fn same_label_same_color() {
        let palette = LabelPalette::for_detections(&[det("cat"), det("dog"), det("cat")]);
        assert_eq!(palette.color("cat"), palette.color("cat"));
        assert_eq!(palette.color("cat"), LabelPalette::default().color("cat"));
    }

    #[test]
    fn distinct_labels_usually_differ() {
        let palette = LabelPalette::for_detections(&[det("cat"), det("dog")]);
        assert_ne!(palette.color("cat"), palette.color("dog"));
    }

    #[test]
    fn unseen_label_still_deterministic() {
        let palette = LabelPalette::for_detections(&[det("cat")]);
        assert_eq!(palette.color("zebra"), palette.color("zebra"));
    }
}
