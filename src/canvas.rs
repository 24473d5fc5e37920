//! Interaction state for the annotation canvas.
//!
//! [`DetectionCanvas`] owns the editable detection list (always in natural
//! coordinates) and the single-box drag session. All pointer math happens
//! in logical display coordinates; the UI layer converts window positions
//! into image-relative ones before calling in, and the rendering backend
//! keeps any device-pixel-ratio handling to itself.

use crate::detection::{self, Detection};
use crate::geometry::{BoundingBox, Mapping};

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging {
        /// Index into the stored (unfiltered) detection list. The list is
        /// never reordered while a drag is live, so the index stays valid
        /// even though the score filter hides some entries from view.
        index: usize,
        /// Pointer offset from the box's display-space top-left at grab time.
        grab: (f32, f32),
        /// Display-space size frozen at grab time, so the box keeps its
        /// exact dimensions for the whole drag.
        size: (f32, f32),
    },
}

pub struct DetectionCanvas {
    detections: Vec<Detection>,
    mapping: Option<Mapping>,
    score_threshold: f32,
    drag: DragState,
}

impl DetectionCanvas {
    pub fn new(detections: Vec<Detection>, score_threshold: f32) -> Self {
        Self {
            detections,
            mapping: None,
            score_threshold,
            drag: DragState::Idle,
        }
    }

    /// Set the current view geometry. Call whenever the display size
    /// changes; with no valid mapping (image dimensions unknown) the canvas
    /// stays inert and every pointer call is a no-op.
    pub fn set_view(&mut self, natural_w: f32, natural_h: f32, display_w: f32, display_h: f32) {
        self.mapping = Mapping::between(natural_w, natural_h, display_w, display_h);
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Replace the whole list (a new detector run, a reload, a clear).
    /// Aborts any drag in progress.
    pub fn replace_detections(&mut self, detections: Vec<Detection>) {
        self.detections = detections;
        self.drag = DragState::Idle;
    }

    pub fn score_threshold(&self) -> f32 {
        self.score_threshold
    }

    /// Changing the threshold only changes what is shown and hit-testable;
    /// the stored list keeps every detection.
    pub fn set_score_threshold(&mut self, threshold: f32) {
        self.score_threshold = threshold.clamp(0.0, 1.0);
    }

    pub fn dragging(&self) -> Option<usize> {
        match self.drag {
            DragState::Dragging { index, .. } => Some(index),
            DragState::Idle => None,
        }
    }

    /// Every detection at or above the threshold, with its original list
    /// index and display-space box. Both rendering and hit-testing go
    /// through this, so the filter is applied uniformly. Empty when no
    /// mapping is set.
    pub fn visible(&self) -> Vec<(usize, &Detection, BoundingBox)> {
        let Some(mapping) = self.mapping else {
            return Vec::new();
        };
        let scaled = detection::scale_to_display(&self.detections, &mapping);
        self.detections
            .iter()
            .zip(scaled)
            .enumerate()
            .filter(|(_, (det, _))| det.score >= self.score_threshold)
            .map(|(i, (det, s))| (i, det, s.bbox))
            .collect()
    }

    /// Topmost visible box containing the point, if any. Later list entries
    /// draw on top of earlier ones, so ties go to the highest index.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<usize> {
        self.visible()
            .into_iter()
            .filter(|(_, _, dbox)| dbox.contains(x, y))
            .map(|(i, _, _)| i)
            .last()
    }

    /// Begin a drag if the pointer lands on a visible box. Returns whether
    /// a drag started.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        let Some(index) = self.hit_test(x, y) else {
            return false;
        };
        let Some(mapping) = self.mapping else {
            return false;
        };
        let dbox = mapping.to_display(self.detections[index].bbox);
        self.drag = DragState::Dragging {
            index,
            grab: (x - dbox.xmin, y - dbox.ymin),
            size: (dbox.width(), dbox.height()),
        };
        log::trace!("drag start on detection {index}");
        true
    }

    /// Move the dragged box so its top-left follows `pointer - grab`,
    /// clamped to keep the whole box on the canvas, then write the result
    /// back to the stored list in natural coordinates. Returns `true` when
    /// an update was committed; every move commits, there is no batching.
    pub fn pointer_moved(&mut self, x: f32, y: f32) -> bool {
        let DragState::Dragging { index, grab, size } = self.drag else {
            return false;
        };
        let Some(mapping) = self.mapping else {
            return false;
        };
        let (w, h) = size;
        let left = (x - grab.0).min(mapping.display_w - w).max(0.0);
        let top = (y - grab.1).min(mapping.display_h - h).max(0.0);
        let moved = BoundingBox::new(left, top, left + w, top + h);
        self.detections[index].bbox = mapping.to_natural(moved);
        true
    }

    /// End the drag, keeping the last in-bounds position.
    pub fn pointer_released(&mut self) {
        if let DragState::Dragging { index, .. } = self.drag {
            log::trace!("drag end on detection {index}");
        }
        self.drag = DragState::Idle;
    }

    /// The pointer left the canvas. Same as release: the drag session is
    /// dropped and the last committed position stands.
    pub fn pointer_left(&mut self) {
        self.pointer_released();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    const EPSILON: f32 = 0.001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn det(label: &str, score: f32, bbox: BoundingBox) -> Detection {
        Detection {
            label: label.to_string(),
            score,
            bbox,
        }
    }

    /// 1000×800 natural shown at 500×400, i.e. a 0.5 factor on both axes.
    fn half_scale_canvas(detections: Vec<Detection>) -> DetectionCanvas {
        let mut canvas = DetectionCanvas::new(detections, 0.5);
        canvas.set_view(1000.0, 800.0, 500.0, 400.0);
        canvas
    }

    #[test]
    fn visible_scales_boxes() {
        let canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        let shown = canvas.visible();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].2, BoundingBox::new(50.0, 50.0, 150.0, 150.0));
    }

    #[test]
    fn threshold_hides_low_scores_from_view_and_hits() {
        let canvas = half_scale_canvas(vec![
            det("cat", 0.2, BoundingBox::new(100.0, 100.0, 300.0, 300.0)),
            det("dog", 0.8, BoundingBox::new(100.0, 100.0, 300.0, 300.0)),
        ]);
        let shown = canvas.visible();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].1.label, "dog");
        // both boxes cover this point; only the 0.8 one may be hit
        assert_eq!(canvas.hit_test(100.0, 100.0), Some(1));

        let mut canvas = canvas;
        canvas.set_score_threshold(0.9);
        assert_eq!(canvas.hit_test(100.0, 100.0), None);
        assert_eq!(canvas.detections().len(), 2, "filtering never drops data");
    }

    #[test]
    fn hit_test_prefers_topmost_of_overlapping_boxes() {
        let canvas = half_scale_canvas(vec![
            det("a", 0.9, BoundingBox::new(100.0, 100.0, 400.0, 400.0)),
            det("b", 0.9, BoundingBox::new(200.0, 200.0, 500.0, 500.0)),
        ]);
        // display point (125, 125) = natural (250, 250), inside both
        assert_eq!(canvas.hit_test(125.0, 125.0), Some(1));
        // only inside the first box
        assert_eq!(canvas.hit_test(60.0, 60.0), Some(0));
        // inside neither
        assert_eq!(canvas.hit_test(450.0, 350.0), None);
    }

    #[test]
    fn no_mapping_means_inert_canvas() {
        let mut canvas = DetectionCanvas::new(
            vec![det("cat", 0.9, BoundingBox::new(0.0, 0.0, 100.0, 100.0))],
            0.5,
        );
        assert!(canvas.visible().is_empty());
        assert!(!canvas.pointer_down(10.0, 10.0));
        assert!(!canvas.pointer_moved(20.0, 20.0));
    }

    #[test]
    fn drag_moves_box_and_round_trips_to_natural() {
        let mut canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        // grab the scaled box (50,50..150,150) at its center
        assert!(canvas.pointer_down(100.0, 100.0));
        assert_eq!(canvas.dragging(), Some(0));
        // move right+down by 30 display px
        assert!(canvas.pointer_moved(130.0, 130.0));
        let b = canvas.detections()[0].bbox;
        assert!(approx_eq(b.xmin, 160.0));
        assert!(approx_eq(b.ymin, 160.0));
        assert!(approx_eq(b.width(), 200.0));
        assert!(approx_eq(b.height(), 200.0));
        canvas.pointer_released();
        assert_eq!(canvas.dragging(), None);
    }

    #[test]
    fn drag_clamps_to_canvas_bounds() {
        let mut canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        // grab at the box's display top-left so grab offset is zero
        assert!(canvas.pointer_down(50.0, 50.0));
        // pointer far outside the top-left corner
        assert!(canvas.pointer_moved(-20.0, -20.0));
        let b = canvas.detections()[0].bbox;
        assert!(approx_eq(b.xmin, 0.0));
        assert!(approx_eq(b.ymin, 0.0));
        assert!(approx_eq(b.xmax, 200.0));
        assert!(approx_eq(b.ymax, 200.0));

        // and far past the bottom-right corner
        assert!(canvas.pointer_moved(10_000.0, 10_000.0));
        let b = canvas.detections()[0].bbox;
        assert!(approx_eq(b.xmax, 1000.0));
        assert!(approx_eq(b.ymax, 800.0));
        assert!(approx_eq(b.width(), 200.0));
        assert!(approx_eq(b.height(), 200.0));
    }

    #[test]
    fn drag_keeps_size_across_many_moves() {
        let mut canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        assert!(canvas.pointer_down(100.0, 100.0));
        for step in 0..100 {
            let p = step as f32 * 7.3 - 50.0;
            canvas.pointer_moved(p, p * 0.5);
            let b = canvas.detections()[0].bbox;
            assert!(approx_eq(b.width(), 200.0), "width drifted at step {step}");
            assert!(approx_eq(b.height(), 200.0), "height drifted at step {step}");
            assert!(b.xmin >= -EPSILON && b.xmax <= 1000.0 + EPSILON);
            assert!(b.ymin >= -EPSILON && b.ymax <= 800.0 + EPSILON);
        }
    }

    #[test]
    fn leave_commits_position() {
        let mut canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        assert!(canvas.pointer_down(50.0, 50.0));
        assert!(canvas.pointer_moved(80.0, 90.0));
        let moved = canvas.detections()[0].bbox;
        canvas.pointer_left();
        assert_eq!(canvas.dragging(), None);
        assert_eq!(canvas.detections()[0].bbox, moved);
        // a move after leaving does nothing
        assert!(!canvas.pointer_moved(200.0, 200.0));
        assert_eq!(canvas.detections()[0].bbox, moved);
    }

    #[test]
    fn pointer_down_misses_when_outside_every_box() {
        let mut canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        assert!(!canvas.pointer_down(400.0, 300.0));
        assert_eq!(canvas.dragging(), None);
    }

    #[test]
    fn empty_list_is_harmless() {
        let mut canvas = half_scale_canvas(Vec::new());
        assert!(canvas.visible().is_empty());
        assert!(!canvas.pointer_down(10.0, 10.0));
        canvas.pointer_released();
    }

    #[test]
    fn replace_detections_aborts_drag() {
        let mut canvas = half_scale_canvas(vec![det(
            "cat",
            0.9,
            BoundingBox::new(100.0, 100.0, 300.0, 300.0),
        )]);
        assert!(canvas.pointer_down(100.0, 100.0));
        canvas.replace_detections(Vec::new());
        assert_eq!(canvas.dragging(), None);
        assert!(!canvas.pointer_moved(120.0, 120.0));
    }
}
