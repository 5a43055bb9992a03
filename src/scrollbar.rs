//! Geometry for the custom scrollbar: a one-column track whose thumb size
//! and offset mirror the list viewport, plus the drag mapping from pointer
//! movement back to scroll offset.

/// Thumb size and position as percentages of the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbGeometry {
    pub height_pct: f64,
    pub top_pct: f64,
}

/// Computes the thumb for a viewport of `visible` rows over `total` rows of
/// content scrolled to `scroll`. Returns `None` when the content does not
/// overflow, which hides the thumb entirely.
pub fn thumb_geometry(total: f64, visible: f64, scroll: f64) -> Option<ThumbGeometry> {
    let scrollable = total - visible;
    if scrollable <= 0.0 {
        return None;
    }
    let height_pct = visible / total * 100.0;
    let top_pct = (scroll / scrollable) * (100.0 - height_pct);
    Some(ThumbGeometry {
        height_pct,
        top_pct,
    })
}

/// Active thumb drag: pointer Y and scroll offset captured at press time.
/// Cleared unconditionally on release, wherever that happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollDrag {
    start_y: f64,
    start_scroll: f64,
}

impl ScrollDrag {
    pub fn begin(pointer_y: f64, scroll: f64) -> Self {
        Self {
            start_y: pointer_y,
            start_scroll: scroll,
        }
    }

    /// Maps the pointer's travel since the press into a new scroll offset:
    /// `delta_y * scrollable / (track - thumb)`, clamped to the valid range.
    pub fn update(
        &self,
        pointer_y: f64,
        total: f64,
        visible: f64,
        track_height: f64,
        thumb_height: f64,
    ) -> f64 {
        let scrollable = (total - visible).max(0.0);
        let span = track_height - thumb_height;
        if span <= 0.0 {
            return self.start_scroll.clamp(0.0, scrollable);
        }
        let ratio = scrollable / span;
        let delta = pointer_y - self.start_y;
        (self.start_scroll + delta * ratio).clamp(0.0, scrollable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_when_content_fits() {
        assert_eq!(thumb_geometry(10.0, 10.0, 0.0), None);
        assert_eq!(thumb_geometry(5.0, 10.0, 0.0), None);
    }

    #[test]
    fn thumb_height_is_visible_over_total() {
        let thumb = thumb_geometry(20.0, 10.0, 0.0).expect("overflowing content");
        assert!((thumb.height_pct - 50.0).abs() < f64::EPSILON);
        assert!((thumb.top_pct - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn thumb_reaches_track_bottom_at_full_scroll() {
        // 40 rows in a 10-row viewport: thumb is 25%, so fully scrolled it
        // sits at 75%.
        let thumb = thumb_geometry(40.0, 10.0, 30.0).expect("overflowing content");
        assert!((thumb.height_pct - 25.0).abs() < 1e-9);
        assert!((thumb.top_pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn thumb_offset_is_proportional() {
        let thumb = thumb_geometry(40.0, 10.0, 15.0).expect("overflowing content");
        assert!((thumb.top_pct - 37.5).abs() < 1e-9);
    }

    #[test]
    fn drag_moves_scroll_through_the_track_ratio() {
        // 40 rows, viewport 10 => scrollable 30. Track 10, thumb 2.5 =>
        // ratio 30 / 7.5 = 4 rows of content per cell of travel.
        let drag = ScrollDrag::begin(5.0, 0.0);
        let scroll = drag.update(6.0, 40.0, 10.0, 10.0, 2.5);
        assert!((scroll - 4.0).abs() < 1e-9);
    }

    #[test]
    fn drag_clamps_to_scrollable_range() {
        let drag = ScrollDrag::begin(5.0, 20.0);
        assert!((drag.update(100.0, 40.0, 10.0, 10.0, 2.5) - 30.0).abs() < 1e-9);
        assert!((drag.update(-100.0, 40.0, 10.0, 10.0, 2.5) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn drag_with_degenerate_track_keeps_start_offset() {
        let drag = ScrollDrag::begin(5.0, 3.0);
        let scroll = drag.update(9.0, 40.0, 10.0, 2.0, 2.0);
        assert!((scroll - 3.0).abs() < 1e-9);
    }
}
