//! Integration tests for the pointer-driven rectangle editor.

use pdf_clipper::editor::{
    effective_mode, CanvasSize, EditorMode, Interaction, PointerButton, RectTarget,
    RectangleEditor,
};
use pdf_clipper::geometry::{Handle, NormRect, Point};

const CANVAS: CanvasSize = CanvasSize {
    width: 1000.0,
    height: 1000.0,
};

fn assert_rect_near(got: NormRect, want: NormRect) {
    for (g, w) in [
        (got.x, want.x),
        (got.y, want.y),
        (got.w, want.w),
        (got.h, want.h),
    ] {
        assert!((g - w).abs() < 1e-9, "{got:?} != {want:?}");
    }
}

mod creation_tests {
    use super::*;

    #[test]
    fn test_create_crop_any_drag_direction() {
        let mut editor = RectangleEditor::new();
        editor.pointer_down(
            Point::new(0.6, 0.6),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        editor.pointer_move(Point::new(0.2, 0.3));
        editor.pointer_up();
        assert_rect_near(editor.crop(), NormRect::new(0.2, 0.3, 0.4, 0.3));
        assert_eq!(editor.interaction(), Interaction::None);
    }

    #[test]
    fn test_tiny_mask_discarded_on_release() {
        let mut editor = RectangleEditor::new();
        editor.pointer_down(
            Point::new(0.5, 0.5),
            EditorMode::Mask,
            PointerButton::Primary,
            CANVAS,
        );
        editor.pointer_move(Point::new(0.501, 0.501));
        editor.pointer_up();
        assert!(editor.masks().is_empty());
    }

    #[test]
    fn test_tiny_crop_reset_on_release() {
        let mut editor = RectangleEditor::new();
        editor.pointer_down(
            Point::new(0.5, 0.5),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        editor.pointer_move(Point::new(0.505, 0.505));
        editor.pointer_up();
        assert!(editor.crop().is_empty());
    }

    #[test]
    fn test_secondary_button_draws_mask_in_crop_mode() {
        let mut editor = RectangleEditor::new();
        let started = editor.pointer_down(
            Point::new(0.1, 0.1),
            EditorMode::Crop,
            PointerButton::Secondary,
            CANVAS,
        );
        assert_eq!(
            started,
            Interaction::Creating {
                target: RectTarget::Mask(0)
            }
        );
        editor.pointer_move(Point::new(0.4, 0.4));
        editor.pointer_up();
        assert_eq!(editor.masks().len(), 1);
        assert!(editor.crop().is_empty());
    }

    #[test]
    fn test_view_mode_ignores_pointer() {
        let mut editor = RectangleEditor::new();
        let started = editor.pointer_down(
            Point::new(0.2, 0.2),
            EditorMode::View,
            PointerButton::Primary,
            CANVAS,
        );
        assert_eq!(started, Interaction::None);
        editor.pointer_move(Point::new(0.6, 0.6));
        editor.pointer_up();
        assert!(editor.crop().is_empty());
        assert!(editor.masks().is_empty());
    }

    #[test]
    fn test_effective_mode_resolution() {
        assert_eq!(
            effective_mode(EditorMode::Crop, PointerButton::Secondary),
            EditorMode::Mask
        );
        assert_eq!(
            effective_mode(EditorMode::View, PointerButton::Secondary),
            EditorMode::Mask
        );
        assert_eq!(
            effective_mode(EditorMode::Crop, PointerButton::Primary),
            EditorMode::Crop
        );
    }
}

mod move_resize_tests {
    use super::*;

    fn editor_with_crop(rect: NormRect) -> RectangleEditor {
        let mut editor = RectangleEditor::new();
        editor.seed(rect, Vec::new());
        editor
    }

    #[test]
    fn test_move_translates_from_snapshot() {
        let mut editor = editor_with_crop(NormRect::new(0.1, 0.1, 0.2, 0.2));
        let started = editor.pointer_down(
            Point::new(0.2, 0.2),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        assert_eq!(
            started,
            Interaction::Moving {
                target: RectTarget::Crop
            }
        );
        // Two intermediate moves must not accumulate drift.
        editor.pointer_move(Point::new(0.25, 0.25));
        editor.pointer_move(Point::new(0.3, 0.3));
        editor.pointer_up();
        assert_rect_near(editor.crop(), NormRect::new(0.2, 0.2, 0.2, 0.2));
    }

    #[test]
    fn test_resize_se_corner() {
        let mut editor = editor_with_crop(NormRect::new(0.1, 0.1, 0.2, 0.2));
        let started = editor.pointer_down(
            Point::new(0.3, 0.3),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        assert_eq!(
            started,
            Interaction::Resizing {
                target: RectTarget::Crop,
                handle: Handle::Se
            }
        );
        editor.pointer_move(Point::new(0.4, 0.4));
        editor.pointer_up();
        assert_rect_near(editor.crop(), NormRect::new(0.1, 0.1, 0.3, 0.3));
    }

    #[test]
    fn test_resize_nw_corner() {
        let mut editor = editor_with_crop(NormRect::new(0.1, 0.1, 0.2, 0.2));
        let started = editor.pointer_down(
            Point::new(0.1, 0.1),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        assert_eq!(
            started,
            Interaction::Resizing {
                target: RectTarget::Crop,
                handle: Handle::Nw
            }
        );
        editor.pointer_move(Point::new(0.2, 0.2));
        editor.pointer_up();
        assert_rect_near(editor.crop(), NormRect::new(0.2, 0.2, 0.1, 0.1));
    }

    #[test]
    fn test_resize_past_opposite_edge_flips() {
        let mut editor = editor_with_crop(NormRect::new(0.4, 0.4, 0.2, 0.2));
        editor.pointer_down(
            Point::new(0.6, 0.6),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        // Drag the SE corner left/up past the NW corner.
        editor.pointer_move(Point::new(0.3, 0.3));
        let crop = editor.crop();
        assert!(crop.w >= 0.0 && crop.h >= 0.0);
        assert_rect_near(crop, NormRect::new(0.3, 0.3, 0.1, 0.1));
    }

    #[test]
    fn test_no_negative_extents_mid_drag() {
        let mut editor = editor_with_crop(NormRect::new(0.4, 0.4, 0.2, 0.2));
        editor.pointer_down(
            Point::new(0.6, 0.6),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        for step in [
            Point::new(0.5, 0.5),
            Point::new(0.35, 0.2),
            Point::new(0.0, 0.0),
            Point::new(0.9, 0.1),
        ] {
            editor.pointer_move(step);
            let crop = editor.crop();
            assert!(crop.x >= 0.0 && crop.y >= 0.0);
            assert!(crop.w >= 0.0 && crop.h >= 0.0);
            assert!(crop.right() <= 1.0 + 1e-9 && crop.bottom() <= 1.0 + 1e-9);
        }
    }

    #[test]
    fn test_move_clamped_to_page() {
        let mut editor = editor_with_crop(NormRect::new(0.1, 0.1, 0.3, 0.3));
        editor.pointer_down(
            Point::new(0.2, 0.2),
            EditorMode::Crop,
            PointerButton::Primary,
            CANVAS,
        );
        editor.pointer_move(Point::new(0.0, 0.0));
        let crop = editor.crop();
        assert!(crop.x >= 0.0 && crop.y >= 0.0);
        assert!((crop.w - 0.3).abs() < 1e-9 && (crop.h - 0.3).abs() < 1e-9);
    }
}

mod mask_tests {
    use super::*;

    #[test]
    fn test_topmost_mask_wins_overlap() {
        let mut editor = RectangleEditor::new();
        editor.seed(
            NormRect::EMPTY,
            vec![
                NormRect::new(0.1, 0.1, 0.4, 0.4),
                NormRect::new(0.2, 0.2, 0.4, 0.4),
            ],
        );
        // Inside both bodies, away from all handles.
        let started = editor.pointer_down(
            Point::new(0.35, 0.35),
            EditorMode::Mask,
            PointerButton::Primary,
            CANVAS,
        );
        assert_eq!(
            started,
            Interaction::Moving {
                target: RectTarget::Mask(1)
            }
        );
    }

    #[test]
    fn test_miss_starts_new_mask() {
        let mut editor = RectangleEditor::new();
        editor.seed(NormRect::EMPTY, vec![NormRect::new(0.1, 0.1, 0.2, 0.2)]);
        editor.pointer_down(
            Point::new(0.6, 0.6),
            EditorMode::Mask,
            PointerButton::Primary,
            CANVAS,
        );
        editor.pointer_move(Point::new(0.8, 0.8));
        editor.pointer_up();
        assert_eq!(editor.masks().len(), 2);
    }

    #[test]
    fn test_remove_mask() {
        let mut editor = RectangleEditor::new();
        editor.seed(
            NormRect::EMPTY,
            vec![
                NormRect::new(0.1, 0.1, 0.2, 0.2),
                NormRect::new(0.5, 0.5, 0.2, 0.2),
            ],
        );
        editor.remove_mask(0);
        assert_eq!(editor.masks().len(), 1);
        assert_rect_near(editor.masks()[0], NormRect::new(0.5, 0.5, 0.2, 0.2));
    }

    #[test]
    fn test_hover_handle_query() {
        let mut editor = RectangleEditor::new();
        editor.seed(NormRect::new(0.1, 0.1, 0.2, 0.2), Vec::new());
        let hover = editor.hover_handle(Point::new(0.3, 0.3), EditorMode::Crop, CANVAS);
        assert_eq!(hover, Some(Handle::Se));
        let hover = editor.hover_handle(Point::new(0.3, 0.3), EditorMode::View, CANVAS);
        assert_eq!(hover, None);
    }
}
