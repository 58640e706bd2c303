//! Tests for PNG rendering and snapshot writing

#[cfg(test)]
mod tests {
    use image::Rgba;
    use ndarray::{Array2, array};
    use pixelwave::AlgorithmError;
    use pixelwave::algorithm::executor::ProjectionSink;
    use pixelwave::analysis::patterns::PatternModel;
    use pixelwave::io::image::{PngSnapshotWriter, export_projection_as_png, render_projection};
    use pixelwave::spatial::Projection;

    const BLACK: [u8; 3] = [0, 0, 0];
    const RED: [u8; 3] = [255, 0, 0];

    fn model() -> PatternModel {
        PatternModel::from_color_grid(&array![[BLACK, RED]]).unwrap()
    }

    fn projection() -> Projection {
        Projection {
            cells: array![[Some(0), Some(1), None], [Some(1), Some(1), Some(0)]],
        }
    }

    // Tests cells render as opaque palette colors and contradictions as transparent
    // Verified by rendering contradicted cells as opaque black
    #[test]
    fn test_render_projection() {
        let img = render_projection(&projection(), &model()).unwrap();

        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(2, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(img.get_pixel(0, 1), &Rgba([255, 0, 0, 255]));
    }

    // Tests unknown pattern ids are reported
    // Verified by skipping unknown ids silently
    #[test]
    fn test_render_unknown_pattern() {
        let bad = Projection {
            cells: Array2::from_elem((1, 1), Some(7)),
        };
        assert!(matches!(
            render_projection(&bad, &model()),
            Err(AlgorithmError::InvalidPatternIndex { index: 7, .. })
        ));
    }

    // Tests export creates missing parent directories and writes a readable PNG
    // Verified by removing directory creation
    #[test]
    fn test_export_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");

        export_projection_as_png(&projection(), &model(), &path).unwrap();

        let written = image::open(&path).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (3, 2));
        assert_eq!(written.get_pixel(2, 0)[3], 0);
        assert_eq!(written.get_pixel(2, 1), &Rgba([0, 0, 0, 255]));
    }

    // Tests the snapshot writer only writes on its interval
    // Verified by writing on every iteration
    #[test]
    fn test_snapshot_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.png");
        let model = model();
        let mut writer = PngSnapshotWriter::new(&path, 3);

        for iteration in 0..7 {
            writer.project(&projection(), &model, iteration).unwrap();
        }

        // Iterations 0, 3 and 6
        assert_eq!(writer.written(), 3);
        assert_eq!(writer.path(), path.as_path());
        assert!(path.exists());
    }

    // Tests a zero interval behaves like writing every iteration
    // Verified by removing the interval clamp
    #[test]
    fn test_zero_interval() {
        let dir = tempfile::tempdir().unwrap();
        let model = model();
        let mut writer = PngSnapshotWriter::new(dir.path().join("snap.png"), 0);

        writer.project(&projection(), &model, 0).unwrap();
        writer.project(&projection(), &model, 1).unwrap();
        assert_eq!(writer.written(), 2);
    }
}
