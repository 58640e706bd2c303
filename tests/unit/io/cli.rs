//! Tests for argument parsing and batch file processing

#[cfg(test)]
mod tests {
    use clap::Parser;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use pixelwave::AlgorithmError;
    use pixelwave::algorithm::propagation::PropagationMode;
    use pixelwave::io::cli::{Cli, FileProcessor};
    use std::path::{Path, PathBuf};

    const BLACK: [u8; 3] = [0, 0, 0];
    const WHITE: [u8; 3] = [255, 255, 255];

    fn write_checkerboard(path: &Path) {
        let img = RgbImage::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb(BLACK)
            } else {
                Rgb(WHITE)
            }
        });
        img.save(path).unwrap();
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("pixelwave").chain(args.iter().copied())).unwrap()
    }

    // Tests defaults for every option
    // Verified by changing the default width
    #[test]
    fn test_defaults() {
        let cli = parse(&["tile.png"]);

        assert_eq!(cli.target, PathBuf::from("tile.png"));
        assert_eq!(cli.grid_dimensions(), (20, 20));
        assert_eq!(cli.seed, 42);
        assert_eq!(cli.iterations, None);
        assert_eq!(cli.propagation, PropagationMode::Fixpoint);
        assert_eq!(cli.max_depth, 10_000);
        assert_eq!(cli.snapshot_every, 1);
        assert!(cli.skip_existing());
        assert!(cli.should_show_progress());
        assert!(!cli.prefill);
        assert!(!cli.verbose);
    }

    // Tests options flow into the algorithm configuration
    // Verified by swapping rows and columns in grid_dimensions
    #[test]
    fn test_algorithm_config() {
        let cli = parse(&[
            "tile.png",
            "-w",
            "12",
            "-H",
            "5",
            "-s",
            "9",
            "-i",
            "30",
            "--propagation",
            "single-pass",
            "--max-depth",
            "64",
        ]);

        let config = cli.algorithm_config();
        assert_eq!((config.rows, config.cols), (5, 12));
        assert_eq!(config.seed, 9);
        assert_eq!(config.max_iterations, Some(30));
        assert_eq!(config.propagation, PropagationMode::SinglePass);
        assert_eq!(config.max_propagation_depth, 64);
    }

    // Tests unknown propagation modes are rejected at parse time
    // Verified by falling back to fixpoint for unknown names
    #[test]
    fn test_invalid_propagation_mode() {
        let result = Cli::try_parse_from(["pixelwave", "tile.png", "--propagation", "bfs"]);
        assert!(result.is_err());
    }

    // Tests flags toggle skipping and progress
    // Verified by inverting skip_existing
    #[test]
    fn test_flags() {
        let cli = parse(&["dir", "-n", "-q", "-p", "-v"]);
        assert!(!cli.skip_existing());
        assert!(!cli.should_show_progress());
        assert!(cli.prefill);
        assert!(cli.verbose);
    }

    // Tests output names carry the suffix and width by height
    // Verified by writing height before width
    #[test]
    fn test_output_path() {
        let processor = FileProcessor::new(parse(&["tile.png", "-w", "8", "-H", "3"]));
        assert_eq!(
            processor.get_output_path(Path::new("art/tile.png")),
            PathBuf::from("art/tile_wavefunc_8x3.png")
        );
    }

    // Tests processing one exemplar writes a complete output image
    // Verified by exporting before the run finishes
    #[test]
    fn test_process_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tile.png");
        write_checkerboard(&input);

        let target = input.to_string_lossy().to_string();
        let cli = parse(&[target.as_str(), "-w", "6", "-H", "4", "-q"]);
        let mut processor = FileProcessor::new(cli);
        processor.process().unwrap();

        let output = dir.path().join("tile_wavefunc_6x4.png");
        let img = image::open(&output).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (6, 4));
        for (x, y, pixel) in img.enumerate_pixels() {
            assert_eq!(pixel[3], 255, "pixel ({x}, {y}) is transparent");
            if x + 1 < 6 {
                assert_ne!(pixel, img.get_pixel(x + 1, y));
            }
        }
    }

    // Tests directories skip generated images and existing outputs
    // Verified by treating prefill images as exemplars
    #[test]
    fn test_process_directory_skips_generated() {
        let dir = tempfile::tempdir().unwrap();
        write_checkerboard(&dir.path().join("a.png"));
        write_checkerboard(&dir.path().join("b.png"));
        write_checkerboard(&dir.path().join("a_pre.png"));
        std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

        let target = dir.path().to_string_lossy().to_string();
        FileProcessor::new(parse(&[target.as_str(), "-w", "4", "-q"]))
            .process()
            .unwrap();

        assert!(dir.path().join("a_wavefunc_4x4.png").exists());
        assert!(dir.path().join("b_wavefunc_4x4.png").exists());
        assert!(!dir.path().join("a_pre_wavefunc_4x4.png").exists());

        // A second pass finds only existing outputs and leaves them alone
        FileProcessor::new(parse(&[target.as_str(), "-w", "4", "-q"]))
            .process()
            .unwrap();
        assert!(!dir.path().join("a_wavefunc_4x4_wavefunc_4x4.png").exists());
    }

    // Tests a contradicting prefill fails the file with the contradicted cell
    // Verified by ignoring the prefill flag
    #[test]
    fn test_prefill_contradiction() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tile.png");
        write_checkerboard(&input);

        let mut prefill = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 0]));
        prefill.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        prefill.put_pixel(2, 0, Rgba([255, 255, 255, 255]));
        prefill.save(dir.path().join("tile_pre.png")).unwrap();

        let target = input.to_string_lossy().to_string();
        let cli = parse(&[target.as_str(), "-w", "3", "-H", "1", "-p", "-q"]);
        let result = FileProcessor::new(cli).process();

        assert!(matches!(
            result,
            Err(AlgorithmError::Contradiction {
                position: [0, 2],
                iteration: 0
            })
        ));
    }

    // Tests a missing prefill falls back to an unconstrained run
    // Verified by failing when the prefill file is absent
    #[test]
    fn test_missing_prefill_continues() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tile.png");
        write_checkerboard(&input);

        let target = input.to_string_lossy().to_string();
        FileProcessor::new(parse(&[target.as_str(), "-w", "3", "-p", "-q"]))
            .process()
            .unwrap();
        assert!(dir.path().join("tile_wavefunc_3x3.png").exists());
    }

    // Tests oversized dimensions are rejected before any cell count is taken
    // Verified by starting the progress bar with rows * cols before building the grid
    #[test]
    fn test_oversized_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tile.png");
        write_checkerboard(&input);

        let target = input.to_string_lossy().to_string();
        let result = FileProcessor::new(parse(&[target.as_str(), "-w", "8589934592"])).process();

        assert!(matches!(
            result,
            Err(AlgorithmError::InvalidParameter {
                parameter: "rows",
                ..
            })
        ));
        assert!(!dir.path().join("tile_wavefunc_8589934592x8589934592.png").exists());
    }

    // Tests invalid targets are rejected
    // Verified by accepting any existing file
    #[test]
    fn test_invalid_targets() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "text").unwrap();

        let text_target = text.to_string_lossy().to_string();
        let text_cli = parse(&[text_target.as_str(), "-q"]);
        assert!(FileProcessor::new(text_cli).process().is_err());

        let missing = dir.path().join("missing").to_string_lossy().to_string();
        let missing_cli = parse(&[missing.as_str(), "-q"]);
        assert!(FileProcessor::new(missing_cli).process().is_err());
    }
}
