//! Tests for error types including source chaining, context and message formatting

#[cfg(test)]
mod tests {
    use pixelwave::AlgorithmError;
    use pixelwave::io::error::{
        ErrorContext, WithContext, computation_error, invalid_parameter, path_error,
    };
    use std::error::Error;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = AlgorithmError::FileSystem {
            path: "/tmp/test.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(
            AlgorithmError::DegenerateEntropy { position: [0, 0] }
                .source()
                .is_none()
        );
    }

    // Tests contradiction messages name the cell and iteration
    // Verified by omitting the iteration from the message
    #[test]
    fn test_contradiction_message() {
        let error = AlgorithmError::Contradiction {
            position: [3, 7],
            iteration: 12,
        };
        assert_eq!(
            error.to_string(),
            "Contradiction at cell (3, 7) in iteration 12: no candidate pattern remains"
        );
    }

    // Tests depth ceiling messages carry depth, limit and cell
    // Verified by printing the limit twice
    #[test]
    fn test_recursion_limit_message() {
        let error = AlgorithmError::RecursionLimitExceeded {
            position: [1, 2],
            depth: 11,
            limit: 10,
        };
        assert_eq!(
            error.to_string(),
            "Propagation depth 11 exceeds limit 10 at cell (1, 2)"
        );
    }

    // Tests entropy and pattern index messages
    // Verified by dropping the pattern count from the message
    #[test]
    fn test_entropy_and_index_messages() {
        let entropy = AlgorithmError::DegenerateEntropy { position: [4, 0] };
        assert_eq!(
            entropy.to_string(),
            "Entropy undefined at cell (4, 0): no surviving weight"
        );

        let index = AlgorithmError::InvalidPatternIndex {
            index: 9,
            pattern_count: 3,
        };
        assert_eq!(
            index.to_string(),
            "Pattern index 9 is out of bounds (3 patterns)"
        );
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("width", &0, &"must be positive");

        let message = error.to_string();
        assert!(message.contains("width"));
        assert!(message.contains("'0'"));
        assert!(message.contains("must be positive"));
    }

    // Tests ImageExport error with IO source
    // Verified by excluding source error from message
    #[test]
    fn test_image_export_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));
        let error = AlgorithmError::ImageExport {
            path: "/readonly/out.png".into(),
            source: image_error,
        };

        let message = error.to_string();
        assert!(message.contains("/readonly/out.png"));
        assert!(message.contains("access denied"));
        assert!(error.source().is_some());
    }

    // Tests context fills the position of positional errors
    // Verified by ignoring the context position for degenerate entropy
    #[test]
    fn test_context_positions() {
        let result: Result<(), AlgorithmError> =
            Err(AlgorithmError::DegenerateEntropy { position: [0, 0] });
        let err = result
            .with_context(ErrorContext {
                iteration: Some(5),
                position: Some([2, 3]),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            AlgorithmError::DegenerateEntropy { position: [2, 3] }
        ));
    }

    // Tests iteration context only touches the iteration of a contradiction
    // Verified by clearing the position when only the iteration is given
    #[test]
    fn test_with_iteration() {
        let result: Result<(), AlgorithmError> = Err(AlgorithmError::Contradiction {
            position: [1, 1],
            iteration: 0,
        });
        let err = result.with_iteration(8).unwrap_err();
        assert!(matches!(
            err,
            AlgorithmError::Contradiction {
                position: [1, 1],
                iteration: 8
            }
        ));
    }

    // Tests context leaves non-positional errors unchanged
    // Verified by converting every error into a contradiction
    #[test]
    fn test_context_ignores_other_errors() {
        let result: Result<(), AlgorithmError> = Err(computation_error("sampling", &"bad weights"));
        let err = result.with_iteration(3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Computation error in sampling: bad weights"
        );
    }

    // Tests conversions from IO errors and the path helper
    // Verified by mapping IO errors to image errors
    #[test]
    fn test_conversions() {
        let io: AlgorithmError = std::io::Error::other("disk full").into();
        assert!(matches!(io, AlgorithmError::FileSystem { .. }));

        let path = path_error("Target must be a PNG file or directory");
        assert!(
            path.to_string()
                .contains("Target must be a PNG file or directory")
        );
    }
}
