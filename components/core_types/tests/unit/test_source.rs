//! Unit tests for SourcePosition

use core_types::SourcePosition;

#[cfg(test)]
mod source_position_tests {
    use super::*;

    #[test]
    fn test_source_position_creation() {
        let pos = SourcePosition {
            line: 10,
            column: 5,
            offset: 150,
        };

        assert_eq!(pos, SourcePosition::new(10, 5, 150));
    }

    #[test]
    fn test_source_position_display() {
        assert_eq!(SourcePosition::new(1, 5, 4).to_string(), "line 1 col 5");
    }

    #[test]
    fn test_source_position_is_copy() {
        let pos = SourcePosition::start();
        let copy = pos;
        assert_eq!(pos, copy);
    }

    #[test]
    fn test_source_position_serializes_as_object() {
        let json = serde_json::to_string(&SourcePosition::new(2, 3, 9)).unwrap();
        assert_eq!(json, r#"{"line":2,"column":3,"offset":9}"#);
    }
}
