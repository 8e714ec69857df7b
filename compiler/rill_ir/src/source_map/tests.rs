#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn locates_lines_and_columns() {
    let mut map = SourceMap::new();
    let base = map.add("main.rill", "library a {\n  x: 1;\n}\n");
    assert_eq!(base, 0);

    let loc = map.locate(Span::at(14, 1)).unwrap();
    assert_eq!(loc, SourceLocation::new("main.rill", 2, 3));
}

#[test]
fn separates_units() {
    let mut map = SourceMap::new();
    map.add("a", "one");
    let b = map.add("b", "two\nthree");
    assert_eq!(b, 4);

    let loc = map.locate(Span::at(b + 4, 5)).unwrap();
    assert_eq!(loc, SourceLocation::new("b", 2, 1));
    assert_eq!(map.snippet(Span::at(b + 4, 5)), Some("three"));
}

#[test]
fn columns_count_characters() {
    let mut map = SourceMap::new();
    map.add("u", "\"äö\" + x");
    // `x` is byte 9 but the eighth character.
    let loc = map.locate(Span::at(9, 1)).unwrap();
    assert_eq!(loc.column, 8);
}

#[test]
fn empty_units_get_distinct_offsets() {
    let mut map = SourceMap::new();
    let a = map.add("a", "");
    let b = map.add("b", "");
    assert_ne!(a, b);
    assert_eq!(&**map.file_at(b).unwrap().name(), "b");
}
