//! Osmosis `.poly` boundary files.
//!
//! ```text
//! monaco
//! 1
//!    7.4091  43.7247
//!    7.4398  43.7247
//!    7.4398  43.7519
//! END
//! !2
//!    ...hole...
//! END
//! END
//! ```
//!
//! The first line is a free-form name. Each section starts with a name line
//! and ends with `END`; a section whose name begins with `!` is a hole. The
//! file ends with a second `END`.

use std::fmt::Write as _;

use super::{ClipPolygon, ExtentError};

/// Parse `.poly` text into its outer rings.
///
/// Holes are skipped. Several outer sections (a country with islands) become
/// one clip covering their union.
pub fn parse_poly(text: &str, source_name: &str) -> Result<ClipPolygon, ExtentError> {
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    if lines.next().is_none() {
        return Err(ExtentError::malformed(source_name, "file is empty"));
    }

    let mut outer: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut finished = false;

    while let Some(header) = lines.next() {
        if header == "END" {
            finished = true;
            break;
        }
        let is_hole = header.starts_with('!');

        let mut ring = Vec::new();
        let mut closed = false;
        for line in lines.by_ref() {
            if line == "END" {
                closed = true;
                break;
            }
            ring.push(parse_vertex(line, source_name)?);
        }
        if !closed {
            return Err(ExtentError::malformed(
                source_name,
                format!("section `{header}` is missing its END"),
            ));
        }

        if !is_hole {
            outer.push(ring);
        }
    }

    if !finished {
        return Err(ExtentError::malformed(source_name, "missing final END"));
    }
    if outer.is_empty() {
        return Err(ExtentError::malformed(source_name, "no outer section"));
    }
    ClipPolygon::from_rings(outer)
}

fn parse_vertex(line: &str, source_name: &str) -> Result<(f64, f64), ExtentError> {
    let mut parts = line.split_whitespace();
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ExtentError::malformed(
            source_name,
            format!("expected `lon lat`, found `{line}`"),
        ));
    };
    let parse = |s: &str| {
        s.parse::<f64>().map_err(|_| {
            ExtentError::malformed(source_name, format!("invalid coordinate `{s}`"))
        })
    };
    Ok((parse(lon)?, parse(lat)?))
}

/// Render the clip back into `.poly` text, one section per ring, each ring
/// closed explicitly.
///
/// This is what the tile generator receives as `{poly}`.
pub fn write_poly(name: &str, clip: &ClipPolygon) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{name}");
    for (index, ring) in clip.rings().enumerate() {
        let _ = writeln!(out, "{}", index + 1);
        for (lon, lat) in ring.iter().chain(ring.first()) {
            let _ = writeln!(out, "   {lon}   {lat}");
        }
        out.push_str("END\n");
    }
    out.push_str("END\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONACO: &str = "monaco
1
   7.4091  43.7247
   7.4398  43.7247
   7.4398  43.7519
   7.4091  43.7519
   7.4091  43.7247
END
END
";

    #[test]
    fn test_parse_simple() {
        let clip = parse_poly(MONACO, "monaco.poly").unwrap();
        assert_eq!(clip.vertex_count(), 4);
        assert_eq!(clip.envelope(), [7.4091, 43.7247, 7.4398, 43.7519]);
    }

    #[test]
    fn test_parse_ignores_holes() {
        let text = "area
1
   0 0
   10 0
   10 10
   0 10
END
!2
   20 20
   30 20
   30 30
END
END
";
        let clip = parse_poly(text, "area.poly").unwrap();
        assert_eq!(clip.envelope(), [0.0, 0.0, 10.0, 10.0]);
    }

    #[test]
    fn test_parse_multiple_outer_sections() {
        let text = "country\n1\n0 0\n1 0\n1 1\nEND\n!1_hole\n0.1 0.1\n0.2 0.1\n0.2 0.2\nEND\n2\n5 5\n6 5\n6 6\nEND\nEND\n";
        let clip = parse_poly(text, "country.poly").unwrap();
        assert_eq!(clip.ring_count(), 2);
        assert_eq!(clip.envelope(), [0.0, 0.0, 6.0, 6.0]);

        let written = write_poly("extent", &clip);
        assert!(written.contains("END\n2\n"));
        assert_eq!(parse_poly(&written, "extent.poly").unwrap(), clip);
    }

    #[test]
    fn test_parse_missing_final_end() {
        let text = "area\n1\n0 0\n1 0\n1 1\nEND\n";
        let err = parse_poly(text, "area.poly").unwrap_err();
        assert!(err.to_string().contains("final END"));
    }

    #[test]
    fn test_parse_unterminated_section() {
        let text = "area\n1\n0 0\n1 0\n1 1\n";
        assert!(matches!(
            parse_poly(text, "area.poly"),
            Err(ExtentError::Malformed { .. })
        ));
    }

    #[test]
    fn test_parse_bad_coordinate() {
        let text = "area\n1\n0 zero\n1 0\n1 1\nEND\nEND\n";
        let err = parse_poly(text, "area.poly").unwrap_err();
        assert!(err.to_string().contains("zero"));
    }

    #[test]
    fn test_parse_empty_and_no_outer() {
        assert!(parse_poly("", "a.poly").is_err());
        let holes_only = "area\n!1\n0 0\n1 0\n1 1\nEND\nEND\n";
        assert!(parse_poly(holes_only, "a.poly").is_err());
    }

    #[test]
    fn test_parse_too_few_vertices() {
        let text = "area\n1\n0 0\n1 0\nEND\nEND\n";
        assert!(matches!(
            parse_poly(text, "a.poly"),
            Err(ExtentError::TooFewVertices(2))
        ));
    }

    #[test]
    fn test_write_then_parse_preserves_ring() {
        let clip = parse_poly(MONACO, "monaco.poly").unwrap();
        let text = write_poly("extent", &clip);
        assert!(text.starts_with("extent\n1\n"));
        assert!(text.ends_with("END\nEND\n"));
        let again = parse_poly(&text, "extent.poly").unwrap();
        assert_eq!(clip, again);
    }
}
