// src/srcmap.rs

//! Source Map v3 emission.
//!
//! The mapping structure is accumulated as [`MappedLine`] segments during
//! rendering and serialized here into the standard JSON format with
//! base64-VLQ `mappings`.

use serde::Serialize;

use crate::css::MappedLine;

/// A Source Map v3 document, written as the companion `.map` artifact.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    pub file: String,
    pub sources: Vec<String>,
    pub sources_content: Vec<String>,
    pub names: Vec<String>,
    pub mappings: String,
}

/// Build the final map for a merged artifact.
///
/// `sources` are root-relative paths in source-set order; `contents` holds
/// the original text of each source, index-aligned with `sources`.
pub fn build(
    file: &str,
    sources: Vec<String>,
    contents: Vec<String>,
    lines: &[MappedLine],
) -> SourceMap {
    let mut mappings = String::new();

    // Source index, line and column deltas persist across generated lines;
    // the generated column delta resets per line.
    let mut prev_source: i64 = 0;
    let mut prev_line: i64 = 0;
    let mut prev_column: i64 = 0;

    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            mappings.push(';');
        }
        let mut prev_gen_column: i64 = 0;
        for (j, seg) in line.segments.iter().enumerate() {
            if j > 0 {
                mappings.push(',');
            }
            encode_vlq(&mut mappings, seg.gen_column as i64 - prev_gen_column);
            encode_vlq(&mut mappings, seg.origin.source as i64 - prev_source);
            encode_vlq(&mut mappings, seg.origin.line as i64 - prev_line);
            encode_vlq(&mut mappings, seg.origin.column as i64 - prev_column);
            prev_gen_column = seg.gen_column as i64;
            prev_source = seg.origin.source as i64;
            prev_line = seg.origin.line as i64;
            prev_column = seg.origin.column as i64;
        }
    }

    SourceMap {
        version: 3,
        file: file.to_string(),
        sources,
        sources_content: contents,
        names: Vec::new(),
        mappings,
    }
}

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Append one base64-VLQ value: sign bit in the lowest bit, then 5-bit
/// groups, continuation bit 0x20.
fn encode_vlq(out: &mut String, value: i64) {
    let mut v: u64 = if value < 0 {
        (((-value) as u64) << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = (v & 0x1f) as u8;
        v >>= 5;
        if v != 0 {
            digit |= 0x20;
        }
        out.push(BASE64[digit as usize] as char);
        if v == 0 {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::{MappedLine, Origin, Segment};

    fn vlq(value: i64) -> String {
        let mut s = String::new();
        encode_vlq(&mut s, value);
        s
    }

    #[test]
    fn vlq_known_vectors() {
        assert_eq!(vlq(0), "A");
        assert_eq!(vlq(1), "C");
        assert_eq!(vlq(-1), "D");
        assert_eq!(vlq(15), "e");
        assert_eq!(vlq(16), "gB");
        assert_eq!(vlq(511), "+f");
        assert_eq!(vlq(1024), "ggC");
    }

    #[test]
    fn first_segment_of_first_line_is_absolute() {
        let lines = vec![MappedLine {
            text: ".a {".to_string(),
            segments: vec![Segment {
                gen_column: 0,
                origin: Origin {
                    source: 0,
                    line: 0,
                    column: 0,
                },
            }],
        }];
        let map = build("index.css", vec!["a.less".into()], vec![String::new()], &lines);
        assert_eq!(map.version, 3);
        assert_eq!(map.mappings, "AAAA");
    }

    #[test]
    fn lines_are_separated_by_semicolons_and_deltas_carry_over() {
        let lines = vec![
            MappedLine {
                text: ".a {".to_string(),
                segments: vec![Segment {
                    gen_column: 0,
                    origin: Origin {
                        source: 0,
                        line: 0,
                        column: 0,
                    },
                }],
            },
            MappedLine {
                text: "  color: red;".to_string(),
                segments: vec![Segment {
                    gen_column: 2,
                    origin: Origin {
                        source: 0,
                        line: 0,
                        column: 5,
                    },
                }],
            },
        ];
        let map = build("index.css", vec!["a.less".into()], vec![String::new()], &lines);
        // Line 2: gen col +2, same source, same line, col +5.
        assert_eq!(map.mappings, "AAAA;EAAK");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let map = build("index.css", vec!["a.less".into()], vec!["x".into()], &[]);
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"sourcesContent\""));
        assert!(json.contains("\"version\":3"));
    }
}
