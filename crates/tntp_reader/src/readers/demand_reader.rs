use std::{
    path::{Path, PathBuf},
    str::FromStr,
    sync::OnceLock,
};

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    demand_matrix::DemandMatrix,
    error::{Result, TntpError},
    readers::{read_bytes, read_text},
};

const TOTAL_OD_FLOW_KEY: &str = "TOTAL OD FLOW";

static ORIGIN_PATTERN: OnceLock<Regex> = OnceLock::new();
static ENTRY_PATTERN: OnceLock<Regex> = OnceLock::new();
static METADATA_PATTERN: OnceLock<Regex> = OnceLock::new();

fn origin_pattern() -> &'static Regex {
    ORIGIN_PATTERN.get_or_init(|| Regex::new(r"Origin\s+(\d+)").expect("valid regex"))
}

/// `<destination> : <demand>;`
fn entry_pattern() -> &'static Regex {
    ENTRY_PATTERN
        .get_or_init(|| Regex::new(r"(\d+)\s*:\s*(\d+(?:\.\d+)?)\s*;").expect("valid regex"))
}

/// `<KEY> value` lines of the preamble
fn metadata_pattern() -> &'static Regex {
    METADATA_PATTERN
        .get_or_init(|| Regex::new(r"^\s*<([^>]+)>(.*)$").expect("valid regex"))
}

/// How the demand file is read from disk.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReadMode {
    /// Read as UTF-8 text.
    #[default]
    Text,
    /// Read raw bytes and decode them with the configured encoding.
    Binary,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// UTF-8, invalid sequences replaced by U+FFFD.
    Utf8Lossy,
    /// ISO-8859-1, every byte maps to the code point of the same value.
    Latin1,
}

impl TextEncoding {
    pub fn decode(&self, path: &Path, bytes: Vec<u8>) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|error| {
                TntpError::malformed(
                    path,
                    0,
                    format!("invalid UTF-8 at byte {}", error.utf8_error().valid_up_to()),
                )
            }),
            TextEncoding::Utf8Lossy => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(TextEncoding::Utf8),
            "utf8-lossy" | "utf-8-lossy" => Ok(TextEncoding::Utf8Lossy),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            _ => Err(format!("Unknown encoding: {s}")),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DemandReaderOptions {
    pub mode: ReadMode,
    /// Only used with [`ReadMode::Binary`].
    pub encoding: TextEncoding,
}

pub fn read_demand_file<P: AsRef<Path>>(
    path: P,
    options: &DemandReaderOptions,
) -> Result<DemandMatrix> {
    let path = path.as_ref();
    let text = match options.mode {
        ReadMode::Text => read_text(path)?,
        ReadMode::Binary => options.encoding.decode(path, read_bytes(path)?)?,
    };

    let matrix = parse_demand_text(path, &text)?;

    debug!(
        "Read demand matrix {:?} with total {} from {:?}",
        matrix.shape(),
        matrix.total(),
        path
    );

    Ok(matrix)
}

/// Parses demand text that does not come from a file.
pub fn parse_demand(text: &str) -> Result<DemandMatrix> {
    parse_demand_text(&PathBuf::from("<memory>"), text)
}

/// Extracts every `Origin <id>` block and the `<dest> : <demand>;` entries in
/// it.
///
/// The extraction is lenient on purpose: anything inside a block that is not
/// a complete entry (comments, an entry without its semicolon, numbers too
/// large for the id type) is skipped and the rest of the file still loads.
/// Only a file without a single origin header is rejected.
pub(crate) fn parse_demand_text(path: &Path, text: &str) -> Result<DemandMatrix> {
    let headers = origin_pattern().captures_iter(text).collect::<Vec<_>>();

    let Some(first_header) = headers.first() else {
        return Err(TntpError::DemandParse {
            path: path.to_path_buf(),
        });
    };

    let preamble = &text[..first_header.get(0).map_or(0, |m| m.start())];
    let metadata = parse_metadata(preamble);

    let mut triples = Vec::new();

    for (index, header) in headers.iter().enumerate() {
        let (Some(header_match), Some(origin)) = (header.get(0), header.get(1)) else {
            continue;
        };

        let body_end = headers
            .get(index + 1)
            .and_then(|next| next.get(0))
            .map_or(text.len(), |m| m.start());
        let body = &text[header_match.end()..body_end];

        let Ok(origin) = origin.as_str().parse::<i64>() else {
            warn!("Skipping origin block with out of range id {}", origin.as_str());
            continue;
        };

        let before = triples.len();
        for entry in entry_pattern().captures_iter(body) {
            let (Ok(destination), Ok(demand)) = (entry[1].parse::<i64>(), entry[2].parse::<f64>())
            else {
                continue;
            };
            triples.push((origin, destination, demand));
        }

        let fragments = body.split(';').filter(|f| !f.trim().is_empty()).count();
        let recognized = triples.len() - before;
        if fragments > recognized {
            debug!(
                "Origin {}: {} fragments not recognized as demand entries",
                origin,
                fragments - recognized
            );
        }
    }

    let matrix = DemandMatrix::from_triples(path, &triples, metadata)?;
    check_declared_total(&matrix);

    Ok(matrix)
}

fn parse_metadata(preamble: &str) -> Vec<(String, String)> {
    preamble
        .lines()
        .filter_map(|line| metadata_pattern().captures(line))
        .map(|captures| {
            (
                captures[1].trim().to_string(),
                captures[2].trim().to_string(),
            )
        })
        .collect()
}

fn check_declared_total(matrix: &DemandMatrix) {
    let Some(declared) = matrix
        .metadata_value(TOTAL_OD_FLOW_KEY)
        .and_then(|value| value.parse::<f64>().ok())
    else {
        return;
    };

    let total = matrix.total();
    if (declared - total).abs() > 1e-6 * declared.abs().max(1.0) {
        warn!("Declared total OD flow {declared} differs from parsed total {total}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::NodeId;

    const TRIPS: &str = "<NUMBER OF ZONES> 3
<TOTAL OD FLOW> 125.0
<END OF METADATA>


Origin \t1
    1 :        0.0;    2 :      100.0;    3 :      5.5;

Origin \t2
    1 :       20.0;
";

    fn id(id: i64) -> NodeId {
        NodeId::Int(id)
    }

    #[test]
    fn test_parse_trips() {
        let matrix = parse_demand(TRIPS).unwrap();

        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.get(&id(1), &id(2)), Some(100.0));
        assert_eq!(matrix.get(&id(1), &id(3)), Some(5.5));
        assert_eq!(matrix.get(&id(2), &id(1)), Some(20.0));
        assert_eq!(matrix.get(&id(2), &id(2)), None);
        assert_eq!(matrix.total(), 125.5);
        assert_eq!(matrix.metadata_value("NUMBER OF ZONES"), Some("3"));
        assert_eq!(matrix.metadata_value("END OF METADATA"), Some(""));
    }

    #[test]
    fn test_single_origin_block() {
        let matrix = parse_demand("Origin 1\n2 : 5.0; 3 : 10.0;\n").unwrap();

        assert_eq!(matrix.origins(), &[id(1)]);
        assert_eq!(matrix.destinations(), &[id(2), id(3)]);
        assert_eq!(matrix.get(&id(1), &id(2)), Some(5.0));
        assert_eq!(matrix.get(&id(1), &id(3)), Some(10.0));

        let nodes = [id(1), id(2), id(3)];
        let aligned = matrix.reindex(&nodes, &nodes).fill_missing(0.0);
        assert_eq!(aligned.get(&id(2), &id(3)), Some(0.0));
        assert_eq!(aligned.get(&id(1), &id(1)), Some(0.0));
        assert_eq!(aligned.total(), 15.0);
    }

    // Lenient extraction: broken entries are dropped, not reported.
    #[test]
    fn test_garbage_entries_are_skipped() {
        let matrix = parse_demand("Origin 1\n2 : 5.0; 3 : 10.0\n").unwrap();

        assert_eq!(matrix.destinations(), &[id(2)]);
        assert_eq!(matrix.get(&id(1), &id(2)), Some(5.0));

        let matrix =
            parse_demand("Origin 1\n~ comment\n2 : 5.0 4 : 7.0;\nfoo : 1.0;\n").unwrap();
        assert_eq!(matrix.destinations(), &[id(4)]);
    }

    #[test]
    fn test_entries_spread_over_lines() {
        let matrix = parse_demand("Origin 7\n 1 :\n 2.5;\n 2\n:\n3;").unwrap();

        assert_eq!(matrix.get(&id(7), &id(1)), Some(2.5));
        assert_eq!(matrix.get(&id(7), &id(2)), Some(3.0));
    }

    #[test]
    fn test_no_origin_block() {
        let result = parse_demand("<NUMBER OF ZONES> 3\n1 : 2.0;\n");

        assert!(matches!(result, Err(TntpError::DemandParse { .. })));
    }

    #[test]
    fn test_empty_origin_block_is_absent() {
        let matrix = parse_demand("Origin 1\nOrigin 2\n1 : 4.0;\n").unwrap();

        assert_eq!(matrix.origins(), &[id(2)]);
    }

    #[test]
    fn test_out_of_range_origin_is_skipped() {
        let matrix = parse_demand("Origin 99999999999999999999\n1 : 1.0;\nOrigin 2\n1 : 4.0;\n")
            .unwrap();

        assert_eq!(matrix.origins(), &[id(2)]);
    }

    #[test]
    fn test_duplicate_entry() {
        let result = parse_demand("Origin 1\n2 : 1.0; 2 : 3.0;\n");

        assert!(matches!(result, Err(TntpError::DuplicateKey { .. })));
    }

    #[test]
    fn test_decode_latin1() {
        let bytes = b"<COMMENT> caf\xe9\nOrigin 1\n2 : 1.0;".to_vec();
        let text = TextEncoding::Latin1
            .decode(Path::new("trips.tntp"), bytes.clone())
            .unwrap();
        assert!(text.contains("café"));

        let strict = TextEncoding::Utf8.decode(Path::new("trips.tntp"), bytes);
        assert!(matches!(strict, Err(TntpError::MalformedFile { .. })));
    }

    #[test]
    fn test_encoding_from_str() {
        assert_eq!("UTF-8".parse::<TextEncoding>(), Ok(TextEncoding::Utf8));
        assert_eq!("latin1".parse::<TextEncoding>(), Ok(TextEncoding::Latin1));
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }
}
