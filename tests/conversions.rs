//! Fixture-driven conversion tests.
//!
//! Each file under `tests/fixtures/conversions` holds a list of cases pairing a
//! curvenote document with its mdast form. Both directions are checked:
//!
//! - curvenote → mdast: footnotes are normalized on both sides before comparing
//! - mdast → curvenote: the result must equal the document as YAML text,
//!   defaults included and keys in the same order

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use curvenote_schema::mdast::{self, EncodeOptions};
use curvenote_schema::{from_json, from_mdast, normalize_footnotes, to_json, to_mdast};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/conversions");

// ============================================================================
// Fixture format
// ============================================================================

#[derive(Debug, Deserialize)]
struct TestFile {
    cases: Vec<TestCase>,
}

#[derive(Debug, Deserialize)]
struct TestCase {
    title: String,
    #[serde(default)]
    skip: Option<Skip>,
    #[serde(default)]
    schema: Option<String>,
    curvenote: Value,
    mdast: mdast::Node,
}

/// `skip: true` skips both directions; `skip: c2m` or `skip: m2c` one of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Skip {
    All(bool),
    Direction(String),
}

impl TestCase {
    fn skips(&self, direction: &str) -> bool {
        match &self.skip {
            None => false,
            Some(Skip::All(all)) => *all,
            Some(Skip::Direction(d)) => d == direction,
        }
    }

    fn preset(&self) -> &str {
        self.schema.as_deref().unwrap_or("full")
    }
}

/// Render a document as YAML text. Unlike `Value` equality this is sensitive to key order.
fn as_yaml(value: &Value) -> String {
    serde_yaml::to_string(value).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

fn fixture_files() -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(FIXTURES_DIR)
        .expect("fixtures directory")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "yml"))
        .collect();
    files.sort();
    files
}

fn load(path: &Path) -> TestFile {
    let text = fs::read_to_string(path).expect("read fixture");
    serde_yaml::from_str(&text).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

/// Run `check` for every case not skipped in `direction`, collecting failures.
fn run_cases(direction: &str, check: impl Fn(&TestCase) -> Result<(), String>) {
    let files = fixture_files();
    assert!(!files.is_empty(), "no fixtures found in {FIXTURES_DIR}");

    let mut ran = 0;
    let mut failures = Vec::new();
    for path in &files {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        for case in load(path).cases {
            if case.skips(direction) {
                continue;
            }
            ran += 1;
            if let Err(msg) = check(&case) {
                failures.push(format!("{name} / {}: {msg}", case.title));
            }
        }
    }

    assert!(ran > 0, "every case was skipped");
    assert!(
        failures.is_empty(),
        "{} of {ran} cases failed:\n\n{}",
        failures.len(),
        failures.join("\n\n")
    );
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_curvenote_to_mdast() {
    run_cases("c2m", |case| {
        let options = EncodeOptions::new().with_preset(case.preset());
        let tree = from_json(&case.curvenote, case.preset()).map_err(|e| format!("decode: {e}"))?;
        let out = to_mdast(&tree, &options).map_err(|e| format!("encode: {e}"))?;

        let actual = normalize_footnotes(out);
        let expected = normalize_footnotes(case.mdast.clone());
        if actual == expected {
            Ok(())
        } else {
            Err(format!(
                "expected:\n{}\nactual:\n{}",
                serde_yaml::to_string(&expected).unwrap_or_default(),
                serde_yaml::to_string(&actual).unwrap_or_default()
            ))
        }
    });
}

#[test]
fn test_mdast_to_curvenote() {
    run_cases("m2c", |case| {
        let tree = from_mdast(&case.mdast, case.preset()).map_err(|e| format!("decode: {e}"))?;
        let expected = as_yaml(&case.curvenote);
        let actual = as_yaml(&to_json(&tree));
        if actual == expected {
            Ok(())
        } else {
            Err(format!("expected:\n{expected}\nactual:\n{actual}"))
        }
    });
}

#[test]
fn test_fixture_titles_unique() {
    for path in fixture_files() {
        let file = load(&path);
        let mut titles: Vec<_> = file.cases.iter().map(|c| c.title.as_str()).collect();
        let total = titles.len();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), total, "duplicate titles in {}", path.display());
    }
}

#[test]
fn test_yaml_comparison_sees_key_order() {
    let ordered = serde_json::json!({"type": "heading", "attrs": {"numbered": false, "level": 2}});
    let swapped = serde_json::json!({"type": "heading", "attrs": {"level": 2, "numbered": false}});
    assert_eq!(ordered, swapped);
    assert_ne!(as_yaml(&ordered), as_yaml(&swapped));

    let tree = from_json(&swapped, "full").unwrap();
    assert_eq!(as_yaml(&to_json(&tree)), as_yaml(&ordered));
}
