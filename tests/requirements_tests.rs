use carrier_tracker::{MaterialRequirements, TrackerError};
use std::io::Write;

const COLUMNS: (&str, &str) = ("Materiau", "Quantite_Demandee");

fn parse(content: &str) -> Result<MaterialRequirements, TrackerError> {
    MaterialRequirements::parse(content, ';', COLUMNS.0, COLUMNS.1)
}

fn quantity(reqs: &MaterialRequirements, material: &str) -> Option<u64> {
    reqs.iter().find(|(name, _)| *name == material).map(|(_, qty)| qty)
}

#[test]
fn test_parses_and_normalizes_names() {
    let reqs = parse("Materiau;Quantite_Demandee\n  Tritium ;500\nsteel;3000\n").expect("parse");

    assert_eq!(reqs.len(), 2);
    assert_eq!(quantity(&reqs, "TRITIUM"), Some(500));
    let names: Vec<&str> = reqs.iter().map(|(name, _)| name).collect();
    assert_eq!(names, ["TRITIUM", "STEEL"]);
}

#[test]
fn test_header_match_ignores_case_bom_and_column_order() {
    let reqs = parse("\u{feff}quantite_demandee ; MATERIAU\n42;Gold\n").expect("parse");
    assert_eq!(quantity(&reqs, "GOLD"), Some(42));
}

#[test]
fn test_blank_lines_skipped_and_duplicates_overwrite() {
    let reqs = parse("Materiau;Quantite_Demandee\n\nSteel;10\n\nAluminium;5\nsteel;25\n").expect("parse");
    let entries: Vec<(&str, u64)> = reqs.iter().collect();
    assert_eq!(entries, [("STEEL", 25), ("ALUMINIUM", 5)]);
}

#[test]
fn test_missing_column_is_malformed_input() {
    let err = parse("Material;Quantity\nSteel;10\n").expect_err("should fail");
    assert!(matches!(err, TrackerError::MalformedInput(_)), "got {err:?}");
    assert!(err.to_string().contains("materiau"));
}

#[test]
fn test_bad_quantity_is_malformed_input() {
    for bad in ["Steel;-3", "Steel;lots", "Steel;"] {
        let content = format!("Materiau;Quantite_Demandee\n{bad}\n");
        let err = parse(&content).expect_err(bad);
        assert!(matches!(err, TrackerError::MalformedInput(_)), "{bad}: {err:?}");
    }
}

#[test]
fn test_empty_file_is_malformed_input() {
    assert!(matches!(parse(""), Err(TrackerError::MalformedInput(_))));
}

#[test]
fn test_load_from_file_with_custom_delimiter() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "name,qty").unwrap();
    writeln!(file, "Polymers,800").unwrap();
    writeln!(file, "Semiconductors,120").unwrap();

    let reqs = MaterialRequirements::load(file.path(), ',', "name", "qty").expect("load");
    assert_eq!(quantity(&reqs, "POLYMERS"), Some(800));
    assert_eq!(quantity(&reqs, "SEMICONDUCTORS"), Some(120));
}

#[test]
fn test_missing_file_is_malformed_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = MaterialRequirements::load(dir.path().join("nope.csv"), ';', COLUMNS.0, COLUMNS.1)
        .expect_err("should fail");
    assert!(matches!(err, TrackerError::MalformedInput(_)));
}
