use carrier_tracker::ProgressRow;
use carrier_tracker::report::{render_report, render_table};

#[test]
fn test_table_layout() {
    let rows = vec![
        ProgressRow::new("TRITIUM", 500, 500),
        ProgressRow::new("STEEL", 3000, 120),
    ];

    let expected = "\
+----------+----------+----------+-----------+--------------+
| Material | Required | In Cargo | Remaining | Status       |
+==========+==========+==========+===========+==============+
| TRITIUM  |      500 |      500 |         0 | ✅ COMPLETED |
+----------+----------+----------+-----------+--------------+
| STEEL    |     3000 |      120 |      2880 |              |
+----------+----------+----------+-----------+--------------+";
    assert_eq!(render_table(&rows), expected);
}

#[test]
fn test_long_material_names_widen_the_column() {
    let rows = vec![ProgressRow::new("CMM COMPOSITE", 4000, 0)];
    let table = render_table(&rows);

    let widths: Vec<usize> = table.lines().map(|line| line.chars().count()).collect();
    assert!(widths.windows(2).all(|w| w[0] == w[1]), "ragged table:\n{table}");
    assert!(table.contains("| CMM COMPOSITE |"));
}

#[test]
fn test_report_is_framed() {
    let report = render_report(&[]);
    assert!(report.contains("[=== Fleet Carrier Cargo Tracking ===]"));
    assert!(report.contains("[=== End of Report ===]"));
    assert!(report.contains("| Material | Required | In Cargo | Remaining | Status |"));
}
