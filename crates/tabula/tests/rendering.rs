//! Tests for printable size and tab-separated rendering

use tabula::prelude::*;

fn values(sheet: &mut Sheet) -> String {
    let mut out = Vec::new();
    sheet.print_values(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

fn texts(sheet: &Sheet) -> String {
    let mut out = Vec::new();
    sheet.print_texts(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

/// The printable rectangle covers every cell with non-empty text
#[test]
fn test_printable_size() {
    let mut sheet = Sheet::new();
    sheet.set("B2", "x").unwrap();
    sheet.set("D5", "=1").unwrap();

    assert_eq!(sheet.printable_size(), (5, 4));

    sheet.clear("D5").unwrap();
    assert_eq!(sheet.printable_size(), (2, 2));

    sheet.clear("B2").unwrap();
    assert_eq!(sheet.printable_size(), (0, 0));
}

/// An empty sheet renders as empty output, without a newline
#[test]
fn test_empty_sheet_renders_nothing() {
    let mut sheet = Sheet::new();
    assert_eq!(values(&mut sheet), "");
    assert_eq!(texts(&sheet), "");
}

/// Values render evaluated; texts render raw
#[test]
fn test_print_values_and_texts() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "2").unwrap();
    sheet.set("B1", "=A1+3").unwrap();
    sheet.set("A2", "'=escaped").unwrap();
    sheet.set("B2", "plain").unwrap();

    assert_eq!(values(&mut sheet), "2\t5\n=escaped\tplain\n");
    assert_eq!(texts(&sheet), "2\t=A1+3\n'=escaped\tplain\n");
}

/// Gaps inside the rectangle render as empty fields
#[test]
fn test_gaps_are_empty_fields() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "a").unwrap();
    sheet.set("C2", "c").unwrap();

    assert_eq!(values(&mut sheet), "a\t\t\n\t\tc\n");
    assert_eq!(texts(&sheet), "a\t\t\n\t\tc\n");
}

/// Formula errors render as their codes
#[test]
fn test_errors_render_as_codes() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "=1/0").unwrap();
    sheet.set("B1", "text").unwrap();
    sheet.set("C1", "=B1*2").unwrap();
    sheet.set("D1", "=1e308*1e308").unwrap();
    sheet.set("E1", "=F20000").unwrap();

    assert_eq!(
        values(&mut sheet),
        "#DIV/0!\ttext\t#VALUE!\t#ARITHM!\t#REF!\n"
    );
}

/// Numbers render without trailing zeros
#[test]
fn test_number_rendering() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "=4/2").unwrap();
    sheet.set("B1", "=10/4").unwrap();
    sheet.set("C1", "=1/3").unwrap();

    let rendered = values(&mut sheet);
    let fields: Vec<&str> = rendered.trim_end().split('\t').collect();
    assert_eq!(fields[0], "2");
    assert_eq!(fields[1], "2.5");
    assert_eq!(fields[2].parse::<f64>().unwrap(), 1.0 / 3.0);
}

/// Cells created only as reference targets do not widen the rectangle
#[test]
fn test_reference_targets_do_not_print() {
    let mut sheet = Sheet::new();
    sheet.set("A1", "=D4+1").unwrap();

    assert_eq!(sheet.printable_size(), (1, 1));
    assert_eq!(values(&mut sheet), "1\n");
}
