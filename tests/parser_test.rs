//! Tests for the report parser

mod common;

use common::{close, day, SPANISH_REPORT, TEMPLATE_REPORT};
use shiftlog::models::Service;
use shiftlog::parser::{parse_report, ParseError, ReportParser, RequiredField};

#[test]
fn test_template_report() {
    let record = parse_report(TEMPLATE_REPORT).unwrap();

    assert_eq!(record.day, day(2026, 1, 24));
    assert!(close(record.total_sales, 7199.50));
    assert_eq!(record.lunch.pax, 50);
    assert_eq!(record.dinner.pax, 106);
    assert_eq!(record.covers(), 156);
}

#[test]
fn test_spanish_report_matches_template() {
    let english = parse_report(TEMPLATE_REPORT).unwrap();
    let spanish = parse_report(SPANISH_REPORT).unwrap();

    assert_eq!(spanish.day, english.day);
    for ((name, a), (_, b)) in spanish.fields().iter().zip(english.fields().iter()) {
        assert!(close(*a, *b), "{name}: {a} != {b}");
    }
}

#[test]
fn test_total_derived_from_services() {
    let text = TEMPLATE_REPORT.replace("Total Sales Day: 7199,50\n", "");
    let record = parse_report(&text).unwrap();
    assert!(close(record.total_sales, 2341.30 + 4858.20));
}

#[test]
fn test_missing_total_and_service_sales() {
    let text = TEMPLATE_REPORT
        .replace("Total Sales Day: 7199,50\n", "")
        .replace("Lunch: 2341,30", "Lunch:")
        .replace("Dinner: 4858,20", "Dinner:");
    assert_eq!(
        parse_report(&text),
        Err(ParseError::MissingRequiredField(RequiredField::TotalSales))
    );
}

#[test]
fn test_each_dinner_subfield_is_required() {
    for line in ["Pax: 106\n", "Walk in: 2\n"] {
        let text = TEMPLATE_REPORT.replace(line, "");
        assert_eq!(
            parse_report(&text),
            Err(ParseError::IncompleteSection(Service::Dinner)),
            "removing {line:?}"
        );
    }

    let text = TEMPLATE_REPORT.replace("\nNo show: 4", "");
    assert_eq!(
        parse_report(&text),
        Err(ParseError::IncompleteSection(Service::Dinner))
    );
}

#[test]
fn test_missing_day_uses_default() {
    let text = TEMPLATE_REPORT.replace("Day: 24/01/2026\n", "");
    assert_eq!(
        parse_report(&text),
        Err(ParseError::MissingRequiredField(RequiredField::Day))
    );

    let record = ReportParser::new()
        .parse_for_day(&text, Some(day(2026, 2, 1)))
        .unwrap();
    assert_eq!(record.day, day(2026, 2, 1));
}

#[test]
fn test_malformed_day_is_not_replaced_by_default() {
    let text = TEMPLATE_REPORT.replace("24/01/2026", "yesterday");
    let result = ReportParser::new().parse_for_day(&text, Some(day(2026, 2, 1)));
    assert!(matches!(result, Err(ParseError::InvalidDateFormat(_))));
}

#[test]
fn test_invalid_amount_names_field() {
    let text = TEMPLATE_REPORT.replace("Cash: 799,20", "Cash: lots");
    assert_eq!(
        parse_report(&text),
        Err(ParseError::InvalidNumberFormat {
            field: "cash",
            value: "lots".to_string(),
        })
    );
}

#[test]
fn test_windows_line_endings_and_nbsp() {
    let text = TEMPLATE_REPORT
        .replace('\n', "\r\n")
        .replace("Visa: ", "Visa:\u{00A0}");
    let record = parse_report(&text).unwrap();
    assert!(close(record.visa, 6400.30));
}

#[test]
fn test_max_pax_counts_add_without_overflow() {
    let text = TEMPLATE_REPORT
        .replace("Pax: 50", "Pax: 4294967295")
        .replace("Pax: 106", "Pax: 1");
    let record = parse_report(&text).unwrap();

    assert_eq!(record.lunch.pax, u32::MAX);
    assert_eq!(record.covers(), 4_294_967_296);
    assert!(record.avg_ticket() > 0.0);
}
