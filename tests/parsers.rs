//! Parsing façade behavior: lazy data, error messages, dialects, markup trees.

use rastro::error::RastroError;
use rastro::parsers::{CsvParser, HtmlParser, XmlParser};

#[test]
fn parsers_reject_missing_content() {
    let mut csv = CsvParser::new(None);
    let err = csv.parse().unwrap_err();
    assert!(matches!(err, RastroError::InvalidStream));
    assert_eq!("invalid stream: parser content must be text", err.to_string());

    let mut html = HtmlParser::new(None);
    assert!(matches!(html.parse().unwrap_err(), RastroError::InvalidStream));

    let mut xml = XmlParser::new(None);
    assert!(matches!(xml.parse().unwrap_err(), RastroError::InvalidStream));
}

#[test]
fn data_is_absent_until_parse_runs() {
    let mut parser = CsvParser::new(Some("id,summary\n1,ok\n"));
    assert!(parser.data().is_none());

    parser.parse().expect("parses");
    assert!(parser.data().is_some());
}

#[test]
fn csv_header_row_names_the_fields() {
    let content = "bug_id,short_desc,assigned_to\n\
                   15,\"GPS mode, sometimes\",rocapal\n\
                   16,Second,jcaden\n\
                   17,Third,acs\n\
                   18,Fourth,dizquierdo\n\
                   19,Fifth,sduenas\n";

    let mut parser = CsvParser::new(Some(content));
    parser.parse().expect("parses");

    assert_eq!(
        Some(&["bug_id".to_string(), "short_desc".to_string(), "assigned_to".to_string()][..]),
        parser.fieldnames()
    );

    let rows = parser.data().expect("data");
    assert_eq!(5, rows.len());
    assert_eq!("15", rows[0]["bug_id"]);
    // Quoting protects the embedded delimiter.
    assert_eq!("GPS mode, sometimes", rows[0]["short_desc"]);
    assert_eq!("sduenas", rows[4]["assigned_to"]);
}

#[test]
fn csv_supports_custom_dialects() {
    let content = "1;'a;b';done\n2;plain;open\n";
    let fieldnames = vec!["id".to_string(), "summary".to_string(), "status".to_string()];

    let mut parser = CsvParser::with_dialect(Some(content), Some(fieldnames), b';', b'\'');
    parser.parse().expect("parses");

    let rows = parser.data().expect("data");
    assert_eq!(2, rows.len());
    assert_eq!("a;b", rows[0]["summary"]);
    assert_eq!("open", rows[1]["status"]);
}

#[test]
fn csv_data_survives_repeated_reads() {
    let mut parser = CsvParser::new(Some("id\n1\n2\n"));
    parser.parse().expect("parses");

    let first: Vec<String> = parser
        .data()
        .expect("data")
        .iter()
        .map(|row| row["id"].clone())
        .collect();
    let second: Vec<String> = parser
        .data()
        .expect("data")
        .iter()
        .map(|row| row["id"].clone())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn html_documents_are_navigable() {
    let content = r#"<html>
<head><title>Bug list</title></head>
<body>
<table id="issues"><tr><td>one</td></tr></table>
<table><tr><td>two</td></tr></table>
<p id="footer">generated by rastro
</body>
</html>"#;

    let mut parser = HtmlParser::new(Some(content));
    parser.parse().expect("parses despite unclosed tags");

    let document = parser.data().expect("data");
    assert_eq!("Bug list", document.find("title").expect("title").text());
    assert_eq!(2, document.find_all("table").len());

    let issues = document.find_by_id("issues").expect("table by id");
    assert_eq!("table", issues.name());
    assert!(document.find_by_id("nope").is_none());
}

#[test]
fn html_preserves_non_ascii_text() {
    let content = "<html><body><p id=\"author\">sdueñas</p></body></html>";
    let mut parser = HtmlParser::new(Some(content));
    parser.parse().expect("parses");

    let author = parser.data().expect("data").find_by_id("author").expect("p");
    assert_eq!("sdueñas", author.text());
}

#[test]
fn xml_documents_are_navigable() {
    let content = r#"<?xml version="1.0" encoding="UTF-8"?>
<bugs>
  <bug id="1"><summary>First</summary><submitted_by>sdueñas</submitted_by></bug>
  <bug id="2"><summary>Second</summary></bug>
</bugs>"#;

    let mut parser = XmlParser::new(Some(content));
    parser.parse().expect("parses");

    let root = parser.data().expect("data");
    assert_eq!("bugs", root.name());

    let bugs = root.find_all("bug");
    assert_eq!(2, bugs.len());
    assert_eq!(Some("1"), bugs[0].attr("id"));
    assert_eq!("sdueñas", bugs[0].child("submitted_by").expect("child").text());
}

#[test]
fn malformed_xml_reports_the_cause() {
    let mut parser = XmlParser::new(Some("<bugs><bug></bugs>"));
    let err = parser.parse().unwrap_err();

    assert!(matches!(err, RastroError::XmlParse { .. }));
    assert!(err.to_string().starts_with("error parsing XML. "));
    assert!(parser.data().is_none());
}

#[test]
fn xml_requires_a_single_root() {
    let mut parser = XmlParser::new(Some("<a/><b/>"));
    let err = parser.parse().unwrap_err();
    assert!(err.to_string().starts_with("error parsing XML. "));

    let mut parser = XmlParser::new(Some("   "));
    assert!(parser.parse().is_err());
}
