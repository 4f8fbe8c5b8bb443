use std::io::Cursor;

use super::*;
use crate::convert::OpenccConverter;

fn parse(text: &str) -> Result<RawDictionary, SourceError> {
    read_frequency_csv(Cursor::new(text), CsvSchema::TextWeight)
}

fn words(text: &str, marker: Option<&str>) -> WordSet {
    let mut set = WordSet::new();
    set.extend_from_reader(Cursor::new(text), marker, DEFAULT_COMMENT_PREFIX)
        .unwrap();
    set
}

#[test]
fn test_csv_last_row_wins() {
    let dict = parse("text,weight\nA,1.0\nB,0.5\nA,2.0\n").unwrap();
    assert_eq!(dict.len(), 2);
    assert_eq!(dict["A"], 2.0);
    assert_eq!(dict["B"], 0.5);
}

#[test]
fn test_csv_header_only() {
    assert!(parse("text,weight\n").unwrap().is_empty());
    assert!(parse("").unwrap().is_empty());
}

#[test]
fn test_csv_header_never_parsed() {
    // A header that looks like data is still skipped.
    let dict = parse("香港,9.0\n我哋,1.0\n").unwrap();
    assert_eq!(dict.len(), 1);
    assert!(dict.contains_key("我哋"));
}

#[test]
fn test_csv_skips_blank_rows_and_text() {
    let dict = parse("text,weight\n\n   \n,3.0\n  ,4.0\n你好,0.25\n").unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict["你好"], 0.25);
}

#[test]
fn test_csv_trims_weight_and_crlf() {
    let dict = parse("text,weight\r\n食飯, 1.5 \r\n飲茶,2\r\n").unwrap();
    assert_eq!(dict["食飯"], 1.5);
    assert_eq!(dict["飲茶"], 2.0);
}

#[test]
fn test_csv_keeps_text_as_written() {
    let dict = parse("text,weight\n A,1.0\nA,2.0\nA ,3.0\n").unwrap();
    assert_eq!(dict.len(), 3);
    assert_eq!(dict[" A"], 1.0);
    assert_eq!(dict["A"], 2.0);
    assert_eq!(dict["A "], 3.0);
}

#[test]
fn test_csv_negative_zero_stored_as_zero() {
    let dict = parse("text,weight\nA,-0\nB,-0.0\nC,0\n").unwrap();
    for key in ["A", "B", "C"] {
        assert_eq!(dict[key].to_bits(), 0.0f32.to_bits(), "{key}");
    }
}

#[test]
fn test_csv_malformed_weight_reports_line() {
    let err = parse("text,weight\nA,1.0\nB,abc\nC,2.0\n").unwrap_err();
    match &err {
        SourceError::Malformed { line, content, .. } => {
            assert_eq!(*line, 3);
            assert_eq!(content, "B,abc");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("B,abc"));
}

#[test]
fn test_csv_missing_weight() {
    let err = parse("text,weight\nA\n").unwrap_err();
    assert!(matches!(err, SourceError::Malformed { line: 2, .. }));
}

#[test]
fn test_csv_rejects_negative_and_nan() {
    assert!(matches!(
        parse("text,weight\nA,-1\n"),
        Err(SourceError::Malformed { line: 2, .. })
    ));
    assert!(matches!(
        parse("text,weight\nA,1\nB,NaN\n"),
        Err(SourceError::Malformed { line: 3, .. })
    ));
    assert!(parse("text,weight\nA,inf\n").is_err());
}

#[test]
fn test_csv_ignored_column_schema() {
    let text = "text,jyutping,weight\n香港,hoeng1 gong2,3.5\n我哋,ngo5 dei6,1\n";
    let dict = read_frequency_csv(Cursor::new(text), CsvSchema::TextIgnoredWeight).unwrap();
    assert_eq!(dict["香港"], 3.5);
    assert_eq!(dict["我哋"], 1.0);

    // Two columns are not enough for this layout.
    let err = read_frequency_csv(Cursor::new("h\nA,1\n"), CsvSchema::TextIgnoredWeight);
    assert!(err.is_err());
}

#[test]
fn test_csv_schema_names() {
    assert_eq!(CsvSchema::from_name("text-weight"), Some(CsvSchema::TextWeight));
    assert_eq!(
        CsvSchema::from_name("text-ignored-weight"),
        Some(CsvSchema::TextIgnoredWeight)
    );
    assert_eq!(CsvSchema::from_name("weight-text"), None);
    assert_eq!(CsvSchema::default(), CsvSchema::TextWeight);
}

#[test]
fn test_csv_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("freq.csv");
    std::fs::write(&path, "text,weight\n你好,0.3\n").unwrap();
    let dict = load_frequency_csv(&path, CsvSchema::TextWeight).unwrap();
    assert_eq!(dict["你好"], 0.3);

    let missing = load_frequency_csv(&dir.path().join("nope.csv"), CsvSchema::TextWeight);
    assert!(matches!(missing, Err(SourceError::Io(_))));
}

#[test]
fn test_extract_word() {
    assert_eq!(extract_word("我哋\tngo5 dei6"), Some("我哋"));
    assert_eq!(extract_word("  食飯  "), Some("食飯"));
    assert_eq!(extract_word("飲茶\t"), Some("飲茶"));
    assert_eq!(extract_word(""), None);
    assert_eq!(extract_word("   "), None);
    assert_eq!(extract_word("\tsomething"), None);
}

#[test]
fn test_corpus_start_marker_and_comments() {
    let corpus = "name: essay\nversion: 1\n...\n# comment\n我哋\t1\n食飯\n";
    let set = words(corpus, Some("..."));
    assert_eq!(set.len(), 2);
    assert!(set.contains("我哋"));
    assert!(set.contains("食飯"));
    assert!(!set.contains("name: essay"));
    assert!(!set.contains("# comment"));
}

#[test]
fn test_corpus_marker_never_seen() {
    let set = words("我哋\n食飯\n", Some("..."));
    assert!(set.is_empty());
}

#[test]
fn test_corpus_without_marker() {
    let set = words("我哋\n# skipped\n\n食飯\t1\n", None);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_corpus_marker_tolerates_whitespace() {
    let set = words("header\n...  \r\n我哋\r\n", Some("..."));
    assert!(set.contains("我哋"));
}

#[test]
fn test_corpus_comment_prefix_disabled() {
    let mut set = WordSet::new();
    let read = set
        .extend_from_reader(Cursor::new("#tag\n我哋\n"), None, "")
        .unwrap();
    assert_eq!(read, 2);
    assert!(set.contains("#tag"));
}

#[test]
fn test_corpus_read_count_includes_duplicates() {
    let mut set = WordSet::new();
    let read = set
        .extend_from_reader(Cursor::new("我哋\n我哋\n食飯\n"), None, "#")
        .unwrap();
    assert_eq!(read, 3);
    assert_eq!(set.len(), 2);
}

#[test]
fn test_corpus_union_of_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.dict.yaml");
    let b = dir.path().join("b.txt");
    std::fs::write(&a, "---\nname: a\n...\n我哋\t1\n").unwrap();
    std::fs::write(&b, "食飯\n").unwrap();

    let mut set = WordSet::new();
    set.extend_from_corpus(&CorpusSpec::new(&a).with_start_marker("..."))
        .unwrap();
    set.extend_from_corpus(&CorpusSpec::new(&b)).unwrap();
    assert!(set.contains("我哋"));
    assert!(set.contains("食飯"));
    assert!(!set.contains("name: a"));

    let missing = set.extend_from_corpus(&CorpusSpec::new(dir.path().join("none")));
    assert!(matches!(missing, Err(SourceError::Io(_))));
}

#[test]
fn test_word_set_converted() {
    let converter = OpenccConverter::new("t2s").unwrap();

    let set: WordSet = ["我們".to_string(), "香港".to_string()].into_iter().collect();
    let converted = set.converted(&converter);
    assert!(converted.contains("我们"));
    assert!(converted.contains("香港"));
    assert!(!converted.contains("我們"));
}

#[test]
fn test_corpus_spec_from_toml() {
    let spec: CorpusSpec = toml::from_str("path = \"essay.txt\"\nstart_marker = \"...\"\n").unwrap();
    assert_eq!(spec.start_marker.as_deref(), Some("..."));
    assert_eq!(spec.comment_prefix, "#");

    let err = toml::from_str::<CorpusSpec>("path = \"a\"\nbogus = 1\n");
    assert!(err.is_err());
}

#[test]
fn test_indented_comment_skipped() {
    let set = words("header\n...\n  # indented\n\t# tabbed\n我哋\n", Some("..."));
    assert_eq!(set.len(), 1);
    assert!(set.contains("我哋"));
}

#[test]
fn test_comment_before_marker_never_a_word() {
    let set = words("#comment\n我哋\n...\n#comment\n食飯\n", Some("..."));
    assert!(!set.contains("#comment"));
    assert!(!set.contains("我哋"));
    assert!(set.contains("食飯"));
    assert_eq!(set.len(), 1);
}
