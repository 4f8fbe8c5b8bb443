use super::*;

/// Rewrites single characters. Enough to force collisions.
struct CharFold(&'static [(char, &'static str)]);

impl ScriptConverter for CharFold {
    fn convert(&self, text: &str) -> String {
        text.chars()
            .map(|c| match self.0.iter().find(|(from, _)| *from == c) {
                Some((_, to)) => to.to_string(),
                None => c.to_string(),
            })
            .collect()
    }
}

fn raw(entries: &[(&str, f32)]) -> RawDictionary {
    entries.iter().map(|&(k, w)| (k.to_string(), w)).collect()
}

#[test]
fn test_identity_normalize() {
    let dict = normalize(&raw(&[("我哋", 1.0), ("食飯", 2.0)]), &IdentityConverter);
    assert_eq!(dict.len(), 2);
    assert_eq!(dict.collisions, 0);
    assert_eq!(dict.max_n, 2);
}

#[test]
fn test_collision_keeps_max_weight() {
    let converter = CharFold(&[('妳', "你")]);

    let dict = normalize(&raw(&[("你好", 0.3), ("妳好", 0.7)]), &converter);
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.entries["你好"], 0.7);
    assert_eq!(dict.collisions, 1);

    // Order of arrival does not matter.
    let dict = normalize(&raw(&[("妳好", 0.2), ("你好", 0.9)]), &converter);
    assert_eq!(dict.entries["你好"], 0.9);
}

#[test]
fn test_signed_zero_collision_is_positive() {
    let converter = CharFold(&[('A', "a")]);
    // Both insertion orders, so the result cannot depend on map iteration.
    for pair in [[("A", -0.0f32), ("a", 0.0)], [("a", 0.0), ("A", -0.0)]] {
        let dict = normalize(&raw(&pair), &converter);
        assert_eq!(dict.entries["a"].to_bits(), 0.0f32.to_bits());
    }
}

#[test]
fn test_max_n_counts_code_points() {
    let dict = normalize(&raw(&[("𠀀𠀁", 1.0), ("abc", 1.0)]), &IdentityConverter);
    assert_eq!(dict.max_n, 3);
    let dict = normalize(&raw(&[("𠀀𠀁𠀂𠀃", 1.0), ("abc", 1.0)]), &IdentityConverter);
    assert_eq!(dict.max_n, 4);
}

#[test]
fn test_max_n_measured_after_conversion() {
    let converter = CharFold(&[('x', "xyz")]);
    let dict = normalize(&raw(&[("x", 1.0), ("ab", 1.0)]), &converter);
    assert_eq!(dict.max_n, 3);
}

#[test]
fn test_empty_dictionary() {
    let dict = normalize(&RawDictionary::new(), &IdentityConverter);
    assert!(dict.is_empty());
    assert_eq!(dict.max_n, 0);
}

#[test]
fn test_conversion_dropping_to_empty_is_skipped() {
    let converter = CharFold(&[('\u{200b}', "")]);
    let dict = normalize(&raw(&[("\u{200b}", 1.0), ("a", 1.0)]), &converter);
    assert_eq!(dict.len(), 1);
}

#[test]
fn test_known_configs() {
    assert!(is_known_config("hk2s"));
    assert!(is_known_config("T2S"));
    assert!(!is_known_config("hk2cn"));
    assert!(!is_known_config(""));
    assert!(CONFIG_IDS.iter().all(|id| is_known_config(id)));
}

#[test]
fn test_unknown_config_rejected() {
    let err = OpenccConverter::new("hk2cn").unwrap_err();
    assert!(matches!(&err, ConvertError::UnknownConfig(id) if id == "hk2cn"));
    assert!(err.to_string().contains("hk2s"));
}

#[test]
fn test_traditional_to_simplified() {
    let converter = OpenccConverter::new("T2S").unwrap();
    assert_eq!(converter.config(), "t2s");
    assert_eq!(converter.convert("我們說話"), "我们说话");
    assert_eq!(converter.convert(""), "");
    assert_eq!(converter.convert("abc"), "abc");
}

#[test]
fn test_opencc_collision_merges() {
    let converter = OpenccConverter::new("t2s").unwrap();
    let dict = normalize(&raw(&[("我們", 0.7), ("我们", 0.3)]), &converter);
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.entries["我们"], 0.7);
    assert_eq!(dict.collisions, 1);
}

#[test]
fn test_converter_deterministic() {
    let converter = OpenccConverter::new("hk2s").unwrap();
    let once = converter.convert("我們說話");
    assert_eq!(once, converter.convert("我們說話"));
    assert_ne!(once, "我們說話");
}

#[test]
fn test_converter_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<OpenccConverter>();
}
