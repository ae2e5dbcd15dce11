use super::*;

fn query<'a>(brand: &'a str, size: Option<&'a str>, color: Option<&'a str>) -> QueryAttributes<'a> {
    QueryAttributes { brand, size, color }
}

fn candidate(brand: &str, size: Option<&str>, color: Option<&str>) -> CandidateAttributes {
    CandidateAttributes {
        brand: Some(brand.to_string()),
        size: size.map(str::to_string),
        color: color.map(str::to_string),
    }
}

#[test]
fn exact_match_all_fields() {
    let result = verify_candidate(
        &query("DIBS Beauty", Some("0.08 oz"), Some("Desert Island Duo")),
        &candidate("dibs beauty", Some("0.08 OZ"), Some("desert island duo")),
    );
    assert!(result.is_exact_match);
    assert!(result.brand_match);
    assert!(result.size_match);
    assert!(result.color_match);
    assert!(result.mismatches.is_empty());
    assert_eq!(result.match_strength(), 3);
}

#[test]
fn brand_token_subset_matches_either_direction() {
    assert!(brands_match("DIBS", "DIBS Beauty"));
    assert!(brands_match("DIBS Beauty", "DIBS"));
    assert!(brands_match("e.l.f.", "ELF"));
    assert!(!brands_match("DIBS Beauty", "Rare Beauty"));
}

#[test]
fn brand_punctuation_is_ignored() {
    assert!(brands_match("L'Oreal", "loreal"));
    assert!(brands_match("Fenty-Beauty", "fenty beauty"));
}

#[test]
fn size_requires_string_equality_not_unit_conversion() {
    assert!(sizes_match("1.7 oz", "1.7  OZ"));
    // 50 ml and 1.7 oz are the same volume but do not match.
    assert!(!sizes_match("1.7 oz", "50 ml"));
}

#[test]
fn color_matches_on_containment() {
    assert!(colors_match("Taupe", "Warm Taupe"));
    assert!(colors_match("Warm Taupe", "taupe"));
    assert!(!colors_match("Taupe", "Crimson"));
}

#[test]
fn unqueried_fields_never_appear_in_mismatches() {
    let result = verify_candidate(
        &query("Acme", None, None),
        &candidate("Other Brand", Some("2 oz"), Some("Red")),
    );
    assert_eq!(result.mismatches, vec!["brand".to_string()]);
    // Skipped attributes count as matched.
    assert!(result.size_match);
    assert!(result.color_match);
    assert!(!result.is_exact_match);
}

#[test]
fn queried_field_missing_on_candidate_is_a_mismatch() {
    let result = verify_candidate(
        &query("Acme", Some("2 oz"), Some("Red")),
        &CandidateAttributes {
            brand: Some("Acme".to_string()),
            size: None,
            color: None,
        },
    );
    assert!(result.brand_match);
    assert!(!result.size_match);
    assert!(!result.color_match);
    assert_eq!(
        result.mismatches,
        vec!["size".to_string(), "color".to_string()]
    );
}

#[test]
fn missing_candidate_brand_fails_brand_match() {
    let result = verify_candidate(&query("Acme", None, None), &CandidateAttributes::default());
    assert!(!result.brand_match);
    assert!(!result.is_exact_match);
    assert_eq!(result.match_strength(), 2);
}

#[test]
fn exact_match_implies_empty_mismatches() {
    let cases = [
        (query("Acme", None, None), candidate("Acme", None, None)),
        (
            query("Acme", Some("2 oz"), None),
            candidate("acme", Some("2 OZ"), Some("ignored")),
        ),
    ];
    for (q, c) in cases {
        let result = verify_candidate(&q, &c);
        assert!(result.is_exact_match);
        assert!(result.mismatches.is_empty());
    }
}
