/*!
 * Tests for language utility functions
 */

use sdlxliff::language_utils::{
    LanguageCodeType, describe_language, get_language_name, language_codes_match,
    normalize_to_part2t, primary_subtag, validate_language_code,
};

/// Test validation of language codes
#[test]
fn test_validate_language_code_withValidCodes_shouldReturnCorrectType() {
    // ISO 639-1 tests
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("fr").unwrap(), LanguageCodeType::Part1);

    // ISO 639-2/T tests
    assert_eq!(validate_language_code("eng").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("deu").unwrap(), LanguageCodeType::Part2T);

    // ISO 639-2/B tests
    assert_eq!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B);
    assert_eq!(validate_language_code("ger").unwrap(), LanguageCodeType::Part2B);

    // Whitespace and case tests
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);

    // Invalid codes
    assert!(validate_language_code("xyz").is_err());
    assert!(validate_language_code("e").is_err());
}

#[test]
fn test_primary_subtag_withLocaleTags_shouldReturnLanguagePart() {
    assert_eq!(primary_subtag("en-US"), "en");
    assert_eq!(primary_subtag("zh_Hant_TW"), "zh");
    assert_eq!(primary_subtag(" fr "), "fr");
}

/// Test normalization of locale tags to ISO 639-2/T format
#[test]
fn test_normalize_to_part2t_withLocaleTags_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part2t("en-US").unwrap(), "eng");
    assert_eq!(normalize_to_part2t("fr-FR").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("DE").unwrap(), "deu");
    assert!(normalize_to_part2t("xx-YY").is_err());
}

/// Test matching of different language code formats
#[test]
fn test_language_codes_match_withRegionVariants_shouldCompareLanguages() {
    assert!(language_codes_match("fr-FR", "fr-CA"));
    assert!(language_codes_match("fr-FR", "fre"));
    assert!(language_codes_match("en", "eng"));
    assert!(!language_codes_match("en-US", "fr-FR"));
    assert!(!language_codes_match("xx", "xx"));
}

#[test]
fn test_get_language_name_withValidCodes_shouldReturnName() {
    assert_eq!(get_language_name("en-GB").unwrap(), "English");
    assert_eq!(get_language_name("deu").unwrap(), "German");
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_describe_language_withKnownAndUnknownTags_shouldFormatLabel() {
    assert_eq!(describe_language("fr-FR"), "French (fr-FR)");
    assert_eq!(describe_language("x-custom"), "x-custom");
}
