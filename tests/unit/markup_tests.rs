/*!
 * Tests for tag stripping, escaping and legacy placeholder detection
 */

use sdlxliff::markup::{
    escape_text, is_tag_only, plain_text, scan_legacy_placeholders, strip_all_tags,
    strip_legacy_placeholder_pairs, strip_standalone_placeholders, unescape_text,
};

#[test]
fn test_strip_all_tags_withInlineElements_shouldLeaveTextOnly() {
    assert_eq!(strip_all_tags("<g id=\"1\">Bold</g> and <x id=\"2\"/>plain"), "Bold and plain");
    assert_eq!(strip_all_tags("  <bpt id=\"1\">&lt;b&gt;</bpt>  "), "&lt;b&gt;");
    assert_eq!(strip_all_tags(""), "");
}

#[test]
fn test_strip_standalone_placeholders_withNumberedTokens_shouldRemoveThem() {
    assert_eq!(strip_standalone_placeholders("{1}Page {22} of {3}"), "Page  of ");
    assert_eq!(strip_standalone_placeholders("{a} {1b}"), "{a} {1b}");
}

#[test]
fn test_strip_legacy_placeholder_pairs_withEscapedMarkers_shouldRemoveSpans() {
    assert_eq!(strip_legacy_placeholder_pairs("{1&gt;bold&lt;1} rest"), " rest");
    assert_eq!(strip_legacy_placeholder_pairs("{1>a<1}{2>b<2}"), "");
    assert_eq!(strip_legacy_placeholder_pairs("no markers"), "no markers");
}

#[test]
fn test_scan_legacy_placeholders_withUnpairedMarkers_shouldReportThem() {
    let scan = scan_legacy_placeholders("{1&gt;open only");
    assert_eq!(scan.text, "{1&gt;open only");
    assert_eq!(scan.pairs, 0);
    assert_eq!(scan.unmatched, 1);

    let scan = scan_legacy_placeholders("{1>x<1} tail<2}");
    assert_eq!(scan.text, " tail<2}");
    assert_eq!(scan.pairs, 1);
    assert_eq!(scan.unmatched, 1);
}

#[test]
fn test_is_tag_only_withCodesOnly_shouldReturnTrue() {
    assert!(is_tag_only(""));
    assert!(is_tag_only("   "));
    assert!(is_tag_only("{1}"));
    assert!(is_tag_only("{1&gt;foo&lt;1}{2}"));
    assert!(is_tag_only(" {1>{2>x<2}<1} {3} "));
}

#[test]
fn test_is_tag_only_withTranslatableText_shouldReturnFalse() {
    assert!(!is_tag_only("{1>foo<1} bar"));
    assert!(!is_tag_only("Hello {1}"));
    assert!(!is_tag_only("{1>unterminated"));
}

#[test]
fn test_escape_text_withMarkupCharacters_shouldEscapeOnlyThose() {
    assert_eq!(escape_text("a & b < c > d \"q\" 'a'"), "a &amp; b &lt; c &gt; d \"q\" 'a'");
    assert_eq!(escape_text("plain"), "plain");
}

#[test]
fn test_unescape_text_withEntities_shouldResolveThem() {
    assert_eq!(unescape_text("Fish &amp; chips &#233;"), "Fish & chips é");
    assert_eq!(unescape_text("broken &bogus"), "broken &bogus");
}

#[test]
fn test_plain_text_withMarkupAndEntities_shouldProjectNaturalText() {
    assert_eq!(plain_text("Poisson &amp; frites<x id=\"9\"/>"), "Poisson & frites");
    assert_eq!(plain_text("  spaced  "), "  spaced  ");
}
