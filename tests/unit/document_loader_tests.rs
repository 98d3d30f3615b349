/*!
 * Tests for loading documents into the segment model
 */

use anyhow::Result;
use sdlxliff::{Document, FragmentContent, LoaderOptions, XliffError};

use crate::common::{self, APPENDIX, INTRO, SAMPLE_DOCUMENT};

#[test]
fn test_load_withSampleDocument_shouldReadLanguagesAndFiles() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_sample_document(temp_dir.path(), "sample.sdlxliff")?;

    let document = Document::load(&path)?;

    assert_eq!(document.path(), path.as_path());
    assert_eq!(document.source_language, "en-US");
    assert_eq!(document.target_language, "fr-FR");
    assert_eq!(document.files.len(), 2);
    assert_eq!(document.files[0].original, INTRO);
    assert_eq!(document.files[1].original, APPENDIX);
    assert_eq!(document.trans_unit_count(), 5);
    Ok(())
}

#[test]
fn test_load_withGroupedUnits_shouldKeepDocumentOrder() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    let ids: Vec<&str> = document.files[0]
        .trans_units
        .iter()
        .map(|unit| unit.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1", "2", "3", "4"]);
}

#[test]
fn test_load_withTextMarkers_shouldCaptureTextAndTail() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    let unit = document.unit(INTRO, "1").unwrap();

    assert_eq!(unit.source_plain, "Hello world. Second sentence.");
    assert!(!unit.only_tag());
    assert_eq!(unit.seg_source_fragments.len(), 2);
    assert_eq!(unit.target_fragments.len(), 2);

    let first = &unit.target_fragments[0];
    assert_eq!(first.mid, "1");
    assert_eq!(first.content, FragmentContent::Text("Hello".to_string()));
    assert_eq!(first.tail, " ");

    let second = &unit.target_fragments[1];
    assert_eq!(second.markup(), Some("Deuxième phrase."));
    assert_eq!(second.tail, "");
}

#[test]
fn test_load_withCdataInTail_shouldKeepWholeTextRun() -> Result<()> {
    let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="c.txt" source-language="en" target-language="de">
    <body>
      <trans-unit id="1">
        <source>A b c</source>
        <seg-source><mrk mtype="seg" mid="1">A</mrk> b<![CDATA[<c>]]>d<mrk mtype="seg" mid="2">E</mrk></seg-source>
        <target><mrk mtype="seg" mid="1">A</mrk> b<![CDATA[<c>]]>d<mrk mtype="seg" mid="2">E</mrk></target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    let mut document = Document::from_xml_str(xml, "c.sdlxliff", &LoaderOptions::default())?;
    let unit = document.unit("c.txt", "1").unwrap();
    assert_eq!(unit.target_fragments[0].tail, " b<![CDATA[<c>]]>d");

    document.unit_mut("c.txt", "1").unwrap().target_fragments[1].set_plain_text("F");
    document.apply_to_tree()?;
    assert!(document.to_xml_string().contains(
        "<target><mrk mtype=\"seg\" mid=\"1\">A</mrk> b<![CDATA[<c>]]>d<mrk mtype=\"seg\" mid=\"2\">F</mrk></target>"
    ));
    Ok(())
}

#[test]
fn test_load_withPlaceholderOnlyMarker_shouldDecomposePlaceholders() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    let unit = document.unit(INTRO, "2").unwrap();
    let fragment = unit.target_fragment("3").unwrap();

    let placeholders = fragment.placeholder_fragments();
    assert_eq!(placeholders.len(), 2);
    assert_eq!(placeholders[0].id, "5");
    assert_eq!(placeholders[0].xid.as_deref(), Some("x1"));
    assert_eq!(placeholders[0].text, "Gras");
    assert_eq!(placeholders[1].id, "6");
    assert_eq!(placeholders[1].xid, None);
    assert_eq!(placeholders[1].text, "  texte ");

    // Seg-source marker mixes a placeholder with text, so it stays raw
    let source = unit.seg_source_fragment("3").unwrap();
    assert_eq!(source.markup(), Some("<g id=\"5\">Bold</g> text"));
}

#[test]
fn test_load_withPlaceholderOnlyMarker_shouldReconstructInnerMarkupExactly() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    let fragment = document.unit(INTRO, "2").unwrap().target_fragment("3").unwrap();

    assert_eq!(
        fragment.inner_markup(),
        "<g id=\"5\" xid=\"x1\">Gras</g><g id=\"6\">  texte </g>"
    );
}

#[test]
fn test_load_withTagOnlySource_shouldSkipFragments() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    let unit = document.unit(INTRO, "3").unwrap();

    assert!(unit.only_tag());
    assert!(unit.seg_source_fragments.is_empty());
    assert!(unit.target_fragments.is_empty());
}

#[test]
fn test_load_withEntitiesAndInlineMarkup_shouldKeepRawPayload() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    let unit = document.unit(INTRO, "4").unwrap();
    let fragment = unit.target_fragment("5").unwrap();

    assert_eq!(unit.source_plain, "Fish &amp; chips");
    assert_eq!(fragment.markup(), Some("Poisson &amp; frites<x id=\"9\"/>"));
    assert_eq!(fragment.plain_text(), "Poisson & frites");
}

#[test]
fn test_load_withSegmentDefinitions_shouldReadProvenance() {
    let document = common::parse_document(SAMPLE_DOCUMENT);

    let unit = document.unit(INTRO, "1").unwrap();
    assert_eq!(unit.segment_definitions.len(), 2);
    let first = unit.segment_definition("1").unwrap();
    assert_eq!(first.conf.as_deref(), Some("Draft"));
    assert_eq!(first.origin_system.as_deref(), Some("Engine"));
    assert!(first.is_machine_translated());
    assert!(!first.locked);
    assert!(!unit.segment_definition("2").unwrap().is_machine_translated());

    let appendix = document.unit(APPENDIX, "1").unwrap();
    assert!(appendix.segment_definition("1").unwrap().locked);
}

#[test]
fn test_load_withLoadedUnits_shouldLeaveMetadataEmpty() {
    let document = common::parse_document(SAMPLE_DOCUMENT);
    assert!(document.units().all(|(_, unit)| unit.metadata.is_empty()));
}

#[test]
fn test_load_withNestedMarker_shouldCollectOutermostOnly() {
    let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="n" source-language="en" target-language="de">
    <body>
      <trans-unit id="1">
        <source>One</source>
        <seg-source><g id="1"><mrk mtype="seg" mid="1">One<mrk mtype="x-sdl-comment" mid="c1">c</mrk></mrk></g></seg-source>
        <target><g id="1"><mrk mtype="seg" mid="1">Eins<mrk mtype="x-sdl-comment" mid="c1">c</mrk></mrk></g></target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;
    let document = common::parse_document(xml);
    let unit = document.unit("n", "1").unwrap();

    assert_eq!(unit.target_fragments.len(), 1);
    assert_eq!(
        unit.target_fragments[0].markup(),
        Some("Eins<mrk mtype=\"x-sdl-comment\" mid=\"c1\">c</mrk>")
    );
}

#[test]
fn test_load_withEmptyMarker_shouldYieldEmptyText() {
    let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="e" source-language="en" target-language="de">
    <body>
      <trans-unit id="1">
        <source>Empty target</source>
        <seg-source><mrk mtype="seg" mid="1">Empty target</mrk></seg-source>
        <target><mrk mtype="seg" mid="1"/></target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;
    let document = common::parse_document(xml);
    let fragment = document.unit("e", "1").unwrap().target_fragment("1").unwrap();
    assert_eq!(fragment.content, FragmentContent::Text(String::new()));
}

#[test]
fn test_load_withMissingTarget_shouldDegradeToEmptyFragments() {
    let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="m" source-language="en" target-language="de">
    <body>
      <trans-unit id="1">
        <source>Untranslated</source>
        <seg-source><mrk mtype="seg" mid="1">Untranslated</mrk></seg-source>
      </trans-unit>
    </body>
  </file>
</xliff>"#;
    let document = common::parse_document(xml);
    let unit = document.unit("m", "1").unwrap();
    assert_eq!(unit.seg_source_fragments.len(), 1);
    assert!(unit.target_fragments.is_empty());
}

#[test]
fn test_load_withUnqualifiedElements_shouldRespectOption() -> Result<()> {
    let xml = r#"<xliff>
  <file original="u" source-language="en" target-language="it">
    <body>
      <trans-unit id="1">
        <source>Hi</source>
        <seg-source><mrk mtype="seg" mid="1">Hi</mrk></seg-source>
        <target><mrk mtype="seg" mid="1">Ciao</mrk></target>
      </trans-unit>
    </body>
  </file>
</xliff>"#;

    let lenient = Document::from_xml_str(xml, "u.sdlxliff", &LoaderOptions::default())?;
    assert_eq!(lenient.trans_unit_count(), 1);

    let strict = LoaderOptions { accept_unqualified: false };
    let result = Document::from_xml_str(xml, "u.sdlxliff", &strict);
    assert!(matches!(result, Err(XliffError::MissingDeclaration(_))));
    Ok(())
}

#[test]
fn test_load_withoutLanguageDeclaration_shouldFailWithMissingDeclaration() {
    let xml = r#"<xliff xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="x" source-language="en"><body/></file>
</xliff>"#;
    let result = Document::from_xml_str(xml, "x.sdlxliff", &LoaderOptions::default());
    assert!(matches!(result, Err(XliffError::MissingDeclaration(_))));
}

#[test]
fn test_load_withMalformedXml_shouldFailWithNotWellFormed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.sdlxliff", "<xliff><file></xliff>")?;

    let result = Document::load(&path);
    match result {
        Err(XliffError::NotWellFormed { origin, .. }) => assert!(origin.contains("broken.sdlxliff")),
        other => panic!("expected NotWellFormed, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldFailWithIo() {
    let result = Document::load("does/not/exist.sdlxliff");
    assert!(matches!(result, Err(XliffError::Io { .. })));
}
