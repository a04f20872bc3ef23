use anyhow::Result;

use crate::{CliTest, HOME_COMPONENT, stdout};

const COMPONENT_PATH: &str = "src/app/home/home.component.ts";

#[test]
fn test_extract_dry_run_writes_nothing() -> Result<()> {
    let test = CliTest::angular_project()?;

    let output = test.run(&["extract"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1), "{}", out);
    assert!(out.contains("Would extract"), "{}", out);
    assert!(out.contains("Run with --apply to write these changes."), "{}", out);
    // Preview of the source rewrite.
    assert!(out.contains("--> app/home/home.component.ts"), "{}", out);
    assert!(out.contains("-     <h1>Welcome home</h1>"), "{}", out);

    assert!(!test.root().join("src/assets/i18n/en.json").exists());
    assert_eq!(test.read_file(COMPONENT_PATH)?, HOME_COMPONENT);

    Ok(())
}

#[test]
fn test_extract_apply_writes_locales_and_sources() -> Result<()> {
    let test = CliTest::angular_project()?;

    let output = test.run(&["extract", "--apply"])?;
    let out = stdout(&output);
    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Extracted"), "{}", out);

    let en = test.read_json("src/assets/i18n/en.json")?;
    assert_eq!(en["APP"]["HOME"]["WELCOME_HOME"], "Welcome home");
    assert_eq!(en["APP"]["HOME"]["SEARCH_PROJECTS"], "Search projects");
    assert_eq!(
        en["APP"]["HOME"]["ARE_YOU_SURE_YOU_WANT_TO_DELETE_THIS_CONFIGURATION"],
        "Are you sure you want to delete this configuration?"
    );

    // Targets mirror the base key set.
    let fr = test.read_json("src/assets/i18n/fr.json")?;
    assert!(fr["APP"]["HOME"].get("WELCOME_HOME").is_some());

    let manifest = test.read_json("src/assets/i18n/translate-manifest.json")?;
    assert!(manifest["locales"].get("en").is_some());
    assert!(manifest["locales"].get("fr").is_some());

    let source = test.read_file(COMPONENT_PATH)?;
    assert!(source.contains("{{ 'APP.HOME.WELCOME_HOME' | translate }}"), "{}", source);
    assert!(
        source.contains(
            "this.translate.instant('APP.HOME.ARE_YOU_SURE_YOU_WANT_TO_DELETE_THIS_CONFIGURATION')"
        ),
        "{}",
        source
    );
    assert!(source.contains("TranslateService"), "{}", source);

    Ok(())
}

#[test]
fn test_extract_twice_is_a_no_op() -> Result<()> {
    let test = CliTest::angular_project()?;
    test.run(&["extract", "--apply"])?;
    let en_before = test.read_file("src/assets/i18n/en.json")?;
    let source_before = test.read_file(COMPONENT_PATH)?;

    let output = test.run(&["extract", "--apply"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Nothing to extract"), "{}", out);
    assert_eq!(test.read_file("src/assets/i18n/en.json")?, en_before);
    assert_eq!(test.read_file(COMPONENT_PATH)?, source_before);

    Ok(())
}

#[test]
fn test_extract_keeps_existing_translations() -> Result<()> {
    let test = CliTest::angular_project()?;
    test.write_file(
        "src/assets/i18n/fr.json",
        r#"{ "APP": { "HOME": { "WELCOME_HOME": "Bienvenue" } } }"#,
    )?;
    test.write_file(
        "src/assets/i18n/en.json",
        r#"{ "APP": { "HOME": { "WELCOME_HOME": "Welcome home" } } }"#,
    )?;

    let output = test.run(&["extract", "--apply", "--update-mode", "merge"])?;
    assert!(output.status.success(), "{}", stdout(&output));

    let fr = test.read_json("src/assets/i18n/fr.json")?;
    assert_eq!(fr["APP"]["HOME"]["WELCOME_HOME"], "Bienvenue");
    assert!(fr["APP"]["HOME"].get("SEARCH_PROJECTS").is_some());

    Ok(())
}

#[test]
fn test_extract_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::angular_project()?;
    test.write_file(".glotngrc.json", r#"{ "ignoreGlobs": ["[unclosed"] }"#)?;

    let output = test.run(&["extract"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("ignoreGlobs"));

    Ok(())
}
