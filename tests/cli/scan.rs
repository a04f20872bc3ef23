use anyhow::Result;

use crate::{CliTest, stdout};

#[test]
fn test_scan_reports_untranslated_text() -> Result<()> {
    let test = CliTest::angular_project()?;

    let output = test.run(&["scan"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1), "{}", out);
    assert!(out.contains("text: \"Welcome home\"  [text-node]"), "{}", out);
    assert!(out.contains("text: \"Search projects\"  [attribute-value]"), "{}", out);
    assert!(
        out.contains("text: \"Are you sure you want to delete this configuration?\"  [string-literal]"),
        "{}",
        out
    );
    assert!(out.contains("--> app/home/home.component.ts:"), "{}", out);
    assert!(out.contains("translatable string(s) in 1 source file"), "{}", out);

    // Scanning never writes.
    assert!(!test.root().join("src/assets/i18n/en.json").exists());
    assert_eq!(
        test.read_file("src/app/home/home.component.ts")?,
        crate::HOME_COMPONENT
    );

    Ok(())
}

#[test]
fn test_scan_clean_project_succeeds() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotngrc.json", crate::CONFIG)?;
    test.write_file("src/assets/i18n/languages.json", crate::LANGUAGES)?;
    test.write_file(
        "src/app/app.component.html",
        "<h1>{{ 'APP.TITLE' | translate }}</h1>\n<span>{{ count }}</span>\n",
    )?;

    let output = test.run(&["scan"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("no translatable text found"), "{}", out);
    assert!(out.contains("already translated: 1"), "{}", out);

    Ok(())
}

#[test]
fn test_scan_ignores_test_files() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotngrc.json", crate::CONFIG)?;
    test.write_file("src/assets/i18n/languages.json", crate::LANGUAGES)?;
    test.write_file(
        "src/app/home.component.spec.ts",
        "describe('HomeComponent', () => { it('should render the title', () => {}); });\n",
    )?;

    let output = test.run(&["scan"])?;

    assert!(output.status.success(), "{}", stdout(&output));

    Ok(())
}

#[test]
fn test_scan_missing_src_dir_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotngrc.json", r#"{ "srcDir": "client" }"#)?;

    let output = test.run(&["scan"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(crate::stderr(&output).contains("Source directory not found"));

    Ok(())
}
