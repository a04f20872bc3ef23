use anyhow::Result;

use crate::{CliTest, stdout};

const COMPONENT_PATH: &str = "src/app/home/home.component.ts";

#[test]
fn test_revert_dry_run_previews_restore() -> Result<()> {
    let test = CliTest::angular_project()?;
    test.run(&["extract", "--apply"])?;
    let extracted = test.read_file(COMPONENT_PATH)?;

    let output = test.run(&["revert"])?;
    let out = stdout(&output);

    assert_eq!(output.status.code(), Some(1), "{}", out);
    assert!(out.contains("Would restore"), "{}", out);
    assert!(out.contains("+     <h1>Welcome home</h1>"), "{}", out);
    assert_eq!(test.read_file(COMPONENT_PATH)?, extracted);

    Ok(())
}

#[test]
fn test_revert_apply_restores_literals() -> Result<()> {
    let test = CliTest::angular_project()?;
    test.run(&["extract", "--apply"])?;

    let output = test.run(&["revert", "--apply"])?;
    let out = stdout(&output);
    assert!(output.status.success(), "{}", out);
    assert!(out.contains("Restored"), "{}", out);

    let source = test.read_file(COMPONENT_PATH)?;
    assert!(source.contains("<h1>Welcome home</h1>"), "{}", source);
    assert!(
        source.contains("confirm('Are you sure you want to delete this configuration?')"),
        "{}",
        source
    );
    assert!(!source.contains("| translate"), "{}", source);
    assert!(!source.contains("this.translate.instant"), "{}", source);

    // Locale files are left alone.
    let en = test.read_json("src/assets/i18n/en.json")?;
    assert_eq!(en["APP"]["HOME"]["WELCOME_HOME"], "Welcome home");

    Ok(())
}

#[test]
fn test_revert_without_references_succeeds() -> Result<()> {
    let test = CliTest::angular_project()?;
    test.write_file("src/assets/i18n/en.json", "{}\n")?;

    let output = test.run(&["revert"])?;
    let out = stdout(&output);

    assert!(output.status.success(), "{}", out);
    assert!(out.contains("No translate references to revert"), "{}", out);

    Ok(())
}
