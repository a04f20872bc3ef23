use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["srcDir"], "src");
    assert_eq!(parsed["outputRoot"], "src/assets/i18n");
    assert_eq!(parsed["updateMode"], "merge");
    assert_eq!(parsed["translateAccessor"], "this.translate");
    assert!(
        parsed["htmlAttributeNames"]
            .as_array()
            .is_some_and(|names| names.iter().any(|n| n == "placeholder")),
        "Config should list placeholder as a translatable attribute"
    );

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config_and_languages() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("Created .glotngrc.json"));

    let content = test.read_file(".glotngrc.json")?;
    assert_config_content(&content)?;

    let languages = test.read_json("src/assets/i18n/languages.json")?;
    let entries = languages.as_array().context("languages file is an array")?;
    let defaults: Vec<&Value> = entries.iter().filter(|e| e["default"] == true).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0]["code"], "en");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".glotngrc.json", "{}")?;

    let output = test.run(&["init"])?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains(".glotngrc.json already exists"));
    assert_eq!(test.read_file(".glotngrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.run(&["init"])?;
    test.write_file(
        "src/app/app.component.ts",
        "export class AppComponent {\n  title = 'Dashboard';\n}\n",
    )?;

    let output = test.run(&["extract", "--apply"])?;
    assert!(
        output.status.success(),
        "Extract should work with initialized config. stdout: {}",
        stdout(&output)
    );
    assert!(test.root().join("src/assets/i18n/en.json").is_file());

    Ok(())
}
