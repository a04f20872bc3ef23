use anyhow::Result;

use crate::{CliTest, stdout};

fn with_locales(test: &CliTest) -> Result<()> {
    test.write_file(
        "src/assets/i18n/en.json",
        r#"{
  "APP": {
    "HOME": {
      "TITLE": "Home",
      "SUBTITLE": "Your projects"
    },
    "SAVE": "Save"
  }
}
"#,
    )?;
    test.write_file(
        "src/assets/i18n/fr.json",
        r#"{
  "APP": {
    "HOME": {
      "TITLE": "Accueil",
      "SUBTITLE": "Vos projets"
    },
    "SAVE": "Enregistrer"
  }
}
"#,
    )
}

#[test]
fn test_prune_dry_run() -> Result<()> {
    let test = CliTest::angular_project()?;
    with_locales(&test)?;

    let output = test.run(&["prune", "APP.HOME.TITLE"])?;

    assert_eq!(output.status.code(), Some(1));
    insta::assert_snapshot!(stdout(&output), @r"
    Would delete 1 key(s) across 2 locale file(s).
      - en: 1 key(s)
      - fr: 1 key(s)
      - locale: src/assets/i18n/en.json
      - locale: src/assets/i18n/fr.json
    Run with --apply to delete these keys.
    ");
    let en = test.read_json("src/assets/i18n/en.json")?;
    assert_eq!(en["APP"]["HOME"]["TITLE"], "Home");

    Ok(())
}

#[test]
fn test_prune_pattern_apply() -> Result<()> {
    let test = CliTest::angular_project()?;
    with_locales(&test)?;

    let output = test.run(&["prune", "APP.HOME.*", "--apply"])?;
    assert!(output.status.success(), "{}", stdout(&output));

    for path in ["src/assets/i18n/en.json", "src/assets/i18n/fr.json"] {
        let locale = test.read_json(path)?;
        assert!(locale["APP"].get("HOME").is_none(), "{}: {}", path, locale);
        assert!(locale["APP"].get("SAVE").is_some(), "{}: {}", path, locale);
    }
    assert!(test.root().join("src/assets/i18n/translate-manifest.json").is_file());

    Ok(())
}

#[test]
fn test_prune_unknown_key_warns() -> Result<()> {
    let test = CliTest::angular_project()?;
    with_locales(&test)?;

    let output = test.run(&["prune", "APP.MISSING"])?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("No locale file contains APP.MISSING"));

    Ok(())
}
