use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

use anyhow::{Context, Ok, Result};
use insta_cmd::get_cargo_bin;
use tempfile::TempDir;

mod extract;
mod init;
mod prune;
mod revert;
mod scan;

const BIN_NAME: &str = "glot-ng";

pub const CONFIG: &str = r#"{
  "srcDir": "src",
  "outputRoot": "src/assets/i18n",
  "languagesJsonPath": "src/assets/i18n/languages.json"
}"#;

pub const LANGUAGES: &str = r#"[
  { "code": "en", "englishName": "English", "nativeName": "English", "rank": 0, "default": true },
  { "code": "fr", "englishName": "French", "nativeName": "Français", "rank": 1, "default": false }
]"#;

pub const HOME_COMPONENT: &str = r#"import { Component } from '@angular/core';

@Component({
  selector: 'app-home',
  template: `
    <h1>Welcome home</h1>
    <input placeholder="Search projects" />
  `,
})
export class HomeComponent {
  remove() {
    confirm('Are you sure you want to delete this configuration?');
  }
}
"#;

pub struct CliTest {
    _temp_dir: TempDir,
    project_dir: PathBuf,
}

impl CliTest {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().canonicalize()?;
        fs::create_dir(project_dir.join(".git"))?;
        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
        })
    }

    /// A configured project with English and French and one component.
    pub fn angular_project() -> Result<Self> {
        let test = Self::new()?;
        test.write_file(".glotngrc.json", CONFIG)?;
        test.write_file("src/assets/i18n/languages.json", LANGUAGES)?;
        test.write_file("src/app/home/home.component.ts", HOME_COMPONENT)?;
        Ok(test)
    }

    pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let file_path = self.project_dir.join(path);

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory:{}", parent.display()))?;
        }

        fs::write(&file_path, content)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.project_dir
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(get_cargo_bin(BIN_NAME));
        cmd.current_dir(&self.project_dir);
        cmd.env_clear();
        cmd.env("NO_COLOR", "1"); // Disable colors for consistent test output
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Result<Output> {
        let output = self.command().args(args).output()?;
        Ok(output)
    }

    pub fn read_file(&self, path: &str) -> Result<String> {
        let file_path = self.project_dir.join(path);
        fs::read_to_string(&file_path)
            .with_context(|| format!("Failed to read file: {}", file_path.display()))
    }

    pub fn read_json(&self, path: &str) -> Result<serde_json::Value> {
        let content = self.read_file(path)?;
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path))
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}
