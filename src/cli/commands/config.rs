use crate::cli::parser::Commands;
use crate::config::Config;
use crate::config::migrate::{add_missing_fields, missing_fields};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use std::fs;
use std::process::Command;

fn edit(editor: &Option<String>) {
    let path = Config::config_file();

    let default_editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });
    let editor_to_use = editor.clone().unwrap_or_else(|| default_editor.clone());

    match Command::new(&editor_to_use).arg(&path).status() {
        Ok(s) if s.success() => {
            success(format!(
                "Configuration file edited successfully using '{}'",
                editor_to_use
            ));
        }
        Ok(_) | Err(_) => {
            warning(format!(
                "Editor '{}' not available, falling back to '{}'",
                editor_to_use, default_editor
            ));
            match Command::new(&default_editor).arg(&path).status() {
                Ok(s) if s.success() => success(format!(
                    "Configuration file edited successfully using fallback '{}'",
                    default_editor
                )),
                Ok(_) | Err(_) => warning(format!(
                    "Failed to edit configuration file using fallback '{}'",
                    default_editor
                )),
            }
        }
    }
}

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        migrate,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Effective configuration ({}):\n", path.display());
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            cfg.validate()?;
            let content = if path.exists() {
                fs::read_to_string(&path)?
            } else {
                String::new()
            };
            let missing = missing_fields(&content)?;
            if missing.is_empty() {
                success("Configuration file is complete.");
            } else {
                warning(format!(
                    "Missing configuration fields: {} (run `config --migrate`)",
                    missing.join(", ")
                ));
            }
        }

        if *migrate {
            let added = add_missing_fields(&path)?;
            if added.is_empty() {
                info("Configuration already up to date.");
            } else {
                success(format!("Added configuration fields: {}", added.join(", ")));
            }
        }

        if *edit_config {
            edit(editor);
        }
    }

    Ok(())
}
