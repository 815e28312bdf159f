//! Structural validation of installer scripts.
//!
//! The whole-object pass hands a transient [`InstallerCandidate`] to an
//! [`InstallerValidator`] and only looks at the `(is_valid, errors)` report.
//! [`ScriptValidator`] is the catalog's implementation: it checks the shape
//! of the `files`, `installer` and `game` sections and the keys each runner
//! needs to launch a game. It does not execute or resolve anything.

use std::collections::HashSet;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::types::DbId;

/// An unsaved installer assembled from cleaned form fields.
#[derive(Debug, Clone)]
pub struct InstallerCandidate {
    pub game_id: DbId,
    pub runner: String,
    pub version: String,
    /// Parsed installer content.
    pub script: Value,
}

/// Outcome of a structural validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub is_valid: bool,
    /// Human-readable problems, in the order they were found.
    pub errors: Vec<String>,
}

impl ScriptReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Semantic checks on an installer that go beyond YAML syntax.
pub trait InstallerValidator {
    fn validate(&self, installer: &InstallerCandidate) -> ScriptReport;
}

/// Commands allowed as steps of the `installer` section.
pub const INSTALLER_DIRECTIVES: &[&str] = &[
    "chmodx",
    "copy",
    "execute",
    "extract",
    "input_menu",
    "insert-disc",
    "merge",
    "mkdir",
    "move",
    "rename",
    "substitute_vars",
    "task",
    "write_config",
    "write_file",
    "write_json",
];

/// Keys under `game` a runner needs, any one of which is sufficient.
fn required_game_keys(runner: &str) -> &'static [&'static str] {
    match runner {
        "linux" | "wine" => &["exe"],
        "steam" | "winesteam" => &["appid"],
        "dosbox" => &["main_file", "config_file"],
        "libretro" => &["main_file"],
        "web" => &["main_file"],
        _ => &[],
    }
}

/// Default structural validator for catalog installers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptValidator;

impl InstallerValidator for ScriptValidator {
    fn validate(&self, installer: &InstallerCandidate) -> ScriptReport {
        let mut errors = Vec::new();

        let script = match &installer.script {
            Value::Mapping(mapping) => mapping,
            Value::Null => {
                errors.push("安装脚本不能为空".to_string());
                return ScriptReport::from_errors(errors);
            }
            _ => {
                errors.push("安装脚本必须是键值映射".to_string());
                return ScriptReport::from_errors(errors);
            }
        };

        if get(script, "game").is_none() && get(script, "installer").is_none() {
            errors.push("安装脚本必须包含 game 或 installer 部分".to_string());
        }

        let file_ids = match get(script, "files") {
            Some(files) => check_files(files, &mut errors),
            None => HashSet::new(),
        };

        if let Some(steps) = get(script, "installer") {
            check_installer_steps(steps, &file_ids, &mut errors);
        }

        check_game_section(&installer.runner, get(script, "game"), &mut errors);

        ScriptReport::from_errors(errors)
    }
}

fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(key)
}

/// A step or file entry must be a mapping with exactly one string key.
fn single_key(value: &Value) -> Option<(&str, &Value)> {
    let mapping = value.as_mapping()?;
    if mapping.len() != 1 {
        return None;
    }
    let (key, inner) = mapping.iter().next()?;
    Some((key.as_str()?, inner))
}

fn check_files(files: &Value, errors: &mut Vec<String>) -> HashSet<String> {
    let mut ids = HashSet::new();
    let Some(entries) = files.as_sequence() else {
        errors.push("files 部分必须是列表".to_string());
        return ids;
    };

    for (index, entry) in entries.iter().enumerate() {
        let Some((id, source)) = single_key(entry) else {
            errors.push(format!("files 第 {} 项必须是只有一个键的映射", index + 1));
            continue;
        };

        let has_url = match source {
            Value::String(url) => !url.trim().is_empty(),
            Value::Mapping(mapping) => get(mapping, "url")
                .and_then(Value::as_str)
                .is_some_and(|url| !url.trim().is_empty()),
            _ => false,
        };
        if !has_url {
            errors.push(format!("文件 {id} 缺少下载地址"));
        }

        if !ids.insert(id.to_string()) {
            errors.push(format!("文件标识 {id} 重复"));
        }
    }
    ids
}

fn check_installer_steps(steps: &Value, file_ids: &HashSet<String>, errors: &mut Vec<String>) {
    let Some(steps) = steps.as_sequence() else {
        errors.push("installer 部分必须是列表".to_string());
        return;
    };

    for (index, step) in steps.iter().enumerate() {
        let position = index + 1;
        let Some((directive, args)) = single_key(step) else {
            errors.push(format!("installer 第 {position} 步必须是只有一个键的映射"));
            continue;
        };

        if !INSTALLER_DIRECTIVES.contains(&directive) {
            errors.push(format!("installer 第 {position} 步使用了未知指令 {directive}"));
            continue;
        }

        match directive {
            "task" => {
                let has_name = args
                    .as_mapping()
                    .and_then(|m| get(m, "name"))
                    .and_then(Value::as_str)
                    .is_some();
                if !has_name {
                    errors.push(format!("installer 第 {position} 步的 task 缺少 name"));
                }
            }
            "extract" | "chmodx" | "execute" => {
                if let Some(reference) = file_reference(args) {
                    if !file_ids.contains(reference) {
                        errors.push(format!(
                            "installer 第 {position} 步引用了不存在的文件 {reference}"
                        ));
                    }
                }
            }
            _ => {}
        }
    }
}

/// The file id a step refers to with a bare identifier, if any.
///
/// Steps may also reference paths (`$GAMEDIR/...`), which are not checked.
fn file_reference(args: &Value) -> Option<&str> {
    let target = match args {
        Value::String(target) => target.as_str(),
        Value::Mapping(mapping) => get(mapping, "file").and_then(Value::as_str)?,
        _ => return None,
    };
    let is_bare_id = !target.is_empty()
        && target
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    is_bare_id.then_some(target)
}

fn check_game_section(runner: &str, game: Option<&Value>, errors: &mut Vec<String>) {
    let required = required_game_keys(runner);

    let Some(game) = game else {
        if !required.is_empty() {
            errors.push(format!("运行环境 {runner} 需要 game 部分"));
        }
        return;
    };

    let Some(game) = game.as_mapping() else {
        errors.push("game 部分必须是键值映射".to_string());
        return;
    };

    if !required.is_empty() && !required.iter().any(|key| get(game, key).is_some()) {
        errors.push(format!(
            "运行环境 {runner} 的 game 部分必须包含 {}",
            required.join(" 或 ")
        ));
    }
}
