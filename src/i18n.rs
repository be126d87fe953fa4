// i18n.rs: runtime string tables
//
// - Tables live in assets/i18n/<lang>.json or in assets/i18n.json
//   ({ "<lang>": { "key": "value" } }), searched next to the executable
//   and then in the working directory.
// - Lookup order: selected lang -> built-in English -> the key itself.
// - tr("key") / tr_with("key", &[("name", ...)]) with {name} placeholders.
//
// Language selection: --lang <code>, then TOUR_LANG, then "en".

use once_cell::sync::OnceCell;
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::RwLock,
};

pub const DEFAULT_LANG: &str = "en";

/// Languages offered in the UI, as (code, native name).
pub const LANGUAGES: [(&str, &str); 2] = [("en", "English"), ("zh-Hans", "简体中文")];

const BUILTIN_EN: &str = include_str!("../assets/i18n/en.json");

#[derive(Debug, Clone, Default)]
struct Tables {
    lang: String,
    map: HashMap<String, String>,
    builtin: HashMap<String, String>,
}

impl Tables {
    fn lookup(&self, key: &str) -> String {
        self.map
            .get(key)
            .or_else(|| self.builtin.get(key))
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

static I18N: OnceCell<RwLock<Tables>> = OnceCell::new();

fn asset_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            roots.push(dir.join("assets"));
        }
    }
    roots.push(PathBuf::from("assets"));
    roots
}

fn read_table(path: &Path) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&text).ok()
}

fn read_multi_table(path: &Path, lang: &str) -> Option<HashMap<String, String>> {
    let text = std::fs::read_to_string(path).ok()?;
    let mut all: HashMap<String, HashMap<String, String>> = serde_json::from_str(&text).ok()?;
    all.remove(lang)
}

fn load_lang(lang: &str) -> HashMap<String, String> {
    let roots = asset_roots();
    roots
        .iter()
        .find_map(|root| read_table(&root.join("i18n").join(format!("{lang}.json"))))
        .or_else(|| {
            roots
                .iter()
                .find_map(|root| read_multi_table(&root.join("i18n.json"), lang))
        })
        .unwrap_or_else(|| {
            if lang != DEFAULT_LANG {
                log::warn!("no string table for language {lang}");
            }
            HashMap::new()
        })
}

fn builtin_table() -> HashMap<String, String> {
    serde_json::from_str(BUILTIN_EN).unwrap_or_default()
}

/// Install `lang` as the active language. Later calls replace the tables.
pub fn init(lang: impl Into<String>) {
    let lang = lang.into();
    let tables = Tables {
        map: load_lang(&lang),
        builtin: builtin_table(),
        lang,
    };

    if let Some(lock) = I18N.get() {
        if let Ok(mut w) = lock.write() {
            *w = tables;
        }
    } else if let Err(cell) = I18N.set(RwLock::new(tables)) {
        // Lost an init race; overwrite the winner so the latest call sticks.
        if let (Some(lock), Ok(t)) = (I18N.get(), cell.into_inner()) {
            if let Ok(mut w) = lock.write() {
                *w = t;
            }
        }
    }
}

pub fn current_lang() -> String {
    I18N.get()
        .and_then(|l| l.read().ok().map(|t| t.lang.clone()))
        .unwrap_or_else(|| DEFAULT_LANG.to_string())
}

/// Localized text for `key`; the built-in English text or the key itself when missing.
pub fn tr(key: &str) -> String {
    match I18N.get().and_then(|l| l.read().ok()) {
        Some(tables) => tables.lookup(key),
        None => key.to_string(),
    }
}

/// Like `tr`, then substitutes `{name}` placeholders. Unknown placeholders stay as-is.
pub fn tr_with(key: &str, args: &[(&str, String)]) -> String {
    substitute(tr(key), args)
}

fn substitute(mut s: String, args: &[(&str, String)]) -> String {
    for (k, v) in args {
        s = s.replace(&format!("{{{k}}}"), v);
    }
    s
}

/// Language from `--lang <code>` or TOUR_LANG.
pub fn resolve_lang(args: &[String]) -> String {
    if let Some(v) = flag_value(args, "--lang") {
        return v;
    }
    match std::env::var("TOUR_LANG") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => DEFAULT_LANG.to_string(),
    }
}

/// Value following `flag` in an argv-style list.
pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
