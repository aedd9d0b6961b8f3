//! Hygiene: production sources stay free of panics and dropped errors
//!
//! Scans the crate's production sources for patterns that either crash the
//! page or silently drop errors. Every budget is zero: preference services
//! default and clamp instead of panicking, and host failures are logged.

use std::fs;
use std::path::Path;

struct Rule {
    pattern: &'static str,
    budget: usize,
    why: &'static str,
}

const RULES: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0, why: "panics" },
    Rule { pattern: ".expect(", budget: 0, why: "panics" },
    Rule { pattern: "panic!(", budget: 0, why: "panics" },
    Rule { pattern: "unreachable!(", budget: 0, why: "panics" },
    Rule { pattern: "todo!(", budget: 0, why: "unfinished stub" },
    Rule { pattern: "unimplemented!(", budget: 0, why: "unfinished stub" },
    Rule { pattern: "let _ =", budget: 0, why: "discards a result without inspecting it" },
    Rule { pattern: ".ok()", budget: 0, why: "discards an error without logging it" },
    Rule { pattern: "#[allow(dead_code)]", budget: 0, why: "hides unused code" },
    Rule { pattern: "RefCell<Option<Closure", budget: 0, why: "use an RAII handle instead" },
];

struct SourceFile {
    path: String,
    content: String,
}

/// Production `.rs` files under `src/`, excluding `*_test.rs`.
fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new("src"), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let path_str = path.to_string_lossy().to_string();
            if path_str.ends_with("_test.rs") {
                continue;
            }
            if let Ok(content) = fs::read_to_string(&path) {
                out.push(SourceFile { path: path_str, content });
            }
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file
                .content
                .lines()
                .filter(|line| !line.trim_start().starts_with("//"))
                .filter(|line| line.contains(pattern))
                .count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(
        files.iter().any(|f| f.path.ends_with("lib.rs")),
        "hygiene scan must run from the crate root"
    );
}

#[test]
fn pattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for rule in RULES {
        let found = hits(&files, rule.pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > rule.budget {
            let detail = found
                .iter()
                .map(|(path, c)| format!("    {path}: {c}"))
                .collect::<Vec<_>>()
                .join("\n");
            failures.push(format!(
                "`{}` ({}) budget exceeded: found {count}, max {}\n{detail}",
                rule.pattern, rule.why, rule.budget
            ));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn every_source_module_has_a_sibling_test() {
    let files = source_files();
    let missing: Vec<&str> = files
        .iter()
        .filter(|f| !f.path.ends_with("lib.rs") && !f.path.ends_with("browser.rs"))
        .filter(|f| !f.content.contains("_test.rs\"]"))
        .map(|f| f.path.as_str())
        .collect();
    assert!(missing.is_empty(), "modules without tests: {missing:?}");
}
