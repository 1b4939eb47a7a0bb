use std::io;
use std::path::Path;

use crate::config::Config;

/// Problems with the database path, one message per failed check.
pub fn problems(db: &Path, mutating: bool) -> Vec<String> {
    let mut errors: Vec<String> = Vec::new();

    // Check 1: exists and is a regular file
    match std::fs::metadata(db) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => errors.push(format!("{} is not a regular file", db.display())),
        // Edits create the database on first write.
        Err(e) if mutating && e.kind() == io::ErrorKind::NotFound => {
            if let Some(problem) = parent_problem(db) {
                errors.push(problem);
            }
            return errors;
        }
        Err(e) => {
            errors.push(format!(
                "cannot stat {}: {e}\n  \
                 → pass the path of an existing SVR database file",
                db.display()
            ));
            return errors;
        }
    }

    // Check 2: readable
    if let Err(e) = std::fs::OpenOptions::new().read(true).open(db) {
        errors.push(format!("cannot read {}: {e}", db.display()));
    }

    // Check 3: writable, only when the command edits
    if mutating {
        if let Err(e) = std::fs::OpenOptions::new().append(true).open(db) {
            errors.push(format!(
                "cannot write {}: {e}\n  \
                 → edits need write access to the database and its directory",
                db.display()
            ));
        }
    }

    errors
}

/// A new database needs an existing, writable directory to land in.
fn parent_problem(db: &Path) -> Option<String> {
    let parent = match db.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match std::fs::metadata(parent) {
        Ok(meta) if !meta.is_dir() => Some(format!("{} is not a directory", parent.display())),
        Ok(meta) if meta.permissions().readonly() => Some(format!(
            "cannot create {}: {} is read-only",
            db.display(),
            parent.display()
        )),
        Ok(_) => None,
        Err(e) => Some(format!(
            "cannot create {}: {e}\n  \
             → the directory {} must exist",
            db.display(),
            parent.display()
        )),
    }
}

pub fn check(cfg: &Config) -> anyhow::Result<()> {
    let errors = problems(&cfg.db, cfg.is_mutating());
    if errors.is_empty() {
        return Ok(());
    }

    for err in &errors {
        eprintln!("ERROR: {err}");
    }
    anyhow::bail!("{} preflight check(s) failed", errors.len());
}
