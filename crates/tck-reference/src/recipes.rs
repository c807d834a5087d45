//! Source rewrites used by the sample scenarios
//!
//! Recipes only touch the [`SourceUnit`] model, so the same recipe runs
//! unchanged on every dialect.

use std::collections::HashSet;
use tck_backend::{Import, SourceUnit};

/// Package imported implicitly
const IMPLICIT_PACKAGE: &str = "java.lang";

fn package_of(path: &str) -> Option<&str> {
    path.rsplit_once('.').map(|(package, _)| package)
}

/// Check if `path` is already visible without a new import
fn is_visible(unit: &SourceUnit, path: &str) -> bool {
    if unit.has_import(path) {
        return true;
    }
    let Some(package) = package_of(path) else {
        return true;
    };
    package == IMPLICIT_PACKAGE
        || unit.package.as_deref() == Some(package)
        || unit
            .imports
            .iter()
            .any(|i| !i.is_static && i.path.strip_suffix(".*") == Some(package))
}

/// Add a type import unless it is already visible
///
/// A sorted import list stays sorted. Returns true if the unit changed.
pub fn add_import(unit: &mut SourceUnit, path: &str) -> bool {
    if is_visible(unit, path) {
        return false;
    }
    let was_sorted = unit.imports.windows(2).all(|pair| pair[0] <= pair[1]);
    unit.imports.push(Import::new(path));
    if was_sorted {
        unit.imports.sort();
    }
    true
}

/// Sort imports (type imports first, then static) and drop duplicates
///
/// Returns true if the unit changed.
pub fn order_imports(unit: &mut SourceUnit) -> bool {
    let before = unit.imports.clone();
    unit.imports.sort();
    unit.imports.dedup();
    unit.imports != before
}

/// Identifier tokens of the body
fn identifiers(body: &[String]) -> HashSet<&str> {
    body.iter()
        .flat_map(|line| line.split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$')))
        .filter(|token| !token.is_empty())
        .collect()
}

/// Drop imports whose simple name never appears in the body
///
/// Wildcard imports are kept. Returns the number of imports removed.
pub fn remove_unused_imports(unit: &mut SourceUnit) -> usize {
    let used = identifiers(&unit.body);
    let before = unit.imports.len();
    unit.imports
        .retain(|import| import.path.ends_with(".*") || used.contains(import.simple_name()));
    before - unit.imports.len()
}

/// Move the unit from package `from` to `to`
///
/// Imports of types inside `from` follow the move. Returns true if the unit
/// changed.
pub fn change_package(unit: &mut SourceUnit, from: &str, to: &str) -> bool {
    let mut changed = false;
    if unit.package.as_deref() == Some(from) {
        unit.package = Some(to.to_string());
        changed = true;
    }
    for import in &mut unit.imports {
        let moved = import
            .path
            .strip_prefix(from)
            .filter(|rest| rest.starts_with('.'))
            .map(|rest| format!("{to}{rest}"));
        if let Some(path) = moved {
            import.path = path;
            changed = true;
        }
    }
    changed
}
