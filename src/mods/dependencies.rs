use std::collections::{HashMap, HashSet};

use super::scanner::DiscoveredMod;

/// A mod that declared dependencies which were not discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyViolation {
    pub mod_name: String,
    pub missing: Vec<String>,
}

impl DependencyViolation {
    pub fn message(&self) -> String {
        format!(
            "Mod \"{}\" is missing dependencies: {}",
            self.mod_name,
            self.missing.join(", ")
        )
    }
}

/// Check every declared dependency against the set of discovered mod names.
///
/// Names are the declared ones (which default to the folder name), so a
/// degraded mod still satisfies dependencies on its folder name.
pub fn find_missing_dependencies(mods: &[DiscoveredMod]) -> Vec<DependencyViolation> {
    let loaded: HashSet<&str> = mods.iter().map(|m| m.descriptor.name.as_str()).collect();

    let mut violations: Vec<DependencyViolation> = Vec::new();

    for m in mods {
        let missing: Vec<String> = m
            .descriptor
            .dependencies
            .iter()
            .filter(|dep| !loaded.contains(dep.as_str()))
            .cloned()
            .collect();

        if !missing.is_empty() {
            violations.push(DependencyViolation {
                mod_name: m.descriptor.name.clone(),
                missing,
            });
        }
    }

    violations
}

/// Declared names claimed by more than one folder, in first-seen order.
pub fn find_duplicate_names(mods: &[DiscoveredMod]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();

    for m in mods {
        let name = m.descriptor.name.as_str();
        let count = counts.entry(name).or_insert(0);
        if *count == 0 {
            order.push(name);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter(|name| counts.get(name).copied().unwrap_or(0) > 1)
        .map(str::to_string)
        .collect()
}

/// One line per violation, newline-joined, for the blocking startup report.
pub fn report(violations: &[DependencyViolation]) -> String {
    violations
        .iter()
        .map(DependencyViolation::message)
        .collect::<Vec<_>>()
        .join("\n")
}
