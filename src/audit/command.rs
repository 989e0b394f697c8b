//! Upgrade command builder

use crate::audit::types::AuditEntry;

/// Build an `npm i` command line installing every entry at its target version.
///
/// Regular dependencies and dev dependencies become separate invocations
/// joined by `&&`. Returns an empty string when there is nothing to install.
pub fn npm_install_command<'a>(entries: impl IntoIterator<Item = &'a AuditEntry>) -> String {
    let (dev, regular): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|entry| entry.instance.is_dev);

    let mut commands = Vec::with_capacity(2);
    if !regular.is_empty() {
        commands.push(format!("npm i {}", install_specs(&regular)));
    }
    if !dev.is_empty() {
        commands.push(format!("npm i -D {}", install_specs(&dev)));
    }

    commands.join(" && ")
}

fn install_specs(entries: &[&AuditEntry]) -> String {
    entries
        .iter()
        .map(|entry| install_spec(entry))
        .collect::<Vec<_>>()
        .join(" ")
}

/// `name@latest` when targeting the registry's latest release, else `name@<target>`
fn install_spec(entry: &AuditEntry) -> String {
    if entry.targets_latest() {
        format!("{}@latest", entry.package_name)
    } else {
        format!("{}@{}", entry.package_name, entry.instance.target_version)
    }
}
