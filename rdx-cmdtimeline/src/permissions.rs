//! Permission nodes guarding the `/timeline` command.

use crate::host::Actor;
use std::path::Path;

/// Prefix of the per-file and per-directory nodes: `timeline.use-<name>`.
pub const USE: &str = "timeline.use";

/// Grants access to every timeline.
pub const ADMIN: &str = "timeline.admin.useall";

/// The nodes that each grant access to `file`, besides [`ADMIN`].
///
/// A file is reachable through its stem (`events/boss.txt` → `timeline.use-boss`)
/// or its directory, written with either separator
/// (`timeline.use-events/sub`, `timeline.use-events\sub`).
pub fn nodes_for(file: &str) -> Vec<String> {
    let normalized = file.replace('\\', "/");
    let path = Path::new(&normalized);
    let mut nodes = Vec::new();

    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        nodes.push(format!("{USE}-{stem}"));
    }
    if let Some(dir) = path
        .parent()
        .and_then(|p| p.to_str())
        .filter(|d| !d.is_empty())
    {
        nodes.push(format!("{USE}-{dir}"));
        if dir.contains('/') {
            nodes.push(format!("{USE}-{}", dir.replace('/', "\\")));
        }
    }
    nodes
}

/// Whether `actor` may start or stop `file`. Node comparison ignores case.
pub fn can_use_timeline(actor: &Actor, file: &str) -> bool {
    actor.has_permission(ADMIN)
        || nodes_for(file)
            .iter()
            .any(|node| actor.has_permission(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nodes_cover_stem_and_directory() {
        assert_eq!(nodes_for("boss.txt"), vec!["timeline.use-boss"]);
        assert_eq!(
            nodes_for("events\\night\\boss.txt"),
            vec![
                "timeline.use-boss",
                "timeline.use-events/night",
                "timeline.use-events\\night",
            ]
        );
    }

    #[test]
    fn access_by_stem_directory_or_admin() {
        let by_stem = Actor::player("a", ["timeline.use-BOSS"]);
        let by_dir = Actor::player("b", ["timeline.use-events"]);
        let admin = Actor::player("c", [ADMIN]);
        let nobody = Actor::player("d", ["timeline.use-other"]);

        assert!(can_use_timeline(&by_stem, "events/boss.txt"));
        assert!(can_use_timeline(&by_dir, "events/boss.txt"));
        assert!(!can_use_timeline(&by_dir, "boss.txt"));
        assert!(can_use_timeline(&admin, "anything.txt"));
        assert!(!can_use_timeline(&nobody, "events/boss.txt"));
        assert!(can_use_timeline(&Actor::console(), "events/boss.txt"));
    }

    #[test]
    fn top_level_files_have_no_empty_directory_node() {
        let blank = Actor::player("e", ["timeline.use-"]);
        assert!(!can_use_timeline(&blank, "boss.txt"));
    }
}
