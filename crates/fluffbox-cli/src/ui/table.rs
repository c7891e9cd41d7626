//! Release and installation tables.

use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use fluffbox_schema::{InstalledVersions, Release, RuntimeKind};

fn base_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Releases offered upstream, marking the ones already on disk.
pub fn releases(releases: &[Release], installed: &InstalledVersions) -> Table {
    let mut table = base_table(vec!["Version", "LTS", "Build", "Status"]);
    for release in releases {
        let status = if installed.current.as_deref() == Some(release.version.as_str()) {
            Cell::new("active").fg(Color::Green)
        } else if installed.installed.contains(&release.version) {
            Cell::new("installed").fg(Color::Cyan)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&release.version),
            Cell::new(release.lts.as_deref().unwrap_or("")),
            Cell::new(release.build.as_deref().unwrap_or("")),
            status,
        ]);
    }
    table
}

/// Installed versions per kind, newest first, with the active one marked.
pub fn installed(rows: &[(RuntimeKind, InstalledVersions)]) -> Table {
    let mut table = base_table(vec!["Runtime", "Version", "Active"]);
    for (kind, versions) in rows {
        for version in &versions.installed {
            let active = versions.current.as_ref() == Some(version);
            table.add_row(vec![
                Cell::new(kind.display_name()),
                Cell::new(version),
                if active {
                    Cell::new("*").fg(Color::Green)
                } else {
                    Cell::new("")
                },
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_marks_installed_and_active() {
        let list = vec![
            Release::new("v20.11.1", "https://x/node-v20.11.1-linux-x64.tar.gz").with_lts("Iron"),
            Release::new("v18.19.0", "https://x/node-v18.19.0-linux-x64.tar.gz"),
            Release::new("v21.6.0", "https://x/node-v21.6.0-linux-x64.tar.gz"),
        ];
        let installed = InstalledVersions {
            installed: vec!["v20.11.1".to_string(), "v18.19.0".to_string()],
            current: Some("v20.11.1".to_string()),
        };

        let rendered = releases(&list, &installed).to_string();
        let line_of = |v: &str| rendered.lines().find(|l| l.contains(v)).unwrap().to_string();

        assert!(line_of("v20.11.1").contains("active"));
        assert!(line_of("v20.11.1").contains("Iron"));
        assert!(line_of("v18.19.0").contains("installed"));
        assert!(!line_of("v21.6.0").contains("installed"));
    }

    #[test]
    fn test_installed_lists_every_kind() {
        let rows = vec![
            (
                RuntimeKind::Node,
                InstalledVersions {
                    installed: vec!["v20.11.1".to_string()],
                    current: None,
                },
            ),
            (
                RuntimeKind::Java,
                InstalledVersions {
                    installed: vec!["21.0.2+13".to_string()],
                    current: Some("21.0.2+13".to_string()),
                },
            ),
        ];
        let rendered = installed(&rows).to_string();
        assert!(rendered.contains("Node.js"));
        assert!(rendered.contains("21.0.2+13"));
        assert_eq!(rendered.matches('*').count(), 1);
    }
}
