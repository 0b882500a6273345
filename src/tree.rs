//! Project graph visualization.
//!
//! Backs `cmgen tree`: the root project, its modules with their links, its
//! project dependencies and, recursively, its sub-projects.
//!
//! ## Example Output
//!
//! ```text
//! Game (/work/Game)
//! ├── module App [Executable, public]
//! │   └── Engine::Render
//! ├── depends Engine {InstallAlways}
//! └── sub Tools (/work/Game/Tools)
//! ```

use crate::error::GenResult;
use crate::model::{Definition, ProjectId, Visibility};
use crate::registry::Registry;
use colored::*;

pub fn print_tree(registry: &Registry, root: ProjectId) -> GenResult<()> {
    let lines = render_tree(registry, root)?;
    if let Some((first, rest)) = lines.split_first() {
        println!("{}", first.bold().cyan());
        for line in rest {
            println!("{line}");
        }
    }
    Ok(())
}

/// Uncolored tree lines, root first.
pub fn render_tree(registry: &Registry, root: ProjectId) -> GenResult<Vec<String>> {
    let project = registry.project(root);
    let mut lines = vec![format!(
        "{} ({})",
        project.name(),
        project.path().display()
    )];
    project_children(registry, root, "", &mut lines)?;
    Ok(lines)
}

struct Node {
    label: String,
    children: Vec<String>,
    sub_project: Option<ProjectId>,
}

fn project_children(
    registry: &Registry,
    id: ProjectId,
    indent: &str,
    lines: &mut Vec<String>,
) -> GenResult<()> {
    let project = registry.project(id);
    let mut nodes = Vec::new();

    for visibility in [Visibility::Public, Visibility::Private] {
        for module in project.modules().get(visibility) {
            let mut children = Vec::new();
            for dependency in module.dependencies().iter() {
                let target = dependency.resolved()?;
                if let Some(linked) = registry.module(target) {
                    children.push(format!(
                        "{}::{}",
                        registry.project(target.project).name(),
                        linked.name()
                    ));
                }
            }
            for dependency in module.external_dependencies().iter() {
                let target = dependency.resolved()?;
                let owner = registry.external_project(target.project);
                if let Some(external) = registry.external_module(target) {
                    children.push(format!("{}::{} (external)", owner.name(), external.name()));
                }
            }
            nodes.push(Node {
                label: format!(
                    "module {} [{}, {}]",
                    module.name(),
                    module.kind(),
                    visibility.keyword().to_lowercase()
                ),
                children,
                sub_project: None,
            });
        }
    }

    for dependency in project.dependencies().iter() {
        let target = registry.project(dependency.resolved()?);
        nodes.push(Node {
            label: format!("depends {} {}", target.name(), dependency.required_keys()),
            children: Vec::new(),
            sub_project: None,
        });
    }
    for dependency in project.external_dependencies().iter() {
        let target = registry.external_project(dependency.resolved()?);
        nodes.push(Node {
            label: format!(
                "external {} ({}) {}",
                target.name(),
                target.kind(),
                dependency.required_keys()
            ),
            children: Vec::new(),
            sub_project: None,
        });
    }
    for sub_project in project.sub_projects() {
        let sub_id = sub_project.resolved()?;
        let sub = registry.project(sub_id);
        nodes.push(Node {
            label: format!("sub {} ({})", sub.name(), sub.path().display()),
            children: Vec::new(),
            sub_project: Some(sub_id),
        });
    }

    let count = nodes.len();
    for (i, node) in nodes.into_iter().enumerate() {
        let is_last = i == count - 1;
        let prefix = if is_last { "└──" } else { "├──" };
        let nested = format!("{indent}{}", if is_last { "    " } else { "│   " });
        lines.push(format!("{indent}{prefix} {}", node.label));

        let child_count = node.children.len();
        for (j, child) in node.children.iter().enumerate() {
            let child_prefix = if j == child_count - 1 { "└──" } else { "├──" };
            lines.push(format!("{nested}{child_prefix} {child}"));
        }
        if let Some(sub_id) = node.sub_project {
            project_children(registry, sub_id, &nested, lines)?;
        }
    }
    Ok(())
}
