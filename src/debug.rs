use std::fmt::Write;

use crate::entity::EntityId;
use crate::manager::EntityManager;

/// Scene tree inspector for debugging
pub struct SceneInspector;

impl SceneInspector {
    /// Depth-first listing from the root, inactive and dead entities included
    pub fn snapshot(manager: &EntityManager) -> Vec<EntityInfo> {
        let mut infos = Vec::with_capacity(manager.entity_count());
        let mut stack = vec![(manager.root(), 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let Some(node) = manager.entity(id) else {
                continue;
            };
            infos.push(EntityInfo {
                id,
                name: node.name().to_string(),
                serial: node.serial(),
                depth,
                active: node.is_active(),
                dead: node.is_dead(),
                components: node.component_names().iter().map(|n| n.to_string()).collect(),
            });
            for &child in node.children().iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        infos
    }

    /// Indented text tree, one entity per line
    pub fn format_tree(manager: &EntityManager) -> String {
        let mut out = String::new();
        for info in Self::snapshot(manager) {
            let _ = write!(out, "{}{} #{}", "  ".repeat(info.depth), info.name, info.serial);
            if !info.active {
                out.push_str(" (inactive)");
            }
            if info.dead {
                out.push_str(" (dead)");
            }
            if !info.components.is_empty() {
                let _ = write!(out, " [{}]", info.components.join(", "));
            }
            out.push('\n');
        }
        out
    }

    /// Print the scene tree to console
    pub fn print_tree(manager: &EntityManager) {
        println!("=== Scene ({} entities) ===", manager.entity_count());
        print!("{}", Self::format_tree(manager));
    }
}

/// Entity information for debugging
#[derive(Clone, Debug)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub serial: u64,
    pub depth: usize,
    pub active: bool,
    pub dead: bool,
    pub components: Vec<String>,
}
