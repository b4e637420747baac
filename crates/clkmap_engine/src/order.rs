//! Bottom-up ordering of the module hierarchy.

use crate::error::ClkbufError;
use clkmap_common::{Ident, Interner};
use clkmap_netlist::{Design, ModuleId};
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Returns `roots` and every module they instantiate, transitively, such
/// that each module comes after all modules it instantiates.
///
/// Cell types that name no module of the design are library cells and are
/// not visited. A module reached again while still on the traversal stack
/// is a cycle.
pub fn module_order(
    design: &Design,
    interner: &Interner,
    roots: &[ModuleId],
) -> Result<Vec<ModuleId>, ClkbufError> {
    let by_name: HashMap<Ident, ModuleId> = design
        .modules_iter()
        .map(|(id, module)| (module.name, id))
        .collect();
    let children = |id: ModuleId| -> Vec<ModuleId> {
        design
            .module(id)
            .cells
            .values()
            .filter_map(|cell| by_name.get(&cell.cell_type).copied())
            .collect()
    };

    let mut marks: HashMap<ModuleId, Mark> = HashMap::new();
    let mut order = Vec::new();
    for &root in roots {
        if marks.contains_key(&root) {
            continue;
        }
        marks.insert(root, Mark::InProgress);
        let mut stack = vec![(root, children(root), 0usize)];
        while let Some((id, kids, next)) = stack.last_mut() {
            let Some(&child) = kids.get(*next) else {
                marks.insert(*id, Mark::Done);
                order.push(*id);
                stack.pop();
                continue;
            };
            *next += 1;
            match marks.get(&child) {
                Some(Mark::Done) => {}
                Some(Mark::InProgress) => {
                    let start = stack.iter().position(|(m, _, _)| *m == child).unwrap_or(0);
                    let chain = stack[start..]
                        .iter()
                        .map(|(m, _, _)| *m)
                        .chain(std::iter::once(child))
                        .map(|m| interner.resolve(design.module(m).name).to_string())
                        .collect();
                    return Err(ClkbufError::HierarchyCycle { chain });
                }
                None => {
                    marks.insert(child, Mark::InProgress);
                    stack.push((child, children(child), 0));
                }
            }
        }
    }
    Ok(order)
}
