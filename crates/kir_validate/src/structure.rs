//! Structure tier: tree shape and reference integrity.

use crate::codes;
use crate::options::ValidationOptions;
use kir_diagnostics::Diagnostic;
use kir_ir::{ComponentId, ComponentTree, Document, NodeIndex, ReactiveManifest, VariableId};
use std::collections::{HashMap, HashSet};

/// At most this many ids are listed in an aggregated note.
const LISTED_IDS: usize = 10;

/// Checks the tree and manifest of `document` for shape and reference
/// problems. Never stops at the first finding.
pub fn check_structure(document: &Document, options: &ValidationOptions) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let tree = document.tree();
    check_root(tree, &mut diags);
    check_child_lists(tree, &mut diags);
    check_cycles(tree, &mut diags);
    check_reachability(tree, &mut diags);
    check_index(tree, &mut diags);
    check_component_ids(tree, &mut diags);
    check_limits(tree, options, &mut diags);
    check_manifest(tree, document.manifest(), &mut diags);
    diags
}

fn id_of(tree: &ComponentTree, slot: NodeIndex) -> Option<u32> {
    tree.node(slot).map(|n| n.id.as_raw())
}

fn with_component(diag: Diagnostic, id: Option<u32>) -> Diagnostic {
    match id {
        Some(id) => diag.with_component(id),
        None => diag,
    }
}

fn check_root(tree: &ComponentTree, diags: &mut Vec<Diagnostic>) {
    match tree.root() {
        None => diags.push(Diagnostic::fatal(
            codes::MISSING_ROOT,
            "document has no root component",
        )),
        Some(root) if tree.node(root).is_none() => diags.push(Diagnostic::fatal(
            codes::DANGLING_ROOT,
            format!("root refers to missing slot {root}"),
        )),
        Some(_) => {}
    }
}

fn check_child_lists(tree: &ComponentTree, diags: &mut Vec<Diagnostic>) {
    let mut parents: Vec<Vec<NodeIndex>> = vec![Vec::new(); tree.len()];
    for (slot, node) in tree.iter() {
        let mut seen = HashSet::new();
        for &child in &node.children {
            if tree.node(child).is_none() {
                diags.push(
                    Diagnostic::fatal(
                        codes::DANGLING_CHILD,
                        format!("child refers to missing slot {child}"),
                    )
                    .with_component(node.id.as_raw()),
                );
                continue;
            }
            if !seen.insert(child) {
                diags.push(
                    with_component(
                        Diagnostic::fatal(
                            codes::DUPLICATE_CHILD,
                            "child listed more than once under the same parent",
                        ),
                        id_of(tree, child),
                    )
                    .with_note(format!("parent is component {}", node.id)),
                );
                continue;
            }
            parents[child.as_raw() as usize].push(slot);
        }
    }
    for (child, owners) in parents.iter().enumerate() {
        if owners.len() > 1 {
            let child = NodeIndex::from_raw(child as u32);
            let owner_ids: Vec<String> = owners
                .iter()
                .filter_map(|&p| id_of(tree, p))
                .map(|id| id.to_string())
                .collect();
            diags.push(
                with_component(
                    Diagnostic::fatal(
                        codes::MULTIPLE_PARENTS,
                        format!("component has {} parents", owners.len()),
                    ),
                    id_of(tree, child),
                )
                .with_note(format!("parents: {}", owner_ids.join(", "))),
            );
        }
    }
}

/// Reports every back edge found by a depth-first walk over all slots,
/// starting from the root.
fn check_cycles(tree: &ComponentTree, diags: &mut Vec<Diagnostic>) {
    const WHITE: u8 = 0;
    const GRAY: u8 = 1;
    const BLACK: u8 = 2;

    let mut color = vec![WHITE; tree.len()];
    let starts = tree
        .root()
        .into_iter()
        .chain(tree.iter().map(|(slot, _)| slot));
    for start in starts {
        if tree.node(start).is_none() || color[start.as_raw() as usize] != WHITE {
            continue;
        }
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
        color[start.as_raw() as usize] = GRAY;
        while let Some(top) = stack.last_mut() {
            let slot = top.0;
            let children = tree.children(slot);
            if top.1 >= children.len() {
                color[slot.as_raw() as usize] = BLACK;
                stack.pop();
                continue;
            }
            let child = children[top.1];
            top.1 += 1;
            let Some(state) = color.get_mut(child.as_raw() as usize) else {
                continue;
            };
            match *state {
                WHITE => {
                    *state = GRAY;
                    stack.push((child, 0));
                }
                GRAY => diags.push(
                    with_component(
                        Diagnostic::fatal(codes::CYCLE, "component is its own ancestor"),
                        id_of(tree, child),
                    )
                    .with_note(format!(
                        "reached again from component {}",
                        id_of(tree, slot).unwrap_or_default()
                    )),
                ),
                _ => {}
            }
        }
    }
}

fn check_reachability(tree: &ComponentTree, diags: &mut Vec<Diagnostic>) {
    if tree.root().is_none() {
        return;
    }
    let reachable: HashSet<NodeIndex> = tree.preorder().into_iter().collect();
    let unreachable: Vec<ComponentId> = tree
        .iter()
        .filter(|(slot, _)| !reachable.contains(slot))
        .map(|(_, node)| node.id)
        .collect();
    if unreachable.is_empty() {
        return;
    }
    diags.push(
        Diagnostic::advisory(
            codes::UNREACHABLE,
            format!("{} components are not reachable from the root", unreachable.len()),
        )
        .with_note(format!("ids: {}", list_ids(&unreachable))),
    );
}

fn check_index(tree: &ComponentTree, diags: &mut Vec<Diagnostic>) {
    let fresh = tree.compute_index();
    let stale: Vec<ComponentId> = tree
        .iter()
        .filter(|(slot, _)| tree.index().parent(*slot) != fresh.parent(*slot))
        .map(|(_, node)| node.id)
        .collect();
    if tree.index().parents().len() != fresh.parents().len() || !stale.is_empty() {
        diags.push(
            Diagnostic::fatal(codes::STALE_INDEX, "parent index does not match the child lists")
                .with_note(format!("affected ids: {}", list_ids(&stale)))
                .with_help("rebuild the index after editing child lists"),
        );
    }
}

fn check_component_ids(tree: &ComponentTree, diags: &mut Vec<Diagnostic>) {
    let mut counts: HashMap<ComponentId, usize> = HashMap::new();
    for (_, node) in tree.iter() {
        *counts.entry(node.id).or_default() += 1;
    }
    let mut duplicates: Vec<_> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    for (id, n) in duplicates {
        diags.push(
            Diagnostic::fatal(
                codes::DUPLICATE_COMPONENT_ID,
                format!("component id used by {n} nodes"),
            )
            .with_component(id.as_raw()),
        );
    }
}

fn check_limits(tree: &ComponentTree, options: &ValidationOptions, diags: &mut Vec<Diagnostic>) {
    if tree.len() > options.max_component_count {
        diags.push(Diagnostic::fatal(
            codes::COUNT_LIMIT,
            format!(
                "{} components exceed the limit of {}",
                tree.len(),
                options.max_component_count
            ),
        ));
    }
    if let Some(&(slot, depth)) = tree
        .preorder_with_depth()
        .iter()
        .max_by_key(|(_, depth)| *depth)
    {
        if depth > options.max_tree_depth {
            diags.push(with_component(
                Diagnostic::fatal(
                    codes::DEPTH_LIMIT,
                    format!(
                        "tree depth {depth} exceeds the limit of {}",
                        options.max_tree_depth
                    ),
                ),
                id_of(tree, slot),
            ));
        }
    }
}

fn check_manifest(tree: &ComponentTree, manifest: &ReactiveManifest, diags: &mut Vec<Diagnostic>) {
    let mut ids: HashSet<VariableId> = HashSet::new();
    let mut names: HashSet<&str> = HashSet::new();
    for var in manifest.variables() {
        if !ids.insert(var.id) {
            diags.push(Diagnostic::fatal(
                codes::DUPLICATE_VARIABLE_ID,
                format!("variable id {} declared more than once", var.id),
            ));
        }
        if !names.insert(var.name.as_str()) {
            diags.push(Diagnostic::fatal(
                codes::DUPLICATE_VARIABLE_NAME,
                format!("variable '{}' declared more than once", var.name),
            ));
        }
    }
    for binding in manifest.bindings() {
        if tree.find(binding.component).is_none() {
            diags.push(
                Diagnostic::fatal(
                    codes::UNRESOLVED_BINDING_COMPONENT,
                    format!("{} binding targets a component not in the tree", binding.kind),
                )
                .with_component(binding.component.as_raw()),
            );
        }
        if !ids.contains(&binding.variable) {
            diags.push(
                Diagnostic::fatal(
                    codes::UNRESOLVED_BINDING_VARIABLE,
                    format!("binding reads unknown variable id {}", binding.variable),
                )
                .with_component(binding.component.as_raw()),
            );
        }
    }
    for cond in manifest.conditionals() {
        let what = format!("conditional '{}'", cond.condition);
        check_table_entry(tree, &ids, &what, cond.component, &cond.dependencies, diags);
    }
    for lp in manifest.for_loops() {
        let what = format!("for-loop over '{}'", lp.collection);
        check_table_entry(tree, &ids, &what, lp.parent, &[lp.variable], diags);
    }
}

fn check_table_entry(
    tree: &ComponentTree,
    ids: &HashSet<VariableId>,
    what: &str,
    component: ComponentId,
    variables: &[VariableId],
    diags: &mut Vec<Diagnostic>,
) {
    if tree.find(component).is_none() {
        diags.push(
            Diagnostic::fatal(
                codes::UNRESOLVED_TABLE_COMPONENT,
                format!("{what} targets a component not in the tree"),
            )
            .with_component(component.as_raw()),
        );
    }
    for variable in variables.iter().filter(|v| !ids.contains(v)) {
        diags.push(
            Diagnostic::fatal(
                codes::UNRESOLVED_TABLE_VARIABLE,
                format!("{what} reads unknown variable id {variable}"),
            )
            .with_component(component.as_raw()),
        );
    }
}

fn list_ids(ids: &[ComponentId]) -> String {
    let mut listed: Vec<String> = ids.iter().take(LISTED_IDS).map(|id| id.to_string()).collect();
    if ids.len() > LISTED_IDS {
        listed.push(format!("and {} more", ids.len() - LISTED_IDS));
    }
    listed.join(", ")
}
