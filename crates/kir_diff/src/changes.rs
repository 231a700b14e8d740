//! Change set types and their text report.

use crate::matcher::MatchKind;
use kir_ir::{
    BindingKind, ComponentId, ComponentKind, PropertyKey, ReactiveManifest, VarType, VariableId,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Everything that differs between two documents.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ChangeSet {
    /// Matched components that changed, in new-tree pre-order.
    pub components: Vec<ComponentChange>,
    /// Components only in the new document.
    pub added: Vec<ComponentId>,
    /// Components only in the old document.
    pub removed: Vec<ComponentId>,
    /// Variable and binding changes.
    pub manifest: ManifestChanges,
    /// New reachable component count minus the old one.
    pub component_count_delta: i64,
}

impl ChangeSet {
    /// Returns `true` if the documents are equivalent.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.manifest.is_empty()
            && self.component_count_delta == 0
    }
}

/// A matched component pair that differs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentChange {
    /// Id in the old document.
    pub old_id: ComponentId,
    /// Id in the new document. Differs from `old_id` only for positional
    /// matches.
    pub new_id: ComponentId,
    /// How the pair was matched.
    pub matched_by: MatchKind,
    /// Old and new kind, if the kind changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<(ComponentKind, ComponentKind)>,
    /// New child count minus old child count.
    pub child_count_delta: i64,
    /// Text content differs.
    pub text_changed: bool,
    /// Keys whose values were added, removed or modified.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<PropertyKey>,
}

impl ComponentChange {
    /// Returns `true` if the component was matched under a different id.
    pub fn id_changed(&self) -> bool {
        self.old_id != self.new_id
    }

    pub(crate) fn is_unchanged(&self) -> bool {
        !self.id_changed()
            && self.kind.is_none()
            && self.child_count_delta == 0
            && !self.text_changed
            && self.properties.is_empty()
    }
}

/// Variable and binding differences. Variables are keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ManifestChanges {
    /// Names declared only in the new manifest.
    pub variables_added: Vec<String>,
    /// Names declared only in the old manifest.
    pub variables_removed: Vec<String>,
    /// Names declared in both whose type or value differs.
    pub variables_changed: Vec<VariableChange>,
    /// Bindings only in the new manifest.
    pub bindings_added: Vec<BindingKey>,
    /// Bindings only in the old manifest.
    pub bindings_removed: Vec<BindingKey>,
    /// Conditionals only in the new manifest.
    pub conditionals_added: Vec<ConditionalKey>,
    /// Conditionals only in the old manifest.
    pub conditionals_removed: Vec<ConditionalKey>,
    /// For-loops only in the new manifest.
    pub for_loops_added: Vec<ForLoopKey>,
    /// For-loops only in the old manifest.
    pub for_loops_removed: Vec<ForLoopKey>,
}

impl ManifestChanges {
    /// Returns `true` if nothing changed.
    pub fn is_empty(&self) -> bool {
        self.variables_added.is_empty()
            && self.variables_removed.is_empty()
            && self.variables_changed.is_empty()
            && self.bindings_added.is_empty()
            && self.bindings_removed.is_empty()
            && self.conditionals_added.is_empty()
            && self.conditionals_removed.is_empty()
            && self.for_loops_added.is_empty()
            && self.for_loops_removed.is_empty()
    }

    /// Returns `true` if `name` changed type.
    pub fn is_type_changed(&self, name: &str) -> bool {
        self.variables_changed
            .iter()
            .any(|c| c.name == name && c.type_changed())
    }
}

/// A variable declared in both manifests with a different type or value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VariableChange {
    /// Variable name.
    pub name: String,
    /// Declared type in the old manifest.
    pub old_type: VarType,
    /// Declared type in the new manifest.
    pub new_type: VarType,
    /// Current values differ.
    pub value_changed: bool,
}

impl VariableChange {
    /// Returns `true` if the declared type changed.
    pub fn type_changed(&self) -> bool {
        self.old_type != self.new_type
    }
}

/// Identity of a binding across manifests. Variable ids are manifest-local,
/// so the variable is named instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct BindingKey {
    /// The bound component.
    pub component: ComponentId,
    /// Name of the bound variable.
    pub variable: String,
    /// Binding kind.
    pub kind: BindingKind,
    /// Source expression.
    pub expression: String,
}

/// Identity of a conditional across manifests. Runtime state is not part of it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ConditionalKey {
    /// The conditional component.
    pub component: ComponentId,
    /// Condition expression.
    pub condition: String,
    /// Names of the variables the condition reads.
    pub dependencies: Vec<String>,
}

/// Identity of a for-loop across manifests.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ForLoopKey {
    /// The component whose children repeat.
    pub parent: ComponentId,
    /// Collection expression.
    pub collection: String,
    /// Name of the collection variable.
    pub variable: String,
}

fn variable_name(manifest: &ReactiveManifest, id: VariableId) -> String {
    manifest
        .variable(id)
        .map(|v| v.name.clone())
        .unwrap_or_default()
}

fn binding_keys(manifest: &ReactiveManifest) -> Vec<BindingKey> {
    manifest
        .bindings()
        .iter()
        .map(|b| BindingKey {
            component: b.component,
            variable: variable_name(manifest, b.variable),
            kind: b.kind,
            expression: b.expression.clone(),
        })
        .collect()
}

fn conditional_keys(manifest: &ReactiveManifest) -> Vec<ConditionalKey> {
    manifest
        .conditionals()
        .iter()
        .map(|c| ConditionalKey {
            component: c.component,
            condition: c.condition.clone(),
            dependencies: c
                .dependencies
                .iter()
                .map(|&id| variable_name(manifest, id))
                .collect(),
        })
        .collect()
}

fn for_loop_keys(manifest: &ReactiveManifest) -> Vec<ForLoopKey> {
    manifest
        .for_loops()
        .iter()
        .map(|l| ForLoopKey {
            parent: l.parent,
            collection: l.collection.clone(),
            variable: variable_name(manifest, l.variable),
        })
        .collect()
}

/// Splits two key lists into (only in `new`, only in `old`), each in list order.
fn set_difference<K: Clone + Eq + Hash>(old: Vec<K>, new: Vec<K>) -> (Vec<K>, Vec<K>) {
    let old_set: HashSet<&K> = old.iter().collect();
    let new_set: HashSet<&K> = new.iter().collect();
    let added = new
        .iter()
        .filter(|k| !old_set.contains(k))
        .cloned()
        .collect();
    let removed = old
        .iter()
        .filter(|k| !new_set.contains(k))
        .cloned()
        .collect();
    (added, removed)
}

/// Compares two manifests by variable name and binding identity.
pub fn diff_manifests(old: &ReactiveManifest, new: &ReactiveManifest) -> ManifestChanges {
    let mut changes = ManifestChanges::default();
    for var in new.variables() {
        match old.find_variable(&var.name) {
            None => changes.variables_added.push(var.name.clone()),
            Some(prev) => {
                let value_changed = !prev.value.bitwise_eq(&var.value);
                if prev.var_type != var.var_type || value_changed {
                    changes.variables_changed.push(VariableChange {
                        name: var.name.clone(),
                        old_type: prev.var_type,
                        new_type: var.var_type,
                        value_changed,
                    });
                }
            }
        }
    }
    changes.variables_removed = old
        .variables()
        .iter()
        .filter(|v| new.find_variable(&v.name).is_none())
        .map(|v| v.name.clone())
        .collect();

    (changes.bindings_added, changes.bindings_removed) =
        set_difference(binding_keys(old), binding_keys(new));
    (changes.conditionals_added, changes.conditionals_removed) =
        set_difference(conditional_keys(old), conditional_keys(new));
    (changes.for_loops_added, changes.for_loops_removed) =
        set_difference(for_loop_keys(old), for_loop_keys(new));
    changes
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return writeln!(f, "no changes");
        }
        writeln!(f, "components: {:+}", self.component_count_delta)?;
        for change in &self.components {
            writeln!(f, "  ~ {change}")?;
        }
        for id in &self.added {
            writeln!(f, "  + #{id}")?;
        }
        for id in &self.removed {
            writeln!(f, "  - #{id}")?;
        }
        if !self.manifest.is_empty() {
            write!(f, "{}", self.manifest)?;
        }
        Ok(())
    }
}

impl fmt::Display for ComponentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.new_id)?;
        if self.id_changed() {
            write!(f, " (was #{})", self.old_id)?;
        }
        if let Some((old, new)) = self.kind {
            write!(f, " kind {old} -> {new}")?;
        }
        if self.child_count_delta != 0 {
            write!(f, " children {:+}", self.child_count_delta)?;
        }
        if self.text_changed {
            write!(f, " text")?;
        }
        if !self.properties.is_empty() {
            let keys: Vec<&str> = self.properties.iter().map(|k| k.name()).collect();
            write!(f, " properties [{}]", keys.join(", "))?;
        }
        Ok(())
    }
}

impl fmt::Display for ManifestChanges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "variables:")?;
        for name in &self.variables_added {
            writeln!(f, "  + {name}")?;
        }
        for name in &self.variables_removed {
            writeln!(f, "  - {name}")?;
        }
        for change in &self.variables_changed {
            write!(f, "  ~ {}", change.name)?;
            if change.type_changed() {
                write!(f, " type {} -> {}", change.old_type, change.new_type)?;
            }
            if change.value_changed {
                write!(f, " value")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "bindings:")?;
        for key in &self.bindings_added {
            writeln!(f, "  + {key}")?;
        }
        for key in &self.bindings_removed {
            writeln!(f, "  - {key}")?;
        }
        if !self.conditionals_added.is_empty() || !self.conditionals_removed.is_empty() {
            writeln!(f, "conditionals:")?;
            for key in &self.conditionals_added {
                writeln!(f, "  + {key}")?;
            }
            for key in &self.conditionals_removed {
                writeln!(f, "  - {key}")?;
            }
        }
        if !self.for_loops_added.is_empty() || !self.for_loops_removed.is_empty() {
            writeln!(f, "for-loops:")?;
            for key in &self.for_loops_added {
                writeln!(f, "  + {key}")?;
            }
            for key in &self.for_loops_removed {
                writeln!(f, "  - {key}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{} <- {} ({:?})",
            self.kind, self.component, self.variable, self.expression
        )
    }
}

impl fmt::Display for ConditionalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} if {:?} [{}]",
            self.component,
            self.condition,
            self.dependencies.join(", ")
        )
    }
}

impl fmt::Display for ForLoopKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} for {:?} <- {}",
            self.parent, self.collection, self.variable
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kir_ir::ReactiveValue;

    #[test]
    fn manifest_changes_by_name() {
        let mut old = ReactiveManifest::new();
        old.add_variable("a", VarType::Int, ReactiveValue::Int(1)).unwrap();
        old.add_variable("b", VarType::Bool, ReactiveValue::Bool(true))
            .unwrap();
        old.add_variable("gone", VarType::Int, ReactiveValue::Int(0))
            .unwrap();

        let mut new = ReactiveManifest::new();
        new.add_variable("b", VarType::Str, ReactiveValue::Str("x".into()))
            .unwrap();
        new.add_variable("a", VarType::Int, ReactiveValue::Int(1)).unwrap();
        new.add_variable("fresh", VarType::Float, ReactiveValue::Float(0.0))
            .unwrap();

        let changes = diff_manifests(&old, &new);
        assert_eq!(changes.variables_added, vec!["fresh".to_string()]);
        assert_eq!(changes.variables_removed, vec!["gone".to_string()]);
        assert_eq!(changes.variables_changed.len(), 1);
        assert!(changes.is_type_changed("b"));
        assert!(!changes.is_type_changed("a"));
    }

    #[test]
    fn bindings_match_across_variable_ids() {
        let mut old = ReactiveManifest::new();
        let x = old.add_variable("x", VarType::Int, ReactiveValue::Int(0)).unwrap();
        old.add_binding(ComponentId::from_raw(4), x, BindingKind::Text, "x")
            .unwrap();

        let mut new = ReactiveManifest::new();
        new.add_variable("pad", VarType::Int, ReactiveValue::Int(0)).unwrap();
        let x = new.add_variable("x", VarType::Int, ReactiveValue::Int(0)).unwrap();
        new.add_binding(ComponentId::from_raw(4), x, BindingKind::Text, "x")
            .unwrap();
        new.add_binding(ComponentId::from_raw(5), x, BindingKind::Conditional, "x > 0")
            .unwrap();

        let changes = diff_manifests(&old, &new);
        assert!(changes.bindings_removed.is_empty());
        assert_eq!(changes.bindings_added.len(), 1);
        assert_eq!(changes.bindings_added[0].kind, BindingKind::Conditional);
        assert_eq!(
            changes.bindings_added[0].to_string(),
            "conditional #5 <- x (\"x > 0\")"
        );
    }

    #[test]
    fn text_report_lists_changes() {
        let changes = ChangeSet {
            components: vec![ComponentChange {
                old_id: ComponentId::from_raw(3),
                new_id: ComponentId::from_raw(9),
                matched_by: MatchKind::Positional,
                kind: None,
                child_count_delta: -1,
                text_changed: true,
                properties: vec![PropertyKey::Width],
            }],
            added: vec![ComponentId::from_raw(10)],
            removed: vec![],
            manifest: ManifestChanges::default(),
            component_count_delta: 0,
        };
        assert_eq!(
            changes.to_string(),
            "components: +0\n  ~ #9 (was #3) children -1 text properties [width]\n  + #10\n"
        );
    }

    #[test]
    fn repeated_bindings_diff_in_order() {
        let mut old = ReactiveManifest::new();
        let x = old.add_variable("x", VarType::Int, ReactiveValue::Int(0)).unwrap();
        for raw in 0..200 {
            old.add_binding(ComponentId::from_raw(raw), x, BindingKind::Text, "x")
                .unwrap();
        }
        let mut new = old.clone();
        new.add_binding(ComponentId::from_raw(500), x, BindingKind::Text, "x")
            .unwrap();
        new.add_binding(ComponentId::from_raw(501), x, BindingKind::Text, "x")
            .unwrap();

        let changes = diff_manifests(&old, &new);
        assert!(changes.bindings_removed.is_empty());
        let added: Vec<u32> = changes
            .bindings_added
            .iter()
            .map(|k| k.component.as_raw())
            .collect();
        assert_eq!(added, vec![500, 501]);

        let back = diff_manifests(&new, &old);
        assert!(back.bindings_added.is_empty());
        assert_eq!(back.bindings_removed.len(), 2);
    }

    #[test]
    fn conditionals_and_loops_diff_by_name() {
        let mut old = ReactiveManifest::new();
        let shown = old
            .add_variable("shown", VarType::Bool, ReactiveValue::Bool(true))
            .unwrap();
        let items = old
            .add_variable("items", VarType::Str, ReactiveValue::Str("a,b".into()))
            .unwrap();
        old.add_conditional(ComponentId::from_raw(2), "shown", &[shown])
            .unwrap();
        old.add_for_loop(ComponentId::from_raw(3), "items", items)
            .unwrap();

        let mut new = ReactiveManifest::new();
        let items = new
            .add_variable("items", VarType::Str, ReactiveValue::Str("a,b".into()))
            .unwrap();
        let shown = new
            .add_variable("shown", VarType::Bool, ReactiveValue::Bool(false))
            .unwrap();
        let index = new
            .add_conditional(ComponentId::from_raw(2), "shown", &[shown])
            .unwrap();
        new.set_conditional_state(index, false, true).unwrap();
        new.add_for_loop(ComponentId::from_raw(7), "items", items)
            .unwrap();

        let changes = diff_manifests(&old, &new);
        assert!(changes.conditionals_added.is_empty());
        assert!(changes.conditionals_removed.is_empty());
        assert_eq!(changes.for_loops_added.len(), 1);
        assert_eq!(changes.for_loops_removed.len(), 1);
        assert_eq!(
            changes.to_string(),
            "variables:\n  ~ shown value\nbindings:\nfor-loops:\n  + #7 for \"items\" <- items\n  - #3 for \"items\" <- items\n"
        );
    }
}
