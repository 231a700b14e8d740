//! Carry-over of reactive values into a freshly compiled manifest.

use crate::changes::diff_manifests;
use kir_ir::ReactiveManifest;
use serde::Serialize;

/// The reconciled manifest and what happened to each variable.
#[derive(Clone, Debug)]
pub struct Reconciled {
    /// The new manifest with surviving values restored.
    pub manifest: ReactiveManifest,
    /// Per-variable outcome.
    pub report: ReconcileReport,
}

/// Variable names grouped by outcome, in new-manifest order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Present in both manifests with the same type; old value copied.
    pub restored: Vec<String>,
    /// Present in both with a different type; new initial value kept.
    pub type_changed: Vec<String>,
    /// Only in the new manifest.
    pub fresh: Vec<String>,
    /// Conditionals whose last result and suspension were carried over.
    pub conditionals_restored: usize,
}

/// Copies the value of every variable that survived from `old` into a copy
/// of `new`.
///
/// Variables are matched by name. A restored variable is written through
/// [`ReactiveManifest::set_value`], so its version and the manifest version
/// advance. Conditional state is carried over for conditionals with the same
/// component and condition. `old` is not referenced by the result.
pub fn reconcile(old: &ReactiveManifest, new: &ReactiveManifest) -> Reconciled {
    let changes = diff_manifests(old, new);
    let mut manifest = new.clone();
    let mut report = ReconcileReport::default();

    for var in new.variables() {
        let Some(prev) = old.find_variable(&var.name) else {
            report.fresh.push(var.name.clone());
            continue;
        };
        if changes.is_type_changed(&var.name) {
            report.type_changed.push(var.name.clone());
            continue;
        }
        match manifest.set_value(var.id, prev.value.clone()) {
            Ok(()) => report.restored.push(var.name.clone()),
            Err(err) => {
                tracing::warn!(name = %var.name, %err, "could not restore variable");
                report.type_changed.push(var.name.clone());
            }
        }
    }
    for (index, cond) in new.conditionals().iter().enumerate() {
        let Some(prev) = old
            .conditionals()
            .iter()
            .find(|c| c.component == cond.component && c.condition == cond.condition)
        else {
            continue;
        };
        if prev.last_result == cond.last_result && prev.suspended == cond.suspended {
            continue;
        }
        if manifest
            .set_conditional_state(index, prev.last_result, prev.suspended)
            .is_ok()
        {
            report.conditionals_restored += 1;
        }
    }
    tracing::debug!(
        restored = report.restored.len(),
        conditionals = report.conditionals_restored,
        type_changed = report.type_changed.len(),
        fresh = report.fresh.len(),
        "manifest reconciled"
    );
    Reconciled { manifest, report }
}
