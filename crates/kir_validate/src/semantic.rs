//! Semantic tier: property values and binding compatibility.

use crate::codes;
use crate::options::ValidationOptions;
use kir_diagnostics::{Diagnostic, DiagnosticCode};
use kir_ir::{
    BindingKind, ComponentKind, DimensionUnit, Document, PropertyKey, PropertyValue, VarType,
};

const MAX_PLAUSIBLE_PIXELS: f32 = 100_000.0;
const MAX_TEXT_BYTES: usize = 1_000_000;

/// Checks every node's kind, text and properties, then every variable and
/// binding. Plausibility advisories are reported only when
/// [`ValidationOptions::plausibility`] is set.
pub fn check_semantics(document: &Document, options: &ValidationOptions) -> Vec<Diagnostic> {
    let plausibility = options.plausibility;
    let mut diags = Vec::new();
    let tree = document.tree();
    for (_, node) in tree.iter() {
        let id = node.id.as_raw();
        if let ComponentKind::Unknown(tag) = node.kind {
            diags.push(
                Diagnostic::advisory(codes::UNKNOWN_KIND, format!("unknown component kind {tag}"))
                    .with_component(id)
                    .with_note("it will render as a plain container"),
            );
        }
        if let Some(text) = node.text.as_ref().filter(|_| plausibility) {
            if text.len() > MAX_TEXT_BYTES {
                diags.push(
                    Diagnostic::advisory(
                        codes::OVERSIZED_TEXT,
                        format!("text content is {} bytes long", text.len()),
                    )
                    .with_component(id),
                );
            }
        }
        for (key, value) in node.properties.iter() {
            check_property(key, value, id, false, plausibility, &mut diags);
        }
    }

    let manifest = document.manifest();
    for var in manifest.variables() {
        if var.value.var_type() != var.var_type {
            diags.push(Diagnostic::fatal(
                codes::VARIABLE_VALUE_TYPE,
                format!(
                    "variable '{}' is declared {} but holds a {} value",
                    var.name,
                    var.var_type,
                    var.value.var_type()
                ),
            ));
        }
    }
    for binding in manifest.bindings() {
        let component = binding.component.as_raw();
        let var_type = manifest.variable(binding.variable).map(|v| v.var_type);
        match binding.kind {
            BindingKind::ForEach => {
                if let Some(ty) = var_type.filter(|ty| *ty != VarType::Custom) {
                    diags.push(
                        Diagnostic::fatal(
                            codes::FOR_EACH_TYPE,
                            format!("for-each binding iterates a {ty} variable"),
                        )
                        .with_component(component)
                        .with_help("for-each bindings need a custom (collection) variable"),
                    );
                }
            }
            BindingKind::Text => {
                let kind = tree
                    .find(binding.component)
                    .and_then(|slot| tree.node(slot))
                    .map(|n| n.kind);
                if let Some(kind) = kind.filter(|k| k.is_known() && !k.can_show_text()) {
                    diags.push(
                        Diagnostic::advisory(
                            codes::TEXT_BINDING_TARGET,
                            format!("text binding on a {kind}, which shows no text"),
                        )
                        .with_component(component),
                    );
                }
            }
            BindingKind::Conditional | BindingKind::Attribute | BindingKind::Custom => {}
        }
    }
    diags
}

fn check_property(
    key: PropertyKey,
    value: &PropertyValue,
    component: u32,
    in_block: bool,
    plausibility: bool,
    diags: &mut Vec<Diagnostic>,
) {
    let fatal = |code: DiagnosticCode, message: String| {
        Diagnostic::fatal(code, message).with_component(component)
    };
    let advisory = |code: DiagnosticCode, message: String| {
        Diagnostic::advisory(code, message).with_component(component)
    };

    if value.kind() != key.value_kind() {
        diags.push(fatal(
            codes::VALUE_KIND_MISMATCH,
            format!("{key} expects a {} value, found {}", key.value_kind(), value.kind()),
        ));
        return;
    }

    match value {
        PropertyValue::Enum(ordinal) => {
            if let Some(domain) = key.enum_domain().filter(|d| ordinal >= d) {
                diags.push(fatal(
                    codes::ENUM_OUT_OF_DOMAIN,
                    format!("{key} value {ordinal} is outside 0..{domain}"),
                ));
            }
        }
        PropertyValue::Dimension { unit, value } => {
            if let DimensionUnit::Undefined(tag) = unit {
                diags.push(fatal(
                    codes::UNDEFINED_UNIT,
                    format!("{key} uses undefined unit {tag}"),
                ));
            }
            if !value.is_finite() {
                diags.push(fatal(codes::NON_FINITE, format!("{key} is {value}")));
                return;
            }
            match unit {
                _ if !plausibility => {}
                DimensionUnit::Px if !(0.0..=MAX_PLAUSIBLE_PIXELS).contains(value) => {
                    diags.push(advisory(
                        codes::IMPLAUSIBLE_PIXELS,
                        format!("{key} of {value}px is unusual"),
                    ));
                }
                DimensionUnit::Percent if !(0.0..=100.0).contains(value) => {
                    diags.push(advisory(
                        codes::IMPLAUSIBLE_PERCENT,
                        format!("{key} of {value}% is unusual"),
                    ));
                }
                _ => {}
            }
        }
        PropertyValue::Float(v) if !v.is_finite() => {
            diags.push(fatal(codes::NON_FINITE, format!("{key} is {v}")));
            return;
        }
        PropertyValue::Block(map) => {
            if in_block {
                diags.push(advisory(
                    codes::NESTED_BLOCK,
                    format!("{key} block is nested inside another block"),
                ));
            }
            for (inner_key, inner_value) in map.iter() {
                check_property(inner_key, inner_value, component, true, plausibility, diags);
            }
        }
        _ => {}
    }

    if let (Some(range), Some(number)) = (key.range(), value.as_number()) {
        if !range.contains(number) {
            diags.push(fatal(
                codes::OUT_OF_RANGE,
                format!("{key} value {number} is outside {range}"),
            ));
        }
    }
    match (key, value) {
        _ if !plausibility => {}
        (PropertyKey::FontSize, PropertyValue::Float(size)) if !(1.0..=1000.0).contains(size) => {
            diags.push(advisory(
                codes::IMPLAUSIBLE_FONT_SIZE,
                format!("font size {size} is unusual"),
            ));
        }
        (PropertyKey::AspectRatio, PropertyValue::Float(ratio)) if *ratio < 0.0 => {
            diags.push(advisory(
                codes::NEGATIVE_ASPECT_RATIO,
                format!("aspect ratio {ratio} is negative"),
            ));
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kir_ir::{
        ComponentId, ComponentNode, ComponentTree, PropertyMap, ReactiveManifest, ReactiveValue,
        VariableDescriptor, VariableId,
    };

    fn doc_with(props: Vec<(PropertyKey, PropertyValue)>) -> Document {
        let mut node = ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Container);
        for (key, value) in props {
            node.properties.insert(key, value);
        }
        let mut tree = ComponentTree::new();
        tree.set_root(node);
        Document::new(tree, ReactiveManifest::new())
    }

    fn findings(doc: &Document) -> Vec<(DiagnosticCode, bool)> {
        check_semantics(doc, &ValidationOptions::default())
            .iter()
            .map(|d| (d.code, d.is_fatal()))
            .collect()
    }

    #[test]
    fn valid_properties_are_clean() {
        let doc = doc_with(vec![
            (PropertyKey::Width, PropertyValue::px(200.0)),
            (PropertyKey::Opacity, PropertyValue::Float(0.5)),
            (PropertyKey::FontWeight, PropertyValue::Int(700)),
            (PropertyKey::LayoutMode, PropertyValue::Enum(2)),
            (PropertyKey::TransitionDuration, PropertyValue::Float(150.0)),
        ]);
        assert!(findings(&doc).is_empty());
    }

    #[test]
    fn value_kind_mismatch_is_fatal() {
        let doc = doc_with(vec![(PropertyKey::Opacity, PropertyValue::Str("high".into()))]);
        assert_eq!(findings(&doc), vec![(codes::VALUE_KIND_MISMATCH, true)]);
    }

    #[test]
    fn ranges_are_fatal() {
        let doc = doc_with(vec![
            (PropertyKey::Opacity, PropertyValue::Float(1.5)),
            (PropertyKey::FontWeight, PropertyValue::Int(0)),
            (PropertyKey::TransitionDelay, PropertyValue::Float(-1.0)),
        ]);
        assert_eq!(
            findings(&doc),
            vec![
                (codes::OUT_OF_RANGE, true),
                (codes::OUT_OF_RANGE, true),
                (codes::OUT_OF_RANGE, true)
            ]
        );
    }

    #[test]
    fn enum_domain_and_unit() {
        let doc = doc_with(vec![
            (PropertyKey::LayoutMode, PropertyValue::Enum(8)),
            (
                PropertyKey::Height,
                PropertyValue::dimension(DimensionUnit::Undefined(40), 10.0),
            ),
        ]);
        assert_eq!(
            findings(&doc),
            vec![(codes::ENUM_OUT_OF_DOMAIN, true), (codes::UNDEFINED_UNIT, true)]
        );
    }

    #[test]
    fn plausibility_is_advisory() {
        let doc = doc_with(vec![
            (PropertyKey::Width, PropertyValue::px(250_000.0)),
            (
                PropertyKey::Height,
                PropertyValue::dimension(DimensionUnit::Percent, 140.0),
            ),
            (PropertyKey::FontSize, PropertyValue::Float(2000.0)),
            (PropertyKey::AspectRatio, PropertyValue::Float(-1.0)),
        ]);
        assert_eq!(
            findings(&doc),
            vec![
                (codes::IMPLAUSIBLE_PIXELS, false),
                (codes::IMPLAUSIBLE_PERCENT, false),
                (codes::IMPLAUSIBLE_FONT_SIZE, false),
                (codes::NEGATIVE_ASPECT_RATIO, false)
            ]
        );

        let quiet = ValidationOptions {
            plausibility: false,
            ..ValidationOptions::default()
        };
        assert!(check_semantics(&doc, &quiet).is_empty());
    }

    #[test]
    fn plausibility_off_keeps_fatal_checks() {
        let (mut tree, manifest) = doc_with(vec![
            (PropertyKey::Width, PropertyValue::px(250_000.0)),
            (PropertyKey::Opacity, PropertyValue::Float(1.5)),
        ])
        .into_parts();
        let root = tree.root().unwrap();
        tree.node_mut(root).unwrap().text = Some("x".repeat(MAX_TEXT_BYTES + 1));
        let doc = Document::new(tree, manifest);
        let options = ValidationOptions {
            plausibility: false,
            ..ValidationOptions::default()
        };
        let found: Vec<_> = check_semantics(&doc, &options).iter().map(|d| d.code).collect();
        assert_eq!(found, vec![codes::OUT_OF_RANGE]);
        assert!(findings(&doc).contains(&(codes::OVERSIZED_TEXT, false)));
    }

    #[test]
    fn non_finite_is_fatal() {
        let doc = doc_with(vec![
            (PropertyKey::LineHeight, PropertyValue::Float(f64::NAN)),
            (PropertyKey::Width, PropertyValue::px(f32::INFINITY)),
        ]);
        assert_eq!(
            findings(&doc),
            vec![(codes::NON_FINITE, true), (codes::NON_FINITE, true)]
        );
    }

    #[test]
    fn blocks_are_checked_recursively() {
        let inner = PropertyMap::new().with(PropertyKey::Opacity, PropertyValue::Float(3.0));
        let nested = PropertyMap::new().with(PropertyKey::Focus, PropertyValue::Block(inner));
        let doc = doc_with(vec![(PropertyKey::Hover, PropertyValue::Block(nested))]);
        assert_eq!(
            findings(&doc),
            vec![(codes::NESTED_BLOCK, false), (codes::OUT_OF_RANGE, true)]
        );
    }

    #[test]
    fn unknown_kind_and_long_text() {
        let mut tree = ComponentTree::new();
        tree.set_root(
            ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Unknown(300))
                .with_text("x".repeat(MAX_TEXT_BYTES + 1)),
        );
        let doc = Document::new(tree, ReactiveManifest::new());
        assert_eq!(
            findings(&doc),
            vec![(codes::UNKNOWN_KIND, false), (codes::OVERSIZED_TEXT, false)]
        );
    }

    #[test]
    fn binding_compatibility() {
        let mut tree = ComponentTree::new();
        let root = tree.set_root(ComponentNode::new(
            ComponentId::from_raw(1),
            ComponentKind::Image,
        ));
        tree.add_child(
            root,
            ComponentNode::new(ComponentId::from_raw(2), ComponentKind::List),
        )
        .unwrap();
        let mut manifest = ReactiveManifest::new();
        let count = manifest
            .add_variable("count", VarType::Int, ReactiveValue::Int(0))
            .unwrap();
        let items = manifest
            .add_variable("items", VarType::Custom, ReactiveValue::Custom("[]".into()))
            .unwrap();
        manifest
            .add_binding(ComponentId::from_raw(1), count, BindingKind::Text, "count")
            .unwrap();
        manifest
            .add_binding(ComponentId::from_raw(2), count, BindingKind::ForEach, "count")
            .unwrap();
        manifest
            .add_binding(ComponentId::from_raw(2), items, BindingKind::ForEach, "items")
            .unwrap();
        let doc = Document::new(tree, manifest);
        assert_eq!(
            findings(&doc),
            vec![(codes::TEXT_BINDING_TARGET, false), (codes::FOR_EACH_TYPE, true)]
        );
    }

    #[test]
    fn variable_value_type_mismatch() {
        let var = VariableDescriptor {
            id: VariableId::from_raw(1),
            name: "n".into(),
            var_type: VarType::Int,
            value: ReactiveValue::Bool(true),
            version: 0,
            source_location: None,
        };
        let mut tree = ComponentTree::new();
        tree.set_root(ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Row));
        let doc = Document::new(tree, ReactiveManifest::from_parts(1, vec![var], vec![]));
        assert_eq!(findings(&doc), vec![(codes::VARIABLE_VALUE_TYPE, true)]);
    }
}
