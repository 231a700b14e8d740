//! Tree section body.
//!
//! ```text
//! body      has_root u8 | [node]
//! node      kind u16 | id u32 | prop count u16 | props | has_text u8
//!           | [text string] | child count u32 | children
//! property  key u16 | value type u8 | payload length u32 | payload
//! ```

use crate::decode::DecodeStats;
use crate::encode::RawProperty;
use crate::error::{EncodeError, FormatError};
use crate::wire::{len_u16, len_u32, Reader, Writer};
use crate::MAX_NESTING;
use kir_ir::{
    ComponentId, ComponentKind, ComponentNode, ComponentTree, DimensionUnit, NodeIndex,
    PropertyKey, PropertyMap, PropertyValue, ValueKind,
};
use std::collections::HashMap;

const MIN_NODE_LEN: usize = 2 + 4 + 2 + 1 + 4;
const MIN_PROPERTY_LEN: usize = 2 + 1 + 4;

pub(crate) fn encode_tree(
    tree: &ComponentTree,
    extras: &HashMap<ComponentId, Vec<RawProperty>>,
) -> Result<Vec<u8>, EncodeError> {
    let mut w = Writer::new();
    match tree.root() {
        None => w.u8(0),
        Some(root) => {
            w.u8(1);
            let mut state = EncodeState {
                tree,
                extras,
                on_path: vec![false; tree.len()],
                done: vec![false; tree.len()],
            };
            state.node(&mut w, root, 1)?;
        }
    }
    Ok(w.into_inner())
}

struct EncodeState<'a> {
    tree: &'a ComponentTree,
    extras: &'a HashMap<ComponentId, Vec<RawProperty>>,
    on_path: Vec<bool>,
    done: Vec<bool>,
}

impl EncodeState<'_> {
    fn node(&mut self, w: &mut Writer, slot: NodeIndex, depth: usize) -> Result<(), EncodeError> {
        if depth > MAX_NESTING {
            return Err(EncodeError::NestingTooDeep { limit: MAX_NESTING });
        }
        let node = self
            .tree
            .node(slot)
            .ok_or(EncodeError::DanglingSlot { slot })?;
        let i = slot.as_raw() as usize;
        if self.on_path[i] {
            return Err(EncodeError::Cycle { component: node.id });
        }
        if self.done[i] {
            return Err(EncodeError::SharedNode { component: node.id });
        }
        self.on_path[i] = true;

        w.u16(node.kind.tag());
        w.u32(node.id.as_raw());
        let extras = self.extras.get(&node.id).map(Vec::as_slice).unwrap_or(&[]);
        w.u16(len_u16(node.properties.len() + extras.len(), "property list")?);
        write_properties(w, &node.properties, depth)?;
        for raw in extras {
            w.u16(raw.key);
            w.u8(raw.value_type);
            w.blob(&raw.payload, "property payload")?;
        }
        match &node.text {
            None => w.u8(0),
            Some(text) => {
                w.u8(1);
                w.string(text, "text")?;
            }
        }
        w.u32(len_u32(node.children.len(), "child list")?);
        for &child in &node.children {
            self.node(w, child, depth + 1)?;
        }

        self.on_path[i] = false;
        self.done[i] = true;
        Ok(())
    }
}

fn write_properties(w: &mut Writer, map: &PropertyMap, depth: usize) -> Result<(), EncodeError> {
    for (key, value) in map.iter() {
        let payload = value_payload(value, depth)?;
        w.u16(key.tag());
        w.u8(value.kind().tag());
        w.blob(&payload, "property payload")?;
    }
    Ok(())
}

fn value_payload(value: &PropertyValue, depth: usize) -> Result<Vec<u8>, EncodeError> {
    let mut w = Writer::new();
    match value {
        PropertyValue::Bool(v) => w.u8(u8::from(*v)),
        PropertyValue::Int(v) => w.i64(*v),
        PropertyValue::Float(v) => w.f64(*v),
        PropertyValue::Str(v) => w.bytes(v.as_bytes()),
        PropertyValue::Color(v) => w.u32(*v),
        PropertyValue::Dimension { unit, value } => {
            w.u8(unit.tag());
            w.f32(*value);
        }
        PropertyValue::Enum(v) => w.u16(*v),
        PropertyValue::Block(map) => {
            if depth + 1 > MAX_NESTING {
                return Err(EncodeError::NestingTooDeep { limit: MAX_NESTING });
            }
            w.u16(len_u16(map.len(), "property block")?);
            write_properties(&mut w, map, depth + 1)?;
        }
    }
    Ok(w.into_inner())
}

pub(crate) fn decode_tree(
    mut r: Reader<'_>,
    stats: &mut DecodeStats,
) -> Result<ComponentTree, FormatError> {
    let mut tree = ComponentTree::new();
    if r.flag("root flag")? {
        let root = decode_node(&mut r, 1, &mut tree, stats)?;
        tree.set_root_slot(Some(root));
    }
    r.expect_end("tree section")?;
    tree.reindex();
    Ok(tree)
}

fn decode_node(
    r: &mut Reader<'_>,
    depth: usize,
    tree: &mut ComponentTree,
    stats: &mut DecodeStats,
) -> Result<NodeIndex, FormatError> {
    if depth > MAX_NESTING {
        return Err(FormatError::NestingTooDeep { limit: MAX_NESTING });
    }
    let kind = ComponentKind::from_tag(r.u16("component kind")?);
    let id = ComponentId::from_raw(r.u32("component id")?);
    let prop_count = u64::from(r.u16("property count")?);
    let prop_count = r.check_count(prop_count, MIN_PROPERTY_LEN, "properties")?;
    let mut node = ComponentNode::new(id, kind);
    for _ in 0..prop_count {
        if let Some((key, value)) = decode_property(r, depth, stats)? {
            node.properties.insert(key, value);
        }
    }
    if r.flag("text flag")? {
        node.text = Some(r.string("text")?);
    }
    let child_count = u64::from(r.u32("child count")?);
    let child_count = r.check_count(child_count, MIN_NODE_LEN, "children")?;

    let slot = tree.alloc(node);
    let mut children = Vec::with_capacity(child_count);
    for _ in 0..child_count {
        children.push(decode_node(r, depth + 1, tree, stats)?);
    }
    if let Some(node) = tree.node_mut(slot) {
        node.children = children;
    }
    Ok(slot)
}

/// Reads one property record. Unknown keys and value types are skipped by
/// their payload length and counted.
fn decode_property(
    r: &mut Reader<'_>,
    depth: usize,
    stats: &mut DecodeStats,
) -> Result<Option<(PropertyKey, PropertyValue)>, FormatError> {
    let key_tag = r.u16("property key")?;
    let type_tag = r.u8("property value type")?;
    let len = r.u32("property payload length")? as usize;
    let mut payload = r.sub(len, "property payload")?;
    let (Some(key), Some(kind)) = (PropertyKey::from_tag(key_tag), ValueKind::from_tag(type_tag))
    else {
        stats.skipped_properties += 1;
        return Ok(None);
    };
    let value = decode_value(&mut payload, kind, depth, stats)?;
    payload.expect_end("property payload")?;
    Ok(Some((key, value)))
}

fn decode_value(
    r: &mut Reader<'_>,
    kind: ValueKind,
    depth: usize,
    stats: &mut DecodeStats,
) -> Result<PropertyValue, FormatError> {
    Ok(match kind {
        ValueKind::Bool => PropertyValue::Bool(r.flag("bool value")?),
        ValueKind::Int => PropertyValue::Int(r.i64("int value")?),
        ValueKind::Float => PropertyValue::Float(r.f64("float value")?),
        ValueKind::Str => {
            let len = r.remaining();
            PropertyValue::Str(r.utf8(len, "string value")?)
        }
        ValueKind::Color => PropertyValue::Color(r.u32("color value")?),
        ValueKind::Dimension => {
            let unit = DimensionUnit::from_tag(r.u8("dimension unit")?);
            let value = r.f32("dimension value")?;
            PropertyValue::Dimension { unit, value }
        }
        ValueKind::Enum => PropertyValue::Enum(r.u16("enum value")?),
        ValueKind::Block => {
            if depth + 1 > MAX_NESTING {
                return Err(FormatError::NestingTooDeep { limit: MAX_NESTING });
            }
            let count = u64::from(r.u16("block size")?);
            let count = r.check_count(count, MIN_PROPERTY_LEN, "block properties")?;
            let mut map = PropertyMap::new();
            for _ in 0..count {
                if let Some((key, value)) = decode_property(r, depth + 1, stats)? {
                    map.insert(key, value);
                }
            }
            PropertyValue::Block(map)
        }
    })
}
