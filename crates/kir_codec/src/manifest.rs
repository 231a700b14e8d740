//! Manifest section body.
//!
//! ```text
//! body      version u32 | var count u32 | vars | binding count u32 | bindings
//! var       id u32 | name string | type u8 | value length u32 | value
//!           | version u32 | has_location u8 | [location string]
//! binding   component u32 | variable u32 | kind u8 | expression string
//! tables    [cond table | loop table]
//! table     byte length u32 | count u32 | entries
//! cond      component u32 | condition string | last_result u8
//!           | suspended u8 | dep count u32 | dep ids u32...
//! loop      parent u32 | collection string | variable u32
//! ```
//!
//! The two tables are written only when one of them is non-empty, so a
//! manifest without conditionals or loops keeps the shorter layout and
//! bodies that end after the bindings still decode.

use crate::error::{EncodeError, FormatError};
use crate::wire::{len_u32, Reader, Writer};
use kir_ir::{
    Binding, BindingKind, ComponentId, ReactiveConditional, ReactiveForLoop, ReactiveManifest,
    ReactiveValue, VarType, VariableDescriptor, VariableId,
};

const MIN_VARIABLE_LEN: usize = 4 + 4 + 1 + 4 + 4 + 1;
const MIN_BINDING_LEN: usize = 4 + 4 + 1 + 4;
const MIN_CONDITIONAL_LEN: usize = 4 + 4 + 1 + 1 + 4;
const MIN_FOR_LOOP_LEN: usize = 4 + 4 + 4;

pub(crate) fn encode_manifest(manifest: &ReactiveManifest) -> Result<Vec<u8>, EncodeError> {
    let mut w = Writer::new();
    w.u32(manifest.version());
    w.u32(len_u32(manifest.variables().len(), "variable list")?);
    for var in manifest.variables() {
        w.u32(var.id.as_raw());
        w.string(&var.name, "variable name")?;
        w.u8(var.var_type.tag());
        w.blob(&value_payload(&var.value), "variable value")?;
        w.u32(var.version);
        match &var.source_location {
            None => w.u8(0),
            Some(location) => {
                w.u8(1);
                w.string(location, "source location")?;
            }
        }
    }
    w.u32(len_u32(manifest.bindings().len(), "binding list")?);
    for binding in manifest.bindings() {
        w.u32(binding.component.as_raw());
        w.u32(binding.variable.as_raw());
        w.u8(binding.kind.tag());
        w.string(&binding.expression, "binding expression")?;
    }
    if !manifest.conditionals().is_empty() || !manifest.for_loops().is_empty() {
        w.blob(&encode_conditionals(manifest.conditionals())?, "conditional table")?;
        w.blob(&encode_for_loops(manifest.for_loops())?, "for-loop table")?;
    }
    Ok(w.into_inner())
}

fn encode_conditionals(conditionals: &[ReactiveConditional]) -> Result<Vec<u8>, EncodeError> {
    let mut w = Writer::new();
    w.u32(len_u32(conditionals.len(), "conditional list")?);
    for cond in conditionals {
        w.u32(cond.component.as_raw());
        w.string(&cond.condition, "condition")?;
        w.u8(u8::from(cond.last_result));
        w.u8(u8::from(cond.suspended));
        w.u32(len_u32(cond.dependencies.len(), "condition dependencies")?);
        for dep in &cond.dependencies {
            w.u32(dep.as_raw());
        }
    }
    Ok(w.into_inner())
}

fn encode_for_loops(for_loops: &[ReactiveForLoop]) -> Result<Vec<u8>, EncodeError> {
    let mut w = Writer::new();
    w.u32(len_u32(for_loops.len(), "for-loop list")?);
    for lp in for_loops {
        w.u32(lp.parent.as_raw());
        w.string(&lp.collection, "collection expression")?;
        w.u32(lp.variable.as_raw());
    }
    Ok(w.into_inner())
}

fn value_payload(value: &ReactiveValue) -> Vec<u8> {
    let mut w = Writer::new();
    match value {
        ReactiveValue::Int(v) => w.i64(*v),
        ReactiveValue::Float(v) => w.f64(*v),
        ReactiveValue::Str(v) | ReactiveValue::Custom(v) => w.bytes(v.as_bytes()),
        ReactiveValue::Bool(v) => w.u8(u8::from(*v)),
    }
    w.into_inner()
}

pub(crate) fn decode_manifest(mut r: Reader<'_>) -> Result<ReactiveManifest, FormatError> {
    let version = r.u32("manifest version")?;

    let count = u64::from(r.u32("variable count")?);
    let count = r.check_count(count, MIN_VARIABLE_LEN, "variables")?;
    let mut variables = Vec::with_capacity(count);
    for _ in 0..count {
        let id = VariableId::from_raw(r.u32("variable id")?);
        let name = r.string("variable name")?;
        let type_offset = r.offset();
        let type_tag = r.u8("variable type")?;
        let var_type = VarType::from_tag(type_tag).ok_or(FormatError::InvalidValue {
            offset: type_offset,
            context: "variable type",
            found: u64::from(type_tag),
        })?;
        let len = r.u32("variable value length")? as usize;
        let mut payload = r.sub(len, "variable value")?;
        let value = decode_value(&mut payload, var_type)?;
        payload.expect_end("variable value")?;
        let var_version = r.u32("variable version")?;
        let source_location = if r.flag("location flag")? {
            Some(r.string("source location")?)
        } else {
            None
        };
        variables.push(VariableDescriptor {
            id,
            name,
            var_type,
            value,
            version: var_version,
            source_location,
        });
    }

    let count = u64::from(r.u32("binding count")?);
    let count = r.check_count(count, MIN_BINDING_LEN, "bindings")?;
    let mut bindings = Vec::with_capacity(count);
    for _ in 0..count {
        let component = ComponentId::from_raw(r.u32("binding component")?);
        let variable = VariableId::from_raw(r.u32("binding variable")?);
        let kind_offset = r.offset();
        let kind_tag = r.u8("binding kind")?;
        let kind = BindingKind::from_tag(kind_tag).ok_or(FormatError::InvalidValue {
            offset: kind_offset,
            context: "binding kind",
            found: u64::from(kind_tag),
        })?;
        let expression = r.string("binding expression")?;
        bindings.push(Binding {
            component,
            variable,
            kind,
            expression,
        });
    }
    let manifest = ReactiveManifest::from_parts(version, variables, bindings);
    if r.remaining() == 0 {
        return Ok(manifest);
    }

    let len = r.u32("conditional table length")? as usize;
    let conditionals = decode_conditionals(r.sub(len, "conditional table")?)?;
    let len = r.u32("for-loop table length")? as usize;
    let for_loops = decode_for_loops(r.sub(len, "for-loop table")?)?;
    r.expect_end("manifest section")?;
    Ok(manifest.with_tables(conditionals, for_loops))
}

fn decode_conditionals(mut r: Reader<'_>) -> Result<Vec<ReactiveConditional>, FormatError> {
    let count = u64::from(r.u32("conditional count")?);
    let count = r.check_count(count, MIN_CONDITIONAL_LEN, "conditionals")?;
    let mut conditionals = Vec::with_capacity(count);
    for _ in 0..count {
        let component = ComponentId::from_raw(r.u32("conditional component")?);
        let condition = r.string("condition")?;
        let last_result = r.flag("conditional result")?;
        let suspended = r.flag("conditional suspended")?;
        let deps = u64::from(r.u32("dependency count")?);
        let deps = r.check_count(deps, 4, "condition dependencies")?;
        let mut dependencies = Vec::with_capacity(deps);
        for _ in 0..deps {
            dependencies.push(VariableId::from_raw(r.u32("dependency id")?));
        }
        conditionals.push(ReactiveConditional {
            component,
            condition,
            dependencies,
            last_result,
            suspended,
        });
    }
    r.expect_end("conditional table")?;
    Ok(conditionals)
}

fn decode_for_loops(mut r: Reader<'_>) -> Result<Vec<ReactiveForLoop>, FormatError> {
    let count = u64::from(r.u32("for-loop count")?);
    let count = r.check_count(count, MIN_FOR_LOOP_LEN, "for-loops")?;
    let mut for_loops = Vec::with_capacity(count);
    for _ in 0..count {
        let parent = ComponentId::from_raw(r.u32("for-loop parent")?);
        let collection = r.string("collection expression")?;
        let variable = VariableId::from_raw(r.u32("for-loop variable")?);
        for_loops.push(ReactiveForLoop {
            parent,
            collection,
            variable,
        });
    }
    r.expect_end("for-loop table")?;
    Ok(for_loops)
}

fn decode_value(r: &mut Reader<'_>, var_type: VarType) -> Result<ReactiveValue, FormatError> {
    Ok(match var_type {
        VarType::Int => ReactiveValue::Int(r.i64("int value")?),
        VarType::Float => ReactiveValue::Float(r.f64("float value")?),
        VarType::Bool => ReactiveValue::Bool(r.flag("bool value")?),
        VarType::Str => {
            let len = r.remaining();
            ReactiveValue::Str(r.utf8(len, "string value")?)
        }
        VarType::Custom => {
            let len = r.remaining();
            ReactiveValue::Custom(r.utf8(len, "custom value")?)
        }
    })
}
