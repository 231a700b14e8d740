//! The reactive manifest: named variables and their bindings to components.
//!
//! All mutation goes through methods that type-check and bump the manifest
//! version. Strings are always owned, so a manifest never borrows from the
//! front end that produced it.

use crate::error::ManifestError;
use crate::ids::{ComponentId, VariableId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The declared type of a reactive variable, stored as a `u8` on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VarType {
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
    /// Boolean.
    Bool,
    /// Opaque collection-like value, JSON text in practice.
    Custom,
}

impl VarType {
    /// Returns the wire tag.
    pub fn tag(self) -> u8 {
        match self {
            VarType::Int => 0,
            VarType::Float => 1,
            VarType::Str => 2,
            VarType::Bool => 3,
            VarType::Custom => 4,
        }
    }

    /// Maps a wire tag to a type.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => VarType::Int,
            1 => VarType::Float,
            2 => VarType::Str,
            3 => VarType::Bool,
            4 => VarType::Custom,
            _ => return None,
        })
    }

    /// The zero value of this type.
    pub fn default_value(self) -> ReactiveValue {
        match self {
            VarType::Int => ReactiveValue::Int(0),
            VarType::Float => ReactiveValue::Float(0.0),
            VarType::Str => ReactiveValue::Str(String::new()),
            VarType::Bool => ReactiveValue::Bool(false),
            VarType::Custom => ReactiveValue::Custom("null".to_string()),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::Str => "string",
            VarType::Bool => "bool",
            VarType::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// The current value of a reactive variable.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ReactiveValue {
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    Str(String),
    /// Boolean value.
    Bool(bool),
    /// Opaque serialized value.
    Custom(String),
}

impl ReactiveValue {
    /// Returns the type of this value.
    pub fn var_type(&self) -> VarType {
        match self {
            ReactiveValue::Int(_) => VarType::Int,
            ReactiveValue::Float(_) => VarType::Float,
            ReactiveValue::Str(_) => VarType::Str,
            ReactiveValue::Bool(_) => VarType::Bool,
            ReactiveValue::Custom(_) => VarType::Custom,
        }
    }

    /// Compares floats by bit pattern, everything else by value.
    pub fn bitwise_eq(&self, other: &ReactiveValue) -> bool {
        match (self, other) {
            (ReactiveValue::Float(a), ReactiveValue::Float(b)) => a.to_bits() == b.to_bits(),
            (a, b) => a == b,
        }
    }
}

impl fmt::Display for ReactiveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactiveValue::Int(v) => write!(f, "{v}"),
            ReactiveValue::Float(v) => write!(f, "{v}"),
            ReactiveValue::Str(v) => write!(f, "{v:?}"),
            ReactiveValue::Bool(v) => write!(f, "{v}"),
            ReactiveValue::Custom(v) => f.write_str(v),
        }
    }
}

/// A declared reactive variable.
#[derive(Clone, PartialEq, Debug)]
pub struct VariableDescriptor {
    /// Manifest-unique id.
    pub id: VariableId,
    /// Source-level name.
    pub name: String,
    /// Declared type.
    pub var_type: VarType,
    /// Current value.
    pub value: ReactiveValue,
    /// Incremented on every change to this variable.
    pub version: u32,
    /// Where the variable was declared, as `file:line`.
    pub source_location: Option<String>,
}

/// How a binding applies a variable to its component.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BindingKind {
    /// Replaces the component's text.
    Text,
    /// Shows or hides the component.
    Conditional,
    /// Drives a property.
    Attribute,
    /// Repeats the component once per collection element.
    ForEach,
    /// Handled by a runtime extension.
    Custom,
}

impl BindingKind {
    /// Returns the wire tag.
    pub fn tag(self) -> u8 {
        match self {
            BindingKind::Text => 0,
            BindingKind::Conditional => 1,
            BindingKind::Attribute => 2,
            BindingKind::ForEach => 3,
            BindingKind::Custom => 4,
        }
    }

    /// Maps a wire tag to a kind.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => BindingKind::Text,
            1 => BindingKind::Conditional,
            2 => BindingKind::Attribute,
            3 => BindingKind::ForEach,
            4 => BindingKind::Custom,
            _ => return None,
        })
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingKind::Text => "text",
            BindingKind::Conditional => "conditional",
            BindingKind::Attribute => "attribute",
            BindingKind::ForEach => "for-each",
            BindingKind::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A link from a variable to a component.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Binding {
    /// The bound component.
    pub component: ComponentId,
    /// The bound variable.
    pub variable: VariableId,
    /// How the variable is applied.
    pub kind: BindingKind,
    /// Source expression, kept verbatim.
    pub expression: String,
}

/// A component shown only while its condition holds.
///
/// `last_result` and `suspended` are runtime state and survive a reload
/// when the same component keeps the same condition.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReactiveConditional {
    /// The guarded component.
    pub component: ComponentId,
    /// Condition expression, kept verbatim.
    pub condition: String,
    /// Variables the condition reads.
    pub dependencies: Vec<VariableId>,
    /// Result of the most recent evaluation.
    pub last_result: bool,
    /// Evaluation is paused.
    pub suspended: bool,
}

/// A component whose children are generated from a collection variable.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ReactiveForLoop {
    /// The component that receives the generated children.
    pub parent: ComponentId,
    /// Collection expression, kept verbatim.
    pub collection: String,
    /// The variable holding the collection.
    pub variable: VariableId,
}

/// Variables, bindings, conditionals, for-loops and a version counter.
#[derive(Clone, Debug)]
pub struct ReactiveManifest {
    variables: Vec<VariableDescriptor>,
    bindings: Vec<Binding>,
    conditionals: Vec<ReactiveConditional>,
    for_loops: Vec<ReactiveForLoop>,
    version: u32,
    next_id: u32,
    by_name: HashMap<String, usize>,
}

impl Default for ReactiveManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ReactiveManifest {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
            && self.variables == other.variables
            && self.bindings == other.bindings
            && self.conditionals == other.conditionals
            && self.for_loops == other.for_loops
    }
}

impl ReactiveManifest {
    /// Creates an empty manifest at version 0.
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            bindings: Vec::new(),
            conditionals: Vec::new(),
            for_loops: Vec::new(),
            version: 0,
            next_id: 1,
            by_name: HashMap::new(),
        }
    }

    /// Assembles a manifest from decoded parts without checking them.
    ///
    /// Duplicate names or ids and dangling bindings are left for the
    /// structure validator to report; name lookups resolve to the first
    /// variable with that name.
    pub fn from_parts(
        version: u32,
        variables: Vec<VariableDescriptor>,
        bindings: Vec<Binding>,
    ) -> Self {
        let next_id = variables
            .iter()
            .map(|v| v.id.as_raw())
            .max()
            .map_or(1, |max| max.saturating_add(1));
        let mut by_name = HashMap::with_capacity(variables.len());
        for (slot, var) in variables.iter().enumerate() {
            by_name.entry(var.name.clone()).or_insert(slot);
        }
        Self {
            variables,
            bindings,
            conditionals: Vec::new(),
            for_loops: Vec::new(),
            version,
            next_id,
            by_name,
        }
    }

    /// Attaches decoded conditional and for-loop tables, unchecked like
    /// [`from_parts`](Self::from_parts).
    pub fn with_tables(
        mut self,
        conditionals: Vec<ReactiveConditional>,
        for_loops: Vec<ReactiveForLoop>,
    ) -> Self {
        self.conditionals = conditionals;
        self.for_loops = for_loops;
        self
    }

    /// Declares a variable, or returns the id of an existing one with the
    /// same name and type.
    ///
    /// Re-declaring with the same type does not change the stored value or
    /// the version. Re-declaring with a different type fails with
    /// [`ManifestError::ConflictingType`].
    pub fn add_variable(
        &mut self,
        name: &str,
        var_type: VarType,
        initial: ReactiveValue,
    ) -> Result<VariableId, ManifestError> {
        if name.is_empty() {
            return Err(ManifestError::EmptyName);
        }
        if let Some(existing) = self.find_variable(name) {
            if existing.var_type != var_type {
                return Err(ManifestError::ConflictingType {
                    name: name.to_string(),
                    existing: existing.var_type,
                    requested: var_type,
                });
            }
            return Ok(existing.id);
        }
        if initial.var_type() != var_type {
            return Err(ManifestError::TypeMismatch {
                name: name.to_string(),
                expected: var_type,
                found: initial.var_type(),
            });
        }
        if self.next_id == u32::MAX {
            return Err(ManifestError::IdsExhausted);
        }
        let id = VariableId::from_raw(self.next_id);
        self.next_id += 1;
        self.by_name.insert(name.to_string(), self.variables.len());
        self.variables.push(VariableDescriptor {
            id,
            name: name.to_string(),
            var_type,
            value: initial,
            version: 0,
            source_location: None,
        });
        self.bump();
        Ok(id)
    }

    /// Binds `variable` to `component`. The variable must exist; the
    /// component is not checked here.
    pub fn add_binding(
        &mut self,
        component: ComponentId,
        variable: VariableId,
        kind: BindingKind,
        expression: &str,
    ) -> Result<(), ManifestError> {
        if self.variable(variable).is_none() {
            return Err(ManifestError::UnknownVariable(variable));
        }
        self.bindings.push(Binding {
            component,
            variable,
            kind,
            expression: expression.to_string(),
        });
        self.bump();
        Ok(())
    }

    /// Guards `component` with `condition`. Every dependency must exist.
    /// Returns the conditional's position in [`conditionals`](Self::conditionals).
    pub fn add_conditional(
        &mut self,
        component: ComponentId,
        condition: &str,
        dependencies: &[VariableId],
    ) -> Result<usize, ManifestError> {
        if let Some(&missing) = dependencies.iter().find(|&&id| self.variable(id).is_none()) {
            return Err(ManifestError::UnknownVariable(missing));
        }
        self.conditionals.push(ReactiveConditional {
            component,
            condition: condition.to_string(),
            dependencies: dependencies.to_vec(),
            last_result: false,
            suspended: false,
        });
        self.bump();
        Ok(self.conditionals.len() - 1)
    }

    /// Records the outcome of evaluating conditional `index`.
    pub fn set_conditional_state(
        &mut self,
        index: usize,
        last_result: bool,
        suspended: bool,
    ) -> Result<(), ManifestError> {
        let cond = self
            .conditionals
            .get_mut(index)
            .ok_or(ManifestError::UnknownConditional(index))?;
        cond.last_result = last_result;
        cond.suspended = suspended;
        self.bump();
        Ok(())
    }

    /// Generates the children of `parent` from `variable`, which must exist.
    pub fn add_for_loop(
        &mut self,
        parent: ComponentId,
        collection: &str,
        variable: VariableId,
    ) -> Result<(), ManifestError> {
        if self.variable(variable).is_none() {
            return Err(ManifestError::UnknownVariable(variable));
        }
        self.for_loops.push(ReactiveForLoop {
            parent,
            collection: collection.to_string(),
            variable,
        });
        self.bump();
        Ok(())
    }

    /// Replaces a variable's value. The value must match the declared type.
    pub fn set_value(&mut self, id: VariableId, value: ReactiveValue) -> Result<(), ManifestError> {
        let var = self.variable_mut(id)?;
        if value.var_type() != var.var_type {
            return Err(ManifestError::TypeMismatch {
                name: var.name.clone(),
                expected: var.var_type,
                found: value.var_type(),
            });
        }
        var.value = value;
        var.version = var.version.wrapping_add(1);
        self.bump();
        Ok(())
    }

    /// Records where a variable was declared.
    pub fn set_source_location(
        &mut self,
        id: VariableId,
        location: impl Into<String>,
    ) -> Result<(), ManifestError> {
        let var = self.variable_mut(id)?;
        var.source_location = Some(location.into());
        var.version = var.version.wrapping_add(1);
        self.bump();
        Ok(())
    }

    /// Looks a variable up by name.
    pub fn find_variable(&self, name: &str) -> Option<&VariableDescriptor> {
        self.by_name.get(name).and_then(|&slot| self.variables.get(slot))
    }

    /// Looks a variable up by id.
    pub fn variable(&self, id: VariableId) -> Option<&VariableDescriptor> {
        self.variables.iter().find(|v| v.id == id)
    }

    /// All variables in declaration order.
    pub fn variables(&self) -> &[VariableDescriptor] {
        &self.variables
    }

    /// All bindings in declaration order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// All conditionals in declaration order.
    pub fn conditionals(&self) -> &[ReactiveConditional] {
        &self.conditionals
    }

    /// All for-loops in declaration order.
    pub fn for_loops(&self) -> &[ReactiveForLoop] {
        &self.for_loops
    }

    /// Bindings that target `component`.
    pub fn bindings_for_component(
        &self,
        component: ComponentId,
    ) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.component == component)
    }

    /// Bindings that read `variable`.
    pub fn bindings_for_variable(&self, variable: VariableId) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(move |b| b.variable == variable)
    }

    /// The manifest version, bumped by every successful mutation.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns `true` if nothing at all is declared.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
            && self.bindings.is_empty()
            && self.conditionals.is_empty()
            && self.for_loops.is_empty()
    }

    fn variable_mut(&mut self, id: VariableId) -> Result<&mut VariableDescriptor, ManifestError> {
        self.variables
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(ManifestError::UnknownVariable(id))
    }

    fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}
