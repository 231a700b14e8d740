//! Typed component properties.
//!
//! Every [`PropertyKey`] carries a static description: its wire tag, the
//! [`PropertyCategory`] it belongs to, the [`ValueKind`] its value must have,
//! and optionally an enum domain or a numeric range. The codec uses the tag and
//! value kind, the validator the domain and range, and readers fall back to
//! [`PropertyKey::default_value`] for keys a document does not set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The group a property belongs to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyCategory {
    /// Size, spacing and flow.
    Layout,
    /// Fonts and text layout.
    Typography,
    /// Colors, borders, visibility.
    Visual,
    /// Shadows and filters.
    Effect,
    /// Transitions and animations.
    Animation,
    /// Style overrides applied in an interaction state.
    PseudoState,
    /// Style overrides applied at a viewport breakpoint.
    Responsive,
    /// Non-style content such as link targets and placeholders.
    Content,
}

/// The kind of value a property holds, stored as a `u8` on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// One byte, 0 or 1.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
    /// Packed `0xRRGGBBAA`.
    Color,
    /// Unit plus 32-bit float.
    Dimension,
    /// Raw `u16` enum ordinal.
    Enum,
    /// Nested property map.
    Block,
}

impl ValueKind {
    /// Returns the wire tag.
    pub fn tag(self) -> u8 {
        match self {
            ValueKind::Bool => 0,
            ValueKind::Int => 1,
            ValueKind::Float => 2,
            ValueKind::Str => 3,
            ValueKind::Color => 4,
            ValueKind::Dimension => 5,
            ValueKind::Enum => 6,
            ValueKind::Block => 7,
        }
    }

    /// Maps a wire tag back to a value kind.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => ValueKind::Bool,
            1 => ValueKind::Int,
            2 => ValueKind::Float,
            3 => ValueKind::Str,
            4 => ValueKind::Color,
            5 => ValueKind::Dimension,
            6 => ValueKind::Enum,
            7 => ValueKind::Block,
            _ => return None,
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Color => "color",
            ValueKind::Dimension => "dimension",
            ValueKind::Enum => "enum",
            ValueKind::Block => "block",
        };
        f.write_str(name)
    }
}

/// The unit of a [`PropertyValue::Dimension`], stored as a `u8` on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum DimensionUnit {
    /// Device-independent pixels.
    Px,
    /// Percentage of the parent.
    Percent,
    /// Sized by the layout engine.
    Auto,
    /// Share of the remaining space.
    Flex,
    /// Percentage of viewport width.
    Vw,
    /// Percentage of viewport height.
    Vh,
    /// Multiple of the root font size.
    Rem,
    /// Multiple of the current font size.
    Em,
    /// A unit byte this version does not define.
    Undefined(u8),
}

impl DimensionUnit {
    /// Maps a wire byte to a unit.
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            0 => DimensionUnit::Px,
            1 => DimensionUnit::Percent,
            2 => DimensionUnit::Auto,
            3 => DimensionUnit::Flex,
            4 => DimensionUnit::Vw,
            5 => DimensionUnit::Vh,
            6 => DimensionUnit::Rem,
            7 => DimensionUnit::Em,
            other => DimensionUnit::Undefined(other),
        }
    }

    /// Returns the wire byte.
    pub fn tag(self) -> u8 {
        match self {
            DimensionUnit::Px => 0,
            DimensionUnit::Percent => 1,
            DimensionUnit::Auto => 2,
            DimensionUnit::Flex => 3,
            DimensionUnit::Vw => 4,
            DimensionUnit::Vh => 5,
            DimensionUnit::Rem => 6,
            DimensionUnit::Em => 7,
            DimensionUnit::Undefined(tag) => tag,
        }
    }
}

/// An inclusive numeric range a property value must fall within.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct NumericRange {
    /// Smallest allowed value.
    pub min: f64,
    /// Largest allowed value.
    pub max: f64,
}

impl NumericRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies within the range. NaN never does.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max.is_infinite() {
            write!(f, ">= {}", self.min)
        } else {
            write!(f, "{}..={}", self.min, self.max)
        }
    }
}

macro_rules! property_keys {
    ($($variant:ident = $tag:literal, $name:literal, $category:ident, $kind:ident;)*) => {
        /// A known property key, stored as a `u16` tag on the wire.
        ///
        /// Keys unknown to this version are skipped by the decoder and never
        /// appear in a [`PropertyMap`].
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum PropertyKey {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl PropertyKey {
            /// Every known key, in tag order.
            pub const ALL: &'static [PropertyKey] = &[$(PropertyKey::$variant,)*];

            /// Maps a wire tag to a key.
            pub fn from_tag(tag: u16) -> Option<Self> {
                match tag {
                    $($tag => Some(PropertyKey::$variant),)*
                    _ => None,
                }
            }

            /// Returns the wire tag.
            pub fn tag(self) -> u16 {
                match self {
                    $(PropertyKey::$variant => $tag,)*
                }
            }

            /// Returns the style-sheet style name.
            pub fn name(self) -> &'static str {
                match self {
                    $(PropertyKey::$variant => $name,)*
                }
            }

            /// Returns the category this key belongs to.
            pub fn category(self) -> PropertyCategory {
                match self {
                    $(PropertyKey::$variant => PropertyCategory::$category,)*
                }
            }

            /// Returns the value kind this key requires.
            pub fn value_kind(self) -> ValueKind {
                match self {
                    $(PropertyKey::$variant => ValueKind::$kind,)*
                }
            }
        }
    };
}

property_keys! {
    Width = 1, "width", Layout, Dimension;
    Height = 2, "height", Layout, Dimension;
    MinWidth = 3, "min-width", Layout, Dimension;
    MaxWidth = 4, "max-width", Layout, Dimension;
    MinHeight = 5, "min-height", Layout, Dimension;
    MaxHeight = 6, "max-height", Layout, Dimension;
    Padding = 7, "padding", Layout, Dimension;
    Margin = 8, "margin", Layout, Dimension;
    Gap = 9, "gap", Layout, Dimension;
    LayoutMode = 10, "display", Layout, Enum;
    AlignItems = 11, "align-items", Layout, Enum;
    JustifyContent = 12, "justify-content", Layout, Enum;
    Position = 13, "position", Layout, Enum;
    FlexGrow = 14, "flex-grow", Layout, Float;
    AspectRatio = 15, "aspect-ratio", Layout, Float;
    FontSize = 32, "font-size", Typography, Float;
    FontWeight = 33, "font-weight", Typography, Int;
    FontFamily = 34, "font-family", Typography, Str;
    LineHeight = 35, "line-height", Typography, Float;
    TextAlign = 36, "text-align", Typography, Enum;
    LetterSpacing = 37, "letter-spacing", Typography, Float;
    Background = 64, "background", Visual, Color;
    Color = 65, "color", Visual, Color;
    BorderColor = 66, "border-color", Visual, Color;
    BorderWidth = 67, "border-width", Visual, Dimension;
    BorderRadius = 68, "border-radius", Visual, Dimension;
    Opacity = 69, "opacity", Visual, Float;
    Visible = 70, "visible", Visual, Bool;
    ZIndex = 71, "z-index", Visual, Int;
    BoxShadow = 96, "box-shadow", Effect, Str;
    Blur = 97, "blur", Effect, Float;
    TransitionDuration = 128, "transition-duration", Animation, Float;
    TransitionDelay = 129, "transition-delay", Animation, Float;
    AnimationName = 130, "animation-name", Animation, Str;
    Easing = 131, "easing", Animation, Enum;
    Hover = 160, "hover", PseudoState, Block;
    Active = 161, "active", PseudoState, Block;
    Focus = 162, "focus", PseudoState, Block;
    Disabled = 163, "disabled", PseudoState, Block;
    BreakpointSmall = 192, "breakpoint-sm", Responsive, Block;
    BreakpointMedium = 193, "breakpoint-md", Responsive, Block;
    BreakpointLarge = 194, "breakpoint-lg", Responsive, Block;
    Placeholder = 224, "placeholder", Content, Str;
    Src = 225, "src", Content, Str;
    Href = 226, "href", Content, Str;
    Alt = 227, "alt", Content, Str;
    Checked = 228, "checked", Content, Bool;
    Value = 229, "value", Content, Str;
}

impl PropertyKey {
    /// Number of defined ordinals for enum-valued keys; valid values are
    /// `0..domain`.
    pub fn enum_domain(self) -> Option<u16> {
        match self {
            // flex, inline-flex, grid, inline-grid, block, inline, inline-block, none
            PropertyKey::LayoutMode => Some(8),
            // start, center, end, stretch, space-between, space-around, space-evenly, baseline
            PropertyKey::AlignItems | PropertyKey::JustifyContent => Some(8),
            // static, relative, absolute, fixed, sticky
            PropertyKey::Position => Some(5),
            // left, right, center, justify
            PropertyKey::TextAlign => Some(4),
            PropertyKey::Easing => Some(12),
            _ => None,
        }
    }

    /// Hard range for numeric keys. Values outside it are invalid, not merely
    /// unusual.
    pub fn range(self) -> Option<NumericRange> {
        match self {
            PropertyKey::Opacity => Some(NumericRange::new(0.0, 1.0)),
            PropertyKey::FontWeight => Some(NumericRange::new(1.0, 1000.0)),
            PropertyKey::FlexGrow
            | PropertyKey::Blur
            | PropertyKey::LineHeight
            | PropertyKey::TransitionDuration
            | PropertyKey::TransitionDelay => Some(NumericRange::new(0.0, f64::INFINITY)),
            _ => None,
        }
    }

    /// The value a renderer assumes when a component does not set this key.
    pub fn default_value(self) -> PropertyValue {
        use PropertyKey::*;
        match self {
            Width | Height | MaxWidth | MaxHeight => PropertyValue::dimension(DimensionUnit::Auto, 0.0),
            MinWidth | MinHeight | Padding | Margin | Gap | BorderWidth | BorderRadius => {
                PropertyValue::dimension(DimensionUnit::Px, 0.0)
            }
            LayoutMode | AlignItems | JustifyContent | Position | TextAlign | Easing => {
                PropertyValue::Enum(0)
            }
            FlexGrow | AspectRatio | LetterSpacing | Blur | TransitionDuration
            | TransitionDelay => PropertyValue::Float(0.0),
            FontSize => PropertyValue::Float(16.0),
            LineHeight => PropertyValue::Float(1.2),
            Opacity => PropertyValue::Float(1.0),
            FontWeight => PropertyValue::Int(400),
            ZIndex => PropertyValue::Int(0),
            Background | BorderColor => PropertyValue::Color(0x0000_0000),
            Color => PropertyValue::Color(0x0000_00FF),
            Visible => PropertyValue::Bool(true),
            Checked => PropertyValue::Bool(false),
            FontFamily | BoxShadow | AnimationName | Placeholder | Src | Href | Alt | Value => {
                PropertyValue::Str(String::new())
            }
            Hover | Active | Focus | Disabled | BreakpointSmall | BreakpointMedium
            | BreakpointLarge => PropertyValue::Block(PropertyMap::new()),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed property value.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub enum PropertyValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Owned string.
    Str(String),
    /// Packed `0xRRGGBBAA` color.
    Color(u32),
    /// Length with a unit.
    Dimension {
        /// The unit.
        unit: DimensionUnit,
        /// The magnitude.
        value: f32,
    },
    /// Raw enum ordinal, checked against [`PropertyKey::enum_domain`] by the validator.
    Enum(u16),
    /// Nested style variant for pseudo-states and breakpoints.
    Block(PropertyMap),
}

impl PropertyValue {
    /// Shorthand for a [`PropertyValue::Dimension`].
    pub fn dimension(unit: DimensionUnit, value: f32) -> Self {
        PropertyValue::Dimension { unit, value }
    }

    /// Shorthand for a pixel dimension.
    pub fn px(value: f32) -> Self {
        Self::dimension(DimensionUnit::Px, value)
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            PropertyValue::Bool(_) => ValueKind::Bool,
            PropertyValue::Int(_) => ValueKind::Int,
            PropertyValue::Float(_) => ValueKind::Float,
            PropertyValue::Str(_) => ValueKind::Str,
            PropertyValue::Color(_) => ValueKind::Color,
            PropertyValue::Dimension { .. } => ValueKind::Dimension,
            PropertyValue::Enum(_) => ValueKind::Enum,
            PropertyValue::Block(_) => ValueKind::Block,
        }
    }

    /// Returns the value as a float for range checks, if it is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Dimension { value, .. } => Some(f64::from(*value)),
            _ => None,
        }
    }

    /// Compares two values, treating floats as equal only when their bit
    /// patterns are, so NaN equals itself and `0.0` differs from `-0.0`.
    pub fn bitwise_eq(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Float(a), PropertyValue::Float(b)) => a.to_bits() == b.to_bits(),
            (
                PropertyValue::Dimension { unit: ua, value: va },
                PropertyValue::Dimension { unit: ub, value: vb },
            ) => ua == ub && va.to_bits() == vb.to_bits(),
            (PropertyValue::Block(a), PropertyValue::Block(b)) => a.bitwise_eq(b),
            (a, b) => a == b,
        }
    }
}

/// An ordered list of properties, at most one value per key.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct PropertyMap {
    entries: Vec<(PropertyKey, PropertyValue)>,
}

impl PropertyMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property. An existing value for the same key is replaced in
    /// place and returned, keeping the original position.
    pub fn insert(&mut self, key: PropertyKey, value: PropertyValue) -> Option<PropertyValue> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, key: PropertyKey, value: PropertyValue) -> Self {
        self.insert(key, value);
        self
    }

    /// Returns the value set for `key`, if any.
    pub fn get(&self, key: PropertyKey) -> Option<&PropertyValue> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Returns the value set for `key`, or the key's default.
    pub fn value_or_default(&self, key: PropertyKey) -> PropertyValue {
        self.get(key).cloned().unwrap_or_else(|| key.default_value())
    }

    /// Removes and returns the value for `key`.
    pub fn remove(&mut self, key: PropertyKey) -> Option<PropertyValue> {
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Iterates over the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = PropertyKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no property is set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Order-sensitive comparison using [`PropertyValue::bitwise_eq`].
    pub fn bitwise_eq(&self, other: &PropertyMap) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|((ka, va), (kb, vb))| ka == kb && va.bitwise_eq(vb))
    }
}

impl FromIterator<(PropertyKey, PropertyValue)> for PropertyMap {
    fn from_iter<T: IntoIterator<Item = (PropertyKey, PropertyValue)>>(iter: T) -> Self {
        let mut map = PropertyMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}
