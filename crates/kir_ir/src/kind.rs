//! Component kind tags.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! component_kinds {
    ($($variant:ident = $tag:literal => $name:literal,)*) => {
        /// The type of a component, stored as a `u16` tag on the wire.
        ///
        /// Tags this version does not know decode to [`ComponentKind::Unknown`]
        /// so that a document produced by a newer compiler still loads.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum ComponentKind {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
            /// A tag not known to this version.
            Unknown(u16),
        }

        impl ComponentKind {
            /// Every known kind, in tag order.
            pub const KNOWN: &'static [ComponentKind] = &[$(ComponentKind::$variant,)*];

            /// Maps a wire tag to a kind.
            pub fn from_tag(tag: u16) -> Self {
                match tag {
                    $($tag => ComponentKind::$variant,)*
                    other => ComponentKind::Unknown(other),
                }
            }

            /// Returns the wire tag.
            pub fn tag(self) -> u16 {
                match self {
                    $(ComponentKind::$variant => $tag,)*
                    ComponentKind::Unknown(tag) => tag,
                }
            }

            /// Returns the lowercase display name, or `"unknown"`.
            pub fn name(self) -> &'static str {
                match self {
                    $(ComponentKind::$variant => $name,)*
                    ComponentKind::Unknown(_) => "unknown",
                }
            }
        }
    };
}

component_kinds! {
    Container = 0 => "container",
    Row = 1 => "row",
    Column = 2 => "column",
    Center = 3 => "center",
    Text = 4 => "text",
    Heading = 5 => "heading",
    Paragraph = 6 => "paragraph",
    Span = 7 => "span",
    Link = 8 => "link",
    Button = 9 => "button",
    Input = 10 => "input",
    Checkbox = 11 => "checkbox",
    Dropdown = 12 => "dropdown",
    Image = 13 => "image",
    Canvas = 14 => "canvas",
    List = 15 => "list",
    ListItem = 16 => "list-item",
    Table = 17 => "table",
    TableRow = 18 => "table-row",
    TableCell = 19 => "table-cell",
    TabGroup = 20 => "tab-group",
    TabBar = 21 => "tab-bar",
    Tab = 22 => "tab",
    TabPanel = 23 => "tab-panel",
    ForEach = 24 => "for-each",
    Markdown = 25 => "markdown",
    Modal = 26 => "modal",
    NativeCanvas = 27 => "native-canvas",
}

impl ComponentKind {
    /// Returns `true` unless this is [`ComponentKind::Unknown`].
    pub fn is_known(self) -> bool {
        !matches!(self, ComponentKind::Unknown(_))
    }

    /// Returns `true` if components of this kind render their text content.
    pub fn can_show_text(self) -> bool {
        matches!(
            self,
            ComponentKind::Text
                | ComponentKind::Heading
                | ComponentKind::Paragraph
                | ComponentKind::Span
                | ComponentKind::Link
                | ComponentKind::Button
                | ComponentKind::Input
                | ComponentKind::Checkbox
                | ComponentKind::ListItem
                | ComponentKind::TableCell
                | ComponentKind::Tab
                | ComponentKind::Markdown
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Unknown(tag) => write!(f, "unknown({tag})"),
            known => f.write_str(known.name()),
        }
    }
}
