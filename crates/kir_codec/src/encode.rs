//! Document encoding.

use crate::error::EncodeError;
use crate::header::{write_header, HeaderInfo, FORMAT_VERSION, HEADER_LEN};
use crate::manifest::encode_manifest;
use crate::section::{write_section, FRAME_LEN, MANIFEST_SECTION, TREE_SECTION};
use crate::tree::encode_tree;
use crate::wire::{len_u32, Writer};
use kir_ir::{ComponentId, ComponentTree, Document, ReactiveManifest};
use std::collections::HashMap;

/// A property record written verbatim, for keys or value types the data
/// model does not know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProperty {
    /// Wire key tag.
    pub key: u16,
    /// Wire value type tag.
    pub value_type: u8,
    /// Payload bytes.
    pub payload: Vec<u8>,
}

/// Configurable document encoder.
///
/// [`encode`] covers the common case. The builder additionally lets tooling
/// write an older format version, attach extension properties to components,
/// or add extension sections, which is how newer producers look to this
/// reader.
pub struct Encoder<'a> {
    tree: &'a ComponentTree,
    manifest: &'a ReactiveManifest,
    version: u16,
    extra_properties: HashMap<ComponentId, Vec<RawProperty>>,
    extra_sections: Vec<(u8, Vec<u8>)>,
}

impl<'a> Encoder<'a> {
    /// Creates an encoder for the current format version.
    pub fn new(tree: &'a ComponentTree, manifest: &'a ReactiveManifest) -> Self {
        Self {
            tree,
            manifest,
            version: FORMAT_VERSION,
            extra_properties: HashMap::new(),
            extra_sections: Vec::new(),
        }
    }

    /// Creates an encoder for a document.
    pub fn for_document(document: &'a Document) -> Self {
        Self::new(document.tree(), document.manifest())
    }

    /// Sets the format version written to the header. Version 1 omits the
    /// manifest section.
    pub fn format_version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Appends a raw property record to the component with `id`.
    pub fn extension_property(mut self, id: ComponentId, property: RawProperty) -> Self {
        self.extra_properties.entry(id).or_default().push(property);
        self
    }

    /// Appends an extension section after the tree section.
    pub fn extension_section(mut self, tag: u8, body: Vec<u8>) -> Self {
        self.extra_sections.push((tag, body));
        self
    }

    /// Produces the encoded document.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.version == 0 {
            return Err(EncodeError::UnsupportedVersion(self.version));
        }
        let with_manifest = self.version >= 2;
        if !with_manifest && !self.manifest.is_empty() {
            return Err(EncodeError::ManifestNotSupported {
                version: self.version,
            });
        }

        let mut sections: Vec<(u8, Vec<u8>)> = Vec::with_capacity(2 + self.extra_sections.len());
        sections.push((TREE_SECTION, encode_tree(self.tree, &self.extra_properties)?));
        for (tag, body) in &self.extra_sections {
            if *tag == TREE_SECTION || *tag == MANIFEST_SECTION {
                return Err(EncodeError::ReservedSectionTag(*tag));
            }
            sections.push((*tag, body.clone()));
        }
        if with_manifest {
            sections.push((MANIFEST_SECTION, encode_manifest(self.manifest)?));
        }

        let total = HEADER_LEN
            + sections
                .iter()
                .map(|(_, body)| FRAME_LEN + body.len())
                .sum::<usize>();
        let mut w = Writer::new();
        write_header(
            &mut w,
            &HeaderInfo {
                version: self.version,
                flags: 0,
                total_length: total as u64,
                section_count: len_u32(sections.len(), "section list")?,
            },
        );
        for (tag, body) in &sections {
            write_section(&mut w, *tag, body)?;
        }
        let bytes = w.into_inner();
        tracing::trace!(bytes = bytes.len(), sections = sections.len(), "encoded document");
        Ok(bytes)
    }
}

/// Encodes a tree and manifest with the current format version.
pub fn encode(tree: &ComponentTree, manifest: &ReactiveManifest) -> Result<Vec<u8>, EncodeError> {
    Encoder::new(tree, manifest).encode()
}

/// Encodes a document with the current format version.
pub fn encode_document(document: &Document) -> Result<Vec<u8>, EncodeError> {
    Encoder::for_document(document).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::parse_header;
    use kir_ir::{ComponentKind, ComponentNode, ReactiveValue, VarType};

    fn tree() -> ComponentTree {
        let mut tree = ComponentTree::new();
        tree.set_root(ComponentNode::new(ComponentId::from_raw(1), ComponentKind::Container));
        tree
    }

    #[test]
    fn header_matches_output() {
        let bytes = encode(&tree(), &ReactiveManifest::new()).unwrap();
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.version, FORMAT_VERSION);
        assert_eq!(header.section_count, 2);
        assert_eq!(header.total_length, bytes.len() as u64);
    }

    #[test]
    fn version_one_omits_manifest() {
        let t = tree();
        let m = ReactiveManifest::new();
        let bytes = Encoder::new(&t, &m).format_version(1).encode().unwrap();
        assert_eq!(parse_header(&bytes).unwrap().section_count, 1);
    }

    #[test]
    fn version_one_rejects_manifest_content() {
        let t = tree();
        let mut m = ReactiveManifest::new();
        m.add_variable("x", VarType::Int, ReactiveValue::Int(0)).unwrap();
        assert_eq!(
            Encoder::new(&t, &m).format_version(1).encode(),
            Err(EncodeError::ManifestNotSupported { version: 1 })
        );
        assert_eq!(
            Encoder::new(&t, &m).format_version(0).encode(),
            Err(EncodeError::UnsupportedVersion(0))
        );
    }

    #[test]
    fn reserved_extension_tags_rejected() {
        let t = tree();
        let m = ReactiveManifest::new();
        let result = Encoder::new(&t, &m)
            .extension_section(MANIFEST_SECTION, vec![])
            .encode();
        assert_eq!(result, Err(EncodeError::ReservedSectionTag(MANIFEST_SECTION)));
    }

    #[test]
    fn encoding_is_deterministic() {
        let t = tree();
        let m = ReactiveManifest::new();
        assert_eq!(encode(&t, &m).unwrap(), encode(&t, &m).unwrap());
    }
}
