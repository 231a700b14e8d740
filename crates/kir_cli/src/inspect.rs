//! `kir inspect`: prints what an encoded document contains.
//!
//! The header and section table come from a frame scan, so they are shown
//! even when a section body fails to decode.

use std::fmt::Write as _;
use std::path::Path;

use kir_codec::{scan, FormatError, ManifestStatus, SectionKind};
use kir_ir::Document;
use serde::Serialize;

use crate::{GlobalArgs, InspectArgs, ReportFormat};

/// Runs the `kir inspect` command.
///
/// Returns exit code 0 if the document decodes, 1 otherwise.
pub fn run(args: &InspectArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.file);
    let bytes = std::fs::read(path)?;
    let inspection = inspect(&bytes)?;

    match args.format {
        ReportFormat::Text => print!("{}", render_text(&inspection, !args.no_tree)),
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&inspection)?),
    }

    if let Some(err) = &inspection.decode_error {
        if !global.quiet {
            eprintln!("error: {} does not decode: {err}", path.display());
        }
        return Ok(1);
    }
    Ok(0)
}

/// Everything `inspect` reports about one document.
#[derive(Debug, Serialize)]
pub struct Inspection {
    /// Format version from the header.
    pub version: u16,
    /// Header flags.
    pub flags: u16,
    /// Declared total length in bytes.
    pub total_length: u64,
    /// Section frames in file order.
    pub sections: Vec<SectionSummary>,
    /// Manifest outcome: `intact`, `absent` or `degraded: <reason>`.
    pub manifest_status: Option<String>,
    /// Properties the decoder skipped.
    pub skipped_properties: usize,
    /// Extension sections the decoder skipped.
    pub skipped_sections: usize,
    /// Components in preorder, when the tree decoded.
    pub components: Vec<ComponentSummary>,
    /// Reactive variables, when the manifest decoded.
    pub variables: Vec<VariableSummary>,
    /// Bindings as `kind #component <- variable`.
    pub bindings: Vec<String>,
    /// Entries in the conditional table.
    pub conditionals: usize,
    /// Entries in the for-loop table.
    pub for_loops: usize,
    /// Manifest version counter.
    pub manifest_version: Option<u32>,
    /// Why decoding failed, if it did.
    pub decode_error: Option<String>,
}

/// One section frame.
#[derive(Debug, Serialize)]
pub struct SectionSummary {
    /// `tree`, `manifest` or `extension`.
    pub kind: &'static str,
    /// Raw tag byte.
    pub tag: u8,
    /// Offset of the frame from the start of the file.
    pub offset: usize,
    /// Body length in bytes.
    pub len: usize,
    /// Whether the stored checksum matched.
    pub checksum_ok: bool,
}

/// One component, flattened.
#[derive(Debug, Serialize)]
pub struct ComponentSummary {
    /// Stable component id.
    pub id: u32,
    /// Kind name.
    pub kind: String,
    /// Depth in the tree (root is 1).
    pub depth: usize,
    /// Number of properties set.
    pub properties: usize,
    /// Text content.
    pub text: Option<String>,
}

/// One reactive variable.
#[derive(Debug, Serialize)]
pub struct VariableSummary {
    /// Variable name.
    pub name: String,
    /// Declared type.
    pub var_type: String,
    /// Current value.
    pub value: String,
    /// Per-variable version.
    pub version: u32,
}

/// Scans and decodes `bytes`. Only an unreadable header or broken framing
/// is an error; a body that fails to decode is recorded in
/// [`Inspection::decode_error`].
pub fn inspect(bytes: &[u8]) -> Result<Inspection, FormatError> {
    let frames = scan(bytes, true)?;
    let mut inspection = Inspection {
        version: frames.header.version,
        flags: frames.header.flags,
        total_length: frames.header.total_length,
        sections: frames
            .sections
            .iter()
            .map(|s| SectionSummary {
                kind: match s.kind() {
                    SectionKind::Tree => "tree",
                    SectionKind::Manifest => "manifest",
                    SectionKind::Extension(_) => "extension",
                },
                tag: s.tag,
                offset: s.frame_offset,
                len: s.body_len,
                checksum_ok: s.checksum_ok,
            })
            .collect(),
        manifest_status: None,
        skipped_properties: 0,
        skipped_sections: 0,
        components: Vec::new(),
        variables: Vec::new(),
        bindings: Vec::new(),
        conditionals: 0,
        for_loops: 0,
        manifest_version: None,
        decode_error: None,
    };

    match kir_codec::decode(bytes) {
        Ok(decoded) => {
            inspection.manifest_status = Some(match &decoded.manifest_status {
                ManifestStatus::Intact => "intact".to_string(),
                ManifestStatus::Absent => "absent".to_string(),
                ManifestStatus::Degraded(err) => format!("degraded: {err}"),
            });
            inspection.skipped_properties = decoded.stats.skipped_properties;
            inspection.skipped_sections = decoded.stats.skipped_sections;
            fill_document(&mut inspection, &decoded.document);
        }
        Err(err) => inspection.decode_error = Some(err.to_string()),
    }
    Ok(inspection)
}

fn fill_document(inspection: &mut Inspection, document: &Document) {
    let tree = document.tree();
    inspection.components = tree
        .preorder_with_depth()
        .into_iter()
        .filter_map(|(slot, depth)| {
            let node = tree.node(slot)?;
            Some(ComponentSummary {
                id: node.id.as_raw(),
                kind: node.kind.to_string(),
                depth,
                properties: node.properties.len(),
                text: node.text.clone(),
            })
        })
        .collect();

    let manifest = document.manifest();
    inspection.manifest_version = Some(manifest.version());
    inspection.variables = manifest
        .variables()
        .iter()
        .map(|v| VariableSummary {
            name: v.name.clone(),
            var_type: v.var_type.to_string(),
            value: v.value.to_string(),
            version: v.version,
        })
        .collect();
    inspection.bindings = manifest
        .bindings()
        .iter()
        .map(|b| {
            let name = manifest
                .variable(b.variable)
                .map_or_else(|| format!("${}", b.variable), |v| v.name.clone());
            format!("{} #{} <- {name}", b.kind, b.component)
        })
        .collect();
    inspection.conditionals = manifest.conditionals().len();
    inspection.for_loops = manifest.for_loops().len();
}

/// Renders an inspection as indented text.
pub fn render_text(inspection: &Inspection, with_tree: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "version {} flags {:#06x} length {}",
        inspection.version, inspection.flags, inspection.total_length
    );
    let _ = writeln!(out, "sections:");
    for s in &inspection.sections {
        let _ = writeln!(
            out,
            "  {:<9} tag {:>3} @{:<6} {} bytes{}",
            s.kind,
            s.tag,
            s.offset,
            s.len,
            if s.checksum_ok { "" } else { " (checksum mismatch)" }
        );
    }
    if let Some(err) = &inspection.decode_error {
        let _ = writeln!(out, "decode failed: {err}");
        return out;
    }
    if let Some(status) = &inspection.manifest_status {
        let _ = writeln!(out, "manifest: {status}");
    }
    if inspection.skipped_properties > 0 || inspection.skipped_sections > 0 {
        let _ = writeln!(
            out,
            "skipped: {} properties, {} sections",
            inspection.skipped_properties, inspection.skipped_sections
        );
    }

    let _ = writeln!(out, "components: {}", inspection.components.len());
    if with_tree {
        for c in &inspection.components {
            let indent = "  ".repeat(c.depth);
            let _ = write!(out, "{indent}#{} {}", c.id, c.kind);
            if c.properties > 0 {
                let _ = write!(out, " [{} props]", c.properties);
            }
            if let Some(text) = &c.text {
                let _ = write!(out, " {text:?}");
            }
            out.push('\n');
        }
    }

    if let Some(version) = inspection.manifest_version {
        let _ = writeln!(
            out,
            "variables: {} (manifest version {version})",
            inspection.variables.len()
        );
        for v in &inspection.variables {
            let _ = writeln!(out, "  {}: {} = {} (v{})", v.name, v.var_type, v.value, v.version);
        }
        let _ = writeln!(out, "bindings: {}", inspection.bindings.len());
        for b in &inspection.bindings {
            let _ = writeln!(out, "  {b}");
        }
        if inspection.conditionals > 0 || inspection.for_loops > 0 {
            let _ = writeln!(
                out,
                "tables: {} conditionals, {} for-loops",
                inspection.conditionals, inspection.for_loops
            );
        }
    }
    out
}
