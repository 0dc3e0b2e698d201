//! Rendering and writing compiled documents.
//!
//! Ordering is fixed so that compiling the same table twice gives
//! byte-identical output: sections in first-seen component order, then the
//! transport section; within a section the registries in the order
//! fields, outbound, inbound, files; within a registry insertion order.

use crate::document::{
    CouplerIn, CouplerOut, Document, FieldDefinition, FileDefinition, OutputFile, RestartFile,
    TransportSection,
};
use crate::errors::{CplError, CplResult};
use crate::section::ComponentSection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::info;

const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

impl FromStr for OutputFormat {
    type Err = CplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" => Ok(OutputFormat::Xml),
            "json" => Ok(OutputFormat::Json),
            other => Err(CplError::Config(format!("unknown output format '{other}'"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Xml => write!(f, "xml"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

pub fn render(document: &Document, format: OutputFormat) -> CplResult<String> {
    match format {
        OutputFormat::Xml => Ok(render_xml(document)),
        OutputFormat::Json => render_json(document),
    }
}

pub fn render_json(document: &Document) -> CplResult<String> {
    serde_json::to_string_pretty(document).map_err(|e| CplError::Serialization(e.to_string()))
}

/// Render the document as the XML configuration read by the coupling
/// library.
pub fn render_xml(document: &Document) -> String {
    let mut xml = XmlWriter::new();
    xml.open("simulation", &[]);
    for section in &document.sections {
        write_section(&mut xml, section);
    }
    write_transport(&mut xml, &document.transport);
    xml.close("simulation");
    xml.finish()
}

fn write_section(xml: &mut XmlWriter, section: &ComponentSection) {
    xml.open("context", &[("id", section.name.as_str())]);
    xml.empty(
        "calendar",
        &[
            ("type", section.calendar.calendar_type.as_str()),
            ("time_origin", section.calendar.time_origin.as_str()),
            ("start_date", section.calendar.start_date.as_str()),
        ],
    );

    xml.open("grid_definition", &[]);
    for grid in &section.grids {
        xml.open("grid", &[("id", grid.id.as_str())]);
        xml.open("domain", &[("id", grid.domain_id.as_str())]);
        xml.empty("generate_rectilinear_domain", &[]);
        xml.close("domain");
        xml.close("grid");
    }
    xml.close("grid_definition");

    xml.open("variable_definition", &[]);
    for variable in &section.variables {
        xml.text("variable", &[("id", variable.id.as_str())], &variable.value);
    }
    xml.close("variable_definition");

    xml.group("field_definition", section.fields.is_empty(), |xml| {
        for field in section.fields.iter() {
            write_field(xml, field);
        }
    });
    xml.group("coupler_out_definition", section.outbound.is_empty(), |xml| {
        for endpoint in section.outbound.iter() {
            write_coupler_out(xml, endpoint);
        }
    });
    xml.group("coupler_in_definition", section.inbound.is_empty(), |xml| {
        for endpoint in section.inbound.iter() {
            write_coupler_in(xml, endpoint);
        }
    });
    xml.group("file_definition", section.files.is_empty(), |xml| {
        for file in section.files.iter() {
            match file {
                FileDefinition::Restart(file) => write_restart_file(xml, file),
                FileDefinition::Output(file) => write_output_file(xml, file),
            }
        }
    });

    xml.close("context");
}

fn write_field(xml: &mut XmlWriter, field: &FieldDefinition) {
    match field {
        FieldDefinition::Sampled {
            id,
            grid_ref,
            operation,
            freq_op,
            freq_offset,
        } => xml.empty(
            "field",
            &[
                ("id", id.as_str()),
                ("grid_ref", grid_ref.as_str()),
                ("operation", operation.as_str()),
                ("freq_op", freq_op.to_string().as_str()),
                ("freq_offset", freq_offset.to_string().as_str()),
            ],
        ),
        FieldDefinition::Forwarded { id, field_ref } => {
            xml.empty("field", &[("id", id.as_str()), ("field_ref", field_ref.as_str())])
        }
    }
}

/// Endpoint contexts are addressed as `<component>::<context>`; each
/// component runs a single context named after itself.
fn context_ref(component: &str) -> String {
    format!("{component}::{component}")
}

fn write_coupler_out(xml: &mut XmlWriter, endpoint: &CouplerOut) {
    xml.open("coupler_out", &[("context", context_ref(&endpoint.partner).as_str())]);
    for field in endpoint.fields.iter() {
        let freq_op = field.freq_op.to_string();
        let mut attrs = vec![
            ("id", field.id.as_str()),
            ("field_ref", field.field_ref.as_str()),
            ("freq_op", freq_op.as_str()),
        ];
        if let Some(expr) = &field.expr {
            attrs.push(("expr", expr.as_str()));
        }
        xml.empty("field", &attrs);
    }
    xml.close("coupler_out");
}

fn write_coupler_in(xml: &mut XmlWriter, endpoint: &CouplerIn) {
    xml.open("coupler_in", &[("context", context_ref(&endpoint.partner).as_str())]);
    for field in endpoint.fields.iter() {
        xml.empty(
            "field",
            &[
                ("id", field.id.as_str()),
                ("grid_ref", field.grid_ref.as_str()),
                ("freq_op", field.freq_op.to_string().as_str()),
                ("freq_offset", field.freq_offset.to_string().as_str()),
                ("read_access", field.read_access.to_string().as_str()),
            ],
        );
    }
    xml.close("coupler_in");
}

fn write_restart_file(xml: &mut XmlWriter, file: &RestartFile) {
    xml.open(
        "file",
        &[
            ("id", file.id.as_str()),
            ("name", file.name.as_str()),
            ("enabled", file.enabled.to_string().as_str()),
            ("type", file.file_type.as_str()),
            ("output_freq", file.output_freq.to_string().as_str()),
            ("record_offset", file.record_offset.as_str()),
            ("mode", file.mode.as_str()),
        ],
    );
    for field in file.fields.iter() {
        xml.empty(
            "field",
            &[
                ("id", field.id.as_str()),
                ("name", field.name.as_str()),
                ("grid_ref", field.grid_ref.as_str()),
                ("operation", field.operation.as_str()),
                ("read_access", field.read_access.to_string().as_str()),
            ],
        );
    }
    xml.close("file");
}

fn write_output_file(xml: &mut XmlWriter, file: &OutputFile) {
    xml.open(
        "file",
        &[
            ("id", file.id.as_str()),
            ("name", file.name.as_str()),
            ("output_freq", file.output_freq.to_string().as_str()),
            ("type", file.file_type.as_str()),
            ("enabled", file.enabled.to_string().as_str()),
            ("append", file.append.to_string().as_str()),
        ],
    );
    xml.empty(
        "field",
        &[
            ("field_ref", file.field.field_ref.as_str()),
            ("name", file.field.name.as_str()),
        ],
    );
    xml.close("file");
}

fn write_transport(xml: &mut XmlWriter, transport: &TransportSection) {
    xml.open("context", &[("id", transport.id.as_str())]);
    xml.open("variable_definition", &[]);
    xml.open("variable_group", &[("id", transport.group_id.as_str())]);
    for variable in &transport.variables {
        xml.text(
            "variable",
            &[("id", variable.id.as_str()), ("type", variable.var_type.as_str())],
            &variable.value,
        );
    }
    xml.close("variable_group");
    xml.close("variable_definition");
    xml.close("context");
}

/// Minimal indented XML builder.
struct XmlWriter {
    out: String,
    depth: usize,
}

impl XmlWriter {
    fn new() -> Self {
        Self {
            out: String::from("<?xml version=\"1.0\" ?>\n"),
            depth: 0,
        }
    }

    fn start_tag(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.out.push_str(&INDENT.repeat(self.depth));
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            self.out.push_str(&escape(value));
            self.out.push('"');
        }
    }

    fn open(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs);
        self.out.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.out.push_str(&INDENT.repeat(self.depth));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) {
        self.start_tag(tag, attrs);
        self.out.push_str("/>\n");
    }

    fn text(&mut self, tag: &str, attrs: &[(&str, &str)], text: &str) {
        self.start_tag(tag, attrs);
        self.out.push('>');
        self.out.push_str(&escape(text));
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push_str(">\n");
    }

    /// A container element, collapsed to `<tag/>` when it has no children.
    fn group(&mut self, tag: &str, is_empty: bool, children: impl FnOnce(&mut Self)) {
        if is_empty {
            self.empty(tag, &[]);
        } else {
            self.open(tag, &[]);
            children(self);
            self.close(tag);
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, so the destination either keeps its previous contents or holds
/// the complete new document.
pub fn write_atomically(path: impl AsRef<Path>, contents: &str) -> CplResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir).map_err(|source| CplError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    staged.write_all(contents.as_bytes()).map_err(|source| CplError::Io {
        path: staged.path().to_path_buf(),
        source,
    })?;
    staged.persist(path).map_err(|e| CplError::Io {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    info!(path = %path.display(), bytes = contents.len(), "Wrote configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CouplingCompiler;
    use crate::table::{CouplingTable, TableRow};
    use tempfile::tempdir;

    fn compile_single() -> Document {
        let table = CouplingTable::from_rows(vec![TableRow::new("A", "u", "B", "v")]);
        CouplingCompiler::default()
            .compile(&table)
            .unwrap()
            .document
    }

    #[test]
    fn escapes_attribute_values() {
        assert_eq!(escape(r#"a<b & "c">'"#), "a&lt;b &amp; &quot;c&quot;&gt;&apos;");
    }

    #[test]
    fn renders_empty_document() {
        let document = CouplingCompiler::default()
            .compile(&CouplingTable::new())
            .unwrap()
            .document;
        let exp = r#"<?xml version="1.0" ?>
<simulation>
    <context id="xios">
        <variable_definition>
            <variable_group id="parameters">
                <variable id="print_file" type="bool">true</variable>
                <variable id="transport_protocol" type="string">p2p</variable>
            </variable_group>
        </variable_definition>
    </context>
</simulation>
"#;
        assert_eq!(render_xml(&document), exp);
    }

    #[test]
    fn renders_single_coupling() {
        let xml = render_xml(&compile_single());

        assert!(xml.contains(
            r#"<field id="u" grid_ref="grid_2D_A" operation="instant" freq_op="1ts" freq_offset="0ts"/>"#
        ));
        assert!(xml.contains(r#"<field id="v" field_ref="u_to_v"/>"#));
        assert!(xml.contains(r#"<coupler_out context="B::B">"#));
        assert!(xml.contains(
            r#"<field id="u_to_v" field_ref="u" freq_op="1ts" expr="@this_ref"/>"#
        ));
        assert!(xml.contains(r#"<field id="v_restart" field_ref="v_restart_read" freq_op="1y"/>"#));
        assert!(xml.contains(r#"<coupler_in context="A::A">"#));
        assert!(xml.contains(
            r#"<field id="u_to_v" grid_ref="grid_2D_A" freq_op="1ts" freq_offset="2ts" read_access="true"/>"#
        ));
        assert!(xml.contains(
            r#"<file id="zero_restart_file" name="zero_restart_file" enabled="true" type="one_file" output_freq="100000y" record_offset="0" mode="read">"#
        ));
        assert!(xml.contains(
            r#"<field id="v_restart_read" name="zero_restart" grid_ref="grid_2D_A" operation="instant" read_access="true"/>"#
        ));
        assert!(xml.contains(
            r#"<file id="u_to_v_next" name="u_to_v_next" output_freq="1d" type="one_file" enabled="true" append="false">"#
        ));
        // B has no sampled fields or outbound endpoints of its own
        assert!(xml.contains("<coupler_out_definition/>"));
        assert!(xml.contains("<coupler_in_definition/>"));
    }

    #[test]
    fn registries_in_fixed_order() {
        let xml = render_xml(&compile_single());
        let position = |tag: &str| xml.find(tag).unwrap();

        assert!(position("<field_definition>") < position("<coupler_out_definition>"));
        assert!(position("<coupler_out_definition>") < position("<coupler_in_definition"));
        assert!(position("<coupler_in_definition") < position("<file_definition>"));
        assert!(position(r#"<context id="A">"#) < position(r#"<context id="B">"#));
        assert!(position(r#"<context id="B">"#) < position(r#"<context id="xios">"#));
    }

    #[test]
    fn renders_json() {
        let json = render(&compile_single(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["sections"][0]["name"], "A");
        assert_eq!(value["sections"][0]["files"][0]["kind"], "restart");
        assert_eq!(value["sections"][0]["files"][1]["kind"], "output");
        assert_eq!(value["transport"]["id"], "xios");
    }

    #[test]
    fn parses_output_format() {
        assert_eq!("XML".parse::<OutputFormat>().unwrap(), OutputFormat::Xml);
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn atomic_write_replaces_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coupling_config.xml");

        std::fs::write(&path, "old").unwrap();
        write_atomically(&path, "new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("coupling_config.xml")]);
    }

    #[test]
    fn atomic_write_into_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.xml");

        let err = write_atomically(&path, "contents").unwrap_err();
        assert!(matches!(err, CplError::Io { .. }));
        assert!(!path.exists());
    }
}
