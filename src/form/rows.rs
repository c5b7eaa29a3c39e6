//! Declarative templates for the repeated form sections.
//!
//! Each row kind lists its fields once; rendering, required-field checks and
//! live previews are all driven from these tables.

use askama_escape::{escape, Html};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowKind {
    Equation,
    Definition,
    Assumption,
    Dependency,
    DerivationStep,
    Reference,
    Contributor,
    SupersededBy,
    KeyInsight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Multiline,
    Number,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub input: InputKind,
}

const fn field(name: &'static str, label: &'static str, required: bool, input: InputKind) -> FieldSpec {
    FieldSpec { name, label, required, input }
}

#[derive(Debug)]
pub struct RowTemplate {
    pub kind: RowKind,
    /// Container id of the section on the page.
    pub section_id: &'static str,
    /// Row header, followed by the display index.
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    /// Field whose value is typeset as a live math preview.
    pub preview_field: Option<&'static str>,
    /// Empty rows added by `populate` when the array is absent.
    pub min_rows: usize,
}

use InputKind::{Multiline, Number, Text};

static TEMPLATES: &[RowTemplate] = &[
    RowTemplate {
        kind: RowKind::Equation,
        section_id: "equations-container",
        title: "Equation",
        fields: &[
            field("id", "ID", true, Text),
            field("equation", "Equation (AsciiMath)", true, Text),
            field("equation_title", "Title", false, Text),
        ],
        preview_field: Some("equation"),
        min_rows: 1,
    },
    RowTemplate {
        kind: RowKind::Definition,
        section_id: "definitions-container",
        title: "Definition",
        fields: &[
            field("symbol", "Symbol", true, Text),
            field("definition", "Definition", true, Multiline),
        ],
        preview_field: None,
        min_rows: 1,
    },
    RowTemplate {
        kind: RowKind::Assumption,
        section_id: "assumptions-container",
        title: "Assumption",
        fields: &[field("text", "Assumption text or global id", true, Text)],
        preview_field: None,
        min_rows: 0,
    },
    RowTemplate {
        kind: RowKind::Dependency,
        section_id: "dependencies-container",
        title: "Dependency",
        fields: &[field("entry_id", "Entry ID", true, Text)],
        preview_field: None,
        min_rows: 0,
    },
    RowTemplate {
        kind: RowKind::DerivationStep,
        section_id: "derivation-container",
        title: "Step",
        fields: &[
            field("step", "Step", true, Number),
            field("description", "Description", true, Multiline),
            field("equation", "Equation (AsciiMath)", true, Text),
            field("equation_proven", "Proves equation", false, Text),
            field("assumptions", "Assumptions (comma-separated)", false, Text),
        ],
        preview_field: Some("equation"),
        min_rows: 0,
    },
    RowTemplate {
        kind: RowKind::Reference,
        section_id: "references-container",
        title: "Reference",
        fields: &[
            field("id", "ID", false, Text),
            field("citation", "Citation", true, Multiline),
        ],
        preview_field: None,
        min_rows: 1,
    },
    RowTemplate {
        kind: RowKind::Contributor,
        section_id: "contributors-container",
        title: "Contributor",
        fields: &[
            field("full_name", "Full name", true, Text),
            field("identifier", "Identifier (ORCID, website)", true, Text),
        ],
        preview_field: None,
        min_rows: 0,
    },
    RowTemplate {
        kind: RowKind::SupersededBy,
        section_id: "superseded-by-container",
        title: "Superseded by",
        fields: &[field("entry_id", "Entry ID", true, Text)],
        preview_field: None,
        min_rows: 0,
    },
    RowTemplate {
        kind: RowKind::KeyInsight,
        section_id: "key-insights-container",
        title: "Key insight",
        fields: &[field("text", "Insight", true, Multiline)],
        preview_field: None,
        min_rows: 0,
    },
];

impl RowKind {
    pub const ALL: [RowKind; 9] = [
        RowKind::Equation,
        RowKind::Definition,
        RowKind::Assumption,
        RowKind::Dependency,
        RowKind::DerivationStep,
        RowKind::Reference,
        RowKind::Contributor,
        RowKind::SupersededBy,
        RowKind::KeyInsight,
    ];

    pub fn template(self) -> &'static RowTemplate {
        // TEMPLATES is declared in the same order as ALL
        &TEMPLATES[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RowKind::Equation => "equation",
            RowKind::Definition => "definition",
            RowKind::Assumption => "assumption",
            RowKind::Dependency => "dependency",
            RowKind::DerivationStep => "derivation_step",
            RowKind::Reference => "reference",
            RowKind::Contributor => "contributor",
            RowKind::SupersededBy => "superseded_by",
            RowKind::KeyInsight => "key_insight",
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RowTemplate {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Sub-form markup for one row. `values` yields the current field text.
    pub fn render_row<'a>(
        &self,
        handle: u64,
        display_index: u32,
        value_of: impl Fn(&str) -> Option<&'a str>,
    ) -> String {
        let kind = self.kind.as_str();
        let mut html = String::with_capacity(512);
        html.push_str(&format!(
            "<div class=\"form-row {}-row\" data-row=\"{}\">\n",
            kind, handle
        ));
        html.push_str("<div class=\"row-header\">\n");
        html.push_str(&format!("<h4>{} {}</h4>\n", self.title, display_index));
        html.push_str(&format!(
            "<button type=\"button\" class=\"remove-btn\" data-remove=\"{}\">Remove</button>\n",
            handle
        ));
        html.push_str("</div>\n");

        for spec in self.fields {
            let value = escape(value_of(spec.name).unwrap_or(""), Html).to_string();
            let required = if spec.required { " required" } else { "" };
            html.push_str(&format!("<label>{}</label>\n", spec.label));
            match spec.input {
                Multiline => html.push_str(&format!(
                    "<textarea name=\"{}_{}\" data-field=\"{}\"{}>{}</textarea>\n",
                    kind, handle, spec.name, required, value
                )),
                Text | Number => html.push_str(&format!(
                    "<input type=\"{}\" name=\"{}_{}\" data-field=\"{}\" value=\"{}\"{}>\n",
                    if spec.input == Number { "number" } else { "text" },
                    kind,
                    handle,
                    spec.name,
                    value,
                    required
                )),
            }
        }

        if self.preview_field.is_some() {
            html.push_str("<div class=\"equation-preview\"></div>\n");
        }
        html.push_str("</div>\n");
        html
    }
}
