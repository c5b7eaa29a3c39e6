//! Read-only HTML preview of an entry.
//!
//! Sections appear in reading order and are left out entirely when the field
//! behind them is empty or absent. Math goes out between backticks for the
//! page's typesetter.

use super::reflow::{display_form, equation_html};
use crate::entry::{AssumptionCatalog, Entry, GlobalAssumption, ResolvedAssumption};
use crate::entry::catalog::title_from_id;
use crate::indexer::domains::domain_title;
use askama_escape::{escape, Html};

/// Escaped display text (with `hbar` shown as `ℏ`).
fn text(s: &str) -> String {
    escape(&display_form(s), Html).to_string()
}

/// Symbols are math; wrap them unless the author already did.
fn math_symbol(symbol: &str) -> String {
    let shown = text(symbol);
    if shown.starts_with('`') {
        shown
    } else {
        format!("`{}`", shown)
    }
}

pub struct PreviewRenderer<'a> {
    catalog: Option<&'a AssumptionCatalog>,
    entry_page: &'a str,
}

impl Default for PreviewRenderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> PreviewRenderer<'a> {
    pub fn new() -> Self {
        Self { catalog: None, entry_page: "entries.html" }
    }

    pub fn with_catalog(catalog: &'a AssumptionCatalog) -> Self {
        Self { catalog: Some(catalog), ..Self::new() }
    }

    /// Page that shows a single entry, used for entry-to-entry links.
    pub fn entry_page(mut self, page: &'a str) -> Self {
        self.entry_page = page;
        self
    }

    pub fn render(&self, entry: &Entry) -> String {
        let empty = AssumptionCatalog::default();
        let catalog = self.catalog.unwrap_or(&empty);

        let sections = [
            render_title(entry),
            render_explanation(entry),
            render_equations(entry),
            self.render_prerequisites(entry, catalog),
            render_definitions(entry),
            self.render_derivation(entry, catalog),
            render_verification(entry),
            render_historical_context(entry),
            self.render_superseded_by(entry),
            render_references(entry),
            render_metadata(entry),
        ];

        let mut html = String::with_capacity(4096);
        html.push_str("<article class=\"entry-preview\">\n");
        for section in sections.into_iter().flatten() {
            html.push_str(&section);
        }
        html.push_str("</article>\n");
        html
    }

    fn entry_link(&self, id: &str) -> String {
        format!(
            "<a href=\"{}?entry={}.json\">{}</a>",
            escape(self.entry_page, Html),
            escape(id, Html),
            escape(&title_from_id(id), Html)
        )
    }

    fn render_prerequisites(&self, entry: &Entry, catalog: &AssumptionCatalog) -> Option<String> {
        let assumptions = entry.assumptions.as_deref().unwrap_or_default();
        let depends_on = entry.depends_on.as_deref().unwrap_or_default();
        if assumptions.is_empty() && depends_on.is_empty() {
            return None;
        }

        let mut html = String::with_capacity(1024);
        html.push_str("<section class=\"prerequisites\">\n<h3>Assumptions and Prerequisites</h3>\n<ul>\n");
        let mut linked = Vec::new();
        for assumption in assumptions {
            match catalog.resolve(assumption, entry) {
                ResolvedAssumption::Global(global) => html.push_str(&render_global(global)),
                ResolvedAssumption::Dependency { id, .. } => {
                    html.push_str(&format!(
                        "<li class=\"assumption-dependency\" id=\"assumption-{}\">Builds upon: {}</li>\n",
                        escape(&id, Html),
                        self.entry_link(&id)
                    ));
                    linked.push(id);
                }
                ResolvedAssumption::Direct(free_text) => {
                    html.push_str(&format!("<li class=\"assumption-direct\">{}</li>\n", text(&free_text)));
                }
            }
        }
        for id in depends_on.iter().filter(|id| !linked.contains(*id)) {
            html.push_str(&format!(
                "<li class=\"assumption-dependency\" id=\"assumption-{}\">Builds upon: {}</li>\n",
                escape(id, Html),
                self.entry_link(id)
            ));
        }
        html.push_str("</ul>\n</section>\n");
        Some(html)
    }

    fn render_derivation(&self, entry: &Entry, catalog: &AssumptionCatalog) -> Option<String> {
        let steps = entry.derivation.as_deref().filter(|s| !s.is_empty())?;

        let mut html = String::with_capacity(2048);
        let draft = if entry.is_draft() { " draft" } else { "" };
        html.push_str(&format!("<section class=\"derivation derivation-section{}\">\n", draft));
        html.push_str("<h3>Derivation</h3>\n<ol>\n");
        for step in steps {
            html.push_str(&format!("<li value=\"{}\">\n", step.step));

            for assumption in step.assumptions.iter().flatten() {
                let (id, title, kind) = match catalog.resolve(assumption, entry) {
                    ResolvedAssumption::Global(g) => (g.id.clone(), g.display_title(), g.kind.clone()),
                    ResolvedAssumption::Dependency { id, title } => (id, title, "dependency".to_string()),
                    ResolvedAssumption::Direct(text) => {
                        tracing::debug!(
                            result_id = %entry.result_id,
                            step = step.step,
                            "step assumption not in catalog or dependencies, not linked: {}",
                            text
                        );
                        continue;
                    }
                };
                html.push_str(&format!(
                    "<div class=\"step-assumption\"><strong class=\"step-assumption-label\">Use</strong> \
                     <a href=\"#assumption-{}\" class=\"step-assumption-ref assumption-{}\">{}</a></div>\n",
                    escape(&id, Html),
                    escape(&kind, Html),
                    escape(&title, Html)
                ));
            }

            if !step.description.trim().is_empty() {
                html.push_str(&format!("<div class=\"step-expl\">{}</div>\n", text(&step.description)));
            }

            let badge = step
                .equation_proven
                .as_deref()
                .and_then(|id| entry.equation(id))
                .map(|eq| {
                    let label = eq.equation_title.as_deref().unwrap_or(&eq.id);
                    format!(
                        "<span class=\"equation-proven-badge\"><span class=\"proven-checkmark\">✓</span> {}</span>",
                        text(label)
                    )
                })
                .unwrap_or_default();
            html.push_str(&format!(
                "<div class=\"step-eq\">{}{}</div>\n",
                equation_html(&step.equation),
                badge
            ));
            html.push_str("</li>\n");
        }
        html.push_str("</ol>\n</section>\n");
        Some(html)
    }

    fn render_superseded_by(&self, entry: &Entry) -> Option<String> {
        let ids = entry.superseded_by.as_deref().filter(|ids| !ids.is_empty())?;
        let mut html = String::from("<section class=\"superseded-by\">\n<h3>Superseded By</h3>\n<ul>\n");
        for id in ids {
            html.push_str(&format!("<li>{}</li>\n", self.entry_link(id)));
        }
        html.push_str("</ul>\n</section>\n");
        Some(html)
    }
}

/// Preview without a global assumption catalog.
pub fn render_preview(entry: &Entry) -> String {
    PreviewRenderer::new().render(entry)
}

fn render_title(entry: &Entry) -> Option<String> {
    let name = entry.result_name.trim();
    if name.is_empty() {
        return None;
    }
    let badge = if entry.is_draft() {
        " <span class=\"draft-badge\">Draft</span>"
    } else {
        ""
    };
    Some(format!("<h2 class=\"entry-title\">{}{}</h2>\n", text(name), badge))
}

fn render_explanation(entry: &Entry) -> Option<String> {
    if entry.explanation.trim().is_empty() {
        return None;
    }
    Some(format!(
        "<section class=\"explanation\">\n<h3>Explanation</h3>\n<p>{}</p>\n</section>\n",
        text(&entry.explanation)
    ))
}

fn render_equations(entry: &Entry) -> Option<String> {
    let equations = entry.result_equations.as_deref().filter(|e| !e.is_empty())?;
    let mut html = String::from("<section class=\"equations\">\n<h3>Main Equations</h3>\n");
    for eq in equations {
        let title = eq
            .equation_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| format!("<span class=\"equation-result-title\">{}</span> ", text(t)))
            .unwrap_or_default();
        html.push_str(&format!(
            "<p id=\"equation-{}\">{}{}</p>\n",
            escape(&eq.id, Html),
            title,
            equation_html(&eq.equation)
        ));
    }
    html.push_str("</section>\n");
    Some(html)
}

fn render_global(global: &GlobalAssumption) -> String {
    let mut html = format!(
        "<li class=\"assumption-global assumption-{}\" id=\"assumption-{}\"><strong>{}</strong>: {}",
        escape(&global.kind, Html),
        escape(&global.id, Html),
        text(&global.display_title()),
        text(&global.text)
    );
    if let Some(exprs) = global.mathematical_expressions.as_deref().filter(|e| !e.is_empty()) {
        html.push_str("<div class=\"assumption-math\">");
        let rendered: Vec<String> = exprs.iter().map(|e| format!("`{}`", text(e))).collect();
        html.push_str(&rendered.join(", "));
        html.push_str("</div>");
    }
    if let Some(defs) = global.symbol_definitions.as_deref().filter(|d| !d.is_empty()) {
        html.push_str("<ul class=\"assumption-symbols\">");
        for def in defs {
            html.push_str(&format!(
                "<li>{}: {}</li>",
                math_symbol(&def.symbol),
                text(&def.definition)
            ));
        }
        html.push_str("</ul>");
    }
    html.push_str("</li>\n");
    html
}

fn render_definitions(entry: &Entry) -> Option<String> {
    let definitions = entry.definitions.as_deref().filter(|d| !d.is_empty())?;
    let mut html = String::from(
        "<section class=\"definitions\">\n<h3>Symbol Definitions</h3>\n<table>\n\
         <thead><tr><th>Symbol</th><th>Definition</th></tr></thead>\n<tbody>\n",
    );
    for def in definitions {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td></tr>\n",
            math_symbol(&def.symbol),
            text(&def.definition)
        ));
    }
    html.push_str("</tbody>\n</table>\n</section>\n");
    Some(html)
}

fn render_verification(entry: &Entry) -> Option<String> {
    let pv = entry.programmatic_verification.as_ref()?;
    let mut html = String::from("<section class=\"programmatic-verification\">\n<h3>Programmatic Verification</h3>\n");
    if !pv.language.trim().is_empty() {
        html.push_str(&format!("<p><strong>Language:</strong> {}</p>\n", escape(&pv.language, Html)));
    }
    if !pv.library.trim().is_empty() {
        html.push_str(&format!("<p><strong>Library:</strong> {}</p>\n", escape(&pv.library, Html)));
    }
    if !pv.code.is_empty() {
        html.push_str(&format!(
            "<pre><code class=\"language-python\">{}</code></pre>\n",
            escape(&pv.code.join("\n"), Html)
        ));
    }
    html.push_str("</section>\n");
    Some(html)
}

fn render_historical_context(entry: &Entry) -> Option<String> {
    let hc = entry.historical_context.as_ref()?;
    let importance = hc.importance.as_deref().filter(|s| !s.trim().is_empty());
    let period = hc.development_period.as_deref().filter(|s| !s.trim().is_empty());
    let insights = hc.key_insights.as_deref().unwrap_or_default();
    if importance.is_none() && period.is_none() && insights.is_empty() {
        return None;
    }

    let mut html = String::from("<section class=\"historical-context\">\n<h3>Historical Context</h3>\n");
    if let Some(importance) = importance {
        html.push_str(&format!("<h4>Importance</h4>\n<p>{}</p>\n", text(importance)));
    }
    if let Some(period) = period {
        html.push_str(&format!("<h4>Development Period</h4>\n<p>{}</p>\n", text(period)));
    }
    if !insights.is_empty() {
        html.push_str("<h4>Key Insights</h4>\n<ul>\n");
        for insight in insights {
            html.push_str(&format!("<li>{}</li>\n", text(insight)));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</section>\n");
    Some(html)
}

fn render_references(entry: &Entry) -> Option<String> {
    let references = entry.references.as_deref().filter(|r| !r.is_empty())?;
    let mut html = String::from("<section class=\"references\">\n<h3>References</h3>\n<ul>\n");
    for reference in references {
        html.push_str(&format!(
            "<li id=\"ref-{}\">{}</li>\n",
            escape(&reference.id, Html),
            text(&reference.citation)
        ));
    }
    html.push_str("</ul>\n</section>\n");
    Some(html)
}

fn render_metadata(entry: &Entry) -> Option<String> {
    let mut rows = Vec::new();
    if !entry.domain.trim().is_empty() {
        rows.push(format!(
            "<dt>Domain</dt><dd>{} ({})</dd>",
            escape(&domain_title(&entry.domain), Html),
            escape(&entry.domain, Html)
        ));
    }
    if let Some(status) = entry.theory_status {
        rows.push(format!("<dt>Theory status</dt><dd>{}</dd>", status.label()));
    }
    if let Some(contributors) = entry.contributors.as_deref().filter(|c| !c.is_empty()) {
        let names: Vec<String> = contributors.iter().map(|c| text(&c.full_name)).collect();
        rows.push(format!("<dt>Contributors</dt><dd>{}</dd>", names.join(", ")));
    }
    rows.push(format!("<dt>Review status</dt><dd>{}</dd>", entry.review_status.as_str()));

    Some(format!(
        "<section class=\"metadata\">\n<h3>Metadata</h3>\n<dl>\n{}\n</dl>\n</section>\n",
        rows.join("\n")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Definition, DerivationStep, ResultEquation, ReviewStatus, TheoryStatus};

    fn make_test_entry() -> Entry {
        Entry {
            result_id: "schrodinger_equation".to_string(),
            result_name: "Schrödinger Equation".to_string(),
            result_equations: Some(vec![ResultEquation {
                id: "eq1".to_string(),
                equation: "i hbar del_t psi = H psi".to_string(),
                equation_title: Some("Time-dependent form".to_string()),
            }]),
            explanation: "Evolution of a quantum state.".to_string(),
            definitions: Some(vec![Definition {
                symbol: "psi".to_string(),
                definition: "Wave function".to_string(),
            }]),
            derivation: Some(vec![DerivationStep {
                step: 1,
                description: "Postulate.".to_string(),
                equation: "i hbar del_t psi = H psi".to_string(),
                equation_proven: Some("eq1".to_string()),
                assumptions: Some(vec!["unitary_evolution".to_string()]),
            }]),
            depends_on: Some(vec!["unitary_evolution".to_string()]),
            domain: "quant-ph".to_string(),
            theory_status: Some(TheoryStatus::Current),
            ..Entry::skeleton()
        }
    }

    #[test]
    fn test_sections_in_reading_order() {
        let html = render_preview(&make_test_entry());
        let order = [
            "entry-title",
            "Explanation",
            "Main Equations",
            "Assumptions and Prerequisites",
            "Symbol Definitions",
            "Derivation",
            "Metadata",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|needle| html.find(needle).unwrap_or_else(|| panic!("missing {}", needle)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "out of order: {:?}", positions);
    }

    #[test]
    fn test_empty_sections_omitted() {
        let html = render_preview(&Entry::skeleton());
        for header in [
            "entry-title",
            "<h3>Explanation",
            "<h3>Main Equations",
            "<h3>Assumptions",
            "<h3>Symbol Definitions",
            "<h3>Derivation",
            "<h3>Programmatic Verification",
            "<h3>Historical Context",
            "<h3>Superseded By",
            "<h3>References",
        ] {
            assert!(!html.contains(header), "unexpected {} in {}", header, html);
        }
        assert!(html.contains("<dt>Review status</dt><dd>draft</dd>"));

        let mut entry = Entry::skeleton();
        entry.definitions = Some(Vec::new());
        assert!(!render_preview(&entry).contains("Symbol Definitions"));
    }

    #[test]
    fn test_proven_badge_and_step_assumption() {
        let html = render_preview(&make_test_entry());
        assert!(html.contains("<span class=\"proven-checkmark\">✓</span> Time-dependent form"));
        assert!(html.contains("href=\"#assumption-unitary_evolution\""));
        assert!(html.contains("Builds upon: <a href=\"entries.html?entry=unitary_evolution.json\">Unitary Evolution</a>"));
        // dependency listed once even though also used by a step
        assert_eq!(html.matches("Builds upon").count(), 1);
    }

    #[test]
    fn test_free_text_step_assumption_not_linked() {
        let mut entry = make_test_entry();
        entry.depends_on = None;
        entry.derivation.as_mut().unwrap()[0].assumptions = Some(vec!["Closed system".to_string()]);

        let html = render_preview(&entry);
        assert!(html.contains("Postulate."));
        assert!(!html.contains("step-assumption"));
        assert!(!html.contains("Closed system</a>"));
    }

    #[test]
    fn test_hbar_and_escaping() {
        let mut entry = make_test_entry();
        entry.explanation = "Uses hbar & <b>bold</b>".to_string();
        let html = render_preview(&entry);
        assert!(html.contains("Uses ℏ &amp; &lt;b&gt;bold"));
        assert!(!html.contains("<b>bold"));
        assert!(html.contains("`i ℏ del_t psi = H psi`"));
        assert!(html.contains("<td>`psi`</td>"));
    }

    #[test]
    fn test_draft_badge_only_for_drafts() {
        let mut entry = make_test_entry();
        assert!(render_preview(&entry).contains("draft-badge"));
        entry.review_status = ReviewStatus::Reviewed;
        assert!(!render_preview(&entry).contains("draft-badge"));
    }

    #[test]
    fn test_global_assumption_from_catalog() {
        let catalog = AssumptionCatalog::from_json(
            r#"{"assumptions": [{"id": "unitary_evolution", "type": "principle",
                "text": "Time evolution preserves norm.", "mathematical_expressions": ["U^dagger U = I"]}]}"#,
        )
        .unwrap();
        let mut entry = make_test_entry();
        entry.assumptions = Some(vec!["unitary_evolution".to_string(), "Closed system".to_string()]);
        let html = PreviewRenderer::with_catalog(&catalog).render(&entry);
        assert!(html.contains("<strong>Unitary Evolution</strong>: Time evolution preserves norm."));
        assert!(html.contains("`U^dagger U = I`"));
        assert!(html.contains("assumption-principle"));
        assert!(html.contains("<li class=\"assumption-direct\">Closed system</li>"));
    }
}
