//! Display-width reflow of long equations.
//!
//! Split tokens are tried in priority order; the first token type whose
//! greedy grouping gives at least two lines, all within `DISPLAY_WIDTH`,
//! wins. Operator tokens only split at bracket depth zero so every line keeps
//! balanced brackets. Nothing here touches the stored equation.

use askama_escape::{escape, Html};
use regex::Regex;
use std::sync::LazyLock;

pub const DISPLAY_WIDTH: usize = 80;

/// Separator patterns, highest priority first. `true` = depth-zero only.
const SPLIT_PATTERNS: &[(&str, bool)] = &[
    (r"\s*=\s*", true),
    (r"\s*\+\s*", true),
    (r"\s*-\s*", true),
    (r"\s*\*\s*", true),
    (r"\s*/\s*", true),
    (r"\s*\^\s*", true),
    (r"\s*,\s*", true),
    (r"\s*;\s*", true),
    (r"\s+and\s+", true),
    (r"\s+or\s+", true),
    (r"\s*\|\s*", true),
    (r"\s*&\s*", true),
    // bracket boundaries themselves
    (r"\s*[()\[\]]\s*", false),
];

static SPLITTERS: LazyLock<Vec<(Regex, bool)>> = LazyLock::new(|| {
    SPLIT_PATTERNS
        .iter()
        .map(|(pattern, depth_zero)| (Regex::new(pattern).expect("static pattern"), *depth_zero))
        .collect()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

static HBAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bhbar\b").expect("static pattern"));

/// `hbar` shown as `ℏ`.
pub fn display_form(text: &str) -> String {
    HBAR.replace_all(text, "ℏ").into_owned()
}

/// Display lines for an equation; a single line when no split fits.
pub fn reflow_lines(equation: &str) -> Vec<String> {
    let display = display_form(equation);
    if char_len(&display) <= DISPLAY_WIDTH {
        return vec![display];
    }

    for (re, depth_zero) in SPLITTERS.iter() {
        let parts = split_keeping_separators(&display, re, *depth_zero);
        if parts.len() > 1 {
            let lines = group_parts(&parts);
            if fits(&lines) {
                return lines;
            }
        }
    }

    let words = split_keeping_separators(&display, &WHITESPACE, false);
    if words.len() > 1 {
        let lines = group_words(&words);
        if fits(&lines) {
            return lines;
        }
    }

    vec![display]
}

/// Equation as typesetter markup: each line between backticks, `<br>` between.
pub fn equation_html(equation: &str) -> String {
    reflow_lines(equation)
        .iter()
        .map(|line| format!("`{}`", escape(line, Html)))
        .collect::<Vec<_>>()
        .join("<br>")
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn fits(lines: &[String]) -> bool {
    lines.len() >= 2 && lines.iter().all(|line| char_len(line) <= DISPLAY_WIDTH)
}

fn bracket_delta(s: &str) -> i32 {
    s.chars()
        .map(|c| match c {
            '(' | '[' | '{' => 1,
            ')' | ']' | '}' => -1,
            _ => 0,
        })
        .sum()
}

/// `[text, sep, text, sep, .., text]`
fn split_keeping_separators<'a>(text: &'a str, re: &Regex, depth_zero_only: bool) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut last = 0;
    let mut scanned = 0;
    let mut depth = 0;

    for m in re.find_iter(text) {
        if m.as_str().is_empty() {
            continue;
        }
        if depth_zero_only {
            depth += bracket_delta(&text[scanned..m.start()]);
            scanned = m.start();
            if depth != 0 {
                continue;
            }
        }
        parts.push(&text[last..m.start()]);
        parts.push(m.as_str());
        last = m.end();
    }
    parts.push(&text[last..]);
    parts
}

/// Greedy grouping; a separator always starts the line it moves to.
fn group_parts(parts: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = parts.first().copied().unwrap_or_default().to_string();

    for pair in parts[1..].chunks(2) {
        let separator = pair[0];
        let next = pair.get(1).copied().unwrap_or_default();
        if char_len(&current) + char_len(separator) + char_len(next) > DISPLAY_WIDTH {
            push_trimmed(&mut lines, &current);
            current = format!("{}{}", separator, next);
        } else {
            current.push_str(separator);
            current.push_str(next);
        }
    }
    push_trimmed(&mut lines, &current);
    lines
}

fn group_words(words: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in words {
        if char_len(&current) + char_len(word) > DISPLAY_WIDTH && !current.trim().is_empty() {
            push_trimmed(&mut lines, &current);
            current = word.to_string();
        } else {
            current.push_str(word);
        }
    }
    push_trimmed(&mut lines, &current);
    lines
}

fn push_trimmed(lines: &mut Vec<String>, line: &str) {
    let line = line.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ws(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn make_long_sum() -> String {
        let terms: Vec<String> = (1..=20).map(|i| format!("c_{} x^{}", i, i)).collect();
        format!("f(x) = {}", terms.join(" + "))
    }

    #[test]
    fn test_short_equation_untouched() {
        assert_eq!(reflow_lines("E = m c^2"), vec!["E = m c^2".to_string()]);
    }

    #[test]
    fn test_long_sum_breaks_at_plus() {
        let eq = make_long_sum();
        assert!(eq.len() > 150);
        let lines = reflow_lines(&eq);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(line.chars().count() <= DISPLAY_WIDTH, "line too long: {}", line);
        }
        assert!(lines[1].starts_with('+'), "separator should lead the new line: {:?}", lines);
        assert_eq!(strip_ws(&lines.concat()), strip_ws(&eq));
    }

    #[test]
    fn test_equals_preferred_when_it_fits() {
        let lhs = "a".repeat(60);
        let rhs = "b".repeat(60);
        let eq = format!("{} = {}", lhs, rhs);
        let lines = reflow_lines(&eq);
        assert_eq!(lines, vec![lhs, format!("= {}", rhs)]);
    }

    #[test]
    fn test_unbroken_token_stays_single_line() {
        let eq = "x".repeat(200);
        assert_eq!(reflow_lines(&eq), vec![eq]);
    }

    #[test]
    fn test_no_split_inside_brackets() {
        let inner: Vec<String> = (1..=10).map(|i| format!("y_{}", i)).collect();
        let inner = inner.join(" + ");
        let eq = format!("G(u) = F({}) * H({})", inner, inner);

        let lines = reflow_lines(&eq);
        assert_eq!(lines.len(), 2, "expected a split at the top-level '*': {:?}", lines);
        assert!(lines[1].starts_with("* H("));
        for line in &lines {
            assert_eq!(bracket_delta(line), 0, "unbalanced line: {}", line);
        }
    }

    #[test]
    fn test_hbar_display_only() {
        let eq = "E = hbar omega";
        assert_eq!(reflow_lines(eq), vec!["E = ℏ omega".to_string()]);
        assert_eq!(eq, "E = hbar omega");
        assert_eq!(display_form("hbarx"), "hbarx");
    }

    #[test]
    fn test_equation_html_escapes_and_joins() {
        let html = equation_html(&make_long_sum());
        assert!(html.starts_with('`'));
        assert!(html.contains("`<br>`"));
        assert_eq!(equation_html("a < b"), "`a &lt; b`");
    }
}
