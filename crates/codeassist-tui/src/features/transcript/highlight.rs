//! Syntax highlighting for code blocks via `syntect`.

use std::sync::LazyLock;

use ratatui::style::{Color, Style};
use ratatui::text::Span;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style as SynStyle, Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::style::{CODE_BG, code_plain};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME_NAME: &str = "base16-ocean.dark";

fn syntax_for(language: &str) -> &'static SyntaxReference {
    SYNTAX_SET
        .find_syntax_by_token(language)
        .unwrap_or_else(|| SYNTAX_SET.find_syntax_plain_text())
}

fn theme() -> Option<&'static Theme> {
    THEME_SET.themes.get(THEME_NAME)
}

/// Whether `language` maps to a known grammar.
pub fn is_known_language(language: &str) -> bool {
    SYNTAX_SET.find_syntax_by_token(language).is_some()
}

/// Highlights `code` line by line, keyed by the fence language tag.
///
/// Unknown languages and highlighting errors fall back to plain styling.
pub fn highlight_code(code: &str, language: &str) -> Vec<Vec<Span<'static>>> {
    let Some(theme) = theme().filter(|_| is_known_language(language)) else {
        return plain_lines(code);
    };
    let mut highlighter = HighlightLines::new(syntax_for(language), theme);

    LinesWithEndings::from(code)
        .map(|line| match highlighter.highlight_line(line, &SYNTAX_SET) {
            Ok(ranges) => ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(['\r', '\n']);
                    (!text.is_empty())
                        .then(|| Span::styled(text.to_string(), to_ratatui_style(style)))
                })
                .collect(),
            Err(err) => {
                tracing::debug!(%err, language, "highlighting failed; using plain text");
                vec![Span::styled(
                    line.trim_end_matches(['\r', '\n']).to_string(),
                    code_plain(),
                )]
            }
        })
        .collect()
}

fn plain_lines(code: &str) -> Vec<Vec<Span<'static>>> {
    code.lines()
        .map(|line| vec![Span::styled(line.to_string(), code_plain())])
        .collect()
}

fn to_ratatui_style(style: SynStyle) -> Style {
    let fg = Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b);
    Style::default().fg(fg).bg(CODE_BG)
}
