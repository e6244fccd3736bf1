//! Payload format detection and syntax highlighting for the detail pane.

use base64::Engine;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
};

use crate::constants::BINARY_PREVIEW_LEN;

use super::colors;

/// Detected payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFormat {
    /// KEY=value lines, as in a .env file
    Env,
    /// A JSON object
    Json,
    Plain,
}

/// Renders a secret payload into display-ready text.
pub fn render_payload(data: &[u8]) -> Text<'static> {
    let Some(content) = printable(data) else {
        return binary_preview(data);
    };

    match detect_format(content) {
        ContentFormat::Env => Text::from(content.lines().map(env_line).collect::<Vec<_>>()),
        ContentFormat::Json => Text::from(content.lines().map(json_line).collect::<Vec<_>>()),
        ContentFormat::Plain => Text::from(
            content
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::White))))
                .collect::<Vec<_>>(),
        ),
    }
}

pub fn detect_format(content: &str) -> ContentFormat {
    if is_env_format(content) {
        ContentFormat::Env
    } else if is_json(content) {
        ContentFormat::Json
    } else {
        ContentFormat::Plain
    }
}

/// Returns the payload as text when it is valid UTF-8 without control characters.
fn printable(data: &[u8]) -> Option<&str> {
    let content = std::str::from_utf8(data).ok()?;
    content
        .chars()
        .all(|c| !c.is_control() || c.is_whitespace())
        .then_some(content)
}

fn is_env_format(content: &str) -> bool {
    let mut assignments = 0;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if split_assignment(line).is_none() {
            return false;
        }
        assignments += 1;
    }
    assignments > 0
}

/// Splits `KEY = value` into its key and value parts.
fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let mut chars = key.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some((key, value))
}

fn is_json(content: &str) -> bool {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(content).is_ok()
}

fn binary_preview(data: &[u8]) -> Text<'static> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    let mut preview: String = encoded.chars().take(BINARY_PREVIEW_LEN).collect();
    if encoded.len() > BINARY_PREVIEW_LEN {
        preview.push('…');
    }

    Text::from(vec![
        Line::from(Span::styled(
            "Non printable data.",
            Style::default().fg(colors::MUTED),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("base64 ", Style::default().fg(colors::MUTED)),
            Span::styled(preview, Style::default().fg(Color::White)),
        ]),
    ])
}

fn env_line(line: &str) -> Line<'static> {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        return Line::from(Span::styled(
            line.to_string(),
            Style::default()
                .fg(colors::MUTED)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let Some((_, value)) = split_assignment(line) else {
        return Line::from(line.to_string());
    };
    let key = &trimmed[..trimmed.len() - value.len() - 1];

    let value_style = if value.trim_start().starts_with(['"', '\'']) {
        Style::default().fg(colors::SUCCESS)
    } else {
        Style::default().fg(Color::White)
    };

    let indent = &line[..line.len() - trimmed.len()];
    Line::from(vec![
        Span::raw(indent.to_string()),
        Span::styled(
            key.to_string(),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("=", Style::default().fg(colors::MUTED)),
        Span::styled(value.to_string(), value_style),
    ])
}

fn json_line(line: &str) -> Line<'static> {
    let chars: Vec<char> = line.chars().collect();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '"' {
            let start = i;
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\\' {
                    i += 1;
                }
                i += 1;
            }
            i = (i + 1).min(chars.len());
            let token: String = chars[start..i].iter().collect();
            let is_key = chars[i..]
                .iter()
                .find(|c| !c.is_whitespace())
                .is_some_and(|c| *c == ':');
            let style = if is_key {
                Style::default().fg(colors::PRIMARY)
            } else {
                Style::default().fg(colors::SUCCESS)
            };
            spans.push(Span::styled(token, style));
        } else if c == '-' || c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || "+-.".contains(chars[i])) {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            spans.push(Span::styled(token, Style::default().fg(colors::WARNING)));
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            spans.push(Span::styled(token, Style::default().fg(colors::ACCENT)));
        } else {
            let start = i;
            while i < chars.len()
                && chars[i] != '"'
                && chars[i] != '-'
                && !chars[i].is_ascii_alphanumeric()
            {
                i += 1;
            }
            let token: String = chars[start..i].iter().collect();
            spans.push(Span::styled(token, Style::default().fg(colors::MUTED)));
        }
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_detects_env_format() {
        assert_eq!(detect_format("A=1\nB_2 = two\n# comment\n"), ContentFormat::Env);
        assert_eq!(detect_format("A=1\nnot an assignment"), ContentFormat::Plain);
        assert_eq!(detect_format(""), ContentFormat::Plain);
    }

    #[test]
    fn test_detects_json_object() {
        assert_eq!(detect_format(r#"{"user": "admin", "port": 5432}"#), ContentFormat::Json);
        assert_eq!(detect_format("[1, 2, 3]"), ContentFormat::Plain);
    }

    #[test]
    fn test_rendering_preserves_text() {
        let payload = "{\n  \"user\": \"admin\",\n  \"port\": 5432,\n  \"tls\": true\n}";
        assert_eq!(plain(&render_payload(payload.as_bytes())), payload.lines().collect::<Vec<_>>());

        let env = "# db\nHOST=localhost\n  PORT=5432";
        assert_eq!(plain(&render_payload(env.as_bytes())), env.lines().collect::<Vec<_>>());
    }

    #[test]
    fn test_json_keys_are_distinguished_from_values() {
        let line = json_line(r#"  "user": "admin","#);
        let key = line.spans.iter().find(|s| s.content == "\"user\"").unwrap();
        let value = line.spans.iter().find(|s| s.content == "\"admin\"").unwrap();
        assert_eq!(key.style.fg, Some(colors::PRIMARY));
        assert_eq!(value.style.fg, Some(colors::SUCCESS));
    }

    #[test]
    fn test_binary_payload_is_previewed() {
        let text = render_payload(&[0xff, 0x00, 0x10]);
        let lines = plain(&text);
        assert_eq!(lines[0], "Non printable data.");
        assert!(lines[2].contains("/wAQ"));
    }

    #[test]
    fn test_control_characters_are_not_printable() {
        assert!(printable(b"a\x07b").is_none());
        assert!(printable(b"tab\tand\nnewline").is_some());
    }
}
