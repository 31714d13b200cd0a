use std::fmt::Write as _;
use std::path::Path;

const INDENT: &str = "    ";

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Line-oriented builder for Python source with block indentation
#[derive(Debug, Default)]
pub struct PythonWriter {
    lines: Vec<String>,
    depth: usize,
}

impl PythonWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let mut line = INDENT.repeat(self.depth);
        line.push_str(text.as_ref());
        self.lines.push(line);
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    pub fn comment(&mut self, text: &str) {
        self.line(format!("# {}", single_line(text)));
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Runs `body` one level deeper
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.line(header);
        self.indent();
        body(self);
        self.dedent();
    }

    pub fn finish(self) -> String {
        let mut source = self.lines.join("\n");
        source.push('\n');
        source
    }
}

/// Collapses line breaks so text can sit in a comment or docstring line
pub fn single_line(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Text safe to place inside a `"""` docstring
pub fn docstring_text(text: &str) -> String {
    single_line(text).replace('\\', "\\\\").replace('"', "\\\"")
}

/// A double-quoted Python string literal
pub fn string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub fn path_literal(path: &Path) -> String {
    string_literal(&path.to_string_lossy())
}

/// A float literal Python reads back as the same value
pub fn float_literal(value: f32) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!("{value:?}")
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes_quotes_and_control_chars() {
        assert_eq!(string_literal(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(string_literal("a\\b"), r#""a\\b""#);
        assert_eq!(string_literal("two\nlines\t!"), r#""two\nlines\t!""#);
        assert_eq!(string_literal("\u{1}"), r#""\x01""#);
        assert_eq!(string_literal("名片"), "\"名片\"");
    }

    #[test]
    fn identifiers_follow_python_rules() {
        assert!(is_identifier("logo_path"));
        assert!(is_identifier("_private2"));
        assert!(is_identifier("标题"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("font-path"));
        assert!(is_keyword("lambda"));
        assert!(!is_keyword("match"));
    }

    #[test]
    fn writer_indents_blocks() {
        let mut w = PythonWriter::new();
        w.block("def f():", |w| {
            w.block("try:", |w| w.line("x = 1"));
            w.comment("multi\nline");
        });
        assert_eq!(w.finish(), "def f():\n    try:\n        x = 1\n    # multi line\n");
    }

    #[test]
    fn float_literals_keep_a_decimal_point() {
        assert_eq!(float_literal(15.0), "15.0");
        assert_eq!(float_literal(-0.5), "-0.5");
        assert_eq!(float_literal(f32::NAN), "0.0");
    }
}
