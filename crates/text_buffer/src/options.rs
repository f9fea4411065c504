use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Line break style of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// Unix (`\n`)
    #[default]
    Lf,
    /// Windows (`\r\n`)
    Crlf,
    /// Classic Mac (`\r`)
    Cr,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Name for status displays.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Lf => "LF",
            Self::Crlf => "CRLF",
            Self::Cr => "CR",
        }
    }

    /// Style of the first line break in `text`, if it has one.
    pub fn detect(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let i = bytes.iter().position(|&b| b == b'\r' || b == b'\n')?;
        Some(match (bytes[i], bytes.get(i + 1)) {
            (b'\r', Some(b'\n')) => Self::Crlf,
            (b'\r', _) => Self::Cr,
            _ => Self::Lf,
        })
    }

    /// Rewrites every line break in `text` to this style.
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let bytes = text.as_bytes();
        let Some(first) = bytes.iter().position(|&b| b == b'\r' || b == b'\n') else {
            return Cow::Borrowed(text);
        };

        let mut out = String::with_capacity(text.len());
        out.push_str(&text[..first]);
        let mut run_start = first;
        let mut i = first;
        while i < bytes.len() {
            let width = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
                b'\r' | b'\n' => 1,
                _ => {
                    i += 1;
                    continue;
                }
            };
            out.push_str(&text[run_start..i]);
            out.push_str(self.as_str());
            i += width;
            run_start = i;
        }
        out.push_str(&text[run_start..]);

        if out == text {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(out)
        }
    }
}

/// Settings applied when a [`crate::TextBuffer`] is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBufferOptions {
    /// Line ending used when the initial content has no line break.
    pub default_line_ending: LineEnding,

    /// Rewrite line breaks of inserted text to the buffer's line ending.
    pub normalize_line_endings: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_first_line_break() {
        assert_eq!(LineEnding::detect("a\r\nb\nc"), Some(LineEnding::Crlf));
        assert_eq!(LineEnding::detect("a\nb\r\n"), Some(LineEnding::Lf));
        assert_eq!(LineEnding::detect("a\rb"), Some(LineEnding::Cr));
        assert_eq!(LineEnding::detect("abc\r"), Some(LineEnding::Cr));
        assert_eq!(LineEnding::detect("abc"), None);
    }

    #[test]
    fn normalize_rewrites_mixed_breaks() {
        assert_eq!(LineEnding::Lf.normalize("a\r\nb\rc\nd"), "a\nb\nc\nd");
        assert_eq!(
            LineEnding::Crlf.normalize("a\nb\r\n\r"),
            "a\r\nb\r\n\r\n"
        );
        assert_eq!(LineEnding::Cr.normalize("x\n"), "x\r");
    }

    #[test]
    fn normalize_borrows_when_unchanged() {
        assert!(matches!(LineEnding::Lf.normalize("plain"), Cow::Borrowed(_)));
        assert!(matches!(LineEnding::Lf.normalize("a\nb\n"), Cow::Borrowed(_)));
        assert!(matches!(LineEnding::Crlf.normalize("a\nb"), Cow::Owned(_)));
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: TextBufferOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, TextBufferOptions::default());
        assert_eq!(options.default_line_ending, LineEnding::Lf);
        assert!(!options.normalize_line_endings);

        let options: TextBufferOptions =
            serde_json::from_str(r#"{"default_line_ending": "crlf", "normalize_line_endings": true}"#)
                .unwrap();
        assert_eq!(options.default_line_ending, LineEnding::Crlf);
        assert!(options.normalize_line_endings);
    }

    #[test]
    fn line_ending_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LineEnding::Cr).unwrap(), r#""cr""#);
        assert!(serde_json::from_str::<LineEnding>(r#""unix""#).is_err());
    }
}
