//! Classifier: which code blocks can be shown in the live preview.

use super::block::CodeBlock;

/// Preview category for a previewable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreviewKind {
    /// Markup rendered as a document (html, htm).
    Html,
    /// A component mounted with React (jsx, tsx, react).
    React,
    /// Script run with console capture (javascript, js).
    Javascript,
    /// Stylesheet applied to a sample page (css).
    Css,
}

impl PreviewKind {
    /// Short lowercase name of the variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::React => "react",
            Self::Javascript => "javascript",
            Self::Css => "css",
        }
    }
}

impl std::fmt::Display for PreviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a language tag (case-insensitive).
///
/// Returns `None` for every tag outside the previewable set. Such blocks still
/// render as code but never reach the preview.
pub fn classify(language: &str) -> Option<PreviewKind> {
    match language.to_ascii_lowercase().as_str() {
        "html" | "htm" => Some(PreviewKind::Html),
        "jsx" | "tsx" | "react" => Some(PreviewKind::React),
        "javascript" | "js" => Some(PreviewKind::Javascript),
        "css" => Some(PreviewKind::Css),
        _ => None,
    }
}

/// Check whether a language tag is previewable.
#[inline]
pub fn is_previewable(language: &str) -> bool {
    classify(language).is_some()
}

/// Keep only the previewable blocks, preserving order.
pub fn previewable_blocks(blocks: &[CodeBlock]) -> Vec<CodeBlock> {
    blocks
        .iter()
        .filter(|b| is_previewable(&b.language))
        .cloned()
        .collect()
}

/// File extension used for tab labels and downloads.
pub fn file_extension(language: &str) -> String {
    let lower = language.to_ascii_lowercase();
    let ext = match lower.as_str() {
        "javascript" => "js",
        "typescript" => "ts",
        "jsx" | "react" => "jsx",
        "tsx" => "tsx",
        "html" => "html",
        "css" => "css",
        "python" => "py",
        "json" => "json",
        _ => return lower,
    };
    ext.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previewable_set() {
        for tag in ["html", "htm", "jsx", "tsx", "react", "javascript", "js", "css"] {
            assert!(is_previewable(tag), "{tag} should be previewable");
        }
        for tag in ["python", "rust", "text", "ts", "typescript", "scss", "json", ""] {
            assert!(!is_previewable(tag), "{tag} should not be previewable");
        }
    }

    #[test]
    fn test_categories() {
        assert_eq!(classify("HTM"), Some(PreviewKind::Html));
        assert_eq!(classify("Tsx"), Some(PreviewKind::React));
        assert_eq!(classify("JS"), Some(PreviewKind::Javascript));
        assert_eq!(classify("css"), Some(PreviewKind::Css));
        assert_eq!(classify("PYTHON"), None);
    }

    #[test]
    fn test_previewable_blocks_filters() {
        let blocks = crate::fence::extract_blocks(
            "```python\nprint(1)\n```\n```html\n<p>x</p>\n```\n```rust\nfn main() {}\n```",
        );
        let kept = previewable_blocks(&blocks);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].language, "html");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("javascript"), "js");
        assert_eq!(file_extension("react"), "jsx");
        assert_eq!(file_extension("Python"), "py");
        assert_eq!(file_extension("go"), "go");
    }
}
