//! Preview documents: the HTML handed to the isolated preview surface.
//!
//! Every variant reports back through `postMessage` with one of two message
//! types, [`READY_MESSAGE`] and [`ERROR_MESSAGE`], so the host can show a
//! runtime failure inline.
//!
//! | Kind       | Document                                                  |
//! |------------|-----------------------------------------------------------|
//! | Html       | fragment wrapped in a shell, full documents passed through |
//! | Css        | styles applied to a sample page                           |
//! | Javascript | script run with console capture                           |
//! | React      | React 18 UMD + Babel standalone, auto-mounted component   |

use crate::fence::{classify, file_extension, CodeBlock, PreviewKind};

/// `postMessage` type sent once the document has rendered.
pub const READY_MESSAGE: &str = "preview-ready";
/// `postMessage` type sent on a runtime error.
pub const ERROR_MESSAGE: &str = "preview-error";

const REACT_URL: &str = "https://unpkg.com/react@18/umd/react.development.js";
const REACT_DOM_URL: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";
const BABEL_URL: &str = "https://unpkg.com/@babel/standalone@7.23.5/babel.min.js";

/// Component names tried, in order, when mounting a React preview.
const COMPONENT_NAMES: [&str; 6] = ["App", "Component", "Main", "Root", "Page", "Home"];

const HEAD: &str = r#"  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

const FONT: &str = "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";

/// A built preview document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewDocument {
    /// How the block was interpreted.
    pub kind: PreviewKind,
    /// Complete HTML source.
    pub html: String,
}

/// Preview kind of a block. Blocks outside the previewable set fall back to HTML.
pub fn preview_kind(block: &CodeBlock) -> PreviewKind {
    classify(&block.language).unwrap_or(PreviewKind::Html)
}

/// Build the sandboxed document for a block.
pub fn build_document(block: &CodeBlock) -> PreviewDocument {
    let kind = preview_kind(block);
    let html = match kind {
        PreviewKind::Html => html_document(&block.code),
        PreviewKind::Css => css_document(&block.code),
        PreviewKind::Javascript => javascript_document(&block.code),
        PreviewKind::React => react_document(&block.code),
    };
    PreviewDocument { kind, html }
}

/// Tab label of a block: its filename, or `language.ext`.
pub fn tab_label(block: &CodeBlock) -> String {
    block
        .filename
        .clone()
        .unwrap_or_else(|| format!("{}.{}", block.language, file_extension(&block.language)))
}

/// Download name of a block: its filename, or `code.ext`.
pub fn export_filename(block: &CodeBlock) -> String {
    block
        .filename
        .clone()
        .unwrap_or_else(|| format!("code.{}", file_extension(&block.language)))
}

/// Document for "open in a new tab": no reporting scripts.
///
/// HTML (or anything that already looks like a full document) is returned
/// verbatim; React gets the UMD shell; everything else is placed in a body.
pub fn standalone_document(block: &CodeBlock) -> String {
    let code = &block.code;
    if block.language == "html" || is_full_document(code) {
        return code.clone();
    }

    if preview_kind(block) == PreviewKind::React {
        return format!(
            r#"<!DOCTYPE html>
<html>
<head>
{HEAD}
  <script src="{REACT_URL}"></script>
  <script src="{REACT_DOM_URL}"></script>
  <script src="{BABEL_URL}"></script>
  <style>* {{ box-sizing: border-box; margin: 0; padding: 0; }} body {{ font-family: system-ui, sans-serif; }}</style>
</head>
<body>
  <div id="root"></div>
  <script type="text/babel">
    const {{ useState, useEffect, useRef }} = React;
{code}
    const root = ReactDOM.createRoot(document.getElementById('root'));
    root.render(React.createElement(typeof App !== 'undefined' ? App : Component));
  </script>
</body>
</html>"#,
            code = escape_script(code)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{HEAD}
  <style>* {{ box-sizing: border-box; margin: 0; padding: 0; }} body {{ font-family: system-ui, sans-serif; padding: 16px; }}</style>
</head>
<body>
{code}
</body>
</html>"#
    )
}

/// Check whether markup is a complete document rather than a fragment.
pub fn is_full_document(code: &str) -> bool {
    code.contains("<!DOCTYPE") || code.contains("<html")
}

/// Keep embedded code from closing its `<script>` element early.
fn escape_script(code: &str) -> String {
    code.replace("</script", r"<\/script")
}

fn reporter_script() -> String {
    format!(
        r"<script>
  window.onerror = function(msg, url, line) {{
    window.parent.postMessage({{ type: '{ERROR_MESSAGE}', message: msg }}, '*');
    return true;
  }};
  window.parent.postMessage({{ type: '{READY_MESSAGE}' }}, '*');
</script>"
    )
}

fn html_document(code: &str) -> String {
    if is_full_document(code) {
        let script = reporter_script();
        return match code.find("</body>") {
            Some(at) => format!("{}{script}{}", &code[..at], &code[at..]),
            None => format!("{code}\n{script}"),
        };
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{HEAD}
  <style>
    * {{ box-sizing: border-box; margin: 0; padding: 0; }}
    body {{ font-family: {FONT}; }}
  </style>
</head>
<body>
{code}
{script}
</body>
</html>"#,
        script = reporter_script()
    )
}

fn css_document(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{HEAD}
  <style>
    * {{ box-sizing: border-box; }}
    body {{ font-family: {FONT}; margin: 0; padding: 16px; }}
{code}
  </style>
</head>
<body>
  <div class="preview-container">
    <h1>CSS Preview</h1>
    <p>Your CSS styles are applied to this page.</p>
    <button>Sample Button</button>
    <div class="box" style="width: 100px; height: 100px; background: #eee; margin-top: 16px;"></div>
  </div>
  <script>window.parent.postMessage({{ type: '{READY_MESSAGE}' }}, '*');</script>
</body>
</html>"#,
        code = code.replace("</style", r"<\/style")
    )
}

fn javascript_document(code: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{HEAD}
  <style>
    * {{ box-sizing: border-box; margin: 0; padding: 0; }}
    body {{ font-family: {FONT}; padding: 16px; }}
    #output {{ white-space: pre-wrap; font-family: 'SF Mono', Menlo, monospace; background: #f5f5f5; padding: 12px; border-radius: 8px; font-size: 13px; line-height: 1.5; }}
  </style>
</head>
<body>
  <div id="output"></div>
  <script>
    window.onerror = function(msg, url, line) {{
      window.parent.postMessage({{ type: '{ERROR_MESSAGE}', message: msg }}, '*');
      return true;
    }};

    const output = document.getElementById('output');
    const originalLog = console.log;
    const originalError = console.error;
    const originalWarn = console.warn;

    function formatValue(val) {{
      if (val === undefined) return 'undefined';
      if (val === null) return 'null';
      if (typeof val === 'object') return JSON.stringify(val, null, 2);
      return String(val);
    }}

    console.log = function(...args) {{
      originalLog.apply(console, args);
      output.textContent += args.map(formatValue).join(' ') + '\n';
    }};

    console.error = function(...args) {{
      originalError.apply(console, args);
      output.innerHTML += '<span style="color: #dc2626;">' + args.map(formatValue).join(' ') + '</span>\n';
    }};

    console.warn = function(...args) {{
      originalWarn.apply(console, args);
      output.innerHTML += '<span style="color: #ca8a04;">' + args.map(formatValue).join(' ') + '</span>\n';
    }};

    try {{
{code}
      window.parent.postMessage({{ type: '{READY_MESSAGE}' }}, '*');
    }} catch (e) {{
      window.parent.postMessage({{ type: '{ERROR_MESSAGE}', message: e.message }}, '*');
    }}
  </script>
</body>
</html>"#,
        code = escape_script(code)
    )
}

fn react_document(code: &str) -> String {
    let names = COMPONENT_NAMES
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
{HEAD}
  <script src="{REACT_URL}"></script>
  <script src="{REACT_DOM_URL}"></script>
  <script src="{BABEL_URL}"></script>
  <style>
    * {{ box-sizing: border-box; margin: 0; padding: 0; }}
    body {{ font-family: {FONT}; }}
  </style>
</head>
<body>
  <div id="root"></div>
  <script>
    window.onerror = function(msg, url, line) {{
      window.parent.postMessage({{ type: '{ERROR_MESSAGE}', message: msg }}, '*');
      return true;
    }};
  </script>
  <script type="text/babel" data-presets="react">
    const {{ useState, useEffect, useRef, useCallback, useMemo, useContext, createContext }} = React;

    try {{
{code}

      let MainComponent = null;
      for (const name of [{names}]) {{
        if (typeof window[name] === 'function') {{
          MainComponent = window[name];
          break;
        }}
      }}

      if (!MainComponent) {{
        const builtins = ['Array', 'Boolean', 'Date', 'Error', 'Function', 'JSON', 'Math', 'Number', 'Object', 'RegExp', 'String', 'Promise', 'Symbol', 'Map', 'Set', 'WeakMap', 'WeakSet', 'Proxy', 'Reflect', 'Intl', 'WebAssembly', 'React', 'ReactDOM'];
        const defined = Object.keys(window).filter(
          key => typeof window[key] === 'function' && /^[A-Z]/.test(key) && !builtins.includes(key)
        );
        if (defined.length > 0) {{
          MainComponent = window[defined[0]];
        }}
      }}

      if (MainComponent) {{
        const root = ReactDOM.createRoot(document.getElementById('root'));
        root.render(React.createElement(MainComponent));
      }} else {{
        document.getElementById('root').innerHTML = '<div style="padding: 20px; color: #666; text-align: center;"><p>No React component found.</p><p style="font-size: 12px; margin-top: 8px;">Define a component named App or use function ComponentName() {{ ... }}</p></div>';
      }}
      window.parent.postMessage({{ type: '{READY_MESSAGE}' }}, '*');
    }} catch (e) {{
      window.parent.postMessage({{ type: '{ERROR_MESSAGE}', message: e.message }}, '*');
    }}
  </script>
</body>
</html>"#,
        code = escape_script(code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(language: &str, code: &str, filename: Option<&str>) -> CodeBlock {
        CodeBlock {
            language: language.to_string(),
            code: code.to_string(),
            filename: filename.map(str::to_string),
            complete: true,
            source: 0..0,
        }
    }

    #[test]
    fn test_html_fragment_wrapped() {
        let doc = build_document(&block("html", "<div>hi</div>", None));
        assert_eq!(doc.kind, PreviewKind::Html);
        assert!(doc.html.starts_with("<!DOCTYPE html>"));
        assert!(doc.html.contains("<body>\n<div>hi</div>\n<script>"));
        assert!(doc.html.contains(READY_MESSAGE));
    }

    #[test]
    fn test_full_document_gets_reporter_before_body_end() {
        let code = "<!DOCTYPE html><html><body><p>x</p></body></html>";
        let doc = build_document(&block("htm", code, None));
        let script_at = doc.html.find(ERROR_MESSAGE).unwrap_or(usize::MAX);
        let body_end = doc.html.find("</body>").unwrap_or(0);
        assert!(script_at < body_end);
        assert!(doc.html.starts_with("<!DOCTYPE html><html><body><p>x</p>"));
    }

    #[test]
    fn test_full_document_without_body_end() {
        let doc = build_document(&block("html", "<html><p>x</p>", None));
        assert!(doc.html.starts_with("<html><p>x</p>\n<script>"));
    }

    #[test]
    fn test_css_sample_page() {
        let doc = build_document(&block("css", "h1 { color: red; }", None));
        assert_eq!(doc.kind, PreviewKind::Css);
        assert!(doc.html.contains("h1 { color: red; }\n  </style>"));
        assert!(doc.html.contains("Sample Button"));
    }

    #[test]
    fn test_javascript_console_capture() {
        let doc = build_document(&block("js", "console.log('hi')", None));
        assert_eq!(doc.kind, PreviewKind::Javascript);
        assert!(doc.html.contains("console.log = function"));
        assert!(doc.html.contains("console.log('hi')"));
    }

    #[test]
    fn test_react_mount() {
        let doc = build_document(&block("tsx", "function App() { return <p>hi</p>; }", None));
        assert_eq!(doc.kind, PreviewKind::React);
        assert!(doc.html.contains(REACT_URL));
        assert!(doc.html.contains("@babel/standalone@7.23.5"));
        assert!(doc.html.contains("'App', 'Component', 'Main', 'Root', 'Page', 'Home'"));
    }

    #[test]
    fn test_script_close_escaped() {
        let doc = build_document(&block("js", "const s = '</script>';", None));
        assert!(doc.html.contains(r"'<\/script>'"));
    }

    #[test]
    fn test_labels_and_filenames() {
        assert_eq!(tab_label(&block("javascript", "", None)), "javascript.js");
        assert_eq!(tab_label(&block("html", "", Some("index.html"))), "index.html");
        assert_eq!(export_filename(&block("react", "", None)), "code.jsx");
        assert_eq!(export_filename(&block("css", "", Some("site.css"))), "site.css");
    }

    #[test]
    fn test_standalone_document() {
        let html = block("html", "<p>raw</p>", None);
        assert_eq!(standalone_document(&html), "<p>raw</p>");

        let react = standalone_document(&block("jsx", "const App = () => <b/>;", None));
        assert!(react.contains("typeof App !== 'undefined' ? App : Component"));

        let css = standalone_document(&block("css", "p { margin: 0; }", None));
        assert!(css.contains("<body>\np { margin: 0; }\n</body>"));
    }
}
