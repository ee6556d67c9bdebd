//! Terminal layout of the preview panel.

use super::document::tab_label;
use super::host::{PreviewHost, PreviewStatus, PreviewSurface, ViewMode};
use super::session::PreviewSession;
use crate::render::{wrap_line, Line, Row, Span, Theme};

impl<S: PreviewSurface> PreviewHost<S> {
    /// Lay the panel out into at most `height` rows `width` columns wide.
    ///
    /// Header with status, tabs (when there is more than one block), then the
    /// body: the loaded document summary or the source of the active block.
    pub fn rows(&self, session: &PreviewSession, width: u16, height: u16, theme: &Theme) -> Vec<Row> {
        let width = usize::from(width);
        let mut rows = Vec::new();

        let mut header = Line::styled(" Preview", theme.code_header);
        if let Some(status) = self.header_status(session) {
            let pad = width.saturating_sub(header.width() + status.len() + 1);
            header.push(Span::styled(" ".repeat(pad), theme.code_header));
            header.push(Span::styled(status, theme.live_badge));
        }
        rows.push(Row::filled(header, theme.code_header));

        if session.blocks().len() > 1 {
            let mut tabs = Line::empty();
            for (i, block) in session.blocks().iter().enumerate() {
                let style = if i == session.active_index() {
                    theme.action_active
                } else {
                    theme.action
                };
                tabs.push(Span::styled(format!(" [{} {}]", i + 1, tab_label(block)), style));
            }
            rows.push(Row::plain(tabs));
        }
        rows.push(Row::default());

        match session.active_block().filter(|b| !b.code.is_empty()) {
            None => {
                let text = if session.is_streaming() {
                    "Waiting for code..."
                } else {
                    "No code yet..."
                };
                rows.push(Row::plain(Line::styled(format!(" {text}"), theme.muted)));
            }
            Some(block) => {
                if let PreviewStatus::Failed(message) = self.status() {
                    rows.push(Row::plain(Line::styled(format!(" ⚠ {message}"), theme.live_badge)));
                    rows.push(Row::default());
                }
                match self.view_mode() {
                    ViewMode::Code => {
                        for line in block.code.lines() {
                            let line = Line::styled(format!(" {line}"), theme.code_body);
                            rows.extend(wrap_line(&line, width).into_iter().map(Row::plain));
                        }
                    }
                    ViewMode::Preview => {
                        let text = match self.document() {
                            Some(doc) => format!(" ● {} preview loaded ({} bytes)", doc.kind, doc.html.len()),
                            None => " Rendering...".to_string(),
                        };
                        rows.push(Row::plain(Line::styled(text, theme.text)));
                        rows.push(Row::plain(Line::styled(
                            " Ctrl+E code · Ctrl+R refresh · Esc close",
                            theme.muted,
                        )));
                    }
                }
            }
        }

        rows.truncate(usize::from(height));
        rows
    }
}

#[cfg(test)]
mod tests {
    use crate::error::SurfaceError;
    use crate::fence::CodeBlock;
    use crate::preview::{PreviewConfig, PreviewDocument, PreviewHost, PreviewSession, PreviewSink, PreviewSurface};
    use crate::render::Theme;
    use std::time::{Duration, Instant};

    struct Null;

    impl PreviewSurface for Null {
        fn load(&mut self, _document: &PreviewDocument) -> Result<(), SurfaceError> {
            Ok(())
        }
    }

    fn block(language: &str, code: &str) -> CodeBlock {
        CodeBlock {
            language: language.to_string(),
            code: code.to_string(),
            filename: None,
            complete: true,
            source: 0..0,
        }
    }

    fn texts(host: &PreviewHost<Null>, session: &PreviewSession) -> Vec<String> {
        host.rows(session, 60, 20, &Theme::default())
            .iter()
            .map(|r| r.line.plain())
            .collect()
    }

    #[test]
    fn test_waiting_state() {
        let host = PreviewHost::new(Null, PreviewConfig::default());
        let mut session = PreviewSession::new();
        session.open(&[block("html", "")]);
        let rows = texts(&host, &session);
        assert!(rows[0].starts_with(" Preview"));
        assert!(rows[0].ends_with("Generating..."));
        assert_eq!(rows[2], " Waiting for code...");
    }

    #[test]
    fn test_tabs_and_loaded_document() {
        let mut host = PreviewHost::new(Null, PreviewConfig::default());
        let mut session = PreviewSession::new();
        session.show(&[block("html", "<p>a</p>"), block("css", "p {}")], false);
        let t0 = Instant::now();
        host.sync(&session, t0);
        host.sync(&session, t0 + Duration::from_millis(500));

        let rows = texts(&host, &session);
        assert_eq!(rows[1], " [1 html.html] [2 css.css]");
        assert!(rows[3].starts_with(" ● html preview loaded"));

        host.toggle_view_mode();
        let rows = texts(&host, &session);
        assert_eq!(rows[3], " <p>a</p>");
    }
}
