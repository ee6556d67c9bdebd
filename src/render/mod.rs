//! Render module: from messages to painted cells.
//!
//! ```text
//! Message ──► render_message ──► RenderedMessage ──► MessageView::rows ──► paint_rows ──► Canvas
//!               (pure)              (parts)            (viewports, copy)                 (cells)
//! ```

mod canvas;
mod markdown;
mod message;
mod style;
mod view;

pub use canvas::{Canvas, Cell, Rect, DEFAULT_BG, DEFAULT_FG};
pub use markdown::render_markdown;
pub use message::{
    render_message, thinking_label, CodeCard, MessageActions, Part, RenderConfig, RenderedMessage,
    THINKING_LABELS,
};
pub use style::{Line, Modifiers, Rgb, Span, Style, Theme};
pub use view::{paint_rows, wrap_line, CodeViewport, MessageView, Row};
