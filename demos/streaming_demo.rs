//! Streaming Demo: an assistant reply with code fences, streamed at ~100 tokens/s.
//!
//! The left pane is the transcript, the right pane the live preview panel.
//! Each loaded preview document is also written to a file in the temp
//! directory, so it can be opened in a browser.
//!
//! Keys: Esc close preview, Ctrl+P toggle it, Tab next tab, Ctrl+E code view,
//! Ctrl+R refresh, Ctrl+D save block, Ctrl+O standalone page, Ctrl+S stop, q quit.

use crossbeam_channel::unbounded;
use livefence::preview::FileSurface;
use livefence::render::{paint_rows, Line, Row};
use livefence::terminal::{InputActor, Terminal};
use livefence::{Canvas, Coordinator, CoordinatorConfig, MessageId, Rect, Rgb, StreamEvent, Style};
use std::thread;
use std::time::{Duration, Instant};

/// Sample reply to stream (simulating an LLM response).
const SAMPLE_REPLY: &str = r#"Sure! Here is a small landing page with a counter.

## Markup

```html index.html
<!DOCTYPE html>
<html>
<body>
  <h1>Livefence</h1>
  <p>Streaming previews, one delta at a time.</p>
  <button id="count">Clicked 0 times</button>
</body>
</html>
```

## Styles

```css styles.css
body { font-family: system-ui, sans-serif; padding: 32px; }
h1 { color: #2563eb; }
button { padding: 8px 16px; border-radius: 8px; }
```

## Behavior

```jsx Counter.jsx
function App() {
  const [count, setCount] = useState(0);
  return (
    <button onClick={() => setCount(count + 1)}>
      Clicked {count} times
    </button>
  );
}
```

Open the **preview** panel to see each block rendered. Press `Tab` to switch between them.
"#;

fn main() -> std::io::Result<()> {
    println!("Livefence Streaming Demo");
    println!("========================");
    println!("This will stream a reply with three code blocks at ~100 tokens/s.");
    println!("Press 'q' to quit.\n");

    thread::sleep(Duration::from_secs(2));

    let preview_path = std::env::temp_dir().join("livefence-preview.html");
    let mut coordinator = Coordinator::new(FileSurface::new(&preview_path), CoordinatorConfig::default());
    coordinator.chat_mut().push_user("Build me a landing page with a counter.", Vec::new());
    let reply = coordinator.chat_mut().begin_assistant(Instant::now());

    let (event_tx, event_rx) = unbounded();
    let (command_tx, command_rx) = unbounded();

    let producer = thread::Builder::new()
        .name("livefence-demo-stream".to_string())
        .spawn(move || stream_reply(reply, &event_tx))?;
    let input = InputActor::spawn(command_tx, Duration::from_millis(10))?;

    let mut terminal = Terminal::enter()?;
    let (width, height) = terminal.size()?;
    let mut canvas = Canvas::new(width, height);
    let theme = coordinator.chat().config().theme;
    let footer_style = Style::PLAIN.fg(Rgb::new(150, 150, 150)).bg(Rgb::new(30, 30, 30));

    let started = Instant::now();
    let mut frames = 0u64;

    coordinator.run(&event_rx, &command_rx, |c, now| {
        frames += 1;
        canvas.clear();
        let body = Rect::new(0, 0, width, height.saturating_sub(1));

        let (chat_area, preview_area) = if c.session().is_open() {
            let (left, right) = body.split_horizontal(width * 3 / 5);
            (left, Some(right))
        } else {
            (body, None)
        };

        c.chat().paint(&mut canvas, chat_area, now);
        if let Some(area) = preview_area {
            let rows = c.host().rows(c.session(), area.width, area.height, &theme);
            paint_rows(&mut canvas, area, &rows);
        }

        let elapsed = started.elapsed().as_secs_f32();
        let saved = c.last_export().unwrap_or(preview_path.as_path());
        let status = format!(
            " q quit | Esc close preview | Ctrl+P toggle | Frames: {frames} | {:.1}s | {}",
            elapsed,
            saved.display()
        );
        let footer = Rect::new(0, height.saturating_sub(1), width, 1);
        paint_rows(&mut canvas, footer, &[Row::filled(Line::styled(status, footer_style), footer_style)]);

        if let Err(e) = terminal.draw(&canvas) {
            log::warn!("Frame dropped: {e}");
        }
    })?;

    input.join();
    if producer.join().is_err() {
        log::warn!("Stream producer panicked");
    }
    Ok(())
}

/// Send the sample reply as 1-3 character deltas, about 100 per second.
fn stream_reply(id: MessageId, events: &crossbeam_channel::Sender<StreamEvent>) {
    // Thinking pause before the first token
    thread::sleep(Duration::from_millis(800));

    let chars: Vec<char> = SAMPLE_REPLY.chars().collect();
    let mut index = 0;
    while index < chars.len() {
        // Pseudo-random 1-3 chars per token
        let end = (index + (index * 7) % 3 + 1).min(chars.len());
        let delta = StreamEvent::Delta {
            message_id: id,
            text: chars[index..end].iter().collect(),
        };
        if events.send(delta).is_err() {
            return;
        }
        index = end;
        thread::sleep(Duration::from_millis(10));
    }
    if events.send(StreamEvent::Done { message_id: id }).is_err() {
        log::warn!("Session ended before the reply finished");
    }
}
