//! Segmentation benchmark: cost of the full rescan done on every delta.
//!
//! Target: a 20 KB reply with a dozen fences rescans well under 1ms, so
//! re-running the pipeline per token stays invisible at 100+ tokens/s.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use livefence::{extract_blocks, render_message, segment_buffer, Message, MessageId, RenderConfig};
use std::time::Duration;

fn reply(blocks: usize) -> String {
    let mut text = String::new();
    for i in 0..blocks {
        text.push_str("Here is the next part of the page, with **some** emphasis and `inline` code.\n\n");
        text.push_str(&format!("```html part{i}.html\n"));
        for line in 0..40 {
            text.push_str(&format!("<div class=\"row-{line}\">Item {line}</div>\n"));
        }
        text.push_str("```\n\n");
    }
    text
}

fn extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_blocks");
    for blocks in [1, 4, 12] {
        let text = reply(blocks);
        group.bench_with_input(BenchmarkId::from_parameter(blocks), &text, |b, text| {
            b.iter(|| extract_blocks(black_box(text)));
        });
    }
    group.finish();
}

fn segment_streaming(c: &mut Criterion) {
    let text = reply(12);
    // Cut inside the last block so it is still open
    let cut = text.len() - 200;
    let partial = &text[..cut];

    c.bench_function("segment_buffer_streaming_12_blocks", |b| {
        b.iter(|| segment_buffer(black_box(partial), true));
    });
}

fn delta_rescan(c: &mut Criterion) {
    let text = reply(4);
    let chunks: Vec<usize> = (1..=text.len() / 64).map(|i| i * 64).collect();

    c.bench_function("rescan_per_delta_4_blocks", |b| {
        b.iter(|| {
            for &end in &chunks {
                black_box(segment_buffer(&text[..end], true));
            }
        });
    });
}

fn render(c: &mut Criterion) {
    let mut message = Message::assistant(MessageId(1));
    message.content = reply(4);
    let config = RenderConfig::default();

    c.bench_function("render_message_4_blocks", |b| {
        b.iter(|| render_message(black_box(&message), &config, Duration::ZERO));
    });
}

criterion_group!(benches, extract, segment_streaming, delta_rescan, render);
criterion_main!(benches);
