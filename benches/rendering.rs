//! Benchmarks for markdown rendering and preview refresh.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mdtab::bootstrap::CHEATSHEET;
use mdtab::render::{HtmlRenderer, Renderer, TerminalRenderer};
use mdtab::session::Session;
use mdtab::storage::MemoryStorage;

fn bench_html(c: &mut Criterion) {
    let renderer = HtmlRenderer::new();
    c.bench_function("html_cheatsheet", |b| {
        b.iter(|| renderer.render(black_box(CHEATSHEET)))
    });
}

fn bench_terminal(c: &mut Criterion) {
    let renderer = TerminalRenderer::new();
    c.bench_function("terminal_cheatsheet", |b| {
        b.iter(|| renderer.render(black_box(CHEATSHEET)))
    });

    let large = CHEATSHEET.repeat(20);
    c.bench_function("terminal_cheatsheet_x20", |b| {
        b.iter(|| renderer.render(black_box(&large)))
    });
}

fn bench_edit_and_render(c: &mut Criterion) {
    let storage = MemoryStorage::new().with_file("/bench/doc.md", CHEATSHEET);
    let mut session = Session::new(storage);
    let id = session.open_document("/bench/doc.md");
    let renderer = TerminalRenderer::new();
    let mut text = CHEATSHEET.to_string();

    c.bench_function("edit_then_preview", |b| {
        b.iter(|| {
            text.push('x');
            session.edit_document(id, text.clone()).ok();
            session.drain_events();
            let doc = session.get(id).map(|doc| doc.content().to_string()).unwrap_or_default();
            renderer.render(black_box(&doc))
        })
    });
}

criterion_group!(benches, bench_html, bench_terminal, bench_edit_and_render);
criterion_main!(benches);
