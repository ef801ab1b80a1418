//! # Layout Benchmark
//!
//! Full layout passes and interpolation over a wide, two-level tree.
//!
//! Run with: `cargo bench --package mosaic_ui`

// Benchmarks don't need docs
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mosaic_ui::{BasicTheme, ContainerConfig, UiContainer, UiElement, Visibility};

const FRAME: f32 = 1.0 / 60.0;

/// Builds `panels` containers holding eight mixed children each.
fn build(panels: usize) -> (UiContainer, Vec<mosaic_ui::ElementId>) {
    let config = ContainerConfig::default()
        .with_size(1280, 720)
        .with_default_visibility(Visibility::Visible);
    let mut container = UiContainer::new(config);
    container.set_theme(Some(Arc::new(BasicTheme::new("bench"))));

    let mut panel_ids = Vec::with_capacity(panels);
    for _ in 0..panels {
        let panel = container.insert(UiElement::container().with_layout("xs-12c md-6c lg-4c"));
        container.add(panel);
        for n in 0..8 {
            let child = match n % 3 {
                0 => UiElement::label("Lorem ipsum dolor sit amet, consectetur adipiscing"),
                1 => UiElement::text_button("Confirm").with_layout("xs-6c"),
                _ => UiElement::text_box("name").with_layout("xs-6c"),
            };
            let child = container.insert(child);
            container.add_child(panel, child);
        }
        panel_ids.push(panel);
    }
    container.update(FRAME);
    (container, panel_ids)
}

/// Benchmark: relayout after a resize dirties the whole tree.
fn bench_full_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_layout");

    for panels in [10, 100, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(panels), &panels, |b, &panels| {
            let (mut container, _) = build(panels);
            let mut wide = false;
            b.iter(|| {
                wide = !wide;
                let width = if wide { 1920 } else { 800 };
                container.resize(width, 720);
                container.update(FRAME);
                black_box(container.screen_size())
            });
        });
    }

    group.finish();
}

/// Benchmark: frame with nothing dirty.
fn bench_idle_update(c: &mut Criterion) {
    let (mut container, _) = build(1_000);
    c.bench_function("idle_update_1000_panels", |b| {
        b.iter(|| container.update(black_box(FRAME)));
    });
}

/// Benchmark: interpolation while every panel moves.
fn bench_interpolate(c: &mut Criterion) {
    let (mut container, panels) = build(1_000);
    let mut toggle = false;
    c.bench_function("interpolate_1000_panels", |b| {
        b.iter(|| {
            toggle = !toggle;
            let layout = if toggle { "xs-6c" } else { "xs-4c" };
            for &panel in &panels {
                if let Some(mut element) = container.element_mut(panel) {
                    element.set_layout(layout);
                }
            }
            container.update(FRAME);
            for step in 1..=4 {
                container.interpolate(step as f32 * 0.25);
            }
        });
    });
}

criterion_group!(benches, bench_full_layout, bench_idle_update, bench_interpolate);
criterion_main!(benches);
