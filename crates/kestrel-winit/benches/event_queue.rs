use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use kestrel_core::geometry::Pos;
use kestrel_winit::platform::{EventPump, EventSink};
use kestrel_winit::{EventQueue, WindowEventKind, WindowId};

/// Emits `per_window` move events for each window, interleaved.
struct Interleaved {
    windows: Vec<WindowId>,
    per_window: usize,
}

impl EventPump for Interleaved {
    fn pump_events(&mut self, sink: &mut dyn EventSink) {
        for i in 0..self.per_window {
            for window in &self.windows {
                sink.push_window_event(
                    *window,
                    WindowEventKind::Moved {
                        position: Pos::new(i as i32, 0),
                    },
                );
            }
        }
    }
}

fn bench_poll_and_grab(c: &mut Criterion) {
    let mut group = c.benchmark_group("event_queue_poll");

    for window_count in [1u64, 4, 16] {
        let windows: Vec<WindowId> = (1..=window_count).map(WindowId::from).collect();
        let mut queue = EventQueue::new();
        for window in &windows {
            queue.connect_window(*window);
        }
        let mut pump = Interleaved {
            windows: windows.clone(),
            per_window: 64,
        };

        group.bench_with_input(
            BenchmarkId::from_parameter(window_count),
            &window_count,
            |b, _| {
                b.iter(|| {
                    queue.poll_events(&mut pump);
                    for window in &windows {
                        black_box(queue.grab_events(*window).len());
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_poll_and_grab);
criterion_main!(benches);
