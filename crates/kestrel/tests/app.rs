mod common;

use common::{Recorder, descriptor, window_key};
use kestrel::{App, AppContext, AppState, Extension, QuitOnLastWindowClosed, create_simple_app};
use kestrel_core::geometry::Size;
use kestrel_test_utils::{GpuCall, JournalEntry, MockRig, PlatformCall};
use kestrel_winit::{WindowEventKind, WindowId};

fn notes_for(notes: &[String], label: &str) -> Vec<String> {
    notes
        .iter()
        .filter(|note| note.starts_with(label))
        .cloned()
        .collect()
}

#[test]
fn test_lifecycle_ordering_over_one_run() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend)
        .with_extension(Recorder::new("E1", &rig.journal))
        .with_extension(Recorder::new("E2", &rig.journal));
    let window = app.create_window(&descriptor(100, 100)).unwrap();
    let w = window_key(window);

    app.start();
    app.tick();
    rig.platform.request_close(window);
    app.tick();
    assert!(app.stop());
    app.shutdown();

    let mut expected = vec![
        "E1.initialize".to_string(),
        "E2.initialize".to_string(),
        format!("E1.created({})", w),
        format!("E2.created({})", w),
    ];
    for _ in 0..2 {
        expected.extend([
            "E1.frame_begin".to_string(),
            "E2.frame_begin".to_string(),
            "E1.update".to_string(),
            "E2.update".to_string(),
            format!("E1.render({})", w),
            format!("E2.render({})", w),
            "E1.frame_end".to_string(),
            "E2.frame_end".to_string(),
        ]);
    }
    expected.extend([
        format!("E1.destroyed({}, alive=true)", w),
        format!("E2.destroyed({}, alive=true)", w),
        "E1.terminate".to_string(),
        "E2.terminate".to_string(),
    ]);
    assert_eq!(rig.journal.notes(), expected);
}

#[test]
fn test_destroyed_notifications_precede_teardown() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend)
        .with_extension(Recorder::new("E1", &rig.journal))
        .with_extension(Recorder::new("E2", &rig.journal));
    let window = app.create_window(&descriptor(100, 100)).unwrap();
    let w = window_key(window);
    app.start();

    rig.platform.request_close(window);
    app.tick();

    let last_note = rig
        .journal
        .note_position(&format!("E2.destroyed({}, alive=true)", w))
        .expect("E2 was told about the closed window");
    let reset_view = rig
        .journal
        .position(|entry| matches!(entry, JournalEntry::Gpu(GpuCall::ResetView(_))))
        .unwrap();
    let destroy_window = rig
        .journal
        .position(|entry| {
            matches!(entry, JournalEntry::Platform(PlatformCall::DestroyWindow(id)) if *id == window)
        })
        .unwrap();

    assert!(last_note < reset_view);
    assert!(reset_view < destroy_window);
    assert!(app.context().windows().is_empty());
    assert!(!app.context().events().is_connected(window));
    assert!(app.context().graphics().reserved_views().is_empty());
}

#[test]
fn test_frame_is_submitted_after_render() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Recorder::new("E1", &rig.journal));
    let window = app.create_window(&descriptor(10, 10)).unwrap();
    let view = app.context().window(window).unwrap().view();
    app.start();
    rig.journal.clear();

    app.tick();

    let touch = rig
        .journal
        .position(|entry| matches!(entry, JournalEntry::Gpu(GpuCall::Touch(v)) if *v == view))
        .unwrap();
    let render = rig
        .journal
        .note_position(&format!("E1.render({})", window_key(window)))
        .unwrap();
    let frame_end = rig.journal.note_position("E1.frame_end").unwrap();
    let submit = rig
        .journal
        .position(|entry| matches!(entry, JournalEntry::Gpu(GpuCall::SubmitFrame(1))))
        .unwrap();

    assert!(touch < render);
    assert!(frame_end < submit);
    assert_eq!(rig.gpu.last_frame_touched(), vec![view]);
}

#[test]
fn test_pause_skips_update_only() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Recorder::new("E1", &rig.journal));
    let window = app.create_window(&descriptor(10, 10)).unwrap();
    let w = window_key(window);
    app.start();
    rig.journal.clear();

    assert!(app.pause());
    app.tick();
    app.tick();
    let paused_frame = vec![
        "E1.frame_begin".to_string(),
        format!("E1.render({})", w),
        "E1.frame_end".to_string(),
    ];
    assert_eq!(rig.journal.notes(), [paused_frame.clone(), paused_frame].concat());
    assert_eq!(rig.gpu.frame_count(), 2);

    rig.journal.clear();
    assert!(app.resume());
    app.tick();
    assert!(rig.journal.notes().contains(&"E1.update".to_string()));
}

#[test]
fn test_invalid_transitions_are_rejected() {
    let (platform, backend, _rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend);

    assert!(!app.pause());
    assert!(!app.stop());
    assert!(!app.resume());
    assert_eq!(app.state(), AppState::Unset);

    app.start();
    assert!(!app.resume());
    assert!(app.pause());
    assert!(app.stop());
    assert!(!app.pause());
    assert_eq!(app.state(), AppState::Stop);
}

#[test]
#[should_panic(expected = "already running")]
fn test_starting_twice_is_fatal() {
    let (platform, backend, _rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend);
    app.start();
    app.start();
}

#[test]
#[should_panic(expected = "cannot drive more than one window")]
fn test_second_window_needs_multiple_surfaces() {
    let (platform, backend, _rig) = MockRig::single_surface();
    let mut app = App::new(platform, backend);
    app.create_window(&descriptor(10, 10)).unwrap();
    let _ = app.create_window(&descriptor(10, 10));
}

#[test]
fn test_resize_reconciliation_touches_only_resized_window() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Recorder::new("E1", &rig.journal));
    let a = app.create_window(&descriptor(320, 240)).unwrap();
    let b = app.create_window(&descriptor(200, 100)).unwrap();
    let (fb_b, _) = rig.gpu.framebuffer_of_window(b).unwrap();
    app.start();
    rig.journal.clear();

    rig.platform.resize(a, Size::new(640, 480));
    app.tick();

    let (fb_a, size_a) = rig.gpu.framebuffer_of_window(a).unwrap();
    assert_eq!(size_a, Size::new(640, 480));
    assert_eq!(rig.gpu.framebuffer_of_window(b), Some((fb_b, Size::new(200, 100))));
    assert_eq!(app.context().window(a).unwrap().frame_size(), Size::new(640, 480));

    let destroyed: Vec<_> = rig
        .journal
        .gpu_calls()
        .into_iter()
        .filter(|call| matches!(call, GpuCall::DestroyFramebuffer(_)))
        .collect();
    assert_eq!(destroyed.len(), 1);

    let recreated = rig
        .journal
        .position(|entry| {
            matches!(entry, JournalEntry::Gpu(GpuCall::CreateFramebuffer { framebuffer, .. }) if *framebuffer == fb_a)
        })
        .unwrap();
    let first_hook = rig.journal.note_position("E1.frame_begin").unwrap();
    assert!(recreated < first_hook);
}

#[test]
fn test_failed_resize_is_retried_next_tick() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend);
    let a = app.create_window(&descriptor(320, 240)).unwrap();
    app.start();

    rig.gpu.fail_next_framebuffer();
    rig.platform.resize(a, Size::new(640, 480));
    app.tick();

    let window = app.context().window(a).unwrap();
    assert_eq!(window.framebuffer(), None);
    assert_eq!(window.frame_size(), Size::new(320, 240));
    assert!(!rig.gpu.is_view_bound(window.view()));

    // No new resize event; the drawable size comes from the platform.
    app.tick();

    let window = app.context().window(a).unwrap();
    let (framebuffer, size) = rig.gpu.framebuffer_of_window(a).unwrap();
    assert_eq!(size, Size::new(640, 480));
    assert_eq!(window.framebuffer(), Some(framebuffer));
    assert_eq!(window.frame_size(), Size::new(640, 480));
    assert_eq!(rig.gpu.view_framebuffer(window.view()), Some(framebuffer));
}

#[test]
fn test_both_windows_resize_independently() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend);
    let a = app.create_window(&descriptor(100, 100)).unwrap();
    let b = app.create_window(&descriptor(100, 100)).unwrap();
    app.start();

    rig.platform.resize(a, Size::new(300, 200));
    rig.platform.resize(b, Size::new(50, 60));
    app.tick();

    assert_eq!(rig.gpu.framebuffer_of_window(a).unwrap().1, Size::new(300, 200));
    assert_eq!(rig.gpu.framebuffer_of_window(b).unwrap().1, Size::new(50, 60));
}

#[test]
fn test_single_surface_resize_resets_backbuffer() {
    let (platform, backend, rig) = MockRig::single_surface();
    let mut app = App::new(platform, backend);
    let window = app.create_window(&descriptor(100, 100)).unwrap();
    app.start();

    rig.platform.resize(window, Size::new(256, 128));
    app.tick();

    assert_eq!(rig.gpu.backbuffer(), Some((window, Size::new(256, 128))));
    assert!(rig.gpu.live_framebuffers().is_empty());
}

#[test]
fn test_quit_extension_stops_after_last_window() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = create_simple_app(platform, backend);
    let window = app.create_window(&descriptor(10, 10)).unwrap();
    rig.platform.request_close(window);

    app.run();

    assert_eq!(app.state(), AppState::Stop);
    assert_eq!(rig.gpu.frame_count(), 2);
    assert_eq!(rig.platform.window_count(), 0);
}

#[test]
fn test_run_until_stopped() {
    struct StopOnFrame(u64);

    impl Extension for StopOnFrame {
        fn on_update(&mut self, ctx: &mut AppContext, _dt: f32) {
            if ctx.time().frame_count == self.0 {
                ctx.stop();
            }
        }
    }

    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend)
        .with_extension(StopOnFrame(5))
        .with_extension(Recorder::new("E1", &rig.journal));
    app.create_window(&descriptor(10, 10)).unwrap();
    app.run();

    let notes = rig.journal.notes();
    assert_eq!(rig.gpu.frame_count(), 5);
    assert_eq!(notes_for(&notes, "E1.update").len(), 5);
    assert_eq!(notes.last().map(String::as_str), Some("E1.terminate"));
    assert_eq!(rig.platform.window_count(), 0);
    assert!(rig.gpu.live_framebuffers().is_empty());
}

#[test]
fn test_extension_added_while_running_is_initialized() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend);
    app.start();

    app.add_extension(Recorder::new("E3", &rig.journal));
    assert_eq!(rig.journal.notes(), vec!["E3.initialize".to_string()]);
    assert_eq!(app.extension_count(), 1);
}

#[test]
fn test_extension_added_from_hook_joins_before_next_phase() {
    struct Spawner {
        journal: kestrel_test_utils::Journal,
        spawned: bool,
    }

    impl Extension for Spawner {
        fn on_update(&mut self, ctx: &mut AppContext, _dt: f32) {
            if !self.spawned {
                self.spawned = true;
                ctx.add_extension(Recorder::new("late", &self.journal));
            }
        }
    }

    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Spawner {
        journal: rig.journal.clone(),
        spawned: false,
    });
    let window = app.create_window(&descriptor(10, 10)).unwrap();
    app.start();
    app.tick();

    assert_eq!(
        rig.journal.notes(),
        vec![
            "late.initialize".to_string(),
            format!("late.render({})", window_key(window)),
            "late.frame_end".to_string(),
        ]
    );
    assert_eq!(app.extension_count(), 2);
}

#[test]
fn test_window_created_from_hook_is_announced() {
    struct Opener {
        opened: Option<WindowId>,
    }

    impl Extension for Opener {
        fn on_update(&mut self, ctx: &mut AppContext, _dt: f32) {
            if self.opened.is_none() {
                self.opened = ctx.create_window(&common::descriptor(10, 10)).ok();
            }
        }
    }

    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend)
        .with_extension(Opener { opened: None })
        .with_extension(Recorder::new("E1", &rig.journal));
    app.start();
    app.tick();

    let window = rig.platform.window_ids()[0];
    let w = window_key(window);
    let notes = rig.journal.notes();
    let created = notes.iter().position(|n| *n == format!("E1.created({})", w)).unwrap();
    let update = notes.iter().position(|n| n == "E1.update").unwrap();
    let render = notes.iter().position(|n| *n == format!("E1.render({})", w)).unwrap();
    assert!(update < created && created < render);
    assert!(app.context().events().is_connected(window));
}

#[test]
fn test_close_window_from_hook() {
    struct CloseAll;

    impl Extension for CloseAll {
        fn on_frame_end(&mut self, ctx: &mut AppContext) {
            for window in ctx.window_ids() {
                ctx.close_window(window);
            }
        }
    }

    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend)
        .with_extension(QuitOnLastWindowClosed)
        .with_extension(CloseAll);
    app.create_window(&descriptor(10, 10)).unwrap();
    app.create_window(&descriptor(10, 10)).unwrap();
    app.run();

    assert_eq!(rig.platform.window_count(), 0);
    assert_eq!(rig.gpu.frame_count(), 2);
}

#[test]
fn test_events_are_read_per_window() {
    struct Watch {
        journal: kestrel_test_utils::Journal,
    }

    impl Extension for Watch {
        fn on_render(&mut self, ctx: &mut AppContext, window: WindowId) {
            for event in ctx.events().grab_events(window) {
                if let WindowEventKind::CharEntered { codepoint } = event.kind {
                    self.journal.note(format!("{}:{}", window_key(window), codepoint));
                }
            }
        }
    }

    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Watch {
        journal: rig.journal.clone(),
    });
    let a = app.create_window(&descriptor(10, 10)).unwrap();
    let b = app.create_window(&descriptor(10, 10)).unwrap();
    app.start();

    for (window, codepoint) in [(a, 'x'), (b, 'y'), (a, 'z')] {
        rig.platform
            .push_window_event(window, WindowEventKind::CharEntered { codepoint });
    }
    app.tick();

    let (a, b) = (window_key(a), window_key(b));
    assert_eq!(
        rig.journal.notes(),
        vec![format!("{}:x", a), format!("{}:z", a), format!("{}:y", b)]
    );
}

#[test]
fn test_shutdown_releases_open_windows() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Recorder::new("E1", &rig.journal));
    app.create_window(&descriptor(10, 10)).unwrap();
    app.start();
    app.tick();
    app.stop();
    app.shutdown();

    assert_eq!(rig.platform.window_count(), 0);
    assert!(rig.gpu.live_framebuffers().is_empty());
    assert!(app.context().graphics().reserved_views().is_empty());
    assert!(
        notes_for(&rig.journal.notes(), "E1.destroyed").is_empty(),
        "shutdown releases windows without notifications"
    );
}

#[test]
fn test_shutdown_without_start_skips_terminate() {
    let (platform, backend, rig) = MockRig::multi_surface();
    let mut app = App::new(platform, backend).with_extension(Recorder::new("E1", &rig.journal));
    app.create_window(&descriptor(10, 10)).unwrap();

    app.shutdown();

    assert!(rig.journal.notes().is_empty());
    assert_eq!(app.state(), AppState::Unset);
    assert_eq!(rig.platform.window_count(), 0);
    assert!(app.context().graphics().reserved_views().is_empty());
}
