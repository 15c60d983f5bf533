#![cfg(feature = "egui")]

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::descriptor;
use kestrel::egui::egui;
use kestrel::{App, EguiExtension};
use kestrel_core::math::Vec2;
use kestrel_test_utils::MockRig;
use kestrel_winit::{WindowEventKind, WindowId};

#[test]
fn test_gui_runs_per_window_with_forwarded_input() {
    let seen: Rc<RefCell<Vec<(WindowId, Option<egui::Pos2>)>>> = Rc::default();
    let outputs = Rc::new(RefCell::new(0usize));

    let (platform, backend, rig) = MockRig::multi_surface();
    let extension = {
        let seen = seen.clone();
        let outputs = outputs.clone();
        EguiExtension::new(move |window, ctx| {
            seen.borrow_mut()
                .push((window, ctx.input(|i| i.pointer.latest_pos())));
        })
        .with_output_handler(move |_ctx, _window, _output| {
            *outputs.borrow_mut() += 1;
        })
    };
    let mut app = App::new(platform, backend).with_extension(extension);
    let a = app.create_window(&descriptor(200, 100)).unwrap();
    let b = app.create_window(&descriptor(200, 100)).unwrap();
    app.start();

    rig.platform.push_window_event(
        a,
        WindowEventKind::MousePosition {
            position: Vec2::new(10.0, 20.0),
        },
    );
    rig.platform
        .push_window_event(b, WindowEventKind::Closed);
    app.tick();

    assert_eq!(
        *seen.borrow(),
        vec![(a, Some(egui::pos2(10.0, 20.0))), (b, None)]
    );
    assert_eq!(*outputs.borrow(), 2);
}

#[test]
fn test_gui_context_follows_window_lifetime() {
    let calls = Rc::new(RefCell::new(Vec::new()));

    let (platform, backend, rig) = MockRig::multi_surface();
    let extension = {
        let calls = calls.clone();
        EguiExtension::new(move |window, _ctx| calls.borrow_mut().push(window))
    };
    let mut app = App::new(platform, backend).with_extension(extension);
    let a = app.create_window(&descriptor(50, 50)).unwrap();
    app.start();
    app.tick();

    rig.platform.request_close(a);
    app.tick();
    app.tick();

    // Two frames with the window, none after it closed.
    assert_eq!(*calls.borrow(), vec![a, a]);
}

#[test]
fn test_gui_follows_content_scale_changes() {
    let seen: Rc<RefCell<Vec<(f32, Option<egui::Pos2>)>>> = Rc::default();

    let (platform, backend, rig) = MockRig::multi_surface();
    let extension = {
        let seen = seen.clone();
        EguiExtension::new(move |_window, ctx| {
            seen.borrow_mut()
                .push((ctx.pixels_per_point(), ctx.input(|i| i.pointer.latest_pos())));
        })
    };
    let mut app = App::new(platform, backend).with_extension(extension);
    let a = app.create_window(&descriptor(200, 100)).unwrap();
    app.start();
    app.tick();

    rig.platform.push_window_event(
        a,
        WindowEventKind::ContentScaleChanged {
            scale: Vec2::splat(2.0),
        },
    );
    rig.platform.push_window_event(
        a,
        WindowEventKind::MousePosition {
            position: Vec2::new(20.0, 40.0),
        },
    );
    app.tick();

    assert_eq!(
        *seen.borrow(),
        vec![(1.0, None), (2.0, Some(egui::pos2(10.0, 20.0)))]
    );
}
