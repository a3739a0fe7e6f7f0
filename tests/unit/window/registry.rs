use super::*;

use std::{cell::RefCell, path::PathBuf, rc::Rc};

use crate::{
    config::RegistryConfig,
    foundation::core::{Raster, Rect, TimeMs},
    window::overlay::OverlaySurface,
};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "chromaframe_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

/// 20x10 gray template with a keyed 8x4 hole at (6, 3).
fn write_template(dir: &PathBuf, name: &str) -> PathBuf {
    let mut img = image::RgbaImage::from_pixel(20, 10, image::Rgba([80, 80, 80, 255]));
    for y in 3..7 {
        for x in 6..14 {
            img.put_pixel(x, y, image::Rgba([0, 255, 0, 255]));
        }
    }
    let path = dir.join(name);
    img.save(&path).unwrap();
    path
}

#[derive(Clone, Debug, PartialEq)]
enum Ev {
    Geometry(i32, i32, u32, u32),
    Template(u32, u32),
    Overlay(bool, f64),
    Raise,
    Lower,
}

type EventLog = Rc<RefCell<Vec<(String, Ev)>>>;

struct RecSurface {
    name: String,
    log: EventLog,
}

impl OverlaySurface for RecSurface {
    fn set_geometry(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.log
            .borrow_mut()
            .push((self.name.clone(), Ev::Geometry(x, y, width, height)));
    }
    fn present_template(&mut self, template: &Raster) {
        self.log.borrow_mut().push((
            self.name.clone(),
            Ev::Template(template.width(), template.height()),
        ));
    }
    fn present_overlay(&mut self, overlay: Option<&Raster>, _rect: Rect, opacity: f64) {
        self.log
            .borrow_mut()
            .push((self.name.clone(), Ev::Overlay(overlay.is_some(), opacity)));
    }
    fn raise(&mut self) {
        self.log.borrow_mut().push((self.name.clone(), Ev::Raise));
    }
    fn lower(&mut self) {
        self.log.borrow_mut().push((self.name.clone(), Ev::Lower));
    }
}

struct MemStore {
    saved: Rc<RefCell<Vec<RegistryConfig>>>,
}

impl ConfigStore for MemStore {
    fn save(&mut self, config: &RegistryConfig) -> ChromaResult<()> {
        self.saved.borrow_mut().push(config.clone());
        Ok(())
    }
}

struct Fixture {
    dir: PathBuf,
    template: PathBuf,
    log: EventLog,
    saved: Rc<RefCell<Vec<RegistryConfig>>>,
    registry: WindowRegistry,
}

impl Fixture {
    fn new(name: &str) -> Self {
        let dir = temp_dir(name);
        std::fs::create_dir_all(&dir).unwrap();
        let template = write_template(&dir, "frame.png");
        let log: EventLog = Rc::default();
        let saved: Rc<RefCell<Vec<RegistryConfig>>> = Rc::default();
        let registry = WindowRegistry::new(Box::new(MemStore {
            saved: saved.clone(),
        }));
        Self {
            dir,
            template,
            log,
            saved,
            registry,
        }
    }

    fn edit(&self) -> WindowEdit {
        WindowEdit {
            template_path: self.template.clone(),
            content_path: None,
            slideshow_folder: None,
            loop_mode: false,
            interval_secs: 5,
            ordering: crate::slideshow::OrderingPolicy::Alphabetical,
            transition: crate::animation::transition::TransitionKind::Fade,
            key_transparency: true,
            preserve_aspect: false,
        }
    }

    fn surface_factory(
        &self,
    ) -> impl FnMut(&str, &WindowState) -> ChromaResult<Box<dyn OverlaySurface>> + use<> {
        let log = self.log.clone();
        move |name, _state| {
            Ok(Box::new(RecSurface {
                name: name.to_string(),
                log: log.clone(),
            }) as Box<dyn OverlaySurface>)
        }
    }

    fn create(&mut self, n: usize) {
        let mut factory = self.surface_factory();
        for _ in 0..n {
            self.registry
                .create_window(&self.edit(), None, TimeMs(0), &mut factory)
                .unwrap();
        }
    }

    fn z_of(&self, name: &str) -> i64 {
        self.registry.window(name).unwrap().z_order()
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

#[test]
fn created_windows_get_sequential_names_and_z() {
    let mut fx = Fixture::new("create_seq");
    fx.create(3);

    let names: Vec<_> = fx.registry.names().map(str::to_string).collect();
    assert_eq!(names, vec!["window1", "window2", "window3"]);
    assert_eq!(fx.z_of("window1"), 1);
    assert_eq!(fx.z_of("window2"), 2);
    assert_eq!(fx.z_of("window3"), 3);

    let last = fx.saved.borrow().last().unwrap().clone();
    assert_eq!(last.windows.len(), 3);
}

#[test]
fn movable_click_brings_window_to_front() {
    let mut fx = Fixture::new("movable_click");
    fx.create(3);
    fx.registry.set_movable(true);
    fx.log.borrow_mut().clear();

    fx.registry.handle_click("window1");
    assert_eq!(fx.z_of("window1"), 4);
    assert_eq!(fx.z_of("window2"), 2);
    assert_eq!(fx.z_of("window3"), 3);
    assert_eq!(
        fx.log.borrow().as_slice(),
        &[("window1".to_string(), Ev::Raise)]
    );
}

#[test]
fn fixed_click_reasserts_saved_stacking() {
    let mut fx = Fixture::new("fixed_click");
    fx.create(3);
    assert!(!fx.registry.movable());
    fx.log.borrow_mut().clear();

    fx.registry.handle_click("window1");
    assert_eq!(fx.z_of("window1"), 1);
    assert_eq!(fx.z_of("window2"), 2);
    assert_eq!(fx.z_of("window3"), 3);

    // all lowered, then raised back in ascending z-order
    let events = fx.log.borrow().clone();
    let expected: Vec<(String, Ev)> = ["window1", "window2", "window3"]
        .iter()
        .map(|n| (n.to_string(), Ev::Lower))
        .chain(
            ["window1", "window2", "window3"]
                .iter()
                .map(|n| (n.to_string(), Ev::Raise)),
        )
        .collect();
    assert_eq!(events, expected);
}

#[test]
fn bring_to_front_is_inert_when_fixed() {
    let mut fx = Fixture::new("front_fixed");
    fx.create(2);
    fx.registry.bring_to_front("window1");
    assert_eq!(fx.z_of("window1"), 1);
}

#[test]
fn load_orders_by_z_and_isolates_failures() {
    let mut fx = Fixture::new("load_iso");

    let mut windows = std::collections::BTreeMap::new();
    for (name, z) in [("window1", 3i64), ("window2", 1), ("window3", 2)] {
        let mut state = WindowState::from_edit(&fx.edit(), 20, 10, z);
        state.z_order = z;
        windows.insert(name.to_string(), state);
    }
    let mut bad = WindowState::from_edit(&fx.edit(), 20, 10, 4);
    bad.template_path = fx.dir.join("gone.png");
    windows.insert("window4".to_string(), bad);

    let config = RegistryConfig {
        windows_movable: true,
        windows,
    };
    let mut factory = fx.surface_factory();
    let report = fx.registry.load(config, TimeMs(0), &mut factory);

    assert_eq!(report.loaded, 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "window4");
    assert!(matches!(
        report.failed[0].1,
        ChromaError::InvalidTemplate(_)
    ));
    assert!(fx.registry.movable());

    // stacking restored in ascending persisted z: 2, 3, 1
    let raises: Vec<String> = fx
        .log
        .borrow()
        .iter()
        .filter(|(_, e)| *e == Ev::Raise)
        .map(|(n, _)| n.clone())
        .collect();
    let tail = &raises[raises.len() - 3..];
    assert_eq!(tail, ["window2", "window3", "window1"]);
}

#[test]
fn edit_rejecting_bad_template_leaves_window_untouched() {
    let mut fx = Fixture::new("edit_reject");
    fx.create(1);

    let mut edit = fx.edit();
    edit.template_path = fx.dir.join("gone.png");
    let mut factory = fx.surface_factory();
    let err = fx
        .registry
        .edit_window("window1", &edit, TimeMs(0), &mut factory)
        .unwrap_err();
    assert!(matches!(err, ChromaError::InvalidTemplate(_)));
    assert_eq!(
        fx.registry.window("window1").unwrap().state().template_path,
        fx.template
    );
}

#[test]
fn edit_preserves_geometry_and_z() {
    let mut fx = Fixture::new("edit_keep");
    fx.create(2);
    fx.registry.move_window("window1", 77, 88).unwrap();

    let mut edit = fx.edit();
    edit.transition = crate::animation::transition::TransitionKind::WipeRight;
    let mut factory = fx.surface_factory();
    fx.registry
        .edit_window("window1", &edit, TimeMs(0), &mut factory)
        .unwrap();

    let state = fx.registry.window("window1").unwrap().state();
    assert_eq!((state.pos_x, state.pos_y), (77, 88));
    assert_eq!(state.z_order, 1);
    assert_eq!(
        state.transition,
        crate::animation::transition::TransitionKind::WipeRight
    );
}

#[test]
fn remove_window_persists_shrunken_config() {
    let mut fx = Fixture::new("remove");
    fx.create(2);
    fx.registry.remove_window("window1").unwrap();
    assert_eq!(fx.registry.len(), 1);

    let last = fx.saved.borrow().last().unwrap().clone();
    assert!(!last.windows.contains_key("window1"));
    assert!(last.windows.contains_key("window2"));

    assert!(fx.registry.remove_window("window1").is_err());
}

#[test]
fn movable_flag_is_persisted() {
    let mut fx = Fixture::new("movable_flag");
    fx.create(1);
    fx.registry.set_movable(true);
    assert!(fx.saved.borrow().last().unwrap().windows_movable);
}

#[test]
fn next_name_skips_live_windows() {
    let mut fx = Fixture::new("next_name");
    fx.create(3);
    fx.registry.remove_window("window2").unwrap();
    let mut factory = fx.surface_factory();
    let name = fx
        .registry
        .create_window(&fx.edit(), None, TimeMs(0), &mut factory)
        .unwrap();
    assert_eq!(name, "window2");
    assert_eq!(fx.z_of("window2"), 4);
}

#[test]
fn create_from_base_offsets_position() {
    let mut fx = Fixture::new("base_offset");
    fx.create(1);
    fx.registry.move_window("window1", 100, 200).unwrap();
    let mut factory = fx.surface_factory();
    let name = fx
        .registry
        .create_window(&fx.edit(), Some("window1"), TimeMs(0), &mut factory)
        .unwrap();
    let state = fx.registry.window(&name).unwrap().state();
    assert_eq!((state.pos_x, state.pos_y), (140, 240));
}
