//! Overlay behavior seen from the host: a shared pointer source, several
//! widgets, and the hover preview.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pickset::render::FnRenderer;
use pickset::{
    FilterConfig, FilterMode, FilterableItem, MultiFilter, PageRequest, PageResponse, PointerDown,
    PreviewSide, Rect, SharedSelection, Signal, WidgetLayout,
};

#[derive(Debug, Clone, PartialEq)]
struct Brand {
    id: u64,
    name: &'static str,
}

impl FilterableItem for Brand {
    type Id = u64;

    fn id(&self) -> &u64 {
        &self.id
    }
}

type BrandFilter = MultiFilter<Brand, FnRenderer<Brand, String>>;

fn layout_at(x: f32) -> WidgetLayout {
    WidgetLayout {
        root: Rect::new(x, 100.0, 200.0, 32.0),
        mode_menu: Some(Rect::new(x, 100.0, 60.0, 140.0)),
        viewport: Rect::new(0.0, 0.0, 1280.0, 720.0),
    }
}

fn brand_filter(pointer: &Arc<Signal<PointerDown>>, layout: WidgetLayout) -> BrandFilter {
    let renderer = FnRenderer::new(
        |b: &Brand, _| b.name.to_string(),
        |b: &Brand, _| b.name.to_string(),
        |b: &Brand, ctx| format!("{:?}+{}", ctx.side(), ctx.placement.offset),
    );
    let selection = SharedSelection::new();
    let host = selection.clone();
    let filter = MultiFilter::new(FilterConfig::new().with_label("Brand"), selection, renderer)
        .with_pointer_source(pointer.clone())
        .with_layout(layout);
    filter.selection_changed.connect(move |ids| {
        host.replace(ids.clone());
    });
    filter
}

/// Mount and answer the initial fetch by hand.
fn mount_with(filter: &mut BrandFilter, items: Vec<Brand>) -> Instant {
    let requests: Arc<Mutex<Vec<PageRequest>>> = Arc::default();
    let sink = requests.clone();
    filter.fetch_requested.connect(move |req| sink.lock().push(req.clone()));

    let t0 = Instant::now();
    filter.mount(t0);
    let t1 = t0 + Duration::from_millis(300);
    filter.pump(t1);
    let ticket = requests.lock()[0].ticket;
    let total = items.len();
    filter.deliver(ticket, Ok(PageResponse { items, total }));
    t1
}

fn brands() -> Vec<Brand> {
    vec![
        Brand { id: 1, name: "Skintific" },
        Brand { id: 2, name: "Somethinc" },
        Brand { id: 3, name: "Wardah" },
    ]
}

#[test]
fn test_subscription_follows_open_overlays() {
    let pointer = Arc::new(Signal::<PointerDown>::new());
    let mut filter = brand_filter(&pointer, layout_at(100.0));
    let t = mount_with(&mut filter, brands());
    assert_eq!(pointer.connection_count(), 0);

    for _ in 0..5 {
        assert!(filter.toggle_dropdown(t));
        assert_eq!(pointer.connection_count(), 1);
        assert!(!filter.toggle_dropdown(t));
        assert_eq!(pointer.connection_count(), 0);
    }

    filter.toggle_mode_menu();
    assert_eq!(pointer.connection_count(), 1);
    filter.unmount();
    assert_eq!(pointer.connection_count(), 0);
    assert!(!filter.is_watching_pointer());
}

#[test]
fn test_outside_press_closes_only_the_other_widget() {
    let pointer = Arc::new(Signal::<PointerDown>::new());
    let mut left = brand_filter(&pointer, layout_at(40.0));
    let mut right = brand_filter(&pointer, layout_at(600.0));
    let t = mount_with(&mut left, brands());
    mount_with(&mut right, brands());

    left.open_dropdown(t);
    right.open_dropdown(t);
    assert_eq!(pointer.connection_count(), 2);

    // A press inside the right widget is outside the left one.
    pointer.emit(PointerDown::at(650.0, 110.0));
    left.pump(t);
    right.pump(t);

    assert!(!left.overlay_state().value_open());
    assert!(right.overlay_state().value_open());
    assert_eq!(pointer.connection_count(), 1);
}

#[test]
fn test_mode_menu_closes_on_press_outside_menu() {
    let pointer = Arc::new(Signal::<PointerDown>::new());
    let mut filter = brand_filter(&pointer, layout_at(100.0));
    let t = mount_with(&mut filter, brands());

    assert!(filter.toggle_mode_menu());
    pointer.emit(PointerDown::at(120.0, 150.0));
    filter.pump(t);
    assert!(filter.overlay_state().mode_menu_open());

    pointer.emit(PointerDown::at(250.0, 110.0));
    filter.pump(t);
    assert!(!filter.overlay_state().mode_menu_open());
    assert!(!filter.is_watching_pointer());
}

#[test]
fn test_choosing_disabling_mode_closes_dropdown() {
    let pointer = Arc::new(Signal::<PointerDown>::new());
    let mut filter = brand_filter(&pointer, layout_at(100.0));
    let t = mount_with(&mut filter, brands());

    filter.open_dropdown(t);
    filter.toggle_item(&2);
    filter.toggle_mode_menu();
    assert!(!filter.overlay_state().value_open());

    filter.select_mode(FilterMode::NotEmpty);
    let state = filter.overlay_state();
    assert!(!state.any_open());
    assert!(filter.selection().is_empty());
    assert!(filter.view().mode_menu.is_none());
}

#[test]
fn test_preview_prefers_roomier_side() {
    let pointer = Arc::new(Signal::<PointerDown>::new());

    let mut near_left = brand_filter(&pointer, layout_at(40.0));
    mount_with(&mut near_left, brands());
    near_left.hover_item(&1);
    let (_, placement) = near_left.preview().expect("preview");
    assert_eq!(placement.side, PreviewSide::Right);
    assert_eq!(placement.offset, 212.0);

    let mut near_right = brand_filter(&pointer, layout_at(1000.0));
    let t = mount_with(&mut near_right, brands());
    near_right.open_dropdown(t);
    near_right.hover_item(&3);
    assert_eq!(near_right.view().preview.as_deref(), Some("Left+312"));
}
