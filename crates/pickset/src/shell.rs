//! The generic multi-select filter widget.
//!
//! [`MultiFilter`] composes the selection store, filter mode, search
//! debouncer, pagination controller, hover preview and overlay coordinator
//! into one widget. It is headless: the host feeds it input events and a
//! clock, and reads back a [`FilterView`] to draw.
//!
//! The widget never mutates the selection it displays. Every change is a
//! request emitted on [`MultiFilter::selection_changed`] carrying the full
//! next id sequence; the host applies it to its [`SharedSelection`].
//!
//! # Example
//!
//! ```
//! use pickset::{FilterConfig, FilterableItem, MultiFilter, SharedSelection};
//! use pickset::render::FnRenderer;
//! use std::time::{Duration, Instant};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Tag(u32);
//!
//! impl FilterableItem for Tag {
//!     type Id = u32;
//!     fn id(&self) -> &u32 { &self.0 }
//! }
//!
//! let selection = SharedSelection::<Tag>::new();
//! let renderer = FnRenderer::new(
//!     |t: &Tag, _| t.0.to_string(),
//!     |t: &Tag, _| t.0.to_string(),
//!     |t: &Tag, _| t.0.to_string(),
//! );
//! let mut filter = MultiFilter::new(FilterConfig::new(), selection.clone(), renderer);
//!
//! // The host owns the selection and applies requested changes.
//! let host = selection.clone();
//! filter.selection_changed.connect(move |ids| {
//!     host.replace(ids.clone());
//! });
//!
//! let requests = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
//! let seen = requests.clone();
//! filter.fetch_requested.connect(move |req| seen.lock().push(req.query.clone()));
//!
//! let t0 = Instant::now();
//! filter.mount(t0);
//! filter.set_query(t0, "ab");
//! filter.pump(t0 + Duration::from_millis(300));
//! assert_eq!(*requests.lock(), vec!["ab".to_string()]);
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use pickset_core::logging::targets;
use pickset_core::{AsyncRuntime, PerfSpan, Property, Signal, TimerManager};

use crate::config::FilterConfig;
use crate::debounce::SearchDebouncer;
use crate::geometry::Point;
use crate::item::FilterableItem;
use crate::mode::{FilterMode, FilterModeState};
use crate::overlay::{OverlayCoordinator, OverlayState, PointerSource, WidgetLayout};
use crate::pagination::{
    ApplyOutcome, FetchTicket, PageRequest, PageResponse, Pagination, ScrollMetrics,
};
use crate::preview::{HoverPreview, PreviewPlacement};
use crate::render::{ItemRenderer, PreviewContext, RowContext, TagContext};
use crate::selection::{dedupe, SharedSelection};
use crate::source::{DataSource, FetchError, SourceDriver};
use crate::view::{
    DropdownView, FilterOutput, FilterView, FlyoutView, ListStatus, ModeOption, RowView,
    SelectAllState, TagView, SELECT_ALL_RESULTS, SELECT_ALL_SEARCH_FIRST,
};

/// A headless multi-select filter widget.
///
/// # Signals
///
/// - `selection_changed(Vec<Id>)`: the full next selection the widget requests
/// - `mode_changed(FilterMode)`: the filter mode changed
/// - `search_query_changed(String)`: a debounced query was dispatched
/// - `load_more_requested(())`: the next page was requested
/// - `fetch_requested(PageRequest)`: a page request was issued
/// - `fetch_failed(String)`: the data source reported an error
/// - `focus_search_requested(())`: the host should focus the search input
pub struct MultiFilter<T: FilterableItem, R: ItemRenderer<T>> {
    config: FilterConfig,
    renderer: R,
    selection: SharedSelection<T>,
    mode: FilterModeState,
    query: Property<String>,
    debouncer: SearchDebouncer,
    pagination: Pagination<T>,
    preview: HoverPreview<T>,
    overlays: OverlayCoordinator,
    timers: TimerManager,
    layout: WidgetLayout,
    driver: Option<SourceDriver<T>>,
    mounted: bool,

    /// Signal emitted with the full selection the widget wants next.
    pub selection_changed: Signal<Vec<T::Id>>,
    /// Signal emitted when the filter mode changes.
    pub mode_changed: Signal<FilterMode>,
    /// Signal emitted when a debounced query is dispatched.
    pub search_query_changed: Signal<String>,
    /// Signal emitted when another page is requested.
    pub load_more_requested: Signal<()>,
    /// Signal emitted for every page request.
    pub fetch_requested: Signal<PageRequest>,
    /// Signal emitted when a fetch fails.
    pub fetch_failed: Signal<String>,
    /// Signal emitted when the search input should take focus.
    pub focus_search_requested: Signal<()>,
}

impl<T: FilterableItem, R: ItemRenderer<T>> MultiFilter<T, R> {
    /// Create a widget over a host-owned selection.
    pub fn new(config: FilterConfig, selection: SharedSelection<T>, renderer: R) -> Self {
        let pagination = Pagination::new(config.page_size);
        Self {
            config,
            renderer,
            selection,
            mode: FilterModeState::new(),
            query: Property::default(),
            debouncer: SearchDebouncer::default(),
            pagination,
            preview: HoverPreview::new(),
            overlays: OverlayCoordinator::new(None),
            timers: TimerManager::new(),
            layout: WidgetLayout::default(),
            driver: None,
            mounted: false,
            selection_changed: Signal::new(),
            mode_changed: Signal::new(),
            search_query_changed: Signal::new(),
            load_more_requested: Signal::new(),
            fetch_requested: Signal::new(),
            fetch_failed: Signal::new(),
            focus_search_requested: Signal::new(),
        }
    }

    /// Run fetches against `source` on `runtime` using builder pattern.
    ///
    /// Without a source the host answers `fetch_requested` itself and hands
    /// results to [`MultiFilter::deliver`].
    pub fn with_source(mut self, source: Arc<dyn DataSource<T>>, runtime: Arc<AsyncRuntime>) -> Self {
        self.driver = Some(SourceDriver::new(source, runtime));
        self
    }

    /// Watch a global pointer source for outside presses using builder pattern.
    pub fn with_pointer_source(mut self, source: PointerSource) -> Self {
        self.overlays = OverlayCoordinator::new(Some(source));
        self
    }

    /// Set the initial mode using builder pattern.
    pub fn with_mode(mut self, mode: FilterMode) -> Self {
        self.mode = FilterModeState::with_mode(mode);
        self
    }

    /// Set the initial layout using builder pattern.
    pub fn with_layout(mut self, layout: WidgetLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the debounce quiet period using builder pattern.
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = SearchDebouncer::new(delay);
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The host-owned selection this widget displays.
    pub fn selection(&self) -> &SharedSelection<T> {
        &self.selection
    }

    pub fn mode(&self) -> FilterMode {
        self.mode.mode()
    }

    /// The text currently in the search box.
    pub fn query(&self) -> String {
        self.query.get()
    }

    pub fn pagination(&self) -> &Pagination<T> {
        &self.pagination
    }

    /// Items loaded for the active query.
    pub fn items(&self) -> &[T] {
        self.pagination.items()
    }

    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading()
    }

    pub fn has_more(&self) -> bool {
        self.pagination.has_more()
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlays.state()
    }

    /// Whether the outside-click subscription is live.
    pub fn is_watching_pointer(&self) -> bool {
        self.overlays.watch().is_armed()
    }

    pub fn layout(&self) -> &WidgetLayout {
        &self.layout
    }

    /// Update where the host laid out the widget.
    pub fn set_layout(&mut self, layout: WidgetLayout) {
        self.layout = layout;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The previewed item and its placement.
    pub fn preview(&self) -> Option<(&T, PreviewPlacement)> {
        Some((self.preview.item()?, self.preview.placement()?))
    }

    /// Time until the next internal deadline, for sleeping event loops.
    pub fn next_deadline(&mut self, now: Instant) -> Option<Duration> {
        self.timers.time_until_next_at(now)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Attach the widget and schedule the initial query dispatch.
    pub fn mount(&mut self, now: Instant) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        let query = self.query.get();
        self.debouncer.schedule(&mut self.timers, now, query);
        tracing::debug!(target: targets::SHELL, label = %self.config.label, "filter mounted");
    }

    /// Detach the widget.
    ///
    /// Pending timers are cancelled, the pointer subscription is released
    /// and any fetch still in flight will be ignored when it lands.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.debouncer.cancel(&mut self.timers);
        self.overlays.shutdown(&mut self.timers);
        self.timers.clear();
        self.pagination.abandon_in_flight();
        self.preview.leave();
        tracing::debug!(target: targets::SHELL, label = %self.config.label, "filter unmounted");
    }

    /// Process everything that became due by `now`.
    ///
    /// Fires timers (query dispatch, search focus), applies queued outside
    /// presses and applies finished fetches.
    pub fn pump(&mut self, now: Instant) {
        let _span = PerfSpan::new("filter_pump");

        for id in self.timers.process_expired_at(now) {
            if let Some(query) = self.debouncer.on_timer(id) {
                self.dispatch_query(query);
            } else if self.overlays.on_timer(id) {
                self.focus_search_requested.emit(());
            }
        }

        for event in self.overlays.drain_pointer_events() {
            self.handle_pointer_down(event.position);
        }

        let completions = match self.driver.as_mut() {
            Some(driver) => driver.drain(),
            None => Vec::new(),
        };
        for completion in completions {
            self.deliver(completion.ticket, completion.result);
        }

        self.sync_cache();
    }

    /// Refresh cached snapshots of selected items from the loaded page.
    ///
    /// The host may apply selection changes at any time, so this runs on
    /// every pump and every read of the selected items.
    fn sync_cache(&self) {
        self.selection.reconcile(self.pagination.items());
    }

    /// Block until the next fetch completes (or `timeout` elapses) and apply it.
    ///
    /// Returns `None` when nothing arrived or no source is attached. Meant
    /// for tests, demos and startup code, never for the event loop itself.
    pub fn wait_for_fetch(&mut self, timeout: Duration) -> Option<ApplyOutcome> {
        let completion = self.driver.as_mut()?.wait_next(timeout)?;
        Some(self.deliver(completion.ticket, completion.result))
    }

    fn dispatch_query(&mut self, query: String) {
        self.search_query_changed.emit(query.clone());
        let request = self.pagination.fetch_first_page(query);
        self.issue(request);
    }

    fn issue(&mut self, request: PageRequest) {
        if let Some(driver) = &self.driver {
            driver.dispatch(&request);
        }
        self.fetch_requested.emit(request);
    }

    /// Apply the result of a fetch issued through `fetch_requested`.
    pub fn deliver(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResponse<T>, FetchError>,
    ) -> ApplyOutcome {
        if !self.mounted {
            tracing::debug!(target: targets::SHELL, ?ticket, "fetch landed after unmount");
            return ApplyOutcome::Stale;
        }

        let error = result.as_ref().err().map(ToString::to_string);
        let outcome = self.pagination.apply(ticket, result);
        match outcome {
            ApplyOutcome::Replaced { .. } | ApplyOutcome::Appended { .. } => {
                self.sync_cache();
            }
            ApplyOutcome::Failed => {
                if let Some(error) = error {
                    self.fetch_failed.emit(error);
                }
            }
            ApplyOutcome::Stale => {}
        }
        outcome
    }

    // =========================================================================
    // Search and paging
    // =========================================================================

    /// Change the search text. The dispatch follows after the quiet period.
    ///
    /// While unmounted only the text is kept; [`MultiFilter::mount`]
    /// dispatches it.
    pub fn set_query(&mut self, now: Instant, text: impl Into<String>) {
        let text = text.into();
        if self.query.set(text.clone()) && self.mounted {
            self.debouncer.schedule(&mut self.timers, now, text);
        }
    }

    /// The clear button in the search box.
    pub fn clear_query(&mut self, now: Instant) {
        self.set_query(now, String::new());
    }

    /// Request the next page. Returns whether a request was issued.
    pub fn load_more(&mut self) -> bool {
        if !self.mounted {
            return false;
        }
        let Some(request) = self.pagination.load_more() else {
            return false;
        };
        self.load_more_requested.emit(());
        self.issue(request);
        true
    }

    /// The item list scrolled. Loads the next page when near the bottom.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> bool {
        self.pagination.should_load_more(metrics) && self.load_more()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    fn request_selection(&mut self, next: Vec<T::Id>) {
        let next = dedupe(next);
        if self.selection.read(|store| store.ids() == next.as_slice()) {
            return;
        }
        tracing::debug!(target: targets::SHELL, count = next.len(), "selection change requested");
        self.selection_changed.emit(next);
        self.sync_cache();
    }

    /// A list row was clicked.
    pub fn toggle_item(&mut self, id: &T::Id) {
        if self.mode.values_disabled() {
            return;
        }
        let next = self.selection.read(|store| store.toggled(id));
        self.request_selection(next);
    }

    /// A tag's delete button was clicked.
    pub fn remove_tag(&mut self, id: &T::Id) {
        let next = self.selection.read(|store| store.without(id));
        self.request_selection(next);
    }

    /// The "clear" action in the dropdown header.
    pub fn clear_selection(&mut self) {
        self.request_selection(Vec::new());
    }

    /// Whether every loaded item is selected. False when nothing is loaded.
    pub fn is_all_selected(&self) -> bool {
        let items = self.pagination.items();
        !items.is_empty()
            && self
                .selection
                .read(|store| items.iter().all(|item| store.contains(item.id())))
    }

    /// State of the "select all current results" toggle.
    ///
    /// Enabled only once a non-blank query has been typed and dispatched,
    /// its results have loaded, and no fetch is in flight.
    pub fn select_all_state(&self) -> SelectAllState {
        let typed = !self.query.with(|q| q.trim().is_empty());
        let dispatched = !self.pagination.window().query().trim().is_empty();
        let enabled = typed
            && dispatched
            && !self.pagination.is_loading()
            && !self.pagination.items().is_empty();
        SelectAllState {
            enabled,
            checked: typed && self.is_all_selected(),
            label: if typed {
                SELECT_ALL_RESULTS
            } else {
                SELECT_ALL_SEARCH_FIRST
            },
        }
    }

    /// The "select all current results" toggle was clicked.
    ///
    /// Adds every loaded id (existing selection first), or when all are
    /// already selected removes exactly the loaded ids. Returns whether the
    /// toggle was enabled.
    pub fn toggle_select_all(&mut self) -> bool {
        if !self.select_all_state().enabled || self.mode.values_disabled() {
            return false;
        }
        let all_selected = self.is_all_selected();
        let items = self.pagination.items();
        let next = self.selection.read(|store| {
            let loaded = items.iter().map(|item| item.id());
            if all_selected {
                store.without_all(loaded)
            } else {
                store.with_all(loaded)
            }
        });
        self.request_selection(next);
        true
    }

    /// Selected items that can be shown as tags, capped at `max_tag_count`.
    ///
    /// Ids never observed in any loaded page are skipped.
    pub fn visible_selected(&self) -> Vec<T> {
        self.sync_cache();
        let items = self.pagination.items();
        self.selection.read(|store| {
            store
                .resolve_all(items)
                .into_iter()
                .take(self.config.max_tag_count)
                .cloned()
                .collect()
        })
    }

    /// Number of selected ids not shown as inline tags.
    pub fn hidden_count(&self) -> usize {
        self.selection
            .len()
            .saturating_sub(self.visible_selected().len())
    }

    /// A serializable summary of the current value.
    pub fn output(&self) -> FilterOutput<T::Id> {
        let ids = self.selection.ids();
        FilterOutput {
            mode: self.mode(),
            count: ids.len(),
            ids,
        }
    }

    // =========================================================================
    // Mode
    // =========================================================================

    /// Choose a filter mode from the mode menu.
    pub fn select_mode(&mut self, mode: FilterMode) {
        let transition = self.mode.select(mode);
        self.overlays.close_mode_menu();
        if transition.current.disables_values() {
            self.overlays.close_value(&mut self.timers);
        }
        if transition.changed() {
            self.mode_changed.emit(transition.current);
        }
        if transition.clears_selection {
            self.request_selection(Vec::new());
        }
    }

    // =========================================================================
    // Overlays
    // =========================================================================

    /// The value area was clicked.
    pub fn toggle_dropdown(&mut self, now: Instant) -> bool {
        let disabled = self.mode.values_disabled();
        self.overlays.toggle_value(&mut self.timers, now, disabled)
    }

    pub fn open_dropdown(&mut self, now: Instant) -> bool {
        let disabled = self.mode.values_disabled();
        self.overlays.open_value(&mut self.timers, now, disabled)
    }

    pub fn close_dropdown(&mut self) {
        self.overlays.close_value(&mut self.timers);
    }

    /// The mode button was clicked.
    pub fn toggle_mode_menu(&mut self) -> bool {
        self.overlays.toggle_mode_menu(&mut self.timers)
    }

    /// The pointer entered the "+N" indicator.
    pub fn hover_hidden_indicator(&mut self) {
        if self.hidden_count() > 0 {
            self.overlays.show_flyout();
        }
    }

    /// The pointer left the whole control.
    pub fn control_mouse_leave(&mut self) {
        self.overlays.hide_flyout();
    }

    /// The flyout's close button was clicked.
    pub fn close_flyout(&mut self) {
        self.overlays.hide_flyout();
    }

    /// A pointer press reached the widget directly.
    pub fn handle_pointer_down(&mut self, position: Point) {
        self.overlays
            .handle_pointer_down(&mut self.timers, position, &self.layout);
    }

    // =========================================================================
    // Hover preview
    // =========================================================================

    /// The pointer entered a row or tag.
    pub fn hover_item(&mut self, id: &T::Id) {
        let items = self.pagination.items();
        let Some(item) = self
            .selection
            .read(|store| store.resolve(id, items).cloned())
        else {
            self.preview.leave();
            return;
        };
        let placement = PreviewPlacement::compute(
            self.layout.root,
            self.layout.viewport,
            self.overlays.state().value_open(),
        );
        self.preview.enter(item, placement);
    }

    /// The pointer left a row or tag.
    pub fn hover_leave(&mut self) {
        self.preview.leave();
    }

    // =========================================================================
    // View
    // =========================================================================

    /// Text shown in place of tags when the selection is empty.
    pub fn empty_text(&self) -> Option<String> {
        if !self.selection.is_empty() {
            return None;
        }
        Some(if self.mode.values_disabled() {
            self.config.mode_labels.get(self.mode()).to_string()
        } else {
            self.config.placeholder.clone()
        })
    }

    /// State of the item list.
    pub fn list_status(&self) -> ListStatus {
        let empty = self.pagination.items().is_empty();
        match (self.pagination.is_loading(), empty) {
            (true, true) => ListStatus::Loading,
            (true, false) => ListStatus::LoadingMore,
            (false, true) => ListStatus::Empty,
            (false, false) => ListStatus::Ready,
        }
    }

    /// Build the view model for the current frame.
    pub fn view(&self) -> FilterView<T::Id, R::Output> {
        self.sync_cache();
        let toggles = self.config.toggles;
        let state = self.overlays.state();
        let mode = self.mode();
        let values_disabled = mode.disables_values();
        let tag_ctx = TagContext {
            removable: !values_disabled,
            toggles,
        };
        let render_tag = |item: &T| TagView {
            id: item.id().clone(),
            output: self.renderer.render_tag(item, &tag_ctx),
        };

        let visible = self.visible_selected();
        let tags = visible.iter().map(render_tag).collect();
        let selected_count = self.selection.len();

        let mode_menu = state.mode_menu_open().then(|| {
            FilterMode::ALL
                .iter()
                .map(|&option| ModeOption {
                    mode: option,
                    label: self.config.mode_labels.get(option).to_string(),
                    active: option == mode,
                })
                .collect()
        });

        let dropdown = (state.value_open() && !values_disabled).then(|| {
            let query = self.query.get();
            let items = self.pagination.items();
            let rows = self.selection.read(|store| {
                items
                    .iter()
                    .map(|item| {
                        let selected = store.contains(item.id());
                        let ctx = RowContext {
                            selected,
                            query: &query,
                            toggles,
                        };
                        RowView {
                            id: item.id().clone(),
                            selected,
                            output: self.renderer.render_row(item, &ctx),
                        }
                    })
                    .collect()
            });
            DropdownView {
                show_clear_query: !query.is_empty(),
                query,
                select_all: self.select_all_state(),
                selected_count,
                show_clear_selection: selected_count > 0,
                rows,
                status: self.list_status(),
            }
        });

        let flyout = (state.flyout && selected_count > 0).then(|| {
            let items = self.pagination.items();
            let all: Vec<T> = self
                .selection
                .read(|store| store.resolve_all(items).into_iter().cloned().collect());
            FlyoutView {
                title: format!("{} - selected ({selected_count})", self.config.label),
                tags: all.iter().map(render_tag).collect(),
            }
        });

        let preview = self.preview.item().zip(self.preview.placement()).map(
            |(item, placement)| {
                let ctx = PreviewContext { placement, toggles };
                self.renderer.render_preview(item, &ctx)
            },
        );

        FilterView {
            label: self.config.label.clone(),
            mode,
            mode_label: self.config.mode_labels.get(mode).to_string(),
            values_disabled,
            empty_text: self.empty_text(),
            tags,
            hidden_count: self.hidden_count(),
            mode_menu,
            dropdown,
            flyout,
            preview,
        }
    }
}

impl<T: FilterableItem, R: ItemRenderer<T>> Drop for MultiFilter<T, R> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<T: FilterableItem, R: ItemRenderer<T>> std::fmt::Debug for MultiFilter<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiFilter")
            .field("label", &self.config.label)
            .field("mode", &self.mode())
            .field("query", &self.query.get())
            .field("selected", &self.selection.len())
            .field("loaded", &self.pagination.items().len())
            .field("loading", &self.pagination.is_loading())
            .field("overlays", &self.overlays.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::pagination::FetchKind;
    use crate::render::FnRenderer;
    use parking_lot::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
    }

    impl FilterableItem for Row {
        type Id = u32;
        fn id(&self) -> &u32 {
            &self.id
        }
    }

    type TestFilter = MultiFilter<Row, FnRenderer<Row, String>>;

    fn renderer() -> FnRenderer<Row, String> {
        FnRenderer::new(
            |r: &Row, _| format!("tag{}", r.id),
            |r: &Row, ctx| format!("row{}{}", r.id, if ctx.selected { "*" } else { "" }),
            |r: &Row, ctx| format!("preview{}@{:?}", r.id, ctx.side()),
        )
    }

    fn rows(range: std::ops::RangeInclusive<u32>) -> Vec<Row> {
        range.map(|id| Row { id }).collect()
    }

    /// A filter whose host applies every requested selection.
    fn hosted(selection: SharedSelection<Row>) -> TestFilter {
        let filter = MultiFilter::new(FilterConfig::new(), selection.clone(), renderer());
        filter.selection_changed.connect(move |ids| {
            selection.replace(ids.clone());
        });
        filter
    }

    fn record<A: Clone + Send + 'static>(signal: &Signal<A>) -> Arc<Mutex<Vec<A>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        signal.connect(move |args: &A| sink.lock().push(args.clone()));
        seen
    }

    /// Mount, type `query`, let the debounce fire and answer with `items`.
    fn loaded(filter: &mut TestFilter, query: &str, items: Vec<Row>, total: usize) -> Instant {
        let requests = record(&filter.fetch_requested);
        let t0 = Instant::now();
        filter.mount(t0);
        filter.set_query(t0, query);
        let t1 = t0 + Duration::from_millis(300);
        filter.pump(t1);
        let request = requests.lock().last().cloned().unwrap();
        let outcome = filter.deliver(request.ticket, Ok(PageResponse { items, total }));
        assert!(matches!(outcome, ApplyOutcome::Replaced { .. }));
        t1
    }

    #[test]
    fn test_debounced_dispatch() {
        let mut filter = hosted(SharedSelection::new());
        let queries = record(&filter.search_query_changed);
        let t0 = Instant::now();
        filter.mount(t0);
        for (i, text) in ["A", "AB", "ABC", "ABCD"].iter().enumerate() {
            filter.set_query(t0 + Duration::from_millis(100 * i as u64), *text);
        }
        filter.pump(t0 + Duration::from_millis(599));
        assert!(queries.lock().is_empty());
        filter.pump(t0 + Duration::from_millis(600));
        assert_eq!(*queries.lock(), vec!["ABCD".to_string()]);
        assert!(filter.is_loading());
    }

    #[test]
    fn test_toggle_and_reconcile() {
        let selection = SharedSelection::new();
        let mut filter = hosted(selection.clone());
        loaded(&mut filter, "r", rows(1..=5), 5);

        filter.toggle_item(&2);
        filter.toggle_item(&4);
        assert_eq!(selection.ids(), vec![2, 4]);
        assert_eq!(selection.read(|s| s.cache_len()), 2);

        filter.toggle_item(&2);
        assert_eq!(selection.ids(), vec![4]);
        filter.remove_tag(&4);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_exclude_to_empty_clears() {
        let selection = SharedSelection::with_ids([1, 2]);
        let mut filter = hosted(selection.clone()).with_mode(FilterMode::Exclude);
        let modes = record(&filter.mode_changed);

        filter.select_mode(FilterMode::Empty);
        assert_eq!(*modes.lock(), vec![FilterMode::Empty]);
        assert!(selection.is_empty());

        // Values are disabled: rows and the dropdown ignore input.
        filter.toggle_item(&1);
        assert!(selection.is_empty());
        assert!(!filter.open_dropdown(Instant::now()));

        filter.select_mode(FilterMode::Empty);
        assert_eq!(modes.lock().len(), 1);
    }

    #[test]
    fn test_select_all_requires_query() {
        let selection = SharedSelection::with_ids([99]);
        let mut filter = hosted(selection.clone());
        let state = filter.select_all_state();
        assert!(!state.enabled);
        assert_eq!(state.label, SELECT_ALL_SEARCH_FIRST);

        loaded(&mut filter, "x", rows(1..=3), 3);
        let state = filter.select_all_state();
        assert!(state.enabled);
        assert!(!state.checked);

        assert!(filter.toggle_select_all());
        assert_eq!(selection.ids(), vec![99, 1, 2, 3]);
        assert!(filter.select_all_state().checked);

        assert!(filter.toggle_select_all());
        assert_eq!(selection.ids(), vec![99]);
    }

    #[test]
    fn test_tags_and_hidden_count() {
        let selection = SharedSelection::with_ids([1, 2, 3, 4, 5, 42]);
        let mut filter = hosted(selection.clone());
        loaded(&mut filter, "x", rows(1..=5), 5);

        let visible: Vec<u32> = filter.visible_selected().iter().map(|r| r.id).collect();
        assert_eq!(visible, vec![1, 2, 3]);
        assert_eq!(filter.hidden_count(), 3);

        filter.hover_hidden_indicator();
        assert!(filter.overlay_state().flyout);
        let view = filter.view();
        let flyout = view.flyout.unwrap();
        assert_eq!(flyout.tags.len(), 5);
        assert!(flyout.title.ends_with("(6)"));
        filter.control_mouse_leave();
        assert!(!filter.overlay_state().flyout);
    }

    #[test]
    fn test_load_more_and_stale() {
        let mut filter = hosted(SharedSelection::new());
        let requests = record(&filter.fetch_requested);
        loaded(&mut filter, "a", rows(1..=10), 25);

        assert!(filter.on_scroll(ScrollMetrics::new(250.0, 500.0, 200.0)));
        assert!(!filter.load_more());
        let next = requests.lock().last().cloned().unwrap();
        assert_eq!(next.ticket.kind, FetchKind::NextPage);
        assert_eq!(next.page, 2);

        // A new query supersedes the outstanding page 2.
        filter.set_query(Instant::now(), "b");
        filter.pump(Instant::now() + Duration::from_secs(1));
        let stale = filter.deliver(next.ticket, Ok(PageResponse { items: rows(11..=20), total: 25 }));
        assert_eq!(stale, ApplyOutcome::Stale);
    }

    #[test]
    fn test_fetch_failure_reported() {
        let mut filter = hosted(SharedSelection::new());
        let failures = record(&filter.fetch_failed);
        let requests = record(&filter.fetch_requested);
        let t0 = Instant::now();
        filter.mount(t0);
        filter.pump(t0 + Duration::from_millis(300));
        let request = requests.lock()[0].clone();

        let outcome = filter.deliver(request.ticket, Err(FetchError::Timeout));
        assert_eq!(outcome, ApplyOutcome::Failed);
        assert_eq!(failures.lock().len(), 1);
        assert!(!filter.is_loading());
        assert_eq!(filter.list_status(), ListStatus::Empty);
    }

    #[test]
    fn test_hover_preview_side() {
        let mut filter = hosted(SharedSelection::new()).with_layout(WidgetLayout {
            root: Rect::new(100.0, 50.0, 200.0, 40.0),
            mode_menu: None,
            viewport: Rect::new(0.0, 0.0, 1200.0, 800.0),
        });
        let t = loaded(&mut filter, "x", rows(1..=2), 2);
        filter.open_dropdown(t);

        filter.hover_item(&2);
        let (item, placement) = filter.preview().unwrap();
        assert_eq!(item.id, 2);
        assert_eq!(placement.offset, 312.0);
        assert_eq!(filter.view().preview.as_deref(), Some("preview2@Right"));

        filter.hover_leave();
        assert!(filter.preview().is_none());
        filter.hover_item(&77);
        assert!(filter.preview().is_none());
    }

    #[test]
    fn test_focus_after_open() {
        let mut filter = hosted(SharedSelection::new());
        let focus = record(&filter.focus_search_requested);
        let t0 = Instant::now();
        filter.mount(t0);
        assert!(filter.toggle_dropdown(t0));
        filter.pump(t0 + Duration::from_millis(50));
        assert_eq!(focus.lock().len(), 1);
        assert!(!filter.toggle_dropdown(t0));
    }

    #[test]
    fn test_unmount_drops_late_results() {
        let mut filter = hosted(SharedSelection::new());
        let requests = record(&filter.fetch_requested);
        let t0 = Instant::now();
        filter.mount(t0);
        filter.pump(t0 + Duration::from_millis(300));
        let request = requests.lock()[0].clone();

        filter.unmount();
        let outcome = filter.deliver(request.ticket, Ok(PageResponse { items: rows(1..=3), total: 3 }));
        assert_eq!(outcome, ApplyOutcome::Stale);
        assert!(filter.items().is_empty());
    }

    #[test]
    fn test_selection_applied_later_keeps_tag() {
        let selection = SharedSelection::new();
        let mut filter = MultiFilter::new(FilterConfig::new(), selection.clone(), renderer());
        let requested = record(&filter.selection_changed);
        let requests = record(&filter.fetch_requested);
        let t1 = loaded(&mut filter, "r", rows(1..=5), 5);

        filter.toggle_item(&1);
        // The host applies the change on its own schedule.
        let next = requested.lock().pop().unwrap();
        selection.replace(next);
        filter.view();

        filter.set_query(t1, "z");
        filter.pump(t1 + Duration::from_millis(300));
        let request = requests.lock().last().cloned().unwrap();
        filter.deliver(request.ticket, Ok(PageResponse { items: vec![Row { id: 7 }], total: 1 }));

        let tags: Vec<String> = filter.view().tags.into_iter().map(|t| t.output).collect();
        assert_eq!(selection.ids(), vec![1]);
        assert_eq!(tags, vec!["tag1".to_string()]);
    }

    #[test]
    fn test_unresolvable_hover_clears_preview() {
        let mut filter = hosted(SharedSelection::new());
        loaded(&mut filter, "x", rows(1..=2), 2);

        filter.hover_item(&1);
        assert!(filter.preview().is_some());
        filter.hover_item(&404);
        assert!(filter.preview().is_none());
    }

    #[test]
    fn test_query_while_unmounted_waits_for_mount() {
        let mut filter = hosted(SharedSelection::new());
        let requests = record(&filter.fetch_requested);
        let t0 = Instant::now();
        filter.mount(t0);
        filter.unmount();

        filter.set_query(t0, "late");
        filter.pump(t0 + Duration::from_secs(1));
        assert!(requests.lock().is_empty());
        assert!(!filter.is_loading());
        assert!(!filter.load_more());

        let t1 = t0 + Duration::from_secs(2);
        filter.mount(t1);
        filter.pump(t1 + Duration::from_millis(300));
        let queries: Vec<String> = requests.lock().iter().map(|r| r.query.clone()).collect();
        assert_eq!(queries, vec!["late".to_string()]);
    }

    #[test]
    fn test_empty_text() {
        let config = FilterConfig::new().with_placeholder("Pick SKUs");
        let filter = MultiFilter::new(config, SharedSelection::<Row>::new(), renderer());
        assert_eq!(filter.empty_text().as_deref(), Some("Pick SKUs"));

        let mut filter = filter;
        filter.select_mode(FilterMode::NotEmpty);
        assert_eq!(filter.empty_text().as_deref(), Some("Is not empty"));
        assert!(filter.view().values_disabled);
    }
}
