//! End-to-end behavior of the filter widget against an in-memory source
//! running on a real async runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pickset::render::FnRenderer;
use pickset::{
    ApplyOutcome, AsyncRuntime, FilterConfig, FilterMode, FilterableItem, MultiFilter,
    PageRequest, ScrollMetrics, SharedSelection, Signal, VecSource,
};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
struct Sku {
    code: String,
    name: String,
}

impl FilterableItem for Sku {
    type Id = String;

    fn id(&self) -> &String {
        &self.code
    }
}

fn sku(code: &str, name: &str) -> Sku {
    Sku {
        code: code.to_string(),
        name: name.to_string(),
    }
}

type SkuFilter = MultiFilter<Sku, FnRenderer<Sku, String>>;

fn renderer() -> FnRenderer<Sku, String> {
    FnRenderer::new(
        |s: &Sku, _| format!("{} ({})", s.name, s.code),
        |s: &Sku, ctx| format!("[{}] {}", if ctx.selected { "x" } else { " " }, s.name),
        |s: &Sku, ctx| format!("{:?}: {}", ctx.side(), s.name),
    )
}

/// 25 "x" items followed by a handful of "y" items.
fn catalog() -> VecSource<Sku> {
    let mut items: Vec<Sku> = (1..=25)
        .map(|n| sku(&format!("X{n:02}"), &format!("xenon {n}")))
        .collect();
    items.extend((1..=3).map(|n| sku(&format!("Y{n:02}"), &format!("yttrium {n}"))));
    VecSource::new(items, |s: &Sku, q: &str| s.name.contains(q))
}

fn record<A: Clone + Send + 'static>(signal: &Signal<A>) -> Arc<Mutex<Vec<A>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    signal.connect(move |args: &A| sink.lock().push(args.clone()));
    seen
}

struct Harness {
    filter: SkuFilter,
    selection: SharedSelection<Sku>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
    now: Instant,
}

impl Harness {
    fn new(source: VecSource<Sku>) -> Self {
        let runtime = Arc::new(AsyncRuntime::new().expect("runtime"));
        let selection = SharedSelection::new();
        let filter = MultiFilter::new(FilterConfig::new(), selection.clone(), renderer())
            .with_source(Arc::new(source), runtime);

        let host = selection.clone();
        filter.selection_changed.connect(move |ids| {
            host.replace(ids.clone());
        });
        let requests = record(&filter.fetch_requested);

        let mut harness = Self {
            filter,
            selection,
            requests,
            now: Instant::now(),
        };
        harness.filter.mount(harness.now);
        harness
    }

    fn advance(&mut self, ms: u64) {
        self.now += Duration::from_millis(ms);
        self.filter.pump(self.now);
    }

    /// Type a query, let the debounce fire and wait for the first page.
    fn search(&mut self, query: &str) {
        self.filter.set_query(self.now, query);
        self.advance(300);
        let outcome = self.filter.wait_for_fetch(WAIT);
        assert!(matches!(outcome, Some(ApplyOutcome::Replaced { .. })), "{outcome:?}");
    }

    fn load_more(&mut self) -> bool {
        if !self.filter.load_more() {
            return false;
        }
        let outcome = self.filter.wait_for_fetch(WAIT);
        assert!(matches!(outcome, Some(ApplyOutcome::Appended { .. })), "{outcome:?}");
        true
    }

    fn queries(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.query.clone()).collect()
    }
}

#[test]
fn test_rapid_typing_dispatches_once() {
    let mut h = Harness::new(catalog());
    h.filter.set_query(h.now, "ABC");
    h.advance(80);
    h.filter.set_query(h.now, "ABCD");
    h.advance(299);
    assert!(h.queries().is_empty());

    h.advance(1);
    assert_eq!(h.queries(), vec!["ABCD".to_string()]);
    h.advance(1000);
    assert_eq!(h.requests.lock().len(), 1);
}

#[test]
fn test_paging_through_25_items() {
    let mut h = Harness::new(catalog());
    h.search("xenon");
    assert_eq!(h.filter.items().len(), 10);
    assert!(h.filter.has_more());

    assert!(h.load_more());
    assert_eq!(h.filter.items().len(), 20);
    assert!(h.filter.has_more());

    assert!(h.load_more());
    assert_eq!(h.filter.items().len(), 25);
    assert!(!h.filter.has_more());

    let before = h.requests.lock().len();
    assert!(!h.load_more());
    assert_eq!(h.requests.lock().len(), before);
    assert_eq!(h.filter.items().len(), 25);
}

#[test]
fn test_load_more_while_loading_is_noop() {
    let mut h = Harness::new(catalog().with_latency(Duration::from_millis(20)));
    h.search("xenon");

    assert!(h.filter.load_more());
    let in_flight = h.requests.lock().len();
    assert!(!h.filter.load_more());
    assert!(!h.filter.on_scroll(ScrollMetrics::new(300.0, 500.0, 200.0)));
    assert_eq!(h.requests.lock().len(), in_flight);

    h.filter.wait_for_fetch(WAIT);
    assert_eq!(h.filter.items().len(), 20);
}

#[test]
fn test_scroll_near_bottom_loads_next_page() {
    let mut h = Harness::new(catalog());
    h.search("xenon");

    assert!(!h.filter.on_scroll(ScrollMetrics::new(0.0, 500.0, 200.0)));
    assert!(h.filter.on_scroll(ScrollMetrics::new(260.0, 500.0, 200.0)));
    h.filter.wait_for_fetch(WAIT);
    assert_eq!(h.filter.items().len(), 20);
}

#[test]
fn test_selection_never_duplicates() {
    let mut h = Harness::new(catalog());
    h.search("xenon");

    for code in ["X01", "X02", "X01", "X03", "X01"] {
        h.filter.toggle_item(&code.to_string());
    }
    assert_eq!(h.selection.ids(), vec!["X02", "X03", "X01"]);

    assert!(h.filter.toggle_select_all());
    let ids = h.selection.ids();
    assert_eq!(&ids[..3], ["X02", "X03", "X01"]);
    assert_eq!(ids.len(), 10);
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len());
}

#[test]
fn test_exclude_keeps_selection_empty_clears_it() {
    let mut h = Harness::new(catalog());
    h.search("xenon");
    for code in ["X01", "X02", "X03"] {
        h.filter.toggle_item(&code.to_string());
    }

    h.filter.select_mode(FilterMode::Exclude);
    assert_eq!(h.selection.ids(), vec!["X01", "X02", "X03"]);

    h.filter.select_mode(FilterMode::Empty);
    assert!(h.selection.is_empty());
    assert_eq!(h.filter.output().mode, FilterMode::Empty);
}

#[test]
fn test_off_page_selection_still_renders() {
    let mut h = Harness::new(catalog());
    h.search("xenon");
    h.filter.toggle_item(&"X01".to_string());

    h.search("yttrium");
    assert!(h.filter.items().iter().all(|s| s.code != "X01"));

    let view = h.filter.view();
    assert_eq!(view.tags.len(), 1);
    assert_eq!(view.tags[0].output, "xenon 1 (X01)");
    assert_eq!(view.hidden_count, 0);
}

#[test]
fn test_select_all_needs_query_and_results() {
    let mut h = Harness::new(catalog());
    h.advance(300);
    h.filter.wait_for_fetch(WAIT);
    assert!(!h.filter.items().is_empty());
    assert!(!h.filter.select_all_state().enabled);
    assert!(!h.filter.toggle_select_all());
    assert!(h.selection.is_empty());

    h.search("xenon");
    assert!(h.filter.select_all_state().enabled);

    h.search("zzz");
    assert!(h.filter.items().is_empty());
    assert!(!h.filter.select_all_state().enabled);
}

#[test]
fn test_superseded_response_is_ignored() {
    let mut h = Harness::new(catalog().with_latency(Duration::from_millis(30)));
    h.filter.set_query(h.now, "xenon");
    h.advance(300);
    h.filter.set_query(h.now, "yttrium");
    h.advance(300);

    let mut outcomes = Vec::new();
    while let Some(outcome) = h.filter.wait_for_fetch(WAIT) {
        outcomes.push(outcome);
        if !h.filter.is_loading() {
            break;
        }
    }

    assert!(outcomes.contains(&ApplyOutcome::Replaced { count: 3 }));
    assert!(h.filter.items().iter().all(|s| s.name.starts_with("yttrium")));
}

#[test]
fn test_fetch_failure_is_reported() {
    let source = catalog();
    source.fail_next(1);
    let mut h = Harness::new(source);
    let failures = record(&h.filter.fetch_failed);

    h.filter.set_query(h.now, "xenon");
    h.advance(300);
    assert_eq!(h.filter.wait_for_fetch(WAIT), Some(ApplyOutcome::Failed));
    assert_eq!(failures.lock().len(), 1);
    assert!(!h.filter.is_loading());

    // Retyping the same text is not a new query; refine it instead.
    h.search("xenon 1");
    assert_eq!(h.filter.items().len(), 10);
    assert!(h.filter.has_more());
}

#[test]
fn test_output_serializes() {
    let mut h = Harness::new(catalog());
    h.search("xenon");
    h.filter.toggle_item(&"X05".to_string());
    h.filter.select_mode(FilterMode::Exclude);

    let json = serde_json::to_value(h.filter.output()).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({ "mode": "exclude", "count": 1, "ids": ["X05"] })
    );
}
