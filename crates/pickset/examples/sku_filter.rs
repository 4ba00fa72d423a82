//! Pickset SKU Filter Example
//!
//! A headless walk-through of a SKU filter backed by an in-memory catalog:
//! - debounced search and incremental paging
//! - selection kept by the host, with tags for off-page items
//! - filter modes, overlays and the hover preview
//!
//! Run with: RUST_LOG=pickset=debug cargo run -p pickset --example sku_filter

use std::sync::Arc;
use std::time::{Duration, Instant};

use pickset::highlight::highlight;
use pickset::prelude::*;
use pickset::render::FnRenderer;
use pickset::{FilterOutput, ListStatus};
use tracing_subscriber::EnvFilter;

const FETCH_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
struct Sku {
    sku_id: String,
    name: String,
    spu_code: String,
    stock: u32,
    image: String,
}

impl FilterableItem for Sku {
    type Id = String;

    fn id(&self) -> &String {
        &self.sku_id
    }
}

fn catalog() -> Vec<Sku> {
    const PRODUCTS: [&str; 5] = [
        "Ceramide Barrier Gel",
        "Centella Repair Serum",
        "Niacinamide Toner",
        "Mugwort Clay Mask",
        "Retinol Night Cream",
    ];
    (1..=50)
        .map(|n| {
            let product = PRODUCTS[(n - 1) % PRODUCTS.len()];
            Sku {
                sku_id: format!("SKU-{n:03}"),
                name: format!("{product} {}ml", 30 + (n % 4) * 10),
                spu_code: format!("SPU-{:02}", (n - 1) / 5 + 1),
                stock: ((n * 37) % 500) as u32,
                image: format!("https://img.example.com/sku/{n:03}.png"),
            }
        })
        .collect()
}

fn renderer() -> FnRenderer<Sku, String> {
    FnRenderer::new(
        |sku: &Sku, ctx| {
            let close = if ctx.removable { " x" } else { "" };
            format!("[{}{close}]", sku.name)
        },
        |sku: &Sku, ctx| {
            let name: String = highlight(&sku.name, ctx.query)
                .iter()
                .map(|s| {
                    if s.matched {
                        format!("*{}*", s.text)
                    } else {
                        s.text.to_string()
                    }
                })
                .collect();
            let mut line = format!("{} {name}", if ctx.selected { "[x]" } else { "[ ]" });
            if ctx.toggles.show_spu {
                line.push_str(&format!("  {}", sku.spu_code));
            }
            if ctx.toggles.show_stock {
                line.push_str(&format!("  stock {}", sku.stock));
            }
            line
        },
        |sku: &Sku, ctx| {
            let mut text = format!("{:?} +{}px: {} ({})", ctx.side(), ctx.placement.offset, sku.name, sku.sku_id);
            if ctx.toggles.show_image {
                text.push_str(&format!("\n    {}", sku.image));
            }
            text
        },
    )
}

fn print_view(filter: &MultiFilter<Sku, FnRenderer<Sku, String>>) {
    let view = filter.view();
    println!("{} <{}>", view.label, view.mode_label);
    match &view.empty_text {
        Some(text) => println!("  ({text})"),
        None => {
            let tags: Vec<&str> = view.tags.iter().map(|t| t.output.as_str()).collect();
            let more = if view.hidden_count > 0 {
                format!(" +{}", view.hidden_count)
            } else {
                String::new()
            };
            println!("  {}{more}", tags.join(" "));
        }
    }
    if let Some(dropdown) = &view.dropdown {
        println!(
            "  search: {:?}  selected: {}  {}{}",
            dropdown.query,
            dropdown.selected_count,
            dropdown.select_all.label,
            if dropdown.select_all.enabled { "" } else { " (disabled)" },
        );
        for row in &dropdown.rows {
            println!("    {}", row.output);
        }
        if let Some(text) = dropdown.status.text() {
            println!("    {text}");
        } else if dropdown.status == ListStatus::LoadingMore {
            println!("    loading...");
        }
    }
    if let Some(preview) = &view.preview {
        println!("  preview: {preview}");
    }
    println!();
}

fn print_output(output: &FilterOutput<String>) {
    println!("value: {} {} {:?}\n", output.mode, output.count, output.ids);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = Arc::new(AsyncRuntime::new()?);
    let source = VecSource::new(catalog(), |sku: &Sku, query: &str| {
        let query = query.to_lowercase();
        sku.name.to_lowercase().contains(&query) || sku.sku_id.to_lowercase().contains(&query)
    })
    .with_latency(Duration::from_millis(40));

    let config = FilterConfig::from_toml_str(
        r#"
        label = "SKU"
        placeholder = "Search SKU name or code"
        max_tag_count = 2

        [toggles]
        show_image = false
        "#,
    )?;

    let selection = SharedSelection::new();
    let mut filter = MultiFilter::new(config, selection.clone(), renderer())
        .with_source(Arc::new(source), runtime)
        .with_layout(WidgetLayout {
            root: Rect::new(80.0, 40.0, 240.0, 32.0),
            mode_menu: None,
            viewport: Rect::new(0.0, 0.0, 1024.0, 768.0),
        });

    // The host owns the value; the widget only asks for changes.
    let host = selection.clone();
    filter.selection_changed.connect(move |ids| {
        host.replace(ids.clone());
    });
    filter
        .search_query_changed
        .connect(|query| println!("> searching {query:?}"));
    filter
        .fetch_failed
        .connect(|error| eprintln!("! fetch failed: {error}"));

    let mut now = Instant::now();
    filter.mount(now);
    filter.open_dropdown(now);

    // Type quickly: only the last text is dispatched.
    for text in ["c", "ce", "cer"] {
        filter.set_query(now, text);
        now += Duration::from_millis(80);
        filter.pump(now);
    }
    now += Duration::from_millis(300);
    filter.pump(now);
    filter.wait_for_fetch(FETCH_TIMEOUT);
    print_view(&filter);

    // Scroll to the bottom of the list to pull the next page.
    if filter.on_scroll(ScrollMetrics::new(180.0, 400.0, 200.0)) {
        filter.wait_for_fetch(FETCH_TIMEOUT);
    }
    println!("loaded {} items, more: {}\n", filter.items().len(), filter.has_more());

    filter.toggle_select_all();
    filter.hover_item(&"SKU-001".to_string());
    print_view(&filter);

    // Switch to another query; selected ceramide SKUs stay as tags.
    filter.set_query(now, "retinol");
    now += Duration::from_millis(300);
    filter.pump(now);
    filter.wait_for_fetch(FETCH_TIMEOUT);
    filter.toggle_item(&"SKU-005".to_string());
    filter.hover_leave();
    print_view(&filter);
    print_output(&filter.output());

    filter.select_mode(FilterMode::Exclude);
    print_output(&filter.output());

    filter.select_mode(FilterMode::Empty);
    print_view(&filter);
    print_output(&filter.output());

    filter.unmount();
    Ok(())
}
