mod zipfian;

use clap::Parser;
use hdrhistogram::Histogram;
use nav_engine::fetch::HttpFetcher;
use nav_engine::history::SimHistory;
use nav_engine::host::SimHost;
use nav_engine::links::LinkView;
use nav_engine::prefs::NavigationPrefs;
use nav_engine::{NavConfig, NavigationController, NavigationOutcome, PrefetchScheduler};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zipfian::ZipfianPages;

/// Glide browse simulator — hover/click sessions against a storefront.
#[derive(Parser)]
#[command(name = "browse-sim")]
struct Args {
    /// Storefront base URL (point at the worker proxy to exercise it too)
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    storefront_url: String,

    /// Number of navigations to attempt
    #[arg(long, default_value_t = 40)]
    navigations: u64,

    /// Size of the product long tail
    #[arg(long, default_value_t = 25)]
    products: u64,

    /// Zipfian alpha (page popularity skew)
    #[arg(long, default_value_t = 0.9)]
    alpha: f64,

    /// Page-cache eviction policy: fifo or lru
    #[arg(long, default_value = "fifo")]
    policy: String,

    /// Page-cache capacity
    #[arg(long, default_value_t = 50)]
    capacity: usize,

    /// Percent of hovers that commit to a click
    #[arg(long, default_value_t = 60)]
    commit_pct: u32,

    /// Emit a machine-readable session report on stdout
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Serialize)]
struct SessionReport {
    policy: &'static str,
    committed: u64,
    skipped: u64,
    fell_back: u64,
    hard_navigations: usize,
    cache_hits: u64,
    cache_misses: u64,
    cache_evictions: u64,
    cache_hit_rate: f64,
    preloaded: usize,
    p50_us: u64,
    p95_us: u64,
    p99_us: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let base = args.storefront_url.trim_end_matches('/').to_string();

    // Honor the persisted kill-switch the way a real host would
    let prefs = NavigationPrefs::new(std::env::temp_dir().join("glide-nav-prefs.json"));
    if !prefs.is_enabled() {
        tracing::warn!("instant navigation disabled by user preference, nothing to simulate");
        return;
    }

    let origin_host = reqwest::Url::parse(&base)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| panic!("invalid storefront URL: {}", args.storefront_url));

    // Fail fast if the storefront is down
    let probe = reqwest::Client::new();
    if let Err(e) = probe.get(format!("{base}/health")).send().await {
        tracing::error!(error = %e, url = %base, "storefront unreachable");
        std::process::exit(1);
    }

    let config = NavConfig {
        origin_host,
        cache_capacity: args.capacity,
        eviction_policy: args.policy.clone(),
        ..NavConfig::default()
    };

    let fetcher = Arc::new(HttpFetcher::new().expect("failed to build HTTP client"));
    let host = Arc::new(SimHost::with_grouped_transitions(true));
    let history = Arc::new(SimHistory::new());
    let controller = NavigationController::new(
        &config,
        &format!("{base}/"),
        fetcher,
        Arc::clone(&history) as Arc<dyn nav_engine::history::History>,
        Arc::clone(&host) as Arc<dyn nav_engine::host::DocumentHost>,
    );
    let scheduler = PrefetchScheduler::new(controller.clone(), &config);

    tracing::info!(
        storefront = %base,
        navigations = args.navigations,
        products = args.products,
        alpha = args.alpha,
        policy = %args.policy,
        capacity = args.capacity,
        "browse session starting"
    );

    // Idle warmup over the links visible on the home page
    let visible: Vec<LinkView> = ["/collections/sale", "/collections/new", "/pages/about"]
        .iter()
        .map(|path| LinkView::new(format!("{base}{path}")))
        .collect();
    scheduler.idle_scan(&visible).await;

    let mut picker = ZipfianPages::new(args.products, args.alpha);
    let mut latency = Histogram::<u64>::new_with_bounds(1, 60_000_000, 3).expect("histogram");
    let mut committed = 0u64;
    let mut skipped = 0u64;
    let mut fell_back = 0u64;

    for _ in 0..args.navigations {
        let url = format!("{base}{}", picker.next_path());
        let link = LinkView::new(url.clone());
        let commits = rand::thread_rng().gen_range(0..100u32) < args.commit_pct;

        scheduler.pointer_enter(&link);

        if commits {
            // Dwell long enough for the hover debounce to fire
            tokio::time::sleep(Duration::from_millis(120)).await;
            match controller.navigate(&url).await {
                NavigationOutcome::Committed { duration } => {
                    committed += 1;
                    latency.record(duration.as_micros() as u64).ok();
                }
                NavigationOutcome::Skipped => skipped += 1,
                NavigationOutcome::FellBack => fell_back += 1,
            }
        } else {
            // Sweep away before the debounce threshold
            tokio::time::sleep(Duration::from_millis(30)).await;
            scheduler.pointer_leave();
        }
    }

    let stats = controller.cache_stats();
    let total_lookups = stats.hits + stats.misses;
    let hit_rate = if total_lookups > 0 {
        stats.hits as f64 / total_lookups as f64
    } else {
        0.0
    };

    tracing::info!(
        policy = controller.cache_policy(),
        committed,
        skipped,
        fell_back,
        hard_navigations = host.hard_navigations().len(),
        "session finished"
    );
    tracing::info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        size = stats.current_size,
        hit_rate = format!("{:.2}", hit_rate),
        preloaded = controller.preload_count(),
        "page cache"
    );
    tracing::info!(
        p50_us = latency.value_at_quantile(0.5),
        p95_us = latency.value_at_quantile(0.95),
        p99_us = latency.value_at_quantile(0.99),
        max_us = latency.max(),
        "navigation latency"
    );

    if args.json {
        let report = SessionReport {
            policy: controller.cache_policy(),
            committed,
            skipped,
            fell_back,
            hard_navigations: host.hard_navigations().len(),
            cache_hits: stats.hits,
            cache_misses: stats.misses,
            cache_evictions: stats.evictions,
            cache_hit_rate: hit_rate,
            preloaded: controller.preload_count(),
            p50_us: latency.value_at_quantile(0.5),
            p95_us: latency.value_at_quantile(0.95),
            p99_us: latency.value_at_quantile(0.99),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("report serializes")
        );
    }
}
