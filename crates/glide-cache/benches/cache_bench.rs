use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glide_cache::document::{PageDocument, PagePolicy};
use glide_cache::fifo::FifoPages;
use glide_cache::lru::LruPages;
use rand::Rng;
use std::sync::Arc;
use std::time::Instant;

fn doc(url: &str) -> Arc<PageDocument> {
    Arc::new(PageDocument {
        url: url.to_string(),
        title: format!("Page {url}"),
        head: String::new(),
        main: "x".repeat(2048),
        secondary: Vec::new(),
        fetched_at: Instant::now(),
    })
}

fn bench_policy<P: PagePolicy>(c: &mut Criterion, name: &str, mut cache: P) {
    let mut rng = rand::thread_rng();
    let urls: Vec<String> = (0..200).map(|i| format!("/products/item-{i}")).collect();

    for url in &urls {
        cache.insert(url.clone(), doc(url));
    }

    c.bench_function(&format!("{name}/get_hot"), |b| {
        b.iter(|| {
            let url = &urls[rng.gen_range(0..urls.len())];
            black_box(cache.get(url));
        })
    });

    c.bench_function(&format!("{name}/insert_evict"), |b| {
        let mut i = 0u64;
        b.iter(|| {
            let url = format!("/collections/all?page={i}");
            i += 1;
            cache.insert(url.clone(), doc(&url));
        })
    });
}

fn cache_benches(c: &mut Criterion) {
    bench_policy(c, "fifo", FifoPages::new(50));
    bench_policy(c, "lru", LruPages::new(50));
}

criterion_group!(benches, cache_benches);
criterion_main!(benches);
