use actix_web::HttpResponse;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::utils::cache::cache_stats;

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render_metrics())
}

fn render_metrics() -> String {
    let requests = REQUEST_COUNT.load(Ordering::Relaxed);
    let errors = ERROR_COUNT.load(Ordering::Relaxed);
    let cache = cache_stats();

    format!(
        "# HELP http_requests_total Total number of HTTP requests\n\
         # TYPE http_requests_total counter\n\
         http_requests_total {}\n\
         \n\
         # HELP http_errors_total Total number of HTTP responses with status >= 400\n\
         # TYPE http_errors_total counter\n\
         http_errors_total {}\n\
         \n\
         # HELP cache_entries Entries currently held in the query cache\n\
         # TYPE cache_entries gauge\n\
         cache_entries {}\n\
         \n\
         # HELP cache_hits_total Query cache hits\n\
         # TYPE cache_hits_total counter\n\
         cache_hits_total {}\n\
         \n\
         # HELP cache_misses_total Query cache misses\n\
         # TYPE cache_misses_total counter\n\
         cache_misses_total {}\n\
         \n\
         # HELP cache_evictions_total Entries evicted to stay under capacity\n\
         # TYPE cache_evictions_total counter\n\
         cache_evictions_total {}\n",
        requests, errors, cache.size, cache.hits, cache.misses, cache.evictions
    )
}
