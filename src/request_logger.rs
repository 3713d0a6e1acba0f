use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Fairing logging one line per HTTP request with timing.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(Instant::now);
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let started = request.local_cache(Instant::now);
        let elapsed = started.elapsed();
        let status = response.status();

        // Health probes log at debug only.
        let uri = request.uri().to_string();
        if uri.ends_with("/health") {
            log::debug!("{} {} => {}", request.method(), uri, status.code);
            return;
        }

        log::info!(
            "{} {} => {} in {:.1}ms",
            request.method(),
            uri,
            status.code,
            elapsed.as_secs_f64() * 1000.0
        );
    }
}
