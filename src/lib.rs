#[macro_use]
extern crate rocket;

pub mod cache;
pub mod error;
pub mod messages;
pub mod models;
pub mod provider;
pub mod request_logger;
pub mod routes;
pub mod threading;

use crate::cache::ResponseCache;
use crate::provider::{ChatProvider, HttpChatProvider, ProviderConfig};
use crate::request_logger::RequestLogger;
use env_logger::Env;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedOrigins, CorsOptions};
use std::sync::{Arc, Once};
use std::time::Duration;

static LOGGER: Once = Once::new();

/// Initialize the process logger once, keeping Rocket internals quiet.
pub fn init_logger(debug: bool) {
    LOGGER.call_once(|| {
        let default_filter = if debug {
            "debug,rocket::server=info"
        } else {
            "info,rocket::server=warn,rocket::request=warn"
        };
        env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();
    });
}

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

fn cache_ttl_from_env() -> Duration {
    std::env::var("CACHE_TTL_SECS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CACHE_TTL)
}

/// Build the application with the environment-configured provider client.
pub fn rocket() -> Rocket<Build> {
    let config = ProviderConfig::from_env();
    log::info!("using provider at {}", config.base_url);

    let provider: Arc<dyn ChatProvider> =
        Arc::new(HttpChatProvider::new(config).expect("failed to initialize provider client"));
    rocket_with_provider(provider)
}

/// Build the application around an explicit provider implementation.
pub fn rocket_with_provider(provider: Arc<dyn ChatProvider>) -> Rocket<Build> {
    // The frontend is served from a different local origin.
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::some_exact(&[
            "http://127.0.0.1:8080",
            "http://localhost:8080",
        ]))
        .allowed_methods(
            vec![Method::Get, Method::Post]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .to_cors()
        .expect("Error creating CORS");

    rocket::build()
        .attach(RequestLogger)
        .attach(cors)
        .manage(provider)
        .manage(ResponseCache::new(cache_ttl_from_env()))
        .mount(
            "/api/v1",
            routes![
                routes::health::health_check,
                routes::conversations::list_conversations,
                routes::conversations::get_conversation,
                routes::conversations::get_profile_picture,
            ],
        )
}

#[cfg_attr(not(test), allow(dead_code))]
pub mod test_support {
    use crate::cache::ResponseCache;
    use crate::provider::ChatProvider;
    use rocket::config::LogLevel;
    use rocket::figment::Figment;
    use rocket::local::asynchronous::Client as AsyncClient;
    use rocket::local::blocking::Client;
    use rocket::{Build, Rocket, Route};
    use std::sync::Arc;
    use std::time::Duration;

    /// Builder for constructing Rocket instances tailored for integration
    /// tests: random port, logging disabled, stub provider in state.
    pub struct TestRocketBuilder {
        figment: Figment,
        mounts: Vec<(String, Vec<Route>)>,
        provider: Option<Arc<dyn ChatProvider>>,
        cache: ResponseCache,
    }

    impl TestRocketBuilder {
        pub fn new() -> Self {
            let figment = rocket::Config::figment()
                .merge(("port", 0))
                .merge(("log_level", LogLevel::Off))
                .merge(("cli_colors", false));

            Self {
                figment,
                mounts: Vec::new(),
                provider: None,
                cache: ResponseCache::new(Duration::from_secs(300)),
            }
        }

        /// Mount routes under `/api/v1`.
        pub fn mount_api_routes(mut self, routes: Vec<Route>) -> Self {
            self.mounts.push(("/api/v1".to_string(), routes));
            self
        }

        /// Put a provider implementation (usually a stub) into Rocket state.
        pub fn manage_provider(mut self, provider: Arc<dyn ChatProvider>) -> Self {
            self.provider = Some(provider);
            self
        }

        /// Replace the default 300 s cache.
        pub fn with_cache(mut self, cache: ResponseCache) -> Self {
            self.cache = cache;
            self
        }

        /// Finish building the Rocket instance.
        pub fn build(self) -> Rocket<Build> {
            let mut rocket = rocket::custom(self.figment).manage(self.cache);

            for (base, routes) in self.mounts {
                rocket = rocket.mount(base, routes);
            }

            if let Some(provider) = self.provider {
                rocket = rocket.manage(provider);
            }

            rocket
        }

        /// Convenience helper to produce a blocking local client.
        pub fn blocking_client(self) -> Client {
            Client::tracked(self.build()).expect("valid Rocket instance")
        }

        /// Convenience helper to produce an asynchronous local client.
        pub async fn async_client(self) -> AsyncClient {
            AsyncClient::tracked(self.build())
                .await
                .expect("valid Rocket instance")
        }
    }

    impl Default for TestRocketBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
