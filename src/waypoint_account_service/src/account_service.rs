use axum::{
    Router,
    http::{HeaderValue, Method, request},
    routing::post,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use waypoint_adapters::config::AllowedOrigins;
use waypoint_axum::routes::{login, register};
use waypoint_core::{IdentityProvider, ProfileDirectory};

use crate::tracing::{make_span_with_request_id, on_request, on_response};

/// Account service exposing the core's two operations over HTTP.
pub struct AccountService {
    router: Router,
}

impl AccountService {
    /// Create a new AccountService over the provided capability adapters
    ///
    /// # Arguments
    /// * `identity_provider` - Credential system adapter (must be Clone)
    /// * `directory` - Profile directory adapter (must be Clone)
    ///
    /// # Note on Architecture
    /// Adapters implement Clone via internal handles (pools, maps behind
    /// Arc), so each request gets cheap shared access with no in-process
    /// locking in the coordinators themselves.
    pub fn new<I, D>(identity_provider: I, directory: D) -> Self
    where
        I: IdentityProvider + Clone + 'static,
        D: ProfileDirectory + Clone + 'static,
    {
        let router = Router::new()
            .route("/register", post(register::<I, D>))
            .route("/login", post(login::<I, D>))
            .with_state((identity_provider, directory));

        Self { router }
    }

    fn with_trace_layer(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(make_span_with_request_id)
                .on_request(on_request)
                .on_response(on_response),
        );
        self
    }

    /// Convert the AccountService into a nested router that can be
    /// mounted on another router
    ///
    /// # Arguments
    /// * `allowed_origins` - Optional list of allowed CORS origins
    pub fn as_nested_router(mut self, allowed_origins: Option<AllowedOrigins>) -> Router {
        if let Some(allowed_origins) = allowed_origins {
            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST])
                .allow_credentials(true)
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _request_parts: &request::Parts| {
                        allowed_origins.contains(origin)
                    },
                ));

            self.router = self.router.layer(cors);
        }
        self.with_trace_layer().router
    }

    /// Run the account service as a standalone server
    ///
    /// # Arguments
    /// * `listener` - TCP listener to bind the server to
    /// * `allowed_origins` - Optional list of allowed CORS origins
    pub async fn run_standalone(
        self,
        listener: TcpListener,
        allowed_origins: Option<AllowedOrigins>,
    ) -> Result<(), std::io::Error> {
        let router = self.as_nested_router(allowed_origins);

        tracing::info!("Account service listening on {}", listener.local_addr()?);

        axum_server::Server::<std::net::SocketAddr>::from_listener(listener)
            .serve(router.into_make_service())
            .await
    }
}
