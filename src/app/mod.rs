use std::{io, net::IpAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::{DeliverySettings, Settings},
    email::{EmailClient, Relay, SmtpRelay},
};

mod error;
mod extractor;
mod health;
mod newsletter;
mod not_found;

#[derive(Clone)]
pub struct AppState {
    email_client: EmailClient,
    delivery: DeliverySettings,
}

fn app_router() -> Router<AppState> {
    health::router()
        .merge(newsletter::router())
        .fallback(not_found::not_found)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!(%origin, "ignoring an allowed origin that is not a valid header value");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

pub struct App {
    listener: TcpListener,
    email_client: EmailClient,
    delivery: DeliverySettings,
    allowed_origins: Vec<String>,
    max_body_bytes: usize,
}

impl App {
    /// Builds the application around an SMTP relay described by `config.email_client`.
    pub async fn with(config: Settings) -> anyhow::Result<Self> {
        let relay = SmtpRelay::new(&config.email_client)
            .context("The SMTP relay settings should be valid.")?;
        Self::with_relay(config, Arc::new(relay)).await
    }

    /// Builds the application around any relay, e.g. a stub in tests.
    pub async fn with_relay(config: Settings, relay: Arc<dyn Relay>) -> anyhow::Result<Self> {
        let sender = config
            .email_client
            .sender()
            .context("The sender email should be valid.")?;
        let email_client = EmailClient::new(relay, sender, config.newsletter);

        let listener = TcpListener::bind(format!(
            "{}:{}",
            config.application.host, config.application.port
        ))
        .await
        .context("The listener should be able to bind the address.")?;

        Ok(Self {
            listener,
            email_client,
            delivery: config.delivery,
            allowed_origins: config.application.allowed_origins,
            max_body_bytes: config.application.max_body_bytes,
        })
    }

    pub fn host(&self) -> IpAddr {
        self.local_addr().ip()
    }

    pub fn port(&self) -> u16 {
        self.local_addr().port()
    }

    fn local_addr(&self) -> std::net::SocketAddr {
        self.listener
            .local_addr()
            .expect("A bound listener should have a local address.")
    }

    pub async fn serve(self) -> Result<(), io::Error> {
        let app = app_router()
            .with_state(AppState {
                email_client: self.email_client,
                delivery: self.delivery,
            })
            .layer(DefaultBodyLimit::max(self.max_body_bytes))
            .layer(cors_layer(&self.allowed_origins))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                    let id = uuid::Uuid::new_v4();
                    tracing::info_span!(
                        "request",
                        method = ?request.method(),
                        uri = ?request.uri(),
                        %id,
                    )
                }),
            );

        axum::serve(self.listener, app.into_make_service()).await
    }
}
