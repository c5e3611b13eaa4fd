//! Blog server: static output, load more, and posts rendered on demand

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path as FsPath, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::generator::Generator;
use crate::helpers::post_output_path;
use crate::pages::DetailPage;
use crate::store::ContentStore;

lazy_static! {
    static ref SLUG_RE: Regex = Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap();
}

/// How long a slug without a post answers 404 before the store is asked again
const MISSING_TTL: Duration = Duration::from_secs(60);

/// Most slugs tracked by the fallback registry at once
const FALLBACK_CAPACITY: usize = 1024;

/// Progress of a post rendered on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackState {
    Pending,
    /// The store had no such post at this time
    Missing(Instant),
}

/// What a request for a post without a pre-rendered page should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    /// The page file exists now
    Ready,
    /// This request starts the render
    Render,
    /// Another request is already rendering it
    Pending,
    Missing,
    /// The registry is full of renders in flight
    Busy,
}

/// Server state
struct ServerState {
    generator: Generator,
    store: Arc<dyn ContentStore>,
    public_dir: PathBuf,
    fallback: Mutex<HashMap<String, FallbackState>>,
    missing_ttl: Duration,
    capacity: usize,
}

impl ServerState {
    fn new(generator: Generator, store: Arc<dyn ContentStore>) -> Self {
        Self {
            public_dir: generator.blog().public_dir.clone(),
            generator,
            store,
            fallback: Mutex::new(HashMap::new()),
            missing_ttl: MISSING_TTL,
            capacity: FALLBACK_CAPACITY,
        }
    }

    fn post_file(&self, slug: &str) -> PathBuf {
        self.public_dir.join(post_output_path(slug))
    }

    fn is_fresh(&self, state: &FallbackState, now: Instant) -> bool {
        match state {
            FallbackState::Pending => true,
            FallbackState::Missing(since) => now.duration_since(*since) < self.missing_ttl,
        }
    }

    /// Decide what to do for `slug`, registering a render when none is running.
    ///
    /// Expired `Missing` entries are dropped, so a post published later is
    /// found. The registry never holds more than `capacity` slugs.
    fn claim(&self, slug: &str) -> Claim {
        let mut slugs = self.fallback.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        match slugs.get(slug).copied() {
            Some(FallbackState::Pending) => return Claim::Pending,
            Some(state) if self.is_fresh(&state, now) => return Claim::Missing,
            Some(_) => {
                slugs.remove(slug);
            }
            None => {}
        }

        if self.post_file(slug).exists() {
            return Claim::Ready;
        }

        if slugs.len() >= self.capacity {
            slugs.retain(|_, state| self.is_fresh(state, now));
        }
        if slugs.len() >= self.capacity {
            slugs.retain(|_, state| *state == FallbackState::Pending);
        }
        if slugs.len() >= self.capacity {
            return Claim::Busy;
        }

        slugs.insert(slug.to_string(), FallbackState::Pending);
        Claim::Render
    }

    fn settle(&self, slug: &str, state: Option<FallbackState>) {
        let mut slugs = self.fallback.lock().unwrap_or_else(PoisonError::into_inner);
        match state {
            Some(state) => slugs.insert(slug.to_string(), state),
            None => slugs.remove(slug),
        };
    }

    /// Resolve, render and write one post in the background
    async fn render_fallback(self: Arc<Self>, slug: String) {
        let generator = &self.generator;
        let resolved = DetailPage::resolve(
            self.store.as_ref(),
            generator.formatter(),
            generator.doc_type(),
            &slug,
            generator.fallback_banner(),
        )
        .await;

        match resolved {
            Ok(page) => match generator.write_post(&page) {
                Ok(path) => tracing::info!("Rendered on demand: {:?}", path),
                Err(e) => tracing::error!("Failed to write post {}: {}", slug, e),
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!("No post for slug {}", slug);
                self.settle(&slug, Some(FallbackState::Missing(Instant::now())));
                return;
            }
            Err(e) => tracing::error!("Failed to render post {}: {}", slug, e),
        }

        self.settle(&slug, None);
    }
}

/// Start the blog server
pub async fn start(
    generator: Generator,
    store: Arc<dyn ContentStore>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let state = Arc::new(ServerState::new(generator, store));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve a pre-rendered post, or render it on demand
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    if !is_valid_slug(&slug) {
        return not_found(&state);
    }

    let claim = state.claim(&slug);
    match claim {
        Claim::Ready => serve_html(&state.post_file(&slug)).await,
        Claim::Missing => not_found(&state),
        Claim::Busy => {
            tracing::warn!("Fallback registry full, turning away {}", slug);
            (StatusCode::SERVICE_UNAVAILABLE, "Server busy").into_response()
        }
        Claim::Render | Claim::Pending => {
            if claim == Claim::Render {
                tracing::debug!("Rendering post {} on demand", slug);
                tokio::spawn(state.clone().render_fallback(slug));
            }
            match state.generator.render_loading() {
                Ok(html) => Html(html).into_response(),
                Err(e) => server_error(e),
            }
        }
    }
}

/// Everything else comes straight from the output directory
async fn static_handler(State(state): State<Arc<ServerState>>, request: Request<Body>) -> Response {
    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => not_found(&state),
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

async fn serve_html(path: &FsPath) -> Response {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Html(content).into_response(),
        Err(e) => server_error(e.into()),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => server_error(e),
    }
}

fn server_error(e: anyhow::Error) -> Response {
    tracing::error!("Request failed: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

/// Whether `slug` can be a post uid
fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
