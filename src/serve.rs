//! HTTP server for the browser dashboard
//!
//! `dbsmart serve` → starts server, opens browser, serves the page and a small
//! JSON API that drives one [`Dashboard`].
//!
//! Each request is handled on its own thread so the page can keep polling
//! `/api/state` while an AI call is in flight. The dashboard lock is only
//! held to read or update state, never across the network call.

use crate::ai::{self, CompletionService, Operation};
use crate::dashboard::Dashboard;
use crate::error::Error;
use crate::model::{Theme, UploadedFile, View};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tiny_http::{Header, Method, Request, Response, Server};

// Embed the UI directly in the binary
const UI_HTML: &str = include_str!("ui.html");

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self { ok: true, data: Some(data), error: None }
    }

    fn failure(error: &Error, data: Option<T>) -> Self {
        Self { ok: false, data, error: Some(error.to_string()) }
    }
}

#[derive(Deserialize)]
struct TextBody {
    text: String,
}

#[derive(Deserialize)]
struct SchemaBody {
    sql: String,
}

#[derive(Deserialize)]
struct ViewBody {
    view: View,
}

#[derive(Deserialize, Default)]
struct ExportParams {
    view: Option<View>,
}

/// Everything a request handler needs.
#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Mutex<Dashboard>>,
    service: Arc<dyn CompletionService>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, service: Arc<dyn CompletionService>) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
            service,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Dashboard> {
        // A panicked handler leaves plain data behind; keep serving it.
        self.dashboard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Start server, open browser, serve UI
pub fn start(port: u16, open_browser: bool, theme: Theme, service: Arc<dyn CompletionService>) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);

    eprintln!("\n\x1b[1;36m◆ DBSmart Designer\x1b[0m");
    eprintln!("   {}\n", url);
    tracing::info!(%addr, "dashboard listening");

    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!(error = %e, "could not open browser");
        }
    }

    let state = AppState::new(Dashboard::new().with_theme(theme), service);
    serve_requests(server, state);

    Ok(())
}

/// Accept requests until the server shuts down, one thread each.
fn serve_requests(server: Server, state: AppState) {
    for request in server.incoming_requests() {
        let state = state.clone();
        std::thread::spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                tracing::error!(error = %e, "failed to respond");
            }
        });
    }
}

fn handle_request(mut request: Request, state: &AppState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("/");
    let query = url.split('?').nth(1).unwrap_or("");
    let method = request.method().clone();
    tracing::debug!(%method, %path, "request");

    match (&method, path) {
        (&Method::Get, "/") => {
            let response = Response::from_string(UI_HTML).with_header(content_type("text/html; charset=utf-8"));
            request.respond(response)
        }

        (&Method::Get, "/api/state") => respond_state(request, state, None),

        (&Method::Post, "/api/upload") => {
            let parsed = read_json::<UploadedFile>(&mut request).and_then(UploadedFile::validate);
            match parsed {
                Ok(file) => {
                    state.lock().upload(file);
                    respond_state(request, state, None)
                }
                Err(e) => respond_state(request, state, Some(e)),
            }
        }

        (&Method::Post, "/api/input") => {
            let parsed = read_json::<TextBody>(&mut request);
            match parsed {
                Ok(body) => {
                    state.lock().set_text(body.text);
                    respond_state(request, state, None)
                }
                Err(e) => respond_state(request, state, Some(e)),
            }
        }

        (&Method::Post, "/api/input/clear") => {
            state.lock().clear_input();
            respond_state(request, state, None)
        }

        (&Method::Post, "/api/schema") => {
            let parsed = read_json::<SchemaBody>(&mut request);
            match parsed {
                Ok(body) => {
                    state.lock().set_schema(body.sql);
                    respond_state(request, state, None)
                }
                Err(e) => respond_state(request, state, Some(e)),
            }
        }

        (&Method::Post, "/api/view") => {
            let parsed = read_json::<ViewBody>(&mut request);
            match parsed {
                Ok(body) => {
                    state.lock().set_view(body.view);
                    respond_state(request, state, None)
                }
                Err(e) => respond_state(request, state, Some(e)),
            }
        }

        (&Method::Post, "/api/theme") => {
            state.lock().toggle_theme();
            respond_state(request, state, None)
        }

        (&Method::Post, "/api/dismiss") => {
            state.lock().dismiss_error();
            respond_state(request, state, None)
        }

        (&Method::Post, "/api/generate-sql") => run_operation(request, state, Operation::GenerateSql),
        (&Method::Post, "/api/generate-er") => run_operation(request, state, Operation::GenerateEr),
        (&Method::Post, "/api/optimize") => run_operation(request, state, Operation::Optimize),

        (&Method::Get, "/api/export") => {
            let params: ExportParams = serde_urlencoded::from_str(query).unwrap_or_default();
            let exported = {
                let mut dashboard = state.lock();
                let view = params.view.unwrap_or_else(|| dashboard.view());
                dashboard.export_view(view)
            };
            match exported {
                Ok(file) => {
                    tracing::info!(filename = file.filename, "export");
                    let disposition = format!("attachment; filename=\"{}\"", file.filename);
                    let response = Response::from_string(file.content)
                        .with_header(content_type(file.mime_type))
                        .with_header(header("Content-Disposition", &disposition));
                    request.respond(response)
                }
                Err(e) => respond_state_with_status(request, state, Some(e), 409),
            }
        }

        // 404
        _ => {
            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

/// Idle → Running under the lock, call the service without it, commit under it again.
fn run_operation(request: Request, state: &AppState, op: Operation) -> std::io::Result<()> {
    let begun = state.lock().begin(op);

    let outcome = match begun {
        Ok(completion) => {
            let result = ai::execute(state.service.as_ref(), &completion);
            state.lock().finish(op, result)
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => respond_state(request, state, None),
        Err(e) => respond_state(request, state, Some(e)),
    }
}

fn respond_state(request: Request, state: &AppState, error: Option<Error>) -> std::io::Result<()> {
    respond_state_with_status(request, state, error, 200)
}

fn respond_state_with_status(
    request: Request,
    state: &AppState,
    error: Option<Error>,
    status: u16,
) -> std::io::Result<()> {
    let body = {
        let mut dashboard = state.lock();
        match error {
            None => ApiResponse::success(dashboard.snapshot()),
            Some(e) => {
                // Every failure ends up in the banner, not only the ones the dashboard raised
                dashboard.report(&e);
                ApiResponse::failure(&e, Some(dashboard.snapshot()))
            }
        }
    };
    let json = serde_json::to_string(&body)?;
    let response = Response::from_string(json)
        .with_status_code(status)
        .with_header(content_type("application/json"));
    request.respond(response)
}

fn read_json<T: serde::de::DeserializeOwned>(request: &mut Request) -> Result<T, Error> {
    let mut body = String::new();
    request.as_reader().read_to_string(&mut body)?;
    serde_json::from_str(&body).map_err(|e| Error::BadRequest(e.to_string()))
}

fn content_type(value: &str) -> Header {
    header("Content-Type", value)
}

fn header(name: &str, value: &str) -> Header {
    // Names and values are built in this module and always ASCII
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("ASCII header")
}
