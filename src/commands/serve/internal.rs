//! Internal implementation of the serve daemon

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener};
use std::sync::Arc;
use std::time::Instant;

use memocalc::calculator::{CalcError, Calculator, Operation};
use memocalc::store::{SqliteResultStore, StoreError};

use super::microserver::{self, HttpRequest, HttpResponse, RequestError};
use super::ServeOptions;

impl HttpRequest {
    /// Get header value by name (case-insensitive)
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl HttpResponse {
    /// Create a JSON response
    fn json(status: u16, value: &impl Serialize) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    /// Add a header
    fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

// === Server state ===

/// Server state shared across request handlers
pub struct ServerState {
    start_time: Instant,
    version: String,
    calculator: Calculator<SqliteResultStore>,
}

impl ServerState {
    pub fn new(calculator: Calculator<SqliteResultStore>) -> Self {
        Self {
            start_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            calculator,
        }
    }

    fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

// === API types ===

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    uptime_secs: u64,
}

/// Body of the four compute endpoints
#[derive(Deserialize)]
struct InputRequest {
    /// Numbers to fold; `null` or missing is a bad request
    inputs: Option<Vec<f64>>,
}

/// Every successful calculation or lookup
#[derive(Serialize)]
struct ResultResponse {
    result: f64,
}

/// Error body: `{"status": "NOT_FOUND", "message": "..."}`
#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

// === Helpers ===

/// Add security headers to response
fn with_security_headers(response: HttpResponse) -> HttpResponse {
    response
        .with_header("X-Content-Type-Options", "nosniff")
        .with_header("X-Frame-Options", "DENY")
}

/// Consistent JSON error response
fn json_error(status: u16, message: &str) -> HttpResponse {
    HttpResponse::json(
        status,
        &ErrorResponse {
            status: microserver::reason(status).to_uppercase().replace(' ', "_"),
            message: message.to_string(),
        },
    )
}

/// Translate an engine failure into its HTTP status
fn calc_error(err: &CalcError) -> HttpResponse {
    let status = match err {
        CalcError::EmptyInput | CalcError::DivisionByZero => 403,
        CalcError::NotFound => 404,
        CalcError::Store(StoreError::Duplicate { .. }) => 409,
        CalcError::Store(e) => {
            log::error!("Store failure: {}", e);
            500
        }
    };
    json_error(status, &err.to_string())
}

fn result_response(outcome: Result<f64, CalcError>) -> HttpResponse {
    match outcome {
        Ok(result) => HttpResponse::json(200, &ResultResponse { result }),
        Err(e) => calc_error(&e),
    }
}

/// Operation served at `/<name>` (lower-case route names only)
fn route_operation(segment: &str) -> Option<Operation> {
    Operation::ALL
        .into_iter()
        .find(|op| op.as_str().to_lowercase() == segment)
}

/// Parse a comma-separated number list from a path segment
fn parse_numbers(segment: &str) -> Result<Vec<f64>, String> {
    let decoded = segment.replace("%2C", ",").replace("%2c", ",");
    if decoded.trim().is_empty() {
        return Ok(Vec::new());
    }
    decoded
        .split(',')
        .map(|n| {
            n.trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid number '{}'", n))
        })
        .collect()
}

// === Transport-free handlers ===
// Business logic below this line never touches transport types.

/// Route request to handler
fn route_request(request: &HttpRequest, state: &ServerState) -> HttpResponse {
    let path = request.path.split('?').next().unwrap_or("");
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let method = request.method.as_str();
    let compute_op = match segments.as_slice() {
        [name] => route_operation(name),
        _ => None,
    };

    let response = match (method, segments.as_slice(), compute_op) {
        ("GET", ["health"], _) => handle_health(state),
        ("GET", ["version"], _) => handle_version(state),
        ("POST", _, Some(op)) => handle_compute(request, state, op),
        ("GET", ["existingresult", id], _) => handle_existing_by_id(state, id),
        ("GET", ["existingresult", numbers, operation], _) => {
            handle_existing_by_inputs(state, numbers, operation)
        }
        (_, _, Some(_)) | (_, ["existingresult", _], _) | (_, ["existingresult", _, _], _) => {
            json_error(405, "Method not allowed")
        }
        _ => json_error(404, "Not found"),
    };

    log::debug!(
        "{} {} -> {} ({})",
        method,
        path,
        response.status,
        request.header("User-Agent").unwrap_or("-")
    );
    with_security_headers(response)
}

/// Handle GET /health
fn handle_health(state: &ServerState) -> HttpResponse {
    HttpResponse::json(
        200,
        &HealthResponse {
            status: "ok".to_string(),
            version: state.version.clone(),
            uptime_secs: state.uptime_secs(),
        },
    )
}

/// Handle GET /version
fn handle_version(state: &ServerState) -> HttpResponse {
    HttpResponse::json(
        200,
        &serde_json::json!({
            "version": state.version,
            "name": "memocalc"
        }),
    )
}

/// Handle POST /addition, /subtraction, /multiplication, /division
fn handle_compute(request: &HttpRequest, state: &ServerState, operation: Operation) -> HttpResponse {
    if request.body.is_empty() {
        return json_error(400, "Missing request body");
    }

    let body: InputRequest = match serde_json::from_slice(&request.body) {
        Ok(req) => req,
        Err(e) => return json_error(400, &format!("Invalid JSON: {}", e)),
    };

    let Some(inputs) = body.inputs else {
        return json_error(400, "inputs must not be null");
    };

    result_response(state.calculator.evaluate(&inputs, operation))
}

/// Handle GET /existingresult/{id}
fn handle_existing_by_id(state: &ServerState, id: &str) -> HttpResponse {
    match id.parse::<i64>() {
        Ok(id) => result_response(state.calculator.lookup_by_id(id)),
        Err(_) => json_error(400, &format!("Invalid id '{}'", id)),
    }
}

/// Handle GET /existingresult/{numbers}/{operation}
fn handle_existing_by_inputs(state: &ServerState, numbers: &str, operation: &str) -> HttpResponse {
    let operation: Operation = match operation.parse() {
        Ok(op) => op,
        Err(e) => return json_error(400, &e.to_string()),
    };
    let inputs = match parse_numbers(numbers) {
        Ok(inputs) => inputs,
        Err(msg) => return json_error(400, &msg),
    };

    result_response(state.calculator.lookup_by_inputs(&inputs, operation))
}

// === Transport: microserver accept loop ===
// Handles both UDS and TCP via generic Read + Write streams.
// One request per connection. Thread per connection.

/// Handle one connection on any Read + Write stream.
///
/// Takes `&mut` so the caller retains ownership and can call `shutdown(Write)`
/// on the concrete stream type after this returns.
fn handle_connection(stream: &mut (impl Read + Write), state: &ServerState) {
    let resp = match microserver::read_request(stream) {
        Some(Ok(req)) => route_request(&req, state),
        Some(Err(RequestError::Malformed(msg))) => with_security_headers(json_error(400, &msg)),
        Some(Err(RequestError::TooLarge)) => {
            with_security_headers(json_error(413, "Request too large"))
        }
        None => return,
    };

    microserver::write_response(stream, &resp);
}

/// Run the serve daemon
pub fn run_server(options: ServeOptions) -> Result<()> {
    let store = SqliteResultStore::open(&options.db_path)?;
    let state = Arc::new(ServerState::new(Calculator::new(store)));

    #[cfg(unix)]
    if let Some(ref socket_path) = options.socket {
        let listener = super::setup_unix_listener(socket_path)?;
        ctrlc_cleanup(socket_path);

        println!("memocalc starting...");
        println!("   Results database: {}", options.db_path.display());
        println!("   Listening on {}", socket_path.display());
        println!(
            "   Test: curl -s --unix-socket {} http://localhost/health",
            socket_path.display()
        );
        println!("   Press Ctrl+C to stop\n");

        accept_loop_uds(listener, state);
    }

    let addr = format!("{}:{}", options.host, options.port);
    if options.host != "127.0.0.1" && options.host != "localhost" {
        log::warn!("Binding to {} exposes the server to the network (HTTP only)", options.host);
    }

    let listener = TcpListener::bind(&addr).with_context(|| format!("Failed to bind {}", addr))?;
    println!("memocalc starting...");
    println!("   Results database: {}", options.db_path.display());
    println!("   Listening on http://{}", addr);
    println!("   Press Ctrl+C to stop\n");

    accept_loop_tcp(listener, state);
}

/// Accept loop for TCP listener
fn accept_loop_tcp(listener: TcpListener, state: Arc<ServerState>) -> ! {
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    handle_connection(&mut stream, &state);
                    let _ = stream.shutdown(Shutdown::Write);
                });
            }
            Err(e) => log::error!("TCP accept error: {}", e),
        }
    }
    std::process::exit(0);
}

/// Accept loop for Unix domain socket listener
#[cfg(unix)]
fn accept_loop_uds(listener: std::os::unix::net::UnixListener, state: Arc<ServerState>) -> ! {
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    handle_connection(&mut stream, &state);
                    let _ = stream.shutdown(Shutdown::Write);
                });
            }
            Err(e) => log::error!("UDS accept error: {}", e),
        }
    }
    std::process::exit(0);
}

/// Socket to unlink from the signal handler
#[cfg(unix)]
static SOCKET_PATH: std::sync::OnceLock<std::path::PathBuf> = std::sync::OnceLock::new();

/// Register Ctrl+C handler to clean up socket on shutdown
#[cfg(unix)]
fn ctrlc_cleanup(socket_path: &std::path::Path) {
    let _ = SOCKET_PATH.set(socket_path.to_path_buf());
    unsafe {
        libc::signal(libc::SIGINT, sigint_handler as libc::sighandler_t);
        libc::signal(libc::SIGTERM, sigint_handler as libc::sighandler_t);
    }
}

#[cfg(unix)]
extern "C" fn sigint_handler(_: libc::c_int) {
    if let Some(path) = SOCKET_PATH.get() {
        super::cleanup_socket(path);
    }
    std::process::exit(0);
}
