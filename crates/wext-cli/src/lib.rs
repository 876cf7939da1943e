use axum::Router;
use axum::extract::State as AxumState;
use axum::http::{HeaderMap, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use wext_web::{AxumWextAdapter, Page, PageData, PageRouter, ServerConfig, WEXT_CLIENT_JS, WextError};

#[derive(Debug, Clone)]
enum CliCommand {
    Serve {
        dir: PathBuf,
        port: Option<u16>,
        config: String,
    },
    InitClient {
        out: PathBuf,
    },
}

/// File-backed page descriptor from wext.json. Paths are relative to the
/// served directory; body and head fragments may carry `{{name}}` tokens
/// filled from captured route parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FilePage {
    route: String,
    template: String,
    body: String,
    #[serde(default)]
    head: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RouterFileConfig {
    #[serde(default)]
    pages: Vec<FilePage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CliConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    router: RouterFileConfig,
}

#[derive(Clone)]
struct AppState {
    adapter: AxumWextAdapter,
    static_root: Option<PathBuf>,
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wext=info")),
        )
        .init();
}

pub async fn run_from_env() -> Result<(), String> {
    run_from_args(env::args().skip(1).collect()).await
}

pub async fn run_from_args(args: Vec<String>) -> Result<(), String> {
    let command = parse_command(args)?;

    match command {
        CliCommand::Serve { dir, port, config } => run_server(dir, port, &config).await,
        CliCommand::InitClient { out } => {
            fs::write(&out, WEXT_CLIENT_JS)
                .map_err(|e| format!("failed to write {}: {e}", out.display()))?;
            println!("wrote {}", out.display());
            Ok(())
        }
    }
}

fn parse_command(args: Vec<String>) -> Result<CliCommand, String> {
    if args.is_empty() {
        return Err(help_text());
    }

    let cmd = args[0].as_str();
    match cmd {
        "serve" => parse_serve(args),
        "init-client" => parse_init_client(args),
        "help" | "--help" | "-h" => Err(help_text()),
        _ => Err(format!("unknown command: {cmd}\n\n{}", help_text())),
    }
}

fn parse_serve(args: Vec<String>) -> Result<CliCommand, String> {
    let mut dir: Option<PathBuf> = None;
    let mut port: Option<u16> = None;
    let mut config = "wext.json".to_string();

    let mut i = 1usize;
    while i < args.len() {
        let token = &args[i];
        match token.as_str() {
            "--port" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| "--port requires a value".to_string())?;
                port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| format!("invalid port: {value}"))?,
                );
            }
            "--config" => {
                i += 1;
                config = args
                    .get(i)
                    .ok_or_else(|| "--config requires a value".to_string())?
                    .to_string();
            }
            x if x.starts_with("--") => return Err(format!("unknown flag: {x}")),
            _ => {
                if dir.is_some() {
                    return Err("only one DIR positional argument is allowed".to_string());
                }
                dir = Some(PathBuf::from(token));
            }
        }
        i += 1;
    }

    Ok(CliCommand::Serve {
        dir: dir.unwrap_or_else(|| PathBuf::from(".")),
        port,
        config,
    })
}

fn parse_init_client(args: Vec<String>) -> Result<CliCommand, String> {
    let mut out = PathBuf::from("wext-client.js");
    let mut i = 1usize;

    while i < args.len() {
        let token = &args[i];
        match token.as_str() {
            "--out" => {
                i += 1;
                out = PathBuf::from(
                    args.get(i)
                        .ok_or_else(|| "--out requires a value".to_string())?,
                );
            }
            x if x.starts_with("--") => return Err(format!("unknown flag: {x}")),
            _ => return Err("init-client does not accept positional args".to_string()),
        }
        i += 1;
    }

    Ok(CliCommand::InitClient { out })
}

fn help_text() -> String {
    [
        "wext CLI",
        "",
        "Commands:",
        "  wext serve [DIR] [--port 5000] [--config wext.json]",
        "  wext init-client [--out wext-client.js]",
    ]
    .join("\n")
}

fn load_config(dir: &Path, config_name: &str) -> Result<CliConfig, String> {
    let path = dir.join(config_name);
    if !path.is_file() {
        return Ok(CliConfig::default());
    }

    let content =
        fs::read_to_string(&path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    serde_json::from_str::<CliConfig>(&content)
        .map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Replace `{{name}}` tokens with captured route parameters.
fn substitute_params(source: &str, params: &HashMap<String, String>) -> String {
    let mut out = source.to_string();
    for (key, value) in params {
        let token = format!("{{{{{key}}}}}");
        out = out.replace(&token, value);
    }
    out
}

fn read_fragment(path: &Path, params: &HashMap<String, String>) -> Result<String, WextError> {
    let source = fs::read_to_string(path).map_err(|e| WextError::io(path, e))?;
    Ok(substitute_params(&source, params))
}

fn build_pages(dir: &Path, config: &CliConfig) -> Result<Vec<Page>, String> {
    let mut pages = Vec::with_capacity(config.router.pages.len());

    for file_page in &config.router.pages {
        let template_path = dir.join(&file_page.template);
        let template = fs::read_to_string(&template_path)
            .map_err(|e| format!("failed to read {}: {e}", template_path.display()))?;

        let body_path = dir.join(&file_page.body);
        let head_path = file_page.head.as_ref().map(|h| dir.join(h));

        pages.push(Page::new(&file_page.route, template, move |ctx| {
            let body = read_fragment(&body_path, &ctx.params)?;
            let head = match &head_path {
                Some(path) => Some(read_fragment(path, &ctx.params)?),
                None => None,
            };
            Ok(PageData {
                body,
                head,
                headers: Vec::new(),
            })
        }));
    }

    Ok(pages)
}

async fn run_server(dir: PathBuf, port_override: Option<u16>, config_name: &str) -> Result<(), String> {
    let dir = dir
        .canonicalize()
        .map_err(|e| format!("failed to resolve {}: {e}", dir.display()))?;

    let config = load_config(&dir, config_name)?;
    let port = port_override.unwrap_or(config.server.port);
    let pages = build_pages(&dir, &config)?;
    if pages.is_empty() {
        return Err(format!(
            "no pages configured; add a router.pages entry to {}",
            dir.join(config_name).display()
        ));
    }

    let static_root = config
        .server
        .serve_static
        .as_ref()
        .map(|rel| dir.join(rel));

    let state = Arc::new(AppState {
        adapter: AxumWextAdapter::new(PageRouter::new(pages)),
        static_root,
    });

    let app = Router::new()
        .route("/wext-client.js", get(client_js))
        .route("/", get(route_index))
        .route("/{*path}", get(route_any))
        .with_state(Arc::clone(&state));

    let host = format!("0.0.0.0:{port}");
    info!(root = %dir.display(), port, pages = state.adapter.router().pages().len(), "wext serving");
    info!("URL: http://localhost:{port}");

    let listener = tokio::net::TcpListener::bind(&host)
        .await
        .map_err(|e| format!("failed to bind {host}: {e}"))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server failed: {e}"))?;

    Ok(())
}

async fn client_js() -> Response {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        WEXT_CLIENT_JS,
    )
        .into_response()
}

async fn route_index(
    uri: Uri,
    headers: HeaderMap,
    AxumState(state): AxumState<Arc<AppState>>,
) -> Response {
    state.adapter.respond_request("GET", &uri, &headers)
}

async fn route_any(
    uri: Uri,
    headers: HeaderMap,
    AxumState(state): AxumState<Arc<AppState>>,
) -> Response {
    let raw_path = uri.path();

    if let Some(root) = &state.static_root {
        let rel = match sanitize_rel_path(raw_path) {
            Some(p) => p,
            None => return (StatusCode::BAD_REQUEST, "invalid path").into_response(),
        };
        if let Some(file) = resolve_static_file(root, &rel) {
            return serve_static(&file).await;
        }
    }

    if let Some(response) = state.adapter.respond_matched("GET", &uri, &headers) {
        return response;
    }

    (StatusCode::NOT_FOUND, "not found").into_response()
}

fn sanitize_rel_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim_start_matches('/');
    let rel = PathBuf::from(trimmed);
    for comp in rel.components() {
        if matches!(
            comp,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        ) {
            return None;
        }
    }
    Some(rel)
}

fn resolve_static_file(root: &Path, rel: &Path) -> Option<PathBuf> {
    if rel.as_os_str().is_empty() {
        return None;
    }

    let full = root.join(rel);
    if !full.is_file() {
        return None;
    }

    Some(full)
}

async fn serve_static(path: &Path) -> Response {
    let bytes = match tokio::fs::read(path).await {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to read {}: {e}", path.display()),
            )
                .into_response();
        }
    };

    let content_type = match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
    {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "application/javascript; charset=utf-8",
        "json" | "map" => "application/json; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "gz" => "application/gzip",
        _ => "application/octet-stream",
    };

    let mut response = bytes.into_response();
    if let Ok(value) = HeaderValue::from_str(content_type) {
        response.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};
    use wext_web::{HEADER_UPDATES_HEADER, HeaderUpdates, PARTIAL_CONTENT_HEADER};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{}-{}-{}", prefix, std::process::id(), ts));
        std::fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    fn write_demo_site(dir: &Path) {
        fs::write(
            dir.join("shell.html"),
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body><wext-router></wext-router><script type=\"module\" src=\"/wext-client.js\"></script></body></html>",
        )
        .expect("write shell");
        fs::write(dir.join("home.html"), "<h1>Home</h1>").expect("write home body");
        fs::write(dir.join("home-head.html"), "<title>Welcome</title>").expect("write home head");
        fs::write(dir.join("show.html"), "<h1>{{slug}}</h1>").expect("write show body");
        fs::write(dir.join("show-head.html"), "<title>{{slug}}</title>")
            .expect("write show head");
        fs::write(
            dir.join("wext.json"),
            r#"{
                "server": { "port": 5000 },
                "router": { "pages": [
                    { "route": "/", "template": "shell.html", "body": "home.html", "head": "home-head.html" },
                    { "route": "/:slug", "template": "shell.html", "body": "show.html", "head": "show-head.html" }
                ] }
            }"#,
        )
        .expect("write config");
    }

    fn demo_adapter(dir: &Path) -> AxumWextAdapter {
        let config = load_config(dir, "wext.json").expect("config must load");
        let pages = build_pages(dir, &config).expect("pages must build");
        AxumWextAdapter::new(PageRouter::new(pages))
    }

    #[test]
    fn test_parse_serve_defaults() {
        let command = parse_command(vec!["serve".to_string()]).expect("serve must parse");
        match command {
            CliCommand::Serve { dir, port, config } => {
                assert_eq!(dir, PathBuf::from("."));
                assert_eq!(port, None);
                assert_eq!(config, "wext.json");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_serve_flags() {
        let command = parse_command(
            ["serve", "site", "--port", "8080", "--config", "alt.json"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .expect("serve with flags must parse");
        match command {
            CliCommand::Serve { dir, port, config } => {
                assert_eq!(dir, PathBuf::from("site"));
                assert_eq!(port, Some(8080));
                assert_eq!(config, "alt.json");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let err = parse_command(vec!["serve".to_string(), "--bogus".to_string()])
            .expect_err("unknown flag must fail");
        assert!(err.contains("unknown flag"));
    }

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let dir = unique_temp_dir("wext-cli-noconfig");
        let config = load_config(&dir, "wext.json").expect("missing file is not an error");
        assert_eq!(config.server.port, 5000);
        assert!(config.router.pages.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_substitute_params_replaces_tokens() {
        let mut params = HashMap::new();
        params.insert("slug".to_string(), "serial".to_string());
        assert_eq!(
            substitute_params("<h1>{{slug}}</h1><p>{{missing}}</p>", &params),
            "<h1>serial</h1><p>{{missing}}</p>"
        );
    }

    #[test]
    fn test_sanitize_rel_path_rejects_traversal() {
        assert_eq!(sanitize_rel_path("/css/app.css"), Some(PathBuf::from("css/app.css")));
        assert_eq!(sanitize_rel_path("/../etc/passwd"), None);
        assert_eq!(sanitize_rel_path("/a/../../b"), None);
    }

    #[test]
    fn test_file_backed_page_serves_full_document() {
        let dir = unique_temp_dir("wext-cli-full");
        write_demo_site(&dir);

        let response = demo_adapter(&dir).respond_path("GET", "/", &HeaderMap::new());
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(HEADER_UPDATES_HEADER).is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_backed_page_substitutes_route_params_in_partial() {
        let dir = unique_temp_dir("wext-cli-partial");
        write_demo_site(&dir);

        let mut headers = HeaderMap::new();
        headers.insert(PARTIAL_CONTENT_HEADER, HeaderValue::from_static("true"));
        let response = demo_adapter(&dir).respond_path("GET", "/serial", &headers);

        let raw = response
            .headers()
            .get(HEADER_UPDATES_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("partial response must carry a title update");
        let decoded = HeaderUpdates::decode(raw).expect("title update must decode");
        assert_eq!(decoded.title, "serial", "route param fills the head token");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_resolve_static_file_ignores_empty_rel() {
        let dir = unique_temp_dir("wext-cli-static");
        fs::write(dir.join("app.css"), "body{}").expect("write css");

        assert_eq!(resolve_static_file(&dir, Path::new("")), None);
        assert_eq!(
            resolve_static_file(&dir, Path::new("app.css")),
            Some(dir.join("app.css"))
        );
        assert_eq!(resolve_static_file(&dir, Path::new("missing.css")), None);

        let _ = fs::remove_dir_all(&dir);
    }
}
