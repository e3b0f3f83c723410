//! `strata` command line
//!
//! Loads a fixture (schema plus graph) into an in-memory session and runs
//! one request against it, printing the response as JSON.
//!
//! ```text
//! strata --fixture demos/company.json get /people/123/owns --param sort=size
//! strata --fixture demos/company.json post /people '{"name":"Eve","age":"29"}'
//! strata --fixture demos/company.json schema Person
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use strata_core::{Entity, FrameworkError, NodeFactory, Session};
use strata_graph::GetAllNodes;
use strata_rest::{
    Method, Request, ResourcePath, Response, RestService, StrataConfig, StrataFixture,
    SCHEMA_SEGMENT,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "strata", version, about = "Resolve and run requests against a graph fixture")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON fixture with `schema` and `graph` sections
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Query parameter as `name=value` (repeatable)
    #[arg(long = "param", short = 'p', global = true, value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a resource
    Get {
        /// Resource path
        path: String,
    },
    /// Create an entity
    Post {
        /// Resource path
        path: String,
        /// JSON object body
        body: String,
    },
    /// Update an entity
    Put {
        /// Resource path
        path: String,
        /// JSON object body
        body: String,
    },
    /// Delete or unlink
    Delete {
        /// Resource path
        path: String,
    },
    /// List allowed methods
    Options {
        /// Resource path
        path: String,
    },
    /// Describe the registered types, or one type
    Schema {
        /// Type name in any spelling
        type_name: Option<String>,
    },
    /// Dump raw nodes
    Nodes {
        /// Restrict to these raw type names
        #[arg(long = "type")]
        types: Vec<String>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{raw}'"))
}

fn parse_body(raw: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(raw).context("body is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("body must be a JSON object, got {other}"),
    }
}

fn init_tracing(config: &StrataConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn render(response: &Response) -> Value {
    let mut out = json!({ "status": response.status });
    if !response.headers.is_empty() {
        out["headers"] = json!(response.headers);
    }
    if let Some(body) = &response.body {
        out["body"] = json!(body);
    }
    out
}

fn render_error(error: &FrameworkError) -> Value {
    let mut out = json!({ "status": error.status(), "error": error.to_string() });
    let errors: Vec<String> = error
        .validation_errors()
        .iter()
        .map(ToString::to_string)
        .collect();
    if !errors.is_empty() {
        out["errors"] = json!(errors);
    }
    out
}

fn dump_nodes(session: &Session, types: Vec<String>) -> Value {
    let command = if types.is_empty() {
        GetAllNodes::new()
    } else {
        GetAllNodes::of_types(types)
    };
    let nodes = command.execute(session.store());
    let entities: Vec<Entity> = NodeFactory::bulk_instantiate(nodes.iter().cloned());
    let rows: Vec<Value> = nodes
        .iter()
        .zip(&entities)
        .map(|(node, entity)| {
            json!({ "id": entity.id(), "type": entity.type_name(), "properties": node.properties })
        })
        .collect();
    json!({ "count": rows.len(), "nodes": rows })
}

fn request_for(command: Command) -> Result<Request> {
    let (method, path, body) = match command {
        Command::Get { path } => (Method::Get, path, None),
        Command::Post { path, body } => (Method::Post, path, Some(parse_body(&body)?)),
        Command::Put { path, body } => (Method::Put, path, Some(parse_body(&body)?)),
        Command::Delete { path } => (Method::Delete, path, None),
        Command::Options { path } => (Method::Options, path, None),
        Command::Schema { type_name } => {
            let path = match type_name {
                Some(type_name) => format!("/{SCHEMA_SEGMENT}/{type_name}"),
                None => format!("/{SCHEMA_SEGMENT}"),
            };
            (Method::Get, path, None)
        }
        Command::Nodes { .. } => anyhow::bail!("nodes is not a resource request"),
    };
    let path: ResourcePath = path.parse()?;
    let mut request = Request::new(method, path);
    request.body = body;
    Ok(request)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => StrataConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StrataConfig::default(),
    };
    if cli.json_logs {
        config = config.with_json_logs(true);
    }
    init_tracing(&config);

    let fixture = match &cli.fixture {
        Some(path) => StrataFixture::load(path)
            .with_context(|| format!("loading fixture {}", path.display()))?,
        None => StrataFixture::default(),
    };
    let session = fixture.into_session().context("building session")?;

    let output = match cli.command {
        Command::Nodes { types } => Ok(dump_nodes(&session, types)),
        command => {
            let mut request = request_for(command)?;
            request.params.extend(cli.params);
            RestService::new(config)
                .handle(&session, &request)
                .map(|response| render(&response))
                .map_err(|error| render_error(&error))
        }
    };

    let (value, code) = match output {
        Ok(value) => (value, ExitCode::SUCCESS),
        Err(value) => (value, ExitCode::FAILURE),
    };
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(code)
}
