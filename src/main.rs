//! Purpose: `exprport` CLI entry point: parse and evaluate expressions through the safe façade.
//! Role: Binary crate root; parses args, binds typed variables and host callbacks, emits JSON.
//! Invariants: Successful commands print exactly one JSON object on stdout.
//! Invariants: Errors are JSON on stderr (plain text on a TTY); exit code from `to_exit_code`.
//! Invariants: The engine is reached only through `exprport::port` types.
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint};
use serde::Serialize;
use serde_json::{Map, Value as Json, json};
use tracing_subscriber::EnvFilter;

use exprport::error::{Error, ErrorKind, to_exit_code};
use exprport::{Context, Expr, Value};

#[derive(Parser)]
#[command(
    name = "exprport",
    version,
    about = "Parse and evaluate expressions through the exprport boundary",
    long_about = None,
    after_help = r#"EXAMPLES
  $ exprport eval 'a + b * f(c)' --int a=1 --int b=2 --string c=hello --strlen f --as int
  {"value":11}
  $ exprport eval '(1, 2, 3)'
  {"value":[1,2,3]}
  $ exprport parse 'x > 0 && y'

Logging goes to stderr and is filtered with RUST_LOG (default: warn)."#,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Evaluate an expression against typed bindings")]
    Eval(EvalArgs),
    #[command(about = "Print the parsed expression tree")]
    Parse(SourceArgs),
}

#[derive(Args)]
struct SourceArgs {
    #[arg(
        help = "Expression text",
        required_unless_present = "file",
        conflicts_with = "file"
    )]
    expr: Option<String>,
    #[arg(
        long,
        help = "Read the expression from a file",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct EvalArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(
        long = "int",
        value_name = "NAME=VALUE",
        help = "Bind an integer variable"
    )]
    ints: Vec<String>,
    #[arg(
        long = "float",
        value_name = "NAME=VALUE",
        help = "Bind a float variable"
    )]
    floats: Vec<String>,
    #[arg(
        long = "bool",
        value_name = "NAME=VALUE",
        help = "Bind a boolean variable"
    )]
    bools: Vec<String>,
    #[arg(
        long = "string",
        value_name = "NAME=VALUE",
        help = "Bind a string variable"
    )]
    strings: Vec<String>,
    #[arg(
        long = "strlen",
        value_name = "NAME",
        help = "Bind NAME as a host function returning the length of its string argument"
    )]
    strlen: Vec<String>,
    #[arg(
        long = "as",
        value_enum,
        default_value_t = ResultType::Auto,
        help = "Result type to evaluate as"
    )]
    result_type: ResultType,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ResultType {
    Auto,
    Bool,
    Int,
    Float,
    String,
}

#[derive(Serialize)]
struct EvalOutput {
    value: Json,
}

#[derive(Serialize)]
struct ParseOutput {
    tree: String,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(()) => 0,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<(), Error> {
    match cli.command {
        Command::Eval(args) => {
            let expr = parse_source(&read_source(&args.source)?)?;
            let context = build_context(&args)?;
            let value = evaluate(&expr, &context, args.result_type)?;
            emit_json(&EvalOutput { value })
        }
        Command::Parse(args) => {
            let expr = parse_source(&read_source(&args)?)?;
            emit_json(&ParseOutput {
                tree: expr.debug_string(),
            })
        }
    }
}

fn read_source(args: &SourceArgs) -> Result<String, Error> {
    match (&args.expr, &args.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => std::fs::read_to_string(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read expression file")
                .with_path(path)
                .with_source(err)
        }),
        (None, None) => Err(Error::new(ErrorKind::Usage).with_message("no expression")),
    }
}

fn parse_source(text: &str) -> Result<Expr, Error> {
    Expr::parse(text).ok_or_else(|| {
        Error::new(ErrorKind::Parse)
            .with_message("expression did not parse")
            .with_hint("Expressions must be non-empty with balanced parentheses.")
    })
}

fn build_context(args: &EvalArgs) -> Result<Context, Error> {
    let mut context = Context::new();
    for raw in &args.ints {
        let (name, value) = split_binding(raw)?;
        let value = value
            .parse::<i64>()
            .map_err(|err| invalid_binding(raw, "integer", err))?;
        bind(name, context.set_int(name, value))?;
    }
    for raw in &args.floats {
        let (name, value) = split_binding(raw)?;
        let value = value
            .parse::<f64>()
            .map_err(|err| invalid_binding(raw, "float", err))?;
        bind(name, context.set_float(name, value))?;
    }
    for raw in &args.bools {
        let (name, value) = split_binding(raw)?;
        let value = value
            .parse::<bool>()
            .map_err(|err| invalid_binding(raw, "boolean", err))?;
        bind(name, context.set_bool(name, value))?;
    }
    for raw in &args.strings {
        let (name, value) = split_binding(raw)?;
        bind(name, context.set_string(name, value))?;
    }
    for name in &args.strlen {
        let bound = context.set_function(name, |value| {
            let text = value.get_string()?;
            i64::try_from(text.len()).ok().map(Value::from)
        });
        bind(name, bound)?;
    }
    tracing::debug!(bindings = %context.debug_string(), "context ready");
    Ok(context)
}

fn split_binding(raw: &str) -> Result<(&str, &str), Error> {
    raw.split_once('=').ok_or_else(|| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("binding `{raw}` is missing `=`"))
            .with_hint("Use NAME=VALUE, e.g. --int a=1.")
    })
}

fn invalid_binding(
    raw: &str,
    expected: &str,
    err: impl std::error::Error + Send + Sync + 'static,
) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("binding `{raw}` is not a valid {expected}"))
        .with_source(err)
}

fn bind(name: &str, bound: bool) -> Result<(), Error> {
    if bound {
        return Ok(());
    }
    Err(Error::new(ErrorKind::Binding)
        .with_message(format!("binding `{name}` was rejected"))
        .with_hint("A variable keeps the type it was first bound with."))
}

fn evaluate(expr: &Expr, context: &Context, result_type: ResultType) -> Result<Json, Error> {
    let value = match result_type {
        ResultType::Auto => expr.eval_value(context).map(|value| value_json(&value)),
        ResultType::Bool => expr.eval_bool(context).map(Json::from),
        ResultType::Int => expr.eval_int(context).map(Json::from),
        ResultType::Float => expr.eval_float(context).map(Json::from),
        ResultType::String => expr.eval_string(context).map(Json::from),
    };
    value.ok_or_else(|| {
        Error::new(ErrorKind::Eval)
            .with_message("evaluation failed")
            .with_hint("Bind every name and match --as to the result type.")
    })
}

fn value_json(value: &Value) -> Json {
    if let Some(flag) = value.get_bool() {
        return Json::from(flag);
    }
    if let Some(int) = value.get_int() {
        return Json::from(int);
    }
    if let Some(float) = value.get_float() {
        return Json::from(float);
    }
    if let Some(text) = value.get_string() {
        return Json::from(text);
    }
    if let Some(items) = value.get_tuple() {
        return Json::Array(items.iter().map(value_json).collect());
    }
    Json::Null
}

fn emit_json(output: &impl Serialize) -> Result<(), Error> {
    let json = serde_json::to_string(output).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output")
            .with_source(err)
    })?;
    println!("{json}");
    Ok(())
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }
    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Parse => "parse failed".to_string(),
        ErrorKind::Eval => "evaluation failed".to_string(),
        ErrorKind::Binding => "binding rejected".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Json {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.to_string_lossy()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": Json::Object(inner) })
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    for cause in error_causes(err) {
        lines.push(format!("caused by: {cause}"));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    lines.join("\n")
}
