use clap::Parser;
use derived_fields::functions::Registry;
use derived_fields::{Config, Evaluation, Record};
use serde_json::Value;
use tracing::Level;

/// Resolve the fields of a JSON fixture config.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config JSON (string). Fields shaped `{"$derive": {...}}` are derived.
    config: String,
    /// Resolve only this field (optional)
    #[arg(long)]
    field: Option<String>,
    /// Invocation count passed through to the evaluation
    #[arg(long, default_value_t = 0)]
    invocations: u64,
    /// JSON object of values that take precedence over the config
    #[arg(long)]
    overrides: Option<String>,
    /// Log each computed field to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::TRACE } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(out) => match serde_json::to_string_pretty(&out) {
            Ok(s) => println!("{s}"),
            Err(e) => fail(e),
        },
        Err(e) => fail(e),
    }
}

fn run(args: &Args) -> Result<Value, Box<dyn std::error::Error>> {
    let config = Config::from_json_str(&args.config, &Registry::with_builtins())?;

    let overrides = match args.overrides.as_deref() {
        Some(s) => serde_json::from_str::<Record>(s)?,
        None => Record::new(),
    };

    let mut pass = Evaluation::new(&config, args.invocations).with_overrides(overrides);
    match args.field.as_deref() {
        Some(field) => Ok(pass.resolve(field)?.clone()),
        None => Ok(Value::Object(pass.finish()?)),
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("{e}");
    std::process::exit(1);
}
