use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::net::SocketAddr;
use std::process::exit;
use tracing::*;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};
use wordtok::{IdStrategy, Service};
use wordtok_http::{ServerConfig, DEFAULT_BIND, DEFAULT_MAX_BODY_BYTES};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    globals: Globals,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Globals {
    /// Address the server listens on
    #[arg(long, env = "WTK_BIND", default_value = DEFAULT_BIND, global = true)]
    bind: SocketAddr,

    /// Largest request body the server accepts, in bytes
    #[arg(long, env = "WTK_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES, global = true)]
    max_body_bytes: usize,

    /// How new tokens are assigned ids: `random` or `sequential`
    #[arg(long, env = "WTK_ID_STRATEGY", default_value_t = IdStrategy::Random, global = true)]
    ids: IdStrategy,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tokenizer over HTTP.  This is the default when no command is given.
    ///
    /// Log events are written to stderr
    Serve,

    /// Encode some text with a fresh vocabulary and print the ids, along with what they decode to
    Encode {
        /// The text to encode.  Quote it to keep its whitespace intact.
        text: String,
    },
}

impl Commands {
    fn execute(self, globals: &Globals) -> anyhow::Result<()> {
        use Commands::*;
        match self {
            Serve => {
                let config = ServerConfig {
                    bind: globals.bind,
                    id_strategy: globals.ids,
                    max_body_bytes: globals.max_body_bytes,
                };

                wordtok_http::serve(config)?;
            }
            Encode { text } => {
                let service = Service::new(globals.ids);
                let tokens = service.encode_text(&text)?;
                let ids: Vec<i64> = tokens.iter().copied().map(i64::from).collect();
                let decoded = service.decode_ids(&ids);

                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "tokens": tokens,
                        "text": decoded,
                    }))?
                );
            }
        }

        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    let default_log_directive = match cli.globals.debug {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // Initialize tracing with JSON formatting and full detail
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_log_directive.into())
                .from_env_lossy(),
        )
        .json()
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        exit(1);
    }

    let command = cli.command.unwrap_or_else(|| {
        debug!("No command given, defaulting to serve");
        Commands::Serve
    });

    if let Err(e) = command.execute(&cli.globals) {
        error!("{:#}", e);
        exit(1);
    } else {
        debug!("command executed successfully");
    }
}
