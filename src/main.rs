use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct CliArgs {
    bind: Option<String>,
    secrets: Option<PathBuf>,
    inline_audio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1).collect())?;
    init_tracing();

    let mut config = shellarchive::config::ServerConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind
            .parse()
            .with_context(|| format!("invalid --bind address {bind}"))?;
    }
    if let Some(path) = args.secrets {
        config.secrets_path = path;
    }
    if args.inline_audio {
        config.inline_audio = true;
    }

    let playlist = shellarchive::config::load_playlist(&config);
    shellarchive::server::serve(config, playlist).await
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shellarchive=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_args(args: Vec<String>) -> anyhow::Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--bind" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--bind requires host:port value");
                };
                if value.trim().is_empty() {
                    anyhow::bail!("--bind cannot be empty");
                }
                out.bind = Some(value.trim().to_string());
            }
            "--secrets" => {
                index += 1;
                let Some(value) = args.get(index) else {
                    anyhow::bail!("--secrets requires a path to secrets.toml");
                };
                out.secrets = Some(PathBuf::from(value));
            }
            "--inline-audio" => out.inline_audio = true,
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => anyhow::bail!("unknown argument {other}"),
        }
        index += 1;
    }
    Ok(out)
}

fn print_help() {
    println!("shellarchive");
    println!("  --bind host:port     Address to serve on (default 127.0.0.1:8501)");
    println!("  --secrets path       secrets.toml holding PLAYLIST_DATA");
    println!("  --inline-audio       Embed audio in the page instead of streaming it");
}
