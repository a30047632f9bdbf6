use anyhow::Result;
use clap::{Parser, Subcommand};
use moniker_resolver::name::{parse_name, unescape};
use moniker_resolver::{register_builtin_monikers, Config, Resolver};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "moniker-resolve")]
#[command(about = "Разбор, построение и разрешение имён моникеров")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "moniker.toml")]
    config: String,

    /// Уровень логирования (перекрывает файл конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Вывести сегменты имени, начиная с левого
    Parse { name: String },

    /// Построить цепочку для имени и разрешить её
    Resolve {
        name: String,

        /// Интерфейс, в который разрешать
        #[arg(short, long, default_value = "MateComponent/Unknown")]
        interface: String,
    },

    /// Вывести, сколько байт CANDIDATE покрывает цепочка для NAME
    Equal { name: String, candidate: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
        config.validate()?;
    }
    init_tracing(&config.logging.level, &config.logging.format)?;

    info!("Запуск moniker-resolve v{}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(config.component_registry());
    let cache = register_builtin_monikers(&registry);
    let resolver = Resolver::new(registry).with_configured_options(config.resolve_options());

    let outcome = tokio::select! {
        outcome = run(&resolver, args.command) => outcome,
        _ = signal::ctrl_c() => {
            warn!("Получен сигнал завершения (Ctrl+C)");
            Ok(())
        }
    };

    cache.clear();
    if let Err(e) = &outcome {
        error!("{:#}", e);
    }
    outcome
}

async fn run(resolver: &Resolver, command: Command) -> Result<()> {
    match command {
        Command::Parse { name } => {
            for segment in segments(&name) {
                println!("{}", segment);
            }
        }
        Command::Resolve { name, interface } => {
            let moniker = resolver.new_from_name_async(&name).await?;
            info!("Цепочка построена: '{}'", moniker);
            let object = resolver.resolve_async_configured(&moniker, &interface).await?;
            println!("{:?}", object);
        }
        Command::Equal { name, candidate } => {
            let moniker = resolver.new_from_name(&name)?;
            let consumed = moniker.equal(&candidate);
            println!("{} (equal: {})", consumed, Resolver::client_equal(&moniker, &candidate));
        }
    }
    Ok(())
}

/// Неэкранированные сегменты `name`, начиная с корня.
fn segments(name: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut rest = name;
    loop {
        let parsed = parse_name(rest);
        segments.push(unescape(parsed.segment, parsed.segment.len()));
        if !parsed.has_parent() {
            break;
        }
        rest = &rest[..parsed.parent_len];
    }
    segments.reverse();
    segments
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        "compact" => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_listed_root_first() {
        assert_eq!(
            segments("file:/tmp/a.tar.gz#gzip:#tar:"),
            vec!["file:/tmp/a.tar.gz", "gzip:", "tar:"]
        );
        assert_eq!(segments(r"file:/a\#b!item"), vec!["file:/a#b", "!item"]);
    }
}
