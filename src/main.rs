use anyhow::Result;
use clap::Parser;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use winsift::attributes::FixtureSet;
use winsift::classifier::{Classifier, DEFAULT_RULES};
use winsift::config::Config;
use winsift::services::retry_scheduler::init_global_timeout;
use winsift::{RetryScheduler, SnapshotCollector};

#[derive(Parser, Debug)]
#[command(name = "winsift")]
#[command(about = "Опрос атрибутов окон с повторами и отбор настоящих окон")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "winsift.toml")]
    config: String,

    /// Файл фикстур с приложениями и окнами
    #[arg(short, long, default_value = "fixtures/windows.toml")]
    fixtures: String,

    /// Уровень логирования (перекрывает конфигурацию)
    #[arg(long)]
    log_level: Option<String>,

    /// Повторять опрос до Ctrl+C
    #[arg(short, long)]
    watch: bool,

    /// Показать таблицу правил и выйти
    #[arg(long)]
    list_rules: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_rules {
        for rule in DEFAULT_RULES {
            println!("{}", rule);
        }
        return Ok(());
    }

    // Загрузка конфигурации
    let config = Config::load(&args.config)?;

    // Инициализация системы логирования
    let directive = args
        .log_level
        .as_deref()
        .unwrap_or_else(|| config.log_directive());
    init_tracing(directive, &config.logging.format)?;

    info!("Запуск winsift v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    init_global_timeout(config.retry.global_timeout());

    let (source, registry) = FixtureSet::load(&args.fixtures)?.into_parts()?;
    let source = Arc::new(source);
    let scheduler = Arc::new(RetryScheduler::new(&config.retry)?);
    let collector = Arc::new(SnapshotCollector::new(
        source.clone(),
        Arc::new(registry),
        scheduler,
    ));

    info!("Все компоненты инициализированы");

    if !args.watch {
        scan(collector, source.handles()).await;
        return Ok(());
    }

    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
            Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
        }
    };
    watch_until(shutdown, config.scan.polling_interval(), || {
        scan(collector.clone(), source.handles())
    })
    .await;

    info!("winsift завершил работу");
    Ok(())
}

/// Повторять `tick` с периодом `period`, пока не завершится `shutdown`.
///
/// Сигнал завершения проверяется и во время прохода, а не только между ними.
async fn watch_until<S, P, F>(shutdown: S, period: Duration, mut tick: P)
where
    S: Future<Output = ()>,
    P: FnMut() -> F,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut interval = tokio::time::interval(period);
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = interval.tick() => {
                tokio::select! {
                    _ = &mut shutdown => {
                        warn!("Проход прерван сигналом завершения");
                        break;
                    }
                    _ = tick() => {}
                }
            }
        }
    }
}

/// Один проход: снимки всех окон и их классификация
async fn scan(collector: Arc<SnapshotCollector>, handles: Vec<winsift::attributes::ElementHandle>) {
    // Отдельный поток: незавершённый сбор не задерживает выход из процесса
    let (tx, rx) = oneshot::channel();
    let spawned = std::thread::Builder::new()
        .name("winsift-scan".to_string())
        .spawn(move || {
            let _ = tx.send(collector.collect_all(&handles));
        });
    if let Err(e) = spawned {
        error!("Не удалось запустить поток сбора снимков: {}", e);
        return;
    }

    let snapshots = match rx.await {
        Ok(snapshots) => snapshots,
        Err(_) => {
            error!("Сбор снимков аварийно завершился");
            return;
        }
    };

    let classifier = Classifier::default();
    let mut windows = 0;
    for (handle, attrs) in &snapshots {
        let verdict = classifier.classify(attrs);
        if verdict.is_window() {
            windows += 1;
        }
        info!("{} {}: {}", handle, attrs, verdict);
    }

    if snapshots.is_empty() {
        warn!("Фикстуры не содержат ни одного окна");
    } else {
        info!("Настоящих окон: {} из {}", windows, snapshots.len());
    }
}

fn init_tracing(directive: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directive))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        "pretty" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
    }

    Ok(())
}
