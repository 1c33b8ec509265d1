use std::io::{IsTerminal, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use megascan::command::{parse_command, Command, HELP};
use megascan::render::{render_page, render_settings, Style};
use megascan_view::window::compute_window;
use megascan_view::{PageLimit, PageType, Status};
use reviewer::{FragmentStore, HttpApi, ReviewerConfig, SettingsSource, StoreDriver};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(version, about = "Megascan reviewer: page through scanner findings and mark them")]
struct Cli {
    /// Базовый URL API сканера (перекрывает MEGASCAN_API)
    #[arg(long, global = true)]
    api: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Ревью фрагментов: интерактивно или одна страница с --once
    Review {
        #[arg(long)]
        pagetype: Option<PageType>,
        #[arg(long)]
        status: Option<Status>,
        #[arg(long)]
        limit: Option<PageLimit>,
        /// Стартовая страница
        #[arg(long, default_value_t = 0)]
        page: i64,
        /// Вывести страницу и выйти
        #[arg(long)]
        once: bool,
        /// Подсветка скобками вместо ANSI
        #[arg(long)]
        plain: bool,
    },
    /// Показать настройки сканера (секреты скрыты)
    Settings,
    /// Посчитать окно пагинации без обращения к API
    Window {
        current: usize,
        max: usize,
        #[arg(long)]
        radius: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut cfg = ReviewerConfig::from_env()?;
    if let Some(api) = cli.api {
        cfg.api_base = api;
    }

    match cli.cmd {
        Cmd::Review {
            pagetype,
            status,
            limit,
            page,
            once,
            plain,
        } => {
            cfg.page_type = pagetype.unwrap_or(cfg.page_type);
            cfg.status = status.unwrap_or(cfg.status);
            cfg.limit = limit.unwrap_or(cfg.limit);
            let style = if plain || !std::io::stdout().is_terminal() {
                Style::Brackets
            } else {
                Style::Ansi
            };
            run_review(cfg, page, once, style).await?;
        }
        Cmd::Settings => {
            let api = HttpApi::from_config(&cfg)?;
            let settings = api.settings().await?;
            println!("{}", render_settings(&settings)?);
        }
        Cmd::Window {
            current,
            max,
            radius,
        } => {
            let w = compute_window(current, max, radius.unwrap_or(cfg.window_radius));
            let pages: Vec<String> = w.iter().map(|p| p.to_string()).collect();
            println!("{}", pages.join(" "));
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_review(
    cfg: ReviewerConfig,
    page: i64,
    once: bool,
    style: Style,
) -> anyhow::Result<()> {
    let api = Arc::new(HttpApi::from_config(&cfg)?);
    tracing::info!(api = %api.base(), page_type = %cfg.page_type, filter = %cfg.filter(), "reviewer started");

    let store = FragmentStore::from_config(api.clone(), &cfg);
    let mut driver = StoreDriver::new(store).with_sink(api);

    driver.request_reload();
    settle(&mut driver).await;
    // до первой загрузки max_page неизвестен, поэтому страница идёт вторым запросом
    if page != 0 {
        driver.request_page(page);
        settle(&mut driver).await;
    }
    print!("{}", render_page(driver.store(), style));
    if once {
        return Ok(());
    }

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("review> ");
        std::io::stdout().flush().ok();
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let cmd = match parse_command(line) {
            Ok(c) => c,
            Err(e) => {
                println!("parse error: {e}");
                continue;
            }
        };

        match cmd {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::GoTo(n) => {
                driver.request_page(n);
            }
            Command::First => {
                driver.request_page(0);
            }
            Command::Last => {
                let last = driver.store().pagination().max_page;
                driver.request_page(i64::try_from(last).unwrap_or(i64::MAX));
            }
            Command::SkipLeft => {
                driver.request_skip_left();
            }
            Command::SkipRight => {
                driver.request_skip_right();
            }
            Command::Reload => {
                driver.request_reload();
            }
            Command::SetStatus(status) => {
                let limit = driver.store().filter().limit;
                driver.request_filter(status, limit);
            }
            Command::SetLimit(limit) => {
                let status = driver.store().filter().status;
                driver.request_filter(status, limit);
            }
            Command::Mark(verdict, id) => match driver.verdict(&id, verdict).await {
                Ok(report) => {
                    let sent = if report.persisted { "sent" } else { "local only" };
                    match report.removed {
                        Some(f) => println!("#{} -> {verdict} ({sent})", f.id),
                        None => println!("#{id} -> {verdict} ({sent})"),
                    }
                    continue;
                }
                Err(e) => {
                    println!("mark failed: {e}");
                    continue;
                }
            },
        }

        settle(&mut driver).await;
        print!("{}", render_page(driver.store(), style));
    }

    Ok(())
}

async fn settle(driver: &mut StoreDriver) {
    if let Some(Err(e)) = driver.settle().await {
        println!("load failed: {e}");
    }
}
