mod backend;
mod config;
mod error;
mod tui;

use backend::dispatcher::{FetchDispatcher, FetchOutcome};
use backend::export::{Exporter, PageLayout};
use backend::model::Filter;
use backend::source::sqlite::demo_columns;
use backend::source::{DataSource, HttpSource, SqliteSource};
use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use config::TableConfig;
use error::TableError;
use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind};
use futures::{FutureExt, StreamExt};
use ratatui::{DefaultTerminal, Frame};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tui::table::update::Transition;
use tui::table::view_table_row::CellFormat;
use tui::table::themed_table::TableColors;
use tui::table::{
    Effect, KeyOutcome, StatusLine, TableAction, TableListener, TableModel, TableUi, TableView,
    handle_key, update,
};

const DEMO_ROWS: usize = 137;

/// Paged, sortable table over a remote (or SQLite) data source.
#[derive(Debug, Parser)]
#[command(name = "remote-table", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Prefix for every fetch url
    #[arg(long)]
    base_url: Option<String>,

    /// Path appended to the base url, e.g. /customers
    #[arg(long)]
    url: Option<String>,

    /// Read rows from a SQLite database instead of HTTP
    #[arg(long, value_name = "PATH")]
    sqlite: Option<PathBuf>,

    /// Serve a generated customers table from an in-memory database
    #[arg(long)]
    demo: bool,

    #[arg(long)]
    rows_per_page: Option<usize>,

    /// Where printed tables are written
    #[arg(long, value_name = "DIR")]
    export_dir: Option<PathBuf>,

    /// Write the effective config to the config path and exit
    #[arg(long)]
    write_config: bool,

    /// Equality filter, repeatable
    #[arg(long = "where", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
    filters: Vec<Filter>,
}

fn parse_filter(s: &str) -> std::result::Result<Filter, String> {
    Filter::parse_assignment(s).ok_or_else(|| format!("expected COLUMN=VALUE, got '{s}'"))
}

impl Cli {
    fn apply(&self, config: &mut TableConfig) -> error::Result<()> {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(url) = &self.url {
            config.url = url.clone();
        }
        if let Some(rows) = self.rows_per_page {
            config.rows_per_page = rows;
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = Some(dir.clone());
        }
        config.filters.extend(self.filters.iter().cloned());

        if self.demo || self.sqlite.is_some() {
            if self.base_url.is_none() {
                config.base_url = "sqlite://".to_string();
            }
            if self.demo {
                if config.url.is_empty() {
                    config.url = "/customers".to_string();
                }
                if config.columns == TableConfig::default().columns {
                    config.columns = demo_columns();
                }
            }
            if config.url.trim_matches('/').is_empty() {
                return Err(TableError::Config(
                    "--sqlite needs --url naming the table, e.g. --url /customers".into(),
                ));
            }
        }
        Ok(())
    }

    async fn data_source(&self, config: &TableConfig) -> error::Result<Arc<dyn DataSource>> {
        if self.demo || self.sqlite.is_some() {
            let source = match &self.sqlite {
                Some(path) => SqliteSource::open(path)?,
                None => SqliteSource::in_memory()?,
            };
            if self.demo {
                source.seed_demo(DEMO_ROWS).await?;
            }
            return Ok(Arc::new(source));
        }
        Ok(Arc::new(HttpSource::new(config.request_timeout())?))
    }
}

/// Logs go to a file; the terminal belongs to the UI.
fn init_logging() {
    let dir = config::log_dir();
    let file = fs::create_dir_all(&dir).and_then(|_| {
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("remote-table.log"))
    });

    let mut builder = env_logger::Builder::from_default_env();
    match file {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging();

    let mut config = TableConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config)?;
    config.validate()?;
    if cli.write_config {
        let path = cli
            .config
            .clone()
            .or_else(TableConfig::default_path)
            .ok_or_else(|| eyre!("no config directory on this platform"))?;
        config.save(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }
    let source = cli.data_source(&config).await?;
    log::info!("Starting with {} source", source.name());

    let terminal = ratatui::init();
    let result = App::new(config, source).run(terminal).await;
    ratatui::restore();
    result
}

pub struct App {
    running: bool,
    event_stream: EventStream,
    pub model: TableModel,
    pub ui: TableUi,
    config: TableConfig,
    format: CellFormat,
    colors: TableColors,
    dispatcher: FetchDispatcher,
    fetch_rx: UnboundedReceiver<FetchOutcome>,
    exporter: Exporter,
    export_rx: UnboundedReceiver<error::Result<PathBuf>>,
    listener: Box<dyn TableListener>,
}

impl App {
    pub fn new(config: TableConfig, source: Arc<dyn DataSource>) -> Self {
        let (dispatcher, fetch_rx) = FetchDispatcher::new(source, config.fetch_url());
        log::info!("Fetching rows from {}", dispatcher.url());
        let (export_tx, export_rx) = mpsc::unbounded_channel();
        let exporter = Exporter::new(config.export_dir(), PageLayout::default(), export_tx);
        Self {
            running: false,
            event_stream: EventStream::new(),
            model: TableModel::new(&config),
            ui: TableUi::new(),
            format: CellFormat::from_config(&config),
            colors: TableColors::default().with_text_color(config.text_color.as_deref()),
            config,
            dispatcher,
            fetch_rx,
            exporter,
            export_rx,
            listener: Box::new(StatusLine::default()),
        }
    }

    /// Run the application's main loop.
    pub async fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        self.running = true;
        self.apply(TableAction::Init);
        while self.running {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events().await?;
        }
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let view = TableView {
            model: &self.model,
            format: &self.format,
            colors: &self.colors,
            table_height: self.config.table_height,
            status: self.listener.status(),
        };
        view.render(frame, frame.area(), &mut self.ui);
    }

    /// Waits for a key, a fetch or export completion, or the animation tick.
    async fn handle_events(&mut self) -> Result<()> {
        tokio::select! {
            event = self.event_stream.next().fuse() => {
                if let Some(Ok(Event::Key(key))) = event {
                    if key.kind == KeyEventKind::Press {
                        self.on_key_event(key);
                    }
                }
            }
            Some(outcome) = self.fetch_rx.recv() => {
                self.apply(TableAction::FetchCompleted(outcome));
            }
            Some(result) = self.export_rx.recv() => {
                self.apply(TableAction::ExportCompleted(result));
            }
            _ = tokio::time::sleep(Duration::from_millis(100)) => {
                self.ui.tick = self.ui.tick.wrapping_add(1);
            }
        }
        Ok(())
    }

    fn on_key_event(&mut self, key: KeyEvent) {
        match handle_key(&self.model, &mut self.ui, key) {
            KeyOutcome::Quit => self.running = false,
            KeyOutcome::Action(action) => self.apply(action),
            KeyOutcome::Handled | KeyOutcome::Ignored => {}
        }
    }

    fn apply(&mut self, action: TableAction) {
        let Transition { model, effects } = update(std::mem::take(&mut self.model), action);
        self.model = model;
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Fetch(ticket, request) => {
                self.dispatcher.dispatch(ticket, request);
            }
            Effect::RowSelected(id) => self.listener.on_row_selected(&id),
            Effect::ErrorReceived(err) => self.listener.on_error_received(&err),
            Effect::EditRequested(id) => self.listener.on_edit_requested(&id),
            Effect::Exported(path) => self.listener.on_exported(&path),
            Effect::Export => {
                let view = TableView {
                    model: &self.model,
                    format: &self.format,
                    colors: &self.colors,
                    table_height: self.config.table_height,
                    status: None,
                };
                let started = self
                    .exporter
                    .start(self.ui.table_area, |width| view.render_offscreen(width));
                if let Err(err) = started {
                    self.apply(TableAction::ExportCompleted(Err(err)));
                }
            }
        }
    }
}
