use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use folder_watcher::{FolderWatcher, LocalDirectory, Page, Snapshot, ViewSettings, WatcherConfig};
use futures::StreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Watch a folder and print the newest media files as a grid.
#[derive(Debug, Parser)]
#[command(name = "folder-watch", version)]
struct Cli {
    /// Folder to watch.
    directory: PathBuf,

    /// JSON file with watcher settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the poll interval in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// Files shown per page.
    #[arg(long, default_value_t = ViewSettings::default().items_per_page)]
    items_per_page: usize,

    /// Grid columns.
    #[arg(long, default_value_t = ViewSettings::default().columns)]
    columns: usize,

    /// Zero-based page to print, newest files first.
    #[arg(long, default_value_t = 0)]
    page: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => WatcherConfig::load(path)
            .await
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => WatcherConfig::default(),
    };
    if let Some(millis) = cli.poll_interval_ms {
        config = config
            .with_poll_interval_ms(millis)
            .with_throttle_window_ms(millis);
    }
    let settings = ViewSettings::new(cli.items_per_page, cli.columns);

    let root = LocalDirectory::open(&cli.directory)
        .await
        .with_context(|| format!("cannot watch {}", cli.directory.display()))?;

    let watcher = FolderWatcher::new(config)?;
    watcher.set_root(Arc::new(root));
    info!("Watching {} (Ctrl-C to stop)", cli.directory.display());

    let mut cursor = PageCursor::new(cli.page);
    let mut snapshots = watcher.snapshots();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            snapshot = snapshots.next() => match snapshot {
                Some(snapshot) => {
                    let page = cursor.page_for(&snapshot);
                    print_page(&snapshot, page, &settings);
                }
                None => break,
            },
        }
    }

    watcher.shutdown();
    Ok(())
}

/// Page shown for each snapshot. Starts at the requested page and returns
/// to the first page whenever another root takes over.
#[derive(Debug)]
struct PageCursor {
    page: usize,
    root: Option<u64>,
}

impl PageCursor {
    fn new(page: usize) -> Self {
        Self { page, root: None }
    }

    fn page_for(&mut self, snapshot: &Snapshot) -> usize {
        let generation = snapshot.generation();
        // Generation 0 is the placeholder published before any root.
        if generation == 0 {
            return self.page;
        }
        if self.root.is_some_and(|root| root != generation) {
            self.page = 0;
        }
        self.root = Some(generation);
        self.page
    }
}

fn print_page(snapshot: &Snapshot, page: usize, settings: &ViewSettings) {
    let page = Page::numbered(snapshot, page, settings);
    println!(
        "── {} files, page {}/{} ──",
        snapshot.len(),
        page.number + 1,
        page.pages.max(1)
    );
    for row in page.rows(settings.clamped_columns()) {
        let cells: Vec<String> = row
            .iter()
            .map(|record| format!("{:<32}", record.relative_path()))
            .collect();
        println!("{}", cells.join(" "));
    }
}
