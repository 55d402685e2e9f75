mod args;
mod paths;
mod render;

use std::fs;
use std::fs::File;
use std::sync::Arc;

use clap::Parser;
use log::info;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use casegrid_lib::Error;
use casegrid_lib::GridClient;
use casegrid_lib::auth::StaticTokenProvider;
use casegrid_lib::bulk::BulkOutcome;
use casegrid_lib::error::FetchError;
use casegrid_lib::grid::FrameStatus;
use casegrid_lib::grid::Grid;
use casegrid_lib::grid::GridConfig;
use casegrid_lib::model::TestCase;
use casegrid_lib::window::ScrollRequest;

use args::Args;
use args::Command;
use args::ListArgs;

const COLLECTION: &str = "testcases";

fn init_logging(verbose: bool) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    let Ok(file) = File::create(&path) else { return };
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let _ = WriteLogger::init(level, Config::default(), file);
}

fn build_grid(client: &GridClient, project: i64, list: &ListArgs) -> Result<Grid<TestCase>, Error> {
    let config = GridConfig::new().with_page_size(list.size);
    let viewport = list
        .viewport
        .unwrap_or(u64::from(list.size) * u64::from(config.row_height));
    let config = config.with_viewport_height(viewport);

    let mut builder = Grid::builder(format!("projects/{}", project))
        .source(Arc::new(client.resource::<TestCase>(COLLECTION)))
        .columns(TestCase::default_columns())
        .config(config)
        .page(list.page);
    for key in &list.sort {
        builder = builder.sort(key.column.clone(), key.direction);
    }
    for (column, value) in &list.filter {
        builder = builder.filter(column.clone(), value.clone());
    }
    if let Some(term) = &list.search {
        builder = builder.search(term.clone());
    }
    Ok(builder.build()?)
}

async fn print_page(grid: &mut Grid<TestCase>, scroll: u64) -> Result<(), Error> {
    grid.settle().await;
    if scroll > 0 {
        grid.scroll(ScrollRequest::ToOffset(scroll));
    }
    let frame = grid.frame();
    if let FrameStatus::Error { message, status, .. } = &frame.status {
        return Err(FetchError::new(*status, message.clone()).into());
    }
    print!("{}", render::frame(&frame));
    Ok(())
}

async fn run(args: Args) -> Result<(), Error> {
    let mut client = GridClient::builder().url(args.url);
    if let Some(token) = args.token {
        client = client.token_provider(StaticTokenProvider::new(token));
    }
    let client = client.build()?;

    match args.command {
        Command::List(list) => {
            let mut grid = build_grid(&client, args.project, &list)?;
            print_page(&mut grid, list.scroll).await
        }
        Command::Bulk { action, ids, list } => {
            let mut grid = build_grid(&client, args.project, &list)?;
            for id in ids {
                grid.toggle_row(id);
            }
            match grid.apply_bulk(action).await? {
                BulkOutcome::Skipped => println!("Nothing selected."),
                BulkOutcome::Applied { updated_count, .. } => {
                    info!("{:?} applied to {} test cases", action, updated_count);
                    println!("Updated {} test cases.", updated_count);
                }
            }
            print_page(&mut grid, list.scroll).await
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
