mod app;
mod audio;
mod commands;
mod config;
mod history;
mod logging;
mod recording;
mod ui;
mod upload;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    app::run().await
}
