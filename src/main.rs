use clap::Parser;
use upsview::{init_logging, load_asset, render_snapshot, Cli, StyleConfig, BUILD_DATE, VERSION};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging()?;
    tracing::info!(version = VERSION, build_date = BUILD_DATE, "Starting upsview");

    let style = match &cli.config {
        Some(path) => StyleConfig::load_from_file(path)?,
        None => StyleConfig::load_or_default()?,
    };
    let asset = load_asset(&cli.asset)?;
    let asset_id = cli.asset_id();
    let output = cli.output_path();

    // Views are single-threaded; only image decoding leaves this thread.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let stage = runtime.block_on(render_snapshot(&asset_id, asset, style, &output))?;

    if let Some(snapshot) = stage.wiring(&asset_id) {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    }
    tracing::info!(output = %output.display(), "Snapshot written");
    Ok(())
}
