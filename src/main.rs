use aadhaar_verify::utils::{logger, validation::Validate};
use aadhaar_verify::{start_server, ServerArgs};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();

    logger::init_server_logger(args.verbose, args.log_json);

    tracing::info!("Starting aadhaar-verify server");

    let config = args.load()?;
    if args.verbose {
        tracing::debug!("Server config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    start_server(config).await?;

    Ok(())
}
