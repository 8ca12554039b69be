use aadhaar_verify::core::scoring::score_document;
use aadhaar_verify::utils::{logger, validation::Validate};
use aadhaar_verify::{DocumentRecord, ScoreArgs};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ScoreArgs::parse();

    let Some(image_path) = args.image_path.as_deref() else {
        eprintln!("{}", ScoreArgs::USAGE);
        std::process::exit(1);
    };

    logger::init_cli_logger(args.verbose);

    let settings = args.decoder_settings()?;
    if let Err(e) = settings.validate() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let abs_path = std::path::absolute(image_path)?;
    println!("Analyzing Aadhaar document at: {}", abs_path.display());
    if let Some(name) = &args.expected_name {
        println!("Expected User Name: \"{}\"", name);
    }

    let decoder = settings.build();
    let record = match decoder.decode(&abs_path).await {
        Ok(result) => result.to_record(),
        Err(e) => {
            // 解碼失敗仍要完成分類，以空記錄計分
            tracing::warn!("Decoding failed, scoring an empty record: {}", e);
            DocumentRecord::default()
        }
    };

    if args.verbose {
        for (field, value) in &record.fields {
            tracing::debug!("{}: {}", field, value.trim());
        }
    }

    let score = score_document(&record, args.expected_name.as_deref());

    println!("\nFinal Result:");
    println!("Score: {}  {}", score, score.classification());

    Ok(())
}
