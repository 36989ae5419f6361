use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use pixgen::{
    logger::{self, LoggerConfig},
    ClientConfig, DownloadSurface, ExportFormat, FileDownloader, FormatConverter, GeneratedImage,
    NoticeBoard, Route, RouteDecision, SessionGate, StaticSession, Studio,
};
use std::{path::PathBuf, sync::Arc};

#[derive(Parser, Debug)]
#[command(name = "pixgen", version, about = "Generate images from prompts and export them locally")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an image from a prompt and download it
    Generate {
        /// Text describing the image
        prompt: String,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Re-encode an existing image (URL, data URL or local file)
    Convert {
        source: String,
        #[command(flatten)]
        export: ExportArgs,
    },
    /// List the supported export formats
    Formats,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// JPEG, PNG, WebP or SVG
    #[arg(short, long)]
    format: Option<ExportFormat>,
    /// Directory the file is saved into
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl ExportArgs {
    fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(format) = self.format {
            config = config.with_format(format);
        }
        if let Some(dir) = &self.out {
            config = config.with_download_dir(dir.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();
    let cli = Cli::parse();

    let mut log_config = LoggerConfig::from_env();
    if cli.verbose {
        log_config = log_config.with_level(LevelFilter::Debug);
    }
    logger::init_with_config(log_config)?;

    if env_loaded {
        log::debug!("✅ .env file loaded");
    }

    match cli.command {
        Command::Generate { prompt, export } => {
            let config = export.apply(ClientConfig::from_env());
            config.validate()?;
            logger::log_config_info(&config);
            generate(&config, &prompt).await
        }
        Command::Convert { source, export } => {
            let config = export.apply(ClientConfig::from_env());
            convert(&config, &source).await
        }
        Command::Formats => {
            for format in ExportFormat::ALL {
                println!(
                    "{:<5} {:<14} {}",
                    format.label(),
                    format.mime_type(),
                    format.filename()
                );
            }
            Ok(())
        }
    }
}

async fn generate(config: &ClientConfig, prompt: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = Arc::new(StaticSession::from_config(config));
    let notices = Arc::new(NoticeBoard::from_config(config));
    let studio = Studio::from_config(config, session.clone(), notices)?;

    if let RouteDecision::Redirect(to) = studio.enter(Route::Generate) {
        return Err(format!("Cannot generate right now, go to {} first", to).into());
    }

    studio.submit(prompt).await?;
    let path = studio.download(config.default_format).await?;

    println!("{}", path.display());
    log::info!("💳 Credits left: {}", session.credit());
    Ok(())
}

async fn convert(config: &ClientConfig, source: &str) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_source(source)?;
    let artifact = FormatConverter::new()
        .convert(&image, config.default_format)
        .await?;
    let path = FileDownloader::new(config.download_dir.clone())
        .save(artifact)
        .await?;

    println!("{}", path.display());
    Ok(())
}

/// URLs are used as-is; anything else is read from disk into a data URL.
fn load_source(source: &str) -> Result<GeneratedImage, Box<dyn std::error::Error>> {
    if ["http://", "https://", "data:"]
        .iter()
        .any(|scheme| source.starts_with(scheme))
    {
        return Ok(GeneratedImage::new(source));
    }

    let bytes = std::fs::read(source)?;
    let mime_type = image::guess_format(&bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    Ok(GeneratedImage::from_bytes(mime_type, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use pixgen::models::ImageLocator;

    #[test]
    fn test_load_source_keeps_urls() {
        let image = load_source("https://cdn.example.com/a.png").unwrap();
        assert_eq!(image.locator(), "https://cdn.example.com/a.png");
        assert!(!image.is_embedded());
    }

    #[test]
    fn test_load_source_reads_files_into_data_url() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 128, 255, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), &png).unwrap();

        let image = load_source(file.path().to_str().unwrap()).unwrap();
        match image.parse().unwrap() {
            ImageLocator::Embedded {
                mime_type,
                base64: true,
                payload,
            } => {
                assert_eq!(mime_type, "image/png");
                assert_eq!(STANDARD.decode(payload).unwrap(), png);
            }
            other => panic!("expected embedded image, got {:?}", other),
        }
    }

    #[test]
    fn test_load_source_missing_file() {
        assert!(load_source("/definitely/not/here.png").is_err());
    }

    #[test]
    fn test_credit_reported_through_session() {
        let config = ClientConfig::new().with_token("tok").with_credit(3);
        let session = Arc::new(StaticSession::from_config(&config));
        assert_eq!(session.credit(), 3);
    }
}
