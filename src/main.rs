use tracing::{error, info};

use pixelgate::upload::SettingsStorageConfig;
use pixelgate::{
    Config, Database, FileRepository, FolderRepository, SettingsRepository, UploadGate,
};

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = pixelgate::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        let _ = pixelgate::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let db = match Database::open(&config.database.path).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let settings = SettingsRepository::new(db.pool());
    let gate = UploadGate::from_config(
        &config,
        settings,
        FolderRepository::new(db.pool()),
        FileRepository::new(db.pool()),
        SettingsStorageConfig::new(
            settings,
            config.storage.settings_group.clone(),
            config.storage.fallback(),
        ),
    );

    let policy = gate.policy().await;
    info!("pixelgate ready, database at {}", config.database.path);
    info!(
        "Effective upload policy: max file {}, max batch {}, daily limit {:?}, custom formats: {}",
        pixelgate::upload::format_megabytes(policy.max_file_size_bytes),
        pixelgate::upload::format_megabytes(policy.max_batch_size_bytes),
        policy.daily_upload_limit,
        policy.allowed_extensions.is_configured()
    );
}
