use crate::core::Config;
use crate::db::LedgerStorage;
use crate::utils::AppError;

/// Shared server state
///
/// Holds the configuration and the ledger storage handle. `LedgerStorage`
/// wraps an `Arc<Database>`, so cloning the state is cheap.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub storage: LedgerStorage,
}

impl ServerState {
    /// Initialize server state: ensure the working directory exists and
    /// open the ledger database.
    pub fn initialize(config: &Config) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            AppError::internal(format!(
                "Failed to create work directory {}: {}",
                config.work_dir, e
            ))
        })?;

        let db_path = config.database_path();
        let storage = LedgerStorage::open(&db_path)
            .map_err(|e| AppError::database(format!("Failed to open ledger database: {}", e)))?;
        tracing::info!(path = %db_path.display(), "Ledger database opened");

        Ok(Self {
            config: config.clone(),
            storage,
        })
    }

    /// State over an in-memory database (tests)
    pub fn in_memory(config: Config) -> Result<Self, AppError> {
        let storage = LedgerStorage::open_in_memory()
            .map_err(|e| AppError::database(format!("Failed to open in-memory ledger: {}", e)))?;
        Ok(Self { config, storage })
    }
}
