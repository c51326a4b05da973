//! Runtime configuration: env files, environment variables, OS keychain.
//!
//! Three external settings drive the app: the Gemini key (required for
//! analysis), and the Supabase URL + anon key (optional, persistence only).
//!
//! Key resolution order:
//! 1. `GEMINI_API_KEY`, then `API_KEY` from the environment
//! 2. OS keychain entry `insulator-inspector` / `gemini`

use crate::llm::{CredentialSource, InferenceConfig};
use crate::store::StoreConfig;
use std::path::{Path, PathBuf};

pub const KEYCHAIN_SERVICE: &str = "insulator-inspector";
pub const KEYCHAIN_ACCOUNT: &str = "gemini";

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// All settings the inspector needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub inference: InferenceConfig,
    pub store: StoreConfig,
}

impl Settings {
    /// Resolve from the process environment and the OS keychain.
    pub fn from_env() -> Self {
        Self::resolve(|name| std::env::var(name).ok(), keychain_api_key)
    }

    /// Resolve from arbitrary lookups. Empty values count as absent.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        keychain: impl Fn() -> Option<String>,
    ) -> Self {
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let (api_key, source) = match API_KEY_VARS.iter().find_map(|name| var(*name)) {
            Some(key) => (Some(key), CredentialSource::Environment),
            None => match keychain().filter(|k| !k.is_empty()) {
                Some(key) => {
                    log::info!("[CONFIG] Loaded Gemini key from OS keychain");
                    (Some(key), CredentialSource::Keychain)
                }
                None => {
                    log::error!(
                        "[CONFIG] Missing GEMINI_API_KEY — analysis will fail until one is configured"
                    );
                    (None, CredentialSource::Missing)
                }
            },
        };

        let mut inference = InferenceConfig::new(api_key, source);
        if let Some(model) = var("GEMINI_MODEL") {
            inference = inference.with_model(model);
        }
        if let Some(base) = var("GEMINI_API_BASE") {
            inference = inference.with_api_base(base);
        }

        let store = StoreConfig::new(var("SUPABASE_URL"), var("SUPABASE_ANON_KEY"));

        Self { inference, store }
    }
}

/// Load the first env file found. Existing variables are not overridden.
///
/// Search order: `.env.local` then `.env`, in the working directory first,
/// then in `~/.config/insulator-inspector/`.
pub fn load_env_files() -> Option<PathBuf> {
    let mut dirs_to_search = vec![PathBuf::from(".")];
    if let Some(config_dir) = dirs::config_dir() {
        dirs_to_search.push(config_dir.join(KEYCHAIN_SERVICE));
    }

    for dir in dirs_to_search {
        if let Some(path) = load_env_file_in(&dir) {
            return Some(path);
        }
    }
    None
}

fn load_env_file_in(dir: &Path) -> Option<PathBuf> {
    for env_file in [".env.local", ".env"] {
        let path = dir.join(env_file);
        if !path.exists() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => {
                eprintln!("[STARTUP] Loaded {}", path.display());
                return Some(path);
            }
            Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
        }
    }
    None
}

fn keychain_api_key() -> Option<String> {
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT).ok()?;
    entry.get_password().ok()
}

/// Save the Gemini key to the OS keychain.
pub fn save_api_key(api_key: &str) -> Result<(), String> {
    if api_key.trim().is_empty() {
        return Err("API key is empty".to_string());
    }
    let entry = keyring::Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_ACCOUNT)
        .map_err(|e| format!("Keyring error: {}", e))?;
    entry
        .set_password(api_key.trim())
        .map_err(|e| format!("Failed to save key: {}", e))?;
    log::info!("[CONFIG] Gemini key saved to OS keychain");
    Ok(())
}
