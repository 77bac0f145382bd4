use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "المفسر".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("almofasir.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = format!(
        r#"[site]
title = "{}"
url = "http://localhost:3000"
language = "ar"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/almofasir.db"

[slug]
max_length = 60
max_tokens = 6
fallback_prefix = "تفسير-حلم"
max_attempts = 100

[api]
default_page_size = 20
max_page_size = 100
"#,
        site_name
    );

    std::fs::write(&config_path, config)?;

    tracing::info!("Created new Almofasir site at {:?}", path);
    tracing::info!("Run 'almofasir migrate' to set up the database");
    tracing::info!("Run 'almofasir serve' to start the API");

    Ok(())
}
