use objstore_bridge::{ObjectStorage, Registry, Result, StorageConfig};
use tracing_subscriber::EnvFilter;

// A backend added by the host program next to the built-in ones.
fn mirror(endpoint: &str, ak: &str, sk: &str, token: &str) -> Result<Box<dyn ObjectStorage>> {
    objstore_bridge::backends::generic::construct(endpoint, ak, sk, token)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("objstore_bridge=debug"))
        .init();

    let mut registry = Registry::with_builtin()?;
    registry.register("mirror", mirror)?;

    let config = match StorageConfig::from_env() {
        Ok(config) => config,
        Err(_) => StorageConfig::from_json(
            r#"{"backend":"labstore","endpoint":"localhost:8443","secret_key":"dev-token","storage_class":"warm"}"#,
        )?,
    };
    println!("Using {:?}", config);

    let storage = registry.open(&config)?;
    println!("Opened {}", storage.describe());

    storage.put("demos/config.txt", &mut &b"configured"[..]).await?;
    println!("Put demos/config.txt");

    Ok(())
}
