use objstore_bridge::{ByteRange, Registry};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("==> LabStore Example");

    let registry = Registry::with_builtin()?;
    println!("✓ Registered backends: {:?}", registry.names());

    // A bare host is expanded to https://<host>/objects
    let endpoint = std::env::args().nth(1).unwrap_or_else(|| "localhost:8443".to_string());
    let token = std::env::var("LABSTORE_TOKEN").unwrap_or_default();
    let storage = registry.construct("labstore", &endpoint, "", &token, "")?;
    println!("✓ Created {}", storage.describe());

    if let Some(sc) = storage.as_storage_class() {
        sc.set_storage_class("cold");
        println!("✓ Storage class: {}", sc.storage_class());
    }

    let key = "demos/labstore-test.txt";
    storage.put(key, &mut &b"Hello from labstore!"[..]).await?;
    println!("✓ Put object: {}", key);

    let info = storage.head(key).await?;
    println!("✓ Head: {} bytes, etag {:?}", info.size, info.etag);

    let data = storage.get(key, ByteRange::full()).await?;
    println!("✓ Got object: {:?}", String::from_utf8_lossy(&data));

    match storage.list(Default::default()).await {
        Ok(listing) => println!("✓ Listed {} objects", listing.objects.len()),
        Err(e) if e.is_not_supported() => println!("- Listing not supported by this backend"),
        Err(e) => return Err(e.into()),
    }

    storage.delete(key).await?;
    println!("✓ Deleted object: {}", key);

    Ok(())
}
