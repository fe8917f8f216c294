use tracing::Level;

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    #[cfg(debug_assertions)]
    let level = Some(Level::DEBUG);
    #[cfg(not(debug_assertions))]
    let level = Some(Level::INFO);

    let r = clipchart_backend::create(level).await?;
    if let Err(e) = r.launch().await {
        let reason = e.to_string();
        tracing::error!("Error launching server: {}", reason);
        anyhow::bail!("server stopped: {}", reason);
    }

    Ok(())
}
