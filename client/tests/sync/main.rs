mod flows;
mod support;

use support::spawn_app;

#[tokio::test]
async fn catalog_smoke_check() -> anyhow::Result<()> {
    let app = spawn_app();

    let catalog = app.client.load_catalog().await;
    assert!(catalog.error.is_none());
    assert_eq!(catalog.data.map(|c| c.len()), Some(2));

    Ok(())
}
