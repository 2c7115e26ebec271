use hrflow_db::{connect_with_settings, migrations, SeedDataset};

#[tokio::test]
async fn seed_dataset_loads_and_verifies() {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");

    let summary = SeedDataset::load(&pool).await.expect("seed load");
    assert_eq!(summary.organizations, 1);
    assert_eq!(summary.configs, 1);
    assert_eq!(summary.requests, 1);

    let verification = SeedDataset::verify(&pool).await.expect("verify");
    assert!(
        verification.all_present,
        "failed checks: {:?}",
        verification
            .checks
            .iter()
            .filter(|(_, passed)| !passed)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>(),
    );
}

#[tokio::test]
async fn seed_dataset_is_idempotent() {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrations");

    SeedDataset::load(&pool).await.expect("first load");
    SeedDataset::load(&pool).await.expect("second load");

    let verification = SeedDataset::verify(&pool).await.expect("verify");
    assert!(verification.all_present, "re-running the seed must not duplicate rows");
}
