//! Daily quota windows over stored upload records.

mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;

use pixelgate::file::NewFileRecord;
use pixelgate::upload::{QuotaEnforcer, KEY_DAILY_UPLOAD_LIMIT};
use pixelgate::{Config, FileRepository, PolicyResolver, SettingsRepository};

use common::setup_db;

async fn record_at(files: &FileRepository<'_>, user_id: i64, at: DateTime<Utc>) {
    files
        .create(&NewFileRecord::new(user_id, "a.png", 1).with_created_at(at))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_yesterdays_uploads_do_not_count() {
    let db = setup_db().await;
    let settings = SettingsRepository::new(db.pool());
    let files = FileRepository::new(db.pool());
    settings
        .set("upload", KEY_DAILY_UPLOAD_LIMIT, &json!(2))
        .await
        .unwrap();

    let midnight = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    record_at(&files, 1, midnight - Duration::seconds(1)).await;
    record_at(&files, 1, midnight - Duration::hours(3)).await;
    record_at(&files, 1, midnight).await;

    let resolver = PolicyResolver::new(settings);
    let quota = QuotaEnforcer::new(&resolver, &files, "upload", chrono_tz::Tz::UTC);

    // Just before midnight: two uploads already today.
    let late = midnight - Duration::milliseconds(500);
    assert!(quota.would_exceed_daily_limit_at(1, 1, late).await.unwrap());

    // Just after midnight: only the upload at 00:00:00 counts.
    let early = midnight + Duration::seconds(5);
    assert!(!quota.would_exceed_daily_limit_at(1, 1, early).await.unwrap());
    assert!(quota.would_exceed_daily_limit_at(1, 2, early).await.unwrap());
}

#[tokio::test]
async fn test_configured_timezone_moves_the_boundary() {
    let db = setup_db().await;
    let settings = SettingsRepository::new(db.pool());
    let files = FileRepository::new(db.pool());

    let config = Config::parse(
        r#"
[upload]
default_daily_upload_limit = 1
timezone = "Asia/Tokyo"
"#,
    )
    .unwrap();
    config.validate().unwrap();

    // 14:30 UTC on Jan 15 is 23:30 in Tokyo; 15:30 UTC is already Jan 16 there.
    record_at(&files, 1, Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()).await;
    let now = Utc.with_ymd_and_hms(2024, 1, 15, 15, 30, 0).unwrap();

    let resolver = PolicyResolver::with_defaults(settings, config.upload.policy_defaults());
    let tokyo = QuotaEnforcer::new(&resolver, &files, "upload", chrono_tz::Asia::Tokyo);
    let utc = QuotaEnforcer::new(&resolver, &files, "upload", chrono_tz::Tz::UTC);

    assert!(!tokyo.would_exceed_daily_limit_at(1, 1, now).await.unwrap());
    assert!(utc.would_exceed_daily_limit_at(1, 1, now).await.unwrap());
}

#[tokio::test]
async fn test_quota_is_per_user() {
    let db = setup_db().await;
    let settings = SettingsRepository::new(db.pool());
    let files = FileRepository::new(db.pool());
    settings
        .set("upload", KEY_DAILY_UPLOAD_LIMIT, &json!(1.0))
        .await
        .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    record_at(&files, 1, now - Duration::hours(1)).await;

    let resolver = PolicyResolver::new(settings);
    let quota = QuotaEnforcer::new(&resolver, &files, "upload", chrono_tz::Tz::UTC);

    assert!(quota.would_exceed_daily_limit_at(1, 1, now).await.unwrap());
    assert!(!quota.would_exceed_daily_limit_at(2, 1, now).await.unwrap());
}
