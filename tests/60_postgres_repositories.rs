use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use chrono::{SubsecRound, Utc};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use gift_certificates::database::models::{GiftCertificate, NewGiftCertificate, Tag};
use gift_certificates::database::{
    DatabaseError, DatabaseManager, GiftCertificateRepository, PgGiftCertificateRepository, PgTagRepository,
    TagRepository,
};
use gift_certificates::filter::{CertificateFilter, Filter, SortDirection, SortField, SortKey};
use gift_certificates::services::{GiftCertificateService, SearchParams};

// These tests run against the database named by DATABASE_URL and are skipped
// when it is unset. Every row they write carries a per-test marker so runs can
// share a database.

async fn connect() -> Result<Option<PgPool>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping Postgres repository test");
        return Ok(None);
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .context("failed to connect to DATABASE_URL")?;
    DatabaseManager::run_migrations(&pool).await?;
    Ok(Some(pool))
}

fn marker(label: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or_default();
    format!("{}{}", label, nanos % 1_000_000_000)
}

fn certificate(name: &str, description: &str) -> NewGiftCertificate {
    let now = Utc::now().trunc_subsecs(3);
    NewGiftCertificate {
        name: name.to_string(),
        description: description.to_string(),
        price: Decimal::new(2550, 2),
        duration: 30,
        create_date: now,
        last_update_date: now,
    }
}

fn marked(description: &str) -> Filter {
    Filter::new(CertificateFilter {
        description: Some(description.to_string()),
        ..Default::default()
    })
    .order(vec![SortKey::new(SortField::Name, SortDirection::Asc)])
}

fn names(rows: &[GiftCertificate]) -> Vec<&str> {
    rows.iter().map(|c| c.name.as_str()).collect()
}

fn tag_names(tags: &[Tag]) -> Vec<&str> {
    tags.iter().map(|t| t.name.as_str()).collect()
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn like_wildcards_in_search_match_literally() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let repo = PgGiftCertificateRepository::new(pool);
    let m = marker("esc");

    for name in ["100% off", "1000 off", "a_b deal", "axb deal", "c\\d deal", "cd deal"] {
        repo.create(certificate(name, &m), &[]).await?;
    }

    for (needle, expected) in [("0%", "100% off"), ("a_b", "a_b deal"), ("c\\d", "c\\d deal")] {
        let filter = Filter::new(CertificateFilter {
            name: Some(needle.to_string()),
            description: Some(m.clone()),
            ..Default::default()
        });
        let rows = repo.filter(&filter).await?;
        assert_eq!(names(&rows), vec![expected], "search for {needle:?}");
        assert_eq!(repo.count(filter.criteria()).await?, 1);
    }

    Ok(())
}

#[tokio::test]
async fn search_is_case_insensitive_and_requires_every_tag() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let tags = PgTagRepository::new(pool.clone());
    let repo = PgGiftCertificateRepository::new(pool);
    let m = marker("tag");

    let travel = format!("travel{}", m);
    let winter = format!("winter{}", m);
    repo.create(certificate("beach", &m), &[travel.clone()]).await?;
    repo.create(certificate("alps", &m), &[travel.clone(), winter.clone()]).await?;

    let filter = Filter::new(CertificateFilter {
        tag_names: vec![format!("TRAVEL{}", m)],
        ..Default::default()
    })
    .order(vec![SortKey::new(SortField::Name, SortDirection::Asc)]);
    assert_eq!(names(&repo.filter(&filter).await?), vec!["alps", "beach"]);

    let both = Filter::new(CertificateFilter {
        tag_names: vec![travel, winter],
        ..Default::default()
    });
    assert_eq!(names(&repo.filter(&both).await?), vec!["alps"]);
    assert_eq!(repo.count(both.criteria()).await?, 1);

    Ok(())
}

#[tokio::test]
async fn service_pages_through_postgres_results() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let repo = Arc::new(PgGiftCertificateRepository::new(pool.clone()));
    let service = GiftCertificateService::new(repo.clone(), Arc::new(PgTagRepository::new(pool)));
    let m = marker("page");

    for name in ["delta", "alpha", "charlie", "bravo", "echo"] {
        repo.create(certificate(name, &m), &[]).await?;
    }

    let query = format!("description={}&sort=name.desc&page=2&pageSize=2", m);
    let page = service.filter(SearchParams::from_query(Some(&query))).await?;
    let got: Vec<&str> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(got, vec!["charlie", "bravo"]);
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);

    Ok(())
}

#[tokio::test]
async fn tag_links_are_batched_replaced_and_cascaded() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let tags = PgTagRepository::new(pool.clone());
    let repo = PgGiftCertificateRepository::new(pool);
    let m = marker("link");
    let (a, b, c) = (format!("a{}", m), format!("b{}", m), format!("c{}", m));

    // Existing tags are reused, missing ones created
    let existing = tags.create(&b).await?;
    let first = repo.create(certificate("first", &m), &owned(&[b.as_str(), a.as_str()])).await?;
    let second = repo.create(certificate("second", &m), &owned(&[c.as_str()])).await?;
    assert_eq!(tags.find_by_name(&b).await?, Some(existing.clone()));

    let batch = tags.find_by_certificate_ids(&[first.id, second.id]).await?;
    assert_eq!(tag_names(&batch[&first.id]), vec![b.as_str(), a.as_str()]);
    assert_eq!(tag_names(&batch[&second.id]), vec![c.as_str()]);

    // Replace, then leave untouched, then clear
    let mut updated = first.clone();
    updated.name = "first renamed".to_string();
    assert!(repo.update(&updated, Some(owned(&[c.as_str()]).as_slice())).await?);
    assert_eq!(tag_names(&tags.find_by_certificate_id(first.id).await?), vec![c.as_str()]);
    assert!(repo.update(&updated, None).await?);
    assert_eq!(tag_names(&tags.find_by_certificate_id(first.id).await?), vec![c.as_str()]);
    assert!(repo.update(&updated, Some(&[] as &[String])).await?);
    assert!(tags.find_by_certificate_id(first.id).await?.is_empty());

    // Deleting a tag drops its links but keeps the certificate
    let c_tag = tags.find_by_name(&c).await?.context("tag c missing")?;
    assert!(tags.delete(c_tag.id).await?);
    assert!(tags.find_by_certificate_id(second.id).await?.is_empty());
    assert!(repo.find_by_id(second.id).await?.is_some());

    // Linking twice is a no-op; deleting a certificate keeps its tags
    repo.add_tag(second.id, &a).await?;
    repo.add_tag(second.id, &a).await?;
    assert_eq!(tag_names(&tags.find_by_certificate_id(second.id).await?), vec![a.as_str()]);
    let a_tag = tags.find_by_name(&a).await?.context("tag a missing")?;
    assert!(repo.delete(second.id).await?);
    assert!(tags.find_by_id(a_tag.id).await?.is_some());
    assert!(!repo.remove_tag(second.id, a_tag.id).await?);

    Ok(())
}

#[tokio::test]
async fn failed_link_leaves_no_new_tags() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let tags = PgTagRepository::new(pool.clone());
    let repo = PgGiftCertificateRepository::new(pool);
    let m = marker("orph");

    // The tag insert succeeds, then the link violates the certificate foreign key
    assert!(repo.add_tag(i64::MAX, &m).await.is_err());
    assert!(tags.find_by_name(&m).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn update_of_missing_row_reports_false() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let tags = PgTagRepository::new(pool.clone());
    let repo = PgGiftCertificateRepository::new(pool);
    let m = marker("gone");

    let created = repo.create(certificate("gone", &m), &[]).await?;
    assert!(repo.delete(created.id).await?);

    assert!(!repo.update(&created, Some(owned(&[m.as_str()]).as_slice())).await?);
    assert!(repo.find_by_id(created.id).await?.is_none());
    assert!(repo.filter(&marked(&m)).await?.is_empty());
    // Rolled back with the update
    assert!(tags.find_by_name(&m).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn duplicate_tag_name_is_unique_violation() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let tags = PgTagRepository::new(pool);
    let m = marker("dup");

    let tag = tags.create(&m).await?;
    let err = tags.create(&m).await.unwrap_err();
    assert!(matches!(err, DatabaseError::UniqueViolation(_)), "unexpected error: {err:?}");
    assert_eq!(tags.find_by_name(&m).await?, Some(tag));

    Ok(())
}

#[tokio::test]
async fn stored_fields_round_trip() -> Result<()> {
    let Some(pool) = connect().await? else { return Ok(()) };
    let repo = PgGiftCertificateRepository::new(pool);
    let m = marker("rt");

    let new = certificate("kept", &m);
    let created = repo.create(new.clone(), &[]).await?;
    assert_eq!(created, new.into_certificate(created.id));
    assert_eq!(repo.find_by_id(created.id).await?, Some(created));

    Ok(())
}
