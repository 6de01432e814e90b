//! Performance benchmarks for search merging and local matching.
//!
//! These benchmarks measure:
//! - Merging candidate lists of different sizes with heavy email overlap
//! - Fuzzy matching a query against local address books
//! - A full concurrent search over in-memory sources

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use crm_sync::client::CrmProvider;
use crm_sync::error::CrmResult;
use crm_sync::matching::ContactMatcher;
use crm_sync::models::{
    CanonicalContact, Credential, LocalContact, ProviderContact, ProviderId,
};
use crm_sync::repositories::{InMemoryContactStore, InMemoryCredentialStore};
use crm_sync::search::{merge_candidates, sort_by_name};
use crm_sync::{ContactSearch, Metrics};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const FIRST_NAMES: [&str; 8] = ["Alice", "Bob", "Carol", "Dan", "Erin", "Frank", "Grace", "Heidi"];
const LAST_NAMES: [&str; 6] = ["Smith", "Jones", "Brown", "Taylor", "Wilson", "Evans"];

fn local_contacts(n: usize) -> Vec<LocalContact> {
    (0..n)
        .map(|i| LocalContact {
            id: i as i64,
            user_id: "user-1".to_string(),
            name: format!(
                "{} {}",
                FIRST_NAMES[i % FIRST_NAMES.len()],
                LAST_NAMES[i % LAST_NAMES.len()]
            ),
            email: Some(format!("person{}@example.com", i)),
            ..Default::default()
        })
        .collect()
}

fn provider_contacts(provider: ProviderId, n: usize) -> Vec<ProviderContact> {
    let (first, last) = match provider {
        ProviderId::Salesforce => ("first_name", "last_name"),
        ProviderId::Hubspot => ("firstname", "lastname"),
    };
    (0..n)
        .map(|i| {
            let mut fields = Map::new();
            fields.insert(first.to_string(), json!(FIRST_NAMES[i % FIRST_NAMES.len()]));
            fields.insert(last.to_string(), json!(LAST_NAMES[i % LAST_NAMES.len()]));
            // Every other record overlaps a local contact
            let email = if i % 2 == 0 {
                format!("PERSON{}@example.com", i)
            } else {
                format!("{}-{}@crm.example.com", provider, i)
            };
            fields.insert("email".to_string(), Value::String(email));
            ProviderContact {
                provider,
                id: format!("{}-{}", provider, i),
                fields,
            }
        })
        .collect()
}

fn candidates(n: usize) -> Vec<CanonicalContact> {
    let mut all: Vec<CanonicalContact> = local_contacts(n)
        .iter()
        .map(CanonicalContact::from_local)
        .collect();
    for provider in ProviderId::ALL {
        all.extend(
            provider_contacts(provider, n)
                .iter()
                .map(CanonicalContact::from_provider),
        );
    }
    all
}

/// Benchmark merging at different candidate counts.
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_candidates");

    for size in [10, 100, 1000] {
        let input = candidates(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| {
                let mut merged = merge_candidates(input.clone());
                sort_by_name(&mut merged);
                merged
            });
        });
    }

    group.finish();
}

/// Benchmark local fuzzy matching.
fn bench_fuzzy_matching(c: &mut Criterion) {
    let matcher = ContactMatcher::new();
    let mut group = c.benchmark_group("fuzzy_matching");

    for size in [100, 1000] {
        let contacts = local_contacts(size);
        group.bench_with_input(BenchmarkId::new("name", size), &contacts, |b, contacts| {
            b.iter(|| matcher.find_matches("alise smith", contacts, 20, 30));
        });
        group.bench_with_input(BenchmarkId::new("email", size), &contacts, |b, contacts| {
            b.iter(|| matcher.find_matches("person42@example.com", contacts, 20, 30));
        });
    }

    group.finish();
}

/// Provider serving a fixed result list with no I/O.
struct StaticProvider {
    id: ProviderId,
    contacts: Vec<ProviderContact>,
}

#[async_trait]
impl CrmProvider for StaticProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn search_contacts(&self, _: &Credential, _: &str) -> CrmResult<Vec<ProviderContact>> {
        Ok(self.contacts.clone())
    }

    async fn get_contact(&self, _: &Credential, _: &str) -> CrmResult<ProviderContact> {
        Ok(self.contacts[0].clone())
    }

    async fn update_contact(
        &self,
        _: &Credential,
        _: &str,
        _: &Map<String, Value>,
    ) -> CrmResult<ProviderContact> {
        Ok(self.contacts[0].clone())
    }
}

fn credential(provider: ProviderId) -> Credential {
    Credential {
        id: format!("{}-cred", provider),
        provider,
        uid: "uid".to_string(),
        token: "token".to_string(),
        refresh_token: None,
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
        user_id: "user-1".to_string(),
        extras: BTreeMap::new(),
    }
}

/// Benchmark the full fan-out / fan-in search path.
fn bench_concurrent_search(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let providers: Vec<Arc<dyn CrmProvider>> = ProviderId::ALL
        .iter()
        .map(|&id| {
            Arc::new(StaticProvider {
                id,
                contacts: provider_contacts(id, 10),
            }) as Arc<dyn CrmProvider>
        })
        .collect();
    let search = ContactSearch::new(
        Arc::new(InMemoryContactStore::new(local_contacts(500))),
        Arc::new(InMemoryCredentialStore::with_credentials(
            ProviderId::ALL.iter().map(|&p| credential(p)).collect(),
        )),
        providers,
        Duration::from_secs(5),
        Metrics::new(),
    );

    c.bench_function("concurrent_search", |b| {
        b.to_async(&rt).iter(|| search.search("user-1", "smith"));
    });
}

criterion_group!(
    benches,
    bench_merge,
    bench_fuzzy_matching,
    bench_concurrent_search
);
criterion_main!(benches);
