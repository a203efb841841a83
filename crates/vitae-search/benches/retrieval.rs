use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use vitae_search::{Document, HashingEmbedder, HybridIndex, RelevanceScorer, ScoreMapping, VitaeConfig};

const SKILLS: &[&str] = &[
    "rust", "python", "java", "kubernetes", "terraform", "react", "typescript", "postgresql",
    "kafka", "pytorch", "pandas", "swift", "kotlin", "figma", "security", "firmware",
];
const ROLES: &[&str] = &[
    "engineer", "developer", "scientist", "designer", "administrator", "manager",
];
const TIERS: &[(&str, usize)] = &[("small", 100), ("medium", 1_000), ("large", 5_000)];

const QUERY: &str = "senior rust engineer with kubernetes and postgresql experience";

/// Deterministic synthetic resumes: every document mixes a role with a
/// rotating window of skills.
fn synthetic_resumes(count: usize) -> Vec<Document> {
    (0..count)
        .map(|i| {
            let role = ROLES[i % ROLES.len()];
            let skills: Vec<&str> = (0..6)
                .map(|j| SKILLS[(i * 7 + j * 3) % SKILLS.len()])
                .collect();
            Document::new(
                format!("resume-{i:05}.txt"),
                format!(
                    "{role} with {years} years of experience in {}",
                    skills.join(" "),
                    years = i % 15 + 1
                ),
            )
        })
        .collect()
}

fn build(docs: Vec<Document>) -> HybridIndex {
    HybridIndex::build(docs, Arc::new(HashingEmbedder::default()), &VitaeConfig::default()).index
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieval.build");
    group.sample_size(10);

    for &(name, count) in TIERS {
        let docs = synthetic_resumes(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &docs, |b, docs| {
            b.iter(|| black_box(build(docs.clone())));
        });
    }

    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieval.query");

    for &(name, count) in TIERS {
        let index = build(synthetic_resumes(count));
        let scorer = RelevanceScorer::new(Arc::clone(index.embedder()), ScoreMapping::Raw);

        group.bench_with_input(BenchmarkId::new("retrieve", name), &index, |b, index| {
            b.iter(|| black_box(index.retrieve(QUERY, 10, 0.5)));
        });

        group.bench_with_input(BenchmarkId::new("lexical", name), &index, |b, index| {
            b.iter(|| black_box(index.lexical().search(QUERY, 20)));
        });

        group.bench_with_input(BenchmarkId::new("dense", name), &index, |b, index| {
            b.iter(|| black_box(index.dense().search(QUERY, 20)));
        });

        if let Ok(fused) = index.retrieve(QUERY, 10, 0.5) {
            group.bench_with_input(BenchmarkId::new("rerank", name), &fused, |b, fused| {
                b.iter(|| black_box(scorer.rank(fused.clone(), QUERY)));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_retrieve);
criterion_main!(benches);
