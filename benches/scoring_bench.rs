use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use preprint_matching::common::{ArticleRecord, Author, CandidateDates, CandidateRecord};
use preprint_matching::matching::{
    author_score, normalize_authors, normalize_text, title_score, MatchConfig, ScoringEngine,
};

fn authors(prefix: &str, count: usize) -> Vec<Author> {
    (0..count)
        .map(|i| Author::new(&format!("{}{}", prefix, i), Some("Maria José")))
        .collect()
}

fn bench_normalization(c: &mut Criterion) {
    let titles = vec![
        "Deep Learning for X: A Survey",
        "Ångström-scale Imaging of Protein–Ligand Complexes",
        "Correction: Effects of Ocean Acidification on Coral Reefs &amp; Fish",
        "Große Sprachmodelle für die Medizin",
    ];

    let mut group = c.benchmark_group("normalization");
    group.throughput(Throughput::Elements(titles.len() as u64));

    group.bench_function("normalize_text", |b| {
        b.iter(|| {
            for title in &titles {
                black_box(normalize_text(title));
            }
        })
    });

    group.finish();
}

fn bench_title_score(c: &mut Criterion) {
    let pairs = vec![
        ("deep learning for x a survey", "deep learning for x"),
        ("graph neural networks for molecule property prediction", "molecular property prediction with graph networks"),
        ("correction effects of ocean acidification", "effects of ocean acidification on coral reefs"),
    ];

    let mut group = c.benchmark_group("title_score");
    group.throughput(Throughput::Elements(pairs.len() as u64));

    group.bench_function("title_score", |b| {
        b.iter(|| {
            for (a, bb) in &pairs {
                black_box(title_score(a, bb));
            }
        })
    });

    group.finish();
}

fn bench_author_score(c: &mut Criterion) {
    let small_a = normalize_authors(&authors("Author", 8));
    let small_c = normalize_authors(&authors("Author", 10));
    let large_a = normalize_authors(&authors("Consortium", 40));
    let large_c = normalize_authors(&authors("Consortium", 50));

    let mut group = c.benchmark_group("author_score");

    group.bench_function("greedy_8x10", |b| {
        b.iter(|| black_box(author_score(&small_a, &small_c, 625)))
    });

    group.bench_function("family_fallback_40x50", |b| {
        b.iter(|| black_box(author_score(&large_a, &large_c, 625)))
    });

    group.finish();
}

fn bench_full_score(c: &mut Criterion) {
    let engine = ScoringEngine::from_config(&MatchConfig::default()).unwrap();
    let article = ArticleRecord {
        doi: Some("10.1000/bench".to_string()),
        title: "Deep Learning for X".to_string(),
        subtitle: Some("A Survey".to_string()),
        year: Some(2021),
        authors: authors("Author", 6),
    };
    let candidates: Vec<CandidateRecord> = (0..25)
        .map(|i| CandidateRecord {
            doi: format!("10.1101/{}", i),
            work_type: "posted-content".to_string(),
            title: format!("Deep Learning for X, variant {}", i),
            dates: CandidateDates {
                created: Some(2020),
                ..Default::default()
            },
            authors: authors("Author", 5 + i % 3),
            ..Default::default()
        })
        .collect();

    let mut group = c.benchmark_group("scoring_engine");
    group.throughput(Throughput::Elements(candidates.len() as u64));

    group.bench_function("score_25_candidates", |b| {
        b.iter(|| {
            let prepared = engine.prepare(&article);
            for candidate in &candidates {
                black_box(engine.score(&prepared, candidate));
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_normalization,
    bench_title_score,
    bench_author_score,
    bench_full_score
);
criterion_main!(benches);
