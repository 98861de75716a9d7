//! # Matrix Benchmarks
//!
//! Performance benchmarks for skill gap matrix building.
//!
//! Run with: `cargo bench -p genc-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use genc_core::{
    Designation, GencProfile, HeldSkill, ProficiencyLevel, RequirementEntry, build_skill_matrix,
    is_transition_allowed, Status,
};
use std::hint::black_box;

const SKILLS_PER_ROLE: usize = 20;

fn pick<T: Copy>(all: &[T], i: usize) -> T {
    all[i % all.len()]
}

/// Requirements for every role over a fixed skill catalogue.
fn requirements() -> Vec<RequirementEntry> {
    let mut reqs = Vec::new();
    for (r, &role) in Designation::ALL.iter().enumerate() {
        for s in 0..SKILLS_PER_ROLE {
            reqs.push(RequirementEntry {
                role,
                skill_name: format!("skill-{s}"),
                category: None,
                required_proficiency_level: pick(ProficiencyLevel::ALL, r + s),
                is_mandatory: s % 3 != 0,
            });
        }
    }
    reqs
}

/// N GenCs, each holding half the catalogue at varying levels.
fn gencs(count: usize) -> Vec<GencProfile> {
    (0..count)
        .map(|i| GencProfile {
            associate_id: i.to_string(),
            genc_name: format!("GenC {i}"),
            current_designation: pick(Designation::ALL, i),
            skills: (0..SKILLS_PER_ROLE)
                .filter(|s| (s + i) % 2 == 0)
                .map(|s| HeldSkill {
                    skill_name: format!("skill-{s}"),
                    category: None,
                    proficiency_level: pick(ProficiencyLevel::ALL, i + s),
                    date_acquired: None,
                    notes: None,
                })
                .collect(),
        })
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_skill_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("skill_matrix");
    let reqs = requirements();

    for size in [100, 1000, 10000].iter() {
        let population = gencs(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(build_skill_matrix(&population, &reqs)));
        });
    }

    group.finish();
}

fn bench_transition_check(c: &mut Criterion) {
    c.bench_function("transition_check_all_pairs", |b| {
        b.iter(|| {
            let mut allowed = 0usize;
            for &from in Status::ALL {
                for &to in Status::ALL {
                    if is_transition_allowed(black_box(from), black_box(to)) {
                        allowed += 1;
                    }
                }
            }
            allowed
        });
    });
}

criterion_group!(benches, bench_skill_matrix, bench_transition_check);
criterion_main!(benches);
