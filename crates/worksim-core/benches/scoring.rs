use criterion::{black_box, criterion_group, criterion_main, Criterion};

use worksim_core::aggregate::{aggregate, SeededJitter};
use worksim_core::model::{Answer, Difficulty, Submission, Task, TaskType};
use worksim_core::scoring::score;

fn make_task(task_type: TaskType) -> Task {
    Task {
        id: "bench".into(),
        category_id: "bench".into(),
        task_type,
        title: "Bench".into(),
        description: String::new(),
        instructions: vec![],
        time_limit_minutes: 30,
        max_score: 100,
        criteria: vec![],
        difficulty: Difficulty::Intermediate,
    }
}

fn bench_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("score");
    let coding = make_task(TaskType::Coding);

    group.bench_function("short", |b| {
        b.iter(|| score(black_box("fn main() {}"), black_box(&coding)))
    });

    let medium = format!(
        "The function handles each edge case.\n\n- tests cover errors\n- complexity is O(n)\n\n```rust\n{}\n```",
        "let x = 1;\n".repeat(40)
    );
    group.bench_function("medium", |b| {
        b.iter(|| score(black_box(&medium), black_box(&coding)))
    });

    let long = "performance refactor algorithm ".repeat(2_000);
    group.bench_function("long", |b| {
        b.iter(|| score(black_box(&long), black_box(&coding)))
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let submissions: Vec<Submission> = (0..20u8)
        .map(|i| Submission {
            task_id: format!("t{i}"),
            answer: Answer::text("x"),
            time_spent_secs: 60,
            score: i * 5,
            skipped: false,
            auto_submitted: false,
            submitted_at: chrono::Utc::now(),
        })
        .collect();

    c.bench_function("aggregate/20", |b| {
        b.iter(|| {
            let mut jitter = SeededJitter::new(42);
            aggregate(black_box(&submissions), black_box(25), &mut jitter)
        })
    });
}

criterion_group!(benches, bench_score, bench_aggregate);
criterion_main!(benches);
