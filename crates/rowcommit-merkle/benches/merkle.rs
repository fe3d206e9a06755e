use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use rowcommit_core::Digest;
use rowcommit_crypto::sha256;
use rowcommit_merkle::{verify_proof, MerkleTree};

#[inline]
fn det_leaves(n: usize, seed: u64) -> Vec<Digest> {
    (0..n)
        .map(|i| sha256(&(seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)).to_le_bytes()))
        .collect()
}

fn bench_merkle(c: &mut Criterion) {
    let mut group = c.benchmark_group("merkle_sha256");
    // Default CLI batch size, plus a larger and an odd-shaped batch.
    for &n in &[1024usize, 1 << 14, 5_000] {
        group.throughput(Throughput::Elements(n as u64));
        let leaves = det_leaves(n, 2024);

        group.bench_function(BenchmarkId::new("from_leaves", n), |b| {
            b.iter_batched(
                || leaves.clone(),
                |l| black_box(MerkleTree::from_leaves(black_box(&l))),
                BatchSize::LargeInput,
            )
        });

        let Ok(tree) = MerkleTree::from_leaves(&leaves) else {
            continue;
        };
        group.bench_function(BenchmarkId::new("all_proofs", n), |b| {
            b.iter(|| black_box(tree.all_proofs()))
        });

        let root = tree.root();
        let proofs = tree.all_proofs();
        group.bench_function(BenchmarkId::new("verify_every_leaf", n), |b| {
            b.iter(|| {
                let ok = leaves
                    .iter()
                    .zip(&proofs)
                    .all(|(leaf, p)| verify_proof(black_box(leaf), p, &root));
                black_box(ok)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_merkle);
criterion_main!(benches);
