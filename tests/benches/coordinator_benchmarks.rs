//! # Coordinator Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Reconcile 3-16 endorsements | < 50µs |
//! | Build + sign a proposal | < 100µs |
//! | Verify one endorsement | < 100µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use lg_tx_coordinator::domain::{endorsement_message, sign_proposal, verify_endorsement};
use lg_tx_coordinator::{reconcile, CoordinatorConfig, EndorsementPolicy, Principal, ProposalBuilder};
use serde_json::json;
use shared_crypto::Ed25519KeyPair;
use shared_types::{Endorsement, EndorsementResponse, PeerId, ProposalKind, TxId, STATUS_OK};

fn endorsed(tx_id: &TxId, peer: usize, payload: &[u8]) -> EndorsementResponse {
    let keypair = Ed25519KeyPair::generate();
    let message = endorsement_message(tx_id, STATUS_OK, payload);
    EndorsementResponse {
        peer: PeerId(format!("peer{peer}")),
        status: STATUS_OK,
        message: String::new(),
        payload: payload.to_vec(),
        endorsement: Endorsement {
            endorser: keypair.public_key(),
            signature: keypair.sign(&message),
        },
    }
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let tx_id = TxId::new("bench");

    for peers in [3usize, 8, 16] {
        let agreeing: Vec<_> = (0..peers).map(|i| endorsed(&tx_id, i, b"balance=90")).collect();
        let mut divergent = agreeing.clone();
        divergent[peers - 1] = endorsed(&tx_id, peers - 1, b"balance=89");

        group.throughput(Throughput::Elements(peers as u64));
        group.bench_with_input(BenchmarkId::new("agreeing", peers), &agreeing, |b, r| {
            b.iter(|| black_box(reconcile(r, EndorsementPolicy::AllSuccessful)))
        });
        group.bench_with_input(BenchmarkId::new("divergent", peers), &divergent, |b, r| {
            b.iter(|| black_box(reconcile(r, EndorsementPolicy::AtLeast(peers / 2 + 1))))
        });
    }
    group.finish();
}

fn bench_proposal(c: &mut Criterion) {
    let principal = Principal::new("Org1MSP", "admin", Ed25519KeyPair::generate());
    let builder = ProposalBuilder::new(CoordinatorConfig::default());
    let args = json!(["a", "b", "10"]);

    c.bench_function("proposal_build_and_sign", |b| {
        b.iter(|| {
            let proposal = builder.build(ProposalKind::Invoke, &args, &principal);
            black_box(proposal.and_then(|p| sign_proposal(p, &principal)))
        })
    });
}

fn bench_endorsement_verify(c: &mut Criterion) {
    let tx_id = TxId::new("bench");
    let response = endorsed(&tx_id, 0, b"balance=90");

    c.bench_function("endorsement_verify", |b| {
        b.iter(|| black_box(verify_endorsement(&response, &tx_id)))
    });
}

criterion_group!(benches, bench_reconcile, bench_proposal, bench_endorsement_verify);
criterion_main!(benches);
