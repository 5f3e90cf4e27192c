//! Criterion benchmarks for node pool assembly
//!
//! Settings are re-read and re-validated on every access, so these measure
//! the cost of that against the number of configured user zones.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use ummati_common::config::MemoryStore;
use ummati_common::settings::{keys, sample_store, NodePoolRole, Settings, StackSettings};
use ummati_infra::resource::node_pool::build_node_pool_specs;
use ummati_infra::resource::NodePoolTarget;
use ummati_infra::{AzureKubernetesStack, Output, PreviewProvisioner};

// =============================================================================
// Fixtures
// =============================================================================

fn settings_with_user_zones(n: usize) -> StackSettings<MemoryStore> {
    let zones: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
    StackSettings::new(
        sample_store().with_list(NodePoolRole::User.key(keys::node_pool::AVAILABILITY_ZONES), zones),
    )
}

fn target() -> NodePoolTarget {
    NodePoolTarget {
        location: "northeurope".to_string(),
        resource_group_name: Output::known("ummati-northeurope-bench".to_string()),
        vnet_subnet_id: Output::known("/vnet/subnets/kubernetes".to_string()),
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_build_node_pool_specs(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_node_pool_specs");
    for zones in [0, 3, 12] {
        let settings = settings_with_user_zones(zones);
        let target = target();
        group.throughput(Throughput::Elements(zones as u64 + 1));
        group.bench_with_input(BenchmarkId::from_parameter(zones), &zones, |b, _| {
            b.iter(|| {
                // Fresh provisioner per run: logical names must stay unique
                let provisioner = PreviewProvisioner::default();
                black_box(build_node_pool_specs(&settings, &target, &provisioner).unwrap())
            })
        });
    }
    group.finish();
}

fn bench_validate_all(c: &mut Criterion) {
    let settings = StackSettings::new(sample_store());
    c.bench_function("validate_all", |b| {
        b.iter(|| black_box(settings.validate_all()).unwrap())
    });
}

fn bench_deploy_stack(c: &mut Criterion) {
    let mut group = c.benchmark_group("deploy_stack");
    for locations in [1, 4] {
        let names: Vec<String> = (0..locations).map(|i| format!("location{i}")).collect();
        let settings = StackSettings::new(sample_store().with_list(keys::LOCATIONS, names));
        group.bench_with_input(
            BenchmarkId::from_parameter(locations),
            &locations,
            |b, _| {
                b.iter(|| {
                    let provisioner = PreviewProvisioner::default();
                    black_box(AzureKubernetesStack::deploy(&settings, &provisioner).unwrap())
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build_node_pool_specs,
    bench_validate_all,
    bench_deploy_stack
);
criterion_main!(benches);
