use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use chrono::NaiveDate;
use service::reservation::repository::memory::InMemoryStore;
use service::reservation::{NewReservation, ReservationService, ReservationStatus};

fn new_reservation(reservation_id: String, user_id: i32, vehicle_id: i32) -> NewReservation {
    let day = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    NewReservation {
        reservation_id,
        user_id,
        vehicle_id,
        spot_id: "A1".into(),
        start_time: day.and_hms_opt(10, 0, 0).unwrap(),
        end_time: day.and_hms_opt(12, 0, 0).unwrap(),
        status: ReservationStatus::Pending,
    }
}

fn bench_reservations(c: &mut Criterion) {
    let store = Arc::new(InMemoryStore::new());
    let user = store.add_user("Bench", "bench@example.com");
    let vehicle = store.add_vehicle("BENCH-1", "Model 3");
    let svc = ReservationService::from_store(store);
    let rt = tokio::runtime::Runtime::new().unwrap();

    let mut seq = 0u64;
    c.bench_function("reservation_create", |b| {
        b.iter(|| {
            seq += 1;
            rt.block_on(svc.create_reservation(new_reservation(format!("R-{seq}"), user.id, vehicle.id))).unwrap();
        });
    });

    c.bench_function("reservation_lookup_by_reservation_id", |b| {
        b.iter(|| {
            let found = rt.block_on(svc.get_reservation_by_reservation_id("R-1")).unwrap();
            assert!(found.is_some());
        });
    });
}

criterion_group!(benches, bench_reservations);
criterion_main!(benches);
