mod common;

use chrono::{NaiveDate, NaiveTime, Weekday};
use common::{hm, next_weekday, TestApp, BUSINESS_ID};
use scheduling_backend::domain::models::appointment::{AppointmentStatus, HistoryChangeType, SyncStatus};
use scheduling_backend::domain::services::appointment_service::BookingRequest;
use scheduling_backend::error::AppError;

struct Fixture {
    app: TestApp,
    staff_id: String,
    customer_id: String,
    monday: NaiveDate,
}

async fn setup() -> Fixture {
    let app = TestApp::new().await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let customer_id = app.seed_customer(BUSINESS_ID).await;
    app.seed_template(&staff_id, 1, hm(9, 0), hm(12, 0), 30).await;

    let monday = next_weekday(NaiveDate::from_ymd_opt(2030, 3, 1).unwrap(), Weekday::Mon);
    app.state.slot_compiler.generate_from(&staff_id, monday, 1).await.unwrap();

    Fixture { app, staff_id, customer_id, monday }
}

fn request(f: &Fixture, time: NaiveTime) -> BookingRequest {
    BookingRequest {
        business_id: BUSINESS_ID.to_string(),
        customer_id: f.customer_id.clone(),
        staff_id: f.staff_id.clone(),
        date: f.monday,
        time,
        duration_minutes: 30,
        service_id: Some("haircut".into()),
        created_via: None,
        changed_by: None,
    }
}

#[tokio::test]
async fn test_book_marks_slot_and_writes_created_entry() {
    let f = setup().await;

    let appointment = f.app.state.appointment_service.book(request(&f, hm(9, 0))).await.unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
    assert_eq!(appointment.sync_status, SyncStatus::Pending);
    assert_eq!(appointment.created_via, "api");
    assert_eq!(appointment.time, hm(9, 0));

    let slot = f.app.state.repos.slot_repo.find_by_id(&appointment.slot_id).await.unwrap().unwrap();
    assert!(slot.is_booked);
    assert_eq!((slot.date, slot.time), (f.monday, hm(9, 0)));

    let history = f.app.state.appointment_service.history(BUSINESS_ID, &appointment.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].change_type, HistoryChangeType::Created);
    assert_eq!(history[0].changed_by, "system");
    assert_eq!(history[0].new_time, Some(hm(9, 0)));

    let err = f.app.state.appointment_service.book(request(&f, hm(9, 0))).await.unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable(_)));
}

#[tokio::test]
async fn test_cancel_releases_slot_and_rejects_second_cancel() {
    let f = setup().await;
    let service = &f.app.state.appointment_service;

    let appointment = service.book(request(&f, hm(10, 0))).await.unwrap();
    let cancelled = service
        .cancel(BUSINESS_ID, &appointment.id, Some("sick".into()), Some("customer".into()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("sick"));

    let slot = f.app.state.repos.slot_repo.find_by_id(&appointment.slot_id).await.unwrap().unwrap();
    assert!(!slot.is_booked);

    let err = service.cancel(BUSINESS_ID, &appointment.id, None, None).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));

    let history = service.history(BUSINESS_ID, &appointment.id).await.unwrap();
    let kinds: Vec<_> = history.iter().map(|h| h.change_type).collect();
    assert_eq!(kinds, vec![HistoryChangeType::Created, HistoryChangeType::Cancelled]);
    assert_eq!(history[1].changed_by, "customer");
    assert_eq!(history[1].notes.as_deref(), Some("sick"));

    // The freed slot can be booked again.
    let rebooked = service.book(request(&f, hm(10, 0))).await.unwrap();
    assert_eq!(rebooked.slot_id, appointment.slot_id);
}

#[tokio::test]
async fn test_blocked_slot_cannot_be_booked() {
    let f = setup().await;
    let allocator = &f.app.state.slot_allocator;

    let slot = f.app.state.repos.slot_repo.find_by_key(&f.staff_id, f.monday, hm(11, 0)).await.unwrap().unwrap();
    allocator.block(BUSINESS_ID, &slot.id).await.unwrap();

    let err = f.app.state.appointment_service.book(request(&f, hm(11, 0))).await.unwrap_err();
    assert!(err.is_slot_unavailable());

    allocator.unblock(BUSINESS_ID, &slot.id).await.unwrap();
    let appointment = f.app.state.appointment_service.book(request(&f, hm(11, 0))).await.unwrap();

    let err = allocator.block(BUSINESS_ID, &appointment.slot_id).await.unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable(_)));

    let err = allocator.block("other-business", &slot.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_booking_checks_directories_and_slot_existence() {
    let f = setup().await;
    let service = &f.app.state.appointment_service;

    let mut unknown_customer = request(&f, hm(9, 0));
    unknown_customer.customer_id = "nobody".into();
    assert!(matches!(service.book(unknown_customer).await.unwrap_err(), AppError::NotFound(_)));

    let mut wrong_business = request(&f, hm(9, 0));
    wrong_business.business_id = "other-business".into();
    assert!(matches!(service.book(wrong_business).await.unwrap_err(), AppError::NotFound(_)));

    let no_slot = request(&f, hm(8, 0));
    assert!(matches!(service.book(no_slot).await.unwrap_err(), AppError::SlotUnavailable(_)));

    let mut zero_duration = request(&f, hm(9, 0));
    zero_duration.duration_minutes = 0;
    assert!(matches!(service.book(zero_duration).await.unwrap_err(), AppError::Validation(_)));

    let mut longer_than_slot = request(&f, hm(9, 0));
    longer_than_slot.duration_minutes = 45;
    assert!(matches!(service.book(longer_than_slot).await.unwrap_err(), AppError::Validation(_)));

    f.app.set_staff_active(&f.staff_id, false).await;
    assert!(matches!(service.book(request(&f, hm(9, 0))).await.unwrap_err(), AppError::Validation(_)));

    let slot = f.app.state.repos.slot_repo.find_by_key(&f.staff_id, f.monday, hm(9, 0)).await.unwrap().unwrap();
    assert!(!slot.is_booked);
}

#[tokio::test]
async fn test_complete_and_no_show_are_terminal() {
    let f = setup().await;
    let service = &f.app.state.appointment_service;

    let first = service.book(request(&f, hm(9, 0))).await.unwrap();
    let second = service.book(request(&f, hm(9, 30))).await.unwrap();

    let completed = service.complete(BUSINESS_ID, &first.id, Some("front-desk".into())).await.unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);

    let no_show = service
        .mark_no_show(BUSINESS_ID, &second.id, None, Some("did not call".into()))
        .await
        .unwrap();
    assert_eq!(no_show.status, AppointmentStatus::NoShow);

    assert!(matches!(
        service.cancel(BUSINESS_ID, &first.id, None, None).await.unwrap_err(),
        AppError::InvalidTransition(_)
    ));
    assert!(matches!(
        service.complete(BUSINESS_ID, &second.id, None).await.unwrap_err(),
        AppError::InvalidTransition(_)
    ));

    // Slots of closed appointments stay consumed.
    let slot = f.app.state.repos.slot_repo.find_by_id(&first.slot_id).await.unwrap().unwrap();
    assert!(slot.is_booked);

    let history = service.history(BUSINESS_ID, &second.id).await.unwrap();
    assert_eq!(history.last().unwrap().change_type, HistoryChangeType::NoShow);
    assert_eq!(history.last().unwrap().notes.as_deref(), Some("did not call"));

    let listed = service.list_for_staff(BUSINESS_ID, &f.staff_id, f.monday, f.monday).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
}

#[tokio::test]
async fn test_appointment_is_scoped_to_business() {
    let f = setup().await;
    let service = &f.app.state.appointment_service;
    let appointment = service.book(request(&f, hm(9, 0))).await.unwrap();

    assert!(matches!(service.get("other-business", &appointment.id).await.unwrap_err(), AppError::NotFound(_)));
    assert!(matches!(
        service.cancel("other-business", &appointment.id, None, None).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}
