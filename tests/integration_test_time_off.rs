mod common;

use chrono::{Duration, Weekday};
use common::{hm, next_weekday, today, TestApp, BUSINESS_ID};
use scheduling_backend::domain::models::appointment::{Appointment, AppointmentStatus};
use scheduling_backend::domain::models::availability::ProposedScheduleEntry;
use scheduling_backend::domain::models::exception::ExceptionType;
use scheduling_backend::domain::services::appointment_service::BookingRequest;
use scheduling_backend::domain::services::exception_service::ExceptionRequest;
use scheduling_backend::error::AppError;

async fn weekday_schedule(app: &TestApp, staff_id: &str) {
    let entries = (1..=5)
        .map(|day| ProposedScheduleEntry {
            day_of_week: day,
            is_working: true,
            start_time: hm(9, 0),
            end_time: hm(12, 0),
            slot_duration_minutes: 60,
        })
        .collect();
    app.state.schedule_service.commit_schedule(BUSINESS_ID, staff_id, entries).await.unwrap();
}

#[tokio::test]
async fn test_time_off_range_removes_free_slots_and_reports_conflicts() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let customer_id = app.seed_customer(BUSINESS_ID).await;
    weekday_schedule(&app, &staff_id).await;

    let monday = next_weekday(today(), Weekday::Mon);
    let wednesday = monday + Duration::days(2);
    assert_eq!(app.count_slots(&staff_id, monday).await, 3);

    let booked = app.state.appointment_service.book(BookingRequest {
        business_id: BUSINESS_ID.into(),
        customer_id,
        staff_id: staff_id.clone(),
        date: monday,
        time: hm(10, 0),
        duration_minutes: 60,
        service_id: None,
        created_via: None,
        changed_by: None,
    }).await.unwrap();

    let change = app.state.exception_service
        .add_time_off(BUSINESS_ID, &staff_id, monday, wednesday, ExceptionType::TimeOff, Some("conference".into()))
        .await
        .unwrap();
    assert_eq!(change.exceptions.len(), 3);
    assert_eq!(change.refresh.removed, 8);
    assert_eq!(change.refresh.conflicts.len(), 1);
    assert_eq!(change.refresh.conflicts[0].id, booked.slot_id);
    assert_eq!(change.refresh.retired, 1);

    // The booked slot survives, everything else on those days is gone.
    assert_eq!(app.count_slots(&staff_id, monday).await, 1);
    assert_eq!(app.count_slots(&staff_id, wednesday).await, 0);
    let still = app.state.appointment_service.get(BUSINESS_ID, &booked.id).await.unwrap();
    assert_eq!(still.slot_id, booked.slot_id);

    let periods = app.state.exception_service.list_time_off(BUSINESS_ID, &staff_id, None).await.unwrap();
    assert_eq!(periods.len(), 1);
    assert_eq!((periods[0].start_date, periods[0].end_date), (monday, wednesday));
    assert_eq!(periods[0].reason.as_deref(), Some("conference"));

    let refresh = app.state.exception_service.remove_time_off(BUSINESS_ID, &staff_id, monday, wednesday).await.unwrap();
    assert_eq!(refresh.generation.inserted, 8);
    assert_eq!(refresh.restored, 1);
    let restored = app.state.repos.slot_repo.find_by_id(&booked.slot_id).await.unwrap().unwrap();
    assert!(restored.is_booked && !restored.is_blocked && !restored.is_retired);
    assert_eq!(app.count_slots(&staff_id, wednesday).await, 3);
    assert!(app.state.exception_service.list_time_off(BUSINESS_ID, &staff_id, None).await.unwrap().is_empty());

    let err = app.state.exception_service.remove_time_off(BUSINESS_ID, &staff_id, monday, wednesday).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_custom_hours_exception_reshapes_a_day() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    weekday_schedule(&app, &staff_id).await;

    let tuesday = next_weekday(today(), Weekday::Tue);
    let change = app.state.exception_service
        .upsert_exception(BUSINESS_ID, &staff_id, ExceptionRequest {
            date: tuesday,
            exception_type: ExceptionType::CustomHours,
            start_time: Some(hm(10, 0)),
            end_time: None,
            reason: Some("late start".into()),
        })
        .await
        .unwrap();
    assert_eq!(change.exceptions[0].end_time, None);
    assert_eq!(change.refresh.removed, 1);

    let slots = app.state.slot_allocator.find_available(&staff_id, tuesday, None).await.unwrap();
    let times: Vec<_> = slots.iter().map(|s| s.time).collect();
    assert_eq!(times, vec![hm(10, 0), hm(11, 0)]);

    // Replacing the override with a whole-day closure.
    app.state.exception_service
        .upsert_exception(BUSINESS_ID, &staff_id, ExceptionRequest {
            date: tuesday,
            exception_type: ExceptionType::Closed,
            start_time: Some(hm(10, 0)),
            end_time: None,
            reason: None,
        })
        .await
        .unwrap();
    assert_eq!(app.count_slots(&staff_id, tuesday).await, 0);

    let listed = app.state.exception_service.list_exceptions(BUSINESS_ID, &staff_id, tuesday, tuesday).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].exception_type, ExceptionType::Closed);
    assert_eq!(listed[0].start_time, None);

    app.state.exception_service.delete_exception(BUSINESS_ID, &staff_id, tuesday).await.unwrap();
    assert_eq!(app.count_slots(&staff_id, tuesday).await, 3);

    let err = app.state.exception_service.delete_exception(BUSINESS_ID, &staff_id, tuesday).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_exception_input_validation() {
    let app = TestApp::new().await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let day = next_weekday(today(), Weekday::Thu);

    let err = app.state.exception_service
        .upsert_exception(BUSINESS_ID, &staff_id, ExceptionRequest {
            date: day,
            exception_type: ExceptionType::CustomHours,
            start_time: None,
            end_time: None,
            reason: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app.state.exception_service
        .add_time_off(BUSINESS_ID, &staff_id, day, day - Duration::days(1), ExceptionType::TimeOff, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = app.state.exception_service
        .add_time_off("other-business", &staff_id, day, day, ExceptionType::TimeOff, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

async fn book_at(app: &TestApp, staff_id: &str, customer_id: &str, date: chrono::NaiveDate) -> Result<Appointment, AppError> {
    app.state.appointment_service.book(BookingRequest {
        business_id: BUSINESS_ID.into(),
        customer_id: customer_id.into(),
        staff_id: staff_id.into(),
        date,
        time: hm(10, 0),
        duration_minutes: 60,
        service_id: None,
        created_via: None,
        changed_by: None,
    }).await
}

#[tokio::test]
async fn test_time_off_retires_slot_of_cancelled_appointment() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let customer_id = app.seed_customer(BUSINESS_ID).await;
    weekday_schedule(&app, &staff_id).await;
    let monday = next_weekday(today(), Weekday::Mon);

    let first = book_at(&app, &staff_id, &customer_id, monday).await.unwrap();
    app.state.appointment_service.cancel(BUSINESS_ID, &first.id, None, None).await.unwrap();

    let change = app.state.exception_service
        .add_time_off(BUSINESS_ID, &staff_id, monday, monday, ExceptionType::TimeOff, None)
        .await
        .unwrap();
    // 09:00 and 11:00 were never used; 10:00 still backs the cancelled appointment.
    assert_eq!(change.refresh.removed, 2);
    assert_eq!(change.refresh.retired, 1);
    assert!(change.refresh.conflicts.is_empty());

    assert!(app.state.slot_allocator.find_available(&staff_id, monday, None).await.unwrap().is_empty());
    let err = book_at(&app, &staff_id, &customer_id, monday).await.unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable(_)));
    let err = app.state.slot_allocator.unblock(BUSINESS_ID, &first.slot_id).await.unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable(_)));

    let refresh = app.state.exception_service.remove_time_off(BUSINESS_ID, &staff_id, monday, monday).await.unwrap();
    assert_eq!(refresh.restored, 1);
    let times: Vec<_> = app.state.slot_allocator.find_available(&staff_id, monday, None).await.unwrap()
        .iter()
        .map(|s| s.time)
        .collect();
    assert_eq!(times, vec![hm(9, 0), hm(10, 0), hm(11, 0)]);
    let again = book_at(&app, &staff_id, &customer_id, monday).await.unwrap();
    assert_eq!(again.slot_id, first.slot_id);
}

#[tokio::test]
async fn test_cancel_on_time_off_day_keeps_slot_closed() {
    let app = TestApp::new().await;
    app.seed_business_hours(BUSINESS_ID).await;
    let staff_id = app.seed_staff(BUSINESS_ID).await;
    let customer_id = app.seed_customer(BUSINESS_ID).await;
    weekday_schedule(&app, &staff_id).await;
    let tuesday = next_weekday(today(), Weekday::Tue);

    let booked = book_at(&app, &staff_id, &customer_id, tuesday).await.unwrap();
    let change = app.state.exception_service
        .add_time_off(BUSINESS_ID, &staff_id, tuesday, tuesday, ExceptionType::Closed, Some("holiday".into()))
        .await
        .unwrap();
    assert_eq!(change.refresh.conflicts.len(), 1);

    let cancelled = app.state.appointment_service
        .cancel(BUSINESS_ID, &booked.id, Some("closed that day".into()), None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    let slot = app.state.repos.slot_repo.find_by_id(&booked.slot_id).await.unwrap().unwrap();
    assert!(!slot.is_booked);
    assert!(slot.is_blocked && slot.is_retired);
    assert!(app.state.slot_allocator.find_available(&staff_id, tuesday, None).await.unwrap().is_empty());
    let err = book_at(&app, &staff_id, &customer_id, tuesday).await.unwrap_err();
    assert!(matches!(err, AppError::SlotUnavailable(_)));
}
