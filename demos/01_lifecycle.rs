/// lifecycle - originate a schedule, record a failed payment, then modify and stop
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use loan_servicing_rs::modification::modified_balance;
use loan_servicing_rs::{
    compute_payment, AmortizationSchedule, EventStore, FeeConfiguration, LoanState, LoanTerms,
    ModificationRequest, Money, PaymentFrequency, PaymentStatus, Rate, SafeTimeProvider,
    ScheduleChange, ScheduleChangeOutcome, ScheduleModifier, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== schedule lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    // 1. origination
    let terms = LoanTerms::with_payments(
        Money::from_major(1_200),
        Rate::from_percentage(29),
        PaymentFrequency::Monthly,
        6,
    );
    let first_due = NaiveDate::from_ymd_opt(2024, 2, 1).ok_or("invalid date")?;
    let schedule = AmortizationSchedule::generate(&terms, first_due)?;
    println!("1. originated: {} payments of ${}", schedule.len(), schedule.payment_amount);

    let mut payments = schedule.into_records(1)?;

    // 2. two payments clear, the third is returned
    controller.advance(Duration::days(95));
    payments[0].status = PaymentStatus::Confirmed;
    payments[1].status = PaymentStatus::Confirmed;
    payments[2].status = PaymentStatus::Failed;
    println!("2. {}: payment 3 failed", time.now().format("%Y-%m-%d"));

    let remaining: Money = payments[2..].iter().map(|p| p.principal).sum();
    let state = LoanState::new(
        Uuid::new_v4(),
        remaining,
        terms.annual_rate,
        FeeConfiguration::new(Money::from_major(55), Money::ZERO, Money::from_major(50)),
        payments,
    );

    // 3. modify: quote the borrower the engine's amount for the rolled-up balance
    let modifier = ScheduleModifier::default();
    let mut events = EventStore::new();

    // the lender's local business date
    let today = time.now().date_naive();
    let new_balance = modified_balance(&state, today);
    let quote = compute_payment(new_balance, state.annual_rate, PaymentFrequency::BiWeekly, 10)
        .ok_or("payment not computable")?;
    println!("3. new balance ${}, quoted ${} bi-weekly", new_balance, quote);

    let request = ModificationRequest::builder()
        .payment_amount(quote)
        .frequency(PaymentFrequency::BiWeekly)
        .number_of_payments(10)
        .start_date(NaiveDate::from_ymd_opt(2024, 4, 12).ok_or("invalid date")?)
        .build()?;

    if let ScheduleChangeOutcome::Modified { outcome, holiday_warnings } =
        modifier.apply(&state, &ScheduleChange::Modify(request), today, &time, &mut events)?
    {
        println!("   removed payments {:?}", outcome.removed_numbers());
        println!("   created payments {:?}", outcome.created_numbers());
        for warning in holiday_warnings {
            println!("   warning: {:?}", warning);
        }
    }

    // 4. stop whatever is still scheduled on the original state
    let stopped = modifier.stop(&state, today, &time, &mut events)?;
    println!("4. stopped payments {:?}", stopped.cancelled_numbers());

    println!("\nevents:");
    for event in events.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
