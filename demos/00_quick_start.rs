/// quick start - minimal example to get started
use loan_servicing_rs::chrono::NaiveDate;
use loan_servicing_rs::{AmortizationSchedule, LoanTerms, Money, PaymentFrequency, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // a $1,500 loan at 29% paid bi-weekly over 6 months
    let terms = LoanTerms::with_term_months(
        Money::from_major(1_500),
        Rate::from_percentage(29),
        PaymentFrequency::BiWeekly,
        6,
    );

    let first_due = NaiveDate::from_ymd_opt(2024, 7, 5).ok_or("invalid date")?;
    let schedule = AmortizationSchedule::generate(&terms, first_due)?;

    println!("payment: ${} x {}", schedule.payment_amount, schedule.len());
    println!("total interest: ${}", schedule.total_interest);

    // print the full schedule
    println!("{}", schedule.to_json_pretty());

    Ok(())
}
