use serde::Serialize;

pub fn monthly_payment(principal: f64, annual_rate: f64, term_years: u32) -> f64 {
    if !principal.is_finite() || principal <= 0.0 || term_years == 0 {
        return 0.0;
    }
    let n = f64::from(term_years) * 12.0;
    let r = annual_rate / 12.0;
    if r == 0.0 || !r.is_finite() {
        return principal / n;
    }
    principal * r / (1.0 - (1.0 + r).powf(-n))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YearlyAmortization {
    pub balance_by_year: Vec<f64>,
    pub interest_by_year: Vec<f64>,
}

/// Runs the loan month by month for `total_months` and snapshots every 12th
/// month. A trailing partial year is padded with the last balance so both
/// vectors have `ceil(total_months / 12)` entries.
pub fn amortize_by_year(
    principal: f64,
    monthly_rate: f64,
    payment: f64,
    total_months: u32,
) -> YearlyAmortization {
    let years = total_months.div_ceil(12) as usize;
    let mut out = YearlyAmortization {
        balance_by_year: Vec::with_capacity(years),
        interest_by_year: Vec::with_capacity(years),
    };

    let mut balance = principal.max(0.0);
    let mut interest_acc = 0.0;
    for month in 1..=total_months {
        let interest = balance * monthly_rate;
        balance = (balance + interest - payment).max(0.0);
        interest_acc += interest;
        if month % 12 == 0 {
            out.balance_by_year.push(balance);
            out.interest_by_year.push(interest_acc);
            interest_acc = 0.0;
        }
    }

    if out.balance_by_year.len() < years {
        out.interest_by_year.push(interest_acc);
    }
    while out.balance_by_year.len() < years {
        out.balance_by_year.push(balance);
    }
    while out.interest_by_year.len() < years {
        out.interest_by_year.push(0.0);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    term_years: u32,
) -> Vec<AmortizationRow> {
    let payment = monthly_payment(principal, annual_rate, term_years);
    if payment <= 0.0 {
        return Vec::new();
    }

    let monthly_rate = annual_rate / 12.0;
    let mut balance = principal;
    let months = term_years.saturating_mul(12);
    let mut rows = Vec::with_capacity(months as usize);
    for month in 1..=months {
        let interest = balance * monthly_rate;
        let principal_paid = (payment - interest).min(balance).max(0.0);
        balance = (balance - principal_paid).max(0.0);
        rows.push(AmortizationRow {
            month,
            payment: interest + principal_paid,
            interest,
            principal: principal_paid,
            balance,
        });
        if balance <= 1e-6 {
            break;
        }
    }
    rows
}
