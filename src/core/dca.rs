use super::types::DcaPeriod;

/// Cumulative BTC bought through recurring fixed-dollar buys, sampled at the
/// end of each analysis year. Entry 0 is always zero; year `y` spreads its
/// buys evenly over `(y - 1, y]`. Buys at a non-positive price are skipped.
pub fn accumulate_dca_cum(
    years: u32,
    dca_amount_usd: f64,
    period: DcaPeriod,
    price_at: &impl Fn(f64) -> f64,
) -> Vec<f64> {
    let per_year = period.periods_per_year();
    let mut out = Vec::with_capacity(years as usize + 1);
    let mut total = 0.0;
    out.push(total);

    let buying = dca_amount_usd.is_finite() && dca_amount_usd > 0.0;
    for y in 1..=years {
        if buying {
            for p in 0..per_year {
                let t = f64::from(y - 1) + f64::from(p + 1) / f64::from(per_year);
                let price = price_at(t);
                if price > 0.0 {
                    total += dca_amount_usd / price;
                }
            }
        }
        out.push(total);
    }
    out
}

pub fn dca_dollars_invested(dca_amount_usd: f64, period: DcaPeriod, through_year: u32) -> f64 {
    if !dca_amount_usd.is_finite() || dca_amount_usd <= 0.0 {
        return 0.0;
    }
    f64::from(through_year) * f64::from(period.periods_per_year()) * dca_amount_usd
}
