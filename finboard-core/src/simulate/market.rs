use super::catalog::{base_price, company_name};
use crate::domain::{MarketDataResult, Period, PricePoint, Symbol};
use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc, Weekday};
use rand::Rng;

/// Max per-step move as a fraction of the current price.
const STEP_FRACTION: f64 = 0.01;
/// Intrabar spread (open/high/low offsets) as a fraction of the close.
const WICK_FRACTION: f64 = 0.01;

/// Sampling grid for one period: where the series starts, how many slots,
/// and the spacing between slots.
struct Grid {
    start: DateTime<Utc>,
    slots: i32,
    interval: Duration,
}

fn months_back(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(now - Duration::days(30 * i64::from(months)))
}

fn grid_for(period: Period, now: DateTime<Utc>) -> Grid {
    match period {
        Period::OneDay => {
            // 6.5h session from 09:30, 5-minute bars
            let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default();
            Grid {
                start: now.date_naive().and_time(open).and_utc(),
                slots: 78,
                interval: Duration::minutes(5),
            }
        }
        Period::FiveDays => Grid {
            start: now - Duration::days(5),
            slots: 35,
            interval: Duration::milliseconds(24 * 60 * 60 * 1000 / 7),
        },
        Period::OneMonth => Grid {
            start: months_back(now, 1),
            slots: 30,
            interval: Duration::days(1),
        },
        Period::ThreeMonths => Grid {
            start: months_back(now, 3),
            slots: 90,
            interval: Duration::days(1),
        },
        Period::SixMonths => Grid {
            start: months_back(now, 6),
            slots: 180,
            interval: Duration::days(1),
        },
        Period::OneYear => Grid {
            start: months_back(now, 12),
            slots: 365,
            interval: Duration::days(1),
        },
        Period::Max => Grid {
            start: months_back(now, 60),
            slots: 60,
            interval: Duration::days(30),
        },
    }
}

fn is_weekend(ts: DateTime<Utc>) -> bool {
    matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Random-walk market data for `symbol` over `period`, ending around `now`.
pub fn generate_market<R: Rng + ?Sized>(
    symbol: &Symbol,
    period: Period,
    now: DateTime<Utc>,
    rng: &mut R,
) -> MarketDataResult {
    let ticker = symbol.ticker();
    let grid = grid_for(period, now);
    let mut price = base_price(ticker);
    let mut series = Vec::with_capacity(grid.slots as usize);

    for i in 0..grid.slots {
        let timestamp = grid.start + grid.interval * i;
        if !period.is_intraday() && is_weekend(timestamp) {
            continue;
        }

        price += rng.gen_range(-STEP_FRACTION..STEP_FRACTION) * price;
        let close = price;
        let open = close - rng.gen::<f64>() * WICK_FRACTION * close;
        let high = open.max(close) + rng.gen::<f64>() * WICK_FRACTION * close;
        let low = open.min(close) - rng.gen::<f64>() * WICK_FRACTION * close;

        series.push(PricePoint {
            timestamp,
            open,
            close,
            high,
            low,
            volume: rng.gen_range(500_000..1_500_000),
        });
    }

    let day_high = series.iter().map(|p| p.high).fold(f64::MIN, f64::max);
    let day_low = series.iter().map(|p| p.low).fold(f64::MAX, f64::min);
    let previous_close = series.first().map(|p| p.open).unwrap_or(price);
    let change = price - previous_close;
    let change_percent = if previous_close != 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    };

    MarketDataResult {
        symbol: ticker.to_string(),
        name: company_name(ticker),
        exchange: Some("NASDAQ".to_string()),
        currency: Some("USD".to_string()),
        price,
        previous_close,
        change,
        change_percent,
        day_high,
        day_low,
        volume: rng.gen_range(1_000_000..11_000_000),
        time_series: series,
    }
}
