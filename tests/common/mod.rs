//! Common test utilities

use chrono::NaiveDate;
use shiftlog::models::{DailyRecord, ServiceFigures};

/// The report template exactly as staff are asked to send it
#[allow(dead_code)]
pub const TEMPLATE_REPORT: &str = "Day: 24/01/2026
Total Sales Day: 7199,50
Visa: 6400,30
Cash: 799,20
Tips: 103,60
Lunch: 2341,30
Pax: 50
Walk in: 3
No show: 7
Dinner: 4858,20
Pax: 106
Walk in: 2
No show: 4";

/// Same figures with Spanish labels, bullets and thousands separators
#[allow(dead_code)]
pub const SPANISH_REPORT: &str = "Fecha: 2026-01-24
- Ventas totales: € 7.199,50
- Tarjeta: 6.400,30
- Efectivo: 799,20
- Propinas: 103,60
Comida: 2.341,30
Pax: 50
Walk in: 3
No show: 7
Cena: 4.858,20
Pax: 106
Walk in: 2
No show: 4";

/// Build a date, panicking on invalid input
pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Create a record with the given lunch/dinner split
#[allow(dead_code)]
pub fn create_test_record(day: NaiveDate, lunch_sales: f64, dinner_sales: f64) -> DailyRecord {
    DailyRecord {
        day,
        total_sales: lunch_sales + dinner_sales,
        visa: lunch_sales + dinner_sales,
        cash: 0.0,
        tips: 0.0,
        lunch: ServiceFigures {
            sales: lunch_sales,
            pax: 10,
            walkins: 1,
            noshows: 0,
        },
        dinner: ServiceFigures {
            sales: dinner_sales,
            pax: 20,
            walkins: 0,
            noshows: 2,
        },
    }
}

/// Approximate float comparison for money
#[allow(dead_code)]
pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
