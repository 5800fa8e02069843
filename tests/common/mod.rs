//! Shared fixtures for integration tests

#![allow(dead_code)]

use txn_dashboard::loader::{from_raw_records, RawTransaction};
use txn_dashboard::Dataset;

pub const CSV_HEADER: &str = "Transaction_ID,CustomerID,Transaction_Date,Date,Product_Category,\
Product_Description,Gender,Location,Tenure_Months,Quantity,Avg_Price,Online_Spend,Offline_Spend,\
Discount_pct,Coupon_Status";

/// A valid row; override fields with struct update syntax
pub fn base() -> RawTransaction {
    RawTransaction {
        transaction_id: "16679".to_string(),
        customer_id: "17850".to_string(),
        transaction_date: "2020-01-15".to_string(),
        date: "2020-01-15".to_string(),
        product_category: "Apparel".to_string(),
        product_description: "Google Tee".to_string(),
        gender: "F".to_string(),
        location: "Chicago".to_string(),
        tenure_months: 12.0,
        quantity: 1,
        avg_price: 10.0,
        online_spend: 100.0,
        offline_spend: 50.0,
        discount_pct: 10.0,
        coupon_status: "Used".to_string(),
    }
}

/// Row with a given category, revenue (as one unit at that price) and date
pub fn sale(category: &str, revenue: f64, date: &str) -> RawTransaction {
    RawTransaction {
        product_category: category.to_string(),
        quantity: 1,
        avg_price: revenue,
        transaction_date: date.to_string(),
        ..base()
    }
}

pub fn dataset(rows: Vec<RawTransaction>) -> Dataset {
    from_raw_records(rows).expect("fixture rows are valid")
}

/// The three-row example: A/10/Jan, B/5/Jan, A/3/Feb
pub fn example_dataset() -> Dataset {
    dataset(vec![
        sale("A", 10.0, "2020-01-15"),
        sale("B", 5.0, "2020-01-20"),
        sale("A", 3.0, "2020-02-01"),
    ])
}

/// CSV line for a row in header order
pub fn csv_line(row: &RawTransaction) -> String {
    format!(
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        row.transaction_id,
        row.customer_id,
        row.transaction_date,
        row.date,
        row.product_category,
        row.product_description,
        row.gender,
        row.location,
        row.tenure_months,
        row.quantity,
        row.avg_price,
        row.online_spend,
        row.offline_spend,
        row.discount_pct,
        row.coupon_status
    )
}

pub fn csv_text(rows: &[RawTransaction]) -> String {
    let mut text = String::from(CSV_HEADER);
    text.push('\n');
    for row in rows {
        text.push_str(&csv_line(row));
        text.push('\n');
    }
    text
}
