//! Static property-transaction dataset.
//!
//! Served when the upstream source cannot be reached, and used throughout
//! the tests.

use crate::record::{ColumnDef, Schema};
use crate::value::ValueKind;
use serde_json::{json, Value as JsonValue};

pub const TRANSACTIONS_TITLE: &str = "Property Transactions";

/// Column definitions of the transactions table.
pub fn transaction_schema() -> Schema {
    Schema::new(vec![
        ColumnDef::new("id", ValueKind::Number).with_header("ID"),
        ColumnDef::new("transactionId", ValueKind::Text).with_header("Transaction ID"),
        ColumnDef::new("propertyName", ValueKind::Text).with_header("Property Name"),
        ColumnDef::new("agentName", ValueKind::Text).with_header("Agent Name"),
        ColumnDef::new("account", ValueKind::Text).with_header("Account"),
        ColumnDef::new("date", ValueKind::Date).with_header("Date"),
        ColumnDef::new("amount", ValueKind::Number).with_header("Amount"),
        ColumnDef::new("status", ValueKind::Text).with_header("Status"),
        ColumnDef::new("propertyType", ValueKind::Text).with_header("Property Type"),
        ColumnDef::new("remarks", ValueKind::Text).with_header("Remarks"),
    ])
}

/// The eight sample transactions as upstream JSON rows.
pub fn transaction_rows() -> Vec<JsonValue> {
    vec![
        json!({
            "id": 1,
            "propertyName": "Sunset Villa",
            "agentName": "Ava Realtors",
            "account": "Freedom Platinum Visa",
            "transactionId": "TXN4528790135",
            "date": "2024-10-20T10:04:00",
            "amount": 5300,
            "remarks": "Commission payment from property sale",
            "status": "Completed",
            "propertyType": "Residential"
        }),
        json!({
            "id": 2,
            "propertyName": "Oceanview Apartment",
            "agentName": "BlueBrick Realty",
            "account": "Freedom Unlimited Mastercard",
            "transactionId": "TXN4826709123",
            "date": "2024-10-18T08:30:00",
            "amount": -1200,
            "remarks": "Monthly maintenance fee",
            "status": "Pending",
            "propertyType": "Residential"
        }),
        json!({
            "id": 3,
            "propertyName": "Greenwood Office Complex",
            "agentName": "Joseph Estates",
            "account": "Elite Business Card",
            "transactionId": "TXN4837099012",
            "date": "2024-10-17T07:15:00",
            "amount": 9800,
            "remarks": "Rent collection from tenant",
            "status": "Completed",
            "propertyType": "Commercial"
        }),
        json!({
            "id": 4,
            "propertyName": "Palm Heights Tower",
            "agentName": "LuxeSpaces",
            "account": "Platinum Rewards Card",
            "transactionId": "TXN4710023011",
            "date": "2024-10-14T09:45:00",
            "amount": -950,
            "remarks": "Interior maintenance cost",
            "status": "Failed",
            "propertyType": "Commercial"
        }),
        json!({
            "id": 5,
            "propertyName": "Skyline Business Center",
            "agentName": "Elite Realty Group",
            "account": "Business Premium Card",
            "transactionId": "TXN4850012399",
            "date": "2024-10-10T15:25:00",
            "amount": 12500,
            "remarks": "Commercial property sale",
            "status": "Completed",
            "propertyType": "Commercial"
        }),
        json!({
            "id": 6,
            "propertyName": "Marina Bay Condos",
            "agentName": "Coastal Properties",
            "account": "Gold Business Card",
            "transactionId": "TXN4729384756",
            "date": "2024-10-08T11:20:00",
            "amount": 7200,
            "remarks": "Property lease agreement",
            "status": "Completed",
            "propertyType": "Residential"
        }),
        json!({
            "id": 7,
            "propertyName": "Downtown Retail Space",
            "agentName": "Metro Realty",
            "account": "Corporate Platinum",
            "transactionId": "TXN4913847562",
            "date": "2024-10-05T14:45:00",
            "amount": -2100,
            "remarks": "Office renovation costs",
            "status": "Pending",
            "propertyType": "Commercial"
        }),
        json!({
            "id": 8,
            "propertyName": "Garden View Estates",
            "agentName": "GreenSpace Realty",
            "account": "Premium Rewards Card",
            "transactionId": "TXN4812736495",
            "date": "2024-10-03T09:15:00",
            "amount": 15600,
            "remarks": "Luxury home sale commission",
            "status": "Completed",
            "propertyType": "Residential"
        }),
    ]
}
