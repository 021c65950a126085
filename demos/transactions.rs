//! Transactions table walkthrough
//!
//! Drives one table through search, sort, paging, selection and export,
//! printing the address-bar query after each step.

use gridstate::fixtures::{transaction_rows, transaction_schema, TRANSACTIONS_TITLE};
use gridstate::{
    ColumnFilter, GridModel, IngestOptions, MemoryHistory, MemoryStore, Location, Operator,
    RecordSet, SelectScope, StateStore, TableAction, TableConfig, TableController,
};
use std::cell::RefCell;
use std::rc::Rc;

fn print_page(model: &GridModel) {
    println!(
        "   page {}/{} ({} of {} rows match)",
        model.page.page + 1,
        model.page.total_pages,
        model.filtered_count,
        model.source_count
    );
    for row in &model.rows {
        let marker = if row.selected { "x" } else { " " };
        println!("   [{}] {}", marker, row.cells[..4].join(" | "));
    }
    if let Some(empty) = &model.empty {
        println!("   {}", empty.message());
    }
    println!();
}

fn main() -> Result<(), gridstate::TableError> {
    println!("=== GridState Transactions Example ===\n");

    let history = Rc::new(RefCell::new(MemoryHistory::new("?tab=payments")));
    let location: Rc<RefCell<dyn Location>> = history.clone();
    let store = StateStore::new(Some(location), Rc::new(RefCell::new(MemoryStore::new())), "p");

    let config = TableConfig::default()
        .with_schema(transaction_schema())
        .with_page_size(5);
    let records = RecordSet::from_json(&transaction_rows(), &config.schema, &IngestOptions::default())?;

    let mut table = TableController::new(config, store)?;
    table.mount();
    table.set_source(records);

    println!("1. Initial view");
    print_page(&table.view());

    println!("2. Amounts above 5000, largest first");
    table.dispatch(TableAction::SetColumnFilter(ColumnFilter::new(
        "amount",
        Operator::GreaterThan,
        "5000",
    )));
    table.dispatch(TableAction::SortBy("amount".to_string()));
    table.dispatch(TableAction::SortBy("amount".to_string()));
    println!("   query: {}", history.borrow().query());
    print_page(&table.view());

    println!("3. Select every match");
    table.dispatch(TableAction::SelectAll(SelectScope::Filtered));
    print_page(&table.view());

    println!("4. Search for something that is not there");
    table.dispatch(TableAction::SetGlobalFilter("castle".to_string()));
    print_page(&table.view());

    println!("5. Reset and export");
    table.dispatch(TableAction::ResetFilters);
    let today = chrono::Local::now().date_naive();
    let csv = table.export_csv(TRANSACTIONS_TITLE, today)?;
    println!("   {} ({} lines)", csv.filename, csv.content.lines().count());
    println!("   query: {}", history.borrow().query());

    Ok(())
}
