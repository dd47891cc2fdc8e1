/*!
# Market Basket Analysis Web App

A small browser-based market-basket analysis tool, built in Rust.

## Overview

Users upload a spreadsheet of retail transactions (CSV or Excel), choose a
minimum support and a minimum confidence, and get back HTML tables of the
frequent itemsets and association rules mined from their data. A second page
redisplays the full uploaded table from session storage.

## Architecture

The application follows a simple request pipeline:

### Ingestion
- Multipart upload handler saves the file under `uploads/` (sanitized name)
- CSV files parse through the `csv` crate, Excel workbooks through `calamine`
- Everything lands in a row-oriented `DataTable` of string cells

### Transform
- Item descriptions trimmed, rows without an invoice dropped
- Cancelled invoices (identifier containing `C`) excluded
- Quantities aggregated per (invoice, item) and pivoted into a binary
  invoice-by-item incidence matrix; the non-item `POSTAGE` column is dropped

### Mining
- Level-wise apriori over the incidence matrix with a user-supplied minimum
  support, then association rules filtered by minimum confidence
- Rules scored by support, confidence, lift, leverage and conviction

### Presentation
- Embedded HTML templates with placeholder substitution
- Home page: upload form, first 100 table rows, itemset and rule tables
- Dataset page: the full stored table for the caller's session

### Session Layer
- Cookie-identified sessions in a process-wide thread-safe map
- Each session owns its serialized table, filename and mined results, so
  concurrent users never see each other's data

## Modules

- **table**: row-oriented `DataTable` with exact JSON round-tripping
- **loader**: CSV/Excel parsing into a `DataTable`
- **transform**: cleaning and the incidence-matrix pivot
- **mining**: apriori itemset extraction and rule derivation
- **session**: per-browser-session storage of tables and results
- **render**: HTML table rendering and page assembly
- **error**: the `DatasetError` taxonomy
- **app**: routing and request handlers (requires the `web` feature)

## HTTP Endpoints

- `GET /` - Home page with upload form and the session's mined results
- `POST /` - Upload a spreadsheet and mine it (`file`, `min_support`,
  `min_threshold` form fields)
- `GET /dataset`, `GET /dataset/` - Full stored table for the session
*/

// Re-export all modules so they appear in the documentation
#[cfg(feature = "web")]
pub mod app;
pub mod error;
pub mod loader;
pub mod mining;
pub mod render;
pub mod session;
pub mod table;
pub mod transform;

/// Re-export everything from these modules to make it easier to use
pub use error::*;
pub use loader::*;
pub use mining::*;
pub use render::*;
pub use session::*;
pub use table::*;
pub use transform::*;
